mod common;

use axum::http::StatusCode;
use common::{spawn_app, TestApp};
use portfolio::contract::model::{PortfolioDraft, Visibility};
use serde_json::Value;

async fn add(app: &TestApp, owner: i64, title: &str, category: &str, tags: &str) {
    app.services
        .items
        .create(
            owner,
            PortfolioDraft {
                title: title.into(),
                category: Some(category.into()),
                tags: Some(tags.into()),
                ..Default::default()
            },
            None,
        )
        .await
        .expect("create item");
}

fn titles(view: &Value) -> Vec<String> {
    view["portfolios"]
        .as_array()
        .map(|a| {
            a.iter()
                .filter_map(|e| e["title"].as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[tokio::test]
async fn feed_pages_hold_nine_newest_first() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    for n in 1..=10 {
        app.add_item(alice.id, &format!("Item {n}"), Visibility::Public)
            .await;
    }
    let mut b = app.browser();

    let first = b.get("/").await.json()["view"].clone();
    let shown = titles(&first);
    assert_eq!(shown.len(), 9);
    assert_eq!(shown[0], "Item 10");
    assert_eq!(first["page"], 1);
    assert_eq!(first["has_next"], true);

    let second = b.get("/?page=2").await.json()["view"].clone();
    assert_eq!(titles(&second), ["Item 1"]);
    assert_eq!(second["has_next"], false);
}

#[tokio::test]
async fn entries_carry_owner_details() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    app.add_item(alice.id, "Poster", Visibility::Public).await;
    let mut b = app.browser();

    let view = b.get("/").await.json()["view"].clone();
    let entry = &view["portfolios"][0];
    assert_eq!(entry["title"], "Poster");
    assert_eq!(entry["username"], "alice");
    assert_eq!(entry["full_name"], "Alice Smith");
}

#[tokio::test]
async fn private_items_never_reach_the_feed() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    app.add_item(alice.id, "Shown", Visibility::Public).await;
    app.add_item(alice.id, "Hidden", Visibility::Private).await;

    let mut anon = app.browser();
    assert_eq!(titles(&anon.get("/").await.json()["view"]), ["Shown"]);
    assert_eq!(
        titles(&anon.get("/?q=hidden").await.json()["view"]),
        Vec::<String>::new()
    );

    let mut owner = app.browser();
    owner.login("alice", false).await;
    assert_eq!(titles(&owner.get("/").await.json()["view"]), ["Shown"]);
}

#[tokio::test]
async fn search_matches_owner_names_case_insensitively() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "asmith").await;
    let bob = app.register("Bob Jones", "bjones").await;
    add(&app, alice.id, "Logo", "Design", "branding").await;
    add(&app, bob.id, "Crawler", "Code", "rust, tokio").await;
    let mut b = app.browser();

    assert_eq!(titles(&b.get("/?q=smith").await.json()["view"]), ["Logo"]);
    assert_eq!(titles(&b.get("/?q=ASM").await.json()["view"]), ["Logo"]);
    assert_eq!(titles(&b.get("/?q=TOKIO").await.json()["view"]), ["Crawler"]);
    assert_eq!(titles(&b.get("/?q=crawl").await.json()["view"]), ["Crawler"]);
    assert_eq!(titles(&b.get("/?q=%20%20").await.json()["view"]).len(), 2);
}

#[tokio::test]
async fn wildcards_in_queries_are_literal() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    add(&app, alice.id, "Sale 50% off", "Design", "").await;
    add(&app, alice.id, "Sale 500 off", "Design", "").await;
    let mut b = app.browser();

    let view = b.get("/?q=50%25").await.json()["view"].clone();
    assert_eq!(titles(&view), ["Sale 50% off"]);
    assert_eq!(view["q"], "50%");

    assert!(titles(&b.get("/?q=_").await.json()["view"]).is_empty());
}

#[tokio::test]
async fn category_filter_and_choices() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    add(&app, alice.id, "Logo", "Design", "").await;
    add(&app, alice.id, "Crawler", "Code", "").await;
    add(&app, alice.id, "Banner", "Design", "").await;
    app.services
        .items
        .create(
            alice.id,
            PortfolioDraft {
                title: "Secret".into(),
                category: Some("Hidden".into()),
                visibility: Visibility::Private,
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    let mut b = app.browser();

    let view = b.get("/?category=Design").await.json()["view"].clone();
    assert_eq!(titles(&view), ["Banner", "Logo"]);
    assert_eq!(view["category"], "Design");
    assert_eq!(view["categories"], serde_json::json!(["Code", "Design"]));

    let view = b.get("/?category=Design&q=logo").await.json()["view"].clone();
    assert_eq!(titles(&view), ["Logo"]);
}

#[tokio::test]
async fn junk_page_numbers_show_the_first_page() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    app.add_item(alice.id, "Poster", Visibility::Public).await;
    let mut b = app.browser();

    for uri in ["/?page=abc", "/?page=0", "/?page=-3"] {
        let r = b.get(uri).await;
        assert_eq!(r.status, StatusCode::OK, "{uri}");
        let view = r.json()["view"].clone();
        assert_eq!(view["page"], 1, "{uri}");
        assert_eq!(titles(&view), ["Poster"], "{uri}");
    }

    let far = b.get("/?page=40").await.json()["view"].clone();
    assert!(titles(&far).is_empty());
    assert_eq!(far["has_next"], false);

    for uri in ["/?page=2000000000000000000", "/?page=18446744073709551615"] {
        let r = b.get(uri).await;
        assert_eq!(r.status, StatusCode::OK, "{uri}");
        let view = r.json()["view"].clone();
        assert!(titles(&view).is_empty(), "{uri}");
        assert_eq!(view["has_next"], false, "{uri}");
    }
}

#[tokio::test]
async fn public_profile_lists_only_public_work() {
    let app = spawn_app().await;
    let alice = app.register("Alice Smith", "alice").await;
    app.add_item(alice.id, "Shown", Visibility::Public).await;
    app.add_item(alice.id, "Hidden", Visibility::Private).await;
    let mut b = app.browser();

    let r = b.get("/u/ALICE").await;
    assert_eq!(r.status, StatusCode::OK);
    let view = r.json()["view"].clone();
    assert_eq!(view["user"]["username"], "alice");
    assert!(view["user"].get("email").is_none());
    assert_eq!(titles(&view), ["Shown"]);

    assert_eq!(b.get("/u/nobody").await.status, StatusCode::NOT_FOUND);
}
