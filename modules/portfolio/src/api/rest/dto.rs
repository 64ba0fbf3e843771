use chrono::{DateTime, Utc};
use hubkit::FormData;
use serde::{Deserialize, Serialize};

use crate::contract::model::{
    FeedEntry, FeedPage, MediaUpload, PortfolioDraft, PortfolioItem, ProfileUpdate, Registration,
    User, Visibility,
};

pub const UPLOADS_PREFIX: &str = "/uploads";

fn upload_url(name: &Option<String>) -> Option<String> {
    name.as_ref().map(|n| format!("{UPLOADS_PREFIX}/{n}"))
}

/// The signed-in user as shown to themselves.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub profession: Option<String>,
    pub avatar: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            bio: u.bio.clone(),
            location: u.location.clone(),
            website: u.website.clone(),
            linkedin: u.linkedin.clone(),
            github: u.github.clone(),
            profession: u.profession.clone(),
            avatar: u.avatar.clone(),
            avatar_url: upload_url(&u.avatar),
            created_at: u.created_at,
        }
    }
}

/// Another user's profile; no email.
#[derive(Debug, Clone, Serialize)]
pub struct PublicUserDto {
    pub username: String,
    pub full_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub profession: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&User> for PublicUserDto {
    fn from(u: &User) -> Self {
        Self {
            username: u.username.clone(),
            full_name: u.full_name.clone(),
            bio: u.bio.clone(),
            location: u.location.clone(),
            website: u.website.clone(),
            linkedin: u.linkedin.clone(),
            github: u.github.clone(),
            profession: u.profession.clone(),
            avatar_url: upload_url(&u.avatar),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioItemDto {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub external_link: Option<String>,
    pub image: Option<String>,
    pub image_url: Option<String>,
    pub visibility: &'static str,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&PortfolioItem> for PortfolioItemDto {
    fn from(p: &PortfolioItem) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            title: p.title.clone(),
            description: p.description.clone(),
            category: p.category.clone(),
            tags: p.tags.clone(),
            external_link: p.external_link.clone(),
            image: p.image.clone(),
            image_url: upload_url(&p.image),
            visibility: p.visibility.as_str(),
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

pub fn items_dto(items: &[PortfolioItem]) -> Vec<PortfolioItemDto> {
    items.iter().map(PortfolioItemDto::from).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedEntryDto {
    #[serde(flatten)]
    pub item: PortfolioItemDto,
    pub username: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
}

impl From<&FeedEntry> for FeedEntryDto {
    fn from(e: &FeedEntry) -> Self {
        Self {
            item: PortfolioItemDto::from(&e.item),
            username: e.username.clone(),
            full_name: e.full_name.clone(),
            avatar_url: upload_url(&e.avatar),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    /// Kept as text; anything that is not a positive number means page 1.
    pub page: Option<String>,
}

impl FeedQuery {
    pub fn page_number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedView {
    pub portfolios: Vec<FeedEntryDto>,
    pub q: String,
    pub category: String,
    pub categories: Vec<String>,
    pub page: u64,
    pub has_next: bool,
}

impl FeedView {
    pub fn new(page: &FeedPage, q: String, category: String, categories: Vec<String>) -> Self {
        Self {
            portfolios: page.entries.iter().map(FeedEntryDto::from).collect(),
            q,
            category,
            categories,
            page: page.page,
            has_next: page.has_next,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Registration form echo; passwords are never sent back.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegisterView {
    pub full_name: String,
    pub username: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginView {
    pub username: String,
    pub next: Option<String>,
}

/// Entered portfolio fields, echoed on a failed submit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PortfolioFormDto {
    pub title: String,
    pub description: String,
    pub category: String,
    pub tags: String,
    pub external_link: String,
    pub visibility: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioFormView {
    /// Stored item when editing.
    pub portfolio: Option<PortfolioItemDto>,
    pub form: Option<PortfolioFormDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub user: UserDto,
    pub portfolios: Vec<PortfolioItemDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublicProfileView {
    pub user: PublicUserDto,
    pub portfolios: Vec<PortfolioItemDto>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SettingsView {
    pub user: UserDto,
}

pub fn registration(form: &FormData) -> Registration {
    Registration {
        full_name: form.text("full_name").to_string(),
        username: form.text("username").to_string(),
        email: form.text("email").to_string(),
        password: form.text("password").to_string(),
        confirm_password: form.text("confirm_password").to_string(),
    }
}

pub fn register_echo(form: &FormData) -> RegisterView {
    RegisterView {
        full_name: form.trimmed("full_name"),
        username: form.trimmed("username"),
        email: form.trimmed("email"),
    }
}

pub fn portfolio_draft(form: &FormData) -> PortfolioDraft {
    PortfolioDraft {
        title: form.trimmed("title"),
        description: form.optional("description"),
        category: form.optional("category"),
        tags: form.optional("tags"),
        external_link: form.optional("external_link"),
        visibility: Visibility::parse(form.text("visibility")),
    }
}

pub fn portfolio_echo(draft: &PortfolioDraft) -> PortfolioFormDto {
    let text = |v: &Option<String>| v.clone().unwrap_or_default();
    PortfolioFormDto {
        title: draft.title.clone(),
        description: text(&draft.description),
        category: text(&draft.category),
        tags: text(&draft.tags),
        external_link: text(&draft.external_link),
        visibility: draft.visibility.as_str(),
    }
}

pub fn profile_update(form: &FormData) -> ProfileUpdate {
    ProfileUpdate {
        full_name: form.trimmed("full_name"),
        bio: form.optional("bio"),
        location: form.optional("location"),
        website: form.optional("website"),
        linkedin: form.optional("linkedin"),
        github: form.optional("github"),
        profession: form.optional("profession"),
    }
}

/// File part `name`, if the browser actually sent a file.
pub fn upload(form: &FormData, name: &str) -> Option<MediaUpload> {
    form.file(name).map(|f| MediaUpload {
        file_name: f.file_name.clone(),
        content: f.bytes.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_number_defaults_to_one() {
        let q = |p: Option<&str>| FeedQuery {
            page: p.map(String::from),
            ..Default::default()
        };
        assert_eq!(q(None).page_number(), 1);
        assert_eq!(q(Some("abc")).page_number(), 1);
        assert_eq!(q(Some("0")).page_number(), 1);
        assert_eq!(q(Some("-2")).page_number(), 1);
        assert_eq!(q(Some("3")).page_number(), 3);
    }

    #[test]
    fn draft_coerces_visibility_and_blank_fields() {
        let form = FormData::from_urlencoded(b"title=+Logo+&visibility=secret&tags=&category=Design");
        let draft = portfolio_draft(&form);
        assert_eq!(draft.title, "Logo");
        assert_eq!(draft.visibility, Visibility::Public);
        assert_eq!(draft.tags, None);
        assert_eq!(draft.category.as_deref(), Some("Design"));

        let form = FormData::from_urlencoded(b"title=x&visibility=private");
        assert_eq!(portfolio_draft(&form).visibility, Visibility::Private);
    }

    #[test]
    fn register_echo_drops_passwords() {
        let form = FormData::from_urlencoded(b"full_name=Ann&username=+ann+&password=secret1");
        let echo = serde_json::to_value(register_echo(&form)).unwrap();
        assert_eq!(echo["username"], "ann");
        assert!(echo.get("password").is_none());
    }
}
