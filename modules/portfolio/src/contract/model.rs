use chrono::{DateTime, Utc};

/// Registered account. Username and email are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub profession: Option<String>,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Data for creating a new user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Raw registration form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Editable profile fields from the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin: Option<String>,
    pub github: Option<String>,
    pub profession: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    /// Anything other than `private` is public.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "private" => Visibility::Private,
            _ => Visibility::Public,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioItem {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub external_link: Option<String>,
    pub image: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for inserting a portfolio item; `created_at` doubles as `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPortfolioItem {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub external_link: Option<String>,
    pub image: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Portfolio form input shared by create and edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioDraft {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub external_link: Option<String>,
    pub visibility: Visibility,
}

/// Public item joined with its owner's display data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub item: PortfolioItem,
    pub username: String,
    pub full_name: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    /// Case-insensitive substring over username, full name, title and tags.
    pub query: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub page: u64,
    pub has_next: bool,
}

/// File received from a form, before it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub content: Vec<u8>,
}
