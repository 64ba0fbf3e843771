use async_trait::async_trait;

use crate::contract::model::{
    FeedEntry, FeedFilter, NewPortfolioItem, NewUser, PortfolioItem, User,
};

/// Port for the domain layer: user persistence.
/// Object-safe and async-friendly via `async_trait`.
#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>>;
    /// Match `identifier` against username OR email.
    async fn find_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn insert(&self, new_user: NewUser) -> anyhow::Result<User>;
    /// Persist profile fields and avatar of `user` (by primary key).
    async fn update_profile(&self, user: &User) -> anyhow::Result<()>;
}

/// Port for the domain layer: portfolio item persistence.
///
/// Every mutating method is scoped by owner; a row owned by someone else
/// behaves exactly like a missing one.
#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    async fn insert(&self, new_item: NewPortfolioItem) -> anyhow::Result<PortfolioItem>;
    async fn find_owned(&self, id: i64, owner: i64) -> anyhow::Result<Option<PortfolioItem>>;
    /// Returns false when no row matched `(item.id, item.user_id)`.
    async fn update_owned(&self, item: &PortfolioItem) -> anyhow::Result<bool>;
    /// Returns false when no row matched `(id, owner)`.
    async fn delete_owned(&self, id: i64, owner: i64) -> anyhow::Result<bool>;
    /// Items of `owner`, newest first.
    async fn list_by_owner(&self, owner: i64, public_only: bool)
        -> anyhow::Result<Vec<PortfolioItem>>;
    /// Public items matching `filter`, newest first, ties by id.
    async fn search_public(
        &self,
        filter: &FeedFilter,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<FeedEntry>>;
    /// Sorted distinct non-empty categories of public items.
    async fn public_categories(&self) -> anyhow::Result<Vec<String>>;
}
