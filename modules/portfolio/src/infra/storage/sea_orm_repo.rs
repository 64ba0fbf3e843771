//! SeaORM-backed repository implementations for the domain ports.
//!
//! Both structs are generic over `C: ConnectionTrait`, so they work with a
//! `DatabaseConnection` or a transaction.

use anyhow::Context;
use sea_orm::sea_query::{Expr, Func, IntoColumnRef, LikeExpr, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, NotSet,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

use crate::contract::model::{
    FeedEntry, FeedFilter, NewPortfolioItem, NewUser, PortfolioItem, User, Visibility,
};
use crate::domain::repo::{PortfolioRepository, UsersRepository};
use crate::infra::storage::entity::portfolio_item::{
    ActiveModel as ItemAM, Column as ItemCol, Entity as ItemEntity,
};
use crate::infra::storage::entity::user::{
    ActiveModel as UserAM, Column as UserCol, Entity as UserEntity,
};
use crate::infra::storage::mapper;

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE.
fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn lower_like(col: impl IntoColumnRef, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(col))).like(LikeExpr::new(pattern).escape('\\'))
}

pub struct SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> UsersRepository for SeaOrmUsersRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("find_by_id failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(UserCol::Username.eq(username))
            .one(&self.conn)
            .await
            .context("find_by_username failed")?;
        Ok(found.map(Into::into))
    }

    async fn find_by_login(&self, identifier: &str) -> anyhow::Result<Option<User>> {
        let found = UserEntity::find()
            .filter(
                Condition::any()
                    .add(UserCol::Username.eq(identifier))
                    .add(UserCol::Email.eq(identifier)),
            )
            .one(&self.conn)
            .await
            .context("find_by_login failed")?;
        Ok(found.map(Into::into))
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(UserCol::Username.eq(username))
            .count(&self.conn)
            .await
            .context("username_exists failed")?;
        Ok(count > 0)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let count = UserEntity::find()
            .filter(UserCol::Email.eq(email))
            .count(&self.conn)
            .await
            .context("email_exists failed")?;
        Ok(count > 0)
    }

    async fn insert(&self, u: NewUser) -> anyhow::Result<User> {
        let m = UserAM {
            id: NotSet,
            full_name: Set(u.full_name),
            username: Set(u.username),
            email: Set(u.email),
            password_hash: Set(u.password_hash),
            bio: Set(None),
            location: Set(None),
            website: Set(None),
            linkedin: Set(None),
            github: Set(None),
            profession: Set(None),
            avatar_filename: Set(None),
            created_at: Set(u.created_at),
        };
        let saved = m.insert(&self.conn).await.context("insert user failed")?;
        Ok(saved.into())
    }

    async fn update_profile(&self, u: &User) -> anyhow::Result<()> {
        let m = UserAM {
            id: Set(u.id),
            full_name: Set(u.full_name.clone()),
            bio: Set(u.bio.clone()),
            location: Set(u.location.clone()),
            website: Set(u.website.clone()),
            linkedin: Set(u.linkedin.clone()),
            github: Set(u.github.clone()),
            profession: Set(u.profession.clone()),
            avatar_filename: Set(u.avatar.clone()),
            ..Default::default()
        };
        let _ = m.update(&self.conn).await.context("update_profile failed")?;
        Ok(())
    }
}

pub struct SeaOrmPortfolioRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    conn: C,
}

impl<C> SeaOrmPortfolioRepository<C>
where
    C: ConnectionTrait + Send + Sync,
{
    pub fn new(conn: C) -> Self {
        Self { conn }
    }
}

#[async_trait::async_trait]
impl<C> PortfolioRepository for SeaOrmPortfolioRepository<C>
where
    C: ConnectionTrait + Send + Sync + 'static,
{
    async fn insert(&self, n: NewPortfolioItem) -> anyhow::Result<PortfolioItem> {
        let m = ItemAM {
            id: NotSet,
            user_id: Set(n.user_id),
            title: Set(n.title),
            description: Set(n.description),
            category: Set(n.category),
            tags: Set(n.tags),
            external_link: Set(n.external_link),
            image_filename: Set(n.image),
            visibility: Set(n.visibility.as_str().to_string()),
            created_at: Set(n.created_at),
            updated_at: Set(n.created_at),
        };
        let saved = m.insert(&self.conn).await.context("insert item failed")?;
        Ok(saved.into())
    }

    async fn find_owned(&self, id: i64, owner: i64) -> anyhow::Result<Option<PortfolioItem>> {
        let found = ItemEntity::find()
            .filter(ItemCol::Id.eq(id))
            .filter(ItemCol::UserId.eq(owner))
            .one(&self.conn)
            .await
            .context("find_owned failed")?;
        Ok(found.map(Into::into))
    }

    async fn update_owned(&self, item: &PortfolioItem) -> anyhow::Result<bool> {
        let m = ItemAM {
            title: Set(item.title.clone()),
            description: Set(item.description.clone()),
            category: Set(item.category.clone()),
            tags: Set(item.tags.clone()),
            external_link: Set(item.external_link.clone()),
            image_filename: Set(item.image.clone()),
            visibility: Set(item.visibility.as_str().to_string()),
            updated_at: Set(item.updated_at),
            ..Default::default()
        };
        let res = ItemEntity::update_many()
            .set(m)
            .filter(ItemCol::Id.eq(item.id))
            .filter(ItemCol::UserId.eq(item.user_id))
            .exec(&self.conn)
            .await
            .context("update_owned failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn delete_owned(&self, id: i64, owner: i64) -> anyhow::Result<bool> {
        let res = ItemEntity::delete_many()
            .filter(ItemCol::Id.eq(id))
            .filter(ItemCol::UserId.eq(owner))
            .exec(&self.conn)
            .await
            .context("delete_owned failed")?;
        Ok(res.rows_affected > 0)
    }

    async fn list_by_owner(
        &self,
        owner: i64,
        public_only: bool,
    ) -> anyhow::Result<Vec<PortfolioItem>> {
        let mut query = ItemEntity::find().filter(ItemCol::UserId.eq(owner));
        if public_only {
            query = query.filter(ItemCol::Visibility.eq(Visibility::Public.as_str()));
        }
        let rows = query
            .order_by_desc(ItemCol::CreatedAt)
            .order_by_desc(ItemCol::Id)
            .all(&self.conn)
            .await
            .context("list_by_owner failed")?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn search_public(
        &self,
        filter: &FeedFilter,
        limit: u64,
        offset: u64,
    ) -> anyhow::Result<Vec<FeedEntry>> {
        let mut query = ItemEntity::find()
            .find_also_related(UserEntity)
            .filter(ItemCol::Visibility.eq(Visibility::Public.as_str()));

        if let Some(q) = filter.query.as_deref() {
            let pattern = format!("%{}%", like_escape(&q.to_lowercase()));
            query = query.filter(
                Condition::any()
                    .add(lower_like((UserEntity, UserCol::Username), &pattern))
                    .add(lower_like((UserEntity, UserCol::FullName), &pattern))
                    .add(lower_like((ItemEntity, ItemCol::Title), &pattern))
                    .add(lower_like((ItemEntity, ItemCol::Tags), &pattern)),
            );
        }
        if let Some(category) = filter.category.as_deref() {
            query = query.filter(ItemCol::Category.eq(category));
        }

        let rows = query
            .order_by_desc(ItemCol::CreatedAt)
            .order_by_desc(ItemCol::Id)
            .limit(limit)
            .offset(offset)
            .all(&self.conn)
            .await
            .context("search_public failed")?;

        Ok(rows
            .into_iter()
            .filter_map(|(item, owner)| mapper::feed_entry(item, owner))
            .collect())
    }

    async fn public_categories(&self) -> anyhow::Result<Vec<String>> {
        let categories = ItemEntity::find()
            .select_only()
            .column(ItemCol::Category)
            .distinct()
            .filter(ItemCol::Visibility.eq(Visibility::Public.as_str()))
            .filter(ItemCol::Category.is_not_null())
            .filter(ItemCol::Category.ne(""))
            .order_by_asc(ItemCol::Category)
            .into_tuple::<String>()
            .all(&self.conn)
            .await
            .context("public_categories failed")?;
        Ok(categories)
    }
}
