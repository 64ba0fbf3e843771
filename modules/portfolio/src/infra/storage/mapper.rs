use crate::contract::model::{FeedEntry, PortfolioItem, User, Visibility};
use crate::infra::storage::entity::{portfolio_item, user};

impl From<user::Model> for User {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id,
            full_name: m.full_name,
            username: m.username,
            email: m.email,
            password_hash: m.password_hash,
            bio: m.bio,
            location: m.location,
            website: m.website,
            linkedin: m.linkedin,
            github: m.github,
            profession: m.profession,
            avatar: m.avatar_filename,
            created_at: m.created_at,
        }
    }
}

impl From<portfolio_item::Model> for PortfolioItem {
    fn from(m: portfolio_item::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            title: m.title,
            description: m.description,
            category: m.category,
            tags: m.tags,
            external_link: m.external_link,
            image: m.image_filename,
            visibility: Visibility::parse(&m.visibility),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Join row to feed entry. `None` when the owner row is missing, which the
/// foreign key rules out.
pub fn feed_entry(item: portfolio_item::Model, owner: Option<user::Model>) -> Option<FeedEntry> {
    let owner = owner?;
    Some(FeedEntry {
        item: item.into(),
        username: owner.username,
        full_name: owner.full_name,
        avatar: owner.avatar_filename,
    })
}
