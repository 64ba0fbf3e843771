use std::sync::Arc;

use tracing::{info, instrument};

use crate::contract::model::{MediaUpload, PortfolioItem, ProfileUpdate, User};
use crate::domain::error::{DomainError, Issues, ValidationIssue};
use crate::domain::ports::MediaStore;
use crate::domain::repo::{PortfolioRepository, UsersRepository};

/// Own profile, public profiles and the settings form.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UsersRepository>,
    items: Arc<dyn PortfolioRepository>,
    media: Arc<dyn MediaStore>,
}

impl ProfileService {
    pub fn new(
        users: Arc<dyn UsersRepository>,
        items: Arc<dyn PortfolioRepository>,
        media: Arc<dyn MediaStore>,
    ) -> Self {
        Self {
            users,
            items,
            media,
        }
    }

    /// Every item of `user`, private ones included.
    #[instrument(name = "portfolio.profile.own", skip(self, user), fields(user_id = user.id))]
    pub async fn own_profile(&self, user: &User) -> Result<Vec<PortfolioItem>, DomainError> {
        self.items
            .list_by_owner(user.id, false)
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }

    #[instrument(name = "portfolio.profile.public", skip(self))]
    pub async fn public_profile(
        &self,
        username: &str,
    ) -> Result<(User, Vec<PortfolioItem>), DomainError> {
        let user = self
            .users
            .find_by_username(&username.to_lowercase())
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::not_found("User"))?;
        let items = self
            .items
            .list_by_owner(user.id, true)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        Ok((user, items))
    }

    /// Replace the profile fields; the avatar changes only when a new one is
    /// given.
    #[instrument(name = "portfolio.profile.update_settings", skip_all, fields(user_id = user.id))]
    pub async fn update_settings(
        &self,
        user: User,
        update: ProfileUpdate,
        avatar: Option<MediaUpload>,
    ) -> Result<User, DomainError> {
        let mut issues = Issues::default();
        issues.check(
            !update.full_name.trim().is_empty(),
            ValidationIssue::FullNameRequired,
        );
        if let Some(avatar) = avatar.as_ref() {
            issues.check(
                self.media.accepts(&avatar.file_name),
                ValidationIssue::AvatarNotImage,
            );
        }
        issues.finish()?;

        let new_avatar = match avatar.as_ref() {
            Some(upload) => self
                .media
                .save(upload)
                .await
                .map_err(|e| DomainError::storage(e.to_string()))?,
            None => None,
        };

        let user = User {
            full_name: update.full_name.trim().to_string(),
            bio: update.bio,
            location: update.location,
            website: update.website,
            linkedin: update.linkedin,
            github: update.github,
            profession: update.profession,
            avatar: new_avatar.or(user.avatar),
            ..user
        };
        self.users
            .update_profile(&user)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!("Profile updated");
        Ok(user)
    }
}
