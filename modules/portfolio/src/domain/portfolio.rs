use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use crate::contract::model::{MediaUpload, NewPortfolioItem, PortfolioDraft, PortfolioItem};
use crate::domain::error::{DomainError, Issues, ValidationIssue};
use crate::domain::ports::MediaStore;
use crate::domain::repo::PortfolioRepository;

const RESOURCE: &str = "Portfolio item";

/// Create, edit and delete portfolio items, always scoped to the owner.
#[derive(Clone)]
pub struct PortfolioService {
    items: Arc<dyn PortfolioRepository>,
    media: Arc<dyn MediaStore>,
}

impl PortfolioService {
    pub fn new(items: Arc<dyn PortfolioRepository>, media: Arc<dyn MediaStore>) -> Self {
        Self { items, media }
    }

    #[instrument(name = "portfolio.items.create", skip(self, draft, image))]
    pub async fn create(
        &self,
        owner: i64,
        draft: PortfolioDraft,
        image: Option<MediaUpload>,
    ) -> Result<PortfolioItem, DomainError> {
        self.validate(&draft, image.as_ref())?;
        let image = self.store_image(image.as_ref()).await?;

        let item = self
            .items
            .insert(NewPortfolioItem {
                user_id: owner,
                title: draft.title.trim().to_string(),
                description: draft.description,
                category: draft.category,
                tags: draft.tags,
                external_link: draft.external_link,
                image,
                visibility: draft.visibility,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        info!(item_id = item.id, "Created portfolio item");
        Ok(item)
    }

    #[instrument(name = "portfolio.items.get_owned", skip(self))]
    pub async fn get_owned(&self, owner: i64, id: i64) -> Result<PortfolioItem, DomainError> {
        self.items
            .find_owned(id, owner)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::not_found(RESOURCE))
    }

    /// Replace all fields. The image changes only when a new one is given.
    #[instrument(name = "portfolio.items.update", skip(self, draft, image))]
    pub async fn update(
        &self,
        owner: i64,
        id: i64,
        draft: PortfolioDraft,
        image: Option<MediaUpload>,
    ) -> Result<PortfolioItem, DomainError> {
        let current = self.get_owned(owner, id).await?;
        self.validate(&draft, image.as_ref())?;
        let new_image = self.store_image(image.as_ref()).await?;

        let item = PortfolioItem {
            title: draft.title.trim().to_string(),
            description: draft.description,
            category: draft.category,
            tags: draft.tags,
            external_link: draft.external_link,
            image: new_image.or(current.image),
            visibility: draft.visibility,
            updated_at: Utc::now(),
            ..current
        };

        let updated = self
            .items
            .update_owned(&item)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !updated {
            return Err(DomainError::not_found(RESOURCE));
        }

        info!(item_id = id, "Updated portfolio item");
        Ok(item)
    }

    /// Hard delete. The stored image file is left in place.
    #[instrument(name = "portfolio.items.delete", skip(self))]
    pub async fn delete(&self, owner: i64, id: i64) -> Result<(), DomainError> {
        let deleted = self
            .items
            .delete_owned(id, owner)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        if !deleted {
            debug!("Nothing to delete");
            return Err(DomainError::not_found(RESOURCE));
        }
        info!(item_id = id, "Deleted portfolio item");
        Ok(())
    }

    fn validate(
        &self,
        draft: &PortfolioDraft,
        image: Option<&MediaUpload>,
    ) -> Result<(), DomainError> {
        let mut issues = Issues::default();
        issues.check(!draft.title.trim().is_empty(), ValidationIssue::TitleRequired);
        if let Some(image) = image {
            issues.check(
                self.media.accepts(&image.file_name),
                ValidationIssue::ImageNotImage,
            );
        }
        issues.finish()
    }

    async fn store_image(&self, image: Option<&MediaUpload>) -> Result<Option<String>, DomainError> {
        match image {
            Some(upload) => self
                .media
                .save(upload)
                .await
                .map_err(|e| DomainError::storage(e.to_string())),
            None => Ok(None),
        }
    }
}
