use std::sync::Arc;

use tracing::{debug, instrument};

use crate::contract::model::{FeedFilter, FeedPage};
use crate::domain::error::DomainError;
use crate::domain::repo::PortfolioRepository;

/// Public feed: search, category filter and pagination.
#[derive(Clone)]
pub struct FeedService {
    items: Arc<dyn PortfolioRepository>,
    page_size: u64,
}

impl FeedService {
    pub fn new(items: Arc<dyn PortfolioRepository>, page_size: u64) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
        }
    }

    /// One page of public items. Fetches a single extra row to learn whether
    /// a next page exists instead of counting.
    #[instrument(name = "portfolio.feed.list_public", skip(self, filter))]
    pub async fn list_public(&self, filter: FeedFilter, page: u64) -> Result<FeedPage, DomainError> {
        let page = page.max(1);
        let filter = FeedFilter {
            query: non_blank(filter.query),
            category: non_blank(filter.category),
        };
        let limit = self.page_size.saturating_add(1);
        let Some(offset) = page_window(page, self.page_size, limit) else {
            debug!(page, "Feed page beyond addressable range");
            return Ok(FeedPage {
                entries: Vec::new(),
                page,
                has_next: false,
            });
        };

        let mut entries = self
            .items
            .search_public(&filter, limit, offset)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;

        let has_next = entries.len() as u64 > self.page_size;
        entries.truncate(self.page_size as usize);
        debug!(count = entries.len(), has_next, "Feed page loaded");

        Ok(FeedPage {
            entries,
            page,
            has_next,
        })
    }

    #[instrument(name = "portfolio.feed.categories", skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, DomainError> {
        self.items
            .public_categories()
            .await
            .map_err(|e| DomainError::database(e.to_string()))
    }
}

/// Row offset of `page`, or `None` when `offset + limit` does not fit the
/// signed 64-bit range the database binds.
fn page_window(page: u64, page_size: u64, limit: u64) -> Option<u64> {
    let offset = (page - 1).checked_mul(page_size)?;
    let end = offset.checked_add(limit)?;
    (end <= i64::MAX as u64).then_some(offset)
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}
