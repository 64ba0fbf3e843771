pub mod auth;
pub mod error;
pub mod feed;
pub mod portfolio;
pub mod ports;
pub mod profile;
pub mod repo;

pub use auth::AuthService;
pub use error::{DomainError, ValidationIssue};
pub use feed::FeedService;
pub use portfolio::PortfolioService;
pub use profile::ProfileService;
