//! PortfoHub application module: accounts, portfolio items, the public feed
//! and profiles.

// === PUBLIC CONTRACT ===
pub mod contract;

pub use contract::model;

// === MODULE DEFINITION ===
pub mod module;
pub use module::{PortfolioModule, Services};

// === INTERNAL MODULES ===
// Exposed for integration tests; other crates should only need `contract`
// and `module`.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod i18n;
#[doc(hidden)]
pub mod infra;

pub use config::PortfolioConfig;
