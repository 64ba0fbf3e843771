pub mod auth;
pub mod feed;
pub mod lang;
pub mod portfolio;
pub mod profile;
