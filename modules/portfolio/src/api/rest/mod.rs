pub mod dto;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod routes;
pub mod views;
