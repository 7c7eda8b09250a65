/*
 * Responsibility
 * - HTTP surface (routes() の re-export など)
 */
pub mod dto;
pub mod extractors;
pub mod handlers;
pub mod permissions;
mod routes;

pub use routes::routes;
