//! Service layer for business logic
//!
//! Handlers in `api` stay thin and delegate to the services here.

mod conversion_service;
mod link_service;
mod stats_service;

pub use conversion_service::*;
pub use link_service::*;
pub use stats_service::*;
