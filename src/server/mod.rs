//! Server module for building the admin HTTP server
//!
//! This module provides a `ServerBuilder` that registers:
//! - list, show, create, update and delete routes for every configured entity
//! - health routes for liveness checks

pub mod builder;
pub mod entity_registry;
pub mod exposure;
pub mod handlers;

pub use builder::ServerBuilder;
pub use entity_registry::{EntityDescriptor, EntityRegistry};
pub use exposure::RestExposure;
pub use handlers::{EntityRoutes, TOTAL_COUNT_HEADER, TOTAL_PAGES_HEADER};
