//! Registry of the entities exposed by the server
//!
//! Each descriptor owns one URL segment (its plural). Two descriptors for
//! the same entity type or the same plural would produce overlapping axum
//! routes, so the registry refuses the second one instead of letting the
//! router merge panic at build time.

use crate::core::error::ConfigError;
use axum::Router;
use std::collections::BTreeMap;

/// Routes of one entity under `/{plural}`
///
/// [`EntityRoutes`](super::handlers::EntityRoutes) implements it for any
/// writable source; implement it directly for hand-written endpoints.
pub trait EntityDescriptor: Send + Sync {
    /// Singular name, also the registry key (e.g., "system_requirement")
    fn entity_type(&self) -> &str;

    /// URL segment (e.g., "system_requirements")
    fn plural(&self) -> &str;

    fn build_routes(&self) -> Router;
}

#[derive(Default)]
pub struct EntityRegistry {
    descriptors: BTreeMap<String, Box<dyn EntityDescriptor>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a descriptor whose entity type and plural are both unclaimed
    pub fn register(&mut self, descriptor: Box<dyn EntityDescriptor>) -> Result<(), ConfigError> {
        let taken = self.descriptors.values().find(|existing| {
            existing.entity_type() == descriptor.entity_type()
                || existing.plural() == descriptor.plural()
        });
        if let Some(existing) = taken {
            return Err(ConfigError::DuplicateEntity {
                name: existing.entity_type().to_string(),
            });
        }

        tracing::debug!(
            entity = descriptor.entity_type(),
            plural = descriptor.plural(),
            "entity registered"
        );
        self.descriptors
            .insert(descriptor.entity_type().to_string(), descriptor);
        Ok(())
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.descriptors.contains_key(entity_type)
    }

    /// Routes of every descriptor merged into one router
    pub fn build_routes(&self) -> Router {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Registered entity types, sorted
    pub fn entity_types(&self) -> Vec<&str> {
        self.descriptors.keys().map(String::as_str).collect()
    }
}
