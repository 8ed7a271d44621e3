//! ServerBuilder for fluent API to build HTTP servers

use super::entity_registry::{EntityDescriptor, EntityRegistry};
use super::exposure::RestExposure;
use super::handlers::EntityRoutes;
use crate::config::{AdminConfig, EntityQueryConfig};
use crate::core::collection::{DependentRecords, SourceRecord, WritableSource};
use crate::core::entity::Entity;
use crate::core::error::EntityError;
use anyhow::Result;
use axum::Router;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tokio::net::TcpListener;

/// Builder for creating the admin HTTP server
///
/// The configuration decides which attributes each entity may be searched
/// and ordered by, so [`with_config`](Self::with_config) and
/// [`restrict_delete`](Self::restrict_delete) have to come before the
/// [`register`](Self::register) calls they apply to.
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_config(AdminConfig::from_yaml_file("config/admin.yaml")?)
///     .restrict_delete(
///         "system_requirements",
///         ForeignKey::new("games", "system_requirement_id", games.clone()),
///     )?
///     .register("system_requirements", requirements)?
///     .register("games", games)?
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AdminConfig,
    entity_registry: EntityRegistry,
    dependents: HashMap<String, Vec<Box<dyn DependentRecords>>>,
    custom_routes: Vec<Router>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder using [`AdminConfig::default_config`]
    pub fn new() -> Self {
        Self {
            config: AdminConfig::default_config(),
            entity_registry: EntityRegistry::new(),
            dependents: HashMap::new(),
            custom_routes: Vec::new(),
        }
    }

    /// Replace the configuration used by subsequent registrations
    pub fn with_config(mut self, config: AdminConfig) -> Self {
        self.config = config;
        self
    }

    /// Add custom routes to the server
    ///
    /// Use this for endpoints that don't fit the per-entity pattern.
    pub fn with_custom_routes(mut self, routes: Router) -> Self {
        self.custom_routes.push(routes);
        self
    }

    /// Expose `source` under the entity configured as `name`
    ///
    /// `name` may be the singular or the plural form. Fails when the
    /// configuration does not know the entity, when its allow-lists name
    /// attributes the record type does not have, or when the entity is
    /// already registered.
    pub fn register<S>(mut self, name: &str, source: S) -> Result<Self>
    where
        S: WritableSource,
        SourceRecord<S>: Entity + Serialize + DeserializeOwned,
    {
        let entity = self.configured(name)?;
        entity.ensure_attributes::<SourceRecord<S>>()?;

        tracing::debug!(
            entity = %entity.singular,
            searchable = ?entity.searchable,
            sortable = ?entity.sortable,
            "registering entity"
        );

        let dependents = self.dependents.remove(&entity.singular).unwrap_or_default();
        let routes = EntityRoutes::new(source, entity, self.config.pagination)
            .with_dependents(dependents);
        self.entity_registry.register(Box::new(routes))?;
        Ok(self)
    }

    /// Refuse to delete records of `name` while `dependents` reference them
    ///
    /// Deletes answer `422` with a `base` error instead.
    pub fn restrict_delete(
        mut self,
        name: &str,
        dependents: impl DependentRecords + 'static,
    ) -> Result<Self> {
        let entity = self.configured(name)?;
        if self.entity_registry.contains(&entity.singular) {
            anyhow::bail!(
                "{} is already registered, restrict its deletes before registering it",
                entity.singular
            );
        }

        self.dependents
            .entry(entity.singular)
            .or_default()
            .push(Box::new(dependents));
        Ok(self)
    }

    /// Register a hand-written descriptor
    pub fn register_descriptor(mut self, descriptor: impl EntityDescriptor + 'static) -> Result<Self> {
        self.entity_registry.register(Box::new(descriptor))?;
        Ok(self)
    }

    fn configured(&self, name: &str) -> Result<EntityQueryConfig, EntityError> {
        self.config
            .entity(name)
            .cloned()
            .ok_or_else(|| EntityError::UnknownType {
                entity_type: name.to_string(),
            })
    }

    /// Build the final REST router
    pub fn build(self) -> Result<Router> {
        if self.entity_registry.entity_types().is_empty() {
            tracing::warn!("building a server without any registered entity");
        }
        for entity in self.dependents.keys() {
            tracing::warn!(entity = %entity, "delete restriction on an entity that was never registered");
        }

        Ok(RestExposure::build_router(
            &self.entity_registry,
            self.custom_routes,
        ))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to the provided address
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    ///
    /// # Example
    ///
    /// ```ignore
    /// ServerBuilder::new()
    ///     .register("users", users)?
    ///     .serve("127.0.0.1:3000").await?;
    /// ```
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::collection::ForeignKey;
    use crate::core::error::ConfigError;
    use crate::entities::{Coupon, Game, Product, SystemRequirement};
    use crate::storage::InMemoryStore;

    #[test]
    fn test_new_uses_default_config() {
        let builder = ServerBuilder::new();
        assert_eq!(builder.config, AdminConfig::default_config());
        assert!(builder.entity_registry.entity_types().is_empty());
    }

    #[test]
    fn test_register_by_singular_or_plural() {
        let builder = ServerBuilder::new()
            .register("products", InMemoryStore::<Product>::new())
            .unwrap()
            .register("coupon", InMemoryStore::<Coupon>::new())
            .unwrap();

        assert_eq!(
            builder.entity_registry.entity_types(),
            vec!["coupon", "product"]
        );
    }

    #[test]
    fn test_register_twice_fails() {
        let result = ServerBuilder::new()
            .register("products", InMemoryStore::<Product>::new())
            .unwrap()
            .register("product", InMemoryStore::<Product>::new());

        let err = result.err().expect("product is already registered");
        assert!(err.to_string().contains("configured more than once"));
    }

    #[test]
    fn test_register_rejects_unknown_allow_listed_attribute() {
        let config = AdminConfig {
            entities: vec![EntityQueryConfig::new(
                "product",
                "products",
                &["nmae"],
                &["price"],
            )],
            ..AdminConfig::default_config()
        };

        let result = ServerBuilder::new()
            .with_config(config)
            .register("products", InMemoryStore::<Product>::new());

        let err = result.err().expect("nmae is not a product attribute");
        let config_err = err.downcast_ref::<ConfigError>().expect("config error");
        assert!(matches!(
            config_err,
            ConfigError::InvalidAttribute { attribute, .. } if attribute == "nmae"
        ));
    }

    #[test]
    fn test_restrict_delete_after_register_fails() {
        let games = InMemoryStore::<Game>::new();

        let result = ServerBuilder::new()
            .register("system_requirements", InMemoryStore::<SystemRequirement>::new())
            .unwrap()
            .restrict_delete(
                "system_requirements",
                ForeignKey::new("games", "system_requirement_id", games),
            );

        assert!(result.is_err());
    }

    #[test]
    fn test_restrict_delete_is_consumed_by_register() {
        let games = InMemoryStore::<Game>::new();

        let builder = ServerBuilder::new()
            .restrict_delete(
                "system_requirement",
                ForeignKey::new("games", "system_requirement_id", games),
            )
            .unwrap()
            .register("system_requirements", InMemoryStore::<SystemRequirement>::new())
            .unwrap();

        assert!(builder.dependents.is_empty());
    }

    #[test]
    fn test_register_unknown_entity_fails() {
        let config = AdminConfig {
            entities: vec![EntityQueryConfig::new("coupon", "coupons", &[], &[])],
            ..AdminConfig::default_config()
        };

        let result = ServerBuilder::new()
            .with_config(config)
            .register("products", InMemoryStore::<Product>::new());

        let err = result.err().expect("products is not configured");
        assert!(err.to_string().contains("Unknown entity type: products"));
    }

    #[test]
    fn test_build_without_entities() {
        assert!(ServerBuilder::default().build().is_ok());
    }

    #[test]
    fn test_build_with_custom_routes() {
        use axum::routing::get;

        let custom = Router::new().route("/version", get(|| async { "0.1.0" }));
        let result = ServerBuilder::new()
            .with_custom_routes(custom)
            .register("products", InMemoryStore::<Product>::new())
            .unwrap()
            .build();

        assert!(result.is_ok());
    }
}
