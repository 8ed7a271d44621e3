//! REST API exposure
//!
//! Consumes the entity registry and produces an Axum `Router` carrying the
//! health routes, every entity's routes and any custom routes.

use crate::server::entity_registry::EntityRegistry;
use axum::{Json, Router, routing::get};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a registry
    ///
    /// Returns a router with:
    /// - Health check routes
    /// - Entity routes
    /// - Custom routes
    ///
    /// Every request is traced through `tower_http::trace`.
    pub fn build_router(registry: &EntityRegistry, custom_routes: Vec<Router>) -> Router {
        let entities: Vec<String> = registry
            .entity_types()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut app = Self::health_routes(entities).merge(registry.build_routes());

        for custom_router in custom_routes {
            app = app.merge(custom_router);
        }

        app.layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Build health check routes
    fn health_routes(entities: Vec<String>) -> Router {
        let body = json!({
            "status": "ok",
            "service": env!("CARGO_PKG_NAME"),
            "entities": entities,
        });

        let handler = move || {
            let body = body.clone();
            async move { Json::<Value>(body) }
        };

        Router::new()
            .route("/health", get(handler.clone()))
            .route("/healthz", get(handler))
    }
}
