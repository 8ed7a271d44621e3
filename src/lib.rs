//! # Storefront Admin
//!
//! Admin API for a game storefront catalogue. Every list endpoint shares one
//! query shaping service that turns request parameters into a page of
//! records:
//!
//! - **Search**: `search[attr]=value` keeps records whose attribute contains
//!   the value, ignoring case. Several filters are AND-combined.
//! - **Ordering**: `order[attr]=asc|desc`, several keys in request order
//! - **Pagination**: `page` and `length`, with defaults for missing values
//! - **Metadata**: current/next/previous page, total pages and total count
//! - **Allow-lists**: searchable and sortable attributes come from YAML
//!   configuration, never from the request
//! - **Pluggable storage**: anything implementing [`QueryableCollection`]
//!   can be shaped; an in-memory store and a PostgreSQL backend are included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use storefront::prelude::*;
//!
//! let products = InMemoryStore::<Product>::new();
//! products.insert(Product::new(
//!     "Pro Controller".to_string(),
//!     "Wireless controller".to_string(),
//!     59.9,
//!     ProductStatus::Available,
//!     true,
//!     Uuid::new_v4(),
//! ))?;
//!
//! let query = ListQuery {
//!     filter: FilterParams::new().with("name", "pro"),
//!     order: OrderParams::new().with("price", SortDirection::Desc),
//!     pagination: PaginationParams::new(1, 10)?,
//! };
//! let page = query.load(&products.all()).await?;
//!
//! ServerBuilder::new()
//!     .register("products", products)?
//!     .serve("127.0.0.1:3000")
//!     .await?;
//! ```
//!
//! [`QueryableCollection`]: crate::core::collection::QueryableCollection

pub mod config;
pub mod core;
pub mod entities;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core Traits ===
    pub use crate::core::{
        collection::{
            CollectionSource, DependentRecords, ForeignKey, QueryableCollection, SourceRecord,
            WritableSource,
        },
        entity::Entity,
        error::{AdminError, EntityError, ParameterError, StorageError, ValidationError},
        extractors::{ListParams, PermittedParams},
        field::{FieldValue, ToFieldValue},
        query::{
            FilterParams, ListQuery, OrderParams, PaginationDefaults, PaginationMeta,
            PaginationParams, ResultPage, SortDirection,
        },
        shaping::shape,
    };

    // === Macros ===
    pub use crate::{impl_entity, impl_field_enum};

    // === Entities ===
    pub use crate::entities::{
        Coupon, CouponStatus, Game, GameMode, License, LicenseStatus, Platform, Product,
        ProductStatus, Profile, SystemRequirement, User,
    };

    // === Storage ===
    pub use crate::storage::{InMemoryCollection, InMemoryStore, QueryStats};
    #[cfg(feature = "postgres")]
    pub use crate::storage::{PostgresCollection, PostgresSource};

    // === Config ===
    pub use crate::config::{AdminConfig, EntityQueryConfig};

    // === Server ===
    pub use crate::server::{EntityDescriptor, EntityRegistry, EntityRoutes, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use uuid::Uuid;
}
