//! Core module containing the query shaping contract and its types

pub mod collection;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod field;
pub mod query;
pub mod shaping;
pub mod validation;

pub use collection::{
    CollectionSource, DependentRecords, ForeignKey, QueryableCollection, SourceRecord,
    WritableSource,
};
pub use entity::Entity;
pub use error::{
    AdminError, ConfigError, EntityError, ParameterError, RequestError, StorageError,
    ValidationError,
};
pub use extractors::{ListParams, PermittedParams};
pub use field::{FieldValue, ToFieldValue};
pub use query::{
    FilterParams, ListQuery, OrderParams, PaginationDefaults, PaginationMeta, PaginationParams,
    ResultPage, SortDirection,
};
pub use shaping::shape;
