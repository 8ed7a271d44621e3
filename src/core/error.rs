//! Typed error handling for the admin API
//!
//! # Error Categories
//!
//! - [`ParameterError`]: pagination values that cannot be defaulted. This is
//!   the only error the query shaping service produces on its own.
//! - [`StorageError`]: failures reported by a collection backend, passed
//!   through untouched.
//! - [`EntityError`]: lookups of single records
//! - [`ValidationError`]: record bodies of create and update requests, and
//!   deletions refused because other records still reference the target
//! - [`ConfigError`]: configuration parsing and validation
//! - [`RequestError`]: malformed request parts
//!
//! [`AdminError`] wraps all of them and knows how to render itself as an
//! HTTP response.
//!
//! # Example
//!
//! ```rust,ignore
//! match shape(&collection, &filter, &order, pagination).await {
//!     Ok(page) => render(page),
//!     Err(AdminError::Parameter(ParameterError::Negative { name, .. })) => {
//!         println!("{} must not be negative", name);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use uuid::Uuid;

/// The main error type of the admin API
#[derive(Debug, Error)]
pub enum AdminError {
    /// Malformed pagination parameters
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Entity lookups
    #[error(transparent)]
    Entity(#[from] EntityError),

    /// Rejected record bodies and deletions
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage backend errors
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// HTTP/Request errors
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Internal errors (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Per-attribute messages of a validation error: `{ "fields": { ... } }`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<serde_json::Value>,
}

impl AdminError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AdminError::Parameter(_) => StatusCode::BAD_REQUEST,
            AdminError::Entity(e) => e.status_code(),
            AdminError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdminError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AdminError::Request(_) => StatusCode::BAD_REQUEST,
            AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AdminError::Parameter(_) => "INVALID_PARAMETER",
            AdminError::Entity(e) => e.error_code(),
            AdminError::Validation(_) => "VALIDATION_ERROR",
            AdminError::Config(_) => "CONFIG_ERROR",
            AdminError::Storage(_) => "STORAGE_ERROR",
            AdminError::Request(_) => "INVALID_REQUEST",
            AdminError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
            errors: match self {
                AdminError::Validation(e) => Some(serde_json::json!({ "fields": e.fields })),
                _ => None,
            },
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AdminError::Parameter(ParameterError::Negative { name, value })
            | AdminError::Parameter(ParameterError::OutOfRange { name, value }) => {
                Some(serde_json::json!({ "parameter": name, "value": value }))
            }
            AdminError::Entity(EntityError::NotFound { entity_type, id }) => {
                Some(serde_json::json!({
                    "entity_type": entity_type,
                    "id": id.to_string()
                }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(self.to_response());
        (status, body).into_response()
    }
}

// =============================================================================
// Parameter Errors
// =============================================================================

/// Pagination values that cannot be replaced by a default
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// A negative page or length
    #[error("Parameter '{name}' must not be negative (got '{value}')")]
    Negative { name: String, value: String },

    /// A value too large to compute an offset from
    #[error("Parameter '{name}' is out of range (got '{value}')")]
    OutOfRange { name: String, value: String },
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors reported by collection backends
#[derive(Debug, Error)]
pub enum StorageError {
    /// A poisoned lock in an in-process store
    #[error("Failed to acquire {mode} lock: {message}")]
    Lock { mode: &'static str, message: String },

    /// Query execution error
    #[error("{backend} query error: {message}")]
    Query { backend: String, message: String },

    /// A row that could not be turned back into a record
    #[error("Failed to decode record: {message}")]
    Decode { message: String },
}

// =============================================================================
// Entity Errors
// =============================================================================

/// Errors related to single-record lookups
#[derive(Debug, Error)]
pub enum EntityError {
    /// Entity was not found
    #[error("{entity_type} with id '{id}' not found")]
    NotFound { entity_type: String, id: Uuid },

    /// Entity type is not configured
    #[error("Unknown entity type: {entity_type}")]
    UnknownType { entity_type: String },
}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
            EntityError::UnknownType { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound { .. } => "ENTITY_NOT_FOUND",
            EntityError::UnknownType { .. } => "UNKNOWN_ENTITY_TYPE",
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Attribute name under which errors about the whole record are reported
pub const BASE_FIELD: &str = "base";

/// Messages about a record that cannot be stored, keyed by attribute
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("Validation failed: {}", describe(.fields))]
pub struct ValidationError {
    pub fields: BTreeMap<String, Vec<String>>,
}

impl ValidationError {
    /// An error about the record as a whole
    pub fn base(message: impl Into<String>) -> Self {
        let mut err = Self::default();
        err.add(BASE_FIELD, message);
        err
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn describe(fields: &BTreeMap<String, Vec<String>>) -> String {
    fields
        .iter()
        .flat_map(|(field, messages)| messages.iter().map(move |m| format!("{} {}", field, m)))
        .collect::<Vec<_>>()
        .join(", ")
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to parse configuration
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    Parse {
        file: Option<String>,
        message: String,
    },

    /// IO error while reading configuration
    #[error("IO error: {message}")]
    Io { message: String },

    /// An attribute name that is not a plain identifier
    #[error("Invalid attribute '{attribute}' for entity '{entity}': {message}")]
    InvalidAttribute {
        entity: String,
        attribute: String,
        message: String,
    },

    /// Two entities share a singular or plural name
    #[error("Entity '{name}' is configured more than once")]
    DuplicateEntity { name: String },
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors related to HTTP requests
#[derive(Debug, Error)]
pub enum RequestError {
    /// Invalid entity ID format
    #[error("Invalid entity ID format: '{id}'")]
    InvalidEntityId { id: String },

    /// Query string that could not be decoded
    #[error("Invalid query string: {message}")]
    InvalidQuery { message: String },

    /// Write body without the record under its singular name
    #[error("Request body must hold the record under '{root}'")]
    MissingRecord { root: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::Parse {
            file: None,
            message: err.to_string(),
        }
    }
}

impl From<anyhow::Error> for AdminError {
    fn from(err: anyhow::Error) -> Self {
        AdminError::Internal(err.to_string())
    }
}
