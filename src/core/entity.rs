//! Entity trait defining how records expose their attributes

use crate::core::field::FieldValue;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Base trait for all catalogue records.
///
/// Every entity has:
/// - id: Unique identifier
/// - created_at: Creation timestamp
/// - updated_at: Last modification timestamp
///
/// and exposes its attributes by name through [`Entity::field_value`], which
/// is what in-memory collections use to search and order records.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The plural resource name used in URLs (e.g., "games", "licenses")
    fn resource_name() -> &'static str;

    /// The singular resource name (e.g., "game", "license")
    fn resource_name_singular() -> &'static str;

    /// Names of every attribute `field_value` knows about
    fn attribute_names() -> &'static [&'static str];

    /// Get the unique identifier for this entity instance
    fn id(&self) -> Uuid;

    /// Get the creation timestamp
    fn created_at(&self) -> DateTime<Utc>;

    /// Get the last update timestamp
    fn updated_at(&self) -> DateTime<Utc>;

    /// Get the value of a specific attribute by name
    ///
    /// Returns `None` for attributes the entity does not have.
    fn field_value(&self, field: &str) -> Option<FieldValue>;

    /// Check whether the entity declares an attribute
    fn has_attribute(field: &str) -> bool {
        Self::attribute_names().contains(&field)
    }
}
