//! Turning request bodies into records
//!
//! Create and update requests carry the record's attributes as a JSON object.
//! Attributes the entity does not declare are dropped, as are `id` and the
//! timestamps, which the server assigns. Every declared attribute is
//! required: a missing, `null` or blank value is reported under its name.

use crate::core::entity::Entity;
use crate::core::error::ValidationError;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Message for a missing, `null` or blank attribute
pub const BLANK: &str = "can't be blank";

/// Attributes assigned by the server, never taken from a request
const ASSIGNED: &[&str] = &["id", "created_at", "updated_at"];

/// Build a new record with a fresh id and timestamps
pub fn new_record<T>(attributes: Map<String, Value>) -> Result<T, ValidationError>
where
    T: Entity + DeserializeOwned,
{
    let now = Utc::now();
    let mut data = permitted::<T>(attributes);
    data.insert("id".into(), serde_json::json!(Uuid::new_v4()));
    data.insert("created_at".into(), serde_json::json!(now));
    data.insert("updated_at".into(), serde_json::json!(now));

    decode(data)
}

/// Apply `attributes` on top of `existing`
///
/// Attributes absent from the request keep their current value; `id` and
/// `created_at` never change and `updated_at` moves to now.
pub fn updated_record<T>(existing: &T, attributes: Map<String, Value>) -> Result<T, ValidationError>
where
    T: Entity + Serialize + DeserializeOwned,
{
    let mut data = match serde_json::to_value(existing) {
        Ok(Value::Object(data)) => data,
        Ok(_) => Map::new(),
        Err(e) => return Err(ValidationError::base(e.to_string())),
    };
    data.extend(permitted::<T>(attributes));
    data.insert("updated_at".into(), serde_json::json!(Utc::now()));

    decode(data)
}

fn permitted<T: Entity>(attributes: Map<String, Value>) -> Map<String, Value> {
    attributes
        .into_iter()
        .filter(|(name, _)| T::has_attribute(name) && !ASSIGNED.contains(&name.as_str()))
        .collect()
}

fn decode<T: Entity + DeserializeOwned>(data: Map<String, Value>) -> Result<T, ValidationError> {
    let mut errors = ValidationError::default();

    for attribute in T::attribute_names() {
        if ASSIGNED.contains(attribute) {
            continue;
        }
        let blank = match data.get(*attribute) {
            None | Some(Value::Null) => true,
            Some(Value::String(s)) => s.trim().is_empty(),
            Some(_) => false,
        };
        if blank {
            errors.add(attribute, BLANK);
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // wrong types and unknown enum values
    serde_json::from_value(Value::Object(data)).map_err(|e| ValidationError::base(e.to_string()))
}
