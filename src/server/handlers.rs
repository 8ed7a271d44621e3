//! Generic REST handlers for catalogue entities
//!
//! The index handler is the only caller of the shaping service in the
//! server: it permits the raw parameters against the entity's allow-lists,
//! interprets pagination, shapes the base collection and renders the page.
//! Show, create and update render a single record under its singular name;
//! create and update read it from the same place:
//!
//! ```json
//! { "coupon": { "name": "Black Friday", "code": "BF2024", ... } }
//! ```
//!
//! Response body of `GET /{plural}`:
//!
//! ```json
//! {
//!   "products": [ ... ],
//!   "meta": { "current_page": 2, "next_page": 3, "prev_page": 1,
//!             "total_pages": 3, "total_count": 23, "length": 10 }
//! }
//! ```
//!
//! The totals are repeated in the `X-Total-Count` and `X-Total-Pages` headers.

use super::entity_registry::EntityDescriptor;
use crate::config::EntityQueryConfig;
use crate::core::collection::{CollectionSource, DependentRecords, SourceRecord, WritableSource};
use crate::core::entity::Entity;
use crate::core::error::{AdminError, EntityError, RequestError, ValidationError};
use crate::core::extractors::ListParams;
use crate::core::query::PaginationDefaults;
use crate::core::validation;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

pub const TOTAL_COUNT_HEADER: HeaderName = HeaderName::from_static("x-total-count");
pub const TOTAL_PAGES_HEADER: HeaderName = HeaderName::from_static("x-total-pages");

/// Per-entity handler state
pub struct CollectionState<S> {
    pub source: Arc<S>,
    pub config: Arc<EntityQueryConfig>,
    pub pagination: PaginationDefaults,
    /// Records that block deleting the ones they reference
    pub dependents: Arc<Vec<Box<dyn DependentRecords>>>,
}

impl<S> Clone for CollectionState<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            config: self.config.clone(),
            pagination: self.pagination,
            dependents: self.dependents.clone(),
        }
    }
}

impl<S> CollectionState<S> {
    fn not_found(&self, id: Uuid) -> EntityError {
        EntityError::NotFound {
            entity_type: self.config.singular.clone(),
            id,
        }
    }
}

/// `GET /{plural}`
pub async fn list_records<S>(
    State(state): State<CollectionState<S>>,
    params: ListParams,
) -> Result<Response, AdminError>
where
    S: CollectionSource,
    SourceRecord<S>: Serialize,
{
    let query = params
        .permit(&state.config)
        .into_query(&state.pagination)?;

    let page = query.load(&state.source.all()).await?;

    let mut headers = HeaderMap::new();
    headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(page.meta.total_count));
    headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(page.meta.total_pages));

    let mut body = Map::new();
    body.insert(
        state.config.plural.clone(),
        serde_json::to_value(&page.records)
            .map_err(|e| AdminError::Internal(format!("Failed to serialize records: {}", e)))?,
    );
    body.insert(
        "meta".to_string(),
        serde_json::to_value(&page.meta)
            .map_err(|e| AdminError::Internal(format!("Failed to serialize meta: {}", e)))?,
    );

    Ok((headers, Json(Value::Object(body))).into_response())
}

/// `GET /{plural}/{id}`
///
/// The record is returned under its singular name: `{ "product": { ... } }`.
pub async fn get_record<S>(
    State(state): State<CollectionState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, AdminError>
where
    S: CollectionSource,
    SourceRecord<S>: Serialize,
{
    let uuid = parse_id(id)?;
    let record = find_existing(&state, uuid).await?;

    render_record(&state.config.singular, &record)
}

/// `POST /{plural}`
///
/// Responds `200` with the stored record, `422` when attributes are
/// missing or malformed.
pub async fn create_record<S>(
    State(state): State<CollectionState<S>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AdminError>
where
    S: WritableSource,
    SourceRecord<S>: Entity + Serialize + DeserializeOwned,
{
    let attributes = record_attributes(&state.config.singular, body)?;
    let record = validation::new_record::<SourceRecord<S>>(attributes)?;
    let record = state.source.create(record).await?;

    tracing::info!(entity = %state.config.singular, id = %record.id(), "record created");
    render_record(&state.config.singular, &record)
}

/// `PATCH /{plural}/{id}` and `PUT /{plural}/{id}`
///
/// Attributes left out of the body keep their value.
pub async fn update_record<S>(
    State(state): State<CollectionState<S>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AdminError>
where
    S: WritableSource,
    SourceRecord<S>: Entity + Serialize + DeserializeOwned,
{
    let uuid = parse_id(id)?;
    let existing = find_existing(&state, uuid).await?;

    let attributes = record_attributes(&state.config.singular, body)?;
    let record = validation::updated_record(&existing, attributes)?;
    let record = state
        .source
        .update(record)
        .await?
        .ok_or_else(|| state.not_found(uuid))?;

    tracing::info!(entity = %state.config.singular, id = %uuid, "record updated");
    render_record(&state.config.singular, &record)
}

/// `DELETE /{plural}/{id}`
///
/// Responds `204` without a body. Refused with `422` while records
/// registered as dependents still reference the target.
pub async fn delete_record<S>(
    State(state): State<CollectionState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AdminError>
where
    S: WritableSource,
    SourceRecord<S>: Entity + Serialize + DeserializeOwned,
{
    let uuid = parse_id(id)?;
    find_existing(&state, uuid).await?;

    for dependents in state.dependents.iter() {
        if dependents.count_referencing(&uuid).await? > 0 {
            return Err(ValidationError::base(format!(
                "Cannot delete record because dependent {} exist",
                dependents.name()
            ))
            .into());
        }
    }

    if !state.source.delete(&uuid).await? {
        return Err(state.not_found(uuid).into());
    }

    tracing::info!(entity = %state.config.singular, id = %uuid, "record deleted");
    Ok(StatusCode::NO_CONTENT)
}

fn parse_id(id: String) -> Result<Uuid, RequestError> {
    Uuid::parse_str(&id).map_err(|_| RequestError::InvalidEntityId { id })
}

async fn find_existing<S: CollectionSource>(
    state: &CollectionState<S>,
    id: Uuid,
) -> Result<SourceRecord<S>, AdminError> {
    state
        .source
        .find(&id)
        .await?
        .ok_or_else(|| state.not_found(id).into())
}

/// Attributes sent under the record's singular name
fn record_attributes(singular: &str, mut body: Value) -> Result<Map<String, Value>, RequestError> {
    match body.get_mut(singular).map(Value::take) {
        Some(Value::Object(attributes)) => Ok(attributes),
        _ => Err(RequestError::MissingRecord {
            root: singular.to_string(),
        }),
    }
}

fn render_record<T: Serialize>(singular: &str, record: &T) -> Result<Json<Value>, AdminError> {
    let mut body = Map::new();
    body.insert(
        singular.to_string(),
        serde_json::to_value(record)
            .map_err(|e| AdminError::Internal(format!("Failed to serialize record: {}", e)))?,
    );

    Ok(Json(Value::Object(body)))
}

/// Descriptor exposing one collection source under its configured plural
pub struct EntityRoutes<S> {
    state: CollectionState<S>,
}

impl<S> EntityRoutes<S>
where
    S: WritableSource,
    SourceRecord<S>: Entity + Serialize + DeserializeOwned,
{
    pub fn new(source: S, config: EntityQueryConfig, pagination: PaginationDefaults) -> Self {
        Self {
            state: CollectionState {
                source: Arc::new(source),
                config: Arc::new(config),
                pagination,
                dependents: Arc::new(Vec::new()),
            },
        }
    }

    /// Refuse deletes while any of `dependents` references the record
    pub fn with_dependents(mut self, dependents: Vec<Box<dyn DependentRecords>>) -> Self {
        self.state.dependents = Arc::new(dependents);
        self
    }
}

impl<S> EntityDescriptor for EntityRoutes<S>
where
    S: WritableSource,
    SourceRecord<S>: Entity + Serialize + DeserializeOwned,
{
    fn entity_type(&self) -> &str {
        &self.state.config.singular
    }

    fn plural(&self) -> &str {
        &self.state.config.plural
    }

    fn build_routes(&self) -> Router {
        let plural = &self.state.config.plural;

        Router::new()
            .route(
                &format!("/{}", plural),
                get(list_records::<S>).post(create_record::<S>),
            )
            .route(
                &format!("/{}/{{id}}", plural),
                get(get_record::<S>)
                    .patch(update_record::<S>)
                    .put(update_record::<S>)
                    .delete(delete_record::<S>),
            )
            .with_state(self.state.clone())
    }
}
