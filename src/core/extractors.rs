//! Request-side boundary of list endpoints
//!
//! [`ListParams`] collects the raw `search[...]`, `order[...]`, `page` and
//! `length` values of a query string. Nothing in it is trusted: it has to go
//! through [`ListParams::permit`] with the entity's allow-lists and then
//! [`PermittedParams::into_query`] before it can reach the shaping service.
//!
//! ```text
//! GET /products?search[name]=pro&order[price]=desc&order[name]=asc&page=2&length=5
//! ```

use crate::config::EntityQueryConfig;
use crate::core::error::{AdminError, ParameterError, RequestError};
use crate::core::query::{
    FilterParams, ListQuery, OrderParams, PaginationDefaults, PaginationParams, SortDirection,
};
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use indexmap::IndexMap;

/// Raw list parameters, in order of appearance
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListParams {
    pub search: IndexMap<String, String>,
    pub order: IndexMap<String, String>,
    pub page: Option<String>,
    pub length: Option<String>,
}

impl ListParams {
    /// Build from decoded query-string pairs
    ///
    /// Repeated keys keep their first position and their last value; keys
    /// other than the four known ones are ignored.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::default();

        for (key, value) in pairs {
            let key = key.as_ref();
            match key {
                "page" => params.page = Some(value.into()),
                "length" => params.length = Some(value.into()),
                _ => {
                    if let Some(attribute) = bracketed(key, "search") {
                        params.search.insert(attribute.to_string(), value.into());
                    } else if let Some(attribute) = bracketed(key, "order") {
                        params.order.insert(attribute.to_string(), value.into());
                    }
                }
            }
        }

        params
    }

    /// Keep only allow-listed attributes
    pub fn permit(self, config: &EntityQueryConfig) -> PermittedParams {
        let mut filter = FilterParams::new();
        for (attribute, value) in self.search {
            if config.is_searchable(&attribute) {
                filter.insert(attribute, value);
            } else {
                tracing::debug!(
                    entity = %config.singular,
                    attribute = %attribute,
                    "dropping search on non-searchable attribute"
                );
            }
        }

        let mut order = OrderParams::new();
        for (attribute, direction) in self.order {
            if config.is_sortable(&attribute) {
                order.insert(attribute, SortDirection::parse_lenient(&direction));
            } else {
                tracing::debug!(
                    entity = %config.singular,
                    attribute = %attribute,
                    "dropping order on non-sortable attribute"
                );
            }
        }

        PermittedParams {
            filter,
            order,
            page: self.page,
            length: self.length,
        }
    }
}

/// `search[name]` → `name`
fn bracketed<'a>(key: &'a str, prefix: &str) -> Option<&'a str> {
    key.strip_prefix(prefix)?
        .strip_prefix('[')?
        .strip_suffix(']')
        .filter(|attribute| !attribute.is_empty())
}

impl<S> FromRequestParts<S> for ListParams
where
    S: Send + Sync,
{
    type Rejection = AdminError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(|e| {
            RequestError::InvalidQuery {
                message: e.body_text(),
            }
        })?;

        Ok(Self::from_pairs(pairs))
    }
}

/// List parameters restricted to an entity's allow-lists
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PermittedParams {
    pub filter: FilterParams,
    pub order: OrderParams,
    pub page: Option<String>,
    pub length: Option<String>,
}

impl PermittedParams {
    /// Interpret pagination values and produce the shaping input
    pub fn into_query(self, defaults: &PaginationDefaults) -> Result<ListQuery, ParameterError> {
        let pagination =
            PaginationParams::parse(self.page.as_deref(), self.length.as_deref(), defaults)?;

        Ok(ListQuery {
            filter: self.filter,
            order: self.order,
            pagination,
        })
    }
}
