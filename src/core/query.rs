//! Typed list parameters and pagination metadata
//!
//! These are the validated inputs of the query shaping service. Raw request
//! values are turned into them by [`crate::core::extractors`]; the shaping
//! service never sees an untyped parameter bag.

use crate::core::error::ParameterError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default first page
pub const DEFAULT_PAGE: usize = 1;

/// Default page size
pub const DEFAULT_LENGTH: usize = 10;

/// Sort direction of one ordering key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse `asc`/`desc`, ignoring case and surrounding whitespace
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// Parse a direction, falling back to `asc` for anything unrecognised
    pub fn parse_lenient(raw: &str) -> Self {
        Self::parse(raw).unwrap_or_else(|| {
            tracing::warn!(direction = raw, "unknown sort direction, using asc");
            SortDirection::Asc
        })
    }

    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "asc"),
            SortDirection::Desc => write!(f, "desc"),
        }
    }
}

/// Attribute → match value pairs for the search stage
///
/// Insertion order is kept so that repeated calls build identical queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams(IndexMap<String, String>);

impl FilterParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, replacing any previous value for the attribute
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        self.0.insert(attribute.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.0.get(attribute).map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FilterParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Attribute → direction pairs for the order stage
///
/// The first entry is the primary sort key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderParams(IndexMap<String, SortDirection>);

impl OrderParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an ordering key (a repeated attribute keeps its first position)
    pub fn with(mut self, attribute: impl Into<String>, direction: SortDirection) -> Self {
        self.insert(attribute, direction);
        self
    }

    pub fn insert(&mut self, attribute: impl Into<String>, direction: SortDirection) {
        self.0.insert(attribute.into(), direction);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, SortDirection)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl<K: Into<String>> FromIterator<(K, SortDirection)> for OrderParams {
    fn from_iter<I: IntoIterator<Item = (K, SortDirection)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Defaults applied when pagination values are missing or unusable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationDefaults {
    /// Page used when none is given
    #[serde(default = "default_page")]
    pub page: usize,

    /// Page size used when none is given
    #[serde(default = "default_length")]
    pub length: usize,

    /// Upper bound for the page size; larger requests are clamped
    #[serde(default)]
    pub max_length: Option<usize>,
}

fn default_page() -> usize {
    DEFAULT_PAGE
}

fn default_length() -> usize {
    DEFAULT_LENGTH
}

impl Default for PaginationDefaults {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            length: DEFAULT_LENGTH,
            max_length: None,
        }
    }
}

/// Validated page/length pair (both at least 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaginationParams {
    page: usize,
    length: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            length: DEFAULT_LENGTH,
        }
    }
}

impl PaginationParams {
    /// Build from already-typed values
    ///
    /// Zero falls back to the defaults, like a missing value does.
    pub fn new(page: usize, length: usize) -> Result<Self, ParameterError> {
        let page = if page == 0 { DEFAULT_PAGE } else { page };
        let length = if length == 0 { DEFAULT_LENGTH } else { length };
        Self::checked(page, length, &page.to_string())
    }

    /// Interpret raw `page` and `length` request values
    ///
    /// | raw value                   | result                     |
    /// |-----------------------------|----------------------------|
    /// | missing, blank, non-numeric | default                    |
    /// | `0`                         | default                    |
    /// | negative                    | `ParameterError::Negative` |
    /// | above `max_length`          | clamped (length only)      |
    pub fn parse(
        page: Option<&str>,
        length: Option<&str>,
        defaults: &PaginationDefaults,
    ) -> Result<Self, ParameterError> {
        let page_value = parse_positive("page", page)?.unwrap_or(defaults.page.max(1));
        let mut length_value = parse_positive("length", length)?.unwrap_or(defaults.length.max(1));

        if let Some(max) = defaults.max_length {
            length_value = length_value.min(max.max(1));
        }

        Self::checked(page_value, length_value, page.unwrap_or_default())
    }

    fn checked(page: usize, length: usize, raw_page: &str) -> Result<Self, ParameterError> {
        // offset + length must be representable
        (page - 1)
            .checked_mul(length)
            .and_then(|offset| offset.checked_add(length))
            .ok_or_else(|| ParameterError::OutOfRange {
                name: "page".to_string(),
                value: raw_page.trim().to_string(),
            })?;

        Ok(Self { page, length })
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// Number of records skipped before this page
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.length
    }
}

/// Parse one raw pagination value
///
/// `Ok(None)` means "use the default".
fn parse_positive(name: &str, raw: Option<&str>) -> Result<Option<usize>, ParameterError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };

    match raw.parse::<i128>() {
        Ok(n) if n < 0 => Err(ParameterError::Negative {
            name: name.to_string(),
            value: raw.to_string(),
        }),
        Ok(0) => Ok(None),
        Ok(n) => usize::try_from(n)
            .map(Some)
            .map_err(|_| ParameterError::OutOfRange {
                name: name.to_string(),
                value: raw.to_string(),
            }),
        // Digits beyond i128 are still a number, just too big
        Err(_) if is_integer_literal(raw) => {
            if raw.starts_with('-') {
                Err(ParameterError::Negative {
                    name: name.to_string(),
                    value: raw.to_string(),
                })
            } else {
                Err(ParameterError::OutOfRange {
                    name: name.to_string(),
                    value: raw.to_string(),
                })
            }
        }
        Err(_) => {
            tracing::debug!(parameter = name, value = raw, "non-numeric value, using default");
            Ok(None)
        }
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// Everything the shaping service needs for one list request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: FilterParams,
    pub order: OrderParams,
    pub pagination: PaginationParams,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub current_page: usize,

    /// Next page, if there is one
    pub next_page: Option<usize>,

    /// Previous page, if there is one
    pub prev_page: Option<usize>,

    /// Total number of pages
    pub total_pages: usize,

    /// Total number of records after filters
    pub total_count: usize,

    /// Number of records per page
    pub length: usize,
}

impl PaginationMeta {
    /// Create pagination metadata for a page of a result set of `total_count` records
    pub fn new(pagination: PaginationParams, total_count: usize) -> Self {
        let page = pagination.page();
        let length = pagination.length();
        let total_pages = total_count.div_ceil(length);

        Self {
            current_page: page,
            next_page: (page < total_pages).then(|| page + 1),
            prev_page: (page > 1).then(|| page - 1),
            total_pages,
            total_count,
            length,
        }
    }
}

/// One page of records plus its metadata
#[derive(Debug, Clone, Serialize)]
pub struct ResultPage<T> {
    pub records: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> ResultPage<T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
