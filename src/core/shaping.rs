//! Query shaping service
//!
//! Turns a base collection plus validated list parameters into one page of
//! records and its pagination metadata. The stages always run in the same
//! order, each consuming the collection produced by the previous one:
//!
//! 1. search: one `filter_like` per non-empty filter value
//! 2. order: one `order_by` per ordering key, primary key first
//! 3. pagination: `offset((page - 1) * length).limit(length)`
//!
//! The total count is taken from the collection after stage 2, so it covers
//! every matching record and not only the current page.
//!
//! # Example
//!
//! ```rust,ignore
//! let query = ListQuery {
//!     filter: FilterParams::new().with("name", "pro"),
//!     order: OrderParams::new().with("price", SortDirection::Desc),
//!     pagination: PaginationParams::new(2, 10)?,
//! };
//!
//! let page = shape(&store.collection(), &query.filter, &query.order, query.pagination).await?;
//! println!("{} of {}", page.len(), page.meta.total_count);
//! ```

use crate::core::collection::QueryableCollection;
use crate::core::error::AdminError;
use crate::core::query::{
    FilterParams, ListQuery, OrderParams, PaginationMeta, PaginationParams, ResultPage,
};

/// Apply search, ordering and pagination to `collection`
///
/// Issues exactly one count and one fetch against the collection. An empty
/// match is a successful page with `total_count == 0`; storage failures are
/// returned as [`AdminError::Storage`] without modification.
pub async fn shape<C: QueryableCollection>(
    collection: &C,
    filter: &FilterParams,
    order: &OrderParams,
    pagination: PaginationParams,
) -> Result<ResultPage<C::Record>, AdminError> {
    let searched = apply_search(collection, filter);
    let ordered = apply_order(&searched, order);
    let paged = apply_pagination(&ordered, pagination);

    let (total_count, records) = tokio::try_join!(ordered.count(), paged.to_list())?;

    let meta = PaginationMeta::new(pagination, total_count);
    tracing::debug!(
        filters = filter.len(),
        order_keys = order.len(),
        page = meta.current_page,
        length = meta.length,
        returned = records.len(),
        total_count,
        "shaped list query"
    );

    Ok(ResultPage { records, meta })
}

impl ListQuery {
    /// Shape `collection` with this query
    pub async fn load<C: QueryableCollection>(
        &self,
        collection: &C,
    ) -> Result<ResultPage<C::Record>, AdminError> {
        shape(collection, &self.filter, &self.order, self.pagination).await
    }
}

fn apply_search<C: QueryableCollection>(collection: &C, filter: &FilterParams) -> C {
    filter
        .iter()
        .fold(collection.clone(), |current, (attribute, value)| {
            if value.is_empty() {
                tracing::debug!(attribute, "empty search value, skipping");
                current
            } else {
                current.filter_like(attribute, value)
            }
        })
}

fn apply_order<C: QueryableCollection>(collection: &C, order: &OrderParams) -> C {
    order
        .iter()
        .fold(collection.clone(), |current, (attribute, direction)| {
            current.order_by(attribute, direction)
        })
}

fn apply_pagination<C: QueryableCollection>(collection: &C, pagination: PaginationParams) -> C {
    collection
        .offset(pagination.offset())
        .limit(pagination.length())
}
