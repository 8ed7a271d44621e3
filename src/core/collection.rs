//! Queryable collection contract consumed by the shaping service

use crate::core::error::StorageError;
use crate::core::query::SortDirection;
use async_trait::async_trait;
use uuid::Uuid;

/// A lazily evaluated, composable query over records of one entity type
///
/// Every combinator returns a new collection and leaves the receiver
/// untouched, so a base collection can be shared and reused freely. Nothing
/// touches the store until [`count`](Self::count) or
/// [`to_list`](Self::to_list) is awaited.
///
/// Attribute names reaching a collection have already been checked against
/// the entity's allow-list.
#[async_trait]
pub trait QueryableCollection: Clone + Send + Sync {
    /// Record type produced by [`to_list`](Self::to_list)
    type Record: Send;

    /// Keep records whose `attribute` contains `value`, ignoring case
    ///
    /// Equivalent to `attribute ILIKE '%value%'` with `value` taken
    /// literally. Successive calls are AND-combined.
    fn filter_like(&self, attribute: &str, value: &str) -> Self;

    /// Append an ordering key after any existing ones
    fn order_by(&self, attribute: &str, direction: SortDirection) -> Self;

    /// Return at most `n` records
    fn limit(&self, n: usize) -> Self;

    /// Skip the first `m` records
    fn offset(&self, m: usize) -> Self;

    /// Number of records [`to_list`](Self::to_list) would return
    async fn count(&self) -> Result<usize, StorageError>;

    /// Execute the query
    async fn to_list(&self) -> Result<Vec<Self::Record>, StorageError>;
}

/// Record type of a source's collection
pub type SourceRecord<S> = <<S as CollectionSource>::Collection as QueryableCollection>::Record;

/// Something that can hand out the base collection of one entity type
///
/// This is the `Model.all` of a list endpoint: the handler asks for the
/// unfiltered collection on every request and shapes it from there.
#[async_trait]
pub trait CollectionSource: Send + Sync + 'static {
    type Collection: QueryableCollection + 'static;

    /// Every record of the entity, in natural order
    fn all(&self) -> Self::Collection;

    /// Look up a single record
    async fn find(&self, id: &Uuid) -> Result<Option<SourceRecord<Self>>, StorageError>;
}

/// A source that also stores records sent by create, update and delete
/// requests
#[async_trait]
pub trait WritableSource: CollectionSource {
    /// Store a new record
    async fn create(&self, record: SourceRecord<Self>) -> Result<SourceRecord<Self>, StorageError>;

    /// Replace a stored record, `None` when its id is unknown
    async fn update(
        &self,
        record: SourceRecord<Self>,
    ) -> Result<Option<SourceRecord<Self>>, StorageError>;

    /// Remove a record, `false` when its id is unknown
    async fn delete(&self, id: &Uuid) -> Result<bool, StorageError>;
}

/// Records of another entity that may reference a record about to be deleted
#[async_trait]
pub trait DependentRecords: Send + Sync {
    /// Plural name of the referencing entity (e.g., "games")
    fn name(&self) -> &str;

    /// Number of records referencing `id`
    async fn count_referencing(&self, id: &Uuid) -> Result<usize, StorageError>;
}

/// Records of `source` whose `attribute` holds the id of the deleted record
///
/// ```rust,ignore
/// let games_of_requirement = ForeignKey::new("games", "system_requirement_id", games.clone());
/// ```
pub struct ForeignKey<S> {
    name: String,
    attribute: String,
    source: S,
}

impl<S> ForeignKey<S> {
    pub fn new(name: &str, attribute: &str, source: S) -> Self {
        Self {
            name: name.to_string(),
            attribute: attribute.to_string(),
            source,
        }
    }
}

#[async_trait]
impl<S: CollectionSource> DependentRecords for ForeignKey<S> {
    fn name(&self) -> &str {
        &self.name
    }

    async fn count_referencing(&self, id: &Uuid) -> Result<usize, StorageError> {
        // a full hyphenated uuid only contains itself
        self.source
            .all()
            .filter_like(&self.attribute, &id.to_string())
            .count()
            .await
    }
}
