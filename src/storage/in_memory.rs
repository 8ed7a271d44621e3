//! In-memory record store and collection for testing and development

use crate::core::collection::{CollectionSource, QueryableCollection, WritableSource};
use crate::core::entity::Entity;
use crate::core::error::StorageError;
use crate::core::field::FieldValue;
use crate::core::query::SortDirection;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::cmp::Ordering;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

type Records<T> = Arc<RwLock<IndexMap<Uuid, T>>>;

/// Number of queries executed against an in-memory store
#[derive(Debug, Default)]
pub struct QueryStats {
    counts: AtomicUsize,
    fetches: AtomicUsize,
}

impl QueryStats {
    /// `count()` calls so far
    pub fn counts(&self) -> usize {
        self.counts.load(AtomicOrdering::SeqCst)
    }

    /// `to_list()` calls so far
    pub fn fetches(&self) -> usize {
        self.fetches.load(AtomicOrdering::SeqCst)
    }

    pub fn reset(&self) {
        self.counts.store(0, AtomicOrdering::SeqCst);
        self.fetches.store(0, AtomicOrdering::SeqCst);
    }
}

/// In-memory store for one entity type
///
/// Records keep their insertion order, which is the natural order of
/// collections built from the store. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemoryStore<T: Entity> {
    records: Records<T>,
    stats: Arc<QueryStats>,
}

impl<T: Entity> InMemoryStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            stats: Arc::new(QueryStats::default()),
        }
    }

    /// Create a store holding `records`, in the given order
    pub fn with_records(records: impl IntoIterator<Item = T>) -> Self {
        let map = records.into_iter().map(|r| (r.id(), r)).collect();
        Self {
            records: Arc::new(RwLock::new(map)),
            stats: Arc::new(QueryStats::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, IndexMap<Uuid, T>>, StorageError> {
        read_lock(&self.records)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, IndexMap<Uuid, T>>, StorageError> {
        self.records.write().map_err(|e| StorageError::Lock {
            mode: "write",
            message: e.to_string(),
        })
    }

    /// Insert or replace a record
    ///
    /// Replacing keeps the record's original position.
    pub fn insert(&self, record: T) -> Result<T, StorageError> {
        self.write()?.insert(record.id(), record.clone());
        Ok(record)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<T>, StorageError> {
        Ok(self.read()?.get(id).cloned())
    }

    /// All records in insertion order
    pub fn list(&self) -> Result<Vec<T>, StorageError> {
        Ok(self.read()?.values().cloned().collect())
    }

    /// Remove a record, keeping the order of the others
    pub fn remove(&self, id: &Uuid) -> Result<Option<T>, StorageError> {
        Ok(self.write()?.shift_remove(id))
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.read()?.is_empty())
    }

    /// Unfiltered collection over this store
    pub fn collection(&self) -> InMemoryCollection<T> {
        InMemoryCollection {
            records: self.records.clone(),
            stats: self.stats.clone(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Query counters shared by every collection of this store
    pub fn stats(&self) -> &QueryStats {
        &self.stats
    }
}

impl<T: Entity> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<T: Entity> CollectionSource for InMemoryStore<T> {
    type Collection = InMemoryCollection<T>;

    fn all(&self) -> InMemoryCollection<T> {
        self.collection()
    }

    async fn find(&self, id: &Uuid) -> Result<Option<T>, StorageError> {
        self.get(id)
    }
}

#[async_trait]
impl<T: Entity> WritableSource for InMemoryStore<T> {
    async fn create(&self, record: T) -> Result<T, StorageError> {
        self.insert(record)
    }

    async fn update(&self, record: T) -> Result<Option<T>, StorageError> {
        let mut records = self.write()?;
        match records.get_mut(&record.id()) {
            Some(slot) => {
                *slot = record.clone();
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &Uuid) -> Result<bool, StorageError> {
        Ok(self.remove(id)?.is_some())
    }
}

/// Query descriptor over an [`InMemoryStore`]
///
/// Holds the clauses only; the store is read when the collection is counted
/// or listed.
#[derive(Clone)]
pub struct InMemoryCollection<T: Entity> {
    records: Records<T>,
    stats: Arc<QueryStats>,
    filters: Vec<(String, String)>,
    order: Vec<(String, SortDirection)>,
    limit: Option<usize>,
    offset: usize,
}

impl<T: Entity> InMemoryCollection<T> {
    fn matches(&self, record: &T) -> bool {
        self.filters.iter().all(|(attribute, value)| {
            record
                .field_value(attribute)
                .is_some_and(|field| field.contains_ignore_case(value))
        })
    }

    fn compare(&self, a: &T, b: &T) -> Ordering {
        for (attribute, direction) in &self.order {
            let left = a.field_value(attribute).unwrap_or(FieldValue::Null);
            let right = b.field_value(attribute).unwrap_or(FieldValue::Null);
            let ordering = match direction {
                SortDirection::Asc => left.compare(&right),
                SortDirection::Desc => right.compare(&left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    fn window(&self, matched: usize) -> usize {
        let remaining = matched.saturating_sub(self.offset);
        match self.limit {
            Some(limit) => remaining.min(limit),
            None => remaining,
        }
    }
}

#[async_trait]
impl<T: Entity> QueryableCollection for InMemoryCollection<T> {
    type Record = T;

    fn filter_like(&self, attribute: &str, value: &str) -> Self {
        let mut next = self.clone();
        next.filters.push((attribute.to_string(), value.to_string()));
        next
    }

    fn order_by(&self, attribute: &str, direction: SortDirection) -> Self {
        let mut next = self.clone();
        next.order.push((attribute.to_string(), direction));
        next
    }

    fn limit(&self, n: usize) -> Self {
        let mut next = self.clone();
        next.limit = Some(n);
        next
    }

    fn offset(&self, m: usize) -> Self {
        let mut next = self.clone();
        next.offset = m;
        next
    }

    async fn count(&self) -> Result<usize, StorageError> {
        self.stats.counts.fetch_add(1, AtomicOrdering::SeqCst);
        let records = read_lock(&self.records)?;
        let matched = records.values().filter(|r| self.matches(r)).count();
        Ok(self.window(matched))
    }

    async fn to_list(&self) -> Result<Vec<T>, StorageError> {
        self.stats.fetches.fetch_add(1, AtomicOrdering::SeqCst);
        let mut matched: Vec<T> = {
            let records = read_lock(&self.records)?;
            records
                .values()
                .filter(|r| self.matches(r))
                .cloned()
                .collect()
        };

        // stable, so ties keep insertion order
        if !self.order.is_empty() {
            matched.sort_by(|a, b| self.compare(a, b));
        }

        Ok(matched
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect())
    }
}

fn read_lock<T>(
    records: &RwLock<IndexMap<Uuid, T>>,
) -> Result<RwLockReadGuard<'_, IndexMap<Uuid, T>>, StorageError> {
    records.read().map_err(|e| StorageError::Lock {
        mode: "read",
        message: e.to_string(),
    })
}
