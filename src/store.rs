//! Storage collaborator contract and the in-memory reference implementation.
//!
//! The engine enforces its invariants at the point of transition regardless of
//! what sits behind this trait; durable persistence belongs to the adapter
//! implementing it. Mutations that race on the same record are rejected through
//! optimistic version checks.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use serde::{de::DeserializeOwned, Serialize};

/// Trait for types that can be stored as records.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    /// The collection name for this record type (e.g. "items", "borrow_requests").
    const COLLECTION: &'static str;

    /// Returns the unique identifier for this record.
    fn id(&self) -> &str;
}

/// A versioned wrapper around record data for optimistic concurrency control.
#[derive(Debug, Clone)]
pub struct Versioned<T> {
    pub data: T,
    pub version: u64,
}

/// Error type for store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Optimistic concurrency conflict.
    VersionConflict {
        collection: String,
        id: String,
        expected: u64,
        actual: u64,
    },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
    /// Record not found.
    NotFound { collection: String, id: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::VersionConflict {
                collection,
                id,
                expected,
                actual,
            } => write!(
                f,
                "version conflict on {}:{} (expected {}, actual {})",
                collection, id, expected, actual
            ),
            StoreError::Serde(msg) => write!(f, "record serialization error: {}", msg),
            StoreError::Storage(msg) => write!(f, "record storage error: {}", msg),
            StoreError::NotFound { collection, id } => {
                write!(f, "record not found: {}:{}", collection, id)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Abstract CRUD storage for records.
pub trait RecordStore: Send + Sync {
    /// Get a record by ID. Returns None if not found.
    fn get<R: Record>(&self, id: &str) -> Result<Option<Versioned<R>>, StoreError>;

    /// Insert a new record. Fails if it already exists.
    fn insert<R: Record>(&self, record: &R) -> Result<Versioned<R>, StoreError>;

    /// Update an existing record with an optimistic version check.
    fn update<R: Record>(&self, record: &R, expected_version: u64)
        -> Result<Versioned<R>, StoreError>;

    /// Upsert a record (insert or update, no version check).
    fn save<R: Record>(&self, record: &R) -> Result<Versioned<R>, StoreError>;

    /// Delete a record by ID. Returns true if it existed.
    fn delete<R: Record>(&self, id: &str) -> Result<bool, StoreError>;

    /// Find records matching a predicate.
    fn find<R: Record>(
        &self,
        predicate: &dyn Fn(&R) -> bool,
    ) -> Result<Vec<Versioned<R>>, StoreError>;
}

/// Internal stored representation of a record.
struct StoredRecord {
    bytes: Vec<u8>,
    version: u64,
}

/// In-memory record store backed by a HashMap.
///
/// Storage key is `"COLLECTION:id"`. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryRecordStore {
    storage: Arc<RwLock<HashMap<String, StoredRecord>>>,
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRecordStore {
    /// Create a new empty record store.
    pub fn new() -> Self {
        Self {
            storage: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    fn make_key(collection: &str, id: &str) -> String {
        format!("{}:{}", collection, id)
    }

    fn encode<R: Record>(record: &R) -> Result<Vec<u8>, StoreError> {
        serde_json::to_vec(record).map_err(|e| StoreError::Serde(e.to_string()))
    }
}

impl RecordStore for InMemoryRecordStore {
    fn get<R: Record>(&self, id: &str) -> Result<Option<Versioned<R>>, StoreError> {
        let key = Self::make_key(R::COLLECTION, id);
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        match storage.get(&key) {
            Some(stored) => {
                let data: R = serde_json::from_slice(&stored.bytes)
                    .map_err(|e| StoreError::Serde(e.to_string()))?;
                Ok(Some(Versioned {
                    data,
                    version: stored.version,
                }))
            }
            None => Ok(None),
        }
    }

    fn insert<R: Record>(&self, record: &R) -> Result<Versioned<R>, StoreError> {
        let key = Self::make_key(R::COLLECTION, record.id());
        let bytes = Self::encode(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        if let Some(existing) = storage.get(&key) {
            return Err(StoreError::VersionConflict {
                collection: R::COLLECTION.to_string(),
                id: record.id().to_string(),
                expected: 0,
                actual: existing.version,
            });
        }

        storage.insert(key, StoredRecord { bytes, version: 1 });

        Ok(Versioned {
            data: record.clone(),
            version: 1,
        })
    }

    fn update<R: Record>(
        &self,
        record: &R,
        expected_version: u64,
    ) -> Result<Versioned<R>, StoreError> {
        let key = Self::make_key(R::COLLECTION, record.id());
        let bytes = Self::encode(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let actual_version = storage
            .get(&key)
            .map(|s| s.version)
            .ok_or_else(|| StoreError::NotFound {
                collection: R::COLLECTION.to_string(),
                id: record.id().to_string(),
            })?;

        if actual_version != expected_version {
            return Err(StoreError::VersionConflict {
                collection: R::COLLECTION.to_string(),
                id: record.id().to_string(),
                expected: expected_version,
                actual: actual_version,
            });
        }

        let new_version = actual_version + 1;
        storage.insert(
            key,
            StoredRecord {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: record.clone(),
            version: new_version,
        })
    }

    fn save<R: Record>(&self, record: &R) -> Result<Versioned<R>, StoreError> {
        let key = Self::make_key(R::COLLECTION, record.id());
        let bytes = Self::encode(record)?;

        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let new_version = storage.get(&key).map(|s| s.version + 1).unwrap_or(1);

        storage.insert(
            key,
            StoredRecord {
                bytes,
                version: new_version,
            },
        );

        Ok(Versioned {
            data: record.clone(),
            version: new_version,
        })
    }

    fn delete<R: Record>(&self, id: &str) -> Result<bool, StoreError> {
        let key = Self::make_key(R::COLLECTION, id);
        let mut storage = self
            .storage
            .write()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        Ok(storage.remove(&key).is_some())
    }

    fn find<R: Record>(
        &self,
        predicate: &dyn Fn(&R) -> bool,
    ) -> Result<Vec<Versioned<R>>, StoreError> {
        let storage = self
            .storage
            .read()
            .map_err(|_| StoreError::Storage("lock poisoned".into()))?;

        let prefix = format!("{}:", R::COLLECTION);
        let mut results = Vec::new();

        for (key, stored) in storage.iter() {
            if key.starts_with(&prefix) {
                if let Ok(data) = serde_json::from_slice::<R>(&stored.bytes) {
                    if predicate(&data) {
                        results.push(Versioned {
                            data,
                            version: stored.version,
                        });
                    }
                }
            }
        }

        Ok(results)
    }
}
