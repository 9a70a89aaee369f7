use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use tracing::debug;

use crate::error::DatabaseError;
use crate::store::{
    id_to_string, DeleteOutcome, DocumentCollection, DocumentStore, InsertOutcome, UpdateOutcome,
    WriteOp, WriteOutcome,
};

type Collections = HashMap<String, Vec<Document>>;

/// Process-local document store used by tests and `DOCUMENT_STORE=memory`.
///
/// Supports equality filters, inclusion projections and the `$set` /
/// `$setOnInsert` update operators. Every operation holds one lock, so
/// conditional inserts and batches are atomic.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts documents as-is, assigning an `_id` where missing.
    pub fn seed(&self, collection: &str, documents: Vec<Document>) -> Result<(), DatabaseError> {
        let mut guard = lock(&self.collections)?;
        let entries = guard.entry(collection.to_string()).or_default();
        for mut document in documents {
            ensure_id(&mut document);
            entries.push(document);
        }
        Ok(())
    }

    pub fn count(&self, collection: &str) -> Result<usize, DatabaseError> {
        let guard = lock(&self.collections)?;
        Ok(guard.get(collection).map(Vec::len).unwrap_or(0))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(InMemoryCollection {
            name: name.to_string(),
            collections: self.collections.clone(),
        })
    }

    async fn write_atomically(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DatabaseError> {
        let mut guard = lock(&self.collections)?;

        // Stage copies of the touched collections and write them back only
        // when every write succeeded.
        let mut staged: Collections = HashMap::new();
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            let outcome = match op {
                WriteOp::InsertOne { collection, document } => {
                    let entries = stage(&mut staged, &guard, collection);
                    WriteOutcome::Inserted(insert(entries, document))
                }
                WriteOp::UpdateOne { collection, filter, update } => {
                    let entries = stage(&mut staged, &guard, collection);
                    let outcome = update_first(entries, &filter, &update, false)
                        .map_err(|e| DatabaseError::TransactionAborted(e.to_string()))?;
                    WriteOutcome::Updated(outcome)
                }
            };
            outcomes.push(outcome);
        }

        guard.extend(staged);
        Ok(outcomes)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        lock(&self.collections).map(|_| ())
    }

    async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        debug!("In-memory store has no indexes to build");
        Ok(())
    }
}

pub struct InMemoryCollection {
    name: String,
    collections: Arc<Mutex<Collections>>,
}

impl InMemoryCollection {
    fn with_entries<T>(
        &self,
        f: impl FnOnce(&mut Vec<Document>) -> Result<T, DatabaseError>,
    ) -> Result<T, DatabaseError> {
        let mut guard = lock(&self.collections)?;
        let entries = guard.entry(self.name.clone()).or_default();
        f(entries)
    }
}

#[async_trait]
impl DocumentCollection for InMemoryCollection {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Vec<Document>, DatabaseError> {
        self.with_entries(|entries| {
            Ok(entries
                .iter()
                .filter(|doc| matches_filter(doc, &filter))
                .map(|doc| match &projection {
                    Some(projection) => project(doc, projection),
                    None => doc.clone(),
                })
                .collect())
        })
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError> {
        self.with_entries(|entries| {
            Ok(entries.iter().find(|doc| matches_filter(doc, &filter)).cloned())
        })
    }

    async fn insert_one(&self, document: Document) -> Result<InsertOutcome, DatabaseError> {
        self.with_entries(|entries| Ok(insert(entries, document)))
    }

    async fn insert_if_absent(
        &self,
        filter: Document,
        document: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        self.with_entries(|entries| {
            if let Some(existing) = entries.iter().find(|doc| matches_filter(doc, &filter)) {
                return Ok(Some(existing.clone()));
            }
            insert(entries, document);
            Ok(None)
        })
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError> {
        self.with_entries(|entries| update_first(entries, &filter, &update, upsert))
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, DatabaseError> {
        self.with_entries(|entries| {
            let position = entries.iter().position(|doc| matches_filter(doc, &filter));
            let deleted_count = match position {
                Some(index) => {
                    entries.remove(index);
                    1
                }
                None => 0,
            };
            Ok(DeleteOutcome {
                acknowledged: true,
                deleted_count,
            })
        })
    }
}

fn lock(collections: &Mutex<Collections>) -> Result<MutexGuard<'_, Collections>, DatabaseError> {
    collections
        .lock()
        .map_err(|_| DatabaseError::Unavailable("in-memory store lock poisoned".to_string()))
}

fn stage<'a>(
    staged: &'a mut Collections,
    committed: &Collections,
    collection: &str,
) -> &'a mut Vec<Document> {
    staged
        .entry(collection.to_string())
        .or_insert_with(|| committed.get(collection).cloned().unwrap_or_default())
}

fn ensure_id(document: &mut Document) -> Bson {
    if let Some(id) = document.get("_id") {
        return id.clone();
    }
    let id = Bson::ObjectId(ObjectId::new());
    document.insert("_id", id.clone());
    id
}

fn insert(entries: &mut Vec<Document>, mut document: Document) -> InsertOutcome {
    let id = ensure_id(&mut document);
    entries.push(document);
    InsertOutcome {
        acknowledged: true,
        inserted_id: id_to_string(&id),
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(key, expected)| document.get(key) == Some(expected))
}

fn is_truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Int32(n) => *n != 0,
        Bson::Int64(n) => *n != 0,
        Bson::Double(n) => *n != 0.0,
        _ => true,
    }
}

fn project(document: &Document, projection: &Document) -> Document {
    let keep_id = projection.get("_id").map(is_truthy).unwrap_or(true);
    let mut projected = Document::new();

    if keep_id {
        if let Some(id) = document.get("_id") {
            projected.insert("_id", id.clone());
        }
    }
    for (key, flag) in projection {
        if key == "_id" || !is_truthy(flag) {
            continue;
        }
        if let Some(value) = document.get(key) {
            projected.insert(key.clone(), value.clone());
        }
    }
    projected
}

fn validate_update(update: &Document) -> Result<(), DatabaseError> {
    for (operator, fields) in update {
        match (operator.as_str(), fields) {
            ("$set", Bson::Document(_)) | ("$setOnInsert", Bson::Document(_)) => {}
            _ => return Err(DatabaseError::UnsupportedUpdate(operator.clone())),
        }
    }
    Ok(())
}

/// Applies `$set` and, when `inserting`, `$setOnInsert`. Returns whether any
/// field changed.
fn apply_update(
    document: &mut Document,
    update: &Document,
    inserting: bool,
) -> Result<bool, DatabaseError> {
    let mut changed = false;
    for (operator, fields) in update {
        let fields = match (operator.as_str(), fields) {
            ("$set", Bson::Document(fields)) => fields,
            ("$setOnInsert", Bson::Document(fields)) if inserting => fields,
            ("$setOnInsert", Bson::Document(_)) => continue,
            _ => return Err(DatabaseError::UnsupportedUpdate(operator.clone())),
        };
        for (key, value) in fields {
            if document.get(key) != Some(value) {
                document.insert(key.clone(), value.clone());
                changed = true;
            }
        }
    }
    Ok(changed)
}

fn update_first(
    entries: &mut Vec<Document>,
    filter: &Document,
    update: &Document,
    upsert: bool,
) -> Result<UpdateOutcome, DatabaseError> {
    // Operators are checked even when nothing matches.
    validate_update(update)?;

    if let Some(document) = entries.iter_mut().find(|doc| matches_filter(doc, filter)) {
        let mut candidate = document.clone();
        let changed = apply_update(&mut candidate, update, false)?;
        *document = candidate;
        return Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(changed),
            upserted_count: 0,
            upserted_id: None,
        });
    }

    if !upsert {
        return Ok(UpdateOutcome {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 0,
            upserted_id: None,
        });
    }

    let mut document = filter.clone();
    apply_update(&mut document, update, true)?;
    let inserted = insert(entries, document);
    Ok(UpdateOutcome {
        acknowledged: true,
        matched_count: 0,
        modified_count: 0,
        upserted_count: 1,
        upserted_id: Some(inserted.inserted_id),
    })
}
