use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, oid::ObjectId, Bson, Document};
use serde::{de::DeserializeOwned, Serialize};

use crate::error::DatabaseError;

pub const SERVICES: &str = "services";
pub const BOOKINGS: &str = "bookings";
pub const USERS: &str = "users";
pub const DOCTORS: &str = "doctors";
pub const PAYMENTS: &str = "payments";

/// Result of a single insert, shaped like the MongoDB driver reply.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub acknowledged: bool,
    pub inserted_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOutcome {
    pub acknowledged: bool,
    pub deleted_count: u64,
}

/// One write inside an all-or-nothing batch.
#[derive(Debug, Clone)]
pub enum WriteOp {
    InsertOne {
        collection: &'static str,
        document: Document,
    },
    UpdateOne {
        collection: &'static str,
        filter: Document,
        update: Document,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WriteOutcome {
    Inserted(InsertOutcome),
    Updated(UpdateOutcome),
}

/// Filter/update access to a single named collection.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Vec<Document>, DatabaseError>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError>;

    async fn insert_one(&self, document: Document) -> Result<InsertOutcome, DatabaseError>;

    /// Inserts `document` unless a document matching `filter` already exists.
    /// Returns the stored document on conflict and `None` when the insert happened.
    async fn insert_if_absent(
        &self,
        filter: Document,
        document: Document,
    ) -> Result<Option<Document>, DatabaseError>;

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError>;

    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, DatabaseError>;
}

/// Handle to the logical database. Constructed once at startup and shared
/// through application state.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;

    /// Applies every write or none of them.
    async fn write_atomically(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;

    async fn ensure_indexes(&self) -> Result<(), DatabaseError>;

    async fn shutdown(&self) {}
}

pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn parse_object_id(raw: &str) -> Option<ObjectId> {
    ObjectId::parse_str(raw).ok()
}

pub fn decode<T: DeserializeOwned>(document: Document) -> Result<T, DatabaseError> {
    Ok(bson::from_document(document)?)
}

pub fn decode_all<T: DeserializeOwned>(documents: Vec<Document>) -> Result<Vec<T>, DatabaseError> {
    documents.into_iter().map(decode).collect()
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, DatabaseError> {
    Ok(bson::to_document(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_ids_render_as_hex() {
        let oid = ObjectId::new();
        assert_eq!(id_to_string(&Bson::ObjectId(oid)), oid.to_hex());
        assert_eq!(parse_object_id(&oid.to_hex()), Some(oid));
        assert_eq!(parse_object_id("not-an-id"), None);
    }

    #[test]
    fn update_outcome_uses_driver_field_names() {
        let outcome = UpdateOutcome {
            acknowledged: true,
            matched_count: 1,
            modified_count: 1,
            upserted_count: 0,
            upserted_id: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["matchedCount"], 1);
        assert_eq!(json["modifiedCount"], 1);
        assert!(json["upsertedId"].is_null());
    }
}
