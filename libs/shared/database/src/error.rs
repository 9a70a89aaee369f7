use mongodb::bson;
use thiserror::Error;

use shared_models::error::AppError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Document serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Document deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Unsupported update document: {0}")]
    UnsupportedUpdate(String),

    #[error("Transaction aborted: {0}")]
    TransactionAborted(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err.to_string())
    }
}
