use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    error::{ErrorKind, WriteFailure},
    options::{ClientOptions, IndexOptions, ReturnDocument},
    Client, ClientSession, Collection, Database, IndexModel,
};
use tracing::{debug, error, info, warn};

use shared_config::AppConfig;

use crate::error::DatabaseError;
use crate::store::{
    id_to_string, DeleteOutcome, DocumentCollection, DocumentStore, InsertOutcome, UpdateOutcome,
    WriteOp, WriteOutcome, BOOKINGS, DOCTORS, USERS,
};

const DUPLICATE_KEY: i32 = 11000;

pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    pub async fn connect(config: &AppConfig) -> Result<Self, DatabaseError> {
        debug!("Connecting to MongoDB database '{}'", config.db_name);

        let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
        options.app_name = Some("doctors-portal-api".to_string());

        let client = Client::with_options(options)?;
        let database = client.database(&config.db_name);

        Ok(Self { client, database })
    }

    async fn apply(
        &self,
        op: WriteOp,
        session: &mut ClientSession,
    ) -> Result<WriteOutcome, DatabaseError> {
        match op {
            WriteOp::InsertOne { collection, document } => {
                let result = self
                    .database
                    .collection::<Document>(collection)
                    .insert_one(document)
                    .session(&mut *session)
                    .await?;
                Ok(WriteOutcome::Inserted(InsertOutcome {
                    acknowledged: true,
                    inserted_id: id_to_string(&result.inserted_id),
                }))
            }
            WriteOp::UpdateOne { collection, filter, update } => {
                let result = self
                    .database
                    .collection::<Document>(collection)
                    .update_one(filter, update)
                    .session(&mut *session)
                    .await?;
                Ok(WriteOutcome::Updated(update_outcome(result)))
            }
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(MongoCollection {
            inner: self.database.collection(name),
        })
    }

    async fn write_atomically(&self, ops: Vec<WriteOp>) -> Result<Vec<WriteOutcome>, DatabaseError> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            match self.apply(op, &mut session).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!("Aborting transaction: {}", e);
                    if let Err(abort_err) = session.abort_transaction().await {
                        warn!("Failed to abort transaction cleanly: {}", abort_err);
                    }
                    return Err(DatabaseError::TransactionAborted(e.to_string()));
                }
            }
        }

        session.commit_transaction().await?;
        Ok(outcomes)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), DatabaseError> {
        let unique = IndexOptions::builder().unique(true).build();

        let indexes = [
            (BOOKINGS, doc! { "treatment": 1, "date": 1, "patient": 1 }),
            (USERS, doc! { "email": 1 }),
            (DOCTORS, doc! { "email": 1 }),
        ];

        for (collection, keys) in indexes {
            let model = IndexModel::builder()
                .keys(keys)
                .options(unique.clone())
                .build();
            let result = self
                .database
                .collection::<Document>(collection)
                .create_index(model)
                .await?;
            debug!("Ensured index {} on {}", result.index_name, collection);
        }

        info!("MongoDB indexes ensured");
        Ok(())
    }

    async fn shutdown(&self) {
        info!("Closing MongoDB client");
        self.client.clone().shutdown().await;
    }
}

pub struct MongoCollection {
    inner: Collection<Document>,
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    async fn find(
        &self,
        filter: Document,
        projection: Option<Document>,
    ) -> Result<Vec<Document>, DatabaseError> {
        debug!("find on {} with filter {}", self.inner.name(), filter);

        let mut action = self.inner.find(filter);
        if let Some(projection) = projection {
            action = action.projection(projection);
        }

        let cursor = action.await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError> {
        debug!("findOne on {} with filter {}", self.inner.name(), filter);
        Ok(self.inner.find_one(filter).await?)
    }

    async fn insert_one(&self, document: Document) -> Result<InsertOutcome, DatabaseError> {
        let result = self.inner.insert_one(document).await?;
        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id_to_string(&result.inserted_id),
        })
    }

    async fn insert_if_absent(
        &self,
        filter: Document,
        document: Document,
    ) -> Result<Option<Document>, DatabaseError> {
        let result = self
            .inner
            .find_one_and_update(filter.clone(), doc! { "$setOnInsert": document })
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .await;

        match result {
            Ok(existing) => Ok(existing),
            // A concurrent upsert won the unique index; report its document.
            Err(e) if is_duplicate_key(&e) => {
                debug!("Concurrent insert detected on {}", self.inner.name());
                Ok(self.inner.find_one(filter).await?)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn update_one(
        &self,
        filter: Document,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let result = self.inner.update_one(filter, update).upsert(upsert).await?;
        Ok(update_outcome(result))
    }

    async fn delete_one(&self, filter: Document) -> Result<DeleteOutcome, DatabaseError> {
        let result = self.inner.delete_one(filter).await?;
        Ok(DeleteOutcome {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }
}

fn update_outcome(result: mongodb::results::UpdateResult) -> UpdateOutcome {
    UpdateOutcome {
        acknowledged: true,
        matched_count: result.matched_count,
        modified_count: result.modified_count,
        upserted_count: u64::from(result.upserted_id.is_some()),
        upserted_id: result.upserted_id.as_ref().map(id_to_string),
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Command(command) => command.code == DUPLICATE_KEY,
        ErrorKind::Write(WriteFailure::WriteError(write)) => write.code == DUPLICATE_KEY,
        _ => false,
    }
}
