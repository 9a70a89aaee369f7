pub mod error;
pub mod memory;
pub mod mongo;
pub mod store;

pub use error::DatabaseError;
pub use memory::InMemoryStore;
pub use mongo::MongoStore;
pub use store::*;

pub use mongodb::bson;
