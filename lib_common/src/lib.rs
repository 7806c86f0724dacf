// Declare the modules to re-export
#[cfg(feature = "connections")]
pub mod connections;
#[cfg(feature = "ingestors")]
pub mod ingestors;

// Re-export the primary types
#[cfg(feature = "connections")]
pub use connections::db_mongo::{MongoStore, StoreError};
#[cfg(feature = "ingestors")]
pub use ingestors::lurker_mq::{LurkerMqConfig, LurkerMqIngestor};
