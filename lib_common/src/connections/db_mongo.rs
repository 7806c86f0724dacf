//! # MongoDB Store
//!
//! Provides access to the document store holding captured network events.
//! Events arrive as schema-less MessagePack maps from the sniffer daemon and
//! are stored verbatim, so the store works on generic BSON documents rather
//! than typed models.

use std::time::Duration;

use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::Client;
use thiserror::Error;

/// Name of the database holding capture data.
pub const DB_NAME: &str = "lurker";

/// Collection receiving deserialized ARP request observations.
pub const EVENT_COLLECTION: &str = "arp_req";

/// Custom error types for document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to connect to document store: {0}")]
    Connection(String),
    #[error("Server command failed: {0}")]
    Command(String),
    #[error("Payload cannot be stored as a document: {0}")]
    Convert(String),
    #[error("Insert failed: {0}")]
    Insert(String),
}

/// A wrapper around the MongoDB client, pinned to the capture database.
pub struct MongoStore {
    /// The underlying driver client. Connections are established lazily.
    client: Client,
}

impl MongoStore {
    /// Creates a client for the store at the given connection string.
    ///
    /// # Arguments
    /// * `url` - The full connection string (e.g., "mongodb://localhost:27017").
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        // Fail fast instead of the driver's 30s default when the server is away.
        options.server_selection_timeout = Some(Duration::from_secs(3));

        let client =
            Client::with_options(options).map_err(|e| StoreError::Connection(e.to_string()))?;

        Ok(Self { client })
    }

    /// Checks the health of the store by running a `ping` command.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.client
            .database(DB_NAME)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| StoreError::Command(e.to_string()))?;

        Ok(())
    }

    /// Inserts one decoded capture event into the event collection.
    ///
    /// The event is written as-is; no schema is enforced and no identity or
    /// deduplication scheme exists. Returns the id assigned by the server.
    pub async fn insert_event(&self, event: &serde_json::Value) -> Result<Bson, StoreError> {
        let document = value_to_document(event)?;

        let result = self
            .client
            .database(DB_NAME)
            .collection::<Document>(EVENT_COLLECTION)
            .insert_one(document)
            .await
            .map_err(|e| StoreError::Insert(e.to_string()))?;

        log::debug!("Inserted capture event {}", result.inserted_id);
        Ok(result.inserted_id)
    }
}

/// Converts a decoded payload into a BSON document.
///
/// Map payloads convert field by field. Anything else (the sender controls
/// the encoding) is wrapped under a `value` key so the insert always
/// receives a valid document.
pub fn value_to_document(value: &serde_json::Value) -> Result<Document, StoreError> {
    let bson = mongodb::bson::to_bson(value).map_err(|e| StoreError::Convert(e.to_string()))?;
    match bson {
        Bson::Document(document) => Ok(document),
        other => Ok(doc! { "value": other }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn map_payload_becomes_document() {
        let event = json!({
            "src_addr": "10.0.0.5",
            "dst_addr": "10.0.0.1",
            "src_hw": "00:11:22:33:44:55",
            "dst_hw": "ff:ff:ff:ff:ff:ff",
            "replied": false,
        });

        let document = value_to_document(&event).unwrap();
        assert_eq!(document.get_str("src_addr").unwrap(), "10.0.0.5");
        assert_eq!(document.get_str("dst_hw").unwrap(), "ff:ff:ff:ff:ff:ff");
        assert!(!document.get_bool("replied").unwrap());
    }

    #[test]
    fn nested_fields_survive_conversion() {
        let event = json!({
            "event": "arp-req",
            "packet": { "ethertype": 2054, "op": 1 },
        });

        let document = value_to_document(&event).unwrap();
        let packet = document.get_document("packet").unwrap();
        assert_eq!(packet.get_i64("op").unwrap(), 1);
    }

    #[test]
    fn scalar_payload_is_wrapped() {
        let document = value_to_document(&json!("hello")).unwrap();
        assert_eq!(document.get_str("value").unwrap(), "hello");
    }

    #[test]
    fn array_payload_is_wrapped() {
        let document = value_to_document(&json!(["a", "b"])).unwrap();
        assert_eq!(document.get_array("value").unwrap().len(), 2);
    }

    #[test]
    fn two_events_convert_independently() {
        let first = value_to_document(&json!({ "seq": 1 })).unwrap();
        let second = value_to_document(&json!({ "seq": 2 })).unwrap();
        assert_ne!(
            first.get_i64("seq").unwrap(),
            second.get_i64("seq").unwrap()
        );
    }
}
