//! # Lurker MQ Ingestor
//!
//! Subscriber client for the capture event stream the sniffer daemon
//! publishes over ZeroMQ. Every frame is one MessagePack value; the
//! subscription is unfiltered, so whatever the daemon emits lands here.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use zeromq::{Socket, SocketRecv, SubSocket, ZmqMessage};

use crate::connections::db_mongo::{MongoStore, StoreError};

/// Configuration for the capture event subscription.
pub struct LurkerMqConfig {
    pub endpoint: String,
    pub reconnect_delay: Duration,
}

impl Default for LurkerMqConfig {
    fn default() -> Self {
        Self {
            endpoint: "tcp://localhost:3000".to_string(),
            reconnect_delay: Duration::from_secs(10),
        }
    }
}

/// Errors surfaced while receiving or persisting a capture event.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Socket error: {0}")]
    Socket(#[from] zeromq::ZmqError),
    #[error("Failed to decode frame: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),
    #[error("Message carried no payload frame")]
    EmptyMessage,
}

pub struct LurkerMqIngestor {
    config: LurkerMqConfig,
    store: Arc<MongoStore>,
}

impl LurkerMqIngestor {
    /// Creates a new ingestor writing into the given store.
    pub fn new(config: LurkerMqConfig, store: Arc<MongoStore>) -> Self {
        Self { config, store }
    }

    /// Primary execution loop with reconnection logic.
    ///
    /// Connection-level failures (endpoint down, stream reset) tear the
    /// socket down and retry after `reconnect_delay`. Frame-level failures
    /// (bad encoding, storage fault) drop that frame and keep the socket.
    pub async fn run(&self) {
        loop {
            log::info!("Connecting to capture stream: {}", self.config.endpoint);

            match self.subscribe().await {
                Ok(mut socket) => {
                    log::info!("Subscribed to all topics on {}", self.config.endpoint);

                    loop {
                        match socket.recv().await {
                            Ok(message) => {
                                if let Err(e) = self.handle_message(message).await {
                                    log::warn!("Dropping frame: {}", e);
                                }
                            }
                            Err(e) => {
                                log::error!("MQ receive error: {}", e);
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    log::error!(
                        "Failed to connect to {}: {}",
                        self.config.endpoint,
                        e
                    );
                }
            }

            log::warn!(
                "Reconnecting in {}s...",
                self.config.reconnect_delay.as_secs()
            );
            tokio::time::sleep(self.config.reconnect_delay).await;
        }
    }

    /// Opens the SUB socket and subscribes to the unfiltered topic stream.
    async fn subscribe(&self) -> Result<SubSocket, IngestError> {
        let mut socket = SubSocket::new();
        socket.connect(&self.config.endpoint).await?;
        socket.subscribe("").await?;
        Ok(socket)
    }

    /// Handles one inbound message: decode the payload frame, persist it.
    async fn handle_message(&self, message: ZmqMessage) -> Result<(), IngestError> {
        log::info!("received data");

        let event = decode_frame(&message)?;
        log::debug!("decoded capture event: {}", event);

        self.store.insert_event(&event).await?;
        Ok(())
    }
}

/// Extracts the payload frame of a message and decodes it from MessagePack.
///
/// The sniffer publishes single-frame messages. Publishers that prefix a
/// topic frame are tolerated: the payload is the final frame.
pub fn decode_frame(message: &ZmqMessage) -> Result<serde_json::Value, IngestError> {
    let last = message.len().checked_sub(1).ok_or(IngestError::EmptyMessage)?;
    let payload = message.get(last).ok_or(IngestError::EmptyMessage)?;
    Ok(rmp_serde::from_slice(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use serde_json::json;

    fn packed(value: &serde_json::Value) -> Bytes {
        Bytes::from(rmp_serde::to_vec(value).unwrap())
    }

    #[test]
    fn default_config_targets_the_local_daemon() {
        let config = LurkerMqConfig::default();
        assert_eq!(config.endpoint, "tcp://localhost:3000");
        assert_eq!(config.reconnect_delay, Duration::from_secs(10));
    }

    #[test]
    fn single_frame_message_decodes() {
        let event = json!({
            "src_addr": "192.168.0.10",
            "dst_addr": "192.168.0.1",
            "replied": true,
        });

        let message = ZmqMessage::from(packed(&event));
        let decoded = decode_frame(&message).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn topic_prefixed_message_uses_final_frame() {
        let event = json!({ "event": "arp-req" });

        let mut message = ZmqMessage::from(Bytes::from_static(b"lurker.arp-req"));
        message.push_back(packed(&event));

        let decoded = decode_frame(&message).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn garbage_frame_is_a_decode_error() {
        let message = ZmqMessage::from(Bytes::from_static(&[0xc1]));
        assert!(matches!(
            decode_frame(&message),
            Err(IngestError::Decode(_))
        ));
    }
}
