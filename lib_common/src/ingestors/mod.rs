//! # Data Ingestors Module
//!
//! This module serves as the central hub for all data ingestion clients in
//! the lurker console. Each submodule is a client for one external source,
//! handling the logic required to connect, receive data, and manage the
//! lifecycle of that source.
//!
//! ## Contained Modules:
//! - **`lurker_mq`**: the resilient ZeroMQ subscriber for the capture event
//!   stream published by the sniffer daemon.
//!
//! The primary structs are re-exported so callers can reach them via
//! `lib_common::ingestors::...`.

/// The ZeroMQ subscriber client for the sniffer's capture event stream.
pub mod lurker_mq;

// --- Public API Re-exports ---
pub use lurker_mq::{LurkerMqConfig, LurkerMqIngestor};
