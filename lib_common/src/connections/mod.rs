//! # Connections Module
//!
//! This module handles persistent connections to external services.
//! Currently the only external service is the document store that holds
//! captured network events.

/// Module for MongoDB document store access and event persistence.
pub mod db_mongo;
