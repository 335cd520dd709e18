//! studypath-store — Record store implementations.
//!
//! Implements the `RecordStore` trait in memory and on top of a JSON data
//! file, and loads the `studypath.toml` configuration that points at them.

pub mod config;
pub mod error;
pub mod file;
pub mod memory;
pub mod mock;

pub use config::{create_store, load_config, StudypathConfig};
pub use error::StoreError;
pub use file::JsonFileStore;
pub use memory::MemoryStore;
