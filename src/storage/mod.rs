//! Fillwatch Storage
//!
//! This module provides persistence for fill-level events and the
//! locations/bins they belong to:
//!
//! - **types**: Core data structures (Event, Reading, EventFilter, Location, Bin)
//! - **database**: Shared handle opening one SQLite session per call
//! - **event_store**: Append-only event store behind the `EventStore` trait
//! - **registry**: Location and bin CRUD
//! - **error**: Error types
//!
//! # Architecture
//!
//! ```text
//! Write Path:
//!   Reading → Event (stamped) → EventStore::append → fill_events
//!
//! Read Path:
//!   EventFilter → EventStore::query → Vec<Event>
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use fillwatch::storage::{Database, Event, EventStore, Registry, SqliteEventStore, StorageConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open(StorageConfig::new("./data")).await?;
//!
//!     let registry = Registry::new(db.clone());
//!     let plaza = registry.create_location("Plaza", "main entrance").await?;
//!     let bin = registry.create_bin(plaza.id, "bottle caps").await?;
//!
//!     let store = SqliteEventStore::new(db);
//!     store.append(Event::new(bin.id, 420.0, true)).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod database;
pub mod error;
pub mod event_store;
pub mod registry;
pub mod types;

// Re-export commonly used types
pub use database::{Database, StorageConfig};
pub use error::{StorageError, StorageResult};
pub use event_store::{EventStore, SqliteEventStore};
pub use registry::Registry;
pub use types::{Bin, BinId, Event, EventFilter, Location, LocationId, Reading};
