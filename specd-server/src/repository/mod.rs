//! Repository Module
//!
//! Data access layer for specd.
//! [`JobSpecStore`] is the seam; `postgres` and `memory` implement it.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{EntityKind, JobSpecStore, StoreError, StoreResult};
