//! Persistence layer: libSQL-backed storage for owners and businesses.

pub mod libsql_backend;
pub mod migrations;
pub mod traits;

pub use libsql_backend::LibSqlStore;
pub use traits::{BusinessFilter, BusinessStore, Owner};
