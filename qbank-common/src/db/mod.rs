//! Database schema and initialization

pub mod init;

pub use init::{init_database, init_memory_database};
