// Database module
// This module handles SQLite connections and frame-level operations

pub mod connection;
pub mod ident;
pub mod operations;
pub mod schema;

pub use connection::{Database, OpenOptions};
pub use operations::IfExists;
pub use schema::{ColumnInfo, ColumnSpec, TableSchema};
