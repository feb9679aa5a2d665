//! Helper around a local SQLite database file with a tabular frame
//! interchange: load a [`DataFrame`] into a table, query anything back out
//! as a frame, and introspect what is there.
//!
//! The database lives in a single on-disk file (or in memory) and is driven
//! through one shared connection; [`Database`] clones cheaply and hands the
//! connection back when the last handle goes away or [`Database::close`] is
//! called.
//!
//! ```no_run
//! use framelite::{Database, DataFrame, IfExists, Result, Value};
//!
//! fn main() -> Result<()> {
//!     let db = Database::open("data/app.db")?;
//!
//!     let mut people = DataFrame::new(["name", "age"]);
//!     people.push_row(vec![Value::from("ana"), Value::from(34)])?;
//!     people.push_row(vec![Value::from("bruno"), Value::from(29)])?;
//!     db.insert_frame(&people, "people", IfExists::Replace)?;
//!
//!     let adults = db.query("SELECT name FROM people WHERE age >= 30")?;
//!     println!("{}", adults);
//!
//!     db.close()?;
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod frame;

pub use db::{ColumnInfo, ColumnSpec, Database, IfExists, OpenOptions, TableSchema};
pub use error::{Error, Result};
pub use frame::{DataFrame, Value};
