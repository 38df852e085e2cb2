//! Cleo Store — graph model, SQLite persistence, in-memory graph view.

pub mod graph;
pub mod schema;
pub mod sqlite;
pub mod types;

pub use graph::{GraphStats, GraphView};
pub use sqlite::{GraphStore, StoreOptions};
pub use types::*;
