// Core data structures shared by the grouping and execution layers
pub mod column;
pub mod error;
pub mod index;

// Re-exports for convenience
pub use column::{Column, ColumnType};
pub use error::{Error, Result};
pub use index::Index;
