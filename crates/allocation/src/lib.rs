// In crates/allocation/src/lib.rs

pub mod deriver;
pub mod distributor;
pub mod engine;
pub mod error;
pub mod table;
pub mod validator;

mod parse;

// Re-export public types
pub use distributor::{BaseStakeDistributor, Distribution, MarginDistributor, WeightedDistributor};
pub use engine::{AllocationEngine, TableSizing, allocate, size_table};
pub use error::{Error, Result};
pub use table::{ExcludedRow, RowRejection, TableValidation, validate_table};
pub use validator::validate;
