// In crates/core-types/src/lib.rs

pub mod error;
pub mod portfolio;
pub mod request;
pub mod types;

// Re-export the most important types for easy access from other crates.
pub use error::{Error, Result};
pub use portfolio::{Instrument, MarginMode, PortfolioConfiguration, SizingMode};
pub use request::{RawInstrumentInput, RawSizingRequest, RawTableRequest, TableRow};
pub use types::{DerivedPosition, Leg, MarginModel, SizingRequest, checked_sum};
