// In crates/analytics/src/lib.rs

pub mod engine;
pub mod error;
pub mod types;

pub use engine::{AnalyticsEngine, KNOWN_SECTORS};
pub use error::{Error, Result};
pub use types::{PositionLine, SectorSubtotal, SizingResult};
