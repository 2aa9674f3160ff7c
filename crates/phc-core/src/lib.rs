//! phc-core: stable foundation for ph-chart.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{PhcError, PhcResult};
pub use numeric::*;
pub use units::*;
