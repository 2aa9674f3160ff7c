//! phc-tables: property-table interpolation and phase-state resolution
//! for ph-chart.
//!
//! Provides:
//! - JSON table document schema and a normalizing loader
//! - Bilinear grid interpolation with clamp-to-edge semantics
//! - Saturation curve model (pseudo-pure fluids and zeotropic blends)
//! - Optional dome-interior (pressure, quality) grid with quality inversion
//! - Phase resolver: h from (T, P), T from (P, h), entropy and quality,
//!   with saturation-boundary blending and branch continuity
//!
//! # Architecture
//!
//! A [`PropertyTable`] is built once per fluid selection and read-only
//! afterwards; every query against it is a pure, allocation-light
//! function, so concurrent queries are inherently safe. Out-of-range
//! physical queries degrade to NaN rather than erroring — only loading
//! a malformed table reports a [`TableError`].
//!
//! # Example
//!
//! ```no_run
//! use phc_core::units::{bar, deg_c};
//! use phc_tables::{PhaseMode, PhaseResolver, load_table};
//!
//! let table = load_table(std::path::Path::new("assets/tables/r134a.json")).unwrap();
//! let resolver = PhaseResolver::new(&table);
//! let state = resolver.enthalpy_from_tp(bar(4.0), deg_c(60.0), PhaseMode::Auto, None, None);
//! println!("h = {:.2} kJ/kg", state.enthalpy);
//! ```

pub mod error;
pub mod interp;
pub mod resolver;
pub mod saturation;
pub mod schema;
pub mod state;
pub mod table;
pub mod two_phase;

// Re-exports for ergonomics
pub use error::{TableError, TableResult};
pub use interp::{Grid, interp1, upper_bound};
pub use resolver::{PhaseResolver, ResolverConfig, TEMPERATURE_INVERT_TOL};
pub use saturation::{SaturationCurve, SaturationState};
pub use schema::TableDoc;
pub use state::{
    EditSource, PhaseHint, PhaseMode, ResolvedState, SpecEnthalpy, SpecEntropy, StatePoint,
};
pub use table::{Branch, PropertyTable, SinglePhaseField, load_table};
pub use two_phase::{DomeField, QUALITY_INVERT_TOL, TwoPhaseGrid};
