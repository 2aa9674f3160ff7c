//! Two-phase (dome interior) region model.
//!
//! An optional grid indexed by (pressure, vapor quality) giving
//! temperature and enthalpy inside the dome. Preferred over linear
//! liquid/vapor endpoint interpolation when present because it captures
//! the non-linear glide behavior of blends.

use crate::error::TableResult;
use crate::interp::Grid;
use crate::schema::TwoPhaseDoc;
use crate::table::{cells_to_grid, ensure_axis};
use phc_core::{BISECT_MAX_ITER, Real};

/// Residual below which a quality inversion is considered converged,
/// in the inverted field's natural units (K or kJ/kg).
pub const QUALITY_INVERT_TOL: Real = 1e-6;

/// Field stored in the dome grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomeField {
    /// Temperature [K].
    Temperature,
    /// Specific enthalpy [kJ/kg].
    Enthalpy,
}

/// Dome-interior property grid with a bisection-based quality inverter.
#[derive(Debug, Clone)]
pub struct TwoPhaseGrid {
    log_pbar: Vec<Real>,
    quality: Vec<Real>,
    temperature: Grid,
    enthalpy: Grid,
}

impl TwoPhaseGrid {
    pub(crate) fn from_doc(doc: TwoPhaseDoc) -> TableResult<Self> {
        ensure_axis(&doc.log_pbar, "twoPhase.logPbar must be strictly increasing with >= 2 points")?;
        ensure_axis(&doc.q, "twoPhase.q must be strictly increasing with >= 2 points")?;
        let temperature = cells_to_grid(doc.t, doc.q.len(), doc.log_pbar.len(), "twoPhase.T")?;
        let enthalpy = cells_to_grid(doc.h, doc.q.len(), doc.log_pbar.len(), "twoPhase.h")?;
        Ok(Self {
            log_pbar: doc.log_pbar,
            quality: doc.q,
            temperature,
            enthalpy,
        })
    }

    fn grid(&self, field: DomeField) -> &Grid {
        match field {
            DomeField::Temperature => &self.temperature,
            DomeField::Enthalpy => &self.enthalpy,
        }
    }

    /// Bilinear lookup at (pressure, quality).
    ///
    /// Pressure is clamped to the dome's tabulated range (the grid
    /// sampler clamps both coordinates). Non-positive pressures are NaN.
    pub fn sample(&self, field: DomeField, pressure_bar: Real, quality: Real) -> Real {
        if !(pressure_bar > 0.0) || !quality.is_finite() {
            return Real::NAN;
        }
        self.grid(field)
            .sample(&self.log_pbar, &self.quality, pressure_bar.log10(), quality)
    }

    /// Recover quality from a target field value at fixed pressure.
    ///
    /// Both T and h are monotonic in quality along an isobar, so the
    /// inversion bisects `q` in [0, 1]. Targets at or beyond the endpoint
    /// evaluations clamp to 0 or 1, tolerating small table rounding
    /// overshoot. NaN when either endpoint evaluation is invalid.
    pub fn invert_quality(&self, pressure_bar: Real, target: Real, field: DomeField) -> Real {
        let mut lo = 0.0;
        let mut hi = 1.0;

        let f_lo = self.sample(field, pressure_bar, lo) - target;
        let f_hi = self.sample(field, pressure_bar, hi) - target;
        if !f_lo.is_finite() || !f_hi.is_finite() {
            return Real::NAN;
        }
        if f_lo >= 0.0 {
            return 0.0;
        }
        if f_hi <= 0.0 {
            return 1.0;
        }

        for _ in 0..BISECT_MAX_ITER {
            let mid = 0.5 * (lo + hi);
            let f_mid = self.sample(field, pressure_bar, mid) - target;
            if !f_mid.is_finite() {
                break;
            }
            if f_mid.abs() < QUALITY_INVERT_TOL {
                return mid;
            }
            if f_mid > 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }
        }

        0.5 * (lo + hi)
    }

    /// Dome temperature from (pressure, enthalpy) via quality inversion.
    pub fn temperature_from_ph(&self, pressure_bar: Real, enthalpy: Real) -> Real {
        let q = self.invert_quality(pressure_bar, enthalpy, DomeField::Enthalpy);
        if !q.is_finite() {
            return Real::NAN;
        }
        self.sample(DomeField::Temperature, pressure_bar, q)
    }

    /// Dome enthalpy from (pressure, temperature) via quality inversion.
    pub fn enthalpy_from_tp(&self, pressure_bar: Real, temperature_k: Real) -> Real {
        let q = self.invert_quality(pressure_bar, temperature_k, DomeField::Temperature);
        if !q.is_finite() {
            return Real::NAN;
        }
        self.sample(DomeField::Enthalpy, pressure_bar, q)
    }
}
