use crate::PhcError;

/// Floating point type used throughout the system
pub type Real = f64;

/// Iteration cap shared by every bisection loop in the engine.
///
/// 60 halvings of a unit interval reach ~1e-18, far below any table
/// resolution, so every loop terminates quickly and can never hang.
pub const BISECT_MAX_ITER: usize = 60;

/// One tolerance for everything
#[derive(Clone, Copy, Debug)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            abs: 1e-12,
            rel: 1e-9,
        }
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    if diff <= tol.abs {
        return true;
    }
    diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, PhcError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(PhcError::NonFinite { what, value: v })
    }
}

/// Clamp a value to the closed unit interval.
///
/// NaN passes through unchanged so invalid qualities stay invalid.
pub fn clamp01(v: Real) -> Real {
    v.clamp(0.0, 1.0)
}
