//! Saturation curve model.
//!
//! A pressure-ordered list of saturation states interpolated linearly in
//! pressure. Pseudo-pure fluids carry one saturation temperature per
//! pressure; zeotropic blends carry distinct bubble and dew temperatures
//! (a temperature glide). Normalization at load time copies the single
//! temperature into both bubble and dew when a table omits them, so
//! queries never re-check document shape.

use phc_core::{Real, clamp01};

/// Threshold below which bubble and dew are treated as coincident [K].
pub const GLIDE_EPSILON_K: Real = 1e-6;

/// Saturation properties at one pressure.
///
/// Enthalpies are in kJ/kg, temperatures in kelvin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturationState {
    pub pressure_pa: Real,
    pub bubble_t_k: Real,
    pub dew_t_k: Real,
    pub mean_t_k: Real,
    pub liquid_enthalpy: Real,
    pub vapor_enthalpy: Real,
}

impl SaturationState {
    /// Whether this state has a real temperature glide (zeotropic blend).
    pub fn has_glide(&self) -> bool {
        self.bubble_t_k.is_finite()
            && self.dew_t_k.is_finite()
            && self.dew_t_k > self.bubble_t_k + GLIDE_EPSILON_K
    }

    /// Whether the dome has usable width at this pressure.
    ///
    /// False at a degenerate dome (critical point, table noise where
    /// `hV <= hL`); quality is then undefined.
    pub fn has_enthalpy_span(&self) -> bool {
        self.vapor_enthalpy > self.liquid_enthalpy
    }

    /// Mixture enthalpy at the given quality [kJ/kg].
    pub fn enthalpy_at_quality(&self, quality: Real) -> Real {
        self.liquid_enthalpy + quality * (self.vapor_enthalpy - self.liquid_enthalpy)
    }

    /// Vapor quality for a mixture enthalpy, clamped to [0, 1].
    ///
    /// NaN when the dome is degenerate or the enthalpy is not finite.
    pub fn quality_from_enthalpy(&self, enthalpy: Real) -> Real {
        if !self.has_enthalpy_span() || !enthalpy.is_finite() {
            return Real::NAN;
        }
        clamp01((enthalpy - self.liquid_enthalpy) / (self.vapor_enthalpy - self.liquid_enthalpy))
    }

    /// Temperature of a mixture at the given quality [K].
    ///
    /// Follows the glide band for blends; pseudo-pure states boil at the
    /// single saturation temperature regardless of quality.
    pub fn temperature_at_quality(&self, quality: Real) -> Real {
        if self.has_glide() {
            self.bubble_t_k + quality * (self.dew_t_k - self.bubble_t_k)
        } else {
            self.mean_t_k
        }
    }
}

/// View over the table's ordered saturation records.
#[derive(Debug, Clone, Copy)]
pub struct SaturationCurve<'a> {
    records: &'a [SaturationState],
}

impl<'a> SaturationCurve<'a> {
    /// Wrap a record slice. Fewer than two records cannot be
    /// interpolated, so the curve is absent.
    pub fn new(records: &'a [SaturationState]) -> Option<Self> {
        if records.len() < 2 {
            return None;
        }
        Some(Self { records })
    }

    pub fn records(&self) -> &'a [SaturationState] {
        self.records
    }

    /// Lowest and highest tabulated pressures [Pa].
    pub fn pressure_range_pa(&self) -> (Real, Real) {
        (
            self.records[0].pressure_pa,
            self.records[self.records.len() - 1].pressure_pa,
        )
    }

    /// Interpolated saturation state at a pressure.
    ///
    /// Every field interpolates linearly in pressure (not log-pressure)
    /// between the bracketing records. Outside the tabulated range the
    /// result is `None`, unless `clamp_to_range` is set, in which case
    /// the pressure clamps to the nearest bound. Non-positive pressures
    /// are always `None`.
    pub fn state_at_pressure(
        &self,
        pressure_pa: Real,
        clamp_to_range: bool,
    ) -> Option<SaturationState> {
        if !(pressure_pa > 0.0) {
            return None;
        }
        let (p_min, p_max) = self.pressure_range_pa();
        let mut p = pressure_pa;
        if p < p_min || p > p_max {
            if !clamp_to_range {
                return None;
            }
            p = p.clamp(p_min, p_max);
        }

        // Bracketing pair by binary search on record pressure.
        let mut lo = 0usize;
        let mut hi = self.records.len() - 1;
        while hi - lo > 1 {
            let mid = (lo + hi) / 2;
            if self.records[mid].pressure_pa <= p {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let a = &self.records[lo];
        let b = &self.records[hi];
        let t = (p - a.pressure_pa) / (b.pressure_pa - a.pressure_pa);
        let lerp = |x: Real, y: Real| x * (1.0 - t) + y * t;

        let bubble = lerp(a.bubble_t_k, b.bubble_t_k);
        let dew = lerp(a.dew_t_k, b.dew_t_k);
        // Mean is the bubble/dew average when both exist; otherwise fall
        // back to the interpolated plain temperature so pseudo-pure
        // tables keep working without special cases.
        let mean = if bubble.is_finite() && dew.is_finite() {
            0.5 * (bubble + dew)
        } else {
            lerp(a.mean_t_k, b.mean_t_k)
        };

        Some(SaturationState {
            pressure_pa: p,
            bubble_t_k: bubble,
            dew_t_k: dew,
            mean_t_k: mean,
            liquid_enthalpy: lerp(a.liquid_enthalpy, b.liquid_enthalpy),
            vapor_enthalpy: lerp(a.vapor_enthalpy, b.vapor_enthalpy),
        })
    }
}
