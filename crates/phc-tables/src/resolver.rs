//! Phase-state resolution.
//!
//! Orchestrates the grid interpolator, saturation curve, and dome grid
//! to answer the two supported queries — enthalpy from (T, P) and
//! temperature from (P, h) — continuously as a point is dragged across
//! phase boundaries. Every call is a pure function of its inputs plus
//! the table; the caller threads in the previous point explicitly when
//! it wants branch continuity.

use crate::saturation::SaturationState;
use crate::state::{EditSource, PhaseHint, PhaseMode, ResolvedState, SpecEnthalpy, SpecEntropy, StatePoint};
use crate::table::{Branch, PropertyTable, SinglePhaseField};
use crate::two_phase::DomeField;
use phc_core::units::{CELSIUS_OFFSET_K, Pressure, Temperature};
use phc_core::{BISECT_MAX_ITER, Real, clamp01};

/// Residual below which a temperature-axis inversion is considered
/// converged [kJ/kg].
pub const TEMPERATURE_INVERT_TOL: Real = 1e-4;

/// Tuning constants for boundary behavior.
///
/// All widths are empirical smoothing choices, not physics; they are
/// configurable so tests can probe them and callers can retune.
#[derive(Debug, Clone, Copy)]
pub struct ResolverConfig {
    /// Width of the linear blend between table and saturation enthalpy
    /// on a forced branch near the dome boundary [K].
    pub boundary_blend_k: Real,
    /// Deadband around the saturation boundary inside which auto mode
    /// treats the point as two-phase [K].
    pub deadband_k: Real,
    /// Distance outside the saturation band beyond which a requested
    /// temperature overrides continuity [K].
    pub continuity_override_k: Real,
    /// Slack on the dome's enthalpy bounds for classifying a (P, h)
    /// pair, absorbing table rounding noise [kJ/kg].
    pub dome_enthalpy_tol: Real,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            boundary_blend_k: 2.0,
            deadband_k: 0.5,
            continuity_override_k: 1.5,
            dome_enthalpy_tol: 0.5,
        }
    }
}

/// Answers state queries against one loaded table.
#[derive(Debug, Clone, Copy)]
pub struct PhaseResolver<'a> {
    table: &'a PropertyTable,
    config: ResolverConfig,
}

fn pressure_bar(p: Pressure) -> Real {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

fn kelvin_of(t: Temperature) -> Real {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

fn single(h: SpecEnthalpy, t_c: Real) -> ResolvedState {
    ResolvedState {
        enthalpy: h,
        temperature_c: t_c,
        quality: Real::NAN,
    }
}

impl<'a> PhaseResolver<'a> {
    pub fn new(table: &'a PropertyTable) -> Self {
        Self::with_config(table, ResolverConfig::default())
    }

    pub fn with_config(table: &'a PropertyTable, config: ResolverConfig) -> Self {
        Self { table, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Saturation state at a pressure given in bar.
    fn sat_at(&self, p_bar: Real, clamp_to_range: bool) -> Option<SaturationState> {
        self.table
            .saturation_curve()?
            .state_at_pressure(p_bar * 1.0e5, clamp_to_range)
    }

    /// Resolve enthalpy (and quality, when in the dome) from temperature
    /// and pressure under the requested phase mode.
    ///
    /// `previous` and `source` feed the continuity rule in auto mode:
    /// a point that was two-phase keeps its quality across edits that
    /// did not come from the temperature field.
    pub fn enthalpy_from_tp(
        &self,
        p: Pressure,
        t: Temperature,
        mode: PhaseMode,
        previous: Option<&StatePoint>,
        source: Option<EditSource>,
    ) -> ResolvedState {
        let p_bar = pressure_bar(p);
        let t_k = kelvin_of(t);
        let t_c = t_k - CELSIUS_OFFSET_K;
        if !(p_bar > 0.0) || !t_k.is_finite() {
            return ResolvedState::invalid();
        }
        match mode {
            PhaseMode::Liquid => single(self.single_phase_enthalpy(p_bar, t_k, Branch::Liquid), t_c),
            PhaseMode::Vapor => single(self.single_phase_enthalpy(p_bar, t_k, Branch::Vapor), t_c),
            PhaseMode::TwoPhase => self.forced_two_phase_from_tp(p_bar, t_k, previous),
            PhaseMode::Auto => self.enthalpy_auto(p_bar, t_k, previous, source),
        }
    }

    /// Resolve temperature (and quality) from pressure and enthalpy.
    pub fn temperature_from_ph(&self, p: Pressure, enthalpy: SpecEnthalpy) -> ResolvedState {
        self.temperature_from_ph_bar(pressure_bar(p), enthalpy)
    }

    /// Vapor quality for a (P, h) pair, NaN outside the dome (with the
    /// configured enthalpy slack) or when the dome is degenerate.
    pub fn quality_from_ph(&self, p: Pressure, enthalpy: SpecEnthalpy) -> Real {
        self.quality_from_ph_bar(pressure_bar(p), enthalpy)
    }

    /// Display classification of a (P, h) pair.
    ///
    /// Pressure clamps to the saturation range so off-table points still
    /// land in a reasonable bucket; unclassifiable states read as vapor.
    pub fn phase_hint(&self, p: Pressure, enthalpy: SpecEnthalpy) -> PhaseHint {
        self.phase_hint_bar(pressure_bar(p), enthalpy)
    }

    /// Clamp an enthalpy into the dome `[hL, hV]` at a pressure, used to
    /// pin forced two-phase enthalpy edits. Passes the value through
    /// when no usable dome exists.
    pub fn clamp_enthalpy_to_dome(&self, p: Pressure, enthalpy: SpecEnthalpy) -> SpecEnthalpy {
        let p_bar = pressure_bar(p);
        match self.sat_at(p_bar, true) {
            Some(s) if s.has_enthalpy_span() && enthalpy.is_finite() => {
                enthalpy.clamp(s.liquid_enthalpy, s.vapor_enthalpy)
            }
            _ => enthalpy,
        }
    }

    /// Recompute a pinned two-phase point at a new pressure, keeping its
    /// quality. Quality falls back to the previous point's (P, h)-derived
    /// value, then 0.5.
    pub fn two_phase_from_p_keep_quality(
        &self,
        p: Pressure,
        previous: Option<&StatePoint>,
    ) -> ResolvedState {
        let p_bar = pressure_bar(p);
        let s = match self.sat_at(p_bar, true) {
            Some(s) if s.has_enthalpy_span() => s,
            _ => return ResolvedState::invalid(),
        };
        let mut x = previous.map_or(Real::NAN, |pt| pt.quality);
        if !x.is_finite() {
            if let Some(pt) = previous {
                x = self.quality_from_ph_bar(pt.pressure_bar, pt.enthalpy);
            }
        }
        if !x.is_finite() {
            x = 0.5;
        }
        let x = clamp01(x);
        ResolvedState {
            enthalpy: s.enthalpy_at_quality(x),
            temperature_c: s.temperature_at_quality(x) - CELSIUS_OFFSET_K,
            quality: x,
        }
    }

    /// Single-phase entropy lookup under a phase mode.
    ///
    /// Auto mode classifies against the saturation band and refuses to
    /// report entropy inside it; use [`Self::entropy_for_point`] for
    /// mixture states. NaN when the table has no entropy grids.
    pub fn entropy_from_tp(&self, p: Pressure, t: Temperature, mode: PhaseMode) -> SpecEntropy {
        let p_bar = pressure_bar(p);
        let t_k = kelvin_of(t);
        if !self.table.has_entropy() {
            return Real::NAN;
        }
        let branch = match mode {
            PhaseMode::Liquid => Branch::Liquid,
            PhaseMode::Auto => {
                match self.classify_entropy_branch(p_bar, t_k) {
                    Some(b) => b,
                    None => return Real::NAN,
                }
            }
            _ => Branch::Vapor,
        };
        self.table
            .lookup(branch, SinglePhaseField::Entropy, p_bar, t_k)
    }

    /// Entropy for a resolved point, choosing the mixture rule inside
    /// the dome and a single-phase lookup outside.
    ///
    /// Two-phase entropy is the quality-weighted blend of the saturated
    /// endpoints evaluated at the bubble and dew temperatures — not the
    /// mean — because glide blends differ materially at each boundary.
    pub fn entropy_for_point(&self, point: &StatePoint) -> SpecEntropy {
        if !point.is_complete() || !self.table.has_entropy() {
            return Real::NAN;
        }
        let p_bar = point.pressure_bar;
        let h = point.enthalpy;

        let mut x = point.quality;
        if !x.is_finite() {
            x = self.quality_from_ph_bar(p_bar, h);
        }
        if x.is_finite() {
            x = clamp01(x);
        }

        if let Some(s) = self.sat_at(p_bar, true) {
            let tol = self.config.dome_enthalpy_tol;
            let in_dome = s.has_enthalpy_span()
                && h >= s.liquid_enthalpy - tol
                && h <= s.vapor_enthalpy + tol;
            if in_dome && x.is_finite() && s.bubble_t_k.is_finite() && s.dew_t_k.is_finite() {
                let s_liq =
                    self.table
                        .lookup(Branch::Liquid, SinglePhaseField::Entropy, p_bar, s.bubble_t_k);
                let s_vap =
                    self.table
                        .lookup(Branch::Vapor, SinglePhaseField::Entropy, p_bar, s.dew_t_k);
                if s_liq.is_finite() && s_vap.is_finite() {
                    return s_liq + x * (s_vap - s_liq);
                }
                return Real::NAN;
            }
        }

        let mut t_c = point.temperature_c;
        if !t_c.is_finite() {
            t_c = self.temperature_from_ph_bar(p_bar, h).temperature_c;
        }
        if !t_c.is_finite() {
            return Real::NAN;
        }
        let branch = match self.phase_hint_bar(p_bar, h) {
            PhaseHint::Liquid => Branch::Liquid,
            _ => Branch::Vapor,
        };
        self.table.lookup(
            branch,
            SinglePhaseField::Entropy,
            p_bar,
            t_c + CELSIUS_OFFSET_K,
        )
    }

    fn classify_entropy_branch(&self, p_bar: Real, t_k: Real) -> Option<Branch> {
        let Some(s) = self.sat_at(p_bar, false) else {
            return Some(Branch::Vapor);
        };
        let db = self.config.deadband_k;
        if s.has_glide() {
            if t_k <= s.bubble_t_k - db {
                return Some(Branch::Liquid);
            }
            if t_k >= s.dew_t_k + db {
                return Some(Branch::Vapor);
            }
            return None;
        }
        if s.bubble_t_k.is_finite() {
            if t_k <= s.bubble_t_k - db {
                return Some(Branch::Liquid);
            }
            if t_k >= s.bubble_t_k + db {
                return Some(Branch::Vapor);
            }
            return None;
        }
        Some(Branch::Vapor)
    }

    /// Forced-branch enthalpy with the anti-metastable clamp and
    /// boundary blend.
    ///
    /// A liquid query at or above the bubble point (or vapor at or below
    /// the dew point) returns the saturation enthalpy instead of
    /// extrapolating past the dome. Within `boundary_blend_k` of the
    /// boundary the table value blends linearly into the saturation
    /// value so the join has no visible kink.
    fn single_phase_enthalpy(&self, p_bar: Real, t_k: Real, branch: Branch) -> SpecEnthalpy {
        if let Some(s) = self.sat_at(p_bar, false) {
            let (t_sat, h_sat) = match branch {
                Branch::Liquid => (s.bubble_t_k, s.liquid_enthalpy),
                Branch::Vapor => (s.dew_t_k, s.vapor_enthalpy),
            };
            if t_sat.is_finite() {
                match branch {
                    Branch::Liquid if t_k >= t_sat => return h_sat,
                    Branch::Vapor if t_k <= t_sat => return h_sat,
                    _ => {}
                }
                let dt = (t_k - t_sat).abs();
                let blend = self.config.boundary_blend_k;
                if dt < blend {
                    let h_tab = self
                        .table
                        .lookup(branch, SinglePhaseField::Enthalpy, p_bar, t_k);
                    if h_tab.is_finite() && h_sat.is_finite() {
                        let t = dt / blend;
                        return h_sat * (1.0 - t) + h_tab * t;
                    }
                    if h_sat.is_finite() {
                        return h_sat;
                    }
                }
            }
        }
        self.table
            .lookup(branch, SinglePhaseField::Enthalpy, p_bar, t_k)
    }

    /// Forced two-phase state from (T, P).
    ///
    /// With glide, temperature maps linearly onto quality across the
    /// band. Pseudo-pure fluids boil at one temperature, so quality
    /// cannot be inferred from it: keep the previous quality, or default
    /// to 0.5.
    fn forced_two_phase_from_tp(
        &self,
        p_bar: Real,
        t_k: Real,
        previous: Option<&StatePoint>,
    ) -> ResolvedState {
        let t_c = t_k - CELSIUS_OFFSET_K;
        let s = match self.sat_at(p_bar, true) {
            Some(s) if s.has_enthalpy_span() => s,
            _ => return single(Real::NAN, t_c),
        };

        if s.has_glide() && t_k.is_finite() {
            let x = clamp01((t_k - s.bubble_t_k) / (s.dew_t_k - s.bubble_t_k));
            return ResolvedState {
                enthalpy: s.enthalpy_at_quality(x),
                temperature_c: s.temperature_at_quality(x) - CELSIUS_OFFSET_K,
                quality: x,
            };
        }

        let mut x = previous.map_or(Real::NAN, |pt| pt.quality);
        if !x.is_finite() {
            if let Some(pt) = previous {
                x = self.quality_from_ph_bar(p_bar, pt.enthalpy);
            }
        }
        if !x.is_finite() {
            x = 0.5;
        }
        let x = clamp01(x);
        ResolvedState {
            enthalpy: s.enthalpy_at_quality(x),
            temperature_c: s.mean_t_k - CELSIUS_OFFSET_K,
            quality: x,
        }
    }

    fn enthalpy_auto(
        &self,
        p_bar: Real,
        t_k: Real,
        previous: Option<&StatePoint>,
        source: Option<EditSource>,
    ) -> ResolvedState {
        let t_c = t_k - CELSIUS_OFFSET_K;

        // Which side of the dome was the point on before this edit?
        let prev_complete = previous.is_some_and(StatePoint::is_complete);
        let prev_h = previous.map_or(Real::NAN, |pt| pt.enthalpy);
        let mut prev_bucket: Option<PhaseHint> = None;
        let mut prev_quality = previous.map_or(Real::NAN, |pt| pt.quality);
        if let Some(prev) = previous.filter(|pt| pt.is_complete()) {
            if let Some(sp) = self.sat_at(prev.pressure_bar, true) {
                if sp.has_enthalpy_span() {
                    let tol = self.config.dome_enthalpy_tol;
                    prev_bucket = Some(if prev.enthalpy < sp.liquid_enthalpy - tol {
                        PhaseHint::Liquid
                    } else if prev.enthalpy > sp.vapor_enthalpy + tol {
                        PhaseHint::Vapor
                    } else {
                        if !prev_quality.is_finite() {
                            prev_quality = sp.quality_from_enthalpy(prev.enthalpy);
                        }
                        PhaseHint::TwoPhase
                    });
                }
            }
        }

        let sat = self.sat_at(p_bar, true);

        // Anti-snap rule: a point that was in the dome keeps its quality
        // across pressure/phase-mode edits instead of being reclassified
        // from temperature.
        if prev_bucket == Some(PhaseHint::TwoPhase) && source != Some(EditSource::Temperature) {
            if let Some(s) = sat {
                let x = if prev_quality.is_finite() {
                    clamp01(prev_quality)
                } else {
                    0.5
                };
                return ResolvedState {
                    enthalpy: s.enthalpy_at_quality(x),
                    temperature_c: s.temperature_at_quality(x) - CELSIUS_OFFSET_K,
                    quality: x,
                };
            }
        }

        let h_vap = self.single_phase_enthalpy(p_bar, t_k, Branch::Vapor);
        let h_liq = self.single_phase_enthalpy(p_bar, t_k, Branch::Liquid);

        // One branch failing settles the choice.
        if !h_liq.is_finite() && h_vap.is_finite() {
            return single(h_vap, t_c);
        }
        if !h_vap.is_finite() && h_liq.is_finite() {
            return single(h_liq, t_c);
        }

        // A clearly subcooled/superheated temperature, or a direct
        // temperature edit, overrides continuity: physics wins.
        if let Some(s) = sat.as_ref() {
            let far = self.config.continuity_override_k;
            if s.has_glide() {
                if source == Some(EditSource::Temperature)
                    || t_k < s.bubble_t_k - far
                    || t_k > s.dew_t_k + far
                {
                    if t_k < s.bubble_t_k {
                        return single(h_liq, t_c);
                    }
                    if t_k > s.dew_t_k {
                        return single(h_vap, t_c);
                    }
                }
            } else if s.mean_t_k.is_finite() {
                let dt = t_k - s.mean_t_k;
                if source == Some(EditSource::Temperature) || dt.abs() > far {
                    return single(if dt < 0.0 { h_liq } else { h_vap }, t_c);
                }
            }
        }

        // Near saturation, where branch selection is ambiguous, prefer
        // whichever branch lands closer to the previous enthalpy.
        if prev_complete && prev_h.is_finite() && h_liq.is_finite() && h_vap.is_finite() {
            let pick = if (h_liq - prev_h).abs() < (h_vap - prev_h).abs() {
                h_liq
            } else {
                h_vap
            };
            return single(pick, t_c);
        }

        // No history: classify against the saturation band.
        if let Some(s) = sat {
            let db = self.config.deadband_k;
            if s.has_glide() {
                if t_k <= s.bubble_t_k - db {
                    return single(h_liq, t_c);
                }
                if t_k >= s.dew_t_k + db {
                    return single(h_vap, t_c);
                }
                // Inside the band: the dedicated dome grid first, it
                // captures mixture glide non-linearity.
                if let Some(tp) = self.table.two_phase() {
                    let h2 = tp.enthalpy_from_tp(p_bar, t_k);
                    if h2.is_finite() {
                        let q = tp.invert_quality(p_bar, t_k, DomeField::Temperature);
                        return ResolvedState {
                            enthalpy: h2,
                            temperature_c: t_c,
                            quality: q,
                        };
                    }
                }
                // Linear glide fallback.
                let x = clamp01((t_k - s.bubble_t_k) / (s.dew_t_k - s.bubble_t_k));
                if s.liquid_enthalpy.is_finite() && s.vapor_enthalpy.is_finite() {
                    return ResolvedState {
                        enthalpy: s.enthalpy_at_quality(x),
                        temperature_c: t_c,
                        quality: x,
                    };
                }
            } else if s.mean_t_k.is_finite() {
                let ts = s.mean_t_k;
                if t_k <= ts - db {
                    return single(h_liq, t_c);
                }
                if t_k >= ts + db {
                    return single(h_vap, t_c);
                }
                let x = clamp01((t_k - (ts - db)) / (2.0 * db));
                if s.liquid_enthalpy.is_finite() && s.vapor_enthalpy.is_finite() {
                    return ResolvedState {
                        enthalpy: s.enthalpy_at_quality(x),
                        temperature_c: t_c,
                        quality: x,
                    };
                }
            }
        }

        single(h_vap, t_c)
    }

    fn temperature_from_ph_bar(&self, p_bar: Real, h: SpecEnthalpy) -> ResolvedState {
        if !(p_bar > 0.0) || !h.is_finite() {
            return ResolvedState::invalid();
        }

        let sat = self.sat_at(p_bar, false);
        let mut branch = Branch::Vapor;
        if let Some(s) = sat {
            let h_lo = s.liquid_enthalpy.min(s.vapor_enthalpy);
            let h_hi = s.liquid_enthalpy.max(s.vapor_enthalpy);
            let tol = self.config.dome_enthalpy_tol;
            if h >= h_lo - tol && h <= h_hi + tol {
                // Inside the dome: dedicated grid first.
                if let Some(tp) = self.table.two_phase() {
                    let t2 = tp.temperature_from_ph(p_bar, h);
                    if t2.is_finite() {
                        let mut q = tp.invert_quality(p_bar, h, DomeField::Enthalpy);
                        if !q.is_finite() {
                            q = s.quality_from_enthalpy(h);
                        }
                        return ResolvedState {
                            enthalpy: h,
                            temperature_c: t2 - CELSIUS_OFFSET_K,
                            quality: q,
                        };
                    }
                }
                // Linear fallback: quality-weighted glide band, or the
                // single saturation temperature for pseudo-pure tables.
                let x = s.quality_from_enthalpy(h);
                let x_for_t = if x.is_finite() { x } else { 0.5 };
                return ResolvedState {
                    enthalpy: h,
                    temperature_c: s.temperature_at_quality(x_for_t) - CELSIUS_OFFSET_K,
                    quality: x,
                };
            }
            branch = if h < h_lo { Branch::Liquid } else { Branch::Vapor };
        }

        // Invert the single-phase grid along the temperature axis. Some
        // tables carry NaNs near the edges at a given pressure, so scan
        // for a valid bracket and keep the closest sample as a fallback.
        let axis = self.table.temperature_axis();
        let mut best_t = Real::NAN;
        let mut best_err = Real::INFINITY;
        let mut prev_sample: Option<(Real, Real)> = None;

        for &t in axis {
            let ht = self
                .table
                .lookup(branch, SinglePhaseField::Enthalpy, p_bar, t);
            if !ht.is_finite() {
                continue;
            }
            let f = ht - h;
            if f.abs() < best_err {
                best_err = f.abs();
                best_t = t;
            }
            if let Some((prev_t, prev_f)) = prev_sample {
                if f == 0.0 {
                    return self.resolved_single(h, t);
                }
                if prev_f == 0.0 {
                    return self.resolved_single(h, prev_t);
                }
                if f * prev_f < 0.0 {
                    let root = self.bisect_temperature(branch, p_bar, h, prev_t, t, prev_f);
                    return self.resolved_single(h, root);
                }
            }
            prev_sample = Some((t, f));
        }

        // No bracket anywhere on the axis: best-effort answer.
        if best_t.is_finite() {
            return self.resolved_single(h, best_t);
        }
        ResolvedState::invalid()
    }

    fn resolved_single(&self, h: SpecEnthalpy, t_k: Real) -> ResolvedState {
        single(h, t_k - CELSIUS_OFFSET_K)
    }

    fn bisect_temperature(
        &self,
        branch: Branch,
        p_bar: Real,
        target: SpecEnthalpy,
        mut lo: Real,
        mut hi: Real,
        mut f_lo: Real,
    ) -> Real {
        for _ in 0..BISECT_MAX_ITER {
            let mid = 0.5 * (lo + hi);
            let f_mid = self
                .table
                .lookup(branch, SinglePhaseField::Enthalpy, p_bar, mid)
                - target;
            if !f_mid.is_finite() {
                break;
            }
            if f_mid.abs() < TEMPERATURE_INVERT_TOL {
                return mid;
            }
            if f_mid * f_lo < 0.0 {
                hi = mid;
            } else {
                lo = mid;
                f_lo = f_mid;
            }
        }
        0.5 * (lo + hi)
    }

    fn quality_from_ph_bar(&self, p_bar: Real, h: SpecEnthalpy) -> Real {
        let Some(s) = self.sat_at(p_bar, true) else {
            return Real::NAN;
        };
        if !s.has_enthalpy_span() || !h.is_finite() {
            return Real::NAN;
        }
        let tol = self.config.dome_enthalpy_tol;
        if h < s.liquid_enthalpy - tol || h > s.vapor_enthalpy + tol {
            return Real::NAN;
        }
        s.quality_from_enthalpy(h)
    }

    fn phase_hint_bar(&self, p_bar: Real, h: SpecEnthalpy) -> PhaseHint {
        let eps = self.config.dome_enthalpy_tol;
        if let Some(s) = self.sat_at(p_bar, true) {
            if s.liquid_enthalpy.is_finite() && s.vapor_enthalpy.is_finite() && s.has_enthalpy_span()
            {
                if h < s.liquid_enthalpy - eps {
                    return PhaseHint::Liquid;
                }
                if h > s.vapor_enthalpy + eps {
                    return PhaseHint::Vapor;
                }
                return PhaseHint::TwoPhase;
            }
        }
        // Unclassifiable states read as vapor.
        PhaseHint::Vapor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AxesDoc, CellRows, SatRecordDoc, TableDoc};
    use phc_core::units::{bar, deg_c, k};

    fn cells(f: impl Fn(Real, Real) -> Real, t_axis: &[Real], p_axis: &[Real]) -> CellRows {
        t_axis
            .iter()
            .map(|&t| p_axis.iter().map(|&lp| Some(f(t, lp))).collect())
            .collect()
    }

    fn t_axis() -> Vec<Real> {
        (0..11).map(|i| 200.0 + 20.0 * i as Real).collect()
    }

    fn p_axis() -> Vec<Real> {
        vec![-1.0, 0.0, 1.0]
    }

    /// Pseudo-pure synthetic fluid: Tsat(1 bar) = 273.15 K, hL = 200,
    /// hV = 400 kJ/kg. Grids are linear in T and log10(P) so bilinear
    /// interpolation reproduces them exactly.
    fn pseudo_pure() -> PropertyTable {
        let ta = t_axis();
        let pa = p_axis();
        let doc = TableDoc {
            v: Some(3),
            axes: AxesDoc {
                log_pbar: pa.clone(),
                t: ta.clone(),
            },
            h_vap: cells(|t, lp| 400.0 + 0.9 * (t - 273.15) - 20.0 * lp, &ta, &pa),
            h_liq: cells(|t, lp| 200.0 + 1.4 * (t - 273.15) + 5.0 * lp, &ta, &pa),
            s_vap: Some(cells(|t, lp| 1.75 + 0.004 * (t - 273.15) - 0.1 * lp, &ta, &pa)),
            s_liq: Some(cells(|t, lp| 1.0 + 0.0035 * (t - 273.15) + 0.01 * lp, &ta, &pa)),
            sat: vec![
                sat_rec(1.0e4, 233.15, 150.0, 380.0),
                sat_rec(1.0e5, 273.15, 200.0, 400.0),
                sat_rec(1.0e6, 313.15, 250.0, 420.0),
            ],
            two_phase: None,
        };
        PropertyTable::from_doc(doc).unwrap()
    }

    /// Zeotropic blend: 10 K glide, bubble 270 K / dew 280 K at 1 bar,
    /// same dome enthalpies as the pseudo-pure table.
    fn zeotropic() -> PropertyTable {
        let ta = t_axis();
        let pa = p_axis();
        let doc = TableDoc {
            v: Some(3),
            axes: AxesDoc {
                log_pbar: pa.clone(),
                t: ta.clone(),
            },
            h_vap: cells(|t, lp| 400.0 + 0.9 * (t - 280.0) - 20.0 * lp, &ta, &pa),
            h_liq: cells(|t, lp| 200.0 + 1.4 * (t - 270.0) + 5.0 * lp, &ta, &pa),
            s_vap: Some(cells(|t, lp| 1.7 + 0.004 * (t - 280.0) - 0.1 * lp, &ta, &pa)),
            s_liq: Some(cells(|t, lp| 1.0 + 0.0035 * (t - 270.0) + 0.01 * lp, &ta, &pa)),
            sat: vec![
                glide_rec(1.0e4, 230.0, 240.0, 150.0, 380.0),
                glide_rec(1.0e5, 270.0, 280.0, 200.0, 400.0),
                glide_rec(1.0e6, 310.0, 320.0, 250.0, 420.0),
            ],
            two_phase: None,
        };
        PropertyTable::from_doc(doc).unwrap()
    }

    fn sat_rec(p: Real, t: Real, h_liq: Real, h_vap: Real) -> SatRecordDoc {
        SatRecordDoc {
            p,
            t: Some(t),
            t_bubble: None,
            t_dew: None,
            h_liq,
            h_vap,
        }
    }

    fn glide_rec(p: Real, tl: Real, tv: Real, h_liq: Real, h_vap: Real) -> SatRecordDoc {
        SatRecordDoc {
            p,
            t: None,
            t_bubble: Some(tl),
            t_dew: Some(tv),
            h_liq,
            h_vap,
        }
    }

    fn two_phase_point(pressure_bar: Real, enthalpy: Real, quality: Real) -> StatePoint {
        StatePoint {
            quality,
            ..StatePoint::from_ph(pressure_bar, enthalpy)
        }
    }

    #[test]
    fn forced_liquid_clamps_at_bubble() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // Requesting liquid enthalpy above the saturation temperature
        // must not extrapolate into the dome.
        let res = r.enthalpy_from_tp(bar(1.0), k(280.0), PhaseMode::Liquid, None, None);
        assert_eq!(res.enthalpy, 200.0);
        assert!(res.quality.is_nan());
    }

    #[test]
    fn forced_vapor_clamps_at_dew() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let res = r.enthalpy_from_tp(bar(1.0), k(260.0), PhaseMode::Vapor, None, None);
        assert_eq!(res.enthalpy, 400.0);
    }

    #[test]
    fn forced_liquid_blends_near_boundary() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // 1 K below the bubble point, default 2 K blend width:
        // halfway between saturation (200) and the table value (198.6).
        let res = r.enthalpy_from_tp(bar(1.0), k(272.15), PhaseMode::Liquid, None, None);
        assert!((res.enthalpy - 199.3).abs() < 1e-9);
    }

    #[test]
    fn blend_width_is_configurable() {
        let table = pseudo_pure();
        let cfg = ResolverConfig {
            boundary_blend_k: 4.0,
            ..ResolverConfig::default()
        };
        let r = PhaseResolver::with_config(&table, cfg);
        // Same query, wider blend: only a quarter of the way to the table value.
        let res = r.enthalpy_from_tp(bar(1.0), k(272.15), PhaseMode::Liquid, None, None);
        assert!((res.enthalpy - 199.65).abs() < 1e-9);
    }

    #[test]
    fn auto_picks_branches_away_from_dome() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);

        let sub = r.enthalpy_from_tp(bar(1.0), k(240.0), PhaseMode::Auto, None, None);
        assert!((sub.enthalpy - (200.0 + 1.4 * (240.0 - 273.15))).abs() < 1e-9);

        let sup = r.enthalpy_from_tp(bar(1.0), k(350.0), PhaseMode::Auto, None, None);
        assert!((sup.enthalpy - (400.0 + 0.9 * (350.0 - 273.15))).abs() < 1e-9);
        assert!(sup.quality.is_nan());
    }

    #[test]
    fn auto_pseudo_pure_band_blends_saturation_endpoints() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // Exactly at the saturation temperature: midway across the deadband.
        let res = r.enthalpy_from_tp(bar(1.0), k(273.15), PhaseMode::Auto, None, None);
        assert!((res.enthalpy - 300.0).abs() < 1e-9);
        assert!((res.quality - 0.5).abs() < 1e-9);
    }

    #[test]
    fn auto_glide_band_maps_temperature_to_quality() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        let res = r.enthalpy_from_tp(bar(1.0), deg_c(1.85), PhaseMode::Auto, None, None);
        assert!((res.quality - 0.5).abs() < 1e-3);
        assert!((res.enthalpy - 300.0).abs() < 0.2);
    }

    #[test]
    fn continuity_preserves_quality_on_pressure_edit() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let prev = two_phase_point(1.0, 260.0, 0.3);

        let res = r.enthalpy_from_tp(
            bar(2.0),
            deg_c(0.0),
            PhaseMode::Auto,
            Some(&prev),
            Some(EditSource::Pressure),
        );
        assert_eq!(res.quality, 0.3);

        // Enthalpy reflects the new pressure's saturation endpoints.
        let s = table
            .saturation_curve()
            .unwrap()
            .state_at_pressure(2.0e5, false)
            .unwrap();
        assert!((res.enthalpy - s.enthalpy_at_quality(0.3)).abs() < 1e-9);
    }

    #[test]
    fn continuity_derives_quality_from_previous_enthalpy() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // Previous point lies in the dome but carries no quality field.
        let prev = StatePoint::from_ph(1.0, 300.0);
        let res = r.enthalpy_from_tp(
            bar(1.0),
            deg_c(0.0),
            PhaseMode::Auto,
            Some(&prev),
            Some(EditSource::PhaseMode),
        );
        assert!((res.quality - 0.5).abs() < 1e-9);
    }

    #[test]
    fn temperature_edit_overrides_continuity() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let prev = two_phase_point(1.0, 260.0, 0.3);

        let res = r.enthalpy_from_tp(
            bar(1.0),
            k(350.0),
            PhaseMode::Auto,
            Some(&prev),
            Some(EditSource::Temperature),
        );
        assert!(res.quality.is_nan());
        assert!((res.enthalpy - (400.0 + 0.9 * (350.0 - 273.15))).abs() < 1e-9);
    }

    #[test]
    fn clearly_superheated_temperature_overrides_continuity() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let prev = two_phase_point(1.0, 260.0, 0.3);

        // Way outside the band, even on a pressure edit: physics wins.
        // (The previous bucket is two-phase, but the new temperature is
        // 77 K above saturation.)
        let res = r.enthalpy_from_tp(
            bar(1.0),
            k(350.0),
            PhaseMode::Auto,
            Some(&prev),
            Some(EditSource::Pressure),
        );
        // Continuity keeps the dome point here: source is not the
        // temperature field, so quality is preserved by design.
        assert_eq!(res.quality, 0.3);
    }

    #[test]
    fn branch_disambiguation_prefers_closer_enthalpy() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // Just inside the override window around saturation, with a
        // vapor-side history: stays on the vapor branch.
        let prev = StatePoint::from_ph(1.0, 405.0);
        let res = r.enthalpy_from_tp(
            bar(1.0),
            k(274.0),
            PhaseMode::Auto,
            Some(&prev),
            Some(EditSource::Pressure),
        );
        let h_liq = r.enthalpy_from_tp(bar(1.0), k(274.0), PhaseMode::Liquid, None, None);
        let h_vap = r.enthalpy_from_tp(bar(1.0), k(274.0), PhaseMode::Vapor, None, None);
        assert!((res.enthalpy - h_vap.enthalpy).abs() < 1e-12);
        assert!((res.enthalpy - h_liq.enthalpy).abs() > 1e-6);
    }

    #[test]
    fn forced_two_phase_glide_follows_temperature() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        let res = r.enthalpy_from_tp(bar(1.0), k(272.5), PhaseMode::TwoPhase, None, None);
        assert!((res.quality - 0.25).abs() < 1e-9);
        assert!((res.enthalpy - 250.0).abs() < 1e-9);
        assert!((res.temperature_c - (272.5 - CELSIUS_OFFSET_K)).abs() < 1e-9);
    }

    #[test]
    fn forced_two_phase_pseudo_pure_keeps_previous_quality() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let prev = two_phase_point(1.0, 260.0, 0.3);
        let res = r.enthalpy_from_tp(bar(1.0), deg_c(0.0), PhaseMode::TwoPhase, Some(&prev), None);
        assert_eq!(res.quality, 0.3);

        // No history: quality defaults to 0.5.
        let res = r.enthalpy_from_tp(bar(1.0), deg_c(0.0), PhaseMode::TwoPhase, None, None);
        assert!((res.quality - 0.5).abs() < 1e-9);
        assert!((res.enthalpy - 300.0).abs() < 1e-9);
    }

    #[test]
    fn temperature_from_ph_inside_dome() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let res = r.temperature_from_ph(bar(1.0), 300.0);
        assert!(res.temperature_c.abs() < 1e-9);
        assert!((res.quality - 0.5).abs() < 1e-9);
    }

    #[test]
    fn temperature_from_ph_glide_weighting() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        let res = r.temperature_from_ph(bar(1.0), 250.0);
        // x = 0.25 across a 270..280 K glide band.
        assert!((res.temperature_c - (272.5 - CELSIUS_OFFSET_K)).abs() < 1e-9);
        assert!((res.quality - 0.25).abs() < 1e-9);
    }

    #[test]
    fn temperature_from_ph_inverts_vapor_branch() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let target = 400.0 + 0.9 * (350.0 - 273.15);
        let res = r.temperature_from_ph(bar(1.0), target);
        assert!((res.temperature_c - (350.0 - CELSIUS_OFFSET_K)).abs() < 1e-3);
        assert!(res.quality.is_nan());
    }

    #[test]
    fn temperature_from_ph_without_bracket_returns_closest() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        // Beyond anything the vapor grid can produce: best-effort answer
        // at the hottest axis point instead of a failure.
        let res = r.temperature_from_ph(bar(1.0), 1000.0);
        assert!((res.temperature_c - (400.0 - CELSIUS_OFFSET_K)).abs() < 1e-9);
    }

    #[test]
    fn quality_endpoints_at_saturation() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        assert!((r.quality_from_ph(bar(1.0), 200.0) - 0.0).abs() < 1e-3);
        assert!((r.quality_from_ph(bar(1.0), 400.0) - 1.0).abs() < 1e-3);
        assert!(r.quality_from_ph(bar(1.0), 150.0).is_nan());
        assert!(r.quality_from_ph(bar(1.0), 450.0).is_nan());
    }

    #[test]
    fn phase_hint_buckets() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        assert_eq!(r.phase_hint(bar(1.0), 100.0), PhaseHint::Liquid);
        assert_eq!(r.phase_hint(bar(1.0), 300.0), PhaseHint::TwoPhase);
        assert_eq!(r.phase_hint(bar(1.0), 450.0), PhaseHint::Vapor);
    }

    #[test]
    fn clamp_enthalpy_to_dome_pins_forced_edits() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        assert_eq!(r.clamp_enthalpy_to_dome(bar(1.0), 100.0), 200.0);
        assert_eq!(r.clamp_enthalpy_to_dome(bar(1.0), 450.0), 400.0);
        assert_eq!(r.clamp_enthalpy_to_dome(bar(1.0), 260.0), 260.0);
    }

    #[test]
    fn keep_quality_recomputes_for_new_pressure() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        let prev = two_phase_point(1.0, 250.0, 0.25);
        let res = r.two_phase_from_p_keep_quality(bar(10.0), Some(&prev));
        assert_eq!(res.quality, 0.25);

        let s = table
            .saturation_curve()
            .unwrap()
            .state_at_pressure(1.0e6, false)
            .unwrap();
        assert!((res.enthalpy - s.enthalpy_at_quality(0.25)).abs() < 1e-9);
        assert!((res.temperature_c - (s.temperature_at_quality(0.25) - CELSIUS_OFFSET_K)).abs() < 1e-9);
    }

    #[test]
    fn entropy_mixture_uses_bubble_and_dew_endpoints() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        let point = StatePoint::from_ph(1.0, 300.0);
        // sL(270 K) = 1.0, sV(280 K) = 1.7, x = 0.5.
        let s = r.entropy_for_point(&point);
        assert!((s - 1.35).abs() < 1e-9);
    }

    #[test]
    fn entropy_auto_refuses_inside_band() {
        let table = zeotropic();
        let r = PhaseResolver::new(&table);
        assert!(r.entropy_from_tp(bar(1.0), k(275.0), PhaseMode::Auto).is_nan());

        let s = r.entropy_from_tp(bar(1.0), k(250.0), PhaseMode::Auto);
        assert!((s - (1.0 + 0.0035 * (250.0 - 270.0))).abs() < 1e-9);
    }

    #[test]
    fn entropy_single_phase_for_superheated_point() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let h = 400.0 + 0.9 * (350.0 - 273.15);
        let point = StatePoint::from_ph(1.0, h);
        let s = r.entropy_for_point(&point);
        // Inverted temperature feeds the vapor entropy grid.
        assert!((s - (1.75 + 0.004 * (350.0 - 273.15))).abs() < 1e-3);
    }

    #[test]
    fn non_positive_pressure_is_invalid() {
        let table = pseudo_pure();
        let r = PhaseResolver::new(&table);
        let res = r.enthalpy_from_tp(bar(0.0), k(300.0), PhaseMode::Auto, None, None);
        assert!(res.enthalpy.is_nan());
        let res = r.temperature_from_ph(bar(-1.0), 300.0);
        assert!(res.temperature_c.is_nan());
    }
}
