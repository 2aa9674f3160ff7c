//! State point definitions shared with the caller.

use phc_core::Real;

/// Specific enthalpy [kJ/kg], the table's native enthalpy unit.
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEnthalpy = Real;

/// Specific entropy [kJ/(kg·K)], the table's native entropy unit.
///
/// Not part of uom's standard set, so we use f64 with clear documentation.
pub type SpecEntropy = Real;

/// How the caller wants phase selection to behave for a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhaseMode {
    /// Classify from the saturation curve, with branch continuity.
    #[default]
    Auto,
    /// Always evaluate the liquid grid.
    Liquid,
    /// Always evaluate the vapor grid.
    Vapor,
    /// Pin the point inside the dome.
    TwoPhase,
}

impl PhaseMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Liquid => "liquid",
            Self::Vapor => "vapor",
            Self::TwoPhase => "two-phase",
        }
    }
}

/// Which field the user edited to trigger a resolution.
///
/// The continuity rule only applies when the edit did not come from the
/// temperature field: typing a temperature is an explicit statement
/// about where the point should sit, and continuity must not override it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditSource {
    Pressure,
    Temperature,
    Enthalpy,
    PhaseMode,
}

/// A caller-owned state point, as displayed in the point table.
///
/// Unknown fields are NaN. The engine never retains one of these across
/// calls; a resolver call is a pure function of its inputs plus the
/// table, with the previous point threaded in explicitly when the caller
/// wants continuity.
#[derive(Debug, Clone, Copy)]
pub struct StatePoint {
    /// Pressure [bar].
    pub pressure_bar: Real,
    /// Specific enthalpy [kJ/kg].
    pub enthalpy: SpecEnthalpy,
    /// Temperature [°C], NaN when not yet derived.
    pub temperature_c: Real,
    /// Vapor quality in [0, 1], NaN outside the dome.
    pub quality: Real,
    /// Specific entropy [kJ/(kg·K)], NaN when not yet derived.
    pub entropy: SpecEntropy,
    pub phase_mode: PhaseMode,
}

impl StatePoint {
    /// A point with a known (P, h) pair and everything else pending.
    pub fn from_ph(pressure_bar: Real, enthalpy: SpecEnthalpy) -> Self {
        Self {
            pressure_bar,
            enthalpy,
            temperature_c: Real::NAN,
            quality: Real::NAN,
            entropy: Real::NAN,
            phase_mode: PhaseMode::Auto,
        }
    }

    /// Whether the point can be placed on the diagram at all.
    pub fn is_complete(&self) -> bool {
        self.pressure_bar.is_finite() && self.pressure_bar > 0.0 && self.enthalpy.is_finite()
    }
}

/// Result of a resolver query.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedState {
    /// Specific enthalpy [kJ/kg], NaN when unresolvable.
    pub enthalpy: SpecEnthalpy,
    /// Temperature [°C], NaN when unresolvable.
    pub temperature_c: Real,
    /// Vapor quality in [0, 1], NaN for single-phase states.
    pub quality: Real,
}

impl ResolvedState {
    pub(crate) fn invalid() -> Self {
        Self {
            enthalpy: Real::NAN,
            temperature_c: Real::NAN,
            quality: Real::NAN,
        }
    }
}

/// Display classification of a (P, h) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseHint {
    Liquid,
    TwoPhase,
    Vapor,
}

impl PhaseHint {
    pub fn label(self) -> &'static str {
        match self {
            Self::Liquid => "LIQ",
            Self::TwoPhase => "2\u{03c6}",
            Self::Vapor => "VAP",
        }
    }
}
