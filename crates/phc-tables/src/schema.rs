//! On-disk table document schema.
//!
//! Mirrors the JSON produced by the table generator: axes in log10(bar)
//! and kelvin, enthalpy/entropy grids row-major by temperature then
//! pressure, a pressure-ordered saturation array, and an optional dome
//! grid indexed by (pressure, quality).
//!
//! JSON cannot represent NaN, so generators encode invalid cells as
//! `null`. Those arrive here as `None` and become NaN during
//! normalization ([`crate::table::PropertyTable::from_doc`]); they must
//! never be read as 0.

use serde::Deserialize;

/// A 2-D grid cell array as it appears on disk: `null` marks an invalid state.
pub type CellRows = Vec<Vec<Option<f64>>>;

#[derive(Debug, Clone, Deserialize)]
pub struct TableDoc {
    /// Format version written by the generator. Informational only.
    #[serde(default)]
    pub v: Option<u32>,
    pub axes: AxesDoc,
    #[serde(rename = "hVap")]
    pub h_vap: CellRows,
    #[serde(rename = "hLiq")]
    pub h_liq: CellRows,
    #[serde(rename = "sVap", default)]
    pub s_vap: Option<CellRows>,
    #[serde(rename = "sLiq", default)]
    pub s_liq: Option<CellRows>,
    #[serde(default)]
    pub sat: Vec<SatRecordDoc>,
    #[serde(rename = "twoPhase", default)]
    pub two_phase: Option<TwoPhaseDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AxesDoc {
    /// log10(pressure in bar), strictly increasing.
    #[serde(rename = "logPbar")]
    pub log_pbar: Vec<f64>,
    /// Temperature in kelvin, strictly increasing.
    #[serde(rename = "T")]
    pub t: Vec<f64>,
}

/// One saturation record.
///
/// Pseudo-pure tables carry a single temperature `T`; blend tables add
/// bubble (`TL`) and dew (`TV`) temperatures. Absent fields default to
/// the plain temperature at normalization time.
#[derive(Debug, Clone, Deserialize)]
pub struct SatRecordDoc {
    /// Pressure in pascal.
    #[serde(rename = "P")]
    pub p: f64,
    #[serde(rename = "T", default)]
    pub t: Option<f64>,
    #[serde(rename = "TL", default)]
    pub t_bubble: Option<f64>,
    #[serde(rename = "TV", default)]
    pub t_dew: Option<f64>,
    /// Saturated liquid enthalpy [kJ/kg].
    #[serde(rename = "hL")]
    pub h_liq: f64,
    /// Saturated vapor enthalpy [kJ/kg].
    #[serde(rename = "hV")]
    pub h_vap: f64,
}

/// Dome-interior grid indexed by (pressure, quality).
#[derive(Debug, Clone, Deserialize)]
pub struct TwoPhaseDoc {
    #[serde(rename = "logPbar")]
    pub log_pbar: Vec<f64>,
    pub q: Vec<f64>,
    #[serde(rename = "T")]
    pub t: CellRows,
    pub h: CellRows,
}
