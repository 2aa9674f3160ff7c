//! Normalized, immutable property table.
//!
//! Built once per fluid selection from the on-disk document and
//! read-only afterwards. Normalization happens here: `null` cells become
//! NaN, saturation records get bubble/dew defaults, and axes and grid
//! shapes are validated so queries never re-check document structure.

use crate::error::{TableError, TableResult};
use crate::interp::Grid;
use crate::saturation::{SaturationCurve, SaturationState};
use crate::schema::{CellRows, TableDoc};
use crate::two_phase::TwoPhaseGrid;
use phc_core::Real;
use std::path::Path;

/// Single-phase property grid branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Liquid,
    Vapor,
}

impl Branch {
    pub fn label(self) -> &'static str {
        match self {
            Self::Liquid => "liquid",
            Self::Vapor => "vapor",
        }
    }
}

/// Field stored in the single-phase grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinglePhaseField {
    /// Specific enthalpy [kJ/kg].
    Enthalpy,
    /// Specific entropy [kJ/(kg·K)].
    Entropy,
}

/// Precomputed property grids and saturation curve for one fluid.
#[derive(Debug, Clone)]
pub struct PropertyTable {
    pressure_axis: Vec<Real>,
    temperature_axis: Vec<Real>,
    h_vapor: Grid,
    h_liquid: Grid,
    s_vapor: Option<Grid>,
    s_liquid: Option<Grid>,
    saturation: Vec<SaturationState>,
    two_phase: Option<TwoPhaseGrid>,
}

impl PropertyTable {
    /// Normalize and validate a parsed table document.
    pub fn from_doc(doc: TableDoc) -> TableResult<Self> {
        ensure_axis(
            &doc.axes.log_pbar,
            "axes.logPbar must be strictly increasing with >= 2 points",
        )?;
        ensure_axis(
            &doc.axes.t,
            "axes.T must be strictly increasing with >= 2 points",
        )?;

        let rows = doc.axes.t.len();
        let cols = doc.axes.log_pbar.len();
        let h_vapor = cells_to_grid(doc.h_vap, rows, cols, "hVap")?;
        let h_liquid = cells_to_grid(doc.h_liq, rows, cols, "hLiq")?;
        let s_vapor = doc
            .s_vap
            .map(|c| cells_to_grid(c, rows, cols, "sVap"))
            .transpose()?;
        let s_liquid = doc
            .s_liq
            .map(|c| cells_to_grid(c, rows, cols, "sLiq"))
            .transpose()?;

        let mut saturation: Vec<SaturationState> = Vec::with_capacity(doc.sat.len());
        for rec in doc.sat {
            if !(rec.p > 0.0) || !rec.p.is_finite() {
                return Err(TableError::Saturation {
                    what: "record pressure must be positive and finite",
                });
            }
            if let Some(last) = saturation.last() {
                if rec.p <= last.pressure_pa {
                    return Err(TableError::Saturation {
                        what: "records must be ordered by strictly increasing pressure",
                    });
                }
            }
            let plain = rec.t.unwrap_or(Real::NAN);
            let bubble = rec.t_bubble.unwrap_or(plain);
            let dew = rec.t_dew.unwrap_or(plain);
            let mean = if bubble.is_finite() && dew.is_finite() {
                0.5 * (bubble + dew)
            } else {
                plain
            };
            saturation.push(SaturationState {
                pressure_pa: rec.p,
                bubble_t_k: bubble,
                dew_t_k: dew,
                mean_t_k: mean,
                liquid_enthalpy: rec.h_liq,
                vapor_enthalpy: rec.h_vap,
            });
        }

        let two_phase = doc.two_phase.map(TwoPhaseGrid::from_doc).transpose()?;

        Ok(Self {
            pressure_axis: doc.axes.log_pbar,
            temperature_axis: doc.axes.t,
            h_vapor,
            h_liquid,
            s_vapor,
            s_liquid,
            saturation,
            two_phase,
        })
    }

    /// Pressure axis as log10(bar).
    pub fn pressure_axis(&self) -> &[Real] {
        &self.pressure_axis
    }

    /// Temperature axis in kelvin.
    pub fn temperature_axis(&self) -> &[Real] {
        &self.temperature_axis
    }

    /// Normalized saturation records, ordered by increasing pressure.
    pub fn saturation(&self) -> &[SaturationState] {
        &self.saturation
    }

    /// Saturation curve view, absent when fewer than two records exist.
    pub fn saturation_curve(&self) -> Option<SaturationCurve<'_>> {
        SaturationCurve::new(&self.saturation)
    }

    /// Dome-interior grid, when the table provides one.
    pub fn two_phase(&self) -> Option<&TwoPhaseGrid> {
        self.two_phase.as_ref()
    }

    /// Whether entropy grids are available for both branches.
    pub fn has_entropy(&self) -> bool {
        self.s_vapor.is_some() && self.s_liquid.is_some()
    }

    /// Bilinear single-phase lookup at (pressure, temperature).
    ///
    /// Pressure converts to log10(bar) and both coordinates clamp to the
    /// table bounds. NaN for non-positive pressure, a missing entropy
    /// grid, or any invalid corner of the enclosing cell.
    pub fn lookup(
        &self,
        branch: Branch,
        field: SinglePhaseField,
        pressure_bar: Real,
        temperature_k: Real,
    ) -> Real {
        if !(pressure_bar > 0.0) || !temperature_k.is_finite() {
            return Real::NAN;
        }
        let grid = match (branch, field) {
            (Branch::Liquid, SinglePhaseField::Enthalpy) => Some(&self.h_liquid),
            (Branch::Vapor, SinglePhaseField::Enthalpy) => Some(&self.h_vapor),
            (Branch::Liquid, SinglePhaseField::Entropy) => self.s_liquid.as_ref(),
            (Branch::Vapor, SinglePhaseField::Entropy) => self.s_vapor.as_ref(),
        };
        let Some(grid) = grid else {
            return Real::NAN;
        };
        grid.sample(
            &self.pressure_axis,
            &self.temperature_axis,
            pressure_bar.log10(),
            temperature_k,
        )
    }
}

/// Load, parse, normalize, and validate a table file in one step.
pub fn load_table(path: &Path) -> TableResult<PropertyTable> {
    let content = std::fs::read_to_string(path)?;
    let doc: TableDoc = serde_json::from_str(&content)?;
    PropertyTable::from_doc(doc)
}

pub(crate) fn ensure_axis(axis: &[Real], what: &'static str) -> TableResult<()> {
    if axis.len() < 2 {
        return Err(TableError::Axis { what });
    }
    for pair in axis.windows(2) {
        if !pair[0].is_finite() || !pair[1].is_finite() || pair[1] <= pair[0] {
            return Err(TableError::Axis { what });
        }
    }
    Ok(())
}

pub(crate) fn cells_to_grid(
    cells: CellRows,
    rows: usize,
    cols: usize,
    what: &'static str,
) -> TableResult<Grid> {
    let got_rows = cells.len();
    let grid = Grid::from_rows(
        cells
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|c| c.unwrap_or(Real::NAN))
                    .collect::<Vec<_>>()
            })
            .collect(),
    );
    match grid {
        Some(g) if g.rows() == rows && g.cols() == cols => Ok(g),
        Some(g) => Err(TableError::Shape {
            what,
            rows: g.rows(),
            cols: g.cols(),
        }),
        None => Err(TableError::Shape {
            what,
            rows: got_rows,
            cols: 0,
        }),
    }
}
