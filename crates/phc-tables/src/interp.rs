//! Interpolation primitives: 1-D piecewise-linear lookup and bilinear
//! grid sampling with clamp-to-edge semantics.

use phc_core::Real;

/// First index whose axis value is greater than `x`.
///
/// The axis must be sorted ascending. Returns `xs.len()` when `x` is at
/// or past the last entry.
pub fn upper_bound(xs: &[Real], x: Real) -> usize {
    let mut lo = 0usize;
    let mut hi = xs.len();
    while lo < hi {
        let mid = (lo + hi) / 2;
        if xs[mid] <= x {
            lo = mid + 1;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Piecewise-linear interpolation of `ys` over `xs`, clamped to the ends.
///
/// Degenerate axes (fewer than 2 points) yield NaN.
pub fn interp1(xs: &[Real], ys: &[Real], x: Real) -> Real {
    if xs.len() < 2 || ys.len() != xs.len() {
        return Real::NAN;
    }
    if x <= xs[0] {
        return ys[0];
    }
    if x >= xs[xs.len() - 1] {
        return ys[ys.len() - 1];
    }
    let j = upper_bound(xs, x);
    let i = j - 1;
    let t = (x - xs[i]) / (xs[j] - xs[i]);
    ys[i] * (1.0 - t) + ys[j] * t
}

/// Rectangular grid of values, row-major.
///
/// Rows follow the y axis and columns the x axis, so `get(row, col)`
/// addresses the cell at `(y_axis[row], x_axis[col])`. Invalid cells are
/// stored as NaN.
#[derive(Debug, Clone)]
pub struct Grid {
    rows: usize,
    cols: usize,
    values: Vec<Real>,
}

impl Grid {
    /// Build a grid from row vectors. Returns `None` when the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<Real>>) -> Option<Self> {
        let n_rows = rows.len();
        let n_cols = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|r| r.len() != n_cols) {
            return None;
        }
        let mut values = Vec::with_capacity(n_rows * n_cols);
        for row in rows {
            values.extend(row);
        }
        Some(Self {
            rows: n_rows,
            cols: n_cols,
            values,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Real {
        self.values[row * self.cols + col]
    }

    /// Bilinear sample at `(x, y)`.
    ///
    /// Both query coordinates are clamped to their axis range before the
    /// enclosing cell is located, so there is no extrapolation past the
    /// table bounds. Any non-finite corner of the enclosing cell makes
    /// the result NaN; callers must treat NaN as "no value", never as 0.
    pub fn sample(&self, x_axis: &[Real], y_axis: &[Real], x: Real, y: Real) -> Real {
        if x_axis.len() != self.cols || y_axis.len() != self.rows {
            return Real::NAN;
        }
        if x_axis.len() < 2 || y_axis.len() < 2 {
            return Real::NAN;
        }

        let x = x.clamp(x_axis[0], x_axis[x_axis.len() - 1]);
        let y = y.clamp(y_axis[0], y_axis[y_axis.len() - 1]);

        let xi = upper_bound(x_axis, x)
            .saturating_sub(1)
            .min(x_axis.len() - 2);
        let yi = upper_bound(y_axis, y)
            .saturating_sub(1)
            .min(y_axis.len() - 2);

        let tx = (x - x_axis[xi]) / (x_axis[xi + 1] - x_axis[xi]);
        let ty = (y - y_axis[yi]) / (y_axis[yi + 1] - y_axis[yi]);

        let z00 = self.get(yi, xi);
        let z10 = self.get(yi, xi + 1);
        let z01 = self.get(yi + 1, xi);
        let z11 = self.get(yi + 1, xi + 1);

        let z0 = z00 * (1.0 - tx) + z10 * tx;
        let z1 = z01 * (1.0 - tx) + z11 * tx;
        z0 * (1.0 - ty) + z1 * ty
    }
}
