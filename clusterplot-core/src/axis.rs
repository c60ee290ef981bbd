//! Binning axes with linear or arbitrary (e.g. logarithmic) edges.
//!
//! Bin lookup is delegated to [`ndhistogram`]'s variable-width axis, which
//! numbers the underflow cell 0 and the overflow cell `n + 1`.

use crate::{Error, Result};
use ndhistogram::axis::{Axis as _, Variable};

/// Location of a value on an axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinIndex {
    /// Below the first edge.
    Underflow,
    /// In-range bin (0-based).
    Bin(usize),
    /// At or above the last edge, or NaN.
    Overflow,
}

impl BinIndex {
    /// The in-range bin number, if any.
    #[must_use]
    pub const fn in_range(self) -> Option<usize> {
        match self {
            BinIndex::Bin(i) => Some(i),
            BinIndex::Underflow | BinIndex::Overflow => None,
        }
    }
}

/// A binning axis made of `n` bins and `n + 1` strictly increasing edges.
#[derive(Debug, Clone)]
pub struct Axis {
    edges: Vec<f64>,
    binning: Variable<f64>,
}

impl PartialEq for Axis {
    fn eq(&self, other: &Self) -> bool {
        self.edges == other.edges
    }
}

impl Axis {
    /// Creates an axis of `n` equal-width bins over `[min, max)`.
    ///
    /// # Errors
    /// Returns an error if `n == 0` or the limits are not finite and increasing.
    pub fn linear(n: usize, min: f64, max: f64) -> Result<Self> {
        validate_limits(n, min, max)?;
        let width = (max - min) / usize_to_f64(n);
        let mut edges: Vec<f64> = (0..n).map(|i| min + usize_to_f64(i) * width).collect();
        edges.push(max);
        Self::from_edges(edges)
    }

    /// Creates an axis of `n` bins with logarithmically spaced edges.
    ///
    /// Edge `i` is `10^(log10(min) + i * (log10(max) - log10(min)) / n)`.
    ///
    /// # Errors
    /// Returns an error if `n == 0` or not `0 < min < max`.
    pub fn logarithmic(n: usize, min: f64, max: f64) -> Result<Self> {
        validate_limits(n, min, max)?;
        if min <= 0.0 {
            return Err(Error::ConfigError(format!(
                "logarithmic axis needs a positive lower limit, got {min}"
            )));
        }
        let log_min = min.log10();
        let log_max = max.log10();
        let step = (log_max - log_min) / usize_to_f64(n);
        let edges = (0..=n)
            .map(|i| 10f64.powf(log_min + usize_to_f64(i) * step))
            .collect();
        Self::from_edges(edges)
    }

    /// Creates an axis from explicit edges.
    ///
    /// # Errors
    /// Returns an error if fewer than two edges are given or the edges are
    /// not finite and strictly increasing.
    pub fn from_edges(edges: Vec<f64>) -> Result<Self> {
        if edges.len() < 2 {
            return Err(Error::ConfigError(format!(
                "an axis needs at least two edges, got {}",
                edges.len()
            )));
        }
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(Error::ConfigError("axis edges must be finite".to_string()));
        }
        if edges.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(Error::ConfigError(
                "axis edges must be strictly increasing".to_string(),
            ));
        }
        let binning = Variable::new(edges.clone())
            .map_err(|e| Error::ConfigError(format!("invalid axis edges: {e:?}")))?;
        Ok(Self { edges, binning })
    }

    /// Underlying variable-width axis.
    #[must_use]
    pub(crate) fn binning(&self) -> &Variable<f64> {
        &self.binning
    }

    /// Number of in-range bins.
    #[must_use]
    #[inline]
    pub fn bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// Lower edge of the first bin.
    #[must_use]
    #[inline]
    pub fn min(&self) -> f64 {
        self.edges[0]
    }

    /// Upper edge of the last bin.
    #[must_use]
    #[inline]
    pub fn max(&self) -> f64 {
        self.edges[self.edges.len() - 1]
    }

    /// All bin edges.
    #[must_use]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Lower and upper edge of bin `i`.
    #[must_use]
    pub fn bin_range(&self, i: usize) -> Option<(f64, f64)> {
        if i < self.bins() {
            Some((self.edges[i], self.edges[i + 1]))
        } else {
            None
        }
    }

    /// Arithmetic centre of bin `i`.
    #[must_use]
    pub fn bin_center(&self, i: usize) -> Option<f64> {
        self.bin_range(i).map(|(lo, hi)| 0.5 * (lo + hi))
    }

    /// Locates a value on the axis.
    #[must_use]
    pub fn find_bin(&self, value: f64) -> BinIndex {
        match self.binning.index(&lookup_coordinate(value)) {
            Some(0) => BinIndex::Underflow,
            Some(cell) if cell <= self.bins() => BinIndex::Bin(cell - 1),
            _ => BinIndex::Overflow,
        }
    }

    /// Flat cell index including the underflow (0) and overflow (`n + 1`) cells.
    #[must_use]
    #[inline]
    pub fn cell(&self, index: BinIndex) -> usize {
        match index {
            BinIndex::Underflow => 0,
            BinIndex::Bin(i) => i + 1,
            BinIndex::Overflow => self.bins() + 1,
        }
    }

    /// Number of cells including under- and overflow.
    #[must_use]
    #[inline]
    pub fn cells(&self) -> usize {
        self.bins() + 2
    }

    /// A coordinate that lands in `cell`.
    pub(crate) fn cell_coordinate(&self, cell: usize) -> f64 {
        match cell {
            0 => f64::NEG_INFINITY,
            c if c <= self.bins() => 0.5 * (self.edges[c - 1] + self.edges[c]),
            _ => f64::INFINITY,
        }
    }
}

/// Coordinate handed to the binning; NaN is routed to the overflow.
#[inline]
pub(crate) fn lookup_coordinate(value: f64) -> f64 {
    if value.is_nan() {
        f64::INFINITY
    } else {
        value
    }
}

fn validate_limits(n: usize, min: f64, max: f64) -> Result<()> {
    if n == 0 {
        return Err(Error::ConfigError("an axis needs at least one bin".to_string()));
    }
    if !min.is_finite() || !max.is_finite() || min >= max {
        return Err(Error::ConfigError(format!(
            "axis limits must be finite and increasing, got [{min}, {max})"
        )));
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(value: usize) -> f64 {
    value as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_edges() {
        let axis = Axis::linear(120, 0.0, 600.0).unwrap();
        assert_eq!(axis.bins(), 120);
        assert_eq!(axis.edges().len(), 121);
        assert_relative_eq!(axis.edges()[1], 5.0);
        assert_relative_eq!(axis.max(), 600.0);
    }

    #[test]
    fn test_linear_find_bin() {
        let axis = Axis::linear(120, -600.0, 600.0).unwrap();
        assert_eq!(axis.find_bin(-600.0), BinIndex::Bin(0));
        assert_eq!(axis.find_bin(10.0), BinIndex::Bin(61));
        assert_eq!(axis.find_bin(0.0), BinIndex::Bin(60));
        assert_eq!(axis.find_bin(599.999), BinIndex::Bin(119));
        assert_eq!(axis.find_bin(600.0), BinIndex::Overflow);
        assert_eq!(axis.find_bin(-600.1), BinIndex::Underflow);
        assert_eq!(axis.find_bin(f64::NAN), BinIndex::Overflow);
    }

    #[test]
    fn test_every_edge_starts_its_bin() {
        let axis = Axis::linear(240, 0.0, 6000.0).unwrap();
        for (i, &edge) in axis.edges()[..axis.bins()].iter().enumerate() {
            assert_eq!(axis.find_bin(edge), BinIndex::Bin(i));
        }
    }

    #[test]
    fn test_logarithmic_edges_have_constant_ratio() {
        let axis = Axis::logarithmic(120, 0.1, 10_000.0).unwrap();
        let edges = axis.edges();
        assert_eq!(edges.len(), 121);
        assert_relative_eq!(edges[0], 0.1, max_relative = 1e-12);
        assert_relative_eq!(edges[120], 10_000.0, max_relative = 1e-12);

        let ratio = edges[1] / edges[0];
        for pair in edges.windows(2) {
            assert_relative_eq!(pair[1] / pair[0], ratio, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_logarithmic_find_bin() {
        let axis = Axis::logarithmic(4, 1.0, 10_000.0).unwrap();
        assert_eq!(axis.find_bin(1.0), BinIndex::Bin(0));
        assert_eq!(axis.find_bin(50.0), BinIndex::Bin(1));
        assert_eq!(axis.find_bin(999.0), BinIndex::Bin(2));
        assert_eq!(axis.find_bin(0.5), BinIndex::Underflow);
        assert_eq!(axis.find_bin(10_000.0), BinIndex::Overflow);
    }

    #[test]
    fn test_invalid_axes_rejected() {
        assert!(Axis::linear(0, 0.0, 1.0).is_err());
        assert!(Axis::linear(10, 1.0, 1.0).is_err());
        assert!(Axis::linear(10, 0.0, f64::INFINITY).is_err());
        assert!(Axis::logarithmic(10, 0.0, 1.0).is_err());
        assert!(Axis::from_edges(vec![0.0]).is_err());
        assert!(Axis::from_edges(vec![0.0, 2.0, 1.0]).is_err());
    }

    #[test]
    fn test_cells_include_flows() {
        let axis = Axis::linear(10, 0.0, 10.0).unwrap();
        assert_eq!(axis.cells(), 12);
        assert_eq!(axis.cell(BinIndex::Underflow), 0);
        assert_eq!(axis.cell(BinIndex::Bin(0)), 1);
        assert_eq!(axis.cell(BinIndex::Overflow), 11);
    }

    #[test]
    fn test_cell_coordinates_land_in_their_cell() {
        let axis = Axis::logarithmic(6, 0.1, 1000.0).unwrap();
        for cell in 0..axis.cells() {
            let index = axis.find_bin(axis.cell_coordinate(cell));
            assert_eq!(axis.cell(index), cell);
        }
    }

    #[test]
    fn test_axes_compare_by_edges() {
        let a = Axis::linear(4, 0.0, 4.0).unwrap();
        let b = Axis::from_edges(vec![0.0, 1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, Axis::linear(4, 0.0, 8.0).unwrap());
    }
}
