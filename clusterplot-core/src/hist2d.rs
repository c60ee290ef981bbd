//! Two-dimensional counting histogram.
//!
//! Counts live in an [`ndhistogram::VecHistogram`] over two variable-width
//! axes. Cells are addressed as `(ix_cell, iy_cell)`, where cell 0 is the
//! underflow and cell `n + 1` the overflow of each axis.

use crate::axis::{lookup_coordinate, Axis, BinIndex};
use crate::{Error, Result};
use ndhistogram::axis::Variable;
use ndhistogram::{Histogram, VecHistogram};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Descriptive metadata shared by histograms and profiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HistMeta {
    /// Short identifier (e.g. `hYX`).
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Label of the horizontal axis.
    pub x_label: String,
    /// Label of the vertical axis.
    pub y_label: String,
}

impl HistMeta {
    /// Creates metadata from its four parts.
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        x_label: impl Into<String>,
        y_label: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            x_label: x_label.into(),
            y_label: y_label.into(),
        }
    }
}

/// Smoothing kernel: centre 5, first ring 2, outer arms 1.
const K5A: [[f64; 5]; 5] = [
    [0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 2.0, 2.0, 2.0, 0.0],
    [1.0, 2.0, 5.0, 2.0, 1.0],
    [0.0, 2.0, 2.0, 2.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0],
];

type Counts = VecHistogram<(Variable<f64>, Variable<f64>), f64>;

/// A 2D histogram of counts with fixed binning.
#[derive(Debug, Clone)]
pub struct Hist2D {
    meta: HistMeta,
    x_axis: Axis,
    y_axis: Axis,
    counts: Counts,
    entries: u64,
}

impl PartialEq for Hist2D {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.entries == other.entries
            && self.same_binning(other)
            && self.counts.values().eq(other.counts.values())
    }
}

impl Hist2D {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new(meta: HistMeta, x_axis: Axis, y_axis: Axis) -> Self {
        let counts = Counts::new((x_axis.binning().clone(), y_axis.binning().clone()));
        Self {
            meta,
            x_axis,
            y_axis,
            counts,
            entries: 0,
        }
    }

    /// Histogram metadata.
    #[must_use]
    pub fn meta(&self) -> &HistMeta {
        &self.meta
    }

    /// Horizontal axis.
    #[must_use]
    pub fn x_axis(&self) -> &Axis {
        &self.x_axis
    }

    /// Vertical axis.
    #[must_use]
    pub fn y_axis(&self) -> &Axis {
        &self.y_axis
    }

    /// Number of fill calls.
    #[must_use]
    #[inline]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Returns true if nothing was filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    #[inline]
    fn coordinate(&self, ix_cell: usize, iy_cell: usize) -> (f64, f64) {
        (
            self.x_axis.cell_coordinate(ix_cell),
            self.y_axis.cell_coordinate(iy_cell),
        )
    }

    fn cell_value(&self, ix_cell: usize, iy_cell: usize) -> f64 {
        self.counts
            .value(&self.coordinate(ix_cell, iy_cell))
            .copied()
            .unwrap_or(0.0)
    }

    /// Adds one count at `(x, y)`.
    ///
    /// Values outside the axes land in the under/overflow cells, so every
    /// fill is accounted for in [`Hist2D::total`].
    #[inline]
    pub fn fill(&mut self, x: f64, y: f64) {
        self.counts.fill(&(lookup_coordinate(x), lookup_coordinate(y)));
        self.entries += 1;
    }

    /// Content of the in-range bin `(ix, iy)`.
    #[must_use]
    pub fn content(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix < self.x_axis.bins() && iy < self.y_axis.bins() {
            Some(self.cell_value(ix + 1, iy + 1))
        } else {
            None
        }
    }

    /// Content of any cell, flows included.
    #[must_use]
    pub fn cell(&self, ix: BinIndex, iy: BinIndex) -> f64 {
        let ix = self.x_axis.cell(ix);
        let iy = self.y_axis.cell(iy);
        if ix < self.x_axis.cells() && iy < self.y_axis.cells() {
            self.cell_value(ix, iy)
        } else {
            0.0
        }
    }

    /// Sum of the in-range bins.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.in_range().map(|(_, _, value)| value).sum()
    }

    /// Sum of every cell, flows included.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.counts.values().sum()
    }

    /// Largest in-range bin content (0 for an empty histogram).
    #[must_use]
    pub fn max_content(&self) -> f64 {
        self.in_range()
            .map(|(_, _, value)| value)
            .fold(0.0, f64::max)
    }

    /// Smallest strictly positive in-range bin content.
    #[must_use]
    pub fn min_positive_content(&self) -> Option<f64> {
        self.in_range()
            .map(|(_, _, value)| value)
            .filter(|&value| value > 0.0)
            .reduce(f64::min)
    }

    /// Iterates the in-range bins as `(ix, iy, content)`.
    pub fn in_range(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        let nx = self.x_axis.bins();
        let ny = self.y_axis.bins();
        (0..ny).flat_map(move |iy| {
            (0..nx).map(move |ix| (ix, iy, self.cell_value(ix + 1, iy + 1)))
        })
    }

    /// Returns true if both histograms share the same binning.
    #[must_use]
    pub fn same_binning(&self, other: &Self) -> bool {
        self.x_axis == other.x_axis && self.y_axis == other.y_axis
    }

    /// Adds the contents of another histogram.
    ///
    /// # Errors
    /// Returns [`Error::BinningMismatch`] if the axes differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if !self.same_binning(other) {
            return Err(Error::BinningMismatch {
                left: self.meta.name.clone(),
                right: other.meta.name.clone(),
            });
        }
        for (mine, theirs) in self.counts.values_mut().zip(other.counts.values()) {
            *mine += theirs;
        }
        self.entries += other.entries;
        Ok(())
    }

    /// Smooths the in-range bins with a 5x5 neighbourhood average.
    ///
    /// Each pass replaces a bin by the kernel-weighted mean of itself and
    /// its in-range neighbours. Flow cells and the entry count are kept.
    pub fn smooth(&mut self, passes: usize) {
        let nx = self.x_axis.bins();
        let ny = self.y_axis.bins();

        for _ in 0..passes {
            let source: Vec<f64> = self.in_range().map(|(_, _, value)| value).collect();
            for iy in 0..ny {
                for ix in 0..nx {
                    let mut sum = 0.0;
                    let mut norm = 0.0;
                    for (ky, row) in K5A.iter().enumerate() {
                        let Some(sy) = (iy + ky).checked_sub(2).filter(|&sy| sy < ny) else {
                            continue;
                        };
                        for (kx, &weight) in row.iter().enumerate() {
                            if weight <= 0.0 {
                                continue;
                            }
                            let Some(sx) = (ix + kx).checked_sub(2).filter(|&sx| sx < nx) else {
                                continue;
                            };
                            sum += weight * source[sy * nx + sx];
                            norm += weight;
                        }
                    }
                    if norm > 0.0 {
                        let coordinate = self.coordinate(ix + 1, iy + 1);
                        if let Some(value) = self.counts.value_mut(&coordinate) {
                            *value = sum / norm;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn hist(nx: u32, ny: u32) -> Hist2D {
        Hist2D::new(
            HistMeta::new("h", "test", "x", "y"),
            Axis::linear(nx as usize, 0.0, f64::from(nx)).unwrap(),
            Axis::linear(ny as usize, 0.0, f64::from(ny)).unwrap(),
        )
    }

    #[test]
    fn test_fill_single_bin() {
        let mut h = hist(4, 4);
        h.fill(1.5, 2.5);
        assert_eq!(h.entries(), 1);
        assert_eq!(h.content(1, 2), Some(1.0));
        assert_eq!(h.content(2, 1), Some(0.0));
        assert_eq!(h.content(4, 0), None);
        assert_relative_eq!(h.integral(), 1.0);
    }

    #[test]
    fn test_out_of_range_goes_to_flows() {
        let mut h = hist(4, 4);
        h.fill(-1.0, 1.0);
        h.fill(10.0, 10.0);
        h.fill(f64::NAN, 0.5);
        assert_eq!(h.entries(), 3);
        assert_relative_eq!(h.integral(), 0.0);
        assert_relative_eq!(h.total(), 3.0);
        assert_relative_eq!(h.cell(BinIndex::Underflow, BinIndex::Bin(1)), 1.0);
        assert_relative_eq!(h.cell(BinIndex::Overflow, BinIndex::Overflow), 1.0);
        assert_relative_eq!(h.cell(BinIndex::Overflow, BinIndex::Bin(0)), 1.0);
    }

    #[test]
    fn test_merge_adds_cells() {
        let mut a = hist(4, 4);
        let mut b = hist(4, 4);
        a.fill(0.5, 0.5);
        b.fill(0.5, 0.5);
        b.fill(3.5, 3.5);
        a.merge(&b).unwrap();
        assert_eq!(a.entries(), 3);
        assert_eq!(a.content(0, 0), Some(2.0));
        assert_eq!(a.content(3, 3), Some(1.0));
    }

    #[test]
    fn test_equality_compares_contents() {
        let mut a = hist(4, 4);
        let b = hist(4, 4);
        assert_eq!(a, b);
        a.fill(1.5, 1.5);
        assert_ne!(a, b);
    }

    #[test]
    fn test_merge_rejects_other_binning() {
        let mut a = hist(4, 4);
        let b = hist(4, 5);
        assert!(matches!(
            a.merge(&b),
            Err(Error::BinningMismatch { .. })
        ));
    }

    #[test]
    fn test_smooth_spreads_isolated_peak() {
        let mut h = hist(9, 9);
        for _ in 0..25 {
            h.fill(4.5, 4.5);
        }
        h.smooth(1);

        // Interior bin: full kernel weight 25.
        assert_relative_eq!(h.content(4, 4).unwrap(), 5.0);
        assert_relative_eq!(h.content(5, 4).unwrap(), 2.0);
        assert_relative_eq!(h.content(5, 5).unwrap(), 2.0);
        assert_relative_eq!(h.content(6, 4).unwrap(), 1.0);
        assert_relative_eq!(h.content(6, 5).unwrap(), 0.0);
        assert_relative_eq!(h.integral(), 25.0);
        assert_eq!(h.entries(), 25);
    }

    #[test]
    fn test_smooth_keeps_flat_histogram() {
        let mut h = hist(5, 5);
        for iy in 0..5u8 {
            for ix in 0..5u8 {
                h.fill(f64::from(ix) + 0.5, f64::from(iy) + 0.5);
            }
        }
        h.smooth(2);
        for (_, _, value) in h.in_range() {
            assert_relative_eq!(value, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_min_max_content() {
        let mut h = hist(3, 3);
        assert!(h.min_positive_content().is_none());
        assert_relative_eq!(h.max_content(), 0.0);
        h.fill(0.5, 0.5);
        h.fill(1.5, 1.5);
        h.fill(1.5, 1.5);
        assert_relative_eq!(h.max_content(), 2.0);
        assert_eq!(h.min_positive_content(), Some(1.0));
    }
}
