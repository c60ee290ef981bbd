//! One-dimensional running-average profile.

use crate::axis::{lookup_coordinate, Axis};
use crate::hist2d::HistMeta;
use crate::{Error, Result};
use ndhistogram::axis::Variable;
use ndhistogram::{Histogram, VecHistogram};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An sRGB display colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const BLUE: Rgb = Rgb(0, 0, 255);
    /// Dark green used for the cathode-side profile.
    pub const DARK_GREEN: Rgb = Rgb(0, 153, 0);
}

/// Per-cell accumulators of a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct ProfileCell {
    count: u64,
    sum_y: f64,
    sum_y2: f64,
}

/// Mean of `y` per bin of `x`.
///
/// Each cell keeps the count and the sums of `y` and `y^2`, so merging two
/// profiles is plain addition.
#[derive(Debug, Clone)]
pub struct Profile1D {
    meta: HistMeta,
    axis: Axis,
    cells: VecHistogram<Variable<f64>, ProfileCell>,
    entries: u64,
    color: Rgb,
}

impl Profile1D {
    /// Creates an empty profile drawn in black.
    #[must_use]
    pub fn new(meta: HistMeta, axis: Axis) -> Self {
        let cells = VecHistogram::new(axis.binning().clone());
        Self {
            meta,
            axis,
            cells,
            entries: 0,
            color: Rgb::BLACK,
        }
    }

    /// Sets the display colour.
    #[must_use]
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Display colour.
    #[must_use]
    pub fn color(&self) -> Rgb {
        self.color
    }

    /// Profile metadata.
    #[must_use]
    pub fn meta(&self) -> &HistMeta {
        &self.meta
    }

    /// Binning axis.
    #[must_use]
    pub fn axis(&self) -> &Axis {
        &self.axis
    }

    /// Number of fill calls.
    #[must_use]
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Returns true if nothing was filled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries == 0
    }

    /// Adds `y` to the bin containing `x`.
    #[inline]
    pub fn fill(&mut self, x: f64, y: f64) {
        if let Some(cell) = self.cells.value_mut(&lookup_coordinate(x)) {
            cell.count += 1;
            cell.sum_y += y;
            cell.sum_y2 += y * y;
        }
        self.entries += 1;
    }

    fn in_range_cell(&self, i: usize) -> Option<&ProfileCell> {
        if i < self.axis.bins() {
            self.cells.value(&self.axis.cell_coordinate(i + 1))
        } else {
            None
        }
    }

    /// Number of values in bin `i`.
    #[must_use]
    pub fn count(&self, i: usize) -> u64 {
        self.in_range_cell(i).map_or(0, |cell| cell.count)
    }

    /// Mean of bin `i`, `None` when the bin is empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn mean(&self, i: usize) -> Option<f64> {
        self.in_range_cell(i)
            .filter(|cell| cell.count > 0)
            .map(|cell| cell.sum_y / cell.count as f64)
    }

    /// Standard error of the mean of bin `i`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn error(&self, i: usize) -> Option<f64> {
        let cell = self.in_range_cell(i).filter(|cell| cell.count > 0)?;
        let n = cell.count as f64;
        let mean = cell.sum_y / n;
        let variance = (cell.sum_y2 / n - mean * mean).max(0.0);
        Some(variance.sqrt() / n.sqrt())
    }

    /// Iterates non-empty bins as `(center, mean, error)`.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        (0..self.axis.bins()).filter_map(move |i| {
            let center = self.axis.bin_center(i)?;
            let mean = self.mean(i)?;
            let error = self.error(i)?;
            Some((center, mean, error))
        })
    }

    /// Returns true if both profiles share the same binning.
    #[must_use]
    pub fn same_binning(&self, other: &Self) -> bool {
        self.axis == other.axis
    }

    /// Adds the contents of another profile.
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
        for (mine, theirs) in self.cells.values_mut().zip(other.cells.values()) {
            mine.count += theirs.count;
            mine.sum_y += theirs.sum_y;
            mine.sum_y2 += theirs.sum_y2;
        }
        self.entries += other.entries;
        Ok(())
    }
}
