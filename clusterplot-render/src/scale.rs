//! Mapping of bin contents to palette positions.

use clusterplot_core::Hist2D;

/// Colour scale of a 2D histogram.
///
/// Linear scales span `[0, max]`; logarithmic scales span
/// `[log10(min_positive), log10(max)]`. Positions are quantised to a fixed
/// number of levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
    log: bool,
    levels: usize,
}

impl ColorScale {
    /// Builds the scale of a histogram, `None` when it has no positive bin.
    #[must_use]
    pub fn for_histogram(hist: &Hist2D, log: bool, levels: usize) -> Option<Self> {
        let max = hist.max_content();
        if max <= 0.0 {
            return None;
        }
        let min = if log {
            hist.min_positive_content()?
        } else {
            0.0
        };
        Some(Self::new(min, max, log, levels))
    }

    /// Builds a scale from explicit limits.
    #[must_use]
    pub fn new(min: f64, max: f64, log: bool, levels: usize) -> Self {
        Self {
            min,
            max,
            log,
            levels: levels.max(1),
        }
    }

    /// Lowest content on the scale.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Highest content on the scale.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Returns true for a logarithmic scale.
    #[must_use]
    pub fn is_log(&self) -> bool {
        self.log
    }

    /// Number of colour levels.
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels
    }

    /// Continuous position of `value` in `[0, 1]`, `None` for blank bins.
    #[must_use]
    pub fn position(&self, value: f64) -> Option<f64> {
        if value.is_nan() || value <= 0.0 {
            return None;
        }
        let t = if self.log {
            let lo = self.min.log10();
            let hi = self.max.log10();
            if hi > lo {
                (value.log10() - lo) / (hi - lo)
            } else {
                1.0
            }
        } else if self.max > self.min {
            (value - self.min) / (self.max - self.min)
        } else {
            1.0
        };
        Some(t.clamp(0.0, 1.0))
    }

    /// Quantised palette position of `value`, `None` for blank bins.
    #[must_use]
    pub fn level(&self, value: f64) -> Option<f64> {
        self.position(value).map(|t| self.quantise(t))
    }

    /// Snaps a continuous position to one of the discrete levels.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn quantise(&self, t: f64) -> f64 {
        if self.levels <= 1 {
            return 1.0;
        }
        let n = self.levels as f64;
        let level = ((t.clamp(0.0, 1.0) * n) as usize).min(self.levels - 1);
        level as f64 / (n - 1.0)
    }

    /// Content at palette position `t`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        if self.log {
            let lo = self.min.log10();
            let hi = self.max.log10();
            10f64.powf(lo + t * (hi - lo))
        } else {
            self.min + t * (self.max - self.min)
        }
    }
}

/// Compact tick label for a bin content.
#[must_use]
pub fn format_content(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude < f64::MIN_POSITIVE {
        "0".to_string()
    } else if !(1e-2..1e4).contains(&magnitude) {
        format!("{value:.1e}")
    } else if magnitude >= 10.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use clusterplot_core::{Axis, HistMeta};

    fn hist() -> Hist2D {
        Hist2D::new(
            HistMeta::new("h", "h", "x", "y"),
            Axis::linear(4, 0.0, 4.0).unwrap(),
            Axis::linear(4, 0.0, 4.0).unwrap(),
        )
    }

    #[test]
    fn test_empty_histogram_has_no_scale() {
        assert!(ColorScale::for_histogram(&hist(), false, 100).is_none());
        assert!(ColorScale::for_histogram(&hist(), true, 100).is_none());
    }

    #[test]
    fn test_log_scale_limits() {
        let mut h = hist();
        h.fill(0.5, 0.5);
        for _ in 0..100 {
            h.fill(1.5, 1.5);
        }
        let scale = ColorScale::for_histogram(&h, true, 100).unwrap();
        assert_relative_eq!(scale.min(), 1.0);
        assert_relative_eq!(scale.max(), 100.0);
        assert_relative_eq!(scale.position(10.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(scale.value_at(0.5), 10.0, epsilon = 1e-9);
        assert!(scale.position(0.0).is_none());
    }

    #[test]
    fn test_linear_scale_starts_at_zero() {
        let mut h = hist();
        for _ in 0..4 {
            h.fill(0.5, 0.5);
        }
        let scale = ColorScale::for_histogram(&h, false, 100).unwrap();
        assert_relative_eq!(scale.min(), 0.0);
        assert_relative_eq!(scale.position(2.0).unwrap(), 0.5);
        assert!(scale.position(f64::NAN).is_none());
    }

    #[test]
    fn test_quantisation() {
        let scale = ColorScale::new(0.0, 1.0, false, 4);
        assert_relative_eq!(scale.quantise(0.0), 0.0);
        assert_relative_eq!(scale.quantise(0.3), 1.0 / 3.0);
        assert_relative_eq!(scale.quantise(0.99), 1.0);
        assert_relative_eq!(scale.quantise(1.0), 1.0);
        assert_relative_eq!(ColorScale::new(0.0, 1.0, false, 1).quantise(0.2), 1.0);
    }

    #[test]
    fn test_single_valued_log_scale() {
        let scale = ColorScale::new(5.0, 5.0, true, 100);
        assert_relative_eq!(scale.position(5.0).unwrap(), 1.0);
    }

    #[test]
    fn test_format_content() {
        assert_eq!(format_content(0.0), "0");
        assert_eq!(format_content(250.0), "250");
        assert_eq!(format_content(2.5), "2.50");
        assert_eq!(format_content(123_456.0), "1.2e5");
    }
}
