//! Drift coordinate derived from cluster peak time.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Converts a peak time (ticks) into a drift distance (cm).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DriftModel {
    /// Duration of one readout tick (microseconds).
    pub tick_us: f64,
    /// Electron drift velocity (cm per microsecond).
    pub drift_velocity_cm_per_us: f64,
}

impl Default for DriftModel {
    fn default() -> Self {
        Self {
            tick_us: 0.5,
            drift_velocity_cm_per_us: 0.16,
        }
    }
}

impl DriftModel {
    /// Creates a drift model after validating both constants.
    ///
    /// # Errors
    /// Returns an error if either constant is not finite and strictly positive.
    pub fn new(tick_us: f64, drift_velocity_cm_per_us: f64) -> Result<Self> {
        let model = Self {
            tick_us,
            drift_velocity_cm_per_us,
        };
        model.validate()?;
        Ok(model)
    }

    /// Checks that both constants are finite and strictly positive.
    ///
    /// # Errors
    /// Returns [`Error::ConfigError`] naming the offending constant.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("tick duration", self.tick_us),
            ("drift velocity", self.drift_velocity_cm_per_us),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::ConfigError(format!(
                    "{name} must be finite and positive, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Drift distance for a peak time.
    #[inline]
    #[must_use]
    pub fn drift_x(&self, peak_time: f64) -> f64 {
        peak_time * self.tick_us * self.drift_velocity_cm_per_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_x_reference_value() {
        let model = DriftModel::default();
        let x = model.drift_x(1000.0);
        assert!((x - 80.0).abs() < f64::EPSILON);
        assert!(model.drift_x(0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_drift_x_monotonic() {
        let model = DriftModel::default();
        let mut last = model.drift_x(0.0);
        for tick in 1..6000 {
            let x = model.drift_x(f64::from(tick));
            assert!(x >= last);
            assert!(x >= 0.0);
            last = x;
        }
    }

    #[test]
    fn test_invalid_constants_rejected() {
        assert!(DriftModel::new(0.0, 0.16).is_err());
        assert!(DriftModel::new(0.5, f64::NAN).is_err());
        assert!(DriftModel::new(0.5, -1.0).is_err());
        assert!(DriftModel::new(0.5, 0.16).is_ok());
    }
}
