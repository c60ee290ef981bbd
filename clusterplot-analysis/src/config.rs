//! Analysis configuration.

use clusterplot_core::{Axis, DriftModel, Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Half-open value range `[min, max)` of an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AxisRange {
    /// Lower edge, inclusive.
    pub min: f64,
    /// Upper edge, exclusive.
    pub max: f64,
}

impl AxisRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Builds a linear axis with `bins` bins over this range.
    ///
    /// # Errors
    /// Returns an error if the range or bin count is invalid.
    pub fn linear(&self, bins: usize) -> Result<Axis> {
        Axis::linear(bins, self.min, self.max)
    }
}

/// Binning of the energy-vs-peak-time views.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EnergyBinning {
    /// Number of logarithmic energy bins.
    pub bins: usize,
    /// Lower energy edge (MeV).
    pub min_mev: f64,
    /// Upper energy edge (MeV).
    pub max_mev: f64,
    /// Number of linear peak-time bins.
    pub time_bins: usize,
    /// Smoothing passes applied once all events are accumulated.
    pub smoothing_passes: usize,
}

impl Default for EnergyBinning {
    fn default() -> Self {
        Self {
            bins: 120,
            min_mev: 0.1,
            max_mev: 10_000.0,
            time_bins: 240,
            smoothing_passes: 1,
        }
    }
}

impl EnergyBinning {
    /// Logarithmic energy axis.
    ///
    /// # Errors
    /// Returns an error if the limits are not `0 < min < max`.
    pub fn energy_axis(&self) -> Result<Axis> {
        Axis::logarithmic(self.bins, self.min_mev, self.max_mev)
    }
}

/// Configuration of one accumulation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AnalysisConfig {
    /// Peak time to drift distance conversion.
    pub drift: DriftModel,
    /// Drift distance separating the anode side (below) from the cathode side.
    pub mid_x_cm: f64,
    /// Bins per axis of the geometry views.
    pub geometry_bins: usize,
    /// Drift coordinate range (cm).
    pub x_range: AxisRange,
    /// Vertical coordinate range (cm).
    pub y_range: AxisRange,
    /// Beam-axis coordinate range (cm).
    pub z_range: AxisRange,
    /// Peak time range (ticks).
    pub time_range: AxisRange,
    /// Bins of the mean-Y profiles.
    pub profile_bins: usize,
    /// Energy views; `None` disables them.
    pub energy: Option<EnergyBinning>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            drift: DriftModel::default(),
            mid_x_cm: 300.0,
            geometry_bins: 120,
            x_range: AxisRange::new(0.0, 600.0),
            y_range: AxisRange::new(-600.0, 600.0),
            z_range: AxisRange::new(-500.0, 500.0),
            time_range: AxisRange::new(0.0, 6000.0),
            profile_bins: 100,
            energy: None,
        }
    }
}

impl AnalysisConfig {
    /// Creates the geometry-only configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the configuration with energy views enabled.
    #[must_use]
    pub fn energy_aware() -> Self {
        Self::default().with_energy(EnergyBinning::default())
    }

    /// Sets the drift model.
    #[must_use]
    pub fn with_drift(mut self, drift: DriftModel) -> Self {
        self.drift = drift;
        self
    }

    /// Sets the anode/cathode threshold.
    #[must_use]
    pub fn with_mid_x(mut self, mid_x_cm: f64) -> Self {
        self.mid_x_cm = mid_x_cm;
        self
    }

    /// Enables the energy views.
    #[must_use]
    pub fn with_energy(mut self, energy: EnergyBinning) -> Self {
        self.energy = Some(energy);
        self
    }

    /// Disables the energy views.
    #[must_use]
    pub fn without_energy(mut self) -> Self {
        self.energy = None;
        self
    }

    /// Returns true if the energy views are enabled.
    #[must_use]
    pub fn is_energy_aware(&self) -> bool {
        self.energy.is_some()
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// Returns a configuration error for invalid drift constants, a
    /// non-finite threshold or invalid binning.
    pub fn validate(&self) -> Result<()> {
        self.drift.validate()?;
        if !self.mid_x_cm.is_finite() {
            return Err(Error::ConfigError(format!(
                "anode/cathode threshold must be finite, got {}",
                self.mid_x_cm
            )));
        }
        for range in [self.x_range, self.y_range, self.z_range, self.time_range] {
            range.linear(self.geometry_bins)?;
        }
        self.time_range.linear(self.profile_bins)?;
        if let Some(energy) = &self.energy {
            energy.energy_axis()?;
            self.time_range.linear(energy.time_bins)?;
        }
        Ok(())
    }
}
