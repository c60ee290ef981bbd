//! clusterplot-analysis: Cluster accumulation into histograms and profiles.
//!
//! This crate turns per-event cluster records into the fixed set of views:
//! - **Geometry** - Y/X, X/Z, Y/Z, Y/PeakTime and X/PeakTime 2D histograms
//! - **Profiles** - mean Y against peak time, overall and split at the
//!   anode/cathode threshold
//! - **Energy** - per-plane energy against peak time on a log energy axis,
//!   smoothed once filling is complete
//!
//! The drift coordinate is derived from peak time with
//! [`clusterplot_core::DriftModel`].
#![warn(missing_docs)]

mod accumulator;
pub mod config;
pub mod views;

pub use accumulator::{AccumulationStats, ClusterAccumulator, FinishedPlots};
pub use config::{AnalysisConfig, AxisRange, EnergyBinning};
pub use views::{HistogramView, ProfileView};
