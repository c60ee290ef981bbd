//! clusterplot-core: Core types for drift-corrected cluster analysis.
//!
//! This crate provides the per-event data model, the drift model that turns
//! peak times into a spatial coordinate, binning axes, and the two aggregate
//! types the analysis fills: [`Hist2D`] and [`Profile1D`].

pub mod axis;
pub mod drift;
pub mod error;
pub mod event;
pub mod hist2d;
pub mod profile;

pub use axis::{Axis, BinIndex};
pub use drift::DriftModel;
pub use error::{Error, EventDefect, Result};
pub use event::{ClusterView, Clusters, Event, Field};
pub use hist2d::{Hist2D, HistMeta};
pub use profile::{Profile1D, Rgb};
