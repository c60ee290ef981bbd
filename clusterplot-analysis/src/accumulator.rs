//! Event-to-histogram accumulation.
//!
//! A [`ClusterAccumulator`] owns every histogram and profile of one run. It
//! is filled event by event (or chunk by chunk in parallel), merged with
//! other partial accumulators, and finally turned into [`FinishedPlots`].
//! Smoothing only happens in [`ClusterAccumulator::finalize`], after all
//! merging is done.

use crate::config::AnalysisConfig;
use crate::views::{HistogramView, ProfileView};
use clusterplot_core::{
    ClusterView, DriftModel, Error, Event, Field, Hist2D, HistMeta, Profile1D, Result,
};
use rayon::prelude::*;

/// Events per rayon task in [`ClusterAccumulator::fill_events_parallel`].
const PARALLEL_CHUNK_EVENTS: usize = 1024;

/// Counters collected while filling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccumulationStats {
    /// Events handed to the accumulator.
    pub events_seen: u64,
    /// Events whose clusters were deposited.
    pub events_processed: u64,
    /// Events skipped for a missing or short base field.
    pub events_skipped: u64,
    /// Clusters deposited.
    pub clusters: u64,
    /// Accepted energy values per energy field (collection, plane 0, plane 1).
    pub energy_deposits: [u64; 3],
    /// Missing, short or non-positive energy values per energy field.
    pub energy_dropped: [u64; 3],
}

impl AccumulationStats {
    /// Adds another set of counters.
    pub fn merge(&mut self, other: &Self) {
        self.events_seen += other.events_seen;
        self.events_processed += other.events_processed;
        self.events_skipped += other.events_skipped;
        self.clusters += other.clusters;
        for (mine, theirs) in self.energy_deposits.iter_mut().zip(other.energy_deposits) {
            *mine += theirs;
        }
        for (mine, theirs) in self.energy_dropped.iter_mut().zip(other.energy_dropped) {
            *mine += theirs;
        }
    }

    /// Accepted energy values for one energy field.
    #[must_use]
    pub fn deposits(&self, field: Field) -> u64 {
        energy_slot(field).map_or(0, |slot| self.energy_deposits[slot])
    }
}

fn energy_slot(field: Field) -> Option<usize> {
    Field::ENERGY.iter().position(|&candidate| candidate == field)
}

fn geometry_slot(view: HistogramView) -> Option<usize> {
    HistogramView::GEOMETRY
        .iter()
        .position(|&candidate| candidate == view)
}

fn profile_slot(view: ProfileView) -> usize {
    match view {
        ProfileView::YVsPeakTime => 0,
        ProfileView::YVsPeakTimeAnode => 1,
        ProfileView::YVsPeakTimeCathode => 2,
    }
}

/// Accumulates clusters into the fixed set of views.
#[derive(Debug, Clone)]
pub struct ClusterAccumulator {
    config: AnalysisConfig,
    drift: DriftModel,
    mid_x_cm: f64,
    geometry: [Hist2D; 5],
    profiles: [Profile1D; 3],
    energy: Option<[Hist2D; 3]>,
    stats: AccumulationStats,
}

impl ClusterAccumulator {
    /// Creates empty histograms and profiles for a configuration.
    ///
    /// # Errors
    /// Returns a configuration error if the configuration is invalid.
    pub fn new(config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;

        let bins = config.geometry_bins;
        let x = config.x_range.linear(bins)?;
        let y = config.y_range.linear(bins)?;
        let z = config.z_range.linear(bins)?;
        let t = config.time_range.linear(bins)?;

        let geometry = [
            Hist2D::new(HistogramView::YVsX.meta(), x.clone(), y.clone()),
            Hist2D::new(HistogramView::XVsZ.meta(), z.clone(), x.clone()),
            Hist2D::new(HistogramView::YVsZ.meta(), z, y.clone()),
            Hist2D::new(HistogramView::YVsPeakTime.meta(), t.clone(), y),
            Hist2D::new(HistogramView::XVsPeakTime.meta(), t, x),
        ];

        let profile_axis = config.time_range.linear(config.profile_bins)?;
        let profiles = ProfileView::ALL.map(|view| {
            Profile1D::new(view.meta(), profile_axis.clone()).with_color(view.color())
        });

        let energy = match &config.energy {
            Some(binning) => {
                let energy_axis = binning.energy_axis()?;
                let time_axis = config.time_range.linear(binning.time_bins)?;
                Some(HistogramView::ENERGY.map(|view| {
                    Hist2D::new(view.meta(), time_axis.clone(), energy_axis.clone())
                }))
            }
            None => None,
        };

        Ok(Self {
            config: config.clone(),
            drift: config.drift,
            mid_x_cm: config.mid_x_cm,
            geometry,
            profiles,
            energy,
            stats: AccumulationStats::default(),
        })
    }

    /// Configuration this accumulator was built from.
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &AccumulationStats {
        &self.stats
    }

    /// Deposits every cluster of one event.
    ///
    /// Events missing `Y`, `Z` or `PeakTime`, or with `Y`/`Z` shorter than
    /// `PeakTime`, are skipped and only counted.
    pub fn fill_event(&mut self, event: &Event) {
        self.stats.events_seen += 1;
        let Ok(clusters) = event.clusters() else {
            self.stats.events_skipped += 1;
            return;
        };
        for cluster in clusters {
            self.fill_cluster(&cluster);
        }
        self.stats.events_processed += 1;
    }

    fn fill_cluster(&mut self, cluster: &ClusterView<'_>) {
        let y = cluster.y;
        let z = cluster.z;
        let pt = cluster.peak_time;
        let x = self.drift.drift_x(pt);

        let [y_vs_x, x_vs_z, y_vs_z, y_vs_pt, x_vs_pt] = &mut self.geometry;
        y_vs_x.fill(x, y);
        x_vs_z.fill(z, x);
        y_vs_z.fill(z, y);
        y_vs_pt.fill(pt, y);
        x_vs_pt.fill(pt, x);

        let [all, anode, cathode] = &mut self.profiles;
        all.fill(pt, y);
        if x < self.mid_x_cm {
            anode.fill(pt, y);
        } else {
            cathode.fill(pt, y);
        }

        if let Some(energy) = &mut self.energy {
            for (slot, (field, hist)) in Field::ENERGY.into_iter().zip(energy).enumerate() {
                match cluster.energy(field) {
                    Some(e) if e > 0.0 => {
                        hist.fill(pt, e);
                        self.stats.energy_deposits[slot] += 1;
                    }
                    _ => self.stats.energy_dropped[slot] += 1,
                }
            }
        }

        self.stats.clusters += 1;
    }

    /// Deposits a sequence of events.
    pub fn fill_events<'a, I>(&mut self, events: I)
    where
        I: IntoIterator<Item = &'a Event>,
    {
        for event in events {
            self.fill_event(event);
        }
    }

    /// Deposits a slice of events using the rayon thread pool.
    ///
    /// Each task fills its own partial accumulator; partials are merged by
    /// addition, so the result matches a serial fill bin for bin.
    ///
    /// # Errors
    /// Returns an error if a partial accumulator cannot be created or merged.
    pub fn fill_events_parallel(&mut self, events: &[Event]) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }
        let template = self.empty_like()?;
        let partial = events
            .par_chunks(PARALLEL_CHUNK_EVENTS)
            .map(|chunk| -> Result<Self> {
                let mut partial = template.clone();
                partial.fill_events(chunk);
                Ok(partial)
            })
            .try_reduce(
                || template.clone(),
                |mut left, right| {
                    left.merge(&right)?;
                    Ok(left)
                },
            )?;
        log::debug!(
            "filled {} events ({} clusters) in parallel",
            events.len(),
            partial.stats.clusters
        );
        self.merge(&partial)
    }

    /// An empty accumulator with the same configuration.
    ///
    /// # Errors
    /// Returns an error if the configuration no longer validates.
    pub fn empty_like(&self) -> Result<Self> {
        Self::new(&self.config)
    }

    /// Adds the contents of another accumulator.
    ///
    /// Nothing is added unless every histogram and profile pair is
    /// compatible.
    ///
    /// # Errors
    /// Returns [`Error::BinningMismatch`] if the accumulators were built
    /// from different binning, and a configuration error if the drift model,
    /// threshold or energy variant differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        self.check_compatible(other)?;
        if let (Some(mine), Some(theirs)) = (&mut self.energy, &other.energy) {
            for (hist, other_hist) in mine.iter_mut().zip(theirs) {
                hist.merge(other_hist)?;
            }
        }
        for (hist, other_hist) in self.geometry.iter_mut().zip(&other.geometry) {
            hist.merge(other_hist)?;
        }
        for (profile, other_profile) in self.profiles.iter_mut().zip(&other.profiles) {
            profile.merge(other_profile)?;
        }
        self.stats.merge(&other.stats);
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        if self.drift != other.drift || self.mid_x_cm.to_bits() != other.mid_x_cm.to_bits() {
            return Err(Error::ConfigError(
                "cannot merge accumulators with different drift settings".to_string(),
            ));
        }
        let energy_pairs: Vec<(&Hist2D, &Hist2D)> = match (&self.energy, &other.energy) {
            (Some(mine), Some(theirs)) => mine.iter().zip(theirs).collect(),
            (None, None) => Vec::new(),
            _ => {
                return Err(Error::ConfigError(
                    "cannot merge energy-aware and geometry-only accumulators".to_string(),
                ))
            }
        };
        let mismatch = |left: &HistMeta, right: &HistMeta| Error::BinningMismatch {
            left: left.name.clone(),
            right: right.name.clone(),
        };
        for (hist, other_hist) in self.geometry.iter().zip(&other.geometry).chain(energy_pairs) {
            if !hist.same_binning(other_hist) {
                return Err(mismatch(hist.meta(), other_hist.meta()));
            }
        }
        for (profile, other_profile) in self.profiles.iter().zip(&other.profiles) {
            if !profile.same_binning(other_profile) {
                return Err(mismatch(profile.meta(), other_profile.meta()));
            }
        }
        Ok(())
    }

    /// Applies smoothing and hands the aggregates over for export.
    #[must_use]
    pub fn finalize(self) -> FinishedPlots {
        let mut energy = self.energy;
        if let (Some(hists), Some(binning)) = (&mut energy, &self.config.energy) {
            for hist in hists.iter_mut() {
                hist.smooth(binning.smoothing_passes);
            }
        }
        if self.stats.events_skipped > 0 {
            log::warn!(
                "skipped {} events with missing or short Y/Z/PeakTime",
                self.stats.events_skipped
            );
        }
        log::debug!(
            "finalized {} events: {} processed, {} skipped, {} clusters",
            self.stats.events_seen,
            self.stats.events_processed,
            self.stats.events_skipped,
            self.stats.clusters
        );
        FinishedPlots {
            geometry: self.geometry,
            profiles: self.profiles,
            energy,
            stats: self.stats,
        }
    }
}

/// Finished histograms and profiles, ready for rendering.
#[derive(Debug, Clone)]
pub struct FinishedPlots {
    geometry: [Hist2D; 5],
    profiles: [Profile1D; 3],
    energy: Option<[Hist2D; 3]>,
    stats: AccumulationStats,
}

impl FinishedPlots {
    /// Histogram of a view, `None` for energy views of a geometry-only run.
    #[must_use]
    pub fn histogram(&self, view: HistogramView) -> Option<&Hist2D> {
        if let Some(slot) = geometry_slot(view) {
            return Some(&self.geometry[slot]);
        }
        let slot = view.energy_field().and_then(energy_slot)?;
        self.energy.as_ref().map(|hists| &hists[slot])
    }

    /// Every available histogram in export order.
    pub fn histograms(&self) -> impl Iterator<Item = (HistogramView, &Hist2D)> + '_ {
        let energy = self
            .energy
            .iter()
            .flat_map(|hists| HistogramView::ENERGY.into_iter().zip(hists.iter()));
        HistogramView::GEOMETRY
            .into_iter()
            .zip(self.geometry.iter())
            .chain(energy)
    }

    /// Profile of a view.
    #[must_use]
    pub fn profile(&self, view: ProfileView) -> &Profile1D {
        &self.profiles[profile_slot(view)]
    }

    /// Counters collected while filling.
    #[must_use]
    pub fn stats(&self) -> &AccumulationStats {
        &self.stats
    }

    /// Returns true if the energy views were filled.
    #[must_use]
    pub fn is_energy_aware(&self) -> bool {
        self.energy.is_some()
    }
}
