//! Per-event cluster records.
//!
//! An [`Event`] holds one optional sequence per [`Field`]. A cluster is the
//! `j`-th element across those sequences; it is never stored on its own but
//! visited through [`ClusterView`].

use crate::error::EventDefect;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Sequence-valued fields of a cluster table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Field {
    /// Vertical coordinate (cm).
    Y,
    /// Beam-axis coordinate (cm).
    Z,
    /// Peak time of the cluster (ticks).
    PeakTime,
    /// Energy estimated on the collection plane (MeV).
    EnergyCollection,
    /// Energy estimated on induction plane 0 (MeV).
    EnergyPlane0,
    /// Energy estimated on induction plane 1 (MeV).
    EnergyPlane1,
}

impl Field {
    /// All fields in storage order.
    pub const ALL: [Field; 6] = [
        Field::Y,
        Field::Z,
        Field::PeakTime,
        Field::EnergyCollection,
        Field::EnergyPlane0,
        Field::EnergyPlane1,
    ];

    /// Fields every event must carry.
    pub const BASE: [Field; 3] = [Field::Y, Field::Z, Field::PeakTime];

    /// Optional per-plane energy fields.
    pub const ENERGY: [Field; 3] = [
        Field::EnergyCollection,
        Field::EnergyPlane0,
        Field::EnergyPlane1,
    ];

    /// Column name used in the data file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Field::Y => "Y",
            Field::Z => "Z",
            Field::PeakTime => "PeakTime",
            Field::EnergyCollection => "EnergyCollection",
            Field::EnergyPlane0 => "EnergyPlane0",
            Field::EnergyPlane1 => "EnergyPlane1",
        }
    }

    /// Looks a field up by its column name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.name() == name)
    }

    const fn slot(self) -> usize {
        match self {
            Field::Y => 0,
            Field::Z => 1,
            Field::PeakTime => 2,
            Field::EnergyCollection => 3,
            Field::EnergyPlane0 => 4,
            Field::EnergyPlane1 => 5,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One record of the cluster table.
///
/// `None` means the field is absent for this event; `Some` may still be
/// shorter than `PeakTime` for the optional energy fields.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Event {
    columns: [Option<Vec<f32>>; 6],
}

impl Event {
    /// Creates an event with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an event carrying the three base fields.
    #[must_use]
    pub fn with_base(y: Vec<f32>, z: Vec<f32>, peak_time: Vec<f32>) -> Self {
        Self::new()
            .with_column(Field::Y, y)
            .with_column(Field::Z, z)
            .with_column(Field::PeakTime, peak_time)
    }

    /// Sets the sequence of a field.
    #[must_use]
    pub fn with_column(mut self, field: Field, values: Vec<f32>) -> Self {
        self.columns[field.slot()] = Some(values);
        self
    }

    /// Replaces the sequence of a field in place, `None` marking it absent.
    pub fn set_column(&mut self, field: Field, values: Option<Vec<f32>>) {
        self.columns[field.slot()] = values;
    }

    /// Returns the sequence of a field, if present.
    #[must_use]
    pub fn column(&self, field: Field) -> Option<&[f32]> {
        self.columns[field.slot()].as_deref()
    }

    /// Returns true if the field is present (possibly empty).
    #[must_use]
    pub fn has_column(&self, field: Field) -> bool {
        self.columns[field.slot()].is_some()
    }

    /// Number of clusters, taken from the `PeakTime` sequence.
    #[must_use]
    pub fn cluster_count(&self) -> usize {
        self.column(Field::PeakTime).map_or(0, <[f32]>::len)
    }

    /// Returns an iterator over the clusters of this event.
    ///
    /// # Errors
    /// Returns an [`EventDefect`] if a base field is absent or if `Y`/`Z`
    /// are shorter than `PeakTime`.
    pub fn clusters(&self) -> Result<Clusters<'_>, EventDefect> {
        let peak_time = self
            .column(Field::PeakTime)
            .ok_or(EventDefect::MissingField(Field::PeakTime))?;
        let y = self
            .column(Field::Y)
            .ok_or(EventDefect::MissingField(Field::Y))?;
        let z = self
            .column(Field::Z)
            .ok_or(EventDefect::MissingField(Field::Z))?;

        let expected = peak_time.len();
        for (field, column) in [(Field::Y, y), (Field::Z, z)] {
            if column.len() < expected {
                return Err(EventDefect::LengthMismatch {
                    field,
                    len: column.len(),
                    expected,
                });
            }
        }

        Ok(Clusters {
            event: self,
            y,
            z,
            peak_time,
            next: 0,
        })
    }
}

/// Iterator over the clusters of an [`Event`].
#[derive(Debug, Clone)]
pub struct Clusters<'a> {
    event: &'a Event,
    y: &'a [f32],
    z: &'a [f32],
    peak_time: &'a [f32],
    next: usize,
}

impl<'a> Iterator for Clusters<'a> {
    type Item = ClusterView<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let j = self.next;
        let peak_time = *self.peak_time.get(j)?;
        self.next += 1;
        Some(ClusterView {
            event: self.event,
            index: j,
            y: f64::from(self.y[j]),
            z: f64::from(self.z[j]),
            peak_time: f64::from(peak_time),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.peak_time.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Clusters<'_> {}

/// The `j`-th cluster of an event.
#[derive(Debug, Clone, Copy)]
pub struct ClusterView<'a> {
    event: &'a Event,
    /// Cluster index within the event.
    pub index: usize,
    /// Vertical coordinate (cm).
    pub y: f64,
    /// Beam-axis coordinate (cm).
    pub z: f64,
    /// Peak time (ticks).
    pub peak_time: f64,
}

impl ClusterView<'_> {
    /// Value of an optional field for this cluster.
    ///
    /// `None` if the field is absent or its sequence is too short to hold
    /// index `j`.
    #[must_use]
    pub fn energy(&self, field: Field) -> Option<f64> {
        self.event
            .column(field)
            .and_then(|values| values.get(self.index))
            .map(|&value| f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_names_roundtrip() {
        for field in Field::ALL {
            assert_eq!(Field::from_name(field.name()), Some(field));
        }
        assert_eq!(Field::from_name("Energy"), None);
    }

    #[test]
    fn test_clusters_share_index() {
        let event = Event::with_base(vec![1.0, 2.0], vec![3.0, 4.0], vec![10.0, 20.0]);
        let clusters: Vec<_> = event.clusters().unwrap().collect();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[1].index, 1);
        assert!((clusters[1].y - 2.0).abs() < f64::EPSILON);
        assert!((clusters[1].z - 4.0).abs() < f64::EPSILON);
        assert!((clusters[1].peak_time - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_missing_base_field_is_defect() {
        let event = Event::new()
            .with_column(Field::Y, vec![1.0])
            .with_column(Field::PeakTime, vec![1.0]);
        assert_eq!(
            event.clusters().unwrap_err(),
            EventDefect::MissingField(Field::Z)
        );
        assert_eq!(
            Event::new().clusters().unwrap_err(),
            EventDefect::MissingField(Field::PeakTime)
        );
    }

    #[test]
    fn test_short_base_field_is_defect() {
        let event = Event::with_base(vec![1.0], vec![1.0, 2.0], vec![1.0, 2.0]);
        assert_eq!(
            event.clusters().unwrap_err(),
            EventDefect::LengthMismatch {
                field: Field::Y,
                len: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn test_energy_absent_or_short() {
        let event = Event::with_base(vec![0.0; 3], vec![0.0; 3], vec![1.0, 2.0, 3.0])
            .with_column(Field::EnergyPlane0, vec![5.0]);
        let clusters: Vec<_> = event.clusters().unwrap().collect();
        assert_eq!(clusters[0].energy(Field::EnergyPlane0), Some(5.0));
        assert_eq!(clusters[1].energy(Field::EnergyPlane0), None);
        assert_eq!(clusters[0].energy(Field::EnergyCollection), None);
    }

    #[test]
    fn test_empty_event_has_no_clusters() {
        let event = Event::with_base(Vec::new(), Vec::new(), Vec::new());
        assert_eq!(event.cluster_count(), 0);
        assert_eq!(event.clusters().unwrap().count(), 0);
    }
}
