//! Catalogue of the histograms and profiles produced by an analysis run.

use clusterplot_core::{Field, HistMeta, Rgb};

const X_LABEL: &str = "X (cm)";
const Y_LABEL: &str = "Y (cm)";
const Z_LABEL: &str = "Z (cm)";
const TIME_LABEL: &str = "PeakTime (ticks)";
const ENERGY_LABEL: &str = "Energy [MeV]";

/// 2D views, in export order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HistogramView {
    /// Y against drift X.
    YVsX,
    /// Drift X against Z.
    XVsZ,
    /// Y against Z.
    YVsZ,
    /// Y against peak time.
    YVsPeakTime,
    /// Drift X against peak time.
    XVsPeakTime,
    /// Collection-plane energy against peak time.
    EnergyCollectionVsPeakTime,
    /// Induction plane 0 energy against peak time.
    EnergyPlane0VsPeakTime,
    /// Induction plane 1 energy against peak time.
    EnergyPlane1VsPeakTime,
}

impl HistogramView {
    /// Views filled for every run.
    pub const GEOMETRY: [HistogramView; 5] = [
        HistogramView::YVsX,
        HistogramView::XVsZ,
        HistogramView::YVsZ,
        HistogramView::YVsPeakTime,
        HistogramView::XVsPeakTime,
    ];

    /// Views filled in the energy-aware variant.
    pub const ENERGY: [HistogramView; 3] = [
        HistogramView::EnergyCollectionVsPeakTime,
        HistogramView::EnergyPlane0VsPeakTime,
        HistogramView::EnergyPlane1VsPeakTime,
    ];

    /// Histogram identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            HistogramView::YVsX => "hYX",
            HistogramView::XVsZ => "hXZ",
            HistogramView::YVsZ => "hYZ",
            HistogramView::YVsPeakTime => "hYPT",
            HistogramView::XVsPeakTime => "hXPT",
            HistogramView::EnergyCollectionVsPeakTime => "hEColPT",
            HistogramView::EnergyPlane0VsPeakTime => "hEPlane0PT",
            HistogramView::EnergyPlane1VsPeakTime => "hEPlane1PT",
        }
    }

    /// Output file name without extension.
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            HistogramView::YVsX => "Y_vs_X",
            HistogramView::XVsZ => "X_vs_Z",
            HistogramView::YVsZ => "Y_vs_Z",
            HistogramView::YVsPeakTime => "Y_vs_PeakTime",
            HistogramView::XVsPeakTime => "X_vs_PeakTime",
            HistogramView::EnergyCollectionVsPeakTime => "EnergyCollection_vs_PeakTime",
            HistogramView::EnergyPlane0VsPeakTime => "EnergyPlane0_vs_PeakTime",
            HistogramView::EnergyPlane1VsPeakTime => "EnergyPlane1_vs_PeakTime",
        }
    }

    /// Energy field feeding this view, if any.
    #[must_use]
    pub const fn energy_field(self) -> Option<Field> {
        match self {
            HistogramView::EnergyCollectionVsPeakTime => Some(Field::EnergyCollection),
            HistogramView::EnergyPlane0VsPeakTime => Some(Field::EnergyPlane0),
            HistogramView::EnergyPlane1VsPeakTime => Some(Field::EnergyPlane1),
            _ => None,
        }
    }

    /// The energy view fed by `field`.
    #[must_use]
    pub const fn for_energy_field(field: Field) -> Option<Self> {
        match field {
            Field::EnergyCollection => Some(HistogramView::EnergyCollectionVsPeakTime),
            Field::EnergyPlane0 => Some(HistogramView::EnergyPlane0VsPeakTime),
            Field::EnergyPlane1 => Some(HistogramView::EnergyPlane1VsPeakTime),
            Field::Y | Field::Z | Field::PeakTime => None,
        }
    }

    /// Energy views are displayed on a logarithmic y axis.
    #[must_use]
    pub const fn log_y(self) -> bool {
        self.energy_field().is_some()
    }

    /// Title and axis labels.
    #[must_use]
    pub fn meta(self) -> HistMeta {
        let (title, x_label, y_label) = match self {
            HistogramView::YVsX => ("Y vs X", X_LABEL, Y_LABEL),
            HistogramView::XVsZ => ("X vs Z", Z_LABEL, X_LABEL),
            HistogramView::YVsZ => ("Y vs Z", Z_LABEL, Y_LABEL),
            HistogramView::YVsPeakTime => ("Y vs PeakTime", TIME_LABEL, Y_LABEL),
            HistogramView::XVsPeakTime => ("X vs PeakTime", TIME_LABEL, X_LABEL),
            HistogramView::EnergyCollectionVsPeakTime => {
                ("EnergyCollection vs PeakTime", TIME_LABEL, ENERGY_LABEL)
            }
            HistogramView::EnergyPlane0VsPeakTime => {
                ("EnergyPlane0 vs PeakTime", TIME_LABEL, ENERGY_LABEL)
            }
            HistogramView::EnergyPlane1VsPeakTime => {
                ("EnergyPlane1 vs PeakTime", TIME_LABEL, ENERGY_LABEL)
            }
        };
        HistMeta::new(self.name(), title, x_label, y_label)
    }
}

/// Mean-Y profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileView {
    /// All clusters.
    YVsPeakTime,
    /// Clusters with drift X below the threshold.
    YVsPeakTimeAnode,
    /// Clusters with drift X at or above the threshold.
    YVsPeakTimeCathode,
}

impl ProfileView {
    /// All profiles in export order.
    pub const ALL: [ProfileView; 3] = [
        ProfileView::YVsPeakTime,
        ProfileView::YVsPeakTimeAnode,
        ProfileView::YVsPeakTimeCathode,
    ];

    /// Profile identifier.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ProfileView::YVsPeakTime => "pYvsPT",
            ProfileView::YVsPeakTimeAnode => "pYvsPT_Anode",
            ProfileView::YVsPeakTimeCathode => "pYvsPT_Cathode",
        }
    }

    /// Legend label used when the two sides are overlaid.
    #[must_use]
    pub const fn legend(self) -> &'static str {
        match self {
            ProfileView::YVsPeakTime => "All clusters",
            ProfileView::YVsPeakTimeAnode => "Anode side",
            ProfileView::YVsPeakTimeCathode => "Cathode side",
        }
    }

    /// Line colour.
    #[must_use]
    pub const fn color(self) -> Rgb {
        match self {
            ProfileView::YVsPeakTime => Rgb::BLACK,
            ProfileView::YVsPeakTimeAnode => Rgb::BLUE,
            ProfileView::YVsPeakTimeCathode => Rgb::DARK_GREEN,
        }
    }

    /// Title and axis labels.
    #[must_use]
    pub fn meta(self) -> HistMeta {
        let title = match self {
            ProfileView::YVsPeakTime => "Mean Y vs PeakTime",
            ProfileView::YVsPeakTimeAnode => "Mean Y vs PeakTime (Anode)",
            ProfileView::YVsPeakTimeCathode => "Mean Y vs PeakTime (Cathode)",
        };
        HistMeta::new(self.name(), title, TIME_LABEL, "<Y> (cm)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_views_map_to_fields() {
        for field in Field::ENERGY {
            let view = HistogramView::for_energy_field(field).unwrap();
            assert_eq!(view.energy_field(), Some(field));
            assert!(view.log_y());
        }
        for view in HistogramView::GEOMETRY {
            assert!(view.energy_field().is_none());
            assert!(!view.log_y());
        }
    }

    #[test]
    fn test_file_stems() {
        assert_eq!(HistogramView::YVsX.file_stem(), "Y_vs_X");
        assert_eq!(
            HistogramView::EnergyPlane0VsPeakTime.file_stem(),
            "EnergyPlane0_vs_PeakTime"
        );
        assert_eq!(HistogramView::XVsZ.meta().x_label, "Z (cm)");
    }

    #[test]
    fn test_profile_colors_distinct() {
        assert_ne!(
            ProfileView::YVsPeakTimeAnode.color(),
            ProfileView::YVsPeakTimeCathode.color()
        );
    }
}
