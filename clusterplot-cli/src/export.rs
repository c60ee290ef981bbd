//! Mapping of finished aggregates to image files.

use clusterplot_analysis::{FinishedPlots, ProfileView};
use clusterplot_render::{render, Overlay, Plot, RenderOptions};
use std::path::Path;

/// Directory receiving the images, relative to the working directory.
pub const OUTPUT_DIR: &str = "plots";

/// Title of the anode/cathode comparison.
const SPLIT_TITLE: &str = "Mean Y vs PeakTime (Anode / Cathode)";

/// One image to produce.
pub struct ExportJob<'a> {
    pub plot: Plot<'a>,
    pub options: RenderOptions,
}

/// Lists the images of a run in output order.
///
/// Every 2D view uses a logarithmic colour scale; energy views also get a
/// logarithmic y axis.
pub fn export_plan<'a>(plots: &'a FinishedPlots, out_dir: &Path) -> Vec<ExportJob<'a>> {
    let mut jobs: Vec<ExportJob<'a>> = plots
        .histograms()
        .map(|(view, hist)| ExportJob {
            plot: Plot::Histogram(hist),
            options: RenderOptions::new(out_dir.join(format!("{}.png", view.file_stem())))
                .with_log_z(true)
                .with_log_y(view.log_y()),
        })
        .collect();

    let all = plots.profile(ProfileView::YVsPeakTime);
    jobs.push(ExportJob {
        plot: Plot::Profile(all),
        options: RenderOptions::new(out_dir.join("Profile_Y_vs_PeakTime.png")),
    });

    let split = [ProfileView::YVsPeakTimeAnode, ProfileView::YVsPeakTimeCathode]
        .into_iter()
        .fold(
            RenderOptions::new(out_dir.join("Profile_Y_vs_PeakTime_AnodeCathode.png"))
                .with_title(SPLIT_TITLE),
            |options, view| {
                options.with_overlay(Overlay::new(plots.profile(view).clone(), view.legend()))
            },
        );
    jobs.push(ExportJob {
        plot: Plot::Profile(all),
        options: split,
    });
    jobs
}

/// Renders every job, stopping at the first failure.
///
/// # Errors
/// Returns the renderer error of the first failing image.
pub fn export_all(jobs: &[ExportJob<'_>]) -> clusterplot_render::Result<usize> {
    for job in jobs {
        render(job.plot, &job.options)?;
        log::info!("saved {}", job.options.output_path.display());
    }
    Ok(jobs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clusterplot_analysis::{AnalysisConfig, ClusterAccumulator};
    use clusterplot_core::Rgb;

    fn file_names(jobs: &[ExportJob<'_>]) -> Vec<String> {
        jobs.iter()
            .map(|job| {
                job.options
                    .output_path
                    .file_name()
                    .unwrap()
                    .to_string_lossy()
                    .into_owned()
            })
            .collect()
    }

    #[test]
    fn test_geometry_plan() {
        let plots = ClusterAccumulator::new(&AnalysisConfig::default())
            .unwrap()
            .finalize();
        let jobs = export_plan(&plots, Path::new(OUTPUT_DIR));
        assert_eq!(
            file_names(&jobs),
            vec![
                "Y_vs_X.png",
                "X_vs_Z.png",
                "Y_vs_Z.png",
                "Y_vs_PeakTime.png",
                "X_vs_PeakTime.png",
                "Profile_Y_vs_PeakTime.png",
                "Profile_Y_vs_PeakTime_AnodeCathode.png",
            ]
        );
        assert!(jobs[..5].iter().all(|job| job.options.log_scale_z));
        assert!(jobs[..5].iter().all(|job| !job.options.log_scale_y));
        assert!(jobs.iter().all(|job| job.options.output_path.starts_with("plots")));
    }

    #[test]
    fn test_energy_plan() {
        let plots = ClusterAccumulator::new(&AnalysisConfig::energy_aware())
            .unwrap()
            .finalize();
        let jobs = export_plan(&plots, Path::new(OUTPUT_DIR));
        let names = file_names(&jobs);
        assert_eq!(names.len(), 10);
        assert_eq!(names[5], "EnergyCollection_vs_PeakTime.png");
        assert_eq!(names[7], "EnergyPlane1_vs_PeakTime.png");
        assert!(jobs[5..8].iter().all(|job| job.options.log_scale_y));
    }

    #[test]
    fn test_split_profile_overlay() {
        let plots = ClusterAccumulator::new(&AnalysisConfig::default())
            .unwrap()
            .finalize();
        let jobs = export_plan(&plots, Path::new(OUTPUT_DIR));
        let split = &jobs.last().unwrap().options;
        assert_eq!(split.title.as_deref(), Some(SPLIT_TITLE));
        let overlay: Vec<(Rgb, &str)> = split
            .overlay
            .iter()
            .map(|o| (o.color, o.label.as_str()))
            .collect();
        assert_eq!(
            overlay,
            vec![(Rgb::BLUE, "Anode side"), (Rgb::DARK_GREEN, "Cathode side")]
        );
    }
}
