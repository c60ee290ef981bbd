//! clusterplot CLI
//!
//! Reads the `ana/ClusterTree` table of an input file, fills the drift
//! corrected cluster histograms and profiles, and writes one PNG per view
//! into `plots/`.
#![allow(clippy::uninlined_format_args)]

mod export;

use clap::Parser;
use clusterplot_analysis::{AnalysisConfig, ClusterAccumulator};
use clusterplot_io::{ClusterFile, ClusterTable, TableLocation};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;
use thiserror::Error;

/// Events read and filled per chunk.
const CHUNK_ROWS: usize = 50_000;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Input(#[from] clusterplot_io::Error),

    #[error("Analysis error: {0}")]
    Core(#[from] clusterplot_core::Error),

    #[error("Export error: {0}")]
    Render(#[from] clusterplot_render::Error),
}

/// Drift-corrected cluster plots from a cluster table.
#[derive(Parser)]
#[command(name = "clusterplot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file holding the ana/ClusterTree table
    input: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(&cli.input, Path::new(export::OUTPUT_DIR)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(input: &Path, out_dir: &Path) -> Result<()> {
    let start = Instant::now();

    let file = ClusterFile::open(input)?;
    let table = file.table(&TableLocation::default())?;
    println!("Total entries: {}", table.row_count());

    let config = if table.has_energy() {
        AnalysisConfig::energy_aware()
    } else {
        AnalysisConfig::default()
    };
    log::info!(
        "energy views {}",
        if config.is_energy_aware() {
            "enabled"
        } else {
            "disabled (no energy fields)"
        }
    );

    let mut accumulator = ClusterAccumulator::new(&config)?;
    for chunk in table.events(CHUNK_ROWS) {
        accumulator.fill_events_parallel(&chunk?)?;
    }
    let plots = accumulator.finalize();

    std::fs::create_dir_all(out_dir)?;
    let jobs = export::export_plan(&plots, out_dir);
    let written = export::export_all(&jobs)?;

    let stats = plots.stats();
    println!(
        "Processed {} of {} events ({} clusters)",
        stats.events_processed, stats.events_seen, stats.clusters
    );
    println!(
        "All plots saved successfully: {} images in {}/ ({:.2}s)",
        written,
        out_dir.display(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clusterplot_core::{Event, Field};
    use clusterplot_io::{write_cluster_tree, WriteOptions};

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_single_positional_input() {
        let cli = Cli::try_parse_from(["clusterplot", "run.h5"]).unwrap();
        assert_eq!(cli.input, PathBuf::from("run.h5"));
        assert!(Cli::try_parse_from(["clusterplot"]).is_err());
        assert!(Cli::try_parse_from(["clusterplot", "a.h5", "b.h5"]).is_err());
    }

    #[test]
    fn test_missing_input_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("plots");
        let err = run(&dir.path().join("absent.h5"), &out_dir).unwrap_err();
        assert!(matches!(
            err,
            CliError::Input(clusterplot_io::Error::Open { .. })
        ));
        assert!(!out_dir.exists());
    }

    #[test]
    fn test_missing_table_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.h5");
        write_cluster_tree(
            &input,
            &TableLocation::new("ana", "HitTree"),
            &[Event::with_base(vec![1.0], vec![2.0], vec![3.0])],
            WriteOptions::default(),
        )
        .unwrap();
        let out_dir = dir.path().join("plots");
        let err = run(&input, &out_dir).unwrap_err();
        assert!(err.to_string().contains("HitTree"));
        assert!(!out_dir.exists());
    }

    const GEOMETRY_FILES: [&str; 7] = [
        "Y_vs_X.png",
        "X_vs_Z.png",
        "Y_vs_Z.png",
        "Y_vs_PeakTime.png",
        "X_vs_PeakTime.png",
        "Profile_Y_vs_PeakTime.png",
        "Profile_Y_vs_PeakTime_AnodeCathode.png",
    ];

    #[test]
    fn test_zero_event_run_writes_empty_plots() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty.h5");
        let events: Vec<Event> = Vec::new();
        write_cluster_tree(
            &input,
            &TableLocation::default(),
            &events,
            WriteOptions::default(),
        )
        .unwrap();

        let out_dir = dir.path().join("plots");
        run(&input, &out_dir).unwrap();
        for name in GEOMETRY_FILES {
            assert!(out_dir.join(name).is_file(), "{name} missing");
        }
        assert!(!out_dir.join("EnergyCollection_vs_PeakTime.png").exists());
    }

    #[test]
    fn test_energy_run_writes_every_view() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("run.h5");
        let events: Vec<Event> = (0..200u16)
            .map(|i| {
                let pt = f32::from(i) * 25.0;
                Event::with_base(vec![f32::from(i % 40) - 20.0], vec![0.0], vec![pt])
                    .with_column(Field::EnergyCollection, vec![1.0 + f32::from(i % 9)])
            })
            .collect();
        write_cluster_tree(
            &input,
            &TableLocation::default(),
            &events,
            WriteOptions::default(),
        )
        .unwrap();

        let out_dir = dir.path().join("plots");
        run(&input, &out_dir).unwrap();
        for name in GEOMETRY_FILES.into_iter().chain([
            "EnergyCollection_vs_PeakTime.png",
            "EnergyPlane0_vs_PeakTime.png",
            "EnergyPlane1_vs_PeakTime.png",
        ]) {
            assert!(out_dir.join(name).is_file(), "{name} missing");
        }
    }
}
