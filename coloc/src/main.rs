//! Coloc CLI - batch co-localization counting

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use coloc::{
    run_batch, write_csv, JsonRoiArchive, LabelDirectorySource, Manifest, NullRoiWriter, RegionAnalyzer, RoiWriter,
};

#[derive(Parser)]
#[command(name = "coloc")]
#[command(version, about = "Per-region co-localization of segmented objects", long_about = None)]
struct Cli {
    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Directory for rolling log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every sample in a manifest
    Run {
        /// Batch manifest (JSON)
        manifest: PathBuf,
        /// Output CSV
        #[arg(short, long, default_value = "coloc_results.csv")]
        output: PathBuf,
        /// Directory for triple-positive ROI archives; export is skipped if absent
        #[arg(short, long)]
        rois: Option<PathBuf>,
    },
    /// Load and validate a manifest without analyzing
    Validate {
        /// Batch manifest (JSON)
        manifest: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = common::log_setup::setup_logging(&cli.log_level, &cli.log_dir)?;

    match cli.command {
        Commands::Run {
            manifest,
            output,
            rois,
        } => run(&manifest, &output, rois),
        Commands::Validate { manifest } => {
            let loaded = Manifest::from_file(&manifest)
                .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;
            let regions: usize = loaded.samples.iter().map(|s| s.regions.len()).sum();
            tracing::info!(samples = loaded.samples.len(), regions, "manifest is valid");
            Ok(())
        }
    }
}

fn run(manifest_path: &Path, output: &Path, rois: Option<PathBuf>) -> Result<()> {
    let manifest = Manifest::from_file(manifest_path)
        .with_context(|| format!("Failed to load manifest {}", manifest_path.display()))?;

    let analyzer = RegionAnalyzer::new(manifest.analysis).context("Invalid analysis configuration")?;
    tracing::info!(
        overlap_threshold = manifest.analysis.overlap_threshold,
        connectivity = ?manifest.analysis.connectivity,
        a = %manifest.channels.a.marker,
        b = %manifest.channels.b.marker,
        c = %manifest.channels.c.marker,
        "starting batch"
    );

    let sources: Vec<LabelDirectorySource> = manifest
        .samples
        .iter()
        .cloned()
        .map(LabelDirectorySource::new)
        .collect();

    let writer: Box<dyn RoiWriter> = match rois {
        Some(dir) => Box::new(JsonRoiArchive::new(dir)),
        None => Box::new(NullRoiWriter),
    };

    let report = run_batch(&sources, &analyzer, &manifest.channels, writer.as_ref());

    for failure in &report.failures {
        tracing::error!(sample = %failure.sample, error = %failure.error, "sample not analyzed");
    }

    write_csv(output, &report.rows).with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(())
}
