//! cellfeat CLI - ROI isolation and feature extraction for cell images

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cellfeat_algorithms::config::PipelineConfig;
use cellfeat_algorithms::pipeline::{PreprocessState, Preprocessor};
use cellfeat_core::io::{
    read_color_image, read_manifest, write_feature_table, write_gray_image, Split,
};
use cellfeat_core::{FeatureExtractor, MultiChannelImage};

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "cellfeat")]
#[command(author, version, about = "Feature extraction for microscopic cell images", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Pipeline configuration (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show size, channels and per-channel statistics of an image
    Info {
        /// Input image file
        input: PathBuf,
    },
    /// Extract a feature table from a manifest split or a list of images
    Extract {
        /// Dataset manifest CSV (path,label,label_idx,split)
        #[arg(short, long, conflicts_with = "images")]
        manifest: Option<PathBuf>,
        /// Manifest split to process: train, valid, test
        #[arg(short, long, default_value = "train")]
        split: String,
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,
        /// Image files, used when no manifest is given
        images: Vec<PathBuf>,
    },
    /// Write the ROI mask and masked working plane of one image
    Roi {
        /// Input image file
        input: PathBuf,
        /// Output mask image
        #[arg(long)]
        mask_out: PathBuf,
        /// Output masked working image
        #[arg(long)]
        masked_out: Option<PathBuf>,
        /// Output normalized image
        #[arg(long)]
        normalized_out: Option<PathBuf>,
    },
    /// Print the effective configuration as TOML
    Config {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn progress(len: usize, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .unwrap()
            .progress_chars("=> "),
    );
    pb.set_message(msg.to_string());
    pb
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

/// Decode every image, returning them with their class indices
fn load_images(
    manifest: Option<&Path>,
    split: &str,
    paths: &[PathBuf],
) -> Result<(Vec<MultiChannelImage>, Option<Vec<usize>>)> {
    let (files, labels): (Vec<PathBuf>, Option<Vec<usize>>) = match manifest {
        Some(m) => {
            let split: Split = split.parse().context("Invalid split")?;
            let manifest = read_manifest(m)
                .with_context(|| format!("Failed to read manifest {}", m.display()))?;
            let entries: Vec<_> = manifest.split(split).collect();
            info!("Manifest {}: {} images in split {}", m.display(), entries.len(), split);
            (
                entries.iter().map(|e| e.path.clone()).collect(),
                Some(entries.iter().map(|e| e.label_idx).collect()),
            )
        }
        None => (paths.to_vec(), None),
    };
    if files.is_empty() {
        anyhow::bail!("No images to process");
    }

    let pb = progress(files.len(), "Reading");
    let mut images = Vec::with_capacity(files.len());
    for path in &files {
        let img = read_color_image(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        images.push(img);
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok((images, labels))
}

fn preprocess(config: &PipelineConfig, images: &[MultiChannelImage]) -> Result<PreprocessState> {
    let pb = spinner("Isolating ROIs...");
    let preprocessor = Preprocessor::new(config.preprocess_params()?)?
        .with_mode(config.execution_mode()?);
    let state = preprocessor.run(images).context("Preprocessing failed")?;
    pb.finish_and_clear();
    Ok(state)
}

fn done(name: &str, path: &Path, elapsed: std::time::Duration) {
    println!("{} saved to: {}", name, path.display());
    println!("  Processing time: {:.2?}", elapsed);
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        // ── Info ─────────────────────────────────────────────────────
        Commands::Info { input } => {
            let img = read_color_image(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let (rows, cols) = img.shape();

            println!("File: {}", input.display());
            println!("Dimensions: {} x {} ({} pixels)", cols, rows, rows * cols);
            println!("Channels: {}", img.channels());
            println!("\nStatistics:");
            for (i, name) in ["red", "green", "blue"].iter().enumerate().take(img.channels()) {
                let plane = img.channel(i)?;
                let stats = plane.statistics(None)?;
                println!(
                    "  {:<5} min {:>3}  max {:>3}  mean {:>8.3}  std {:>8.3}",
                    name, stats.min, stats.max, stats.mean, stats.std_dev
                );
            }
        }

        // ── Extract ──────────────────────────────────────────────────
        Commands::Extract {
            manifest,
            split,
            output,
            images,
        } => {
            let (images, labels) = load_images(manifest.as_deref(), &split, &images)?;
            info!("Input: {} images", images.len());

            let start = Instant::now();
            let state = preprocess(&config, &images)?;

            let mut pipeline = config.build_pipeline(Some(&state.masks))?;
            if pipeline.is_empty() {
                anyhow::bail!("No feature extractor is enabled");
            }
            let pb = spinner("Extracting features...");
            let matrix = pipeline
                .fit_transform(&state.normalized, labels.as_deref())
                .context("Feature extraction failed")?;
            pb.finish_and_clear();
            let elapsed = start.elapsed();
            info!("Features: {} x {}", matrix.nrows(), matrix.ncols());

            let file = File::create(&output)
                .with_context(|| format!("Failed to create {}", output.display()))?;
            write_feature_table(
                &matrix,
                &pipeline.feature_names(),
                labels.as_deref(),
                BufWriter::new(file),
            )
            .context("Failed to write feature table")?;
            done("Features", &output, elapsed);
        }

        // ── ROI ──────────────────────────────────────────────────────
        Commands::Roi {
            input,
            mask_out,
            masked_out,
            normalized_out,
        } => {
            let img = read_color_image(&input)
                .with_context(|| format!("Failed to read {}", input.display()))?;
            let start = Instant::now();
            let state = preprocess(&config, std::slice::from_ref(&img))?;
            let elapsed = start.elapsed();

            let mask = &state.masks[0];
            info!(
                "ROI: {} of {} pixels",
                mask.foreground_count(),
                mask.shape().0 * mask.shape().1
            );
            write_gray_image(mask.image(), &mask_out).context("Failed to write mask")?;
            if let Some(path) = &masked_out {
                write_gray_image(&state.masked[0], path)
                    .context("Failed to write masked image")?;
            }
            if let Some(path) = &normalized_out {
                write_gray_image(&state.normalized[0], path)
                    .context("Failed to write normalized image")?;
            }
            done("Mask", &mask_out, elapsed);
        }

        // ── Config ───────────────────────────────────────────────────
        Commands::Config { output } => {
            let text = config.to_toml_string()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("Config saved to: {}", path.display());
                }
                None => print!("{}", text),
            }
        }
    }

    Ok(())
}
