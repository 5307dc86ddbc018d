//! Batch command - slice every matched (image, annotation) pair under two
//! directory roots.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use image::GrayImage;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use wordslice_core::{
    load_annotations, pair_by_stem, FrameExtractor, FrameSink, PngSink, WordAnnotation,
    WordsliceConfig,
};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Directory root containing page images
    #[arg(required = true)]
    image_root: PathBuf,

    /// Directory root containing SVG annotation files
    #[arg(required = true)]
    annotation_root: PathBuf,

    /// Output root directory (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Page image extension (default: from config)
    #[arg(long)]
    image_ext: Option<String>,

    /// Annotation file extension (default: from config)
    #[arg(long)]
    annotation_ext: Option<String>,

    /// Frame width in pixels (default: from config)
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels (default: from config)
    #[arg(long)]
    height: Option<u32>,

    /// Number of parallel workers
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Exit with an error if any word failed to extract
    #[arg(long)]
    strict: bool,
}

/// Outcome for a single (document, polygon) task.
struct SliceResult {
    document: String,
    id: String,
    error: Option<String>,
}

/// One unit of parallel work: a word polygon on a loaded page.
struct SliceTask {
    document: String,
    page: Arc<GrayImage>,
    annotation: WordAnnotation,
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        WordsliceConfig::from_file(std::path::Path::new(path))?
    } else {
        WordsliceConfig::default()
    };

    let image_ext = args
        .image_ext
        .clone()
        .unwrap_or_else(|| config.discovery.image_extension.clone());
    let annotation_ext = args
        .annotation_ext
        .clone()
        .unwrap_or_else(|| config.discovery.annotation_extension.clone());

    let images = discover(&args.image_root, &image_ext)?;
    let annotations = discover(&args.annotation_root, &annotation_ext)?;

    if images.is_empty() {
        anyhow::bail!(
            "No .{} files found under {}",
            image_ext,
            args.image_root.display()
        );
    }

    // Pairing is a batch precondition: reject mismatches before any
    // extraction runs.
    let pairs = pair_by_stem(&images, &annotations)?;
    println!(
        "{} Found {} matched document pairs",
        style("ℹ").blue(),
        pairs.len()
    );

    // Load pages and annotation sets, fanning each word out as its own
    // task. Per-document load failures are recorded and skipped.
    let mut tasks: Vec<SliceTask> = Vec::new();
    let mut results: Vec<SliceResult> = Vec::new();
    for pair in &pairs {
        let page = match image::open(&pair.image_path) {
            Ok(img) => Arc::new(img.to_luma8()),
            Err(e) => {
                warn!("Failed to load {}: {}", pair.image_path.display(), e);
                results.push(SliceResult {
                    document: pair.key.clone(),
                    id: "<page>".to_string(),
                    error: Some(e.to_string()),
                });
                continue;
            }
        };
        match load_annotations(&pair.annotation_path) {
            Ok(words) => {
                debug!("{}: {} word annotations", pair.key, words.len());
                tasks.extend(words.into_iter().map(|annotation| SliceTask {
                    document: pair.key.clone(),
                    page: Arc::clone(&page),
                    annotation,
                }));
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", pair.annotation_path.display(), e);
                results.push(SliceResult {
                    document: pair.key.clone(),
                    id: "<annotations>".to_string(),
                    error: Some(e.to_string()),
                });
            }
        }
    }

    info!("Extracting {} word frames", tasks.len());

    let extractor = FrameExtractor::new().with_target_size(
        args.width.unwrap_or(config.frame.width),
        args.height.unwrap_or(config.frame.height),
    );
    let sink = PngSink::new(args.output.clone().unwrap_or(config.output.root.clone()));

    let pb = ProgressBar::new(tasks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} words")
            .unwrap()
            .progress_chars("=>-"),
    );

    // Every task is independent, so the fan-out needs no coordination
    // beyond collecting results.
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs)
        .build()?;
    let mut task_results: Vec<SliceResult> = pool.install(|| {
        tasks
            .par_iter()
            .map(|task| {
                let outcome = extractor
                    .extract(&task.page, &task.annotation.polygon, &task.annotation.id)
                    .and_then(|frame| sink.store(&task.document, &frame));
                pb.inc(1);
                SliceResult {
                    document: task.document.clone(),
                    id: task.annotation.id.clone(),
                    error: outcome.err().map(|e| e.to_string()),
                }
            })
            .collect()
    });
    pb.finish_with_message("Complete");
    results.append(&mut task_results);

    let successful = results.iter().filter(|r| r.error.is_none()).count();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Processed {} words from {} documents in {:?}",
        style("✓").green(),
        results.len(),
        pairs.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed items:").red());
        for result in &failed {
            println!(
                "  - {}/{}: {}",
                result.document,
                result.id,
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
        if args.strict {
            anyhow::bail!("{} of {} items failed", failed.len(), results.len());
        }
    }

    Ok(())
}

/// Recursively collect files with the given extension under a root.
fn discover(root: &PathBuf, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    let pattern = root.join(format!("**/*.{}", extension));
    let pattern = pattern
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Non-UTF-8 path: {}", root.display()))?;

    let mut files: Vec<PathBuf> = glob(pattern)?.filter_map(|r| r.ok()).collect();
    files.sort();
    debug!("{} .{} files under {}", files.len(), extension, root.display());
    Ok(files)
}
