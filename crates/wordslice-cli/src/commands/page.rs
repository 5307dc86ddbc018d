//! Page command - extract frames from a single annotated page.

use std::path::PathBuf;
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use wordslice_core::{load_annotations, FrameExtractor, FrameSink, PngSink, WordsliceConfig};

/// Arguments for the page command.
#[derive(Args)]
pub struct PageArgs {
    /// Page image file (grayscale scan)
    #[arg(required = true)]
    image: PathBuf,

    /// SVG annotation file with word polygons
    #[arg(required = true)]
    annotations: PathBuf,

    /// Output root directory (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Frame width in pixels (default: from config)
    #[arg(long)]
    width: Option<u32>,

    /// Frame height in pixels (default: from config)
    #[arg(long)]
    height: Option<u32>,
}

pub fn run(args: PageArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let config = if let Some(path) = config_path {
        WordsliceConfig::from_file(std::path::Path::new(path))?
    } else {
        WordsliceConfig::default()
    };

    if !args.image.exists() {
        anyhow::bail!("Image file not found: {}", args.image.display());
    }
    if !args.annotations.exists() {
        anyhow::bail!("Annotation file not found: {}", args.annotations.display());
    }

    let document_key = args
        .image
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("page")
        .to_string();

    info!("Processing page: {}", args.image.display());

    let page = image::open(&args.image)?.to_luma8();
    let annotations = load_annotations(&args.annotations)?;

    let extractor = FrameExtractor::new().with_target_size(
        args.width.unwrap_or(config.frame.width),
        args.height.unwrap_or(config.frame.height),
    );
    let sink = PngSink::new(args.output.unwrap_or(config.output.root));

    let pb = ProgressBar::new(annotations.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} words")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut written = 0usize;
    let mut failed: Vec<(String, String)> = Vec::new();
    for annotation in &annotations {
        match extractor.extract(&page, &annotation.polygon, &annotation.id) {
            Ok(frame) => {
                sink.store(&document_key, &frame)?;
                written += 1;
            }
            Err(e) => {
                warn!("Skipping '{}': {}", annotation.id, e);
                failed.push((annotation.id.clone(), e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    println!(
        "{} Extracted {} of {} frames from {} in {:?}",
        style("✓").green(),
        written,
        annotations.len(),
        document_key,
        start.elapsed()
    );
    println!("   Output under {}", sink.root().join(&document_key).display());

    if !failed.is_empty() {
        println!();
        println!("{}", style("Skipped annotations:").red());
        for (id, reason) in &failed {
            println!("  - {}: {}", id, reason);
        }
    }

    Ok(())
}
