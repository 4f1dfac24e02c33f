use clap::{Parser, Subcommand};
use rust_omr::models::BitMatrix;
use rust_omr::models::raster::intensity_plane;
use rust_omr::tools::{binary_stats, grayscale_stats, load_from_path, sheet_images};
use rust_omr::{
    AnswerPolicy, AnswerSheetLayout, BubbleDetector, ConfigOverrides, ImagePreprocessor,
    OmrConfig, OmrProcessor, Result,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "omrtool", version, about = "Answer sheet grading tools")]
struct Cli {
    /// JSON config file (sheet, preprocess, layout)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Grade one sheet, or every image under a directory, and print JSON results
    Grade {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = 120)]
        questions: usize,
        /// Report "-" for questions with no filled bubble
        #[arg(long)]
        strict: bool,
        /// Leave per-bubble measurements out of the output
        #[arg(long)]
        no_bubbles: bool,
    },
    /// Write the binarized page and print pixel stats
    Preprocess {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Print the expected bubble and QR geometry for a page size
    Layout {
        #[arg(long)]
        width: u32,
        #[arg(long)]
        height: u32,
        #[arg(long, default_value_t = 120)]
        questions: usize,
    },
    /// Find bubble-sized blobs without a layout
    Blobs {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = 480)]
        expected: usize,
        /// Use exact connected components instead of the bounded flood fill
        #[arg(long)]
        components: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => OmrConfig::from_file(path)?,
        None => OmrConfig::default(),
    };

    match cli.command {
        Command::Grade {
            image,
            questions,
            strict,
            no_bubbles,
        } => grade_cmd(config, &image, questions, strict, no_bubbles),
        Command::Preprocess { image, out } => preprocess_cmd(&config, &image, &out),
        Command::Layout {
            width,
            height,
            questions,
        } => layout_cmd(&config, width, height, questions),
        Command::Blobs {
            image,
            expected,
            components,
        } => blobs_cmd(&config, &image, expected, components),
    }
}

fn grade_cmd(mut config: OmrConfig, root: &Path, questions: usize, strict: bool, no_bubbles: bool) -> Result<()> {
    if strict {
        config.sheet.answer_policy = AnswerPolicy::Strict;
    }
    if no_bubbles {
        config.include_bubbles = false;
    }
    let mut processor = OmrProcessor::with_config(config).with_pool();

    let images = sheet_images(root);
    info!(count = images.len(), root = %root.display(), "grading");
    let start = Instant::now();
    let mut failed = 0usize;

    for path in &images {
        match processor.process_path(path, questions) {
            Ok(result) => {
                let record = serde_json::json!({
                    "image": path.display().to_string(),
                    "result": result,
                });
                println!("{}", serde_json::to_string(&record)?);
            }
            Err(err) => {
                failed += 1;
                error!(image = %path.display(), %err, "grading failed");
            }
        }
    }

    info!(
        graded = images.len() - failed,
        failed,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "done"
    );
    Ok(())
}

fn preprocess_cmd(config: &OmrConfig, image: &Path, out: &Path) -> Result<()> {
    let raster = load_from_path(image)?;
    let preprocessor = ImagePreprocessor::new(config.preprocess.clone());

    let gray = preprocessor.to_grayscale(&raster);
    let stats = grayscale_stats(&intensity_plane(&gray));
    println!("Image: {} ({}x{})", image.display(), raster.width(), raster.height());
    println!("Grayscale: min={} max={} avg={}", stats.min, stats.max, stats.avg);

    let start = Instant::now();
    let binary = preprocessor.preprocess(&raster);
    let elapsed = start.elapsed();
    let stats = binary_stats(&BitMatrix::from_binary(&binary));
    println!(
        "Binary: black={} total={} ratio={:.4} ({:.2} ms)",
        stats.black_pixels,
        stats.total_pixels,
        stats.black_ratio,
        elapsed.as_secs_f64() * 1000.0
    );

    binary.save(out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn layout_cmd(config: &OmrConfig, width: u32, height: u32, questions: usize) -> Result<()> {
    let mut layout = AnswerSheetLayout::with_geometry(config.sheet.clone(), config.layout.clone());
    layout.update_config(&ConfigOverrides::questions(questions))?;

    let output = serde_json::json!({
        "width": width,
        "height": height,
        "questionsPerColumn": layout.config().questions_per_column(),
        "qrRegions": layout.qr_search_regions(width, height),
        "bubbles": layout.generate_bubble_layout(width, height),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn blobs_cmd(config: &OmrConfig, image: &Path, expected: usize, components: bool) -> Result<()> {
    let raster = load_from_path(image)?;
    let binary = ImagePreprocessor::new(config.preprocess.clone()).preprocess(&raster);
    let detector = BubbleDetector::new(config.sheet.clone());

    let start = Instant::now();
    let regions = if components {
        detector.detect_bubbles_using_components(&binary, expected)
    } else {
        detector.detect_bubbles_using_contours(&binary, expected)
    };
    let (min_area, max_area) = detector.blob_area_bounds();
    info!(
        found = regions.len(),
        expected,
        min_area,
        max_area,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "blob search"
    );

    println!("{}", serde_json::to_string_pretty(&regions)?);
    Ok(())
}
