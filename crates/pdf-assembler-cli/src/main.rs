//! PDF Assembler CLI - Command line tool for building PDFs from images and merging PDFs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use pdf_assembler_core::{
    AppConfig, BatchProcessor, FileExport, ImageConverter, InputFile, LopdfImageEngine,
    LopdfMergeEngine, PdfMerger, Pipeline, PipelineKind, ProgressFn,
};
use std::path::PathBuf;
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PageOption {
    A4,
    Letter,
}

impl PageOption {
    const fn preset_name(self) -> &'static str {
        match self {
            Self::A4 => "a4",
            Self::Letter => "letter",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "pdf-assemble")]
#[command(author, version, about = "Convert images to PDF and merge PDF files", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file path
    #[arg(short, long, global = true, env = "PDF_ASSEMBLER_CONFIG")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Place each image on its own page of a new PDF
    Images {
        /// Input image files, in page order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output PDF file (default: <output dir>/converted_images.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Page size
        #[arg(long, value_enum)]
        page: Option<PageOption>,

        /// Margin around each image, in millimetres
        #[arg(long)]
        margin: Option<f64>,
    },

    /// Concatenate the pages of two or more PDFs
    Merge {
        /// Input PDF files, in merge order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output PDF file (default: <output dir>/merged.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Command {
    const fn kind(&self) -> PipelineKind {
        match self {
            Self::Images { .. } => PipelineKind::Images,
            Self::Merge { .. } => PipelineKind::Merge,
        }
    }

    fn files(&self) -> &[PathBuf] {
        match self {
            Self::Images { files, .. } | Self::Merge { files, .. } => files,
        }
    }

    fn output(&self) -> Option<&PathBuf> {
        match self {
            Self::Images { output, .. } | Self::Merge { output, .. } => output.as_ref(),
        }
    }
}

fn progress_bar(total: usize) -> ProgressBar {
    #[allow(clippy::cast_possible_truncation)]
    let pb = ProgressBar::new(total as u64);
    // Template is hardcoded and valid, unwrap is safe
    #[allow(clippy::unwrap_used)]
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    pb
}

fn progress_callback(pb: &ProgressBar) -> ProgressFn {
    let pb = pb.clone();
    Box::new(move |done, _total| {
        #[allow(clippy::cast_possible_truncation)]
        pb.set_position(done as u64);
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (before parsing args so env vars are available)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Setup logging
    let log_level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Load or create config
    let mut config = if let Some(config_path) = &args.config {
        AppConfig::from_file(config_path).context("Failed to load config file")?
    } else {
        AppConfig::load()
    };

    // Override config with CLI arguments
    if let Command::Images { page, margin, .. } = &args.command {
        if let Some(page) = page {
            config.page.size = page.preset_name().to_string();
            config.page.width_mm = None;
            config.page.height_mm = None;
        }
        if let Some(margin) = margin {
            config.page.margin_mm = *margin;
        }
    }
    config.validate().context("Invalid configuration")?;

    // Load input files
    let kind = args.command.kind();
    let mut inputs = Vec::with_capacity(args.command.files().len());
    for path in args.command.files() {
        let file = InputFile::from_path(path)
            .with_context(|| format!("Failed to read input: {}", path.display()))?;
        inputs.push(file);
    }

    let mut pipeline = Pipeline::new(kind);
    let requested = inputs.len();
    let added = pipeline.add(inputs).with_context(|| {
        pipeline
            .status()
            .map(|status| status.message.clone())
            .unwrap_or_default()
    })?;
    if added < requested {
        warn!(
            "Skipped {} file(s) that are not {} files",
            requested - added,
            kind.filter().label()
        );
    }
    info!("Collected {} files for {}", added, kind);

    let pb = progress_bar(added);
    let processor: Box<dyn BatchProcessor> = match kind {
        PipelineKind::Images => Box::new(
            ImageConverter::from_config(LopdfImageEngine, &config)?
                .with_progress(progress_callback(&pb)),
        ),
        PipelineKind::Merge => Box::new(
            PdfMerger::from_config(LopdfMergeEngine, &config).with_progress(progress_callback(&pb)),
        ),
    };

    // Determine output path
    let file_name = match kind {
        PipelineKind::Images => &config.output.image_file_name,
        PipelineKind::Merge => &config.output.merge_file_name,
    };
    let output_path = args.command.output().cloned().unwrap_or_else(|| {
        config
            .output
            .dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(file_name)
    });
    let sink = FileExport::to_path(&output_path);

    let result = pipeline.run(processor.as_ref(), &sink).await;
    let message = pipeline
        .status()
        .map(|status| status.message.clone())
        .unwrap_or_default();

    match result {
        Ok(()) => pb.finish_with_message(message),
        Err(e) => {
            pb.abandon();
            return Err(e).context(message);
        }
    }

    // CLI output is intentional
    #[allow(clippy::print_stdout)]
    {
        println!("PDF saved to: {}", output_path.display());
    }

    Ok(())
}
