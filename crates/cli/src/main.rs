//! opsroster CLI
//!
//! Command-line interface for turning dispatch roster photos into the
//! operations handover report: Extract (photo -> units), Parse (transcript
//! -> units), Render (units -> report).
//!
//! Copyright (c) 2025 Michael A Wright

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use core_pipeline::{
    extract_units, render_report, ExtractionOutcome, OcrEngine, Session, UnitRecord,
};
use llm_bridge::{vision::DEFAULT_VISION_MODEL, OllamaClient, OllamaConfig, VisionOcr};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuild host: ",
    env!("BUILT_HOST"),
    "\ncommit: ",
    env!("BUILT_GIT_COMMIT_HASH"),
    "\nbuilt at: ",
    env!("BUILT_TIME_UTC"),
);

#[derive(Parser)]
#[command(name = "opsroster")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "Roster photo -> unit list -> operations handover report", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum EngineKind {
    /// Vision model served by Ollama
    Ollama,
    /// Local Tesseract (needs the `tesseract` feature)
    Tesseract,
}

#[derive(Subcommand)]
enum Commands {
    /// Run OCR on a roster photo and print the extracted units as JSON
    Extract {
        /// Preprocessed roster image
        #[arg(short, long)]
        image: PathBuf,

        /// OCR engine
        #[arg(short, long, value_enum, default_value = "ollama")]
        engine: EngineKind,

        /// Vision model name for the Ollama engine
        #[arg(long, default_value = DEFAULT_VISION_MODEL)]
        model: String,

        /// Ollama base URL
        #[arg(long, env = "OLLAMA_URL", default_value = "http://localhost:11434")]
        ollama_url: String,

        /// Write units JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Parse an existing OCR transcript into units JSON
    Parse {
        /// Transcript text file
        #[arg(short, long)]
        input: PathBuf,

        /// Write units JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the handover report from a units JSON file
    Render {
        /// Recipient as "Name | Code"
        #[arg(short, long)]
        recipient: String,

        /// Deputy as "Name | Code"
        #[arg(short, long)]
        deputy: String,

        /// Units JSON file (as written by extract/parse)
        #[arg(short, long)]
        units: PathBuf,

        /// Write the report here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn build_engine(
    kind: EngineKind,
    model: String,
    ollama_url: String,
) -> Result<Box<dyn OcrEngine>> {
    match kind {
        EngineKind::Ollama => {
            let client = OllamaClient::new(OllamaConfig::with_base_url(ollama_url))?;
            Ok(Box::new(VisionOcr::new(client, model)))
        }
        #[cfg(feature = "tesseract")]
        EngineKind::Tesseract => Ok(Box::new(core_pipeline::ocr::TesseractEngine::default())),
        #[cfg(not(feature = "tesseract"))]
        EngineKind::Tesseract => {
            anyhow::bail!("this build has no Tesseract support; rebuild with --features tesseract")
        }
    }
}

fn read_units(path: &Path) -> Result<Vec<UnitRecord>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read units file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Invalid units JSON in {}", path.display()))
}

fn units_json(units: &[UnitRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(units)?)
}

fn write_output(output: Option<&Path>, text: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, text)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn run_parse(input: &Path) -> Result<Vec<UnitRecord>> {
    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read transcript {}", input.display()))?;
    Ok(extract_units(&text))
}

fn run_render(recipient: &str, deputy: &str, units: &Path) -> Result<String> {
    let units = read_units(units)?;
    render_report(recipient, deputy, &units).map_err(|e| match e.notice() {
        Some(notice) => anyhow::anyhow!("{} ({})", notice, e),
        None => e.into(),
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();
    debug!(
        rustc = built_info::RUSTC_VERSION,
        target = built_info::TARGET,
        "opsroster starting"
    );

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            image,
            engine,
            model,
            ollama_url,
            output,
        } => {
            let bytes = std::fs::read(&image)
                .with_context(|| format!("Failed to read image {}", image.display()))?;
            let engine = build_engine(engine, model, ollama_url)?;

            let mut session = Session::new();
            let outcome = session.ingest_image(engine.as_ref(), &bytes).await;
            eprintln!("{}", outcome.notice());
            if outcome == ExtractionOutcome::Failed {
                anyhow::bail!("text extraction failed for {}", image.display());
            }
            write_output(output.as_deref(), &units_json(session.units())?)
        }
        Commands::Parse { input, output } => {
            let units = run_parse(&input)?;
            info!(units = units.len(), "parsed transcript");
            write_output(output.as_deref(), &units_json(&units)?)
        }
        Commands::Render {
            recipient,
            deputy,
            units,
            output,
        } => {
            let report = run_render(&recipient, &deputy, &units)?;
            write_output(output.as_deref(), &report)
        }
    }
}
