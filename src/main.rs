//! # Reportflow CLI
//!
//! Usage:
//!   reportflow render request.json -o report.pdf
//!   echo '{ ... }' | reportflow render --format json
//!   reportflow candidate candidate.json --out-dir reports/
//!   reportflow example > candidate.json

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use reportflow::error::ReportError;
use reportflow::model::{PageMetrics, RenderRequest};
use reportflow::report::{report_filename, CandidateReport};
use reportflow::style::LayoutOptions;

#[derive(Parser)]
#[command(name = "reportflow")]
#[command(version, about = "Lay out card-based reports into pages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a JSON render request (page, layout, document)
    Render {
        /// Input file; reads stdin when omitted
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Format::Pdf)]
        format: Format,
    },
    /// Build and render a candidate report from candidate data
    Candidate {
        /// Candidate data file
        input: PathBuf,

        /// Directory the report is written to
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(long, value_enum, default_value_t = Format::Pdf)]
        format: Format,

        /// Page unit
        #[arg(long, value_enum, default_value_t = UnitArg::Mm)]
        unit: UnitArg,
    },
    /// Print example candidate data
    Example,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pdf,
    Json,
}

impl Format {
    fn extension(self) -> &'static str {
        match self {
            Format::Pdf => "pdf",
            Format::Json => "json",
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum UnitArg {
    Mm,
    Pt,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli.command) {
        Ok(Some((bytes, path))) => {
            eprintln!("✓ Written {} bytes to {}", bytes, path.display());
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

/// Run one command. Returns the byte count and path of the written file.
fn run(command: Command) -> Result<Option<(usize, PathBuf)>, ReportError> {
    match command {
        Command::Example => {
            let json = serde_json::to_string_pretty(&CandidateReport::example())
                .map_err(|e| ReportError::Render(e.to_string()))?;
            println!("{json}");
            Ok(None)
        }

        Command::Render {
            input,
            output,
            format,
        } => {
            let json = read_input(input.as_deref())?;
            let request: RenderRequest = serde_json::from_str(&json)?;
            let output =
                output.unwrap_or_else(|| PathBuf::from(format!("output.{}", format.extension())));
            let bytes = render(&request, format)?;
            fs::write(&output, &bytes)?;
            Ok(Some((bytes.len(), output)))
        }

        Command::Candidate {
            input,
            out_dir,
            format,
            unit,
        } => {
            let json = read_input(Some(input.as_path()))?;
            let candidate: CandidateReport = serde_json::from_str(&json)?;

            let page = match unit {
                UnitArg::Mm => PageMetrics::a4_mm(),
                UnitArg::Pt => PageMetrics::a4_pt(),
            };
            let options = LayoutOptions::for_unit(page.unit);
            let now = chrono::Local::now();
            let generated = now.format("%Y-%m-%d %H:%M").to_string();
            let document = candidate.to_document(&page, &options, Some(&generated));

            let request = RenderRequest {
                page,
                layout: Some(options),
                document,
            };
            let bytes = render(&request, format)?;

            fs::create_dir_all(&out_dir)?;
            let name = report_filename(&candidate.candidate_id, &now.naive_local(), format.extension());
            let output = out_dir.join(name);
            fs::write(&output, &bytes)?;
            info!(
                "candidate {} rendered to {}",
                candidate.candidate_id,
                output.display()
            );
            Ok(Some((bytes.len(), output)))
        }
    }
}

fn render(request: &RenderRequest, format: Format) -> Result<Vec<u8>, ReportError> {
    match format {
        Format::Pdf => reportflow::render(request),
        Format::Json => {
            let pages = reportflow::paginate_request(request)?;
            serde_json::to_vec_pretty(&pages).map_err(|e| ReportError::Render(e.to_string()))
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String, ReportError> {
    match path {
        Some(path) if path != Path::new("-") => Ok(fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}
