//! PalliCalc command-line front end.
//!
//! Usage:
//!   pallicalc convert [REQUEST.json]      (stdin when omitted)
//!   pallicalc reference <DIR>             (export the active reference data)
//!
//! `--reference-dir` (or `PALLICALC_REFERENCE_DIR`) swaps in locally
//! maintained `conversions.json` and `formulary.json`.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;

use pallicalc::config::{self, REFERENCE_DIR_ENV};
use pallicalc::reference::ReferenceError;
use pallicalc::{ConversionRequest, ReferenceData, RegimenError};

#[derive(Parser)]
#[command(name = "pallicalc", version = config::APP_VERSION)]
#[command(about = "Opioid rotation calculator (OME conversion and dose rounding)", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory holding conversions.json and formulary.json
    #[arg(long, global = true, env = REFERENCE_DIR_ENV)]
    reference_dir: Option<PathBuf>,

    /// Single-line JSON instead of pretty-printed
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a regimen request and print the target regimen
    Convert {
        /// Request file; reads stdin when omitted or '-'
        request: Option<PathBuf>,
    },

    /// Write the reference data the engine would use as editable JSON files
    Reference {
        /// Output directory for conversions.json and formulary.json
        out: PathBuf,
    },
}

#[derive(Error, Debug)]
enum CliError {
    #[error("Failed to read {0}: {1}")]
    Input(String, io::Error),

    #[error("Invalid request: {0}")]
    Request(serde_json::Error),

    #[error("Failed to encode output: {0}")]
    Output(serde_json::Error),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Regimen(#[from] RegimenError),
}

fn main() -> ExitCode {
    pallicalc::init_tracing();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "pallicalc failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let loaded;
    let reference = match &cli.reference_dir {
        Some(dir) => {
            loaded = ReferenceData::load(dir)?;
            &loaded
        }
        None => ReferenceData::standard(),
    };

    match &cli.command {
        Commands::Convert { request } => {
            let raw = read_request(request.as_deref())?;
            let request: ConversionRequest =
                serde_json::from_str(&raw).map_err(CliError::Request)?;
            let result = request.execute(reference)?;
            encode(&result, cli.compact)
        }
        Commands::Reference { out } => {
            reference.write(out)?;
            Ok(format!("Reference data written to {}", out.display()))
        }
    }
}

fn read_request(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(p) if p != Path::new("-") => {
            fs::read_to_string(p).map_err(|e| CliError::Input(p.display().to_string(), e))
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| CliError::Input("stdin".into(), e))?;
            Ok(buf)
        }
    }
}

fn encode<T: serde::Serialize>(value: &T, compact: bool) -> Result<String, CliError> {
    let encoded = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    encoded.map_err(CliError::Output)
}
