//! SlipScan CLI
//!
//! Recognizes a Croatian payment slip barcode (PDF417 or QR) in an image
//! file and prints the IBAN and amount of every valid payment found.
//!
//! Exits with status 0 when at least one valid payment was recognized and
//! 1 otherwise, including on usage, license and engine errors.

mod config;
mod error;
mod loader;
mod report;
mod run;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::config::{resolve, ConfigFile, Overrides};
use crate::error::CliResult;

/// Payment slip barcode recognition.
#[derive(Parser)]
#[command(name = "slipscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the image to recognize
    image: PathBuf,

    /// License key for the recognition engine
    #[arg(long, env = "SLIPSCAN_LICENSE_KEY", hide_env_values = true)]
    license_key: Option<String>,

    /// Licensee the key was issued to
    #[arg(long, env = "SLIPSCAN_LICENSEE")]
    licensee: Option<String>,

    /// Directory for the engine's license cache [default: .]
    #[arg(long, env = "SLIPSCAN_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// JSON file with license and recognizer settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Keep results from every matching recognizer
    #[arg(long)]
    allow_multiple_results: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match recognize(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn recognize(cli: Cli) -> CliResult<bool> {
    let file = match &cli.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let overrides = Overrides {
        license_key: cli.license_key,
        licensee: cli.licensee,
        cache_dir: cli.cache_dir,
        allow_multiple_results: cli.allow_multiple_results,
    };
    let (license, config) = resolve(overrides, file)?;

    let stdout = io::stdout();
    run::execute_native(&license, config, &cli.image, &mut stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "slipscan",
            "slip.png",
            "--license-key",
            "abc",
            "--licensee",
            "demo",
            "--allow-multiple-results",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.image, PathBuf::from("slip.png"));
        assert_eq!(cli.license_key.as_deref(), Some("abc"));
        assert_eq!(cli.licensee.as_deref(), Some("demo"));
        assert!(cli.allow_multiple_results);
        assert!(cli.verbose);
    }

    #[test]
    fn image_is_required() {
        let err = Cli::try_parse_from(["slipscan"]).err().unwrap();
        assert!(err.use_stderr());
    }
}
