//! The recognize command.

use std::io::Write;
use std::path::Path;

use slipscan_core::{Config, Session};
use slipscan_engine::{License, RecognitionEngine};
use tracing::info;

use crate::error::CliResult;
use crate::loader::LoadedImage;
use crate::report::print_report;

/// Recognizes the payment slip in the image at `path` with `engine` and
/// writes the verdicts to `out`.
///
/// Returns whether any recognizer reported a valid payment.
///
/// # Errors
///
/// Returns an error if the image cannot be loaded, the session fails, or
/// the report cannot be written.
// Only the tests drive this without the vendor library.
#[cfg_attr(not(feature = "native"), allow(dead_code))]
pub fn execute<E: RecognitionEngine>(
    engine: &E,
    license: &License,
    config: Config,
    path: &Path,
    out: &mut impl Write,
) -> CliResult<bool> {
    let image = LoadedImage::open(path)?;
    let frame = image.frame()?;

    let report = Session::new(engine, config).recognize(license, frame)?;
    print_report(out, &report)?;

    let success = report.is_success();
    info!(
        path = %path.display(),
        overall = ?report.overall,
        success,
        "recognition complete"
    );
    Ok(success)
}

/// Recognizes with the vendor library.
#[cfg(feature = "native")]
pub fn execute_native(
    license: &License,
    config: Config,
    path: &Path,
    out: &mut impl Write,
) -> CliResult<bool> {
    let engine = slipscan_ffi::NativeEngine::new();
    execute(&engine, license, config, path, out)
}

/// Reports that this build carries no recognition engine.
#[cfg(not(feature = "native"))]
pub fn execute_native(
    _license: &License,
    _config: Config,
    _path: &Path,
    _out: &mut impl Write,
) -> CliResult<bool> {
    Err(crate::error::CliError::EngineUnavailable)
}
