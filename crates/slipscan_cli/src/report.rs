//! Console report of a recognition pass.

use std::io::{self, Write};

use slipscan_core::SessionReport;
use slipscan_engine::ResultState;

/// Writes the per-recognizer verdicts of `report` to `out`.
pub fn print_report(out: &mut impl Write, report: &SessionReport) -> io::Result<()> {
    if report.overall == ResultState::Empty {
        writeln!(out, "Nothing recognized!")?;
        return Ok(());
    }

    for outcome in &report.results {
        let label = outcome.kind.label();
        if outcome.is_valid() {
            writeln!(out, "{label} result is valid!")?;
            writeln!(out, "IBAN: {}.", outcome.result.iban)?;
            writeln!(out, "Amount EUR: {}", outcome.result.amount_eur)?;
        } else {
            writeln!(out, "{label} result is invalid!")?;
        }
    }
    Ok(())
}
