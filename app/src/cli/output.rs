use crate::cli::Format;
use anyhow::Result;
use std::io::Write;
use vb_bench::{report, BenchReport};

/// Ranked section on stdout, failures on stderr; or one JSON document on stdout.
pub fn emit_report(format: Format, bench: &BenchReport) -> Result<()> {
    match format {
        Format::Human => {
            report::write_normal(std::io::stdout().lock(), bench)?;
            report::write_errors(std::io::stderr().lock(), bench)?;
        }
        Format::Json => {
            let mut out = std::io::stdout().lock();
            writeln!(out, "{}", report::to_json(bench)?)?;
        }
    }
    Ok(())
}
