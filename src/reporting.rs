use std::io::{self, Write};

use crate::pipeline::StageOutput;

/// Writes a one-line-per-artifact summary.
pub fn write_stage_report(mut out: impl Write, outputs: &[StageOutput]) -> io::Result<()> {
    writeln!(out, "--- Pipeline Report ---")?;
    for o in outputs {
        writeln!(out, "{:<11} {:>7} rows  {}", o.stage, o.rows, o.path.display())?;
    }
    writeln!(out, "Artifacts written: {}", outputs.len())
}

/// Writes the stage report to stdout.
///
/// # Errors
///
/// Returns the underlying write error, e.g. a closed pipe.
pub fn print_stage_report(outputs: &[StageOutput]) -> io::Result<()> {
    write_stage_report(io::stdout().lock(), outputs)
}
