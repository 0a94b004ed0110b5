//! Plot-sink artifacts: JSON series and yearly demand CSV.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::analysis::demand::YearValue;
use crate::error::PipelineError;

/// Column header for the yearly demand CSV.
const DEMAND_HEADER: [&str; 2] = ["year", "total"];

/// Writes any serializable series mapping as pretty-printed JSON.
///
/// Map keys keep their insertion order, so technology and scenario order
/// survive into the artifact.
///
/// # Errors
///
/// Returns a `serde_json::Error` if serialization or writing fails.
pub fn write_series_json<T: Serialize + ?Sized>(
    series: &T,
    mut writer: impl Write,
) -> Result<(), serde_json::Error> {
    serde_json::to_writer_pretty(&mut writer, series)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)
}

/// Writes yearly totals as a two-column CSV.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_yearly_csv(totals: &[YearValue], writer: impl Write) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DEMAND_HEADER)?;
    for t in totals {
        wtr.write_record(&[t.year.to_string(), t.value.to_string()])?;
    }
    wtr.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<io::BufWriter<File>, PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(io::BufWriter::new(file))
}

/// Exports a series mapping to a JSON file at the given path.
///
/// # Errors
///
/// Returns a `PipelineError` if file creation or writing fails.
pub fn export_series_json<T: Serialize + ?Sized>(
    series: &T,
    path: &Path,
) -> Result<(), PipelineError> {
    let mut out = create(path)?;
    write_series_json(series, &mut out)?;
    out.flush().map_err(|e| PipelineError::io(path, e))
}

/// Exports yearly totals to a CSV file at the given path.
///
/// # Errors
///
/// Returns a `PipelineError` if file creation or writing fails.
pub fn export_yearly_csv(totals: &[YearValue], path: &Path) -> Result<(), PipelineError> {
    write_yearly_csv(totals, create(path)?)?;
    Ok(())
}
