//! CSV reading and writing for [`Table`].

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::error::PipelineError;
use crate::table::{Table, Value};

/// Parses a header-row CSV into a table.
///
/// Each field goes through [`Value::parse`].
///
/// # Errors
///
/// Returns a `csv::Error` on malformed input or ragged rows.
pub fn read_table(reader: impl Read) -> Result<Table, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut table = Table::new(rdr.headers()?.iter());
    for record in rdr.records() {
        table.push_row(record?.iter().map(Value::parse).collect());
    }
    Ok(table)
}

/// Writes a table as CSV with a header row.
///
/// Missing cells are written as empty fields.
///
/// # Errors
///
/// Returns a `csv::Error` if writing fails.
pub fn write_table(table: &Table, writer: impl Write) -> Result<(), csv::Error> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(row.iter().map(ToString::to_string))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Reads a CSV file into a table.
///
/// # Errors
///
/// Returns a `PipelineError` if the file cannot be opened or parsed.
pub fn read_table_file(path: &Path) -> Result<Table, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(read_table(io::BufReader::new(file))?)
}

/// Writes a table to a CSV file, creating parent directories as needed.
///
/// # Errors
///
/// Returns a `PipelineError` if the file cannot be created or written.
pub fn write_table_file(table: &Table, path: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| PipelineError::io(path, e))?;
    write_table(table, io::BufWriter::new(file))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "country,year,primary_energy_consumption\n\
                          World,2020,100.5\n\
                          World,2021,\n";

    #[test]
    fn reads_header_and_typed_cells() {
        let table = read_table(SAMPLE.as_bytes()).expect("sample should parse");
        assert_eq!(
            table.columns(),
            &["country", "year", "primary_energy_consumption"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0, "year"), Some(&Value::Number(2020.0)));
        assert_eq!(table.get(1, "primary_energy_consumption"), Some(&Value::Missing));
    }

    #[test]
    fn written_output_parses_back_identically() {
        let table = read_table(SAMPLE.as_bytes()).expect("sample should parse");
        let mut buf = Vec::new();
        write_table(&table, &mut buf).expect("write should succeed");
        let text = String::from_utf8(buf).expect("utf-8");
        assert_eq!(text, SAMPLE);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = read_table("a,b\n1\n".as_bytes());
        assert!(err.is_err());
    }

    #[test]
    fn file_helpers_create_parent_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/out.csv");
        let table = Table::new(["a"]).with_row(vec![Value::Number(1.0)]);
        write_table_file(&table, &path).expect("write should succeed");
        let back = read_table_file(&path).expect("read should succeed");
        assert_eq!(back, table);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_table_file(Path::new("/nonexistent/input.csv"));
        let msg = err.expect_err("missing file should fail").to_string();
        assert!(msg.contains("/nonexistent/input.csv"));
    }
}
