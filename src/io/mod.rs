//! File boundaries: CSV tables in, CSV/JSON artifacts out.

pub mod export;
pub mod table_csv;
