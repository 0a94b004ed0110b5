//! Energy-data pipeline: CSV cleaning, scenario projection, and technology
//! cost series with learning-curve adjustment.

/// Column inference, cleaning, projection, aggregation, and cost series.
pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
#[cfg(feature = "fetch")]
pub mod fetch;
pub mod io;
pub mod pipeline;
pub mod reporting;
pub mod table;
