//! Table transforms: column inference, cleaning, scenario projection,
//! learning-curve adjustment, and plot data preparation.

pub mod columns;
pub mod demand;
pub mod learning_curve;
pub mod preprocess;
pub mod scenario;
pub mod series;
