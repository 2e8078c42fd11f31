//! Dataset helpers
//!
//! The published dataset is a flat folder of files named after a trial code
//! (`<subject>-<trial>`): one JSON metadata file and one tab-separated signal
//! file per sensor (`_lb` lower back, `_lf` left foot, `_rf` right foot).

mod catalog;
mod metadata;

pub use catalog::{Catalog, Sensor, TrialCode, DEFAULT_DATA_DIR};
pub use metadata::{render_report, TrialMetadata, TrialSummary, SAMPLE_RATE_HZ};
