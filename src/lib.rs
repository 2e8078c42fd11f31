//! gait-trials - Trial browsing helpers for a walking-gait inertial dataset
//!
//! The dataset is browsed by picking a subject and one of that subject's
//! trials. The trial selector is bounded by a per-subject ceiling, enforced by
//! a small reactive widget that runs headlessly against capability traits.
//!
//! ## Modules
//!
//! - **Range clamp**: keeps the trial selector and its "Max: N" label in step
//!   with the selected subject
//! - **Page**: ready lifecycle and event dispatch around the widget
//! - **Dataset**: trial catalog, metadata and the trial information report

pub mod controls;
pub mod dataset;
pub mod error;
pub mod page;
pub mod range_clamp;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use controls::{BoundLabel, PairedControl, TextElement, TrialControl, ValueControl};
pub use dataset::{Catalog, TrialCode, TrialMetadata};
pub use error::GaitError;
pub use page::{ControlEvent, ControlTarget, HeadlessPage, Page, PageSnapshot};
pub use range_clamp::{ClampOutcome, RangeClamp};
pub use types::{ClampConfig, Parameters, SharedParameters, SubjectMaxTable};

/// Library version
pub const GAIT_VERSION: &str = env!("CARGO_PKG_VERSION");
