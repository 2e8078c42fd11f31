//! Core types shared by the widget, the page host and the dataset helpers
//!
//! This module defines the per-subject trial ceiling table, the page parameters
//! that the widget reads and writes, and the widget configuration.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

use crate::error::GaitError;

/// Maximum trial number per subject in the published dataset (subjects 1..=19)
pub const DEFAULT_SUBJECT_MAX: [u32; 19] = [6, 4, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 6, 4, 6, 6, 6, 6, 6];

/// Per-subject ceiling on the trial number, indexed by 1-based subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<u32>", into = "Vec<u32>")]
pub struct SubjectMaxTable {
    maxima: Vec<u32>,
}

impl Default for SubjectMaxTable {
    fn default() -> Self {
        Self {
            maxima: DEFAULT_SUBJECT_MAX.to_vec(),
        }
    }
}

impl SubjectMaxTable {
    /// Build a table from per-subject maxima. Every entry must be positive.
    pub fn new(maxima: Vec<u32>) -> Result<Self, GaitError> {
        if maxima.is_empty() {
            return Err(GaitError::InvalidTable("table has no subjects".to_string()));
        }
        if let Some(pos) = maxima.iter().position(|&m| m == 0) {
            return Err(GaitError::InvalidTable(format!(
                "subject {} has a zero trial maximum",
                pos + 1
            )));
        }
        Ok(Self { maxima })
    }

    /// Number of subjects covered by the table
    pub fn len(&self) -> usize {
        self.maxima.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maxima.is_empty()
    }

    /// Clamp an arbitrary subject value into `1..=len()`.
    pub fn clamp_subject(&self, subject: i64) -> usize {
        subject.clamp(1, self.maxima.len() as i64) as usize
    }

    /// Maximum trial for `subject`, or `None` when it is outside the table.
    pub fn get(&self, subject: i64) -> Option<u32> {
        if subject < 1 {
            return None;
        }
        let idx = usize::try_from(subject - 1).ok()?;
        self.maxima.get(idx).copied()
    }

    /// Maximum trial for `subject` after clamping it into the table bounds.
    pub fn max_for(&self, subject: i64) -> u32 {
        self.maxima[self.clamp_subject(subject) - 1]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.maxima
    }
}

impl TryFrom<Vec<u32>> for SubjectMaxTable {
    type Error = GaitError;

    fn try_from(maxima: Vec<u32>) -> Result<Self, Self::Error> {
        Self::new(maxima)
    }
}

impl From<SubjectMaxTable> for Vec<u32> {
    fn from(table: SubjectMaxTable) -> Self {
        table.maxima
    }
}

/// Subject/trial selection shared between the page and the widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Selected subject (1-based)
    pub subject: i64,
    /// Selected trial (1-based)
    pub trial: i64,
}

impl Default for Parameters {
    fn default() -> Self {
        Self { subject: 1, trial: 1 }
    }
}

impl Parameters {
    pub fn new(subject: i64, trial: i64) -> Self {
        Self { subject, trial }
    }

    /// Wrap into a handle that the page and the widget can both hold.
    pub fn shared(self) -> SharedParameters {
        Rc::new(RefCell::new(self))
    }
}

/// Parameters owned by the page and lent to the widget
pub type SharedParameters = Rc<RefCell<Parameters>>;

/// Widget behavior switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClampConfig {
    /// Copy the clamped trial back into [`Parameters::trial`] on the trial path
    /// too. Off by default: only the subject path re-syncs.
    pub resync_on_trial_change: bool,
}

impl ClampConfig {
    /// Load configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, GaitError> {
        Ok(serde_json::from_str(json)?)
    }
}
