//! Trial catalog
//!
//! Lists the trial codes present in a dataset folder and derives the
//! per-subject trial ceiling from them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::GaitError;
use crate::types::SubjectMaxTable;

/// Folder name used by the dataset release
pub const DEFAULT_DATA_DIR: &str = "GaitData";

/// Subject/trial pair identifying one recording
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TrialCode {
    pub subject: u32,
    pub trial: u32,
}

impl TrialCode {
    pub fn new(subject: u32, trial: u32) -> Result<Self, GaitError> {
        if subject == 0 || trial == 0 {
            return Err(GaitError::InvalidTrialCode(format!("{subject}-{trial}")));
        }
        Ok(Self { subject, trial })
    }
}

impl fmt::Display for TrialCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.subject, self.trial)
    }
}

impl FromStr for TrialCode {
    type Err = GaitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || GaitError::InvalidTrialCode(s.to_string());
        let (subject, trial) = s.split_once('-').ok_or_else(invalid)?;
        let subject = subject.parse().map_err(|_| invalid())?;
        let trial = trial.parse().map_err(|_| invalid())?;
        Self::new(subject, trial).map_err(|_| invalid())
    }
}

/// Inertial sensor placement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sensor {
    LowerBack,
    LeftFoot,
    RightFoot,
}

impl Sensor {
    /// File suffix used in the dataset
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensor::LowerBack => "lb",
            Sensor::LeftFoot => "lf",
            Sensor::RightFoot => "rf",
        }
    }
}

/// Trial codes available in one dataset folder
#[derive(Debug, Clone)]
pub struct Catalog {
    root: PathBuf,
    codes: BTreeSet<TrialCode>,
}

impl Catalog {
    /// Scan `root` for left-foot signal files; each one marks a trial.
    pub fn scan(root: impl AsRef<Path>) -> Result<Self, GaitError> {
        let root = root.as_ref().to_path_buf();
        let suffix = format!("_{}.txt", Sensor::LeftFoot.as_str());
        let mut codes = BTreeSet::new();

        for entry in fs::read_dir(&root)? {
            let name = entry?.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(&suffix) else { continue };
            match stem.parse::<TrialCode>() {
                Ok(code) => {
                    codes.insert(code);
                }
                Err(_) => debug!(file = name, "skipping file without a trial code"),
            }
        }

        info!(root = %root.display(), trials = codes.len(), "scanned dataset folder");
        Ok(Self { root, codes })
    }

    /// Catalog over an explicit set of codes
    pub fn from_codes(root: impl Into<PathBuf>, codes: impl IntoIterator<Item = TrialCode>) -> Self {
        Self {
            root: root.into(),
            codes: codes.into_iter().collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn contains(&self, code: TrialCode) -> bool {
        self.codes.contains(&code)
    }

    /// Codes in subject then trial order
    pub fn codes(&self) -> impl Iterator<Item = TrialCode> + '_ {
        self.codes.iter().copied()
    }

    pub fn trials_for(&self, subject: u32) -> Vec<u32> {
        self.codes
            .range(TrialCode { subject, trial: 0 }..=TrialCode { subject, trial: u32::MAX })
            .map(|code| code.trial)
            .collect()
    }

    /// Ensure `code` is part of the dataset.
    pub fn require(&self, code: TrialCode) -> Result<(), GaitError> {
        if self.contains(code) {
            Ok(())
        } else {
            Err(GaitError::UnknownTrial {
                code: code.to_string(),
            })
        }
    }

    /// Highest recorded trial per subject, for subjects `1..=max_subject`.
    pub fn subject_max_table(&self) -> Result<SubjectMaxTable, GaitError> {
        let last = self
            .codes
            .iter()
            .map(|code| code.subject)
            .max()
            .ok_or_else(|| GaitError::EmptyCatalog(self.root.clone()))?;

        let mut maxima = Vec::with_capacity(last as usize);
        for subject in 1..=last {
            let max = self
                .trials_for(subject)
                .last()
                .copied()
                .ok_or(GaitError::MissingSubject(subject))?;
            maxima.push(max);
        }
        SubjectMaxTable::new(maxima)
    }

    pub fn metadata_path(&self, code: TrialCode) -> PathBuf {
        self.root.join(format!("{code}.json"))
    }

    pub fn sensor_path(&self, code: TrialCode, sensor: Sensor) -> PathBuf {
        self.root.join(format!("{code}_{}.txt", sensor.as_str()))
    }
}
