//! Trial metadata and the trial information report
//!
//! Every trial ships with a JSON document describing the participant and the
//! annotated phases of the walk. Boundaries and foot events are sample indices
//! recorded at [`SAMPLE_RATE_HZ`].

use serde::{Deserialize, Serialize};
use std::fs;
use tracing::debug;

use crate::dataset::catalog::{Catalog, TrialCode};
use crate::error::GaitError;

/// Sampling frequency of every sensor in the dataset
pub const SAMPLE_RATE_HZ: f64 = 100.0;

/// Walked distance (10 m out and 10 m back) times `SAMPLE_RATE_HZ`, so that
/// dividing by a sample count gives meters per second.
const TRIAL_DISTANCE_SCALED: f64 = 20.0 * SAMPLE_RATE_HZ;

/// Metadata document for one trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrialMetadata {
    pub subject: u32,
    pub trial: u32,
    /// Age in years
    pub age: serde_json::Number,
    pub gender: String,
    /// Height in centimeters
    pub height: serde_json::Number,
    /// Weight in kilograms
    pub weight: serde_json::Number,
    /// `[start, end]` of the whole walk
    pub trial_boundaries: [i64; 2],
    /// `[start, end]` of the U-turn
    #[serde(rename = "UTurnBoundaries")]
    pub u_turn_boundaries: [i64; 2],
    /// `[start, end]` of each left swing phase
    pub left_foot_events: Vec<[i64; 2]>,
    /// `[start, end]` of each right swing phase
    pub right_foot_events: Vec<[i64; 2]>,
}

impl TrialMetadata {
    /// Parse and check a metadata document.
    pub fn from_json(json: &str) -> Result<Self, GaitError> {
        let metadata: TrialMetadata = serde_json::from_str(json)?;
        metadata.validate()?;
        Ok(metadata)
    }

    /// Read the metadata file for `code` from the catalog folder.
    pub fn load(catalog: &Catalog, code: TrialCode) -> Result<Self, GaitError> {
        let path = catalog.metadata_path(code);
        debug!(path = %path.display(), "loading trial metadata");
        let metadata = Self::from_json(&fs::read_to_string(path)?)?;
        if metadata.code() != Some(code) {
            return Err(GaitError::InvalidMetadata {
                code: code.to_string(),
                reason: format!("document describes {}-{}", metadata.subject, metadata.trial),
            });
        }
        Ok(metadata)
    }

    pub fn code(&self) -> Option<TrialCode> {
        TrialCode::new(self.subject, self.trial).ok()
    }

    fn validate(&self) -> Result<(), GaitError> {
        let invalid = |reason: &str| GaitError::InvalidMetadata {
            code: format!("{}-{}", self.subject, self.trial),
            reason: reason.to_string(),
        };

        let [start, end] = self.trial_boundaries;
        if end <= start {
            return Err(invalid("trial boundaries must end after they start"));
        }
        let [start, end] = self.u_turn_boundaries;
        if end < start {
            return Err(invalid("U-turn boundaries are reversed"));
        }
        Ok(())
    }

    pub fn summary(&self) -> TrialSummary {
        let [trial_start, trial_end] = self.trial_boundaries;
        let [turn_start, turn_end] = self.u_turn_boundaries;

        let walking_speed = TRIAL_DISTANCE_SCALED / (trial_end - trial_start) as f64;

        TrialSummary {
            subject: self.subject,
            trial: self.trial,
            age: self.age.clone(),
            gender: self.gender.clone(),
            height: self.height.clone(),
            weight: self.weight.clone(),
            walking_speed_mps: (walking_speed * 1000.0).round_ties_even() / 1000.0,
            u_turn_duration_s: (turn_end - turn_start) as f64 / SAMPLE_RATE_HZ,
            left_footsteps: self.left_foot_events.len(),
            right_footsteps: self.right_foot_events.len(),
        }
    }
}

/// Figures shown in the trial information report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub subject: u32,
    pub trial: u32,
    pub age: serde_json::Number,
    pub gender: String,
    pub height: serde_json::Number,
    pub weight: serde_json::Number,
    /// Rounded to three decimals
    pub walking_speed_mps: f64,
    pub u_turn_duration_s: f64,
    pub left_footsteps: usize,
    pub right_footsteps: usize,
}

/// Float formatting that always keeps a fractional part (`4.0`, `1.25`)
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

/// Two-column plain-text report, as written to `trial_info.txt`.
pub fn render_report(summary: &TrialSummary) -> String {
    let subject = format!("Subject: {}", summary.subject);
    let trial = format!("Trial: {}", summary.trial);
    let age = format!("Age (year): {}", summary.age);
    let height = format!("Height (cm): {}", summary.height);
    let weight = format!("Weight (kg): {}", summary.weight);
    let speed = format!("WalkingSpeed (m/s): {}", decimal(summary.walking_speed_mps));
    let turn = format!("U-Turn Duration (s): {}", decimal(summary.u_turn_duration_s));
    let left = format!("    - Left foot: {}", summary.left_footsteps);
    let right = format!("    - Right foot: {}", summary.right_footsteps);
    let rule = format!("{}+{}", "-".repeat(30), "-".repeat(30));

    let mut out = String::from("\n");
    out.push_str(&format!("    {subject:^30}|{trial:^30}\n"));
    out.push_str(&format!("    {rule}\n"));
    out.push_str(&format!("    {age:<30}| {speed:<30}\n"));
    out.push_str(&format!("    {height:<30}| Number of footsteps:\n"));
    out.push_str(&format!("    {weight:<30}| {left:<30}\n"));
    out.push_str(&format!("    {turn:<30}| {right:<30}\n"));
    out.push_str("    \n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_json() -> &'static str {
        r#"{
            "Subject": 14,
            "Trial": 2,
            "Age": 27,
            "Gender": "F",
            "Height": 168,
            "Weight": 61.5,
            "TrialBoundaries": [120, 1720],
            "UTurnBoundaries": [850, 1200],
            "LeftFootEvents": [[150, 210], [260, 320], [370, 430]],
            "RightFootEvents": [[180, 240], [290, 350]],
            "PathologyGroup": "Healthy"
        }"#
    }

    #[test]
    fn test_parse_metadata_ignores_extra_fields() {
        let metadata = TrialMetadata::from_json(sample_json()).unwrap();
        assert_eq!(metadata.code(), Some(TrialCode { subject: 14, trial: 2 }));
        assert_eq!(metadata.u_turn_boundaries, [850, 1200]);
        assert_eq!(metadata.left_foot_events.len(), 3);
    }

    #[test]
    fn test_summary_figures() {
        let summary = TrialMetadata::from_json(sample_json()).unwrap().summary();

        assert_eq!(summary.walking_speed_mps, 1.25);
        assert_eq!(summary.u_turn_duration_s, 3.5);
        assert_eq!(summary.left_footsteps, 3);
        assert_eq!(summary.right_footsteps, 2);
    }

    #[test]
    fn test_walking_speed_rounds_to_three_decimals() {
        let mut metadata = TrialMetadata::from_json(sample_json()).unwrap();
        metadata.trial_boundaries = [0, 1500];
        assert_eq!(metadata.summary().walking_speed_mps, 1.333);
    }

    #[test]
    fn test_walking_speed_halves_round_to_even() {
        let mut metadata = TrialMetadata::from_json(sample_json()).unwrap();
        // 2000 / 1280 = 1.5625 exactly
        metadata.trial_boundaries = [0, 1280];
        assert_eq!(metadata.summary().walking_speed_mps, 1.562);
        // 2000 / 6400 = 0.3125 exactly
        metadata.trial_boundaries = [0, 6400];
        assert_eq!(metadata.summary().walking_speed_mps, 0.312);
    }

    #[test]
    fn test_rejects_degenerate_boundaries() {
        let json = sample_json().replace("[120, 1720]", "[500, 500]");
        let err = TrialMetadata::from_json(&json).unwrap_err();
        assert!(matches!(err, GaitError::InvalidMetadata { .. }));

        let json = sample_json().replace("[850, 1200]", "[1200, 850]");
        assert!(TrialMetadata::from_json(&json).is_err());
    }

    #[test]
    fn test_missing_field_is_json_error() {
        let json = sample_json().replace("\"Gender\": \"F\",", "");
        assert!(matches!(TrialMetadata::from_json(&json), Err(GaitError::Json(_))));
    }

    #[test]
    fn test_render_report_layout() {
        let summary = TrialMetadata::from_json(sample_json()).unwrap().summary();
        let report = render_report(&summary);
        let lines: Vec<&str> = report.lines().collect();

        assert_eq!(lines[0], "");
        assert_eq!(
            lines[1],
            format!("    {:^30}|{:^30}", "Subject: 14", "Trial: 2")
        );
        assert_eq!(lines[2], format!("    {}+{}", "-".repeat(30), "-".repeat(30)));
        assert_eq!(lines[3], format!("    {:<30}| {:<30}", "Age (year): 27", "WalkingSpeed (m/s): 1.25"));
        assert_eq!(lines[4], format!("    {:<30}| Number of footsteps:", "Height (cm): 168"));
        assert_eq!(lines[5], format!("    {:<30}| {:<30}", "Weight (kg): 61.5", "    - Left foot: 3"));
        assert_eq!(lines[6], format!("    {:<30}| {:<30}", "U-Turn Duration (s): 3.5", "    - Right foot: 2"));
        assert!(report.ends_with("\n    \n"));
    }

    #[test]
    fn test_decimal_keeps_fraction() {
        assert_eq!(decimal(4.0), "4.0");
        assert_eq!(decimal(1.333), "1.333");
    }
}
