//! Trial range clamp
//!
//! Keeps the trial selector and its "Max: N" label consistent with the selected
//! subject. Two handlers are exposed:
//! - [`RangeClamp::on_subject_change`]: rebounds the trial control and copies the
//!   (possibly clamped) trial value back into the shared parameters
//! - [`RangeClamp::on_trial_change`]: clamps the trial control only; the shared
//!   parameters are left alone unless [`ClampConfig::resync_on_trial_change`] is set
//!
//! Handlers never fail. Subjects outside the table are clamped for the lookup
//! and values that do not parse as integers skip the steps that need them.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::controls::{parse_control_value, BoundLabel, TrialControl};
use crate::types::{ClampConfig, SharedParameters, SubjectMaxTable};

/// What a handler did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClampOutcome {
    /// Trial ceiling for the current subject
    pub max: u32,
    /// The trial control was rewritten to `max`
    pub clamped: bool,
    /// Value copied into `Parameters::trial`, if any
    pub resynced: Option<i64>,
}

/// Label text for a trial ceiling
pub fn max_label(max: u32) -> String {
    format!("Max: {max}")
}

/// Constraint enforcer over the shared page parameters
///
/// The controls are lent to each handler call by the host, which keeps
/// ownership of them for the whole page session.
#[derive(Debug, Clone)]
pub struct RangeClamp {
    params: SharedParameters,
    table: SubjectMaxTable,
    config: ClampConfig,
}

impl RangeClamp {
    pub fn new(params: SharedParameters, table: SubjectMaxTable, config: ClampConfig) -> Self {
        Self {
            params,
            table,
            config,
        }
    }

    pub fn table(&self) -> &SubjectMaxTable {
        &self.table
    }

    pub fn config(&self) -> &ClampConfig {
        &self.config
    }

    /// Subject value changed (typed, committed or mid-drag).
    pub fn on_subject_change<T, L>(&self, trial: &mut T, label: &mut L) -> ClampOutcome
    where
        T: TrialControl,
        L: BoundLabel,
    {
        let max = self.current_max();

        trial.set_max(max);
        label.set_label(&max_label(max));
        let clamped = clamp_trial(trial, max);
        let resynced = self.resync_trial(trial);

        debug!(max, clamped, ?resynced, "subject changed");
        ClampOutcome {
            max,
            clamped,
            resynced,
        }
    }

    /// Trial value changed (typed, committed or mid-drag).
    pub fn on_trial_change<T: TrialControl>(&self, trial: &mut T) -> ClampOutcome {
        let max = self.current_max();
        let clamped = clamp_trial(trial, max);
        let resynced = if self.config.resync_on_trial_change {
            self.resync_trial(trial)
        } else {
            None
        };

        debug!(max, clamped, ?resynced, "trial changed");
        ClampOutcome {
            max,
            clamped,
            resynced,
        }
    }

    /// Ceiling for the subject currently held in the shared parameters
    fn current_max(&self) -> u32 {
        let subject = self.params.borrow().subject;
        if self.table.get(subject).is_none() {
            warn!(
                subject,
                subjects = self.table.len(),
                "subject outside table, clamping for lookup"
            );
        }
        self.table.max_for(subject)
    }

    /// Copy the trial control's value into the shared parameters.
    fn resync_trial<T: TrialControl>(&self, trial: &T) -> Option<i64> {
        let value = parse_control_value(&trial.get())?;
        self.params.borrow_mut().trial = value;
        Some(value)
    }
}

/// Force the trial control to `max` when it is at or above it.
fn clamp_trial<T: TrialControl>(trial: &mut T, max: u32) -> bool {
    let raw = trial.get();
    match parse_control_value(&raw) {
        Some(value) if value >= i64::from(max) => {
            trial.set(max);
            true
        }
        Some(_) => false,
        None => {
            warn!(value = %raw, "trial value is not an integer, skipping clamp");
            false
        }
    }
}
