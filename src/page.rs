//! Page host
//!
//! Models the browsing page around the widget: it owns the controls and the
//! shared parameters, attaches a [`RangeClamp`] once the page is ready, and
//! forwards user events to it in dispatch order.

use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, info};

use crate::controls::{
    parse_control_value, BoundLabel, PairedControl, Representation, TextElement, TrialControl,
    ValueControl,
};
use crate::range_clamp::{ClampOutcome, RangeClamp};
use crate::types::{ClampConfig, Parameters, SharedParameters, SubjectMaxTable};

/// Which logical control an event targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlTarget {
    Subject,
    Trial,
}

/// Intermediate (`input`, e.g. mid-drag) or committed (`change`) edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Input,
    Change,
}

/// A user edit on one of the page controls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlEvent {
    pub target: ControlTarget,
    pub kind: EventKind,
    pub source: Representation,
    pub value: String,
}

impl ControlEvent {
    /// Committed edit typed into the numeric entry
    pub fn commit(target: ControlTarget, value: impl Into<String>) -> Self {
        Self {
            target,
            kind: EventKind::Change,
            source: Representation::Numeric,
            value: value.into(),
        }
    }

    /// Intermediate slider movement
    pub fn drag(target: ControlTarget, value: impl Into<String>) -> Self {
        Self {
            target,
            kind: EventKind::Input,
            source: Representation::Slider,
            value: value.into(),
        }
    }
}

/// Serializable view of the page state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub attached: bool,
    pub parameters: Parameters,
    pub trial_numeric: String,
    pub trial_slider: String,
    pub trial_max: Option<String>,
    pub label: String,
}

/// Widget registration waiting for the ready signal
#[derive(Debug)]
struct ReadyHook {
    table: SubjectMaxTable,
    config: ClampConfig,
}

/// Host page: controls, shared parameters and the ready lifecycle
#[derive(Debug)]
pub struct Page<S, T, L> {
    params: SharedParameters,
    subject: S,
    trial: T,
    label: L,
    hook: Option<ReadyHook>,
    clamp: Option<RangeClamp>,
}

impl<S, T, L> Page<S, T, L>
where
    S: ValueControl,
    T: TrialControl,
    L: BoundLabel,
{
    pub fn new(params: SharedParameters, subject: S, trial: T, label: L) -> Self {
        Self {
            params,
            subject,
            trial,
            label,
            hook: None,
            clamp: None,
        }
    }

    /// Register the widget to attach when the page becomes ready.
    pub fn on_ready(&mut self, table: SubjectMaxTable, config: ClampConfig) {
        self.hook = Some(ReadyHook { table, config });
    }

    /// Fire the ready signal. Attaches the registered widget and aligns the
    /// trial bound with the initial subject. Only the first call has effect.
    pub fn ready(&mut self) -> Option<ClampOutcome> {
        if self.clamp.is_some() {
            return None;
        }
        let hook = self.hook.take()?;

        let clamp = RangeClamp::new(Rc::clone(&self.params), hook.table, hook.config);
        let outcome = clamp.on_subject_change(&mut self.trial, &mut self.label);
        info!(subjects = clamp.table().len(), max = outcome.max, "range clamp attached");
        self.clamp = Some(clamp);
        Some(outcome)
    }

    pub fn is_attached(&self) -> bool {
        self.clamp.is_some()
    }

    pub fn parameters(&self) -> Parameters {
        *self.params.borrow()
    }

    pub fn shared_parameters(&self) -> SharedParameters {
        Rc::clone(&self.params)
    }

    pub fn subject(&self) -> &S {
        &self.subject
    }

    pub fn trial(&self) -> &T {
        &self.trial
    }

    pub fn label(&self) -> &L {
        &self.label
    }

    /// Apply a user edit, then run the matching handler if attached.
    pub fn dispatch(&mut self, event: &ControlEvent) -> Option<ClampOutcome> {
        debug!(target = ?event.target, kind = ?event.kind, value = %event.value, "dispatch");
        let parsed = parse_control_value(&event.value);

        match event.target {
            ControlTarget::Subject => {
                self.subject.set_from(event.source, &event.value);
                if let Some(subject) = parsed {
                    self.params.borrow_mut().subject = subject;
                }
            }
            ControlTarget::Trial => {
                self.trial.set_from(event.source, &event.value);
                if let Some(trial) = parsed {
                    self.params.borrow_mut().trial = trial;
                }
            }
        }

        let clamp = self.clamp.as_ref()?;
        Some(match event.target {
            ControlTarget::Subject => clamp.on_subject_change(&mut self.trial, &mut self.label),
            ControlTarget::Trial => clamp.on_trial_change(&mut self.trial),
        })
    }
}

/// Page built from the headless controls
pub type HeadlessPage = Page<PairedControl, PairedControl, TextElement>;

impl HeadlessPage {
    /// Headless page seeded from `params`
    pub fn headless(params: Parameters) -> Self {
        Page::new(
            params.shared(),
            PairedControl::new(params.subject),
            PairedControl::new(params.trial),
            TextElement::default(),
        )
    }

    pub fn snapshot(&self) -> PageSnapshot {
        let trial = self.trial();
        PageSnapshot {
            attached: self.is_attached(),
            parameters: self.parameters(),
            trial_numeric: trial.numeric.value.clone(),
            trial_slider: trial.slider.value.clone(),
            trial_max: trial.max().map(str::to_string),
            label: self.label().text.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ready_page(subject: i64, trial: i64, config: ClampConfig) -> HeadlessPage {
        let mut page = HeadlessPage::headless(Parameters::new(subject, trial));
        page.on_ready(SubjectMaxTable::default(), config);
        page.ready();
        page
    }

    #[test]
    fn test_events_before_ready_do_not_clamp() {
        let mut page = HeadlessPage::headless(Parameters::new(1, 6));
        page.on_ready(SubjectMaxTable::default(), ClampConfig::default());

        let outcome = page.dispatch(&ControlEvent::commit(ControlTarget::Subject, "14"));

        assert_eq!(outcome, None);
        assert!(!page.is_attached());
        assert_eq!(page.parameters(), Parameters::new(14, 6));
        assert_eq!(page.snapshot().trial_numeric, "6");
    }

    #[test]
    fn test_ready_attaches_once_and_applies_initial_bound() {
        let mut page = HeadlessPage::headless(Parameters::new(14, 6));
        page.on_ready(SubjectMaxTable::default(), ClampConfig::default());

        let outcome = page.ready().expect("attached");
        assert_eq!(outcome.max, 4);
        assert_eq!(page.ready(), None);

        let snapshot = page.snapshot();
        assert_eq!(
            snapshot,
            PageSnapshot {
                attached: true,
                parameters: Parameters::new(14, 4),
                trial_numeric: "4".to_string(),
                trial_slider: "4".to_string(),
                trial_max: Some("4".to_string()),
                label: "Max: 4".to_string(),
            }
        );
    }

    #[test]
    fn test_ready_without_registration_does_nothing() {
        let mut page = HeadlessPage::headless(Parameters::default());
        assert_eq!(page.ready(), None);
        assert!(!page.is_attached());
    }

    #[test]
    fn test_subject_drag_clamps_trial() {
        let mut page = ready_page(1, 6, ClampConfig::default());

        let outcome = page.dispatch(&ControlEvent::drag(ControlTarget::Subject, "14")).unwrap();

        assert!(outcome.clamped);
        assert_eq!(page.subject().numeric.value, "14");
        assert_eq!(page.subject().slider.value, "14");
        assert_eq!(page.parameters(), Parameters::new(14, 4));
        assert_eq!(page.snapshot().label, "Max: 4");
    }

    #[test]
    fn test_trial_edit_above_max_keeps_stale_parameter() {
        let mut page = ready_page(14, 2, ClampConfig::default());

        page.dispatch(&ControlEvent::commit(ControlTarget::Trial, "6"));

        let snapshot = page.snapshot();
        assert_eq!(snapshot.trial_numeric, "4");
        assert_eq!(snapshot.trial_slider, "4");
        assert_eq!(snapshot.parameters.trial, 6);
    }

    #[test]
    fn test_trial_edit_resync_flag() {
        let config = ClampConfig {
            resync_on_trial_change: true,
        };
        let mut page = ready_page(14, 2, config);

        page.dispatch(&ControlEvent::drag(ControlTarget::Trial, "6"));

        assert_eq!(page.parameters().trial, 4);
    }

    #[test]
    fn test_trial_edit_at_max_is_untouched() {
        let mut page = ready_page(1, 2, ClampConfig::default());

        let outcome = page.dispatch(&ControlEvent::commit(ControlTarget::Trial, "6")).unwrap();

        assert_eq!(outcome.max, 6);
        assert_eq!(outcome.resynced, None);
        assert_eq!(page.snapshot().trial_numeric, "6");
        assert_eq!(page.parameters().trial, 6);
    }

    #[test]
    fn test_non_numeric_subject_keeps_previous_parameter() {
        let mut page = ready_page(2, 3, ClampConfig::default());

        page.dispatch(&ControlEvent::commit(ControlTarget::Subject, "x"));

        assert_eq!(page.subject().numeric.value, "x");
        assert_eq!(page.parameters(), Parameters::new(2, 3));
        assert_eq!(page.snapshot().label, "Max: 4");
    }

    #[test]
    fn test_events_apply_in_dispatch_order() {
        let mut page = ready_page(1, 5, ClampConfig::default());

        page.dispatch(&ControlEvent::drag(ControlTarget::Subject, "2"));
        page.dispatch(&ControlEvent::drag(ControlTarget::Subject, "3"));

        // passing through subject 2 already pulled the trial down to 4
        assert_eq!(page.parameters(), Parameters::new(3, 4));
        assert_eq!(page.snapshot().label, "Max: 6");
    }
}
