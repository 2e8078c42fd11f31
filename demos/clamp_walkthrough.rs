//! Walk a headless trial selector through a few subject and trial edits

use gait_trials::{ClampConfig, ControlEvent, ControlTarget, HeadlessPage, Parameters, SubjectMaxTable};

fn main() {
    let mut page = HeadlessPage::headless(Parameters::new(1, 6));
    page.on_ready(SubjectMaxTable::default(), ClampConfig::default());
    page.ready();

    let edits = [
        ControlEvent::drag(ControlTarget::Subject, "14"),
        ControlEvent::commit(ControlTarget::Trial, "6"),
        ControlEvent::commit(ControlTarget::Subject, "2"),
        ControlEvent::commit(ControlTarget::Trial, "3"),
    ];

    for edit in &edits {
        page.dispatch(edit);
        match serde_json::to_string(&page.snapshot()) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error: {e:?}"),
        }
    }
}
