use super::*;
use pretty_assertions::assert_eq;

fn toggle(state: &mut WorkspaceState, phase: GuidePhaseId, task: &str) -> Vec<WorkspaceEffect> {
    user(
        state,
        UserAction::ToggleGuideTask {
            phase,
            task: task.to_string(),
        },
    )
}

#[test]
fn toggle_recomputes_over_updated_tasks() {
    let mut state = state();
    assert_eq!(state.guide.progress_percent, 17);

    toggle(&mut state, GuidePhaseId::Plan, "speckit");
    assert_eq!(state.guide.progress_percent, 25);

    toggle(&mut state, GuidePhaseId::Plan, "speckit");
    assert_eq!(state.guide.progress_percent, 17);
}

#[test]
fn unknown_task_is_ignored() {
    let mut state = state();
    assert!(toggle(&mut state, GuidePhaseId::Build, "speckit").is_empty());
    assert_eq!(state.guide.progress_percent, 17);
}

#[test]
fn all_tasks_complete_reaches_one_hundred() {
    let mut state = state();
    let pending: Vec<(GuidePhaseId, &'static str)> = state
        .guide
        .phases
        .iter()
        .flat_map(|phase| {
            phase
                .tasks
                .iter()
                .filter(|task| !task.completed)
                .map(move |task| (phase.id, task.id))
        })
        .collect();
    for (phase, task) in pending {
        toggle(&mut state, phase, task);
    }
    assert_eq!(state.guide.progress_percent, 100);
}

#[test]
fn phase_selection_is_independent_of_progress() {
    let mut state = state();
    user(&mut state, UserAction::SelectGuidePhase(GuidePhaseId::Deploy));
    assert_eq!(state.guide.active_phase, GuidePhaseId::Deploy);
    assert_eq!(state.guide.progress_percent, 17);
}
