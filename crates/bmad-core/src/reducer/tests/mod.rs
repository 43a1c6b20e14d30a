use crate::config::Config;

pub(super) use super::reduce;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::actions::WorkspaceAction;
pub(super) use crate::entitlement::Credits;
pub(super) use crate::entitlement::Tier;
pub(super) use crate::entitlement::UserEntitlement;
pub(super) use crate::panels::PanelId;
pub(super) use crate::persistence::HydratedPreferences;
pub(super) use crate::persistence::PreferenceKey;
pub(super) use crate::reducer::WorkspaceEffect;
pub(super) use crate::state::ActionKind;
pub(super) use crate::state::ActionPayload;
pub(super) use crate::state::ActionResult;
pub(super) use crate::state::BuildStatus;
pub(super) use crate::state::ChatRole;
pub(super) use crate::state::DashboardStage;
pub(super) use crate::state::GuidePhaseId;
pub(super) use crate::state::MessageFormat;
pub(super) use crate::state::QuickAction;
pub(super) use crate::state::Submission;
pub(super) use crate::state::WorkspaceState;

mod assistant_chat;
mod dashboard;
mod guide_progress;
mod onboarding;
mod preview_build;

fn state() -> WorkspaceState {
    let mut state = WorkspaceState::new(Config::default());
    run_runtime(
        &mut state,
        RuntimeAction::Hydrated(HydratedPreferences {
            entitlement: UserEntitlement::default(),
            onboarding_complete: false,
            admin_mode: false,
        }),
    );
    state
}

fn state_with_credits(credits: u32) -> WorkspaceState {
    let mut state = state();
    state.entitlement.credits = Credits::Finite(credits);
    state
}

fn user(state: &mut WorkspaceState, action: UserAction) -> Vec<WorkspaceEffect> {
    reduce(state, WorkspaceAction::User(action))
}

fn run_runtime(state: &mut WorkspaceState, action: RuntimeAction) {
    let effects = reduce(state, WorkspaceAction::Runtime(action));
    assert!(effects.is_empty());
}

/// Resolves against whatever ticket is pending for the result's kind.
fn resolve(state: &mut WorkspaceState, result: ActionResult) {
    let ticket = state
        .pending
        .get(result.kind())
        .map(|pending| pending.ticket)
        .unwrap_or(0);
    run_runtime(state, RuntimeAction::ActionResolved { ticket, result });
}

fn submitted(effects: &[WorkspaceEffect]) -> Vec<ActionKind> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            WorkspaceEffect::Submit(submission) => Some(submission.kind()),
            _ => None,
        })
        .collect()
}

fn toast_titles(state: &WorkspaceState) -> Vec<String> {
    state.toasts.iter().map(|toast| toast.title.clone()).collect()
}
