use super::*;
use pretty_assertions::assert_eq;

#[test]
fn stage_selection_only_redraws_on_change() {
    let mut state = state();
    assert_eq!(state.dashboard.active, DashboardStage::Build);

    assert_eq!(
        user(&mut state, UserAction::SelectDashboardStage(DashboardStage::Deploy)),
        vec![WorkspaceEffect::RequestFrame]
    );
    assert!(user(&mut state, UserAction::SelectDashboardStage(DashboardStage::Deploy)).is_empty());

    user(&mut state, UserAction::CycleDashboardStage);
    assert_eq!(state.dashboard.active, DashboardStage::Build);
}

#[test]
fn collapsing_the_dashboard_keeps_the_active_stage() {
    let mut state = state();
    user(&mut state, UserAction::SelectDashboardStage(DashboardStage::Analyze));
    user(&mut state, UserAction::ToggleDashboard);
    assert!(!state.dashboard.expanded);
    assert_eq!(state.dashboard.active, DashboardStage::Analyze);

    user(&mut state, UserAction::ToggleDashboard);
    assert!(state.dashboard.expanded);
}

#[test]
fn debug_export_only_notifies() {
    let mut state = state();
    let files = state.files.clone();
    let credits = state.entitlement.credits;

    let effects = user(&mut state, UserAction::DebugExport);
    assert_eq!(effects, vec![WorkspaceEffect::RequestFrame]);
    assert_eq!(state.files, files);
    assert_eq!(state.entitlement.credits, credits);

    let toast = state.toasts.latest().expect("toast");
    assert_eq!(toast.title, "Debug Export");
    assert_eq!(toast.description.as_deref(), Some("Project exported to VS Code"));
}
