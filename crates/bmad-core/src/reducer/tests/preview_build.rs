use super::*;
use crate::state::DevicePreset;
use pretty_assertions::assert_eq;

#[test]
fn build_runs_once_at_a_time() {
    let mut state = state();
    assert_eq!(submitted(&user(&mut state, UserAction::RunBuild)), vec![ActionKind::Build]);
    assert!(user(&mut state, UserAction::RunBuild).is_empty());
    assert!(state.is_building());

    resolve(
        &mut state,
        ActionResult::Build {
            status: BuildStatus::Succeeded,
        },
    );
    assert!(!state.is_building());
    assert_eq!(state.build.last_status, BuildStatus::Succeeded);
    assert_eq!(state.build.completed_runs, 1);
    assert_eq!(
        toast_titles(&state),
        vec!["Build started".to_string(), "Build complete".to_string()]
    );
}

#[test]
fn outcome_for_a_cancelled_build_does_not_finish_the_next_one() {
    let mut state = state();
    user(&mut state, UserAction::RunBuild);
    let stale = state.pending.get(ActionKind::Build).map(|pending| pending.ticket);
    run_runtime(&mut state, RuntimeAction::ActionCancelled(ActionKind::Build));
    user(&mut state, UserAction::RunBuild);

    run_runtime(
        &mut state,
        RuntimeAction::ActionResolved {
            ticket: stale.unwrap_or_default(),
            result: ActionResult::Build {
                status: BuildStatus::Succeeded,
            },
        },
    );
    assert!(state.is_building());
    assert_eq!(state.build.completed_runs, 0);
    assert!(user(&mut state, UserAction::RunBuild).is_empty());
}

#[test]
fn preview_refresh_bumps_generation() {
    let mut state = state();
    let effects = user(&mut state, UserAction::RefreshPreview);
    assert!(effects.contains(&WorkspaceEffect::Submit(Submission {
        ticket: 1,
        payload: ActionPayload::PreviewRefresh { generation: 1 },
    })));
    assert!(state.is_refreshing_preview());

    resolve(&mut state, ActionResult::PreviewRefresh { generation: 1 });
    assert!(!state.is_refreshing_preview());
    assert_eq!(toast_titles(&state), vec!["Preview refreshed".to_string()]);
}

#[test]
fn device_cycle_wraps_around() {
    let mut state = state();
    for expected in [DevicePreset::Tablet, DevicePreset::Mobile, DevicePreset::Desktop] {
        user(&mut state, UserAction::CycleDevice);
        assert_eq!(state.preview.device, expected);
    }
    user(&mut state, UserAction::SelectDevice(DevicePreset::Mobile));
    assert_eq!(state.preview.device.width(), "375px");
}

#[test]
fn panel_actions_keep_other_flags() {
    let mut state = state();
    assert!(state.panels.is_open(PanelId::Guide));

    user(&mut state, UserAction::TogglePanel(PanelId::Assistant));
    user(&mut state, UserAction::OpenPanel(PanelId::Settings));
    assert!(user(&mut state, UserAction::ClosePanel(PanelId::Pricing)).is_empty());

    let open: Vec<PanelId> = state.panels.open_panels().collect();
    assert_eq!(open, vec![PanelId::Assistant, PanelId::Guide, PanelId::Settings]);
}
