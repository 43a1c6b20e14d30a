use super::*;
use pretty_assertions::assert_eq;

#[test]
fn next_walks_steps_then_completes() {
    let mut state = state();
    assert!(state.show_onboarding());

    for expected in 1..4 {
        user(&mut state, UserAction::NextOnboardingStep);
        assert_eq!(state.onboarding.step, expected);
    }
    let effects = user(&mut state, UserAction::NextOnboardingStep);
    assert_eq!(
        effects,
        vec![
            WorkspaceEffect::Persist(PreferenceKey::OnboardingComplete),
            WorkspaceEffect::RequestFrame,
        ]
    );
    assert!(state.onboarding.complete);
    assert!(!state.show_onboarding());
}

#[test]
fn prev_saturates_at_first_step() {
    let mut state = state();
    assert!(user(&mut state, UserAction::PrevOnboardingStep).is_empty());
    user(&mut state, UserAction::NextOnboardingStep);
    user(&mut state, UserAction::PrevOnboardingStep);
    assert_eq!(state.onboarding.step, 0);
}

#[test]
fn skip_completes_from_any_step() {
    let mut state = state();
    user(&mut state, UserAction::NextOnboardingStep);
    let effects = user(&mut state, UserAction::SkipOnboarding);
    assert!(effects.contains(&WorkspaceEffect::Persist(PreferenceKey::OnboardingComplete)));
    assert!(state.onboarding.complete);
    assert!(user(&mut state, UserAction::SkipOnboarding).is_empty());
}

#[test]
fn hydration_restores_persisted_flags() {
    let mut state = WorkspaceState::new(crate::config::Config::default());
    assert!(!state.show_onboarding());

    run_runtime(
        &mut state,
        RuntimeAction::Hydrated(HydratedPreferences {
            entitlement: UserEntitlement {
                tier: Tier::Pro,
                credits: Credits::Finite(120),
            },
            onboarding_complete: true,
            admin_mode: true,
        }),
    );
    assert!(state.hydrated);
    assert!(!state.show_onboarding());
    assert!(state.admin_mode);
    assert_eq!(state.entitlement.tier, Tier::Pro);
}

#[test]
fn admin_toggle_persists_and_closes_admin_panel() {
    let mut state = state();
    let effects = user(&mut state, UserAction::ToggleAdminMode);
    assert!(effects.contains(&WorkspaceEffect::Persist(PreferenceKey::AdminMode)));
    user(&mut state, UserAction::OpenPanel(PanelId::Admin));

    user(&mut state, UserAction::ToggleAdminMode);
    assert!(!state.admin_mode);
    assert!(!state.panels.is_open(PanelId::Admin));
}

#[test]
fn admin_panel_stays_shut_outside_admin_mode() {
    let mut state = state();
    assert!(user(&mut state, UserAction::OpenPanel(PanelId::Admin)).is_empty());
    assert!(user(&mut state, UserAction::TogglePanel(PanelId::Admin)).is_empty());
    assert!(!state.panels.is_open(PanelId::Admin));
}
