use super::entitlement::Tier;
use super::panels::PanelId;
use super::persistence::PreferenceKey;
use super::reducer::WorkspaceEffect;
use super::state::Toast;
use super::state::ToastLevel;
use super::state::WorkspaceState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TierTransition {
    Unchanged,
    Changed { from: Tier, to: Tier },
}

impl TierTransition {
    pub fn is_changed(self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

pub fn can_select(state: &WorkspaceState, tier: Tier) -> bool {
    state.entitlement.tier != tier
}

/// Moves the workspace to `tier`. Selecting the current tier leaves state,
/// storage and the pricing panel untouched.
pub fn upgrade(state: &mut WorkspaceState, tier: Tier) -> (TierTransition, Vec<WorkspaceEffect>) {
    let from = state.entitlement.tier;
    if from == tier {
        return (TierTransition::Unchanged, Vec::new());
    }

    let next = state
        .entitlement
        .apply_tier_change(tier, &state.config.quotas);
    state.panels.close(PanelId::Pricing);
    state.toasts.push(
        Toast::new(ToastLevel::Success, format!("Switched to {}", tier.display_name()))
            .with_description(format!("{} credits available", next.credits)),
    );
    tracing::info!(
        from = from.label(),
        to = tier.label(),
        credits = %next.credits,
        "tier changed"
    );

    (
        TierTransition::Changed { from, to: tier },
        vec![
            WorkspaceEffect::Persist(PreferenceKey::UserTier),
            WorkspaceEffect::Persist(PreferenceKey::AiCredits),
            WorkspaceEffect::RequestFrame,
        ],
    )
}
