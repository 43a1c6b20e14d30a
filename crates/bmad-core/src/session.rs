use super::actions::RuntimeAction;
use super::actions::WorkspaceAction;
use super::config::Config;
use super::entitlement::Tier;
use super::entitlement::UserEntitlement;
use super::error::WorkspaceResult;
use super::gate::GateDecision;
use super::persistence::load_preferences;
use super::persistence::HydratedPreferences;
use super::persistence::PreferenceKey;
use super::persistence::PreferenceStore;
use super::reducer::consume_credit;
use super::reducer::reduce;
use super::reducer::WorkspaceEffect;
use super::state::WorkspaceState;
use super::tier;
use super::tier::TierTransition;

/// Owns the workspace state together with the store it persists to.
///
/// `Persist` effects are written through before `dispatch` returns. Every
/// other effect is handed back to the caller.
#[derive(Debug)]
pub struct WorkspaceSession<S: PreferenceStore> {
    state: WorkspaceState,
    store: S,
}

impl<S: PreferenceStore> WorkspaceSession<S> {
    pub fn new(config: Config, store: S) -> Self {
        Self {
            state: WorkspaceState::new(config),
            store,
        }
    }

    /// Builds a session and immediately loads persisted preferences.
    pub fn open(config: Config, store: S) -> Self {
        let mut session = Self::new(config, store);
        session.hydrate();
        session
    }

    pub fn hydrate(&mut self) -> HydratedPreferences {
        let prefs = load_preferences(&self.store, &self.state.config.quotas);
        reduce(
            &mut self.state,
            WorkspaceAction::Runtime(RuntimeAction::Hydrated(prefs)),
        );
        tracing::debug!(
            tier = prefs.entitlement.tier.label(),
            credits = %prefs.entitlement.credits,
            "preferences hydrated"
        );
        prefs
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.state.config
    }

    pub fn dispatch(&mut self, action: impl Into<WorkspaceAction>) -> WorkspaceResult<Vec<WorkspaceEffect>> {
        let effects = reduce(&mut self.state, action.into());
        self.apply(effects)
    }

    pub fn current_entitlement(&self) -> UserEntitlement {
        self.state.entitlement.current_entitlement()
    }

    pub fn try_consume(&mut self) -> WorkspaceResult<GateDecision> {
        let decision = consume_credit(&mut self.state);
        if decision == (GateDecision::Allowed { debited: true }) {
            self.persist(PreferenceKey::AiCredits)?;
        }
        Ok(decision)
    }

    pub fn upgrade(&mut self, tier: Tier) -> WorkspaceResult<TierTransition> {
        let (transition, effects) = tier::upgrade(&mut self.state, tier);
        self.apply(effects)?;
        Ok(transition)
    }

    pub fn reset(&mut self) -> WorkspaceResult<()> {
        self.store.clear()?;
        let config = self.state.config.clone();
        self.state = WorkspaceState::new(config);
        self.hydrate();
        Ok(())
    }

    /// A failed write drops the batch's submissions and releases their
    /// pending slots before the error is returned.
    fn apply(&mut self, effects: Vec<WorkspaceEffect>) -> WorkspaceResult<Vec<WorkspaceEffect>> {
        let mut rest = Vec::with_capacity(effects.len());
        let mut failure = None;
        for effect in effects {
            match effect {
                WorkspaceEffect::Persist(key) if failure.is_none() => {
                    if let Err(err) = self.persist(key) {
                        failure = Some(err);
                    }
                }
                WorkspaceEffect::Persist(_) => {}
                other => rest.push(other),
            }
        }
        let Some(err) = failure else {
            return Ok(rest);
        };
        for effect in rest {
            if let WorkspaceEffect::Submit(submission) = effect {
                let kind = submission.kind();
                tracing::warn!(kind = kind.label(), error = %err, "dropping submission after failed write");
                reduce(
                    &mut self.state,
                    WorkspaceAction::Runtime(RuntimeAction::ActionCancelled(kind)),
                );
            }
        }
        Err(err)
    }

    fn persist(&mut self, key: PreferenceKey) -> WorkspaceResult<()> {
        let name = key.as_str();
        match key {
            PreferenceKey::UserTier => self.store.set(name, &self.state.entitlement.tier),
            PreferenceKey::AiCredits => self.store.set(name, &self.state.entitlement.credits),
            PreferenceKey::OnboardingComplete => self.store.set(name, &self.state.onboarding.complete),
            PreferenceKey::AdminMode => self.store.set(name, &self.state.admin_mode),
        }
    }
}
