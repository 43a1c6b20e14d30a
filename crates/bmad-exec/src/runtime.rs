use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use bmad_core::ActionKind;
use bmad_core::PreferenceStore;
use bmad_core::RuntimeAction;
use bmad_core::WorkspaceAction;
use bmad_core::WorkspaceEffect;
use bmad_core::WorkspaceSession;

use crate::error::PipelineError;
use crate::error::RuntimeResult;
use crate::pipeline::ActionOutcome;
use crate::pipeline::PendingHandle;
use crate::pipeline::SimulatedPipeline;

/// Drives a session against the simulated pipeline. `Submit` effects are
/// started here and their outcomes are fed back as runtime actions.
pub struct WorkspaceRuntime<S: PreferenceStore> {
    session: WorkspaceSession<S>,
    pipeline: SimulatedPipeline,
    outcomes: mpsc::UnboundedReceiver<ActionOutcome>,
    handles: HashMap<ActionKind, PendingHandle>,
}

impl<S: PreferenceStore> WorkspaceRuntime<S> {
    pub fn new(
        session: WorkspaceSession<S>,
        pipeline: SimulatedPipeline,
        outcomes: mpsc::UnboundedReceiver<ActionOutcome>,
    ) -> Self {
        Self {
            session,
            pipeline,
            outcomes,
            handles: HashMap::new(),
        }
    }

    pub fn session(&self) -> &WorkspaceSession<S> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut WorkspaceSession<S> {
        &mut self.session
    }

    pub fn dispatch(&mut self, action: impl Into<WorkspaceAction>) -> RuntimeResult<Vec<WorkspaceEffect>> {
        let effects = self.session.dispatch(action)?;
        let mut rest = Vec::with_capacity(effects.len());
        for effect in effects {
            match effect {
                WorkspaceEffect::Submit(submission) => {
                    let kind = submission.kind();
                    match self.pipeline.submit(submission) {
                        Ok(handle) => {
                            self.handles.insert(kind, handle);
                        }
                        Err(PipelineError::AlreadyPending(kind)) => {
                            tracing::warn!(kind = kind.label(), "pipeline refused duplicate submission");
                            self.session
                                .dispatch(RuntimeAction::ActionCancelled(kind))?;
                        }
                        Err(err) => {
                            self.session
                                .dispatch(RuntimeAction::ActionCancelled(kind))?;
                            return Err(err.into());
                        }
                    }
                }
                other => rest.push(other),
            }
        }
        Ok(rest)
    }

    /// Returns false when nothing is running for `kind`, or when its outcome
    /// is already queued and will still be applied.
    pub fn cancel(&mut self, kind: ActionKind) -> RuntimeResult<bool> {
        let Some(handle) = self.handles.remove(&kind) else {
            return Ok(false);
        };
        if handle.is_finished() {
            self.handles.insert(kind, handle);
            return Ok(false);
        }
        handle.cancel();
        self.session.dispatch(RuntimeAction::ActionCancelled(kind))?;
        Ok(true)
    }

    pub fn has_pending(&self) -> bool {
        !self.session.state().pending.is_empty()
    }

    /// Waits for the next outcome and applies it. `None` once the pipeline is
    /// gone.
    pub async fn next_outcome(&mut self) -> RuntimeResult<Option<ActionKind>> {
        match self.outcomes.recv().await {
            Some(outcome) => self.apply_outcome(outcome).map(Some),
            None => Ok(None),
        }
    }

    pub fn drain_ready(&mut self) -> RuntimeResult<usize> {
        let mut applied = 0;
        loop {
            match self.outcomes.try_recv() {
                Ok(outcome) => {
                    self.apply_outcome(outcome)?;
                    applied += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return Ok(applied),
            }
        }
    }

    pub fn apply_outcome(&mut self, outcome: ActionOutcome) -> RuntimeResult<ActionKind> {
        let kind = outcome.kind();
        if self
            .handles
            .get(&kind)
            .is_some_and(|handle| handle.submission() == outcome.submission)
        {
            self.handles.remove(&kind);
        }
        self.session.dispatch(outcome.into_action())?;
        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::time::advance;

    use super::WorkspaceRuntime;
    use crate::pipeline::SimulatedPipeline;
    use crate::responses::ChatReply;
    use crate::responses::CompletionSuggestion;
    use crate::responses::FixedPicker;
    use bmad_core::config::Config;
    use bmad_core::ActionKind;
    use bmad_core::ChatRole;
    use bmad_core::Credits;
    use bmad_core::MemoryPreferenceStore;
    use bmad_core::PanelId;
    use bmad_core::Tier;
    use bmad_core::UserAction;
    use bmad_core::WorkspaceEffect;
    use bmad_core::WorkspaceSession;
    use pretty_assertions::assert_eq;

    fn runtime(pick: usize) -> WorkspaceRuntime<MemoryPreferenceStore> {
        let config = Config::default();
        let (pipeline, outcomes) = SimulatedPipeline::new(config.delays.clone(), FixedPicker(pick));
        let session = WorkspaceSession::open(config, MemoryPreferenceStore::new());
        WorkspaceRuntime::new(session, pipeline, outcomes)
    }

    fn send(runtime: &mut WorkspaceRuntime<MemoryPreferenceStore>, text: &str) {
        runtime
            .dispatch(UserAction::ChatPaste(text.to_string()))
            .expect("paste");
        runtime.dispatch(UserAction::SendChat).expect("send");
    }

    #[tokio::test(start_paused = true)]
    async fn chat_round_trip_through_pipeline() {
        let mut runtime = runtime(0);
        send(&mut runtime, "make a button");
        assert!(runtime.session().state().is_typing());

        let kind = runtime.next_outcome().await.expect("apply");
        assert_eq!(kind, Some(ActionKind::ChatReply));

        let state = runtime.session().state();
        assert!(!state.is_typing());
        let last = state.assistant.messages.last().expect("reply");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, ChatReply::ButtonComponent.content());
    }

    #[tokio::test(start_paused = true)]
    async fn completion_then_accept_updates_file() {
        let mut runtime = runtime(1);
        runtime.dispatch(UserAction::RequestCompletion).expect("request");
        runtime.next_outcome().await.expect("apply");

        runtime.dispatch(UserAction::AcceptSuggestion).expect("accept");
        assert!(runtime
            .session()
            .state()
            .active_content()
            .ends_with(CompletionSuggestion::LoadingState.content()));
    }

    #[tokio::test(start_paused = true)]
    async fn drain_ready_applies_only_elapsed_outcomes() {
        let mut runtime = runtime(0);
        runtime.dispatch(UserAction::RefreshPreview).expect("preview");
        runtime.dispatch(UserAction::RunBuild).expect("build");

        advance(Duration::from_millis(600)).await;
        tokio::task::yield_now().await;
        assert_eq!(runtime.drain_ready().expect("drain"), 1);
        assert!(runtime.session().state().is_building());
        assert!(!runtime.session().state().is_refreshing_preview());

        runtime.next_outcome().await.expect("apply");
        assert!(!runtime.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_timer_fired_keeps_the_queued_outcome() {
        let mut runtime = runtime(0);
        runtime.dispatch(UserAction::RunBuild).expect("build");
        advance(Duration::from_millis(2100)).await;
        tokio::task::yield_now().await;

        assert!(!runtime.cancel(ActionKind::Build).expect("cancel"));
        assert!(runtime.session().state().is_building());
        assert_eq!(runtime.drain_ready().expect("drain"), 1);
        assert_eq!(runtime.session().state().build.completed_runs, 1);
        assert!(!runtime.has_pending());

        let effects = runtime.dispatch(UserAction::RunBuild).expect("rebuild");
        assert_eq!(effects, vec![WorkspaceEffect::RequestFrame]);
        assert!(runtime.session().state().is_building());
        runtime.next_outcome().await.expect("apply");
        assert_eq!(runtime.session().state().build.completed_runs, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_clears_pending_without_outcome() {
        let mut runtime = runtime(0);
        runtime.dispatch(UserAction::RunBuild).expect("build");
        assert!(runtime.cancel(ActionKind::Build).expect("cancel"));
        assert!(!runtime.cancel(ActionKind::Build).expect("cancel"));
        assert!(!runtime.has_pending());

        advance(Duration::from_secs(5)).await;
        tokio::task::yield_now().await;
        assert_eq!(runtime.drain_ready().expect("drain"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_credits_open_pricing_and_submit_nothing() {
        let mut runtime = runtime(0);
        for _ in 0..50 {
            runtime.dispatch(UserAction::RequestRefactor).expect("refactor");
            runtime.next_outcome().await.expect("apply");
        }
        let effects = runtime.dispatch(UserAction::RequestRefactor).expect("refactor");
        assert_eq!(effects, vec![WorkspaceEffect::RequestFrame]);
        assert!(runtime.session().state().panels.is_open(PanelId::Pricing));
        assert!(!runtime.has_pending());

        runtime.dispatch(UserAction::SelectTier(Tier::Pro)).expect("upgrade");
        assert_eq!(
            runtime.session().current_entitlement().credits,
            Credits::Finite(500)
        );
        runtime.dispatch(UserAction::RequestRefactor).expect("refactor");
        assert!(runtime.has_pending());
    }
}
