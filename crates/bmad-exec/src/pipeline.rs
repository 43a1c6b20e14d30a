use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use bmad_core::config::DelayConfig;
use bmad_core::ActionKind;
use bmad_core::ActionPayload;
use bmad_core::ActionResult;
use bmad_core::BuildStatus;
use bmad_core::RuntimeAction;
use bmad_core::Submission;

use crate::error::PipelineError;
use crate::responses::ChatReply;
use crate::responses::CompletionSuggestion;
use crate::responses::ResponsePicker;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionOutcome {
    pub submission: u64,
    pub result: ActionResult,
    pub submitted_at: DateTime<Utc>,
    pub resolved_at: DateTime<Utc>,
}

impl ActionOutcome {
    pub fn kind(&self) -> ActionKind {
        self.result.kind()
    }

    pub fn into_action(self) -> RuntimeAction {
        RuntimeAction::ActionResolved {
            ticket: self.submission,
            result: self.result,
        }
    }
}

type InFlight = Arc<Mutex<HashMap<ActionKind, u64>>>;

/// Handle to one delayed action. Dropping it leaves the action running.
#[derive(Debug)]
pub struct PendingHandle {
    kind: ActionKind,
    submission: u64,
    task: JoinHandle<()>,
    in_flight: InFlight,
}

impl PendingHandle {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn submission(&self) -> u64 {
        self.submission
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the timer. No outcome is delivered for a cancelled action.
    pub fn cancel(self) {
        self.task.abort();
        release(&self.in_flight, self.kind, self.submission);
        tracing::debug!(kind = self.kind.label(), submission = self.submission, "action cancelled");
    }
}

fn release(in_flight: &InFlight, kind: ActionKind, submission: u64) {
    let mut slots = in_flight.lock();
    if slots.get(&kind) == Some(&submission) {
        slots.remove(&kind);
    }
}

/// Resolves each submitted action after its configured delay with a canned
/// result. Outcomes arrive on the receiver in completion order.
pub struct SimulatedPipeline {
    delays: DelayConfig,
    picker: Box<dyn ResponsePicker>,
    in_flight: InFlight,
    tx: mpsc::UnboundedSender<ActionOutcome>,
}

impl SimulatedPipeline {
    pub fn new(
        delays: DelayConfig,
        picker: impl ResponsePicker + 'static,
    ) -> (Self, mpsc::UnboundedReceiver<ActionOutcome>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let pipeline = Self {
            delays,
            picker: Box::new(picker),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            tx,
        };
        (pipeline, rx)
    }

    pub fn delay_for(&self, kind: ActionKind) -> Duration {
        match kind {
            ActionKind::Completion => self.delays.completion(),
            ActionKind::Refactor => self.delays.refactor(),
            ActionKind::ChatReply => self.delays.chat_reply(),
            ActionKind::Build => self.delays.build(),
            ActionKind::PreviewRefresh => self.delays.preview_refresh(),
        }
    }

    pub fn is_in_flight(&self, kind: ActionKind) -> bool {
        self.in_flight.lock().contains_key(&kind)
    }

    /// Starts the delayed task for `submission`, whose ticket doubles as the
    /// submission id. Must be called inside a tokio runtime.
    pub fn submit(&mut self, submission: Submission) -> Result<PendingHandle, PipelineError> {
        if self.tx.is_closed() {
            return Err(PipelineError::ChannelClosed);
        }
        let kind = submission.kind();
        let Submission {
            ticket: submission,
            payload,
        } = submission;
        {
            let mut slots = self.in_flight.lock();
            if slots.contains_key(&kind) {
                return Err(PipelineError::AlreadyPending(kind));
            }
            slots.insert(kind, submission);
        }

        let result = self.resolve(&payload);
        let delay = self.delay_for(kind);
        let submitted_at = Utc::now();
        let in_flight = Arc::clone(&self.in_flight);
        let tx = self.tx.clone();
        tracing::debug!(
            kind = kind.label(),
            submission,
            delay_ms = delay.as_millis() as u64,
            "action submitted"
        );

        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            release(&in_flight, kind, submission);
            let outcome = ActionOutcome {
                submission,
                result,
                submitted_at,
                resolved_at: Utc::now(),
            };
            if tx.send(outcome).is_err() {
                tracing::debug!(kind = kind.label(), submission, "outcome receiver dropped");
            } else {
                tracing::debug!(kind = kind.label(), submission, "action resolved");
            }
        });

        Ok(PendingHandle {
            kind,
            submission,
            task,
            in_flight: Arc::clone(&self.in_flight),
        })
    }

    fn resolve(&self, payload: &ActionPayload) -> ActionResult {
        match payload {
            ActionPayload::Completion { .. } => ActionResult::Completion {
                suggestion: CompletionSuggestion::pick(self.picker.as_ref())
                    .content()
                    .to_string(),
            },
            ActionPayload::Refactor { .. } => ActionResult::Refactor,
            ActionPayload::ChatReply { .. } => {
                let reply = ChatReply::pick(self.picker.as_ref());
                ActionResult::ChatReply {
                    content: reply.content().to_string(),
                    format: reply.format(),
                }
            }
            ActionPayload::Build => ActionResult::Build {
                status: BuildStatus::Succeeded,
            },
            ActionPayload::PreviewRefresh { generation } => ActionResult::PreviewRefresh {
                generation: *generation,
            },
        }
    }
}
