use chrono::Utc;

use super::actions::RuntimeAction;
use super::actions::UserAction;
use super::actions::WorkspaceAction;
use super::gate::try_consume;
use super::gate::GateDecision;
use super::panels::PanelId;
use super::persistence::PreferenceKey;
use super::state::ActionKind;
use super::state::ActionPayload;
use super::state::ActionResult;
use super::state::BuildStatus;
use super::state::ChatMessage;
use super::state::ChatRole;
use super::state::MessageFormat;
use super::state::Submission;
use super::state::Toast;
use super::state::ToastLevel;
use super::state::WorkspaceState;
use super::state::ONBOARDING_STEPS;
use super::tier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEffect {
    Persist(PreferenceKey),
    Submit(Submission),
    CopyToClipboard(String),
    RequestFrame,
}

pub fn reduce(state: &mut WorkspaceState, action: WorkspaceAction) -> Vec<WorkspaceEffect> {
    match action {
        WorkspaceAction::User(user) => reduce_user(state, user),
        WorkspaceAction::Runtime(runtime) => {
            reduce_runtime(state, runtime);
            Vec::new()
        }
    }
}

fn reduce_user(state: &mut WorkspaceState, action: UserAction) -> Vec<WorkspaceEffect> {
    match action {
        UserAction::TogglePanel(PanelId::Admin) | UserAction::OpenPanel(PanelId::Admin)
            if !state.admin_mode =>
        {
            Vec::new()
        }
        UserAction::TogglePanel(panel) => {
            state.panels.toggle(panel);
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::OpenPanel(panel) => frame_if(state.panels.open(panel)),
        UserAction::ClosePanel(panel) => frame_if(state.panels.close(panel)),
        UserAction::ToggleSidebar => {
            state.sidebar_expanded = !state.sidebar_expanded;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::ToggleFullscreen => {
            state.editor.fullscreen = !state.editor.fullscreen;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::SelectFile(name) => {
            if !state.files.contains(&name) || state.active_file == name {
                return Vec::new();
            }
            state.active_file = name;
            state.editor.suggestion = None;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::EditActiveFile(content) => {
            let active = state.active_file.clone();
            frame_if(state.files.update(&active, content))
        }
        UserAction::RequestCompletion => {
            let payload = ActionPayload::Completion {
                file: state.active_file.clone(),
                code: state.active_content().to_string(),
            };
            let mut effects = match start_gated(state, payload) {
                GatedStart::Started(effects) => effects,
                GatedStart::Busy => return Vec::new(),
                GatedStart::Denied => return vec![WorkspaceEffect::RequestFrame],
            };
            state.toasts.push(
                Toast::new(ToastLevel::Info, "AI Generating...")
                    .with_description("Analyzing code context"),
            );
            effects.push(WorkspaceEffect::RequestFrame);
            effects
        }
        UserAction::AcceptSuggestion => {
            let Some(suggestion) = state.editor.suggestion.take() else {
                return Vec::new();
            };
            let active = state.active_file.clone();
            state.files.append(&active, &suggestion);
            state
                .toasts
                .push(Toast::new(ToastLevel::Success, "Suggestion applied"));
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::DismissSuggestion => frame_if(state.editor.suggestion.take().is_some()),
        UserAction::RequestRefactor => {
            let payload = ActionPayload::Refactor {
                file: state.active_file.clone(),
            };
            let mut effects = match start_gated(state, payload) {
                GatedStart::Started(effects) => effects,
                GatedStart::Busy => return Vec::new(),
                GatedStart::Denied => return vec![WorkspaceEffect::RequestFrame],
            };
            state.toasts.push(
                Toast::new(ToastLevel::Info, "AI Refactoring")
                    .with_description("Optimizing code structure..."),
            );
            effects.push(WorkspaceEffect::RequestFrame);
            effects
        }
        UserAction::ChatInput(ch) => {
            state.assistant.input.push(ch);
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::ChatBackspace => frame_if(state.assistant.input.pop().is_some()),
        UserAction::ChatPaste(text) => {
            state.assistant.input.push_str(&text);
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::SendChat => {
            if state.assistant.input.trim().is_empty() {
                return Vec::new();
            }
            let prompt = state.assistant.input.clone();
            let payload = ActionPayload::ChatReply {
                prompt: prompt.clone(),
            };
            let mut effects = match start_gated(state, payload) {
                GatedStart::Started(effects) => effects,
                GatedStart::Busy => return Vec::new(),
                GatedStart::Denied => return vec![WorkspaceEffect::RequestFrame],
            };
            state.assistant.messages.push(ChatMessage {
                role: ChatRole::User,
                content: prompt,
                format: MessageFormat::Text,
            });
            state.assistant.input.clear();
            effects.push(WorkspaceEffect::RequestFrame);
            effects
        }
        UserAction::QuickAction(quick) => {
            state.assistant.input = quick.prompt().to_string();
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::RunBuild => {
            let Some(ticket) = begin(state, ActionKind::Build) else {
                return Vec::new();
            };
            state.toasts.push(
                Toast::new(ToastLevel::Success, "Build started")
                    .with_description("Your project is being compiled..."),
            );
            vec![
                WorkspaceEffect::Submit(Submission {
                    ticket,
                    payload: ActionPayload::Build,
                }),
                WorkspaceEffect::RequestFrame,
            ]
        }
        UserAction::RefreshPreview => {
            let Some(ticket) = begin(state, ActionKind::PreviewRefresh) else {
                return Vec::new();
            };
            state.preview.generation += 1;
            vec![
                WorkspaceEffect::Submit(Submission {
                    ticket,
                    payload: ActionPayload::PreviewRefresh {
                        generation: state.preview.generation,
                    },
                }),
                WorkspaceEffect::RequestFrame,
            ]
        }
        UserAction::SelectDevice(device) => {
            state.preview.device = device;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::CycleDevice => {
            state.preview.device = state.preview.device.next();
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::SelectTier(next) => tier::upgrade(state, next).1,
        UserAction::NextOnboardingStep => {
            if state.onboarding.complete {
                return Vec::new();
            }
            if state.onboarding.step + 1 >= ONBOARDING_STEPS.len() {
                return complete_onboarding(state);
            }
            state.onboarding.step += 1;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::PrevOnboardingStep => {
            if state.onboarding.complete || state.onboarding.step == 0 {
                return Vec::new();
            }
            state.onboarding.step -= 1;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::SkipOnboarding => {
            if state.onboarding.complete {
                return Vec::new();
            }
            complete_onboarding(state)
        }
        UserAction::ToggleAdminMode => {
            state.admin_mode = !state.admin_mode;
            if !state.admin_mode {
                state.panels.close(PanelId::Admin);
            }
            vec![
                WorkspaceEffect::Persist(PreferenceKey::AdminMode),
                WorkspaceEffect::RequestFrame,
            ]
        }
        UserAction::SelectGuidePhase(phase) => {
            state.guide.active_phase = phase;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::ToggleGuideTask { phase, task } => frame_if(state.guide.toggle_task(phase, &task)),
        UserAction::CopyActiveFile => {
            let content = state.active_content().to_string();
            state
                .toasts
                .push(Toast::new(ToastLevel::Success, "Code copied to clipboard"));
            vec![
                WorkspaceEffect::CopyToClipboard(content),
                WorkspaceEffect::RequestFrame,
            ]
        }
        UserAction::CopyMessage(index) => {
            let Some(message) = state.assistant.messages.get(index) else {
                return Vec::new();
            };
            let content = message.content.clone();
            state
                .toasts
                .push(Toast::new(ToastLevel::Success, "Copied to clipboard"));
            vec![
                WorkspaceEffect::CopyToClipboard(content),
                WorkspaceEffect::RequestFrame,
            ]
        }
        UserAction::ToggleDashboard => {
            state.dashboard.expanded = !state.dashboard.expanded;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::SelectDashboardStage(stage) => {
            if state.dashboard.active == stage {
                return Vec::new();
            }
            state.dashboard.active = stage;
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::CycleDashboardStage => {
            state.dashboard.active = state.dashboard.active.next();
            vec![WorkspaceEffect::RequestFrame]
        }
        UserAction::DebugExport => {
            state.toasts.push(
                Toast::new(ToastLevel::Success, "Debug Export")
                    .with_description("Project exported to VS Code"),
            );
            vec![WorkspaceEffect::RequestFrame]
        }
    }
}

fn reduce_runtime(state: &mut WorkspaceState, action: RuntimeAction) {
    match action {
        RuntimeAction::Hydrated(prefs) => {
            state.entitlement = prefs.entitlement;
            state.onboarding.complete = prefs.onboarding_complete;
            state.admin_mode = prefs.admin_mode;
            state.hydrated = true;
        }
        RuntimeAction::ActionResolved { ticket, result } => {
            let kind = result.kind();
            if state.pending.finish_ticket(kind, ticket).is_none() {
                tracing::debug!(kind = kind.label(), ticket, "dropping stale resolution");
                return;
            }
            apply_result(state, result);
        }
        RuntimeAction::ActionCancelled(kind) => {
            state.pending.finish(kind);
        }
        RuntimeAction::Notify { title, description } => {
            let toast = Toast::new(ToastLevel::Info, title);
            state.toasts.push(match description {
                Some(description) => toast.with_description(description),
                None => toast,
            });
        }
    }
}

fn apply_result(state: &mut WorkspaceState, result: ActionResult) {
    match result {
        ActionResult::Completion { suggestion } => {
            state.editor.suggestion = Some(suggestion);
            state.toasts.push(
                Toast::new(ToastLevel::Success, "AI suggestion ready")
                    .with_description("Press Tab to accept"),
            );
        }
        ActionResult::Refactor => {
            state.toasts.push(
                Toast::new(ToastLevel::Success, "Refactoring complete")
                    .with_description("Code has been optimized"),
            );
        }
        ActionResult::ChatReply { content, format } => {
            state.assistant.messages.push(ChatMessage {
                role: ChatRole::Assistant,
                content,
                format,
            });
        }
        ActionResult::Build { status } => {
            state.build.last_status = status;
            state.build.completed_runs += 1;
            if status == BuildStatus::Succeeded {
                state.toasts.push(
                    Toast::new(ToastLevel::Success, "Build complete")
                        .with_description("Preview updated successfully"),
                );
            }
        }
        ActionResult::PreviewRefresh { generation } => {
            if generation == state.preview.generation {
                state
                    .toasts
                    .push(Toast::new(ToastLevel::Success, "Preview refreshed"));
            }
        }
    }
}

enum GatedStart {
    Started(Vec<WorkspaceEffect>),
    Busy,
    Denied,
}

/// Runs the request gate for a metered action. A kind already in flight is
/// refused before any credit is touched.
fn start_gated(state: &mut WorkspaceState, payload: ActionPayload) -> GatedStart {
    let kind = payload.kind();
    if state.pending.is_pending(kind) {
        tracing::debug!(kind = kind.label(), "ignoring request while pending");
        return GatedStart::Busy;
    }
    match consume_credit(state) {
        GateDecision::Denied => GatedStart::Denied,
        GateDecision::Allowed { debited } => {
            let Some(ticket) = begin(state, kind) else {
                return GatedStart::Busy;
            };
            let mut effects = Vec::with_capacity(3);
            if debited {
                effects.push(WorkspaceEffect::Persist(PreferenceKey::AiCredits));
            }
            effects.push(WorkspaceEffect::Submit(Submission { ticket, payload }));
            GatedStart::Started(effects)
        }
    }
}

pub(crate) fn consume_credit(state: &mut WorkspaceState) -> GateDecision {
    let decision = try_consume(&mut state.entitlement);
    if decision == GateDecision::Denied {
        state.panels.open(PanelId::Pricing);
    }
    decision
}

fn begin(state: &mut WorkspaceState, kind: ActionKind) -> Option<u64> {
    let ticket = state.pending.begin(kind, Utc::now());
    if ticket.is_none() {
        tracing::debug!(kind = kind.label(), "ignoring request while pending");
    }
    ticket
}

fn complete_onboarding(state: &mut WorkspaceState) -> Vec<WorkspaceEffect> {
    state.onboarding.complete = true;
    vec![
        WorkspaceEffect::Persist(PreferenceKey::OnboardingComplete),
        WorkspaceEffect::RequestFrame,
    ]
}

fn frame_if(changed: bool) -> Vec<WorkspaceEffect> {
    if changed {
        vec![WorkspaceEffect::RequestFrame]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests;
