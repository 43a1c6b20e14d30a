use super::entitlement::Tier;
use super::panels::PanelId;
use super::persistence::HydratedPreferences;
use super::state::ActionKind;
use super::state::ActionResult;
use super::state::DashboardStage;
use super::state::DevicePreset;
use super::state::GuidePhaseId;
use super::state::QuickAction;

#[derive(Debug, Clone)]
pub enum WorkspaceAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone)]
pub enum UserAction {
    TogglePanel(PanelId),
    OpenPanel(PanelId),
    ClosePanel(PanelId),
    ToggleSidebar,
    ToggleFullscreen,
    SelectFile(String),
    EditActiveFile(String),
    RequestCompletion,
    AcceptSuggestion,
    DismissSuggestion,
    RequestRefactor,
    ChatInput(char),
    ChatBackspace,
    ChatPaste(String),
    SendChat,
    QuickAction(QuickAction),
    RunBuild,
    RefreshPreview,
    SelectDevice(DevicePreset),
    CycleDevice,
    SelectTier(Tier),
    NextOnboardingStep,
    PrevOnboardingStep,
    SkipOnboarding,
    ToggleAdminMode,
    SelectGuidePhase(GuidePhaseId),
    ToggleGuideTask {
        phase: GuidePhaseId,
        task: String,
    },
    CopyActiveFile,
    CopyMessage(usize),
    ToggleDashboard,
    SelectDashboardStage(DashboardStage),
    CycleDashboardStage,
    DebugExport,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    Hydrated(HydratedPreferences),
    ActionResolved { ticket: u64, result: ActionResult },
    ActionCancelled(ActionKind),
    Notify {
        title: String,
        description: Option<String>,
    },
}

impl From<UserAction> for WorkspaceAction {
    fn from(action: UserAction) -> Self {
        Self::User(action)
    }
}

impl From<RuntimeAction> for WorkspaceAction {
    fn from(action: RuntimeAction) -> Self {
        Self::Runtime(action)
    }
}
