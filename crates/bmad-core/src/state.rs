use std::collections::VecDeque;

use chrono::DateTime;
use chrono::Utc;

use super::config::Config;
use super::entitlement::Tier;
use super::entitlement::UserEntitlement;
use super::files::WorkspaceFiles;
use super::files::ENTRY_FILE;
use super::panels::PanelState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Completion,
    Refactor,
    ChatReply,
    Build,
    PreviewRefresh,
}

impl ActionKind {
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Completion,
        ActionKind::Refactor,
        ActionKind::ChatReply,
        ActionKind::Build,
        ActionKind::PreviewRefresh,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Completion => "completion",
            Self::Refactor => "refactor",
            Self::ChatReply => "chat-reply",
            Self::Build => "build",
            Self::PreviewRefresh => "preview-refresh",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionPayload {
    Completion { file: String, code: String },
    Refactor { file: String },
    ChatReply { prompt: String },
    Build,
    PreviewRefresh { generation: u64 },
}

impl ActionPayload {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Completion { .. } => ActionKind::Completion,
            Self::Refactor { .. } => ActionKind::Refactor,
            Self::ChatReply { .. } => ActionKind::ChatReply,
            Self::Build => ActionKind::Build,
            Self::PreviewRefresh { .. } => ActionKind::PreviewRefresh,
        }
    }
}

/// A payload paired with the ticket of the pending slot it was started for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub ticket: u64,
    pub payload: ActionPayload,
}

impl Submission {
    pub fn kind(&self) -> ActionKind {
        self.payload.kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionResult {
    Completion { suggestion: String },
    Refactor,
    ChatReply { content: String, format: MessageFormat },
    Build { status: BuildStatus },
    PreviewRefresh { generation: u64 },
}

impl ActionResult {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Completion { .. } => ActionKind::Completion,
            Self::Refactor => ActionKind::Refactor,
            Self::ChatReply { .. } => ActionKind::ChatReply,
            Self::Build { .. } => ActionKind::Build,
            Self::PreviewRefresh { .. } => ActionKind::PreviewRefresh,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingAction {
    pub kind: ActionKind,
    pub ticket: u64,
    pub started_at: DateTime<Utc>,
}

/// In-flight simulated actions, at most one per kind. Tickets start at 1 and
/// are never reused.
#[derive(Debug, Clone, Default)]
pub struct PendingActions {
    slots: Vec<PendingAction>,
    last_ticket: u64,
}

impl PendingActions {
    pub fn is_pending(&self, kind: ActionKind) -> bool {
        self.slots.iter().any(|pending| pending.kind == kind)
    }

    pub fn get(&self, kind: ActionKind) -> Option<&PendingAction> {
        self.slots.iter().find(|pending| pending.kind == kind)
    }

    /// `None` when an action of this kind is already in flight.
    pub fn begin(&mut self, kind: ActionKind, started_at: DateTime<Utc>) -> Option<u64> {
        if self.is_pending(kind) {
            return None;
        }
        self.last_ticket += 1;
        let ticket = self.last_ticket;
        self.slots.push(PendingAction {
            kind,
            ticket,
            started_at,
        });
        Some(ticket)
    }

    pub fn finish(&mut self, kind: ActionKind) -> Option<PendingAction> {
        let idx = self.slots.iter().position(|pending| pending.kind == kind)?;
        Some(self.slots.remove(idx))
    }

    /// Removes the slot only when it still belongs to `ticket`.
    pub fn finish_ticket(&mut self, kind: ActionKind, ticket: u64) -> Option<PendingAction> {
        match self.get(kind) {
            Some(pending) if pending.ticket == ticket => self.finish(kind),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingAction> {
        self.slots.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    Text,
    Code,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
    pub format: MessageFormat,
}

pub const ASSISTANT_GREETING: &str = "Hello! I'm your AI assistant powered by advanced orchestration. How can I help you build something amazing today?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuickAction {
    GenerateComponent,
    ExplainCode,
    Optimize,
}

impl QuickAction {
    pub const ALL: [QuickAction; 3] = [
        QuickAction::GenerateComponent,
        QuickAction::ExplainCode,
        QuickAction::Optimize,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::GenerateComponent => "Generate Component",
            Self::ExplainCode => "Explain Code",
            Self::Optimize => "Optimize",
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            Self::GenerateComponent => "Generate a React component for...",
            Self::ExplainCode => "Explain what this code does...",
            Self::Optimize => "Optimize this code for performance...",
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssistantState {
    pub messages: Vec<ChatMessage>,
    pub input: String,
}

impl Default for AssistantState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage {
                role: ChatRole::Assistant,
                content: ASSISTANT_GREETING.to_string(),
                format: MessageFormat::Text,
            }],
            input: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditorState {
    pub suggestion: Option<String>,
    pub fullscreen: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevicePreset {
    Desktop,
    Tablet,
    Mobile,
}

impl DevicePreset {
    pub const ALL: [DevicePreset; 3] = [DevicePreset::Desktop, DevicePreset::Tablet, DevicePreset::Mobile];

    pub fn label(self) -> &'static str {
        match self {
            Self::Desktop => "Desktop",
            Self::Tablet => "Tablet",
            Self::Mobile => "Mobile",
        }
    }

    pub fn width(self) -> &'static str {
        match self {
            Self::Desktop => "100%",
            Self::Tablet => "768px",
            Self::Mobile => "375px",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Desktop => Self::Tablet,
            Self::Tablet => Self::Mobile,
            Self::Mobile => Self::Desktop,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PreviewState {
    pub device: DevicePreset,
    pub generation: u64,
}

impl Default for PreviewState {
    fn default() -> Self {
        Self {
            device: DevicePreset::Desktop,
            generation: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    NotRun,
    Succeeded,
}

impl BuildStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::NotRun => "Not run",
            Self::Succeeded => "Success",
        }
    }
}

#[derive(Debug, Clone)]
pub struct BuildState {
    pub last_status: BuildStatus,
    pub completed_runs: u64,
}

impl Default for BuildState {
    fn default() -> Self {
        Self {
            last_status: BuildStatus::NotRun,
            completed_runs: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuidePhaseId {
    Plan,
    Build,
    Test,
    Deploy,
}

impl GuidePhaseId {
    pub const ALL: [GuidePhaseId; 4] = [
        GuidePhaseId::Plan,
        GuidePhaseId::Build,
        GuidePhaseId::Test,
        GuidePhaseId::Deploy,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Self::Plan => "Plan & Spec",
            Self::Build => "Build",
            Self::Test => "Test & Analyze",
            Self::Deploy => "Deploy",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Plan => Self::Build,
            Self::Build => Self::Test,
            Self::Test => Self::Deploy,
            Self::Deploy => Self::Plan,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuideTask {
    pub id: &'static str,
    pub label: &'static str,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidePhase {
    pub id: GuidePhaseId,
    pub tasks: Vec<GuideTask>,
}

#[derive(Debug, Clone)]
pub struct GuideState {
    pub phases: Vec<GuidePhase>,
    pub active_phase: GuidePhaseId,
    pub progress_percent: u8,
}

fn task(id: &'static str, label: &'static str, completed: bool) -> GuideTask {
    GuideTask { id, label, completed }
}

impl Default for GuideState {
    fn default() -> Self {
        let phases = vec![
            GuidePhase {
                id: GuidePhaseId::Plan,
                tasks: vec![
                    task("requirements", "Define Requirements", true),
                    task("architecture", "Design Architecture", true),
                    task("speckit", "Generate SpecKit", false),
                ],
            },
            GuidePhase {
                id: GuidePhaseId::Build,
                tasks: vec![
                    task("components", "Create Components", false),
                    task("features", "Implement Features", false),
                    task("integration", "API Integration", false),
                ],
            },
            GuidePhase {
                id: GuidePhaseId::Test,
                tasks: vec![
                    task("unit", "Unit Tests", false),
                    task("performance", "Performance Audit", false),
                    task("security", "Security Check", false),
                ],
            },
            GuidePhase {
                id: GuidePhaseId::Deploy,
                tasks: vec![
                    task("staging", "Deploy to Staging", false),
                    task("production", "Production Release", false),
                    task("monitor", "Setup Monitoring", false),
                ],
            },
        ];
        let progress_percent = guide_progress(&phases);
        Self {
            phases,
            active_phase: GuidePhaseId::Plan,
            progress_percent,
        }
    }
}

impl GuideState {
    pub fn phase(&self, id: GuidePhaseId) -> Option<&GuidePhase> {
        self.phases.iter().find(|phase| phase.id == id)
    }

    /// Flips one task and recomputes progress over the updated list.
    pub fn toggle_task(&mut self, phase: GuidePhaseId, task_id: &str) -> bool {
        let Some(task) = self
            .phases
            .iter_mut()
            .filter(|candidate| candidate.id == phase)
            .flat_map(|candidate| candidate.tasks.iter_mut())
            .find(|task| task.id == task_id)
        else {
            return false;
        };
        task.completed = !task.completed;
        self.progress_percent = guide_progress(&self.phases);
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuideInsight {
    pub title: &'static str,
    pub description: &'static str,
    pub action: &'static str,
}

pub const GUIDE_INSIGHTS: [GuideInsight; 3] = [
    GuideInsight {
        title: "Optimize Bundle Size",
        description: "I detected 3 unused imports that could reduce your bundle by 15%",
        action: "Auto-fix",
    },
    GuideInsight {
        title: "Complete SpecKit Generation",
        description: "Generate documentation from your current code to improve maintainability",
        action: "Generate Now",
    },
    GuideInsight {
        title: "Add Error Boundaries",
        description: "Your app would benefit from React error boundaries for better UX",
        action: "Learn More",
    },
];

/// Free workspaces see a single insight.
pub fn visible_insights(tier: Tier) -> &'static [GuideInsight] {
    if tier.is_metered() {
        &GUIDE_INSIGHTS[..1]
    } else {
        &GUIDE_INSIGHTS
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DashboardStage {
    #[default]
    Build,
    Measure,
    Analyze,
    Deploy,
}

impl DashboardStage {
    pub const ALL: [DashboardStage; 4] = [
        DashboardStage::Build,
        DashboardStage::Measure,
        DashboardStage::Analyze,
        DashboardStage::Deploy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Build => "Build",
            Self::Measure => "Measure",
            Self::Analyze => "Analyze",
            Self::Deploy => "Deploy",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Self::Build => "Code generation & compilation",
            Self::Measure => "Performance metrics & analytics",
            Self::Analyze => "AI-powered insights",
            Self::Deploy => "CI/CD & deployment status",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Build => Self::Measure,
            Self::Measure => Self::Analyze,
            Self::Analyze => Self::Deploy,
            Self::Deploy => Self::Build,
        }
    }

    /// The upsell feature shown on this stage while it is locked.
    pub fn locked_feature(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Analyze => Some(("Deep Analysis", "Unlock advanced AI insights with Pro")),
            Self::Deploy => Some((
                "White-Label Deploy",
                "Custom domain & branding available in Enterprise",
            )),
            Self::Build | Self::Measure => None,
        }
    }
}

/// Deep analysis needs Pro; white-label deploy needs Enterprise.
pub fn stage_locked(stage: DashboardStage, tier: Tier) -> bool {
    match stage {
        DashboardStage::Analyze => tier == Tier::Free,
        DashboardStage::Deploy => tier != Tier::Enterprise,
        DashboardStage::Build | DashboardStage::Measure => false,
    }
}

pub const BUILD_TIME: &str = "2.3s";

pub const BUILD_TASKS: [(&str, &str); 3] = [
    ("Compile TypeScript", "0.8s"),
    ("Bundle Assets", "1.2s"),
    ("Generate Types", "0.3s"),
];

pub const MEASURE_SCORES: [(&str, u8); 4] = [
    ("Performance", 94),
    ("Accessibility", 100),
    ("SEO", 92),
    ("Best Practices", 96),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeSummary {
    pub suggestions: u32,
    pub issues: u32,
    pub optimizations: u32,
}

pub const ANALYZE_SUMMARY: AnalyzeSummary = AnalyzeSummary {
    suggestions: 3,
    issues: 1,
    optimizations: 2,
};

pub const ANALYZE_FINDINGS: [(&str, &str); 2] = [
    ("Bundle size reduced by 23%", "Tree-shaking removed unused code"),
    ("Consider lazy loading", "3 components could be code-split"),
];

pub const DEPLOY_ENVIRONMENT: &str = "staging";
pub const DEPLOY_LAST: &str = "2 hours ago";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardState {
    pub expanded: bool,
    pub active: DashboardStage,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            expanded: true,
            active: DashboardStage::Build,
        }
    }
}

pub fn guide_progress(phases: &[GuidePhase]) -> u8 {
    let (completed, total) = phases
        .iter()
        .flat_map(|phase| phase.tasks.iter())
        .fold((0_u32, 0_u32), |(done, total), task| {
            (done + u32::from(task.completed), total + 1)
        });
    if total == 0 {
        return 0;
    }
    ((f64::from(completed) / f64::from(total)) * 100.0).round() as u8
}

pub const ONBOARDING_STEPS: [(&str, &str); 4] = [
    (
        "Welcome to BMAD Workspace",
        "The next-generation developer environment with AI-powered orchestration.",
    ),
    (
        "AI-Powered Code Editor",
        "Write code faster with intelligent suggestions and completions.",
    ),
    (
        "BMAD Dashboard",
        "Monitor your entire development lifecycle in real-time.",
    ),
    ("Ready to Launch", "Deploy your applications with one click."),
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OnboardingState {
    pub step: usize,
    pub complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub seq: u64,
    pub level: ToastLevel,
    pub title: String,
    pub description: Option<String>,
}

impl Toast {
    pub fn new(level: ToastLevel, title: impl Into<String>) -> Self {
        Self {
            seq: 0,
            level,
            title: title.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct ToastBuffer {
    cap: usize,
    next_seq: u64,
    buf: VecDeque<Toast>,
}

impl ToastBuffer {
    pub fn new(cap: usize) -> Self {
        Self {
            cap,
            next_seq: 1,
            buf: VecDeque::with_capacity(cap),
        }
    }

    pub fn push(&mut self, mut toast: Toast) {
        toast.seq = self.next_seq;
        self.next_seq += 1;

        while self.buf.len() >= self.cap.max(1) {
            self.buf.pop_front();
        }
        self.buf.push_back(toast);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.buf.iter()
    }

    pub fn latest(&self) -> Option<&Toast> {
        self.buf.back()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct WorkspaceState {
    pub config: Config,
    pub entitlement: UserEntitlement,
    pub hydrated: bool,
    pub panels: PanelState,
    pub files: WorkspaceFiles,
    pub active_file: String,
    pub editor: EditorState,
    pub assistant: AssistantState,
    pub preview: PreviewState,
    pub build: BuildState,
    pub pending: PendingActions,
    pub guide: GuideState,
    pub dashboard: DashboardState,
    pub onboarding: OnboardingState,
    pub admin_mode: bool,
    pub sidebar_expanded: bool,
    pub toasts: ToastBuffer,
}

impl WorkspaceState {
    pub fn new(config: Config) -> Self {
        Self {
            entitlement: UserEntitlement::for_tier(Tier::Free, &config.quotas),
            hydrated: false,
            panels: PanelState::from_config(&config.panels),
            files: WorkspaceFiles::seeded(),
            active_file: ENTRY_FILE.to_string(),
            editor: EditorState::default(),
            assistant: AssistantState::default(),
            preview: PreviewState::default(),
            build: BuildState::default(),
            pending: PendingActions::default(),
            guide: GuideState::default(),
            dashboard: DashboardState::default(),
            onboarding: OnboardingState::default(),
            admin_mode: false,
            sidebar_expanded: true,
            toasts: ToastBuffer::new(64),
            config,
        }
    }

    pub fn active_content(&self) -> &str {
        self.files.get(&self.active_file).unwrap_or_default()
    }

    pub fn is_typing(&self) -> bool {
        self.pending.is_pending(ActionKind::ChatReply)
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_pending(ActionKind::Completion)
    }

    pub fn is_building(&self) -> bool {
        self.pending.is_pending(ActionKind::Build)
    }

    pub fn is_refreshing_preview(&self) -> bool {
        self.pending.is_pending(ActionKind::PreviewRefresh)
    }

    /// The send control is disabled for blank input or while a reply is pending.
    pub fn can_send_chat(&self) -> bool {
        !self.assistant.input.trim().is_empty() && !self.is_typing()
    }

    pub fn show_onboarding(&self) -> bool {
        self.hydrated && !self.onboarding.complete
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::guide_progress;
    use super::stage_locked;
    use super::ActionKind;
    use super::DashboardStage;
    use super::GuideState;
    use super::PendingActions;
    use super::Toast;
    use super::ToastBuffer;
    use super::ToastLevel;
    use crate::entitlement::Tier;
    use pretty_assertions::assert_eq;

    #[test]
    fn pending_allows_one_action_per_kind() {
        let mut pending = PendingActions::default();
        assert_eq!(pending.begin(ActionKind::Build, Utc::now()), Some(1));
        assert_eq!(pending.begin(ActionKind::Build, Utc::now()), None);
        assert_eq!(pending.begin(ActionKind::ChatReply, Utc::now()), Some(2));
        assert_eq!(pending.iter().count(), 2);

        assert!(pending.finish(ActionKind::Build).is_some());
        assert!(pending.finish(ActionKind::Build).is_none());
        assert!(pending.is_pending(ActionKind::ChatReply));
    }

    #[test]
    fn seeded_guide_progress_is_derived_from_tasks() {
        let guide = GuideState::default();
        assert_eq!(guide.progress_percent, 17);
        assert_eq!(guide_progress(&[]), 0);
    }

    #[test]
    fn toast_buffer_evicts_oldest_first() {
        let mut toasts = ToastBuffer::new(2);
        for title in ["a", "b", "c"] {
            toasts.push(Toast::new(ToastLevel::Info, title));
        }
        let seqs: Vec<u64> = toasts.iter().map(|toast| toast.seq).collect();
        assert_eq!(seqs, vec![2, 3]);
        assert_eq!(toasts.latest().map(|toast| toast.title.as_str()), Some("c"));
    }

    #[test]
    fn zero_capacity_toast_buffer_keeps_only_latest() {
        let mut toasts = ToastBuffer::new(0);
        for title in ["a", "b", "c"] {
            toasts.push(Toast::new(ToastLevel::Info, title));
        }
        assert_eq!(toasts.iter().count(), 1);
        assert_eq!(toasts.latest().map(|toast| toast.seq), Some(3));
    }

    #[test]
    fn stale_ticket_leaves_newer_slot_in_place() {
        let mut pending = PendingActions::default();
        let first = pending.begin(ActionKind::Build, Utc::now()).expect("first");
        pending.finish(ActionKind::Build);
        let second = pending.begin(ActionKind::Build, Utc::now()).expect("second");
        assert_ne!(first, second);

        assert!(pending.finish_ticket(ActionKind::Build, first).is_none());
        assert!(pending.is_pending(ActionKind::Build));
        assert!(pending.finish_ticket(ActionKind::Build, second).is_some());
        assert!(!pending.is_pending(ActionKind::Build));
    }

    #[test]
    fn dashboard_locks_follow_tier() {
        let locked = |tier: Tier| -> Vec<DashboardStage> {
            DashboardStage::ALL
                .into_iter()
                .filter(|stage| stage_locked(*stage, tier))
                .collect()
        };
        assert_eq!(
            locked(Tier::Free),
            vec![DashboardStage::Analyze, DashboardStage::Deploy]
        );
        assert_eq!(locked(Tier::Pro), vec![DashboardStage::Deploy]);
        assert_eq!(locked(Tier::Enterprise), Vec::<DashboardStage>::new());
    }

    #[test]
    fn every_lockable_stage_names_its_feature() {
        for stage in DashboardStage::ALL {
            assert_eq!(
                stage.locked_feature().is_some(),
                stage_locked(stage, Tier::Free)
            );
        }
        assert_eq!(DashboardStage::Deploy.next(), DashboardStage::Build);
    }
}
