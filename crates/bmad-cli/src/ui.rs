use std::io;
use std::sync::OnceLock;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use anyhow::Context;
use anyhow::Result;
use arboard::Clipboard;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap};
use ratatui::Terminal;

use bmad_core::files::{FileLanguage, ENTRY_FILE};
use bmad_core::tier::can_select;
use bmad_core::{
    stage_locked, visible_insights, ActionKind, ChatRole, DashboardStage, FilePreferenceStore,
    GuidePhaseId, MessageFormat, PanelId, QuickAction, RuntimeAction, Tier, ToastLevel,
    UsageLevel, UserAction, WorkspaceEffect, WorkspaceState, ANALYZE_FINDINGS, ANALYZE_SUMMARY,
    BUILD_TASKS, BUILD_TIME, DEPLOY_ENVIRONMENT, DEPLOY_LAST, MEASURE_SCORES, ONBOARDING_STEPS,
};
use bmad_exec::WorkspaceRuntime;

use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::events::{AppEvent, EventHandler};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();

const SYNTECT_THEME: &str = "base16-ocean.dark";

fn get_syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn get_theme_set() -> &'static ThemeSet {
    THEME_SET.get_or_init(ThemeSet::load_defaults)
}

struct TuiGuard;

impl Drop for TuiGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        DisableBracketedPaste,
        LeaveAlternateScreen,
        crossterm::cursor::Show
    );
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));
}

type Runtime = WorkspaceRuntime<FilePreferenceStore>;

pub async fn run(mut runtime: Runtime) -> Result<()> {
    install_panic_hook();
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        crossterm::cursor::Hide
    )?;
    let _guard = TuiGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let mut events = EventHandler::new();
    let mut clipboard = Clipboard::new().ok();

    run_app(&mut terminal, &mut runtime, &mut events, &mut clipboard).await
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    runtime: &mut Runtime,
    events: &mut EventHandler,
    clipboard: &mut Option<Clipboard>,
) -> Result<()> {
    loop {
        runtime.drain_ready()?;
        terminal.draw(|f| ui(f, runtime.session().state()))?;

        tokio::select! {
            event = events.next() => {
                let Some(event) = event else {
                    return Ok(());
                };
                let action = match event {
                    AppEvent::Key(key) => match map_key(key, runtime.session().state()) {
                        KeyOutcome::Quit => return Ok(()),
                        KeyOutcome::Ignore => continue,
                        KeyOutcome::CancelPending => {
                            cancel_pending(runtime)?;
                            continue;
                        }
                        KeyOutcome::Action(action) => action,
                    },
                    AppEvent::Paste(text) if runtime.session().state().panels.assistant => {
                        UserAction::ChatPaste(text)
                    }
                    AppEvent::Paste(_) | AppEvent::Resize | AppEvent::Tick => continue,
                };
                let effects = runtime.dispatch(action)?;
                run_effects(runtime, clipboard, effects)?;
            }
            outcome = runtime.next_outcome() => {
                if outcome?.is_none() {
                    return Ok(());
                }
            }
        }
    }
}

fn cancel_pending(runtime: &mut Runtime) -> Result<()> {
    let kinds: Vec<ActionKind> = runtime
        .session()
        .state()
        .pending
        .iter()
        .map(|pending| pending.kind)
        .collect();
    for kind in kinds {
        if runtime.cancel(kind)? {
            runtime.dispatch(RuntimeAction::Notify {
                title: format!("{} cancelled", kind.label()),
                description: None,
            })?;
        }
    }
    Ok(())
}

fn run_effects(
    runtime: &mut Runtime,
    clipboard: &mut Option<Clipboard>,
    effects: Vec<WorkspaceEffect>,
) -> Result<()> {
    for effect in effects {
        match effect {
            WorkspaceEffect::CopyToClipboard(text) => {
                let copied = clipboard
                    .as_mut()
                    .map(|clipboard| clipboard.set_text(text).is_ok())
                    .unwrap_or(false);
                if !copied {
                    tracing::warn!("clipboard unavailable");
                    runtime.dispatch(RuntimeAction::Notify {
                        title: "Clipboard unavailable".to_string(),
                        description: None,
                    })?;
                }
            }
            WorkspaceEffect::RequestFrame
            | WorkspaceEffect::Persist(_)
            | WorkspaceEffect::Submit(_) => {}
        }
    }
    Ok(())
}

#[derive(Debug)]
enum KeyOutcome {
    Quit,
    Ignore,
    CancelPending,
    Action(UserAction),
}

impl From<UserAction> for KeyOutcome {
    fn from(action: UserAction) -> Self {
        Self::Action(action)
    }
}

fn map_key(key: KeyEvent, state: &WorkspaceState) -> KeyOutcome {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return KeyOutcome::Quit;
    }
    if state.show_onboarding() {
        return map_onboarding_key(key);
    }
    if state.panels.pricing {
        return map_pricing_key(key);
    }
    if state.panels.settings {
        return map_dismiss_key(key, PanelId::Settings);
    }
    if state.panels.admin {
        return map_dismiss_key(key, PanelId::Admin);
    }
    if state.panels.assistant {
        return map_assistant_key(key, state);
    }
    map_workspace_key(key, state)
}

fn map_onboarding_key(key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Enter | KeyCode::Right => UserAction::NextOnboardingStep.into(),
        KeyCode::Left => UserAction::PrevOnboardingStep.into(),
        KeyCode::Esc | KeyCode::Char('s') => UserAction::SkipOnboarding.into(),
        _ => KeyOutcome::Ignore,
    }
}

fn map_pricing_key(key: KeyEvent) -> KeyOutcome {
    match key.code {
        KeyCode::Esc | KeyCode::Char('p') => UserAction::ClosePanel(PanelId::Pricing).into(),
        KeyCode::Char('1') => UserAction::SelectTier(Tier::Free).into(),
        KeyCode::Char('2') => UserAction::SelectTier(Tier::Pro).into(),
        KeyCode::Char('3') => UserAction::SelectTier(Tier::Enterprise).into(),
        _ => KeyOutcome::Ignore,
    }
}

fn map_dismiss_key(key: KeyEvent, panel: PanelId) -> KeyOutcome {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => UserAction::ClosePanel(panel).into(),
        _ => KeyOutcome::Ignore,
    }
}

fn map_assistant_key(key: KeyEvent, state: &WorkspaceState) -> KeyOutcome {
    match key.code {
        KeyCode::Esc => UserAction::ClosePanel(PanelId::Assistant).into(),
        KeyCode::Enter => {
            if state.can_send_chat() {
                UserAction::SendChat.into()
            } else {
                KeyOutcome::Ignore
            }
        }
        KeyCode::Backspace => UserAction::ChatBackspace.into(),
        KeyCode::F(n @ 1..=3) => UserAction::QuickAction(QuickAction::ALL[usize::from(n) - 1]).into(),
        KeyCode::Char('y') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            match state.assistant.messages.len().checked_sub(1) {
                Some(last) => UserAction::CopyMessage(last).into(),
                None => KeyOutcome::Ignore,
            }
        }
        KeyCode::Char(ch) => UserAction::ChatInput(ch).into(),
        _ => KeyOutcome::Ignore,
    }
}

fn map_workspace_key(key: KeyEvent, state: &WorkspaceState) -> KeyOutcome {
    match key.code {
        KeyCode::Char('q') => KeyOutcome::Quit,
        KeyCode::Char('a') => UserAction::OpenPanel(PanelId::Assistant).into(),
        KeyCode::Char('g') => UserAction::TogglePanel(PanelId::Guide).into(),
        KeyCode::Char('s') => UserAction::OpenPanel(PanelId::Settings).into(),
        KeyCode::Char('p') => UserAction::OpenPanel(PanelId::Pricing).into(),
        KeyCode::Char('m') if state.admin_mode => UserAction::OpenPanel(PanelId::Admin).into(),
        KeyCode::Char('M') => UserAction::ToggleAdminMode.into(),
        KeyCode::Char('c') => UserAction::RequestCompletion.into(),
        KeyCode::Char('r') => UserAction::RequestRefactor.into(),
        KeyCode::Char('b') => UserAction::RunBuild.into(),
        KeyCode::Char('f') => UserAction::RefreshPreview.into(),
        KeyCode::Char('d') => UserAction::CycleDevice.into(),
        KeyCode::Char('y') => UserAction::CopyActiveFile.into(),
        KeyCode::Char('e') => UserAction::ToggleSidebar.into(),
        KeyCode::Char('z') => UserAction::ToggleFullscreen.into(),
        KeyCode::Char('w') => UserAction::ToggleDashboard.into(),
        KeyCode::Char('n') if state.dashboard.expanded => UserAction::CycleDashboardStage.into(),
        KeyCode::Char('v') => UserAction::DebugExport.into(),
        KeyCode::Char('x') if !state.pending.is_empty() => KeyOutcome::CancelPending,
        KeyCode::Tab if state.editor.suggestion.is_some() => UserAction::AcceptSuggestion.into(),
        KeyCode::Esc if state.editor.suggestion.is_some() => UserAction::DismissSuggestion.into(),
        KeyCode::Up | KeyCode::Down => select_adjacent_file(state, key.code == KeyCode::Down),
        KeyCode::Left if state.panels.guide => {
            UserAction::SelectGuidePhase(previous_phase(state.guide.active_phase)).into()
        }
        KeyCode::Right if state.panels.guide => {
            UserAction::SelectGuidePhase(state.guide.active_phase.next()).into()
        }
        KeyCode::Char(ch @ '1'..='3') if state.panels.guide => {
            let idx = usize::from(ch as u8 - b'1');
            match state
                .guide
                .phase(state.guide.active_phase)
                .and_then(|phase| phase.tasks.get(idx))
            {
                Some(task) => UserAction::ToggleGuideTask {
                    phase: state.guide.active_phase,
                    task: task.id.to_string(),
                }
                .into(),
                None => KeyOutcome::Ignore,
            }
        }
        _ => KeyOutcome::Ignore,
    }
}

fn previous_phase(phase: GuidePhaseId) -> GuidePhaseId {
    let all = GuidePhaseId::ALL;
    let idx = all.iter().position(|candidate| *candidate == phase).unwrap_or(0);
    all[(idx + all.len() - 1) % all.len()]
}

fn select_adjacent_file(state: &WorkspaceState, forward: bool) -> KeyOutcome {
    let names: Vec<&str> = state.files.names().collect();
    if names.is_empty() {
        return KeyOutcome::Ignore;
    }
    let current = names
        .iter()
        .position(|name| *name == state.active_file)
        .unwrap_or(0);
    let next = if forward {
        (current + 1) % names.len()
    } else {
        (current + names.len() - 1) % names.len()
    };
    UserAction::SelectFile(names[next].to_string()).into()
}

#[derive(Clone, Copy)]
struct UiPalette {
    accent: Color,
    accent_alt: Color,
    success: Color,
    warning: Color,
    danger: Color,
    muted: Color,
    border: Color,
    selected_bg: Color,
}

const PALETTE: UiPalette = UiPalette {
    accent: Color::LightGreen,
    accent_alt: Color::Rgb(212, 255, 0),
    success: Color::Green,
    warning: Color::Yellow,
    danger: Color::Red,
    muted: Color::DarkGray,
    border: Color::Gray,
    selected_bg: Color::Rgb(20, 36, 20),
};

fn get_spinner() -> &'static str {
    let frames = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or(0);
    frames[(millis / 100) as usize % frames.len()]
}

fn panel_block(title: &str, palette: UiPalette) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.border))
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ))
}

fn ui(f: &mut ratatui::Frame, state: &WorkspaceState) {
    let palette = PALETTE;
    let usage = state.entitlement.usage(&state.config.quotas);

    let mut constraints = vec![Constraint::Length(1), Constraint::Min(0)];
    if usage.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(f.area());

    render_header(f, chunks[0], state, palette);
    render_body(f, chunks[1], state, palette);
    if usage.is_some() {
        render_usage(f, chunks[2], state, palette);
    }
    render_footer(f, chunks[chunks.len() - 1], state, palette);

    if state.panels.settings {
        render_settings(f, state, palette);
    }
    if state.panels.admin {
        render_admin(f, state, palette);
    }
    if state.panels.pricing {
        render_pricing(f, state, palette);
    }
    if state.show_onboarding() {
        render_onboarding(f, state, palette);
    }
}

fn render_header(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let entitlement = state.entitlement;
    let mut activity: Vec<&str> = state.pending.iter().map(|pending| pending.kind.label()).collect();
    activity.sort_unstable();
    let activity = if activity.is_empty() {
        "idle".to_string()
    } else {
        format!("{} {}", get_spinner(), activity.join(", "))
    };
    let mut spans = vec![
        Span::styled(
            " BMAD Workspace ",
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(palette.muted)),
        Span::styled(
            entitlement.tier.display_name(),
            Style::default().fg(palette.accent_alt),
        ),
        Span::styled(
            format!(" | credits {} ", entitlement.credits),
            Style::default().fg(palette.border),
        ),
        Span::styled(format!("| {activity} "), Style::default().fg(palette.muted)),
    ];
    if state.admin_mode {
        spans.push(Span::styled("| admin ", Style::default().fg(palette.warning)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    if state.editor.fullscreen {
        render_editor(f, area, state, palette);
        return;
    }

    let mut constraints = Vec::new();
    if state.panels.guide {
        constraints.push(Constraint::Length(34));
    }
    if state.sidebar_expanded {
        constraints.push(Constraint::Length(22));
    }
    constraints.push(Constraint::Min(30));
    constraints.push(Constraint::Percentage(30));
    constraints.push(Constraint::Length(if state.dashboard.expanded { 32 } else { 4 }));
    if state.panels.assistant {
        constraints.push(Constraint::Length(44));
    }
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    let mut idx = 0;
    if state.panels.guide {
        render_guide(f, columns[idx], state, palette);
        idx += 1;
    }
    if state.sidebar_expanded {
        render_sidebar(f, columns[idx], state, palette);
        idx += 1;
    }
    render_editor(f, columns[idx], state, palette);
    render_preview(f, columns[idx + 1], state, palette);
    render_dashboard(f, columns[idx + 2], state, palette);
    if state.panels.assistant {
        render_assistant(f, columns[idx + 3], state, palette);
    }
}

fn render_sidebar(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let items: Vec<ListItem> = state
        .files
        .iter()
        .map(|file| {
            let style = if file.name == state.active_file {
                Style::default().fg(palette.accent).bg(palette.selected_bg)
            } else {
                Style::default().fg(palette.border)
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {}", file.name), style),
                Span::styled(
                    format!(" {}", file.line_count()),
                    Style::default().fg(palette.muted),
                ),
            ]))
        })
        .collect();
    f.render_widget(List::new(items).block(panel_block("Files", palette)), area);
}

fn highlight_code(content: &str, file: &str) -> Vec<Line<'static>> {
    let syntaxes = get_syntax_set();
    let syntax = syntaxes
        .find_syntax_by_extension(FileLanguage::for_file(file).extension())
        .unwrap_or_else(|| syntaxes.find_syntax_plain_text());
    let Some(theme) = get_theme_set().themes.get(SYNTECT_THEME) else {
        return content.lines().map(|line| Line::from(line.to_string())).collect();
    };
    let mut highlighter = HighlightLines::new(syntax, theme);

    let mut lines = Vec::new();
    for (number, raw) in LinesWithEndings::from(content).enumerate() {
        let mut spans = vec![Span::styled(
            format!("{:>3} ", number + 1),
            Style::default().fg(PALETTE.muted),
        )];
        match highlighter.highlight_line(raw, syntaxes) {
            Ok(ranges) => {
                for (style, text) in ranges {
                    let fg = style.foreground;
                    spans.push(Span::styled(
                        text.trim_end_matches('\n').to_string(),
                        Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                    ));
                }
            }
            Err(_) => spans.push(Span::raw(raw.trim_end_matches('\n').to_string())),
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn render_editor(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let language = FileLanguage::for_file(&state.active_file);
    let mut lines = highlight_code(state.active_content(), &state.active_file);
    if let Some(suggestion) = &state.editor.suggestion {
        for raw in suggestion.lines() {
            lines.push(Line::from(Span::styled(
                format!("    {raw}"),
                Style::default()
                    .fg(palette.accent_alt)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        lines.push(Line::from(Span::styled(
            "    Tab accept  Esc dismiss",
            Style::default().fg(palette.muted),
        )));
    }
    let title = format!("{} [{}]", state.active_file, language.label());
    let editor = Paragraph::new(lines).block(panel_block(&title, palette));
    f.render_widget(editor, area);
}

fn preview_text(content: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut in_markup = false;
    for raw in content.lines() {
        let line = raw.trim();
        if line.starts_with("return (") {
            in_markup = true;
            continue;
        }
        if !in_markup {
            continue;
        }
        if line == ")" {
            break;
        }
        if line.is_empty() || line.starts_with('<') || line.starts_with('{') {
            continue;
        }
        out.push(line.to_string());
    }
    out
}

fn render_preview(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let device = state.preview.device;
    let mut lines = vec![Line::from(Span::styled(
        format!("{} ({})", device.label(), device.width()),
        Style::default().fg(palette.muted),
    ))];
    if state.is_refreshing_preview() {
        lines.push(Line::from(Span::styled(
            format!("{} refreshing", get_spinner()),
            Style::default().fg(palette.warning),
        )));
    }
    lines.push(Line::from(""));
    let entry = state.files.get(ENTRY_FILE).unwrap_or_default();
    for (idx, text) in preview_text(entry).into_iter().enumerate() {
        let style = if idx == 0 {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(palette.border)
        };
        lines.push(Line::from(Span::styled(text, style)));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(
            "build: {} ({} runs)",
            state.build.last_status.label(),
            state.build.completed_runs
        ),
        Style::default().fg(palette.muted),
    )));
    let preview = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(panel_block("Live Preview", palette));
    f.render_widget(preview, area);
}

fn render_guide(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let block = panel_block("AI Project Guide", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent))
        .percent(u16::from(state.guide.progress_percent.min(100)))
        .label(format!("{}% complete", state.guide.progress_percent));
    f.render_widget(gauge, rows[0]);

    let mut lines = Vec::new();
    let phases: Vec<Span> = GuidePhaseId::ALL
        .iter()
        .map(|phase| {
            let style = if *phase == state.guide.active_phase {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            Span::styled(format!("{} ", phase.title()), style)
        })
        .collect();
    lines.push(Line::from(phases));
    lines.push(Line::from(""));
    if let Some(phase) = state.guide.phase(state.guide.active_phase) {
        for (idx, task) in phase.tasks.iter().enumerate() {
            let (mark, style) = if task.completed {
                ("[x]", Style::default().fg(palette.success))
            } else {
                ("[ ]", Style::default().fg(palette.border))
            };
            lines.push(Line::from(Span::styled(
                format!("{} {mark} {}", idx + 1, task.label),
                style,
            )));
        }
    }
    lines.push(Line::from(""));
    for insight in visible_insights(state.entitlement.tier) {
        lines.push(Line::from(Span::styled(
            insight.title,
            Style::default().fg(palette.accent_alt),
        )));
        lines.push(Line::from(Span::styled(
            insight.description,
            Style::default().fg(palette.muted),
        )));
    }
    if state.entitlement.tier.is_metered() {
        lines.push(Line::from(Span::styled(
            "Upgrade for more insights (p)",
            Style::default().fg(palette.warning),
        )));
    }
    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), rows[1]);
}

fn render_dashboard(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let active = state.dashboard.active;
    if !state.dashboard.expanded {
        let lines: Vec<Line> = DashboardStage::ALL
            .iter()
            .map(|stage| {
                let style = if *stage == active {
                    Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(palette.muted)
                };
                Line::from(Span::styled(&stage.label()[..1], style))
            })
            .collect();
        f.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::LEFT)),
            area,
        );
        return;
    }

    let tabs: Vec<Span> = DashboardStage::ALL
        .iter()
        .map(|stage| {
            let style = if *stage == active {
                Style::default().fg(palette.accent).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette.muted)
            };
            Span::styled(format!("{} ", stage.label()), style)
        })
        .collect();
    let mut lines = vec![
        Line::from(tabs),
        Line::from(""),
        Line::from(Span::styled(
            active.label(),
            Style::default().fg(palette.accent_alt).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(active.description(), Style::default().fg(palette.muted))),
        Line::from(""),
    ];
    let row = |label: &str, value: String, color: Color| {
        Line::from(vec![
            Span::styled(format!("{label:<16}"), Style::default().fg(palette.border)),
            Span::styled(value, Style::default().fg(color)),
        ])
    };
    match active {
        DashboardStage::Build => {
            lines.push(row("Build Status", "Success".to_string(), palette.success));
            lines.push(row("Build time", BUILD_TIME.to_string(), palette.border));
            for (task, time) in BUILD_TASKS {
                lines.push(row(task, time.to_string(), palette.muted));
            }
        }
        DashboardStage::Measure => {
            for (metric, score) in MEASURE_SCORES {
                let color = if score >= 90 {
                    palette.success
                } else if score >= 70 {
                    palette.accent_alt
                } else {
                    palette.danger
                };
                lines.push(row(metric, score.to_string(), color));
            }
        }
        DashboardStage::Analyze => {
            lines.push(row("Suggestions", ANALYZE_SUMMARY.suggestions.to_string(), palette.accent_alt));
            lines.push(row("Issues", ANALYZE_SUMMARY.issues.to_string(), palette.danger));
            lines.push(row("Optimized", ANALYZE_SUMMARY.optimizations.to_string(), palette.success));
            for (title, detail) in ANALYZE_FINDINGS {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(title, Style::default().fg(palette.border))));
                lines.push(Line::from(Span::styled(detail, Style::default().fg(palette.muted))));
            }
        }
        DashboardStage::Deploy => {
            lines.push(row("Status", "Ready to deploy".to_string(), palette.success));
            lines.push(row("Environment", DEPLOY_ENVIRONMENT.to_string(), palette.accent));
            lines.push(row("Last Deploy", DEPLOY_LAST.to_string(), palette.muted));
        }
    }
    if stage_locked(active, state.entitlement.tier) {
        if let Some((feature, pitch)) = active.locked_feature() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("[locked] {feature}"),
                Style::default().fg(palette.warning).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(pitch, Style::default().fg(palette.muted))));
        }
    }
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel_block("BMAD Dashboard", palette)),
        area,
    );
}

fn render_assistant(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let block = panel_block("AI Assistant", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(2), Constraint::Length(3)])
        .split(inner);

    let mut lines = Vec::new();
    for message in &state.assistant.messages {
        let (who, style) = match message.role {
            ChatRole::User => ("you", Style::default().fg(palette.accent_alt)),
            ChatRole::Assistant => ("ai", Style::default().fg(palette.accent)),
        };
        lines.push(Line::from(Span::styled(
            format!("{who}:"),
            style.add_modifier(Modifier::BOLD),
        )));
        match message.format {
            MessageFormat::Code => lines.extend(highlight_code(&message.content, "snippet.jsx")),
            MessageFormat::Text => {
                for raw in message.content.lines() {
                    lines.push(Line::from(raw.to_string()));
                }
            }
        }
        lines.push(Line::from(""));
    }
    if state.is_typing() {
        lines.push(Line::from(Span::styled(
            format!("{} thinking", get_spinner()),
            Style::default().fg(palette.muted),
        )));
    }
    let total = lines.len() as u16;
    let scroll = total.saturating_sub(rows[0].height);
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0)),
        rows[0],
    );

    let quick: Vec<Span> = QuickAction::ALL
        .iter()
        .enumerate()
        .map(|(idx, action)| {
            Span::styled(
                format!("F{} {}  ", idx + 1, action.label()),
                Style::default().fg(palette.muted),
            )
        })
        .collect();
    f.render_widget(Paragraph::new(Line::from(quick)).wrap(Wrap { trim: true }), rows[1]);

    let input_style = if state.can_send_chat() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(palette.muted)
    };
    let input = Paragraph::new(state.assistant.input.as_str())
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(" Ask anything "));
    f.render_widget(input, rows[2]);
}

fn render_usage(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let Some(usage) = state.entitlement.usage(&state.config.quotas) else {
        return;
    };
    let color = match usage.level {
        UsageLevel::Healthy => palette.success,
        UsageLevel::Low => palette.warning,
        UsageLevel::Critical => palette.danger,
    };
    let label = match usage.level {
        UsageLevel::Critical => format!(
            "{}/{} AI credits remaining. Running low, press p to upgrade",
            usage.remaining, usage.max
        ),
        _ => format!("{}/{} AI credits remaining", usage.remaining, usage.max),
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .percent(u16::from(usage.percent_remaining))
        .label(label);
    f.render_widget(gauge, area);
}

fn render_footer(f: &mut ratatui::Frame, area: Rect, state: &WorkspaceState, palette: UiPalette) {
    let line = match state.toasts.latest() {
        Some(toast) => {
            let color = match toast.level {
                ToastLevel::Info => palette.accent_alt,
                ToastLevel::Success => palette.success,
                ToastLevel::Warning => palette.warning,
            };
            let mut spans = vec![Span::styled(
                format!(" {} ", toast.title),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )];
            if let Some(description) = &toast.description {
                spans.push(Span::styled(description.clone(), Style::default().fg(palette.muted)));
            }
            Line::from(spans)
        }
        None => Line::from(Span::styled(
            " a assistant  g guide  c complete  r refactor  b build  f refresh  x cancel  w dashboard  n stage  v export  p pricing  s settings  q quit",
            Style::default().fg(palette.muted),
        )),
    };
    f.render_widget(Paragraph::new(line), area);
}

fn render_pricing(f: &mut ratatui::Frame, state: &WorkspaceState, palette: UiPalette) {
    let area = centered_rect(70, 50, f.area());
    f.render_widget(Clear, area);
    let block = panel_block("Choose your plan", palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(33),
            Constraint::Percentage(34),
            Constraint::Percentage(33),
        ])
        .split(inner);
    let quotas = &state.config.quotas;
    for (idx, tier) in Tier::ALL.into_iter().enumerate() {
        let selectable = can_select(state, tier);
        let credits = match tier {
            Tier::Free => format!("{} AI credits", quotas.free_credits),
            Tier::Pro => format!("{} AI credits", quotas.pro_credits),
            Tier::Enterprise => "Unlimited AI credits".to_string(),
        };
        let action = if selectable {
            Span::styled(format!("[{}] select", idx + 1), Style::default().fg(palette.accent))
        } else {
            Span::styled("Current plan", Style::default().fg(palette.muted))
        };
        let lines = vec![
            Line::from(Span::styled(
                tier.display_name(),
                Style::default().fg(palette.accent_alt).add_modifier(Modifier::BOLD),
            )),
            Line::from(tier.price()),
            Line::from(""),
            Line::from(credits),
            Line::from(""),
            Line::from(action),
        ];
        let border = if selectable { palette.border } else { palette.accent };
        f.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(border))),
            columns[idx],
        );
    }
}

fn render_settings(f: &mut ratatui::Frame, state: &WorkspaceState, palette: UiPalette) {
    let area = centered_rect(60, 50, f.area());
    f.render_widget(Clear, area);
    let config = &state.config;
    let lines = vec![
        Line::from(format!("data dir:        {}", config.data_dir().display())),
        Line::from(format!(
            "quotas:          free {} / pro {}",
            config.quotas.free_credits, config.quotas.pro_credits
        )),
        Line::from(format!(
            "usage warnings:  low <= {}, critical <= {}",
            config.quotas.low_threshold, config.quotas.critical_threshold
        )),
        Line::from(format!(
            "delays (ms):     preview {} / chat {} / completion {} / refactor {} / build {}",
            config.delays.preview_refresh_ms,
            config.delays.chat_reply_ms,
            config.delays.completion_ms,
            config.delays.refactor_ms,
            config.delays.build_ms
        )),
        Line::from(format!("api origin:      {}", config.api.cors_origin)),
        Line::from(""),
        Line::from(Span::styled("Esc close", Style::default().fg(palette.muted))),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .block(panel_block("Settings", palette)),
        area,
    );
}

fn render_admin(f: &mut ratatui::Frame, state: &WorkspaceState, palette: UiPalette) {
    let area = centered_rect(50, 40, f.area());
    f.render_widget(Clear, area);
    let pending: Vec<&str> = ActionKind::ALL
        .into_iter()
        .filter(|kind| state.pending.is_pending(*kind))
        .map(ActionKind::label)
        .collect();
    let lines = vec![
        Line::from(format!("tier:          {}", state.entitlement.tier.display_name())),
        Line::from(format!("credits:       {}", state.entitlement.credits)),
        Line::from(format!("messages:      {}", state.assistant.messages.len())),
        Line::from(format!("builds:        {}", state.build.completed_runs)),
        Line::from(format!("notifications: {}", state.toasts.iter().count())),
        Line::from(format!(
            "pending:       {}",
            if pending.is_empty() { "none".to_string() } else { pending.join(", ") }
        )),
        Line::from(""),
        Line::from(Span::styled("Esc close", Style::default().fg(palette.muted))),
    ];
    f.render_widget(
        Paragraph::new(lines).block(panel_block("Admin", palette)),
        area,
    );
}

fn render_onboarding(f: &mut ratatui::Frame, state: &WorkspaceState, palette: UiPalette) {
    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);
    let step = state.onboarding.step.min(ONBOARDING_STEPS.len() - 1);
    let (title, description) = ONBOARDING_STEPS[step];
    let dots: String = (0..ONBOARDING_STEPS.len())
        .map(|idx| if idx == step { '●' } else { '○' })
        .collect();
    let next = if step + 1 == ONBOARDING_STEPS.len() { "Get Started" } else { "Next" };
    let lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(palette.accent).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(description),
        Line::from(""),
        Line::from(Span::styled(dots, Style::default().fg(palette.accent_alt))),
        Line::from(Span::styled(
            format!("← back   Enter {next}   Esc skip"),
            Style::default().fg(palette.muted),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(panel_block("Welcome", palette)),
        area,
    );
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
