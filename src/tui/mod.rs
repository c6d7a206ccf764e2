// TUI dashboard: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the application
// state. The app orchestrator pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.

pub mod layout;

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{LlmStatus, PlayerReport, UiUpdate, UserCommand};

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

/// Which tab is active in the main panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Weapons,
    Landing,
    Coach,
}

impl TabId {
    pub fn title(&self) -> &'static str {
        match self {
            TabId::Weapons => "Weapons",
            TabId::Landing => "Landing & Tactics",
            TabId::Coach => "AI Coach",
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
pub struct ViewState {
    /// Player ids in dataset order.
    pub players: Vec<String>,
    /// Index of the selected player.
    pub selected: usize,
    /// Latest analysis report for the selected player.
    pub report: Option<PlayerReport>,
    /// Accumulated coach text (streamed tokens plus section headers).
    pub coach_text: String,
    /// Status of the coach stream.
    pub coach_status: LlmStatus,
    /// Active tab in the main panel.
    pub active_tab: TabId,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            players: Vec::new(),
            selected: 0,
            report: None,
            coach_text: String::new(),
            coach_status: LlmStatus::Idle,
            active_tab: TabId::Weapons,
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::PlayerList { players, selected } => {
            state.players = players;
            state.selected = selected;
        }
        UiUpdate::ReportUpdate(report) => {
            state.report = Some(*report);
            // A new analysis clears any previous coach output.
            state.coach_text.clear();
            state.coach_status = LlmStatus::Idle;
        }
        UiUpdate::CoachSectionStart { index, title } => {
            if index > 0 {
                state.coach_text.push_str("\n\n");
            }
            state.coach_text.push_str(&format!("== {title} ==\n"));
            state.coach_status = LlmStatus::Streaming;
            state.active_tab = TabId::Coach;
        }
        UiUpdate::CoachToken(token) => {
            state.coach_text.push_str(&token);
            state.coach_status = LlmStatus::Streaming;
        }
        UiUpdate::CoachSectionComplete { .. } => {
            // Text is already accumulated; nothing to do per section.
        }
        UiUpdate::CoachComplete => {
            state.coach_status = LlmStatus::Complete;
        }
        UiUpdate::CoachFallback(advice) => {
            state.coach_text = advice;
            state.coach_status = LlmStatus::Fallback;
            state.active_tab = TabId::Coach;
        }
        UiUpdate::CoachError(message) => {
            state.coach_text = format!("Coach unavailable: {message}");
            state.coach_status = LlmStatus::Error;
            state.active_tab = TabId::Coach;
        }
    }
}

// ---------------------------------------------------------------------------
// Key handling
// ---------------------------------------------------------------------------

/// Translate a key press into a user command, updating local tab state.
/// Returns the command to send, if any.
fn handle_key(key: KeyEvent, state: &mut ViewState) -> Option<UserCommand> {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('q') => Some(UserCommand::Quit),
        KeyCode::Left | KeyCode::Char('h') => {
            Some(UserCommand::SelectPlayer(state.selected.saturating_sub(1)))
        }
        KeyCode::Right | KeyCode::Char('l') => Some(UserCommand::SelectPlayer(
            state.selected.saturating_add(1),
        )),
        KeyCode::Char('c') => Some(UserCommand::RequestCoaching),
        KeyCode::Char('1') => {
            state.active_tab = TabId::Weapons;
            None
        }
        KeyCode::Char('2') => {
            state.active_tab = TabId::Landing;
            None
        }
        KeyCode::Char('3') => {
            state.active_tab = TabId::Coach;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, state);
    render_player_strip(frame, &layout, state);
    render_stats(frame, &layout, state);
    render_verdict(frame, &layout, state);
    render_main_panel(frame, &layout, state);
    render_help_bar(frame, &layout);
}

fn coach_status_str(status: LlmStatus) -> &'static str {
    match status {
        LlmStatus::Idle => "idle",
        LlmStatus::Streaming => "streaming",
        LlmStatus::Complete => "complete",
        LlmStatus::Fallback => "offline advice",
        LlmStatus::Error => "error",
    }
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = format!(
        " dropcoach | {} players | coach: {}",
        state.players.len(),
        coach_status_str(state.coach_status),
    );
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

fn render_player_strip(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let mut spans: Vec<Span> = Vec::new();
    for (i, id) in state.players.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        let style = if i == state.selected {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(id.clone(), style));
    }
    if spans.is_empty() {
        spans.push(Span::raw("no players loaded"));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Players"));
    frame.render_widget(paragraph, layout.player_strip);
}

fn render_stats(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let content = match &state.report {
        Some(report) => {
            let s = &report.stats;
            vec![
                Line::from(format!("Matches        {}", s.total_matches)),
                Line::from(format!("Win rate       {:.2}%", s.win_rate)),
                Line::from(format!("Kills          {} ({:.2}/match)", s.kills, s.kills_per_match)),
                Line::from(format!("K/D            {:.2}", s.kd_ratio)),
                Line::from(format!("Avg damage     {:.1}", s.avg_damage)),
                Line::from(format!("Headshots      {} ({:.1}%)", s.headshot_kills, s.headshot_ratio * 100.0)),
                Line::from(format!("Longest kill   {:.1}m", s.longest_kill)),
                Line::from(format!("Walk / match   {:.0}m", s.avg_walk_distance)),
                Line::from(format!("Ride / match   {:.0}m", s.avg_ride_distance)),
                Line::from(format!("Swim / match   {:.0}m", s.avg_swim_distance)),
                Line::from(format!("Weapons/match  {:.1}", s.weapons_acquired)),
            ]
        }
        None => vec![Line::from("No player selected.")],
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Statistics"));
    frame.render_widget(paragraph, layout.stats);
}

fn render_verdict(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let content = match &state.report {
        Some(report) => vec![
            Line::from(vec![
                Span::raw("Playstyle: "),
                Span::styled(
                    report.playstyle.label(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(format!("Aggression score: {}", report.aggression_score)),
            Line::from(format!("Win probability: {:.1}%", report.win_probability)),
            Line::from(format!(
                "Landing plan: {}",
                report.suggestions.drop_kind.label()
            )),
        ],
        None => vec![Line::from("--")],
    };

    let paragraph = Paragraph::new(content)
        .block(Block::default().borders(Borders::ALL).title("Verdict"));
    frame.render_widget(paragraph, layout.verdict);
}

fn suggestion_lines(title: &str, entries: &[&str]) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for entry in entries {
        lines.push(Line::from(format!("  - {entry}")));
    }
    lines.push(Line::from(""));
    lines
}

fn render_main_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let title = state.active_tab.title();

    let content: Vec<Line> = match (&state.report, state.active_tab) {
        (Some(report), TabId::Weapons) => {
            let mut lines = Vec::new();
            lines.extend(suggestion_lines("Sniper rifles", report.suggestions.sniper));
            lines.extend(suggestion_lines("Assault rifles", report.suggestions.assault));
            lines.extend(suggestion_lines("Close range", report.suggestions.close_range));
            lines
        }
        (Some(report), TabId::Landing) => {
            let mut lines = Vec::new();
            lines.extend(suggestion_lines(
                report.suggestions.drop_kind.label(),
                report.suggestions.landing,
            ));
            lines.extend(suggestion_lines("Tactics", report.suggestions.tactics));
            lines
        }
        (_, TabId::Coach) => {
            if state.coach_text.is_empty() {
                let placeholder = match state.coach_status {
                    LlmStatus::Idle => "Press 'c' to request a coaching report.",
                    LlmStatus::Streaming => "Streaming...",
                    LlmStatus::Complete => "Coaching report complete (empty).",
                    LlmStatus::Fallback => "Offline advice unavailable.",
                    LlmStatus::Error => "Coach error.",
                };
                vec![Line::from(placeholder)]
            } else {
                state.coach_text.lines().map(|l| Line::from(l.to_string())).collect()
            }
        }
        (None, _) => vec![Line::from("No analysis yet.")],
    };

    let paragraph = Paragraph::new(content)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, layout.main_panel);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout) {
    let text = " q:Quit | \u{2190}/\u{2192}:Player | 1-3:Tabs | c:Coach";
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default().fg(Color::White).add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal on panic; chain the original hook after ours.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            // UI updates from the app orchestrator
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => {
                        apply_ui_update(&mut view_state, ui_update);
                    }
                    None => {
                        // Channel closed: app is shutting down
                        break;
                    }
                }
            }

            // Keyboard input
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(command) = handle_key(key_event, &mut view_state) {
                            let quit = command == UserCommand::Quit;
                            let _ = cmd_tx.send(command).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse events, resize events, etc. -- ignore
                    }
                    Some(Err(_)) | None => {
                        break;
                    }
                }
            }

            // Render tick
            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
