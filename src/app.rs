// Application state and orchestration logic.
//
// The central event loop that coordinates user commands from the TUI and
// streaming events from the LLM client. Runs the analysis pipeline for the
// selected player and pushes UI updates to the TUI render loop.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::config::{Config, FallbackPolicy};
use crate::dataset::{Dataset, PlayerRows};
use crate::llm::client::LlmClient;
use crate::llm::prompt;
use crate::playstyle;
use crate::protocol::{CoachReport, LlmEvent, PlayerReport, UiUpdate, UserCommand};
use crate::stats;
use crate::suggest;
use crate::winprob;

// ---------------------------------------------------------------------------
// Analysis pipeline
// ---------------------------------------------------------------------------

/// Run the full analysis pipeline for one player's rows.
///
/// Pure: aggregation, classification, win-probability estimate, and
/// suggestion selection, bundled into one report. The estimator is fed
/// per-match figures so its factors keep their single-match scale.
pub fn build_report(player_id: &str, player_rows: &PlayerRows) -> PlayerReport {
    let stats = stats::aggregate(&player_rows.rows);
    let playstyle = playstyle::classify(&stats);
    let aggression_score = playstyle::aggression_score(&stats);
    let win_probability = winprob::estimate_win_probability(
        stats.kills_per_match,
        stats.avg_damage,
        stats.avg_walk_distance,
        stats.weapons_acquired,
    );
    let suggestions = suggest::build_suggestions(&stats, playstyle);

    PlayerReport {
        player: player_id.to_string(),
        stats,
        playstyle,
        aggression_score,
        win_probability,
        suggestions,
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// One queued LLM task: section title plus its user prompt.
#[derive(Debug, Clone)]
struct CoachTask {
    title: String,
    prompt: String,
}

/// Complete application state owned by the orchestrator loop.
pub struct AppState {
    pub config: Config,
    pub dataset: Dataset,
    pub selected: usize,
    pub report: Option<PlayerReport>,
    /// Ordered coach-report sections collected so far for this request.
    pub coach: CoachReport,
    llm: Arc<LlmClient>,
    llm_tx: mpsc::Sender<LlmEvent>,
    /// Bumped whenever a new request supersedes in-flight LLM streams.
    generation: u64,
    tasks: Vec<CoachTask>,
    next_task: usize,
}

impl AppState {
    pub fn new(
        config: Config,
        dataset: Dataset,
        llm: LlmClient,
        llm_tx: mpsc::Sender<LlmEvent>,
    ) -> Self {
        AppState {
            config,
            dataset,
            selected: 0,
            report: None,
            coach: CoachReport::default(),
            llm: Arc::new(llm),
            llm_tx,
            generation: 0,
            tasks: Vec::new(),
            next_task: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn player_ids(&self) -> Vec<String> {
        self.dataset.players.iter().map(|p| p.id.clone()).collect()
    }

    /// Recompute the report for the player at `index` (clamped) and discard
    /// any in-flight coaching stream.
    fn select_player(&mut self, index: usize) {
        if self.dataset.players.is_empty() {
            return;
        }
        self.selected = index.min(self.dataset.players.len() - 1);
        self.generation += 1;
        self.tasks.clear();
        self.next_task = 0;
        self.coach = CoachReport::default();

        let player = &self.dataset.players[self.selected];
        self.report = Some(build_report(&player.id, player));
    }

    /// Queue the two coach tasks for the current report and start the first.
    /// Returns the title of the first section, or None without a report.
    fn begin_coaching(&mut self) -> Option<String> {
        let report = self.report.as_ref()?;

        self.generation += 1;
        self.coach = CoachReport::default();
        self.next_task = 0;
        self.tasks = vec![
            CoachTask {
                title: prompt::SECTION_TITLES[0].to_string(),
                prompt: prompt::build_analysis_prompt(&report.stats, report.playstyle),
            },
            CoachTask {
                title: prompt::SECTION_TITLES[1].to_string(),
                prompt: prompt::build_coaching_prompt(
                    &report.stats,
                    report.playstyle,
                    report.win_probability,
                ),
            },
        ];

        self.spawn_current_task();
        Some(self.tasks[0].title.clone())
    }

    /// Spawn the streaming call for the task at `next_task`.
    fn spawn_current_task(&self) {
        let Some(task) = self.tasks.get(self.next_task) else {
            return;
        };
        let llm = Arc::clone(&self.llm);
        let tx = self.llm_tx.clone();
        let system = prompt::system_prompt();
        let user_content = task.prompt.clone();
        let max_tokens = self.config.llm.max_tokens;
        let generation = self.generation;

        tokio::spawn(async move {
            if let Err(e) = llm
                .stream_message(&system, &user_content, max_tokens, tx, generation)
                .await
            {
                warn!("LLM task failed to run: {e}");
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Command and event handling
// ---------------------------------------------------------------------------

/// Apply a user command. Returns true when the app should shut down.
pub async fn handle_command(
    state: &mut AppState,
    command: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) -> bool {
    match command {
        UserCommand::Quit => {
            info!("quit requested");
            return true;
        }
        UserCommand::SelectPlayer(index) => {
            state.select_player(index);
            let _ = ui_tx
                .send(UiUpdate::PlayerList {
                    players: state.player_ids(),
                    selected: state.selected,
                })
                .await;
            if let Some(report) = &state.report {
                let _ = ui_tx
                    .send(UiUpdate::ReportUpdate(Box::new(report.clone())))
                    .await;
            }
        }
        UserCommand::RequestCoaching => {
            if let Some(title) = state.begin_coaching() {
                let _ = ui_tx
                    .send(UiUpdate::CoachSectionStart { index: 0, title })
                    .await;
            } else {
                debug!("coaching requested with no report; ignoring");
            }
        }
    }
    false
}

/// Apply a streaming LLM event. Stale generations are discarded.
pub async fn handle_llm_event(
    state: &mut AppState,
    event: LlmEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        LlmEvent::Token { text, generation } => {
            if generation != state.generation {
                debug!("discarding stale token (gen {generation})");
                return;
            }
            let _ = ui_tx.send(UiUpdate::CoachToken(text)).await;
        }
        LlmEvent::Complete {
            full_text,
            input_tokens,
            output_tokens,
            generation,
        } => {
            if generation != state.generation {
                debug!("discarding stale completion (gen {generation})");
                return;
            }
            info!(input_tokens, output_tokens, "coach section complete");
            state.coach.sections.push(full_text);
            let finished = state.next_task;
            let _ = ui_tx
                .send(UiUpdate::CoachSectionComplete { index: finished })
                .await;

            state.next_task += 1;
            if state.next_task < state.tasks.len() {
                state.spawn_current_task();
                let title = state.tasks[state.next_task].title.clone();
                let _ = ui_tx
                    .send(UiUpdate::CoachSectionStart {
                        index: state.next_task,
                        title,
                    })
                    .await;
            } else {
                let _ = ui_tx.send(UiUpdate::CoachComplete).await;
            }
        }
        LlmEvent::Error {
            message,
            generation,
        } => {
            if generation != state.generation {
                debug!("discarding stale error (gen {generation})");
                return;
            }
            warn!("LLM request failed: {message}");
            state.tasks.clear();
            state.next_task = 0;

            match state.config.llm.fallback {
                FallbackPolicy::Canned => {
                    let advice = state
                        .report
                        .as_ref()
                        .map(|r| prompt::canned_advice(&r.stats))
                        .unwrap_or_else(|| "No analysis available.".to_string());
                    let _ = ui_tx.send(UiUpdate::CoachFallback(advice)).await;
                }
                FallbackPolicy::Error => {
                    let _ = ui_tx.send(UiUpdate::CoachError(message)).await;
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main loop
// ---------------------------------------------------------------------------

/// Run the orchestrator loop until the TUI requests shutdown.
pub async fn run(
    mut llm_rx: mpsc::Receiver<LlmEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    // Initial selection so the dashboard has content before any input.
    handle_command(&mut state, UserCommand::SelectPlayer(0), &ui_tx).await;

    loop {
        tokio::select! {
            command = cmd_rx.recv() => {
                match command {
                    Some(cmd) => {
                        if handle_command(&mut state, cmd, &ui_tx).await {
                            break;
                        }
                    }
                    None => break, // TUI dropped its sender: shutting down
                }
            }
            event = llm_rx.recv() => {
                match event {
                    Some(ev) => handle_llm_event(&mut state, ev, &ui_tx).await,
                    None => break,
                }
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
