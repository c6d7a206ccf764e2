// Shared message types between the app orchestrator, the LLM client, and
// the TUI render loop.

use crate::playstyle::Playstyle;
use crate::stats::PlayerStats;
use crate::suggest::SuggestionSet;

// ---------------------------------------------------------------------------
// Analysis report
// ---------------------------------------------------------------------------

/// The full analysis for one player, ready for presentation. The display
/// layer consumes these fields independently; nothing here is coupled to a
/// particular rendering technology.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerReport {
    pub player: String,
    pub stats: PlayerStats,
    pub playstyle: Playstyle,
    pub aggression_score: u32,
    /// Heuristic percentage in [0, 100], one decimal.
    pub win_probability: f64,
    pub suggestions: SuggestionSet,
}

/// The coaching report returned by the LLM collaborator: an ordered list of
/// text sections, one per requested task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoachReport {
    pub sections: Vec<String>,
}

// ---------------------------------------------------------------------------
// LLM events
// ---------------------------------------------------------------------------

/// Events emitted by the streaming LLM client.
///
/// The `generation` counter is threaded through every event so the consumer
/// can discard stale events from superseded requests.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    Token {
        text: String,
        generation: u64,
    },
    Complete {
        full_text: String,
        input_tokens: u32,
        output_tokens: u32,
        generation: u64,
    },
    Error {
        message: String,
        generation: u64,
    },
}

/// Where an LLM stream currently stands, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmStatus {
    Idle,
    Streaming,
    Complete,
    /// Canned advice substituted after a failed call.
    Fallback,
    Error,
}

// ---------------------------------------------------------------------------
// UI updates
// ---------------------------------------------------------------------------

/// Incremental updates pushed from the app orchestrator to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    /// Player ids in dataset order plus the selected index.
    PlayerList {
        players: Vec<String>,
        selected: usize,
    },
    /// A freshly computed analysis for the selected player.
    ReportUpdate(Box<PlayerReport>),
    /// A coach section started streaming.
    CoachSectionStart { index: usize, title: String },
    /// One streamed token of coach text.
    CoachToken(String),
    /// The in-flight coach section finished.
    CoachSectionComplete { index: usize },
    /// All requested coach sections finished.
    CoachComplete,
    /// The LLM call failed and canned advice was substituted.
    CoachFallback(String),
    /// The LLM call failed and the error is surfaced.
    CoachError(String),
}

// ---------------------------------------------------------------------------
// User commands
// ---------------------------------------------------------------------------

/// Commands sent from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    Quit,
    /// Select a player by index into the dataset's player list.
    SelectPlayer(usize),
    /// Ask the LLM for a coaching report on the selected player.
    RequestCoaching,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coach_report_default_is_empty() {
        let report = CoachReport::default();
        assert!(report.sections.is_empty());
    }

    #[test]
    fn llm_events_carry_generation() {
        let event = LlmEvent::Token {
            text: "hi".into(),
            generation: 3,
        };
        match event {
            LlmEvent::Token { generation, .. } => assert_eq!(generation, 3),
            _ => unreachable!(),
        }
    }
}
