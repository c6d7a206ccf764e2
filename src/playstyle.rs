// Playstyle classification from aggregated player statistics.
//
// Accumulates an integer aggression score from independent threshold checks
// and maps the total to one of four labels. Deterministic and total: every
// statistics record maps to exactly one label.

use crate::stats::PlayerStats;

// ---------------------------------------------------------------------------
// Scoring thresholds
// ---------------------------------------------------------------------------

/// Kills per match above this earns +2.
pub const KILLS_PER_MATCH_HOT: f64 = 3.0;
/// Kills per match above this (but not hot) earns +1.
pub const KILLS_PER_MATCH_WARM: f64 = 1.0;

/// Average damage above this earns +2.
pub const AVG_DAMAGE_HOT: f64 = 300.0;
/// Average damage above this (but not hot) earns +1.
pub const AVG_DAMAGE_WARM: f64 = 150.0;

/// Headshot ratio above this earns +1.
pub const HEADSHOT_RATIO_SHARP: f64 = 0.3;

/// Average walk distance (meters) above this earns +1.
pub const WALK_DISTANCE_ACTIVE: f64 = 2500.0;

/// Minimum score for each label tier.
pub const VERY_AGGRESSIVE_SCORE: u32 = 4;
pub const AGGRESSIVE_SCORE: u32 = 2;
pub const BALANCED_SCORE: u32 = 1;

// ---------------------------------------------------------------------------
// Playstyle label
// ---------------------------------------------------------------------------

/// Categorical aggression label derived from player statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Playstyle {
    Passive,
    Balanced,
    Aggressive,
    VeryAggressive,
}

impl Playstyle {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Playstyle::VeryAggressive => "Very Aggressive",
            Playstyle::Aggressive => "Aggressive",
            Playstyle::Balanced => "Balanced",
            Playstyle::Passive => "Passive",
        }
    }

    /// Whether this label sits on the aggressive side of the spectrum.
    pub fn is_aggressive(&self) -> bool {
        matches!(self, Playstyle::VeryAggressive | Playstyle::Aggressive)
    }

    /// Map an aggression score to its label tier.
    pub fn from_score(score: u32) -> Self {
        if score >= VERY_AGGRESSIVE_SCORE {
            Playstyle::VeryAggressive
        } else if score >= AGGRESSIVE_SCORE {
            Playstyle::Aggressive
        } else if score >= BALANCED_SCORE {
            Playstyle::Balanced
        } else {
            Playstyle::Passive
        }
    }
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Compute the aggression score for a statistics record.
///
/// Each check contributes independently; the maximum possible score is 6.
pub fn aggression_score(stats: &PlayerStats) -> u32 {
    let mut score = 0;

    if stats.kills_per_match > KILLS_PER_MATCH_HOT {
        score += 2;
    } else if stats.kills_per_match > KILLS_PER_MATCH_WARM {
        score += 1;
    }

    if stats.avg_damage > AVG_DAMAGE_HOT {
        score += 2;
    } else if stats.avg_damage > AVG_DAMAGE_WARM {
        score += 1;
    }

    if stats.headshot_ratio > HEADSHOT_RATIO_SHARP {
        score += 1;
    }

    if stats.avg_walk_distance > WALK_DISTANCE_ACTIVE {
        score += 1;
    }

    score
}

/// Classify a statistics record into a playstyle label.
pub fn classify(stats: &PlayerStats) -> Playstyle {
    Playstyle::from_score(aggression_score(stats))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
