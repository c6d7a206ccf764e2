// Static suggestion tables keyed by playstyle and stat thresholds.
//
// Table-driven selection, not generated text: each category picks one of a
// few fixed candidate lists. Every selector is an exhaustive match over the
// playstyle enum so no label ever falls into an implicit bucket.

use crate::playstyle::{Playstyle, HEADSHOT_RATIO_SHARP};
use crate::stats::PlayerStats;

// ---------------------------------------------------------------------------
// Weapon tables
// ---------------------------------------------------------------------------

pub const SNIPER_PRECISION: &[&str] = &[
    "Kar98k - your headshot accuracy will make every shot count",
    "M24 - rewards precise aim with one-tap knockdowns at range",
    "AWM - always grab it from a care package if you find one",
];

pub const SNIPER_SEMI_AUTO: &[&str] = &[
    "SKS - semi-automatic marksman rifle, forgiving of imperfect aim",
    "Mini14 - fast follow-up shots, a good way to build headshot accuracy",
];

pub const ASSAULT_HIGH_DAMAGE: &[&str] = &[
    "M416 - high damage with manageable recoil",
    "Beryl M762 - huge damage potential if you can hold the spray",
    "AKM - hits hard, suits a fight-first playstyle",
];

pub const ASSAULT_LOW_RECOIL: &[&str] = &[
    "SCAR-L - easy to control, lets you land more of your shots",
    "G36C - low recoil, ideal for mid-range engagements",
    "QBZ - balanced performance for a measured playstyle",
];

pub const CLOSE_RANGE_FAST_TTK: &[&str] = &[
    "Vector - fastest time-to-kill up close, made for pushing",
    "Tommy Gun - big magazine, good for clearing buildings",
];

pub const CLOSE_RANGE_MOBILE: &[&str] = &[
    "UMP45 - stays effective while you are on the move",
    "Uzi - extremely fast up close, for players who take fights",
];

pub const CLOSE_RANGE_DEFENSIVE: &[&str] = &[
    "S12K - strong in building fights",
    "S686 - massive burst damage, good for holding a position",
];

// ---------------------------------------------------------------------------
// Landing tables
// ---------------------------------------------------------------------------

pub const HOT_DROPS: &[&str] = &[
    "Pochinki - dense player traffic, ideal for early fights",
    "School/Apartments - fast loot and immediate contact",
    "Bootcamp (Sanhok) - high risk, high reward",
    "Hacienda (Miramar) - quality loot and early fights",
];

pub const MEDIUM_DROPS: &[&str] = &[
    "Rozhok - moderate contact, good loot",
    "Yasnaya Polyana - wide area, many buildings, mid-level contact",
    "Paradise Resort (Sanhok) - medium-high risk, good loot",
    "Los Leones (Miramar) - big city with varied engagement options",
];

pub const SAFE_DROPS: &[&str] = &[
    "Gatka - decent loot, fewer players",
    "Zharki - remote spot, a quiet start",
    "Kampong (Sanhok) - balanced loot and little early contact",
    "Monte Nuevo (Miramar) - calm area, safe opening",
];

// ---------------------------------------------------------------------------
// Tactics tables
// ---------------------------------------------------------------------------

pub const TACTICS_ENGAGE: &[&str] = &[
    "Take early fights and clear your area",
    "Move toward gunfire instead of away from it",
    "Chase airdrops",
    "Use vehicles aggressively to push compounds",
];

pub const TACTICS_SURVIVE: &[&str] = &[
    "Loot quiet areas first",
    "Rotate along the circle edge",
    "Take a strong position and hold it",
    "Avoid fights and play for the final circles",
];

// ---------------------------------------------------------------------------
// Drop kind
// ---------------------------------------------------------------------------

/// Landing-zone risk category selected for the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropKind {
    Hot,
    Medium,
    Safe,
}

impl DropKind {
    pub fn label(&self) -> &'static str {
        match self {
            DropKind::Hot => "Hot drop (high risk, high reward)",
            DropKind::Medium => "Medium-density drop",
            DropKind::Safe => "Safe drop",
        }
    }
}

// ---------------------------------------------------------------------------
// Suggestion set
// ---------------------------------------------------------------------------

/// Advisory string lists selected for one player, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionSet {
    pub sniper: &'static [&'static str],
    pub assault: &'static [&'static str],
    pub close_range: &'static [&'static str],
    pub drop_kind: DropKind,
    pub landing: &'static [&'static str],
    pub tactics: &'static [&'static str],
}

/// Select the suggestion lists for a statistics record and playstyle.
pub fn build_suggestions(stats: &PlayerStats, playstyle: Playstyle) -> SuggestionSet {
    let sniper = if stats.headshot_ratio > HEADSHOT_RATIO_SHARP {
        SNIPER_PRECISION
    } else {
        SNIPER_SEMI_AUTO
    };

    let assault = match playstyle {
        Playstyle::VeryAggressive | Playstyle::Aggressive => ASSAULT_HIGH_DAMAGE,
        Playstyle::Balanced => ASSAULT_LOW_RECOIL,
        Playstyle::Passive => ASSAULT_LOW_RECOIL,
    };

    let close_range = match playstyle {
        Playstyle::VeryAggressive => CLOSE_RANGE_FAST_TTK,
        Playstyle::Aggressive => CLOSE_RANGE_MOBILE,
        Playstyle::Balanced => CLOSE_RANGE_DEFENSIVE,
        Playstyle::Passive => CLOSE_RANGE_DEFENSIVE,
    };

    let (drop_kind, landing) = match playstyle {
        Playstyle::VeryAggressive => (DropKind::Hot, HOT_DROPS),
        Playstyle::Aggressive => (DropKind::Medium, MEDIUM_DROPS),
        Playstyle::Balanced => (DropKind::Safe, SAFE_DROPS),
        Playstyle::Passive => (DropKind::Safe, SAFE_DROPS),
    };

    let tactics = match playstyle {
        Playstyle::VeryAggressive | Playstyle::Aggressive => TACTICS_ENGAGE,
        Playstyle::Balanced => TACTICS_SURVIVE,
        Playstyle::Passive => TACTICS_SURVIVE,
    };

    SuggestionSet {
        sniper,
        assault,
        close_range,
        drop_kind,
        landing,
        tactics,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
