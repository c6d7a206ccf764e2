// Per-player feature aggregation.
//
// Reduces a player's match rows to one statistics record: sums, means, and
// ratios. Pure function of its input. Every ratio defaults to 0 when its
// denominator is 0, so downstream consumers never see NaN.

use crate::dataset::MatchRow;

// ---------------------------------------------------------------------------
// Player statistics
// ---------------------------------------------------------------------------

/// Aggregate statistics over one player's match rows.
///
/// Created fresh per analysis request and never persisted. The all-zero
/// record (from `Default`) is the canonical result for an empty row set.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerStats {
    pub total_matches: usize,
    /// Win count. Fractional in the placement schema (sum of placement
    /// fractions), integral in the flag schema.
    pub wins: f64,
    /// Win percentage in [0, 100].
    pub win_rate: f64,
    pub kills: u64,
    pub kills_per_match: f64,
    /// Derived as total_matches - wins.
    pub deaths: f64,
    /// kills / deaths, or kills when deaths <= 0.
    pub kd_ratio: f64,
    pub avg_damage: f64,
    pub avg_walk_distance: f64,
    pub avg_ride_distance: f64,
    pub avg_swim_distance: f64,
    pub headshot_kills: u64,
    /// headshot_kills / kills, or 0 when kills = 0.
    pub headshot_ratio: f64,
    pub longest_kill: f64,
    /// Mean weapons acquired per match.
    pub weapons_acquired: f64,
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Aggregate a player's match rows into a statistics record.
///
/// An empty input returns the all-zero record. Rows whose win indicator is
/// absent contribute nothing to the win count, so a dataset without a win
/// column yields win_rate = 0.
pub fn aggregate(rows: &[MatchRow]) -> PlayerStats {
    let total_matches = rows.len();
    if total_matches == 0 {
        return PlayerStats::default();
    }
    let n = total_matches as f64;

    let kills: u64 = rows.iter().map(|r| r.kills as u64).sum();
    let headshot_kills: u64 = rows.iter().map(|r| r.headshot_kills as u64).sum();

    let wins: f64 = rows
        .iter()
        .filter_map(|r| r.win.as_ref())
        .map(|w| w.win_value())
        .sum();
    let win_rate = wins / n * 100.0;

    let avg_damage = rows.iter().map(|r| r.damage_dealt).sum::<f64>() / n;
    let avg_walk_distance = rows.iter().map(|r| r.walk_distance).sum::<f64>() / n;
    let avg_ride_distance = rows.iter().map(|r| r.ride_distance).sum::<f64>() / n;
    let avg_swim_distance = rows.iter().map(|r| r.swim_distance).sum::<f64>() / n;
    let weapons_acquired = rows.iter().map(|r| r.weapons_acquired as f64).sum::<f64>() / n;

    let longest_kill = rows.iter().map(|r| r.longest_kill).fold(0.0, f64::max);

    let deaths = n - wins;
    let kd_ratio = if deaths > 0.0 {
        kills as f64 / deaths
    } else {
        kills as f64
    };

    let headshot_ratio = if kills > 0 {
        headshot_kills as f64 / kills as f64
    } else {
        0.0
    };

    PlayerStats {
        total_matches,
        wins,
        win_rate,
        kills,
        kills_per_match: kills as f64 / n,
        deaths,
        kd_ratio,
        avg_damage,
        avg_walk_distance,
        avg_ride_distance,
        avg_swim_distance,
        headshot_kills,
        headshot_ratio,
        longest_kill,
        weapons_acquired,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
