// Heuristic win-probability estimate.
//
// A closed-form weighted sum over four per-match inputs. Each factor is
// capped independently so no single stat can dominate, then the total is
// clamped to [0, 100] and rounded to one decimal place. This is a display
// heuristic, entirely separate from the trained win classifier.

// ---------------------------------------------------------------------------
// Factor weights and caps
// ---------------------------------------------------------------------------

/// Points per kill.
pub const KILL_WEIGHT: f64 = 4.0;
/// Maximum contribution from kills.
pub const KILL_CAP: f64 = 40.0;

/// Damage points divisor (1 point per 40 damage).
pub const DAMAGE_DIVISOR: f64 = 40.0;
/// Maximum contribution from damage.
pub const DAMAGE_CAP: f64 = 25.0;

/// Walk-distance divisor (1 point per 150 meters).
pub const MOVE_DIVISOR: f64 = 150.0;
/// Maximum contribution from movement.
pub const MOVE_CAP: f64 = 20.0;

/// Points per weapon acquired.
pub const WEAPON_WEIGHT: f64 = 3.0;
/// Maximum contribution from weapons.
pub const WEAPON_CAP: f64 = 15.0;

// ---------------------------------------------------------------------------
// Estimator
// ---------------------------------------------------------------------------

/// Estimate a win probability percentage from four non-negative inputs.
///
/// Returns a value in [0.0, 100.0] rounded to one decimal place. Inputs are
/// assumed non-negative; they are not validated.
pub fn estimate_win_probability(
    kills: f64,
    damage: f64,
    walk_distance: f64,
    weapons: f64,
) -> f64 {
    let kill_factor = (kills * KILL_WEIGHT).min(KILL_CAP);
    let damage_factor = (damage / DAMAGE_DIVISOR).min(DAMAGE_CAP);
    let move_factor = (walk_distance / MOVE_DIVISOR).min(MOVE_CAP);
    let weapon_factor = (weapons * WEAPON_WEIGHT).min(WEAPON_CAP);

    let total = (kill_factor + damage_factor + move_factor + weapon_factor).clamp(0.0, 100.0);
    (total * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
