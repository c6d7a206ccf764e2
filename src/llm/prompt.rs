// Prompt templates for the analysis and coaching tasks, plus the canned
// fallback advice used when the LLM is unavailable.
//
// Prompts carry pre-computed numbers so the model focuses on strategy
// rather than arithmetic. The coaching report is always two ordered
// sections: statistical analysis first, then coaching advice.

use crate::playstyle::Playstyle;
use crate::stats::PlayerStats;

// ---------------------------------------------------------------------------
// Section titles
// ---------------------------------------------------------------------------

/// Ordered titles of the coach-report sections, one per LLM task.
pub const SECTION_TITLES: &[&str] = &["Analysis", "Coaching"];

// ---------------------------------------------------------------------------
// System prompt
// ---------------------------------------------------------------------------

/// Return the static system prompt shared by all coaching LLM calls.
pub fn system_prompt() -> String {
    "You are a professional battle-royale coach with thousands of hours of play \
     and a data-science background.\n\
     \n\
     You will receive a player's aggregated match statistics, a playstyle label \
     derived from them, and a heuristic win-probability estimate.\n\
     \n\
     Rules:\n\
     - Use the pre-computed numbers you are given. Do NOT redo arithmetic.\n\
     - Be concrete: name weapons, landing zones, and specific habits to change.\n\
     - Be concise and direct. No preamble, no closing pleasantries."
        .to_string()
}

// ---------------------------------------------------------------------------
// Task prompts
// ---------------------------------------------------------------------------

/// Build the statistical-analysis task prompt.
pub fn build_analysis_prompt(stats: &PlayerStats, playstyle: Playstyle) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("## PLAYER RECORD\n");
    prompt.push_str(&format!(
        "Matches: {} | Win rate: {:.2}% | K/D: {:.2}\n",
        stats.total_matches, stats.win_rate, stats.kd_ratio,
    ));
    prompt.push_str(&format!(
        "Kills: {} ({:.2} per match) | Avg damage: {:.2}\n",
        stats.kills, stats.kills_per_match, stats.avg_damage,
    ));
    prompt.push_str(&format!(
        "Headshot ratio: {:.1}% | Longest kill: {:.1}m\n",
        stats.headshot_ratio * 100.0,
        stats.longest_kill,
    ));
    prompt.push_str(&format!(
        "Avg distance per match: walk {:.0}m, ride {:.0}m, swim {:.0}m\n",
        stats.avg_walk_distance, stats.avg_ride_distance, stats.avg_swim_distance,
    ));
    prompt.push_str(&format!("Playstyle: {}\n\n", playstyle.label()));

    prompt.push_str(
        "## TASK\n\
         Analyze this record: what the win rate, K/D, and other key numbers say \
         about the player's strengths and weaknesses. 3-5 sentences.",
    );

    prompt
}

/// Build the coaching task prompt.
///
/// Substitutes the named statistics the coaching template expects: kills,
/// damage, walk_distance, weapons, and the win-probability estimate.
pub fn build_coaching_prompt(stats: &PlayerStats, playstyle: Playstyle, win_prob: f64) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str("## PLAYER PROFILE\n");
    prompt.push_str(&format!("Kills per match: {:.2}\n", stats.kills_per_match));
    prompt.push_str(&format!("Damage per match: {:.2}\n", stats.avg_damage));
    prompt.push_str(&format!(
        "Walk distance per match: {:.0}m\n",
        stats.avg_walk_distance
    ));
    prompt.push_str(&format!(
        "Weapons per match: {:.1}\n",
        stats.weapons_acquired
    ));
    prompt.push_str(&format!("Estimated win probability: {win_prob:.1}%\n"));
    prompt.push_str(&format!("Playstyle: {}\n\n", playstyle.label()));

    prompt.push_str(
        "## TASK\n\
         Give at least 3 detailed recommendations tailored to this profile:\n\
         - combat technique\n\
         - loot planning\n\
         - survival and team play",
    );

    prompt
}

// ---------------------------------------------------------------------------
// Canned fallback advice
// ---------------------------------------------------------------------------

/// Threshold-ladder advice generated locally when the LLM is unavailable.
///
/// Works from career totals: total kills, total damage and walk distance
/// across matches, and mean weapons per match.
pub fn canned_advice(stats: &PlayerStats) -> String {
    let n = stats.total_matches as f64;
    let kills = stats.kills as f64;
    let damage = stats.avg_damage * n;
    let walk_distance = stats.avg_walk_distance * n;
    let weapons = stats.weapons_acquired;

    let mut feedback = String::from("Coach notes (offline):\n");

    if kills >= 10.0 {
        feedback.push_str("- Your kill count is excellent; the aggressive approach is working.\n");
    } else if kills >= 5.0 {
        feedback
            .push_str("- Solid combat record, but there is room to take a few more fights.\n");
    } else {
        feedback.push_str("- Kill count is low; commit to more engagements to build confidence.\n");
    }

    if damage >= 3000.0 {
        feedback.push_str("- Outstanding damage output; your aim is clearly sharp.\n");
    } else if damage >= 1000.0 {
        feedback.push_str("- Damage is respectable; work on landing more of your shots.\n");
    } else {
        feedback.push_str("- Damage output is low; trade shots with opponents more often.\n");
    }

    if walk_distance >= 5000.0 {
        feedback.push_str("- You cover a lot of ground, which keeps your survival odds high.\n");
    } else if walk_distance <= 1000.0 {
        feedback.push_str("- You barely move; scout more of the map each match.\n");
    }

    if weapons >= 5.0 {
        feedback.push_str("- Your looting is thorough; your loadouts look well stocked.\n");
    } else {
        feedback.push_str("- Pick up more weapons so you always have the right tool.\n");
    }

    feedback
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stats() -> PlayerStats {
        PlayerStats {
            total_matches: 10,
            wins: 2.0,
            win_rate: 20.0,
            kills: 25,
            kills_per_match: 2.5,
            deaths: 8.0,
            kd_ratio: 3.125,
            avg_damage: 280.0,
            avg_walk_distance: 2100.0,
            avg_ride_distance: 600.0,
            avg_swim_distance: 15.0,
            headshot_kills: 8,
            headshot_ratio: 0.32,
            longest_kill: 212.5,
            weapons_acquired: 4.2,
        }
    }

    #[test]
    fn system_prompt_sets_the_frame() {
        let sp = system_prompt();
        assert!(sp.contains("battle-royale coach"));
        assert!(sp.contains("Do NOT redo arithmetic"));
    }

    #[test]
    fn section_titles_are_ordered_analysis_then_coaching() {
        assert_eq!(SECTION_TITLES, &["Analysis", "Coaching"]);
    }

    #[test]
    fn analysis_prompt_contains_precomputed_numbers() {
        let prompt = build_analysis_prompt(&sample_stats(), Playstyle::Aggressive);

        assert!(prompt.contains("## PLAYER RECORD"));
        assert!(prompt.contains("Matches: 10"));
        assert!(prompt.contains("Win rate: 20.00%"));
        assert!(prompt.contains("K/D: 3.1"));
        assert!(prompt.contains("Kills: 25 (2.50 per match)"));
        assert!(prompt.contains("Headshot ratio: 32.0%"));
        assert!(prompt.contains("Longest kill: 212.5m"));
        assert!(prompt.contains("Playstyle: Aggressive"));
        assert!(prompt.contains("## TASK"));
    }

    #[test]
    fn coaching_prompt_substitutes_named_statistics() {
        let prompt = build_coaching_prompt(&sample_stats(), Playstyle::Aggressive, 62.5);

        assert!(prompt.contains("Kills per match: 2.50"));
        assert!(prompt.contains("Damage per match: 280.00"));
        assert!(prompt.contains("Walk distance per match: 2100m"));
        assert!(prompt.contains("Weapons per match: 4.2"));
        assert!(prompt.contains("Estimated win probability: 62.5%"));
        assert!(prompt.contains("combat technique"));
        assert!(prompt.contains("loot planning"));
    }

    #[test]
    fn canned_advice_high_performer_branches() {
        // 10 matches at 350 avg damage = 3500 total; walk 520 * 10 = 5200.
        let stats = PlayerStats {
            total_matches: 10,
            kills: 30,
            avg_damage: 350.0,
            avg_walk_distance: 520.0,
            weapons_acquired: 6.0,
            ..PlayerStats::default()
        };
        let advice = canned_advice(&stats);
        assert!(advice.contains("kill count is excellent"));
        assert!(advice.contains("Outstanding damage"));
        assert!(advice.contains("cover a lot of ground"));
        assert!(advice.contains("looting is thorough"));
    }

    #[test]
    fn canned_advice_low_performer_branches() {
        let stats = PlayerStats {
            total_matches: 4,
            kills: 1,
            avg_damage: 50.0,
            avg_walk_distance: 200.0,
            weapons_acquired: 1.0,
            ..PlayerStats::default()
        };
        let advice = canned_advice(&stats);
        assert!(advice.contains("Kill count is low"));
        assert!(advice.contains("Damage output is low"));
        assert!(advice.contains("barely move"));
        assert!(advice.contains("Pick up more weapons"));
    }

    #[test]
    fn canned_advice_mid_tier_branches() {
        // 6 kills, 6 matches at 250 avg = 1500 total damage, 500m walk/match.
        let stats = PlayerStats {
            total_matches: 6,
            kills: 6,
            avg_damage: 250.0,
            avg_walk_distance: 500.0,
            weapons_acquired: 3.0,
            ..PlayerStats::default()
        };
        let advice = canned_advice(&stats);
        assert!(advice.contains("Solid combat record"));
        assert!(advice.contains("Damage is respectable"));
        // 3000m career walk: neither high-mobility nor stationary line.
        assert!(!advice.contains("cover a lot of ground"));
        assert!(!advice.contains("barely move"));
    }

    #[test]
    fn canned_advice_always_has_header() {
        let advice = canned_advice(&PlayerStats::default());
        assert!(advice.starts_with("Coach notes (offline):"));
        assert!(advice.lines().count() >= 4);
    }
}
