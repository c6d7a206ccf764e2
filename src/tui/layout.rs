// Screen layout: panel arrangement and sizing.
//
// Divides the terminal area into fixed zones for the coaching dashboard:
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Player Strip (3 rows)                             |
// +-------------------------+------------------------+
// | Sidebar (40%)           | Main Panel (60%)        |
// | +- Stats (60%) --------+|                         |
// | +- Verdict (40%) ------+|                         |
// +-------------------------+------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each dashboard zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Top row: dataset summary and coach status.
    pub status_bar: Rect,
    /// Second row: selectable player ids.
    pub player_strip: Rect,
    /// Sidebar top: aggregated statistics.
    pub stats: Rect,
    /// Sidebar bottom: playstyle and win probability.
    pub verdict: Rect,
    /// Right side: tab-switched content (suggestions / coach).
    pub main_panel: Rect,
    /// Bottom row: keyboard shortcut hints.
    pub help_bar: Rect,
}

/// Build the dashboard layout from the available terminal area.
///
/// Fixed heights for the status bar, player strip, and help bar; the
/// remaining space splits between the stats sidebar and the main panel.
pub fn build_layout(area: Rect) -> AppLayout {
    // Vertical: status(1) | players(3) | middle(fill) | help(1)
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // player strip
            Constraint::Min(10),   // middle section (sidebar + main)
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let status_bar = vertical[0];
    let player_strip = vertical[1];
    let middle = vertical[2];
    let help_bar = vertical[3];

    // Horizontal: sidebar (40%) | main panel (60%)
    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(middle);

    let sidebar = horizontal[0];
    let main_panel = horizontal[1];

    // Sidebar vertical: stats (60%) | verdict (40%)
    let sidebar_sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(sidebar);

    let stats = sidebar_sections[0];
    let verdict = sidebar_sections[1];

    AppLayout {
        status_bar,
        player_strip,
        stats,
        verdict,
        main_panel,
        help_bar,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
