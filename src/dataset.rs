// Match dataset loading and normalization.
//
// Reads tabular match exports via a caller-supplied column-name mapping.
// Two schemas ship built in: the raw game export (camelCase columns with a
// fractional `winPlacePerc` placement) and the simplified export
// (snake_case columns with a boolean `win_place` flag). The loader is
// permissive: a missing optional column yields zero-valued fields rather
// than an error, and malformed rows are skipped with a warning.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::warn;

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// How the win-indicator column encodes a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinKind {
    /// Fractional final placement in [0, 1]; 1.0 is a win.
    Fraction,
    /// Boolean flag; 1 is a win.
    Flag,
}

/// Maps the fields a [`MatchRow`] needs onto the column names of a
/// particular export schema.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub kills: String,
    pub damage: String,
    pub walk_distance: String,
    pub ride_distance: String,
    pub swim_distance: String,
    pub weapons_acquired: String,
    pub headshot_kills: String,
    pub longest_kill: String,
    pub win: String,
    pub win_kind: WinKind,
}

impl ColumnMap {
    /// The raw game-export schema: camelCase columns, fractional placement.
    pub fn game_export() -> Self {
        ColumnMap {
            kills: "kills".into(),
            damage: "damageDealt".into(),
            walk_distance: "walkDistance".into(),
            ride_distance: "rideDistance".into(),
            swim_distance: "swimDistance".into(),
            weapons_acquired: "weaponsAcquired".into(),
            headshot_kills: "headshotKills".into(),
            longest_kill: "longestKill".into(),
            win: "winPlacePerc".into(),
            win_kind: WinKind::Fraction,
        }
    }

    /// The simplified schema: snake_case columns, boolean win flag.
    pub fn simplified() -> Self {
        ColumnMap {
            kills: "kills".into(),
            damage: "damage_dealt".into(),
            walk_distance: "walk_distance".into(),
            ride_distance: "ride_distance".into(),
            swim_distance: "swim_distance".into(),
            weapons_acquired: "weapons_acquired".into(),
            headshot_kills: "headshot_kills".into(),
            longest_kill: "longest_kill".into(),
            win: "win_place".into(),
            win_kind: WinKind::Flag,
        }
    }
}

/// Candidate columns probed (in order) to group rows by player.
pub const PLAYER_ID_CANDIDATES: &[&str] =
    &["Id", "player_id", "id", "player_name", "name", "player"];

/// How many leading rows form the anonymous player when no id column exists.
pub const ANONYMOUS_ROW_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Match rows
// ---------------------------------------------------------------------------

/// Win indicator for a single match, in whichever encoding the schema uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WinIndicator {
    Fraction(f64),
    Flag(bool),
}

impl WinIndicator {
    /// The row's contribution to the win count: the placement fraction, or
    /// 1.0 / 0.0 for a flag.
    pub fn win_value(&self) -> f64 {
        match self {
            WinIndicator::Fraction(f) => *f,
            WinIndicator::Flag(true) => 1.0,
            WinIndicator::Flag(false) => 0.0,
        }
    }
}

/// One player's recorded performance in one match. Immutable input.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRow {
    pub kills: u32,
    pub damage_dealt: f64,
    pub walk_distance: f64,
    pub ride_distance: f64,
    pub swim_distance: f64,
    pub weapons_acquired: u32,
    pub headshot_kills: u32,
    pub longest_kill: f64,
    /// None when the schema has no win column.
    pub win: Option<WinIndicator>,
}

/// All match rows for one player, in file order.
#[derive(Debug, Clone)]
pub struct PlayerRows {
    pub id: String,
    pub rows: Vec<MatchRow>,
}

/// A loaded dataset: players in first-seen order, plus the mapped column
/// names that were absent from the file header.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub players: Vec<PlayerRows>,
    pub missing_columns: Vec<String>,
}

impl Dataset {
    /// All rows across every player, in file order.
    pub fn all_rows(&self) -> Vec<MatchRow> {
        self.players
            .iter()
            .flat_map(|p| p.rows.iter().cloned())
            .collect()
    }

    /// Total row count across players.
    pub fn row_count(&self) -> usize {
        self.players.iter().map(|p| p.rows.len()).sum()
    }

    /// Of `required` (mapped column names), the ones absent from the file.
    pub fn missing_of(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.missing_columns.iter().any(|m| m == *name))
            .map(|name| name.to_string())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

// ---------------------------------------------------------------------------
// Header resolution
// ---------------------------------------------------------------------------

/// Header indices for the mapped columns. `None` means the column is absent
/// and the corresponding field defaults to zero.
struct ResolvedColumns {
    kills: Option<usize>,
    damage: Option<usize>,
    walk_distance: Option<usize>,
    ride_distance: Option<usize>,
    swim_distance: Option<usize>,
    weapons_acquired: Option<usize>,
    headshot_kills: Option<usize>,
    longest_kill: Option<usize>,
    win: Option<usize>,
    player: Option<usize>,
    missing: Vec<String>,
}

fn resolve_columns(
    headers: &csv::StringRecord,
    map: &ColumnMap,
    player_column: Option<&str>,
) -> ResolvedColumns {
    let index_of = |name: &str| headers.iter().position(|h| h.trim() == name);

    let mut missing = Vec::new();
    let mut resolve = |name: &str| -> Option<usize> {
        let idx = index_of(name);
        if idx.is_none() {
            missing.push(name.to_string());
        }
        idx
    };

    let kills = resolve(&map.kills);
    let damage = resolve(&map.damage);
    let walk_distance = resolve(&map.walk_distance);
    let ride_distance = resolve(&map.ride_distance);
    let swim_distance = resolve(&map.swim_distance);
    let weapons_acquired = resolve(&map.weapons_acquired);
    let headshot_kills = resolve(&map.headshot_kills);
    let longest_kill = resolve(&map.longest_kill);
    let win = resolve(&map.win);

    // The player column is probed, not required; it never counts as missing.
    let player = match player_column {
        Some(name) => index_of(name),
        None => PLAYER_ID_CANDIDATES.iter().find_map(|&c| index_of(c)),
    };

    ResolvedColumns {
        kills,
        damage,
        walk_distance,
        ride_distance,
        swim_distance,
        weapons_acquired,
        headshot_kills,
        longest_kill,
        win,
        player,
        missing,
    }
}

// ---------------------------------------------------------------------------
// Row parsing
// ---------------------------------------------------------------------------

/// Parse one cell as f64, or None on a parse failure. An absent column
/// (idx == None) parses as 0.0 by design.
fn cell_f64(record: &csv::StringRecord, idx: Option<usize>) -> Option<f64> {
    match idx {
        None => Some(0.0),
        Some(i) => {
            let raw = record.get(i)?.trim();
            if raw.is_empty() {
                return Some(0.0);
            }
            let v = raw.parse::<f64>().ok()?;
            if v.is_finite() { Some(v) } else { None }
        }
    }
}

fn parse_row(record: &csv::StringRecord, cols: &ResolvedColumns, win_kind: WinKind) -> Option<MatchRow> {
    let kills = cell_f64(record, cols.kills)?;
    let damage_dealt = cell_f64(record, cols.damage)?;
    let walk_distance = cell_f64(record, cols.walk_distance)?;
    let ride_distance = cell_f64(record, cols.ride_distance)?;
    let swim_distance = cell_f64(record, cols.swim_distance)?;
    let weapons_acquired = cell_f64(record, cols.weapons_acquired)?;
    let headshot_kills = cell_f64(record, cols.headshot_kills)?;
    let longest_kill = cell_f64(record, cols.longest_kill)?;

    let win = match cols.win {
        None => None,
        Some(_) => {
            let v = cell_f64(record, cols.win)?;
            Some(match win_kind {
                WinKind::Fraction => WinIndicator::Fraction(v),
                WinKind::Flag => WinIndicator::Flag(v == 1.0),
            })
        }
    };

    Some(MatchRow {
        kills: kills.round().max(0.0) as u32,
        damage_dealt,
        walk_distance,
        ride_distance,
        swim_distance,
        weapons_acquired: weapons_acquired.round().max(0.0) as u32,
        headshot_kills: headshot_kills.round().max(0.0) as u32,
        longest_kill,
        win,
    })
}

// ---------------------------------------------------------------------------
// Reader-based loader (enables testing without temp files)
// ---------------------------------------------------------------------------

fn load_from_reader<R: Read>(
    rdr: R,
    map: &ColumnMap,
    player_column: Option<&str>,
) -> Result<Dataset, csv::Error> {
    let mut reader = csv::Reader::from_reader(rdr);
    let headers = reader.headers()?.clone();
    let cols = resolve_columns(&headers, map, player_column);

    for name in &cols.missing {
        warn!("column '{}' absent from dataset; fields default to 0", name);
    }

    let mut players: Vec<PlayerRows> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut row_number = 0usize;

    for result in reader.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("skipping unreadable row: {}", e);
                continue;
            }
        };
        row_number += 1;

        let Some(row) = parse_row(&record, &cols, map.win_kind) else {
            warn!("skipping malformed row {}", row_number);
            continue;
        };

        match cols.player {
            Some(idx) => {
                let id = record.get(idx).unwrap_or("").trim().to_string();
                let slot = *index_by_id.entry(id.clone()).or_insert_with(|| {
                    players.push(PlayerRows {
                        id,
                        rows: Vec::new(),
                    });
                    players.len() - 1
                });
                players[slot].rows.push(row);
            }
            None => {
                // No id column anywhere: the first rows form one anonymous
                // player, the rest are ignored.
                if players.is_empty() {
                    players.push(PlayerRows {
                        id: "sample".to_string(),
                        rows: Vec::new(),
                    });
                }
                if players[0].rows.len() < ANONYMOUS_ROW_LIMIT {
                    players[0].rows.push(row);
                }
            }
        }
    }

    if cols.player.is_none() {
        warn!(
            "no player id column found; using the first {} rows as one player",
            ANONYMOUS_ROW_LIMIT
        );
    }

    Ok(Dataset {
        players,
        missing_columns: cols.missing,
    })
}

// ---------------------------------------------------------------------------
// Public path-based loader
// ---------------------------------------------------------------------------

/// Load a match dataset from a CSV file using the given column map.
pub fn load_dataset(
    path: &Path,
    map: &ColumnMap,
    player_column: Option<&str>,
) -> Result<Dataset, DatasetError> {
    let file = std::fs::File::open(path).map_err(|e| DatasetError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let dataset = load_from_reader(file, map, player_column).map_err(|e| DatasetError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;

    if dataset.players.is_empty() {
        return Err(DatasetError::Validation(format!(
            "{} produced zero valid rows",
            path.display()
        )));
    }

    Ok(dataset)
}

/// Load a dataset from an in-memory CSV string. Exposed for tests and the
/// trainer's fixture paths.
pub fn load_dataset_from_str(
    data: &str,
    map: &ColumnMap,
    player_column: Option<&str>,
) -> Result<Dataset, DatasetError> {
    load_from_reader(data.as_bytes(), map, player_column).map_err(|e| DatasetError::Csv {
        path: "<memory>".to_string(),
        source: e,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
