// Configuration loading and parsing (coach.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::dataset::ColumnMap;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub dataset: DatasetConfig,
    pub llm: LlmConfig,
    pub trainer: TrainerConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// coach.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire coach.toml file.
#[derive(Debug, Clone, Deserialize)]
struct CoachFile {
    dataset: DatasetConfig,
    llm: LlmConfig,
    trainer: TrainerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatasetConfig {
    /// Path to the match-rows CSV.
    pub path: String,
    /// Column schema preset: "game-export" or "simplified".
    pub schema: String,
    /// Column used to group rows by player. When omitted, a fixed candidate
    /// list is probed against the file header.
    #[serde(default)]
    pub player_column: Option<String>,
    /// Per-column name overrides applied on top of the schema preset.
    #[serde(default)]
    pub columns: Option<ColumnOverrides>,
}

/// Optional per-column renames for datasets that deviate from a preset.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnOverrides {
    pub kills: Option<String>,
    pub damage: Option<String>,
    pub walk_distance: Option<String>,
    pub ride_distance: Option<String>,
    pub swim_distance: Option<String>,
    pub weapons_acquired: Option<String>,
    pub headshot_kills: Option<String>,
    pub longest_kill: Option<String>,
    pub win: Option<String>,
}

impl DatasetConfig {
    /// Resolve the schema preset plus overrides into a column map.
    pub fn column_map(&self) -> Result<ColumnMap, ConfigError> {
        let mut map = match self.schema.as_str() {
            "game-export" => ColumnMap::game_export(),
            "simplified" => ColumnMap::simplified(),
            other => {
                return Err(ConfigError::ValidationError {
                    field: "dataset.schema".into(),
                    message: format!(
                        "unknown schema `{other}` (expected \"game-export\" or \"simplified\")"
                    ),
                })
            }
        };

        if let Some(cols) = &self.columns {
            let apply = |target: &mut String, value: &Option<String>| {
                if let Some(v) = value {
                    *target = v.clone();
                }
            };
            apply(&mut map.kills, &cols.kills);
            apply(&mut map.damage, &cols.damage);
            apply(&mut map.walk_distance, &cols.walk_distance);
            apply(&mut map.ride_distance, &cols.ride_distance);
            apply(&mut map.swim_distance, &cols.swim_distance);
            apply(&mut map.weapons_acquired, &cols.weapons_acquired);
            apply(&mut map.headshot_kills, &cols.headshot_kills);
            apply(&mut map.longest_kill, &cols.longest_kill);
            apply(&mut map.win, &cols.win);
        }

        Ok(map)
    }
}

/// What to show when the LLM call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Substitute locally generated threshold advice.
    Canned,
    /// Surface the failure to the display layer.
    Error,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub fallback: FallbackPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrainerConfig {
    pub sample_size: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub trees: usize,
    pub max_depth: usize,
    pub model_path: String,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/coach.toml` and (optionally)
/// `config/credentials.toml`, relative to the given `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- coach.toml (required) ---
    let coach_path = config_dir.join("coach.toml");
    let coach_text = read_file(&coach_path)?;
    let coach_file: CoachFile =
        toml::from_str(&coach_text).map_err(|e| ConfigError::ParseError {
            path: coach_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        dataset: coach_file.dataset,
        llm: coach_file.llm,
        trainer: coach_file.trainer,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let mut copied = Vec::new();

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };

        // Skip .example template files
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }
        let target = config_dir.join(file_name);

        match std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&target)
        {
            Ok(mut dest) => {
                let content = std::fs::read(&path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", path.display()),
                })?;
                std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                    ConfigError::DefaultsCopyError {
                        message: format!("failed to write {}: {e}", target.display()),
                    }
                })?;
                copied.push(target);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                // File already exists in config/, skip it
            }
            Err(e) => {
                return Err(ConfigError::DefaultsCopyError {
                    message: format!("failed to create {}: {e}", target.display()),
                });
            }
        }
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying defaults first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.dataset.path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "dataset.path".into(),
            message: "must not be empty".into(),
        });
    }

    // Resolving the column map validates the schema name.
    config.dataset.column_map()?;

    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.max_tokens".into(),
            message: "must be greater than 0".into(),
        });
    }

    let temp = config.llm.temperature;
    if !(0.0..=2.0).contains(&temp) {
        return Err(ConfigError::ValidationError {
            field: "llm.temperature".into(),
            message: format!("must be between 0.0 and 2.0 inclusive, got {temp}"),
        });
    }

    let trainer = &config.trainer;
    let count_fields: &[(&str, usize)] = &[
        ("trainer.sample_size", trainer.sample_size),
        ("trainer.trees", trainer.trees),
        ("trainer.max_depth", trainer.max_depth),
    ];
    for (name, val) in count_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    let frac = trainer.test_fraction;
    if !(frac > 0.0 && frac < 1.0) {
        return Err(ConfigError::ValidationError {
            field: "trainer.test_fraction".into(),
            message: format!("must be strictly between 0.0 and 1.0, got {frac}"),
        });
    }

    if trainer.model_path.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "trainer.model_path".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
