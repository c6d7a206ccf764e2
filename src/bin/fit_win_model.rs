// Offline trainer for the win classifier.
//
// One-shot batch process: load the configured dataset, verify the required
// feature columns, take a seeded sample, fit the tree ensemble, report test
// accuracy, and persist the model artifact. Run with:
//
//   cargo run --bin fit_win_model [-- --data <csv>] [--out <json>] [--seed N]

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use dropzone_coach::config;
use dropzone_coach::dataset;
use dropzone_coach::model::{self, TrainOptions};

fn main() -> Result<()> {
    let base_dir = parse_path_arg("--config-dir").unwrap_or_else(|| PathBuf::from("."));
    config::ensure_config_files(&base_dir).context("failed to initialize config from defaults")?;
    let config = config::load_config_from(&base_dir).context("failed to load configuration")?;

    let data_path =
        parse_path_arg("--data").unwrap_or_else(|| PathBuf::from(&config.dataset.path));
    let out_path =
        parse_path_arg("--out").unwrap_or_else(|| PathBuf::from(&config.trainer.model_path));

    let column_map = config
        .dataset
        .column_map()
        .context("failed to resolve column map")?;

    let loaded = dataset::load_dataset(
        Path::new(&data_path),
        &column_map,
        config.dataset.player_column.as_deref(),
    )
    .with_context(|| format!("failed to load dataset {}", data_path.display()))?;

    // Fatal precondition: the trainer needs every feature column present.
    model::check_required_columns(&loaded, &column_map)
        .context("dataset is unusable for training")?;

    let rows = loaded.all_rows();
    let samples = model::extract_samples(&rows);
    if samples.is_empty() {
        bail!(
            "dataset {} contains no labeled rows (win column `{}` empty?)",
            data_path.display(),
            column_map.win
        );
    }
    eprintln!(
        "[INFO] {} labeled rows loaded from {}",
        samples.len(),
        data_path.display()
    );

    let opts = TrainOptions {
        sample_size: config.trainer.sample_size,
        seed: parse_u64_arg("--seed").unwrap_or(config.trainer.seed),
        test_fraction: config.trainer.test_fraction,
        trees: config.trainer.trees,
        max_depth: config.trainer.max_depth,
    };

    let feature_names = vec![
        column_map.kills.clone(),
        column_map.damage.clone(),
        column_map.walk_distance.clone(),
        column_map.weapons_acquired.clone(),
    ];

    let model = model::train(&samples, &feature_names, &opts).context("training failed")?;
    eprintln!(
        "[INFO] trained {} trees (max depth {}) on seed {}",
        model.tree_count(),
        opts.max_depth,
        opts.seed
    );
    println!("test accuracy: {:.3}", model.test_accuracy);

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }
    model
        .save(&out_path)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    println!("model written: {}", out_path.display());

    Ok(())
}

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

fn parse_path_arg(name: &str) -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(v) = arg.strip_prefix(&format!("{name}=")) {
            if !v.trim().is_empty() {
                return Some(PathBuf::from(v.trim()));
            }
        }
        if arg == name {
            if let Some(next) = args.get(idx + 1) {
                if !next.trim().is_empty() {
                    return Some(PathBuf::from(next.trim()));
                }
            }
        }
    }
    None
}

fn parse_u64_arg(name: &str) -> Option<u64> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&format!("{name}=")) {
            if let Ok(v) = raw.trim().parse::<u64>() {
                return Some(v);
            }
        }
        if arg == name {
            if let Some(next) = args.get(idx + 1) {
                if let Ok(v) = next.trim().parse::<u64>() {
                    return Some(v);
                }
            }
        }
    }
    None
}
