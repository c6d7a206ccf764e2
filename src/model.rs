// Trained win classifier: a seeded, bagged ensemble of depth-capped
// decision trees over four match features, persisted as a JSON artifact.
//
// Training is fully deterministic for a given seed: the subsample, the
// train/test split, each tree's bootstrap draw, and the per-split feature
// choice all derive from it. Prediction averages the leaf probabilities of
// all trees, so a reloaded artifact reproduces the exact class and
// probability of the model that was saved.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::dataset::{ColumnMap, Dataset, MatchRow, WinIndicator};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Feature order: kills, damage dealt, walk distance, weapons acquired.
pub const FEATURE_COUNT: usize = 4;

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Placement fraction above this labels a row as a win.
pub const WIN_LABEL_THRESHOLD: f64 = 0.5;

/// Minimum rows on each side of a split.
const MIN_LEAF_SAMPLES: usize = 5;

/// Features considered per split (out of FEATURE_COUNT).
const SPLIT_FEATURES: usize = 2;

/// Evenly spaced candidate thresholds evaluated per feature.
const THRESHOLD_CANDIDATES: usize = 16;

/// Minimum labeled rows required to train at all.
const MIN_TRAIN_ROWS: usize = 20;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("not enough labeled rows to train: have {have}, need {MIN_TRAIN_ROWS}")]
    NotEnoughRows { have: usize },

    #[error("failed to access model file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("model artifact serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// Samples
// ---------------------------------------------------------------------------

/// One labeled training row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledSample {
    pub features: FeatureVector,
    pub win: bool,
}

/// The mapped names of the columns the trainer requires.
pub fn required_columns(map: &ColumnMap) -> [String; 5] {
    [
        map.kills.clone(),
        map.damage.clone(),
        map.walk_distance.clone(),
        map.weapons_acquired.clone(),
        map.win.clone(),
    ]
}

/// Fatal precondition: every required column must exist in the dataset.
/// Returns the full list of missing names on failure.
pub fn check_required_columns(dataset: &Dataset, map: &ColumnMap) -> Result<(), TrainError> {
    let required = required_columns(map);
    let names: Vec<&str> = required.iter().map(String::as_str).collect();
    let missing = dataset.missing_of(&names);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(TrainError::MissingColumns(missing))
    }
}

/// Extract labeled samples from match rows. Rows without a win indicator
/// are unusable for supervision and are dropped.
pub fn extract_samples(rows: &[MatchRow]) -> Vec<LabeledSample> {
    rows.iter()
        .filter_map(|r| {
            let win = match r.win? {
                WinIndicator::Fraction(f) => f > WIN_LABEL_THRESHOLD,
                WinIndicator::Flag(b) => b,
            };
            Some(LabeledSample {
                features: [
                    r.kills as f64,
                    r.damage_dealt,
                    r.walk_distance,
                    r.weapons_acquired as f64,
                ],
                win,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TreeNode {
    Leaf {
        prob: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    fn predict(&self, x: &FeatureVector) -> f64 {
        match self {
            TreeNode::Leaf { prob } => *prob,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if x[*feature] <= *threshold {
                    left.predict(x)
                } else {
                    right.predict(x)
                }
            }
        }
    }
}

fn win_fraction(samples: &[LabeledSample], idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    let wins = idx.iter().filter(|&&i| samples[i].win).count();
    wins as f64 / idx.len() as f64
}

/// Gini impurity of a binary label set with win fraction `p`.
fn gini(p: f64) -> f64 {
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn grow_tree(
    samples: &[LabeledSample],
    idx: &[usize],
    rng: &mut StdRng,
    depth: usize,
    max_depth: usize,
) -> TreeNode {
    let p = win_fraction(samples, idx);
    if depth >= max_depth || idx.len() < 2 * MIN_LEAF_SAMPLES || p == 0.0 || p == 1.0 {
        return TreeNode::Leaf { prob: p };
    }

    // Random feature subset for this split.
    let mut features: Vec<usize> = (0..FEATURE_COUNT).collect();
    features.shuffle(rng);
    features.truncate(SPLIT_FEATURES);

    let parent_impurity = gini(p);
    let mut best: Option<(usize, f64, f64)> = None;

    for &feature in &features {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &i in idx {
            let v = samples[i].features[feature];
            lo = lo.min(v);
            hi = hi.max(v);
        }
        if hi <= lo {
            continue;
        }

        for k in 1..=THRESHOLD_CANDIDATES {
            let threshold = lo + (hi - lo) * k as f64 / (THRESHOLD_CANDIDATES + 1) as f64;

            let mut n_left = 0usize;
            let mut wins_left = 0usize;
            for &i in idx {
                if samples[i].features[feature] <= threshold {
                    n_left += 1;
                    if samples[i].win {
                        wins_left += 1;
                    }
                }
            }
            let n_right = idx.len() - n_left;
            if n_left < MIN_LEAF_SAMPLES || n_right < MIN_LEAF_SAMPLES {
                continue;
            }

            let wins_total = idx.iter().filter(|&&i| samples[i].win).count();
            let p_left = wins_left as f64 / n_left as f64;
            let p_right = (wins_total - wins_left) as f64 / n_right as f64;
            let weighted = (n_left as f64 * gini(p_left) + n_right as f64 * gini(p_right))
                / idx.len() as f64;

            if weighted + 1e-12 < parent_impurity
                && best.map(|(_, _, w)| weighted < w).unwrap_or(true)
            {
                best = Some((feature, threshold, weighted));
            }
        }
    }

    let Some((feature, threshold, _)) = best else {
        return TreeNode::Leaf { prob: p };
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
        .iter()
        .copied()
        .partition(|&i| samples[i].features[feature] <= threshold);

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(grow_tree(samples, &left_idx, rng, depth + 1, max_depth)),
        right: Box::new(grow_tree(samples, &right_idx, rng, depth + 1, max_depth)),
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// Serialized win classifier artifact. Overwritten on each retrain; loaded
/// read-only by inference callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WinModel {
    pub version: u32,
    pub generated_at: String,
    pub feature_names: Vec<String>,
    pub max_depth: usize,
    pub test_accuracy: f64,
    trees: Vec<TreeNode>,
}

/// Class label plus the probability of that class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub win: bool,
    pub probability: f64,
}

impl WinModel {
    /// Probability of the win class: mean leaf probability across trees.
    pub fn predict_proba(&self, x: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        sum / self.trees.len() as f64
    }

    /// Predicted class and the probability assigned to it.
    pub fn predict(&self, x: &FeatureVector) -> Prediction {
        let p = self.predict_proba(x);
        if p >= 0.5 {
            Prediction {
                win: true,
                probability: p,
            }
        } else {
            Prediction {
                win: false,
                probability: 1.0 - p,
            }
        }
    }

    /// Fraction of samples whose predicted class matches the label.
    pub fn accuracy(&self, samples: &[LabeledSample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let correct = samples
            .iter()
            .filter(|s| self.predict(&s.features).win == s.win)
            .count();
        correct as f64 / samples.len() as f64
    }

    pub fn tree_count(&self) -> usize {
        self.trees.len()
    }

    /// Write the artifact as pretty JSON, overwriting any previous model.
    pub fn save(&self, path: &Path) -> Result<(), TrainError> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).map_err(|e| TrainError::Io {
            path: path.display().to_string(),
            source: e,
        })
    }

    /// Load a previously saved artifact.
    pub fn load(path: &Path) -> Result<WinModel, TrainError> {
        let raw = std::fs::read_to_string(path).map_err(|e| TrainError::Io {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}

// ---------------------------------------------------------------------------
// Training
// ---------------------------------------------------------------------------

/// Training parameters. The seed drives every random decision.
#[derive(Debug, Clone)]
pub struct TrainOptions {
    pub sample_size: usize,
    pub seed: u64,
    pub test_fraction: f64,
    pub trees: usize,
    pub max_depth: usize,
}

impl Default for TrainOptions {
    fn default() -> Self {
        TrainOptions {
            sample_size: 10_000,
            seed: 42,
            test_fraction: 0.2,
            trees: 50,
            max_depth: 6,
        }
    }
}

/// Train the ensemble: seeded subsample, seeded train/test split, one
/// bootstrap draw per tree. Returns the fitted model with its test
/// accuracy recorded in the artifact metadata.
pub fn train(
    samples: &[LabeledSample],
    feature_names: &[String],
    opts: &TrainOptions,
) -> Result<WinModel, TrainError> {
    if samples.len() < MIN_TRAIN_ROWS {
        return Err(TrainError::NotEnoughRows {
            have: samples.len(),
        });
    }

    let mut rng = StdRng::seed_from_u64(opts.seed);

    // Seeded subsample, then split into train/test.
    let mut pool: Vec<LabeledSample> = samples.to_vec();
    pool.shuffle(&mut rng);
    pool.truncate(opts.sample_size.max(MIN_TRAIN_ROWS));

    let test_len = ((pool.len() as f64 * opts.test_fraction).round() as usize)
        .clamp(1, pool.len() - MIN_LEAF_SAMPLES);
    let (test, train_set) = pool.split_at(test_len);

    let train_idx: Vec<usize> = (0..train_set.len()).collect();
    let mut trees = Vec::with_capacity(opts.trees);
    for t in 0..opts.trees {
        let mut tree_rng =
            StdRng::seed_from_u64(opts.seed.wrapping_add((t as u64).wrapping_mul(0x9E37_79B9)));
        // Bootstrap: draw with replacement from the training set.
        let bootstrap: Vec<usize> = (0..train_idx.len())
            .map(|_| train_idx[tree_rng.random_range(0..train_idx.len())])
            .collect();
        trees.push(grow_tree(
            train_set,
            &bootstrap,
            &mut tree_rng,
            0,
            opts.max_depth,
        ));
    }

    let mut model = WinModel {
        version: 1,
        generated_at: chrono::Utc::now().to_rfc3339(),
        feature_names: feature_names.to_vec(),
        max_depth: opts.max_depth,
        test_accuracy: 0.0,
        trees,
    };
    model.test_accuracy = model.accuracy(test);

    Ok(model)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{load_dataset_from_str, ColumnMap};

    /// Separable synthetic data: a win whenever kills > 5, with the other
    /// features as correlated noise.
    fn synthetic_samples(n: usize) -> Vec<LabeledSample> {
        let mut rng = StdRng::seed_from_u64(7);
        (0..n)
            .map(|_| {
                let kills = rng.random_range(0..12) as f64;
                LabeledSample {
                    features: [
                        kills,
                        kills * 90.0 + rng.random_range(0..50) as f64,
                        rng.random_range(200..4000) as f64,
                        rng.random_range(0..8) as f64,
                    ],
                    win: kills > 5.0,
                }
            })
            .collect()
    }

    fn small_opts() -> TrainOptions {
        TrainOptions {
            sample_size: 400,
            seed: 42,
            test_fraction: 0.2,
            trees: 15,
            max_depth: 4,
        }
    }

    #[test]
    fn extract_samples_labels_fraction_and_flag() {
        let csv_data = "\
Id,kills,damageDealt,walkDistance,weaponsAcquired,winPlacePerc
p1,3,250.0,1800.0,4,0.85
p1,1,100.0,900.0,2,0.5
p1,0,40.0,500.0,1,0.1";
        let map = ColumnMap::game_export();
        let ds = load_dataset_from_str(csv_data, &map, None).unwrap();
        let samples = extract_samples(&ds.all_rows());

        assert_eq!(samples.len(), 3);
        assert!(samples[0].win);
        // Exactly 0.5 is not a win (strictly greater).
        assert!(!samples[1].win);
        assert!(!samples[2].win);
        assert!((samples[0].features[0] - 3.0).abs() < f64::EPSILON);
        assert!((samples[0].features[1] - 250.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rows_without_win_indicator_are_dropped() {
        let csv_data = "\
Id,kills,damageDealt,walkDistance,weaponsAcquired
p1,3,250.0,1800.0,4";
        let map = ColumnMap::game_export();
        let ds = load_dataset_from_str(csv_data, &map, None).unwrap();
        assert!(extract_samples(&ds.all_rows()).is_empty());
    }

    #[test]
    fn missing_required_columns_listed() {
        let csv_data = "\
Id,kills,walkDistance
p1,3,1800.0";
        let map = ColumnMap::game_export();
        let ds = load_dataset_from_str(csv_data, &map, None).unwrap();
        let err = check_required_columns(&ds, &map).unwrap_err();
        match err {
            TrainError::MissingColumns(missing) => {
                assert!(missing.contains(&"damageDealt".to_string()));
                assert!(missing.contains(&"weaponsAcquired".to_string()));
                assert!(missing.contains(&"winPlacePerc".to_string()));
                assert!(!missing.contains(&"kills".to_string()));
            }
            other => panic!("expected MissingColumns, got: {other}"),
        }
    }

    #[test]
    fn all_required_columns_present_is_ok() {
        let csv_data = "\
Id,kills,damageDealt,walkDistance,weaponsAcquired,winPlacePerc
p1,3,250.0,1800.0,4,0.85";
        let map = ColumnMap::game_export();
        let ds = load_dataset_from_str(csv_data, &map, None).unwrap();
        assert!(check_required_columns(&ds, &map).is_ok());
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let samples = synthetic_samples(5);
        let err = train(&samples, &[], &small_opts()).unwrap_err();
        assert!(matches!(err, TrainError::NotEnoughRows { have: 5 }));
    }

    #[test]
    fn learns_a_separable_rule() {
        let samples = synthetic_samples(400);
        let names = vec![
            "kills".to_string(),
            "damageDealt".to_string(),
            "walkDistance".to_string(),
            "weaponsAcquired".to_string(),
        ];
        let model = train(&samples, &names, &small_opts()).unwrap();

        assert!(
            model.test_accuracy > 0.85,
            "test accuracy too low: {}",
            model.test_accuracy
        );
        assert_eq!(model.tree_count(), 15);
        assert_eq!(model.feature_names, names);

        // Obvious cases predict correctly.
        let win = model.predict(&[10.0, 900.0, 2000.0, 5.0]);
        assert!(win.win);
        let loss = model.predict(&[0.0, 30.0, 500.0, 1.0]);
        assert!(!loss.win);
    }

    #[test]
    fn training_is_deterministic_for_a_seed() {
        let samples = synthetic_samples(300);
        let a = train(&samples, &[], &small_opts()).unwrap();
        let b = train(&samples, &[], &small_opts()).unwrap();

        let probes: [FeatureVector; 4] = [
            [0.0, 0.0, 0.0, 0.0],
            [3.0, 280.0, 1200.0, 4.0],
            [7.0, 640.0, 2600.0, 6.0],
            [11.0, 1000.0, 3900.0, 7.0],
        ];
        for probe in &probes {
            assert!((a.predict_proba(probe) - b.predict_proba(probe)).abs() < f64::EPSILON);
        }
        assert!((a.test_accuracy - b.test_accuracy).abs() < f64::EPSILON);
    }

    #[test]
    fn different_seeds_may_differ_but_stay_valid() {
        let samples = synthetic_samples(300);
        let mut opts = small_opts();
        opts.seed = 7;
        let model = train(&samples, &[], &opts).unwrap();
        let p = model.predict_proba(&[6.0, 540.0, 2000.0, 4.0]);
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn save_load_roundtrip_reproduces_predictions() {
        let samples = synthetic_samples(300);
        let model = train(&samples, &["kills".to_string()], &small_opts()).unwrap();

        let path = std::env::temp_dir().join("dropcoach_model_roundtrip.json");
        model.save(&path).unwrap();
        let loaded = WinModel::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded.version, model.version);
        assert_eq!(loaded.tree_count(), model.tree_count());
        assert!((loaded.test_accuracy - model.test_accuracy).abs() < f64::EPSILON);

        let probes: [FeatureVector; 3] = [
            [1.0, 90.0, 800.0, 2.0],
            [6.0, 540.0, 2000.0, 4.0],
            [10.0, 900.0, 3500.0, 7.0],
        ];
        for probe in &probes {
            let a = model.predict(probe);
            let b = loaded.predict(probe);
            assert_eq!(a.win, b.win);
            assert!((a.probability - b.probability).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn predicted_class_probability_is_at_least_half() {
        let samples = synthetic_samples(300);
        let model = train(&samples, &[], &small_opts()).unwrap();
        for kills in 0..12 {
            let p = model.predict(&[kills as f64, kills as f64 * 90.0, 1500.0, 4.0]);
            assert!(p.probability >= 0.5);
            assert!(p.probability <= 1.0);
        }
    }

    #[test]
    fn accuracy_on_empty_set_is_zero() {
        let samples = synthetic_samples(300);
        let model = train(&samples, &[], &small_opts()).unwrap();
        assert!((model.accuracy(&[]) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn gini_is_zero_for_pure_sets() {
        assert!((gini(0.0) - 0.0).abs() < f64::EPSILON);
        assert!((gini(1.0) - 0.0).abs() < f64::EPSILON);
        assert!((gini(0.5) - 0.5).abs() < f64::EPSILON);
    }
}
