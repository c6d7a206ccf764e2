// Integration tests for the coaching dashboard.
//
// These tests exercise the full system end-to-end using the library crate's
// public API: CSV ingestion through both schemas, the analysis pipeline
// (aggregation, playstyle, win probability, suggestions), the offline
// trainer with artifact round-trip, and the app orchestration loop with the
// configured fallback policies.

use dropzone_coach::app::{self, AppState};
use dropzone_coach::config::{
    Config, CredentialsConfig, DatasetConfig, FallbackPolicy, LlmConfig, TrainerConfig,
};
use dropzone_coach::dataset::{load_dataset_from_str, ColumnMap, Dataset};
use dropzone_coach::llm::client::LlmClient;
use dropzone_coach::model::{self, TrainOptions, WinModel};
use dropzone_coach::playstyle::Playstyle;
use dropzone_coach::protocol::{LlmEvent, UiUpdate, UserCommand};
use dropzone_coach::stats;
use dropzone_coach::suggest::{CLOSE_RANGE_FAST_TTK, SNIPER_PRECISION};
use dropzone_coach::winprob;

use tokio::sync::mpsc;

// ===========================================================================
// Test helpers
// ===========================================================================

const GAME_EXPORT_CSV: &str = "\
Id,kills,damageDealt,walkDistance,rideDistance,swimDistance,weaponsAcquired,headshotKills,longestKill,winPlacePerc
fragger,7,480.0,2900.0,500.0,0.0,6,3,260.0,0.95
fragger,5,360.0,2600.0,0.0,20.0,5,2,190.0,0.75
fragger,9,610.0,3100.0,300.0,0.0,7,4,340.0,1.0
survivor,1,90.0,1400.0,800.0,0.0,3,0,60.0,0.55
survivor,0,30.0,1100.0,0.0,0.0,2,0,0.0,0.35";

/// The same five matches in the simplified snake_case schema with boolean
/// win flags.
const SIMPLIFIED_CSV: &str = "\
player_id,kills,damage_dealt,walk_distance,ride_distance,swim_distance,weapons_acquired,headshot_kills,longest_kill,win_place
fragger,7,480.0,2900.0,500.0,0.0,6,3,260.0,1
fragger,5,360.0,2600.0,0.0,20.0,5,2,190.0,0
fragger,9,610.0,3100.0,300.0,0.0,7,4,340.0,1
survivor,1,90.0,1400.0,800.0,0.0,3,0,60.0,0
survivor,0,30.0,1100.0,0.0,0.0,2,0,0.0,0";

fn game_export_dataset() -> Dataset {
    load_dataset_from_str(GAME_EXPORT_CSV, &ColumnMap::game_export(), None).unwrap()
}

fn inline_config(fallback: FallbackPolicy) -> Config {
    Config {
        dataset: DatasetConfig {
            path: "data/matches.csv".into(),
            schema: "game-export".into(),
            player_column: None,
            columns: None,
        },
        llm: LlmConfig {
            model: "claude-sonnet-4-5-20250929".into(),
            max_tokens: 600,
            temperature: 0.7,
            fallback,
        },
        trainer: TrainerConfig {
            sample_size: 1000,
            seed: 42,
            test_fraction: 0.2,
            trees: 12,
            max_depth: 4,
            model_path: "win-model.json".into(),
        },
        credentials: CredentialsConfig {
            anthropic_api_key: None,
        },
    }
}

/// Build a synthetic training CSV: kills drive both the damage column and
/// the placement fraction, so the label is learnable from the features.
fn synthetic_training_csv(rows: usize) -> String {
    let mut csv = String::from("Id,kills,damageDealt,walkDistance,weaponsAcquired,winPlacePerc\n");
    for i in 0..rows {
        let kills = i % 11;
        let damage = kills * 95 + (i % 7) * 10;
        let walk = 400 + (i % 30) * 100;
        let weapons = 1 + i % 6;
        let place = if kills > 5 { 0.9 } else { 0.2 };
        csv.push_str(&format!("p{i},{kills},{damage},{walk},{weapons},{place}\n"));
    }
    csv
}

// ===========================================================================
// Analysis pipeline end-to-end
// ===========================================================================

#[test]
fn pipeline_aggressive_player_full_report() {
    let dataset = game_export_dataset();
    assert_eq!(dataset.players.len(), 2);

    let fragger = &dataset.players[0];
    assert_eq!(fragger.id, "fragger");
    let report = app::build_report(&fragger.id, fragger);

    // Aggregates: 21 kills over 3 matches, 9 headshots.
    assert_eq!(report.stats.total_matches, 3);
    assert_eq!(report.stats.kills, 21);
    assert_eq!(report.stats.headshot_kills, 9);
    assert!((report.stats.kills_per_match - 7.0).abs() < 1e-9);
    assert!((report.stats.win_rate - 90.0).abs() < 1e-9);

    // kills/match 7 (+2), avg damage ~483 (+2), headshot 9/21 (+1),
    // walk 2866 (+1) -> Very Aggressive.
    assert_eq!(report.aggression_score, 6);
    assert_eq!(report.playstyle, Playstyle::VeryAggressive);

    // Very aggressive close range must be the fast-TTK list.
    assert_eq!(report.suggestions.close_range, CLOSE_RANGE_FAST_TTK);
    // Headshot ratio 0.43 selects the precision sniper list.
    assert_eq!(report.suggestions.sniper, SNIPER_PRECISION);

    // 7 kills/match, ~483 damage, ~2867m walk, 6 weapons: factors come to
    // 28 + 12.1 + 19.1 + 15 (weapon factor capped) ~= 74.2.
    assert!((report.win_probability - 74.2).abs() < 0.2);
}

#[test]
fn pipeline_passive_player_full_report() {
    let dataset = game_export_dataset();
    let survivor = &dataset.players[1];
    let report = app::build_report(&survivor.id, survivor);

    // kills/match 0.5, avg damage 60, headshots 0, walk 1250 -> score 0.
    assert_eq!(report.aggression_score, 0);
    assert_eq!(report.playstyle, Playstyle::Passive);
    assert!(report.win_probability < 40.0);
}

#[test]
fn both_schemas_unify_to_the_same_non_win_stats() {
    let export = game_export_dataset();
    let simplified =
        load_dataset_from_str(SIMPLIFIED_CSV, &ColumnMap::simplified(), None).unwrap();

    let a = stats::aggregate(&export.players[0].rows);
    let b = stats::aggregate(&simplified.players[0].rows);

    // Everything except the win-derived fields matches exactly.
    assert_eq!(a.total_matches, b.total_matches);
    assert_eq!(a.kills, b.kills);
    assert_eq!(a.headshot_kills, b.headshot_kills);
    assert!((a.avg_damage - b.avg_damage).abs() < 1e-9);
    assert!((a.avg_walk_distance - b.avg_walk_distance).abs() < 1e-9);
    assert!((a.longest_kill - b.longest_kill).abs() < 1e-9);

    // Win-derived fields follow the schema: mean placement vs flag count.
    assert!((a.win_rate - 90.0).abs() < 1e-9);
    assert!((b.win_rate - (2.0 / 3.0 * 100.0)).abs() < 1e-9);
    assert!((b.wins - 2.0).abs() < 1e-9);
}

#[test]
fn permissive_schema_analyzes_with_defaults() {
    // Only an id and kills: everything else defaults to zero, no errors.
    let csv_data = "\
Id,kills
lonely,2
lonely,4";
    let dataset = load_dataset_from_str(csv_data, &ColumnMap::game_export(), None).unwrap();
    let report = app::build_report("lonely", &dataset.players[0]);

    assert_eq!(report.stats.kills, 6);
    assert!((report.stats.win_rate - 0.0).abs() < 1e-9);
    assert!((report.stats.avg_damage - 0.0).abs() < 1e-9);
    assert!((report.stats.headshot_ratio - 0.0).abs() < 1e-9);
    // kills/match 3 earns +1; nothing else scores.
    assert_eq!(report.aggression_score, 1);
    assert_eq!(report.playstyle, Playstyle::Balanced);
}

#[test]
fn estimator_reference_vectors() {
    assert!((winprob::estimate_win_probability(10.0, 3000.0, 5000.0, 5.0) - 100.0).abs() < 1e-9);
    assert!((winprob::estimate_win_probability(3.0, 500.0, 2000.0, 4.0) - 49.8).abs() < 1e-9);
}

#[test]
fn column_overrides_flow_from_config_to_loader() {
    let config = Config {
        dataset: DatasetConfig {
            path: "unused.csv".into(),
            schema: "game-export".into(),
            player_column: Some("tag".into()),
            columns: Some(dropzone_coach::config::ColumnOverrides {
                damage: Some("dmg".into()),
                win: Some("placement".into()),
                ..Default::default()
            }),
        },
        ..inline_config(FallbackPolicy::Canned)
    };

    let map = config.dataset.column_map().unwrap();
    let csv_data = "\
tag,kills,dmg,placement
ace,4,320.0,0.9
ace,2,180.0,0.6";
    let dataset =
        load_dataset_from_str(csv_data, &map, config.dataset.player_column.as_deref()).unwrap();

    assert_eq!(dataset.players[0].id, "ace");
    let s = stats::aggregate(&dataset.players[0].rows);
    assert!((s.avg_damage - 250.0).abs() < 1e-9);
    assert!((s.win_rate - 75.0).abs() < 1e-9);
}

// ===========================================================================
// Offline trainer end-to-end
// ===========================================================================

#[test]
fn trainer_end_to_end_with_artifact_roundtrip() {
    let csv = synthetic_training_csv(300);
    let map = ColumnMap::game_export();
    let dataset = load_dataset_from_str(&csv, &map, None).unwrap();

    model::check_required_columns(&dataset, &map).expect("all columns present");

    let samples = model::extract_samples(&dataset.all_rows());
    assert_eq!(samples.len(), 300);

    let opts = TrainOptions {
        sample_size: 300,
        seed: 42,
        test_fraction: 0.2,
        trees: 12,
        max_depth: 4,
    };
    let names = vec![
        map.kills.clone(),
        map.damage.clone(),
        map.walk_distance.clone(),
        map.weapons_acquired.clone(),
    ];
    let model = model::train(&samples, &names, &opts).unwrap();

    assert!(
        model.test_accuracy > 0.85,
        "separable data should be learnable, got {}",
        model.test_accuracy
    );

    // Persist, reload, and verify the predictions are bit-identical.
    let path = std::env::temp_dir().join("dropcoach_it_model.json");
    model.save(&path).unwrap();
    let loaded = WinModel::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    for sample in samples.iter().take(50) {
        let a = model.predict(&sample.features);
        let b = loaded.predict(&sample.features);
        assert_eq!(a.win, b.win);
        assert!((a.probability - b.probability).abs() < f64::EPSILON);
    }
}

#[test]
fn trainer_rejects_datasets_missing_required_columns() {
    // walkDistance, weaponsAcquired, and winPlacePerc are all absent.
    let csv_data = "\
Id,kills,damageDealt
p1,3,200.0
p2,1,90.0";
    let map = ColumnMap::game_export();
    let dataset = load_dataset_from_str(csv_data, &map, None).unwrap();

    let err = model::check_required_columns(&dataset, &map).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("walkDistance"));
    assert!(message.contains("weaponsAcquired"));
    assert!(message.contains("winPlacePerc"));
    assert!(!message.contains("damageDealt"));
}

#[test]
fn trained_model_probability_tracks_the_features() {
    let csv = synthetic_training_csv(300);
    let map = ColumnMap::game_export();
    let dataset = load_dataset_from_str(&csv, &map, None).unwrap();
    let samples = model::extract_samples(&dataset.all_rows());

    let opts = TrainOptions {
        sample_size: 300,
        seed: 9,
        test_fraction: 0.2,
        trees: 12,
        max_depth: 4,
    };
    let model = model::train(&samples, &[], &opts).unwrap();

    let strong = model.predict_proba(&[10.0, 950.0, 2500.0, 5.0]);
    let weak = model.predict_proba(&[0.0, 20.0, 600.0, 1.0]);
    assert!(strong > weak);
}

// ===========================================================================
// App orchestration
// ===========================================================================

async fn booted_state(
    fallback: FallbackPolicy,
) -> (
    AppState,
    mpsc::Receiver<LlmEvent>,
    mpsc::Sender<UiUpdate>,
    mpsc::Receiver<UiUpdate>,
) {
    let (llm_tx, llm_rx) = mpsc::channel(32);
    let (ui_tx, mut ui_rx) = mpsc::channel(32);
    let mut state = AppState::new(
        inline_config(fallback),
        game_export_dataset(),
        LlmClient::Disabled,
        llm_tx,
    );

    app::handle_command(&mut state, UserCommand::SelectPlayer(0), &ui_tx).await;
    let _ = ui_rx.recv().await; // PlayerList
    let _ = ui_rx.recv().await; // ReportUpdate

    (state, llm_rx, ui_tx, ui_rx)
}

#[tokio::test]
async fn dashboard_flow_selects_and_reports() {
    let (llm_tx, _llm_rx) = mpsc::channel(32);
    let (ui_tx, mut ui_rx) = mpsc::channel(32);
    let mut state = AppState::new(
        inline_config(FallbackPolicy::Canned),
        game_export_dataset(),
        LlmClient::Disabled,
        llm_tx,
    );

    app::handle_command(&mut state, UserCommand::SelectPlayer(0), &ui_tx).await;

    match ui_rx.recv().await.unwrap() {
        UiUpdate::PlayerList { players, selected } => {
            assert_eq!(players, vec!["fragger".to_string(), "survivor".to_string()]);
            assert_eq!(selected, 0);
        }
        other => panic!("expected PlayerList, got {other:?}"),
    }
    match ui_rx.recv().await.unwrap() {
        UiUpdate::ReportUpdate(report) => {
            assert_eq!(report.player, "fragger");
            assert_eq!(report.playstyle, Playstyle::VeryAggressive);
        }
        other => panic!("expected ReportUpdate, got {other:?}"),
    }
}

#[tokio::test]
async fn coaching_failure_with_canned_policy_substitutes_advice() {
    let (mut state, mut llm_rx, ui_tx, mut ui_rx) = booted_state(FallbackPolicy::Canned).await;

    app::handle_command(&mut state, UserCommand::RequestCoaching, &ui_tx).await;
    match ui_rx.recv().await.unwrap() {
        UiUpdate::CoachSectionStart { index: 0, title } => assert_eq!(title, "Analysis"),
        other => panic!("expected CoachSectionStart, got {other:?}"),
    }

    // The disabled client emits an error; route it through the handler.
    let event = llm_rx.recv().await.unwrap();
    app::handle_llm_event(&mut state, event, &ui_tx).await;

    match ui_rx.recv().await.unwrap() {
        UiUpdate::CoachFallback(advice) => {
            assert!(advice.contains("Coach notes (offline):"));
            // The fragger record trips the high-performer branches.
            assert!(advice.contains("kill count is excellent"));
        }
        other => panic!("expected CoachFallback, got {other:?}"),
    }
}

#[tokio::test]
async fn coaching_failure_with_error_policy_surfaces_message() {
    let (mut state, mut llm_rx, ui_tx, mut ui_rx) = booted_state(FallbackPolicy::Error).await;

    app::handle_command(&mut state, UserCommand::RequestCoaching, &ui_tx).await;
    let _ = ui_rx.recv().await; // CoachSectionStart

    let event = llm_rx.recv().await.unwrap();
    app::handle_llm_event(&mut state, event, &ui_tx).await;

    match ui_rx.recv().await.unwrap() {
        UiUpdate::CoachError(message) => assert_eq!(message, "LLM not configured"),
        other => panic!("expected CoachError, got {other:?}"),
    }
}

#[tokio::test]
async fn coach_report_collects_ordered_sections() {
    let (mut state, _llm_rx, ui_tx, mut ui_rx) = booted_state(FallbackPolicy::Canned).await;

    app::handle_command(&mut state, UserCommand::RequestCoaching, &ui_tx).await;
    let _ = ui_rx.recv().await; // CoachSectionStart 0
    let generation = state.generation();

    app::handle_llm_event(
        &mut state,
        LlmEvent::Complete {
            full_text: "Analysis text.".into(),
            input_tokens: 20,
            output_tokens: 10,
            generation,
        },
        &ui_tx,
    )
    .await;
    let _ = ui_rx.recv().await; // CoachSectionComplete 0
    let _ = ui_rx.recv().await; // CoachSectionStart 1

    app::handle_llm_event(
        &mut state,
        LlmEvent::Complete {
            full_text: "Coaching text.".into(),
            input_tokens: 25,
            output_tokens: 12,
            generation,
        },
        &ui_tx,
    )
    .await;
    let _ = ui_rx.recv().await; // CoachSectionComplete 1
    assert_eq!(ui_rx.recv().await.unwrap(), UiUpdate::CoachComplete);

    // One ordered text section per requested task.
    assert_eq!(
        state.coach.sections,
        vec!["Analysis text.".to_string(), "Coaching text.".to_string()]
    );
}
