//! End-to-end runs over small on-disk tables.

use std::fs;
use std::path::Path;

use freightq::{Config, Error, Stage, load_tabular, pipeline};

const ORIGINS: [i64; 4] = [101, 102, 103, 104];
const DESTINATIONS: [i64; 3] = [10, 20, 30];

const QUICK_TRAINER: &str = r#"
[trainer]
n-iter = 3

[trainer.search]
n-estimators = [10, 20]
max-depth = [2, 3]
learning-rate = [0.1, 0.3]
subsample = [1.0]
colsample-bytree = [1.0]
"#;

fn lane_distance(origin: i64, destination: i64) -> f64 {
    (origin - 100) as f64 * 35.5 + destination as f64 * 4.25
}

/// Source-spreadsheet dialect: `;` fields, `,` decimals.
fn write_inputs(root: &Path) {
    let data = root.join("data");
    fs::create_dir_all(&data).unwrap();

    let mut distances = String::from("id_city_origin;id_city_destination;distance\n");
    for origin in ORIGINS {
        for destination in DESTINATIONS {
            let km = format!("{:.2}", lane_distance(origin, destination)).replace('.', ",");
            distances.push_str(&format!("{};{};{}\n", origin, destination, km));
        }
    }
    fs::write(data.join("distances.csv"), distances).unwrap();

    let mut freight = String::from("id_city_origin;id_city_destination;freight_cost\n");
    for origin in ORIGINS {
        for destination in DESTINATIONS {
            for shipment in 0..2 {
                let cost = 2.8 * lane_distance(origin, destination) + 60.0 + shipment as f64 * 7.5;
                let cost = format!("{:.2}", cost).replace('.', ",");
                freight.push_str(&format!("{};{};{}\n", origin, destination, cost));
            }
        }
    }
    fs::write(data.join("freight_costs.csv"), freight).unwrap();
}

fn write_config(root: &Path, extra: &str) {
    let toml = format!(
        "target-destinations = [10, 20, 30]\nhorizon = 8\n{}\n{}",
        extra, QUICK_TRAINER
    );
    fs::write(root.join("freightq.toml"), toml).unwrap();
}

#[test]
fn test_pipeline_writes_both_quote_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    write_config(dir.path(), "");

    let config = Config::load(dir.path()).unwrap();
    let output = pipeline::run(&config).unwrap();

    assert_eq!(output.report.rows_used, 24);
    assert_eq!(output.report.rows_excluded, 0);
    assert_eq!(output.report.search.len(), 3);
    assert_eq!(output.historical_quotes.len(), 12);
    assert_eq!(output.projected_quotes.len(), 12);

    let historical = load_tabular(dir.path().join("output/historical_quotes.csv")).unwrap();
    let projected = load_tabular(dir.path().join("output/projected_quotes.csv")).unwrap();
    assert_eq!(historical.len(), 12);
    assert_eq!(projected.len(), 12);

    for (written, quote) in historical.iter().zip(&output.historical_quotes) {
        assert_eq!(written.origin_id, quote.origin_id);
        assert_eq!(written.destination_id, quote.destination_id);
        assert_eq!(written.freight_cost, Some(quote.freight_cost));
        assert!(written.distance.is_none());
    }

    let lanes: Vec<(i64, i64)> = output
        .historical_quotes
        .iter()
        .map(|q| (q.origin_id, q.destination_id))
        .collect();
    let expected: Vec<(i64, i64)> = ORIGINS
        .iter()
        .flat_map(|&o| DESTINATIONS.iter().map(move |&d| (o, d)))
        .collect();
    assert_eq!(lanes, expected);
}

#[test]
fn test_pipeline_is_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    write_config(dir.path(), "");
    let config = Config::load(dir.path()).unwrap();

    let first = pipeline::run(&config).unwrap();
    let second = pipeline::run(&config).unwrap();

    assert_eq!(first.report, second.report);
    assert_eq!(first.historical_quotes, second.historical_quotes);
    assert_eq!(first.projected_quotes, second.projected_quotes);
}

#[test]
fn test_unknown_target_fails_without_writing() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    write_config(dir.path(), "");

    let mut config = Config::load(dir.path()).unwrap();
    config.target_destinations = vec![10, 99];

    match pipeline::run(&config) {
        Err(Error::MissingDistance {
            stage,
            origin,
            destination,
        }) => {
            assert_eq!(stage, Stage::Expansion);
            assert_eq!((origin, destination), (101, 99));
        }
        other => panic!("expected MissingDistance, got {:?}", other.map(|o| o.report)),
    }
    assert!(!config.historical_quotes.exists());
    assert!(!config.projected_quotes.exists());
}

#[test]
fn test_tiny_table_is_insufficient() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("data");
    fs::create_dir_all(&data).unwrap();
    fs::write(
        data.join("distances.csv"),
        "id_city_origin;id_city_destination;distance\n1;2;10,0\n1;3;20,0\n",
    )
    .unwrap();
    fs::write(
        data.join("freight_costs.csv"),
        "id_city_origin;id_city_destination;freight_cost\n1;2;100,0\n1;3;150,0\n1;2;110,0\n",
    )
    .unwrap();

    let config = Config::load(dir.path()).unwrap();
    assert!(matches!(
        pipeline::run(&config),
        Err(Error::InsufficientData {
            stage: Stage::Training,
            rows: 3,
            ..
        })
    ));
}

#[test]
fn test_missing_input_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load(dir.path()).unwrap();
    let err = pipeline::run(&config).unwrap_err();
    assert!(matches!(err, Error::Io { stage: Stage::Load, .. }));
    assert!(err.to_string().starts_with("load: "));
}

#[test]
fn test_no_targets_writes_header_only_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_inputs(dir.path());
    write_config(dir.path(), "");

    let mut config = Config::load(dir.path()).unwrap();
    config.target_destinations.clear();
    let output = pipeline::run(&config).unwrap();

    assert!(output.historical_quotes.is_empty());
    assert!(output.projected_quotes.is_empty());
    for path in [&config.historical_quotes, &config.projected_quotes] {
        assert_eq!(
            fs::read_to_string(path).unwrap(),
            "id_city_origin,id_city_destination,freight_cost\n"
        );
        assert!(load_tabular(path).unwrap().is_empty());
    }
}
