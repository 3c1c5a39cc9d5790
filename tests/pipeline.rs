//! Сквозные прогоны через `BenchmarkPipeline`

mod common;

use std::path::Path;

use qsar_bench::config::{BenchmarkConfig, ClassifierConfig, DegeneratePolicy};
use qsar_bench::evaluation::results::{RunReport, RESULTS_HEADER};
use qsar_bench::evaluation::Metric;
use qsar_bench::pipeline::BenchmarkPipeline;
use qsar_bench::{FailureKind, QsarError};

use common::{read_csv, write_descriptor_table};

fn knn_and_forest() -> Vec<ClassifierConfig> {
    vec![
        ClassifierConfig::KNeighbors { n_neighbors: 3 },
        ClassifierConfig::RandomForest {
            n_estimators: 100,
            max_depth: None,
            max_features: None,
            class_weighted: true,
            seed: None,
        },
    ]
}

fn config_for(input: &Path, output: &Path, classifiers: Vec<ClassifierConfig>) -> BenchmarkConfig {
    BenchmarkConfig {
        input: input.to_path_buf(),
        output_dir: output.to_path_buf(),
        seed: 42,
        classifiers,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// Успешный прогон
// ---------------------------------------------------------------------------

#[test]
fn benchmarks_every_registry_entry_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.Class.csv", 70, 30, 10, 4.0, 42);
    let output = dir.path().join("results");

    let config = config_for(&input, &output, knn_and_forest());
    let table = BenchmarkPipeline::new(config).unwrap().run().unwrap();

    let names: Vec<&str> = table.rows.iter().map(|r| r.classifier.as_str()).collect();
    assert_eq!(names, vec!["KNeighborsClassifier", "RandomForestClassifier"]);

    for row in &table.rows {
        let m = row.metrics.as_ref().expect("both entries should succeed");
        for value in [m.accuracy, m.auroc, m.precision, m.recall, m.f1] {
            assert!((0.0..=1.0).contains(&value), "{} out of range for {}", value, row.classifier);
        }
        assert!(row.train_seconds.unwrap() >= 0.0);
    }
    assert!(table.best_by(Metric::Auroc).is_some());
}

#[test]
fn results_csv_has_fixed_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.Class.csv", 70, 30, 10, 4.0, 42);
    let output = dir.path().join("results");

    let config = config_for(&input, &output, knn_and_forest());
    let results_path = config.results_path();
    BenchmarkPipeline::new(config).unwrap().run().unwrap();

    let (header, rows) = read_csv(&results_path);
    assert_eq!(header, RESULTS_HEADER.to_vec());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][0], "KNeighborsClassifier");
    assert_eq!(rows[1][0], "RandomForestClassifier");
    for row in &rows {
        assert_eq!(row[6], "ok");
        let accuracy: f64 = row[1].parse().unwrap();
        assert!((0.0..=1.0).contains(&accuracy));
    }
}

#[test]
fn same_seed_gives_identical_tables() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.csv", 70, 30, 10, 2.0, 11);

    let run = |out: &str| {
        let config = config_for(&input, &dir.path().join(out), knn_and_forest());
        BenchmarkPipeline::new(config).unwrap().run().unwrap()
    };
    let first = run("a");
    let second = run("b");

    let metrics = |t: &qsar_bench::ResultsTable| -> Vec<_> {
        t.rows.iter().map(|r| r.metrics.clone()).collect()
    };
    assert_eq!(metrics(&first), metrics(&second));
}

#[test]
fn writes_normalized_partitions_when_asked() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.Class.csv", 70, 30, 10, 4.0, 42);
    let partitions = dir.path().join("partitions");

    let mut config = config_for(&input, &dir.path().join("results"), knn_and_forest());
    config.partitions_dir = Some(partitions.clone());
    BenchmarkPipeline::new(config).unwrap().run().unwrap();

    let (train_header, train_rows) = read_csv(&partitions.join("ds.Class.tr.norm.csv"));
    let (_, test_rows) = read_csv(&partitions.join("ds.Class.ts.norm.csv"));
    assert_eq!(train_header.last().map(String::as_str), Some("Class"));
    assert_eq!(train_header.len(), 11);
    assert_eq!(train_rows.len(), 80);
    assert_eq!(test_rows.len(), 20);

    for row in &train_rows {
        for cell in &row[..10] {
            let v: f64 = cell.parse().unwrap();
            assert!((0.0..=1.0).contains(&v));
        }
        assert!(row[10] == "0" || row[10] == "1");
    }
}

#[test]
fn json_report_carries_config_and_table() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.csv", 40, 20, 4, 4.0, 3);
    let output = dir.path().join("out");

    let mut config = config_for(&input, &output, vec![ClassifierConfig::GaussianNb { var_smoothing: 1e-9 }]);
    config.json_report = true;
    let report_path = config.results_path().with_extension("json");
    BenchmarkPipeline::new(config).unwrap().run().unwrap();

    let report: RunReport = serde_json::from_str(&std::fs::read_to_string(report_path).unwrap()).unwrap();
    assert_eq!(report.config.seed, 42);
    assert_eq!(report.dataset.n_samples, 60);
    assert_eq!(report.dataset.train_samples + report.dataset.test_samples, 60);
    assert_eq!(report.results.rows.len(), 1);
    assert_eq!(report.results.rows[0].classifier, "GaussianNB");
}

// ---------------------------------------------------------------------------
// Обработка ошибок
// ---------------------------------------------------------------------------

#[test]
fn failing_entry_is_recorded_and_the_rest_still_run() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.csv", 70, 30, 10, 4.0, 42);
    let output = dir.path().join("results");

    let classifiers = vec![
        ClassifierConfig::KNeighbors { n_neighbors: 3 },
        ClassifierConfig::LinearSvc {
            c: 1.0,
            learning_rate: 0.01,
            max_iter: 100,
            class_weighted: true,
        },
        ClassifierConfig::GaussianNb { var_smoothing: 1e-9 },
    ];
    let config = config_for(&input, &output, classifiers);
    let results_path = config.results_path();
    let table = BenchmarkPipeline::new(config).unwrap().run().unwrap();

    assert_eq!(table.len(), 3);
    assert!(table.rows[0].is_ok());
    assert_eq!(table.rows[1].failure, Some(FailureKind::UnsupportedCapability));
    assert!(table.rows[1].metrics.is_none());
    assert!(table.rows[2].is_ok());

    let (_, rows) = read_csv(&results_path);
    assert_eq!(rows[1][0], "LinearSVC");
    assert!(rows[1][1..6].iter().all(String::is_empty));
    assert_eq!(rows[1][6], "UnsupportedCapabilityError");
}

#[test]
fn non_converging_entry_is_marked() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_descriptor_table(dir.path(), "ds.csv", 40, 20, 4, 1.0, 5);

    let classifiers = vec![ClassifierConfig::LogisticRegression {
        learning_rate: 1.0,
        max_iter: 2,
        tol: 1e-12,
        l2: 1e-2,
        class_weighted: true,
    }];
    let config = config_for(&input, &dir.path().join("out"), classifiers);
    let table = BenchmarkPipeline::new(config).unwrap().run().unwrap();
    assert_eq!(table.rows[0].status(), "ConvergenceError");
}

#[test]
fn degenerate_feature_aborts_under_fail_policy() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("flat.csv");
    let mut body = String::from("a,flat,Class\n");
    for i in 0..20 {
        body.push_str(&format!("{},3.0,{}\n", i, i % 2));
    }
    std::fs::write(&input, body).unwrap();

    let output = dir.path().join("out");
    let mut config = config_for(&input, &output, knn_and_forest());
    config.normalization.degenerate = DegeneratePolicy::Fail;
    let results_path = config.results_path();

    let err = BenchmarkPipeline::new(config).unwrap().run().unwrap_err();
    assert!(matches!(err, QsarError::DegenerateFeature { .. }));
    assert!(!results_path.exists());
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let mut config = BenchmarkConfig::default();
    config.test_fraction = 1.5;
    assert!(matches!(BenchmarkPipeline::new(config), Err(QsarError::Config(_))));
}
