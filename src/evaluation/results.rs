//! Таблица результатов: порядок реестра, запись в CSV и JSON-отчёт

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::BenchmarkConfig;
use crate::dataset::{csv_write_error, ensure_parent_dir};
use crate::error::{ClassifierError, FailureKind, QsarError, Result};
use crate::evaluation::harness::Evaluation;
use crate::evaluation::metrics::{Metric, MetricsRecord};
use crate::preprocessing::ClassWeights;
use crate::types::DatasetSummary;

/// Порядок колонок в сохраняемой таблице
pub const RESULTS_HEADER: [&str; 8] = [
    "classifier",
    "accuracy",
    "auroc",
    "precision",
    "recall",
    "f1-score",
    "status",
    "train_seconds",
];

/// Итог одного элемента реестра: метрики либо ошибка,
/// на которой он остановился
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub classifier: String,
    pub metrics: Option<MetricsRecord>,
    pub failure: Option<FailureKind>,
    pub message: Option<String>,
    pub train_seconds: Option<f64>,
}

impl ResultRow {
    pub fn from_outcome(classifier: &str, outcome: std::result::Result<Evaluation, ClassifierError>) -> Self {
        match outcome {
            Ok(eval) => Self {
                classifier: classifier.to_string(),
                metrics: Some(eval.metrics),
                failure: None,
                message: None,
                train_seconds: Some(eval.train_seconds),
            },
            Err(e) => Self {
                classifier: classifier.to_string(),
                metrics: None,
                failure: Some(e.kind()),
                message: Some(e.to_string()),
                train_seconds: None,
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.metrics.is_some()
    }

    /// `ok` или вид ошибки
    pub fn status(&self) -> &'static str {
        match self.failure {
            Some(kind) => kind.as_str(),
            None => "ok",
        }
    }

    fn to_record(&self) -> Vec<String> {
        let mut record = vec![self.classifier.clone()];
        match &self.metrics {
            Some(m) => record.extend(
                [m.accuracy, m.auroc, m.precision, m.recall, m.f1]
                    .iter()
                    .map(|v| v.to_string()),
            ),
            None => record.extend(std::iter::repeat(String::new()).take(5)),
        }
        record.push(self.status().to_string());
        record.push(self.train_seconds.map(|s| format!("{:.6}", s)).unwrap_or_default());
        record
    }
}

/// По строке на каждый элемент реестра, в порядке реестра
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsTable {
    pub rows: Vec<ResultRow>,
}

/// Собирает итоги классификаторов в таблицу, сохраняя порядок
pub fn aggregate<I>(outcomes: I) -> ResultsTable
where
    I: IntoIterator<Item = (String, std::result::Result<Evaluation, ClassifierError>)>,
{
    let mut table = ResultsTable::default();
    for (classifier, outcome) in outcomes {
        table.push(ResultRow::from_outcome(&classifier, outcome));
    }
    table
}

impl ResultsTable {
    pub fn push(&mut self, row: ResultRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failures(&self) -> impl Iterator<Item = &ResultRow> {
        self.rows.iter().filter(|r| !r.is_ok())
    }

    /// Лучшая успешная строка по `metric`; при равенстве побеждает более ранняя
    pub fn best_by(&self, metric: Metric) -> Option<&MetricsRecord> {
        self.rows
            .iter()
            .filter_map(|r| r.metrics.as_ref())
            .fold(None, |best: Option<&MetricsRecord>, m| match best {
                Some(b) if b.get(metric) >= m.get(metric) => Some(b),
                _ => Some(m),
            })
    }

    /// Запись таблицы в CSV с фиксированным порядком колонок
    pub fn persist<P: AsRef<Path>>(&self, destination: P) -> Result<()> {
        let path = destination.as_ref();
        ensure_parent_dir(path)?;

        let mut writer = csv::Writer::from_path(path).map_err(|e| csv_write_error(path, e))?;
        writer
            .write_record(RESULTS_HEADER)
            .map_err(|e| csv_write_error(path, e))?;
        for row in &self.rows {
            writer
                .write_record(row.to_record())
                .map_err(|e| csv_write_error(path, e))?;
        }
        writer.flush().map_err(|e| QsarError::io(path, e))?;

        tracing::info!("Results for {} classifiers written to {}", self.rows.len(), path.display());
        Ok(())
    }

    /// Запись полного отчёта о запуске в JSON
    pub fn persist_json<P: AsRef<Path>>(
        &self,
        destination: P,
        config: &BenchmarkConfig,
        dataset: &DatasetSummary,
        class_weights: &ClassWeights,
    ) -> Result<()> {
        let path = destination.as_ref();
        ensure_parent_dir(path)?;

        let report = RunReport {
            generated_at: Utc::now(),
            config: config.clone(),
            dataset: dataset.clone(),
            class_weights: *class_weights,
            results: self.clone(),
        };
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json).map_err(|e| QsarError::io(path, e))?;

        tracing::info!("Run report written to {}", path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub config: BenchmarkConfig,
    pub dataset: DatasetSummary,
    pub class_weights: ClassWeights,
    pub results: ResultsTable,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::metrics::ConfusionMatrix;

    fn evaluation(name: &str, accuracy: f64) -> Evaluation {
        Evaluation {
            metrics: MetricsRecord {
                classifier: name.to_string(),
                accuracy,
                auroc: 0.9,
                precision: 0.8,
                recall: 0.7,
                f1: 0.75,
            },
            confusion: ConfusionMatrix::default(),
            train_seconds: 0.25,
        }
    }

    fn table() -> ResultsTable {
        aggregate(vec![
            ("A".to_string(), Ok(evaluation("A", 0.8))),
            (
                "B".to_string(),
                Err(ClassifierError::UnsupportedCapability {
                    classifier: "B".to_string(),
                }),
            ),
            ("C".to_string(), Ok(evaluation("C", 0.9))),
        ])
    }

    #[test]
    fn aggregate_keeps_order_and_failures() {
        let table = table();
        let names: Vec<&str> = table.rows.iter().map(|r| r.classifier.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(table.failures().count(), 1);
        assert_eq!(table.rows[1].status(), "UnsupportedCapabilityError");
    }

    #[test]
    fn best_by_skips_failed_rows() {
        let table = table();
        assert_eq!(table.best_by(Metric::Accuracy).map(|m| m.classifier.as_str()), Some("C"));
        // auroc везде одинаковый: выигрывает первая строка
        assert_eq!(table.best_by(Metric::Auroc).map(|m| m.classifier.as_str()), Some("A"));
        assert!(ResultsTable::default().best_by(Metric::F1).is_none());
    }

    #[test]
    fn failed_rows_have_empty_metric_cells() {
        let record = table().rows[1].to_record();
        assert_eq!(record.len(), RESULTS_HEADER.len());
        assert_eq!(record[0], "B");
        assert!(record[1..6].iter().all(String::is_empty));
        assert_eq!(record[6], "UnsupportedCapabilityError");
    }

    #[test]
    fn unwritable_destination_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        match table().persist(dir.path()) {
            Err(QsarError::Io { path, .. }) => assert_eq!(path, dir.path()),
            other => panic!("expected Io, got {:?}", other),
        }
    }

    #[test]
    fn persisted_csv_has_header_and_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.csv");
        table().persist(&path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], RESULTS_HEADER.join(","));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("B,,,,,,UnsupportedCapabilityError"));
    }
}
