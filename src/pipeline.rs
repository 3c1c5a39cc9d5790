//! Полный прогон бенчмарка
//!
//! load -> stratified split -> min-max fit on train -> class weights from train
//! -> every registry entry through the harness, in order -> persisted table.

use crate::config::BenchmarkConfig;
use crate::dataset::{load_dataset, partition_paths, write_partition};
use crate::error::Result;
use crate::evaluation::{aggregate, evaluate, ResultsTable};
use crate::models::build_registry;
use crate::preprocessing::{estimate_weights, stratified_split, MinMaxParams};
use crate::types::{Dataset, DatasetSummary};

pub struct BenchmarkPipeline {
    config: BenchmarkConfig,
}

impl BenchmarkPipeline {
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Прогон на входном файле из конфигурации
    pub fn run(&self) -> Result<ResultsTable> {
        let dataset = load_dataset(&self.config.input, &self.config.label_column)?;
        self.run_on_dataset(&dataset)
    }

    /// Прогон на уже загруженном наборе. Ошибки до цикла по реестру
    /// прерывают запуск, ошибки классификаторов отмечают только свою строку.
    pub fn run_on_dataset(&self, dataset: &Dataset) -> Result<ResultsTable> {
        let config = &self.config;
        tracing::info!(
            "Dataset: {} rows, {} features, class counts {:?}",
            dataset.n_samples(),
            dataset.n_features(),
            dataset.class_counts()
        );

        let split = stratified_split(dataset, config.test_fraction, config.seed)?;

        let scaler = MinMaxParams::fit(&split.train.features, &dataset.feature_names, &config.normalization)?;
        let train = split.train.with_features(scaler.apply(&split.train.features)?);
        let test = split.test.with_features(scaler.apply(&split.test.features)?);
        let feature_names = scaler.retained_names(&dataset.feature_names);

        if let Some(dir) = &config.partitions_dir {
            let (train_path, test_path) = partition_paths(&config.input, dir);
            for (path, partition) in [(&train_path, &train), (&test_path, &test)] {
                write_partition(path, &feature_names, &dataset.label_column, &dataset.class_names, partition)?;
            }
            tracing::info!(
                "Normalized partitions written to {} and {}",
                train_path.display(),
                test_path.display()
            );
        }

        let class_weights = estimate_weights(&train.labels)?;

        let mut registry = build_registry(&config.classifiers, &class_weights, config.seed);
        let table = aggregate(registry.iter_mut().map(|classifier| {
            let name = classifier.name().to_string();
            tracing::info!("Evaluating {}", name);

            let outcome = evaluate(classifier.as_mut(), &train, &test);
            match &outcome {
                Ok(eval) => {
                    tracing::info!(
                        "{}: accuracy {:.4}, auroc {:.4}, f1 {:.4}",
                        name,
                        eval.metrics.accuracy,
                        eval.metrics.auroc,
                        eval.metrics.f1
                    );
                    tracing::debug!(
                        "Classification report for {}:\n{}",
                        name,
                        eval.confusion.report(&dataset.class_names)
                    );
                }
                Err(e) => tracing::warn!("{} failed ({}): {}", name, e.kind(), e),
            }
            (name, outcome)
        }));

        table.persist(config.results_path())?;

        if config.json_report {
            let summary = DatasetSummary {
                source: config.input.display().to_string(),
                n_samples: dataset.n_samples(),
                n_features: dataset.n_features(),
                class_names: dataset.class_names.clone(),
                class_counts: dataset.class_counts(),
                train_samples: train.len(),
                test_samples: test.len(),
            };
            let report_path = config.results_path().with_extension("json");
            table.persist_json(report_path, config, &summary, &class_weights)?;
        }

        Ok(table)
    }
}

