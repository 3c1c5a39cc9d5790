//! Конфигурация бенчмарка
//!
//! Все настройки запуска собраны в [`BenchmarkConfig`]: путь к данным,
//! параметры разбиения и нормализации, упорядоченный реестр
//! классификаторов. Конфигурация читается из JSON и уточняется флагами CLI.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{QsarError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchmarkConfig {
    /// Таблица дескрипторов (CSV с заголовком)
    pub input: PathBuf,
    pub label_column: String,
    pub test_fraction: f64,
    pub seed: u64,
    /// Каталог для таблицы результатов и JSON-отчёта
    pub output_dir: PathBuf,
    pub results_file: String,
    /// Если задан, сюда пишутся нормализованные train/test
    pub partitions_dir: Option<PathBuf>,
    pub json_report: bool,
    pub normalization: NormalizationConfig,
    pub classifiers: Vec<ClassifierConfig>,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("datasets/ds.Class.csv"),
            label_column: "Class".to_string(),
            test_fraction: 0.2,
            seed: 42,
            output_dir: PathBuf::from("results"),
            results_file: "ML_statistics.csv".to_string(),
            partitions_dir: None,
            json_report: false,
            normalization: NormalizationConfig::default(),
            classifiers: default_registry(),
        }
    }
}

impl BenchmarkConfig {
    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(&self.results_file)
    }

    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(QsarError::Config("label_column must not be empty".to_string()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(QsarError::Config(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.results_file.trim().is_empty() {
            return Err(QsarError::Config("results_file must not be empty".to_string()));
        }
        if self.classifiers.is_empty() {
            return Err(QsarError::Config("classifier registry is empty".to_string()));
        }
        for classifier in &self.classifiers {
            classifier.validate()?;
        }
        Ok(())
    }
}

/// Загрузка конфигурации из JSON-файла
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BenchmarkConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| QsarError::io(path, e))?;
    let config: BenchmarkConfig = serde_json::from_str(&content)?;
    Ok(config)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub degenerate: DegeneratePolicy,
    /// Ограничение значений отрезком [0, 1]. По умолчанию выключено: тестовые
    /// строки вне диапазона train сохраняют свои значения.
    pub clip: bool,
}

/// Обработка признака, постоянного на train
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneratePolicy {
    /// Прервать с `DegenerateFeature`
    Fail,
    /// Единичный масштаб: признак переходит в `v - min`
    #[default]
    Zero,
    /// Исключить признак из матрицы
    Drop,
}

/// Источник априорных вероятностей для дискриминантного анализа
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorSource {
    /// Частоты классов в train
    Empirical,
    /// Доля класса в суммарном весе train при весах классов запуска
    #[default]
    ClassWeights,
}

/// Элемент реестра: алгоритм и его гиперпараметры
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum ClassifierConfig {
    GaussianNb {
        #[serde(default = "default_var_smoothing")]
        var_smoothing: f64,
    },
    KNeighbors {
        #[serde(default = "default_neighbors")]
        n_neighbors: usize,
    },
    DecisionTree {
        #[serde(default)]
        max_depth: Option<usize>,
        #[serde(default = "default_min_samples_split")]
        min_samples_split: usize,
        #[serde(default = "default_true")]
        class_weighted: bool,
    },
    RandomForest {
        #[serde(default = "default_estimators")]
        n_estimators: usize,
        #[serde(default)]
        max_depth: Option<usize>,
        /// Число признаков на дерево; по умолчанию все
        #[serde(default)]
        max_features: Option<usize>,
        #[serde(default = "default_true")]
        class_weighted: bool,
        /// По умолчанию зерно запуска
        #[serde(default)]
        seed: Option<u64>,
    },
    LinearDiscriminant {
        #[serde(default)]
        priors: PriorSource,
        #[serde(default = "default_shrinkage")]
        shrinkage: f64,
    },
    LogisticRegression {
        /// Шаг относительно оценки кривизны функции потерь
        #[serde(default = "default_step_scale")]
        learning_rate: f64,
        #[serde(default = "default_logistic_max_iter")]
        max_iter: usize,
        #[serde(default = "default_tol")]
        tol: f64,
        #[serde(default = "default_l2")]
        l2: f64,
        #[serde(default = "default_true")]
        class_weighted: bool,
    },
    LinearSvc {
        #[serde(default = "default_c")]
        c: f64,
        #[serde(default = "default_learning_rate")]
        learning_rate: f64,
        #[serde(default = "default_max_iter")]
        max_iter: usize,
        #[serde(default = "default_true")]
        class_weighted: bool,
    },
}

impl ClassifierConfig {
    /// Имя для таблицы результатов
    pub fn name(&self) -> &'static str {
        match self {
            ClassifierConfig::GaussianNb { .. } => "GaussianNB",
            ClassifierConfig::KNeighbors { .. } => "KNeighborsClassifier",
            ClassifierConfig::DecisionTree { .. } => "DecisionTreeClassifier",
            ClassifierConfig::RandomForest { .. } => "RandomForestClassifier",
            ClassifierConfig::LinearDiscriminant { .. } => "LinearDiscriminantAnalysis",
            ClassifierConfig::LogisticRegression { .. } => "LogisticRegression",
            ClassifierConfig::LinearSvc { .. } => "LinearSVC",
        }
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(QsarError::Config(format!("{}: {}", self.name(), msg)));
        match *self {
            ClassifierConfig::GaussianNb { var_smoothing } if var_smoothing < 0.0 => {
                invalid(format!("var_smoothing must be >= 0, got {}", var_smoothing))
            }
            ClassifierConfig::KNeighbors { n_neighbors: 0 } => {
                invalid("n_neighbors must be >= 1".to_string())
            }
            ClassifierConfig::DecisionTree {
                min_samples_split, ..
            } if min_samples_split < 2 => invalid("min_samples_split must be >= 2".to_string()),
            ClassifierConfig::RandomForest { n_estimators: 0, .. } => {
                invalid("n_estimators must be >= 1".to_string())
            }
            ClassifierConfig::RandomForest {
                max_features: Some(0),
                ..
            } => invalid("max_features must be >= 1".to_string()),
            ClassifierConfig::LinearDiscriminant { shrinkage, .. }
                if !(0.0..=1.0).contains(&shrinkage) =>
            {
                invalid(format!("shrinkage must lie in [0, 1], got {}", shrinkage))
            }
            ClassifierConfig::LogisticRegression {
                learning_rate,
                max_iter,
                ..
            }
            | ClassifierConfig::LinearSvc {
                learning_rate,
                max_iter,
                ..
            } if learning_rate <= 0.0 || max_iter == 0 => {
                invalid("learning_rate must be > 0 and max_iter >= 1".to_string())
            }
            ClassifierConfig::LinearSvc { c, .. } if c <= 0.0 => {
                invalid(format!("c must be > 0, got {}", c))
            }
            _ => Ok(()),
        }
    }
}

/// Реестр по умолчанию
pub fn default_registry() -> Vec<ClassifierConfig> {
    vec![
        ClassifierConfig::GaussianNb {
            var_smoothing: default_var_smoothing(),
        },
        ClassifierConfig::KNeighbors {
            n_neighbors: default_neighbors(),
        },
        ClassifierConfig::DecisionTree {
            max_depth: None,
            min_samples_split: default_min_samples_split(),
            class_weighted: true,
        },
        ClassifierConfig::RandomForest {
            n_estimators: default_estimators(),
            max_depth: None,
            max_features: None,
            class_weighted: true,
            seed: None,
        },
    ]
}

fn default_var_smoothing() -> f64 { 1e-9 }
fn default_neighbors() -> usize { 3 }
fn default_min_samples_split() -> usize { 2 }
fn default_estimators() -> usize { 100 }
fn default_shrinkage() -> f64 { 1e-4 }
fn default_step_scale() -> f64 { 1.0 }
fn default_logistic_max_iter() -> usize { 5000 }
fn default_learning_rate() -> f64 { 0.01 }
fn default_max_iter() -> usize { 1000 }
fn default_tol() -> f64 { 1e-4 }
fn default_l2() -> f64 { 1e-2 }
fn default_c() -> f64 { 1.0 }
fn default_true() -> bool { true }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = BenchmarkConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.classifiers.len(), 4);
        assert_eq!(config.results_path(), PathBuf::from("results/ML_statistics.csv"));
    }

    #[test]
    fn test_fraction_out_of_range_is_rejected() {
        let mut config = BenchmarkConfig::default();
        config.test_fraction = 1.0;
        assert!(matches!(config.validate(), Err(QsarError::Config(_))));
        config.test_fraction = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn registry_parses_from_json_with_defaults() {
        let json = r#"{
            "label_column": "Activity",
            "classifiers": [
                { "algorithm": "k_neighbors", "n_neighbors": 5 },
                { "algorithm": "random_forest", "n_estimators": 10 },
                { "algorithm": "linear_discriminant", "priors": "empirical" }
            ]
        }"#;
        let config: BenchmarkConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.label_column, "Activity");
        assert_eq!(config.seed, 42);
        assert_eq!(
            config.classifiers[0],
            ClassifierConfig::KNeighbors { n_neighbors: 5 }
        );
        match &config.classifiers[1] {
            ClassifierConfig::RandomForest {
                n_estimators,
                class_weighted,
                seed,
                ..
            } => {
                assert_eq!(*n_estimators, 10);
                assert!(*class_weighted);
                assert_eq!(*seed, None);
            }
            other => panic!("unexpected entry {:?}", other),
        }
        assert_eq!(config.classifiers[2].name(), "LinearDiscriminantAnalysis");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_neighbors_is_rejected() {
        let entry = ClassifierConfig::KNeighbors { n_neighbors: 0 };
        assert!(entry.validate().is_err());
    }
}
