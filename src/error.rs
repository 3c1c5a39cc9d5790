//! Типы ошибок пайплайна

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ошибки уровня запуска. Любая из них прерывает бенчмарк до записи
/// таблицы результатов.
#[derive(Debug, Error)]
pub enum QsarError {
    #[error("data format error: {0}")]
    DataFormat(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("feature '{feature}' has zero variance in the training partition")]
    DegenerateFeature { feature: String },

    #[error("class {class} has no training examples")]
    EmptyClass { class: usize },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl QsarError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, QsarError>;

/// Ошибки одного элемента реестра. Они записываются в его строку,
/// после чего прогон переходит к следующему классификатору.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("{classifier} cannot produce probability scores")]
    UnsupportedCapability { classifier: String },

    #[error("{classifier} did not converge within {iterations} iterations")]
    Convergence {
        classifier: String,
        iterations: usize,
    },

    #[error("{0} has not been fitted")]
    NotFitted(String),

    #[error("training failed: {0}")]
    Training(String),

    #[error("metric undefined: {0}")]
    UndefinedMetric(String),
}

impl ClassifierError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ClassifierError::UnsupportedCapability { .. } => FailureKind::UnsupportedCapability,
            ClassifierError::Convergence { .. } => FailureKind::Convergence,
            ClassifierError::NotFitted(_) | ClassifierError::Training(_) => FailureKind::Training,
            ClassifierError::UndefinedMetric(_) => FailureKind::UndefinedMetric,
        }
    }
}

/// Вид ошибки, записываемый в таблицу результатов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    UnsupportedCapability,
    Convergence,
    Training,
    UndefinedMetric,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::UnsupportedCapability => "UnsupportedCapabilityError",
            FailureKind::Convergence => "ConvergenceError",
            FailureKind::Training => "TrainingError",
            FailureKind::UndefinedMetric => "UndefinedMetricError",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
