//! Типы данных, общие для этапов пайплайна

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

/// Число классов в наборе данных
pub const N_CLASSES: usize = 2;

/// Код положительного класса (к нему относятся вероятности)
pub const POSITIVE_CLASS: usize = 1;

/// Размеченная таблица дескрипторов, прочитанная с диска.
///
/// Метки закодированы 0/1; `class_names[c]` хранит исходное значение
/// класса `c` в файле.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub label_column: String,
    pub class_names: [String; N_CLASSES],
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
}

impl Dataset {
    pub fn n_samples(&self) -> usize {
        self.features.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn class_counts(&self) -> [usize; N_CLASSES] {
        class_counts(&self.labels)
    }

    /// Доля строк положительного класса
    pub fn positive_ratio(&self) -> f64 {
        positive_ratio(&self.labels)
    }

    /// Часть набора из указанных строк в указанном порядке
    pub fn select(&self, indices: &[usize]) -> Partition {
        Partition {
            features: self.features.select(Axis(0), indices),
            labels: self.labels.select(Axis(0), indices),
            indices: indices.to_vec(),
        }
    }
}

/// Одна из частей разбиения train/test
#[derive(Debug, Clone)]
pub struct Partition {
    pub features: Array2<f64>,
    pub labels: Array1<usize>,
    /// Номера строк в исходном наборе
    pub indices: Vec<usize>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn class_counts(&self) -> [usize; N_CLASSES] {
        class_counts(&self.labels)
    }

    pub fn positive_ratio(&self) -> f64 {
        positive_ratio(&self.labels)
    }

    /// Те же строки с новой матрицей признаков (например, после нормализации)
    pub fn with_features(&self, features: Array2<f64>) -> Partition {
        Partition {
            features,
            labels: self.labels.clone(),
            indices: self.indices.clone(),
        }
    }
}

/// Сводка по набору данных для отчёта о запуске
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub source: String,
    pub n_samples: usize,
    pub n_features: usize,
    pub class_names: [String; N_CLASSES],
    pub class_counts: [usize; N_CLASSES],
    pub train_samples: usize,
    pub test_samples: usize,
}

pub fn class_counts(labels: &Array1<usize>) -> [usize; N_CLASSES] {
    let mut counts = [0usize; N_CLASSES];
    for &label in labels.iter() {
        if label < N_CLASSES {
            counts[label] += 1;
        }
    }
    counts
}

pub fn positive_ratio(labels: &Array1<usize>) -> f64 {
    if labels.is_empty() {
        return 0.0;
    }
    class_counts(labels)[POSITIVE_CLASS] as f64 / labels.len() as f64
}
