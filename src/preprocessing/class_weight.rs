//! Веса классов обратно пропорционально частоте для несбалансированных данных

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{QsarError, Result};
use crate::types::N_CLASSES;

/// Вес каждого класса, `n_total / (n_classes * count(c))`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassWeights {
    weights: [f64; N_CLASSES],
}

/// Сбалансированные веса классов по меткам train
pub fn estimate_weights(train_labels: &Array1<usize>) -> Result<ClassWeights> {
    ClassWeights::balanced(train_labels)
}

impl ClassWeights {
    pub fn balanced(train_labels: &Array1<usize>) -> Result<Self> {
        let mut counts = [0usize; N_CLASSES];
        for &label in train_labels.iter() {
            if label >= N_CLASSES {
                return Err(QsarError::DataFormat(format!(
                    "label {} is not a binary class code",
                    label
                )));
            }
            counts[label] += 1;
        }
        if let Some(class) = counts.iter().position(|&c| c == 0) {
            return Err(QsarError::EmptyClass { class });
        }

        let n_total = train_labels.len() as f64;
        let mut weights = [0.0; N_CLASSES];
        for (w, &count) in weights.iter_mut().zip(counts.iter()) {
            *w = n_total / (N_CLASSES as f64 * count as f64);
        }

        tracing::info!("Class balance in training set: {:?}", weights);
        Ok(Self { weights })
    }

    pub fn uniform() -> Self {
        Self {
            weights: [1.0; N_CLASSES],
        }
    }

    pub fn weight(&self, class: usize) -> f64 {
        self.weights[class]
    }

    pub fn as_array(&self) -> [f64; N_CLASSES] {
        self.weights
    }

    /// Априорные вероятности по взвешенной выборке: доля класса
    /// в суммарном весе. Сбалансированные веса дают равные априорные.
    pub fn weighted_priors(&self, labels: &Array1<usize>) -> [f64; N_CLASSES] {
        let mut mass = [0.0; N_CLASSES];
        for &label in labels.iter() {
            if label < N_CLASSES {
                mass[label] += self.weights[label];
            }
        }
        let total: f64 = mass.iter().sum();
        if total > 0.0 {
            for m in mass.iter_mut() {
                *m /= total;
            }
        }
        mass
    }

    /// Вес каждой строки по её метке
    pub fn sample_weights(&self, labels: &Array1<usize>) -> Array1<f64> {
        labels.mapv(|label| self.weights[label.min(N_CLASSES - 1)])
    }
}
