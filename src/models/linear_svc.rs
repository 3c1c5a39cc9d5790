//! Линейный SVM, обучаемый субградиентным спуском по hinge loss

use ndarray::{Array1, Array2};

use super::{check_training_data, check_width, Classifier};
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;

const NAME: &str = "LinearSVC";

/// Остановка, когда эпоха сдвигает параметры меньше чем на это значение
const WEIGHT_CHANGE_TOL: f64 = 1e-4;

/// Выдаёт только метки; `predict_proba` не поддерживается
pub struct LinearSvc {
    c: f64,
    learning_rate: f64,
    max_iter: usize,
    class_weights: Option<ClassWeights>,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl LinearSvc {
    pub fn new(c: f64, learning_rate: f64, max_iter: usize, class_weights: Option<ClassWeights>) -> Self {
        Self {
            c,
            learning_rate,
            max_iter,
            class_weights,
            weights: None,
            bias: 0.0,
        }
    }

    /// Знаковая оценка `w.x + b`; положительная означает класс 1
    pub fn decision_function(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        check_width(NAME, weights.len(), X)?;
        Ok(X.dot(weights) + self.bias)
    }
}

impl Classifier for LinearSvc {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        let (n_samples, n_features) = X.dim();

        let class_weights = self.class_weights.unwrap_or_else(ClassWeights::uniform);
        let y_signed = y.mapv(|label| if label == 0 { -1.0 } else { 1.0 });
        let lambda = 1.0 / (2.0 * n_samples as f64 * self.c);

        let mut w = Array1::<f64>::zeros(n_features);
        let mut b = 0.0;

        for epoch in 0..self.max_iter {
            let eta = self.learning_rate / (1.0 + epoch as f64 * 0.01);
            let prev_w = w.clone();
            let prev_b = b;

            for (i, row) in X.rows().into_iter().enumerate() {
                let y_i = y_signed[i];
                let margin = y_i * (row.dot(&w) + b);

                w *= 1.0 - 2.0 * eta * lambda;
                if margin < 1.0 {
                    let cw = class_weights.weight(y[i]);
                    w.scaled_add(eta * cw * y_i, &row);
                    b += eta * cw * y_i;
                }
            }

            let change = (&w - &prev_w).mapv(|d| d * d).sum() + (b - prev_b).powi(2);
            if change.sqrt() < WEIGHT_CHANGE_TOL {
                tracing::debug!("{} settled after {} epochs", NAME, epoch + 1);
                break;
            }
        }

        self.weights = Some(w);
        self.bias = b;
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        Ok(self.decision_function(X)?.mapv(|d| usize::from(d > 0.0)))
    }

    fn predict_proba(&self, _X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        Err(ClassifierError::UnsupportedCapability {
            classifier: NAME.to_string(),
        })
    }
}
