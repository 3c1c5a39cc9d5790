//! Логистическая регрессия с L2-регуляризацией, пакетный градиентный спуск

use ndarray::{Array1, Array2};

use super::{check_training_data, check_width, sigmoid, threshold, Classifier};
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;

const NAME: &str = "LogisticRegression";

pub struct LogisticRegression {
    learning_rate: f64,
    max_iter: usize,
    tol: f64,
    l2: f64,
    class_weights: Option<ClassWeights>,
    coef: Option<Array1<f64>>,
    intercept: f64,
    n_iter: usize,
}

impl LogisticRegression {
    pub fn new(
        learning_rate: f64,
        max_iter: usize,
        tol: f64,
        l2: f64,
        class_weights: Option<ClassWeights>,
    ) -> Self {
        Self {
            learning_rate,
            max_iter,
            tol,
            l2,
            class_weights,
            coef: None,
            intercept: 0.0,
            n_iter: 0,
        }
    }

    /// Число итераций последнего успешного обучения
    pub fn n_iter(&self) -> usize {
        self.n_iter
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        let (n_samples, n_features) = X.dim();

        let sample_weights = self
            .class_weights
            .unwrap_or_else(ClassWeights::uniform)
            .sample_weights(y);
        let total_weight = sample_weights.sum();
        let targets = y.mapv(|label| label as f64);

        // Шаг относительно константы Липшица градиента усреднённого log-loss
        let max_row_norm = X
            .rows()
            .into_iter()
            .map(|row| row.dot(&row) + 1.0)
            .fold(0.0, f64::max);
        let step = self.learning_rate / (0.25 * max_row_norm + self.l2);

        let mut coef = Array1::<f64>::zeros(n_features);
        let mut intercept = 0.0;

        for iter in 1..=self.max_iter {
            let z = X.dot(&coef) + intercept;
            let residual = (z.mapv(sigmoid) - &targets) * &sample_weights / total_weight;

            let grad_coef = X.t().dot(&residual) + &coef * self.l2;
            let grad_intercept = residual.sum();

            let grad_norm = (grad_coef.dot(&grad_coef) + grad_intercept * grad_intercept).sqrt();
            if grad_norm < self.tol {
                tracing::debug!("{} converged after {} iterations", NAME, iter);
                self.coef = Some(coef);
                self.intercept = intercept;
                self.n_iter = iter;
                return Ok(());
            }

            coef.scaled_add(-step, &grad_coef);
            intercept -= step * grad_intercept;
        }

        tracing::warn!(
            "{} did not reach tol {} in {} iterations over {} rows",
            NAME,
            self.tol,
            self.max_iter,
            n_samples
        );
        Err(ClassifierError::Convergence {
            classifier: NAME.to_string(),
            iterations: self.max_iter,
        })
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        Ok(threshold(&self.predict_proba(X)?))
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        let coef = self
            .coef
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        check_width(NAME, coef.len(), X)?;
        Ok((X.dot(coef) + self.intercept).mapv(sigmoid))
    }
}
