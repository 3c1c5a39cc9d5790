//! Линейный дискриминантный анализ для двух классов с общей сжатой ковариацией

use ndarray::{Array1, Array2, Axis};

use super::{check_training_data, check_width, sigmoid, threshold, Classifier};
use crate::config::PriorSource;
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;
use crate::types::{class_counts, N_CLASSES};

const NAME: &str = "LinearDiscriminantAnalysis";

/// Обученный дискриминант `w.x + b`; положительные значения за класс 1
struct Discriminant {
    w: Array1<f64>,
    b: f64,
}

pub struct LinearDiscriminant {
    priors: PriorSource,
    class_weights: ClassWeights,
    shrinkage: f64,
    model: Option<Discriminant>,
    fitted_priors: [f64; N_CLASSES],
}

impl LinearDiscriminant {
    pub fn new(priors: PriorSource, class_weights: ClassWeights, shrinkage: f64) -> Self {
        Self {
            priors,
            class_weights,
            shrinkage,
            model: None,
            fitted_priors: [0.5; N_CLASSES],
        }
    }

    pub fn priors(&self) -> [f64; N_CLASSES] {
        self.fitted_priors
    }

    fn decision(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        check_width(NAME, model.w.len(), X)?;
        Ok(X.dot(&model.w) + model.b)
    }
}

impl Classifier for LinearDiscriminant {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        let counts = class_counts(y);
        if counts.iter().any(|&c| c == 0) || X.nrows() <= N_CLASSES {
            return Err(ClassifierError::Training(format!(
                "{}: need both classes and more than {} rows, got counts {:?}",
                NAME, N_CLASSES, counts
            )));
        }

        let n_features = X.ncols();
        let mut means = Vec::with_capacity(N_CLASSES);
        let mut scatter = Array2::<f64>::zeros((n_features, n_features));
        for class in 0..N_CLASSES {
            let rows: Vec<usize> = (0..y.len()).filter(|&i| y[i] == class).collect();
            let members = X.select(Axis(0), &rows);
            let mean = members
                .mean_axis(Axis(0))
                .ok_or_else(|| ClassifierError::Training(format!("{}: empty class {}", NAME, class)))?;
            let centered = &members - &mean;
            scatter += &centered.t().dot(&centered);
            means.push(mean);
        }

        // Объединённая внутриклассовая ковариация со сжатием к масштабированной единичной
        let mut cov = scatter / (X.nrows() - N_CLASSES) as f64;
        let trace_mean = cov.diag().sum() / n_features as f64;
        let target = if trace_mean > 0.0 { trace_mean } else { 1.0 };
        cov *= 1.0 - self.shrinkage;
        for j in 0..n_features {
            cov[[j, j]] += self.shrinkage * target + 1e-10 * target;
        }

        let diff = &means[1] - &means[0];
        let w = solve_linear_system(&cov, &diff)?;

        let priors = match self.priors {
            PriorSource::Empirical => ClassWeights::uniform().weighted_priors(y),
            PriorSource::ClassWeights => self.class_weights.weighted_priors(y),
        };
        let midpoint = (&means[0] + &means[1]) * 0.5;
        let b = -w.dot(&midpoint) + (priors[1] / priors[0]).ln();

        tracing::debug!("{} priors {:?}", NAME, priors);
        self.fitted_priors = priors;
        self.model = Some(Discriminant { w, b });
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        Ok(threshold(&self.predict_proba(X)?))
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        Ok(self.decision(X)?.mapv(sigmoid))
    }
}

/// Решение СЛАУ методом Гаусса с выбором главного элемента
fn solve_linear_system(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, ClassifierError> {
    let n = A.nrows();
    let mut augmented = Array2::<f64>::zeros((n, n + 1));
    augmented.slice_mut(ndarray::s![.., ..n]).assign(A);
    augmented.column_mut(n).assign(b);

    for i in 0..n {
        let mut max_row = i;
        let mut max_val = augmented[[i, i]].abs();
        for k in (i + 1)..n {
            if augmented[[k, i]].abs() > max_val {
                max_val = augmented[[k, i]].abs();
                max_row = k;
            }
        }
        if max_row != i {
            for j in 0..=n {
                augmented.swap([i, j], [max_row, j]);
            }
        }

        let pivot = augmented[[i, i]];
        if pivot.abs() < 1e-12 {
            return Err(ClassifierError::Training(format!(
                "{}: singular covariance matrix",
                NAME
            )));
        }
        for k in (i + 1)..n {
            let factor = augmented[[k, i]] / pivot;
            for j in i..=n {
                augmented[[k, j]] -= factor * augmented[[i, j]];
            }
        }
    }

    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let tail: f64 = ((i + 1)..n).map(|j| augmented[[i, j]] * x[j]).sum();
        x[i] = (augmented[[i, n]] - tail) / augmented[[i, i]];
    }
    Ok(x)
}
