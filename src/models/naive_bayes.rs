//! Гауссовский наивный Байес

use ndarray::{Array1, Array2, Axis};

use super::{check_training_data, check_width, Classifier};
use crate::error::ClassifierError;
use crate::types::N_CLASSES;

const NAME: &str = "GaussianNB";

pub struct GaussianNb {
    /// Добавка к дисперсиям, доля от наибольшей дисперсии признака
    var_smoothing: f64,
    log_priors: [f64; N_CLASSES],
    /// means[[class, feature]]
    means: Option<Array2<f64>>,
    variances: Option<Array2<f64>>,
}

impl GaussianNb {
    pub fn new(var_smoothing: f64) -> Self {
        Self {
            var_smoothing,
            log_priors: [0.0; N_CLASSES],
            means: None,
            variances: None,
        }
    }

    /// Совместное логарифмическое правдоподобие `log P(c) + sum_j log N(x_j | mu_cj, var_cj)` по классам
    fn joint_log_likelihood(&self, X: &Array2<f64>) -> Result<Array2<f64>, ClassifierError> {
        let means = self.means.as_ref().ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        let variances = self
            .variances
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        check_width(NAME, means.ncols(), X)?;

        let mut jll = Array2::zeros((X.nrows(), N_CLASSES));
        for class in 0..N_CLASSES {
            let mu = means.row(class);
            let var = variances.row(class);
            let log_norm: f64 = var
                .iter()
                .map(|&v| -0.5 * (2.0 * std::f64::consts::PI * v).ln())
                .sum();
            for (i, row) in X.rows().into_iter().enumerate() {
                let quad: f64 = row
                    .iter()
                    .zip(mu.iter().zip(var.iter()))
                    .map(|(&x, (&m, &v))| (x - m).powi(2) / v)
                    .sum();
                jll[[i, class]] = self.log_priors[class] + log_norm - 0.5 * quad;
            }
        }
        Ok(jll)
    }
}

impl Classifier for GaussianNb {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        let n_features = X.ncols();

        let epsilon = self.var_smoothing
            * X.var_axis(Axis(0), 0.0)
                .iter()
                .copied()
                .fold(0.0, f64::max);

        let mut means = Array2::zeros((N_CLASSES, n_features));
        let mut variances = Array2::zeros((N_CLASSES, n_features));
        for class in 0..N_CLASSES {
            let rows: Vec<usize> = y
                .iter()
                .enumerate()
                .filter(|(_, &label)| label == class)
                .map(|(i, _)| i)
                .collect();
            if rows.is_empty() {
                return Err(ClassifierError::Training(format!(
                    "{}: class {} missing from training labels",
                    NAME, class
                )));
            }
            let members = X.select(Axis(0), &rows);
            let mean = members
                .mean_axis(Axis(0))
                .ok_or_else(|| ClassifierError::Training(format!("{}: empty class", NAME)))?;
            let var = members.var_axis(Axis(0), 0.0).mapv(|v| (v + epsilon).max(1e-12));

            means.row_mut(class).assign(&mean);
            variances.row_mut(class).assign(&var);
            self.log_priors[class] = (rows.len() as f64 / X.nrows() as f64).ln();
        }

        self.means = Some(means);
        self.variances = Some(variances);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        let jll = self.joint_log_likelihood(X)?;
        Ok(jll
            .rows()
            .into_iter()
            .map(|row| usize::from(row[1] > row[0]))
            .collect())
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        let jll = self.joint_log_likelihood(X)?;
        // log-sum-exp по двум классам
        Ok(jll
            .rows()
            .into_iter()
            .map(|row| {
                let max = row[0].max(row[1]);
                let e0 = (row[0] - max).exp();
                let e1 = (row[1] - max).exp();
                e1 / (e0 + e1)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use crate::models::fixtures::blobs;
    use ndarray::array;

    #[test]
    fn separates_shifted_blobs() {
        let (X, y) = blobs(60, 40, 3, 4.0, 1);
        let mut nb = GaussianNb::new(1e-9);
        nb.fit(&X, &y).unwrap();

        let pred = nb.predict(&X).unwrap();
        let correct = pred.iter().zip(y.iter()).filter(|(p, t)| p == t).count();
        assert!(correct >= 95, "only {} of 100 correct", correct);
    }

    #[test]
    fn probabilities_agree_with_labels() {
        let (X, y) = blobs(30, 30, 2, 3.0, 2);
        let mut nb = GaussianNb::new(1e-9);
        nb.fit(&X, &y).unwrap();

        let proba = nb.predict_proba(&X).unwrap();
        let pred = nb.predict(&X).unwrap();
        for (p, &label) in proba.iter().zip(pred.iter()) {
            assert!((0.0..=1.0).contains(p));
            assert_eq!(label, usize::from(*p > 0.5));
        }
    }

    #[test]
    fn priors_tilt_ambiguous_points() {
        // разброс классов одинаковый, середина уходит к большему классу
        let X = array![[0.0], [1.0], [0.0], [1.0], [0.0], [1.0], [2.0], [3.0]];
        let y = Array1::from(vec![0, 0, 0, 0, 0, 0, 1, 1]);
        let mut nb = GaussianNb::new(1e-9);
        nb.fit(&X, &y).unwrap();
        let p = nb.predict_proba(&array![[1.5]]).unwrap();
        assert!(p[0] < 0.5);
        assert!(p[0] > 0.1);
    }

    #[test]
    fn unfitted_model_reports_not_fitted() {
        let nb = GaussianNb::new(1e-9);
        assert!(matches!(
            nb.predict(&array![[1.0]]),
            Err(ClassifierError::NotFitted(_))
        ));
    }
}
