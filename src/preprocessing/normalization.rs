//! Min-max нормализация, обучаемая только на train

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::config::{DegeneratePolicy, NormalizationConfig};
use crate::error::{QsarError, Result};

/// Обученное преобразование по признакам `v -> (v - min) / range`
#[derive(Debug, Clone, PartialEq)]
pub struct MinMaxParams {
    pub min: Array1<f64>,
    /// `max - min` либо 1.0 для константного признака при [`DegeneratePolicy::Zero`]
    pub range: Array1<f64>,
    /// Исходные колонки, попавшие в результат, по порядку
    pub retained: Vec<usize>,
    pub clip: bool,
}

impl MinMaxParams {
    /// Обучение на матрице train. Тестовые строки сюда не передаются.
    pub fn fit(X: &Array2<f64>, feature_names: &[String], config: &NormalizationConfig) -> Result<Self> {
        if X.nrows() == 0 {
            return Err(QsarError::DataFormat("Empty training matrix".to_string()));
        }

        let min = X.fold_axis(Axis(0), f64::INFINITY, |&acc, &v| acc.min(v));
        let max = X.fold_axis(Axis(0), f64::NEG_INFINITY, |&acc, &v| acc.max(v));
        let mut range = &max - &min;
        let mut retained = Vec::with_capacity(X.ncols());

        for (j, r) in range.iter_mut().enumerate() {
            if *r >= 10.0 * f64::EPSILON {
                retained.push(j);
                continue;
            }

            let name = feature_names
                .get(j)
                .cloned()
                .unwrap_or_else(|| format!("#{}", j));
            match config.degenerate {
                DegeneratePolicy::Fail => {
                    return Err(QsarError::DegenerateFeature { feature: name })
                }
                DegeneratePolicy::Zero => {
                    tracing::warn!("Feature '{}' is constant in training data; scaled with unit range", name);
                    *r = 1.0;
                    retained.push(j);
                }
                DegeneratePolicy::Drop => {
                    tracing::warn!("Feature '{}' is constant in training data; dropped", name);
                }
            }
        }

        if retained.is_empty() {
            return Err(QsarError::DataFormat(
                "every feature is constant in the training partition".to_string(),
            ));
        }

        Ok(Self {
            min,
            range,
            retained,
            clip: config.clip,
        })
    }

    /// Применение преобразования. Значения вне диапазона train выходят
    /// за [0, 1], если не включено отсечение.
    pub fn apply(&self, X: &Array2<f64>) -> Result<Array2<f64>> {
        if X.ncols() != self.min.len() {
            return Err(QsarError::DataFormat(format!(
                "expected {} features, got {}",
                self.min.len(),
                X.ncols()
            )));
        }

        let mut normalized = Array2::zeros((X.nrows(), self.retained.len()));
        for (out_col, &j) in self.retained.iter().enumerate() {
            let (min, range) = (self.min[j], self.range[j]);
            for (i, &v) in X.column(j).iter().enumerate() {
                let scaled = (v - min) / range;
                normalized[[i, out_col]] = if self.clip { scaled.clamp(0.0, 1.0) } else { scaled };
            }
        }
        Ok(normalized)
    }

    pub fn n_input_features(&self) -> usize {
        self.min.len()
    }

    /// Имена колонок, оставшихся после преобразования
    pub fn retained_names(&self, feature_names: &[String]) -> Vec<String> {
        self.retained
            .iter()
            .map(|&j| feature_names.get(j).cloned().unwrap_or_else(|| format!("#{}", j)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("f{}", i)).collect()
    }

    #[test]
    fn train_rows_land_in_unit_interval() {
        let X = array![[1.0, 10.0], [2.0, 30.0], [3.0, 20.0]];
        let params = MinMaxParams::fit(&X, &names(2), &NormalizationConfig::default()).unwrap();
        let Xn = params.apply(&X).unwrap();

        assert!((Xn[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((Xn[[2, 0]] - 1.0).abs() < 1e-12);
        assert!((Xn[[1, 1]] - 1.0).abs() < 1e-12);
        assert!((Xn[[2, 1]] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn out_of_range_test_values_are_not_clamped() {
        let train = array![[0.0], [10.0]];
        let test = array![[-5.0], [20.0]];
        let params = MinMaxParams::fit(&train, &names(1), &NormalizationConfig::default()).unwrap();
        let out = params.apply(&test).unwrap();

        assert!((out[[0, 0]] - -0.5).abs() < 1e-12);
        assert!((out[[1, 0]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn clip_clamps_into_unit_interval() {
        let train = array![[0.0], [10.0]];
        let test = array![[-5.0], [20.0]];
        let config = NormalizationConfig {
            clip: true,
            ..Default::default()
        };
        let params = MinMaxParams::fit(&train, &names(1), &config).unwrap();
        let out = params.apply(&test).unwrap();

        assert!((out[[0, 0]] - 0.0).abs() < 1e-12);
        assert!((out[[1, 0]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_fails_under_fail_policy() {
        let X = array![[1.0, 5.0], [2.0, 5.0]];
        let config = NormalizationConfig {
            degenerate: DegeneratePolicy::Fail,
            ..Default::default()
        };
        match MinMaxParams::fit(&X, &names(2), &config) {
            Err(QsarError::DegenerateFeature { feature }) => assert_eq!(feature, "f1"),
            other => panic!("expected DegenerateFeature, got {:?}", other),
        }
    }

    #[test]
    fn constant_feature_maps_to_offset_under_zero_policy() {
        let train = array![[1.0, 5.0], [2.0, 5.0]];
        let params = MinMaxParams::fit(&train, &names(2), &NormalizationConfig::default()).unwrap();
        let out = params.apply(&array![[1.5, 5.0], [1.5, 7.0]]).unwrap();

        assert_eq!(out.ncols(), 2);
        assert!((out[[0, 1]] - 0.0).abs() < 1e-12);
        assert!((out[[1, 1]] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn constant_feature_is_removed_under_drop_policy() {
        let X = array![[1.0, 5.0, 0.0], [2.0, 5.0, 4.0]];
        let config = NormalizationConfig {
            degenerate: DegeneratePolicy::Drop,
            ..Default::default()
        };
        let params = MinMaxParams::fit(&X, &names(3), &config).unwrap();
        let out = params.apply(&X).unwrap();

        assert_eq!(out.ncols(), 2);
        assert_eq!(params.retained_names(&names(3)), vec!["f0", "f2"]);
        assert!((out[[1, 1]] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn applying_twice_gives_identical_output() {
        let train = array![[0.3, 7.0], [1.9, -2.0], [0.7, 4.0]];
        let params = MinMaxParams::fit(&train, &names(2), &NormalizationConfig::default()).unwrap();
        let test = array![[0.5, 0.0], [3.0, 9.0]];
        assert_eq!(params.apply(&test).unwrap(), params.apply(&test).unwrap());
    }

    #[test]
    fn column_count_mismatch_is_rejected() {
        let params =
            MinMaxParams::fit(&array![[0.0, 1.0], [1.0, 0.0]], &names(2), &NormalizationConfig::default())
                .unwrap();
        assert!(params.apply(&array![[0.0], [1.0]]).is_err());
    }
}
