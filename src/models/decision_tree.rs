//! Дерево решений по критерию Джини на основе linfa-tree

use linfa::prelude::*;
use linfa_tree::SplitQuality;
use ndarray::{Array1, Array2};

use super::{check_training_data, check_width, Classifier};
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;

const NAME: &str = "DecisionTreeClassifier";

pub struct DecisionTree {
    max_depth: Option<usize>,
    min_samples_split: usize,
    class_weights: Option<ClassWeights>,
    model: Option<linfa_tree::DecisionTree<f64, usize>>,
    n_features: usize,
}

impl DecisionTree {
    pub fn new(max_depth: Option<usize>, min_samples_split: usize, class_weights: Option<ClassWeights>) -> Self {
        Self {
            max_depth,
            min_samples_split,
            class_weights,
            model: None,
            n_features: 0,
        }
    }

    pub fn depth(&self) -> Option<usize> {
        self.model.as_ref().map(|m| m.max_depth())
    }
}

/// Обучение одного дерева linfa на `X`/`y` с весами строк `sample_weights`.
///
/// В linfa ограничения на разбиение задаются суммой весов, поэтому лимиты
/// по числу строк умножаются на наименьший вес строки.
pub(crate) fn fit_tree(
    X: &Array2<f64>,
    y: &Array1<usize>,
    sample_weights: &Array1<f64>,
    max_depth: Option<usize>,
    min_samples_split: usize,
) -> Result<linfa_tree::DecisionTree<f64, usize>, ClassifierError> {
    let min_weight = sample_weights.iter().copied().fold(f64::INFINITY, f64::min);
    let min_weight = if min_weight.is_finite() && min_weight > 0.0 { min_weight } else { 1.0 };

    let dataset = Dataset::new(X.clone(), y.clone()).with_weights(sample_weights.mapv(|w| w as f32));

    linfa_tree::DecisionTree::params()
        .split_quality(SplitQuality::Gini)
        .max_depth(max_depth)
        .min_weight_split((min_samples_split as f64 * min_weight) as f32)
        .min_weight_leaf(min_weight as f32)
        .fit(&dataset)
        .map_err(|e| ClassifierError::Training(format!("{}: {}", NAME, e)))
}

impl Classifier for DecisionTree {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        let sample_weights = self
            .class_weights
            .unwrap_or_else(ClassWeights::uniform)
            .sample_weights(y);

        let model = fit_tree(X, y, &sample_weights, self.max_depth, self.min_samples_split)?;
        tracing::debug!("{} fitted: depth {}, {} leaves", NAME, model.max_depth(), model.num_leaves());
        self.model = Some(model);
        self.n_features = X.ncols();
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| ClassifierError::NotFitted(NAME.to_string()))?;
        check_width(NAME, self.n_features, X)?;
        Ok(model.predict(X))
    }

    /// Одно дерево голосует классом большинства в листе, поэтому оценка 0 или 1
    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        Ok(self.predict(X)?.mapv(|label| label as f64))
    }
}
