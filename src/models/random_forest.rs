//! Бэггинг деревьев решений linfa
//!
//! Каждое дерево обучается на bootstrap-выборке по всем колонкам, если
//! `max_features` не ограничивает его случайным подпространством.

use linfa::prelude::Predict;
use ndarray::{Array1, Array2, Axis};
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::decision_tree::fit_tree;
use super::{check_training_data, check_width, threshold, Classifier};
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;

const NAME: &str = "RandomForestClassifier";

struct Member {
    tree: linfa_tree::DecisionTree<f64, usize>,
    /// Колонки входной матрицы, на которых обучено дерево
    features: Vec<usize>,
}

pub struct RandomForest {
    n_estimators: usize,
    max_depth: Option<usize>,
    max_features: Option<usize>,
    class_weights: Option<ClassWeights>,
    seed: u64,
    members: Vec<Member>,
    n_features: usize,
}

impl RandomForest {
    pub fn new(
        n_estimators: usize,
        max_depth: Option<usize>,
        max_features: Option<usize>,
        class_weights: Option<ClassWeights>,
        seed: u64,
    ) -> Self {
        Self {
            n_estimators,
            max_depth,
            max_features,
            class_weights,
            seed,
            members: Vec::new(),
            n_features: 0,
        }
    }

    fn subspace_size(&self, n_features: usize) -> usize {
        self.max_features.unwrap_or(n_features).clamp(1, n_features)
    }

    pub fn n_trees(&self) -> usize {
        self.members.len()
    }
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        if self.n_estimators == 0 {
            return Err(ClassifierError::Training(format!("{}: no estimators requested", NAME)));
        }

        let n_samples = X.nrows();
        let n_features = X.ncols();
        let subspace = self.subspace_size(n_features);
        let weights = self.class_weights.unwrap_or_else(ClassWeights::uniform);
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);

        let mut members = Vec::with_capacity(self.n_estimators);
        for _ in 0..self.n_estimators {
            let rows: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            let features: Vec<usize> = if subspace == n_features {
                (0..n_features).collect()
            } else {
                let mut picked = sample(&mut rng, n_features, subspace).into_vec();
                picked.sort_unstable();
                picked
            };

            let X_boot = X.select(Axis(0), &rows).select(Axis(1), &features);
            let y_boot = y.select(Axis(0), &rows);
            let sample_weights = weights.sample_weights(&y_boot);

            let tree = fit_tree(&X_boot, &y_boot, &sample_weights, self.max_depth, 2)?;
            members.push(Member { tree, features });
        }

        tracing::debug!(
            "{} fitted: {} trees, {} of {} features per tree",
            NAME,
            members.len(),
            subspace,
            n_features
        );
        self.members = members;
        self.n_features = n_features;
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        Ok(threshold(&self.predict_proba(X)?))
    }

    /// Доля деревьев, проголосовавших за положительный класс
    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        if self.members.is_empty() {
            return Err(ClassifierError::NotFitted(NAME.to_string()));
        }
        check_width(NAME, self.n_features, X)?;

        let mut votes = Array1::<f64>::zeros(X.nrows());
        for member in &self.members {
            let X_sub = X.select(Axis(1), &member.features);
            let pred: Array1<usize> = member.tree.predict(&X_sub);
            votes
                .iter_mut()
                .zip(pred.iter())
                .for_each(|(v, &label)| *v += label as f64);
        }
        Ok(votes / self.members.len() as f64)
    }
}
