//! Классификаторы и фабрика реестра

#![allow(non_snake_case)]

pub mod decision_tree;
pub mod discriminant;
pub mod knn;
pub mod linear_svc;
pub mod logistic;
pub mod naive_bayes;
pub mod random_forest;

pub use decision_tree::DecisionTree;
pub use discriminant::LinearDiscriminant;
pub use knn::KNeighbors;
pub use linear_svc::LinearSvc;
pub use logistic::LogisticRegression;
pub use naive_bayes::GaussianNb;
pub use random_forest::RandomForest;

use ndarray::{Array1, Array2};

use crate::config::ClassifierConfig;
use crate::error::ClassifierError;
use crate::preprocessing::ClassWeights;

/// Общий интерфейс всех сравниваемых алгоритмов.
///
/// Метки - закодированные классы 0/1, вероятности относятся к классу 1.
pub trait Classifier {
    fn name(&self) -> &str;

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError>;

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError>;

    /// Вероятность положительного класса для каждой строки. Модели, выдающие
    /// только метки, возвращают `UnsupportedCapability`.
    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError>;
}

/// Создание классификатора по элементу реестра.
///
/// `weights` передаются моделям, у которых включено взвешивание классов;
/// `seed` - зерно запуска, если у элемента нет своего.
pub fn build_classifier(
    config: &ClassifierConfig,
    weights: &ClassWeights,
    seed: u64,
) -> Box<dyn Classifier> {
    let weighted = |on: bool| if on { Some(*weights) } else { None };

    match *config {
        ClassifierConfig::GaussianNb { var_smoothing } => Box::new(GaussianNb::new(var_smoothing)),
        ClassifierConfig::KNeighbors { n_neighbors } => Box::new(KNeighbors::new(n_neighbors)),
        ClassifierConfig::DecisionTree {
            max_depth,
            min_samples_split,
            class_weighted,
        } => Box::new(DecisionTree::new(
            max_depth,
            min_samples_split,
            weighted(class_weighted),
        )),
        ClassifierConfig::RandomForest {
            n_estimators,
            max_depth,
            max_features,
            class_weighted,
            seed: entry_seed,
        } => Box::new(RandomForest::new(
            n_estimators,
            max_depth,
            max_features,
            weighted(class_weighted),
            entry_seed.unwrap_or(seed),
        )),
        ClassifierConfig::LinearDiscriminant { priors, shrinkage } => {
            Box::new(LinearDiscriminant::new(priors, *weights, shrinkage))
        }
        ClassifierConfig::LogisticRegression {
            learning_rate,
            max_iter,
            tol,
            l2,
            class_weighted,
        } => Box::new(LogisticRegression::new(
            learning_rate,
            max_iter,
            tol,
            l2,
            weighted(class_weighted),
        )),
        ClassifierConfig::LinearSvc {
            c,
            learning_rate,
            max_iter,
            class_weighted,
        } => Box::new(LinearSvc::new(
            c,
            learning_rate,
            max_iter,
            weighted(class_weighted),
        )),
    }
}

/// Создание всех элементов реестра по порядку
pub fn build_registry(
    configs: &[ClassifierConfig],
    weights: &ClassWeights,
    seed: u64,
) -> Vec<Box<dyn Classifier>> {
    configs
        .iter()
        .map(|config| build_classifier(config, weights, seed))
        .collect()
}

/// Общие проверки входа для `fit`
pub(crate) fn check_training_data(
    name: &str,
    X: &Array2<f64>,
    y: &Array1<usize>,
) -> Result<(), ClassifierError> {
    if X.nrows() == 0 {
        return Err(ClassifierError::Training(format!("{}: empty training set", name)));
    }
    if X.nrows() != y.len() {
        return Err(ClassifierError::Training(format!(
            "{}: {} rows but {} labels",
            name,
            X.nrows(),
            y.len()
        )));
    }
    if y.iter().any(|&label| label > 1) {
        return Err(ClassifierError::Training(format!(
            "{}: labels must be encoded 0/1",
            name
        )));
    }
    Ok(())
}

/// Общая проверка входа для `predict`/`predict_proba`
pub(crate) fn check_width(name: &str, expected: usize, X: &Array2<f64>) -> Result<(), ClassifierError> {
    if X.ncols() != expected {
        return Err(ClassifierError::Training(format!(
            "{}: fitted on {} features, got {}",
            name,
            expected,
            X.ncols()
        )));
    }
    Ok(())
}

/// Метки по вероятностям положительного класса; ровно 0.5 уходит в класс 0
pub(crate) fn threshold(proba: &Array1<f64>) -> Array1<usize> {
    proba.mapv(|p| usize::from(p > 0.5))
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use ndarray::{Array1, Array2};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Два облака точек в `n_features` измерениях; класс 1 сдвинут
    /// на `gap` по каждой оси.
    pub fn blobs(n0: usize, n1: usize, n_features: usize, gap: f64, seed: u64) -> (Array2<f64>, Array1<usize>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let n = n0 + n1;
        let labels: Array1<usize> = (0..n).map(|i| usize::from(i >= n0)).collect();
        let X = Array2::from_shape_fn((n, n_features), |(i, _)| {
            let noise: f64 = rng.gen_range(-1.0..1.0);
            noise + gap * labels[i] as f64
        });
        (X, labels)
    }
}
