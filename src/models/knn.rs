//! k ближайших соседей по евклидову расстоянию

use ndarray::{Array1, Array2, ArrayView1};

use super::{check_training_data, check_width, threshold, Classifier};
use crate::error::ClassifierError;

const NAME: &str = "KNeighborsClassifier";

pub struct KNeighbors {
    k: usize,
    X_train: Option<Array2<f64>>,
    y_train: Option<Array1<usize>>,
}

impl KNeighbors {
    pub fn new(k: usize) -> Self {
        Self {
            k,
            X_train: None,
            y_train: None,
        }
    }

    /// Доля положительных меток среди `k` ближайших строк train.
    /// При равных расстояниях раньше идёт строка с меньшим номером.
    fn vote(&self, row: ArrayView1<f64>, X_train: &Array2<f64>, y_train: &Array1<usize>) -> f64 {
        let mut distances: Vec<(f64, usize)> = X_train
            .rows()
            .into_iter()
            .enumerate()
            .map(|(i, train_row)| {
                let d: f64 = row
                    .iter()
                    .zip(train_row.iter())
                    .map(|(a, b)| (a - b).powi(2))
                    .sum();
                (d, i)
            })
            .collect();
        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let positives = distances
            .iter()
            .take(self.k)
            .filter(|(_, i)| y_train[*i] == 1)
            .count();
        positives as f64 / self.k as f64
    }
}

impl Classifier for KNeighbors {
    fn name(&self) -> &str {
        NAME
    }

    fn fit(&mut self, X: &Array2<f64>, y: &Array1<usize>) -> Result<(), ClassifierError> {
        check_training_data(NAME, X, y)?;
        if self.k == 0 || self.k > X.nrows() {
            return Err(ClassifierError::Training(format!(
                "{}: k = {} with {} training rows",
                NAME,
                self.k,
                X.nrows()
            )));
        }
        self.X_train = Some(X.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<usize>, ClassifierError> {
        Ok(threshold(&self.predict_proba(X)?))
    }

    fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, ClassifierError> {
        let (X_train, y_train) = match (&self.X_train, &self.y_train) {
            (Some(X_train), Some(y_train)) => (X_train, y_train),
            _ => return Err(ClassifierError::NotFitted(NAME.to_string())),
        };
        check_width(NAME, X_train.ncols(), X)?;

        Ok(X.rows()
            .into_iter()
            .map(|row| self.vote(row, X_train, y_train))
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
    fn majority_of_three_neighbours() {
        let X = array![[0.0], [0.1], [0.2], [5.0], [5.1], [5.2]];
        let y = Array1::from(vec![0, 0, 1, 1, 1, 1]);
        let mut knn = KNeighbors::new(3);
        knn.fit(&X, &y).unwrap();

        let proba = knn.predict_proba(&array![[0.05], [5.05]]).unwrap();
        assert!((proba[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((proba[1] - 1.0).abs() < 1e-12);
        assert_eq!(knn.predict(&array![[0.05], [5.05]]).unwrap().to_vec(), vec![0, 1]);
    }

    #[test]
    fn distance_ties_prefer_earlier_rows() {
        // обе строки на расстоянии 1, при k = 1 берётся строка 0
        let X = array![[-1.0], [1.0]];
        let y = Array1::from(vec![1, 0]);
        let mut knn = KNeighbors::new(1);
        knn.fit(&X, &y).unwrap();
        assert_eq!(knn.predict(&array![[0.0]]).unwrap()[0], 1);
    }

    #[test]
    fn k_larger_than_training_set_fails() {
        let (X, y) = blobs(2, 1, 2, 1.0, 0);
        let mut knn = KNeighbors::new(5);
        assert!(matches!(knn.fit(&X, &y), Err(ClassifierError::Training(_))));
    }

    #[test]
    fn classifies_separated_blobs() {
        let (X, y) = blobs(40, 40, 4, 5.0, 3);
        let mut knn = KNeighbors::new(3);
        knn.fit(&X, &y).unwrap();
        assert_eq!(knn.predict(&X).unwrap(), y);
    }
}
