//! Метрики на тестовой выборке: матрица ошибок, взвешенные по поддержке
//! precision/recall/F1 и ранговый ROC-AUC

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::ClassifierError;
use crate::types::{N_CLASSES, POSITIVE_CLASS};

/// Строка таблицы результатов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    pub classifier: String,
    pub accuracy: f64,
    pub auroc: f64,
    /// Взвешено по поддержке обоих классов
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Метрика для ранжирования таблицы результатов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Accuracy,
    Auroc,
    Precision,
    Recall,
    F1,
}

impl MetricsRecord {
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Accuracy => self.accuracy,
            Metric::Auroc => self.auroc,
            Metric::Precision => self.precision,
            Metric::Recall => self.recall,
            Metric::F1 => self.f1,
        }
    }
}

/// Бинарная матрица ошибок, `counts[truth][predicted]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    counts: [[usize; N_CLASSES]; N_CLASSES],
}

impl ConfusionMatrix {
    pub fn from_predictions(predicted: &Array1<usize>, truth: &Array1<usize>) -> Self {
        let mut matrix = Self::default();
        for (&p, &t) in predicted.iter().zip(truth.iter()) {
            if p < N_CLASSES && t < N_CLASSES {
                matrix.counts[t][p] += 1;
            }
        }
        matrix
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (0..N_CLASSES).map(|c| self.counts[c][c]).sum::<usize>() as f64 / total as f64
    }

    /// Число строк с истинной меткой `class`
    pub fn support(&self, class: usize) -> usize {
        self.counts[class].iter().sum()
    }

    /// Precision для `class`; 0, если этот класс ни разу не предсказан
    pub fn precision(&self, class: usize) -> f64 {
        let predicted: usize = (0..N_CLASSES).map(|t| self.counts[t][class]).sum();
        if predicted == 0 {
            return 0.0;
        }
        self.counts[class][class] as f64 / predicted as f64
    }

    pub fn recall(&self, class: usize) -> f64 {
        let support = self.support(class);
        if support == 0 {
            return 0.0;
        }
        self.counts[class][class] as f64 / support as f64
    }

    pub fn f1(&self, class: usize) -> f64 {
        let p = self.precision(class);
        let r = self.recall(class);
        if p + r == 0.0 {
            return 0.0;
        }
        2.0 * p * r / (p + r)
    }

    fn weighted(&self, per_class: impl Fn(usize) -> f64) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (0..N_CLASSES)
            .map(|c| per_class(c) * self.support(c) as f64)
            .sum::<f64>()
            / total as f64
    }

    pub fn weighted_precision(&self) -> f64 {
        self.weighted(|c| self.precision(c))
    }

    pub fn weighted_recall(&self) -> f64 {
        self.weighted(|c| self.recall(c))
    }

    pub fn weighted_f1(&self) -> f64 {
        self.weighted(|c| self.f1(c))
    }

    /// Отчёт по классам в привычном формате classification report
    pub fn report(&self, class_names: &[String; N_CLASSES]) -> String {
        let mut out = format!(
            "{:>12} {:>10} {:>10} {:>10} {:>10}\n",
            "", "precision", "recall", "f1-score", "support"
        );
        for (class, name) in class_names.iter().enumerate() {
            out.push_str(&format!(
                "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
                name,
                self.precision(class),
                self.recall(class),
                self.f1(class),
                self.support(class)
            ));
        }
        out.push_str(&format!(
            "{:>12} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
            "weighted",
            self.weighted_precision(),
            self.weighted_recall(),
            self.weighted_f1(),
            self.total()
        ));
        out
    }
}

/// Площадь под ROC-кривой для оценок положительного класса.
///
/// Считается через сумму рангов Манна-Уитни; равные оценки получают
/// средний ранг, что совпадает с площадью по методу трапеций.
pub fn roc_auc(scores: &Array1<f64>, truth: &Array1<usize>) -> Result<f64, ClassifierError> {
    if scores.len() != truth.len() {
        return Err(ClassifierError::UndefinedMetric(format!(
            "{} scores for {} labels",
            scores.len(),
            truth.len()
        )));
    }
    let n_pos = truth.iter().filter(|&&t| t == POSITIVE_CLASS).count();
    let n_neg = truth.len() - n_pos;
    if n_pos == 0 || n_neg == 0 {
        return Err(ClassifierError::UndefinedMetric(
            "ROC-AUC needs both classes in the test labels".to_string(),
        ));
    }
    if scores.iter().any(|s| !s.is_finite()) {
        return Err(ClassifierError::UndefinedMetric(
            "non-finite probability score".to_string(),
        ));
    }

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && scores[order[end]] == scores[order[start]] {
            end += 1;
        }
        // ранги с 1; группа равных [start, end) делит средний ранг
        let mean_rank = (start + end + 1) as f64 / 2.0;
        let group_positives = order[start..end]
            .iter()
            .filter(|&&i| truth[i] == POSITIVE_CLASS)
            .count();
        positive_rank_sum += mean_rank * group_positives as f64;
        start = end;
    }

    let n_pos = n_pos as f64;
    let n_neg = n_neg as f64;
    Ok((positive_rank_sum - n_pos * (n_pos + 1.0) / 2.0) / (n_pos * n_neg))
}

/// Метрики одного классификатора на тестовой выборке
pub fn score(
    classifier: &str,
    predicted: &Array1<usize>,
    proba: &Array1<f64>,
    truth: &Array1<usize>,
) -> Result<(MetricsRecord, ConfusionMatrix), ClassifierError> {
    if predicted.len() != truth.len() {
        return Err(ClassifierError::UndefinedMetric(format!(
            "{} predictions for {} labels",
            predicted.len(),
            truth.len()
        )));
    }
    let cm = ConfusionMatrix::from_predictions(predicted, truth);
    let auroc = roc_auc(proba, truth)?;
    let record = MetricsRecord {
        classifier: classifier.to_string(),
        accuracy: cm.accuracy(),
        auroc,
        precision: cm.weighted_precision(),
        recall: cm.weighted_recall(),
        f1: cm.weighted_f1(),
    };
    Ok((record, cm))
}
