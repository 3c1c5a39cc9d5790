//! Единый шаг fit -> predict -> score для любого классификатора

use std::time::Instant;

use crate::error::ClassifierError;
use crate::evaluation::metrics::{score, ConfusionMatrix, MetricsRecord};
use crate::models::Classifier;
use crate::types::Partition;

/// Результат одного элемента реестра на отложенной выборке
#[derive(Debug, Clone)]
pub struct Evaluation {
    pub metrics: MetricsRecord,
    pub confusion: ConfusionMatrix,
    pub train_seconds: f64,
}

/// Обучение `classifier` на `train` и оценка только на `test`.
///
/// Ошибка классификатора возвращается вызывающему коду: он записывает её
/// в строку элемента и продолжает с остальными.
pub fn evaluate(
    classifier: &mut dyn Classifier,
    train: &Partition,
    test: &Partition,
) -> Result<Evaluation, ClassifierError> {
    let name = classifier.name().to_string();

    let started = Instant::now();
    classifier.fit(&train.features, &train.labels)?;
    let train_seconds = started.elapsed().as_secs_f64();
    tracing::info!("Training time of {}: {:.3} s", name, train_seconds);

    let predicted = classifier.predict(&test.features)?;
    let proba = classifier.predict_proba(&test.features)?;
    let (metrics, confusion) = score(&name, &predicted, &proba, &test.labels)?;

    Ok(Evaluation {
        metrics,
        confusion,
        train_seconds,
    })
}
