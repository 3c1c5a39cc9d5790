//! Стратифицированное разбиение на train/test

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{QsarError, Result};
use crate::types::{Dataset, Partition, N_CLASSES};

#[derive(Debug, Clone)]
pub struct TrainTestSplit {
    pub train: Partition,
    pub test: Partition,
}

/// Разбиение `dataset` с сохранением долей классов
/// всей таблицы в каждой части.
///
/// В тест уходит `ceil(test_fraction * n)` строк, распределённых между
/// классами методом наибольшего остатка. Строки выбирает ChaCha8 с зерном
/// `seed`: одинаковые данные и зерно дают одинаковое разбиение.
pub fn stratified_split(dataset: &Dataset, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(QsarError::DataFormat(format!(
            "test_fraction must lie in (0, 1), got {}",
            test_fraction
        )));
    }

    let n = dataset.n_samples();
    let counts = dataset.class_counts();
    let n_test = (test_fraction * n as f64).ceil() as usize;
    let n_train = n - n_test.min(n);

    if n_test < N_CLASSES || n_train < N_CLASSES {
        return Err(QsarError::DataFormat(format!(
            "{} rows cannot be split into {} train / {} test with both classes on each side",
            n, n_train, n_test
        )));
    }
    if let Some(class) = counts.iter().position(|&c| c < 2) {
        return Err(QsarError::DataFormat(format!(
            "class '{}' has {} row(s); at least 2 are needed for a stratified split",
            dataset.class_names[class], counts[class]
        )));
    }

    let test_counts = apportion(&counts, n, n_test)?;

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut train_idx = Vec::with_capacity(n_train);
    let mut test_idx = Vec::with_capacity(n_test);

    for class in 0..N_CLASSES {
        let mut members: Vec<usize> = dataset
            .labels
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == class)
            .map(|(i, _)| i)
            .collect();
        members.shuffle(&mut rng);
        let (test_part, train_part) = members.split_at(test_counts[class]);
        test_idx.extend_from_slice(test_part);
        train_idx.extend_from_slice(train_part);
    }

    train_idx.shuffle(&mut rng);
    test_idx.shuffle(&mut rng);

    let split = TrainTestSplit {
        train: dataset.select(&train_idx),
        test: dataset.select(&test_idx),
    };

    tracing::info!(
        "Stratified split (seed {}): train={} {:?}, test={} {:?}",
        seed,
        split.train.len(),
        split.train.class_counts(),
        split.test.len(),
        split.test.class_counts()
    );

    Ok(split)
}

/// Размеры теста по классам: в сумме `n_test`, пропорционально `counts`
fn apportion(counts: &[usize; N_CLASSES], n: usize, n_test: usize) -> Result<[usize; N_CLASSES]> {
    let mut alloc = [0usize; N_CLASSES];
    let mut remainders = [0usize; N_CLASSES];
    for class in 0..N_CLASSES {
        alloc[class] = n_test * counts[class] / n;
        remainders[class] = n_test * counts[class] % n;
    }

    let mut order: Vec<usize> = (0..N_CLASSES).collect();
    order.sort_by(|&a, &b| {
        remainders[b]
            .cmp(&remainders[a])
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });
    let leftover = n_test - alloc.iter().sum::<usize>();
    for &class in order.iter().take(leftover) {
        alloc[class] += 1;
    }

    // В каждой части остаётся хотя бы одна строка каждого класса
    for class in 0..N_CLASSES {
        let other = 1 - class;
        if alloc[class] == 0 && alloc[other] > 1 {
            alloc[class] += 1;
            alloc[other] -= 1;
        }
        if alloc[class] == counts[class] && alloc[other] + 1 < counts[other] {
            alloc[class] -= 1;
            alloc[other] += 1;
        }
    }
    for class in 0..N_CLASSES {
        if alloc[class] == 0 || alloc[class] >= counts[class] {
            return Err(QsarError::DataFormat(format!(
                "class {} ({} rows) cannot appear in both partitions with {} test rows",
                class, counts[class], n_test
            )));
        }
    }
    Ok(alloc)
}
