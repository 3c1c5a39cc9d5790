//! Общие фикстуры интеграционных тестов

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Таблица дескрипторов: `n_inactive` строк с меткой `0`, затем
/// `n_active` строк с меткой `1`. Активные сдвинуты на `gap` по первой
/// половине признаков: классы различимы, но перекрываются.
pub fn write_descriptor_table(
    dir: &Path,
    file_name: &str,
    n_inactive: usize,
    n_active: usize,
    n_features: usize,
    gap: f64,
    seed: u64,
) -> PathBuf {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let path = dir.join(file_name);
    let mut writer = csv::Writer::from_path(&path).unwrap();

    let mut header: Vec<String> = (0..n_features).map(|j| format!("desc_{}", j)).collect();
    header.push("Class".to_string());
    writer.write_record(&header).unwrap();

    for i in 0..(n_inactive + n_active) {
        let active = i >= n_inactive;
        let mut record: Vec<String> = (0..n_features)
            .map(|j| {
                let shift = if active && j < (n_features + 1) / 2 { gap } else { 0.0 };
                let value: f64 = rng.gen_range(0.0..10.0) + shift;
                format!("{:.4}", value)
            })
            .collect();
        record.push(if active { "1" } else { "0" }.to_string());
        writer.write_record(&record).unwrap();
    }
    writer.flush().unwrap();
    path
}

/// Чтение CSV как заголовок + строки
pub fn read_csv(path: &Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(String::from).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(String::from).collect())
        .collect();
    (header, rows)
}
