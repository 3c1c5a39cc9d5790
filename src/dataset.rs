//! Чтение таблиц дескрипторов и запись нормализованных выборок

use std::collections::BTreeSet;
use std::fs::File;
use std::path::{Path, PathBuf};

use ndarray::{Array1, Array2};

use crate::error::{QsarError, Result};
use crate::preprocessing::split::{stratified_split, TrainTestSplit};
use crate::types::{Dataset, Partition, N_CLASSES};

/// Загрузка размеченной таблицы дескрипторов.
///
/// Все колонки, кроме `label_column`, - числовые признаки в порядке файла.
/// В колонке меток ровно два различных значения; они кодируются 0/1
/// по возрастанию (численно, если оба значения - числа).
pub fn load_dataset<P: AsRef<Path>>(source: P, label_column: &str) -> Result<Dataset> {
    let source = source.as_ref();
    let file = File::open(source).map_err(|e| QsarError::io(source, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(source, e))?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == label_column)
        .ok_or_else(|| {
            QsarError::DataFormat(format!(
                "label column '{}' not found in {}",
                label_column,
                source.display()
            ))
        })?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != label_idx)
        .map(|(_, h)| h.to_string())
        .collect();
    if feature_names.is_empty() {
        return Err(QsarError::DataFormat(format!(
            "{} has no feature columns besides '{}'",
            source.display(),
            label_column
        )));
    }

    let n_features = feature_names.len();
    let mut values: Vec<f64> = Vec::new();
    let mut raw_labels: Vec<String> = Vec::new();

    for (row, record) in reader.records().enumerate() {
        let record = record.map_err(|e| csv_error(source, e))?;
        // заголовок - строка 1
        let line = row + 2;
        for (col, field) in record.iter().enumerate() {
            if col == label_idx {
                if field.is_empty() {
                    return Err(QsarError::DataFormat(format!(
                        "missing label at line {}",
                        line
                    )));
                }
                raw_labels.push(field.to_string());
                continue;
            }
            let value = field.parse::<f64>().ok().filter(|v| v.is_finite());
            match value {
                Some(v) => values.push(v),
                None => {
                    return Err(QsarError::DataFormat(format!(
                        "non-numeric or missing value '{}' in column '{}' at line {}",
                        field, headers[col].to_string(), line
                    )))
                }
            }
        }
    }

    if raw_labels.is_empty() {
        return Err(QsarError::DataFormat(format!(
            "{} contains no data rows",
            source.display()
        )));
    }

    let class_names = encode_classes(&raw_labels)?;
    let labels: Array1<usize> = raw_labels
        .iter()
        .map(|raw| if *raw == class_names[0] { 0 } else { 1 })
        .collect();

    let features = Array2::from_shape_vec((raw_labels.len(), n_features), values)
        .map_err(|e| QsarError::DataFormat(format!("ragged feature matrix: {}", e)))?;

    tracing::info!(
        "Read {}: {} rows, {} features, classes {:?}",
        source.display(),
        features.nrows(),
        n_features,
        class_names
    );

    Ok(Dataset {
        feature_names,
        label_column: label_column.to_string(),
        class_names,
        features,
        labels,
    })
}

/// Чтение таблицы и стратифицированное разбиение на train/test
pub fn load_and_split<P: AsRef<Path>>(
    source: P,
    label_column: &str,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, TrainTestSplit)> {
    let dataset = load_dataset(source, label_column)?;
    let split = stratified_split(&dataset, test_fraction, seed)?;
    Ok((dataset, split))
}

/// Запись выборки в CSV: признаки в заданном порядке, метка последней,
/// с исходными значениями меток.
pub fn write_partition<P: AsRef<Path>>(
    path: P,
    feature_names: &[String],
    label_column: &str,
    class_names: &[String; N_CLASSES],
    partition: &Partition,
) -> Result<()> {
    let path = path.as_ref();
    if feature_names.len() != partition.features.ncols() {
        return Err(QsarError::DataFormat(format!(
            "{} feature names for {} columns",
            feature_names.len(),
            partition.features.ncols()
        )));
    }
    ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path).map_err(|e| csv_write_error(path, e))?;
    let mut header: Vec<&str> = feature_names.iter().map(String::as_str).collect();
    header.push(label_column);
    writer
        .write_record(&header)
        .map_err(|e| csv_write_error(path, e))?;

    for (row, &label) in partition.features.rows().into_iter().zip(partition.labels.iter()) {
        let mut record: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        record.push(class_names[label].clone());
        writer
            .write_record(&record)
            .map_err(|e| csv_write_error(path, e))?;
    }
    writer.flush().map_err(|e| QsarError::io(path, e))?;

    tracing::debug!("Wrote {} rows to {}", partition.len(), path.display());
    Ok(())
}

/// Пути нормализованных выборок по имени входного файла,
/// например `ds.Class.csv` -> `ds.Class.tr.norm.csv` / `ds.Class.ts.norm.csv`.
pub fn partition_paths(input: &Path, dir: &Path) -> (PathBuf, PathBuf) {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("dataset");
    (
        dir.join(format!("{}.tr.norm.csv", stem)),
        dir.join(format!("{}.ts.norm.csv", stem)),
    )
}

pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| QsarError::io(parent, e))?;
        }
    }
    Ok(())
}

fn encode_classes(raw_labels: &[String]) -> Result<[String; N_CLASSES]> {
    let distinct: BTreeSet<&str> = raw_labels.iter().map(String::as_str).collect();
    if distinct.len() != N_CLASSES {
        return Err(QsarError::DataFormat(format!(
            "label column must hold exactly {} classes, found {}: {:?}",
            N_CLASSES,
            distinct.len(),
            distinct.iter().take(10).collect::<Vec<_>>()
        )));
    }

    let mut classes: Vec<&str> = distinct.into_iter().collect();
    let numeric: Option<Vec<f64>> = classes.iter().map(|c| c.parse::<f64>().ok()).collect();
    if let Some(nums) = numeric {
        if nums[1] < nums[0] {
            classes.swap(0, 1);
        }
    }
    Ok([classes[0].to_string(), classes[1].to_string()])
}

fn csv_error(source: &Path, err: csv::Error) -> QsarError {
    if err.is_io_error() {
        match err.into_kind() {
            csv::ErrorKind::Io(io) => QsarError::io(source, io),
            other => QsarError::DataFormat(format!("{:?}", other)),
        }
    } else {
        QsarError::DataFormat(format!("{}: {}", source.display(), err))
    }
}

/// Аналог `csv_error` для записи: ошибки ввода-вывода сохраняют путь назначения
pub(crate) fn csv_write_error(destination: &Path, err: csv::Error) -> QsarError {
    if !err.is_io_error() {
        return QsarError::Csv(err);
    }
    match err.into_kind() {
        csv::ErrorKind::Io(io) => QsarError::io(destination, io),
        other => QsarError::DataFormat(format!("{:?}", other)),
    }
}
