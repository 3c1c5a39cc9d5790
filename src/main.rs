//! CLI бенчмарка QSAR-классификаторов
//!
//! Запуск:
//!   qsar-bench --input datasets/ds.Class.csv --label-column Class
//!   qsar-bench --config bench.json --seed 7 --json

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use qsar_bench::config::{load_config, BenchmarkConfig, DegeneratePolicy};
use qsar_bench::evaluation::Metric;
use qsar_bench::pipeline::BenchmarkPipeline;

#[derive(Parser, Debug)]
#[command(name = "qsar-bench")]
#[command(about = "Benchmark binary classifiers on a QSAR descriptor table")]
#[command(version)]
struct Args {
    /// JSON-файл конфигурации; флаги ниже переопределяют его значения
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Таблица дескрипторов (CSV с заголовком)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Имя колонки с бинарной меткой
    #[arg(short, long)]
    label_column: Option<String>,

    /// Доля строк для тестовой выборки
    #[arg(short, long)]
    test_fraction: Option<f64>,

    /// Зерно для разбиения и случайных классификаторов
    #[arg(short, long)]
    seed: Option<u64>,

    /// Каталог для таблицы результатов
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Каталог для нормализованных train/test CSV (по умолчанию каталог результатов)
    #[arg(long)]
    partitions_dir: Option<PathBuf>,

    /// Не записывать нормализованные выборки
    #[arg(long, default_value_t = false)]
    no_partitions: bool,

    /// Дополнительно записать JSON-отчёт рядом с таблицей результатов
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Что делать с признаками, постоянными на train
    #[arg(long, value_enum)]
    degenerate: Option<DegenerateArg>,

    /// Ограничить нормализованные значения отрезком [0, 1]
    #[arg(long, default_value_t = false)]
    clip: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DegenerateArg {
    Fail,
    Zero,
    Drop,
}

impl From<DegenerateArg> for DegeneratePolicy {
    fn from(arg: DegenerateArg) -> Self {
        match arg {
            DegenerateArg::Fail => DegeneratePolicy::Fail,
            DegenerateArg::Zero => DegeneratePolicy::Zero,
            DegenerateArg::Drop => DegeneratePolicy::Drop,
        }
    }
}

fn build_config(args: Args) -> Result<BenchmarkConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => BenchmarkConfig::default(),
    };

    if let Some(input) = args.input {
        config.input = input;
    }
    if let Some(label_column) = args.label_column {
        config.label_column = label_column;
    }
    if let Some(test_fraction) = args.test_fraction {
        config.test_fraction = test_fraction;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    if let Some(output) = args.output {
        config.output_dir = output;
    }
    if let Some(dir) = args.partitions_dir {
        config.partitions_dir = Some(dir);
    }
    if args.no_partitions {
        config.partitions_dir = None;
    } else if config.partitions_dir.is_none() {
        config.partitions_dir = Some(config.output_dir.clone());
    }
    if args.json {
        config.json_report = true;
    }
    if let Some(policy) = args.degenerate {
        config.normalization.degenerate = policy.into();
    }
    if args.clip {
        config.normalization.clip = true;
    }

    Ok(config)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(args)?;

    tracing::info!("QSAR classifier benchmark");
    tracing::info!("Input: {}", config.input.display());
    tracing::info!("Label column: {}", config.label_column);
    tracing::info!("Seed: {}, test fraction: {}", config.seed, config.test_fraction);
    tracing::info!("Registry: {} classifiers", config.classifiers.len());

    let pipeline = BenchmarkPipeline::new(config).context("Invalid benchmark configuration")?;
    let table = pipeline
        .run()
        .with_context(|| format!("Benchmark on {} failed", pipeline.config().input.display()))?;

    for row in table.failures() {
        tracing::warn!(
            "{} did not produce metrics: {}",
            row.classifier,
            row.message.as_deref().unwrap_or(row.status())
        );
    }
    if let Some(best) = table.best_by(Metric::Auroc) {
        tracing::info!("Best ROC-AUC: {} ({:.4})", best.classifier, best.auroc);
    }
    tracing::info!(
        "Done: {} of {} classifiers evaluated",
        table.len() - table.failures().count(),
        table.len()
    );

    Ok(())
}
