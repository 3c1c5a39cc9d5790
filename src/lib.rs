//! QSAR bench - сравнение бинарных классификаторов на таблицах молекулярных дескрипторов

pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use config::{load_config, BenchmarkConfig, ClassifierConfig, DegeneratePolicy, NormalizationConfig, PriorSource};
pub use dataset::{load_and_split, load_dataset, write_partition};
pub use error::{ClassifierError, FailureKind, QsarError};
pub use evaluation::{evaluate, Metric, MetricsRecord, ResultsTable};
pub use models::{build_classifier, build_registry, Classifier};
pub use pipeline::BenchmarkPipeline;
pub use preprocessing::{estimate_weights, stratified_split, ClassWeights, MinMaxParams};
pub use types::{Dataset, Partition};
