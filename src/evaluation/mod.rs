/// Метрики, прогон классификаторов и таблица результатов

pub mod harness;
pub mod metrics;
pub mod results;

pub use harness::{evaluate, Evaluation};
pub use metrics::{roc_auc, ConfusionMatrix, Metric, MetricsRecord};
pub use results::{aggregate, ResultRow, ResultsTable, RunReport};
