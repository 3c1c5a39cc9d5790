/// Модуль предобработки данных

pub mod class_weight;
pub mod normalization;
pub mod split;

pub use class_weight::{estimate_weights, ClassWeights};
pub use normalization::MinMaxParams;
pub use split::{stratified_split, TrainTestSplit};
