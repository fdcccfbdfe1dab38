//! Online-trained Naive Bayes classifier over heuristic-labeled history

pub mod features;
pub mod model;

pub use features::{AmountBand, DayPeriod, FeatureVector, Region};
pub use model::{BayesModel, Prediction};
