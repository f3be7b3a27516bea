//! Classifies URLs of a compensation-data website into a site taxonomy
//! (section, category, location, research entity, pagination, metric type)
//! and aggregates traffic over the result.

pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod export;
pub mod ingest;
pub mod utils;

pub use aggregate::{TrafficAggregator, TrafficReport};
pub use classifier::{classify, classify_metric, decode_int, ClassificationRecord, MetricInfo, UrlClassifier};
