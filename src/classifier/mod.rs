//! URL decomposition engine.
//!
//! [`classify`] turns one URL into a [`ClassificationRecord`]. Section
//! grammars are tried in [`SectionRule::PRECEDENCE`] order; research pages
//! are further split by [`ResearchRule`] and their trailing metric portion is
//! handed to [`classify_metric`].

pub mod decoder;
pub mod metric;
pub mod patterns;
pub mod record;
pub mod url_classifier;
pub mod url_parts;


pub use decoder::{decode_entity_name, decode_int, percent_decode};
pub use metric::{classify_metric, MetricInfo, MetricShape};
pub use record::{Category, ClassificationRecord, Section};
pub use url_classifier::{classify, ResearchRule, SectionRule, UrlClassifier};
pub use url_parts::{decompose_url, UrlParts};
