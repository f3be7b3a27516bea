//! Traffic aggregation over classified records.
//!
//! A [`TrafficAggregator`] accumulates per-group sums and counts. Aggregators
//! built on separate partitions can be combined with
//! [`TrafficAggregator::merge`], so large inputs are reduced in parallel with
//! [`TrafficAggregator::aggregate_parallel`].

pub mod summary;

use std::collections::BTreeMap;
use std::fmt;

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::classifier::{Category, ClassificationRecord, Section};

pub use summary::ParseSummary;

/// Number of rows kept for the "top" analyses unless configured otherwise.
pub const DEFAULT_TOP_N: usize = 20;

/// Running traffic total and URL count of a single group.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroupStats {
    pub total_traffic: f64,
    pub url_count: u64,
}

impl GroupStats {
    fn add(&mut self, traffic: f64) {
        self.total_traffic += traffic;
        self.url_count += 1;
    }

    fn merge(&mut self, other: &GroupStats) {
        self.total_traffic += other.total_traffic;
        self.url_count += other.url_count;
    }

    pub fn avg_traffic(&self) -> f64 {
        if self.url_count == 0 {
            0.0
        } else {
            self.total_traffic / self.url_count as f64
        }
    }
}

/// Grouping key of an analysis row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Text(String),
    Page(u64),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Text(text) => f.write_str(text),
            GroupKey::Page(page) => write!(f, "{}", page),
        }
    }
}

/// The groupings produced by a traffic analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    BySection,
    ByCategory,
    ByMetricType,
    ByPageNumber,
    CostOfLivingByState,
    ResearchByCountry,
    TopEmployers,
    AdditionalEmployers,
    TopJobs,
}

impl AnalysisKind {
    pub const ALL: [AnalysisKind; 9] = [
        AnalysisKind::BySection,
        AnalysisKind::ByCategory,
        AnalysisKind::ByMetricType,
        AnalysisKind::ByPageNumber,
        AnalysisKind::CostOfLivingByState,
        AnalysisKind::ResearchByCountry,
        AnalysisKind::TopEmployers,
        AnalysisKind::AdditionalEmployers,
        AnalysisKind::TopJobs,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            AnalysisKind::BySection => "by_section",
            AnalysisKind::ByCategory => "by_category",
            AnalysisKind::ByMetricType => "by_metric_type",
            AnalysisKind::ByPageNumber => "by_page_number",
            AnalysisKind::CostOfLivingByState => "cost_of_living_by_state",
            AnalysisKind::ResearchByCountry => "research_by_country",
            AnalysisKind::TopEmployers => "top_employers",
            AnalysisKind::AdditionalEmployers => "additional_employers",
            AnalysisKind::TopJobs => "top_jobs",
        }
    }

    /// Human-readable title, e.g. "Cost Of Living By State".
    pub fn title(&self) -> String {
        self.name()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn is_top_n(&self) -> bool {
        matches!(
            self,
            AnalysisKind::TopEmployers | AnalysisKind::AdditionalEmployers | AnalysisKind::TopJobs
        )
    }

    /// Key of `record` in this grouping, or `None` when the record does not
    /// take part in it.
    fn key(&self, record: &ClassificationRecord) -> Option<GroupKey> {
        let text = |value: &Option<String>| value.clone().map(GroupKey::Text);
        match self {
            AnalysisKind::BySection => record.section.map(|s| GroupKey::Text(s.to_string())),
            AnalysisKind::ByCategory => Some(GroupKey::Text(record.category.to_string())),
            AnalysisKind::ByMetricType => text(&record.metric_type),
            AnalysisKind::ByPageNumber => record.page_number.map(GroupKey::Page),
            AnalysisKind::CostOfLivingByState => (record.category == Category::CostOfLiving)
                .then(|| text(&record.location_state))
                .flatten(),
            AnalysisKind::ResearchByCountry => (record.section == Some(Section::Research))
                .then(|| text(&record.country))
                .flatten(),
            AnalysisKind::TopEmployers => (record.category == Category::ResearchEmployer)
                .then(|| text(&record.employer))
                .flatten(),
            AnalysisKind::AdditionalEmployers => text(&record.additional_employer),
            AnalysisKind::TopJobs => (record.category == Category::ResearchJob)
                .then(|| text(&record.job_title))
                .flatten(),
        }
    }
}

/// One output row of an analysis, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRow {
    pub key: GroupKey,
    pub total_traffic: f64,
    pub url_count: u64,
    pub avg_traffic: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub kind: AnalysisKind,
    pub rows: Vec<AnalysisRow>,
}

/// All non-empty analyses of a run, in [`AnalysisKind::ALL`] order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrafficReport {
    pub analyses: Vec<Analysis>,
}

impl TrafficReport {
    pub fn get(&self, kind: AnalysisKind) -> Option<&Analysis> {
        self.analyses.iter().find(|analysis| analysis.kind == kind)
    }

    pub fn is_empty(&self) -> bool {
        self.analyses.is_empty()
    }
}

/// Accumulates traffic per group for every [`AnalysisKind`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrafficAggregator {
    groups: BTreeMap<AnalysisKind, BTreeMap<GroupKey, GroupStats>>,
}

impl TrafficAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one record with its traffic value. NaN traffic counts as missing
    /// and is ignored entirely.
    pub fn add(&mut self, record: &ClassificationRecord, traffic: f64) {
        if traffic.is_nan() {
            return;
        }
        for kind in AnalysisKind::ALL {
            if let Some(key) = kind.key(record) {
                self.groups
                    .entry(kind)
                    .or_default()
                    .entry(key)
                    .or_default()
                    .add(traffic);
            }
        }
    }

    /// Folds `other` into this aggregator.
    pub fn merge(&mut self, other: TrafficAggregator) {
        for (kind, groups) in other.groups {
            let target = self.groups.entry(kind).or_default();
            for (key, stats) in groups {
                target.entry(key).or_default().merge(&stats);
            }
        }
    }

    /// Aggregates `(record, traffic)` pairs across the rayon thread pool.
    pub fn aggregate_parallel<'a, I>(rows: I) -> Self
    where
        I: IntoParallelIterator<Item = (&'a ClassificationRecord, f64)>,
    {
        rows.into_par_iter()
            .fold(TrafficAggregator::new, |mut acc, (record, traffic)| {
                acc.add(record, traffic);
                acc
            })
            .reduce(TrafficAggregator::new, |mut left, right| {
                left.merge(right);
                left
            })
    }

    pub fn stats(&self, kind: AnalysisKind, key: &GroupKey) -> Option<GroupStats> {
        self.groups.get(&kind).and_then(|groups| groups.get(key)).copied()
    }

    /// Builds the sorted report. Top-style analyses keep at most `top_n` rows.
    pub fn report(&self, top_n: usize) -> TrafficReport {
        let mut analyses = Vec::new();

        for kind in AnalysisKind::ALL {
            let Some(groups) = self.groups.get(&kind).filter(|g| !g.is_empty()) else {
                continue;
            };

            let mut entries: Vec<(&GroupKey, &GroupStats)> = groups.iter().collect();
            if kind != AnalysisKind::ByPageNumber {
                // Stable sort keeps key order among equal totals
                entries.sort_by(|a, b| b.1.total_traffic.total_cmp(&a.1.total_traffic));
            }
            if kind.is_top_n() {
                entries.truncate(top_n);
            }

            let rows = entries
                .into_iter()
                .map(|(key, stats)| AnalysisRow {
                    key: key.clone(),
                    total_traffic: round2(stats.total_traffic),
                    url_count: stats.url_count,
                    avg_traffic: round2(stats.avg_traffic()),
                })
                .collect();
            analyses.push(Analysis { kind, rows });
        }

        debug!("Traffic report built with {} analyses", analyses.len());
        TrafficReport { analyses }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
