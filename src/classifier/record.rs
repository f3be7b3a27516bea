use std::fmt;

use serde::Serialize;

use super::metric::MetricInfo;

/// Top-level site area a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    CostOfLiving,
    Research,
    Homepage,
    SalaryCalculator,
    Products,
    Careers,
    CompensationTrends,
    Other,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::CostOfLiving => "cost_of_living",
            Section::Research => "research",
            Section::Homepage => "homepage",
            Section::SalaryCalculator => "salary_calculator",
            Section::Products => "products",
            Section::Careers => "careers",
            Section::CompensationTrends => "compensation_trends",
            Section::Other => "other",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse analytics bucket. Every record has one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    CostOfLiving,
    ResearchJob,
    ResearchEmployer,
    ResearchCountry,
    ResearchSkill,
    ResearchGeneral,
    Homepage,
    Tools,
    Commercial,
    Corporate,
    Content,
    #[default]
    Other,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::CostOfLiving => "cost_of_living",
            Category::ResearchJob => "research_job",
            Category::ResearchEmployer => "research_employer",
            Category::ResearchCountry => "research_country",
            Category::ResearchSkill => "research_skill",
            Category::ResearchGeneral => "research_general",
            Category::Homepage => "homepage",
            Category::Tools => "tools",
            Category::Commercial => "commercial",
            Category::Corporate => "corporate",
            Category::Content => "content",
            Category::Other => "other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structured taxonomy of a single URL.
///
/// Built fresh for every input by [`classify`](super::classify). Fields that
/// the matching grammar does not produce stay `None`; a URL that cannot be
/// decomposed at all yields [`ClassificationRecord::empty`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationRecord {
    pub url: String,
    pub domain: Option<String>,
    pub full_path: Option<String>,
    pub section: Option<Section>,
    pub category: Category,
    pub subsection: Option<String>,
    pub location_state: Option<String>,
    pub location_city: Option<String>,
    pub country: Option<String>,
    pub job_title: Option<String>,
    pub employer: Option<String>,
    pub skill: Option<String>,
    pub metric_type: Option<String>,
    pub page_number: Option<u64>,
    pub additional_employer: Option<String>,
    pub location_info: Option<String>,
    pub unique_id: Option<String>,
    pub raw_metric: Option<String>,
}

impl ClassificationRecord {
    /// The all-absent record: only `url` is kept and `category` is `other`.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Copies every field of a metric-portion result onto this record.
    pub(crate) fn merge_metric(&mut self, metric: MetricInfo) {
        self.metric_type = metric.metric_type;
        self.page_number = metric.page_number;
        self.additional_employer = metric.additional_employer;
        self.location_info = metric.location_info;
        self.unique_id = metric.unique_id;
        self.raw_metric = metric.raw_metric;
    }

    /// True when no grammar-produced field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::empty(self.url.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_defaults_to_other() {
        let record = ClassificationRecord::empty("not a url");
        assert_eq!(record.url, "not a url");
        assert_eq!(record.category, Category::Other);
        assert!(record.section.is_none());
        assert!(record.domain.is_none());
        assert!(record.is_empty());
    }

    #[test]
    fn test_serializes_snake_case() {
        let record = ClassificationRecord {
            section: Some(Section::CostOfLiving),
            category: Category::ResearchJob,
            ..ClassificationRecord::empty("u")
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["section"], "cost_of_living");
        assert_eq!(json["category"], "research_job");
        assert!(json["page_number"].is_null());
    }

    #[test]
    fn test_display_matches_serde() {
        assert_eq!(Section::CompensationTrends.to_string(), "compensation_trends");
        assert_eq!(Category::Tools.to_string(), "tools");
    }
}
