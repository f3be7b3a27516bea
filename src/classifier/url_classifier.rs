use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::{Captures, Regex};
use tracing::{debug, instrument, trace};

use super::decoder::{decode_entity_name, percent_decode};
use super::metric::classify_metric;
use super::patterns::{
    COST_OF_LIVING_REGEX, RESEARCH_COUNTRY_REGEX, RESEARCH_EMPLOYER_REGEX,
    RESEARCH_GENERAL_REGEX, RESEARCH_JOB_REGEX, RESEARCH_SKILL_REGEX,
};
use super::record::{Category, ClassificationRecord, Section};
use super::url_parts::decompose_url;

/// Path-level section grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionRule {
    CostOfLiving,
    Research,
    Homepage,
    SalaryCalculator,
    Products,
    Careers,
    CompensationTrends,
}

impl SectionRule {
    /// Order in which section grammars are tried; the first match wins.
    pub const PRECEDENCE: [SectionRule; 7] = [
        SectionRule::CostOfLiving,
        SectionRule::Research,
        SectionRule::Homepage,
        SectionRule::SalaryCalculator,
        SectionRule::Products,
        SectionRule::Careers,
        SectionRule::CompensationTrends,
    ];

    pub fn matches(self, path: &str) -> bool {
        match self {
            SectionRule::CostOfLiving => path.contains("/cost-of-living-calculator"),
            SectionRule::Research => path.contains("/research/"),
            SectionRule::Homepage => path.is_empty() || path == "/",
            SectionRule::SalaryCalculator => path.contains("/salary-calculator"),
            SectionRule::Products => path.contains("/products/"),
            SectionRule::Careers => path.contains("/careers"),
            SectionRule::CompensationTrends => path.contains("/compensation-trends/"),
        }
    }

    /// First section grammar in precedence order matching `path`, if any.
    pub fn detect(path: &str) -> Option<SectionRule> {
        Self::PRECEDENCE.into_iter().find(|rule| rule.matches(path))
    }

    fn apply(self, path: &str, record: &mut ClassificationRecord) {
        match self {
            SectionRule::CostOfLiving => {
                record.section = Some(Section::CostOfLiving);
                record.category = Category::CostOfLiving;
                apply_cost_of_living(path, record);
            }
            SectionRule::Research => {
                record.section = Some(Section::Research);
                match ResearchRule::PRECEDENCE
                    .into_iter()
                    .find_map(|rule| rule.pattern().captures(path).map(|caps| (rule, caps)))
                {
                    Some((rule, caps)) => {
                        trace!("Research path {} matched {:?}", path, rule);
                        rule.apply(&caps, record);
                    }
                    None => debug!("Research path {} matched no research grammar", path),
                }
            }
            SectionRule::Homepage => {
                record.section = Some(Section::Homepage);
                record.category = Category::Homepage;
            }
            SectionRule::SalaryCalculator => {
                record.section = Some(Section::SalaryCalculator);
                record.category = Category::Tools;
            }
            SectionRule::Products => {
                record.section = Some(Section::Products);
                record.category = Category::Commercial;
            }
            SectionRule::Careers => {
                record.section = Some(Section::Careers);
                record.category = Category::Corporate;
            }
            SectionRule::CompensationTrends => {
                record.section = Some(Section::CompensationTrends);
                record.category = Category::Content;
            }
        }
    }
}

/// Sub-grammars of `/research/` paths. Entity-typed rules always take
/// precedence over the general country page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchRule {
    Job,
    Employer,
    Country,
    Skill,
    General,
}

impl ResearchRule {
    pub const PRECEDENCE: [ResearchRule; 5] = [
        ResearchRule::Job,
        ResearchRule::Employer,
        ResearchRule::Country,
        ResearchRule::Skill,
        ResearchRule::General,
    ];

    fn pattern(self) -> &'static Lazy<Regex> {
        match self {
            ResearchRule::Job => &RESEARCH_JOB_REGEX,
            ResearchRule::Employer => &RESEARCH_EMPLOYER_REGEX,
            ResearchRule::Country => &RESEARCH_COUNTRY_REGEX,
            ResearchRule::Skill => &RESEARCH_SKILL_REGEX,
            ResearchRule::General => &RESEARCH_GENERAL_REGEX,
        }
    }

    pub fn category(self) -> Category {
        match self {
            ResearchRule::Job => Category::ResearchJob,
            ResearchRule::Employer => Category::ResearchEmployer,
            ResearchRule::Country => Category::ResearchCountry,
            ResearchRule::Skill => Category::ResearchSkill,
            ResearchRule::General => Category::ResearchGeneral,
        }
    }

    /// First research grammar in precedence order matching `path`, if any.
    pub fn detect(path: &str) -> Option<ResearchRule> {
        Self::PRECEDENCE
            .into_iter()
            .find(|rule| rule.pattern().is_match(path))
    }

    fn apply(self, caps: &Captures<'_>, record: &mut ClassificationRecord) {
        record.category = self.category();
        // Country segment is kept exactly as it appears in the path
        record.country = Some(caps[1].to_string());

        match self {
            ResearchRule::Job => record.job_title = Some(decode_entity_name(&caps[2])),
            ResearchRule::Employer => record.employer = Some(decode_entity_name(&caps[2])),
            ResearchRule::Country => {
                record.subsection = Some(percent_decode(&caps[2]).replace('_', " "))
            }
            ResearchRule::Skill => record.skill = Some(decode_entity_name(&caps[2])),
            ResearchRule::General => return,
        }

        record.merge_metric(classify_metric(caps.get(3).map(|m| m.as_str())));
    }
}

fn apply_cost_of_living(path: &str, record: &mut ClassificationRecord) {
    let Some(caps) = COST_OF_LIVING_REGEX.captures(path) else {
        return;
    };
    let location = &caps[1];

    match location.split_once('-') {
        Some((state, city)) => {
            record.location_state = Some(percent_decode(state).replace('-', " "));
            record.location_city = Some(percent_decode(city).replace('-', " "));
        }
        None => {
            record.location_state = Some(percent_decode(location).replace('-', " "));
        }
    }
}

/// Classifies one URL into its site taxonomy.
///
/// The path is matched against the section grammars in
/// [`SectionRule::PRECEDENCE`] order; research pages are then split by
/// [`ResearchRule`] and their metric portion parsed with [`classify_metric`].
///
/// # Arguments
/// * `url` - Raw URL text, absolute or a bare path
///
/// # Returns
/// * `ClassificationRecord` - Never fails: blank input or text that cannot be
///   decomposed yields [`ClassificationRecord::empty`], whose category is `other`
#[instrument(level = "trace", skip_all, fields(url = %url))]
pub fn classify(url: &str) -> ClassificationRecord {
    let parts = match decompose_url(url) {
        Ok(parts) => parts,
        Err(e) => {
            debug!("Could not decompose URL '{}': {:#}", url, e);
            return ClassificationRecord::empty(url);
        }
    };

    let mut record = ClassificationRecord {
        url: url.to_string(),
        domain: parts.domain,
        ..ClassificationRecord::default()
    };

    match SectionRule::detect(&parts.path) {
        Some(rule) => {
            trace!("Path {} matched section rule {:?}", parts.path, rule);
            rule.apply(&parts.path, &mut record);
        }
        None => {
            record.section = Some(Section::Other);
            record.category = Category::Other;
        }
    }

    record.full_path = Some(parts.path);
    record
}

/// Stateless front end over [`classify`] with explicit batch entry points.
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlClassifier;

impl UrlClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, url: &str) -> ClassificationRecord {
        classify(url)
    }

    /// Classifies every URL in order. The output has one record per input.
    pub fn classify_batch<I, S>(&self, urls: I) -> Vec<ClassificationRecord>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        urls.into_iter().map(|url| classify(url.as_ref())).collect()
    }

    /// Same contract as [`classify_batch`](Self::classify_batch), spread
    /// across the rayon thread pool. Input order is preserved.
    pub fn classify_parallel<S>(&self, urls: &[S]) -> Vec<ClassificationRecord>
    where
        S: AsRef<str> + Sync,
    {
        urls.par_iter().map(|url| classify(url.as_ref())).collect()
    }
}
