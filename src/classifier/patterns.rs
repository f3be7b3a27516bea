use once_cell::sync::Lazy;
use regex::Regex;

// Decoder
pub static DIGIT_RUN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9]+").unwrap()
});

// Metric portion grammars, e.g. `Salary/Page-3`
pub static PAGINATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^/]+)/Page-([0-9]+)$").unwrap()
});

// `City/Washington-DC/Page-2`
pub static CITY_LOCATION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^City/([^/]+)(?:/Page-([0-9]+))?$").unwrap()
});

// `Hourly_Rate/0a9d4bb0/H.E.B.`
pub static ID_AND_EXTRA_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^/]+)/([^/]+)/(.+)$").unwrap()
});

pub static SIMPLE_METRIC_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^/]+)$").unwrap()
});

pub static HEX_ID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[a-f0-9]{8,}$").unwrap()
});

// Section grammars, matched anywhere in the path
pub static COST_OF_LIVING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/cost-of-living-calculator/([^/]+)(?:/(.+))?").unwrap()
});

pub static RESEARCH_JOB_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/research/([^/]+)/Job=([^/]+)/(.+)").unwrap()
});

pub static RESEARCH_EMPLOYER_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/research/([^/]+)/Employer=([^/]+)/(.+)").unwrap()
});

pub static RESEARCH_COUNTRY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/research/([^/]+)/Country=([^/]+)/(.+)").unwrap()
});

pub static RESEARCH_SKILL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/research/([^/]+)/Skill=([^/]+)/(.+)").unwrap()
});

pub static RESEARCH_GENERAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/research/([^/]+)/?$").unwrap()
});

// Absolute URL with an explicit scheme, e.g. `https://`
pub static SCHEME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*://").unwrap()
});
