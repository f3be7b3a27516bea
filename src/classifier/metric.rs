use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use tracing::trace;

use super::decoder::{decode_entity_name, decode_int, percent_decode};
use super::patterns::{
    CITY_LOCATION_REGEX, HEX_ID_REGEX, ID_AND_EXTRA_REGEX, PAGINATION_REGEX, SIMPLE_METRIC_REGEX,
};

/// Words that mark the extra part of a location-style metric portion as URL
/// structure rather than an employer name.
const STRUCTURAL_NOISE_WORDS: [&str; 3] = ["page", "salary", "hourly"];

/// Fields extracted from the trailing "metric portion" of a research URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricInfo {
    pub metric_type: Option<String>,
    pub page_number: Option<u64>,
    pub additional_employer: Option<String>,
    pub location_info: Option<String>,
    pub unique_id: Option<String>,
    /// The metric portion exactly as it was passed in
    pub raw_metric: Option<String>,
}

/// The shape grammars a metric portion can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricShape {
    Pagination,
    CityLocation,
    IdAndExtra,
    Simple,
    Fallback,
}

impl MetricShape {
    /// Structural grammars in the order they are tried. `Fallback` is not
    /// listed: it applies when none of these match.
    pub const PRECEDENCE: [MetricShape; 4] = [
        MetricShape::Pagination,
        MetricShape::CityLocation,
        MetricShape::IdAndExtra,
        MetricShape::Simple,
    ];

    fn pattern(self) -> Option<&'static Lazy<Regex>> {
        match self {
            MetricShape::Pagination => Some(&PAGINATION_REGEX),
            MetricShape::CityLocation => Some(&CITY_LOCATION_REGEX),
            MetricShape::IdAndExtra => Some(&ID_AND_EXTRA_REGEX),
            MetricShape::Simple => Some(&SIMPLE_METRIC_REGEX),
            MetricShape::Fallback => None,
        }
    }

    /// Returns the first grammar in precedence order that matches `segment`.
    pub fn detect(segment: &str) -> MetricShape {
        Self::PRECEDENCE
            .into_iter()
            .find(|shape| shape.pattern().is_some_and(|re| re.is_match(segment)))
            .unwrap_or(MetricShape::Fallback)
    }

    fn extract(self, caps: &Captures<'_>, info: &mut MetricInfo) {
        match self {
            MetricShape::Pagination => {
                info.metric_type = Some(caps[1].to_string());
                info.page_number = decode_int(caps.get(2).map(|m| m.as_str()));
            }
            MetricShape::CityLocation => {
                info.metric_type = Some("City".to_string());
                info.location_info = Some(percent_decode(&caps[1]).replace('-', " "));
                info.page_number = decode_int(caps.get(2).map(|m| m.as_str()));
            }
            MetricShape::IdAndExtra => extract_id_and_extra(&caps[1], &caps[2], &caps[3], info),
            MetricShape::Simple => {
                info.metric_type = Some(caps[1].to_string());
            }
            MetricShape::Fallback => {}
        }
    }
}

/// Decomposes the metric portion of a research URL, e.g. `Salary/Page-3` or
/// `Hourly_Rate/0a9d4bb0/H.E.B.`.
///
/// Grammars are tried in [`MetricShape::PRECEDENCE`] order and the first match
/// wins; anything left over goes through a slash-splitting fallback. Absent or
/// empty input produces an all-absent result.
pub fn classify_metric(raw_segment: Option<&str>) -> MetricInfo {
    let mut info = MetricInfo {
        raw_metric: raw_segment.map(str::to_string),
        ..MetricInfo::default()
    };

    let segment = match raw_segment {
        Some(s) if !s.is_empty() => s,
        _ => return info,
    };

    for shape in MetricShape::PRECEDENCE {
        let Some(pattern) = shape.pattern() else { continue };
        if let Some(caps) = pattern.captures(segment) {
            trace!("Metric portion {} matched {:?}", segment, shape);
            shape.extract(&caps, &mut info);
            return info;
        }
    }

    trace!("Metric portion {} fell through to slash splitting", segment);
    extract_fallback(segment, &mut info);
    info
}

fn extract_id_and_extra(metric_type: &str, middle: &str, extra: &str, info: &mut MetricInfo) {
    info.metric_type = Some(metric_type.to_string());
    let extra = decode_entity_name(extra);

    if HEX_ID_REGEX.is_match(middle) {
        info.unique_id = Some(middle.to_string());
        info.additional_employer = Some(extra);
    } else if middle.contains('-') || middle.chars().count() == 2 {
        // Two characters is usually a state code
        info.location_info = Some(middle.replace('-', " "));
        let lowered = extra.to_lowercase();
        if !STRUCTURAL_NOISE_WORDS.iter().any(|word| lowered.contains(word)) {
            info.additional_employer = Some(extra);
        }
    } else {
        info.additional_employer = Some(format!("{} {}", middle, extra).replace('_', " "));
    }
}

fn extract_fallback(segment: &str, info: &mut MetricInfo) {
    let mut parts = segment.split('/');

    info.metric_type = parts.next().map(str::to_string);

    if let Some(second) = parts.next() {
        if second.starts_with("Page-") {
            info.page_number = decode_int(second.split_once('-').map(|(_, page)| page));
        } else {
            info.unique_id = Some(second.to_string());
        }
    }

    if let Some(third) = parts.next() {
        info.additional_employer = Some(decode_entity_name(third));
    }
}
