use std::collections::HashMap;

use crate::classifier::{Category, ClassificationRecord, Section};

/// Value counts of sections and categories over a run.
#[derive(Debug, Clone, Default)]
pub struct ParseSummary {
    total: usize,
    sections: HashMap<Section, usize>,
    categories: HashMap<Category, usize>,
}

impl ParseSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, record: &ClassificationRecord) {
        self.total += 1;
        if let Some(section) = record.section {
            *self.sections.entry(section).or_default() += 1;
        }
        *self.categories.entry(record.category).or_default() += 1;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Sections by descending count. Records without a section are not listed.
    pub fn sections(&self) -> Vec<(Section, usize)> {
        sorted_counts(&self.sections)
    }

    pub fn categories(&self) -> Vec<(Category, usize)> {
        sorted_counts(&self.categories)
    }

    /// Share of all records, in percent.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 * 100.0 / self.total as f64
        }
    }
}

fn sorted_counts<K: Copy + Ord>(counts: &HashMap<K, usize>) -> Vec<(K, usize)> {
    let mut entries: Vec<(K, usize)> = counts.iter().map(|(k, v)| (*k, *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;

    #[test]
    fn test_counts_and_percentages() {
        let mut summary = ParseSummary::new();
        for url in [
            "https://site.example/careers",
            "https://site.example/careers/jobs",
            "https://site.example/products/x",
            "",
        ] {
            summary.add(&classify(url));
        }

        assert_eq!(summary.total(), 4);
        assert_eq!(summary.sections(), vec![(Section::Careers, 2), (Section::Products, 1)]);
        assert_eq!(summary.categories()[0], (Category::Corporate, 2));
        assert_eq!(summary.percentage(2), 50.0);
    }
}
