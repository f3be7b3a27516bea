#[cfg(test)]
mod tests {
    use url_taxonomy::classifier::{Category, Section};
    use url_taxonomy::{classify, classify_metric, decode_int, UrlClassifier};

    #[test]
    fn test_research_job_end_to_end() {
        let record = classify(
            "https://site.example/research/United_States/Job=Software_Engineer/Salary/Page-2",
        );

        assert_eq!(record.section, Some(Section::Research));
        assert_eq!(record.category, Category::ResearchJob);
        assert_eq!(record.country.as_deref(), Some("United_States"));
        assert_eq!(record.job_title.as_deref(), Some("Software Engineer"));
        assert_eq!(record.metric_type.as_deref(), Some("Salary"));
        assert_eq!(record.page_number, Some(2));
        assert_eq!(record.full_path.as_deref(), Some("/research/United_States/Job=Software_Engineer/Salary/Page-2"));
    }

    #[test]
    fn test_cost_of_living_end_to_end() {
        let record =
            classify("https://www.site.example/cost-of-living-calculator/California-San-Francisco");

        assert_eq!(record.section, Some(Section::CostOfLiving));
        assert_eq!(record.category, Category::CostOfLiving);
        assert_eq!(record.location_state.as_deref(), Some("California"));
        assert_eq!(record.location_city.as_deref(), Some("San Francisco"));
        assert_eq!(record.domain.as_deref(), Some("www.site.example"));
    }

    #[test]
    fn test_employer_with_city_metric() {
        let record = classify(
            "https://site.example/research/US/Employer=Amazon.com_Inc/City/Seattle-WA/Page-3",
        );

        assert_eq!(record.category, Category::ResearchEmployer);
        assert_eq!(record.employer.as_deref(), Some("Amazon.com Inc"));
        assert_eq!(record.metric_type.as_deref(), Some("City"));
        assert_eq!(record.location_info.as_deref(), Some("Seattle WA"));
        assert_eq!(record.page_number, Some(3));
    }

    #[test]
    fn test_metric_portion_properties() {
        let info = classify_metric(Some("Hourly_Rate/0a9d4bb0/H.E.B."));
        assert_eq!(info.metric_type.as_deref(), Some("Hourly_Rate"));
        assert_eq!(info.unique_id.as_deref(), Some("0a9d4bb0"));
        assert_eq!(info.additional_employer.as_deref(), Some("H.E.B."));

        assert_eq!(decode_int(Some("{Page}")), None);
        assert_eq!(decode_int(Some("%7BPage%7D")), None);
    }

    #[test]
    fn test_garbage_yields_empty_record() {
        for url in ["", "   ", "\t", "ftp://[::1"] {
            let record = classify(url);
            assert_eq!(record.category, Category::Other);
            assert!(record.section.is_none());
            assert!(record.domain.is_none());
            assert!(record.full_path.is_none());
        }
    }

    #[test]
    fn test_batch_has_same_length_and_order() {
        let urls = [
            "https://site.example/",
            "garbage that is not a url",
            "https://",
            "https://site.example/research/DE/Country=Germany/Salary",
        ];
        let records = UrlClassifier::new().classify_batch(urls);

        assert_eq!(records.len(), urls.len());
        for (url, record) in urls.iter().zip(&records) {
            assert_eq!(record.url, *url);
        }
        assert_eq!(records[0].category, Category::Homepage);
        assert_eq!(records[1].category, Category::Other);
        assert_eq!(records[2].category, Category::Homepage);
        assert!(records[2].domain.is_none());
        assert_eq!(records[3].subsection.as_deref(), Some("Germany"));
    }
}
