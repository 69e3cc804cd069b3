//! Sample case studies.

use crate::case_study::{CaseStudy, CaseStudyDetails, Section};

/// Fixed id of the Bravado Health sample.
pub const BRAVADO_HEALTH_ID: &str = "bravado-health";

pub fn bravado_health() -> CaseStudy {
    let section = |heading: &str, content: &str| Section {
        heading: heading.to_string(),
        content: content.to_string(),
        images: Vec::new(),
    };

    CaseStudy {
        company: "Bravado Health".to_string(),
        image: Some(
            "https://images.unsplash.com/photo-1465101046530-73398c7f28ca?auto=format&fit=crop&w=800&q=80"
                .to_string(),
        ),
        hidden: false,
        featured: true,
        intro: Some(
            "<p>I applied user-centered design methodology to create an engaging mobile app for \
             Bravado Health, empowering people to prepare for and recover from surgery with \
             confidence.</p>"
                .to_string(),
        ),
        details: CaseStudyDetails {
            timeline: Some("2018–2021".to_string()),
            ..Default::default()
        },
        sections: Some(vec![
            section(
                "Insurance and Fintech",
                "Worked on digital transformation for insurance and fintech clients, improving \
                 user experience and streamlining claims processing.",
            ),
            section(
                "Government",
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Pellentesque euismod, \
                 urna eu tincidunt consectetur, nisi nisl aliquam nunc, eget aliquam massa nisl \
                 quis neque.",
            ),
            section(
                "E-commerce",
                "Designed and optimized e-commerce flows for increased conversion and customer \
                 satisfaction.",
            ),
            section(
                "Accessibility",
                "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Vestibulum euismod, \
                 nisi vel consectetur euismod, nisl nisi consectetur nisi, euismod consectetur \
                 nisi nisi euismod nisi.",
            ),
        ]),
    }
}

/// Every sample, keyed by its fixed id.
pub fn samples() -> Vec<(&'static str, CaseStudy)> {
    vec![(BRAVADO_HEALTH_ID, bravado_health())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;

    #[test]
    fn test_samples_are_valid() {
        for (id, study) in samples() {
            assert!(study.validate().is_ok(), "{} should validate", id);
        }
    }

    #[test]
    fn test_bravado_health() {
        let study = bravado_health();
        assert!(study.featured);
        assert!(!study.hidden);
        assert_eq!(study.sections.as_ref().map(Vec::len), Some(4));
        assert_eq!(study.details.timeline.as_deref(), Some("2018–2021"));
    }
}
