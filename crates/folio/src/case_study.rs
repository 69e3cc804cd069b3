//! The case-study model.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::model::Model;

/// A portfolio case study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudy {
    pub company: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub featured: bool,
    /// HTML introduction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default)]
    pub details: CaseStudyDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_members: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methodologies: Option<Methodologies>,
}

/// Methodologies are stored either as a list or as free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Methodologies {
    List(Vec<String>),
    Text(String),
}

impl Methodologies {
    /// Individual methodology names.
    ///
    /// Free text is split on commas and newlines.
    pub fn items(&self) -> Vec<String> {
        match self {
            Methodologies::List(items) => items.clone(),
            Methodologies::Text(text) => text
                .split([',', '\n'])
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Model for CaseStudy {
    const COLLECTION: &'static str = "caseStudies";

    fn validate(&self) -> Result<(), String> {
        check_company(&self.company)?;
        if let Some(image) = &self.image {
            check_image(image)?;
        }
        if let Some(sections) = &self.sections {
            check_sections(sections)?;
        }
        Ok(())
    }
}

/// A partial case-study update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStudyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<CaseStudyDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<Section>>,
}

impl CaseStudyPatch {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(company) = &self.company {
            check_company(company)?;
        }
        if let Some(image) = &self.image {
            check_image(image)?;
        }
        if let Some(sections) = &self.sections {
            check_sections(sections)?;
        }
        Ok(())
    }
}

fn check_company(company: &str) -> Result<(), String> {
    if company.trim().is_empty() {
        return Err("company must not be empty".to_string());
    }
    Ok(())
}

fn check_image(image: &str) -> Result<(), String> {
    match Url::parse(image) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(url) => Err(format!("image URL must be http or https, got '{}'", url.scheme())),
        Err(e) => Err(format!("image is not a valid URL: {}", e)),
    }
}

fn check_sections(sections: &[Section]) -> Result<(), String> {
    match sections.iter().position(|s| s.heading.trim().is_empty()) {
        Some(index) => Err(format!("section {} has an empty heading", index)),
        None => Ok(()),
    }
}
