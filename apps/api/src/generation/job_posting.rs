//! Fixed-shape job records and applicant data exchanged with the pipeline.
//!
//! The model answers with loosely-typed JSON. Everything is normalized here so
//! that downstream code never has to guess which keys exist.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Display value for job fields the model could not find.
pub const NOT_AVAILABLE: &str = "N/A";

const TITLE_KEYS: [&str; 4] = ["title", "role", "position", "job_title"];
const COMPANY_KEYS: [&str; 3] = ["company", "company_name", "employer"];
const LOCATION_KEYS: [&str; 2] = ["location", "locations"];
const EXPERIENCE_KEYS: [&str; 2] = ["experience", "years_of_experience"];
const SKILLS_KEYS: [&str; 2] = ["skills", "requirements"];
const DESCRIPTION_KEYS: [&str; 2] = ["description", "summary"];
/// Keys under which a model sometimes nests the record list.
const WRAPPER_KEYS: [&str; 3] = ["jobs", "job_postings", "postings"];

/// One job posting extracted from unstructured text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub experience: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    pub description: Option<String>,
}

/// The three headline fields, with `N/A` substituted for missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetails {
    pub title: String,
    pub company: String,
    pub location: String,
}

impl JobPosting {
    pub fn details(&self) -> JobDetails {
        let show = |field: &Option<String>| {
            field
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };
        JobDetails {
            title: show(&self.title),
            company: show(&self.company),
            location: show(&self.location),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.company.is_none()
            && self.location.is_none()
            && self.experience.is_none()
            && self.skills.is_empty()
            && self.description.is_none()
    }

    fn from_record(record: &Map<String, Value>) -> Self {
        JobPosting {
            title: text_field(record, &TITLE_KEYS),
            company: text_field(record, &COMPANY_KEYS),
            location: text_field(record, &LOCATION_KEYS),
            experience: text_field(record, &EXPERIENCE_KEYS),
            skills: list_field(record, &SKILLS_KEYS),
            description: text_field(record, &DESCRIPTION_KEYS),
        }
    }
}

/// Per-request applicant data handed to mail generation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicantProfile {
    pub resume_text: String,
    pub additional_info: String,
}

impl ApplicantProfile {
    pub fn new(resume_text: String, additional_info: Option<String>) -> Self {
        Self {
            resume_text,
            additional_info: additional_info
                .map(|info| info.trim().to_string())
                .unwrap_or_default(),
        }
    }
}

/// Normalizes a model answer into job postings.
///
/// Accepts a single object, an array of objects, or an object wrapping the
/// array under a `jobs`-like key. Non-object elements and records without any
/// recognizable field are dropped. Order is preserved.
pub fn job_postings_from_value(value: &Value) -> Vec<JobPosting> {
    let records: Vec<&Value> = match value {
        Value::Array(items) => items.iter().collect(),
        Value::Object(map) => match WRAPPER_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_array))
        {
            Some(items) => items.iter().collect(),
            None => vec![value],
        },
        _ => Vec::new(),
    };

    records
        .into_iter()
        .filter_map(Value::as_object)
        .map(JobPosting::from_record)
        .filter(|posting| !posting.is_empty())
        .collect()
}

fn text_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => non_blank(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(scalar_text).collect();
            (!parts.is_empty()).then(|| parts.join(", "))
        }
        _ => None,
    }
}

/// First alias whose value yields at least one item; null or empty values fall through.
fn list_field(record: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    keys.iter()
        .filter_map(|key| record.get(*key))
        .map(list_items)
        .find(|items| !items.is_empty())
        .unwrap_or_default()
}

fn list_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        Value::String(s) => s.split(',').filter_map(non_blank).collect(),
        _ => Vec::new(),
    }
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}
