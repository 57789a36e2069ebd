use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::pages::domain::CompanyId;

/// Identifier wrapper for job postings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub String);

impl JobId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A job posting as stored. Categorical attributes stay as the stored strings
/// so filters compare exactly what recruiters entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobPosting {
    pub id: JobId,
    pub company_id: CompanyId,
    pub title: String,
    pub location: String,
    pub job_type: String,
    pub department: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_policy: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_slug: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Insert payload accepted by the jobs endpoint and produced by the importer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewJobPosting {
    pub company_id: CompanyId,
    pub title: String,
    pub location: String,
    pub job_type: String,
    pub department: String,
    #[serde(default)]
    pub work_policy: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub experience_level: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub job_slug: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl NewJobPosting {
    pub fn validate(&self) -> Result<(), String> {
        for (field, value) in [
            ("title", &self.title),
            ("location", &self.location),
            ("job_type", &self.job_type),
            ("department", &self.department),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty"));
            }
        }
        Ok(())
    }

    pub fn into_posting(self) -> JobPosting {
        JobPosting {
            id: JobId::generate(),
            company_id: self.company_id,
            title: self.title,
            location: self.location,
            job_type: self.job_type,
            department: self.department,
            work_policy: non_empty(self.work_policy),
            employment_type: non_empty(self.employment_type),
            experience_level: non_empty(self.experience_level),
            salary_range: non_empty(self.salary_range),
            job_slug: non_empty(self.job_slug),
            is_active: self.is_active,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn insert_payload_defaults_to_active() {
        let payload: NewJobPosting = serde_json::from_value(json!({
            "company_id": "c-1",
            "title": "Platform Engineer",
            "location": "Berlin, Germany",
            "job_type": "full-time",
            "department": "Engineering",
            "job_slug": ""
        }))
        .expect("payload parses");

        assert!(payload.validate().is_ok());
        let posting = payload.into_posting();
        assert!(posting.is_active);
        assert!(posting.job_slug.is_none(), "blank slugs are not stored");
    }

    #[test]
    fn validation_names_the_missing_field() {
        let payload = NewJobPosting {
            company_id: CompanyId("c-1".to_string()),
            title: "  ".to_string(),
            location: "Remote".to_string(),
            job_type: "contract".to_string(),
            department: "Design".to_string(),
            work_policy: None,
            employment_type: None,
            experience_level: None,
            salary_range: None,
            job_slug: None,
            is_active: true,
            created_at: None,
        };
        assert_eq!(payload.validate(), Err("title must not be empty".to_string()));
    }
}
