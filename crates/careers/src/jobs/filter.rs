use serde::{Deserialize, Serialize};

use super::domain::JobPosting;

/// Optional filter criteria. Blank values impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employment_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl JobCriteria {
    pub fn is_empty(&self) -> bool {
        [
            &self.location,
            &self.job_type,
            &self.department,
            &self.work_policy,
            &self.employment_type,
            &self.experience_level,
            &self.search,
        ]
        .into_iter()
        .all(|value| supplied(value).is_none())
    }

    pub fn matches(&self, job: &JobPosting) -> bool {
        exact(&self.location, Some(&job.location))
            && exact(&self.job_type, Some(&job.job_type))
            && exact(&self.department, Some(&job.department))
            && exact(&self.work_policy, job.work_policy.as_ref())
            && exact(&self.employment_type, job.employment_type.as_ref())
            && exact(&self.experience_level, job.experience_level.as_ref())
            && title_contains(&self.search, &job.title)
    }
}

fn supplied(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.trim().is_empty())
}

fn exact(criterion: &Option<String>, value: Option<&String>) -> bool {
    match supplied(criterion) {
        Some(expected) => value.is_some_and(|actual| actual == expected),
        None => true,
    }
}

fn title_contains(search: &Option<String>, title: &str) -> bool {
    match supplied(search) {
        Some(needle) => title.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

/// Returns the jobs satisfying every supplied criterion, in their original order.
pub fn filter_jobs<'a>(jobs: &'a [JobPosting], criteria: &JobCriteria) -> Vec<&'a JobPosting> {
    jobs.iter().filter(|job| criteria.matches(job)).collect()
}

/// Distinct values offered as filter options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobFacets {
    pub locations: Vec<String>,
    pub departments: Vec<String>,
    pub job_types: Vec<String>,
}

impl JobFacets {
    /// Collects distinct non-empty values in first-seen order.
    pub fn collect<'a, I>(jobs: I) -> Self
    where
        I: IntoIterator<Item = &'a JobPosting>,
    {
        let mut facets = Self::default();
        for job in jobs {
            push_distinct(&mut facets.locations, &job.location);
            push_distinct(&mut facets.departments, &job.department);
            push_distinct(&mut facets.job_types, &job.job_type);
        }
        facets
    }
}

fn push_distinct(values: &mut Vec<String>, candidate: &str) {
    if !candidate.trim().is_empty() && !values.iter().any(|existing| existing == candidate) {
        values.push(candidate.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::domain::JobId;
    use crate::pages::domain::CompanyId;
    use chrono::Utc;

    fn job(title: &str, location: &str, job_type: &str, department: &str) -> JobPosting {
        JobPosting {
            id: JobId(format!("job-{title}")),
            company_id: CompanyId("c-1".to_string()),
            title: title.to_string(),
            location: location.to_string(),
            job_type: job_type.to_string(),
            department: department.to_string(),
            work_policy: Some("Remote".to_string()),
            employment_type: Some("Full time".to_string()),
            experience_level: Some("Senior".to_string()),
            salary_range: None,
            job_slug: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn sample_jobs() -> Vec<JobPosting> {
        let mut hybrid = job("Product Designer", "Berlin, Germany", "full-time", "Design");
        hybrid.work_policy = Some("Hybrid".to_string());
        hybrid.experience_level = None;
        vec![
            job("Senior Engineer", "Berlin, Germany", "full-time", "Engineering"),
            job("Data Analyst", "Berlin", "part-time", "Data"),
            hybrid,
            job("Engineering Manager", "Riyadh, Saudi Arabia", "contract", "Engineering"),
        ]
    }

    fn titles(jobs: &[&JobPosting]) -> Vec<String> {
        jobs.iter().map(|job| job.title.clone()).collect()
    }

    #[test]
    fn empty_criteria_is_the_identity() {
        let jobs = sample_jobs();
        let criteria = JobCriteria {
            location: Some("  ".to_string()),
            ..JobCriteria::default()
        };
        assert!(criteria.is_empty());
        assert_eq!(filter_jobs(&jobs, &criteria).len(), jobs.len());
        assert_eq!(filter_jobs(&jobs, &JobCriteria::default()).len(), jobs.len());
    }

    #[test]
    fn location_matches_exactly() {
        let jobs = sample_jobs();
        let criteria = JobCriteria {
            location: Some("Berlin".to_string()),
            ..JobCriteria::default()
        };
        let result = filter_jobs(&jobs, &criteria);
        assert_eq!(titles(&result), vec!["Data Analyst"]);
        assert!(result.iter().all(|job| job.location == "Berlin"));
    }

    #[test]
    fn search_is_case_insensitive_substring_on_title() {
        let jobs = sample_jobs();
        let criteria = JobCriteria {
            search: Some("engine".to_string()),
            ..JobCriteria::default()
        };
        assert_eq!(
            titles(&filter_jobs(&jobs, &criteria)),
            vec!["Senior Engineer", "Engineering Manager"]
        );

        let department_only = JobCriteria {
            search: Some("design".to_string()),
            ..JobCriteria::default()
        };
        assert_eq!(
            titles(&filter_jobs(&jobs, &department_only)),
            vec!["Product Designer"],
            "department text is not searched"
        );
    }

    #[test]
    fn supplied_criteria_are_conjunctive() {
        let jobs = sample_jobs();
        let criteria = JobCriteria {
            department: Some("Engineering".to_string()),
            job_type: Some("contract".to_string()),
            ..JobCriteria::default()
        };
        assert_eq!(titles(&filter_jobs(&jobs, &criteria)), vec!["Engineering Manager"]);
    }

    #[test]
    fn optional_attributes_never_match_when_missing() {
        let jobs = sample_jobs();
        let criteria = JobCriteria {
            experience_level: Some("Senior".to_string()),
            ..JobCriteria::default()
        };
        assert!(!titles(&filter_jobs(&jobs, &criteria)).contains(&"Product Designer".to_string()));

        let policy = JobCriteria {
            work_policy: Some("Hybrid".to_string()),
            ..JobCriteria::default()
        };
        assert_eq!(titles(&filter_jobs(&jobs, &policy)), vec!["Product Designer"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let jobs = sample_jobs();
        let criteria_set = [
            JobCriteria::default(),
            JobCriteria {
                location: Some("Berlin, Germany".to_string()),
                ..JobCriteria::default()
            },
            JobCriteria {
                search: Some("ENG".to_string()),
                department: Some("Engineering".to_string()),
                ..JobCriteria::default()
            },
        ];

        for criteria in criteria_set {
            let once: Vec<JobPosting> = filter_jobs(&jobs, &criteria).into_iter().cloned().collect();
            let twice = filter_jobs(&once, &criteria);
            assert_eq!(titles(&twice), titles(&once.iter().collect::<Vec<_>>()));
        }
    }

    #[test]
    fn facets_are_distinct_in_first_seen_order() {
        let jobs = sample_jobs();
        let facets = JobFacets::collect(&jobs);
        assert_eq!(
            facets.locations,
            vec!["Berlin, Germany", "Berlin", "Riyadh, Saudi Arabia"]
        );
        assert_eq!(facets.departments, vec!["Engineering", "Data", "Design"]);
        assert_eq!(facets.job_types, vec!["full-time", "part-time", "contract"]);
    }
}
