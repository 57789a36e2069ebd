mod parser;
mod tenant;

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use crate::jobs::{JobPosting, NewJobPosting};
use crate::pages::CompanyId;
use crate::storage::{CompanyRepository, JobRepository, RepositoryError, SqliteStore};

use parser::JobRow;
use tenant::TenantSeed;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Repository(RepositoryError),
    /// Atomic run rolled back because at least one row failed.
    Aborted(ImportReport),
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read jobs CSV: {}", err),
            ImportError::Csv(err) => write!(f, "invalid jobs CSV data: {}", err),
            ImportError::Repository(err) => write!(f, "could not store imported data: {}", err),
            ImportError::Aborted(report) => write!(
                f,
                "import rolled back: {} of {} rows failed",
                report.failures.len(),
                report.rows
            ),
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Repository(err) => Some(err),
            ImportError::Aborted(_) => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<RepositoryError> for ImportError {
    fn from(err: RepositoryError) -> Self {
        Self::Repository(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedJob {
    pub line: u64,
    pub original_slug: String,
    pub stored_slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowFailure {
    pub line: u64,
    pub title: Option<String>,
    pub reason: String,
}

/// Outcome of one import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub rows: usize,
    pub tenants_created: Vec<String>,
    pub tenants_reused: Vec<String>,
    pub jobs_inserted: usize,
    pub jobs_renamed: Vec<RenamedJob>,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, line: u64, title: Option<&str>, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::warn!(line, title = title.unwrap_or_default(), reason = %reason, "import row failed");
        self.failures.push(RowFailure {
            line,
            title: title.filter(|t| !t.is_empty()).map(str::to_string),
            reason,
        });
    }

    fn log_summary(&self) {
        tracing::info!(
            rows = self.rows,
            tenants_created = self.tenants_created.len(),
            tenants_reused = self.tenants_reused.len(),
            jobs_inserted = self.jobs_inserted,
            jobs_renamed = self.jobs_renamed.len(),
            failures = self.failures.len(),
            "job import finished"
        );
    }
}

/// Seeds tenants and job postings from a jobs CSV export.
pub struct JobImporter<C, J> {
    companies: Arc<C>,
    jobs: Arc<J>,
}

impl<C, J> JobImporter<C, J>
where
    C: CompanyRepository,
    J: JobRepository,
{
    pub fn new(companies: Arc<C>, jobs: Arc<J>) -> Self {
        Self { companies, jobs }
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<ImportReport, ImportError> {
        let file = std::fs::File::open(path)?;
        self.from_reader(file)
    }

    /// Best-effort run: row failures are recorded and the loop continues.
    /// Only unreadable input aborts.
    pub fn from_reader<R: Read>(&self, reader: R) -> Result<ImportReport, ImportError> {
        let rows = parser::parse_rows(reader)?;
        let mut report = ImportReport {
            rows: rows.len(),
            ..ImportReport::default()
        };

        let mut tenants: HashMap<String, Option<CompanyId>> = HashMap::new();
        for parsed in rows {
            let row = match parsed.row {
                Ok(row) => row,
                Err(reason) => {
                    report.fail(parsed.line, None, reason);
                    continue;
                }
            };

            let Some(seed) = TenantSeed::from_location(&row.location) else {
                report.fail(parsed.line, Some(&row.title), "location is empty");
                continue;
            };

            let company_id = match tenants.get(&seed.slug) {
                Some(resolved) => resolved.clone(),
                None => {
                    let slug = seed.slug.clone();
                    let resolved = self.resolve_tenant(seed, &mut report);
                    tenants.insert(slug, resolved.clone());
                    resolved
                }
            };
            let Some(company_id) = company_id else {
                report.fail(
                    parsed.line,
                    Some(&row.title),
                    format!("no tenant for location '{}'", row.location),
                );
                continue;
            };

            self.insert_row(parsed.line, row, company_id, &mut report);
        }

        report.log_summary();
        Ok(report)
    }

    /// Finds or creates the tenant. Failures are logged and leave the
    /// location without a tenant; its rows are then reported individually.
    fn resolve_tenant(&self, seed: TenantSeed, report: &mut ImportReport) -> Option<CompanyId> {
        match self.companies.find_by_slug(&seed.slug) {
            Ok(Some(existing)) => {
                tracing::debug!(slug = %seed.slug, "reusing tenant");
                report.tenants_reused.push(existing.slug);
                return Some(existing.id);
            }
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(slug = %seed.slug, error = %error, "tenant lookup failed");
                return None;
            }
        }

        let slug = seed.slug.clone();
        match self.companies.insert_company(seed.into_company()) {
            Ok(company) => {
                tracing::info!(slug = %company.slug, name = %company.name, "tenant created");
                report.tenants_created.push(company.slug);
                Some(company.id)
            }
            Err(error) => {
                tracing::warn!(slug = %slug, error = %error, "tenant could not be created");
                None
            }
        }
    }

    fn insert_row(
        &self,
        line: u64,
        row: JobRow,
        company_id: CompanyId,
        report: &mut ImportReport,
    ) {
        let days = match row.posted_days_ago() {
            Ok(days) => days,
            Err(reason) => {
                report.fail(line, Some(&row.title), reason);
                return;
            }
        };
        let Some(created_at) =
            Duration::try_days(days).and_then(|age| Utc::now().checked_sub_signed(age))
        else {
            report.fail(
                line,
                Some(&row.title),
                format!("posted_days_ago out of range: {days}"),
            );
            return;
        };

        let job = NewJobPosting {
            company_id,
            title: row.title,
            location: row.location,
            job_type: row.job_type,
            department: row.department,
            work_policy: row.work_policy,
            employment_type: row.employment_type,
            experience_level: row.experience_level,
            salary_range: row.salary_range,
            job_slug: row.job_slug,
            is_active: true,
            created_at: Some(created_at),
        };
        if let Err(reason) = job.validate() {
            report.fail(line, Some(&job.title), reason);
            return;
        }

        match self.insert_with_retry(job.clone()) {
            Ok(posting) => {
                if let (Some(original), Some(stored)) = (&job.job_slug, &posting.job_slug) {
                    if original != stored {
                        report.jobs_renamed.push(RenamedJob {
                            line,
                            original_slug: original.clone(),
                            stored_slug: stored.clone(),
                        });
                    }
                }
                report.jobs_inserted += 1;
            }
            Err(error) => report.fail(line, Some(&job.title), error.to_string()),
        }
    }

    /// A duplicate slug is retried once with a millisecond timestamp suffix.
    fn insert_with_retry(&self, job: NewJobPosting) -> Result<JobPosting, RepositoryError> {
        match self.jobs.insert_job(job.clone()) {
            Err(RepositoryError::Conflict) => {
                let Some(slug) = job.job_slug.as_deref() else {
                    return Err(RepositoryError::Conflict);
                };
                let renamed = format!("{slug}-{}", Utc::now().timestamp_millis());
                tracing::debug!(original = slug, renamed = %renamed, "job slug taken, retrying");
                self.jobs.insert_job(NewJobPosting {
                    job_slug: Some(renamed),
                    ..job
                })
            }
            other => other,
        }
    }
}

/// All-or-nothing import: any row failure rolls the whole batch back.
pub fn import_atomic<R: Read>(store: &SqliteStore, reader: R) -> Result<ImportReport, ImportError> {
    store.run_in_transaction(|store| {
        let shared = Arc::new(store.clone());
        let report = JobImporter::new(shared.clone(), shared).from_reader(reader)?;
        if report.is_clean() {
            Ok(report)
        } else {
            Err(ImportError::Aborted(report))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JobScope;
    use std::io::Cursor;

    const HEADER: &str = "title,work_policy,location,department,employment_type,experience_level,job_type,salary_range,job_slug,posted_days_ago\n";

    fn importer() -> (JobImporter<SqliteStore, SqliteStore>, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().expect("store opens"));
        (JobImporter::new(store.clone(), store.clone()), store)
    }

    fn csv(lines: &[&str]) -> Cursor<String> {
        Cursor::new(format!("{HEADER}{}\n", lines.join("\n")))
    }

    #[test]
    fn one_tenant_per_city() {
        let (importer, store) = importer();
        let report = importer
            .from_reader(csv(&[
                "Engineer,Remote,\"Berlin, Germany\",Engineering,Full time,Senior,full-time,,eng-1,2",
                "Analyst,Hybrid,Berlin,Data,Full time,Mid,full-time,,data-1,0",
                "Designer,Onsite,\"New York, USA\",Design,Full time,Junior,contract,,des-1,",
            ]))
            .expect("import succeeds");

        assert_eq!(report.tenants_created, vec!["berlin", "new-york"]);
        assert_eq!(report.jobs_inserted, 3);
        assert!(report.is_clean());

        let berlin = store
            .find_by_slug("berlin")
            .expect("query")
            .expect("berlin tenant");
        assert_eq!(berlin.name, "Berlin Office");
        assert_eq!(
            store
                .list_jobs(&JobScope::active_for(&berlin.id))
                .expect("jobs")
                .len(),
            2
        );
    }

    #[test]
    fn posted_days_ago_backdates_created_at() {
        let (importer, store) = importer();
        importer
            .from_reader(csv(&["Engineer,Remote,Berlin,Engineering,,,full-time,,eng-1,10"]))
            .expect("import succeeds");

        let job = store.list_jobs(&JobScope::all()).expect("jobs").remove(0);
        let age = Utc::now() - job.created_at;
        assert!(age.num_days() >= 9 && age.num_days() <= 10);
    }

    #[test]
    fn invalid_rows_are_reported_and_skipped() {
        let (importer, _) = importer();
        let report = importer
            .from_reader(csv(&[
                ",Remote,Berlin,Engineering,,,full-time,,,1",
                "Engineer,Remote,,Engineering,,,full-time,,,1",
                "Engineer,Remote,Berlin,Engineering,,,full-time,,,soon",
                "Engineer,Remote,Berlin,Engineering,,,full-time,,,1",
            ]))
            .expect("import succeeds");

        assert_eq!(report.rows, 4);
        assert_eq!(report.jobs_inserted, 1);
        let lines: Vec<u64> = report.failures.iter().map(|failure| failure.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn out_of_range_posting_age_fails_only_that_row() {
        let (importer, _) = importer();
        let report = importer
            .from_reader(csv(&[
                "Engineer,Remote,Berlin,Engineering,,,full-time,,,100000000",
                "Engineer,Remote,Berlin,Engineering,,,full-time,,,999999999999",
                "Designer,Remote,Berlin,Design,,,full-time,,,2",
            ]))
            .expect("import succeeds");

        assert_eq!(report.jobs_inserted, 1);
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|failure| failure.reason.contains("out of range")));
    }

    #[test]
    fn atomic_import_rolls_back_on_any_failure() {
        let store = SqliteStore::open_in_memory().expect("store opens");
        let error = import_atomic(
            &store,
            csv(&[
                "Engineer,Remote,Berlin,Engineering,,,full-time,,eng-1,1",
                ",Remote,Berlin,Engineering,,,full-time,,,1",
            ]),
        )
        .expect_err("row failure aborts");
        match error {
            ImportError::Aborted(report) => assert_eq!(report.failures.len(), 1),
            other => panic!("expected aborted import, got {other:?}"),
        }

        assert!(store.find_by_slug("berlin").expect("query").is_none());
        assert!(store.list_jobs(&JobScope::all()).expect("jobs").is_empty());

        let report = import_atomic(
            &store,
            csv(&["Engineer,Remote,Berlin,Engineering,,,full-time,,eng-1,1"]),
        )
        .expect("clean import commits");
        assert_eq!(report.jobs_inserted, 1);
        assert_eq!(store.list_jobs(&JobScope::all()).expect("jobs").len(), 1);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let (importer, _) = importer();
        let error = importer
            .from_path("./does-not-exist.csv")
            .expect_err("expected io error");
        assert!(matches!(error, ImportError::Io(_)));
    }
}
