use rusqlite::{params, Connection, OptionalExtension, Row};

use super::{timestamp_column, SqliteStore};
use crate::jobs::{JobId, JobPosting, NewJobPosting};
use crate::pages::CompanyId;
use crate::storage::{JobRepository, JobScope, RepositoryError};

const JOB_COLUMNS: &str = "id, company_id, title, location, job_type, department, work_policy, \
     employment_type, experience_level, salary_range, job_slug, is_active, created_at";

fn job_from_row(row: &Row<'_>) -> Result<JobPosting, rusqlite::Error> {
    let created_at: String = row.get(12)?;
    Ok(JobPosting {
        id: JobId(row.get(0)?),
        company_id: CompanyId(row.get(1)?),
        title: row.get(2)?,
        location: row.get(3)?,
        job_type: row.get(4)?,
        department: row.get(5)?,
        work_policy: row.get(6)?,
        employment_type: row.get(7)?,
        experience_level: row.get(8)?,
        salary_range: row.get(9)?,
        job_slug: row.get(10)?,
        is_active: row.get(11)?,
        created_at: timestamp_column(12, &created_at)?,
    })
}

fn find_one(conn: &Connection, id: &JobId) -> Result<Option<JobPosting>, rusqlite::Error> {
    conn.query_row(
        &format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = ?1"),
        params![id.0],
        job_from_row,
    )
    .optional()
}

impl JobRepository for SqliteStore {
    fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting, RepositoryError> {
        let posting = job.into_posting();
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO jobs ({JOB_COLUMNS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
                ),
                params![
                    posting.id.0,
                    posting.company_id.0,
                    posting.title,
                    posting.location,
                    posting.job_type,
                    posting.department,
                    posting.work_policy,
                    posting.employment_type,
                    posting.experience_level,
                    posting.salary_range,
                    posting.job_slug,
                    posting.is_active,
                    posting.created_at.to_rfc3339(),
                ],
            )
        })?;
        Ok(posting)
    }

    fn list_jobs(&self, scope: &JobScope) -> Result<Vec<JobPosting>, RepositoryError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {JOB_COLUMNS} FROM jobs
                 WHERE (?1 IS NULL OR company_id = ?1) AND (?2 = 0 OR is_active = 1)
                 ORDER BY rowid"
            ))?;
            let rows = stmt.query_map(
                params![
                    scope.company_id.as_ref().map(|id| id.0.as_str()),
                    scope.active_only
                ],
                job_from_row,
            )?;
            rows.collect()
        })
    }

    fn find_job(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError> {
        self.with_conn(|conn| find_one(conn, id))
    }

    fn set_active(&self, id: &JobId, active: bool) -> Result<JobPosting, RepositoryError> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE jobs SET is_active = ?2 WHERE id = ?1",
                params![id.0, active],
            )?;
            find_one(conn, id)
        })?
        .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::{Company, PageStatus};
    use crate::storage::CompanyRepository;

    fn seeded() -> (SqliteStore, CompanyId, CompanyId) {
        let store = SqliteStore::open_in_memory().expect("store opens");
        let acme = store
            .insert_company(Company::new("acme", "Acme", PageStatus::Published))
            .expect("insert acme");
        let globex = store
            .insert_company(Company::new("globex", "Globex", PageStatus::Published))
            .expect("insert globex");
        (store, acme.id, globex.id)
    }

    fn new_job(company_id: &CompanyId, title: &str, slug: Option<&str>) -> NewJobPosting {
        NewJobPosting {
            company_id: company_id.clone(),
            title: title.to_string(),
            location: "Berlin, Germany".to_string(),
            job_type: "full-time".to_string(),
            department: "Engineering".to_string(),
            work_policy: Some("Remote".to_string()),
            employment_type: None,
            experience_level: None,
            salary_range: None,
            job_slug: slug.map(str::to_string),
            is_active: true,
            created_at: None,
        }
    }

    #[test]
    fn list_scopes_by_company_and_activity() {
        let (store, acme, globex) = seeded();
        let first = store
            .insert_job(new_job(&acme, "Backend Engineer", Some("be")))
            .expect("insert");
        store
            .insert_job(new_job(&acme, "Frontend Engineer", Some("fe")))
            .expect("insert");
        store
            .insert_job(new_job(&globex, "Designer", None))
            .expect("insert");
        store.set_active(&first.id, false).expect("deactivate");

        assert_eq!(store.list_jobs(&JobScope::all()).expect("list").len(), 3);
        assert_eq!(store.list_jobs(&JobScope::active()).expect("list").len(), 2);

        let acme_active = store.list_jobs(&JobScope::active_for(&acme)).expect("list");
        assert_eq!(acme_active.len(), 1);
        assert_eq!(acme_active[0].title, "Frontend Engineer");

        let acme_all = store
            .list_jobs(&JobScope::for_company(Some(acme.clone())))
            .expect("list");
        let titles: Vec<&str> = acme_all.iter().map(|job| job.title.as_str()).collect();
        assert_eq!(titles, vec!["Backend Engineer", "Frontend Engineer"]);
    }

    #[test]
    fn duplicate_slug_within_company_conflicts() {
        let (store, acme, globex) = seeded();
        store
            .insert_job(new_job(&acme, "Engineer", Some("swe-1")))
            .expect("insert");
        store
            .insert_job(new_job(&globex, "Engineer", Some("swe-1")))
            .expect("other company may reuse the slug");
        let error = store
            .insert_job(new_job(&acme, "Engineer", Some("swe-1")))
            .expect_err("duplicate rejected");
        assert!(matches!(error, RepositoryError::Conflict));
    }

    #[test]
    fn jobs_without_slugs_never_conflict() {
        let (store, acme, _) = seeded();
        for _ in 0..2 {
            store
                .insert_job(new_job(&acme, "Engineer", None))
                .expect("insert");
        }
        assert_eq!(store.list_jobs(&JobScope::all()).expect("list").len(), 2);
    }

    #[test]
    fn set_active_on_unknown_job_is_not_found() {
        let (store, _, _) = seeded();
        let error = store
            .set_active(&JobId("missing".to_string()), true)
            .expect_err("unknown job");
        assert!(matches!(error, RepositoryError::NotFound));
    }

    #[test]
    fn insert_round_trips_optional_attributes() {
        let (store, acme, _) = seeded();
        let inserted = store
            .insert_job(new_job(&acme, "Engineer", Some("eng")))
            .expect("insert");
        let found = store
            .find_job(&inserted.id)
            .expect("query")
            .expect("job exists");
        assert_eq!(found.work_policy.as_deref(), Some("Remote"));
        assert_eq!(found.job_slug.as_deref(), Some("eng"));
        assert!(found.employment_type.is_none());
    }
}
