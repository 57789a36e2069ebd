//! Persistence seams for tenants and job postings.

pub mod sqlite;

use crate::jobs::{JobId, JobPosting, NewJobPosting};
use crate::pages::{Company, CompanyId, OwnerId, PageContent};

pub use sqlite::SqliteStore;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Which job rows a listing returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobScope {
    pub company_id: Option<CompanyId>,
    pub active_only: bool,
}

impl JobScope {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn active() -> Self {
        Self {
            company_id: None,
            active_only: true,
        }
    }

    pub fn active_for(company_id: &CompanyId) -> Self {
        Self {
            company_id: Some(company_id.clone()),
            active_only: true,
        }
    }

    pub fn for_company(company_id: Option<CompanyId>) -> Self {
        Self {
            company_id,
            active_only: false,
        }
    }
}

/// Storage abstraction for tenant records.
pub trait CompanyRepository: Send + Sync {
    fn insert_company(&self, company: Company) -> Result<Company, RepositoryError>;
    fn find_by_slug(&self, slug: &str) -> Result<Option<Company>, RepositoryError>;
    fn find_by_id(&self, id: &CompanyId) -> Result<Option<Company>, RepositoryError>;
    fn find_by_owner(&self, owner: &OwnerId) -> Result<Vec<Company>, RepositoryError>;
    /// Overwrites the draft fields without touching status.
    fn save_page(&self, id: &CompanyId, page: &PageContent) -> Result<Company, RepositoryError>;
    /// Overwrites the draft fields and marks the company published.
    fn publish_page(&self, id: &CompanyId, page: &PageContent)
        -> Result<Company, RepositoryError>;
}

/// Storage abstraction for job postings.
pub trait JobRepository: Send + Sync {
    fn insert_job(&self, job: NewJobPosting) -> Result<JobPosting, RepositoryError>;
    /// Rows in insertion order.
    fn list_jobs(&self, scope: &JobScope) -> Result<Vec<JobPosting>, RepositoryError>;
    fn find_job(&self, id: &JobId) -> Result<Option<JobPosting>, RepositoryError>;
    fn set_active(&self, id: &JobId, active: bool) -> Result<JobPosting, RepositoryError>;
}
