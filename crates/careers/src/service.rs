use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::jobs::{JobFacets, JobId, JobPosting, NewJobPosting};
use crate::pages::{
    compose, normalize_slug, Company, CompanyId, EditorCommand, OwnerId, PageBlock, PageContent,
    PageEditor, PageStatus,
};
use crate::storage::{CompanyRepository, JobRepository, JobScope, RepositoryError};

/// Slug of the company record whose page configures the aggregate listing.
pub const AGGREGATE_SLUG: &str = "jobs";
pub const AGGREGATE_NAME: &str = "All Jobs";

/// Persisted company state plus the active jobs shown on its page.
#[derive(Debug, Clone)]
pub struct PageView {
    pub company: Company,
    pub blocks: Vec<PageBlock>,
    pub jobs: Vec<JobPosting>,
    pub location_links: Vec<(String, String)>,
}

impl PageView {
    fn new(company: Company, jobs: Vec<JobPosting>) -> Self {
        Self {
            blocks: compose(&company),
            company,
            jobs,
            location_links: Vec::new(),
        }
    }

    pub fn facets(&self) -> JobFacets {
        JobFacets::collect(&self.jobs)
    }
}

/// Registration payload for a new draft company.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanyRegistration {
    pub name: String,
    pub slug: String,
}

/// Editor working copy after applying a batch of commands.
#[derive(Debug, Clone, Serialize)]
pub struct DraftPreview {
    pub company: Company,
    pub blocks: Vec<PageBlock>,
}

/// Failure categories surfaced to callers.
#[derive(Debug, thiserror::Error)]
pub enum CareersError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("authentication required")]
    Unauthenticated,
    #[error("not permitted to modify {0}")]
    Forbidden(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0} already exists")]
    Conflict(String),
    #[error("{0}")]
    Storage(String),
}

impl From<RepositoryError> for CareersError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => Self::NotFound("record".to_string()),
            RepositoryError::Conflict => Self::Conflict("record".to_string()),
            RepositoryError::Unavailable(message) => {
                tracing::error!(error = %message, "storage failure");
                Self::Storage(message)
            }
        }
    }
}

/// Page, editor and job operations over the repositories.
pub struct CareersService<C, J> {
    companies: Arc<C>,
    jobs: Arc<J>,
}

impl<C, J> CareersService<C, J>
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    pub fn new(companies: Arc<C>, jobs: Arc<J>) -> Self {
        Self { companies, jobs }
    }

    fn company(&self, slug: &str) -> Result<Company, CareersError> {
        self.companies
            .find_by_slug(slug)?
            .ok_or_else(|| CareersError::NotFound(format!("company '{slug}'")))
    }

    fn owned_company(&self, slug: &str, owner: &OwnerId) -> Result<Company, CareersError> {
        let company = self.company(slug)?;
        if !company.is_owned_by(owner) {
            tracing::warn!(slug, owner = %owner.0, "rejected non-owner access");
            return Err(CareersError::Forbidden(format!("company '{slug}'")));
        }
        Ok(company)
    }

    fn active_jobs(&self, company: &Company) -> Result<Vec<JobPosting>, CareersError> {
        Ok(self.jobs.list_jobs(&JobScope::active_for(&company.id))?)
    }

    /// Published companies only; drafts are indistinguishable from missing slugs.
    pub fn public_page(&self, slug: &str) -> Result<PageView, CareersError> {
        let company = self.company(slug)?;
        if !company.is_published() {
            return Err(CareersError::NotFound(format!("company '{slug}'")));
        }
        let jobs = self.active_jobs(&company)?;
        Ok(PageView::new(company, jobs))
    }

    pub fn preview_page(&self, slug: &str) -> Result<PageView, CareersError> {
        let company = self.company(slug)?;
        let jobs = self.active_jobs(&company)?;
        Ok(PageView::new(company, jobs))
    }

    /// All active jobs across tenants, styled by the `jobs` company when one
    /// exists. Each location links to the published tenant page owning it.
    pub fn aggregate_page(&self) -> Result<PageView, CareersError> {
        let company = match self.companies.find_by_slug(AGGREGATE_SLUG)? {
            Some(company) => company,
            None => Company::new(AGGREGATE_SLUG, AGGREGATE_NAME, PageStatus::Published),
        };
        let jobs = self.jobs.list_jobs(&JobScope::active())?;

        let mut slugs: HashMap<CompanyId, Option<String>> = HashMap::new();
        let mut location_links = Vec::new();
        for location in JobFacets::collect(&jobs).locations {
            let Some(job) = jobs.iter().find(|job| job.location == location) else {
                continue;
            };
            if !slugs.contains_key(&job.company_id) {
                let slug = self
                    .companies
                    .find_by_id(&job.company_id)?
                    .filter(Company::is_published)
                    .map(|owner| owner.slug);
                slugs.insert(job.company_id.clone(), slug);
            }
            if let Some(Some(slug)) = slugs.get(&job.company_id) {
                location_links.push((location, format!("/{slug}/careers")));
            }
        }

        let mut view = PageView::new(company, jobs);
        view.location_links = location_links;
        Ok(view)
    }

    /// The company a signed-in owner lands on after login.
    pub fn owned_by(&self, owner: &OwnerId) -> Result<Company, CareersError> {
        self.companies
            .find_by_owner(owner)?
            .into_iter()
            .next()
            .ok_or_else(|| CareersError::NotFound(format!("company for user '{}'", owner.0)))
    }

    pub fn editor(&self, slug: &str, owner: &OwnerId) -> Result<PageView, CareersError> {
        let company = self.owned_company(slug, owner)?;
        let jobs = self.active_jobs(&company)?;
        Ok(PageView::new(company, jobs))
    }

    pub fn save_draft(
        &self,
        slug: &str,
        owner: &OwnerId,
        page: PageContent,
    ) -> Result<Company, CareersError> {
        let company = self.owned_company(slug, owner)?;
        page.theme.validate().map_err(CareersError::Invalid)?;
        let saved = self.companies.save_page(&company.id, &page)?;
        tracing::info!(slug, sections = saved.page.sections.len(), "draft saved");
        Ok(saved)
    }

    pub fn publish(
        &self,
        slug: &str,
        owner: &OwnerId,
        page: PageContent,
    ) -> Result<Company, CareersError> {
        let company = self.owned_company(slug, owner)?;
        page.theme.validate().map_err(CareersError::Invalid)?;
        let published = self.companies.publish_page(&company.id, &page)?;
        tracing::info!(slug, "careers page published");
        Ok(published)
    }

    /// Applies editor commands to `draft` (or the stored page) without
    /// persisting anything.
    pub fn preview_draft(
        &self,
        slug: &str,
        owner: &OwnerId,
        draft: Option<PageContent>,
        commands: Vec<EditorCommand>,
    ) -> Result<DraftPreview, CareersError> {
        let mut company = self.owned_company(slug, owner)?;
        if let Some(page) = draft {
            company.page = page;
        }

        let mut editor = PageEditor::new(company);
        editor
            .apply_all(commands)
            .map_err(|error| CareersError::Invalid(error.to_string()))?;

        let company = editor.into_company();
        Ok(DraftPreview {
            blocks: compose(&company),
            company,
        })
    }

    pub fn register_company(
        &self,
        owner: &OwnerId,
        registration: CompanyRegistration,
    ) -> Result<Company, CareersError> {
        let name = registration.name.trim();
        let slug = normalize_slug(&registration.slug);
        if name.is_empty() {
            return Err(CareersError::Invalid("name must not be empty".to_string()));
        }
        if slug.is_empty() {
            return Err(CareersError::Invalid("slug must not be empty".to_string()));
        }

        let company = Company::new(slug.clone(), name, PageStatus::Draft).with_owner(owner.clone());
        match self.companies.insert_company(company) {
            Ok(company) => {
                tracing::info!(slug = %company.slug, owner = %owner.0, "company registered");
                Ok(company)
            }
            Err(RepositoryError::Conflict) => Err(CareersError::Conflict(format!("slug '{slug}'"))),
            Err(other) => Err(other.into()),
        }
    }

    pub fn list_jobs(&self, company_id: Option<CompanyId>) -> Result<Vec<JobPosting>, CareersError> {
        Ok(self.jobs.list_jobs(&JobScope::for_company(company_id))?)
    }

    pub fn create_job(&self, job: NewJobPosting) -> Result<JobPosting, CareersError> {
        job.validate().map_err(CareersError::Invalid)?;
        if self.companies.find_by_id(&job.company_id)?.is_none() {
            return Err(CareersError::Invalid(format!(
                "unknown company_id '{}'",
                job.company_id
            )));
        }

        match self.jobs.insert_job(job) {
            Ok(posting) => {
                tracing::info!(job_id = %posting.id, company_id = %posting.company_id, "job created");
                Ok(posting)
            }
            Err(RepositoryError::Conflict) => {
                Err(CareersError::Conflict("job slug for this company".to_string()))
            }
            Err(other) => Err(other.into()),
        }
    }

    pub fn set_job_active(
        &self,
        id: &JobId,
        owner: &OwnerId,
        active: bool,
    ) -> Result<JobPosting, CareersError> {
        let job = self
            .jobs
            .find_job(id)?
            .ok_or_else(|| CareersError::NotFound(format!("job '{id}'")))?;
        let company = self
            .companies
            .find_by_id(&job.company_id)?
            .ok_or_else(|| CareersError::NotFound(format!("company '{}'", job.company_id)))?;
        if !company.is_owned_by(owner) {
            return Err(CareersError::Forbidden(format!("job '{id}'")));
        }

        let updated = self.jobs.set_active(id, active)?;
        tracing::info!(job_id = %id, active, "job visibility changed");
        Ok(updated)
    }
}
