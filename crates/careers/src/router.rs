use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, patch, post, put},
    Json, Router,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::json;

use crate::jobs::{filter_jobs, JobCriteria, JobId, NewJobPosting};
use crate::pages::{
    render_editor, render_not_found, render_page, CompanyId, EditorCommand, JobListing, OwnerId,
    PageContent, RenderMode,
};
use crate::service::{CareersError, CareersService, CompanyRegistration, PageView};
use crate::session::{session_token, SessionResolver};
use crate::storage::{CompanyRepository, JobRepository};

/// Shared state for the careers routes.
pub struct CareersState<C, J> {
    pub service: Arc<CareersService<C, J>>,
    pub sessions: Arc<dyn SessionResolver>,
    pub login_path: String,
}

impl<C, J> CareersState<C, J> {
    pub fn new(
        service: Arc<CareersService<C, J>>,
        sessions: Arc<dyn SessionResolver>,
        login_path: impl Into<String>,
    ) -> Self {
        Self {
            service,
            sessions,
            login_path: login_path.into(),
        }
    }

    fn owner(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<OwnerId, CareersError> {
        session_token(headers, jar)
            .and_then(|token| self.sessions.resolve(&token))
            .ok_or(CareersError::Unauthenticated)
    }
}

type SharedState<C, J> = State<Arc<CareersState<C, J>>>;

/// Router builder exposing the public pages, the owner editor and the jobs API.
pub fn careers_router<C, J>(state: Arc<CareersState<C, J>>) -> Router
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    Router::new()
        .route("/jobs", get(aggregate_handler::<C, J>))
        .route("/:slug/careers", get(public_page_handler::<C, J>))
        .route("/:slug/preview", get(preview_page_handler::<C, J>))
        .route("/:slug/edit", get(editor_page_handler::<C, J>))
        .route("/api/v1/companies", post(register_handler::<C, J>))
        .route("/api/v1/companies/mine", get(my_company_handler::<C, J>))
        .route("/api/v1/companies/:slug/draft", put(save_draft_handler::<C, J>))
        .route(
            "/api/v1/companies/:slug/publish",
            post(publish_handler::<C, J>),
        )
        .route(
            "/api/v1/companies/:slug/editor",
            post(editor_commands_handler::<C, J>),
        )
        .route(
            "/api/jobs",
            get(list_jobs_handler::<C, J>).post(create_job_handler::<C, J>),
        )
        .route("/api/jobs/:job_id/active", patch(set_active_handler::<C, J>))
        .with_state(state)
}

fn listing<'a>(view: &'a PageView, criteria: JobCriteria) -> JobListing<'a> {
    let mut listing = JobListing::new(filter_jobs(&view.jobs, &criteria), view.facets(), criteria);
    listing.location_links = view.location_links.clone();
    listing
}

fn render_view(view: &PageView, criteria: JobCriteria, mode: RenderMode) -> Response {
    let listing = listing(view, criteria);
    Html(render_page(&view.company, &view.blocks, &listing, mode)).into_response()
}

/// HTML routes send auth failures to the login page.
fn page_error(login_path: &str, error: CareersError) -> Response {
    match error {
        CareersError::NotFound(_) => {
            (StatusCode::NOT_FOUND, Html(render_not_found())).into_response()
        }
        CareersError::Unauthenticated | CareersError::Forbidden(_) => {
            Redirect::to(login_path).into_response()
        }
        CareersError::Invalid(message) => {
            (StatusCode::UNPROCESSABLE_ENTITY, message).into_response()
        }
        CareersError::Conflict(what) => {
            (StatusCode::CONFLICT, format!("{what} already exists")).into_response()
        }
        CareersError::Storage(message) => {
            (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
        }
    }
}

fn api_error(error: CareersError) -> Response {
    let status = match &error {
        CareersError::NotFound(_) => StatusCode::NOT_FOUND,
        CareersError::Unauthenticated => StatusCode::UNAUTHORIZED,
        CareersError::Forbidden(_) => StatusCode::FORBIDDEN,
        CareersError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CareersError::Conflict(_) => StatusCode::CONFLICT,
        CareersError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, Json(payload)).into_response()
}

fn rejected(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
    });
    (rejection.status(), Json(payload)).into_response()
}

pub(crate) async fn public_page_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    Query(criteria): Query<JobCriteria>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    match state.service.public_page(&slug) {
        Ok(view) => render_view(&view, criteria, RenderMode::Public),
        Err(error) => page_error(&state.login_path, error),
    }
}

pub(crate) async fn preview_page_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    Query(criteria): Query<JobCriteria>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    match state.service.preview_page(&slug) {
        Ok(view) => render_view(&view, criteria, RenderMode::Preview),
        Err(error) => page_error(&state.login_path, error),
    }
}

pub(crate) async fn aggregate_handler<C, J>(
    State(state): SharedState<C, J>,
    Query(criteria): Query<JobCriteria>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    match state.service.aggregate_page() {
        Ok(view) => render_view(&view, criteria, RenderMode::Public),
        Err(error) => page_error(&state.login_path, error),
    }
}

pub(crate) async fn editor_page_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let result = state
        .owner(&headers, &jar)
        .and_then(|owner| state.service.editor(&slug, &owner));

    match result {
        Ok(view) => {
            let listing = listing(&view, JobCriteria::default());
            Html(render_editor(&view.company, &view.blocks, &listing)).into_response()
        }
        Err(error) => page_error(&state.login_path, error),
    }
}

pub(crate) async fn register_handler<C, J>(
    State(state): SharedState<C, J>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<CompanyRegistration>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let owner = match state.owner(&headers, &jar) {
        Ok(owner) => owner,
        Err(error) => return api_error(error),
    };
    let Json(registration) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    match state.service.register_company(&owner, registration) {
        Ok(company) => (StatusCode::CREATED, Json(company)).into_response(),
        Err(error) => api_error(error),
    }
}

pub(crate) async fn my_company_handler<C, J>(
    State(state): SharedState<C, J>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let result = state
        .owner(&headers, &jar)
        .and_then(|owner| state.service.owned_by(&owner));

    match result {
        Ok(company) => {
            let edit_url = format!("/{}/edit", company.slug);
            let payload = json!({
                "company": company,
                "edit_url": edit_url,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => api_error(error),
    }
}

pub(crate) async fn save_draft_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<PageContent>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let owner = match state.owner(&headers, &jar) {
        Ok(owner) => owner,
        Err(error) => return api_error(error),
    };
    let Json(page) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    match state.service.save_draft(&slug, &owner, page) {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(error) => api_error(error),
    }
}

pub(crate) async fn publish_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<PageContent>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let owner = match state.owner(&headers, &jar) {
        Ok(owner) => owner,
        Err(error) => return api_error(error),
    };
    let Json(page) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    match state.service.publish(&slug, &owner, page) {
        Ok(company) => (StatusCode::OK, Json(company)).into_response(),
        Err(error) => api_error(error),
    }
}

/// Body of an editor round-trip: an optional working copy and the commands
/// to apply to it.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditorRequest {
    #[serde(default)]
    pub draft: Option<PageContent>,
    #[serde(default)]
    pub commands: Vec<EditorCommand>,
}

pub(crate) async fn editor_commands_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<EditorRequest>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let owner = match state.owner(&headers, &jar) {
        Ok(owner) => owner,
        Err(error) => return api_error(error),
    };
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    let preview = match state
        .service
        .preview_draft(&slug, &owner, request.draft, request.commands)
    {
        Ok(preview) => preview,
        Err(error) => return api_error(error),
    };
    let jobs = match state.service.preview_page(&slug) {
        Ok(view) => view.jobs,
        Err(error) => return api_error(error),
    };

    let view = PageView {
        company: preview.company.clone(),
        blocks: preview.blocks.clone(),
        jobs,
        location_links: Vec::new(),
    };
    let html = render_page(
        &view.company,
        &view.blocks,
        &listing(&view, JobCriteria::default()),
        RenderMode::Preview,
    );

    let payload = json!({
        "company": preview.company,
        "blocks": preview.blocks,
        "html": html,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Default, Deserialize)]
pub struct JobsQuery {
    pub company_id: Option<String>,
}

pub(crate) async fn list_jobs_handler<C, J>(
    State(state): SharedState<C, J>,
    Query(query): Query<JobsQuery>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let company_id = query
        .company_id
        .filter(|id| !id.trim().is_empty())
        .map(CompanyId);

    match state.service.list_jobs(company_id) {
        Ok(jobs) => (StatusCode::OK, Json(jobs)).into_response(),
        Err(error) => api_error(error),
    }
}

pub(crate) async fn create_job_handler<C, J>(
    State(state): SharedState<C, J>,
    payload: Result<Json<NewJobPosting>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let Json(job) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    match state.service.create_job(job) {
        Ok(posting) => (StatusCode::CREATED, Json(posting)).into_response(),
        Err(error) => api_error(error),
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActiveToggle {
    pub is_active: bool,
}

pub(crate) async fn set_active_handler<C, J>(
    State(state): SharedState<C, J>,
    Path(job_id): Path<String>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<ActiveToggle>, JsonRejection>,
) -> Response
where
    C: CompanyRepository + 'static,
    J: JobRepository + 'static,
{
    let owner = match state.owner(&headers, &jar) {
        Ok(owner) => owner,
        Err(error) => return api_error(error),
    };
    let Json(toggle) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection),
    };

    match state
        .service
        .set_job_active(&JobId(job_id), &owner, toggle.is_active)
    {
        Ok(job) => (StatusCode::OK, Json(job)).into_response(),
        Err(error) => api_error(error),
    }
}
