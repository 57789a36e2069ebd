use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use careers::router::{careers_router, CareersState};
use careers::service::CareersService;
use careers::session::{SessionResolver, StaticSessions};
use careers::storage::SqliteStore;
use serde_json::{json, Value};
use tower::ServiceExt;

const OWNER_TOKEN: &str = "owner-token";
const STRANGER_TOKEN: &str = "stranger-token";

fn app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().expect("store opens"));
    let service = Arc::new(CareersService::new(store.clone(), store));
    let sessions: Arc<dyn SessionResolver> = Arc::new(
        StaticSessions::new()
            .with_token(OWNER_TOKEN, "user-1")
            .with_token(STRANGER_TOKEN, "user-2"),
    );
    careers_router(Arc::new(CareersState::new(service, sessions, "/login")))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("route executes");
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    (status, String::from_utf8(body.to_vec()).expect("utf-8 body"))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn page_body() -> Value {
    json!({
        "theme": {
            "primaryColor": "#1d4ed8",
            "secondaryColor": "#0f172a",
            "accentColor": "#f59e0b"
        },
        "sections": [
            {
                "id": "header-1",
                "type": "header",
                "order": 0,
                "content": { "title": "Build robots with us" }
            },
            { "id": "jobs-1", "type": "jobs", "order": 1, "content": {} }
        ]
    })
}

#[tokio::test]
async fn publishing_makes_the_public_page_visible() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies",
            Some(OWNER_TOKEN),
            json!({ "name": "Acme Robotics", "slug": "Acme Robotics" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let company: Value = serde_json::from_str(&body).expect("company json");
    assert_eq!(company["slug"], "acme-robotics");
    assert_eq!(company["status"], "draft");
    let company_id = company["id"].as_str().expect("company id").to_string();

    let (status, _) = send(&app, get("/acme-robotics/careers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        json_request(
            "PUT",
            "/api/v1/companies/acme-robotics/draft",
            Some(OWNER_TOKEN),
            page_body(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/jobs",
            None,
            json!({
                "company_id": company_id,
                "title": "Robotics Engineer",
                "location": "Berlin, Germany",
                "job_type": "full-time",
                "department": "Engineering"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let job: Value = serde_json::from_str(&body).expect("job json");
    let job_id = job["id"].as_str().expect("job id").to_string();

    let (status, body) = send(&app, get("/acme-robotics/preview")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Preview Mode"));
    assert!(body.contains("Robotics Engineer"));

    let (status, _) = send(&app, get("/acme-robotics/careers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies/acme-robotics/publish",
            Some(OWNER_TOKEN),
            page_body(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let published: Value = serde_json::from_str(&body).expect("company json");
    assert_eq!(published["status"], "published");

    let (status, body) = send(&app, get("/acme-robotics/careers")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Build robots with us"));
    assert!(body.contains("Robotics Engineer"));
    assert!(!body.contains("Preview Mode"));

    let (status, _) = send(
        &app,
        json_request(
            "PATCH",
            &format!("/api/jobs/{job_id}/active"),
            Some(OWNER_TOKEN),
            json!({ "is_active": false }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, get("/acme-robotics/careers")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains("Robotics Engineer"));
}

#[tokio::test]
async fn owner_routes_reject_other_users() {
    let app = app();

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies",
            Some(OWNER_TOKEN),
            json!({ "name": "Acme", "slug": "acme" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies/acme/publish",
            Some(STRANGER_TOKEN),
            page_body(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        json_request("POST", "/api/v1/companies/acme/publish", None, page_body()),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get("/acme/careers")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_company_slug_conflicts() {
    let app = app();
    let registration = json!({ "name": "Acme", "slug": "acme" });

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies",
            Some(OWNER_TOKEN),
            registration.clone(),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        json_request("POST", "/api/v1/companies", Some(STRANGER_TOKEN), registration),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("error"));
}

#[tokio::test]
async fn duplicate_job_slug_within_company_conflicts() {
    let app = app();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/v1/companies",
            Some(OWNER_TOKEN),
            json!({ "name": "Acme", "slug": "acme" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let company: Value = serde_json::from_str(&body).expect("company json");
    let job = json!({
        "company_id": company["id"],
        "title": "Backend Engineer",
        "location": "Berlin",
        "job_type": "full-time",
        "department": "Engineering",
        "job_slug": "be-1"
    });

    let (status, _) = send(&app, json_request("POST", "/api/jobs", None, job.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, json_request("POST", "/api/jobs", None, job)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let payload: Value = serde_json::from_str(&body).expect("error json");
    assert!(payload["error"]
        .as_str()
        .expect("error message")
        .contains("already exists"));

    let (status, body) = send(&app, get("/api/jobs")).await;
    assert_eq!(status, StatusCode::OK);
    let jobs: Value = serde_json::from_str(&body).expect("jobs json");
    assert_eq!(jobs.as_array().expect("job list").len(), 1);
}
