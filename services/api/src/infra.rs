use careers::config::AppConfig;
use careers::error::AppError;
use careers::router::CareersState;
use careers::service::CareersService;
use careers::session::{SessionResolver, StaticSessions};
use careers::storage::SqliteStore;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type SqliteCareersState = CareersState<SqliteStore, SqliteStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured store and wires the careers service to it.
pub(crate) fn careers_state(config: &AppConfig) -> Result<Arc<SqliteCareersState>, AppError> {
    let store = Arc::new(SqliteStore::open(&config.storage.database_path)?);
    let service = Arc::new(CareersService::new(store.clone(), store));
    Ok(Arc::new(CareersState::new(
        service,
        session_resolver(&config.auth.session_tokens),
        config.auth.login_path.clone(),
    )))
}

pub(crate) fn session_resolver(raw_tokens: &str) -> Arc<dyn SessionResolver> {
    let sessions = StaticSessions::parse(raw_tokens);
    if sessions.is_empty() {
        tracing::warn!("no session tokens configured; owner routes will redirect to login");
    } else {
        tracing::info!(tokens = sessions.len(), "development session tokens loaded");
    }
    Arc::new(sessions)
}
