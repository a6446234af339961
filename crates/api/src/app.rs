use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{AllowListAdmin, SpinGate, SubmissionStore};
use shared::jwt::SessionKeys;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin, claims, health, spins, wheel};
use crate::services::AdminAuthenticator;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SubmissionStore>,
    pub gate: Arc<SpinGate>,
    pub allow_list: Arc<AllowListAdmin>,
    pub admin_auth: Arc<AdminAuthenticator>,
    pub sessions: Arc<SessionKeys>,
    pub config: Arc<Config>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    /// Wires services from configuration around the given store.
    pub fn new(config: Config, store: Arc<dyn SubmissionStore>) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let sessions = Arc::new(SessionKeys::new(
            &config.admin.session_secret,
            config.admin.session_expiry_secs,
            config.admin.leeway_secs,
        )?);
        let gate = SpinGate::new(store.clone(), config.wheel()?, config.gate_policy());
        let rate_limiter =
            RateLimiterState::new(config.security.rate_limit_per_minute).map(Arc::new);

        Ok(Self {
            gate: Arc::new(gate),
            allow_list: Arc::new(AllowListAdmin::new(store.clone())),
            admin_auth: Arc::new(AdminAuthenticator::new(&config.admin, sessions.clone())),
            sessions,
            store,
            config,
            rate_limiter,
        })
    }
}

pub fn create_app(config: Config, store: Arc<dyn SubmissionStore>) -> anyhow::Result<Router> {
    let state = AppState::new(config, store)?;
    Ok(build_router(state))
}

pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Visitor-facing routes, limited per client.
    let spin_routes = Router::new()
        .route("/api/v1/spins", post(spins::request_spin))
        .route("/api/v1/spins/resolve", post(spins::resolve_spin))
        .route("/api/v1/claims", post(claims::claim_prize))
        .route("/api/v1/admin/login", post(admin::login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    let admin_routes = Router::new()
        .route("/api/v1/admin/session", get(admin::current_session))
        .route(
            "/api/v1/admin/allowed-emails",
            get(admin::list_allowed_emails).post(admin::add_allowed_email),
        )
        .route(
            "/api/v1/admin/allowed-emails/preview",
            post(admin::preview_allowed_emails),
        )
        .route(
            "/api/v1/admin/allowed-emails/bulk",
            post(admin::bulk_import_allowed_emails),
        )
        .route(
            "/api/v1/admin/allowed-emails/import",
            post(admin::import_allowed_emails_file),
        )
        .route("/api/v1/admin/submissions", get(admin::list_submissions))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/api/v1/wheel", get(wheel::get_wheel))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(spin_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
