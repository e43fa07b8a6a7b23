// server.rs - Router assembly and the serve loop
//
// Every route, the static/page fallback included, sits behind the route gate.

use axum::{
    extract::DefaultBodyLimit,
    handler::Handler,
    http::HeaderValue,
    middleware,
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{AppConfig, SecurityConfig};
use crate::database::open_store;
use crate::handlers;
use crate::middleware::route_gate_middleware;
use crate::state::AppState;

/// Build the full application router over the given state
pub fn app(state: AppState) -> Router {
    // Plain fallback: the page handler picks its own status
    let pages = handlers::page.with_state(state.clone());
    let assets = ServeDir::new(&state.config.site.asset_dir).fallback(pages);

    let router = Router::new()
        .route("/health", get(handlers::health))
        .merge(user_routes())
        .fallback_service(assets)
        .layer(middleware::from_fn_with_state(state.clone(), route_gate_middleware))
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes));

    let router = match cors_layer(&state.config.security) {
        Some(cors) => router.layer(cors),
        None => router,
    };

    let router = if state.config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn user_routes() -> Router<AppState> {
    use handlers::user;

    Router::new()
        // Profile
        .route("/api/user", get(user::profile_get_by_query))
        .route(
            "/api/user/:user_id",
            get(user::profile_get)
                .put(user::profile_put)
                .patch(user::profile_patch),
        )
        // Goals
        .route(
            "/api/user/:user_id/goals",
            get(user::goals_list).post(user::goals_create),
        )
        .route("/api/user/:user_id/goals/summary", get(user::goals_summary))
}

fn cors_layer(security: &SecurityConfig) -> Option<CorsLayer> {
    if !security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    if origins.is_empty() || security.cors_origins.iter().any(|o| o == "*") {
        return Some(CorsLayer::permissive());
    }

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Open the configured store, bind the API port and serve until shutdown
pub async fn serve(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Goalpost API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        tracing::warn!("JWT_SECRET is not set; every session will be treated as anonymous");
    }

    let store = open_store(&config.database).await?;
    tracing::info!("Using {} document store", store.name());

    let bind_addr = format!("0.0.0.0:{}", config.api.port);
    let app = app(AppState::new(store, config));

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Goalpost API listening on http://{}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Install the fmt subscriber, honoring RUST_LOG when set
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("goalpost_api=info,tower_http=info"));

    // A second install (tests, CLI subcommands) is harmless
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
