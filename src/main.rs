use axum::{middleware::from_fn, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use coldvault::handlers;
use coldvault::middleware::jwt_auth_middleware;
use coldvault::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up JWT_SECRET, STORAGE_*, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = coldvault::config::config();
    tracing::info!("starting coldvault in {:?} mode", config.environment);

    let state = AppState::from_config(config)
        .await
        .unwrap_or_else(|e| panic!("failed to build application state: {}", e));

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("COLDVAULT_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("coldvault listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(public_routes())
        // Protected API (bearer token required)
        .merge(file_routes())
        .merge(archive_routes())
        .merge(session_routes())
        // Elevated API (bearer token + admin claim)
        .merge(admin_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::public::{auth, files};

    Router::new()
        .route("/auth/login", post(auth::login))
        // Download-URL surface backing every listed `url` field
        .route("/files/:uid/:name", get(files::download))
}

fn session_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::protected::{auth, grants};

    Router::new()
        .route("/api/auth/whoami", get(auth::whoami))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/grant-access", post(grants::grant_access))
        .route("/api/auth/admin-claims", post(grants::admin_claims))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn file_routes() -> Router<AppState> {
    use axum::routing::put;
    use handlers::protected::files;

    Router::new()
        .route("/api/files", get(files::list))
        .route("/api/files/:name", put(files::upload).delete(files::delete))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn archive_routes() -> Router<AppState> {
    use axum::routing::post;
    use handlers::protected::archive;

    Router::new()
        .route("/api/archive/files", get(archive::list))
        .route("/api/archive/upload", post(archive::upload))
        .route("/api/archive/download", post(archive::download))
        .route("/api/archive/download/batch", post(archive::download_batch))
        .route_layer(from_fn(jwt_auth_middleware))
}

fn admin_routes() -> Router<AppState> {
    use axum::routing::{delete, post};
    use handlers::elevated::users;

    Router::new()
        .route("/api/admin/users", get(users::list))
        .route("/api/admin/users/:uid/reset-password", post(users::reset_password))
        .route("/api/admin/users/:uid/disable", post(users::disable))
        .route("/api/admin/users/:uid/enable", post(users::enable))
        .route("/api/admin/users/:uid", delete(users::delete))
        .route_layer(from_fn(jwt_auth_middleware))
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "coldvault",
            "version": version,
            "description": "Tiered file archive API - role-gated hot/cold storage migration",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/auth/login (public - token acquisition)",
                "downloads": "/files/:uid/:name (public)",
                "session": "/api/auth/* (protected)",
                "files": "/api/files[/:name] (protected)",
                "archive": "/api/archive/* (protected, tier access claim)",
                "admin": "/api/admin/users* (protected, admin claim)",
            }
        }
    }))
}

async fn health() -> axum::response::Json<Value> {
    let now = chrono::Utc::now();
    axum::response::Json(json!({
        "success": true,
        "data": { "status": "ok", "timestamp": now }
    }))
}
