//! Router assembly and shared application state.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{Method, StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tower_http::cors::{Any, CorsLayer};

use crate::error::ApiError;
use crate::static_files::{self, StaticDir};
use crate::store::Database;
use crate::todos::routes::todo_routes;
use crate::users::routes::auth_routes;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn Database>,
    /// Static asset root and index document.
    pub assets: StaticDir,
}

/// Build the full application router: API routes, CORS, and the static
/// file fallback. The route table is fixed here at startup.
pub fn app(db: Arc<dyn Database>, assets: StaticDir) -> Router {
    let state = AppState { db, assets };

    Router::new()
        .route("/api/test", get(api_test).options(preflight))
        .merge(todo_routes())
        .merge(auth_routes())
        .fallback(static_files::serve)
        .with_state(state)
        .layer(cors_layer())
}

/// Permissive CORS on every response: wildcard origin, fixed method and
/// header lists, one-hour preflight cache.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

/// Preflight short-circuit: 200 with no body, whatever the path.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Parse a path segment as a numeric id.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>().map_err(|_| ApiError::InvalidIdentifier)
}

// ── Ping ────────────────────────────────────────────────────────────────

async fn api_test() -> impl IntoResponse {
    Json(serde_json::json!({
        "message": "API test successful",
        "status": "ok",
        "server": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_integers() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert_eq!(parse_id("0").unwrap(), 0);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("abc").is_err());
        assert!(parse_id("12abc").is_err());
        assert!(parse_id("").is_err());
        assert!(parse_id("1.5").is_err());
    }
}
