//! Static asset responder — serves files under a configured root directory
//! as the router's fallback.

use std::path::{Component, Path, PathBuf};

use axum::extract::State;
use axum::http::{Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::http::AppState;

/// Static asset root and the document served for "/".
#[derive(Debug, Clone)]
pub struct StaticDir {
    pub root: PathBuf,
    pub index: String,
}

const NOT_FOUND_HTML: &str = "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>404 Not Found</title></head>\n<body><h1>404</h1><p>The requested page was not found.</p><p><a href=\"/\">Home</a></p></body>\n</html>\n";

const SERVER_ERROR_HTML: &str = "<!DOCTYPE html>\n<html>\n<head><meta charset=\"UTF-8\"><title>500 Internal Server Error</title></head>\n<body><h1>500</h1><p>Something went wrong serving this file.</p></body>\n</html>\n";

/// Fallback handler for every path no API route matched.
pub async fn serve(State(state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    let assets = &state.assets;
    let Some(rel) = resolve_path(uri.path(), &assets.index) else {
        debug!(path = %uri.path(), "Rejected static path");
        return not_found();
    };
    let full = assets.root.join(rel);

    match tokio::fs::metadata(&full).await {
        Ok(meta) if meta.is_file() => {}
        _ => {
            debug!(path = %uri.path(), "Static file not found");
            return not_found();
        }
    }

    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            debug!(path = %uri.path(), bytes = bytes.len(), "Static file served");
            (
                [(header::CONTENT_TYPE, content_type_for(&full))],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            error!(path = %uri.path(), error = %e, "Static file read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
                SERVER_ERROR_HTML,
            )
                .into_response()
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/html; charset=UTF-8")],
        NOT_FOUND_HTML,
    )
        .into_response()
}

/// Map a request path to a path relative to the root. "/" becomes the index
/// document; anything with a non-normal component (`..`, a root, a prefix)
/// is rejected.
fn resolve_path(request_path: &str, index: &str) -> Option<PathBuf> {
    let rel = if request_path == "/" {
        index
    } else {
        request_path.trim_start_matches('/')
    };
    if rel.is_empty() {
        return None;
    }
    let rel = PathBuf::from(rel);
    if rel
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
    {
        Some(rel)
    } else {
        None
    }
}

/// Content type from the file extension; unknown extensions fall back to
/// plain text.
fn content_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html; charset=UTF-8",
        Some("css") => "text/css; charset=UTF-8",
        Some("js") => "application/javascript; charset=UTF-8",
        Some("json") => "application/json; charset=UTF-8",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        _ => "text/plain; charset=UTF-8",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_maps_to_index() {
        assert_eq!(
            resolve_path("/", "index.html"),
            Some(PathBuf::from("index.html"))
        );
        assert_eq!(
            resolve_path("/", "html/index.html"),
            Some(PathBuf::from("html/index.html"))
        );
    }

    #[test]
    fn normal_paths_resolve() {
        assert_eq!(
            resolve_path("/css/app.css", "index.html"),
            Some(PathBuf::from("css/app.css"))
        );
    }

    #[test]
    fn traversal_is_rejected() {
        assert_eq!(resolve_path("/../etc/passwd", "index.html"), None);
        assert_eq!(resolve_path("/css/../../secret", "index.html"), None);
    }

    #[test]
    fn content_types() {
        assert_eq!(
            content_type_for(Path::new("index.html")),
            "text/html; charset=UTF-8"
        );
        assert_eq!(
            content_type_for(Path::new("app.js")),
            "application/javascript; charset=UTF-8"
        );
        assert_eq!(content_type_for(Path::new("logo.png")), "image/png");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(
            content_type_for(Path::new("README")),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(
            content_type_for(Path::new("archive.tar.gz")),
            "text/plain; charset=UTF-8"
        );
    }
}
