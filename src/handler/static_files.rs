//! Static file serving module
//!
//! Maps resolver outcomes to HTTP responses: file bytes with inferred
//! content type, redirects, 404s (with optional custom error page), and
//! 500s for filesystem failures that are not "not found".

use crate::config::AppState;
use crate::handler::router::RequestContext;
use crate::http::{self, mime, response};
use crate::logger;
use crate::resolver::Resolved;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::io;
use std::path::Path;
use tokio::fs;

/// Serve a request path from the configured root
pub async fn serve(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    match state.resolver.resolve(ctx.path) {
        Ok(Resolved::File(path)) => serve_resolved_file(&path, ctx, state).await,
        Ok(Resolved::Redirect(target)) => http::build_redirect_response(&target),
        Ok(Resolved::NotFound) => not_found(ctx, state).await,
        Err(e) => {
            logger::log_error(&format!("Failed to resolve '{}': {e}", ctx.path));
            http::build_500_response()
        }
    }
}

/// Read a resolved file and build the 200 response
async fn serve_resolved_file(
    path: &Path,
    ctx: &RequestContext<'_>,
    state: &AppState,
) -> Response<Full<Bytes>> {
    match fs::read(path).await {
        Ok(content) => {
            let content_type =
                mime::get_content_type(path.extension().and_then(|e| e.to_str()));
            response::build_file_response(content, content_type, ctx.is_head)
        }
        // The file can disappear between resolution and read
        Err(e) if e.kind() == io::ErrorKind::NotFound => not_found(ctx, state).await,
        Err(e) => {
            logger::log_error(&format!("Failed to read '{}': {e}", path.display()));
            http::build_500_response()
        }
    }
}

/// 404 response, with the configured error page as body when it exists
async fn not_found(ctx: &RequestContext<'_>, state: &AppState) -> Response<Full<Bytes>> {
    if let Some(page) = &state.config.static_files.not_found_page {
        let page_path = state.resolver.root().join(page);
        if let Ok(content) = fs::read(&page_path).await {
            return response::build_404_page_response(content, ctx.is_head);
        }
    }
    http::build_404_response()
}
