use std::{convert::Infallible, sync::Arc};

use axum::{
    Router,
    body::Body,
    extract::{Path, State},
    http::{
        HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use futures::StreamExt;

use crate::application::{engine::ViewEngine, error::HttpError};

use super::middleware::{log_responses, set_request_context};

const HOME_VIEW: &str = "/index";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";
const SOURCE: &str = "infra::http::public::render_view";

#[derive(Clone)]
pub struct HttpState {
    pub engine: Arc<ViewEngine>,
    /// Write pages to the socket as they render instead of buffering them.
    pub stream_responses: bool,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/_health", get(health))
        .route("/{*path}", get(view))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn index(State(state): State<HttpState>) -> Response {
    render_view(&state, HOME_VIEW).await
}

async fn view(State(state): State<HttpState>, Path(path): Path<String>) -> Response {
    let view = format!("/{}", path.trim_end_matches('/'));
    if is_private(&view) {
        return HttpError::new(
            SOURCE,
            StatusCode::NOT_FOUND,
            "Page not found",
            format!("view `{view}` is not publicly addressable"),
        )
        .into_response();
    }
    render_view(&state, &view).await
}

async fn health() -> Response {
    StatusCode::NO_CONTENT.into_response()
}

async fn render_view(state: &HttpState, view: &str) -> Response {
    if state.stream_responses {
        return match state.engine.render_stream(view) {
            Ok(stream) => html_response(Body::from_stream(stream.map(Ok::<_, Infallible>))),
            Err(err) => HttpError::from(err).into_response(),
        };
    }

    match state.engine.render_to_content(view).await {
        Ok(content) => html_response(Body::from(content.into_bytes())),
        Err(err) => HttpError::from(err).into_response(),
    }
}

/// Layouts and partials live under `_`-prefixed segments and are only
/// reachable through other pages.
fn is_private(view: &str) -> bool {
    view.split('/').any(|segment| segment.starts_with('_'))
}

fn html_response(body: Body) -> Response {
    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn underscore_segments_are_private() {
        assert!(is_private("/_layout"));
        assert!(is_private("/docs/_partials/nav"));
        assert!(!is_private("/about"));
        assert!(!is_private("/docs/getting_started"));
    }
}
