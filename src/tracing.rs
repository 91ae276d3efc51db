//! Request-scoped metadata used by error responses and log spans.

use axum::{extract::Request, middleware::Next, response::Response};
use std::cell::RefCell;
use std::future::Future;
use tracing::Instrument;
use uuid::Uuid;

/// Metadata captured once at the HTTP boundary for the duration of a request.
#[derive(Clone, Debug)]
pub struct RequestMeta {
    pub request_id: String,
    pub path: String,
}

impl RequestMeta {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            path: path.into(),
        }
    }
}

tokio::task_local! {
    static CURRENT_REQUEST_META: RefCell<Option<RequestMeta>>;
}

pub async fn scope_request_meta<Fut, R>(meta: RequestMeta, future: Fut) -> R
where
    Fut: Future<Output = R>,
{
    CURRENT_REQUEST_META
        .scope(RefCell::new(Some(meta)), future)
        .await
}

pub fn current_request_meta() -> Option<RequestMeta> {
    CURRENT_REQUEST_META
        .try_with(|cell| cell.borrow().clone())
        .ok()
        .flatten()
}

pub fn current_request_path() -> Option<String> {
    current_request_meta().map(|meta| meta.path)
}

/// Middleware that scopes [`RequestMeta`] over the handler future so error
/// bodies can report the request path without threading it by parameter.
pub async fn request_meta_middleware(request: Request, next: Next) -> Response {
    let meta = RequestMeta::new(request.uri().path().to_string());
    let span = tracing::info_span!(
        "http.request",
        request_id = %meta.request_id,
        method = %request.method(),
        path = %meta.path,
    );
    scope_request_meta(meta, next.run(request).instrument(span)).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scoped_meta_is_visible_inside_the_future() {
        let meta = RequestMeta::new("/api/v1/rfqs");
        let path = scope_request_meta(meta, async { current_request_path() }).await;
        assert_eq!(path.as_deref(), Some("/api/v1/rfqs"));
    }

    #[tokio::test]
    async fn meta_is_absent_outside_a_scope() {
        assert!(current_request_path().is_none());
    }
}
