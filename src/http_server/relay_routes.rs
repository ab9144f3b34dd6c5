//! Relay HTTP Route
//!
//! Turns a real HTTP request into an [`Invocation`] and the handler's
//! [`RelayResponse`] back into an HTTP response. Every method is routed to
//! the handler, which owns the OPTIONS and 405 contract.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tracing::warn;

use crate::enrichment::QueryParams;
use crate::handler::{Invocation, RelayHandler};

/// Create the relay route mounted at `path`
pub fn relay_routes(path: &str, handler: RelayHandler) -> Router {
    Router::new()
        .route(path, any(relay_handler))
        .with_state(handler)
}

async fn relay_handler(
    State(handler): State<RelayHandler>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let invocation = build_invocation(method, &uri, body);
    handler.handle(invocation).await.into_response()
}

/// Map request parts onto an invocation without rejecting anything.
///
/// Undecodable input is carried along; only a POST ever looks at it.
fn build_invocation(method: Method, uri: &Uri, body: Bytes) -> Invocation {
    let mut invocation = Invocation::new(method).with_raw_body(body.to_vec());

    if uri.query().is_some() {
        match Query::<QueryParams>::try_from_uri(uri) {
            Ok(Query(params)) => invocation = invocation.with_query(params),
            Err(e) => {
                warn!(error = %e, "Undecodable query string");
                invocation = invocation.with_query_error(e.to_string());
            }
        }
    }

    invocation
}
