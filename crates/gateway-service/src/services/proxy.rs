//! Reverse proxy to the backend services.
//!
//! Requests are buffered (bounded) and forwarded with method, path, query and
//! end-to-end headers intact. Responses are streamed back unchanged apart from
//! hop-by-hop headers. The only identity a backend ever sees is the
//! `X-User-ID` the gateway itself sets.

use crate::errors::GatewayError;
use axum::body::Body;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::response::Response;
use common::identity::USER_ID_HEADER;
use common::observability::metrics::record_peer_call;
use common::peer::{build_client, CallPolicy, PeerError};
use http_body_util::LengthLimitError;
use reqwest::Client;
use std::error::Error as StdError;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Largest request body the gateway will buffer.
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Headers that describe a single connection and never cross the proxy.
const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
    "proxy-authorization",
    "proxy-authenticate",
    "host",
];

/// A backend the gateway forwards to.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Metrics label.
    pub name: &'static str,
    pub base_url: String,
}

impl Upstream {
    pub fn new(name: &'static str, base_url: String) -> Self {
        Self { name, base_url }
    }
}

#[derive(Clone)]
pub struct ProxyClient {
    client: Client,
}

impl ProxyClient {
    /// # Errors
    ///
    /// Returns `PeerError::Build` if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, PeerError> {
        Ok(Self {
            client: build_client(timeout)?,
        })
    }

    /// Forward `request` to `upstream`, replacing any inbound `X-User-ID`
    /// with `user_id`.
    ///
    /// # Errors
    ///
    /// - `GatewayError::PayloadTooLarge` if the body exceeds [`MAX_BODY_BYTES`]
    /// - `GatewayError::Upstream` if the backend cannot be reached in time
    #[instrument(skip_all, name = "gateway.proxy.forward", fields(upstream = upstream.name))]
    pub async fn forward(
        &self,
        upstream: &Upstream,
        request: Request,
        user_id: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let (parts, body) = request.into_parts();

        let body = axum::body::to_bytes(body, MAX_BODY_BYTES)
            .await
            .map_err(|e| {
                if exceeded_limit(&e) {
                    GatewayError::PayloadTooLarge
                } else {
                    GatewayError::Upstream(format!("failed to read request body: {e}"))
                }
            })?;

        let path_and_query = parts
            .uri
            .path_and_query()
            .map_or("/", |pq| pq.as_str());
        let url = format!("{}{}", upstream.base_url, path_and_query);

        let mut headers = forwardable(&parts.headers);
        headers.remove("content-length");
        if let Some(user_id) = user_id {
            let value = HeaderValue::from_str(user_id)
                .map_err(|_| GatewayError::Upstream("user id is not a valid header".to_string()))?;
            headers.insert(HeaderName::from_static(USER_ID_HEADER), value);
        }

        debug!(target: "gateway.proxy", method = %parts.method, url = %url, "Forwarding request");

        let start = Instant::now();
        let result = self
            .client
            .request(parts.method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await;

        record_peer_call(
            upstream.name,
            "proxy",
            CallPolicy::Required,
            if result.is_ok() { "success" } else { "transport" },
            start.elapsed(),
        );

        let upstream_response =
            result.map_err(|e| GatewayError::Upstream(format!("{}: {e}", upstream.name)))?;

        let status = upstream_response.status();
        let headers = forwardable(upstream_response.headers());

        let mut response = Response::new(Body::from_stream(upstream_response.bytes_stream()));
        *response.status_mut() = status;
        *response.headers_mut() = headers;
        Ok(response)
    }
}

/// Copy of `headers` without hop-by-hop headers or `X-User-ID`.
fn forwardable(headers: &HeaderMap) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let name_str = name.as_str();
        if name_str == USER_ID_HEADER || HOP_BY_HOP.contains(&name_str) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}

fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}
