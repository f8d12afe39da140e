//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! route matching, access logging and the headers every response carries.

use crate::config::{AppState, HttpConfig};
use crate::handler::{compress, static_files};
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN, SERVER};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

pub const COMPRESS_PATH: &str = "/compress";
pub const HEALTH_PATH: &str = "/healthz";

/// Request context encapsulating information needed for frontend requests
pub struct RequestContext<'a> {
    pub path: &'a str,
    pub is_head: bool,
    pub if_none_match: Option<String>,
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let mut entry = state
        .config
        .logging
        .access_log
        .then(|| access_log_entry(&req, remote_addr));

    // Each request on a keep-alive connection gets its own budget
    let mut response = match state.config.request_timeout() {
        Some(limit) => match tokio::time::timeout(limit, route_request(req, &state)).await {
            Ok(response) => response,
            Err(_) => {
                logger::log_warning(&format!(
                    "Request from {remote_addr} timed out after {} seconds",
                    limit.as_secs()
                ));
                http::build_text_response(StatusCode::REQUEST_TIMEOUT, "Request Timeout")
            }
        },
        None => route_request(req, &state).await,
    };
    apply_common_headers(&mut response, &state.config.http);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = req.uri().path();
    let is_compress = path == COMPRESS_PATH || path == "/compress/";

    match req.method() {
        &Method::OPTIONS => http::build_options_response(state.config.http.enable_cors),
        &Method::POST if is_compress => {
            if let Some(resp) = check_body_size(&req, state.config.http.max_body_size) {
                return resp;
            }
            compress::handle_compress(req, state).await
        }
        _ if is_compress => http::build_405_response("POST, OPTIONS"),
        &Method::GET | &Method::HEAD if path == HEALTH_PATH => http::build_health_response("ok"),
        &Method::GET | &Method::HEAD => {
            let ctx = RequestContext {
                path,
                is_head: req.method() == Method::HEAD,
                if_none_match: req
                    .headers()
                    .get("if-none-match")
                    .and_then(|v| v.to_str().ok())
                    .map(ToString::to_string),
            };
            static_files::serve_frontend(&ctx, &state.config.frontend).await
        }
        method => {
            logger::log_warning(&format!("Method not allowed: {method} {path}"));
            http::build_405_response("GET, HEAD, OPTIONS")
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
///
/// Chunked bodies are capped while streaming instead.
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get("content-length")?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn apply_common_headers(response: &mut Response<Full<Bytes>>, config: &HttpConfig) {
    let headers = response.headers_mut();
    if let Ok(server) = HeaderValue::from_str(&config.server_name) {
        headers.insert(SERVER, server);
    }
    if config.enable_cors {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    }
}

fn access_log_entry<B>(req: &Request<B>, remote_addr: SocketAddr) -> AccessLogEntry {
    let header = |name: &str| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = match req.version() {
        hyper::Version::HTTP_10 => "1.0",
        hyper::Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry
}
