use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server received, reflected back by `/echo`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

pub const SLOW_DELAY: Duration = Duration::from_secs(3);

/// Size of the `/large` body, above ureq's default read limit of 10 MiB.
pub const LARGE_BODY_LEN: usize = 11 * 1024 * 1024;

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/json", get(json_body))
        .route("/xml", get(xml_body))
        .route("/text", get(text_body))
        .route("/html", get(html_body))
        .route("/binary", get(binary_body))
        .route("/untyped", get(untyped_body))
        .route("/headers/{name}", get(named_header))
        .route("/status/{code}", get(status_code))
        .route("/slow", get(slow))
        .route("/redirect", any(redirect))
        .route("/large", get(large_body))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn json_body() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/json; charset=utf-8")],
        r#"{"x":1,"items":["a","b"]}"#,
    )
}

async fn xml_body() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        r#"<?xml version="1.0"?><user id="7"><name>Ann</name></user>"#,
    )
}

async fn text_body() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "just text")
}

async fn html_body() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        "<p>hello</p>",
    )
}

async fn binary_body() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        vec![0u8, 1, 2, 3],
    )
}

/// A JSON body sent without any `Content-Type` header.
async fn untyped_body() -> Response {
    Response::new(Body::from(r#"{"untyped":true}"#))
}

/// Responds with the header `x-{name}: {name}`.
async fn named_header(axum::extract::Path(name): axum::extract::Path<String>) -> Response {
    let mut response = ([(header::CONTENT_TYPE, "text/plain")], name.clone()).into_response();
    if let Ok(value) = name.parse::<header::HeaderValue>() {
        if let Ok(header_name) = format!("x-{name}").parse::<header::HeaderName>() {
            response.headers_mut().insert(header_name, value);
        }
    }
    response
}

async fn status_code(axum::extract::Path(code): axum::extract::Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, [(header::CONTENT_TYPE, "text/plain")], status.to_string()).into_response()
}

async fn slow() -> impl IntoResponse {
    tokio::time::sleep(SLOW_DELAY).await;
    ([(header::CONTENT_TYPE, "text/plain")], "finally")
}

/// 303 See Other pointing at `/text`.
async fn redirect() -> Redirect {
    Redirect::to("/text")
}

async fn large_body() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain")], "a".repeat(LARGE_BODY_LEN))
}
