//! wiremock-backed S3 endpoint for adapter tests

use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::Client;
use serde_json::Value;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const BUCKET: &str = "wastewise";

/// Client pointed at `server`, path-style, without retries
pub fn client_for(server: &MockServer) -> Client {
    let config = aws_sdk_s3::Config::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "wiremock"))
        .endpoint_url(server.uri())
        .force_path_style(true)
        .retry_config(RetryConfig::disabled())
        .build();
    Client::from_conf(config)
}

pub fn object_path(key: &str) -> String {
    format!("/{}/{}", BUCKET, key)
}

fn s3_error(status: u16, code: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_raw(
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Error><Code>{}</Code><Message>{}</Message></Error>",
            code, code
        ),
        "application/xml",
    )
}

/// `GET key` answers with `body` at `etag`
pub async fn stored(server: &MockServer, key: &str, body: Value, etag: &str) {
    Mock::given(method("GET"))
        .and(path(object_path(key)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("ETag", etag)
                .set_body_json(body),
        )
        .mount(server)
        .await;
}

/// `GET key` answers 404
pub async fn missing(server: &MockServer, key: &str) {
    Mock::given(method("GET"))
        .and(path(object_path(key)))
        .respond_with(s3_error(404, "NoSuchKey"))
        .mount(server)
        .await;
}

/// Create-only puts on `key` answer `status`
pub async fn on_create(server: &MockServer, key: &str, status: u16, times: u64) {
    Mock::given(method("PUT"))
        .and(path(object_path(key)))
        .and(header("if-none-match", "*"))
        .respond_with(put_response(status))
        .expect(times)
        .mount(server)
        .await;
}

/// ETag-guarded puts on `key` answer `status`
pub async fn on_replace(server: &MockServer, key: &str, status: u16, times: u64) {
    Mock::given(method("PUT"))
        .and(path(object_path(key)))
        .and(header_exists("if-match"))
        .respond_with(put_response(status))
        .expect(times)
        .mount(server)
        .await;
}

/// `DELETE key` succeeds, `times` times
pub async fn on_delete(server: &MockServer, key: &str, times: u64) {
    Mock::given(method("DELETE"))
        .and(path(object_path(key)))
        .respond_with(ResponseTemplate::new(204))
        .expect(times)
        .mount(server)
        .await;
}

fn put_response(status: u16) -> ResponseTemplate {
    match status {
        200 => ResponseTemplate::new(200).insert_header("ETag", "\"written\""),
        412 => s3_error(412, "PreconditionFailed"),
        409 => s3_error(409, "ConditionalRequestConflict"),
        other => s3_error(other, "InternalError"),
    }
}

/// Number of requests with `verb` that reached `key`
pub async fn requests_to(server: &MockServer, verb: &str, key: &str) -> usize {
    let expected = object_path(key);
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == verb && request.url.path() == expected)
        .count()
}
