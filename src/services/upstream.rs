/*
 * Responsibility
 * - 許可されたリクエストを設定済みの下流サービス 1 つへ転送
 * - status / headers / body をそのままクライアントへ返す
 *
 * Notes
 * - hop-by-hop ヘッダと Host はどちら向きにもコピーしない
 * - body 上限超過 (Content-Length なしの場合) はここで読み込み時に検出される
 */
use std::time::Duration;

use axum::body::Body;
use axum::http::{HeaderMap, HeaderName, Request, Response, Uri, header};
use http_body_util::LengthLimitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("failed to read request body: {0}")]
    Body(#[from] axum::Error),
    #[error("request body exceeds the configured limit")]
    BodyTooLarge,
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("failed to build response: {0}")]
    Response(#[from] axum::http::Error),
}

const HOP_BY_HOP: [HeaderName; 8] = [
    header::CONNECTION,
    HeaderName::from_static("keep-alive"),
    header::PROXY_AUTHENTICATE,
    header::PROXY_AUTHORIZATION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
];

fn copy_end_to_end(source: &HeaderMap) -> HeaderMap {
    let mut headers = source.clone();
    for name in &HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

// The body-limit layer reports overflow as a nested body error once the
// stream is read (no Content-Length to reject up front).
fn body_error(err: axum::Error) -> UpstreamError {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
    while let Some(cause) = source {
        if cause.is::<LengthLimitError>() {
            return UpstreamError::BodyTooLarge;
        }
        source = cause.source();
    }
    UpstreamError::Body(err)
}

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .tcp_keepalive(Duration::from_secs(30))
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn target_url(&self, uri: &Uri) -> String {
        let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        format!("{}{}", self.base_url, path_and_query)
    }

    pub async fn forward(&self, request: Request<Body>) -> Result<Response<Body>, UpstreamError> {
        let target_url = self.target_url(request.uri());
        let (parts, body) = request.into_parts();

        let mut headers = copy_end_to_end(&parts.headers);
        headers.remove(header::HOST);

        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(body_error)?;

        let upstream_response = self
            .client
            .request(parts.method.clone(), &target_url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .inspect_err(|err| {
                tracing::error!(
                    error = %err,
                    method = %parts.method,
                    target = %target_url,
                    "upstream request failed"
                );
            })?;

        let status = upstream_response.status();
        let response_headers = copy_end_to_end(upstream_response.headers());
        let bytes = upstream_response.bytes().await?;

        tracing::debug!(status = %status, target = %target_url, "upstream responded");

        let mut response = Response::builder().status(status).body(Body::from(bytes))?;
        *response.headers_mut() = response_headers;
        Ok(response)
    }
}
