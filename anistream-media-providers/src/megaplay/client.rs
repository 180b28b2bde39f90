//! Megaplay HTTP Client

use std::sync::LazyLock;
use std::time::Duration;

use reqwest::{
    header::{REFERER, USER_AGENT},
    Client,
};
use tracing::debug;

use super::types::SourcesResponse;
use crate::error::{check_response, json_with_limit, text_with_limit, ProviderClientError};

pub const DEFAULT_HOST: &str = "https://megaplay.buzz";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Shared HTTP client for all megaplay requests (connection pooling).
/// Per-call timeouts are applied on each request.
static SHARED_CLIENT: LazyLock<Client> = LazyLock::new(|| {
    Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(10)
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .expect("Failed to build megaplay shared HTTP client")
});

/// Megaplay HTTP Client
///
/// Provides the two calls of the embed protocol:
/// - embed page fetch (`/stream/s-2/{episode}/{variant}`)
/// - sources fetch (`/stream/getSources?id=...`)
#[derive(Clone)]
pub struct MegaplayClient {
    host: String,
    user_agent: String,
    timeout: Duration,
    client: Client,
}

impl MegaplayClient {
    /// Create a client for the public megaplay host (reuses shared connection pool)
    #[must_use]
    pub fn new() -> Self {
        Self::with_host(DEFAULT_HOST)
    }

    /// Create a client for a custom host, e.g. a mirror or a test server
    #[must_use]
    pub fn with_host(host: impl Into<String>) -> Self {
        let host: String = host.into();
        Self {
            host: host.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            client: SHARED_CLIENT.clone(),
        }
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Provider origin without trailing slash (e.g. `https://megaplay.buzz`)
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Embed page URL for an episode and audio variant
    #[must_use]
    pub fn embed_url(&self, episode_id: &str, variant: &str) -> String {
        format!("{}/stream/s-2/{episode_id}/{variant}", self.host)
    }

    /// Fetch the embed page HTML
    pub async fn fetch_embed(&self, embed_url: &str) -> Result<String, ProviderClientError> {
        debug!("Fetching megaplay embed page {}", embed_url);

        let response = self
            .client
            .get(embed_url)
            .header(REFERER, format!("{}/", self.host))
            .header(USER_AGENT, self.user_agent.as_str())
            .timeout(self.timeout)
            .send()
            .await?;

        let response = check_response(response)?;
        text_with_limit(response).await
    }

    /// Fetch stream sources for an embed `data-id`
    pub async fn fetch_sources(
        &self,
        data_id: &str,
        embed_url: &str,
    ) -> Result<SourcesResponse, ProviderClientError> {
        debug!("Fetching megaplay sources for data-id {}", data_id);

        let response = self
            .client
            .get(format!("{}/stream/getSources", self.host))
            .query(&[("id", data_id)])
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, embed_url)
            .timeout(self.timeout)
            .send()
            .await?;

        let response = check_response(response)?;
        json_with_limit(response).await
    }
}

impl Default for MegaplayClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_client_defaults() {
        let client = MegaplayClient::new();
        assert_eq!(client.host(), "https://megaplay.buzz");
    }

    #[test]
    fn test_embed_url() {
        let client = MegaplayClient::new();
        assert_eq!(
            client.embed_url("128356", "dub"),
            "https://megaplay.buzz/stream/s-2/128356/dub"
        );
    }

    #[test]
    fn test_host_trailing_slash_trimmed() {
        let client = MegaplayClient::with_host("http://127.0.0.1:9000/");
        assert_eq!(client.host(), "http://127.0.0.1:9000");
        assert_eq!(
            client.embed_url("1", "sub"),
            "http://127.0.0.1:9000/stream/s-2/1/sub"
        );
    }

    #[tokio::test]
    async fn test_fetch_embed_sends_browser_headers() {
        let server = MockServer::start().await;
        let client = MegaplayClient::with_host(server.uri()).user_agent("anistream-test/1.0");
        let referer = format!("{}/", server.uri());

        Mock::given(method("GET"))
            .and(path("/stream/s-2/99/sub"))
            .and(header("referer", referer.as_str()))
            .and(header("user-agent", "anistream-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<div data-id="777"></div>"#))
            .expect(1)
            .mount(&server)
            .await;

        let html = client.fetch_embed(&client.embed_url("99", "sub")).await.unwrap();
        assert!(html.contains("777"));
    }

    #[tokio::test]
    async fn test_fetch_sources_sends_ajax_headers() {
        let server = MockServer::start().await;
        let client = MegaplayClient::with_host(server.uri());
        let embed_url = client.embed_url("99", "sub");

        Mock::given(method("GET"))
            .and(path("/stream/getSources"))
            .and(query_param("id", "777"))
            .and(header("x-requested-with", "XMLHttpRequest"))
            .and(header("referer", embed_url.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"sources": {"file": "https://cdn.example/master.m3u8"}}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let sources = client.fetch_sources("777", &embed_url).await.unwrap();
        assert_eq!(sources.file(), Some("https://cdn.example/master.m3u8"));
    }

    #[tokio::test]
    async fn test_fetch_embed_http_error() {
        let server = MockServer::start().await;
        let client = MegaplayClient::with_host(server.uri());

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = client.fetch_embed(&client.embed_url("1", "sub")).await.unwrap_err();
        assert!(matches!(err, ProviderClientError::Http { status, .. } if status == reqwest::StatusCode::NOT_FOUND));
    }

    #[tokio::test]
    async fn test_fetch_sources_invalid_json() {
        let server = MockServer::start().await;
        let client = MegaplayClient::with_host(server.uri());

        Mock::given(method("GET"))
            .and(path("/stream/getSources"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>blocked</html>"))
            .mount(&server)
            .await;

        let err = client.fetch_sources("1", "http://embed").await.unwrap_err();
        assert!(matches!(err, ProviderClientError::Parse(_)));
    }

    #[tokio::test]
    async fn test_request_timeout() {
        let server = MockServer::start().await;
        let client = MegaplayClient::with_host(server.uri()).timeout(Duration::from_millis(100));

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = client.fetch_embed(&client.embed_url("1", "sub")).await.unwrap_err();
        assert!(matches!(err, ProviderClientError::Network(_)));
    }
}
