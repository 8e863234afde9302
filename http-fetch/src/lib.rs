//! HTTP implementation of [`webcache::PageFetcher`] backed by `reqwest`.

use async_trait::async_trait;
use shared::config::Config;
use shared::{Error, Result};
use std::time::Duration;
use tracing::debug;
use webcache::{FetchFailure, PageFetcher};

#[derive(Clone, Debug, Default)]
pub struct HttpFetcherConfig {
    /// Whole-request timeout; `None` waits as long as the server does.
    pub timeout: Option<Duration>,
    pub user_agent: Option<String>,
    /// Return the body of non-2xx responses instead of failing.
    pub accept_error_status: bool,
}

impl From<&Config> for HttpFetcherConfig {
    fn from(config: &Config) -> Self {
        Self {
            timeout: config.fetch_timeout,
            user_agent: config.user_agent.clone(),
            accept_error_status: false,
        }
    }
}

/// Fetches pages with a plain GET and returns the body as text.
#[derive(Clone, Debug)]
pub struct HttpPageFetcher {
    client: reqwest::Client,
    accept_error_status: bool,
}

impl HttpPageFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpFetcherConfig::default())
    }

    pub fn with_config(config: HttpFetcherConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("failed to build http client: {}", e)))?;

        Ok(Self::from_client(client, config.accept_error_status))
    }

    pub fn from_client(client: reqwest::Client, accept_error_status: bool) -> Self {
        Self {
            client,
            accept_error_status,
        }
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<String, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::request(url, e))?;

        let status = response.status();
        debug!("GET {} -> {}", url, status);
        if !status.is_success() && !self.accept_error_status {
            return Err(FetchFailure::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| FetchFailure::Body {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_page(server: &MockServer, response: ResponseTemplate) -> String {
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
        format!("{}/page", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_success_returns_body() {
        let server = MockServer::start().await;
        let url = mock_page(&server, ResponseTemplate::new(200).set_body_string("Hello")).await;
        let fetcher = HttpPageFetcher::new().unwrap();

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "Hello");
    }

    #[tokio::test]
    async fn test_fetch_error_status_is_failure() {
        let server = MockServer::start().await;
        let url = mock_page(&server, ResponseTemplate::new(404).set_body_string("missing")).await;
        let fetcher = HttpPageFetcher::new().unwrap();

        let failure = fetcher.fetch(&url).await.unwrap_err();
        assert_eq!(
            failure,
            FetchFailure::Status {
                url: url.clone(),
                status: 404
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_error_status_accepted_when_configured() {
        let server = MockServer::start().await;
        let url = mock_page(&server, ResponseTemplate::new(500).set_body_string("oops")).await;
        let fetcher = HttpPageFetcher::with_config(HttpFetcherConfig {
            accept_error_status: true,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(fetcher.fetch(&url).await.unwrap(), "oops");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then release a port so nothing is listening on it
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();

        let fetcher = HttpPageFetcher::new().unwrap();
        let url = format!("http://{}/", addr);
        let failure = fetcher.fetch(&url).await.unwrap_err();

        assert!(matches!(failure, FetchFailure::Request { url: ref u, .. } if *u == url));
    }

    #[tokio::test]
    async fn test_fetch_invalid_url() {
        let fetcher = HttpPageFetcher::new().unwrap();
        let failure = fetcher.fetch("not a url").await.unwrap_err();

        assert!(matches!(failure, FetchFailure::Request { .. }));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        let url = mock_page(
            &server,
            ResponseTemplate::new(200)
                .set_body_string("too late")
                .set_delay(Duration::from_millis(500)),
        )
        .await;

        let fetcher = HttpPageFetcher::with_config(HttpFetcherConfig {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        })
        .unwrap();

        let failure = fetcher.fetch(&url).await.unwrap_err();
        assert!(matches!(failure, FetchFailure::Request { .. }));
    }

    #[tokio::test]
    async fn test_user_agent_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header("user-agent", "webcache-test"))
            .respond_with(ResponseTemplate::new(200).set_body_string("agent ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpPageFetcher::with_config(HttpFetcherConfig {
            user_agent: Some("webcache-test".to_string()),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(fetcher.fetch(&server.uri()).await.unwrap(), "agent ok");
    }
}
