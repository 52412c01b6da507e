//! HTTP fetcher for downloading hosts files.

use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{Config, Source};
use crate::error::FetchError;
use crate::utils::format_count;

/// Raw text of one source, or why it could not be retrieved.
#[derive(Debug)]
pub struct RawDocument<'a> {
    pub source: &'a Source,
    pub text: std::result::Result<String, FetchError>,
}

/// HTTP client for fetching sources
pub struct Fetcher {
    client: Client,
    timeout_secs: u64,
    max_size: u64,
}

impl Fetcher {
    /// Create a fetcher using the timeout, size limit and user agent of `config`
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_settings(config.timeout_secs, config.max_source_bytes, &config.user_agent)
    }

    pub fn with_settings(timeout_secs: u64, max_size: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            timeout_secs,
            max_size,
        })
    }

    /// Fetch one source. Failures are returned in the document, never raised.
    pub async fn fetch<'a>(&self, source: &'a Source) -> RawDocument<'a> {
        info!("Fetching {} ({})...", source.category, source.url);

        let text = self.fetch_text(&source.url).await;
        match &text {
            Ok(body) => info!(
                "Fetched {} - {} lines, {} bytes",
                source.category,
                format_count(body.lines().count()),
                format_count(body.len())
            ),
            Err(e) => warn!("Failed to fetch {} ({}): {}", source.category, source.url, e),
        }

        RawDocument { source, text }
    }

    /// Single attempt with size validation. No retries.
    async fn fetch_text(&self, url: &str) -> std::result::Result<String, FetchError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        if let Some(content_length) = response.content_length() {
            if content_length > self.max_size {
                return Err(FetchError::TooLarge {
                    size: content_length,
                    limit: self.max_size,
                });
            }
        }

        // Read in chunks so an unannounced oversized body is cut off early
        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| self.classify_body(e))? {
            let size = (body.len() + chunk.len()) as u64;
            if size > self.max_size {
                return Err(FetchError::TooLarge {
                    size,
                    limit: self.max_size,
                });
            }
            body.extend_from_slice(&chunk);
        }
        debug!("Received {} bytes from {}", body.len(), url);

        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Connection(err.to_string())
        }
    }

    fn classify_body(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout_secs)
        } else {
            FetchError::Body(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher(timeout_secs: u64, max_size: u64) -> Fetcher {
        Fetcher::with_settings(timeout_secs, max_size, "hostagg-test/1.0").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hosts"))
            .and(header("user-agent", "hostagg-test/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string("0.0.0.0 ads.example.com\n"))
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/hosts", server.uri()));
        let doc = fetcher(5, 1024).fetch(&source).await;
        assert_eq!(doc.source, &source);
        assert_eq!(doc.text.unwrap(), "0.0.0.0 ads.example.com\n");
    }

    #[tokio::test]
    async fn test_fetch_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/missing", server.uri()));
        let doc = fetcher(5, 1024).fetch(&source).await;
        assert!(matches!(doc.text, Err(FetchError::Http { status: 404 })));
    }

    #[tokio::test]
    async fn test_fetch_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/hosts", server.uri()));
        let doc = fetcher(5, 1024).fetch(&source).await;
        assert!(matches!(doc.text, Err(FetchError::Http { status: 503 })));
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("0.0.0.0 slow.example.com\n")
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/hosts", server.uri()));
        let doc = fetcher(1, 1024).fetch(&source).await;
        assert!(matches!(doc.text, Err(FetchError::Timeout(1))));
    }

    #[tokio::test]
    async fn test_fetch_too_large() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2048)))
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/hosts", server.uri()));
        let doc = fetcher(5, 1024).fetch(&source).await;
        assert!(matches!(
            doc.text,
            Err(FetchError::TooLarge { limit: 1024, .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Bind then drop to get a local port with nothing listening
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let source = Source::new("Malware", format!("http://127.0.0.1:{}/hosts", port));
        let doc = fetcher(5, 1024).fetch(&source).await;
        assert!(matches!(doc.text, Err(FetchError::Connection(_))));
    }

    #[tokio::test]
    async fn test_fetch_invalid_utf8_is_lossy() {
        let server = MockServer::start().await;
        let mut body = b"0.0.0.0 ok.example.com\n".to_vec();
        body.extend_from_slice(&[0xff, 0xfe, b'\n']);
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let source = Source::new("Malware", format!("{}/hosts", server.uri()));
        let text = fetcher(5, 1024).fetch(&source).await.text.unwrap();
        assert!(text.starts_with("0.0.0.0 ok.example.com\n"));
    }

    #[test]
    fn test_new_from_config() {
        assert!(Fetcher::new(&Config::default()).is_ok());
    }
}
