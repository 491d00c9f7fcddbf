//! Retrieval of remote calendar payloads.

use std::future::Future;
use std::time::Duration;

use tokio::time::timeout;
use tracing::debug;
use url::Url;

use crate::config::DayflowConfig;
use crate::error::{DayflowError, DayflowResult, FetchError};

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_BODY_BYTES: u64 = 10 * 1024 * 1024;
const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of raw ICS bytes for a subscription URL.
pub trait Fetcher: Send + Sync {
    /// GET the document at `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, FetchError>> + Send;

    /// Check that `url` answers with a 2xx without downloading the body.
    fn probe(&self, url: &str) -> impl Future<Output = Result<(), FetchError>> + Send;
}

/// [`Fetcher`] over HTTP(S). `webcal://` URLs are fetched over HTTPS.
#[derive(Clone)]
pub struct HttpFetcher {
    http: reqwest::Client,
    timeout: Duration,
    max_body_bytes: u64,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> DayflowResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| DayflowError::Config(format!("Could not build HTTP client: {e}")))?;
        Ok(HttpFetcher {
            http,
            timeout,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    pub fn from_config(config: &DayflowConfig) -> DayflowResult<Self> {
        Ok(Self::new(config.fetch_timeout(), &config.user_agent)?
            .with_max_body_bytes(config.max_feed_bytes))
    }

    /// Refuse response bodies larger than `max_body_bytes`.
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let url = normalize_url(url)?;
        debug!(%url, "Fetching calendar");

        let request = async {
            let response = self.http.get(url).send().await.map_err(transport_error)?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::Status(status.as_u16()));
            }

            read_body(response, self.max_body_bytes).await
        };

        timeout(self.timeout, request)
            .await
            .map_err(|_| FetchError::Timeout(self.timeout.as_secs()))?
    }

    async fn probe(&self, url: &str) -> Result<(), FetchError> {
        let url = normalize_url(url)?;

        let request = async {
            let response = self.http.head(url).send().await.map_err(transport_error)?;
            let status = response.status();
            if status.is_success() {
                Ok(())
            } else {
                Err(FetchError::Status(status.as_u16()))
            }
        };

        timeout(PROBE_TIMEOUT, request)
            .await
            .map_err(|_| FetchError::Timeout(PROBE_TIMEOUT.as_secs()))?
    }
}

/// Parse `url`, mapping the `webcal` scheme onto `https`.
pub fn normalize_url(url: &str) -> Result<Url, FetchError> {
    let url = url.trim();
    let rewritten = match url.strip_prefix("webcal://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    };

    let parsed = Url::parse(&rewritten)
        .map_err(|e| FetchError::Transport(format!("invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::Transport(format!(
            "unsupported URL scheme '{other}'"
        ))),
    }
}

/// Read the body chunk by chunk, giving up as soon as it passes `limit`.
async fn read_body(mut response: reqwest::Response, limit: u64) -> Result<Vec<u8>, FetchError> {
    if let Some(length) = response.content_length() {
        if length > limit {
            return Err(FetchError::TooLarge(limit));
        }
    }

    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(transport_error)? {
        if (body.len() + chunk.len()) as u64 > limit {
            return Err(FetchError::TooLarge(limit));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

fn transport_error(e: reqwest::Error) -> FetchError {
    FetchError::Transport(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ICS: &str = "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n";

    fn fetcher(timeout: Duration) -> HttpFetcher {
        HttpFetcher::new(timeout, "DayFlow/1.0").unwrap()
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("webcal://example.com/cal.ics").unwrap().as_str(),
            "https://example.com/cal.ics"
        );
        assert_eq!(
            normalize_url(" https://example.com/a.ics ").unwrap().as_str(),
            "https://example.com/a.ics"
        );
        assert!(matches!(
            normalize_url("ftp://example.com/a.ics"),
            Err(FetchError::Transport(_))
        ));
        assert!(matches!(normalize_url("not a url"), Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_fetch_returns_body_and_sends_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/cal.ics"))
            .and(header("user-agent", "DayFlow/1.0"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ICS))
            .mount(&server)
            .await;

        let body = fetcher(DEFAULT_FETCH_TIMEOUT)
            .fetch(&format!("{}/cal.ics", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, ICS.as_bytes());
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetcher(DEFAULT_FETCH_TIMEOUT)
            .fetch(&format!("{}/missing.ics", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::Status(404));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(ICS)
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let err = fetcher(Duration::from_millis(200))
            .fetch(&format!("{}/slow.ics", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/huge.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 4096]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cal.ics"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ICS))
            .mount(&server)
            .await;

        let f = fetcher(DEFAULT_FETCH_TIMEOUT).with_max_body_bytes(1024);
        let err = f
            .fetch(&format!("{}/huge.ics", server.uri()))
            .await
            .unwrap_err();
        assert_eq!(err, FetchError::TooLarge(1024));
        assert_eq!(err.to_string(), "response larger than 1024 bytes");

        let body = f.fetch(&format!("{}/cal.ics", server.uri())).await.unwrap();
        assert_eq!(body, ICS.as_bytes());
    }

    #[tokio::test]
    async fn test_body_exactly_at_limit_is_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(ICS))
            .mount(&server)
            .await;

        let body = fetcher(DEFAULT_FETCH_TIMEOUT)
            .with_max_body_bytes(ICS.len() as u64)
            .fetch(&format!("{}/cal.ics", server.uri()))
            .await
            .unwrap();
        assert_eq!(body, ICS.as_bytes());
    }

    #[test]
    fn test_from_config_uses_feed_size_limit() {
        let config = DayflowConfig {
            max_feed_bytes: 2048,
            ..DayflowConfig::default()
        };
        let f = HttpFetcher::from_config(&config).unwrap();
        assert_eq!(f.max_body_bytes, 2048);
        assert_eq!(fetcher(DEFAULT_FETCH_TIMEOUT).max_body_bytes, DEFAULT_MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn test_probe_uses_head() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/ok.ics"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("HEAD"))
            .and(path("/gone.ics"))
            .respond_with(ResponseTemplate::new(410))
            .mount(&server)
            .await;

        let f = fetcher(DEFAULT_FETCH_TIMEOUT);
        assert!(f.probe(&format!("{}/ok.ics", server.uri())).await.is_ok());
        assert_eq!(
            f.probe(&format!("{}/gone.ics", server.uri())).await,
            Err(FetchError::Status(410))
        );
    }

    #[tokio::test]
    async fn test_fetch_connection_refused_is_transport_error() {
        // Nothing listens on port 9 on a test machine
        let err = fetcher(Duration::from_secs(5))
            .fetch("http://127.0.0.1:9/cal.ics")
            .await
            .unwrap_err();
        assert!(
            matches!(err, FetchError::Transport(_) | FetchError::Timeout(_)),
            "got {:?}",
            err
        );
    }
}
