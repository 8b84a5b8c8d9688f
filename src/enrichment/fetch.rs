use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::warn;
use url::Url;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DELAY_MS: u64 = 100;
const DEFAULT_RETRIES: u32 = 0;

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    /// Pause between successive page fetches (and between retries).
    pub delay: Duration,
    pub retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delay: Duration::from_millis(DEFAULT_DELAY_MS),
            retries: DEFAULT_RETRIES,
        }
    }
}

impl FetchConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(ua) = std::env::var("LISTINGS_USER_AGENT") {
            if !ua.trim().is_empty() {
                cfg.user_agent = ua;
            }
        }
        if let Ok(timeout) = std::env::var("LISTINGS_TIMEOUT_SECS") {
            if let Ok(parsed) = timeout.parse::<u64>() {
                cfg.timeout = Duration::from_secs(parsed);
            }
        }
        if let Ok(delay) = std::env::var("LISTINGS_DELAY_MS") {
            if let Ok(parsed) = delay.parse::<u64>() {
                cfg.delay = Duration::from_millis(parsed);
            }
        }
        if let Ok(retries) = std::env::var("LISTINGS_RETRIES") {
            if let Ok(parsed) = retries.parse::<u32>() {
                cfg.retries = parsed;
            }
        }
        cfg
    }
}

#[derive(Debug)]
pub enum FetchError {
    InvalidUrl(String),
    Http(reqwest::Error),
    Timeout,
    Status(StatusCode),
    MockQueueEmpty,
}

impl FetchError {
    fn http(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Http(err)
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Timeout => true,
            FetchError::Http(_) => true,
            FetchError::Status(status) => status.is_server_error(),
            FetchError::InvalidUrl(_) | FetchError::MockQueueEmpty => false,
        }
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::InvalidUrl(url) => write!(f, "invalid url: {url}"),
            FetchError::Http(err) => write!(f, "http error: {err}"),
            FetchError::Timeout => write!(f, "request timed out"),
            FetchError::Status(status) => write!(f, "unexpected status {status}"),
            FetchError::MockQueueEmpty => write!(f, "mock fetcher response queue is empty"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FetchError::Http(err) => Some(err),
            _ => None,
        }
    }
}

/// Supplies listing page markup for a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// One HTTP session shared by every page of a batch.
#[derive(Clone)]
pub struct HttpFetcher {
    http: Client,
    retries: u32,
    backoff: Duration,
}

impl HttpFetcher {
    pub fn new(cfg: &FetchConfig) -> Result<Self, FetchError> {
        let http = Client::builder()
            .user_agent(cfg.user_agent.as_str())
            .timeout(cfg.timeout)
            .build()
            .map_err(FetchError::http)?;
        Ok(Self { http, retries: cfg.retries, backoff: cfg.delay })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.http.get(url).send().await.map_err(FetchError::http)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        response.text().await.map_err(FetchError::http)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        if Url::parse(url).is_err() {
            return Err(FetchError::InvalidUrl(url.to_string()));
        }
        let mut attempt = 0u32;
        loop {
            match self.fetch_once(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < self.retries => {
                    attempt += 1;
                    warn!(url, attempt, error = %e, "retrying page fetch");
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
pub use mock::MockFetcher;

#[cfg(test)]
mod mock {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    #[derive(Debug, Default)]
    pub struct MockFetcher {
        responses: Mutex<VecDeque<Result<String, FetchError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn push_response(&self, resp: Result<String, FetchError>) {
            self.responses.lock().unwrap().push_back(resp);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.lock().unwrap().push(url.to_string());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(FetchError::MockQueueEmpty))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(FetchError::Timeout.is_retryable());
        assert!(FetchError::Status(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(!FetchError::Status(StatusCode::NOT_FOUND).is_retryable());
        assert!(!FetchError::InvalidUrl("x".into()).is_retryable());
    }

    #[test]
    fn status_error_display() {
        assert_eq!(format!("{}", FetchError::Status(StatusCode::NOT_FOUND)), "unexpected status 404 Not Found");
    }

    #[tokio::test]
    async fn invalid_url_fails_before_network() {
        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn mock_returns_queued_pages_in_order() {
        let mock = MockFetcher::new();
        mock.push_response(Ok("<html>a</html>".into()));
        assert_eq!(mock.fetch("https://a/1").await.unwrap(), "<html>a</html>");
        assert!(matches!(mock.fetch("https://a/2").await, Err(FetchError::MockQueueEmpty)));
        assert_eq!(mock.calls(), vec!["https://a/1".to_string(), "https://a/2".to_string()]);
    }
}
