//! Document retrieval from local paths and remote URLs.

mod retry;

pub use retry::RetryPolicy;

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::models::config::FetchConfig;

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Where a document comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Remote,
    Local,
}

/// One document to fetch and extract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    source: String,
    timeout: Duration,
    kind: SourceKind,
}

impl ExtractionRequest {
    pub fn remote(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            source: url.into(),
            timeout,
            kind: SourceKind::Remote,
        }
    }

    pub fn local(path: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            source: path.as_ref().display().to_string(),
            timeout,
            kind: SourceKind::Local,
        }
    }

    /// Infer the kind from the source: `http(s)://` is remote, anything else local.
    pub fn parse(source: &str, timeout: Duration) -> Self {
        let lower = source.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Self::remote(source, timeout)
        } else {
            Self::local(source, timeout)
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

/// Raw bytes of a fetched document.
#[derive(Debug, Clone)]
pub struct RawDocument {
    source: String,
    data: Vec<u8>,
}

impl RawDocument {
    pub fn new(source: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            data,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Retrieves raw documents and listing pages.
///
/// Holds a reusable HTTP client plus read-only retry configuration, so it
/// can be cloned freely and shared between sequential calls.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    policy: RetryPolicy,
    max_document_bytes: u64,
}

impl Fetcher {
    /// Build a fetcher from configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "application/pdf,text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| FetchError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy: RetryPolicy::from(config),
            max_document_bytes: config.max_document_bytes,
        })
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch the raw bytes for a request.
    pub async fn fetch(&self, request: &ExtractionRequest) -> Result<RawDocument> {
        match request.kind() {
            SourceKind::Local => read_local(Path::new(request.source())),
            SourceKind::Remote => self.fetch_url(request.source(), request.timeout()).await,
        }
    }

    /// Download a PDF.
    pub async fn fetch_url(&self, url: &str, timeout: Duration) -> Result<RawDocument> {
        info!("Downloading {}", url);
        let response = self.send_with_retry(url, timeout).await?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.contains("pdf") && !url_looks_like_pdf(url) {
            warn!(
                "Response from {} has content type {:?}, may not be a PDF",
                url, content_type
            );
        }

        let data = self.read_body(response, url, timeout).await?;
        debug!("Downloaded {} bytes from {}", data.len(), url);

        Ok(RawDocument::new(url, data))
    }

    /// Download an HTML page as text.
    pub async fn fetch_page(&self, url: &str, timeout: Duration) -> Result<String> {
        let response = self.send_with_retry(url, timeout).await?;
        let data = self.read_body(response, url, timeout).await?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    async fn send_with_retry(&self, url: &str, timeout: Duration) -> Result<Response> {
        let mut attempt = 1;
        loop {
            let response = self
                .client
                .get(url)
                .timeout(timeout)
                .send()
                .await
                .map_err(|e| classify(e, url, timeout))?;

            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let code = status.as_u16();
            if self.policy.is_retryable(code) && self.policy.has_attempts_left(attempt) {
                let delay = self.policy.delay_for(attempt);
                warn!(
                    "HTTP {} from {} (attempt {}/{}), retrying in {:?}",
                    code, url, attempt, self.policy.max_attempts, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            return Err(FetchError::Http {
                status: code,
                url: url.to_string(),
            });
        }
    }

    async fn read_body(&self, response: Response, url: &str, timeout: Duration) -> Result<Vec<u8>> {
        let limit = self.max_document_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::TooLarge { limit });
        }

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| classify(e, url, timeout))?;
            if data.len() as u64 + chunk.len() as u64 > limit {
                return Err(FetchError::TooLarge { limit });
            }
            data.extend_from_slice(&chunk);
        }
        Ok(data)
    }
}

/// Read a local PDF.
///
/// Fails with `NotFound` before anything is read when the path is missing,
/// and with `InvalidFormat` when the extension is not `.pdf`.
pub fn read_local(path: &Path) -> Result<RawDocument> {
    if !path.exists() {
        return Err(FetchError::NotFound(PathBuf::from(path)));
    }

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        return Err(FetchError::InvalidFormat(format!(
            "{} is not a PDF file",
            path.display()
        )));
    }

    let data = std::fs::read(path)?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(RawDocument::new(path.display().to_string(), data))
}

fn url_looks_like_pdf(url: &str) -> bool {
    match url::Url::parse(url) {
        Ok(parsed) => parsed.path().to_ascii_lowercase().ends_with(".pdf"),
        Err(_) => url.to_ascii_lowercase().ends_with(".pdf"),
    }
}

fn classify(error: reqwest::Error, url: &str, timeout: Duration) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            secs: timeout.as_secs(),
        }
    } else {
        FetchError::Network(error.to_string())
    }
}
