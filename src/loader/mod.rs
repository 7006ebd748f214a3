use std::time::Duration;

use thiserror::Error;
use tracing::debug;

use crate::model::CertificateRecord;

pub const DEFAULT_SOURCE: &str = "data/certificados.json";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;

const USER_AGENT: &str =
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:95.0) Gecko/20100101 Firefox/95.0";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build HTTP client: {source}")]
    HttpClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {source_name}: {source}")]
    Request {
        source_name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to fetch {source_name}: HTTP {status}")]
    Status { source_name: String, status: u16 },

    #[error("failed to read {source_name}: {source}")]
    Read {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {source_name}: {source}")]
    Parse {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl LoadError {
    /// True for transport and storage failures, false for malformed bodies.
    pub fn is_fetch(&self) -> bool {
        !matches!(self, Self::Parse { .. })
    }

    /// The path or URL that failed, when one was involved.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            Self::HttpClientBuild { .. } => None,
            Self::Request { source_name, .. }
            | Self::Status { source_name, .. }
            | Self::Read { source_name, .. }
            | Self::Parse { source_name, .. } => Some(source_name.as_str()),
        }
    }
}

/// Where the certificate document lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(String),
}

impl Source {
    pub fn parse(value: &str) -> Self {
        let trimmed = value.trim();
        match reqwest::Url::parse(trimmed) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                Self::Url(trimmed.to_string())
            }
            _ => Self::Path(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(s) | Self::Path(s) => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    pub timeout: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

/// Decodes a document body into records.
///
/// The body must be a JSON array of objects; individual entries are lenient
/// about missing fields.
pub fn parse_records(source_name: &str, body: &[u8]) -> Result<Vec<CertificateRecord>, LoadError> {
    serde_json::from_slice::<Vec<CertificateRecord>>(body).map_err(|e| LoadError::Parse {
        source_name: source_name.to_string(),
        source: e,
    })
}

fn build_client(options: &LoaderOptions) -> Result<reqwest::Client, LoadError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::USER_AGENT,
        reqwest::header::HeaderValue::from_static(USER_AGENT),
    );
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(options.timeout)
        .build()
        .map_err(|e| LoadError::HttpClientBuild { source: e })
}

async fn fetch_url(url: &str, options: &LoaderOptions) -> Result<Vec<u8>, LoadError> {
    let client = build_client(options)?;
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| LoadError::Request {
            source_name: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            source_name: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|e| LoadError::Request {
        source_name: url.to_string(),
        source: e,
    })?;
    Ok(body.to_vec())
}

async fn read_path(path: &str) -> Result<Vec<u8>, LoadError> {
    tokio::fs::read(path).await.map_err(|e| LoadError::Read {
        source_name: path.to_string(),
        source: e,
    })
}

/// Fetches the document once and decodes it. No retries.
pub async fn load(
    source: &Source,
    options: &LoaderOptions,
) -> Result<Vec<CertificateRecord>, LoadError> {
    let body = match source {
        Source::Url(url) => fetch_url(url, options).await?,
        Source::Path(path) => read_path(path).await?,
    };
    debug!(source = source.as_str(), bytes = body.len(), "document fetched");
    let records = parse_records(source.as_str(), &body)?;
    debug!(records = records.len(), "document decoded");
    Ok(records)
}
