//! Remote media fetching for upload-from-URL.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use url::Url;

use super::upload::{mime_essence, URL_MIME_TYPES};
use crate::{MediaboxError, Result};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// User agent string for fetches.
const USER_AGENT: &str = concat!("mediabox/", env!("CARGO_PKG_VERSION"));

/// A file downloaded from a URL.
#[derive(Debug, Clone)]
pub struct FetchedFile {
    /// Name derived from the URL.
    pub original_name: String,
    /// MIME type reported by the server.
    pub mime_type: String,
    /// Downloaded bytes.
    pub content: Vec<u8>,
}

/// Downloads images and videos over HTTP.
#[derive(Debug, Clone)]
pub struct UrlFetcher {
    client: Client,
    max_bytes: u64,
}

impl UrlFetcher {
    /// Create a fetcher with a total timeout and a size limit.
    pub fn new(timeout: Duration, max_bytes: u64) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MediaboxError::Fetch(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client, max_bytes })
    }

    /// Fetch a URL. Only image and video responses are accepted.
    pub async fn fetch(&self, raw_url: &str) -> Result<FetchedFile> {
        let url = validate_url(raw_url)?;

        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| MediaboxError::Fetch(format!("failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(MediaboxError::Fetch(format!(
                "{url} returned HTTP {}",
                response.status()
            )));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(mime_essence)
            .unwrap_or_default();
        if !URL_MIME_TYPES.contains(&mime_type.as_str()) {
            return Err(MediaboxError::Validation(
                "Invalid file type from URL".to_string(),
            ));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes {
                return Err(self.too_large(length));
            }
        }

        let mut content = Vec::new();
        while let Some(chunk) = response.chunk().await? {
            content.extend_from_slice(&chunk);
            if content.len() as u64 > self.max_bytes {
                return Err(self.too_large(content.len() as u64));
            }
        }

        let original_name = file_name_from_url(&url, &mime_type);
        tracing::debug!(url = %url, mime = %mime_type, size = content.len(), "Fetched remote file");

        Ok(FetchedFile {
            original_name,
            mime_type,
            content,
        })
    }

    fn too_large(&self, size: u64) -> MediaboxError {
        MediaboxError::Validation(format!(
            "remote file is too large: {size} bytes (max {} bytes)",
            self.max_bytes
        ))
    }
}

/// Parse a URL and require an http or https scheme.
pub fn validate_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| MediaboxError::Validation(format!("invalid URL: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(MediaboxError::Validation(format!(
            "unsupported URL scheme: {scheme}"
        ))),
    }
}

/// Derive a filename from the last URL path segment.
///
/// Falls back to `download-<millis>`; a name without a dot gets `.mp4`
/// for videos and `.jpg` otherwise.
pub fn file_name_from_url(url: &Url, mime_type: &str) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|s| {
            urlencoding::decode(s)
                .map(|d| d.into_owned())
                .unwrap_or_else(|_| s.to_string())
        })
        .filter(|s| !s.is_empty() && !s.contains(['/', '\\']));

    let name = segment
        .unwrap_or_else(|| format!("download-{}", chrono::Utc::now().timestamp_millis()));

    if name.contains('.') {
        name
    } else if mime_type.starts_with("video/") {
        format!("{name}.mp4")
    } else {
        format!("{name}.jpg")
    }
}
