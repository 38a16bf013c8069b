//! Landing document sources.
//!
//! The page controller fetches its document once per load through a
//! [`DocumentSource`]. HTTP and file sources cover the binary; the static
//! source feeds tests and previews.

use std::path::PathBuf;

use async_trait::async_trait;
use reqwest::header::CACHE_CONTROL;
use vitrin_core::{Error, Result};

use crate::config::is_http;

/// Something the landing document can be fetched from.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Human-readable location, for logs.
    fn location(&self) -> &str;

    /// Fetch the raw document text.
    async fn fetch(&self) -> Result<String>;
}

#[async_trait]
impl<S: DocumentSource + ?Sized> DocumentSource for Box<S> {
    fn location(&self) -> &str {
        (**self).location()
    }

    async fn fetch(&self) -> Result<String> {
        (**self).fetch().await
    }
}

// ============================================================================
// HTTP
// ============================================================================

/// Fetches the document with a GET request.
pub struct HttpSource {
    url: String,
    no_cache: bool,
    client: reqwest::Client,
}

impl HttpSource {
    /// Create a source for `url`. With `no_cache` the request asks
    /// intermediaries to revalidate.
    pub fn new(url: impl Into<String>, no_cache: bool) -> Self {
        Self {
            url: url.into(),
            no_cache,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch(&self) -> Result<String> {
        let mut request = self.client.get(&self.url);
        if self.no_cache {
            request = request.header(CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::fetch(format!("{}: {e}", self.url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::fetch_status(
                status.as_u16(),
                format!("{} returned {status}", self.url),
            ));
        }

        response
            .text()
            .await
            .map_err(|e| Error::fetch(format!("failed to read {}: {e}", self.url)))
    }
}

// ============================================================================
// File
// ============================================================================

/// Reads the document from the local filesystem.
pub struct FileSource {
    location: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            location: path.display().to_string(),
            path,
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    fn location(&self) -> &str {
        &self.location
    }

    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::fetch(format!("{}: {e}", self.location)))
    }
}

// ============================================================================
// Static
// ============================================================================

/// An in-memory document, or a canned failure.
pub struct StaticSource {
    body: std::result::Result<String, u16>,
}

impl StaticSource {
    /// Serve `body` on every fetch.
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Ok(body.into()),
        }
    }

    /// Fail every fetch with an HTTP `status`.
    pub fn failing(status: u16) -> Self {
        Self { body: Err(status) }
    }
}

#[async_trait]
impl DocumentSource for StaticSource {
    fn location(&self) -> &str {
        "static"
    }

    async fn fetch(&self) -> Result<String> {
        match &self.body {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(Error::fetch_status(*status, "static source")),
        }
    }
}

/// Pick a source for a location: HTTP for `http(s)://`, a file otherwise.
pub fn source_for(location: &str, no_cache: bool) -> Box<dyn DocumentSource> {
    if is_http(location) {
        Box::new(HttpSource::new(location, no_cache))
    } else {
        Box::new(FileSource::new(location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_source_reads_document() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("landing.md");
        std::fs::write(&path, "---\nsections: []\n---\n").unwrap();

        let source = FileSource::new(&path);
        assert_eq!(source.fetch().await.unwrap(), "---\nsections: []\n---\n");
        assert!(source.location().ends_with("landing.md"));
    }

    #[tokio::test]
    async fn test_file_source_missing_is_fetch_error() {
        let source = FileSource::new("/nonexistent/landing.md");
        let err = source.fetch().await.unwrap_err();
        assert!(err.is_fetch());
    }

    #[tokio::test]
    async fn test_static_source() {
        assert_eq!(StaticSource::new("{}").fetch().await.unwrap(), "{}");
        let err = StaticSource::failing(404).fetch().await.unwrap_err();
        assert!(matches!(err, Error::Fetch { status: Some(404), .. }));
    }

    #[tokio::test]
    async fn test_boxed_source_delegates() {
        let source: Box<dyn DocumentSource> = Box::new(StaticSource::new("x"));
        assert_eq!(source.location(), "static");
        assert_eq!(source.fetch().await.unwrap(), "x");
    }

    #[test]
    fn test_source_for_picks_by_scheme() {
        assert_eq!(
            source_for("https://shop.example/landing.md", true).location(),
            "https://shop.example/landing.md"
        );
        assert_eq!(source_for("content/landing.md", true).location(), "content/landing.md");
    }
}
