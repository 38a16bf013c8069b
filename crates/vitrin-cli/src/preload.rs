//! Image preloaders for the progressive upgrader.

use async_trait::async_trait;
use url::Url;
use vitrin_core::{Error, Result};
use vitrin_dom::ImageLoader;

/// Probes image URLs the way a browser `Image()` would: the preload
/// succeeds when the resource can be retrieved.
///
/// Relative URLs resolve against the page URL. `http(s)` URLs are fetched
/// with a GET (any 2xx succeeds); `file` URLs must name an existing file.
pub struct HttpImageLoader {
    base: Url,
    client: reqwest::Client,
}

impl HttpImageLoader {
    pub fn new(base: Url) -> Self {
        Self {
            base,
            client: reqwest::Client::new(),
        }
    }

    /// Resolve an image URL against the page.
    pub fn resolve(&self, url: &str) -> Result<Url> {
        self.base
            .join(url)
            .map_err(|e| Error::preload(url, format!("cannot resolve against {}: {e}", self.base)))
    }
}

#[async_trait(?Send)]
impl ImageLoader for HttpImageLoader {
    async fn preload(&self, url: &str) -> Result<()> {
        let resolved = self.resolve(url)?;
        match resolved.scheme() {
            "http" | "https" => {
                let response = self
                    .client
                    .get(resolved.clone())
                    .send()
                    .await
                    .map_err(|e| Error::preload(url, e.to_string()))?;
                let status = response.status();
                if status.is_success() {
                    Ok(())
                } else {
                    Err(Error::preload(url, format!("HTTP {}", status.as_u16())))
                }
            }
            "file" => {
                let path = resolved
                    .to_file_path()
                    .map_err(|()| Error::preload(url, "not a local path"))?;
                match tokio::fs::metadata(&path).await {
                    Ok(meta) if meta.is_file() => Ok(()),
                    Ok(_) => Err(Error::preload(url, "not a file")),
                    Err(e) => Err(Error::preload(url, e.to_string())),
                }
            }
            other => Err(Error::preload(url, format!("unsupported scheme '{other}'"))),
        }
    }
}

/// Accepts every URL without probing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopImageLoader;

#[async_trait(?Send)]
impl ImageLoader for NoopImageLoader {
    async fn preload(&self, _url: &str) -> Result<()> {
        Ok(())
    }
}
