//! Configuration for the Vitrin renderer.
//!
//! Provides the [`VitrinConfig`] struct that loads from TOML files,
//! environment variables, and defaults using the `confyg` crate.
//!
//! # Loading Priority
//!
//! 1. Explicit `--config <path>` flag
//! 2. `VITRIN_CONFIG` environment variable
//! 3. XDG default: `~/.config/vitrin/config.toml`
//! 4. Built-in defaults
//!
//! `VITRIN_*` environment variables overlay the loaded values, one
//! variable per key: `VITRIN_SOURCE_URL`, `VITRIN_IMAGES_FADE_MS`, ...
//! The overlay delivers every value as a string, so numeric and boolean
//! settings also accept their string form.

use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use confyg::{Confygery, env};
use serde::{Deserialize, Deserializer, Serialize, de};
use url::Url;
use vitrin_core::traits::{
    ConfigProvider, DEFAULT_EMPTY_MESSAGE, DEFAULT_FADE, DEFAULT_LOAD_FAILED_MESSAGE,
    DEFAULT_SAFETY_TIMEOUT,
};
use vitrin_core::{Error, Result};
use vitrin_dom::DisplayFlags;

// ============================================================================
// Configuration structs
// ============================================================================

/// Main configuration for the Vitrin renderer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitrinConfig {
    /// Project name, used for env var prefixes and the page title.
    pub project_name: String,

    /// Location the page is served from. History entries and relative
    /// image URLs resolve against it. Derived from the source when unset.
    pub page_url: Option<String>,

    /// Where the landing document comes from.
    pub source: SourceConfig,

    /// Localized fallback messages.
    pub messages: MessagesConfig,

    /// Progressive image settings.
    pub images: ImagesConfig,

    /// Display conditions the page renders under.
    pub display: DisplayConfig,
}

/// Landing document source.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// URL or file path of the landing document.
    pub url: String,

    /// Send `Cache-Control: no-cache` when fetching over HTTP.
    #[serde(deserialize_with = "scalar")]
    pub no_cache: bool,
}

/// Fallback messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Shown when the document has no sections.
    pub empty: String,

    /// Shown when the document cannot be fetched.
    pub load_failed: String,
}

/// Progressive image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    /// Cross-fade duration in milliseconds.
    #[serde(deserialize_with = "scalar")]
    pub fade_ms: u64,

    /// Safety timeout for the cross-fade in milliseconds.
    #[serde(deserialize_with = "scalar")]
    pub safety_timeout_ms: u64,

    /// Probe high-resolution URLs before swapping them in. When off every
    /// upgrade is assumed to succeed.
    #[serde(deserialize_with = "scalar")]
    pub preload: bool,
}

/// Display conditions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    #[serde(deserialize_with = "scalar")]
    pub prefers_dark: bool,
    #[serde(deserialize_with = "scalar")]
    pub prefers_reduced_motion: bool,

    /// Render as a hidden document (no cross-fades).
    #[serde(deserialize_with = "scalar")]
    pub hidden: bool,
}

// ============================================================================
// Default implementations
// ============================================================================

impl Default for VitrinConfig {
    fn default() -> Self {
        Self {
            project_name: "vitrin".to_string(),
            page_url: None,
            source: SourceConfig::default(),
            messages: MessagesConfig::default(),
            images: ImagesConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "landing.md".to_string(),
            no_cache: true,
        }
    }
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            empty: DEFAULT_EMPTY_MESSAGE.to_string(),
            load_failed: DEFAULT_LOAD_FAILED_MESSAGE.to_string(),
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            fade_ms: DEFAULT_FADE.as_millis() as u64,
            safety_timeout_ms: DEFAULT_SAFETY_TIMEOUT.as_millis() as u64,
            preload: true,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            prefers_dark: false,
            prefers_reduced_motion: false,
            hidden: true,
        }
    }
}

// ============================================================================
// Config loading
// ============================================================================

impl VitrinConfig {
    /// Load configuration from file, environment, and defaults.
    ///
    /// Loading priority:
    /// 1. Explicit `config_path` (from `--config` flag)
    /// 2. `VITRIN_CONFIG` env var
    /// 3. XDG default: `~/.config/vitrin/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder =
            Confygery::new().map_err(|e| Error::config(format!("config init: {e}")))?;

        if let Some(path) = Self::resolve_config_path(config_path)
            && path.exists()
        {
            builder
                .add_file(&path.to_string_lossy())
                .map_err(|e| Error::config(format!("config file: {e}")))?;
        }

        let mut env_opts = env::Options::with_top_level("VITRIN");
        env_opts.add_section("source");
        env_opts.add_section("messages");
        env_opts.add_section("images");
        env_opts.add_section("display");
        builder
            .add_env(env_opts)
            .map_err(|e| Error::config(format!("config env: {e}")))?;

        let config: Self = builder
            .build()
            .map_err(|e| Error::config(format!("config build: {e}")))?;

        Ok(config)
    }

    /// Resolve the config file path from explicit flag, env var, or XDG default.
    pub fn resolve_config_path(explicit: Option<&str>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(PathBuf::from(path));
        }

        if let Ok(path) = std::env::var("VITRIN_CONFIG") {
            return Some(PathBuf::from(path));
        }

        Self::default_config_path()
    }

    /// Return the XDG default config path.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vitrin").join("config.toml"))
    }

    /// Serialize this config to a pretty-printed TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Every configured leaf setting as a dotted key and its string form.
    /// An unset `page_url` is left out.
    pub fn settings(&self) -> Result<Vec<(String, String)>> {
        let tree = toml::Value::try_from(self).map_err(|e| Error::config(e.to_string()))?;
        let mut out = Vec::new();
        collect_settings(&tree, "", &mut out);
        Ok(out)
    }

    /// The overlay variables that reproduce this config.
    pub fn to_env_vars(&self) -> Result<Vec<(String, String)>> {
        Ok(self
            .settings()?
            .into_iter()
            .map(|(key, value)| (env_var_name(&key), value))
            .collect())
    }

    /// The page location, explicit or derived from the document source.
    ///
    /// An HTTP source is its own page URL; a file source maps to a
    /// `file://` URL of its absolute path.
    pub fn resolve_page_url(&self) -> Result<Url> {
        if let Some(page_url) = self.page_url.as_deref().filter(|u| !u.is_empty()) {
            return Url::parse(page_url)
                .map_err(|e| Error::config(format!("invalid page_url '{page_url}': {e}")));
        }
        page_url_for(&self.source.url)
    }

    /// Initial display conditions for the progressive upgrader.
    pub fn display_flags(&self) -> DisplayFlags {
        DisplayFlags::new(
            self.display.prefers_reduced_motion,
            self.display.prefers_dark,
            self.display.hidden,
        )
    }
}

/// Page URL for a document location.
pub fn page_url_for(location: &str) -> Result<Url> {
    if is_http(location) {
        return Url::parse(location)
            .map_err(|e| Error::config(format!("invalid source url '{location}': {e}")));
    }
    let path = std::path::absolute(Path::new(location)).map_err(|e| Error::io_with_path(e, location))?;
    Url::from_file_path(&path)
        .map_err(|()| Error::config(format!("cannot express {} as a URL", path.display())))
}

/// Overlay variable for a dotted key: `images.fade_ms` is
/// `VITRIN_IMAGES_FADE_MS`.
pub fn env_var_name(key: &str) -> String {
    format!("VITRIN_{}", key.replace('.', "_").to_uppercase())
}

/// Whether a location is fetched over HTTP.
pub fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

// ============================================================================
// ConfigProvider implementation
// ============================================================================

impl ConfigProvider for VitrinConfig {
    fn project_name(&self) -> &str {
        &self.project_name
    }

    fn source_location(&self) -> &str {
        &self.source.url
    }

    fn no_cache(&self) -> bool {
        self.source.no_cache
    }

    fn empty_message(&self) -> &str {
        &self.messages.empty
    }

    fn load_failed_message(&self) -> &str {
        &self.messages.load_failed
    }

    fn fade_duration(&self) -> Duration {
        Duration::from_millis(self.images.fade_ms)
    }

    fn safety_timeout(&self) -> Duration {
        Duration::from_millis(self.images.safety_timeout_ms)
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn collect_settings(value: &toml::Value, prefix: &str, out: &mut Vec<(String, String)>) {
    match value {
        toml::Value::Table(table) => {
            for (key, val) in table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                collect_settings(val, &path, out);
            }
        }
        toml::Value::String(s) => out.push((prefix.to_string(), s.clone())),
        other => out.push((prefix.to_string(), other.to_string())),
    }
}

/// A TOML scalar, or the string the env overlay turned it into.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar<T> {
    Native(T),
    Text(String),
}

fn scalar<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    match Scalar::<T>::deserialize(deserializer)? {
        Scalar::Native(value) => Ok(value),
        Scalar::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid value '{text}': {e}"))),
    }
}

// ============================================================================
// Tests
// ============================================================================
