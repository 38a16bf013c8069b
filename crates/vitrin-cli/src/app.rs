//! The `vitrin` application.
//!
//! Wires configuration, the host shell, a document source, and the
//! progressive upgrader into a [`PageController`] and runs commands.

use std::path::Path;
use std::rc::Rc;

use tracing_subscriber::EnvFilter;
use vitrin_content::parse_payload;
use vitrin_core::traits::ConfigProvider;
use vitrin_core::{Error, Result};
use vitrin_dom::{
    History, ImageLoader, PageContext, ProgressiveUpgrader, SharedDocument, landing_shell,
};

use crate::cli::{BaseCommand, CliArgs};
use crate::config::{VitrinConfig, page_url_for};
use crate::config_handlers;
use crate::controller::{LoadOutcome, PageController};
use crate::preload::{HttpImageLoader, NoopImageLoader};
use crate::source::source_for;

// ============================================================================
// VitrinCli
// ============================================================================

/// The CLI application.
pub struct VitrinCli {
    name: String,
    config: VitrinConfig,
    version: String,
}

impl VitrinCli {
    /// Create from CLI args, loading config from file/env.
    pub fn from_args(name: impl Into<String>, args: &CliArgs) -> Result<Self> {
        let config = VitrinConfig::load(args.config.as_deref())?;
        Ok(Self::new(name, config))
    }

    pub fn new(name: impl Into<String>, config: VitrinConfig) -> Self {
        Self {
            name: name.into(),
            config,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Override the version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn config(&self) -> &VitrinConfig {
        &self.config
    }

    /// Initialise tracing-based logging.
    ///
    /// Uses `RUST_LOG` env var if set, otherwise defaults based on verbosity flags.
    /// Library crates log through `log`; the subscriber picks those records up.
    pub fn init_logging(&self, verbose: bool, quiet: bool) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else if quiet {
            EnvFilter::new("warn")
        } else if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        };

        // Ignore error if a subscriber is already set (e.g. in tests).
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }

    /// Run the CLI with the given arguments.
    pub async fn run(&self, args: CliArgs) -> Result<()> {
        self.init_logging(args.verbose, args.quiet);

        match args.command {
            Some(BaseCommand::Render { source, output }) => {
                let html = self.render_page(source.as_deref()).await?;
                match output {
                    Some(path) => write_output(Path::new(&path), &html).await,
                    None => {
                        println!("{html}");
                        Ok(())
                    }
                }
            }
            Some(BaseCommand::Parse { source }) => {
                let json = self.parse_document(source.as_deref()).await?;
                println!("{json}");
                Ok(())
            }
            Some(BaseCommand::Version) => {
                println!("{} {}", self.name, self.version);
                Ok(())
            }
            Some(BaseCommand::Config { action }) => {
                config_handlers::handle_config_command(args.config.as_deref(), action)
            }
            None => {
                println!("{} {} (use --help for usage)", self.name, self.version);
                Ok(())
            }
        }
    }

    /// Run one load cycle against the default host shell and return the
    /// page HTML once every image upgrade has settled.
    ///
    /// A fetch failure still yields the page with the failure message.
    pub async fn render_page(&self, source: Option<&str>) -> Result<String> {
        let (doc, outcome) = self.load_page(source).await?;
        if let LoadOutcome::Failed(e) = &outcome {
            tracing::warn!("rendered failure page: {e}");
        }
        let html = doc.borrow().to_html();
        Ok(html)
    }

    /// Build the page, run the controller, and settle image upgrades.
    pub async fn load_page(&self, source: Option<&str>) -> Result<(SharedDocument, LoadOutcome)> {
        let location = source.unwrap_or(self.config.source_location());
        let page_url = match (&self.config.page_url, source) {
            (Some(_), _) => self.config.resolve_page_url()?,
            (None, Some(location)) => page_url_for(location)?,
            (None, None) => self.config.resolve_page_url()?,
        };

        let doc = landing_shell(self.config.project_name())?.into_shared();
        let page = PageContext::new(SharedDocument::clone(&doc));

        let loader: Rc<dyn ImageLoader> = if self.config.images.preload {
            Rc::new(HttpImageLoader::new(page_url.clone()))
        } else {
            Rc::new(NoopImageLoader)
        };
        let upgrader = ProgressiveUpgrader::new(page.shared(), loader)
            .with_environment(Rc::new(self.config.display_flags()))
            .with_fade(self.config.fade_duration())
            .with_safety_timeout(self.config.safety_timeout());

        let mut controller = PageController::new(
            source_for(location, self.config.no_cache()),
            self.config.clone(),
            page,
            upgrader,
            History::new(page_url),
        );

        let outcome = controller.load().await;
        let outcomes = controller.settle().await;
        tracing::info!(
            "{}: {} image upgrade(s) settled",
            self.name,
            outcomes.len()
        );
        Ok((doc, outcome))
    }

    /// Fetch and decode the document, returning its metadata as pretty JSON.
    pub async fn parse_document(&self, source: Option<&str>) -> Result<String> {
        let location = source.unwrap_or(self.config.source_location());
        let raw = source_for(location, self.config.no_cache())
            .fetch()
            .await?;
        let parsed = parse_payload(&raw);
        tracing::debug!("decoded {location} as {:?}", parsed.format);
        serde_json::to_string_pretty(&parsed.metadata).map_err(|e| Error::decode(e.to_string()))
    }
}

async fn write_output(path: &Path, html: &str) -> Result<()> {
    tokio::fs::write(path, html)
        .await
        .map_err(|e| Error::io_with_path(e, path))?;
    tracing::info!("wrote {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    use crate::config::{DisplayConfig, SourceConfig};

    fn write_landing(dir: &tempfile::TempDir, body: &str) -> String {
        let path = dir.path().join("landing.md");
        std::fs::write(&path, body).unwrap();
        path.to_str().unwrap().to_string()
    }

    fn cli_for(location: &str) -> VitrinCli {
        let config = VitrinConfig {
            source: SourceConfig {
                url: location.to_string(),
                no_cache: true,
            },
            ..Default::default()
        };
        VitrinCli::new("vitrin", config).with_version("0.1.0")
    }

    #[test]
    fn test_vitrin_cli_new() {
        let cli = VitrinCli::new("vitrin", VitrinConfig::default());
        assert_eq!(cli.name, "vitrin");
        assert_eq!(cli.config().project_name(), "vitrin");
    }

    #[test]
    fn test_init_logging_levels() {
        let cli = VitrinCli::new("vitrin", VitrinConfig::default());
        cli.init_logging(false, false);
        cli.init_logging(true, false);
        cli.init_logging(false, true);
    }

    // ------------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------------

    #[tokio::test]
    async fn test_run_version_and_no_command() {
        let cli = cli_for("landing.md");
        assert!(cli.run(CliArgs::parse_from(["vitrin", "version"])).await.is_ok());
        assert!(cli.run(CliArgs::parse_from(["vitrin"])).await.is_ok());
    }

    #[tokio::test]
    async fn test_run_render_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let source = write_landing(&dir, "contact:\n  email: info@example.com\n");
        let out = dir.path().join("index.html");

        let cli = cli_for(&source);
        let args = CliArgs::parse_from(["vitrin", "render", "-o", out.to_str().unwrap()]);
        cli.run(args).await.unwrap();

        let html = std::fs::read_to_string(&out).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("href=\"mailto:info@example.com\""));
        assert!(html.contains("İçerik bulunamadı."));
    }

    #[tokio::test]
    async fn test_render_page_missing_source_shows_failure() {
        let cli = cli_for("/nonexistent/landing.md");
        let html = cli.render_page(None).await.unwrap();
        assert!(html.contains("İçerik yüklenemedi."));
    }

    #[tokio::test]
    async fn test_load_page_upgrades_local_images() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"jpeg").unwrap();
        let source = write_landing(
            &dir,
            "sections:\n  - figure:\n      light: b.jpg\n      small-light: a.jpg\n  \
             - figure:\n      light: missing.jpg\n      small-light: c.jpg\n",
        );

        let cli = cli_for(&source);
        let (doc, outcome) = cli.load_page(None).await.unwrap();
        assert!(outcome.is_rendered());

        let html = doc.borrow().to_html();
        assert!(html.contains("src=\"b.jpg\""));
        assert!(!html.contains("src=\"a.jpg\""));
        assert!(html.contains("src=\"c.jpg\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_page_visible_cross_fade_settles() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"jpeg").unwrap();
        let source = write_landing(
            &dir,
            "sections:\n  - figure:\n      light: b.jpg\n      small-light: a.jpg\n",
        );

        let mut cli = cli_for(&source);
        cli.config.display = DisplayConfig {
            hidden: false,
            ..Default::default()
        };
        let (doc, _) = cli.load_page(None).await.unwrap();
        let html = doc.borrow().to_html();
        assert!(html.contains("src=\"b.jpg\""));
        assert!(!html.contains("data-progressive-overlay"));
    }

    #[tokio::test]
    async fn test_parse_document_json() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("landing.json");
        std::fs::write(&path, r#"{"meta": {"contact": {"phone": "905320000000"}}}"#).unwrap();

        let cli = cli_for("unused");
        let json = cli.parse_document(path.to_str()).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["contact"]["phone"], "905320000000");
    }

    #[tokio::test]
    async fn test_parse_document_missing_is_error() {
        let cli = cli_for("/nonexistent/landing.md");
        let err = cli.parse_document(None).await.unwrap_err();
        assert!(err.is_fetch());
    }
}
