//! Core traits for Vitrin configuration abstraction.
//!
//! The primary trait is [`ConfigProvider`], which abstracts the settings the
//! page controller needs: where the document comes from, the localized
//! fallback messages, and progressive image timing.

use std::time::Duration;

/// Default "no content" message (Turkish, as shipped).
pub const DEFAULT_EMPTY_MESSAGE: &str = "İçerik bulunamadı.";

/// Default "failed to load" message (Turkish, as shipped).
pub const DEFAULT_LOAD_FAILED_MESSAGE: &str = "İçerik yüklenemedi.";

/// Default cross-fade duration.
pub const DEFAULT_FADE: Duration = Duration::from_millis(450);

/// Default safety timeout for the cross-fade.
pub const DEFAULT_SAFETY_TIMEOUT: Duration = Duration::from_millis(900);

/// Trait for page configuration.
///
/// # Bounds
///
/// - `Send + Sync`: Configuration must be shareable across threads
/// - `Clone`: Configuration can be duplicated for passing to subsystems
/// - `'static`: Configuration lifetime is not borrowed
///
/// # Example
///
/// ```
/// use vitrin_core::traits::ConfigProvider;
///
/// #[derive(Clone)]
/// struct Preview;
///
/// impl ConfigProvider for Preview {
///     fn project_name(&self) -> &str {
///         "preview"
///     }
///
///     fn source_location(&self) -> &str {
///         "landing.md"
///     }
/// }
///
/// assert_eq!(Preview.empty_message(), "İçerik bulunamadı.");
/// ```
pub trait ConfigProvider: Send + Sync + Clone + 'static {
    /// The project name, used for logging and env var prefixes.
    fn project_name(&self) -> &str;

    /// URL or path of the landing document.
    fn source_location(&self) -> &str;

    /// Whether the fetch should bypass caches.
    fn no_cache(&self) -> bool {
        true
    }

    /// Message shown when the document has no sections.
    fn empty_message(&self) -> &str {
        DEFAULT_EMPTY_MESSAGE
    }

    /// Message shown when the document cannot be fetched.
    fn load_failed_message(&self) -> &str {
        DEFAULT_LOAD_FAILED_MESSAGE
    }

    /// Duration of the progressive image cross-fade.
    fn fade_duration(&self) -> Duration {
        DEFAULT_FADE
    }

    /// Upper bound on waiting for the cross-fade to report completion.
    fn safety_timeout(&self) -> Duration {
        DEFAULT_SAFETY_TIMEOUT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct TestConfig;

    impl ConfigProvider for TestConfig {
        fn project_name(&self) -> &str {
            "test"
        }

        fn source_location(&self) -> &str {
            "https://example.com/landing.md"
        }
    }

    #[test]
    fn test_defaults() {
        let config = TestConfig;
        assert!(config.no_cache());
        assert_eq!(config.empty_message(), DEFAULT_EMPTY_MESSAGE);
        assert_eq!(config.load_failed_message(), DEFAULT_LOAD_FAILED_MESSAGE);
        assert_eq!(config.fade_duration(), Duration::from_millis(450));
        assert_eq!(config.safety_timeout(), Duration::from_millis(900));
    }

    #[test]
    fn test_config_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TestConfig>();
    }
}
