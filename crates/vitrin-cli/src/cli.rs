//! CLI argument parsing and command definitions.

use clap::{Parser, Subcommand};

// ============================================================================
// CLI argument types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "vitrin", author, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file.
    #[arg(short, long, env = "VITRIN_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-essential output.
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Option<BaseCommand>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum BaseCommand {
    /// Run one load cycle and print the rendered page.
    Render {
        /// Landing document URL or path (overrides `source.url`).
        #[arg(short, long)]
        source: Option<String>,

        /// Write the page to this file instead of stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Fetch and decode the landing document, printing its metadata as JSON.
    Parse {
        /// Landing document URL or path (overrides `source.url`).
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Print version information.
    Version,

    /// Inspect or seed the configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// `vitrin config` actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path.
    Path,

    /// Print the effective value of a setting (e.g. `images.fade_ms`).
    Get { key: String },

    /// Write a default config file.
    Init {
        /// Output file path (defaults to the XDG config path).
        #[arg(short, long)]
        file: Option<String>,

        /// Landing document the new config points at.
        #[arg(short, long)]
        source: Option<String>,

        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },

    /// Print the `VITRIN_*` variables that reproduce the effective config.
    Export,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_args_default() {
        let args = CliArgs::parse_from(["vitrin"]);
        assert!(!args.verbose);
        assert!(!args.quiet);
        assert!(args.command.is_none());
    }

    #[test]
    fn test_cli_args_flags() {
        let args = CliArgs::parse_from(["vitrin", "-v", "--config", "/tmp/c.toml"]);
        assert!(args.verbose);
        assert_eq!(args.config.as_deref(), Some("/tmp/c.toml"));

        let args = CliArgs::parse_from(["vitrin", "--quiet"]);
        assert!(args.quiet);
    }

    // ------------------------------------------------------------------------
    // Page commands
    // ------------------------------------------------------------------------

    #[test]
    fn test_render_command() {
        let args = CliArgs::parse_from(["vitrin", "render"]);
        match args.command {
            Some(BaseCommand::Render { source, output }) => {
                assert!(source.is_none());
                assert!(output.is_none());
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_render_command_with_source_and_output() {
        let args = CliArgs::parse_from([
            "vitrin",
            "render",
            "--source",
            "https://shop.example/landing.md",
            "-o",
            "index.html",
        ]);
        match args.command {
            Some(BaseCommand::Render { source, output }) => {
                assert_eq!(source.as_deref(), Some("https://shop.example/landing.md"));
                assert_eq!(output.as_deref(), Some("index.html"));
            }
            _ => panic!("Expected Render command"),
        }
    }

    #[test]
    fn test_parse_command() {
        let args = CliArgs::parse_from(["vitrin", "parse", "-s", "landing.json"]);
        match args.command {
            Some(BaseCommand::Parse { source }) => {
                assert_eq!(source.as_deref(), Some("landing.json"));
            }
            _ => panic!("Expected Parse command"),
        }
    }

    #[test]
    fn test_version_command() {
        let args = CliArgs::parse_from(["vitrin", "version"]);
        assert!(matches!(args.command, Some(BaseCommand::Version)));
    }

    // ------------------------------------------------------------------------
    // Config commands
    // ------------------------------------------------------------------------

    #[test]
    fn test_config_get_command() {
        let args = CliArgs::parse_from(["vitrin", "config", "get", "images.fade_ms"]);
        match args.command {
            Some(BaseCommand::Config {
                action: ConfigAction::Get { key },
            }) => assert_eq!(key, "images.fade_ms"),
            _ => panic!("Expected Config Get command"),
        }
    }

    #[test]
    fn test_config_init_with_source() {
        let args = CliArgs::parse_from([
            "vitrin",
            "config",
            "init",
            "--source",
            "https://shop.example/landing.md",
            "--force",
        ]);
        match args.command {
            Some(BaseCommand::Config {
                action: ConfigAction::Init { file, source, force },
            }) => {
                assert!(file.is_none());
                assert_eq!(source.as_deref(), Some("https://shop.example/landing.md"));
                assert!(force);
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_config_export_command() {
        let args = CliArgs::parse_from(["vitrin", "config", "export"]);
        assert!(matches!(
            args.command,
            Some(BaseCommand::Config {
                action: ConfigAction::Export
            })
        ));
    }
}
