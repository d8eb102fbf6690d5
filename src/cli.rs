//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// Policyscope - chart-ready reports for data-governance policy services
///
/// Fetch policy records from a governance service, aggregate them into
/// chart view models, and write a Markdown/JSON report with SVG charts.
///
/// Examples:
///   policyscope
///   policyscope --policy bb69a22d-0d7c-46a2-b2f0-78a420878516
///   policyscope --endpoint http://policies.internal:8080 --format json
///   policyscope --dry-run
///   policyscope --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the policy service
    ///
    /// The service must expose `GET /v2/policy` and `GET /v2/policy/{id}`.
    /// Default: `[api].endpoint` from config, or http://localhost:8080.
    #[arg(short, long, env = "POLICYSCOPE_ENDPOINT", value_name = "URL")]
    pub endpoint: Option<String>,

    /// Identifier of the policy to detail in the report
    ///
    /// Fetched independently of the list; it does not have to be a member
    /// of the list. Falls back to `default_policy` from the config file.
    #[arg(short, long, env = "POLICYSCOPE_POLICY", value_name = "ID")]
    pub policy: Option<String>,

    /// Output file path for the report
    ///
    /// Default: `[general].output` from config, or policy_report.md.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Directory for exported chart artifacts
    ///
    /// Default: `[charts].dir` from config, or charts.
    #[arg(long, value_name = "DIR")]
    pub charts_dir: Option<PathBuf>,

    /// Skip rendering and exporting charts
    #[arg(long)]
    pub no_charts: bool,

    /// Request timeout in seconds
    ///
    /// Default: from config or 30s.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .policyscope.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: fetch and list policies without writing report or charts
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .policyscope.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Validate endpoint URL format
        if let Some(ref endpoint) = self.endpoint {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err("Endpoint URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate the policy id if provided
        if let Some(ref id) = self.policy {
            if id.trim().is_empty() {
                return Err("Policy id must not be empty".to_string());
            }
            if id.contains('/') || id.contains(char::is_whitespace) {
                return Err("Policy id must not contain slashes or whitespace".to_string());
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            endpoint: Some("http://localhost:8080".to_string()),
            policy: None,
            output: None,
            format: OutputFormat::Markdown,
            charts_dir: None,
            no_charts: false,
            timeout: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_defaults() {
        assert!(make_args().validate().is_ok());
    }

    #[test]
    fn test_validation_invalid_endpoint() {
        let mut args = make_args();
        args.endpoint = Some("localhost:8080".to_string());
        assert!(args.validate().is_err());

        // Absent endpoint falls back to config and is fine.
        args.endpoint = None;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_bad_policy_id() {
        let mut args = make_args();
        args.policy = Some("".to_string());
        assert!(args.validate().is_err());

        args.policy = Some("a/b".to_string());
        assert!(args.validate().is_err());

        args.policy = Some("bb69a22d-0d7c-46a2-b2f0-78a420878516".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut args = make_args();
        args.timeout = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
