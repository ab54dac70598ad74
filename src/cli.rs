//! Command-line argument parsing for QueryDesk.

use crate::config::Config;
use crate::error::{DeskError, Result};
use crate::tui::headless::{parse_size, OutputFormat};
use clap::Parser;
use std::path::PathBuf;

/// A terminal client for running SQL and asking questions about your data.
#[derive(Parser, Debug)]
#[command(name = "querydesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the query/AI service (e.g., http://localhost:8000)
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Config file path
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Use the built-in mock backend instead of the HTTP service
    #[arg(long)]
    pub mock: bool,

    // === Headless mode options ===
    /// Run in headless mode (no terminal UI, for testing/automation)
    #[arg(long)]
    pub headless: bool,

    /// Comma-separated events to execute in headless mode (e.g., "type:SELECT 1,key:ctrl+r")
    #[arg(long, value_name = "EVENTS")]
    pub events: Option<String>,

    /// Path to script file with events (use "-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub script: Option<String>,

    /// Screen size for headless mode (WIDTHxHEIGHT, e.g., "80x24")
    #[arg(long, value_name = "SIZE", default_value = "80x24")]
    pub size: String,

    /// Output format for headless mode: text, json or frames
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    pub output: String,

    /// Write output to file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop on first assertion failure
    #[arg(long)]
    pub fail_fast: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the --config argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Loads the config file and applies the API URL override chain.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from_file(&self.config_path())?;
        config.apply_api_url_override(self.api_url.as_deref());
        Ok(config)
    }

    pub fn is_headless(&self) -> bool {
        self.headless
    }

    /// Parses the --size argument into (width, height).
    pub fn parse_screen_size(&self) -> Result<(u16, u16)> {
        let (width, height) = parse_size(&self.size)?;
        if width == 0 || height == 0 {
            return Err(DeskError::config(format!(
                "Invalid size: '{}'. Width and height must be positive",
                self.size
            )));
        }
        Ok((width, height))
    }

    /// Parses the --output argument.
    pub fn parse_output_format(&self) -> Result<OutputFormat> {
        self.output.parse()
    }

    /// Validates headless mode arguments.
    pub fn validate_headless(&self) -> Result<()> {
        if !self.headless {
            return Ok(());
        }

        if self.events.is_none() && self.script.is_none() {
            return Err(DeskError::config("--headless requires --events or --script"));
        }

        self.parse_screen_size()?;
        self.parse_output_format()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_args(args: &[&str]) -> Cli {
        Cli::parse_from(args)
    }

    #[test]
    fn test_defaults() {
        let cli = parse_args(&["querydesk"]);
        assert!(cli.api_url.is_none());
        assert!(!cli.mock);
        assert!(!cli.headless);
        assert_eq!(cli.size, "80x24");
        assert_eq!(cli.output, "text");
    }

    #[test]
    fn test_parse_api_url() {
        let cli = parse_args(&["querydesk", "--api-url", "http://db.internal:9000"]);
        assert_eq!(cli.api_url.as_deref(), Some("http://db.internal:9000"));
    }

    #[test]
    fn test_config_path_override() {
        let cli = parse_args(&["querydesk", "--config", "/tmp/querydesk.toml"]);
        assert_eq!(cli.config_path(), PathBuf::from("/tmp/querydesk.toml"));
    }

    #[test]
    fn test_config_path_default() {
        let cli = parse_args(&["querydesk"]);
        assert_eq!(cli.config_path(), Config::default_path());
    }

    #[test]
    fn test_load_config_applies_cli_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nbase_url = \"http://from-file:8000\"\n").unwrap();

        let cli = parse_args(&[
            "querydesk",
            "--config",
            path.to_str().unwrap(),
            "--api-url",
            "http://from-cli:8000",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.api.base_url, "http://from-cli:8000");
    }

    #[test]
    fn test_parse_headless_flags() {
        let cli = parse_args(&[
            "querydesk",
            "--headless",
            "--mock",
            "--events",
            "type:SELECT 1,key:ctrl+r",
            "--size",
            "120x40",
            "--output",
            "json",
            "--fail-fast",
        ]);

        assert!(cli.is_headless());
        assert!(cli.mock);
        assert_eq!(cli.events.as_deref(), Some("type:SELECT 1,key:ctrl+r"));
        assert_eq!(cli.parse_screen_size().unwrap(), (120, 40));
        assert_eq!(cli.parse_output_format().unwrap(), OutputFormat::Json);
        assert!(cli.fail_fast);
    }

    #[test]
    fn test_parse_screen_size_invalid() {
        for size in ["80", "axb", "0x24"] {
            let cli = parse_args(&["querydesk", "--size", size]);
            assert!(cli.parse_screen_size().is_err(), "{size} should be rejected");
        }
    }

    #[test]
    fn test_validate_headless_requires_events() {
        let cli = parse_args(&["querydesk", "--headless"]);
        let err = cli.validate_headless().unwrap_err();
        assert!(err.to_string().contains("--events or --script"));

        let cli = parse_args(&["querydesk", "--headless", "--script", "-"]);
        assert!(cli.validate_headless().is_ok());
    }

    #[test]
    fn test_validate_headless_rejects_bad_output() {
        let cli = parse_args(&[
            "querydesk",
            "--headless",
            "--events",
            "key:f2",
            "--output",
            "xml",
        ]);
        assert!(cli.validate_headless().is_err());
    }

    #[test]
    fn test_validate_skipped_outside_headless() {
        let cli = parse_args(&["querydesk", "--output", "xml"]);
        assert!(cli.validate_headless().is_ok());
    }
}
