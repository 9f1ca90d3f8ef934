use std::path::PathBuf;

use clap::{Args, ValueHint, builder::BoolishValueParser};

/// Flags shared by every command; each one overrides the matching setting.
#[derive(Debug, Args, Default, Clone)]
pub struct GlobalArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "HACKERTHINK_CONFIG_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub config_file: Option<PathBuf>,

    /// Base URL of the site serving `/api/admin`.
    #[arg(long = "api-url", env = "HACKERTHINK_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Read the session token from a file.
    #[arg(
        long = "token-file",
        env = "HACKERTHINK_TOKEN_FILE",
        value_name = "PATH",
        value_hint = ValueHint::FilePath,
        global = true
    )]
    pub token_file: Option<PathBuf>,

    /// Session token forwarded as a bearer `Authorization` header.
    #[arg(
        long = "token",
        env = "HACKERTHINK_SESSION_TOKEN",
        hide_env_values = true,
        value_name = "TOKEN",
        global = true
    )]
    pub token: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    pub log_json: Option<bool>,

    /// IANA timezone used for date presets and "this month" statistics.
    #[arg(long = "timezone", value_name = "TZ", global = true)]
    pub timezone: Option<String>,

    /// Default rows per page (10, 20, 30, 50, 100 or 500).
    #[arg(long = "page-size", value_name = "COUNT", global = true)]
    pub page_size: Option<usize>,
}
