//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{fs, io, path::Path, path::PathBuf, str::FromStr, time::Duration};

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

use crate::application::listing::{ListOptions, PageSize};

pub use cli::GlobalArgs;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "hackerthink-admin";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_REFETCH_AFTER_SECS: u64 = 300;

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub site: SiteSettings,
    pub logging: LoggingSettings,
    pub listing: ListingSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Public origin used for "view" links; defaults to the API base URL.
    pub public_url: Url,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ListingSettings {
    pub default_page_size: PageSize,
    pub refetch_after: Duration,
    pub timezone: Tz,
}

impl ListingSettings {
    pub fn list_options(&self) -> ListOptions {
        ListOptions {
            page_size: self.default_page_size,
            timezone: self.timezone,
            refetch_after: self.refetch_after,
            ..ListOptions::default()
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("failed to read token file `{}`: {source}", .path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
///
/// The session token resolves from `--token-file`, then `--token` or
/// `HACKERTHINK_SESSION_TOKEN`, then `api.session_token`.
pub fn load(args: &GlobalArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = args.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("HACKERTHINK").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    let file_token = args.token_file.as_deref().map(read_token_file).transpose()?;
    raw.apply_overrides(args, file_token);

    Settings::from_raw(raw)
}

fn read_token_file(path: &Path) -> Result<String, LoadError> {
    let contents = fs::read_to_string(path).map_err(|source| LoadError::TokenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let token = contents.trim();
    if token.is_empty() {
        return Err(LoadError::invalid(
            "api.session_token",
            format!("token file `{}` is empty", path.display()),
        ));
    }
    Ok(token.to_string())
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    site: RawSiteSettings,
    logging: RawLoggingSettings,
    listing: RawListingSettings,
}

impl RawSettings {
    fn apply_overrides(&mut self, args: &GlobalArgs, file_token: Option<String>) {
        if let Some(url) = args.api_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(token) = file_token.or_else(|| args.token.clone()) {
            self.api.session_token = Some(token);
        }
        if let Some(level) = args.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = args.log_json {
            self.logging.json = Some(json);
        }
        if let Some(timezone) = args.timezone.as_ref() {
            self.listing.timezone = Some(timezone.clone());
        }
        if let Some(size) = args.page_size {
            self.listing.default_page_size = Some(size);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            api,
            site,
            logging,
            listing,
        } = raw;

        let api = build_api_settings(api)?;
        let site = build_site_settings(site, &api)?;
        let logging = build_logging_settings(logging)?;
        let listing = build_listing_settings(listing)?;

        Ok(Self {
            api,
            site,
            logging,
            listing,
        })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = non_blank(api.base_url).unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let base_url = parse_http_url(&raw_url)
        .map_err(|reason| LoadError::invalid("api.base_url", reason))?;
    let session_token = non_blank(api.session_token);

    Ok(ApiSettings {
        base_url,
        session_token,
    })
}

fn build_site_settings(
    site: RawSiteSettings,
    api: &ApiSettings,
) -> Result<SiteSettings, LoadError> {
    let public_url = match non_blank(site.public_url) {
        Some(raw) => {
            parse_http_url(&raw).map_err(|reason| LoadError::invalid("site.public_url", reason))?
        }
        None => api.base_url.clone(),
    };
    Ok(SiteSettings { public_url })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_listing_settings(listing: RawListingSettings) -> Result<ListingSettings, LoadError> {
    let default_page_size = match listing.default_page_size {
        Some(size) => PageSize::new(size)
            .map_err(|err| LoadError::invalid("listing.default_page_size", err.to_string()))?,
        None => PageSize::DEFAULT,
    };

    let refetch_secs = listing
        .refetch_after_seconds
        .unwrap_or(DEFAULT_REFETCH_AFTER_SECS);
    if refetch_secs == 0 {
        return Err(LoadError::invalid(
            "listing.refetch_after_seconds",
            "must be greater than zero",
        ));
    }

    let timezone = match non_blank(listing.timezone) {
        Some(name) => name.parse::<Tz>().map_err(|err| {
            LoadError::invalid("listing.timezone", format!("`{name}`: {err}"))
        })?,
        None => Tz::UTC,
    };

    Ok(ListingSettings {
        default_page_size,
        refetch_after: Duration::from_secs(refetch_secs),
        timezone,
    })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    session_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSiteSettings {
    public_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListingSettings {
    default_page_size: Option<usize>,
    refetch_after_seconds: Option<u64>,
    timezone: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn parse_http_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw).map_err(|err| format!("invalid url `{raw}`: {err}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme `{other}` in `{raw}`")),
    }
}
