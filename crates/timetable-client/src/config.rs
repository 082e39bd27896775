//! Client configuration.
//!
//! Settings live in `~/.config/timetable/config.toml` by default:
//!
//! ```toml
//! [account]
//! username = "jdupont"
//! password = "pass::univ/timetable"
//!
//! [calendar]
//! server = "https://calendar.example.com"
//! name = "Timetable"
//! additional_parameters = "fmt=ics"
//! min_start_date = "2023-09-01"
//! max_end_date = "2024-07-01"
//!
//! [network]
//! enabled = true
//! ```
//!
//! `username` and `password` accept secret references (`pass::…`, `env::…`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use timetable_core::{Credentials, SyncRequestConfig};
use timetable_sync::{NetworkAccess, TransportConfig};

use crate::error::{ClientError, ClientResult};
use crate::secret::{self, SecretRef};

/// Errors raised while reading or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Configuration for the timetable client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Debug mode.
    pub debug: bool,

    /// Stored account.
    pub account: AccountSettings,

    /// Calendar feed location.
    pub calendar: CalendarSettings,

    /// Network settings.
    pub network: NetworkSettings,
}

/// Stored account credentials, possibly as secret references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSettings {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Where the calendar feed lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Base server URL.
    pub server: String,

    /// Calendar name under the user's home.
    pub name: String,

    /// Raw query string appended after `?`.
    pub additional_parameters: String,

    /// Lower date bound.
    pub min_start_date: Option<NaiveDate>,

    /// Upper date bound.
    pub max_end_date: Option<NaiveDate>,
}

impl CalendarSettings {
    pub const DEFAULT_SERVER: &'static str = "https://calendar.example.com";
    pub const DEFAULT_NAME: &'static str = "Timetable";
    pub const DEFAULT_PARAMETERS: &'static str = "fmt=ics";
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            server: Self::DEFAULT_SERVER.to_string(),
            name: Self::DEFAULT_NAME.to_string(),
            additional_parameters: Self::DEFAULT_PARAMETERS.to_string(),
            min_start_date: None,
            max_end_date: None,
        }
    }
}

/// Network settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// When false, authentication is reported as unauthorized without
    /// contacting the server.
    pub enabled: bool,

    /// Connect timeout in seconds.
    pub connect_timeout: u64,

    /// Read timeout in seconds.
    pub read_timeout: u64,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            connect_timeout: TransportConfig::DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout: TransportConfig::DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

impl NetworkSettings {
    /// Returns the permission answer for the authentication task.
    pub fn access(&self) -> NetworkAccess {
        if self.enabled {
            NetworkAccess::Granted
        } else {
            NetworkAccess::Denied
        }
    }

    /// Builds the transport configuration.
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::default().with_timeouts(
            Duration::from_secs(self.connect_timeout),
            Duration::from_secs(self.read_timeout),
        )
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, or defaults if absent.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timetable")
            .join("config.toml")
    }

    /// Builds the per-call request settings.
    pub fn request_config(&self) -> SyncRequestConfig {
        let cal = &self.calendar;
        SyncRequestConfig {
            base_server_url: cal.server.clone(),
            calendar_name: cal.name.clone(),
            min_date: cal.min_start_date,
            max_date: cal.max_end_date,
            extra_query_parameters: Some(cal.additional_parameters.clone()),
        }
    }

    /// Resolves the stored account, with optional overrides.
    ///
    /// Returns `Ok(None)` when no username or no password is available,
    /// which callers report as "no account".
    pub fn resolve_credentials(
        &self,
        username: Option<&str>,
        password: Option<&str>,
    ) -> ClientResult<Option<Credentials>> {
        let raw_user = username.or(self.account.username.as_deref());
        let raw_pass = password.or(self.account.password.as_deref());

        let (Some(raw_user), Some(raw_pass)) = (raw_user, raw_pass) else {
            return Ok(None);
        };

        let user = secret::resolve(raw_user).map_err(|source| ClientError::Secret {
            field: "username",
            source,
        })?;
        let pass = secret::resolve(raw_pass).map_err(|source| ClientError::Secret {
            field: "password",
            source,
        })?;

        if user.is_empty() {
            return Ok(None);
        }
        Ok(Some(Credentials::new(user, pass)))
    }

    /// Checks values that would only fail later, at request time.
    pub fn validate(&self) -> ClientResult<()> {
        let cal = &self.calendar;

        url::Url::parse(&cal.server).map_err(|e| {
            ClientError::Invalid(format!("calendar.server `{}` is not a valid URL: {}", cal.server, e))
        })?;

        if cal.server.ends_with('/') {
            return Err(ClientError::Invalid(
                "calendar.server must not end with `/`".to_string(),
            ));
        }

        if cal.name.is_empty() {
            return Err(ClientError::Invalid("calendar.name must not be empty".to_string()));
        }

        if self.request_config().has_inverted_bounds() {
            return Err(ClientError::Invalid(
                "calendar.min_start_date is after calendar.max_end_date".to_string(),
            ));
        }

        if self.network.connect_timeout == 0 || self.network.read_timeout == 0 {
            return Err(ClientError::Invalid(
                "network timeouts must be at least one second".to_string(),
            ));
        }

        Ok(())
    }

    /// Returns a copy safe to print: inline passwords are masked, secret
    /// references are kept.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(ref pass) = copy.account.password
            && !SecretRef::parse(pass).is_reference()
        {
            copy.account.password = Some("********".to_string());
        }
        copy
    }
}
