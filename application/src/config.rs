//! [`Config`]-related definitions.

use std::{path::PathBuf, time};

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use directories::ProjectDirs;
use serde::Deserialize;
use service::domain::session;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Remote store configuration.
    #[serde(default)]
    pub store: Store,

    /// Session configuration.
    #[serde(default)]
    pub session: Session,

    /// CSV export configuration.
    #[serde(default)]
    pub export: Export,

    /// Log configuration.
    #[serde(default)]
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Remote store configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Store {
    /// Root URL of the Firebase Realtime Database.
    #[default(service::infra::firebase::Config::default().url)]
    pub url: String,

    /// Timeout of a single request to the store.
    #[default(time::Duration::from_secs(30))]
    #[serde(with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl From<Store> for service::infra::firebase::Config {
    fn from(value: Store) -> Self {
        let Store { url, timeout } = value;
        Self { url, timeout }
    }
}

/// Session configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Session {
    /// Scheme new sessions are issued by.
    pub scheme: SessionScheme,

    /// Path of the file the current session is kept in between runs.
    #[default(default_session_file())]
    pub file: PathBuf,

    /// Indicator whether quitting drops the current session.
    pub drop_on_exit: bool,
}

impl From<&Session> for service::Config {
    fn from(value: &Session) -> Self {
        Self {
            scheme: value.scheme.into(),
        }
    }
}

/// Returns the default path of the session file: inside the platform data
/// directory when one is known, or in the working directory otherwise.
fn default_session_file() -> PathBuf {
    ProjectDirs::from("", "", "ski-roster").map_or_else(
        || PathBuf::from("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

/// Scheme sessions are issued by.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionScheme {
    /// Token derived from the code fingerprint and the issuance time.
    #[default]
    Token,

    /// Token derived through a remotely persisted challenge.
    ChallengeResponse,
}

impl From<SessionScheme> for session::Scheme {
    fn from(value: SessionScheme) -> Self {
        match value {
            SessionScheme::Token => Self::Token,
            SessionScheme::ChallengeResponse => Self::ChallengeResponse,
        }
    }
}

/// CSV export configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Export {
    /// Directory CSV files are written into.
    #[default(PathBuf::from("."))]
    pub dir: PathBuf,
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    Info,

    /// Designates hazardous situations.
    #[default]
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::{io::Write as _, time::Duration};

    use service::domain::session;

    use super::{Config, SessionScheme};

    #[test]
    fn defaults_without_file() {
        let conf = Config::new("definitely/missing/config.toml").unwrap();

        assert_eq!(conf.session.scheme, SessionScheme::Token);
        assert!(!conf.session.drop_on_exit);
        assert_eq!(conf.store.timeout, Duration::from_secs(30));
        assert!(conf.store.url.starts_with("https://"));
        assert_eq!(conf.export.dir.to_str(), Some("."));
    }

    #[test]
    fn reads_toml_file() {
        let mut file =
            tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
            [store]
            url = "http://127.0.0.1:9000"
            timeout = "5s"

            [session]
            scheme = "CHALLENGE_RESPONSE"
            file = "/tmp/roster-session.json"
            drop_on_exit = true

            [export]
            dir = "exports"

            [log]
            level = "DEBUG"
            "#,
        )
        .unwrap();

        let conf = Config::new(file.path().to_str().unwrap()).unwrap();

        assert_eq!(conf.store.url, "http://127.0.0.1:9000");
        assert_eq!(conf.store.timeout, Duration::from_secs(5));
        assert_eq!(
            service::Config::from(&conf.session).scheme,
            session::Scheme::ChallengeResponse,
        );
        assert_eq!(
            conf.session.file.to_str(),
            Some("/tmp/roster-session.json"),
        );
        assert!(conf.session.drop_on_exit);
        assert_eq!(conf.export.dir.to_str(), Some("exports"));
        assert_eq!(
            tracing::Level::from(conf.log.level),
            tracing::Level::DEBUG,
        );
    }
}
