/// Startup configuration:
/// - read once from the environment (and `.env`)
/// - passed explicitly into the client, catalog and stager
use std::fmt;
use std::num::NonZeroU32;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use nonzero_ext::nonzero;

use crate::error::{Result, StageError};
use crate::stage::{MissingResultPolicy, StagePlan};

const DEFAULT_BASE_URL: &str = "http://api-public.guidebox.com/v2";
const DEFAULT_DEV_DATABASE: &str = "catalog_dev.sqlite3";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = StageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => Err(StageError::Config(format!(
                "STAGE_ENVIRONMENT must be `development` or `production`, got {other:?}"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Bounded retry for rate-limited requests: `max_attempts` tries in total,
/// sleeping `initial_backoff`, then twice that, and so on between them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_backoff: Duration::from_secs(30),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GuideboxSettings {
    pub api_key: String,
    pub base_url: String,
    pub cache_dir: PathBuf,
    pub requests_per_second: NonZeroU32,
    pub retry: RetryPolicy,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub database_url: String,
    pub guidebox: GuideboxSettings,
    pub stage: StagePlan,
    pub log_file: PathBuf,
    pub log_level: LevelFilter,
}

impl Config {
    pub fn from_env() -> Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment: Environment = required(&lookup, "STAGE_ENVIRONMENT")?.parse()?;

        let database_url = match (lookup("DATABASE_URL"), environment) {
            (Some(url), _) => url,
            (None, Environment::Development) => DEFAULT_DEV_DATABASE.to_string(),
            (None, Environment::Production) => {
                return Err(StageError::Config(
                    "DATABASE_URL must be set in production".to_string(),
                ))
            }
        };

        let requests_per_second = parsed(&lookup, "GUIDEBOX_REQUESTS_PER_SECOND")?
            .map(|n: u32| {
                NonZeroU32::new(n).ok_or_else(|| {
                    StageError::Config("GUIDEBOX_REQUESTS_PER_SECOND must be above 0".to_string())
                })
            })
            .transpose()?
            .unwrap_or(nonzero!(1u32));

        let max_attempts = parsed(&lookup, "GUIDEBOX_MAX_ATTEMPTS")?
            .unwrap_or(RetryPolicy::default().max_attempts);
        if max_attempts == 0 {
            return Err(StageError::Config(
                "GUIDEBOX_MAX_ATTEMPTS must be at least 1".to_string(),
            ));
        }
        let retry = RetryPolicy {
            max_attempts,
            initial_backoff: parsed(&lookup, "GUIDEBOX_BACKOFF_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(RetryPolicy::default().initial_backoff),
        };

        let guidebox = GuideboxSettings {
            api_key: required(&lookup, "GUIDEBOX_API_KEY")?,
            base_url: lookup("GUIDEBOX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            cache_dir: lookup("GUIDEBOX_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cache")),
            requests_per_second,
            retry,
        };

        let defaults = StagePlan::default();
        let stage = StagePlan {
            missing_result: parsed(&lookup, "STAGE_MISSING_RESULT")?
                .unwrap_or(defaults.missing_result),
            stage_all_primary_shows: parsed(&lookup, "STAGE_ALL_PRIMARY_SHOWS")?
                .unwrap_or(defaults.stage_all_primary_shows),
            episode_limit: parsed(&lookup, "STAGE_EPISODE_LIMIT")?.unwrap_or(defaults.episode_limit),
            ..defaults
        };

        Ok(Config {
            environment,
            database_url,
            guidebox,
            stage,
            log_file: lookup("LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("catalog_stager.log")),
            log_level: parsed(&lookup, "LOG_LEVEL")?.unwrap_or(LevelFilter::Info),
        })
    }
}

impl FromStr for MissingResultPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(MissingResultPolicy::Skip),
            "abort" => Ok(MissingResultPolicy::Abort),
            other => Err(format!("expected `skip` or `abort`, got {other:?}")),
        }
    }
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).ok_or_else(|| StageError::Config(format!("{key} must be set")))
}

fn parsed<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| StageError::Config(format!("{key}: {e}")))
        })
        .transpose()
}

/// Builds a lookup over fixed pairs, mostly for tests.
#[cfg(test)]
pub fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: std::collections::HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("STAGE_ENVIRONMENT", "development"),
            ("GUIDEBOX_API_KEY", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.database_url, DEFAULT_DEV_DATABASE);
        assert_eq!(config.guidebox.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.guidebox.retry, RetryPolicy::default());
        assert_eq!(config.guidebox.requests_per_second.get(), 1);
        assert_eq!(config.stage.missing_result, MissingResultPolicy::Abort);
        assert!(!config.stage.stage_all_primary_shows);
        assert_eq!(config.stage.episode_limit, 50);
        assert_eq!(config.log_level, LevelFilter::Info);
    }

    #[test]
    fn production_requires_database_url() {
        let err = Config::from_lookup(lookup_from(&[
            ("STAGE_ENVIRONMENT", "production"),
            ("GUIDEBOX_API_KEY", "secret"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("STAGE_ENVIRONMENT", "staging"),
            ("GUIDEBOX_API_KEY", "secret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, StageError::Config(_)));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("STAGE_ENVIRONMENT", "Production"),
            ("DATABASE_URL", "/tmp/catalog.sqlite3"),
            ("GUIDEBOX_API_KEY", "secret"),
            ("GUIDEBOX_MAX_ATTEMPTS", "3"),
            ("GUIDEBOX_BACKOFF_SECS", "2"),
            ("GUIDEBOX_REQUESTS_PER_SECOND", "4"),
            ("STAGE_MISSING_RESULT", "skip"),
            ("STAGE_ALL_PRIMARY_SHOWS", "true"),
            ("STAGE_EPISODE_LIMIT", "10"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database_url, "/tmp/catalog.sqlite3");
        assert_eq!(
            config.guidebox.retry,
            RetryPolicy {
                max_attempts: 3,
                initial_backoff: Duration::from_secs(2)
            }
        );
        assert_eq!(config.guidebox.requests_per_second.get(), 4);
        assert_eq!(config.stage.missing_result, MissingResultPolicy::Skip);
        assert!(config.stage.stage_all_primary_shows);
        assert_eq!(config.stage.episode_limit, 10);
        assert_eq!(config.log_level, LevelFilter::Debug);
    }

    #[test]
    fn zero_attempts_and_bad_numbers_fail() {
        let base = [
            ("STAGE_ENVIRONMENT", "development"),
            ("GUIDEBOX_API_KEY", "secret"),
        ];

        let mut zero = base.to_vec();
        zero.push(("GUIDEBOX_MAX_ATTEMPTS", "0"));
        assert!(Config::from_lookup(lookup_from(&zero)).is_err());

        let mut garbage = base.to_vec();
        garbage.push(("STAGE_EPISODE_LIMIT", "lots"));
        let err = Config::from_lookup(lookup_from(&garbage)).unwrap_err();
        assert!(err.to_string().contains("STAGE_EPISODE_LIMIT"));
    }

    #[test]
    fn missing_api_key_fails() {
        let err =
            Config::from_lookup(lookup_from(&[("STAGE_ENVIRONMENT", "development")])).unwrap_err();
        assert!(err.to_string().contains("GUIDEBOX_API_KEY"));
    }
}
