//! Configuration for the portal API.
//!
//! All settings come from environment variables. [`ApiConfig::from_lookup`]
//! takes the variable source as a closure so parsing can be exercised
//! without touching the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Errors raised while reading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set to a value that could not be parsed.
    #[error("invalid {name}: {reason}")]
    Invalid {
        /// Name of the offending environment variable.
        name: &'static str,
        /// What was wrong with it.
        reason: String,
    },
}

/// Settings consumed by the router, the session layer and the handlers.
#[derive(Clone)]
pub struct ApiConfig {
    /// Secret the session cookie signing key is derived from. When unset
    /// a random key is generated per process.
    pub session_secret: Option<String>,
    /// Second-factor password for the admin panel. When unset the panel
    /// cannot be unlocked.
    pub admin_password: Option<String>,
    /// Usernames that are site admins.
    pub admin_usernames: Vec<String>,
    /// Whether the session cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
    /// bcrypt work factor for new password hashes.
    pub bcrypt_cost: u32,
    /// Directory uploaded images are written to and served from.
    pub upload_dir: PathBuf,
    /// Minimum time between two coin clicks in one session. Zero disables
    /// the check.
    pub click_cooldown: Duration,
    /// Single origin allowed by CORS. `None` allows any origin.
    pub cors_allow_origin: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            session_secret: None,
            admin_password: None,
            admin_usernames: Vec::new(),
            cookie_secure: false,
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            upload_dir: PathBuf::from("uploads"),
            click_cooldown: Duration::ZERO,
            cors_allow_origin: None,
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("session_secret", &self.session_secret.as_ref().map(|_| "<redacted>"))
            .field("admin_password", &self.admin_password.as_ref().map(|_| "<redacted>"))
            .field("admin_usernames", &self.admin_usernames)
            .field("cookie_secure", &self.cookie_secure)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("upload_dir", &self.upload_dir)
            .field("click_cooldown", &self.click_cooldown)
            .field("cors_allow_origin", &self.cors_allow_origin)
            .finish()
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional variables:
    /// - `SESSION_SECRET` -- cookie signing secret (default: random per process)
    /// - `ADMIN_PASSWORD` -- admin panel password (default: panel disabled)
    /// - `ADMIN_USERNAMES` -- comma-separated site admin usernames
    /// - `COOKIE_SECURE` -- mark the session cookie `Secure` (default `false`)
    /// - `BCRYPT_COST` -- bcrypt work factor, 4-31 (default `10`)
    /// - `UPLOAD_DIR` -- upload directory (default `uploads`)
    /// - `COIN_CLICK_COOLDOWN_MS` -- per-session click cooldown (default `0`)
    /// - `CORS_ALLOW_ORIGIN` -- allowed CORS origin (default: any)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup`, which returns the raw value of
    /// a variable or `None` when it is unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let bcrypt_cost = parse_or("BCRYPT_COST", lookup("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("must be between 4 and 31, got {bcrypt_cost}"),
            });
        }

        let cooldown_ms: u64 = parse_or(
            "COIN_CLICK_COOLDOWN_MS",
            lookup("COIN_CLICK_COOLDOWN_MS"),
            0,
        )?;

        Ok(Self {
            session_secret: non_empty(lookup("SESSION_SECRET")),
            admin_password: non_empty(lookup("ADMIN_PASSWORD")),
            admin_usernames: lookup("ADMIN_USERNAMES")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            cookie_secure: parse_flag("COOKIE_SECURE", lookup("COOKIE_SECURE"), false)?,
            bcrypt_cost,
            upload_dir: non_empty(lookup("UPLOAD_DIR")).map_or(defaults.upload_dir, PathBuf::from),
            click_cooldown: Duration::from_millis(cooldown_ms),
            cors_allow_origin: non_empty(lookup("CORS_ALLOW_ORIGIN")),
        })
    }

    /// Whether `username` is listed in `ADMIN_USERNAMES`.
    pub fn is_admin_username(&self, username: &str) -> bool {
        self.admin_usernames.iter().any(|name| name == username)
    }
}

/// Trim a raw value, treating blank values as unset.
pub fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Split a comma-separated list, dropping blank entries.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse `raw` into `T`, falling back to `default` when unset or blank.
pub fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match non_empty(raw) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|e| ConfigError::Invalid {
            name,
            reason: format!("{value:?}: {e}"),
        }),
    }
}

/// Parse a boolean flag. Accepts `true`/`false`, `1`/`0`, `yes`/`no`
/// and `on`/`off`, case-insensitively.
pub fn parse_flag(name: &'static str, raw: Option<String>, default: bool) -> Result<bool, ConfigError> {
    let Some(value) = non_empty(raw) else {
        return Ok(default);
    };
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("{value:?} is not a boolean"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: BTreeMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = ApiConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.session_secret, None);
        assert_eq!(config.admin_password, None);
        assert!(config.admin_usernames.is_empty());
        assert!(!config.cookie_secure);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.click_cooldown, Duration::ZERO);
        assert_eq!(config.cors_allow_origin, None);
    }

    #[test]
    fn reads_every_variable() {
        let config = ApiConfig::from_lookup(lookup_from(&[
            ("SESSION_SECRET", "s3cret"),
            ("ADMIN_PASSWORD", "hunter2"),
            ("ADMIN_USERNAMES", " alice, ,bob "),
            ("COOKIE_SECURE", "Yes"),
            ("BCRYPT_COST", "4"),
            ("UPLOAD_DIR", "/var/crave/uploads"),
            ("COIN_CLICK_COOLDOWN_MS", "250"),
            ("CORS_ALLOW_ORIGIN", "https://crave.example"),
        ]))
        .unwrap();
        assert_eq!(config.session_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.admin_password.as_deref(), Some("hunter2"));
        assert_eq!(config.admin_usernames, vec!["alice", "bob"]);
        assert!(config.is_admin_username("bob"));
        assert!(!config.is_admin_username("carol"));
        assert!(config.cookie_secure);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.upload_dir, PathBuf::from("/var/crave/uploads"));
        assert_eq!(config.click_cooldown, Duration::from_millis(250));
        assert_eq!(
            config.cors_allow_origin.as_deref(),
            Some("https://crave.example")
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = ApiConfig {
            admin_password: Some("hunter2".to_owned()),
            ..ApiConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("hunter2"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config =
            ApiConfig::from_lookup(lookup_from(&[("ADMIN_PASSWORD", "  "), ("BCRYPT_COST", "")]))
                .unwrap();
        assert_eq!(config.admin_password, None);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);
    }

    #[test]
    fn rejects_malformed_values() {
        let bad_flag = ApiConfig::from_lookup(lookup_from(&[("COOKIE_SECURE", "maybe")]));
        assert!(matches!(
            bad_flag,
            Err(ConfigError::Invalid { name: "COOKIE_SECURE", .. })
        ));

        let bad_cost = ApiConfig::from_lookup(lookup_from(&[("BCRYPT_COST", "40")]));
        assert!(matches!(
            bad_cost,
            Err(ConfigError::Invalid { name: "BCRYPT_COST", .. })
        ));

        let bad_cooldown =
            ApiConfig::from_lookup(lookup_from(&[("COIN_CLICK_COOLDOWN_MS", "-5")]));
        assert!(matches!(
            bad_cooldown,
            Err(ConfigError::Invalid { name: "COIN_CLICK_COOLDOWN_MS", .. })
        ));
    }
}
