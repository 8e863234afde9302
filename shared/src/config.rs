use std::time::Duration;
use tracing::warn;

pub enum StoreBackend {
    Memory,
    Redis(String), // connection url
}

pub struct Config {
    pub store: StoreBackend,
    pub result_ttl: Duration,
    pub fetch_timeout: Option<Duration>,
    pub user_agent: Option<String>,
}

impl Config {
    const DEFAULT_RESULT_TTL_SECS: u64 = 10;

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let store = match lookup("WEBCACHE_REDIS_URL").filter(|url| !url.trim().is_empty()) {
            Some(url) => StoreBackend::Redis(url.trim().to_string()),
            None => StoreBackend::Memory,
        };

        let result_ttl_secs = match parse_var::<u64>(&lookup, "WEBCACHE_RESULT_TTL_SECS") {
            Some(0) => {
                warn!(
                    "WEBCACHE_RESULT_TTL_SECS must be positive, using {}s",
                    Self::DEFAULT_RESULT_TTL_SECS
                );
                Self::DEFAULT_RESULT_TTL_SECS
            }
            Some(secs) => secs,
            None => Self::DEFAULT_RESULT_TTL_SECS,
        };

        Self {
            store,
            result_ttl: Duration::from_secs(result_ttl_secs),
            fetch_timeout: parse_var::<u64>(&lookup, "WEBCACHE_FETCH_TIMEOUT_SECS")
                .map(Duration::from_secs),
            user_agent: lookup("WEBCACHE_USER_AGENT"),
        }
    }
}

impl StoreBackend {
    pub fn is_remote(&self) -> bool {
        matches!(self, StoreBackend::Redis(..))
    }

    pub fn name(&self) -> &str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Redis(..) => "redis",
        }
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("{} has invalid value '{}', ignoring it", key, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert!(matches!(config.store, StoreBackend::Memory));
        assert_eq!(config.result_ttl, Duration::from_secs(10));
        assert!(config.fetch_timeout.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_redis_backend_selected_by_url() {
        let config = config_from(&[("WEBCACHE_REDIS_URL", "redis://127.0.0.1/")]);
        assert!(config.store.is_remote());
        assert_eq!(config.store.name(), "redis");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("WEBCACHE_RESULT_TTL_SECS", "30"),
            ("WEBCACHE_FETCH_TIMEOUT_SECS", "5"),
            ("WEBCACHE_USER_AGENT", "webcache/0.1"),
        ]);
        assert_eq!(config.result_ttl, Duration::from_secs(30));
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent.as_deref(), Some("webcache/0.1"));
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = config_from(&[
            ("WEBCACHE_RESULT_TTL_SECS", "ten"),
            ("WEBCACHE_FETCH_TIMEOUT_SECS", "-1"),
            ("WEBCACHE_REDIS_URL", "  "),
        ]);
        assert_eq!(config.result_ttl, Duration::from_secs(10));
        assert!(config.fetch_timeout.is_none());
        assert!(!config.store.is_remote());

        let config = config_from(&[("WEBCACHE_RESULT_TTL_SECS", "0")]);
        assert_eq!(config.result_ttl, Duration::from_secs(10));
    }
}
