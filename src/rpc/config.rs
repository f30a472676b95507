use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::info;

pub const DEFAULT_RPC_HOST: &str = "127.0.0.1";
pub const DEFAULT_RPC_PORT: u16 = 17577;

/// Connection settings for the coin daemon's JSON-RPC endpoint.
///
/// Deserialization is forgiving: missing fields keep their defaults and the port
/// may arrive as a number or a numeric string, as form inputs send it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub user: String,
    pub pass: String,
    pub host: String,
    #[serde(deserialize_with = "port_from_number_or_string")]
    pub port: u16,
}

fn port_from_number_or_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u16, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawPort {
        Number(u16),
        Text(String),
    }

    match RawPort::deserialize(deserializer)? {
        RawPort::Number(port) => Ok(port),
        RawPort::Text(text) => text
            .trim()
            .parse()
            .map_err(|e| de::Error::custom(format!("invalid port {:?}: {}", text, e))),
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            user: String::new(),
            pass: String::new(),
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

impl RpcConfig {
    /// Daemon endpoint; the daemon only serves the root path
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}/", self.host, self.port)
    }
}

// Keep the password out of logs
impl fmt::Debug for RpcConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RpcConfig")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Shared, process-lifetime holder of the current `RpcConfig`.
///
/// Reads hand out a clone, so a request keeps the settings it started with even
/// if the UI replaces them while it is in flight. Replacement is wholesale and the
/// last writer wins.
#[derive(Clone, Default)]
pub struct RpcConfigStore {
    inner: Arc<RwLock<RpcConfig>>,
}

impl RpcConfigStore {
    pub fn new(config: RpcConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the current settings
    pub fn snapshot(&self) -> RpcConfig {
        // A panic while holding the lock cannot leave a half-written config behind
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, config: RpcConfig) {
        info!("RPC config replaced: {}@{}:{}", config.user, config.host, config.port);
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_points_at_local_daemon() {
        let cfg = RpcConfig::default();
        assert_eq!(cfg.endpoint(), "http://127.0.0.1:17577/");
        assert!(cfg.user.is_empty() && cfg.pass.is_empty());
    }

    #[test]
    fn test_wire_shape() {
        let cfg: RpcConfig =
            serde_json::from_value(json!({"user": "a", "pass": "b", "host": "h", "port": 1})).unwrap();
        assert_eq!(cfg.endpoint(), "http://h:1/");
        assert_eq!(
            serde_json::to_value(&cfg).unwrap(),
            json!({"user": "a", "pass": "b", "host": "h", "port": 1})
        );
    }

    #[test]
    fn test_lenient_shapes() {
        let cfg: RpcConfig = serde_json::from_value(json!({"user": "u", "port": "18000"})).unwrap();
        assert_eq!(cfg.port, 18000);
        assert_eq!(cfg.user, "u");
        assert_eq!(cfg.host, DEFAULT_RPC_HOST);

        assert!(serde_json::from_value::<RpcConfig>(json!({"port": 70000})).is_err());
        assert!(serde_json::from_value::<RpcConfig>(json!({"port": "abc"})).is_err());
    }

    #[test]
    fn test_debug_redacts_password() {
        let cfg = RpcConfig {
            pass: "hunter2".to_string(),
            ..RpcConfig::default()
        };
        assert!(!format!("{:?}", cfg).contains("hunter2"));
    }

    #[test]
    fn test_snapshot_is_detached_from_later_replace() {
        let store = RpcConfigStore::default();
        let before = store.snapshot();
        store.replace(RpcConfig {
            user: "alice".to_string(),
            pass: "secret".to_string(),
            host: "10.0.0.2".to_string(),
            port: 9000,
        });
        assert_eq!(before, RpcConfig::default());
        assert_eq!(store.snapshot().user, "alice");
    }

    #[test]
    fn test_clones_share_state() {
        let store = RpcConfigStore::default();
        let other = store.clone();
        other.replace(RpcConfig {
            port: 1,
            ..RpcConfig::default()
        });
        assert_eq!(store.snapshot().port, 1);
    }
}
