// IPC surface exposed to the webview
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::RpcError;
use crate::rpc::{RpcClient, RpcConfig};

/// Logical channel names the UI speaks
pub const RPC_CONFIG_CHANNEL: &str = "RpcConfig";
pub const RPC_CHANNEL: &str = "rpc";

/// Uniform reply to an `rpc` call; the UI only ever branches on `success`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcEnvelope {
    pub success: bool,
    pub result: Value,
}

impl RpcEnvelope {
    pub fn ok(result: Value) -> Self {
        Self { success: true, result }
    }

    pub fn failed(err: &RpcError) -> Self {
        Self {
            success: false,
            result: err.envelope_result(),
        }
    }
}

impl From<Result<Value, RpcError>> for RpcEnvelope {
    fn from(result: Result<Value, RpcError>) -> Self {
        match result {
            Ok(value) => RpcEnvelope::ok(value),
            Err(e) => RpcEnvelope::failed(&e),
        }
    }
}

/// Main-process side of the two IPC channels
#[derive(Clone)]
pub struct RpcBridge {
    client: RpcClient,
}

impl RpcBridge {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    /// Replace the settings when given, then report what is current
    pub fn get_or_set_config(&self, new_config: Option<RpcConfig>) -> RpcConfig {
        let store = self.client.config();
        if let Some(cfg) = new_config {
            store.replace(cfg);
        }
        store.snapshot()
    }

    /// `RpcConfig` channel with the payload as the webview sent it.
    ///
    /// A payload that does not describe a config leaves the settings untouched;
    /// the caller still gets the current ones back.
    pub fn get_or_set_config_raw(&self, payload: Option<Value>) -> RpcConfig {
        let new_config = match payload {
            None | Some(Value::Null) => None,
            Some(raw) => match serde_json::from_value::<RpcConfig>(raw) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    warn!("{} payload ignored: {}", RPC_CONFIG_CHANNEL, e);
                    None
                }
            },
        };
        self.get_or_set_config(new_config)
    }

    /// Run one daemon command; every failure ends up inside the envelope
    pub async fn invoke_rpc(&self, command: Value) -> RpcEnvelope {
        let result = self.client.execute(&command).await;
        if let Err(e) = &result {
            match e.status() {
                Some(status) => warn!("{} call failed (HTTP {}): {}", RPC_CHANNEL, status, e),
                None => warn!("{} call failed: {}", RPC_CHANNEL, e),
            }
        }
        result.into()
    }

    /// `rpc` channel; a missing command is answered with a failure envelope
    pub async fn invoke_rpc_raw(&self, command: Option<Value>) -> RpcEnvelope {
        match command {
            Some(command) => self.invoke_rpc(command).await,
            None => {
                warn!("{} called without a command", RPC_CHANNEL);
                RpcEnvelope::failed(&RpcError::MissingCommand)
            }
        }
    }
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub fn rpc_config(cfg: Option<Value>, bridge: tauri::State<'_, RpcBridge>) -> RpcConfig {
    tracing::info!("{} requested (replace: {})", RPC_CONFIG_CHANNEL, cfg.is_some());
    bridge.get_or_set_config_raw(cfg)
}

#[cfg(feature = "desktop")]
#[tauri::command]
pub async fn rpc(cmd: Option<Value>, bridge: tauri::State<'_, RpcBridge>) -> Result<RpcEnvelope, String> {
    // Never Err; async commands that borrow State have to return a Result
    Ok(bridge.invoke_rpc_raw(cmd).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::RpcConfigStore;
    use serde_json::json;

    #[test]
    fn test_envelope_shape() {
        let env = RpcEnvelope::ok(json!({"result": 1}));
        assert_eq!(serde_json::to_value(&env).unwrap(), json!({"success": true, "result": {"result": 1}}));

        let env: RpcEnvelope = Err::<Value, _>(RpcError::Forbidden).into();
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"success": false, "result": "Connection Rejected: 403 Forbidden"})
        );
    }

    #[test]
    fn test_get_without_argument_returns_current() {
        let bridge = RpcBridge::new(RpcClient::new(RpcConfigStore::default()).unwrap());
        assert_eq!(bridge.get_or_set_config(None), RpcConfig::default());

        let cfg = RpcConfig {
            user: "a".to_string(),
            pass: "b".to_string(),
            host: "h".to_string(),
            port: 1,
        };
        assert_eq!(bridge.get_or_set_config(Some(cfg.clone())), cfg);
        assert_eq!(bridge.get_or_set_config(None), cfg);
    }

    #[test]
    fn test_raw_config_payloads() {
        let bridge = RpcBridge::new(RpcClient::new(RpcConfigStore::default()).unwrap());

        // port as a string, fields missing
        let cfg = bridge.get_or_set_config_raw(Some(json!({"user": "a", "pass": "b", "port": "18000"})));
        assert_eq!(cfg.port, 18000);
        assert_eq!(cfg.user, "a");
        assert_eq!(cfg.host, "127.0.0.1");

        // unusable shapes keep what is there
        assert_eq!(bridge.get_or_set_config_raw(Some(json!({"port": 70000}))), cfg);
        assert_eq!(bridge.get_or_set_config_raw(Some(json!("not a config"))), cfg);
        assert_eq!(bridge.get_or_set_config_raw(Some(Value::Null)), cfg);
        assert_eq!(bridge.get_or_set_config_raw(None), cfg);
    }

    #[tokio::test]
    async fn test_missing_command_is_a_failure_envelope() {
        let bridge = RpcBridge::new(RpcClient::new(RpcConfigStore::default()).unwrap());
        let env = bridge.invoke_rpc_raw(None).await;
        assert_eq!(env, RpcEnvelope { success: false, result: json!("Request Error: no RPC command given") });
    }
}
