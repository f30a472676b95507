/*
      Kyan Wallet
            desktop shell backend
*/
// =============================================================
//  lib.rs – entry for the wallet shell backend
//  ----------------------------------------------------------
//    • rpc       – daemon connection settings + JSON-RPC client
//    • commands  – the two IPC channels the webview calls
//    • lifecycle – window policy, framework agnostic
//    • shell     – Tauri wiring (feature `desktop`)
// =============================================================

pub mod commands;
pub mod error;
pub mod lifecycle;
pub mod logging;
pub mod rpc;

#[cfg(feature = "desktop")]
pub mod shell;

// Re-export commonly used types
pub use commands::{RpcBridge, RpcEnvelope, RPC_CHANNEL, RPC_CONFIG_CHANNEL};
pub use error::RpcError;
pub use rpc::{RpcClient, RpcConfig, RpcConfigStore};

#[cfg(feature = "desktop")]
pub use shell::run;
