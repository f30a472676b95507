// Daemon JSON-RPC access: connection settings and the HTTP client
pub mod client;
pub mod config;

pub use client::{basic_auth_header, classify_response, RpcClient};
pub use config::{RpcConfig, RpcConfigStore, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT};
