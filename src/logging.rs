use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "rpc-communications-";
const LOG_FILE_SUFFIX: &str = ".log";
pub const LOG_RETENTION_DAYS: i64 = 30;

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; falls back to info for this crate. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("kyan_wallet_lib=info,kyan_wallet=info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct OpenLog {
    date: String,
    file: fs::File,
}

/// Daemon RPC traffic logger writing JSON lines to dated files in `~/.kyan/logs`
pub struct RpcLogger {
    logs_dir: PathBuf,
    current: Mutex<Option<OpenLog>>,
}

impl RpcLogger {
    /// Logger rooted at `~/.kyan/logs`
    pub fn new() -> Result<Self, String> {
        let home_dir = dirs::home_dir().ok_or_else(|| "Could not find home directory".to_string())?;
        Self::with_dir(home_dir.join(".kyan").join("logs"))
    }

    pub fn with_dir(logs_dir: impl Into<PathBuf>) -> Result<Self, String> {
        let logs_dir = logs_dir.into();
        fs::create_dir_all(&logs_dir).map_err(|e| format!("Failed to create logs directory: {}", e))?;

        Ok(RpcLogger {
            logs_dir,
            current: Mutex::new(None),
        })
    }

    fn current_date() -> String {
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn log_path_for(&self, date: &str) -> PathBuf {
        self.logs_dir.join(format!("{}{}{}", LOG_FILE_PREFIX, date, LOG_FILE_SUFFIX))
    }

    /// Path of today's log file
    pub fn todays_log_path(&self) -> PathBuf {
        self.log_path_for(&Self::current_date())
    }

    /// Outgoing command. Only the method is recorded, never params or credentials.
    pub async fn log_request(&self, request_id: &str, method: &str, endpoint: &str) -> Result<(), String> {
        self.write_entry(&json!({
            "timestamp": Utc::now().to_rfc3339(),
            "direction": "REQUEST",
            "request_id": request_id,
            "method": method,
            "endpoint": endpoint,
        }))
        .await
    }

    /// Outcome only. The result value can hold keys or wallet dumps, so just its
    /// JSON type and encoded size are recorded.
    pub async fn log_response(
        &self,
        request_id: &str,
        success: bool,
        result: Option<&Value>,
        error: Option<&str>,
    ) -> Result<(), String> {
        self.write_entry(&json!({
            "timestamp": Utc::now().to_rfc3339(),
            "direction": "RESPONSE",
            "request_id": request_id,
            "success": success,
            "result_type": result.map(value_kind),
            "result_bytes": result.map(|v| v.to_string().len()),
            "error": error,
        }))
        .await
    }

    /// A 2xx response whose body would not parse; kept verbatim for diagnosis
    pub async fn log_malformed(
        &self,
        request_id: &str,
        status: u16,
        body: &str,
        parse_error: &str,
    ) -> Result<(), String> {
        self.write_entry(&json!({
            "timestamp": Utc::now().to_rfc3339(),
            "direction": "MALFORMED",
            "request_id": request_id,
            "status": status,
            "parse_error": parse_error,
            "body": body,
        }))
        .await
    }

    async fn write_entry(&self, entry: &Value) -> Result<(), String> {
        let line = serde_json::to_string(entry).map_err(|e| format!("Failed to encode log entry: {}", e))?;
        let today = Self::current_date();

        // One lock for open + write so entries never interleave
        let mut current = self.current.lock().await;

        let stale = current.as_ref().map_or(true, |open| open.date != today);
        if stale {
            let file = fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.log_path_for(&today))
                .map_err(|e| format!("Failed to open log file: {}", e))?;
            *current = Some(OpenLog { date: today, file });
        }

        if let Some(open) = current.as_mut() {
            writeln!(open.file, "{}", line).map_err(|e| format!("Failed to write log entry: {}", e))?;
            open.file.flush().map_err(|e| format!("Failed to flush log file: {}", e))?;
        }

        Ok(())
    }

    /// Remove log files older than `keep_days`; returns how many were deleted
    pub fn cleanup_old_logs(&self, keep_days: i64) -> Result<usize, String> {
        let cutoff = Utc::now().date_naive() - chrono::Duration::days(keep_days);
        let entries = fs::read_dir(&self.logs_dir).map_err(|e| format!("Failed to read logs directory: {}", e))?;

        let mut removed = 0;
        for entry in entries {
            let path = entry.map_err(|e| format!("Failed to read directory entry: {}", e))?.path();
            if !path.is_file() {
                continue;
            }
            let file_date = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.strip_prefix(LOG_FILE_PREFIX))
                .and_then(|n| n.strip_suffix(LOG_FILE_SUFFIX))
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok());

            if let Some(date) = file_date {
                if date < cutoff {
                    tracing::info!("Cleaning up old log file: {}", path.display());
                    if fs::remove_file(&path).is_ok() {
                        removed += 1;
                    }
                }
            }
        }

        Ok(removed)
    }
}
