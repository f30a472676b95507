// Tauri wiring: window host, IPC handlers and run loop
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tauri::{AppHandle, Manager, RunEvent, WebviewUrl, WebviewWindowBuilder};
use tracing::{error, info, warn};

use crate::commands::{self, RpcBridge};
use crate::lifecycle::{is_development, ShellLifecycle, WindowHost, WindowSettings, MAIN_WINDOW_LABEL};
use crate::logging::{self, RpcLogger, LOG_RETENTION_DAYS};
use crate::rpc::{RpcClient, RpcConfigStore};

/// `WindowHost` backed by a running Tauri application
pub struct TauriHost {
    app: AppHandle,
    quit_requested: bool,
}

impl TauriHost {
    pub fn new(app: AppHandle) -> Self {
        Self {
            app,
            quit_requested: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }
}

impl WindowHost for TauriHost {
    fn create_main_window(&mut self, settings: &WindowSettings) -> Result<(), String> {
        // No menu is attached; the UI draws its own navigation
        WebviewWindowBuilder::new(&self.app, MAIN_WINDOW_LABEL, WebviewUrl::App("index.html".into()))
            .title(&settings.title)
            .inner_size(settings.width, settings.height)
            .decorations(settings.decorations)
            .build()
            .map(|_| ())
            .map_err(|e| format!("Failed to create main window: {}", e))
    }

    fn has_main_window(&self) -> bool {
        self.app.get_webview_window(MAIN_WINDOW_LABEL).is_some()
    }

    #[cfg(debug_assertions)]
    fn open_devtools(&mut self) -> Result<(), String> {
        let window = self
            .app
            .get_webview_window(MAIN_WINDOW_LABEL)
            .ok_or_else(|| "Main window is not open".to_string())?;
        window.open_devtools();
        Ok(())
    }

    #[cfg(not(debug_assertions))]
    fn open_devtools(&mut self) -> Result<(), String> {
        Err("Devtools are only available in debug builds".to_string())
    }

    fn quit(&mut self) {
        self.quit_requested = true;
        self.app.exit(0);
    }
}

type SharedLifecycle = Arc<Mutex<ShellLifecycle<TauriHost>>>;

fn lock(lifecycle: &SharedLifecycle) -> MutexGuard<'_, ShellLifecycle<TauriHost>> {
    lifecycle.lock().unwrap_or_else(PoisonError::into_inner)
}

fn build_bridge() -> Result<RpcBridge, String> {
    let mut client = RpcClient::new(RpcConfigStore::default())
        .map_err(|e| format!("Failed to create RPC client: {}", e))?;

    match RpcLogger::new() {
        Ok(logger) => {
            if let Err(e) = logger.cleanup_old_logs(LOG_RETENTION_DAYS) {
                warn!("Failed to clean up old RPC logs: {}", e);
            }
            info!("RPC communication log: {}", logger.todays_log_path().display());
            client = client.with_logger(Arc::new(logger));
        }
        Err(e) => warn!("RPC communication log disabled: {}", e),
    }

    Ok(RpcBridge::new(client))
}

/// Quit on SIGTERM (Ctrl-C where there is no SIGTERM), used by dev tooling
fn spawn_terminate_listener(lifecycle: SharedLifecycle) {
    tauri::async_runtime::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    term.recv().await;
                }
                Err(e) => {
                    error!("Failed to listen for SIGTERM: {}", e);
                    return;
                }
            }
        }
        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl-C: {}", e);
                return;
            }
        }
        lock(&lifecycle).on_terminate_signal();
    });
}

pub fn run() -> Result<(), String> {
    logging::init_tracing();
    let development = is_development();
    info!("Starting Kyan Wallet (development: {})", development);

    let app = tauri::Builder::default()
        .manage(build_bridge()?)
        .invoke_handler(tauri::generate_handler![commands::rpc_config, commands::rpc])
        .build(tauri::generate_context!())
        .map_err(|e| format!("Failed to build application: {}", e))?;

    let lifecycle: SharedLifecycle = Arc::new(Mutex::new(ShellLifecycle::new(
        TauriHost::new(app.handle().clone()),
        WindowSettings::default(),
        development,
    )));

    if development {
        spawn_terminate_listener(lifecycle.clone());
    }

    app.run(move |_app, event| match event {
        RunEvent::Ready => {
            if let Err(e) = lock(&lifecycle).on_ready() {
                error!("{}", e);
            }
        }
        // code is None when the last window went away rather than an explicit exit
        RunEvent::ExitRequested { code: None, api, .. } => {
            let mut shell = lock(&lifecycle);
            shell.on_all_windows_closed();
            if !shell.host().quit_requested() {
                api.prevent_exit();
            }
        }
        #[cfg(target_os = "macos")]
        RunEvent::Reopen { .. } => {
            if let Err(e) = lock(&lifecycle).on_activate() {
                error!("{}", e);
            }
        }
        _ => {}
    });

    Ok(())
}
