// Window lifecycle policy, independent of the windowing framework
use tracing::{error, info};

/// Environment switch that forces development behavior in release builds
pub const DEV_ENV_VAR: &str = "KYAN_DEV";

pub const MAIN_WINDOW_LABEL: &str = "main";

/// True for debug builds, or when `KYAN_DEV` is set to something other than `0`
pub fn is_development() -> bool {
    cfg!(debug_assertions) || std::env::var(DEV_ENV_VAR).map_or(false, |v| !v.is_empty() && v != "0")
}

/// Main window parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSettings {
    pub title: String,
    pub width: f64,
    pub height: f64,
    pub decorations: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Kyan Wallet".to_string(),
            width: 850.0,
            height: 680.0,
            decorations: true,
        }
    }
}

/// What the shell needs from the windowing framework
pub trait WindowHost {
    fn create_main_window(&mut self, settings: &WindowSettings) -> Result<(), String>;
    fn has_main_window(&self) -> bool;
    fn open_devtools(&mut self) -> Result<(), String>;
    fn quit(&mut self);

    /// macOS apps stay alive with no windows until the user quits explicitly
    fn platform_keeps_running_without_windows(&self) -> bool {
        cfg!(target_os = "macos")
    }
}

/// Reactions to application events
pub struct ShellLifecycle<H: WindowHost> {
    host: H,
    settings: WindowSettings,
    development: bool,
}

impl<H: WindowHost> ShellLifecycle<H> {
    pub fn new(host: H, settings: WindowSettings, development: bool) -> Self {
        Self {
            host,
            settings,
            development,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn on_ready(&mut self) -> Result<(), String> {
        info!("Application ready, creating main window");
        self.host.create_main_window(&self.settings)?;
        if self.development {
            // devtools are a convenience; failing to open them is not fatal
            if let Err(e) = self.host.open_devtools() {
                error!("Devtools failed to open: {}", e);
            }
        }
        Ok(())
    }

    pub fn on_all_windows_closed(&mut self) {
        if self.host.platform_keeps_running_without_windows() {
            info!("All windows closed, staying resident");
        } else {
            info!("All windows closed, quitting");
            self.host.quit();
        }
    }

    pub fn on_activate(&mut self) -> Result<(), String> {
        if self.host.has_main_window() {
            return Ok(());
        }
        info!("Activated with no window, recreating");
        self.host.create_main_window(&self.settings)
    }

    /// Graceful exit request from a parent process; honored in development only
    pub fn on_terminate_signal(&mut self) {
        if self.development {
            info!("Terminate signal received, quitting");
            self.host.quit();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct MockHost {
        windows: usize,
        created: usize,
        devtools: usize,
        quits: usize,
        mac: bool,
        devtools_fail: bool,
    }

    impl WindowHost for MockHost {
        fn create_main_window(&mut self, settings: &WindowSettings) -> Result<(), String> {
            assert_eq!(settings.width, 850.0);
            self.windows += 1;
            self.created += 1;
            Ok(())
        }

        fn has_main_window(&self) -> bool {
            self.windows > 0
        }

        fn open_devtools(&mut self) -> Result<(), String> {
            if self.devtools_fail {
                return Err("not available".to_string());
            }
            self.devtools += 1;
            Ok(())
        }

        fn quit(&mut self) {
            self.quits += 1;
        }

        fn platform_keeps_running_without_windows(&self) -> bool {
            self.mac
        }
    }

    #[test]
    fn test_ready_creates_window_and_devtools_in_dev() {
        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), true);
        shell.on_ready().unwrap();
        assert_eq!(shell.host().created, 1);
        assert_eq!(shell.host().devtools, 1);

        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), false);
        shell.on_ready().unwrap();
        assert_eq!(shell.host().devtools, 0);
    }

    #[test]
    fn test_devtools_failure_is_not_fatal() {
        let host = MockHost {
            devtools_fail: true,
            ..MockHost::default()
        };
        let mut shell = ShellLifecycle::new(host, WindowSettings::default(), true);
        assert!(shell.on_ready().is_ok());
        assert!(shell.host().has_main_window());
    }

    #[test]
    fn test_all_windows_closed_quits_except_on_mac() {
        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), false);
        shell.on_all_windows_closed();
        assert_eq!(shell.host().quits, 1);

        let host = MockHost {
            mac: true,
            ..MockHost::default()
        };
        let mut shell = ShellLifecycle::new(host, WindowSettings::default(), false);
        shell.on_all_windows_closed();
        assert_eq!(shell.host().quits, 0);
    }

    #[test]
    fn test_activate_only_recreates_missing_window() {
        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), false);
        shell.on_activate().unwrap();
        shell.on_activate().unwrap();
        assert_eq!(shell.host().created, 1);
    }

    #[test]
    fn test_terminate_signal_only_in_development() {
        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), false);
        shell.on_terminate_signal();
        assert_eq!(shell.host().quits, 0);

        let mut shell = ShellLifecycle::new(MockHost::default(), WindowSettings::default(), true);
        shell.on_terminate_signal();
        assert_eq!(shell.host().quits, 1);
    }
}
