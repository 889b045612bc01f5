//! Opening an item on an external data site.
//!
//! Most sites are a URL handed to the OS launcher. Teamcraft additionally has
//! a desktop app, so opening an item there walks a fallback chain on a worker
//! thread:
//!
//! 1. ask the running desktop app (local HTTP, short timeout) to show the item;
//! 2. if the app is installed, launch its `teamcraft://` protocol handler;
//! 3. otherwise open the web page.
//!
//! When step 1 fails and the app is not installed, the failure is remembered
//! in the opener's [`ViewerState`] and later opens go straight to the browser.
//! Nothing here touches filter state; failures end as log lines.

use crate::config::SiftConfig;
use crate::error::{Result, SiftError};
use crate::model::Item;
use std::process::Command;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

const TEAMCRAFT_LOCAL: &str = "http://localhost:14500";
const TEAMCRAFT_WEB: &str = "https://ffxivteamcraft.com";
const PROBE_TIMEOUT: Duration = Duration::from_millis(500);

/// What an open call left running.
#[derive(Debug)]
pub enum Opening {
    Launched,
    Background(JoinHandle<()>),
}

impl Opening {
    /// Block until background work finishes. Short-lived callers (the CLI)
    /// use this so the process does not exit mid-chain.
    pub fn wait(self) {
        if let Opening::Background(handle) = self {
            if handle.join().is_err() {
                log::error!("Viewer worker panicked");
            }
        }
    }
}

/// Starts an external target (URL or protocol handler).
pub trait Launcher: Send + Sync {
    fn launch(&self, target: &str) -> Result<()>;
}

/// Launches through the platform's default handler.
/// - macOS: `open`
/// - Linux: `xdg-open`
/// - Windows: `cmd /C start`
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&self, target: &str) -> Result<()> {
        #[cfg(target_os = "macos")]
        let mut command = {
            let mut c = Command::new("open");
            c.arg(target);
            c
        };

        #[cfg(target_os = "windows")]
        let mut command = {
            let mut c = Command::new("cmd");
            c.args(["/C", "start", "", target]);
            c
        };

        #[cfg(not(any(target_os = "macos", target_os = "windows")))]
        let mut command = {
            let mut c = Command::new("xdg-open");
            c.arg(target);
            c
        };

        command
            .spawn()
            .map(|_| ())
            .map_err(|e| SiftError::Viewer(format!("Failed to launch {}: {}", target, e)))
    }
}

/// The Teamcraft desktop app, as seen from outside.
pub trait LocalApp: Send + Sync {
    /// Ask a running app to show `item_id`. True on success.
    fn probe(&self, item_id: u32) -> bool;

    /// Whether the app is installed (its protocol handler is registered).
    fn installed(&self) -> bool;
}

pub struct TeamcraftDesktop;

impl LocalApp for TeamcraftDesktop {
    fn probe(&self, item_id: u32) -> bool {
        let client = match reqwest::blocking::Client::builder()
            .timeout(PROBE_TIMEOUT)
            .build()
        {
            Ok(client) => client,
            Err(e) => {
                log::debug!("Could not build probe client: {}", e);
                return false;
            }
        };
        let url = format!("{}/db/en/item/{}", TEAMCRAFT_LOCAL, item_id);
        match client.get(&url).send().and_then(|r| r.error_for_status()) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("Teamcraft desktop probe failed: {}", e);
                false
            }
        }
    }

    fn installed(&self) -> bool {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("ffxiv-teamcraft").is_dir())
            .unwrap_or(false)
    }
}

/// Fallback memory owned by one opener.
#[derive(Debug, Default)]
pub struct ViewerState {
    local_failed: AtomicBool,
}

impl ViewerState {
    pub fn local_failed(&self) -> bool {
        self.local_failed.load(Ordering::Relaxed)
    }

    fn mark_local_failed(&self) {
        self.local_failed.store(true, Ordering::Relaxed);
    }
}

/// Which step of the chain opened the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    LocalApp,
    ProtocolHandler,
    Browser,
}

pub trait DataSite {
    fn name(&self) -> &str;

    fn translation_key(&self) -> &str;

    fn item_url(&self, item: &Item) -> String;

    fn open(&self, item: &Item) -> Result<Opening>;
}

pub struct GarlandTools {
    launcher: Arc<dyn Launcher>,
}

impl GarlandTools {
    pub fn new(launcher: Arc<dyn Launcher>) -> Self {
        Self { launcher }
    }
}

impl DataSite for GarlandTools {
    fn name(&self) -> &str {
        "Garland Tools"
    }

    fn translation_key(&self) -> &str {
        "GarlandToolsDataSite"
    }

    fn item_url(&self, item: &Item) -> String {
        format!("https://www.garlandtools.org/db/#item/{}", item.id)
    }

    fn open(&self, item: &Item) -> Result<Opening> {
        self.launcher.launch(&self.item_url(item))?;
        Ok(Opening::Launched)
    }
}

pub struct Teamcraft {
    state: Arc<ViewerState>,
    force_browser: bool,
    launcher: Arc<dyn Launcher>,
    local: Arc<dyn LocalApp>,
}

impl Teamcraft {
    pub fn new(force_browser: bool, launcher: Arc<dyn Launcher>, local: Arc<dyn LocalApp>) -> Self {
        Self {
            state: Arc::new(ViewerState::default()),
            force_browser,
            launcher,
            local,
        }
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }
}

impl DataSite for Teamcraft {
    fn name(&self) -> &str {
        "Teamcraft"
    }

    fn translation_key(&self) -> &str {
        "TeamcraftDataSite"
    }

    fn item_url(&self, item: &Item) -> String {
        format!(
            "{}/db/en/item/{}/{}",
            TEAMCRAFT_WEB,
            item.id,
            item.name.replace(' ', "-")
        )
    }

    fn open(&self, item: &Item) -> Result<Opening> {
        if self.force_browser || self.state.local_failed() {
            self.launcher.launch(&self.item_url(item))?;
            return Ok(Opening::Launched);
        }

        let item_id = item.id;
        let state = Arc::clone(&self.state);
        let launcher = Arc::clone(&self.launcher);
        let local = Arc::clone(&self.local);
        let handle = std::thread::spawn(move || {
            let route = open_with_fallback(item_id, &state, local.as_ref(), launcher.as_ref());
            log::debug!("Opened item {} via {:?}", item_id, route);
        });
        Ok(Opening::Background(handle))
    }
}

/// Run the Teamcraft chain for `item_id`.
pub fn open_with_fallback(
    item_id: u32,
    state: &ViewerState,
    local: &dyn LocalApp,
    launcher: &dyn Launcher,
) -> Route {
    if local.probe(item_id) {
        return Route::LocalApp;
    }

    if local.installed() {
        let handler = format!("teamcraft://db/en/item/{}", item_id);
        match launcher.launch(&handler) {
            Ok(()) => return Route::ProtocolHandler,
            Err(e) => log::warn!("{}", e),
        }
    }

    state.mark_local_failed();
    let url = format!("{}/db/en/item/{}", TEAMCRAFT_WEB, item_id);
    if let Err(e) = launcher.launch(&url) {
        log::error!("{}", e);
    }
    Route::Browser
}

/// The data site selected in `config`.
pub fn data_site(config: &SiftConfig) -> Result<Box<dyn DataSite>> {
    let launcher: Arc<dyn Launcher> = Arc::new(SystemLauncher);
    match config.data_site.as_str() {
        "teamcraft" => Ok(Box::new(Teamcraft::new(
            config.teamcraft_force_browser,
            launcher,
            Arc::new(TeamcraftDesktop),
        ))),
        "garland" => Ok(Box::new(GarlandTools::new(launcher))),
        other => Err(SiftError::Config(format!("Unknown data site: {}", other))),
    }
}
