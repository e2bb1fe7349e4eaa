//! Snapshot-capture infrastructure adapter.
//!
//! Implements the [`pipeline::SnapshotSource`] trait by launching a headless
//! Chromium instance per capture, navigating to the address, and returning
//! the serialized document.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Browser process management and DevTools protocol calls
//! live here. The [`pipeline`] crate sees only [`pipeline::SnapshotSource`].
//!
//! The browsing context is scoped to a single [`SnapshotSource::capture`]
//! call: the browser is owned by the blocking capture closure and dropped
//! (which terminates the process) when that closure returns, on success and
//! failure alike. Nothing is shared with later stages.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use pipeline::{SnapshotError, SnapshotSource, StructuralSnapshot};
use tracing::{debug, instrument};

/// Default time allowed for navigation and content retrieval.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Extra idle allowance on top of the navigation timeout before the browser
/// connection is considered dead.
const IDLE_GRACE: Duration = Duration::from_secs(10);

/// Launch settings for [`ChromeSnapshotSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromeConfig {
    pub headless: bool,
    pub sandbox: bool,
    pub navigation_timeout: Duration,
    /// Explicit browser binary; `None` searches the usual install locations.
    pub chrome_path: Option<PathBuf>,
}

impl Default for ChromeConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: true,
            navigation_timeout: DEFAULT_NAVIGATION_TIMEOUT,
            chrome_path: None,
        }
    }
}

/// Captures page snapshots with a fresh headless Chromium per call.
#[derive(Debug, Clone, Default)]
pub struct ChromeSnapshotSource {
    config: ChromeConfig,
}

impl ChromeSnapshotSource {
    pub fn new(config: ChromeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChromeConfig {
        &self.config
    }
}

#[async_trait]
impl SnapshotSource for ChromeSnapshotSource {
    #[instrument(skip(self))]
    async fn capture(&self, address: &str) -> Result<StructuralSnapshot, SnapshotError> {
        let config = self.config.clone();
        let target = address.to_string();

        let html = tokio::task::spawn_blocking(move || render(&config, &target))
            .await
            .map_err(|e| SnapshotError::Content(format!("capture task failed: {e}")))??;

        debug!(bytes = html.len(), "snapshot captured");
        Ok(StructuralSnapshot::new(html))
    }
}

/// Launches, navigates, serializes. `browser` drops at the end of this scope
/// on every path, closing the process.
fn render(config: &ChromeConfig, address: &str) -> Result<String, SnapshotError> {
    let options = LaunchOptions::default_builder()
        .headless(config.headless)
        .sandbox(config.sandbox)
        .path(config.chrome_path.clone())
        .idle_browser_timeout(config.navigation_timeout + IDLE_GRACE)
        .build()
        .map_err(|e| SnapshotError::Launch(e.to_string()))?;

    let browser = Browser::new(options).map_err(|e| SnapshotError::Launch(e.to_string()))?;
    let tab = browser
        .new_tab()
        .map_err(|e| SnapshotError::Launch(e.to_string()))?;
    tab.set_default_timeout(config.navigation_timeout);

    tab.navigate_to(address)
        .map_err(|e| navigation_error(address, e))?
        .wait_until_navigated()
        .map_err(|e| navigation_error(address, e))?;

    tab.get_content()
        .map_err(|e| SnapshotError::Content(e.to_string()))
}

fn navigation_error(address: &str, e: impl std::fmt::Display) -> SnapshotError {
    SnapshotError::Navigation {
        address: address.to_string(),
        message: e.to_string(),
    }
}
