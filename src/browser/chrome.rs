use crate::browser::{config::LaunchOptions, page::PageSource, target::TargetPattern};
use crate::dom::{DomSnapshot, SNAPSHOT_SCRIPT};
use crate::error::{BridgeError, Result};
use crate::extract::{ExtractionResult, TreeExtractor};
use async_trait::async_trait;
use headless_chrome::{Browser, Tab};
use std::{ffi::OsStr, sync::Arc, time::Duration};

/// Live target page inside a Chrome instance, reached over the DevTools protocol
#[derive(Clone)]
pub struct ChromePage {
    /// The underlying headless_chrome Browser instance
    browser: Browser,

    target: TargetPattern,
}

impl ChromePage {
    /// Launch a new browser instance and open the target site
    pub fn launch(options: LaunchOptions, target: TargetPattern) -> Result<Self> {
        let mut launch_opts = headless_chrome::LaunchOptions::default();

        // Ignore default arguments to prevent detection by anti-bot services
        launch_opts.ignore_default_args.push(OsStr::new("--enable-automation"));
        launch_opts.args.push(OsStr::new("--disable-blink-features=AutomationControlled"));

        // The bridge idles between requests for long stretches
        launch_opts.idle_browser_timeout = Duration::from_secs(60 * 60 * 24);

        launch_opts.headless = options.headless;
        launch_opts.window_size = Some((options.window_width, options.window_height));
        launch_opts.path = options.chrome_path;
        launch_opts.user_data_dir = options.user_data_dir;
        launch_opts.sandbox = options.sandbox;

        let browser = Browser::new(launch_opts).map_err(|e| BridgeError::LaunchFailed(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| BridgeError::LaunchFailed(format!("Failed to create tab: {}", e)))?;
        tab.navigate_to(&target.start_url())
            .map_err(|e| BridgeError::TabOperationFailed(format!("Failed to open {}: {}", target.start_url(), e)))?;

        log::info!("Launched browser on {}", target.start_url());
        Ok(Self { browser, target })
    }

    /// Connect to an existing browser instance via its DevTools WebSocket URL
    pub fn connect(ws_url: impl Into<String>, target: TargetPattern) -> Result<Self> {
        let browser = Browser::connect(ws_url.into()).map_err(|e| BridgeError::ConnectionFailed(e.to_string()))?;
        Ok(Self { browser, target })
    }

    pub fn target(&self) -> &TargetPattern {
        &self.target
    }

    /// Get all tabs
    pub fn get_tabs(&self) -> Result<Vec<Arc<Tab>>> {
        let tabs = self
            .browser
            .get_tabs()
            .lock()
            .map_err(|e| BridgeError::TabOperationFailed(format!("Failed to get tabs: {}", e)))?
            .clone();

        Ok(tabs)
    }

    /// First tab showing the target site, if any
    pub fn find_target_tab(&self) -> Result<Option<Arc<Tab>>> {
        Ok(self
            .get_tabs()?
            .into_iter()
            .find(|tab| self.target.matches(&tab.get_url())))
    }

    /// Capture the current DOM of a tab
    pub fn snapshot(tab: &Arc<Tab>) -> Result<DomSnapshot> {
        let result = tab
            .evaluate(SNAPSHOT_SCRIPT, false)
            .map_err(|e| BridgeError::SnapshotFailed(format!("Failed to execute DOM snapshot script: {}", e)))?;

        let json_value = result
            .value
            .ok_or_else(|| BridgeError::SnapshotFailed("No value returned from DOM snapshot".to_string()))?;

        // The script returns a JSON string, so it is decoded twice
        let json_str: String = serde_json::from_value(json_value)
            .map_err(|e| BridgeError::SnapshotFailed(format!("Failed to get JSON string: {}", e)))?;

        DomSnapshot::from_json(&json_str)
    }

    /// Snapshot the target tab and extract `node_id` from it (blocking)
    pub fn extract_blocking(&self, node_id: &str, extractor: &TreeExtractor) -> Result<ExtractionResult> {
        let tab = self
            .find_target_tab()?
            .ok_or_else(|| BridgeError::NoTargetAvailable(self.target.label.clone()))?;

        log::debug!("Snapshotting {}", tab.get_url());
        let snapshot = Self::snapshot(&tab)?;
        Ok(extractor.extract(&snapshot, node_id))
    }
}

#[async_trait]
impl PageSource for ChromePage {
    async fn extract_dom(&self, node_id: &str, extractor: &TreeExtractor) -> Result<ExtractionResult> {
        let page = self.clone();
        let node_id = node_id.to_string();
        let extractor = extractor.clone();

        tokio::task::spawn_blocking(move || page.extract_blocking(&node_id, &extractor))
            .await
            .map_err(|e| BridgeError::ExtractionFault(format!("Page task failed: {}", e)))?
    }
}
