//! Web view configuration.
//!
//! `WebViewConfig` carries everything a control needs at construction: the navigation
//! policy, lifecycle options, and the collaborators used for work the control does not do
//! itself (opening links outside the view, application navigation, clearing browsing data,
//! probing the network).
//!
//! `WebViewConfig` provides defaults via [`Default`] and a fluent [`WebViewConfig::builder()`]
//! with validation. The plain options can also be loaded from JSON as [`WebViewSettings`].
//!
//! # Examples
//!
//! ```rust
//! use async_webview::{NavigationMode, WebViewConfig};
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = WebViewConfig::builder()
//!     .navigation_mode(NavigationMode::External)
//!     .is_clearing_on_unload(true)
//!     .network_probe(|| true)
//!     .build()?; // returns Result<WebViewConfig, WebViewConfigError>
//! # Ok(()) }
//! ```
//!
//! # Fields (summary)
//! - `navigation_mode`: How links followed inside the page are resolved (default: `Internal`).
//! - `open_links_using_external_browser`: Legacy flag, forces `External` when the control loads.
//! - `can_open_external_links`: Informational flag exposed to bindings.
//! - `is_clearing_on_unload`: Clear cache and cookies when the control unloads.
//! - `event_capacity`: Capacity of the outbound event bus (must be at least 1).
//! - `application_navigation`: Handler for links in `Application` mode.
//! - `network_probe`: Network availability probe. Unset means available.
//! - `hooks`: Overridable navigation hooks.
//! - `external_launcher`: Opens action links and external links.
//! - `browsing_data`: Clears cache and cookies.
//! - `runtime`: Runtime used for background work. Falls back to the current runtime.
//!
//! # Errors
//!
//! Builder validation returns [`WebViewConfigError`] if values are invalid.

use crate::browser::{BrowsingDataCleaner, ExternalLauncher, TaskFuture};
use crate::navigation::{DefaultNavigationHooks, NavigationHooks, NavigationMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Handler for links followed in [`NavigationMode::Application`].
pub type ApplicationNavigation = Arc<dyn Fn(Url) -> TaskFuture + Send + Sync>;

/// Returns `true` if the network is available.
pub type NetworkProbe = Arc<dyn Fn() -> bool + Send + Sync>;

#[derive(Clone)]
pub struct WebViewConfig {
    pub navigation_mode: NavigationMode,
    pub open_links_using_external_browser: bool,
    pub can_open_external_links: bool,
    pub is_clearing_on_unload: bool,
    pub event_capacity: usize,
    pub application_navigation: Option<ApplicationNavigation>,
    pub network_probe: Option<NetworkProbe>,
    pub hooks: Arc<dyn NavigationHooks>,
    pub external_launcher: Option<Arc<dyn ExternalLauncher>>,
    pub browsing_data: Option<Arc<dyn BrowsingDataCleaner>>,
    pub runtime: Option<tokio::runtime::Handle>,
}

impl Default for WebViewConfig {
    fn default() -> Self {
        Self {
            navigation_mode: NavigationMode::Internal,
            open_links_using_external_browser: false,
            can_open_external_links: false,
            is_clearing_on_unload: false,
            event_capacity: crate::DEFAULT_CHANNEL_CAPACITY,
            application_navigation: None,
            network_probe: None,
            hooks: Arc::new(DefaultNavigationHooks),
            external_launcher: None,
            browsing_data: None,
            runtime: None,
        }
    }
}

impl fmt::Debug for WebViewConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebViewConfig")
            .field("navigation_mode", &self.navigation_mode)
            .field("open_links_using_external_browser", &self.open_links_using_external_browser)
            .field("can_open_external_links", &self.can_open_external_links)
            .field("is_clearing_on_unload", &self.is_clearing_on_unload)
            .field("event_capacity", &self.event_capacity)
            .field("application_navigation", &self.application_navigation.is_some())
            .field("network_probe", &self.network_probe.is_some())
            .field("external_launcher", &self.external_launcher.is_some())
            .field("browsing_data", &self.browsing_data.is_some())
            .finish_non_exhaustive()
    }
}

impl WebViewConfig {
    pub fn builder() -> WebViewConfigBuilder {
        WebViewConfigBuilder::default()
    }
}

/// Builder for [`WebViewConfig`].
#[derive(Debug, Clone, Default)]
pub struct WebViewConfigBuilder {
    inner: WebViewConfig,
}

impl WebViewConfigBuilder {
    #[inline]
    fn map(mut self, f: impl FnOnce(&mut WebViewConfig)) -> Self {
        f(&mut self.inner);
        self
    }

    pub fn navigation_mode(self, mode: NavigationMode) -> Self { self.map(|c| c.navigation_mode = mode) }
    pub fn open_links_using_external_browser(self, on: bool) -> Self { self.map(|c| c.open_links_using_external_browser = on) }
    pub fn can_open_external_links(self, on: bool) -> Self { self.map(|c| c.can_open_external_links = on) }
    pub fn is_clearing_on_unload(self, on: bool) -> Self { self.map(|c| c.is_clearing_on_unload = on) }
    pub fn event_capacity(self, n: usize) -> Self { self.map(|c| c.event_capacity = n) }
    pub fn hooks(self, hooks: Arc<dyn NavigationHooks>) -> Self { self.map(|c| c.hooks = hooks) }
    pub fn external_launcher(self, launcher: Arc<dyn ExternalLauncher>) -> Self { self.map(|c| c.external_launcher = Some(launcher)) }
    pub fn browsing_data(self, cleaner: Arc<dyn BrowsingDataCleaner>) -> Self { self.map(|c| c.browsing_data = Some(cleaner)) }
    pub fn runtime(self, handle: tokio::runtime::Handle) -> Self { self.map(|c| c.runtime = Some(handle)) }

    pub fn application_navigation(self, f: impl Fn(Url) -> TaskFuture + Send + Sync + 'static) -> Self {
        self.map(|c| c.application_navigation = Some(Arc::new(f)))
    }

    pub fn network_probe(self, f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        self.map(|c| c.network_probe = Some(Arc::new(f)))
    }

    /// Apply the plain options loaded from settings.
    pub fn settings(self, s: &WebViewSettings) -> Self {
        self.map(|c| {
            c.navigation_mode = s.navigation_mode;
            c.open_links_using_external_browser = s.open_links_using_external_browser;
            c.can_open_external_links = s.can_open_external_links;
            c.is_clearing_on_unload = s.is_clearing_on_unload;
            c.event_capacity = s.event_capacity;
        })
    }

    /// Apply multiple changes in one go.
    pub fn with(self, f: impl FnOnce(&mut WebViewConfig)) -> Self { self.map(f) }

    /// Validate and build the final config.
    pub fn build(self) -> Result<WebViewConfig, WebViewConfigError> {
        validate(&self.inner)?;
        Ok(self.inner)
    }
}

/// The serializable part of [`WebViewConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebViewSettings {
    pub navigation_mode: NavigationMode,
    pub open_links_using_external_browser: bool,
    pub can_open_external_links: bool,
    pub is_clearing_on_unload: bool,
    pub event_capacity: usize,
}

impl Default for WebViewSettings {
    fn default() -> Self {
        let c = WebViewConfig::default();
        Self {
            navigation_mode: c.navigation_mode,
            open_links_using_external_browser: c.open_links_using_external_browser,
            can_open_external_links: c.can_open_external_links,
            is_clearing_on_unload: c.is_clearing_on_unload,
            event_capacity: c.event_capacity,
        }
    }
}

impl WebViewSettings {
    pub fn from_json(json: &str) -> Result<Self, WebViewConfigError> {
        serde_json::from_str(json).map_err(|e| WebViewConfigError::InvalidSettings(e.to_string()))
    }
}

// ---------- Validation ----------

#[derive(Debug, Clone)]
pub enum WebViewConfigError {
    ZeroEventCapacity,
    InvalidSettings(String),
}

impl fmt::Display for WebViewConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebViewConfigError::ZeroEventCapacity => write!(f, "event_capacity must be at least 1"),
            WebViewConfigError::InvalidSettings(e) => write!(f, "invalid web view settings: {e}"),
        }
    }
}
impl std::error::Error for WebViewConfigError {}

fn validate(c: &WebViewConfig) -> Result<(), WebViewConfigError> {
    if c.event_capacity == 0 {
        return Err(WebViewConfigError::ZeroEventCapacity);
    }
    Ok(())
}
