//! The web view control and its navigation engine.
//!
//! [`AsyncWebView`](webview::AsyncWebView) wraps a native browser engine (supplied through
//! the [`BrowserEngine`](browser::BrowserEngine) trait) and adds declarative source binding,
//! link interception, visual states and lifecycle-bound clearing of browsing data.

pub mod browser;
pub mod commands;
pub mod config;
pub mod cookies;
pub mod dispatcher;
pub mod errors;
pub mod events;
pub mod links;
pub mod navigation;
pub mod script;
pub mod source;
pub mod state;
pub mod visual_state;
pub mod webview;

#[cfg(test)]
pub(crate) mod testing;

/// Capacity of the broadcast channels created by the crate.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

pub use browser::null::NullBrowser;
pub use browser::{BrowserEngine, BrowsingDataCleaner, ExternalLauncher, ScriptDialect};
pub use commands::{Command, CommandHandle, CommandKind, CompletionCommandArgs, RelayCommand};
pub use config::{WebViewConfig, WebViewConfigBuilder, WebViewConfigError, WebViewSettings};
pub use errors::WebViewError;
pub use events::{BrowserEvent, NavigationCompletedArgs, NavigationStartingArgs, ScriptNotification, WebViewEvent};
pub use navigation::{NavigationHooks, NavigationMode};
pub use source::{HttpRequestDescriptor, Source};
pub use state::ControlState;
pub use visual_state::VisualState;
pub use webview::{AsyncWebView, WebViewId};
