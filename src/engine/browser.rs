//! Adapters to the outside world.
//!
//! The navigation engine never talks to a native widget directly. Everything it needs from the
//! platform is expressed by the traits in this module:
//!
//! - [`BrowserEngine`]: the native web view (WebView2, WKWebView, Android WebKit, an iframe).
//! - [`ExternalLauncher`]: hands URIs to the OS (dialer, mail client, default browser).
//! - [`BrowsingDataCleaner`]: clears cache and cookies.
//!
//! Calls occur on the control's owning thread. Asynchronous results are returned as boxed
//! `'static` futures so they can be spawned or awaited without borrowing the control.
//!
//! A headless implementation, [`NullBrowser`](null::NullBrowser), is provided for tests and
//! hosts without a native widget.

pub mod null;

use crate::source::HttpRequestDescriptor;
use futures::future::BoxFuture;
use url::Url;

/// Result of a script evaluation: the serialized return value, if any.
pub type ScriptFuture = BoxFuture<'static, anyhow::Result<Option<String>>>;

/// A unit of asynchronous adapter work.
pub type TaskFuture = BoxFuture<'static, anyhow::Result<()>>;

/// How an engine accepts script invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScriptDialect {
    /// The engine can call a named function defined in the document, or `eval`
    #[default]
    Function,
    /// The engine only evaluates a script body (iOS, Android)
    EvalOnly,
}

/// The native browser engine behind a web view.
pub trait BrowserEngine: Send + Sync {
    fn name(&self) -> &str;

    fn navigate(&self, uri: &Url) -> anyhow::Result<()>;

    fn navigate_to_string(&self, html: &str) -> anyhow::Result<()>;

    /// Issue a full HTTP request. Engines that cannot do so fall back to navigating to the
    /// request URI.
    fn navigate_to_request(&self, request: &HttpRequestDescriptor) -> anyhow::Result<()> {
        self.navigate(&request.uri)
    }

    fn execute_script(&self, script: String) -> ScriptFuture;

    fn go_back(&self) -> anyhow::Result<()>;

    fn go_forward(&self) -> anyhow::Result<()>;

    fn reload(&self) -> anyhow::Result<()>;

    fn can_go_back(&self) -> bool;

    fn can_go_forward(&self) -> bool;

    fn script_dialect(&self) -> ScriptDialect {
        ScriptDialect::Function
    }

    /// Start forwarding navigation events to the control.
    fn attach_listeners(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Stop forwarding navigation events to the control.
    fn detach_listeners(&self) {}
}

/// Hands URIs to applications outside the web view.
pub trait ExternalLauncher: Send + Sync {
    /// Launch the application registered for an action link (`tel:`, `sms:`, `mailto:`).
    /// Returns `true` if the link was handled.
    fn try_launch(&self, uri: &Url) -> bool;

    /// Open `uri` with the device's browser app.
    fn open_in_browser(&self, uri: Url) -> TaskFuture;
}

/// Clears cache and cookies of the browser engine.
pub trait BrowsingDataCleaner: Send + Sync {
    /// `uris` are the documents the control was bound to. Implementations that can scope the
    /// clearing use them, others clear everything.
    fn clear_browsing_data(&self, uris: Vec<Url>) -> TaskFuture;
}
