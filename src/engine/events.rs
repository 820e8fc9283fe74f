//! Web view event types.
//!
//! Inbound events come from the browser engine adapter and are fed into the control on the
//! owner thread. Outbound events are published by the control on its broadcast bus so that
//! bindings and application code can react.
//!
//! # Main Types
//!
//! - [`NavigationStartingArgs`]: cancelable notification, handled synchronously.
//! - [`NavigationCompletedArgs`]: outcome of a navigation as reported by the engine.
//! - [`ScriptNotification`]: message posted by page script.
//! - [`BrowserEvent`]: the non-cancelable inbound events.
//! - [`WebViewEvent`]: everything the control publishes.

use crate::navigation::NavigationMode;
use crate::source::Source;
use crate::visual_state::VisualState;
use crate::webview::WebViewId;
use std::fmt::Display;
use url::Url;

/// A navigation is about to start. Setting `cancel` before the handler returns stops it.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStartingArgs {
    /// Target of the navigation, `None` when raw HTML is being loaded
    pub uri: Option<Url>,
    /// Set to `true` to cancel the navigation
    pub cancel: bool,
}

impl NavigationStartingArgs {
    pub fn new(uri: Option<Url>) -> Self {
        Self { uri, cancel: false }
    }
}

/// A navigation has completed, successfully or not.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationCompletedArgs {
    /// URI the engine landed on, if any
    pub uri: Option<Url>,
    pub is_success: bool,
    /// Engine specific error status for failed navigations
    pub error: Option<String>,
}

impl NavigationCompletedArgs {
    pub fn succeeded(uri: Option<Url>) -> Self {
        Self {
            uri,
            is_success: true,
            error: None,
        }
    }

    pub fn failed(uri: Option<Url>, error: impl Into<String>) -> Self {
        Self {
            uri,
            is_success: false,
            error: Some(error.into()),
        }
    }
}

/// A message posted by script running in the page (or a script dialog being opened).
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptNotification {
    /// Page that sent the message
    pub uri: Option<Url>,
    pub message: String,
    /// Default result text, for dialogs that carry one
    pub result: Option<String>,
}

/// Non-cancelable events raised by the browser engine.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserEvent {
    NavigationCompleted(NavigationCompletedArgs),
    /// The engine's process crashed or was terminated
    ProcessFailed { reason: String },
    ScriptNotification(ScriptNotification),
}

/// Why the control canceled a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    /// The navigation-starting hook denied it
    Denied,
    /// An action link was handed to an external application
    ActionLink,
    /// The link was redirected according to the navigation mode
    Redirected(NavigationMode),
    /// A bound navigation command took ownership of it
    NavigationCommand,
}

impl Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancelReason::Denied => write!(f, "denied"),
            CancelReason::ActionLink => write!(f, "action link"),
            CancelReason::Redirected(mode) => write!(f, "redirected ({mode:?})"),
            CancelReason::NavigationCommand => write!(f, "navigation command"),
        }
    }
}

/// Events published by the web view control.
#[derive(Debug, Clone)]
pub enum WebViewEvent {
    /// The visual state changed
    VisualStateChanged { webview_id: WebViewId, state: VisualState },
    /// The bound source changed, either by the host or by a followed link
    SourceChanged { webview_id: WebViewId, source: Source },
    /// A navigation was canceled by the control
    NavigationCanceled {
        webview_id: WebViewId,
        uri: Option<Url>,
        reason: CancelReason,
    },
    /// A link was handed to the external browser or the application navigation hook
    ExternalNavigation {
        webview_id: WebViewId,
        uri: Url,
        mode: NavigationMode,
    },
    /// A navigation completed and was processed
    NavigationCompleted {
        webview_id: WebViewId,
        uri: Option<Url>,
        success: bool,
    },
    /// Back/forward availability may have changed
    HistoryChanged {
        webview_id: WebViewId,
        can_go_back: bool,
        can_go_forward: bool,
    },
    /// Browsing data (cache and cookies) was cleared
    BrowsingDataCleared { webview_id: WebViewId },
}
