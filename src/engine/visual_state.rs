//! Named visual states of the web view and the projector that pushes them outward.

use crate::events::WebViewEvent;
use crate::webview::WebViewId;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tokio::sync::broadcast;

/// Appearance the presentation layer should show (spinner, error screen, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisualState {
    /// A source-driven navigation is in flight
    Loading,
    /// The current document is being reloaded
    Refreshing,
    /// The user followed a link inside the page
    Navigating,
    /// The last navigation succeeded
    Ready,
    /// The last navigation failed while the network was available
    Error,
    /// The last navigation failed while the network was unavailable
    ConnectivityError,
}

impl VisualState {
    pub const ALL: [VisualState; 6] = [
        VisualState::Loading,
        VisualState::Refreshing,
        VisualState::Navigating,
        VisualState::Ready,
        VisualState::Error,
        VisualState::ConnectivityError,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            VisualState::Loading => "Loading",
            VisualState::Refreshing => "Refreshing",
            VisualState::Navigating => "Navigating",
            VisualState::Ready => "Ready",
            VisualState::Error => "Error",
            VisualState::ConnectivityError => "ConnectivityError",
        }
    }

    /// State to show for a failed navigation.
    pub fn for_failure(network_available: bool) -> Self {
        if network_available {
            VisualState::Error
        } else {
            VisualState::ConnectivityError
        }
    }
}

impl Display for VisualState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Applies the latest requested visual state. Never consulted by navigation decisions.
#[derive(Debug)]
pub struct VisualStateProjector {
    webview_id: WebViewId,
    current: Option<VisualState>,
    event_tx: broadcast::Sender<WebViewEvent>,
}

impl VisualStateProjector {
    pub(crate) fn new(webview_id: WebViewId, event_tx: broadcast::Sender<WebViewEvent>) -> Self {
        Self {
            webview_id,
            current: None,
            event_tx,
        }
    }

    pub fn current(&self) -> Option<VisualState> {
        self.current
    }

    pub(crate) fn go_to(&mut self, state: VisualState) {
        log::trace!("WebView[{}]: visual state -> {}", self.webview_id, state);

        self.current = Some(state);
        // No receivers is fine.
        let _ = self.event_tx.send(WebViewEvent::VisualStateChanged {
            webview_id: self.webview_id,
            state,
        });
    }
}
