//! Run-on-owner-thread primitive.
//!
//! An [`AsyncWebView`] never leaves the thread that created it. Other threads and tasks reach
//! it through a [`WebViewHandle`], which queues closures for the owner. The owner drains the
//! queue with [`AsyncWebView::pump`] (synchronous) or [`AsyncWebView::process_next`] (async).
//! Code already running on the owner thread goes through [`AsyncWebView::dispatch`], which
//! runs the closure immediately.

use crate::errors::WebViewError;
use crate::webview::{AsyncWebView, WebViewId};
use std::thread::ThreadId;
use tokio::sync::{mpsc, oneshot};

/// A closure to run against the control on its owner thread.
pub type OwnerJob = Box<dyn FnOnce(&mut AsyncWebView) + Send>;

/// Cloneable, `Send` handle to a web view living on another thread.
#[derive(Clone)]
pub struct WebViewHandle {
    webview_id: WebViewId,
    owner: ThreadId,
    job_tx: mpsc::UnboundedSender<OwnerJob>,
}

impl std::fmt::Debug for WebViewHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebViewHandle")
            .field("webview_id", &self.webview_id)
            .field("owner", &self.owner)
            .finish()
    }
}

impl WebViewHandle {
    pub fn id(&self) -> WebViewId {
        self.webview_id
    }

    /// True if the caller runs on the thread owning the control.
    pub fn is_owner_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    /// Queue `f` without waiting for it.
    pub fn post(&self, f: impl FnOnce(&mut AsyncWebView) + Send + 'static) -> Result<(), WebViewError> {
        self.job_tx.send(Box::new(f)).map_err(|_| WebViewError::ChannelClosed)
    }

    /// Queue `f` and wait for its result.
    ///
    /// Fails with [`WebViewError::Dispatch`] on the owner thread, where the queue is only
    /// drained by the caller itself. Use [`AsyncWebView::dispatch`] there.
    pub async fn run<R, F>(&self, f: F) -> Result<R, WebViewError>
    where
        R: Send + 'static,
        F: FnOnce(&mut AsyncWebView) -> R + Send + 'static,
    {
        if self.is_owner_thread() {
            return Err(WebViewError::Dispatch(format!(
                "WebView[{}]: run awaited on its owner thread",
                self.webview_id
            )));
        }

        let (tx, rx) = oneshot::channel();
        self.post(move |webview| {
            // The caller may have given up waiting.
            let _ = tx.send(f(webview));
        })?;

        rx.await
            .map_err(|e| WebViewError::Dispatch(format!("job dropped before completion: {e}")))
    }
}

/// Receiving side of the owner queue, held by the control.
pub(crate) struct OwnerQueue {
    job_tx: mpsc::UnboundedSender<OwnerJob>,
    job_rx: mpsc::UnboundedReceiver<OwnerJob>,
    owner: ThreadId,
}

impl OwnerQueue {
    pub(crate) fn new() -> Self {
        let (job_tx, job_rx) = mpsc::unbounded_channel();
        Self {
            job_tx,
            job_rx,
            owner: std::thread::current().id(),
        }
    }

    pub(crate) fn handle(&self, webview_id: WebViewId) -> WebViewHandle {
        WebViewHandle {
            webview_id,
            owner: self.owner,
            job_tx: self.job_tx.clone(),
        }
    }

    pub(crate) fn is_owner_thread(&self) -> bool {
        std::thread::current().id() == self.owner
    }

    pub(crate) fn try_next(&mut self) -> Option<OwnerJob> {
        self.job_rx.try_recv().ok()
    }

    pub(crate) async fn next(&mut self) -> Option<OwnerJob> {
        self.job_rx.recv().await
    }
}
