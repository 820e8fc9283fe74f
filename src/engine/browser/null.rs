use crate::browser::{BrowserEngine, ScriptFuture};
use crate::source::BLANK_PAGE_URI;
use anyhow::{anyhow, Result};
use futures::FutureExt;
use std::sync::Mutex;
use url::Url;

#[derive(Debug, Default)]
struct History {
    entries: Vec<Url>,
    index: Option<usize>,
}

/// Null browser engine that does not render anything.
///
/// It keeps a back/forward history so the navigation commands behave, and evaluates every
/// script to `None`. Navigation events are not generated; the host feeds them to the control.
#[derive(Debug, Default)]
pub struct NullBrowser {
    history: Mutex<History>,
}

impl NullBrowser {
    /// Creates a new instance of the null browser.
    pub fn new() -> Self {
        Self::default()
    }

    /// URI of the current history entry, if any.
    pub fn current_uri(&self) -> Option<Url> {
        let history = self.history.lock().ok()?;
        history.index.and_then(|i| history.entries.get(i).cloned())
    }

    fn push(&self, uri: Url) -> Result<()> {
        let mut history = self.history.lock().map_err(|_| anyhow!("history lock poisoned"))?;
        let next = history.index.map_or(0, |i| i + 1);
        history.entries.truncate(next);
        history.entries.push(uri);
        history.index = Some(next);
        Ok(())
    }

    fn step(&self, forward: bool) -> Result<()> {
        let mut history = self.history.lock().map_err(|_| anyhow!("history lock poisoned"))?;
        let len = history.entries.len();
        history.index = match history.index {
            Some(i) if forward && i + 1 < len => Some(i + 1),
            Some(i) if !forward && i > 0 => Some(i - 1),
            _ => return Err(anyhow!("no history entry to move to")),
        };
        Ok(())
    }
}

impl BrowserEngine for NullBrowser {
    fn name(&self) -> &str {
        "NullBrowser"
    }

    fn navigate(&self, uri: &Url) -> Result<()> {
        self.push(uri.clone())
    }

    fn navigate_to_string(&self, _html: &str) -> Result<()> {
        self.push(BLANK_PAGE_URI.clone())
    }

    fn execute_script(&self, _script: String) -> ScriptFuture {
        futures::future::ready(Ok(None)).boxed()
    }

    fn go_back(&self) -> Result<()> {
        self.step(false)
    }

    fn go_forward(&self) -> Result<()> {
        self.step(true)
    }

    fn reload(&self) -> Result<()> {
        Ok(())
    }

    fn can_go_back(&self) -> bool {
        self.history
            .lock()
            .map(|h| h.index.map_or(false, |i| i > 0))
            .unwrap_or(false)
    }

    fn can_go_forward(&self) -> bool {
        self.history
            .lock()
            .map(|h| h.index.map_or(false, |i| i + 1 < h.entries.len()))
            .unwrap_or(false)
    }
}
