//! Recording fakes for the adapter traits.

use crate::browser::{BrowserEngine, BrowsingDataCleaner, ExternalLauncher, ScriptDialect, ScriptFuture, TaskFuture};
use crate::commands::Command;
use crate::source::HttpRequestDescriptor;
use anyhow::anyhow;
use futures::FutureExt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use url::Url;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn url(s: &str) -> Url {
    Url::parse(s).unwrap()
}

#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCall {
    Navigate(Url),
    NavigateToString(String),
    NavigateToRequest(Url),
    ExecuteScript(String),
    GoBack,
    GoForward,
    Reload,
}

#[derive(Debug, Default)]
pub struct FakeBrowser {
    calls: Mutex<Vec<BrowserCall>>,
    dialect: ScriptDialect,
    script_result: Mutex<Option<String>>,
    fail_scripts: AtomicBool,
    can_go_back: AtomicBool,
    can_go_forward: AtomicBool,
    attached: AtomicUsize,
    detached: AtomicUsize,
}

impl FakeBrowser {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn eval_only() -> Arc<Self> {
        Arc::new(Self {
            dialect: ScriptDialect::EvalOnly,
            ..Self::default()
        })
    }

    pub fn calls(&self) -> Vec<BrowserCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn set_script_result(&self, result: Option<String>) {
        *self.script_result.lock().unwrap() = result;
    }

    pub fn fail_scripts(&self, fail: bool) {
        self.fail_scripts.store(fail, Ordering::SeqCst);
    }

    pub fn set_history(&self, can_go_back: bool, can_go_forward: bool) {
        self.can_go_back.store(can_go_back, Ordering::SeqCst);
        self.can_go_forward.store(can_go_forward, Ordering::SeqCst);
    }

    pub fn attached(&self) -> usize {
        self.attached.load(Ordering::SeqCst)
    }

    pub fn detached(&self) -> usize {
        self.detached.load(Ordering::SeqCst)
    }

    fn record(&self, call: BrowserCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BrowserEngine for FakeBrowser {
    fn name(&self) -> &str {
        "FakeBrowser"
    }

    fn navigate(&self, uri: &Url) -> anyhow::Result<()> {
        self.record(BrowserCall::Navigate(uri.clone()));
        Ok(())
    }

    fn navigate_to_string(&self, html: &str) -> anyhow::Result<()> {
        self.record(BrowserCall::NavigateToString(html.to_string()));
        Ok(())
    }

    fn navigate_to_request(&self, request: &HttpRequestDescriptor) -> anyhow::Result<()> {
        self.record(BrowserCall::NavigateToRequest(request.uri.clone()));
        Ok(())
    }

    fn execute_script(&self, script: String) -> ScriptFuture {
        self.record(BrowserCall::ExecuteScript(script));
        let result = if self.fail_scripts.load(Ordering::SeqCst) {
            Err(anyhow!("script error"))
        } else {
            Ok(self.script_result.lock().unwrap().clone())
        };
        futures::future::ready(result).boxed()
    }

    fn go_back(&self) -> anyhow::Result<()> {
        self.record(BrowserCall::GoBack);
        Ok(())
    }

    fn go_forward(&self) -> anyhow::Result<()> {
        self.record(BrowserCall::GoForward);
        Ok(())
    }

    fn reload(&self) -> anyhow::Result<()> {
        self.record(BrowserCall::Reload);
        Ok(())
    }

    fn can_go_back(&self) -> bool {
        self.can_go_back.load(Ordering::SeqCst)
    }

    fn can_go_forward(&self) -> bool {
        self.can_go_forward.load(Ordering::SeqCst)
    }

    fn script_dialect(&self) -> ScriptDialect {
        self.dialect
    }

    fn attach_listeners(&self) -> anyhow::Result<()> {
        self.attached.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn detach_listeners(&self) {
        self.detached.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct FakeLauncher {
    handles_action_links: bool,
    launched: Mutex<Vec<Url>>,
    opened: Mutex<Vec<Url>>,
}

impl FakeLauncher {
    pub fn new(handles_action_links: bool) -> Arc<Self> {
        Arc::new(Self {
            handles_action_links,
            ..Self::default()
        })
    }

    /// Action links offered to the launcher.
    pub fn launched(&self) -> Vec<Url> {
        self.launched.lock().unwrap().clone()
    }

    /// URIs opened in the external browser.
    pub fn opened(&self) -> Vec<Url> {
        self.opened.lock().unwrap().clone()
    }
}

impl ExternalLauncher for FakeLauncher {
    fn try_launch(&self, uri: &Url) -> bool {
        self.launched.lock().unwrap().push(uri.clone());
        self.handles_action_links
    }

    fn open_in_browser(&self, uri: Url) -> TaskFuture {
        self.opened.lock().unwrap().push(uri);
        futures::future::ready(Ok(())).boxed()
    }
}

#[derive(Debug, Default)]
pub struct FakeCleaner {
    requests: Mutex<Vec<Vec<Url>>>,
}

impl FakeCleaner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn requests(&self) -> Vec<Vec<Url>> {
        self.requests.lock().unwrap().clone()
    }
}

impl BrowsingDataCleaner for FakeCleaner {
    fn clear_browsing_data(&self, uris: Vec<Url>) -> TaskFuture {
        self.requests.lock().unwrap().push(uris);
        futures::future::ready(Ok(())).boxed()
    }
}

/// A bound command that keeps every parameter it was executed with.
pub struct RecordingCommand<P> {
    received: Mutex<Vec<P>>,
}

impl<P: Clone + Send + 'static> RecordingCommand<P> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            received: Mutex::new(Vec::new()),
        })
    }

    pub fn received(&self) -> Vec<P> {
        self.received.lock().unwrap().clone()
    }
}

impl<P: Send> Command<P> for RecordingCommand<P> {
    fn execute(&self, parameter: P) {
        self.received.lock().unwrap().push(parameter);
    }
}
