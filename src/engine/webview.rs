//! The `AsyncWebView` control.
//!
//! The control glues the pieces together: lifecycle flags drive the [`NavigationEngine`]
//! through a [`ControlStateManager`], inbound browser events are routed to the engine, and the
//! bindable properties and commands are exposed to the host.
//!
//! Lifecycle:
//!
//! - construction wires the commands and state triggers but does not navigate;
//! - [`apply_template`](AsyncWebView::apply_template) supplies the browser engine;
//! - [`load`](AsyncWebView::load) enables the engine and dispatches any source set so far;
//! - [`unload`](AsyncWebView::unload) stops listening and optionally clears browsing data.
//!
//! The control is `!Send`. Use [`AsyncWebView::handle`] to reach it from other threads.

use crate::browser::{BrowserEngine, BrowsingDataCleaner};
use crate::commands::{CommandHandle, CommandKind, CompletionCommandArgs};
use crate::config::WebViewConfig;
use crate::dispatcher::{OwnerQueue, WebViewHandle};
use crate::errors::WebViewError;
use crate::events::{BrowserEvent, NavigationStartingArgs, ScriptNotification, WebViewEvent};
use crate::navigation::{NavigationEngine, NavigationMode};
use crate::script::InvokeFuture;
use crate::source::{HttpRequestDescriptor, Source};
use crate::state::{ControlState, ControlStateManager};
use crate::visual_state::VisualState;
use std::fmt::Display;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use url::Url;
use uuid::Uuid;

/// Unique identifier of a web view control.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
pub struct WebViewId(Uuid);

impl WebViewId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WebViewId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for WebViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct AsyncWebView {
    id: WebViewId,
    state: ControlStateManager<NavigationEngine>,
    engine: NavigationEngine,
    open_links_using_external_browser: bool,
    can_open_external_links: bool,
    is_clearing_on_unload: bool,
    browsing_data: Option<Arc<dyn BrowsingDataCleaner>>,
    event_tx: broadcast::Sender<WebViewEvent>,
    queue: OwnerQueue,
    runtime: Handle,
}

impl std::fmt::Debug for AsyncWebView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncWebView")
            .field("id", &self.id)
            .field("state", &self.state.state())
            .field("engine", &self.engine)
            .field("is_clearing_on_unload", &self.is_clearing_on_unload)
            .finish_non_exhaustive()
    }
}

impl AsyncWebView {
    /// Creates a control. Background work runs on the configured runtime, or on the runtime
    /// of the calling context.
    pub fn new(config: WebViewConfig) -> Result<Self, WebViewError> {
        let runtime = match config.runtime.clone() {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| WebViewError::NoRuntime)?,
        };

        let id = WebViewId::new();
        let (event_tx, _) = broadcast::channel(config.event_capacity.max(1));
        let engine = NavigationEngine::new(id, &config, event_tx.clone(), runtime.clone());

        let mut state = ControlStateManager::<NavigationEngine>::new();
        state.add_subscription(
            ControlState::READY,
            ControlState::LOADED,
            NavigationEngine::subscribe_to_browser,
        );
        state.add_set_trigger(ControlState::READY, |engine: &mut NavigationEngine| {
            engine.set_ready(true);
            engine.update();
        });
        state.add_clear_trigger(ControlState::LOADED, |engine: &mut NavigationEngine| engine.set_ready(false));
        state.add_clear_trigger(ControlState::TEMPLATED, |engine: &mut NavigationEngine| engine.set_ready(false));

        log::debug!("WebView[{id}]: created.");

        Ok(Self {
            id,
            state,
            engine,
            open_links_using_external_browser: config.open_links_using_external_browser,
            can_open_external_links: config.can_open_external_links,
            is_clearing_on_unload: config.is_clearing_on_unload,
            browsing_data: config.browsing_data.clone(),
            event_tx,
            queue: OwnerQueue::new(),
            runtime,
        })
    }

    pub fn id(&self) -> WebViewId {
        self.id
    }

    // ---------- Lifecycle ----------

    /// Attaches the browser engine. Replacing an attached engine detaches the old one.
    pub fn apply_template(&mut self, browser: Arc<dyn BrowserEngine>) {
        log::debug!("WebView[{}]: applying template with '{}'.", self.id, browser.name());

        self.state.clear_state(ControlState::TEMPLATED, &mut self.engine);
        self.engine.set_browser(Some(browser));
        self.state.set_state(ControlState::TEMPLATED, &mut self.engine);
    }

    pub fn load(&mut self) {
        if self.open_links_using_external_browser {
            self.engine.set_mode(NavigationMode::External);
        }
        self.state.set_state(ControlState::LOADED, &mut self.engine);
    }

    pub fn unload(&mut self) {
        self.state.clear_state(ControlState::LOADED, &mut self.engine);

        if self.is_clearing_on_unload {
            self.clear_browsing_data();
        }
    }

    pub fn set_sized(&mut self, sized: bool) {
        if sized {
            self.state.set_state(ControlState::SIZED, &mut self.engine);
        } else {
            self.state.clear_state(ControlState::SIZED, &mut self.engine);
        }
    }

    pub fn has_state(&self, flags: ControlState) -> bool {
        self.state.has_state(flags)
    }

    pub fn control_state(&self) -> ControlState {
        self.state.state()
    }

    /// Clears cache and cookies for the documents the control is bound to.
    fn clear_browsing_data(&self) {
        let Some(cleaner) = self.browsing_data.clone() else {
            log::warn!("WebView[{}]: no browsing data cleaner configured.", self.id);
            return;
        };

        let uris: Vec<Url> = [
            self.source_uri().cloned(),
            self.source_message().map(|request| request.uri.clone()),
        ]
        .into_iter()
        .flatten()
        .collect();

        let task = cleaner.clear_browsing_data(uris);
        let event_tx = self.event_tx.clone();
        let webview_id = self.id;

        self.runtime.spawn(async move {
            match task.await {
                Ok(()) => {
                    log::info!("WebView[{webview_id}]: cleared browsing data.");
                    let _ = event_tx.send(WebViewEvent::BrowsingDataCleared { webview_id });
                }
                Err(e) => log::error!("WebView[{webview_id}]: failed to clear browsing data: {e:#}"),
            }
        });
    }

    // ---------- Source ----------

    pub fn source(&self) -> &Source {
        self.engine.source()
    }

    pub fn set_source(&mut self, source: impl Into<Source>) {
        self.engine.set_source(source.into());
    }

    pub fn source_uri(&self) -> Option<&Url> {
        self.engine.source().uri()
    }

    pub fn set_source_uri(&mut self, uri: Option<Url>) {
        self.set_source(uri);
    }

    pub fn source_html(&self) -> Option<&str> {
        self.engine.source().html()
    }

    pub fn set_source_html(&mut self, html: Option<String>) {
        self.set_source(html.map_or(Source::None, Source::Html));
    }

    pub fn source_message(&self) -> Option<&HttpRequestDescriptor> {
        self.engine.source().request()
    }

    pub fn set_source_message(&mut self, request: Option<HttpRequestDescriptor>) {
        self.set_source(request.map_or(Source::None, Source::Request));
    }

    // ---------- Options ----------

    pub fn navigation_mode(&self) -> NavigationMode {
        self.engine.mode()
    }

    pub fn set_navigation_mode(&mut self, mode: NavigationMode) {
        self.engine.set_mode(mode);
    }

    pub fn open_links_using_external_browser(&self) -> bool {
        self.open_links_using_external_browser
    }

    /// Legacy alias for [`NavigationMode::External`], applied when the control loads.
    pub fn set_open_links_using_external_browser(&mut self, on: bool) {
        self.open_links_using_external_browser = on;
    }

    pub fn can_open_external_links(&self) -> bool {
        self.can_open_external_links
    }

    pub fn set_can_open_external_links(&mut self, on: bool) {
        self.can_open_external_links = on;
    }

    pub fn is_clearing_on_unload(&self) -> bool {
        self.is_clearing_on_unload
    }

    pub fn set_is_clearing_on_unload(&mut self, on: bool) {
        self.is_clearing_on_unload = on;
    }

    pub fn visual_state(&self) -> Option<VisualState> {
        self.engine.visual_state()
    }

    // ---------- Commands ----------

    pub fn execute(&mut self, kind: CommandKind) -> bool {
        self.engine.execute(kind)
    }

    pub fn can_execute(&self, kind: CommandKind) -> bool {
        self.engine.can_execute(kind)
    }

    pub fn go_back(&mut self) -> bool {
        self.execute(CommandKind::GoBack)
    }

    pub fn go_forward(&mut self) -> bool {
        self.execute(CommandKind::GoForward)
    }

    pub fn refresh(&mut self) -> bool {
        self.execute(CommandKind::Refresh)
    }

    /// Notified every time the enablement of `kind` may have changed.
    pub fn subscribe_can_execute_changed(&self, kind: CommandKind) -> broadcast::Receiver<()> {
        self.engine.commands().get(kind).subscribe()
    }

    pub fn set_completion_command(&mut self, command: Option<CommandHandle<CompletionCommandArgs>>) {
        self.engine.commands_mut().completion = command;
    }

    pub fn set_navigation_command(&mut self, command: Option<CommandHandle<Url>>) {
        self.engine.commands_mut().navigation = command;
    }

    pub fn set_script_notification_command(&mut self, command: Option<CommandHandle<ScriptNotification>>) {
        self.engine.commands_mut().script_notification = command;
    }

    /// Invokes a script in the loaded page. See [`ScriptInvoker`](crate::script::ScriptInvoker).
    pub fn invoke_script(&self, script: &str, arguments: &[String]) -> InvokeFuture {
        self.engine.script_invoker().invoke(script, arguments)
    }

    // ---------- Browser events ----------

    /// Must be called from the browser engine's navigation starting callback, before it
    /// returns.
    pub fn on_navigation_starting(&mut self, args: &mut NavigationStartingArgs) -> Result<(), WebViewError> {
        self.engine.on_navigation_starting(args)
    }

    /// Routes a non-cancelable browser engine event. Returns `true` if it was processed.
    pub fn handle_browser_event(&mut self, event: BrowserEvent) -> bool {
        match event {
            BrowserEvent::NavigationCompleted(args) => self.engine.on_navigation_completed(args),
            BrowserEvent::ProcessFailed { reason } => {
                self.engine.on_process_failed(&reason);
                true
            }
            BrowserEvent::ScriptNotification(notification) => self.engine.on_script_notification(notification),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<WebViewEvent> {
        self.event_tx.subscribe()
    }

    pub fn navigation(&self) -> &NavigationEngine {
        &self.engine
    }

    // ---------- Owner thread ----------

    pub fn handle(&self) -> WebViewHandle {
        self.queue.handle(self.id)
    }

    /// Runs `f` against the control now when called on the owner thread, and queues it for
    /// the owner otherwise.
    pub fn dispatch(&mut self, f: impl FnOnce(&mut AsyncWebView) + Send + 'static) -> Result<(), WebViewError> {
        if self.queue.is_owner_thread() {
            f(self);
            Ok(())
        } else {
            self.handle().post(f)
        }
    }

    /// Runs every queued job. Returns how many ran.
    pub fn pump(&mut self) -> usize {
        let mut count = 0;
        while let Some(job) = self.queue.try_next() {
            job(self);
            count += 1;
        }
        count
    }

    /// Waits for the next queued job and runs it.
    pub async fn process_next(&mut self) -> bool {
        match self.queue.next().await {
            Some(job) => {
                job(self);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NavigationCompletedArgs;
    use crate::testing::{init_logging, url, BrowserCall, FakeBrowser, FakeCleaner, FakeLauncher, RecordingCommand};

    fn webview(config: WebViewConfig) -> AsyncWebView {
        init_logging();
        AsyncWebView::new(config).unwrap()
    }

    fn ready(config: WebViewConfig) -> (AsyncWebView, Arc<FakeBrowser>) {
        let mut wv = webview(config);
        let browser = FakeBrowser::new();
        wv.apply_template(browser.clone());
        wv.load();
        (wv, browser)
    }

    #[test]
    fn construction_requires_a_runtime() {
        assert!(matches!(AsyncWebView::new(WebViewConfig::default()), Err(WebViewError::NoRuntime)));

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let config = WebViewConfig::builder().runtime(rt.handle().clone()).build().unwrap();
        assert!(AsyncWebView::new(config).is_ok());
    }

    #[tokio::test]
    async fn construction_does_not_navigate() {
        let mut wv = webview(WebViewConfig::default());
        wv.set_source_uri(Some(url("https://example.com")));
        assert_eq!(wv.visual_state(), None);
        assert!(!wv.has_state(ControlState::LOADED));
    }

    #[tokio::test]
    async fn buffered_source_is_replayed_once_when_ready() {
        let mut wv = webview(WebViewConfig::default());
        wv.set_source_uri(Some(url("https://example.com")));

        let browser = FakeBrowser::new();
        wv.apply_template(browser.clone());
        assert!(browser.calls().is_empty());

        wv.load();
        wv.set_sized(true);
        assert_eq!(browser.calls(), vec![BrowserCall::Navigate(url("https://example.com"))]);
        assert_eq!(wv.visual_state(), Some(VisualState::Loading));
        assert!(wv.has_state(ControlState::READY | ControlState::SIZED));
    }

    #[tokio::test]
    async fn load_before_template_also_replays() {
        let mut wv = webview(WebViewConfig::default());
        wv.set_source_html(Some("<p>hi</p>".into()));
        wv.load();

        let browser = FakeBrowser::new();
        wv.apply_template(browser.clone());
        assert_eq!(browser.calls(), vec![BrowserCall::NavigateToString("<p>hi</p>".into())]);
    }

    #[tokio::test]
    async fn listeners_follow_the_loaded_window() {
        let (mut wv, browser) = ready(WebViewConfig::default());
        assert_eq!((browser.attached(), browser.detached()), (1, 0));

        wv.unload();
        assert_eq!((browser.attached(), browser.detached()), (1, 1));
        assert!(!wv.handle_browser_event(BrowserEvent::NavigationCompleted(NavigationCompletedArgs::succeeded(None))));

        wv.load();
        assert_eq!((browser.attached(), browser.detached()), (2, 1));
    }

    #[tokio::test]
    async fn replacing_the_template_moves_listeners() {
        let (mut wv, first) = ready(WebViewConfig::default());
        let second = FakeBrowser::new();
        wv.apply_template(second.clone());

        assert_eq!(first.detached(), 1);
        assert_eq!(second.attached(), 1);
    }

    #[tokio::test]
    async fn shadow_properties_normalise_into_source() {
        let (mut wv, _browser) = ready(WebViewConfig::default());

        wv.set_source_html(Some("<b>x</b>".into()));
        assert_eq!(wv.source_html(), Some("<b>x</b>"));
        assert!(wv.source_uri().is_none());

        let request = HttpRequestDescriptor::get(url("https://api.test"));
        wv.set_source_message(Some(request.clone()));
        assert_eq!(wv.source_message(), Some(&request));
        assert!(wv.source_html().is_none());

        wv.set_source_uri(None);
        assert!(wv.source().is_none());
    }

    #[tokio::test]
    async fn legacy_external_flag_applies_at_load() {
        let mut wv = webview(WebViewConfig::builder().open_links_using_external_browser(true).build().unwrap());
        assert_eq!(wv.navigation_mode(), NavigationMode::Internal);
        wv.apply_template(FakeBrowser::new());
        wv.load();
        assert_eq!(wv.navigation_mode(), NavigationMode::External);
    }

    #[tokio::test]
    async fn external_mode_launches_clicked_link() {
        let launcher = FakeLauncher::new(false);
        let (mut wv, browser) = ready(
            WebViewConfig::builder()
                .navigation_mode(NavigationMode::External)
                .external_launcher(launcher.clone())
                .build()
                .unwrap(),
        );

        let mut args = NavigationStartingArgs::new(Some(url("https://news.test/story")));
        wv.on_navigation_starting(&mut args).unwrap();
        assert!(args.cancel);
        assert_eq!(launcher.opened(), vec![url("https://news.test/story")]);
        assert!(browser.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_navigation_then_refresh_retries() {
        let completions = RecordingCommand::<CompletionCommandArgs>::new();
        let (mut wv, browser) = ready(WebViewConfig::builder().network_probe(|| false).build().unwrap());
        wv.set_completion_command(Some(completions.clone()));

        wv.set_source_uri(Some(url("https://down.test")));
        wv.handle_browser_event(BrowserEvent::NavigationCompleted(NavigationCompletedArgs::failed(
            Some(url("https://down.test")),
            "ConnectionAborted",
        )));
        assert_eq!(wv.visual_state(), Some(VisualState::ConnectivityError));
        assert_eq!(completions.received().len(), 1);
        assert!(!completions.received()[0].is_success());

        browser.clear_calls();
        assert!(wv.refresh());
        assert_eq!(browser.calls(), vec![BrowserCall::Navigate(url("https://down.test"))]);
    }

    #[tokio::test]
    async fn script_notification_is_routed() {
        let notifications = RecordingCommand::<ScriptNotification>::new();
        let (mut wv, _browser) = ready(WebViewConfig::default());
        wv.set_script_notification_command(Some(notifications.clone()));

        let handled = wv.handle_browser_event(BrowserEvent::ScriptNotification(ScriptNotification {
            uri: None,
            message: "hello".into(),
            result: Some("ok".into()),
        }));
        assert!(handled);
        assert_eq!(notifications.received()[0].message, "hello");
    }

    #[tokio::test]
    async fn process_failure_is_processed() {
        let (mut wv, _browser) = ready(WebViewConfig::default());
        let mut back = wv.subscribe_can_execute_changed(CommandKind::GoBack);
        assert!(wv.handle_browser_event(BrowserEvent::ProcessFailed { reason: "oom".into() }));
        assert!(back.try_recv().is_ok());
    }

    #[tokio::test]
    async fn invoke_script_without_browser_or_source_is_none() {
        let wv = webview(WebViewConfig::default());
        assert_eq!(wv.invoke_script("eval", &["1".into()]).await.unwrap(), None);

        let (wv, browser) = ready(WebViewConfig::default());
        assert_eq!(wv.invoke_script("eval", &["1".into()]).await.unwrap(), None);
        assert!(browser.calls().is_empty());
    }

    #[tokio::test]
    async fn invoke_script_runs_on_loaded_page() {
        let (mut wv, browser) = ready(WebViewConfig::default());
        wv.set_source_uri(Some(url("https://example.com")));
        browser.set_script_result(Some("42".into()));

        let result = wv.invoke_script("answer", &["life".into()]).await.unwrap();
        assert_eq!(result.as_deref(), Some("42"));
        assert!(browser.calls().contains(&BrowserCall::ExecuteScript("answer(\"life\")".into())));
    }

    #[tokio::test]
    async fn unload_clears_browsing_data_for_bound_uris() {
        let cleaner = FakeCleaner::new();
        let (mut wv, _browser) = ready(
            WebViewConfig::builder()
                .is_clearing_on_unload(true)
                .browsing_data(cleaner.clone())
                .build()
                .unwrap(),
        );
        let mut events = wv.subscribe_events();
        wv.set_source_uri(Some(url("https://example.com")));

        wv.unload();
        assert_eq!(cleaner.requests(), vec![vec![url("https://example.com")]]);

        loop {
            match events.recv().await.unwrap() {
                WebViewEvent::BrowsingDataCleared { webview_id } => {
                    assert_eq!(webview_id, wv.id());
                    break;
                }
                _ => continue,
            }
        }
    }

    #[tokio::test]
    async fn unload_keeps_browsing_data_by_default() {
        let cleaner = FakeCleaner::new();
        let (mut wv, _browser) = ready(WebViewConfig::builder().browsing_data(cleaner.clone()).build().unwrap());
        wv.unload();
        assert!(cleaner.requests().is_empty());
    }

    #[tokio::test]
    async fn handle_runs_jobs_on_the_owner() {
        let (mut wv, _browser) = ready(WebViewConfig::default());
        let handle = wv.handle();
        assert!(handle.is_owner_thread());

        let remote = std::thread::spawn(move || {
            futures::executor::block_on(handle.run(|wv| {
                wv.set_navigation_mode(NavigationMode::Application);
                wv.navigation_mode()
            }))
        });

        assert!(wv.process_next().await);
        assert_eq!(remote.join().unwrap().unwrap(), NavigationMode::Application);

        wv.handle().post(|wv| wv.set_is_clearing_on_unload(true)).unwrap();
        assert_eq!(wv.pump(), 1);
        assert!(wv.is_clearing_on_unload());
    }

    #[tokio::test]
    async fn dispatch_on_the_owner_runs_immediately() {
        let (mut wv, _browser) = ready(WebViewConfig::default());

        wv.dispatch(|wv| wv.set_navigation_mode(NavigationMode::External)).unwrap();
        assert_eq!(wv.navigation_mode(), NavigationMode::External);
        assert_eq!(wv.pump(), 0);

        // Waiting on the queue from the owner thread is refused instead of hanging
        let handle = wv.handle();
        let result = tokio::time::timeout(
            std::time::Duration::from_millis(300),
            handle.run(|wv| wv.navigation_mode()),
        )
        .await;
        assert!(matches!(result, Ok(Err(WebViewError::Dispatch(_)))));
    }

    #[test]
    fn webview_ids_are_unique() {
        assert_ne!(WebViewId::new(), WebViewId::new());
    }
}
