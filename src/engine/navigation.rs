//! The navigation state machine.
//!
//! [`NavigationEngine`] owns the bound [`Source`], the [`NavigationMode`] policy and the
//! transient flags that tell source-driven navigations apart from links followed inside the
//! page. It decides, for every event coming from the browser engine, whether to allow the
//! navigation, hand it to something outside the view, or treat it as part of a source update.
//!
//! The engine is inert until the control reports it ready (loaded and templated). A source
//! assigned before that is kept and dispatched once readiness is reached.
//!
//! All methods must be called on the control's owner thread. Work that has to happen outside
//! the view (launching the browser app, application navigation) is started synchronously and
//! driven to completion on the configured tokio runtime.

use crate::browser::{BrowserEngine, ExternalLauncher, TaskFuture};
use crate::commands::{CommandFacade, CommandKind, CompletionCommandArgs};
use crate::config::{ApplicationNavigation, NetworkProbe, WebViewConfig};
use crate::errors::WebViewError;
use crate::events::{
    CancelReason, NavigationCompletedArgs, NavigationStartingArgs, ScriptNotification, WebViewEvent,
};
use crate::links::is_action_link;
use crate::script::ScriptInvoker;
use crate::source::{is_blank, Source, BLANK_PAGE_URI};
use crate::state::Disposer;
use crate::visual_state::{VisualState, VisualStateProjector};
use crate::webview::WebViewId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use url::Url;

/// How a navigation that was not caused by a source change is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NavigationMode {
    /// Links open inside the web view
    #[default]
    Internal,
    /// Links open in the device's browser app
    External,
    /// Links are handed to the application navigation handler
    Application,
}

/// Overridable decision points of the navigation protocol.
pub trait NavigationHooks: Send + Sync {
    /// Return `false` to cancel the navigation.
    fn on_navigation_starting(&self, args: &NavigationStartingArgs) -> bool {
        log::trace!(
            "Navigation starting to '{}'.",
            args.uri.as_ref().map_or("<html>", |u| u.as_str())
        );
        true
    }

    fn on_navigation_succeeded(&self, _args: &NavigationCompletedArgs) {}

    fn on_navigation_failed(&self, _args: &NavigationCompletedArgs) {}
}

/// Hooks that allow every navigation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultNavigationHooks;

impl NavigationHooks for DefaultNavigationHooks {}

pub struct NavigationEngine {
    webview_id: WebViewId,
    browser: Option<Arc<dyn BrowserEngine>>,
    source: Source,
    mode: NavigationMode,
    /// Loaded and templated
    ready: bool,
    /// Browser engine events are being processed
    listening: bool,
    /// A source-driven navigation is in flight
    is_updating: bool,
    /// The last source-driven navigation failed
    is_last_error_on_source: bool,
    /// A reload of the current document is in flight
    is_refreshing: bool,
    /// The blank page is being loaded to mask a failed navigation
    masking_failure: bool,
    visual: VisualStateProjector,
    commands: CommandFacade,
    hooks: Arc<dyn NavigationHooks>,
    application_navigation: Option<ApplicationNavigation>,
    network_probe: Option<NetworkProbe>,
    launcher: Option<Arc<dyn ExternalLauncher>>,
    event_tx: broadcast::Sender<WebViewEvent>,
    runtime: Handle,
}

impl std::fmt::Debug for NavigationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NavigationEngine")
            .field("webview_id", &self.webview_id)
            .field("browser", &self.browser.as_ref().map(|b| b.name().to_string()))
            .field("source", &self.source)
            .field("mode", &self.mode)
            .field("ready", &self.ready)
            .field("is_updating", &self.is_updating)
            .field("is_last_error_on_source", &self.is_last_error_on_source)
            .field("is_refreshing", &self.is_refreshing)
            .field("visual_state", &self.visual.current())
            .finish_non_exhaustive()
    }
}

impl NavigationEngine {
    pub(crate) fn new(
        webview_id: WebViewId,
        config: &WebViewConfig,
        event_tx: broadcast::Sender<WebViewEvent>,
        runtime: Handle,
    ) -> Self {
        Self {
            webview_id,
            browser: None,
            source: Source::None,
            mode: config.navigation_mode,
            ready: false,
            listening: false,
            is_updating: false,
            is_last_error_on_source: false,
            is_refreshing: false,
            masking_failure: false,
            visual: VisualStateProjector::new(webview_id, event_tx.clone()),
            commands: CommandFacade::new(),
            hooks: config.hooks.clone(),
            application_navigation: config.application_navigation.clone(),
            network_probe: config.network_probe.clone(),
            launcher: config.external_launcher.clone(),
            event_tx,
            runtime,
        }
    }

    pub fn webview_id(&self) -> WebViewId {
        self.webview_id
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn mode(&self) -> NavigationMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: NavigationMode) {
        self.mode = mode;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn is_updating(&self) -> bool {
        self.is_updating
    }

    pub fn is_last_error_on_source(&self) -> bool {
        self.is_last_error_on_source
    }

    pub fn visual_state(&self) -> Option<VisualState> {
        self.visual.current()
    }

    pub fn commands(&self) -> &CommandFacade {
        &self.commands
    }

    pub(crate) fn commands_mut(&mut self) -> &mut CommandFacade {
        &mut self.commands
    }

    pub fn browser(&self) -> Option<&Arc<dyn BrowserEngine>> {
        self.browser.as_ref()
    }

    pub(crate) fn set_browser(&mut self, browser: Option<Arc<dyn BrowserEngine>>) {
        self.browser = browser;
    }

    pub(crate) fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Script invoker bound to the current browser engine and source.
    pub fn script_invoker(&self) -> ScriptInvoker {
        ScriptInvoker::new(self.browser.clone(), !self.source.is_none())
    }

    fn emit(&self, event: WebViewEvent) {
        // No receivers is fine.
        let _ = self.event_tx.send(event);
    }

    fn spawn_logged(&self, what: &'static str, task: TaskFuture) {
        self.runtime.spawn(async move {
            if let Err(e) = task.await {
                log::error!("{what} failed: {e:#}");
            }
        });
    }

    fn ready_browser(&self) -> Result<Arc<dyn BrowserEngine>, WebViewError> {
        if !self.ready {
            return Err(WebViewError::NotReady);
        }
        self.browser.clone().ok_or(WebViewError::NotReady)
    }

    /// Starts processing browser engine events. Returns the disposer that stops it.
    pub(crate) fn subscribe_to_browser(&mut self) -> Option<Disposer<Self>> {
        let browser = self.browser.clone()?;
        if let Err(e) = browser.attach_listeners() {
            log::error!("Failed to attach to '{}' events: {e:#}", browser.name());
            return None;
        }

        log::debug!("WebView[{}]: listening to '{}' events.", self.webview_id, browser.name());
        self.listening = true;

        Some(Box::new(move |engine: &mut NavigationEngine| {
            browser.detach_listeners();
            engine.listening = false;
            log::debug!("WebView[{}]: stopped listening to '{}' events.", engine.webview_id, browser.name());
        }))
    }

    /// Re-dispatches the current source, if any.
    pub fn update(&mut self) {
        if !self.ready {
            return;
        }
        if !self.source.is_none() {
            self.apply_source();
        }
    }

    /// Binds a new source and dispatches it when ready.
    pub fn set_source(&mut self, source: Source) {
        self.source = source;
        self.emit(WebViewEvent::SourceChanged {
            webview_id: self.webview_id,
            source: self.source.clone(),
        });
        self.apply_source();
    }

    /// Records the URI of a link followed inside the page without dispatching it.
    fn adopt_observed_uri(&mut self, uri: Url) {
        self.source = Source::Uri(uri);
        self.emit(WebViewEvent::SourceChanged {
            webview_id: self.webview_id,
            source: self.source.clone(),
        });
    }

    fn apply_source(&mut self) {
        if !self.ready {
            log::debug!("WebView[{}]: not ready, source is kept until loaded.", self.webview_id);
            return;
        }
        let Some(browser) = self.browser.clone() else {
            log::warn!("WebView[{}]: no browser engine attached.", self.webview_id);
            return;
        };

        self.is_updating = true;
        self.is_refreshing = false;
        self.masking_failure = false;
        self.visual.go_to(VisualState::Loading);

        let result = match &self.source {
            Source::None => browser.navigate(&BLANK_PAGE_URI),
            Source::Uri(uri) => browser.navigate(uri),
            Source::Html(html) => browser.navigate_to_string(html),
            Source::Request(request) => browser.navigate_to_request(request),
        };

        if let Err(e) = result {
            log::error!("WebView[{}]: failed to dispatch the source: {e:#}", self.webview_id);
        }
    }

    fn navigate_to_blank(&self) {
        if let Some(browser) = &self.browser {
            if let Err(e) = browser.navigate(&BLANK_PAGE_URI) {
                log::error!("Failed to navigate to the blank page: {e:#}");
            }
        }
    }

    fn cancel(&self, args: &mut NavigationStartingArgs, reason: CancelReason) {
        log::debug!(
            "WebView[{}]: navigation to '{}' canceled: {reason}",
            self.webview_id,
            args.uri.as_ref().map_or("<html>", |u| u.as_str())
        );
        args.cancel = true;
        self.emit(WebViewEvent::NavigationCanceled {
            webview_id: self.webview_id,
            uri: args.uri.clone(),
            reason,
        });
    }

    /// Decides whether a starting navigation may proceed. Must run before the browser
    /// engine's callback returns; the decision is written to `args.cancel`.
    pub fn on_navigation_starting(&mut self, args: &mut NavigationStartingArgs) -> Result<(), WebViewError> {
        if !self.listening {
            return Ok(());
        }

        if !self.hooks.on_navigation_starting(args) {
            self.cancel(args, CancelReason::Denied);
            return Ok(());
        }

        // Raw HTML is always allowed
        let Some(uri) = args.uri.clone() else {
            return Ok(());
        };

        if is_blank(&uri) {
            return Ok(());
        }

        if is_action_link(uri.as_str()) {
            let handled = self.launcher.as_ref().map_or(false, |l| l.try_launch(&uri));
            if handled {
                self.cancel(args, CancelReason::ActionLink);
                return Ok(());
            }
        }

        // Source dispatches and reloads are never redirected
        if self.is_updating || self.is_refreshing {
            return Ok(());
        }

        match self.mode {
            NavigationMode::External => {
                self.cancel(args, CancelReason::Redirected(NavigationMode::External));
                self.navigate_externally(uri);
                Ok(())
            }
            NavigationMode::Application => {
                self.cancel(args, CancelReason::Redirected(NavigationMode::Application));
                let handler = self
                    .application_navigation
                    .clone()
                    .ok_or(WebViewError::ApplicationNavigationMissing)?;

                log::debug!("Navigating to uri '{uri}' using application configuration.");
                self.emit(WebViewEvent::ExternalNavigation {
                    webview_id: self.webview_id,
                    uri: uri.clone(),
                    mode: NavigationMode::Application,
                });
                self.spawn_logged("Application navigation", handler(uri));
                Ok(())
            }
            NavigationMode::Internal => {
                if let Some(command) = self.commands.navigation.clone() {
                    if command.can_execute(&uri) {
                        log::debug!("Executing navigation to '{uri}' command.");
                        command.execute(uri);
                        self.cancel(args, CancelReason::NavigationCommand);
                        return Ok(());
                    }
                }

                if self.source.uri() != Some(&uri) {
                    self.adopt_observed_uri(uri);
                }
                self.visual.go_to(VisualState::Navigating);
                Ok(())
            }
        }
    }

    fn navigate_externally(&self, uri: Url) {
        let Some(launcher) = self.launcher.clone() else {
            log::error!("No external launcher configured, unable to open '{uri}'.");
            return;
        };

        log::debug!("Navigating to uri '{uri}' using external browser.");
        self.emit(WebViewEvent::ExternalNavigation {
            webview_id: self.webview_id,
            uri: uri.clone(),
            mode: NavigationMode::External,
        });
        self.spawn_logged("External navigation", launcher.open_in_browser(uri));
    }

    /// Processes a completed navigation. Returns `false` if the event was ignored.
    pub fn on_navigation_completed(&mut self, args: NavigationCompletedArgs) -> bool {
        if !self.listening {
            return false;
        }

        let landed_on_blank = args.uri.as_ref().map_or(false, is_blank);

        // The blank page loaded to mask a failure is not a navigation of its own
        if landed_on_blank && self.masking_failure {
            self.masking_failure = false;
            return false;
        }

        // Some engines pass through the blank page right before the real navigation
        if landed_on_blank && self.source.is_non_blank_uri() {
            log::debug!("WebView[{}]: ignoring intermediate blank navigation.", self.webview_id);
            return false;
        }

        log::debug!(
            "WebView[{}]: navigation completed (success: {}).",
            self.webview_id,
            args.is_success
        );

        self.raise_history_changed();

        self.is_last_error_on_source = !args.is_success && self.is_updating;
        self.is_updating = false;
        self.is_refreshing = false;

        if args.is_success {
            self.visual.go_to(VisualState::Ready);
            self.hooks.on_navigation_succeeded(&args);
            log::info!(
                "Navigation to '{}' succeeded.",
                args.uri.as_ref().map_or("<html>", |u| u.as_str())
            );
        } else {
            // Stops the failed page from rendering or playing media behind the error state
            self.masking_failure = true;
            self.navigate_to_blank();

            let network_available = self.network_probe.as_ref().map_or(true, |probe| probe());
            self.visual.go_to(VisualState::for_failure(network_available));
            self.hooks.on_navigation_failed(&args);
            log::error!(
                "Navigation to '{}' failed: {}",
                args.uri.as_ref().map_or("<html>", |u| u.as_str()),
                args.error.as_deref().unwrap_or("unknown error")
            );
        }

        self.emit(WebViewEvent::NavigationCompleted {
            webview_id: self.webview_id,
            uri: args.uri.clone(),
            success: args.is_success,
        });

        self.execute_completion(&args);
        true
    }

    fn execute_completion(&self, args: &NavigationCompletedArgs) {
        let Some(command) = self.commands.completion.clone() else {
            return;
        };

        let uri = self.source.destination().cloned().or_else(|| args.uri.clone());
        let completion = CompletionCommandArgs::new(self.webview_id, args.is_success, uri, self.script_invoker());
        if command.can_execute(&completion) {
            command.execute(completion);
        }
    }

    /// The browser engine's process failed. Only command enablement is refreshed.
    pub fn on_process_failed(&mut self, reason: &str) {
        log::warn!("WebView[{}]: browser process failed: {reason}", self.webview_id);
        self.raise_history_changed();
    }

    /// Forwards a message posted by page script to the bound command. Returns `true` if
    /// the command handled it.
    pub fn on_script_notification(&mut self, notification: ScriptNotification) -> bool {
        if !self.listening {
            return false;
        }
        let Some(command) = self.commands.script_notification.clone() else {
            return false;
        };
        if !command.can_execute(&notification) {
            return false;
        }

        log::debug!("Executing script notification command.");
        command.execute(notification);
        true
    }

    fn raise_history_changed(&self) {
        self.commands.raise_history_changed();
        self.emit(WebViewEvent::HistoryChanged {
            webview_id: self.webview_id,
            can_go_back: self.can_go_back(),
            can_go_forward: self.can_go_forward(),
        });
    }

    /// Reloads the current document, or retries the source if its navigation failed.
    pub fn refresh(&mut self) -> Result<(), WebViewError> {
        let browser = self.ready_browser()?;

        if self.is_last_error_on_source {
            log::debug!("WebView[{}]: retrying the source after a failure.", self.webview_id);
            self.update();
            return Ok(());
        }

        self.visual.go_to(VisualState::Refreshing);
        browser.reload()?;
        self.is_refreshing = true;
        Ok(())
    }

    pub fn go_back(&mut self) -> Result<(), WebViewError> {
        self.ready_browser()?.go_back()?;
        Ok(())
    }

    pub fn go_forward(&mut self) -> Result<(), WebViewError> {
        self.ready_browser()?.go_forward()?;
        Ok(())
    }

    pub fn can_go_back(&self) -> bool {
        self.browser.as_ref().map_or(false, |b| b.can_go_back())
    }

    pub fn can_go_forward(&self) -> bool {
        self.browser.as_ref().map_or(false, |b| b.can_go_forward())
    }

    /// Executes a built-in command if it is enabled. Returns `true` if it ran.
    pub fn execute(&mut self, kind: CommandKind) -> bool {
        let command = self.commands.get(kind);
        if !command.can_execute(self) {
            return false;
        }
        let name = command.name();
        let run = command.executor();

        log::debug!("Executing the '{name}' command.");
        run(self);
        log::info!("Executed the '{name}' command.");
        true
    }

    pub fn can_execute(&self, kind: CommandKind) -> bool {
        self.commands.get(kind).can_execute(self)
    }
}
