//! Bindable commands of the web view.
//!
//! Two kinds of commands live here:
//!
//! - [`WebViewCommand`]: owned by the control (GoBack, GoForward, Refresh). Execution and
//!   enablement are plain function pointers over the navigation engine, so they can be run
//!   on the owner thread without capturing the control.
//! - [`Command`]: supplied by the host and bound to the control (Completion, Navigation,
//!   ScriptNotification). The control only calls `can_execute` and `execute`; gating is the
//!   bound command's own business.

use crate::events::ScriptNotification;
use crate::navigation::NavigationEngine;
use crate::script::{InvokeFuture, ScriptInvoker};
use crate::webview::WebViewId;
use std::sync::Arc;
use tokio::sync::broadcast;
use url::Url;

/// A command bound to the control by the host application.
pub trait Command<P>: Send + Sync {
    fn can_execute(&self, _parameter: &P) -> bool {
        true
    }

    fn execute(&self, parameter: P);
}

pub type CommandHandle<P> = Arc<dyn Command<P>>;

type ExecuteFn<P> = Box<dyn Fn(P) + Send + Sync>;
type CanExecuteFn<P> = Box<dyn Fn(&P) -> bool + Send + Sync>;

/// A [`Command`] built from closures.
pub struct RelayCommand<P> {
    execute: ExecuteFn<P>,
    can_execute: Option<CanExecuteFn<P>>,
}

impl<P> RelayCommand<P> {
    pub fn new(execute: impl Fn(P) + Send + Sync + 'static) -> Self {
        Self {
            execute: Box::new(execute),
            can_execute: None,
        }
    }

    pub fn with_can_execute(mut self, can_execute: impl Fn(&P) -> bool + Send + Sync + 'static) -> Self {
        self.can_execute = Some(Box::new(can_execute));
        self
    }

    pub fn into_handle(self) -> CommandHandle<P>
    where
        P: 'static,
    {
        Arc::new(self)
    }
}

impl<P> Command<P> for RelayCommand<P> {
    fn can_execute(&self, parameter: &P) -> bool {
        self.can_execute.as_ref().map_or(true, |f| f(parameter))
    }

    fn execute(&self, parameter: P) {
        (self.execute)(parameter)
    }
}

impl<P> std::fmt::Debug for RelayCommand<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayCommand")
            .field("has_can_execute", &self.can_execute.is_some())
            .finish_non_exhaustive()
    }
}

/// A command owned by the control, executed against a context `C` on the owner thread.
pub struct WebViewCommand<C> {
    name: &'static str,
    execute: fn(&mut C),
    can_execute: fn(&C) -> bool,
    changed: broadcast::Sender<()>,
}

impl<C> WebViewCommand<C> {
    pub fn new(name: &'static str, execute: fn(&mut C), can_execute: fn(&C) -> bool) -> Self {
        let (changed, _) = broadcast::channel(crate::DEFAULT_CHANNEL_CAPACITY);
        Self {
            name,
            execute,
            can_execute,
            changed,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn can_execute(&self, ctx: &C) -> bool {
        (self.can_execute)(ctx)
    }

    pub(crate) fn executor(&self) -> fn(&mut C) {
        self.execute
    }

    /// Receives a notification every time the enablement of the command may have changed.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.changed.subscribe()
    }

    pub fn raise_can_execute_changed(&self) {
        // No receivers is fine.
        let _ = self.changed.send(());
    }
}

impl<C> std::fmt::Debug for WebViewCommand<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebViewCommand")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The commands owned by the control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    GoBack,
    GoForward,
    Refresh,
}

/// Everything the control exposes as a command, built-in and bound.
pub struct CommandFacade {
    go_back: WebViewCommand<NavigationEngine>,
    go_forward: WebViewCommand<NavigationEngine>,
    refresh: WebViewCommand<NavigationEngine>,
    pub(crate) completion: Option<CommandHandle<CompletionCommandArgs>>,
    pub(crate) navigation: Option<CommandHandle<Url>>,
    pub(crate) script_notification: Option<CommandHandle<ScriptNotification>>,
}

impl Default for CommandFacade {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFacade {
    pub fn new() -> Self {
        Self {
            go_back: WebViewCommand::new(
                "GoBack",
                |engine: &mut NavigationEngine| {
                    if let Err(e) = engine.go_back() {
                        log::error!("Failed to go back: {e}");
                    }
                },
                NavigationEngine::can_go_back,
            ),
            go_forward: WebViewCommand::new(
                "GoForward",
                |engine: &mut NavigationEngine| {
                    if let Err(e) = engine.go_forward() {
                        log::error!("Failed to go forward: {e}");
                    }
                },
                NavigationEngine::can_go_forward,
            ),
            refresh: WebViewCommand::new(
                "Refresh",
                |engine: &mut NavigationEngine| {
                    if let Err(e) = engine.refresh() {
                        log::error!("Failed to refresh: {e}");
                    }
                },
                |_: &NavigationEngine| true,
            ),
            completion: None,
            navigation: None,
            script_notification: None,
        }
    }

    pub fn get(&self, kind: CommandKind) -> &WebViewCommand<NavigationEngine> {
        match kind {
            CommandKind::GoBack => &self.go_back,
            CommandKind::GoForward => &self.go_forward,
            CommandKind::Refresh => &self.refresh,
        }
    }

    /// Back/forward availability may have changed.
    pub(crate) fn raise_history_changed(&self) {
        self.go_back.raise_can_execute_changed();
        self.go_forward.raise_can_execute_changed();
    }
}

impl std::fmt::Debug for CommandFacade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandFacade")
            .field("completion", &self.completion.is_some())
            .field("navigation", &self.navigation.is_some())
            .field("script_notification", &self.script_notification.is_some())
            .finish_non_exhaustive()
    }
}

/// Passed once per completed navigation to the bound completion command.
#[derive(Clone)]
pub struct CompletionCommandArgs {
    webview_id: WebViewId,
    is_success: bool,
    uri: Option<Url>,
    scripts: ScriptInvoker,
}

impl CompletionCommandArgs {
    pub(crate) fn new(webview_id: WebViewId, is_success: bool, uri: Option<Url>, scripts: ScriptInvoker) -> Self {
        Self {
            webview_id,
            is_success,
            uri,
            scripts,
        }
    }

    /// The control that completed the navigation.
    pub fn webview_id(&self) -> WebViewId {
        self.webview_id
    }

    pub fn is_success(&self) -> bool {
        self.is_success
    }

    /// Destination of the navigation, if it had one.
    pub fn uri(&self) -> Option<&Url> {
        self.uri.as_ref()
    }

    /// Invokes a script on the page that completed loading.
    pub fn invoke_script(&self, script: &str, arguments: &[String]) -> InvokeFuture {
        self.scripts.invoke(script, arguments)
    }
}

impl std::fmt::Debug for CompletionCommandArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionCommandArgs")
            .field("webview_id", &self.webview_id)
            .field("is_success", &self.is_success)
            .field("uri", &self.uri.as_ref().map(|u| u.as_str()))
            .finish_non_exhaustive()
    }
}
