//! Script invocation in the context of the loaded page.
//!
//! Engines with [`ScriptDialect::Function`] can call a function defined in the document:
//! `invoke("setTitle", ["Hello"])` runs `setTitle("Hello")`. The special name `eval` evaluates
//! its first argument as a script body on every engine. Engines with
//! [`ScriptDialect::EvalOnly`] only accept `eval`; any other name is rejected before anything
//! reaches the engine.

use crate::browser::{BrowserEngine, ScriptDialect};
use crate::errors::WebViewError;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::sync::Arc;

/// Function name that evaluates its first argument as a script body.
pub const EVAL: &str = "eval";

/// Outcome of [`ScriptInvoker::invoke`].
pub type InvokeFuture = BoxFuture<'static, Result<Option<String>, WebViewError>>;

/// Turns a function name and its arguments into the script text for `dialect`.
pub(crate) fn shape_script(
    dialect: ScriptDialect,
    script: &str,
    arguments: &[String],
) -> Result<String, WebViewError> {
    if script == EVAL {
        let body = arguments.first().ok_or_else(|| {
            WebViewError::UnsupportedScript("\"eval\" requires the script as its first argument".into())
        })?;

        if arguments.len() > 1 {
            log::debug!(
                "Ignoring {} extra argument(s) passed to \"eval\".",
                arguments.len() - 1
            );
        }
        return Ok(body.clone());
    }

    match dialect {
        ScriptDialect::EvalOnly => Err(WebViewError::UnsupportedScript(
            "the script to call must be \"eval\"".into(),
        )),
        ScriptDialect::Function => {
            let args = arguments
                .iter()
                .map(|a| serde_json::Value::String(a.clone()).to_string())
                .collect::<Vec<_>>()
                .join(", ");
            Ok(format!("{script}({args})"))
        }
    }
}

/// Runs scripts against the browser engine of a web view.
///
/// Cheap to clone and `Send`, so it can be handed to completion commands and background tasks.
#[derive(Clone)]
pub struct ScriptInvoker {
    browser: Option<Arc<dyn BrowserEngine>>,
    has_source: bool,
}

impl std::fmt::Debug for ScriptInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInvoker")
            .field("browser", &self.browser.as_ref().map(|b| b.name().to_string()))
            .field("has_source", &self.has_source)
            .finish()
    }
}

impl ScriptInvoker {
    pub(crate) fn new(browser: Option<Arc<dyn BrowserEngine>>, has_source: bool) -> Self {
        Self { browser, has_source }
    }

    /// Invokes `script` with `arguments`.
    ///
    /// Resolves to `Ok(None)` when no engine is attached, when nothing is loaded, or when the
    /// engine failed to evaluate the script. Resolves to an error only for invocations the
    /// engine cannot express.
    pub fn invoke(&self, script: &str, arguments: &[String]) -> InvokeFuture {
        log::debug!("Invoking script with '{}' arguments.", arguments.len());

        let Some(browser) = self.browser.clone() else {
            log::warn!("Unable to invoke the script as the web view is null.");
            return futures::future::ready(Ok(None)).boxed();
        };

        if !self.has_source {
            log::warn!("Unable to invoke the script as the source is null.");
            return futures::future::ready(Ok(None)).boxed();
        }

        let body = match shape_script(browser.script_dialect(), script, arguments) {
            Ok(body) => body,
            Err(e) => {
                log::error!("{e}");
                return futures::future::ready(Err(e)).boxed();
            }
        };

        let count = arguments.len();
        async move {
            match browser.execute_script(body).await {
                Ok(result) => {
                    log::info!("Invoked script with '{count}' arguments.");
                    Ok(result)
                }
                Err(e) => {
                    log::error!("Failed to execute script: {e:#}");
                    Ok(None)
                }
            }
        }
        .boxed()
    }
}
