#[derive(Debug, thiserror::Error)]
pub enum WebViewError {
    #[error("ApplicationNavigation must be configured in order to use the application navigation mode")]
    ApplicationNavigationMissing,

    #[error("No tokio runtime available for background work")]
    NoRuntime,

    #[error("The web view is not loaded or has no browser engine attached")]
    NotReady,

    #[error("Unsupported script invocation: {0}")]
    UnsupportedScript(String),

    #[error("Owner thread dispatch failed: {0}")]
    Dispatch(String),

    #[error("Owner thread queue is closed")]
    ChannelClosed,

    #[error("Browser engine error: {0}")]
    Browser(#[from] anyhow::Error),
}
