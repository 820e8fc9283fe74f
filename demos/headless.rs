use async_webview::browser::TaskFuture;
use async_webview::cookies::{CookieJarCleaner, CookieJarHandle, DefaultCookieJar};
use async_webview::{
    AsyncWebView, BrowserEvent, ExternalLauncher, NavigationCompletedArgs, NavigationMode, NavigationStartingArgs,
    NullBrowser, RelayCommand, WebViewConfig, WebViewError, WebViewEvent,
};
use futures::FutureExt;
use http::header::SET_COOKIE;
use http::{HeaderMap, HeaderValue};
use std::sync::{Arc, RwLock};
use url::Url;

/// Launcher that only prints what it would open.
struct PrintingLauncher;

impl ExternalLauncher for PrintingLauncher {
    fn try_launch(&self, uri: &Url) -> bool {
        println!("launching app for {uri}");
        true
    }

    fn open_in_browser(&self, uri: Url) -> TaskFuture {
        async move {
            println!("opening {uri} in the system browser");
            Ok(())
        }
        .boxed()
    }
}

#[tokio::main]
async fn main() -> Result<(), WebViewError> {
    env_logger::init();

    // Cookies received by the page live in a shared jar. The cleaner removes the ones
    // belonging to the bound source when the control unloads.
    let jar: CookieJarHandle = Arc::new(RwLock::new(DefaultCookieJar::new()));

    let config = WebViewConfig::builder()
        .is_clearing_on_unload(true)
        .browsing_data(Arc::new(CookieJarCleaner::new(jar.clone())))
        .external_launcher(Arc::new(PrintingLauncher))
        .network_probe(|| true)
        .build()
        .expect("WebViewConfig is not valid");

    let mut webview = AsyncWebView::new(config)?;
    let mut event_rx = webview.subscribe_events();

    webview.set_completion_command(Some(
        RelayCommand::new(|args: async_webview::CompletionCommandArgs| {
            println!("completed {:?} (success: {})", args.uri().map(|u| u.as_str()), args.is_success());
        })
        .into_handle(),
    ));

    // Setting the source before the control is loaded does not navigate yet
    let home = Url::parse("https://example.com/").expect("valid url");
    webview.set_source_uri(Some(home.clone()));

    // The host attaches the browser engine and loads the control. The source is dispatched now.
    webview.apply_template(Arc::new(NullBrowser::new()));
    webview.load();

    // A headless engine produces no events of its own, so the host feeds them in.
    let mut starting = NavigationStartingArgs::new(Some(home.clone()));
    webview.on_navigation_starting(&mut starting)?;
    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, HeaderValue::from_static("session=abc; Path=/"));
    jar.write().expect("cookie jar").store_response_cookies(&home, &headers);
    webview.handle_browser_event(BrowserEvent::NavigationCompleted(NavigationCompletedArgs::succeeded(Some(
        home.clone(),
    ))));

    // Links followed inside the page open in the system browser
    webview.set_navigation_mode(NavigationMode::External);
    let mut click = NavigationStartingArgs::new(Some(Url::parse("https://news.example.org/").expect("valid url")));
    webview.on_navigation_starting(&mut click)?;
    println!("link click canceled: {}", click.cancel);

    let title = webview.invoke_script("eval", &["document.title".into()]).await?;
    println!("script result: {title:?}");

    webview.unload();

    while let Ok(event) = event_rx.recv().await {
        println!("event: {event:?}");
        if let WebViewEvent::BrowsingDataCleared { .. } = event {
            break;
        }
    }

    println!("cookies left: {}", jar.read().expect("cookie jar").len());
    Ok(())
}
