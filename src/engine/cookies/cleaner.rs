use crate::browser::{BrowsingDataCleaner, TaskFuture};
use crate::cookies::CookieJarHandle;
use anyhow::anyhow;
use futures::FutureExt;
use url::Url;

/// Clears browsing data by removing cookies from a shared jar.
///
/// Scoped to the origins of the URIs the web view was bound to. When no URI is known the
/// whole jar is cleared.
#[derive(Clone)]
pub struct CookieJarCleaner {
    jar: CookieJarHandle,
}

impl CookieJarCleaner {
    pub fn new(jar: CookieJarHandle) -> Self {
        Self { jar }
    }

    pub fn jar(&self) -> CookieJarHandle {
        self.jar.clone()
    }
}

impl std::fmt::Debug for CookieJarCleaner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieJarCleaner")
            .field("jar", &"Arc<RwLock<dyn CookieJar>>")
            .finish()
    }
}

impl BrowsingDataCleaner for CookieJarCleaner {
    fn clear_browsing_data(&self, uris: Vec<Url>) -> TaskFuture {
        let jar = self.jar.clone();
        async move {
            let mut guard = jar.write().map_err(|_| anyhow!("cookie jar lock poisoned"))?;
            if uris.is_empty() {
                guard.clear();
            } else {
                for uri in &uris {
                    guard.remove_cookies_for_url(uri);
                }
            }
            log::debug!("Cleared cookies for {} uri(s).", uris.len());
            Ok(())
        }
        .boxed()
    }
}
