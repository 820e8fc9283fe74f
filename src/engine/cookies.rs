//! Cookies held on behalf of a web view, and the [`CookieJarCleaner`] that clears them when
//! the control unloads.

mod cleaner;
mod cookie_jar;
mod cookies;

pub use cookies::{Cookie, CookieJarHandle};

pub use cookie_jar::CookieJar;
pub use cookie_jar::DefaultCookieJar;

pub use cleaner::CookieJarCleaner;
