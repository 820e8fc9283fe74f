//! Cookie jar abstraction and an in-memory implementation.
//!
//! Cookies are bucketed by origin (`url.origin().ascii_serialization()`), which is also the
//! granularity at which browsing data is cleared for a web view. Only the name and value of
//! a `Set-Cookie` header are kept; attributes are ignored.

use crate::cookies::Cookie;
use http::header::SET_COOKIE;
use http::HeaderMap;
use std::collections::HashMap;
use url::Url;

pub trait CookieJar: Send + Sync {
    /// Stores the cookies set by a response for `url`. Later cookies replace earlier ones
    /// with the same name.
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap);

    /// Removes every cookie of `url`'s origin.
    fn remove_cookies_for_url(&mut self, url: &Url);

    fn clear(&mut self);

    /// Number of cookies held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory cookie jar.
#[derive(Debug, Clone, Default)]
pub struct DefaultCookieJar {
    entries: HashMap<String, Vec<Cookie>>,
}

impl DefaultCookieJar {
    pub fn new() -> Self {
        Self::default()
    }
}

fn origin_key(url: &Url) -> String {
    url.origin().ascii_serialization()
}

fn parse_set_cookie(header: &str) -> Option<Cookie> {
    let (name, value) = header.split(';').next()?.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }

    Some(Cookie {
        name: name.to_string(),
        value: value.trim().to_string(),
    })
}

impl CookieJar for DefaultCookieJar {
    fn store_response_cookies(&mut self, url: &Url, headers: &HeaderMap) {
        let bucket = self.entries.entry(origin_key(url)).or_default();

        let cookies = headers
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|h| h.to_str().ok())
            .filter_map(parse_set_cookie);

        for cookie in cookies {
            match bucket.iter_mut().find(|c| c.name == cookie.name) {
                Some(existing) => *existing = cookie,
                None => bucket.push(cookie),
            }
        }
    }

    fn remove_cookies_for_url(&mut self, url: &Url) {
        self.entries.remove(&origin_key(url));
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}
