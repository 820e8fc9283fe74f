//! What the web view displays: [`Source`] and [`HttpRequestDescriptor`].
//!
//! A web view has exactly one authoritative source at a time. The shadow properties of the
//! control (`source_uri`, `source_html`, `source_message`) all normalise into this union.

use http::header::{HeaderName, HeaderValue};
use http::{HeaderMap, Method};
use lazy_static::lazy_static;
use url::Url;

/// Serialization of the sentinel blank page.
pub const BLANK_PAGE: &str = "about:blank";

lazy_static! {
    /// Sentinel page used to clear rendered content and to mask failed navigations.
    pub static ref BLANK_PAGE_URI: Url = Url::parse(BLANK_PAGE).expect("about:blank is a valid URL");
}

/// Returns `true` if `uri` is the sentinel blank page.
pub fn is_blank(uri: &Url) -> bool {
    uri.as_str().eq_ignore_ascii_case(BLANK_PAGE)
}

/// An HTTP request the web view should load, including method, headers and body.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequestDescriptor {
    pub uri: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequestDescriptor {
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            uri,
            method,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// A plain `GET` request for `uri`.
    pub fn get(uri: Url) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// The content a web view is bound to.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Source {
    /// Nothing bound. Dispatching this clears the view to the blank page.
    #[default]
    None,
    /// Navigate to a URI
    Uri(Url),
    /// Render a raw HTML string
    Html(String),
    /// Issue an HTTP request
    Request(HttpRequestDescriptor),
}

impl Source {
    pub fn is_none(&self) -> bool {
        matches!(self, Source::None)
    }

    pub fn uri(&self) -> Option<&Url> {
        match self {
            Source::Uri(uri) => Some(uri),
            _ => None,
        }
    }

    pub fn html(&self) -> Option<&str> {
        match self {
            Source::Html(html) => Some(html),
            _ => None,
        }
    }

    pub fn request(&self) -> Option<&HttpRequestDescriptor> {
        match self {
            Source::Request(request) => Some(request),
            _ => None,
        }
    }

    /// The URI this source will land on, if it has one.
    pub fn destination(&self) -> Option<&Url> {
        match self {
            Source::Uri(uri) => Some(uri),
            Source::Request(request) => Some(&request.uri),
            Source::None | Source::Html(_) => None,
        }
    }

    /// A `Uri` source that is not the blank sentinel.
    pub fn is_non_blank_uri(&self) -> bool {
        self.uri().map_or(false, |uri| !is_blank(uri))
    }
}

impl From<Url> for Source {
    fn from(uri: Url) -> Self {
        Source::Uri(uri)
    }
}

impl From<HttpRequestDescriptor> for Source {
    fn from(request: HttpRequestDescriptor) -> Self {
        Source::Request(request)
    }
}

impl From<Option<Url>> for Source {
    fn from(uri: Option<Url>) -> Self {
        uri.map_or(Source::None, Source::Uri)
    }
}
