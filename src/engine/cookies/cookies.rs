//! Cookie core types.
//!
//! # Concurrency model
//! [`CookieJarHandle`] is `Arc<RwLock<dyn CookieJar + Send + Sync>>`. Callers take a read
//! lock for queries and a write lock for mutations. The jar itself is not synchronized.

use crate::cookies::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// A shared, lockable cookie jar.
pub type CookieJarHandle = Arc<RwLock<dyn CookieJar + Send + Sync>>;

/// A cookie received by a page loaded in the web view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name (case-sensitive)
    pub name: String,
    /// Raw value, not URL-decoded
    pub value: String,
}
