//! Generated page routes
//!
//! Routes are transient: they are built from a page and its type's route
//! configuration whenever a request is matched or a URL is generated, and
//! dropped afterwards.
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::content::Content;
use crate::error::Result;
use crate::page::Page;

pub mod collection;
pub mod compiler;
pub mod name;

pub use collection::RouteCollection;
pub use compiler::{CompiledRoute, Token};
pub use name::{RouteKind, RouteName, PAGE_ROUTE_PREFIX};

/// Name of the greedy trailing variable of auto-mode routes
pub const PARAMETERS: &str = "parameters";

/// Where a matched fallback route sends the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectTarget {
    pub path: String,
    pub permanent: bool,
}

/// A path-matching rule generated for a page
#[derive(Debug, Clone, Default)]
pub struct Route {
    /// Path template without URL prefix and suffix, e.g. `/about-us{!parameters}`
    pub path: String,
    pub defaults: BTreeMap<String, String>,
    /// Regex fragment per variable
    pub requirements: BTreeMap<String, String>,
    pub options: BTreeMap<String, String>,
    /// Bound host, empty for any host
    pub host: String,
    pub schemes: Vec<String>,
    pub methods: Vec<String>,
    /// Locale prefix placed before the path (`en` → `/en/about-us`)
    pub url_prefix: String,
    /// Suffix appended to the path (`.html`)
    pub url_suffix: String,
    /// Originating page
    pub page_model: Option<Arc<Page>>,
    /// Content the route was generated for, if not the page itself
    pub content: Option<Content>,
    /// Set on locale fallback routes
    pub redirect: Option<RedirectTarget>,
}

impl Route {
    /// Creates a route with the given path template
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_page_router::Route;
    ///
    /// let route = Route::new("/news{!parameters}")
    ///     .with_default("parameters", "")
    ///     .with_requirement("parameters", "(/.+)?")
    ///     .with_url_suffix(".html");
    /// assert_eq!(route.full_path(), "/news{!parameters}.html");
    /// ```
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_requirement(mut self, key: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), regex.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(|m| m.into().to_ascii_uppercase()).collect();
        self
    }

    pub fn with_url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = prefix.into();
        self
    }

    pub fn with_url_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.url_suffix = suffix.into();
        self
    }

    pub fn with_page_model(mut self, page: Arc<Page>) -> Self {
        self.page_model = Some(page);
        self
    }

    pub fn with_content(mut self, content: Content) -> Self {
        self.content = Some(content);
        self
    }

    pub fn with_redirect(mut self, path: impl Into<String>, permanent: bool) -> Self {
        self.redirect = Some(RedirectTarget {
            path: path.into(),
            permanent,
        });
        self
    }

    pub fn page_model(&self) -> Option<&Arc<Page>> {
        self.page_model.as_ref()
    }

    pub fn default_value(&self, key: &str) -> Option<&str> {
        self.defaults.get(key).map(String::as_str)
    }

    pub fn is_redirect(&self) -> bool {
        self.redirect.is_some()
    }

    /// Path as matched against requests: `/<prefix><path><suffix>`
    pub fn full_path(&self) -> String {
        let mut full = String::new();
        if !self.url_prefix.is_empty() {
            full.push('/');
            full.push_str(&self.url_prefix);
        }
        full.push_str(&self.path);
        full.push_str(&self.url_suffix);
        full
    }

    pub fn compile(&self) -> Result<CompiledRoute> {
        CompiledRoute::compile(&self.full_path(), &self.requirements, &self.defaults)
    }
}

impl PartialEq for Route {
    /// Structural equality; the originating page compares by ID
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.defaults == other.defaults
            && self.requirements == other.requirements
            && self.options == other.options
            && self.host == other.host
            && self.schemes == other.schemes
            && self.methods == other.methods
            && self.url_prefix == other.url_prefix
            && self.url_suffix == other.url_suffix
            && self.page_model.as_ref().map(|p| p.id) == other.page_model.as_ref().map(|p| p.id)
            && self.content.as_ref().map(Content::identity) == other.content.as_ref().map(Content::identity)
            && self.redirect == other.redirect
    }
}
