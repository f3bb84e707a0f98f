//! Page tree model
//!
//! A [`Page`] is a node of the content tree. Every page hangs below exactly
//! one root page (`page_type == "root"`, `pid == 0`) that binds a host and a
//! language. The root-derived fields are not stored on the page itself; they
//! are materialized once by [`Page::load_details`] and memoized on the
//! instance.

use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::trace;

use crate::error::{Result, RoutingError};

pub mod memory;
pub mod repository;

pub use memory::InMemoryPageRepository;
pub use repository::{PageFilter, PageRepository};

/// Type of the page anchoring a host/language subtree
pub const ROOT_TYPE: &str = "root";

/// Aliases that make a regular page act as the homepage
pub const INDEX_ALIASES: [&str; 2] = ["index", "/"];

/// Guard against corrupted trees with `pid` cycles
const MAX_TREE_DEPTH: usize = 64;

/// A node of the content tree
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub id: u64,
    /// Parent page ID (0 for root pages)
    pub pid: u64,
    /// URL slug, may contain `/` for folder-style aliases
    pub alias: String,
    /// Page type (`root`, `regular`, `error_404`, ...)
    pub page_type: String,
    /// Host binding (root pages only, empty = any host)
    pub dns: String,
    /// Language of the subtree (root pages only)
    pub language: String,
    /// Whether this root is used when no language matches (root pages only)
    pub fallback: bool,
    /// Position among siblings; for root pages this is the root sorting
    pub sorting: i64,
    /// Whether the subtree is served over HTTPS (root pages only)
    pub use_ssl: bool,
    /// Whether the page needs at least one extra path segment
    pub require_item: bool,
    /// Suppress the redirect from `/` to the locale-prefixed root (root pages only)
    pub disable_language_redirect: bool,
    /// URL prefix for the subtree, e.g. `en` (root pages only)
    pub url_prefix: String,
    /// URL suffix for the subtree, e.g. `.html` (root pages only)
    pub url_suffix: String,
    details: OnceCell<PageDetails>,
}

/// Root-derived fields of a page, valid after [`Page::load_details`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDetails {
    pub root_id: u64,
    pub root_language: String,
    pub root_is_fallback: bool,
    pub root_sorting: i64,
    pub root_use_ssl: bool,
    pub domain: String,
    pub url_prefix: String,
    pub url_suffix: String,
    pub disable_language_redirect: bool,
}

impl PageDetails {
    fn from_root(root: &Page) -> Self {
        Self {
            root_id: root.id,
            root_language: root.language.clone(),
            root_is_fallback: root.fallback,
            root_sorting: root.sorting,
            root_use_ssl: root.use_ssl,
            domain: root.dns.clone(),
            url_prefix: root.url_prefix.clone(),
            url_suffix: root.url_suffix.clone(),
            disable_language_redirect: root.disable_language_redirect,
        }
    }
}

impl Page {
    /// Creates a page of the given type below `pid`
    pub fn new(id: u64, pid: u64, alias: impl Into<String>, page_type: impl Into<String>) -> Self {
        Self {
            id,
            pid,
            alias: alias.into(),
            page_type: page_type.into(),
            ..Self::default()
        }
    }

    /// Creates a root page for the given host and language
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_page_router::Page;
    ///
    /// let root = Page::root(1, "example.com", "en").with_fallback(true);
    /// assert!(root.is_root());
    /// assert_eq!(root.pid, 0);
    /// ```
    pub fn root(id: u64, dns: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id,
            page_type: ROOT_TYPE.to_string(),
            dns: dns.into(),
            language: language.into(),
            ..Self::default()
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    pub fn with_fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_sorting(mut self, sorting: i64) -> Self {
        self.sorting = sorting;
        self
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn with_require_item(mut self, require_item: bool) -> Self {
        self.require_item = require_item;
        self
    }

    pub fn with_language_redirect_disabled(mut self, disabled: bool) -> Self {
        self.disable_language_redirect = disabled;
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

    pub fn is_root(&self) -> bool {
        self.page_type == ROOT_TYPE
    }

    /// Whether the alias marks this page as the homepage of its root
    pub fn is_index_alias(&self) -> bool {
        INDEX_ALIASES.contains(&self.alias.as_str())
    }

    /// Alias used in URLs, the numeric ID when the alias is empty
    pub fn url_alias(&self) -> String {
        if self.alias.is_empty() {
            self.id.to_string()
        } else {
            self.alias.clone()
        }
    }

    /// Root-derived fields if [`Page::load_details`] already ran
    pub fn details(&self) -> Option<&PageDetails> {
        self.details.get()
    }

    pub fn root_language(&self) -> Option<&str> {
        self.details().map(|d| d.root_language.as_str())
    }

    /// Materializes the root-derived fields by walking up the `pid` chain
    ///
    /// Runs at most once per instance; later calls return the memoized value.
    pub fn load_details(&self, repository: &dyn PageRepository) -> Result<&PageDetails> {
        self.details.get_or_try_init(|| {
            if self.is_root() {
                return Ok(PageDetails::from_root(self));
            }

            let mut pid = self.pid;
            for _ in 0..MAX_TREE_DEPTH {
                if pid == 0 {
                    break;
                }
                let parent = repository
                    .find_by_pk(pid)?
                    .ok_or(RoutingError::NoRootPage(self.id))?;
                if parent.is_root() {
                    trace!(page = self.id, root = parent.id, "loaded page details");
                    return Ok(PageDetails::from_root(&parent));
                }
                pid = parent.pid;
            }

            Err(RoutingError::NoRootPage(self.id))
        })
    }

    /// Marks the details as already known, e.g. when the storage joins the
    /// root row in the same query
    pub fn with_details(self, details: PageDetails) -> Self {
        let cell = OnceCell::new();
        let _ = cell.set(details);
        Self {
            details: cell,
            ..self
        }
    }

    pub fn into_shared(self) -> Arc<Page> {
        Arc::new(self)
    }
}
