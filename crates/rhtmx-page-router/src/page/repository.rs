//! Page repository collaborator

use std::sync::Arc;

use anyhow::Result;

use super::Page;

/// Structured conditions understood by [`PageRepository::find_by`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageFilter {
    /// Every page
    All,
    /// Pages with one of the given IDs
    Ids(Vec<u64>),
    /// Root pages bound to `host` or to no host at all
    RootsForHost(String),
    /// Root pages bound to exactly this DNS value
    RootsWithDns(String),
    /// Direct children of `pid` with the given type
    ChildrenOfType { pid: u64, page_type: String },
}

impl PageFilter {
    /// Whether a page satisfies this filter
    pub fn matches(&self, page: &Page) -> bool {
        match self {
            Self::All => true,
            Self::Ids(ids) => ids.contains(&page.id),
            Self::RootsForHost(host) => {
                page.is_root() && (page.dns.is_empty() || page.dns.eq_ignore_ascii_case(host))
            }
            Self::RootsWithDns(dns) => page.is_root() && page.dns == *dns,
            Self::ChildrenOfType { pid, page_type } => page.pid == *pid && page.page_type == *page_type,
        }
    }
}

/// Storage of the page tree
///
/// Implementations own all I/O. Results must be in a stable order (the
/// in-memory backend orders by ID) so that routing stays deterministic.
pub trait PageRepository: Send + Sync {
    /// Pages whose alias is one of `aliases`
    fn find_by_aliases(&self, aliases: &[String]) -> Result<Vec<Arc<Page>>>;

    /// Page with the given ID
    fn find_by_id(&self, id: u64) -> Result<Option<Arc<Page>>>;

    /// Primary key lookup, same as [`PageRepository::find_by_id`] unless the
    /// backend distinguishes published rows
    fn find_by_pk(&self, id: u64) -> Result<Option<Arc<Page>>> {
        self.find_by_id(id)
    }

    /// Pages matching a structured filter
    fn find_by(&self, filter: &PageFilter) -> Result<Vec<Arc<Page>>>;

    /// Pages of the given type
    fn find_by_type(&self, page_type: &str) -> Result<Vec<Arc<Page>>>;
}
