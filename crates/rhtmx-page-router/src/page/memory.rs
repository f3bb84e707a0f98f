//! In-memory page repository
//!
//! Holds the page tree in a `BTreeMap` keyed by page ID. Fast, ordered and
//! non-persistent; used by tests and by applications that load the tree once
//! at startup.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;

use super::repository::{PageFilter, PageRepository};
use super::Page;

#[derive(Debug, Clone, Default)]
pub struct InMemoryPageRepository {
    pages: BTreeMap<u64, Arc<Page>>,
}

impl InMemoryPageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page (builder style), replacing any page with the same ID
    pub fn with_page(mut self, page: Page) -> Self {
        self.insert(page);
        self
    }

    pub fn with_pages<I>(mut self, pages: I) -> Self
    where
        I: IntoIterator<Item = Page>,
    {
        for page in pages {
            self.insert(page);
        }
        self
    }

    pub fn insert(&mut self, page: Page) -> Arc<Page> {
        let page = Arc::new(page);
        self.pages.insert(page.id, Arc::clone(&page));
        page
    }

    /// Shared handle of the stored page
    pub fn get(&self, id: u64) -> Option<Arc<Page>> {
        self.pages.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    fn collect<F>(&self, predicate: F) -> Vec<Arc<Page>>
    where
        F: Fn(&Page) -> bool,
    {
        self.pages.values().filter(|page| predicate(page)).cloned().collect()
    }
}

impl PageRepository for InMemoryPageRepository {
    fn find_by_aliases(&self, aliases: &[String]) -> Result<Vec<Arc<Page>>> {
        Ok(self.collect(|page| aliases.iter().any(|alias| *alias == page.alias)))
    }

    fn find_by_id(&self, id: u64) -> Result<Option<Arc<Page>>> {
        Ok(self.get(id))
    }

    fn find_by(&self, filter: &PageFilter) -> Result<Vec<Arc<Page>>> {
        Ok(self.collect(|page| filter.matches(page)))
    }

    fn find_by_type(&self, page_type: &str) -> Result<Vec<Arc<Page>>> {
        Ok(self.collect(|page| page.page_type == page_type))
    }
}
