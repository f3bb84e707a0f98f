//! Lazy iterator over the dirname chain of a relative path
//!
//! For `news/2024/item`, yields: `news/2024/item` → `news/2024` → `news`
//!
//! Only borrows from the input string, no allocations.
//!
//! # Examples
//!
//! ```
//! use rhtmx_page_router::path::DirnameHierarchy;
//!
//! let paths: Vec<&str> = DirnameHierarchy::new("a/b/c").collect();
//! assert_eq!(paths, vec!["a/b/c", "a/b", "a"]);
//! ```
#[derive(Debug, Clone)]
pub struct DirnameHierarchy<'a> {
    current: Option<&'a str>,
}

impl<'a> DirnameHierarchy<'a> {
    pub fn new(path: &'a str) -> Self {
        let path = path.trim_matches('/');
        Self {
            current: (!path.is_empty()).then_some(path),
        }
    }
}

impl<'a> Iterator for DirnameHierarchy<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;

        // Empty segments (`a//b`) collapse into their parent
        self.current = current
            .rfind('/')
            .map(|slash_pos| current[..slash_pos].trim_end_matches('/'))
            .filter(|parent| !parent.is_empty());

        Some(current)
    }
}
