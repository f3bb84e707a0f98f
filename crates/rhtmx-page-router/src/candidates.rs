//! Candidate pages resolver
//!
//! Derives the page identifiers a request path could refer to, without any
//! storage access. `news/archive/item.html` yields `news/archive/item`,
//! `news/archive` and `news`, so that a page aliased `news/archive` is found
//! for a request carrying trailing parameters.

use tracing::trace;

use crate::page::INDEX_ALIASES;
use crate::path::{has_reserved_segment, DirnameHierarchy};

/// Candidates split the way the repository looks them up
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    pub ids: Vec<u64>,
    pub aliases: Vec<String>,
}

impl CandidateSet {
    /// Splits candidates into numeric page IDs and alias strings
    ///
    /// Only canonical numbers (no sign, no leading zero) count as IDs.
    pub fn partition(candidates: &[String]) -> Self {
        let mut set = Self::default();
        for candidate in candidates {
            match parse_page_id(candidate) {
                Some(id) => {
                    if !set.ids.contains(&id) {
                        set.ids.push(id);
                    }
                }
                None => set.aliases.push(candidate.clone()),
            }
        }
        set
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.aliases.is_empty()
    }
}

fn parse_page_id(candidate: &str) -> Option<u64> {
    let first = candidate.bytes().next()?;
    if !(b'1'..=b'9').contains(&first) || !candidate.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    candidate.parse().ok()
}

/// Resolves request paths into candidate identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCandidates {
    prefixes: Vec<String>,
    suffixes: Vec<String>,
}

impl Default for PageCandidates {
    fn default() -> Self {
        Self::new(Vec::<String>::new(), Vec::<String>::new())
    }
}

impl PageCandidates {
    /// Creates a resolver for the URL prefixes and suffixes in use
    ///
    /// Empty lists mean "no prefix" and "no suffix". Longer values are tried
    /// first so that `.html` wins over `.htm`-style overlaps.
    pub fn new<P, S>(prefixes: impl IntoIterator<Item = P>, suffixes: impl IntoIterator<Item = S>) -> Self
    where
        P: Into<String>,
        S: Into<String>,
    {
        Self {
            prefixes: distinct_by_length(prefixes.into_iter().map(Into::into)),
            suffixes: distinct_by_length(suffixes.into_iter().map(Into::into)),
        }
    }

    /// Candidate identifiers for a decoded request path, most specific first
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_page_router::PageCandidates;
    ///
    /// let candidates = PageCandidates::new(["en"], [".html"]);
    /// assert_eq!(
    ///     candidates.find_candidates("/en/news/2024/item.html"),
    ///     vec!["news/2024/item", "news/2024", "news"]
    /// );
    /// assert!(candidates.find_candidates("/").is_empty());
    /// assert!(candidates.find_candidates("/en/auto_item/x.html").is_empty());
    /// ```
    pub fn find_candidates(&self, path: &str) -> Vec<String> {
        let url = path.trim_start_matches('/');
        if url.is_empty() || has_reserved_segment(url) {
            return Vec::new();
        }

        let mut candidates: Vec<String> = Vec::new();
        for prefix in &self.prefixes {
            let rest = if prefix.is_empty() {
                url
            } else {
                match url.strip_prefix(prefix.as_str()).and_then(|rest| rest.strip_prefix('/')) {
                    Some(rest) => rest,
                    None => continue,
                }
            };

            for suffix in &self.suffixes {
                if rest.is_empty() {
                    push_unique(&mut candidates, INDEX_ALIASES[0]);
                    break;
                }
                let Some(stripped) = rest.strip_suffix(suffix.as_str()) else {
                    continue;
                };
                for candidate in DirnameHierarchy::new(stripped) {
                    push_unique(&mut candidates, candidate);
                }
            }
        }

        trace!(path, candidates = ?candidates, "derived candidate pages");
        candidates
    }

    /// Whether `path` is exactly `/<prefix>/` for a known, non-empty prefix
    pub fn is_prefix_root(&self, path: &str) -> bool {
        path.strip_prefix('/')
            .and_then(|p| p.strip_suffix('/'))
            .is_some_and(|p| !p.is_empty() && self.prefixes.iter().any(|prefix| prefix == p))
    }
}

fn push_unique(candidates: &mut Vec<String>, candidate: &str) {
    if !candidates.iter().any(|c| c == candidate) {
        candidates.push(candidate.to_string());
    }
}

fn distinct_by_length(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut values: Vec<String> = values.map(|v| v.trim_matches('/').to_string()).collect();
    if values.is_empty() {
        values.push(String::new());
    }
    values.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    values.dedup();
    values
}
