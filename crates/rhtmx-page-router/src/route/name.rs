//! Route names
//!
//! Internally a route name is a typed `(page ID, kind)` pair. The dotted
//! string form `tl_page.<id>[.root|.fallback]` only exists at the boundary
//! (logs, external route-name lookups, sitemap enumeration).
use std::fmt;
use std::str::FromStr;

use crate::error::RoutingError;

/// Prefix shared by every page route name
pub const PAGE_ROUTE_PREFIX: &str = "tl_page";

/// Which of the routes generated for a page a name refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteKind {
    /// Regular route of the page (`tl_page.<id>`)
    Primary,
    /// Homepage route of a root or index page (`tl_page.<id>.root`)
    Root,
    /// Redirect from `/` to the locale-prefixed homepage (`tl_page.<id>.fallback`)
    Fallback,
}

impl RouteKind {
    fn suffix(self) -> Option<&'static str> {
        match self {
            Self::Primary => None,
            Self::Root => Some("root"),
            Self::Fallback => Some("fallback"),
        }
    }
}

/// Typed name of a page route
///
/// # Examples
///
/// ```
/// use rhtmx_page_router::{RouteKind, RouteName};
///
/// let name: RouteName = "tl_page.42.root".parse().unwrap();
/// assert_eq!(name, RouteName::new(42, RouteKind::Root));
/// assert_eq!(name.to_string(), "tl_page.42.root");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteName {
    pub page_id: u64,
    pub kind: RouteKind,
}

impl RouteName {
    pub fn new(page_id: u64, kind: RouteKind) -> Self {
        Self { page_id, kind }
    }

    pub fn primary(page_id: u64) -> Self {
        Self::new(page_id, RouteKind::Primary)
    }

    pub fn root(page_id: u64) -> Self {
        Self::new(page_id, RouteKind::Root)
    }

    pub fn fallback(page_id: u64) -> Self {
        Self::new(page_id, RouteKind::Fallback)
    }

    pub fn is_fallback(&self) -> bool {
        self.kind == RouteKind::Fallback
    }

    /// Extracts the page ID from a dotted name, ignoring the suffix
    ///
    /// Returns `None` for names of other route families or non-numeric IDs.
    pub fn page_id_of(name: &str) -> Option<u64> {
        let rest = name.strip_prefix(PAGE_ROUTE_PREFIX)?.strip_prefix('.')?;
        let id = rest.split('.').next()?;
        if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        id.parse().ok()
    }
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", PAGE_ROUTE_PREFIX, self.page_id)?;
        if let Some(suffix) = self.kind.suffix() {
            write!(f, ".{suffix}")?;
        }
        Ok(())
    }
}

impl FromStr for RouteName {
    type Err = RoutingError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let invalid = || RoutingError::InvalidRouteName(name.to_string());
        let page_id = Self::page_id_of(name).ok_or_else(invalid)?;

        let mut parts = name.splitn(3, '.').skip(2);
        let kind = match parts.next() {
            None => RouteKind::Primary,
            Some("root") => RouteKind::Root,
            Some("fallback") => RouteKind::Fallback,
            Some(_) => return Err(invalid()),
        };

        Ok(Self { page_id, kind })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_kind() {
        assert_eq!("tl_page.7".parse::<RouteName>().unwrap(), RouteName::primary(7));
        assert_eq!("tl_page.7.root".parse::<RouteName>().unwrap(), RouteName::root(7));
        assert_eq!("tl_page.7.fallback".parse::<RouteName>().unwrap(), RouteName::fallback(7));
    }

    #[test]
    fn rejects_malformed_names() {
        for name in ["tl_page", "tl_page.", "tl_page.abc", "tl_page.-1", "tl_news.7", "tl_page.7.other", "tl_pagex.7"] {
            assert!(name.parse::<RouteName>().is_err(), "{name} should not parse");
        }
    }

    #[test]
    fn page_id_ignores_suffix() {
        assert_eq!(RouteName::page_id_of("tl_page.12.anything"), Some(12));
        assert_eq!(RouteName::page_id_of("tl_page.x"), None);
    }

    #[test]
    fn display_round_trips() {
        for name in [RouteName::primary(1), RouteName::root(2), RouteName::fallback(3)] {
            assert_eq!(name.to_string().parse::<RouteName>().unwrap(), name);
        }
    }
}
