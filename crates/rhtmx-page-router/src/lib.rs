//! # RHTMX Page Router
//!
//! Content routing for a page tree: pages hang below root pages that bind a
//! host and a language, and every page gets routes generated from its type's
//! configuration.
//!
//! - **Inbound**: request path → candidate aliases (folder-style dirname
//!   expansion) → pages from the repository → generated routes, sorted by
//!   host binding, Accept-Language ranking and alias specificity
//! - **Outbound**: any content → URL resolver chain → page → route → URL,
//!   memoized until reset
//! - **Homepages**: root pages and `index` pages get a `/` (or `/<prefix>/`)
//!   route plus a redirect from `/` to the locale-prefixed homepage
//!
//! Route names follow `tl_page.<id>`, `tl_page.<id>.root` and
//! `tl_page.<id>.fallback` at the boundary and are typed ([`RouteName`])
//! everywhere else.
//!
//! Storage is a collaborator: implement [`PageRepository`] or use the
//! bundled [`InMemoryPageRepository`].
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rhtmx_page_router::{
//!     InMemoryPageRepository, Page, PageRegistry, PageRouteFactory, RequestMatcher, RouteProvider,
//!     RoutingRequest, UrlMatcher,
//! };
//!
//! let repository = Arc::new(
//!     InMemoryPageRepository::new()
//!         .with_page(Page::root(1, "example.com", "en").with_url_suffix(".html"))
//!         .with_page(Page::new(12, 1, "about-us", "regular")),
//! );
//! let factory = PageRouteFactory::new(Arc::new(PageRegistry::new()), repository);
//! let matcher = UrlMatcher::new(Arc::new(RouteProvider::new(factory)));
//!
//! let request = RoutingRequest::new("/about-us/team.html").with_host("example.com");
//! let matched = matcher.match_request(&request).unwrap();
//! assert_eq!(matched.name.to_string(), "tl_page.12");
//! assert_eq!(matched.parameter("parameters"), Some("/team"));
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod candidates;
pub mod config;
pub mod content;
mod error;
pub mod factory;
pub mod finder;
pub mod generator;
pub mod language;
pub mod matcher;
pub mod page;
pub mod path;
pub mod provider;
pub mod registry;
pub mod request;
pub mod route;
pub mod sorter;

// ============================================================================
// Re-exports
// ============================================================================

pub use candidates::{CandidateSet, PageCandidates};
pub use config::{RouteConfig, RoutingConfig};
pub use content::{Content, ContentObject, ContentUrlGenerator, ContentUrlResult, UrlResolver, MAX_RESOLUTION_DEPTH};
pub use error::{Result, RoutingError};
pub use factory::PageRouteFactory;
pub use finder::PageFinder;
pub use generator::{ReferenceType, UrlGenerator};
pub use language::LanguageRanking;
pub use matcher::{RequestMatcher, RouteMatch, UrlMatcher};
pub use page::{InMemoryPageRepository, Page, PageDetails, PageFilter, PageRepository};
pub use provider::{RootPageResolver, RouteProvider};
pub use registry::{LocaleOptions, PageRegistry, RouteEnhancer};
pub use request::{RequestContext, RoutingRequest};
pub use route::{CompiledRoute, RedirectTarget, Route, RouteCollection, RouteKind, RouteName};
pub use sorter::RouteComparator;
