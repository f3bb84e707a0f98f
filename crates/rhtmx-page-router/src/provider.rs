//! Route provider
//!
//! Turns requests and route names into sorted [`RouteCollection`]s. Routes
//! are rebuilt from the page repository on every call; nothing is cached
//! here.
//!
//! For each candidate page the provider adds its primary route. Root pages
//! and pages aliased `index` or `/` additionally get a homepage route
//! (`/` or `/<prefix>/`) and, when the homepage is locale-prefixed, a
//! non-permanent redirect from `/` to it.

use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::candidates::{CandidateSet, PageCandidates};
use crate::error::{Result, RoutingError};
use crate::factory::PageRouteFactory;
use crate::page::{Page, PageFilter, PageRepository, INDEX_ALIASES, ROOT_TYPE};
use crate::path::{decode_path, has_reserved_segment, is_locale_root, normalize_host};
use crate::registry::PageRegistry;
use crate::request::RoutingRequest;
use crate::route::{Route, RouteCollection, RouteName, PARAMETERS};
use crate::sorter::RouteComparator;

/// Hook that may replace root page discovery for a host
///
/// Hooks run in registration order; the first page returned becomes the
/// only root page for the request.
pub trait RootPageResolver: Send + Sync {
    fn resolve_root_page(&self, host: &str) -> anyhow::Result<Option<Arc<Page>>>;
}

impl<F> RootPageResolver for F
where
    F: Fn(&str) -> anyhow::Result<Option<Arc<Page>>> + Send + Sync,
{
    fn resolve_root_page(&self, host: &str) -> anyhow::Result<Option<Arc<Page>>> {
        self(host)
    }
}

pub struct RouteProvider {
    factory: PageRouteFactory,
    root_resolvers: Vec<Arc<dyn RootPageResolver>>,
}

impl RouteProvider {
    pub fn new(factory: PageRouteFactory) -> Self {
        Self {
            factory,
            root_resolvers: Vec::new(),
        }
    }

    /// Appends a root page hook
    pub fn with_root_resolver<R>(mut self, resolver: R) -> Self
    where
        R: RootPageResolver + 'static,
    {
        self.root_resolvers.push(Arc::new(resolver));
        self
    }

    pub fn factory(&self) -> &PageRouteFactory {
        &self.factory
    }

    pub fn registry(&self) -> &PageRegistry {
        self.factory.registry()
    }

    pub fn repository(&self) -> &dyn PageRepository {
        self.factory.repository().as_ref()
    }

    /// Candidate routes for a request, best match first
    ///
    /// Paths with an `auto_item` segment and paths without candidates yield
    /// an empty collection, not an error.
    pub fn get_route_collection_for_request(&self, request: &RoutingRequest) -> Result<RouteCollection> {
        let path = decode_path(&request.path);
        if has_reserved_segment(&path) {
            debug!(path = %path, "reserved auto_item segment, no routes");
            return Ok(RouteCollection::new());
        }

        let candidates = self.page_candidates()?;
        let mut pages = Vec::new();

        if path == "/" || self.is_root_path(&path, &candidates) {
            pages = self.find_root_pages(&request.host)?;
        }

        let found = candidates.find_candidates(&path);
        if !found.is_empty() {
            for page in self.find_candidate_pages(&found)? {
                if !pages.iter().any(|p| p.id == page.id) {
                    pages.push(page);
                }
            }
        }

        if pages.is_empty() {
            debug!(path = %path, "no candidate pages");
            return Ok(RouteCollection::new());
        }

        let mut routes = self.routes_for_pages(&pages)?;
        let ranking = request.language_ranking();
        RouteComparator::new(Some(&ranking)).sort(&mut routes);

        debug!(path = %path, pages = pages.len(), routes = routes.len(), "built route collection");
        Ok(routes.into_iter().collect())
    }

    /// Route for a dotted route name (`tl_page.<id>[.root|.fallback]`)
    ///
    /// Every failure, including a malformed name, is `RouteNotFound`.
    pub fn get_route_by_name(&self, name: &str) -> Result<Route> {
        let route_name: RouteName = name
            .parse()
            .map_err(|_| RoutingError::not_found(format!("route \"{name}\" is not a page route")))?;
        self.get_route(&route_name)
    }

    pub fn get_route(&self, name: &RouteName) -> Result<Route> {
        let page = self
            .repository()
            .find_by_pk(name.page_id)?
            .filter(|page| self.registry().is_routable(page))
            .ok_or_else(|| RoutingError::not_found(format!("page ID {} for route \"{name}\" not found", name.page_id)))?;

        self.routes_for_page(&page)?
            .into_iter()
            .find(|(route_name, _)| route_name == name)
            .map(|(_, route)| route)
            .ok_or_else(|| RoutingError::not_found(format!("route \"{name}\" not found")))
    }

    /// Routes for the given names, or for every routable page when `names`
    /// is `None`
    ///
    /// Names of other route families are ignored.
    pub fn get_routes_by_names(&self, names: Option<&[String]>) -> Result<RouteCollection> {
        let (pages, wanted) = match names {
            None => (self.repository().find_by(&PageFilter::All)?, None),
            Some(names) => {
                let mut ids: Vec<u64> = names.iter().filter_map(|n| RouteName::page_id_of(n)).collect();
                ids.sort_unstable();
                ids.dedup();
                if ids.is_empty() {
                    return Ok(RouteCollection::new());
                }
                let wanted: Vec<RouteName> = names.iter().filter_map(|n| n.parse().ok()).collect();
                (self.repository().find_by(&PageFilter::Ids(ids))?, Some(wanted))
            }
        };

        let pages: Vec<Arc<Page>> = pages.into_iter().filter(|p| self.registry().is_routable(p)).collect();
        let mut routes = self.routes_for_pages(&pages)?;
        if let Some(wanted) = wanted {
            routes.retain(|(name, _)| wanted.contains(name));
        }
        RouteComparator::new(None).sort(&mut routes);

        Ok(routes.into_iter().collect())
    }

    /// Root pages for a host
    ///
    /// A registered hook returning a page short-circuits the lookup.
    /// Otherwise: roots bound to the host or to no host, plus pages aliased
    /// `index` or `/`, unroutable types excluded.
    pub fn find_root_pages(&self, host: &str) -> Result<Vec<Arc<Page>>> {
        let host = normalize_host(host);
        for resolver in &self.root_resolvers {
            if let Some(page) = resolver.resolve_root_page(&host)? {
                debug!(host = %host, page = page.id, "root page provided by hook");
                return Ok(vec![page]);
            }
        }

        let mut pages = self.repository().find_by(&PageFilter::RootsForHost(host))?;
        let index_aliases: Vec<String> = INDEX_ALIASES.iter().map(|a| a.to_string()).collect();
        for page in self.repository().find_by_aliases(&index_aliases)? {
            if !pages.iter().any(|p| p.id == page.id) {
                pages.push(page);
            }
        }

        pages.retain(|page| self.registry().is_routable(page));
        Ok(pages)
    }

    /// Candidate resolver for the URL prefixes and suffixes currently in use
    pub fn page_candidates(&self) -> Result<PageCandidates> {
        let locale = self.registry().locale_options();
        let roots: Vec<Arc<Page>> = self
            .repository()
            .find_by_type(ROOT_TYPE)?
            .into_iter()
            .filter(|page| self.registry().is_routable(page))
            .collect();

        let (prefixes, mut suffixes): (Vec<String>, Vec<String>) = if locale.legacy_routing {
            let prefixes = if locale.prepend_locale {
                roots.iter().map(|root| root.language.clone()).collect()
            } else {
                Vec::new()
            };
            (prefixes, vec![locale.url_suffix.clone()])
        } else {
            (
                roots.iter().map(|root| root.url_prefix.clone()).collect(),
                roots.iter().map(|root| root.url_suffix.clone()).collect(),
            )
        };

        for page_type in self.registry().types() {
            if let Some(suffix) = &self.registry().config_for(page_type).url_suffix {
                suffixes.push(suffix.clone());
            }
        }

        Ok(PageCandidates::new(prefixes, suffixes))
    }

    /// `/en/` style homepage paths
    fn is_root_path(&self, path: &str, candidates: &PageCandidates) -> bool {
        let locale = self.registry().locale_options();
        if locale.legacy_routing {
            return locale.prepend_locale && is_locale_root(path);
        }
        candidates.is_prefix_root(path)
    }

    fn find_candidate_pages(&self, candidates: &[String]) -> Result<Vec<Arc<Page>>> {
        let set = CandidateSet::partition(candidates);
        trace!(ids = ?set.ids, aliases = ?set.aliases, "looking up candidate pages");

        let mut pages = Vec::new();
        if !set.ids.is_empty() {
            pages.extend(self.repository().find_by(&PageFilter::Ids(set.ids))?);
        }
        if !set.aliases.is_empty() {
            for page in self.repository().find_by_aliases(&set.aliases)? {
                if !pages.iter().any(|p: &Arc<Page>| p.id == page.id) {
                    pages.push(page);
                }
            }
        }

        pages.retain(|page| self.registry().is_routable(page));
        Ok(pages)
    }

    fn routes_for_pages(&self, pages: &[Arc<Page>]) -> Result<Vec<(RouteName, Route)>> {
        let mut routes = Vec::new();
        for page in pages {
            routes.extend(self.routes_for_page(page)?);
        }
        Ok(routes)
    }

    /// Primary route plus homepage routes; pages outside any root are skipped
    fn routes_for_page(&self, page: &Arc<Page>) -> Result<Vec<(RouteName, Route)>> {
        let route = match self.factory.create_route_for_page(page, "") {
            Ok(route) => route,
            Err(RoutingError::NoRootPage(id)) => {
                debug!(page = id, "skipping page without root page");
                return Ok(Vec::new());
            }
            Err(err @ RoutingError::InvalidRoute { .. }) => {
                warn!(page = page.id, error = %err, "skipping page with an invalid route");
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut routes = Vec::with_capacity(3);
        if page.is_root() || page.is_index_alias() {
            routes.extend(self.homepage_routes(page, &route));
        }
        routes.insert(0, (RouteName::primary(page.id), route));
        Ok(routes)
    }

    fn homepage_routes(&self, page: &Arc<Page>, route: &Route) -> Vec<(RouteName, Route)> {
        let mut defaults = route.defaults.clone();
        defaults.remove(PARAMETERS);

        let homepage = Route {
            path: "/".to_string(),
            defaults,
            requirements: Default::default(),
            url_suffix: String::new(),
            redirect: None,
            ..route.clone()
        };

        let prefix = route.url_prefix.clone();
        let legacy = self.registry().locale_options().legacy_routing;
        let redirect_disabled = page.details().is_some_and(|d| d.disable_language_redirect);

        let mut routes = Vec::with_capacity(2);
        if !prefix.is_empty() && (legacy || !redirect_disabled) {
            let fallback = Route {
                url_prefix: String::new(),
                ..homepage.clone()
            }
            .with_redirect(format!("/{prefix}/"), false);
            routes.push((RouteName::root(page.id), homepage));
            routes.push((RouteName::fallback(page.id), fallback));
        } else {
            routes.push((RouteName::root(page.id), homepage));
        }
        routes
    }
}
