//! Page route factory
//!
//! Builds the [`Route`] of a page from its type's [`RouteConfig`]:
//!
//! - **auto mode** (no configured path): `/<alias>{!parameters}` where the
//!   greedy `parameters` group is required (`/.+`) for pages with
//!   `require_item` and optional (`(/.+)?`) otherwise
//! - **configured mode**: the configured template; a relative template is
//!   placed below the page alias
//!
//! Host, scheme, URL prefix and suffix come from the page's root. The type's
//! route enhancer runs last. Building is deterministic: the same page state
//! always yields structurally equal routes.
//!
//! [`RouteConfig`]: crate::config::RouteConfig

use std::sync::Arc;

use tracing::trace;

use crate::content::Content;
use crate::error::{Result, RoutingError};
use crate::page::{Page, PageDetails, PageRepository};
use crate::registry::PageRegistry;
use crate::route::{Route, RouteName, PARAMETERS};

/// Requirement of the parameters group for pages that need an item
pub const REQUIRED_PARAMETERS: &str = "/.+";

/// Requirement of the parameters group for all other pages
pub const OPTIONAL_PARAMETERS: &str = "(/.+)?";

#[derive(Clone)]
pub struct PageRouteFactory {
    registry: Arc<PageRegistry>,
    repository: Arc<dyn PageRepository>,
}

impl PageRouteFactory {
    pub fn new(registry: Arc<PageRegistry>, repository: Arc<dyn PageRepository>) -> Self {
        Self { registry, repository }
    }

    pub fn registry(&self) -> &Arc<PageRegistry> {
        &self.registry
    }

    pub fn repository(&self) -> &Arc<dyn PageRepository> {
        &self.repository
    }

    /// Builds the primary route of `page`
    ///
    /// `default_parameters` becomes the default of the greedy parameters
    /// group in auto mode.
    pub fn create_route_for_page(&self, page: &Arc<Page>, default_parameters: &str) -> Result<Route> {
        if !self.registry.is_routable(page) {
            return Err(RoutingError::not_found(format!(
                "page ID {} of type \"{}\" is not routable",
                page.id, page.page_type
            )));
        }

        let alias = page.url_alias();
        if alias.contains(['{', '}']) {
            return Err(RoutingError::InvalidRoute {
                path: alias,
                reason: format!("alias of page ID {} contains a route variable delimiter", page.id),
            });
        }

        let details = page.load_details(self.repository.as_ref())?;
        let config = self.registry.config_for(&page.page_type);

        let mut defaults = config.defaults.clone();
        let mut requirements = config.requirements.clone();
        let path = match config.path.as_deref() {
            None => {
                defaults.insert(PARAMETERS.to_string(), default_parameters.to_string());
                let requirement = if page.require_item { REQUIRED_PARAMETERS } else { OPTIONAL_PARAMETERS };
                requirements.insert(PARAMETERS.to_string(), requirement.to_string());
                format!("/{alias}{{!{PARAMETERS}}}")
            }
            Some("") => format!("/{alias}"),
            Some(path) if path.starts_with('/') => path.to_string(),
            Some(path) => format!("/{alias}/{path}"),
        };

        defaults
            .entry("_locale".to_string())
            .or_insert_with(|| details.root_language.replace('-', "_"));
        defaults
            .entry("_canonical_route".to_string())
            .or_insert_with(|| RouteName::primary(page.id).to_string());

        let scheme = if details.root_use_ssl { "https" } else { "http" };
        let mut route = Route {
            path,
            defaults,
            requirements,
            options: config.options.clone(),
            host: details.domain.clone(),
            schemes: vec![scheme.to_string()],
            methods: Vec::new(),
            url_prefix: self.url_prefix(details),
            url_suffix: config.url_suffix.clone().unwrap_or_else(|| self.url_suffix(details)),
            page_model: None,
            content: None,
            redirect: None,
        }
        .with_methods(config.methods.iter().map(String::as_str));

        if let Some(enhancer) = self.registry.enhancer_for(&page.page_type) {
            route = enhancer.enhance(route, page);
        }
        route.page_model = Some(Arc::clone(page));

        trace!(page = page.id, path = %route.full_path(), "created page route");
        Ok(route)
    }

    /// Builds the route of `page` carrying `content` as route content
    pub fn create_route_for_content(&self, page: &Arc<Page>, content: Content) -> Result<Route> {
        Ok(self.create_route_for_page(page, "")?.with_content(content))
    }

    fn url_prefix(&self, details: &PageDetails) -> String {
        let locale = self.registry.locale_options();
        if !locale.legacy_routing {
            return details.url_prefix.clone();
        }
        if locale.prepend_locale {
            details.root_language.clone()
        } else {
            String::new()
        }
    }

    fn url_suffix(&self, details: &PageDetails) -> String {
        let locale = self.registry.locale_options();
        if locale.legacy_routing {
            locale.url_suffix.clone()
        } else {
            details.url_suffix.clone()
        }
    }
}
