//! Per page-type route configuration
//!
//! The registry is assembled once at startup (from [`RoutingConfig`] and/or
//! the builder methods) and shared read-only afterwards, typically behind an
//! `Arc`. There is no way to mutate it once built.
//!
//! [`RoutingConfig`]: crate::config::RoutingConfig

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::config::RouteConfig;
use crate::page::Page;
use crate::route::Route;

/// Configuration used for page types nobody registered
static AUTO_CONFIG: Lazy<RouteConfig> = Lazy::new(RouteConfig::auto);

/// Hook rewriting the generated route of one page type
pub trait RouteEnhancer: Send + Sync {
    fn enhance(&self, route: Route, page: &Page) -> Route;
}

impl<F> RouteEnhancer for F
where
    F: Fn(Route, &Page) -> Route + Send + Sync,
{
    fn enhance(&self, route: Route, page: &Page) -> Route {
        self(route, page)
    }
}

/// Where URL prefixes and suffixes come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocaleOptions {
    /// Take prefix/suffix from these options instead of the root page
    pub legacy_routing: bool,
    /// Legacy only: prefix URLs with the root language
    pub prepend_locale: bool,
    /// Legacy only: suffix for every URL
    pub url_suffix: String,
}

#[derive(Default)]
pub struct PageRegistry {
    configs: HashMap<String, RouteConfig>,
    enhancers: HashMap<String, Arc<dyn RouteEnhancer>>,
    locale: LocaleOptions,
}

impl fmt::Debug for PageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut enhanced: Vec<&String> = self.enhancers.keys().collect();
        enhanced.sort();
        f.debug_struct("PageRegistry")
            .field("types", &self.types())
            .field("enhanced", &enhanced)
            .field("locale", &self.locale)
            .finish()
    }
}

impl PageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locale_options(mut self, locale: LocaleOptions) -> Self {
        self.locale = locale;
        self
    }

    /// Registers the route configuration of a page type
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_page_router::{PageRegistry, RouteConfig};
    ///
    /// let registry = PageRegistry::new()
    ///     .with_type("error_404", RouteConfig::unroutable())
    ///     .with_type("feed", RouteConfig::auto().with_path("/feed.xml").with_url_suffix(""));
    ///
    /// assert!(!registry.is_routable_type("error_404"));
    /// assert_eq!(registry.config_for("feed").path.as_deref(), Some("/feed.xml"));
    /// assert_eq!(registry.config_for("regular").path, None);
    /// ```
    pub fn with_type(mut self, page_type: impl Into<String>, config: RouteConfig) -> Self {
        self.configs.insert(page_type.into(), config);
        self
    }

    /// Registers a route enhancer, run as the last step of route creation
    pub fn with_enhancer<E>(mut self, page_type: impl Into<String>, enhancer: E) -> Self
    where
        E: RouteEnhancer + 'static,
    {
        self.enhancers.insert(page_type.into(), Arc::new(enhancer));
        self
    }

    pub fn locale_options(&self) -> &LocaleOptions {
        &self.locale
    }

    /// Route configuration of a type, auto mode for unknown types
    pub fn config_for(&self, page_type: &str) -> &RouteConfig {
        self.configs.get(page_type).unwrap_or(&*AUTO_CONFIG)
    }

    pub fn enhancer_for(&self, page_type: &str) -> Option<&Arc<dyn RouteEnhancer>> {
        self.enhancers.get(page_type)
    }

    pub fn is_routable_type(&self, page_type: &str) -> bool {
        self.config_for(page_type).routable
    }

    pub fn is_routable(&self, page: &Page) -> bool {
        self.is_routable_type(&page.page_type)
    }

    /// Registered types, sorted
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.configs.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    /// Types that never produce routes, sorted
    pub fn unroutable_types(&self) -> Vec<&str> {
        self.types().into_iter().filter(|t| !self.is_routable_type(t)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_types_use_auto_mode() {
        let registry = PageRegistry::new();
        let config = registry.config_for("whatever");
        assert_eq!(config.path, None);
        assert!(config.routable);
        assert!(registry.enhancer_for("whatever").is_none());
    }

    #[test]
    fn lists_unroutable_types() {
        let registry = PageRegistry::new()
            .with_type("folder", RouteConfig::unroutable())
            .with_type("error_404", RouteConfig::unroutable())
            .with_type("feed", RouteConfig::auto());
        assert_eq!(registry.types(), vec!["error_404", "feed", "folder"]);
        assert_eq!(registry.unroutable_types(), vec!["error_404", "folder"]);
    }

    #[test]
    fn closures_are_enhancers() {
        let registry = PageRegistry::new().with_enhancer("special", |route: Route, _page: &Page| route.with_option("enhanced", "1"));
        let enhancer = registry.enhancer_for("special").unwrap();
        let route = enhancer.enhance(Route::new("/x"), &Page::new(1, 0, "x", "special"));
        assert_eq!(route.options.get("enhanced").map(String::as_str), Some("1"));
    }
}
