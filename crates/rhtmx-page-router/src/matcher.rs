//! Request matching against provider routes

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::error::{Result, RoutingError};
use crate::page::Page;
use crate::provider::RouteProvider;
use crate::request::RoutingRequest;
use crate::route::{CompiledRoute, RedirectTarget, Route, RouteName};

/// Outcome of a successful match
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch {
    pub name: RouteName,
    pub route: Route,
    /// Route defaults overlaid with the captured path variables
    pub parameters: BTreeMap<String, String>,
}

impl RouteMatch {
    pub fn page(&self) -> Option<&Arc<Page>> {
        self.route.page_model()
    }

    /// Set when the matched route is a locale fallback redirect
    pub fn redirect(&self) -> Option<&RedirectTarget> {
        self.route.redirect.as_ref()
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(String::as_str)
    }
}

/// Maps a request onto the single route serving it
pub trait RequestMatcher: Send + Sync {
    fn match_request(&self, request: &RoutingRequest) -> Result<RouteMatch>;
}

/// Matches requests by trying the provider's sorted routes in order
///
/// Compiled routes are kept for the lifetime of the matcher, keyed by
/// everything compilation depends on.
pub struct UrlMatcher {
    provider: Arc<RouteProvider>,
    compiled: Mutex<HashMap<String, Result<Arc<CompiledRoute>>>>,
}

impl UrlMatcher {
    pub fn new(provider: Arc<RouteProvider>) -> Self {
        Self {
            provider,
            compiled: Mutex::new(HashMap::new()),
        }
    }

    pub fn provider(&self) -> &Arc<RouteProvider> {
        &self.provider
    }

    fn compiled_routes(&self) -> MutexGuard<'_, HashMap<String, Result<Arc<CompiledRoute>>>> {
        self.compiled.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn compile(&self, route: &Route) -> Result<Arc<CompiledRoute>> {
        let key = compile_key(route);
        if let Some(compiled) = self.compiled_routes().get(&key) {
            return compiled.clone();
        }
        let compiled = route.compile().map(Arc::new);
        self.compiled_routes().insert(key, compiled.clone());
        compiled
    }
}

/// Template, requirements and the names of defaulted variables
fn compile_key(route: &Route) -> String {
    let requirements: Vec<String> = route.requirements.iter().map(|(k, v)| format!("{k}={v}")).collect();
    let defaults: Vec<&str> = route.defaults.keys().map(String::as_str).collect();
    format!("{}\u{0}{}\u{0}{}", route.full_path(), requirements.join("\u{1}"), defaults.join("\u{1}"))
}

impl RequestMatcher for UrlMatcher {
    fn match_request(&self, request: &RoutingRequest) -> Result<RouteMatch> {
        let collection = self.provider.get_route_collection_for_request(request)?;
        let path = request.decoded_path();
        let host = request.host_name();

        for (name, route) in collection.iter() {
            if !route.host.is_empty() && !route.host.eq_ignore_ascii_case(&host) {
                continue;
            }
            if !route.methods.is_empty() && !route.methods.iter().any(|m| m == &request.method) {
                continue;
            }

            let compiled = match self.compile(route) {
                Ok(compiled) => compiled,
                Err(err) => {
                    warn!(route = %name, error = %err, "skipping route that does not compile");
                    continue;
                }
            };
            let Some(captured) = compiled.match_path(&path) else {
                continue;
            };

            let mut parameters = route.defaults.clone();
            parameters.extend(captured);
            debug!(path = %path, route = %name, "matched route");

            return Ok(RouteMatch {
                name: *name,
                route: route.clone(),
                parameters,
            });
        }

        Err(RoutingError::not_found(format!("no route found for \"{path}\"")))
    }
}
