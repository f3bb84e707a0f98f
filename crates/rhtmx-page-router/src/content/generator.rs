//! Content URL generator
//!
//! Walks the resolver chain from arbitrary content to a page, builds the
//! page route and renders it. Results (including routing failures) are
//! memoized per content identity, parameters and reference type until
//! [`ContentUrlGenerator::reset`] is called.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace, warn};

use super::{Content, ContentUrlResult, UrlResolver};
use crate::error::{Result, RoutingError};
use crate::factory::PageRouteFactory;
use crate::generator::{ReferenceType, UrlGenerator};
use crate::page::Page;
use crate::route::RouteName;

/// Maximum number of resolver hand-offs for one URL
pub const MAX_RESOLUTION_DEPTH: usize = 10;

/// Where the resolver chain ended
enum Resolution {
    Url(String),
    Page { page: Arc<Page>, donor: Option<Content> },
}

pub struct ContentUrlGenerator {
    factory: PageRouteFactory,
    url_generator: UrlGenerator,
    resolvers: Vec<Arc<dyn UrlResolver>>,
    cache: Mutex<HashMap<String, Result<String>>>,
}

impl ContentUrlGenerator {
    pub fn new(factory: PageRouteFactory, url_generator: UrlGenerator) -> Self {
        Self {
            factory,
            url_generator,
            resolvers: Vec::new(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Appends a resolver; resolvers are asked in registration order
    pub fn with_resolver<R>(mut self, resolver: R) -> Self
    where
        R: UrlResolver + 'static,
    {
        self.resolvers.push(Arc::new(resolver));
        self
    }

    pub fn url_generator(&self) -> &UrlGenerator {
        &self.url_generator
    }

    /// URL for `content`
    ///
    /// Caller `parameters` override parameters contributed by the content.
    pub fn generate(
        &self,
        content: &Content,
        parameters: &HashMap<String, String>,
        reference_type: ReferenceType,
    ) -> Result<String> {
        let key = cache_key(content, parameters, reference_type);

        if let Some(key) = &key {
            if let Some(cached) = self.cache().get(key) {
                trace!(key = %key, "content url cache hit");
                return cached.clone();
            }
        }

        let result = self.generate_uncached(content, parameters, reference_type);

        match (key, &result) {
            (Some(key), Err(err)) if !err.is_cacheable() => {
                debug!(key = %key, error = %err, "not caching transient failure");
            }
            (Some(key), _) => {
                self.cache().insert(key, result.clone());
            }
            (None, _) => trace!(kind = content.kind(), "content without identity, not cached"),
        }

        result
    }

    /// Drops every memoized URL
    pub fn reset(&self) {
        self.cache().clear();
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Result<String>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn generate_uncached(
        &self,
        content: &Content,
        parameters: &HashMap<String, String>,
        reference_type: ReferenceType,
    ) -> Result<String> {
        let (page, donor) = match self.resolve(content)? {
            Resolution::Url(url) => return Ok(url),
            Resolution::Page { page, donor } => (page, donor),
        };

        let mut route = self.factory.create_route_for_page(&page, "")?;
        let compiled = route.compile()?;

        let mut merged: HashMap<String, String> = HashMap::new();
        if let Some(donor) = donor.filter(|donor| !donor.same_as(&Content::Page(Arc::clone(&page)))) {
            for resolver in &self.resolvers {
                for (key, value) in resolver.parameters_for_content(&donor, &page)? {
                    if compiled.declares(&key) {
                        merged.entry(key).or_insert(value);
                    }
                }
            }
            route.content = Some(donor);
        }
        merged.extend(parameters.iter().map(|(k, v)| (k.clone(), v.clone())));

        let name = RouteName::primary(page.id).to_string();
        self.url_generator.generate_route(&name, &route, &merged, reference_type)
    }

    /// Follows the resolver chain until a URL or a page comes out
    fn resolve(&self, content: &Content) -> Result<Resolution> {
        let mut current = content.clone();
        let mut donor: Option<Content> = None;
        let mut visited: HashSet<String> = HashSet::new();
        let mut hand_offs = 0;

        loop {
            if let Some(identity) = current.identity() {
                if !visited.insert(identity.clone()) {
                    warn!(identity = %identity, "content resolution loop");
                    return Err(RoutingError::ResolutionLoop(identity));
                }
            }

            let Some(result) = self.resolve_once(&current)? else {
                return match current {
                    Content::Page(page) => Ok(Resolution::Page { page, donor }),
                    Content::Object(object) => Err(RoutingError::not_found(format!(
                        "no URL resolver for content of kind \"{}\"",
                        object.kind()
                    ))),
                };
            };

            hand_offs += 1;
            if hand_offs > MAX_RESOLUTION_DEPTH {
                warn!(kind = current.kind(), "content resolution too deep");
                return Err(RoutingError::ResolutionTooDeep {
                    depth: MAX_RESOLUTION_DEPTH,
                });
            }

            match result {
                ContentUrlResult::Url(url) => return Ok(Resolution::Url(url)),
                ContentUrlResult::Redirect(next) => {
                    trace!(from = current.kind(), to = next.kind(), "content redirect");
                    donor = None;
                    current = next;
                }
                ContentUrlResult::Resolved { target, donor: explicit } => {
                    trace!(from = current.kind(), to = target.kind(), "content resolved");
                    if donor.is_none() {
                        donor = Some(explicit.unwrap_or(current));
                    }
                    current = target;
                }
            }
        }
    }

    /// First resolver with an answer wins
    fn resolve_once(&self, content: &Content) -> Result<Option<ContentUrlResult>> {
        for resolver in &self.resolvers {
            if let Some(result) = resolver.resolve(content)? {
                return Ok(Some(result));
            }
        }
        Ok(None)
    }
}

/// Stable key for memoization; `None` for content without identity
fn cache_key(content: &Content, parameters: &HashMap<String, String>, reference_type: ReferenceType) -> Option<String> {
    let identity = content.identity()?;
    let parameters: BTreeMap<&String, &String> = parameters.iter().collect();
    serde_json::to_string(&(identity, parameters, reference_type)).ok()
}
