//! URL generation from page routes

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Result, RoutingError};
use crate::provider::RouteProvider;
use crate::request::RequestContext;
use crate::route::{Route, RouteName, Token};

/// Parameter rendered as the URL fragment
pub const FRAGMENT: &str = "_fragment";

/// Characters left readable in generated paths
const DECODED_CHARS: [(&str, &str); 10] = [
    ("%2F", "/"),
    ("%40", "@"),
    ("%3A", ":"),
    ("%3B", ";"),
    ("%2C", ","),
    ("%3D", "="),
    ("%2B", "+"),
    ("%21", "!"),
    ("%2A", "*"),
    ("%7C", "|"),
];

/// Shape of a generated URL
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    /// `/en/about-us.html`
    #[default]
    AbsolutePath,
    /// `https://example.com/en/about-us.html`
    AbsoluteUrl,
    /// `//example.com/en/about-us.html`
    NetworkPath,
}

/// Renders routes into URLs relative to a request context
pub struct UrlGenerator {
    provider: Arc<RouteProvider>,
    context: RequestContext,
}

impl UrlGenerator {
    pub fn new(provider: Arc<RouteProvider>, context: RequestContext) -> Self {
        Self { provider, context }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn provider(&self) -> &Arc<RouteProvider> {
        &self.provider
    }

    /// URL of a named page route
    pub fn generate(&self, name: &str, parameters: &HashMap<String, String>, reference_type: ReferenceType) -> Result<String> {
        let route = self.provider.get_route_by_name(name)?;
        self.generate_route(name, &route, parameters, reference_type)
    }

    /// URL of an already built route; `name` only appears in errors
    ///
    /// Variables without a value raise `MissingMandatoryParameters`, values
    /// not matching their requirement raise `InvalidParameter`. Parameters
    /// the path does not declare (and that are not route defaults) become
    /// the query string, sorted by key.
    pub fn generate_route(
        &self,
        name: &str,
        route: &Route,
        parameters: &HashMap<String, String>,
        reference_type: ReferenceType,
    ) -> Result<String> {
        let compiled = route.compile()?;

        let mut merged: BTreeMap<&str, &str> = route.defaults.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
        merged.extend(parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())));

        let missing: Vec<String> = compiled
            .path_variables()
            .iter()
            .filter(|variable| !merged.contains_key(variable.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(RoutingError::MissingMandatoryParameters {
                route: name.to_string(),
                missing,
            });
        }

        let mut path = String::new();
        let mut optional = true;
        for (index, token) in compiled.tokens().iter().enumerate().rev() {
            match token {
                Token::Text(text) => {
                    path.insert_str(0, text);
                    optional = false;
                }
                Token::Variable {
                    separator,
                    name: variable,
                    important,
                } => {
                    let value = merged.get(variable.as_str()).copied().unwrap_or_default();
                    let is_default = route.default_value(variable) == Some(value);
                    if !optional || *important || !compiled.is_optional(index) || !is_default {
                        check_requirement(name, route, variable, value)?;
                        path.insert_str(0, &format!("{separator}{value}"));
                        optional = false;
                    }
                }
            }
        }

        let mut url = encode_path(if path.is_empty() { "/" } else { &path });

        let extra: BTreeMap<&str, &str> = parameters
            .iter()
            .filter(|(key, _)| {
                key.as_str() != FRAGMENT && !compiled.declares(key) && !route.defaults.contains_key(key.as_str())
            })
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if !extra.is_empty() {
            let query: Vec<String> = extra
                .iter()
                .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                .collect();
            url.push('?');
            url.push_str(&query.join("&"));
        }
        if let Some(fragment) = parameters.get(FRAGMENT).filter(|f| !f.is_empty()) {
            url.push('#');
            url.push_str(&urlencoding::encode(fragment));
        }

        let url = self.qualify(route, url, reference_type);
        trace!(route = name, url = %url, "generated url");
        Ok(url)
    }

    /// URL of a typed page route name
    pub fn generate_named(
        &self,
        name: &RouteName,
        parameters: &HashMap<String, String>,
        reference_type: ReferenceType,
    ) -> Result<String> {
        let route = self.provider.get_route(name)?;
        self.generate_route(&name.to_string(), &route, parameters, reference_type)
    }

    /// Adds scheme and host where the reference type or the route demand it
    fn qualify(&self, route: &Route, path: String, reference_type: ReferenceType) -> String {
        let context = &self.context;
        let host = if route.host.is_empty() { context.host.as_str() } else { route.host.as_str() };
        let scheme = if route.schemes.is_empty() || route.schemes.iter().any(|s| s.eq_ignore_ascii_case(&context.scheme)) {
            context.scheme.as_str()
        } else {
            route.schemes[0].as_str()
        };

        let mut reference_type = reference_type;
        if !scheme.eq_ignore_ascii_case(&context.scheme) {
            reference_type = ReferenceType::AbsoluteUrl;
        } else if !host.eq_ignore_ascii_case(&context.host) && reference_type == ReferenceType::AbsolutePath {
            reference_type = ReferenceType::NetworkPath;
        }

        let path = format!("{}{path}", context.base_url);
        match reference_type {
            _ if host.is_empty() => path,
            ReferenceType::AbsolutePath => path,
            ReferenceType::AbsoluteUrl => format!("{scheme}://{host}{path}"),
            ReferenceType::NetworkPath => format!("//{host}{path}"),
        }
    }
}

fn check_requirement(name: &str, route: &Route, variable: &str, value: &str) -> Result<()> {
    let Some(requirement) = route.requirements.get(variable) else {
        return Ok(());
    };
    let invalid_route = |err: regex::Error| RoutingError::InvalidRoute {
        path: route.full_path(),
        reason: err.to_string(),
    };
    let regex = requirement_regex(requirement).map_err(invalid_route)?;
    if regex.is_match(value) {
        Ok(())
    } else {
        Err(RoutingError::InvalidParameter {
            route: name.to_string(),
            parameter: variable.to_string(),
            requirement: requirement.clone(),
            value: value.to_string(),
        })
    }
}

/// Anchored requirement regex, compiled once per requirement
fn requirement_regex(requirement: &str) -> std::result::Result<Regex, regex::Error> {
    static REQUIREMENTS: Lazy<Mutex<HashMap<String, Regex>>> = Lazy::new(|| Mutex::new(HashMap::new()));

    let mut cache = REQUIREMENTS.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(requirement) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(&format!("^(?:{requirement})$"))?;
    cache.insert(requirement.to_string(), regex.clone());
    Ok(regex)
}

/// Percent-encodes a path, keeping `/` and a few readable delimiters
pub fn encode_path(path: &str) -> String {
    let mut encoded = urlencoding::encode(path).into_owned();
    for (escaped, plain) in DECODED_CHARS {
        encoded = encoded.replace(escaped, plain);
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::PageRouteFactory;
    use crate::page::{InMemoryPageRepository, Page};
    use crate::registry::PageRegistry;
    use crate::config::RouteConfig;
    use pretty_assertions::assert_eq;

    fn generator(context: RequestContext) -> UrlGenerator {
        let repository = InMemoryPageRepository::new()
            .with_page(Page::root(1, "example.com", "en").with_url_prefix("en").with_url_suffix(".html"))
            .with_page(Page::new(12, 1, "about-us", "regular"))
            .with_page(Page::new(3, 1, "products", "regular").with_require_item(true))
            .with_page(Page::new(7, 1, "list", "listing"))
            .with_page(Page::root(20, "secure.example.org", "de").with_ssl(true))
            .with_page(Page::new(21, 20, "kontakt", "regular"));
        let registry = PageRegistry::new().with_type(
            "listing",
            RouteConfig::auto()
                .with_path("{page}")
                .with_default("page", "1")
                .with_requirement("page", "\\d+")
                .with_url_suffix(""),
        );
        let provider = RouteProvider::new(PageRouteFactory::new(Arc::new(registry), Arc::new(repository)));
        UrlGenerator::new(Arc::new(provider), context)
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn local() -> RequestContext {
        RequestContext::new("http", "example.com")
    }

    #[test]
    fn renders_auto_route() {
        let generator = generator(local());
        assert_eq!(generator.generate("tl_page.12", &params(&[]), ReferenceType::AbsolutePath).unwrap(), "/en/about-us.html");
        assert_eq!(
            generator
                .generate("tl_page.12", &params(&[("parameters", "/items/foo")]), ReferenceType::AbsolutePath)
                .unwrap(),
            "/en/about-us/items/foo.html"
        );
    }

    #[test]
    fn absolute_url_uses_context() {
        let generator = generator(local());
        assert_eq!(
            generator.generate("tl_page.12", &params(&[]), ReferenceType::AbsoluteUrl).unwrap(),
            "http://example.com/en/about-us.html"
        );
    }

    #[test]
    fn required_item_must_be_given() {
        let generator = generator(local());
        let err = generator.generate("tl_page.3", &params(&[]), ReferenceType::AbsolutePath).unwrap_err();
        assert!(matches!(err, RoutingError::InvalidParameter { ref parameter, .. } if parameter == "parameters"));
        assert_eq!(
            generator.generate("tl_page.3", &params(&[("parameters", "/shoes")]), ReferenceType::AbsolutePath).unwrap(),
            "/en/products/shoes.html"
        );
    }

    #[test]
    fn optional_default_is_left_out() {
        let generator = generator(local());
        assert_eq!(generator.generate("tl_page.7", &params(&[]), ReferenceType::AbsolutePath).unwrap(), "/en/list");
        assert_eq!(
            generator.generate("tl_page.7", &params(&[("page", "3")]), ReferenceType::AbsolutePath).unwrap(),
            "/en/list/3"
        );
        assert!(matches!(
            generator.generate("tl_page.7", &params(&[("page", "x")]), ReferenceType::AbsolutePath),
            Err(RoutingError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn extra_parameters_become_query() {
        let generator = generator(local());
        let url = generator
            .generate("tl_page.12", &params(&[("b", "2"), ("a", "x y"), ("_fragment", "top")]), ReferenceType::AbsolutePath)
            .unwrap();
        assert_eq!(url, "/en/about-us.html?a=x%20y&b=2#top");
    }

    #[test]
    fn missing_variables_are_reported() {
        let generator = generator(local());
        let route = Route::new("/{year}/{slug}");
        let err = generator.generate_route("custom", &route, &params(&[("year", "2024")]), ReferenceType::AbsolutePath).unwrap_err();
        match err {
            RoutingError::MissingMandatoryParameters { route, missing } => {
                assert_eq!(route, "custom");
                assert_eq!(missing, vec!["slug"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn other_host_or_scheme_is_absolute() {
        let generator = generator(local());
        assert_eq!(
            generator.generate("tl_page.21", &params(&[]), ReferenceType::AbsolutePath).unwrap(),
            "https://secure.example.org/kontakt"
        );

        let generator = self::generator(RequestContext::new("https", "example.com"));
        assert_eq!(
            generator
                .generate_route("plain", &Route::new("/x").with_host("cdn.example.com"), &params(&[]), ReferenceType::AbsolutePath)
                .unwrap(),
            "//cdn.example.com/x"
        );
    }

    #[test]
    fn values_are_encoded() {
        let generator = generator(local());
        let route = Route::new("/tags/{tag}");
        assert_eq!(
            generator.generate_route("tags", &route, &params(&[("tag", "café au lait")]), ReferenceType::AbsolutePath).unwrap(),
            "/tags/caf%C3%A9%20au%20lait"
        );
    }

    #[test]
    fn base_url_is_prepended() {
        let generator = generator(local().with_base_url("/index.php"));
        assert_eq!(
            generator.generate("tl_page.12", &params(&[]), ReferenceType::AbsolutePath).unwrap(),
            "/index.php/en/about-us.html"
        );
    }

    #[test]
    fn requirement_regex_is_anchored_and_reused() {
        let first = requirement_regex("\\d+").unwrap();
        assert!(first.is_match("42"));
        assert!(!first.is_match("42a"));
        let second = requirement_regex("\\d+").unwrap();
        assert_eq!(first.as_str(), second.as_str());
        assert!(requirement_regex("(unclosed").is_err());
    }

    #[test]
    fn reference_types_serialize_in_snake_case() {
        assert_eq!(serde_json::to_string(&ReferenceType::NetworkPath).unwrap(), "\"network_path\"");
    }
}
