//! Inbound request attributes consumed by the router

use std::sync::Arc;

use crate::language::{parse_accept_language, LanguageRanking};
use crate::page::Page;
use crate::path::{decode_path, normalize_host};

/// The parts of an HTTP request routing depends on
#[derive(Debug, Clone)]
pub struct RoutingRequest {
    /// Raw (undecoded) request path, starting with `/`
    pub path: String,
    /// `Host` header, may include a port
    pub host: String,
    pub scheme: String,
    pub method: String,
    pub accept_language: Option<String>,
    /// Page already resolved by an upstream matching step
    pub page_model: Option<Arc<Page>>,
}

impl Default for RoutingRequest {
    fn default() -> Self {
        Self {
            path: "/".to_string(),
            host: String::new(),
            scheme: "http".to_string(),
            method: "GET".to_string(),
            accept_language: None,
            page_model: None,
        }
    }
}

impl RoutingRequest {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let path = if path.starts_with('/') { path } else { format!("/{path}") };
        Self {
            path,
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into().to_ascii_lowercase();
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into().to_ascii_uppercase();
        self
    }

    pub fn with_accept_language(mut self, header: impl Into<String>) -> Self {
        self.accept_language = Some(header.into());
        self
    }

    pub fn with_page_model(mut self, page: Arc<Page>) -> Self {
        self.page_model = Some(page);
        self
    }

    /// Percent-decoded path
    pub fn decoded_path(&self) -> String {
        decode_path(&self.path).into_owned()
    }

    /// Host without port, lower-cased
    pub fn host_name(&self) -> String {
        normalize_host(&self.host)
    }

    /// Accepted languages, best first
    pub fn languages(&self) -> Vec<String> {
        self.accept_language.as_deref().map(parse_accept_language).unwrap_or_default()
    }

    pub fn language_ranking(&self) -> LanguageRanking {
        LanguageRanking::new(self.languages())
    }

    /// Context for URL generation relative to this request
    pub fn context(&self) -> RequestContext {
        RequestContext {
            host: self.host_name(),
            scheme: self.scheme.clone(),
            base_url: String::new(),
        }
    }
}

/// Where generated URLs are relative to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub host: String,
    pub scheme: String,
    /// Prepended to every generated path, e.g. `/index.php`
    pub base_url: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self {
            host: String::new(),
            scheme: "http".to_string(),
            base_url: String::new(),
        }
    }
}

impl RequestContext {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            host: normalize_host(&host.into()),
            scheme: scheme.into().to_ascii_lowercase(),
            base_url: String::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults() {
        let request = RoutingRequest::new("about-us.html");
        assert_eq!(request.path, "/about-us.html");
        assert_eq!(request.method, "GET");
        assert_eq!(request.scheme, "http");
        assert!(request.languages().is_empty());
        assert!(request.language_ranking().is_empty());
    }

    #[test]
    fn host_and_path_are_normalized() {
        let request = RoutingRequest::new("/caf%C3%A9").with_host("Example.COM:8080");
        assert_eq!(request.decoded_path(), "/café");
        assert_eq!(request.host_name(), "example.com");
        assert_eq!(request.context().host, "example.com");
    }

    #[test]
    fn languages_from_header() {
        let request = RoutingRequest::new("/").with_accept_language("de-DE, en;q=0.8");
        assert_eq!(request.languages(), vec!["de-DE", "en"]);
        assert_eq!(request.language_ranking().rank("de"), Some(1));
    }

    #[test]
    fn base_url_has_no_trailing_slash() {
        let context = RequestContext::new("HTTPS", "example.com").with_base_url("/app/");
        assert_eq!(context.scheme, "https");
        assert_eq!(context.base_url, "/app");
    }
}
