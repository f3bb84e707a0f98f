//! Root page lookups on top of request matching
//!
//! The finder matches a synthetic request for `/` on the given host, so the
//! root page it returns is the one the homepage of that host would serve
//! (including the Accept-Language negotiation of the route order).

use std::sync::Arc;

use tracing::trace;

use crate::error::{Result, RoutingError};
use crate::matcher::RequestMatcher;
use crate::page::{Page, PageFilter, PageRepository};
use crate::request::RoutingRequest;

pub struct PageFinder {
    matcher: Arc<dyn RequestMatcher>,
    repository: Arc<dyn PageRepository>,
}

impl PageFinder {
    pub fn new(matcher: Arc<dyn RequestMatcher>, repository: Arc<dyn PageRepository>) -> Self {
        Self { matcher, repository }
    }

    /// Root page serving the homepage of `host` for the given languages
    pub fn find_root_page_for_host_and_language(&self, host: &str, accept_language: Option<&str>) -> Result<Option<Arc<Page>>> {
        let mut request = RoutingRequest::new("/").with_host(host);
        if let Some(header) = accept_language {
            request = request.with_accept_language(header);
        }
        self.match_root_page(&request)
    }

    /// Root page of a request
    ///
    /// A page already resolved upstream wins; otherwise the host and
    /// Accept-Language of the request decide.
    pub fn find_root_page_for_request(&self, request: &RoutingRequest) -> Result<Option<Arc<Page>>> {
        if let Some(page) = &request.page_model {
            return self.root_of(page);
        }

        let mut homepage = RoutingRequest::new("/").with_host(request.host.clone()).with_scheme(request.scheme.clone());
        homepage.accept_language = request.accept_language.clone();
        self.match_root_page(&homepage)
    }

    /// Every root page sharing the DNS binding of the root serving `host`
    pub fn find_root_pages_for_host(&self, host: &str) -> Result<Vec<Arc<Page>>> {
        let Some(root) = self.find_root_page_for_host_and_language(host, None)? else {
            return Ok(Vec::new());
        };
        Ok(self.repository.find_by(&PageFilter::RootsWithDns(root.dns.clone()))?)
    }

    /// First page of `page_type` directly below the request's root page,
    /// by sorting
    pub fn find_first_page_of_type_for_request(&self, request: &RoutingRequest, page_type: &str) -> Result<Option<Arc<Page>>> {
        let Some(root) = self.find_root_page_for_request(request)? else {
            return Ok(None);
        };

        let mut pages = self.repository.find_by(&PageFilter::ChildrenOfType {
            pid: root.id,
            page_type: page_type.to_string(),
        })?;
        pages.sort_by(|a, b| a.sorting.cmp(&b.sorting).then(a.id.cmp(&b.id)));
        Ok(pages.into_iter().next())
    }

    fn match_root_page(&self, request: &RoutingRequest) -> Result<Option<Arc<Page>>> {
        let matched = match self.matcher.match_request(request) {
            Ok(matched) => matched,
            Err(RoutingError::Repository(err)) => return Err(RoutingError::Repository(err)),
            Err(err) => {
                trace!(host = %request.host, error = %err, "no root page matched");
                return Ok(None);
            }
        };

        match matched.page() {
            Some(page) => self.root_of(page),
            None => Ok(None),
        }
    }

    fn root_of(&self, page: &Arc<Page>) -> Result<Option<Arc<Page>>> {
        if page.is_root() {
            return Ok(Some(Arc::clone(page)));
        }
        let details = page.load_details(self.repository.as_ref())?;
        Ok(self.repository.find_by_pk(details.root_id)?)
    }
}
