//! Content objects and the URL resolver chain
//!
//! Outbound URL generation starts from arbitrary content (a news item, an
//! article, a page, ...). Registered [`UrlResolver`]s translate that content
//! step by step into a [`Page`], a different piece of content, or a final
//! URL string.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::page::Page;

pub mod generator;

pub use generator::{ContentUrlGenerator, MAX_RESOLUTION_DEPTH};

/// Content kind reported for pages
pub const PAGE_KIND: &str = "page";

/// Non-page content that can be turned into a URL
pub trait ContentObject: Any + Send + Sync + fmt::Debug {
    /// Kind of content, e.g. `news` or `article`
    fn kind(&self) -> &str;

    /// Stable identity within the kind, used for memoization and loop
    /// detection; content without identity is never cached
    fn identity(&self) -> Option<String> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Input of outbound URL generation
#[derive(Debug, Clone)]
pub enum Content {
    Page(Arc<Page>),
    Object(Arc<dyn ContentObject>),
}

impl Content {
    pub fn page(page: Arc<Page>) -> Self {
        Self::Page(page)
    }

    pub fn object<T: ContentObject>(object: T) -> Self {
        Self::Object(Arc::new(object))
    }

    pub fn as_page(&self) -> Option<&Arc<Page>> {
        match self {
            Self::Page(page) => Some(page),
            Self::Object(_) => None,
        }
    }

    /// Concrete content type, for resolvers
    ///
    /// # Examples
    ///
    /// ```
    /// use std::any::Any;
    /// use rhtmx_page_router::{Content, ContentObject};
    ///
    /// #[derive(Debug)]
    /// struct News { id: u64 }
    ///
    /// impl ContentObject for News {
    ///     fn kind(&self) -> &str { "news" }
    ///     fn as_any(&self) -> &dyn Any { self }
    /// }
    ///
    /// let content = Content::object(News { id: 3 });
    /// assert_eq!(content.downcast_ref::<News>().map(|n| n.id), Some(3));
    /// ```
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        match self {
            Self::Page(page) => (page.as_ref() as &dyn Any).downcast_ref(),
            Self::Object(object) => object.as_any().downcast_ref(),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Page(_) => PAGE_KIND,
            Self::Object(object) => object.kind(),
        }
    }

    /// `<kind>:<id>` when the content has a stable identity
    pub fn identity(&self) -> Option<String> {
        match self {
            Self::Page(page) => Some(format!("{PAGE_KIND}:{}", page.id)),
            Self::Object(object) => object.identity().map(|id| format!("{}:{id}", object.kind())),
        }
    }

    /// Whether both values refer to the same content
    pub fn same_as(&self, other: &Content) -> bool {
        match (self, other) {
            (Self::Page(a), Self::Page(b)) => Arc::ptr_eq(a, b) || a.id == b.id,
            (Self::Object(a), Self::Object(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
                    || matches!((self.identity(), other.identity()), (Some(x), Some(y)) if x == y)
            }
            _ => false,
        }
    }
}

impl From<Arc<Page>> for Content {
    fn from(page: Arc<Page>) -> Self {
        Self::Page(page)
    }
}

/// Outcome of one resolver step
#[derive(Debug, Clone)]
pub enum ContentUrlResult {
    /// Final URL, returned as is
    Url(String),
    /// Continue with other content; parameters of the original are dropped
    Redirect(Content),
    /// Continue with `target`; `donor` (or, when `None`, the content that
    /// was just resolved) supplies the optional route parameters
    Resolved { target: Content, donor: Option<Content> },
}

impl ContentUrlResult {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url(url.into())
    }

    pub fn redirect(content: impl Into<Content>) -> Self {
        Self::Redirect(content.into())
    }

    pub fn resolve(target: impl Into<Content>) -> Self {
        Self::Resolved {
            target: target.into(),
            donor: None,
        }
    }

    pub fn resolve_with_donor(target: impl Into<Content>, donor: Content) -> Self {
        Self::Resolved {
            target: target.into(),
            donor: Some(donor),
        }
    }
}

/// Strategy mapping content toward a page
pub trait UrlResolver: Send + Sync {
    /// Resolves `content` one step; `None` hands it to the next resolver
    fn resolve(&self, content: &Content) -> Result<Option<ContentUrlResult>>;

    /// Optional route parameters `content` contributes when its URL is
    /// generated through `page`
    fn parameters_for_content(&self, _content: &Content, _page: &Page) -> Result<HashMap<String, String>> {
        Ok(HashMap::new())
    }
}
