//! Error types for page routing

use std::sync::Arc;

use thiserror::Error;

/// Errors produced while matching requests or generating URLs
#[derive(Debug, Clone, Error)]
pub enum RoutingError {
    /// No route matched, a named route does not exist, or the content
    /// resolver chain dead-ended
    #[error("route not found: {0}")]
    RouteNotFound(String),

    /// A route variable without default was not supplied during generation
    #[error("some mandatory parameters are missing ({}) to generate a URL for route \"{route}\"", missing.join(", "))]
    MissingMandatoryParameters { route: String, missing: Vec<String> },

    /// A supplied parameter does not satisfy the route requirement
    #[error("parameter \"{parameter}\" for route \"{route}\" must match \"{requirement}\" (\"{value}\" given)")]
    InvalidParameter {
        route: String,
        parameter: String,
        requirement: String,
        value: String,
    },

    /// Route name is not of the form `tl_page.<id>[.root|.fallback]`
    #[error("invalid route name \"{0}\"")]
    InvalidRouteName(String),

    /// Route template or requirement does not compile
    #[error("route \"{path}\" cannot be compiled: {reason}")]
    InvalidRoute { path: String, reason: String },

    /// Page is not attached to a root page
    #[error("no root page found for page ID {0}")]
    NoRootPage(u64),

    /// Content resolution handed off more often than allowed
    #[error("content resolution chain too deep (more than {depth} hand-offs)")]
    ResolutionTooDeep { depth: usize },

    /// Content resolution came back to content it already visited
    #[error("content resolution loop detected at \"{0}\"")]
    ResolutionLoop(String),

    /// Failure reported by the page repository collaborator
    #[error("page repository error: {0}")]
    Repository(Arc<anyhow::Error>),
}

impl RoutingError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::RouteNotFound(msg.into())
    }

    /// Whether a failed URL generation may be memoized
    ///
    /// Storage failures are transient and must not be cached.
    pub fn is_cacheable(&self) -> bool {
        !matches!(self, Self::Repository(_))
    }
}

impl From<anyhow::Error> for RoutingError {
    fn from(err: anyhow::Error) -> Self {
        Self::Repository(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;
