// File: src/config.rs
// Purpose: Routing configuration parsing from routing.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::registry::{LocaleOptions, PageRegistry};

/// Routing configuration
///
/// ```toml
/// legacy_routing = false
/// prepend_locale = false
///
/// [page_types.news_feed]
/// path = "/feed/{format}"
/// requirements = { format = "rss|atom" }
/// url_suffix = ""
///
/// [page_types.error_404]
/// routable = false
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Compatibility mode: URL prefix/suffix come from this file instead of root pages
    #[serde(default = "default_false")]
    pub legacy_routing: bool,

    /// Legacy mode only: prefix every URL with the root language
    #[serde(default = "default_false")]
    pub prepend_locale: bool,

    /// Legacy mode only: suffix appended to every URL
    #[serde(default = "default_url_suffix")]
    pub url_suffix: String,

    /// Route configuration per page type
    #[serde(default)]
    pub page_types: BTreeMap<String, RouteConfig>,
}

/// How routes for one page type are built
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Path template; `None` is auto mode (alias + greedy parameters)
    #[serde(default)]
    pub path: Option<String>,

    #[serde(default)]
    pub defaults: BTreeMap<String, String>,

    #[serde(default)]
    pub requirements: BTreeMap<String, String>,

    #[serde(default)]
    pub options: BTreeMap<String, String>,

    #[serde(default)]
    pub methods: Vec<String>,

    /// Overrides the URL suffix of the root page
    #[serde(default)]
    pub url_suffix: Option<String>,

    /// Unroutable types (error pages, folders) never produce routes
    #[serde(default = "default_true")]
    pub routable: bool,
}

// Default values
fn default_url_suffix() -> String {
    ".html".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            legacy_routing: false,
            prepend_locale: false,
            url_suffix: default_url_suffix(),
            page_types: BTreeMap::new(),
        }
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            path: None,
            defaults: BTreeMap::new(),
            requirements: BTreeMap::new(),
            options: BTreeMap::new(),
            methods: Vec::new(),
            url_suffix: None,
            routable: true,
        }
    }
}

impl RouteConfig {
    /// Auto mode: `/<alias>{!parameters}`
    pub fn auto() -> Self {
        Self::default()
    }

    /// Fixed path template; a relative template is placed below the alias
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn unroutable() -> Self {
        Self {
            routable: false,
            ..Self::default()
        }
    }

    pub fn with_default(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn with_requirement(mut self, key: impl Into<String>, regex: impl Into<String>) -> Self {
        self.requirements.insert(key.into(), regex.into());
        self
    }

    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_url_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.url_suffix = Some(suffix.into());
        self
    }
}

impl RoutingConfig {
    /// Load configuration from a TOML file
    ///
    /// A missing or empty file yields the default configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read routing config: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse routing config: {:?}", path))
    }

    /// Load configuration from default path (./routing.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("routing.toml")
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: RoutingConfig = toml::from_str(content).context("Invalid routing TOML")?;
        Ok(config)
    }

    pub fn locale_options(&self) -> LocaleOptions {
        LocaleOptions {
            legacy_routing: self.legacy_routing,
            prepend_locale: self.prepend_locale,
            url_suffix: self.url_suffix.clone(),
        }
    }

    /// Builds the immutable page registry (without route enhancers)
    pub fn into_registry(self) -> PageRegistry {
        let options = self.locale_options();
        self.page_types
            .into_iter()
            .fold(PageRegistry::new().with_locale_options(options), |registry, (page_type, config)| {
                registry.with_type(page_type, config)
            })
    }
}
