//! Route template compilation
//!
//! Templates are static text with `{name}` placeholders. A `{!name}`
//! placeholder is *important*: it is never optional and always rendered
//! during generation, even when its value equals the default.
//!
//! Trailing non-important variables that have a default are optional, so
//! `/list/{page}` with default `page = 1` matches `/list` as well.
use std::collections::BTreeMap;

use regex::Regex;

use crate::error::{Result, RoutingError};

/// Requirement applied to variables without an explicit one
pub const DEFAULT_REQUIREMENT: &str = "[^/]+";

/// A parsed piece of a route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Static text, matched literally
    Text(String),
    /// Placeholder with the separator text preceding it (`/` or empty)
    Variable {
        separator: String,
        name: String,
        important: bool,
    },
}

/// Parses a template into tokens
///
/// # Examples
///
/// ```
/// use rhtmx_page_router::route::compiler::{tokenize, Token};
///
/// let tokens = tokenize("/about-us{!parameters}").unwrap();
/// assert_eq!(tokens[0], Token::Text("/about-us".into()));
/// assert!(matches!(&tokens[1], Token::Variable { name, important: true, .. } if name == "parameters"));
/// ```
pub fn tokenize(template: &str) -> Result<Vec<Token>> {
    let invalid = |reason: &str| RoutingError::InvalidRoute {
        path: template.to_string(),
        reason: reason.to_string(),
    };

    let mut tokens = Vec::new();
    let mut seen: Vec<String> = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|pos| open + pos)
            .ok_or_else(|| invalid("unclosed placeholder"))?;

        let mut text = &rest[..open];
        let mut separator = "";
        if let Some(stripped) = text.strip_suffix('/') {
            text = stripped;
            separator = "/";
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }

        let raw_name = &rest[open + 1..close];
        let (name, important) = match raw_name.strip_prefix('!') {
            Some(name) => (name, true),
            None => (raw_name, false),
        };
        if !is_valid_variable_name(name) {
            return Err(invalid(&format!("invalid variable name \"{raw_name}\"")));
        }
        if seen.iter().any(|s| s == name) {
            return Err(invalid(&format!("variable \"{name}\" used twice")));
        }
        seen.push(name.to_string());

        tokens.push(Token::Variable {
            separator: separator.to_string(),
            name: name.to_string(),
            important,
        });
        rest = &rest[close + 1..];
    }

    if rest.contains('}') {
        return Err(invalid("unopened placeholder"));
    }
    if !rest.is_empty() {
        tokens.push(Token::Text(rest.to_string()));
    }

    Ok(tokens)
}

fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A template compiled against its requirements and defaults
#[derive(Debug, Clone)]
pub struct CompiledRoute {
    tokens: Vec<Token>,
    variables: Vec<String>,
    first_optional: usize,
    regex: Regex,
}

impl CompiledRoute {
    /// Compiles `template` (the full path including prefix and suffix)
    pub fn compile(
        template: &str,
        requirements: &BTreeMap<String, String>,
        defaults: &BTreeMap<String, String>,
    ) -> Result<Self> {
        let tokens = tokenize(template)?;
        let variables: Vec<String> = tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable { name, .. } => Some(name.clone()),
                Token::Text(_) => None,
            })
            .collect();

        let first_optional = tokens
            .iter()
            .rposition(|token| match token {
                Token::Variable { name, important, .. } => *important || !defaults.contains_key(name),
                Token::Text(_) => true,
            })
            .map_or(0, |pos| pos + 1);

        let mut pattern = String::from("^");
        let mut open_groups = 0;
        for (index, token) in tokens.iter().enumerate() {
            match token {
                Token::Text(text) => pattern.push_str(&regex::escape(text)),
                Token::Variable { separator, name, .. } => {
                    let requirement = match requirements.get(name) {
                        Some(requirement) => requirement.clone(),
                        None => default_requirement(tokens.get(index + 1)),
                    };
                    if index >= first_optional {
                        pattern.push_str("(?:");
                        open_groups += 1;
                    }
                    pattern.push_str(&regex::escape(separator));
                    pattern.push_str(&format!("(?P<{name}>(?:{requirement}))"));
                }
            }
        }
        pattern.push_str(&")?".repeat(open_groups));
        pattern.push('$');

        let regex = Regex::new(&pattern).map_err(|err| RoutingError::InvalidRoute {
            path: template.to_string(),
            reason: err.to_string(),
        })?;

        Ok(Self {
            tokens,
            variables,
            first_optional,
            regex,
        })
    }

    /// Variables declared by the template, in order
    pub fn path_variables(&self) -> &[String] {
        &self.variables
    }

    pub fn declares(&self, name: &str) -> bool {
        self.variables.iter().any(|v| v == name)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether the variable at token `index` may be left out
    pub fn is_optional(&self, index: usize) -> bool {
        index >= self.first_optional
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    /// Matches a decoded path, returning the captured variables
    pub fn match_path(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let captures = self.regex.captures(path)?;
        Some(
            self.variables
                .iter()
                .filter_map(|name| captures.name(name).map(|m| (name.clone(), m.as_str().to_string())))
                .collect(),
        )
    }
}

/// `[^/]+`, additionally excluding the first character of a following
/// static text (so `{alias}.html` does not swallow the dot)
fn default_requirement(next: Option<&Token>) -> String {
    match next {
        Some(Token::Text(text)) => match text.chars().next() {
            Some(c) if c != '/' => format!("[^/{}]+", regex::escape(&c.to_string())),
            _ => DEFAULT_REQUIREMENT.to_string(),
        },
        _ => DEFAULT_REQUIREMENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn optional_parameters_group() {
        let compiled = CompiledRoute::compile(
            "/about-us{!parameters}",
            &map(&[("parameters", "(/.+)?")]),
            &map(&[("parameters", "")]),
        )
        .unwrap();

        assert_eq!(compiled.match_path("/about-us").unwrap().get("parameters").map(String::as_str), Some(""));
        assert_eq!(
            compiled.match_path("/about-us/items/foo").unwrap().get("parameters").map(String::as_str),
            Some("/items/foo")
        );
        assert!(compiled.match_path("/about-usx").is_none());
    }

    #[test]
    fn required_parameters_group() {
        let compiled = CompiledRoute::compile(
            "/products{!parameters}",
            &map(&[("parameters", "/.+")]),
            &map(&[("parameters", "")]),
        )
        .unwrap();

        assert!(compiled.match_path("/products").is_none());
        assert!(compiled.match_path("/products/shoes").is_some());
    }

    #[test]
    fn trailing_variable_with_default_is_optional() {
        let compiled = CompiledRoute::compile("/list/{page}", &BTreeMap::new(), &map(&[("page", "1")])).unwrap();
        assert!(compiled.match_path("/list").is_some());
        assert_eq!(compiled.match_path("/list/3").unwrap()["page"], "3");
        assert!(compiled.is_optional(1));
    }

    #[test]
    fn important_variable_is_never_optional() {
        let compiled = CompiledRoute::compile("/list/{!page}", &BTreeMap::new(), &map(&[("page", "1")])).unwrap();
        assert!(compiled.match_path("/list").is_none());
        assert!(!compiled.is_optional(1));
    }

    #[test]
    fn default_requirement_stops_at_suffix() {
        let compiled = CompiledRoute::compile("/news/{item}.html", &BTreeMap::new(), &BTreeMap::new()).unwrap();
        assert_eq!(compiled.match_path("/news/hello.html").unwrap()["item"], "hello");
        assert!(compiled.match_path("/news/a/b.html").is_none());
    }

    #[test]
    fn rejects_broken_templates() {
        for template in ["/a/{b", "/a/}", "/a/{}", "/a/{1x}", "/{a}/{a}"] {
            assert!(tokenize(template).is_err(), "{template} should be rejected");
        }
        assert!(CompiledRoute::compile("/{a}", &map(&[("a", "(")]), &BTreeMap::new()).is_err());
    }

    #[test]
    fn lists_path_variables() {
        let compiled = CompiledRoute::compile("/{year}/{slug}", &BTreeMap::new(), &BTreeMap::new()).unwrap();
        assert_eq!(compiled.path_variables(), ["year", "slug"]);
        assert!(compiled.declares("slug"));
        assert!(!compiled.declares("parameters"));
    }
}
