//! Request path utilities
//!
//! All functions are pure: given the same input they produce the same output.
use std::borrow::Cow;

pub mod hierarchy;
pub use hierarchy::DirnameHierarchy;

/// Reserved path segment; a request containing it never matches a page
pub const AUTO_ITEM: &str = "auto_item";

/// Percent-decodes a request path
///
/// Paths that do not decode to valid UTF-8 are returned unchanged so that
/// they simply fail to match later on.
///
/// # Examples
///
/// ```
/// use rhtmx_page_router::path::decode_path;
///
/// assert_eq!(decode_path("/caf%C3%A9"), "/café");
/// assert_eq!(decode_path("/plain"), "/plain");
/// ```
pub fn decode_path(raw: &str) -> Cow<'_, str> {
    if !raw.contains('%') {
        return Cow::Borrowed(raw);
    }
    urlencoding::decode(raw).unwrap_or(Cow::Borrowed(raw))
}

/// Whether any segment of `path` is the reserved `auto_item` marker
///
/// # Examples
///
/// ```
/// use rhtmx_page_router::path::has_reserved_segment;
///
/// assert!(has_reserved_segment("/news/auto_item/foo"));
/// assert!(!has_reserved_segment("/news/auto_items"));
/// ```
pub fn has_reserved_segment(path: &str) -> bool {
    path.split('/').any(|segment| segment == AUTO_ITEM)
}

/// Whether `path` is a bare locale root such as `/en/` or `/de-CH/`
///
/// Only meaningful in legacy routing with prepended locales.
pub fn is_locale_root(path: &str) -> bool {
    let Some(inner) = path.strip_prefix('/').and_then(|p| p.strip_suffix('/')) else {
        return false;
    };
    let (language, region) = match inner.split_once('-') {
        Some((language, region)) => (language, Some(region)),
        None => (inner, None),
    };

    language.len() == 2
        && language.bytes().all(|b| b.is_ascii_lowercase())
        && region.map_or(true, |r| r.len() == 2 && r.bytes().all(|b| b.is_ascii_uppercase()))
}

/// Host without port, lower-cased
pub fn normalize_host(host: &str) -> String {
    let host = match host.rsplit_once(':') {
        // Keep IPv6 literals like `[::1]` intact
        Some((name, port)) if !name.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) && !port.is_empty() => name,
        _ => host,
    };
    host.to_ascii_lowercase()
}
