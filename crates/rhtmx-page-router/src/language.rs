//! Accept-Language parsing and language ranking

use std::collections::HashMap;

/// Parses an `Accept-Language` header into normalized tags, best first
///
/// Entries are ordered by q-value; entries with equal q keep header order.
/// Wildcards, `q=0` entries and entries with a malformed weight are dropped.
///
/// # Examples
///
/// ```
/// use rhtmx_page_router::language::parse_accept_language;
///
/// assert_eq!(parse_accept_language("en;q=0.5, de_de, fr;q=0.8"), vec!["de-DE", "fr", "en"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f64)> = Vec::new();
    for part in header.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let mut segments = part.split(';');
        let tag = segments.next().unwrap_or("").trim();
        let mut q = Some(1.0_f64);
        for s in segments {
            if let Some(val) = s.trim().strip_prefix("q=") {
                q = parse_weight(val);
            }
        }
        let Some(q) = q else {
            continue;
        };
        if tag.is_empty() || tag == "*" || q <= 0.0 {
            continue;
        }
        entries.push((normalize_language(tag), q));
    }

    // Stable: equal q-values keep header order
    entries.sort_by(|a, b| b.1.total_cmp(&a.1));

    let mut languages: Vec<String> = Vec::with_capacity(entries.len());
    for (tag, _) in entries {
        if !languages.contains(&tag) {
            languages.push(tag);
        }
    }
    languages
}

/// Weight in `0..=1`; anything else (NaN, infinities, `q=7`) is malformed
fn parse_weight(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|q| q.is_finite() && (0.0..=1.0).contains(q))
}

/// `de_de` → `de-DE`, `EN` → `en`
pub fn normalize_language(tag: &str) -> String {
    let tag = tag.trim().replace('_', "-");
    match tag.split_once('-') {
        Some((language, region)) => format!("{}-{}", language.to_ascii_lowercase(), region.to_ascii_uppercase()),
        None => tag.to_ascii_lowercase(),
    }
}

/// Preference rank per language, lower is better
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LanguageRanking {
    ranks: HashMap<String, usize>,
}

impl LanguageRanking {
    /// Builds the ranking from languages ordered best first
    ///
    /// Every regional tag is followed by its bare language unless that
    /// language is listed explicitly, so `de-DE, en` ranks `de-DE`, `de`, `en`.
    pub fn new<I, S>(languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let languages: Vec<String> = languages.into_iter().map(|l| normalize_language(l.as_ref())).collect();

        let mut ordered: Vec<String> = Vec::new();
        for language in &languages {
            if !ordered.contains(language) {
                ordered.push(language.clone());
            }
            if let Some((bare, _)) = language.split_once('-') {
                if !ordered.iter().any(|l| l == bare) && !languages.iter().any(|l| l == bare) {
                    ordered.push(bare.to_string());
                }
            }
        }

        Self {
            ranks: ordered.into_iter().enumerate().map(|(rank, language)| (language, rank)).collect(),
        }
    }

    pub fn from_accept_language(header: &str) -> Self {
        Self::new(parse_accept_language(header))
    }

    /// Rank of an exact language; `None` when the language is not accepted
    ///
    /// # Examples
    ///
    /// ```
    /// use rhtmx_page_router::LanguageRanking;
    ///
    /// let ranking = LanguageRanking::from_accept_language("de-DE, en");
    /// assert_eq!(ranking.rank("de-DE"), Some(0));
    /// assert_eq!(ranking.rank("de"), Some(1));
    /// assert_eq!(ranking.rank("en"), Some(2));
    /// assert_eq!(ranking.rank("en-US"), None);
    /// ```
    pub fn rank(&self, language: &str) -> Option<usize> {
        self.ranks.get(&normalize_language(language)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.ranks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn q_values_order_languages() {
        assert_eq!(parse_accept_language("en;q=0.5,zh;q=0.9"), vec!["zh", "en"]);
        assert_eq!(parse_accept_language("fr, de;q=0.9, en;q=0.9"), vec!["fr", "de", "en"]);
    }

    #[test]
    fn drops_wildcards_and_zero_weights() {
        assert_eq!(parse_accept_language("*, en;q=0, de"), vec!["de"]);
        assert!(parse_accept_language("").is_empty());
        assert!(parse_accept_language(" , ").is_empty());
    }

    #[test]
    fn malformed_weights_are_dropped() {
        assert_eq!(
            parse_accept_language("l0;q=NaN, l1;q=0.8, l2;q=NaN, l3;q=inf, l4;q=7, l5;q=-1, l6;q=abc, l7;q=0.9"),
            vec!["l7", "l1"]
        );
        assert_eq!(parse_accept_language("en;q=1.0, de;q=1"), vec!["en", "de"]);
    }

    #[test]
    fn bare_language_added_after_region() {
        let ranking = LanguageRanking::from_accept_language("de-CH, fr");
        assert_eq!(ranking.rank("de-CH"), Some(0));
        assert_eq!(ranking.rank("de"), Some(1));
        assert_eq!(ranking.rank("fr"), Some(2));
        assert_eq!(ranking.len(), 3);
    }

    #[test]
    fn explicit_bare_language_keeps_its_position() {
        let ranking = LanguageRanking::from_accept_language("en-US, de, en");
        assert_eq!(ranking.rank("en-US"), Some(0));
        assert_eq!(ranking.rank("de"), Some(1));
        assert_eq!(ranking.rank("en"), Some(2));
    }

    #[test]
    fn lookup_is_normalized() {
        let ranking = LanguageRanking::new(["de_de"]);
        assert_eq!(ranking.rank("de-DE"), Some(0));
        assert_eq!(ranking.rank("DE_de"), Some(0));
        assert!(LanguageRanking::default().is_empty());
    }
}
