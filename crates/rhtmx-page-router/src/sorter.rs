//! Route priority order
//!
//! The matcher tries routes in collection order and the first match wins,
//! so the order decides which page serves an ambiguous path. Rules, first
//! discriminating rule wins:
//!
//! 1. fallback (locale redirect) routes last
//! 2. host-bound routes before wildcard-host routes
//! 3. when a language ranking is known and the root languages differ: the
//!    better ranked root language first; ranked before unranked; among
//!    unranked, the fallback root first, then lower root sorting
//! 4. non-root pages before root pages
//! 5. alias, natural case-insensitive, descending (`ab` before `a`)
//!
//! Routes still equal after rule 5 are equivalent; their relative order is
//! whatever the input order was.

use std::cmp::Ordering;
use std::iter::Peekable;
use std::str::Chars;

use crate::language::LanguageRanking;
use crate::page::Page;
use crate::route::{Route, RouteName};

/// Compares named routes by matching priority
#[derive(Debug, Clone, Copy)]
pub struct RouteComparator<'a> {
    ranking: Option<&'a LanguageRanking>,
}

impl<'a> RouteComparator<'a> {
    /// `ranking` is `None` when there is no request (name enumeration)
    pub fn new(ranking: Option<&'a LanguageRanking>) -> Self {
        Self { ranking }
    }

    pub fn compare(&self, a: (&RouteName, &Route), b: (&RouteName, &Route)) -> Ordering {
        let (name_a, route_a) = a;
        let (name_b, route_b) = b;

        match (name_a.is_fallback(), name_b.is_fallback()) {
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            _ => {}
        }

        match (route_a.host.is_empty(), route_b.host.is_empty()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }

        let (Some(page_a), Some(page_b)) = (route_a.page_model(), route_b.page_model()) else {
            return Ordering::Equal;
        };

        if let Some(ranking) = self.ranking {
            let ordering = compare_languages(ranking, page_a, page_b);
            if ordering != Ordering::Equal {
                return ordering;
            }
        }

        match (page_a.is_root(), page_b.is_root()) {
            (false, true) => return Ordering::Less,
            (true, false) => return Ordering::Greater,
            _ => {}
        }

        natural_cmp_ignore_case(&page_b.alias, &page_a.alias)
    }

    /// Sorts routes in place, best match first
    pub fn sort(&self, routes: &mut [(RouteName, Route)]) {
        routes.sort_by(|(name_a, route_a), (name_b, route_b)| self.compare((name_a, route_a), (name_b, route_b)));
    }
}

fn compare_languages(ranking: &LanguageRanking, a: &Page, b: &Page) -> Ordering {
    let (Some(details_a), Some(details_b)) = (a.details(), b.details()) else {
        return Ordering::Equal;
    };
    if details_a.root_language == details_b.root_language {
        return Ordering::Equal;
    }

    match (ranking.rank(&details_a.root_language), ranking.rank(&details_b.root_language)) {
        (Some(rank_a), Some(rank_b)) => rank_a.cmp(&rank_b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => match (details_a.root_is_fallback, details_b.root_is_fallback) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            _ => details_a.root_sorting.cmp(&details_b.root_sorting),
        },
    }
}

/// Natural order comparison ignoring ASCII case
///
/// Digit runs compare by numeric value, so `page2` sorts before `page10`.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use rhtmx_page_router::sorter::natural_cmp_ignore_case;
///
/// assert_eq!(natural_cmp_ignore_case("page2", "page10"), Ordering::Less);
/// assert_eq!(natural_cmp_ignore_case("News", "news"), Ordering::Equal);
/// assert_eq!(natural_cmp_ignore_case("ab", "a"), Ordering::Greater);
/// ```
pub fn natural_cmp_ignore_case(a: &str, b: &str) -> Ordering {
    let mut a = a.chars().peekable();
    let mut b = b.chars().peekable();

    loop {
        match (a.peek().copied(), b.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let ordering = compare_numbers(&take_digits(&mut a), &take_digits(&mut b));
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            (Some(x), Some(y)) => {
                let ordering = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase());
                if ordering != Ordering::Equal {
                    return ordering;
                }
                a.next();
                b.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut digits = String::new();
    while let Some(c) = chars.next_if(char::is_ascii_digit) {
        digits.push(c);
    }
    digits
}

/// Compares digit runs by value without overflowing
fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a_trimmed = a.trim_start_matches('0');
    let b_trimmed = b.trim_start_matches('0');
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        // `01` after `1`
        .then_with(|| a.len().cmp(&b.len()))
}
