//! Integration tests for inbound routing: candidates, route building,
//! sorting and matching against a small multi-language site.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use rhtmx_page_router::{
    InMemoryPageRepository, LanguageRanking, Page, PageCandidates, PageRegistry, PageRouteFactory, RequestMatcher,
    Route, RouteComparator, RouteConfig, RouteKind, RouteName, RouteProvider, RoutingConfig, RoutingError,
    RoutingRequest, UrlMatcher,
};
use rstest::rstest;

// ============================================================================
// Fixtures
// ============================================================================

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn site() -> Arc<InMemoryPageRepository> {
    Arc::new(
        InMemoryPageRepository::new()
            .with_page(Page::root(1, "example.com", "en").with_fallback(true).with_url_suffix(".html"))
            .with_page(Page::new(2, 1, "index", "regular"))
            .with_page(Page::new(3, 1, "products", "regular").with_require_item(true))
            .with_page(Page::new(12, 1, "about-us", "regular"))
            .with_page(Page::new(20, 1, "news", "regular"))
            .with_page(Page::new(21, 1, "news/archive", "regular"))
            .with_page(Page::new(30, 1, "a", "regular"))
            .with_page(Page::new(31, 1, "ab", "regular"))
            .with_page(Page::new(40, 1, "page-not-found", "error_404"))
            .with_page(Page::root(100, "example.com", "de-DE").with_url_prefix("de").with_sorting(1))
            .with_page(Page::root(200, "example.com", "en-US").with_url_prefix("us").with_sorting(2)),
    )
}

fn registry() -> PageRegistry {
    PageRegistry::new().with_type("error_404", RouteConfig::unroutable())
}

fn provider() -> (Arc<RouteProvider>, Arc<InMemoryPageRepository>) {
    init_tracing();
    let repository = site();
    let factory = PageRouteFactory::new(Arc::new(registry()), repository.clone());
    (Arc::new(RouteProvider::new(factory)), repository)
}

/// Every root page locale-prefixed, so `/` only ever redirects
fn prefixed_provider() -> Arc<RouteProvider> {
    let repository = Arc::new(
        InMemoryPageRepository::new()
            .with_page(Page::root(1, "example.com", "en").with_fallback(true).with_url_prefix("en"))
            .with_page(Page::new(2, 1, "index", "regular"))
            .with_page(Page::root(100, "example.com", "de-DE").with_url_prefix("de").with_sorting(1))
            .with_page(Page::root(200, "example.com", "en-US").with_url_prefix("us").with_sorting(2)),
    );
    Arc::new(RouteProvider::new(PageRouteFactory::new(Arc::new(registry()), repository)))
}

fn names(provider: &RouteProvider, request: &RoutingRequest) -> Vec<String> {
    provider
        .get_route_collection_for_request(request)
        .unwrap()
        .names()
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn permutations<T: Clone>(items: &[T]) -> Vec<Vec<T>> {
    if items.len() <= 1 {
        return vec![items.to_vec()];
    }
    let mut result = Vec::new();
    for index in 0..items.len() {
        let mut rest = items.to_vec();
        let item = rest.remove(index);
        for mut permutation in permutations(&rest) {
            permutation.insert(0, item.clone());
            result.push(permutation);
        }
    }
    result
}

// ============================================================================
// Route building
// ============================================================================

#[test]
fn test_auto_route_for_regular_page() {
    let (provider, _) = provider();
    let route = provider.get_route_by_name("tl_page.12").unwrap();

    assert_eq!(route.path, "/about-us{!parameters}");
    assert_eq!(route.default_value("parameters"), Some(""));
    assert_eq!(route.requirements.get("parameters").map(String::as_str), Some("(/.+)?"));
}

#[test]
fn test_required_item_route() {
    let (provider, _) = provider();
    let route = provider.get_route_by_name("tl_page.3").unwrap();
    assert_eq!(route.requirements.get("parameters").map(String::as_str), Some("/.+"));

    let compiled = route.compile().unwrap();
    assert!(compiled.match_path("/products.html").is_none());
    assert!(compiled.match_path("/products/shoes.html").is_some());
}

#[test]
fn test_route_carries_its_page() {
    let (provider, repository) = provider();
    let page = repository.get(12).unwrap();
    let route = provider.factory().create_route_for_page(&page, "").unwrap();

    assert!(Arc::ptr_eq(route.page_model().unwrap(), &page));
    assert_eq!(route.page_model().map(|p| p.id), Some(12));
}

#[test]
fn test_missing_page_is_route_not_found() {
    let (provider, _) = provider();
    let err = provider.get_route_by_name("tl_page.999").unwrap_err();
    assert!(matches!(err, RoutingError::RouteNotFound(_)));
}

// ============================================================================
// Candidates
// ============================================================================

#[test]
fn test_folder_alias_expansion() {
    let candidates = PageCandidates::default().find_candidates("/news/2024/item");
    for expected in ["news/2024/item", "news/2024", "news"] {
        assert!(candidates.iter().any(|c| c == expected), "missing candidate {expected}");
    }
}

#[test]
fn test_folder_alias_prefers_deeper_alias() {
    let (provider, _) = provider();
    let request = RoutingRequest::new("/news/archive/2024.html").with_host("example.com");
    assert_eq!(names(&provider, &request), vec!["tl_page.21", "tl_page.20"]);

    let matcher = UrlMatcher::new(provider);
    let matched = matcher.match_request(&request).unwrap();
    assert_eq!(matched.name, RouteName::primary(21));
    assert_eq!(matched.parameter("parameters"), Some("/2024"));
}

#[rstest]
#[case("/auto_item")]
#[case("/news/auto_item/foo.html")]
#[case("/news/auto%5Fitem/foo.html")]
fn test_reserved_segment_yields_nothing(#[case] path: &str) {
    let (provider, _) = provider();
    let collection = provider
        .get_route_collection_for_request(&RoutingRequest::new(path).with_host("example.com"))
        .unwrap();
    assert!(collection.is_empty());
}

#[test]
fn test_unroutable_pages_never_match() {
    let (provider, _) = provider();
    let request = RoutingRequest::new("/page-not-found.html").with_host("example.com");
    assert!(provider.get_route_collection_for_request(&request).unwrap().is_empty());
    assert!(matches!(
        UrlMatcher::new(provider).match_request(&request),
        Err(RoutingError::RouteNotFound(_))
    ));
}

// ============================================================================
// Sorting
// ============================================================================

#[test]
fn test_route_order_is_deterministic() {
    let (provider, _) = provider();
    let request = RoutingRequest::new("/").with_host("example.com").with_accept_language("de-DE, en;q=0.5");
    let first = names(&provider, &request);
    for _ in 0..5 {
        assert_eq!(names(&provider, &request), first);
    }
}

#[test]
fn test_fallback_root_wins_for_every_input_order() {
    let (provider, _) = provider();
    let request = RoutingRequest::new("/").with_host("example.com");
    let routes: Vec<(RouteName, Route)> = provider
        .get_route_collection_for_request(&request)
        .unwrap()
        .into_iter()
        .filter(|(name, route)| name.kind == RouteKind::Root && route.page_model().is_some_and(|p| p.is_root()))
        .collect();
    assert_eq!(routes.len(), 3);

    let ranking = LanguageRanking::default();
    let comparator = RouteComparator::new(Some(&ranking));
    for mut permutation in permutations(&routes) {
        comparator.sort(&mut permutation);
        let order: Vec<u64> = permutation.iter().map(|(name, _)| name.page_id).collect();
        assert_eq!(order, vec![1, 100, 200]);
    }
}

#[rstest]
#[case("de-DE, en", 100)]
#[case("de-DE", 100)]
#[case("en-US", 200)]
#[case("en", 1)]
#[case("fr", 1)]
fn test_accept_language_selects_homepage(#[case] accept_language: &str, #[case] expected_root: u64) {
    let matcher = UrlMatcher::new(prefixed_provider());
    let request = RoutingRequest::new("/").with_host("example.com").with_accept_language(accept_language);
    let matched = matcher.match_request(&request).unwrap();
    assert!(matched.redirect().is_some());

    let root_id = matched.page().and_then(|page| page.details()).map(|details| details.root_id);
    assert_eq!(root_id, Some(expected_root));
}

#[test]
fn test_locale_ranking_exact_before_language_only() {
    let (provider, _) = provider();
    let request = RoutingRequest::new("/").with_host("example.com").with_accept_language("de-DE, en");
    let order: Vec<String> = names(&provider, &request);
    let de = order.iter().position(|n| n == "tl_page.100.root").unwrap();
    let us = order.iter().position(|n| n == "tl_page.200.root").unwrap();
    assert!(de < us);
}

#[test]
fn test_alias_tie_break_is_antisymmetric() {
    let (provider, repository) = provider();
    let route_a = provider.factory().create_route_for_page(&repository.get(30).unwrap(), "").unwrap();
    let route_ab = provider.factory().create_route_for_page(&repository.get(31).unwrap(), "").unwrap();
    let (name_a, name_ab) = (RouteName::primary(30), RouteName::primary(31));

    let comparator = RouteComparator::new(None);
    let forward = comparator.compare((&name_a, &route_a), (&name_ab, &route_ab));
    let backward = comparator.compare((&name_ab, &route_ab), (&name_a, &route_a));
    assert_eq!(forward, std::cmp::Ordering::Greater);
    assert_eq!(forward, backward.reverse());
}

// ============================================================================
// Matching
// ============================================================================

#[rstest]
#[case("/about-us.html", 12, "")]
#[case("/about-us/team/jane.html", 12, "/team/jane")]
#[case("/products/shoes.html", 3, "/shoes")]
fn test_matches_page_routes(#[case] path: &str, #[case] page: u64, #[case] parameters: &str) {
    let (provider, _) = provider();
    let matched = UrlMatcher::new(provider)
        .match_request(&RoutingRequest::new(path).with_host("example.com"))
        .unwrap();
    assert_eq!(matched.name, RouteName::primary(page));
    assert_eq!(matched.parameter("parameters"), Some(parameters));
}

#[test]
fn test_required_item_page_without_item_is_not_found() {
    let (provider, _) = provider();
    let err = UrlMatcher::new(provider)
        .match_request(&RoutingRequest::new("/products.html").with_host("example.com"))
        .unwrap_err();
    assert!(matches!(err, RoutingError::RouteNotFound(_)));
}

#[test]
fn test_prefixed_homepage_and_redirect() {
    let (provider, _) = provider();
    let matcher = UrlMatcher::new(provider);

    let homepage = matcher
        .match_request(&RoutingRequest::new("/de/").with_host("example.com"))
        .unwrap();
    assert_eq!(homepage.name, RouteName::root(100));
    assert!(homepage.redirect().is_none());

    let route = matcher.provider().get_route_by_name("tl_page.100.fallback").unwrap();
    assert_eq!(route.redirect.map(|r| (r.path, r.permanent)), Some(("/de/".to_string(), false)));
}

#[test]
fn test_bulk_enumeration_covers_routable_pages() {
    let (provider, _) = provider();
    let all = provider.get_routes_by_names(None).unwrap();
    let names: Vec<String> = all.names().iter().map(ToString::to_string).collect();

    assert!(names.contains(&"tl_page.12".to_string()));
    assert!(names.contains(&"tl_page.100.fallback".to_string()));
    assert!(!names.iter().any(|n| n.starts_with("tl_page.40")));
    // fallback routes sort last
    let first_fallback = names.iter().position(|n| n.ends_with(".fallback")).unwrap();
    assert!(names[first_fallback..].iter().all(|n| n.ends_with(".fallback")));
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_file_drives_routes() {
    let config = RoutingConfig::from_toml_str(
        r#"
        [page_types.news_feed]
        path = "/feeds/{format}"
        requirements = { format = "rss|atom" }
        url_suffix = ".xml"

        [page_types.error_404]
        routable = false
        "#,
    )
    .unwrap();

    let repository = Arc::new(
        InMemoryPageRepository::new()
            .with_page(Page::root(1, "", "en"))
            .with_page(Page::new(5, 1, "feed", "news_feed"))
            .with_page(Page::new(6, 1, "missing", "error_404")),
    );
    let provider = Arc::new(RouteProvider::new(PageRouteFactory::new(
        Arc::new(config.into_registry()),
        repository,
    )));

    assert!(provider.get_route_by_name("tl_page.6").is_err());

    // configured paths are found through their page id
    let route = provider.get_route_by_name("tl_page.5").unwrap();
    assert_eq!(route.full_path(), "/feeds/{format}.xml");
    let compiled = route.compile().unwrap();
    assert_eq!(compiled.match_path("/feeds/atom.xml").unwrap()["format"], "atom");
    assert!(compiled.match_path("/feeds/json.xml").is_none());
}
