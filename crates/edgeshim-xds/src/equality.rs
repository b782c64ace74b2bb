//! Structural equality of routes
//!
//! Two routes are equal when their matches and action kinds line up. These
//! are looser than `PartialEq` on purpose: a forwarding route is identified by
//! its cluster, a direct response by its status.

use crate::envoy::matcher::RegexMatcher;
use crate::envoy::route::{route, HeaderMatcher, Route, RouteMatch, VirtualHost};

pub fn route_equal(a: &Route, b: &Route) -> bool {
    let default_match = RouteMatch::default();
    let a_match = a.r#match.as_ref().unwrap_or(&default_match);
    let b_match = b.r#match.as_ref().unwrap_or(&default_match);
    route_match_equal(a_match, b_match) && route_action_equal(a, b)
}

/// Path, prefix and regex equal; headers equal as sets
pub fn route_match_equal(a: &RouteMatch, b: &RouteMatch) -> bool {
    if a.get_prefix() != b.get_prefix() {
        return false;
    }
    if a.get_path() != b.get_path() {
        return false;
    }
    if !regex_match_equal(a.get_safe_regex(), b.get_safe_regex()) {
        return false;
    }
    headers_subset(&a.headers, &b.headers) && headers_subset(&b.headers, &a.headers)
}

pub fn header_match_equal(a: &HeaderMatcher, b: &HeaderMatcher) -> bool {
    a.name == b.name
        && a.get_exact_match() == b.get_exact_match()
        && a.invert_match == b.invert_match
        && a.get_prefix_match() == b.get_prefix_match()
        && a.get_range_match() == b.get_range_match()
        && regex_match_equal(a.get_safe_regex_match(), b.get_safe_regex_match())
        && a.get_present_match() == b.get_present_match()
        && a.get_suffix_match() == b.get_suffix_match()
}

pub fn regex_match_equal(a: Option<&RegexMatcher>, b: Option<&RegexMatcher>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.regex == b.regex,
        (None, None) => true,
        _ => false,
    }
}

/// Same action kind with the same cluster (forward) or status (direct response)
pub fn route_action_equal(a: &Route, b: &Route) -> bool {
    match (&a.action, &b.action) {
        (Some(route::Action::Route(a)), Some(route::Action::Route(b))) => a.cluster() == b.cluster(),
        (Some(route::Action::DirectResponse(a)), Some(route::Action::DirectResponse(b))) => {
            a.status == b.status
        }
        _ => false,
    }
}

pub fn virtual_host_has_route(virtual_host: &VirtualHost, candidate: &Route) -> bool {
    virtual_host.routes.iter().any(|r| route_equal(r, candidate))
}

fn headers_subset(a: &[HeaderMatcher], b: &[HeaderMatcher]) -> bool {
    a.iter().all(|ha| b.iter().any(|hb| header_match_equal(ha, hb)))
}
