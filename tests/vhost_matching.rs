//! End-to-end matching behaviour: config text in, sites out.

use std::sync::Arc;

use vhost_dispatch::config::{build_matcher, load_config, parse_config};
use vhost_dispatch::routing::{request_key, VhostTrie};
use vhost_dispatch::SiteConfig;

mod common;

fn site_for(matcher: &VhostTrie<Arc<SiteConfig>>, key: &str) -> Option<(String, String)> {
    matcher
        .lookup(key)
        .map(|m| (m.site.name.clone(), m.path.to_string()))
}

fn matcher(sites: &[(&str, &str)]) -> VhostTrie<Arc<SiteConfig>> {
    build_matcher(&parse_config(&common::sites_toml(sites)).unwrap())
}

#[test]
fn test_exact_round_trip() {
    let m = matcher(&[("docs", "docs.example.com/v2/guide")]);
    assert_eq!(
        site_for(&m, "docs.example.com/v2/guide"),
        Some(("docs".into(), "/v2/guide".into()))
    );
}

#[test]
fn test_port_and_case_normalization() {
    let m = matcher(&[("x", "Example.com/x")]);
    let expected = Some(("x".into(), "/x".into()));
    assert_eq!(site_for(&m, "example.com/x"), expected);
    assert_eq!(site_for(&m, "EXAMPLE.com:8080/x"), expected);
    assert_eq!(site_for(&m, "example.COM:443/x/y"), expected);
}

#[test]
fn test_longest_path_prefix() {
    let m = matcher(&[("foo", "host/foo"), ("foobar", "host/foobar"), ("root", "host")]);
    assert_eq!(site_for(&m, "host/foobar/baz"), Some(("foobar".into(), "/foobar".into())));
    assert_eq!(site_for(&m, "host/foo/baz"), Some(("foo".into(), "/foo".into())));
    assert_eq!(site_for(&m, "host/fo"), Some(("root".into(), "/".into())));
}

#[test]
fn test_wildcard_trial_order() {
    let m = matcher(&[("one", "*.example.com"), ("two", "*.*.example.com")]);
    assert_eq!(site_for(&m, "a.b.example.com").map(|s| s.0), Some("two".into()));
    assert_eq!(site_for(&m, "b.example.com").map(|s| s.0), Some("one".into()));

    let m = matcher(&[
        ("narrow", "*.b.example.com"),
        ("broad", "*.*.example.com"),
    ]);
    assert_eq!(site_for(&m, "a.b.example.com").map(|s| s.0), Some("narrow".into()));
}

#[test]
fn test_catch_all_hosts() {
    let m = matcher(&[("any", ":80")]);
    assert_eq!(site_for(&m, "unknown.host/"), Some(("any".into(), "/".into())));

    let m = matcher(&[("any", ":80"), ("addr", "0.0.0.0")]);
    assert_eq!(site_for(&m, "unknown.host/"), Some(("addr".into(), "/".into())));
}

#[test]
fn test_no_match() {
    let m = matcher(&[]);
    assert_eq!(site_for(&m, "example.com/"), None);

    let m = matcher(&[("blog", "example.com/blog")]);
    assert_eq!(site_for(&m, "example.com/shop"), None);
    assert_eq!(site_for(&m, "other.com/blog"), None);
}

#[test]
fn test_overwrite_keeps_last_site() {
    let m = matcher(&[("old", "example.com/x"), ("new", "http://example.com:8080/x")]);
    assert_eq!(site_for(&m, "example.com/x"), Some(("new".into(), "/x".into())));
}

#[test]
fn test_request_key_from_header_and_path() {
    let m = matcher(&[("api", "api.example.com/v1")]);
    let key = request_key("API.example.com:8443", "/v1/users");
    assert_eq!(site_for(&m, &key), Some(("api".into(), "/v1".into())));
}

#[test]
fn test_load_from_disk() {
    let (_dir, path) = common::write_config(&common::sites_toml(&[
        ("main", "example.com"),
        ("wild", "https://*.example.com"),
    ]));
    let m = build_matcher(&load_config(&path).unwrap());
    assert_eq!(site_for(&m, "www.example.com/a").map(|s| s.0), Some("wild".into()));
    assert_eq!(site_for(&m, "example.com/a").map(|s| s.0), Some("main".into()));
}
