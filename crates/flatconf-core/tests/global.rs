//! Process-wide configuration API, loaded once from tests/fixtures/application.yaml

use std::sync::Once;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use flatconf_core::{ErrorKind, LoadOptions};

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/application.yaml");

const FIXTURE_ENTRIES: usize = 17;

static SETUP: Once = Once::new();

fn setup() {
    SETUP.call_once(|| {
        std::env::set_var("FLATCONF_TEST_APP_TIME", " 2025-05-13T01:38:00Z ");
        std::env::remove_var("FLATCONF_TEST_PRIMARY_HOST");
    });
    flatconf_core::load(LoadOptions::new().with_file_path(FIXTURE)).unwrap();
}

#[test]
fn test_root_and_size() {
    setup();

    assert!(flatconf_core::is_loaded());
    assert_eq!(flatconf_core::root().unwrap().as_str(), "test");
    // Other tests may add entries concurrently
    assert!(flatconf_core::size().unwrap() >= FIXTURE_ENTRIES);
}

#[test]
fn test_values() {
    setup();
    let root = flatconf_core::root().unwrap();

    assert_eq!(
        flatconf_core::value_must_resolve(root.join("application.name")),
        "test-app"
    );
    assert_eq!(flatconf_core::value_must_resolve("application.version"), "v1.0.0");
    assert!(flatconf_core::has_path("test.value.int").unwrap());
    assert!(!flatconf_core::has_path("test.value.missing").unwrap());
}

#[test]
fn test_typed_values() {
    setup();

    assert!(flatconf_core::get_bool_must_resolve("value.bool"));
    assert_eq!(
        flatconf_core::get_duration_must_resolve("value.duration"),
        Duration::from_millis(30_000)
    );
    assert_eq!(flatconf_core::get_float_must_resolve("value.float"), 1.168);
    assert_eq!(flatconf_core::get_int_must_resolve("value.int"), 138);
    assert_eq!(
        flatconf_core::get_multiaddr_must_resolve("value.multiaddr").to_string(),
        "/dns4/example.com/tcp/9003"
    );
    assert_eq!(flatconf_core::get_size_must_resolve("value.sizeBytes"), 1_048_576);
    assert_eq!(
        flatconf_core::get_time_must_resolve("value.time"),
        Utc.with_ymd_and_hms(2025, 5, 13, 1, 38, 0).unwrap()
    );
    assert_eq!(
        flatconf_core::get_url_must_resolve("value.url").as_str(),
        "https://example.com:9003/"
    );
}

#[test]
fn test_collections() {
    setup();

    assert_eq!(
        flatconf_core::values_must_resolve("servers"),
        vec!["primary.example.com", "backup.example.com"]
    );
    assert_eq!(
        flatconf_core::values("application").unwrap_err().kind,
        ErrorKind::NotACollection
    );

    let children: Vec<String> = flatconf_core::sub("application")
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(children, vec!["test.application.name", "test.application.version"]);
}

#[test]
fn test_set() {
    setup();

    assert!(!flatconf_core::set("", "ignored").unwrap());
    assert!(flatconf_core::set("runtime.mode", "canary").unwrap());
    assert_eq!(flatconf_core::value("test.runtime.mode").unwrap(), "canary");
}

#[test]
fn test_missing_path() {
    setup();

    let err = flatconf_core::value("no.such.key").unwrap_err();
    assert_eq!(err.kind, ErrorKind::PathNotFound);
    assert_eq!(
        flatconf_core::get_int("no.such.key").unwrap_err().kind,
        ErrorKind::PathNotFound
    );
}

#[test]
#[should_panic(expected = "Type conversion failed")]
fn test_must_resolve_panics_on_bad_value() {
    setup();
    flatconf_core::get_int_must_resolve("application.name");
}

#[test]
fn test_later_loads_are_ignored() {
    setup();

    let other = LoadOptions::new().with_file_path("does/not/exist.yaml");
    flatconf_core::load(other).unwrap();
    assert_eq!(flatconf_core::root().unwrap().as_str(), "test");
}

#[test]
fn test_concurrent_loads() {
    let handles: Vec<_> = (0..8)
        .map(|_| std::thread::spawn(setup))
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(flatconf_core::value("application.name").unwrap(), "test-app");
}

#[test]
fn test_debug_string() {
    setup();

    let dump: serde_json::Value =
        serde_json::from_str(&flatconf_core::to_debug_string().unwrap()).unwrap();
    assert_eq!(dump["root"], "test");
    assert_eq!(dump["mapping"]["test.value.int"], "138");
}
