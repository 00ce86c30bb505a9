//! Integration tests for the component configuration model.
//!
//! Covers path operations, merge precedence, namespace inheritance and
//! serialization round trips through the public API.

use component_config::config::{
    ComponentConfig, ConfigStore, FsStore, KeyPath, MemoryStore, Serialization, SettingValue,
    split_path,
};
use component_config::error::ErrorCode;
use serde_json::json;
use tempfile::TempDir;

fn p(raw: &str) -> KeyPath {
    KeyPath::parse(raw).unwrap()
}

#[test]
fn test_set_then_read_back() {
    let cases = [
        ("", "a", "1"),
        ("", "a.b.c", "2"),
        ("web", "image", "nginx:1.25"),
        ("web.sidecar", "deep.nested.key", "value with spaces"),
    ];

    for (subcomponent, setting, value) in cases {
        let mut config = ComponentConfig::new(".");
        let subcomponent = split_path(subcomponent);
        let setting = p(setting);

        config.set_value(&subcomponent, &setting, value).unwrap();
        assert!(config.has_value(&subcomponent, &setting));
        assert_eq!(
            config.get_value(&subcomponent, &setting),
            Some(&SettingValue::from(value))
        );
    }
}

#[test]
fn test_failed_unset_leaves_existing_structure() {
    let mut config = ComponentConfig::new(".");
    config.set_value(&[], &p("x.y"), "1").unwrap();
    let before = config.clone();

    for missing in ["x.z", "x.y.z", "w", "w.v"] {
        let err = config.unset_value(&[], &p(missing)).unwrap_err();
        assert!(matches!(
            err.code,
            ErrorCode::KeyNotFound | ErrorCode::TypeConflict | ErrorCode::PathNotFound
        ));
    }
    assert_eq!(config, before);
}

#[test]
fn test_merge_precedence() {
    let mut a = ComponentConfig::new(".");
    a.set_value(&[], &p("foo"), "1").unwrap();
    let mut b = ComponentConfig::new(".");
    b.set_value(&[], &p("foo"), "2").unwrap();
    a.merge(&b);
    assert_eq!(a.settings.get_scalar(&p("foo")), Some("1"));

    let mut a = ComponentConfig::new(".");
    a.merge(&b);
    assert_eq!(a.settings.get_scalar(&p("foo")), Some("2"));
}

#[test]
fn test_namespace_first_set_wins_across_merges() {
    let mut base = ComponentConfig::new(".");

    let mut first = ComponentConfig::new(".");
    first.namespace = "ns1".into();
    let mut second = ComponentConfig::new(".");
    second.namespace = "ns2".into();
    second.inject_namespace = true;

    base.merge(&first);
    base.merge(&second);
    assert_eq!(base.namespace, "ns1");
    assert!(!base.inject_namespace);
}

#[test]
fn test_merge_environment_over_common() {
    let store = MemoryStore::new();
    store.insert(
        "svc",
        "common",
        Serialization::Yaml,
        "namespace: apps\ninjectNamespace: true\nconfig:\n  replicas: 1\n  log:\n    level: info\n    format: text\n",
    );
    store.insert(
        "svc",
        "prod",
        Serialization::Yaml,
        "config:\n  replicas: 4\n  log:\n    level: warn\n",
    );

    let mut config = ComponentConfig::new("svc");
    config.load(&store, "prod").unwrap();
    config.merge_config_file(&store, "svc", "common").unwrap();

    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({
            "namespace": "apps",
            "injectNamespace": true,
            "config": {
                "replicas": 4,
                "log": {"level": "warn", "format": "text"}
            }
        })
    );
}

#[test]
fn test_round_trip_both_formats_on_disk() {
    let temp = TempDir::new().unwrap();

    for format in Serialization::ALL {
        let mut config = ComponentConfig::new(temp.path());
        config.serialization = format;
        config.namespace = "ns".into();
        config.set_value(&[], &p("b.c"), "2").unwrap();
        config.set_value(&[], &p("a"), "1").unwrap();
        config.set_value(&split_path("child"), &p("k"), "v").unwrap();
        config.write(&FsStore, "roundtrip").unwrap();
        let first = FsStore
            .read(temp.path(), "roundtrip", format)
            .unwrap()
            .unwrap();

        let mut reloaded = ComponentConfig::new(temp.path());
        reloaded.load(&FsStore, "roundtrip").unwrap();
        reloaded.write(&FsStore, "roundtrip").unwrap();
        let second = FsStore
            .read(temp.path(), "roundtrip", format)
            .unwrap()
            .unwrap();

        assert_eq!(first, second, "{} round trip changed the file", format);
        assert_eq!(reloaded.settings, config.settings);

        std::fs::remove_file(temp.path().join(format!("config/roundtrip.{}", format.extension())))
            .unwrap();
    }
}
