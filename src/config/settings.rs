//! Nested settings trees with path-addressed access.
//!
//! A settings tree maps keys to a scalar, a list, or another tree.
//! Lookups (`has`, `get`) never mutate; `set` is the only operation that
//! creates intermediate maps, and `unset` never prunes maps it leaves empty.

use super::path::KeyPath;
use crate::error::{ConfigError, ConfigResult};
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use tracing::info;

/// The kind of scalar a value was read as. Values set from the command
/// line are always strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    String,
    Bool,
    Int,
    Float,
}

/// A leaf value: its text plus the kind it is written back as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    text: String,
    kind: ScalarKind,
}

impl Scalar {
    pub fn new(text: impl Into<String>, kind: ScalarKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> ScalarKind {
        self.kind
    }
}

impl Serialize for Scalar {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // Text that no longer parses as its kind is written as a string.
        match self.kind {
            ScalarKind::String => serializer.serialize_str(&self.text),
            ScalarKind::Bool => match self.text.parse::<bool>() {
                Ok(value) => serializer.serialize_bool(value),
                Err(_) => serializer.serialize_str(&self.text),
            },
            ScalarKind::Int => {
                if let Ok(value) = self.text.parse::<i64>() {
                    serializer.serialize_i64(value)
                } else if let Ok(value) = self.text.parse::<u64>() {
                    serializer.serialize_u64(value)
                } else {
                    serializer.serialize_str(&self.text)
                }
            }
            ScalarKind::Float => match self.text.parse::<f64>() {
                Ok(value) => serializer.serialize_f64(value),
                Err(_) => serializer.serialize_str(&self.text),
            },
        }
    }
}

/// A single settings value.
///
/// Lists are opaque leaves: they are loaded, merged and written back as a
/// whole, and path operations treat them like scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
    Scalar(Scalar),
    List(Vec<SettingValue>),
    Nested(SettingsTree),
}

impl SettingValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            SettingValue::Scalar(scalar) => Some(scalar.as_str()),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&SettingsTree> {
        match self {
            SettingValue::Nested(tree) => Some(tree),
            _ => None,
        }
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        SettingValue::Scalar(Scalar::new(value, ScalarKind::String))
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        SettingValue::Scalar(Scalar::new(value, ScalarKind::String))
    }
}

impl From<Scalar> for SettingValue {
    fn from(scalar: Scalar) -> Self {
        SettingValue::Scalar(scalar)
    }
}

struct SettingValueVisitor;

impl<'de> Visitor<'de> for SettingValueVisitor {
    type Value = SettingValue;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean, list, or map of settings")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Scalar::new(v, ScalarKind::String).into())
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Scalar::new(v, ScalarKind::String).into())
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Scalar::new(v.to_string(), ScalarKind::Bool).into())
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Scalar::new(v.to_string(), ScalarKind::Int).into())
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Scalar::new(v.to_string(), ScalarKind::Int).into())
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Scalar::new(v.to_string(), ScalarKind::Float).into())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<SettingValue>()? {
            items.push(item);
        }
        Ok(SettingValue::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = map.next_entry::<String, SettingValue>()? {
            entries.insert(key, value);
        }
        Ok(SettingValue::Nested(SettingsTree(entries)))
    }
}

impl<'de> Deserialize<'de> for SettingValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(SettingValueVisitor)
    }
}

/// A map of settings keyed by name, sorted for stable serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SettingsTree(BTreeMap<String, SettingValue>);

impl SettingsTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SettingValue)> {
        self.0.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut BTreeMap<String, SettingValue> {
        &mut self.0
    }

    /// Whether every segment of `path` resolves. The final segment only has
    /// to exist; its value may be a scalar, a list, or a map.
    pub fn has(&self, path: &KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// The value at `path`, if every segment resolves.
    pub fn get(&self, path: &KeyPath) -> Option<&SettingValue> {
        let mut level = self;
        for key in path.parents() {
            level = level.0.get(key)?.as_tree()?;
        }
        level.0.get(path.last())
    }

    /// The scalar text at `path`, if present and a scalar.
    pub fn get_scalar(&self, path: &KeyPath) -> Option<&str> {
        self.get(path).and_then(SettingValue::as_scalar)
    }

    /// Set the value at `path`, creating missing intermediate maps.
    ///
    /// An intermediate segment holding a scalar or list is never replaced;
    /// the call fails with `TypeConflict` instead. Maps created before the
    /// conflicting segment are left in place.
    pub fn set(&mut self, path: &KeyPath, value: impl Into<SettingValue>) -> ConfigResult<()> {
        let mut level = self;
        let mut created = false;

        for (depth, key) in path.parents().iter().enumerate() {
            let entry = level.0.entry(key.clone()).or_insert_with(|| {
                created = true;
                SettingValue::Nested(SettingsTree::new())
            });
            level = match entry {
                SettingValue::Nested(tree) => tree,
                SettingValue::Scalar(_) | SettingValue::List(_) => {
                    return Err(ConfigError::type_conflict(
                        &path.prefix(depth + 1),
                        &path.to_string(),
                        "set",
                    ));
                }
            };
        }

        if created {
            info!(path = %path, "Created new config value");
        }
        level.0.insert(path.last().to_string(), value.into());
        Ok(())
    }

    /// Remove the key at `path`.
    ///
    /// Fails with `KeyNotFound` when an intermediate or the final key is
    /// missing and with `TypeConflict` when an intermediate key is not a map.
    /// Maps emptied by the removal stay in the tree.
    pub fn unset(&mut self, path: &KeyPath) -> ConfigResult<SettingValue> {
        let target = path.to_string();
        let mut level = self;

        for (depth, key) in path.parents().iter().enumerate() {
            level = match level.0.get_mut(key) {
                None => {
                    return Err(ConfigError::key_path_not_found(
                        &path.prefix(depth + 1),
                        &target,
                    ));
                }
                Some(SettingValue::Scalar(_) | SettingValue::List(_)) => {
                    return Err(ConfigError::type_conflict(
                        &path.prefix(depth + 1),
                        &target,
                        "remove config entry",
                    ));
                }
                Some(SettingValue::Nested(tree)) => tree,
            };
        }

        level
            .0
            .remove(path.last())
            .ok_or_else(|| ConfigError::key_not_found(path.last(), &target))
    }

    /// Every non-map leaf (scalars and lists) with its dotted path, in key
    /// order. Empty maps produce no entries.
    pub fn flatten(&self) -> Vec<(KeyPath, SettingValue)> {
        let mut out = Vec::new();
        self.flatten_into(&mut Vec::new(), &mut out);
        out
    }

    fn flatten_into(&self, prefix: &mut Vec<String>, out: &mut Vec<(KeyPath, SettingValue)>) {
        for (key, value) in &self.0 {
            prefix.push(key.clone());
            match value {
                SettingValue::Nested(tree) => tree.flatten_into(prefix, out),
                leaf => {
                    if let Some(path) = KeyPath::from_segments(prefix.clone()) {
                        out.push((path, leaf.clone()));
                    }
                }
            }
            prefix.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn p(raw: &str) -> KeyPath {
        KeyPath::parse(raw).unwrap()
    }

    #[test]
    fn test_set_then_get() {
        let mut tree = SettingsTree::new();
        tree.set(&p("data.replicas"), "3").unwrap();
        assert!(tree.has(&p("data.replicas")));
        assert!(tree.has(&p("data")));
        assert_eq!(tree.get_scalar(&p("data.replicas")), Some("3"));
    }

    #[test]
    fn test_set_overwrites_final_key() {
        let mut tree = SettingsTree::new();
        tree.set(&p("a.b"), "1").unwrap();
        tree.set(&p("a.b"), "2").unwrap();
        assert_eq!(tree.get_scalar(&p("a.b")), Some("2"));

        // A map at the final segment is replaced too.
        tree.set(&p("a"), "flat").unwrap();
        assert_eq!(tree.get_scalar(&p("a")), Some("flat"));
    }

    #[test]
    fn test_set_through_scalar_is_type_conflict() {
        let mut tree = SettingsTree::new();
        tree.set(&p("foo.bar"), "baz").unwrap();

        let err = tree.set(&p("foo.bar.baz"), "x").unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeConflict);
        assert_eq!(err.path.as_deref(), Some("foo.bar"));
        assert_eq!(err.target.as_deref(), Some("foo.bar.baz"));
        assert_eq!(tree.get_scalar(&p("foo.bar")), Some("baz"));
    }

    #[test]
    fn test_has_stops_at_scalar() {
        let mut tree = SettingsTree::new();
        tree.set(&p("a"), "1").unwrap();
        assert!(!tree.has(&p("a.b")));
        assert!(!tree.has(&p("missing")));
        assert!(!tree.has(&p("missing.deeper")));
    }

    #[test]
    fn test_has_does_not_mutate() {
        let mut tree = SettingsTree::new();
        tree.set(&p("a.b"), "1").unwrap();
        let before = tree.clone();
        assert!(!tree.has(&p("a.c.d")));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_unset_leaves_empty_parents() {
        let mut tree = SettingsTree::new();
        tree.set(&p("x.y.z"), "1").unwrap();
        let removed = tree.unset(&p("x.y.z")).unwrap();
        assert_eq!(removed, SettingValue::from("1"));

        assert!(tree.has(&p("x.y")));
        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"x": {"y": {}}})
        );
    }

    #[test]
    fn test_unset_missing_intermediate() {
        let mut tree = SettingsTree::new();
        tree.set(&p("x.y.z"), "1").unwrap();
        let before = tree.clone();

        let err = tree.unset(&p("x.y.i.do.not.exist")).unwrap_err();
        assert_eq!(err.code, ErrorCode::KeyNotFound);
        assert_eq!(err.path.as_deref(), Some("x.y.i"));
        assert_eq!(tree, before);
    }

    #[test]
    fn test_unset_missing_final_key() {
        let mut tree = SettingsTree::new();
        tree.set(&p("x.y"), "1").unwrap();

        let err = tree.unset(&p("x.z")).unwrap_err();
        assert_eq!(err.code, ErrorCode::KeyNotFound);
        assert_eq!(err.path.as_deref(), Some("z"));
        assert_eq!(err.target.as_deref(), Some("x.z"));
    }

    #[test]
    fn test_unset_through_scalar_is_type_conflict() {
        let mut tree = SettingsTree::new();
        tree.set(&p("foo.bar"), "baz").unwrap();

        let err = tree.unset(&p("foo.bar.baz")).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeConflict);
        assert_eq!(tree.get_scalar(&p("foo.bar")), Some("baz"));
    }

    #[test]
    fn test_unset_removes_whole_subtree() {
        let mut tree = SettingsTree::new();
        tree.set(&p("db.host"), "localhost").unwrap();
        tree.set(&p("db.port"), "5432").unwrap();
        tree.unset(&p("db")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_deserialize_keeps_scalar_kinds() {
        let tree: SettingsTree =
            serde_yaml::from_str("replicas: 3\nenabled: true\nratio: 0.5\nname: web\nport: '80'\n")
                .unwrap();
        assert_eq!(tree.get_scalar(&p("replicas")), Some("3"));
        assert_eq!(tree.get_scalar(&p("enabled")), Some("true"));
        assert_eq!(tree.get_scalar(&p("ratio")), Some("0.5"));
        assert_eq!(tree.get_scalar(&p("name")), Some("web"));

        assert_eq!(
            serde_json::to_value(&tree).unwrap(),
            json!({"replicas": 3, "enabled": true, "ratio": 0.5, "name": "web", "port": "80"})
        );
        assert_eq!(
            serde_yaml::to_string(&tree).unwrap(),
            "enabled: true\nname: web\nport: '80'\nratio: 0.5\nreplicas: 3\n"
        );
    }

    #[test]
    fn test_deserialize_lists_and_rejects_nulls() {
        let tree: SettingsTree = serde_yaml::from_str("hosts: [a, 2]\n").unwrap();
        assert_eq!(
            tree.get(&p("hosts")),
            Some(&SettingValue::List(vec![
                SettingValue::from("a"),
                SettingValue::Scalar(Scalar::new("2", ScalarKind::Int)),
            ]))
        );
        assert_eq!(tree.get_scalar(&p("hosts")), None);

        assert!(serde_json::from_str::<SettingsTree>(r#"{"a": null}"#).is_err());
    }

    #[test]
    fn test_list_is_a_leaf_for_path_operations() {
        let mut tree: SettingsTree = serde_yaml::from_str("hosts: [a, b]\n").unwrap();
        let before = tree.clone();

        assert!(!tree.has(&p("hosts.0")));
        let err = tree.set(&p("hosts.extra"), "c").unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeConflict);
        assert_eq!(err.path.as_deref(), Some("hosts"));
        let err = tree.unset(&p("hosts.a")).unwrap_err();
        assert_eq!(err.code, ErrorCode::TypeConflict);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_flatten_lists_leaves() {
        let mut tree: SettingsTree = serde_yaml::from_str("d: [x]\nr: 3\n").unwrap();
        tree.set(&p("b.c"), "2").unwrap();
        tree.set(&p("a"), "1").unwrap();
        tree.set(&p("e.f"), "x").unwrap();
        tree.unset(&p("e.f")).unwrap();

        let flat: Vec<(String, serde_json::Value)> = tree
            .flatten()
            .into_iter()
            .map(|(path, value)| (path.to_string(), serde_json::to_value(value).unwrap()))
            .collect();
        assert_eq!(
            flat,
            vec![
                ("a".to_string(), json!("1")),
                ("b.c".to_string(), json!("2")),
                ("d".to_string(), json!(["x"])),
                ("r".to_string(), json!(3)),
            ]
        );
    }
}
