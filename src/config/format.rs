//! Serialization formats for persisted component configuration.

use crate::error::{ConfigError, ConfigResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// On-disk serialization of a component configuration.
///
/// YAML is canonical: it is tried first on load and used when nothing was
/// loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Serialization {
    #[default]
    Yaml,
    Json,
}

impl Serialization {
    /// Load order: canonical format first, then the alternate.
    pub const ALL: [Serialization; 2] = [Serialization::Yaml, Serialization::Json];

    pub fn extension(self) -> &'static str {
        match self {
            Serialization::Yaml => "yaml",
            Serialization::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "yaml" | "yml" => Some(Serialization::Yaml),
            "json" => Some(Serialization::Json),
            _ => None,
        }
    }

    pub fn encode<T: Serialize>(self, value: &T) -> ConfigResult<Vec<u8>> {
        match self {
            Serialization::Yaml => serde_yaml::to_string(value)
                .map(String::into_bytes)
                .map_err(ConfigError::serialization),
            Serialization::Json => serde_json::to_vec_pretty(value)
                .map(|mut bytes| {
                    bytes.push(b'\n');
                    bytes
                })
                .map_err(ConfigError::serialization),
        }
    }

    /// Decode `bytes`; the error is only a description since callers treat
    /// a failed decode as "try the next format".
    pub fn decode<T: DeserializeOwned>(self, bytes: &[u8]) -> Result<T, String> {
        match self {
            Serialization::Yaml => serde_yaml::from_slice(bytes).map_err(|e| e.to_string()),
            Serialization::Json => serde_json::from_slice(bytes).map_err(|e| e.to_string()),
        }
    }
}

impl fmt::Display for Serialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_str() {
        assert_eq!(Serialization::from_str("YAML"), Some(Serialization::Yaml));
        assert_eq!(Serialization::from_str("yml"), Some(Serialization::Yaml));
        assert_eq!(Serialization::from_str("json"), Some(Serialization::Json));
        assert_eq!(Serialization::from_str("toml"), None);
    }

    #[test]
    fn test_default_is_yaml() {
        assert_eq!(Serialization::default(), Serialization::Yaml);
        assert_eq!(Serialization::ALL[0], Serialization::Yaml);
    }

    #[test]
    fn test_json_is_pretty_printed() {
        let mut map = BTreeMap::new();
        map.insert("a", "b");
        let bytes = Serialization::Json.encode(&map).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), "{\n  \"a\": \"b\"\n}\n");
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let result: Result<BTreeMap<String, String>, _> =
            Serialization::Json.decode(b"not: [json");
        assert!(result.is_err());
    }
}
