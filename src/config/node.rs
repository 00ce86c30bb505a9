//! Per-component configuration with recursively owned subcomponents.

use super::format::Serialization;
use super::path::KeyPath;
use super::settings::{SettingValue, SettingsTree};
use super::store::ConfigStore;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

fn default_location() -> PathBuf {
    PathBuf::from(".")
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Configuration of one component for one environment.
///
/// `location` and `serialization` describe where and how the node is
/// persisted and are never written into the file itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfig {
    #[serde(skip, default = "default_location")]
    pub location: PathBuf,

    #[serde(skip)]
    pub serialization: Serialization,

    /// Empty means unset; inherited through `merge_namespaces`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub inject_namespace: bool,

    #[serde(rename = "config", default, skip_serializing_if = "SettingsTree::is_empty")]
    pub settings: SettingsTree,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub subcomponents: BTreeMap<String, ComponentConfig>,

    /// Decode error of the stored file the last `load` could not read.
    #[serde(skip)]
    undecodable: Option<String>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        Self::new(default_location())
    }
}

impl ComponentConfig {
    /// An empty configuration for the component stored at `location`.
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            serialization: Serialization::default(),
            namespace: String::new(),
            inject_namespace: false,
            settings: SettingsTree::new(),
            subcomponents: BTreeMap::new(),
            undecodable: None,
        }
    }

    /// Read-only lookup of a subcomponent. An empty path is `self`.
    pub fn subcomponent(&self, path: &[String]) -> Option<&ComponentConfig> {
        let mut current = self;
        for name in path {
            current = current.subcomponents.get(name)?;
        }
        Some(current)
    }

    /// Whether every name in `path` exists. Never creates anything.
    pub fn has_subcomponent(&self, path: &[String]) -> bool {
        self.subcomponent(path).is_some()
    }

    /// The subcomponent at `path`, creating empty configurations for any
    /// missing names along the way. An empty path is `self`.
    pub fn get_subcomponent(&mut self, path: &[String]) -> &mut ComponentConfig {
        let mut current = self;
        for name in path {
            current = current
                .subcomponents
                .entry(name.clone())
                .or_insert_with(|| {
                    info!(subcomponent = %name, "Creating new subcomponent configuration");
                    ComponentConfig::default()
                });
        }
        current
    }

    /// Remove the subcomponent named by the last element of `path`.
    ///
    /// Fails with `PathNotFound` when any name along the way, or the target
    /// itself, does not exist.
    pub fn remove_subcomponent(&mut self, path: &KeyPath) -> ConfigResult<ComponentConfig> {
        let target = path.to_string();
        let mut parent = self;

        for (depth, name) in path.parents().iter().enumerate() {
            parent = parent.subcomponents.get_mut(name).ok_or_else(|| {
                ConfigError::subcomponent_not_found(name, &path.prefix(depth + 1), &target)
            })?;
        }

        let last = path.last();
        let removed = parent.subcomponents.remove(last).ok_or_else(|| {
            ConfigError::subcomponent_not_found(last, &path.prefix(path.len()), &target)
        })?;
        info!(subcomponent = %target, "Removed subcomponent configuration");
        Ok(removed)
    }

    /// Whether `setting` exists on an existing subcomponent. Never creates.
    pub fn has_value(&self, subcomponent: &[String], setting: &KeyPath) -> bool {
        self.subcomponent(subcomponent)
            .is_some_and(|component| component.settings.has(setting))
    }

    /// The value at `setting` on an existing subcomponent.
    pub fn get_value(&self, subcomponent: &[String], setting: &KeyPath) -> Option<&SettingValue> {
        self.subcomponent(subcomponent)
            .and_then(|component| component.settings.get(setting))
    }

    /// Set `setting` on the subcomponent, creating the subcomponent if needed.
    pub fn set_value(
        &mut self,
        subcomponent: &[String],
        setting: &KeyPath,
        value: impl Into<SettingValue>,
    ) -> ConfigResult<()> {
        self.get_subcomponent(subcomponent)
            .settings
            .set(setting, value)
    }

    /// Remove `setting` from the subcomponent.
    ///
    /// The subcomponent is resolved with `get_subcomponent`, so a missing
    /// subcomponent is created before the setting is reported missing.
    pub fn unset_value(
        &mut self,
        subcomponent: &[String],
        setting: &KeyPath,
    ) -> ConfigResult<SettingValue> {
        self.get_subcomponent(subcomponent).settings.unset(setting)
    }

    /// Populate this node from the store for `environment`.
    ///
    /// YAML is tried first, then JSON. A missing or undecodable file in both
    /// formats leaves the node as it was with YAML selected; only storage
    /// errors are returned. When a file existed but nothing decoded, the node
    /// refuses to `write` until a later `load` succeeds.
    pub fn load(&mut self, store: &dyn ConfigStore, environment: &str) -> ConfigResult<()> {
        self.undecodable = None;
        let mut decode_error = None;

        for format in Serialization::ALL {
            let Some(bytes) = store.read(&self.location, environment, format)? else {
                continue;
            };
            match format.decode::<ComponentConfig>(&bytes) {
                Ok(loaded) => {
                    debug!(
                        location = %self.location.display(),
                        environment,
                        format = %format,
                        "Loaded component config"
                    );
                    self.namespace = loaded.namespace;
                    self.inject_namespace = loaded.inject_namespace;
                    self.settings = loaded.settings;
                    self.subcomponents = loaded.subcomponents;
                    self.serialization = format;
                    return Ok(());
                }
                Err(e) => {
                    warn!(
                        location = %self.location.display(),
                        environment,
                        format = %format,
                        error = %e,
                        "Could not decode component config"
                    );
                    if decode_error.is_none() {
                        decode_error = Some(format!("{}: {}", format, e));
                    }
                }
            }
        }

        self.serialization = Serialization::default();
        self.undecodable = decode_error;
        Ok(())
    }

    /// Whether the last `load` found a stored file it could not decode.
    pub fn is_undecodable(&self) -> bool {
        self.undecodable.is_some()
    }

    /// Serialize with `self.serialization` and persist for `environment`.
    ///
    /// Fails with `Serialization` without touching the store when the last
    /// `load` found a file it could not decode.
    pub fn write(&self, store: &dyn ConfigStore, environment: &str) -> ConfigResult<()> {
        if let Some(detail) = &self.undecodable {
            return Err(ConfigError::undecodable(&self.location, environment, detail));
        }
        let bytes = self.serialization.encode(self)?;
        store.write(&self.location, environment, self.serialization, &bytes)
    }

    /// Load the component at `location` for `environment` and merge it
    /// into this one. Values already present here win.
    pub fn merge_config_file(
        &mut self,
        store: &dyn ConfigStore,
        location: impl AsRef<Path>,
        environment: &str,
    ) -> ConfigResult<()> {
        let mut other = ComponentConfig::new(location.as_ref());
        other.load(store, environment)?;
        self.merge(&other);
        Ok(())
    }
}
