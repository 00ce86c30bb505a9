//! Deep merge of component configurations.
//!
//! The receiver has precedence: anything it already defines is kept, and the
//! other configuration only fills in what is missing.
//! - Maps present on both sides are merged recursively
//! - A key present on one side only is taken from that side
//! - A scalar or list on either side of a conflict leaves the receiver's value
//! - Namespaces are inherited, never overwritten (first set wins)

use super::node::ComponentConfig;
use super::settings::{SettingValue, SettingsTree};
use std::collections::btree_map::Entry;

/// Merge `overlay` into `base`, keeping `base` wherever both define a key.
pub fn merge_settings(base: &mut SettingsTree, overlay: &SettingsTree) {
    for (key, overlay_value) in overlay.iter() {
        match base.entries_mut().entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(overlay_value.clone());
            }
            Entry::Occupied(mut slot) => {
                if let (SettingValue::Nested(base_tree), SettingValue::Nested(overlay_tree)) =
                    (slot.get_mut(), overlay_value)
                {
                    merge_settings(base_tree, overlay_tree);
                }
                // Any other pairing: base wins.
            }
        }
    }
}

fn merge_structure(base: &mut ComponentConfig, other: &ComponentConfig) {
    merge_settings(&mut base.settings, &other.settings);

    for (name, other_child) in &other.subcomponents {
        match base.subcomponents.entry(name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(other_child.clone());
            }
            Entry::Occupied(mut slot) => merge_structure(slot.get_mut(), other_child),
        }
    }
}

impl ComponentConfig {
    /// Inherit `other`'s namespace and inject flag when this node has no
    /// namespace, then do the same for every existing subcomponent against
    /// its same-named peer in `other` (or an empty peer).
    pub fn merge_namespaces(&mut self, other: &ComponentConfig) {
        if self.namespace.is_empty() {
            self.namespace = other.namespace.clone();
            self.inject_namespace = other.inject_namespace;
        }

        let empty = ComponentConfig::default();
        for (name, child) in self.subcomponents.iter_mut() {
            let peer = other.subcomponents.get(name).unwrap_or(&empty);
            child.merge_namespaces(peer);
        }
    }

    /// Deep-merge `other`'s settings and subcomponents into this node,
    /// keeping this node's values on conflict, then merge namespaces.
    pub fn merge(&mut self, other: &ComponentConfig) {
        merge_structure(self, other);
        self.merge_namespaces(other);
    }
}
