//! Component configuration model.
//!
//! A component keeps one configuration file per environment at
//! `<component>/config/<environment>.yaml` (or `.json`). Each file holds:
//! - `namespace` / `injectNamespace` - inherited by subcomponents that set none
//! - `config` - nested settings addressed by dotted paths (`data.replicas`)
//! - `subcomponents` - the same structure, recursively, keyed by name
//!
//! ## Merge Strategy
//! Merging layers one configuration under another: the receiver keeps every
//! value it defines and only gains what it is missing.

mod format;
mod merge;
mod node;
mod path;
mod settings;
mod store;

pub use format::Serialization;
pub use merge::merge_settings;
pub use node::ComponentConfig;
pub use path::{KeyPath, split_path};
pub use settings::{Scalar, ScalarKind, SettingValue, SettingsTree};
pub use store::{CONFIG_DIR, ConfigStore, FsStore, MemoryStore, config_file_path};
