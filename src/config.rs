use directories::ProjectDirs;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::properties::{Outcome, Properties, Update};
use crate::property::Property;
use crate::value::Value;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config directory for this platform")]
    NoConfigDir,

    #[error("Failed to write {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Failed to encode overrides: {0}")]
    Json(#[from] serde_json::Error),
}

/// User-chosen property values persisted between runs.
///
/// Stored as a JSON object of `name: value` pairs. Keys are not checked on
/// load; `apply` routes them through `Properties::set_values`, so a
/// misspelled key is reported there and the rest still apply.
#[derive(Serialize, Deserialize, Default, Clone, Debug, PartialEq)]
#[serde(transparent)]
pub struct UserOverrides {
    pub values: BTreeMap<String, Value>,
}

impl UserOverrides {
    /// Loads overrides from the user config dir, or empty ones if missing.
    pub fn load() -> Self {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            debug!("No overrides at {}", path.display());
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(overrides) => overrides,
            Err(e) => {
                warn!("Ignoring unreadable overrides {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Saves overrides to the user config dir in JSON format.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |path: &Path| {
            let path = path.to_path_buf();
            move |source| ConfigError::Io { path, source }
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_err(parent))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(io_err(path))?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Records the pairs of `updates` that were applied, taking their values
    /// from `props` (the host may have changed a requested device).
    ///
    /// Entries are kept under the public names of stored properties only.
    /// Aliases and derived names (`freqLims`, `margins`) already present are
    /// replaced by the stored fields they cover, so each field has exactly
    /// one entry and the latest write wins on the next `apply`.
    pub fn merge(&mut self, updates: &[Update], props: &Properties) {
        for update in updates {
            if update.outcome != Outcome::Applied {
                continue;
            }
            let Ok(property) = update.name.parse::<Property>() else {
                continue;
            };
            let mut fields: BTreeSet<Property> = property.stored().iter().copied().collect();

            let covered: Vec<(String, Property)> = self
                .values
                .keys()
                .filter_map(|key| key.parse::<Property>().ok().map(|p| (key.clone(), p)))
                .filter(|(_, p)| p.stored().iter().any(|f| fields.contains(f)))
                .collect();
            for (key, p) in covered {
                self.values.remove(&key);
                fields.extend(p.stored());
            }

            let settings = props.settings();
            for field in fields {
                self.values.insert(field.name().to_string(), settings.get(field));
            }
        }
    }

    pub fn apply(&self, props: &mut Properties) -> Vec<Update> {
        props.set_values(self.values.iter().map(|(k, v)| (k, v.clone())))
    }
}

pub fn config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "ttaprops", "ttaprops").map(|dirs| dirs.config_dir().join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::VirtualHost;
    use crate::settings::{DevicePair, FreqLims};
    use std::sync::Arc;

    fn props() -> Properties {
        Properties::new(Arc::new(VirtualHost::new(DevicePair::new(0, 0), 2, 2)))
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ttaprops-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_deserialization_keeps_value_types() {
        let json = r#"{"samplingRate": 48000, "startMargin": 0.5, "inChannel": [1, 2], "comment": "hi"}"#;
        let overrides: UserOverrides = serde_json::from_str(json).unwrap();
        assert_eq!(overrides.values["samplingRate"], Value::Int(48000));
        assert_eq!(overrides.values["startMargin"], Value::Float(0.5));
        assert_eq!(overrides.values["inChannel"], Value::from(vec![1, 2]));
        assert_eq!(overrides.values["comment"], Value::from("hi"));
    }

    #[test]
    fn test_apply_with_misspelled_key() {
        let json = r#"{"samplingRate": 48000, "fftDegre": 12}"#;
        let overrides: UserOverrides = serde_json::from_str(json).unwrap();
        let mut props = props();
        let updates = overrides.apply(&mut props);

        assert_eq!(props.sampling_rate(), 48000);
        assert_eq!(props.fft_degree(), 18);
        let bad = updates.iter().find(|u| u.name == "fftDegre").unwrap();
        assert_eq!(bad.outcome, Outcome::Unrecognized);
    }

    #[test]
    fn test_merge_records_host_reported_device() {
        let mut props = props();
        let updates = props.set_values([
            ("device", Value::from((1, 7))),
            ("comment", Value::from("No comments.")),
            ("bogus", Value::Int(1)),
        ]);
        let mut overrides = UserOverrides::default();
        overrides.merge(&updates, &props);

        assert_eq!(overrides.values.len(), 1);
        assert_eq!(overrides.values["device"], Value::from([1i64, 0]));
    }

    /// One program run: load the file, apply it, set `pairs`, save.
    fn run(path: &Path, pairs: &[(&str, Value)]) -> Properties {
        let mut props = props();
        let mut overrides = UserOverrides::load_from(path);
        overrides.apply(&mut props);
        let updates = props.set_values(pairs.iter().cloned());
        overrides.merge(&updates, &props);
        overrides.save_to(path).unwrap();
        props
    }

    #[test]
    fn test_alias_then_public_name_keeps_latest() {
        let path = temp_path("alias_latest.json");
        let _ = fs::remove_file(&path);

        run(&path, &[("sampling_rate", Value::Int(96000))]);
        run(&path, &[("samplingRate", Value::Int(48000))]);
        let props = run(&path, &[]);

        assert_eq!(props.sampling_rate(), 48000);
        let saved = UserOverrides::load_from(&path);
        assert_eq!(saved.values.len(), 1);
        assert_eq!(saved.values["samplingRate"], Value::Int(48000));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_derived_name_replaces_stored_fields() {
        let path = temp_path("derived_latest.json");
        let _ = fs::remove_file(&path);

        run(&path, &[("minFreq", Value::Int(30))]);
        run(&path, &[("freqLims", Value::from((40, 100)))]);
        let props = run(&path, &[]);
        assert_eq!(props.freq_lims(), FreqLims { min: 40, max: 100 });

        run(&path, &[("maxFreq", Value::Int(200))]);
        let props = run(&path, &[]);
        assert_eq!(props.freq_lims(), FreqLims { min: 40, max: 200 });

        let saved = UserOverrides::load_from(&path);
        assert!(!saved.values.contains_key("freqLims"));
        assert_eq!(saved.values["minFreq"], Value::Int(40));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_merge_replaces_derived_entry_from_file() {
        let mut overrides: UserOverrides =
            serde_json::from_str(r#"{"margins": [0.1, 0.2], "devices": [1, 1]}"#).unwrap();
        let mut props = props();
        overrides.apply(&mut props);
        let updates = props.set_values([("startMargin", 0.5), ("device", 0.0)]);
        overrides.merge(&updates, &props);

        assert_eq!(
            overrides.values.keys().collect::<Vec<_>>(),
            vec!["device", "startMargin", "stopMargin"]
        );
        assert_eq!(overrides.values["startMargin"], Value::Float(0.5));
        assert_eq!(overrides.values["stopMargin"], Value::Float(0.2));
        assert_eq!(overrides.values["device"], Value::from([0i64, 0]));
    }

    #[test]
    fn test_save_and_load_file() {
        let path = temp_path("save_load.json");
        let mut overrides = UserOverrides::default();
        overrides.values.insert("maxFreq".to_string(), Value::Int(16000));
        overrides.save_to(&path).unwrap();

        let loaded = UserOverrides::load_from(&path);
        assert_eq!(loaded, overrides);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_or_corrupt_file() {
        assert!(UserOverrides::load_from(&temp_path("missing.json")).is_empty());

        let path = temp_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        assert!(UserOverrides::load_from(&path).is_empty());
        let _ = fs::remove_file(&path);
    }
}
