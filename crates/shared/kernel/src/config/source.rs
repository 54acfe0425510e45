//! Flat key/value application settings.
//!
//! Keys are `:`-delimited paths (`Section:Child:Leaf`) compared ASCII case-insensitively.
//! `__` is accepted as a delimiter so that environment variables can address nested keys.

use super::binder::{BindError, Section};
use super::{ConfigError, ConfigErrorExt};
use optbind_domain::settings::ConfigSection;
use serde::de::DeserializeOwned;
use serde_json::Value;
use config::{Config, Environment, File, FileFormat, Map, Source};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{debug, info};

/// Delimiter between key path segments.
pub(crate) const KEY_DELIMITER: char = ':';
/// Alternative delimiter used by environment variables.
const ENV_DELIMITER: &str = "__";
/// Object holding the settings in a `local.settings.json` document.
const VALUES_KEY: &str = "Values";

#[derive(Debug, Clone)]
pub(crate) struct Entry {
    pub(crate) key: String,
    pub(crate) value: String,
}

/// An immutable snapshot of application settings.
///
/// Built once at startup through [`SettingsSource::builder`]; binding never re-reads
/// the underlying file or environment.
#[derive(Debug, Clone, Default)]
pub struct SettingsSource {
    entries: BTreeMap<String, Entry>,
}

impl SettingsSource {
    #[must_use]
    pub fn builder() -> SettingsSourceBuilder {
        SettingsSourceBuilder::default()
    }

    /// Creates a source from in-memory pairs. Later duplicates win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut source = Self::default();
        source.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
        source
    }

    /// Returns the value stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&lookup_key(key)).map(|entry| entry.value.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(key, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.values().map(|entry| (entry.key.as_str(), entry.value.as_str()))
    }

    /// Returns the section rooted at `prefix`. The section may be empty.
    #[must_use]
    pub fn section(&self, prefix: &str) -> Section {
        let path = normalize_key(prefix);
        let head = format!("{}{KEY_DELIMITER}", lookup_key(&path));

        let entries = self
            .entries
            .iter()
            .filter(|(lookup, _)| lookup.starts_with(&head))
            .map(|(_, entry)| (&entry.key[head.len()..], entry.value.as_str()));

        Section::new(path, entries)
    }

    /// Binds the section named by [`ConfigSection::SECTION`] into `T`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Bind`] if a value cannot be converted to its field type.
    pub fn bind<T>(&self) -> Result<T, ConfigError>
    where
        T: ConfigSection + DeserializeOwned,
    {
        self.bind_section(T::SECTION)
    }

    /// Binds the section rooted at `prefix` into `T`. An absent section yields `T::default()`.
    ///
    /// # Errors
    /// Returns [`ConfigError::Bind`] if a value cannot be converted to its field type.
    pub fn bind_section<T>(&self, prefix: &str) -> Result<T, ConfigError>
    where
        T: DeserializeOwned + Default,
    {
        self.section(prefix).bind::<T>().map_err(|source: BindError| ConfigError::Bind {
            source,
            context: Some(format!("section '{prefix}'").into()),
        })
    }

    fn insert(&mut self, key: String, value: String) {
        let key = normalize_key(&key);
        if key.is_empty() {
            return;
        }
        self.entries.insert(lookup_key(&key), Entry { key, value });
    }

    fn extend(&mut self, pairs: impl IntoIterator<Item = (String, String)>) {
        for (key, value) in pairs {
            self.insert(key, value);
        }
    }
}

#[derive(Debug)]
enum Layer {
    JsonFile(PathBuf),
    Environment(Option<Map<String, String>>),
    Pairs(Vec<(String, String)>),
}

/// Builder that stacks settings layers. Later layers override earlier ones.
#[must_use = "builders do nothing unless you call .build()"]
#[derive(Debug, Default)]
pub struct SettingsSourceBuilder {
    layers: Vec<Layer>,
}

impl SettingsSourceBuilder {
    /// Adds a JSON settings file. A missing file is skipped.
    ///
    /// Uses the `Values` object when present (`local.settings.json` layout), otherwise
    /// the whole document. Nested objects are flattened with `:`.
    pub fn json_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.layers.push(Layer::JsonFile(path.into()));
        self
    }

    /// Adds the process environment, captured when [`Self::build`] runs.
    pub fn environment(mut self) -> Self {
        self.layers.push(Layer::Environment(None));
        self
    }

    /// Adds an environment snapshot in place of the process environment.
    pub fn environment_from<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars = vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.layers.push(Layer::Environment(Some(vars)));
        self
    }

    /// Adds explicit key/value pairs.
    pub fn pairs<I, K, V>(mut self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.layers.push(Layer::Pairs(
            pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        ));
        self
    }

    /// Reads every layer in order and freezes the result.
    ///
    /// # Errors
    /// Returns [`ConfigError::Config`] if a settings file exists but cannot be read or
    /// is not valid JSON.
    pub fn build(self) -> Result<SettingsSource, ConfigError> {
        let mut source = SettingsSource::default();

        for layer in self.layers {
            match layer {
                Layer::JsonFile(path) => {
                    let file = File::from(path.as_path()).format(FileFormat::Json).required(false);
                    let document = read_document(file)
                        .context(format!("Failed to load {}", path.display()))?;
                    let pairs = flatten_json(&document);
                    debug!(path = %path.display(), keys = pairs.len(), "Settings file loaded");
                    source.extend(pairs);
                },
                Layer::Environment(vars) => {
                    let document = read_document(Environment::default().source(vars))
                        .context("Failed to capture environment")?;
                    source.extend(flatten(&document));
                },
                Layer::Pairs(pairs) => source.extend(pairs),
            }
        }

        info!(keys = source.len(), "Application settings loaded");
        Ok(source)
    }
}

/// Reads one `config` source into a JSON document. A missing optional file is an empty object.
fn read_document<S>(layer: S) -> Result<Value, config::ConfigError>
where
    S: Source + Send + Sync + 'static,
{
    Config::builder().add_source(layer).build()?.try_deserialize::<Value>()
}

/// Flattens a settings document into `:`-delimited pairs.
pub(crate) fn flatten_json(document: &Value) -> Vec<(String, String)> {
    let values = document.as_object().and_then(|map| {
        map.iter()
            .find(|(key, value)| key.eq_ignore_ascii_case(VALUES_KEY) && value.is_object())
            .map(|(_, value)| value)
    });
    flatten(values.unwrap_or(document))
}

fn flatten(root: &Value) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    flatten_into(None, root, &mut pairs);
    pairs
}

fn flatten_into(prefix: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |segment: &str| {
        prefix.map_or_else(|| segment.to_owned(), |p| format!("{p}{KEY_DELIMITER}{segment}"))
    };

    match value {
        Value::Object(map) => {
            for (key, child) in map {
                flatten_into(Some(&join(key)), child, out);
            }
        },
        Value::Array(items) => {
            for (index, child) in items.iter().enumerate() {
                flatten_into(Some(&join(&index.to_string())), child, out);
            }
        },
        Value::Null => {},
        Value::String(s) => {
            if let Some(key) = prefix {
                out.push((key.to_owned(), s.clone()));
            }
        },
        Value::Bool(_) | Value::Number(_) => {
            if let Some(key) = prefix {
                out.push((key.to_owned(), value.to_string()));
            }
        },
    }
}

/// Rewrites `__` to `:` and trims surrounding delimiters.
pub(crate) fn normalize_key(key: &str) -> String {
    key.replace(ENV_DELIMITER, ":").trim_matches(KEY_DELIMITER).to_owned()
}

/// Key used for case-insensitive lookup. ASCII-only so byte offsets match the stored key.
fn lookup_key(key: &str) -> String {
    normalize_key(key).to_ascii_lowercase()
}
