//! Configuration loading and key lookup
//!
//! The document is built in three layers: built-in defaults, the YAML file,
//! then environment overrides for every leaf key whose variable is set.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use config::{File, FileFormat, ValueKind};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, instrument, warn};

use super::{
    AppConfig, ConfigError,
    env::{EnvSource, ProcessEnv, env_var_name, parse_bool},
};

/// Section stripped from the document before it leaves the process
const PRIVATE_SECTION: &str = "privacy";

/// Key segments whose values are masked in [`ConfigManager::redacted`]
const SECRET_MARKERS: &[&str] = &["key", "token", "secret", "password"];

/// Loaded configuration with dotted-key access and environment overrides
pub struct ConfigManager {
    path: PathBuf,
    env: Arc<dyn EnvSource>,
    document: Value,
    settings: AppConfig,
}

impl fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigManager")
            .field("path", &self.path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl ConfigManager {
    /// Load the YAML file at `path` with overrides from the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, ProcessEnv)
    }

    /// Load the YAML file at `path` with overrides from `env`
    pub fn load_with_env(
        path: impl AsRef<Path>,
        env: impl EnvSource + 'static,
    ) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let env: Arc<dyn EnvSource> = Arc::new(env);
        let (document, settings) = build_document(&path, env.as_ref())?;

        info!(
            path = %path.display(),
            model = %settings.model.name,
            device = %settings.model.device,
            "Configuration loaded"
        );

        Ok(Self {
            path,
            env,
            document,
            settings,
        })
    }

    /// Re-read the file and environment; the current values are kept on error
    pub fn reload(&mut self) -> Result<(), ConfigError> {
        let (document, settings) = build_document(&self.path, self.env.as_ref())?;
        self.document = document;
        self.settings = settings;
        info!(path = %self.path.display(), "Configuration reloaded");
        Ok(())
    }

    /// Typed settings
    pub const fn settings(&self) -> &AppConfig {
        &self.settings
    }

    /// Value for a dotted key: environment, then file or built-in default,
    /// then `default`
    ///
    /// Environment strings are coerced to `T`; a value that cannot be
    /// coerced is ignored.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        if let Some(raw) = self.env.var(&env_var_name(key)) {
            if let Some(value) = coerce_env::<T>(&raw) {
                return value;
            }
            warn!(key, "Ignoring environment override of the wrong type");
        }

        self.value(key)
            .and_then(|value| T::deserialize(value).ok())
            .unwrap_or(default)
    }

    /// Raw document value for a dotted key
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.document
            .pointer(&json_pointer(key))
            .filter(|value| !value.is_null())
    }

    /// A whole top-level section
    pub fn get_section(&self, name: &str) -> Option<&Value> {
        self.document.get(name).filter(|value| value.is_object())
    }

    /// Document safe to expose: no privacy section, secret-like values masked
    pub fn redacted(&self) -> Value {
        let mut document = self.document.clone();
        if let Value::Object(sections) = &mut document {
            sections.remove(PRIVATE_SECTION);
        }
        mask_secrets(&mut document);
        document
    }
}

/// Build the merged document and its typed view
#[instrument(skip_all, fields(path = %path.display()))]
fn build_document(path: &Path, env: &dyn EnvSource) -> Result<(Value, AppConfig), ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let mut builder = config::Config::builder()
        .add_source(File::from(path).format(FileFormat::Yaml).required(true));

    let file_document: Value = builder
        .build_cloned()
        .and_then(config::Config::try_deserialize)
        .map_err(|e| ConfigError::malformed(path, e))?;
    if !file_document.is_object() {
        return Err(ConfigError::malformed(path, "top level must be a mapping"));
    }

    let mut merged = defaults_document()?;
    merge(&mut merged, file_document);

    let mut overrides = 0usize;
    for (key, current) in leaf_entries(&merged) {
        let Some(raw) = env.var(&env_var_name(&key)) else {
            continue;
        };
        let Some(value) = coerce_to_current(&raw, current) else {
            warn!(key = %key, "Ignoring environment override that does not fit the value type");
            continue;
        };
        builder = builder
            .set_override(key.as_str(), value)
            .map_err(|e| ConfigError::malformed(path, e))?;
        debug!(key = %key, "Applied environment override");
        overrides += 1;
    }

    let mut document = defaults_document()?;
    if overrides > 0 {
        let overridden: Value = builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::malformed(path, e))?;
        merge(&mut document, overridden);
    } else {
        document = merged;
    }

    let settings: AppConfig = serde_json::from_value(document.clone())
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
    settings.validate()?;

    debug!(overrides, "Configuration document built");
    Ok((document, settings))
}

fn defaults_document() -> Result<Value, ConfigError> {
    serde_json::to_value(AppConfig::default()).map_err(|e| ConfigError::Invalid(e.to_string()))
}

/// Deep-merge `overlay` into `base`; nulls in the overlay leave `base` as is
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {},
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    continue;
                }
                match base.get_mut(&key) {
                    Some(slot) => merge(slot, value),
                    None => {
                        base.insert(key, value);
                    },
                }
            }
        },
        (slot, overlay) => *slot = overlay,
    }
}

/// Dotted keys of every non-object value
fn leaf_entries(document: &Value) -> Vec<(String, &Value)> {
    fn walk<'a>(prefix: &str, map: &'a Map<String, Value>, out: &mut Vec<(String, &'a Value)>) {
        for (key, value) in map {
            let dotted = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match value {
                Value::Object(child) => walk(&dotted, child, out),
                _ => out.push((dotted, value)),
            }
        }
    }

    let mut out = Vec::new();
    if let Value::Object(map) = document {
        walk("", map, &mut out);
    }
    out
}

/// Coerce an environment string to the type of the value it replaces
///
/// Returns `None` when the string does not parse as the current type, and for
/// arrays of non-strings or objects, which cannot be expressed as a single
/// variable.
fn coerce_to_current(raw: &str, current: &Value) -> Option<ValueKind> {
    let trimmed = raw.trim();

    match current {
        Value::Bool(_) => parse_bool(trimmed).map(ValueKind::Boolean),
        Value::Number(number) if number.is_f64() => trimmed.parse::<f64>().ok().map(ValueKind::Float),
        Value::Number(_) => trimmed
            .parse::<i64>()
            .map(ValueKind::I64)
            .or_else(|_| trimmed.parse::<f64>().map(ValueKind::Float))
            .ok(),
        Value::Array(items) if items.iter().all(Value::is_string) => Some(ValueKind::Array(
            trimmed
                .split(',')
                .map(str::trim)
                .filter(|item| !item.is_empty())
                .map(|item| config::Value::from(item.to_string()))
                .collect(),
        )),
        Value::Array(_) | Value::Object(_) => None,
        Value::String(_) | Value::Null => Some(ValueKind::String(raw.to_string())),
    }
}

/// Coerce an environment string to the caller's requested type
fn coerce_env<T: DeserializeOwned>(raw: &str) -> Option<T> {
    serde_json::from_str::<T>(raw.trim())
        .ok()
        .or_else(|| T::deserialize(Value::String(raw.to_string())).ok())
        .or_else(|| parse_bool(raw).and_then(|flag| T::deserialize(Value::Bool(flag)).ok()))
}

fn json_pointer(key: &str) -> String {
    key.split('.')
        .map(|part| part.replace('~', "~0").replace('/', "~1"))
        .fold(String::new(), |mut pointer, part| {
            pointer.push('/');
            pointer.push_str(&part);
            pointer
        })
}

fn is_secret_key(key: &str) -> bool {
    key.to_ascii_lowercase()
        .split(['_', '-', '.'])
        .any(|segment| SECRET_MARKERS.contains(&segment))
}

fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, child) in map.iter_mut() {
                if is_secret_key(key)
                    && !child.is_object()
                    && !child.is_null()
                {
                    *child = Value::String("***".to_string());
                } else {
                    mask_secrets(child);
                }
            }
        },
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {},
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_replaces_leaves_and_keeps_siblings() {
        let mut base = json!({"model": {"name": "a", "temperature": 0.7}, "api": {"port": 8000}});
        merge(
            &mut base,
            json!({"model": {"name": "b", "top_p": null}, "extra": [1, 2]}),
        );

        assert_eq!(base["model"]["name"], "b");
        assert_eq!(base["model"]["temperature"], 0.7);
        assert!(base["model"].get("top_p").is_none());
        assert_eq!(base["api"]["port"], 8000);
        assert_eq!(base["extra"], json!([1, 2]));
    }

    #[test]
    fn leaf_entries_are_dotted() {
        let document = json!({"model": {"name": "a", "nested": {"deep": true}}, "flag": 1});
        let mut keys: Vec<String> = leaf_entries(&document).into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec!["flag", "model.name", "model.nested.deep"]);
    }

    #[test]
    fn coercion_follows_current_type() {
        assert_eq!(
            coerce_to_current("yes", &json!(false)),
            Some(ValueKind::Boolean(true))
        );
        assert_eq!(
            coerce_to_current("0.2", &json!(0.7)),
            Some(ValueKind::Float(0.2))
        );
        assert_eq!(
            coerce_to_current("9000", &json!(8000)),
            Some(ValueKind::I64(9000))
        );
        assert_eq!(
            coerce_to_current("1234", &json!("model")),
            Some(ValueKind::String("1234".to_string()))
        );
        assert_eq!(coerce_to_current("x", &json!([{"a": 1}])), None);
    }

    #[test]
    fn unparseable_scalars_are_not_coerced() {
        assert_eq!(coerce_to_current("lots", &json!(8)), None);
        assert_eq!(coerce_to_current("warm", &json!(0.7)), None);
        assert_eq!(coerce_to_current("maybe", &json!(true)), None);
        assert_eq!(
            coerce_to_current("2.5", &json!(8)),
            Some(ValueKind::Float(2.5))
        );
    }

    #[test]
    fn string_lists_split_on_commas() {
        let Some(ValueKind::Array(items)) =
            coerce_to_current("http://a, http://b,", &json!(["http://x"]))
        else {
            unreachable!("Expected an array");
        };
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn env_coercion_to_requested_type() {
        assert_eq!(coerce_env::<f64>("0.2"), Some(0.2));
        assert_eq!(coerce_env::<u16>(" 9000 "), Some(9000));
        assert_eq!(coerce_env::<bool>("on"), Some(true));
        assert_eq!(coerce_env::<bool>("1"), Some(true));
        assert_eq!(coerce_env::<String>("0.2"), Some("0.2".to_string()));
        assert_eq!(coerce_env::<u32>("many"), None);
    }

    #[test]
    fn pointer_escapes_segments() {
        assert_eq!(json_pointer("model.temperature"), "/model/temperature");
        assert_eq!(json_pointer("a/b.c~d"), "/a~1b/c~0d");
    }

    #[test]
    fn secrets_are_masked() {
        let mut document = json!({
            "integrations": {"api_key": "abc", "auth-token": "t", "token_ttl": {"x": 1}},
            "inference": {"max_new_tokens": 128, "keep_alive": "5m"},
            "fallback": {"rules": [{"keywords": ["hi"], "reply": "Hello"}]},
        });
        mask_secrets(&mut document);
        assert_eq!(document["integrations"]["api_key"], "***");
        assert_eq!(document["integrations"]["auth-token"], "***");
        assert_eq!(document["integrations"]["token_ttl"]["x"], 1);
        assert_eq!(document["inference"]["max_new_tokens"], 128);
        assert_eq!(document["inference"]["keep_alive"], "5m");
        assert_eq!(document["fallback"]["rules"][0]["keywords"][0], "hi");
    }
}
