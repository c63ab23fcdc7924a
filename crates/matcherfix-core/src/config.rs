use matcherfix_canonical::de::null_as_default;
use matcherfix_canonical::loader;
use matcherfix_canonical::{Duration, InhibitRule, Route};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_yaml::Mapping;
use std::collections::BTreeMap;
use tracing::debug;

use crate::errors::ConfigError;
use crate::timeinterval::TimeInterval;
use crate::value::{mapping_entries, Value};

/// Fully typed configuration.
///
/// Unknown top-level keys are rejected. Sections that are absent, `null` or
/// empty all load as their empty value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Global settings.
    #[serde(default, deserialize_with = "null_as_default")]
    pub global: GlobalConfig,
    /// Routing tree.
    #[serde(default)]
    pub route: Option<Route>,
    /// Inhibition rules.
    #[serde(default, deserialize_with = "null_as_default")]
    pub inhibit_rules: Vec<InhibitRule>,
    /// Notification receivers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub receivers: Vec<Receiver>,
    /// Template file globs.
    #[serde(default, deserialize_with = "null_as_default")]
    pub templates: Vec<String>,
    /// Legacy time interval definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub mute_time_intervals: Vec<TimeInterval>,
    /// Time interval definitions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub time_intervals: Vec<TimeInterval>,
}

impl Config {
    /// Parses a configuration document. Empty or `null` input is an empty
    /// configuration.
    ///
    /// `global` and `receivers` are read with [`loader`] rather than
    /// `serde_yaml`, so their untyped values resolve plain scalars the way
    /// Alertmanager does.
    pub fn load(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let mut value: serde_yaml::Value = serde_yaml::from_str(raw)?;
        if value.is_null() {
            return Ok(Self::default());
        }
        if let serde_yaml::Value::Mapping(typed) = &mut value {
            for key in UNTYPED_SECTIONS {
                typed.shift_remove(*key);
            }
        }
        let mut config: Config = serde_yaml::from_value(value)?;
        if let serde_yaml::Value::Mapping(mut resolved) = loader::from_str(raw)? {
            config.global = take(&mut resolved, "global")?.unwrap_or_default();
            config.receivers = take(&mut resolved, "receivers")?.unwrap_or_default();
        }
        debug!(
            receivers = config.receivers.len(),
            inhibit_rules = config.inhibit_rules.len(),
            "loaded configuration"
        );
        Ok(config)
    }
}

/// Top-level sections decoded from the YAML 1.1 view of the document.
const UNTYPED_SECTIONS: &[&str] = &["global", "receivers"];

/// Settings that apply to every receiver.
///
/// The two fields every deployment sets are typed; the rest are kept as
/// generic values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Mapping")]
pub struct GlobalConfig {
    /// Time after which an alert is declared resolved if it stops updating.
    pub resolve_timeout: Option<Duration>,
    /// Default for `require_tls` in email receivers.
    pub smtp_require_tls: Option<bool>,
    /// Every other global setting.
    pub settings: BTreeMap<String, Value>,
}

impl TryFrom<Mapping> for GlobalConfig {
    type Error = ConfigError;

    fn try_from(mut mapping: Mapping) -> Result<Self, Self::Error> {
        Ok(Self {
            resolve_timeout: take(&mut mapping, "resolve_timeout")?,
            smtp_require_tls: take(&mut mapping, "smtp_require_tls")?,
            settings: mapping_entries(mapping),
        })
    }
}

/// A named notification target with its integrations.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Mapping")]
pub struct Receiver {
    /// Name routes use to refer to the receiver.
    pub name: String,
    /// Integration lists such as `email_configs`, keyed by field name.
    pub integrations: BTreeMap<String, Value>,
}

impl TryFrom<Mapping> for Receiver {
    type Error = ConfigError;

    fn try_from(mut mapping: Mapping) -> Result<Self, Self::Error> {
        let name: Option<String> = take(&mut mapping, "name")?;
        let name = name
            .filter(|name| !name.is_empty())
            .ok_or(ConfigError::MissingField("receiver name"))?;
        Ok(Self {
            name,
            integrations: mapping_entries(mapping),
        })
    }
}

/// Removes `key` and decodes it; `null` and absence both give `None`.
fn take<T: DeserializeOwned>(
    mapping: &mut Mapping,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match mapping.shift_remove(key) {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(value) => serde_yaml::from_value(value)
            .map(Some)
            .map_err(|source| ConfigError::InvalidField { field: key, source }),
    }
}
