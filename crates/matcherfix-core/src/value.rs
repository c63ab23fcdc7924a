use serde::{Deserialize, Deserializer};
use serde_yaml::Number;
use std::collections::BTreeMap;
use std::fmt;

/// Generic YAML value compared without regard to mapping order.
///
/// Mapping keys are reduced to their scalar text, and entries whose value is
/// `null` or an empty sequence are dropped, so `email_configs: []`,
/// `email_configs: null` and a missing key all compare equal.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `null`.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer or float.
    Number(Number),
    /// String.
    String(String),
    /// Sequence, order significant.
    Sequence(Vec<Value>),
    /// Mapping keyed by scalar text.
    Mapping(BTreeMap<String, Value>),
    /// Value with an explicit tag.
    Tagged(String, Box<Value>),
}

impl Value {
    /// Returns true for values that count as absent inside a mapping.
    pub fn is_vacant(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Sequence(items) => items.is_empty(),
            _ => false,
        }
    }
}

/// Text used as the comparison key for a mapping key.
pub(crate) fn key_text(key: &serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s.clone(),
        other => Value::from(other.clone()).to_string(),
    }
}

/// Converts mapping entries, dropping vacant values.
pub(crate) fn mapping_entries(mapping: serde_yaml::Mapping) -> BTreeMap<String, Value> {
    mapping
        .into_iter()
        .map(|(key, value)| (key_text(&key), Value::from(value)))
        .filter(|(_, value)| !value.is_vacant())
        .collect()
}

impl From<serde_yaml::Value> for Value {
    fn from(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => Value::Null,
            serde_yaml::Value::Bool(b) => Value::Bool(b),
            serde_yaml::Value::Number(n) => Value::Number(n),
            serde_yaml::Value::String(s) => Value::String(s),
            serde_yaml::Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::from).collect())
            }
            serde_yaml::Value::Mapping(mapping) => Value::Mapping(mapping_entries(mapping)),
            serde_yaml::Value::Tagged(tagged) => {
                let tagged = *tagged;
                Value::Tagged(tagged.tag.to_string(), Box::new(Value::from(tagged.value)))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_yaml::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Sequence(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Mapping(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Tagged(tag, value) => write!(f, "{} {}", tag, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn mapping_order_is_ignored() {
        assert_eq!(parse("{a: 1, b: [x, y]}"), parse("b: [x, y]\na: 1\n"));
    }

    #[test]
    fn quoting_is_ignored() {
        assert_eq!(parse("{a: \"x\"}"), parse("{a: x}"));
    }

    #[test]
    fn vacant_entries_are_dropped() {
        assert_eq!(parse("{a: 1, b: null, c: []}"), parse("{a: 1}"));
        assert_ne!(parse("{a: 1, d: {}}"), parse("{a: 1}"));
    }

    #[test]
    fn sequence_order_matters() {
        assert_ne!(parse("[a, b]"), parse("[b, a]"));
    }

    #[test]
    fn scalar_keys_use_their_text() {
        let value = parse("{1: one, true: yes}");
        let Value::Mapping(entries) = value else {
            panic!("expected a mapping");
        };
        assert!(entries.contains_key("1"));
        assert!(entries.contains_key("true"));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(parse("{b: [1, x], a: ~}").to_string(), "{b: [1, \"x\"]}");
    }
}
