use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;

use crate::canonicalizer::CanonicalizationError;
use crate::de::null_as_default;
use crate::duration::Duration;
use crate::emitter::{self, EncodeError};
use crate::loader;
use crate::matchers::Matchers;
use crate::pattern::AnchoredRegex;

/// A routing tree node.
///
/// Fields serialize in declaration order; everything except `continue` is
/// omitted when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Route {
    /// Receiver for alerts that stop at this route.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub receiver: String,
    /// Labels used to group alerts.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub group_by: Vec<String>,
    /// Legacy equality matchers.
    #[serde(
        rename = "match",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub match_labels: BTreeMap<String, String>,
    /// Legacy regex matchers.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub match_re: BTreeMap<String, AnchoredRegex>,
    /// Label matchers.
    #[serde(default, skip_serializing_if = "Matchers::is_empty")]
    pub matchers: Matchers,
    /// Time intervals during which notifications are muted.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub mute_time_intervals: Vec<String>,
    /// Time intervals during which the route is active.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub active_time_intervals: Vec<String>,
    /// Whether matching continues with sibling routes.
    #[serde(rename = "continue", default, deserialize_with = "null_as_default")]
    pub continue_matching: bool,
    /// Child routes.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<Route>,
    /// Wait before the first notification for a new group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_wait: Option<Duration>,
    /// Wait before notifying about new alerts in an existing group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_interval: Option<Duration>,
    /// Wait before re-sending a notification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_interval: Option<Duration>,
}

/// Mutes alerts matching the target while alerts matching the source fire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InhibitRule {
    /// Legacy equality matchers for the source alerts.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub source_match: BTreeMap<String, String>,
    /// Legacy regex matchers for the source alerts.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub source_match_re: BTreeMap<String, AnchoredRegex>,
    /// Matchers for the source alerts.
    #[serde(default, skip_serializing_if = "Matchers::is_empty")]
    pub source_matchers: Matchers,
    /// Legacy equality matchers for the target alerts.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub target_match: BTreeMap<String, String>,
    /// Legacy regex matchers for the target alerts.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "BTreeMap::is_empty")]
    pub target_match_re: BTreeMap<String, AnchoredRegex>,
    /// Matchers for the target alerts.
    #[serde(default, skip_serializing_if = "Matchers::is_empty")]
    pub target_matchers: Matchers,
    /// Labels that must be equal between source and target.
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub equal: Vec<String>,
}

/// A configuration decoded just far enough to re-render its matchers.
///
/// `route` and `inhibit_rules` are typed so their matchers pass through
/// [`Matchers`]; every other section keeps its mapping order and content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// `global` section.
    pub global: Mapping,
    /// Routing tree.
    pub route: Option<Route>,
    /// Inhibition rules.
    pub inhibit_rules: Vec<InhibitRule>,
    /// Receivers, one mapping each.
    pub receivers: Vec<Mapping>,
    /// Template file globs.
    pub templates: Vec<String>,
    /// Legacy time interval definitions.
    pub mute_time_intervals: Vec<Mapping>,
    /// Time interval definitions.
    pub time_intervals: Vec<Mapping>,
    /// Unrecognized top-level keys, in input order.
    pub extra: Mapping,
}

impl Document {
    /// Decodes a configuration. Empty input is an empty document.
    ///
    /// Typed sections are read with `serde_yaml`. The untyped sections are
    /// read with [`loader`], so plain `yes`/`no`/`on`/`off` keep the boolean
    /// meaning Alertmanager gives them and are written back as booleans.
    pub fn parse(raw: &str) -> Result<Self, CanonicalizationError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let Some(mut typed) = root(serde_yaml::from_str(raw))? else {
            return Ok(Self::default());
        };
        let mut generic = root(loader::from_str(raw))?.unwrap_or_default();
        for key in TYPED_SECTIONS {
            generic.shift_remove(*key);
        }

        Ok(Self {
            global: take(&mut generic, "global")?,
            route: take(&mut typed, "route")?,
            inhibit_rules: take(&mut typed, "inhibit_rules")?,
            receivers: take(&mut generic, "receivers")?,
            templates: take(&mut typed, "templates")?,
            mute_time_intervals: take(&mut generic, "mute_time_intervals")?,
            time_intervals: take(&mut generic, "time_intervals")?,
            extra: generic,
        })
    }

    /// Builds the output mapping: known keys in fixed order, then the rest.
    pub fn to_value(&self) -> Result<Value, EncodeError> {
        let mut out = Mapping::new();
        if !self.global.is_empty() {
            out.insert("global".into(), Value::Mapping(self.global.clone()));
        }
        if let Some(route) = &self.route {
            out.insert("route".into(), serde_yaml::to_value(route)?);
        }
        if !self.inhibit_rules.is_empty() {
            out.insert("inhibit_rules".into(), serde_yaml::to_value(&self.inhibit_rules)?);
        }
        if !self.receivers.is_empty() {
            out.insert("receivers".into(), mappings(&self.receivers));
        }
        out.insert("templates".into(), serde_yaml::to_value(&self.templates)?);
        if !self.mute_time_intervals.is_empty() {
            out.insert("mute_time_intervals".into(), mappings(&self.mute_time_intervals));
        }
        if !self.time_intervals.is_empty() {
            out.insert("time_intervals".into(), mappings(&self.time_intervals));
        }
        for (key, value) in &self.extra {
            out.insert(key.clone(), value.clone());
        }
        Ok(Value::Mapping(out))
    }

    /// Renders the document as YAML text.
    pub fn render(&self) -> Result<String, EncodeError> {
        emitter::to_string(&self.to_value()?)
    }
}

/// Sections decoded into typed structures rather than kept as mappings.
const TYPED_SECTIONS: &[&str] = &["route", "inhibit_rules", "templates"];

fn root(value: Result<Value, serde_yaml::Error>) -> Result<Option<Mapping>, CanonicalizationError> {
    let decode = |source| CanonicalizationError::Decode {
        field: "root".to_string(),
        source,
    };
    match value.map_err(decode)? {
        Value::Null => Ok(None),
        Value::Mapping(map) => Ok(Some(map)),
        _ => Err(decode(serde::de::Error::custom("expected a mapping at the top level"))),
    }
}

fn take<T>(map: &mut Mapping, key: &'static str) -> Result<T, CanonicalizationError>
where
    T: DeserializeOwned + Default,
{
    match map.shift_remove(key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_yaml::from_value(value).map_err(|source| CanonicalizationError::Decode {
            field: key.to_string(),
            source,
        }),
    }
}

fn mappings(items: &[Mapping]) -> Value {
    Value::Sequence(items.iter().cloned().map(Value::Mapping).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_null_documents() {
        assert_eq!(Document::parse("").unwrap(), Document::default());
        assert_eq!(Document::parse("  \n").unwrap(), Document::default());
        assert_eq!(Document::parse("~").unwrap(), Document::default());
        assert_eq!(Document::default().render().unwrap(), "templates: []\n");
    }

    #[test]
    fn rejects_non_mapping_top_level() {
        let err = Document::parse("- a\n- b").unwrap_err();
        assert!(matches!(err, CanonicalizationError::Decode { ref field, .. } if field == "root"));
    }

    #[test]
    fn null_sections_are_absent() {
        let doc = Document::parse("global: null\nroute: ~\nreceivers:\ntemplates: null\n").unwrap();
        assert!(doc.global.is_empty());
        assert!(doc.route.is_none());
        assert!(doc.receivers.is_empty());
        assert_eq!(doc.render().unwrap(), "templates: []\n");
    }

    #[test]
    fn known_keys_use_fixed_order_and_extras_follow() {
        let raw = "zeta: 1\ntemplates: [a.tmpl]\nreceivers:\n- name: r\nalpha: {k: v}\nroute:\n  receiver: r\n";
        let rendered = Document::parse(raw).unwrap().render().unwrap();
        assert_eq!(
            rendered,
            "route:\n  receiver: r\n  continue: false\nreceivers:\n- name: r\ntemplates:\n- a.tmpl\nzeta: 1\nalpha:\n  k: v\n"
        );
    }

    #[test]
    fn global_keeps_input_order_and_secrets() {
        let raw = "global:\n  smtp_auth_password: password\n  resolve_timeout: 5m\n  http_config:\n    basic_auth: {username: admin, password: secret}\n";
        let rendered = Document::parse(raw).unwrap().render().unwrap();
        assert_eq!(
            rendered,
            "global:\n  smtp_auth_password: password\n  resolve_timeout: 5m\n  http_config:\n    basic_auth:\n      username: admin\n      password: secret\ntemplates: []\n"
        );
    }

    #[test]
    fn route_fields_render_in_canonical_order() {
        let raw = r#"
route:
  repeat_interval: 90m
  routes:
    - receiver: child
      continue: true
  match_re:
    service: "foo|bar"
  match:
    team: b
    env: prod
  group_by: [alertname]
  receiver: default
"#;
        let rendered = Document::parse(raw).unwrap().render().unwrap();
        assert_eq!(
            rendered,
            "route:\n  receiver: default\n  group_by:\n  - alertname\n  match:\n    env: prod\n    team: b\n  match_re:\n    service: foo|bar\n  continue: false\n  routes:\n  - receiver: child\n    continue: true\n  repeat_interval: 1h30m\ntemplates: []\n"
        );
    }

    #[test]
    fn inhibit_rules_quote_matchers() {
        let raw = "inhibit_rules:\n- target_matchers: [foo=]\n  equal: [cluster]\n  source_matchers: ['bar=!baz']\n";
        let rendered = Document::parse(raw).unwrap().render().unwrap();
        assert_eq!(
            rendered,
            "inhibit_rules:\n- source_matchers:\n  - bar=\"!baz\"\n  target_matchers:\n  - foo=\"\"\n  equal:\n  - cluster\ntemplates: []\n"
        );
    }

    #[test]
    fn plain_booleans_in_receivers_stay_booleans() {
        let raw = "receivers:\n- name: r\n  email_configs:\n  - to: a@b.c\n    send_resolved: yes\n    require_tls: 'no'\nroute:\n  receiver: yes\n";
        let doc = Document::parse(raw).unwrap();
        let receiver = Value::Mapping(doc.receivers[0].clone());
        assert_eq!(receiver["email_configs"][0]["send_resolved"], Value::Bool(true));
        assert_eq!(doc.route.as_ref().unwrap().receiver, "yes");
        assert_eq!(
            doc.render().unwrap(),
            "route:\n  receiver: \"yes\"\n  continue: false\nreceivers:\n- name: r\n  email_configs:\n  - to: a@b.c\n    send_resolved: true\n    require_tls: \"no\"\ntemplates: []\n"
        );
    }

    #[test]
    fn unknown_route_fields_are_errors() {
        let err = Document::parse("route:\n  receiver: a\n  recevier: b\n").unwrap_err();
        assert!(matches!(err, CanonicalizationError::Decode { ref field, .. } if field == "route"));
    }

    #[test]
    fn bad_values_name_their_section() {
        let cases = [
            ("route:\n  matchers: ['foo=\"bar']\n", "route"),
            ("route:\n  group_wait: soon\n", "route"),
            ("route:\n  match_re: {a: '[x'}\n", "route"),
            ("inhibit_rules:\n- source_matchers: ['1x=y']\n", "inhibit_rules"),
            ("templates: tmpl\n", "templates"),
            ("receivers: {name: x}\n", "receivers"),
            ("global: [a]\n", "global"),
        ];
        for (raw, section) in cases {
            let err = Document::parse(raw).unwrap_err();
            assert!(
                matches!(err, CanonicalizationError::Decode { ref field, .. } if field == section),
                "{raw:?} gave {err}"
            );
        }
    }
}
