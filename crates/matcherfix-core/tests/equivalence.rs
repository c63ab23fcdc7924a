use matcherfix_canonical::{canonicalize, canonicalize_text, ConfigDescriptor};
use matcherfix_core::{equivalent, equivalent_text, Document, EquivalenceError};
use proptest::prelude::*;

const SIMPLE_INPUT: &str = include_str!("../../../testdata/simple/input.yaml");
const SIMPLE_EXPECTED: &str = include_str!("../../../testdata/simple/expected.yaml");
const ADVANCED_INPUT: &str = include_str!("../../../testdata/advanced/input.yaml");
const ADVANCED_EXPECTED: &str = include_str!("../../../testdata/advanced/expected.yaml");

#[test]
fn golden_outputs_are_equivalent_to_their_inputs() {
    for (input, expected) in [(SIMPLE_INPUT, SIMPLE_EXPECTED), (ADVANCED_INPUT, ADVANCED_EXPECTED)] {
        let result = equivalent_text(input, expected).unwrap();
        assert!(result.is_equal(), "differences: {:?}", result.differences);
    }
}

#[test]
fn canonicalization_preserves_meaning() {
    let desc = ConfigDescriptor::new("2", ADVANCED_INPUT);
    let fixed = canonicalize(&desc).unwrap();
    assert!(equivalent(&desc, &fixed).unwrap().is_equal());
}

#[test]
fn field_order_and_quoting_are_ignored() {
    let first = r#"
route:
  receiver: team
  group_by: [alertname]
  matchers: [severity=critical, 'team="a"']
receivers:
- name: team
  webhook_configs:
  - url: https://example.com/
    send_resolved: true
"#;
    let second = r#"
receivers:
- webhook_configs:
  - send_resolved: true
    url: "https://example.com/"
  name: "team"
route:
  matchers:
  - team=a
  - severity="critical"
  group_by:
  - alertname
  receiver: team
  continue: false
"#;
    assert!(equivalent_text(first, second).unwrap().is_equal());
}

#[test]
fn null_and_empty_fields_equal_absence() {
    let first = "route:\n  receiver: a\n  routes: []\n  group_by: ~\nreceivers:\n- name: a\n  email_configs: []\n";
    let second = "route:\n  receiver: a\nreceivers:\n- name: a\ninhibit_rules: null\n";
    assert!(equivalent_text(first, second).unwrap().is_equal());
}

#[test]
fn every_independent_difference_is_reported() {
    let first = r#"
global:
  smtp_from: a@example.com
route:
  receiver: a
  group_wait: 30s
  routes:
  - matchers: [foo=bar]
  - matchers: [env=prod]
    continue: true
receivers:
- name: a
"#;
    let second = r#"
global:
  smtp_from: b@example.com
route:
  receiver: a
  group_wait: 1m
  routes:
  - matchers: [foo=baz]
  - matchers: [env=prod]
receivers:
- name: a
- name: b
"#;
    let result = equivalent_text(first, second).unwrap();
    let paths: Vec<&str> = result.differences.iter().map(|d| d.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "global.smtp_from",
            "route.routes[0].matchers[0]",
            "route.routes[1].continue",
            "route.group_wait",
            "receivers[1]",
        ]
    );
}

#[test]
fn operator_changes_are_differences() {
    let result = equivalent_text(
        "route:\n  matchers: ['a=b']\n",
        "route:\n  matchers: ['a=~b']\n",
    )
    .unwrap();
    assert_eq!(result.differences.len(), 1);
    assert_eq!(
        result.differences[0].to_string(),
        "route.matchers[0]: a=\"b\" != a=~\"b\""
    );
}

#[test]
fn yaml_1_1_booleans_keep_their_meaning() {
    let raw = "receivers:\n- name: r\n  email_configs:\n  - to: a@b.c\n    send_resolved: yes\n";
    let fixed = canonicalize_text(raw).unwrap();
    assert!(fixed.contains("    send_resolved: true\n"), "{fixed}");
    assert!(equivalent_text(raw, &fixed).unwrap().is_equal());

    let quoted = "receivers:\n- name: r\n  email_configs:\n  - to: a@b.c\n    send_resolved: \"yes\"\n";
    let result = equivalent_text(raw, quoted).unwrap();
    assert_eq!(result.differences.len(), 1);
    assert_eq!(result.differences[0].path, "receivers[0].email_configs[0].send_resolved");
}

#[test]
fn durations_compare_by_value() {
    assert!(equivalent_text("route:\n  repeat_interval: 90m\n", "route:\n  repeat_interval: 1h30m\n")
        .unwrap()
        .is_equal());
}

#[test]
fn decode_errors_name_the_failing_document() {
    let good = "route:\n  receiver: a\n";
    let bad = "route:\n  matchers: ['foo=\"bar']\n";

    let err = equivalent_text(bad, good).unwrap_err();
    assert_eq!(err.document(), Document::First);
    assert!(matches!(err, EquivalenceError::SchemaDecode { document: Document::First, .. }));

    let err = equivalent_text(good, bad).unwrap_err();
    assert_eq!(err.document(), Document::Second);

    let err = equivalent_text(good, "routes: {}\n").unwrap_err();
    assert_eq!(err.document(), Document::Second);
}

#[test]
fn time_intervals_are_typed() {
    let first = "time_intervals:\n- name: w\n  time_intervals:\n  - times: [{start_time: '09:00', end_time: '17:00'}]\n    weekdays: ['monday:friday']\n";
    let second = "time_intervals:\n- name: w\n  time_intervals:\n  - weekdays: ['Monday:Friday']\n    times:\n    - end_time: \"17:00\"\n      start_time: \"09:00\"\n";
    assert!(equivalent_text(first, second).unwrap().is_equal());
    assert!(equivalent_text(first, "time_intervals:\n- name: w\n  time_intervals:\n  - times: [{start_time: '17:00', end_time: '09:00'}]\n").is_err());
}

fn bare_matcher() -> impl Strategy<Value = String> {
    (
        "[a-z_][a-z0-9_]{0,6}",
        prop_oneof![Just("="), Just("!="), Just("=~"), Just("!~")],
        "[a-zA-Z0-9.]{0,8}",
    )
        .prop_map(|(name, op, value)| format!("{}{}{}", name, op, value))
}

proptest! {
    #[test]
    fn canonical_form_is_equivalent_and_stable(
        matchers in prop::collection::vec(bare_matcher(), 1..6),
        nested in prop::collection::vec(bare_matcher(), 0..4),
    ) {
        let mut raw = String::from("route:\n  receiver: r\n  matchers:\n");
        for matcher in &matchers {
            raw.push_str(&format!("  - '{}'\n", matcher));
        }
        if !nested.is_empty() {
            raw.push_str("  routes:\n  - matchers:\n");
            for matcher in &nested {
                raw.push_str(&format!("    - '{}'\n", matcher));
            }
        }
        raw.push_str("receivers:\n- name: r\n");

        let once = canonicalize_text(&raw).unwrap();
        prop_assert!(equivalent_text(&raw, &once).unwrap().is_equal());
        prop_assert_eq!(canonicalize_text(&once).unwrap(), once);
    }
}
