use serde::de::Error as _;
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Number, Value};
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag as NodeTag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

const MAX_DEPTH: usize = 128;
const CORE_SCHEMA: &str = "tag:yaml.org,2002:";

const TRUE: &[&str] = &["y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON"];
const FALSE: &[&str] = &["n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF"];
const NULL: &[&str] = &["", "~", "null", "Null", "NULL"];

/// Loads a YAML document, resolving plain scalars with the YAML 1.1 boolean
/// table that Alertmanager's own loader uses.
///
/// `send_resolved: yes` loads as `true` here, while `serde_yaml` keeps it as
/// the string `"yes"`. Quoted and block scalars are always strings. Numbers
/// and nulls resolve exactly as in `serde_yaml`, anchors are expanded, and
/// tags other than the core schema ones are kept as [`Value::Tagged`].
///
/// An empty stream loads as [`Value::Null`]. Only the first document of a
/// stream is read.
pub fn from_str(raw: &str) -> Result<Value, serde_yaml::Error> {
    let mut events = Events::default();
    Parser::new_from_str(raw)
        .load(&mut events, false)
        .map_err(serde_yaml::Error::custom)?;
    Builder {
        events: events.0.into_iter(),
        anchors: HashMap::new(),
    }
    .document()
}

#[derive(Default)]
struct Events(Vec<(Event, Marker)>);

impl MarkedEventReceiver for Events {
    fn on_event(&mut self, event: Event, mark: Marker) {
        self.0.push((event, mark));
    }
}

struct Builder {
    events: std::vec::IntoIter<(Event, Marker)>,
    anchors: HashMap<usize, Value>,
}

impl Builder {
    fn document(&mut self) -> Result<Value, serde_yaml::Error> {
        while let Some((event, mark)) = self.events.next() {
            match event {
                Event::Scalar(..) | Event::Alias(_) | Event::SequenceStart(..) | Event::MappingStart(..) => {
                    return self.node(event, mark, 0);
                }
                Event::DocumentEnd | Event::StreamEnd => break,
                _ => {}
            }
        }
        Ok(Value::Null)
    }

    fn next(&mut self) -> Result<(Event, Marker), serde_yaml::Error> {
        self.events
            .next()
            .ok_or_else(|| serde_yaml::Error::custom("unexpected end of document"))
    }

    fn node(&mut self, event: Event, mark: Marker, depth: usize) -> Result<Value, serde_yaml::Error> {
        if depth > MAX_DEPTH {
            return Err(error(mark, "recursion limit exceeded"));
        }
        let (anchor, value) = match event {
            Event::Alias(id) => {
                return self
                    .anchors
                    .get(&id)
                    .cloned()
                    .ok_or_else(|| error(mark, "unknown anchor"));
            }
            Event::Scalar(text, style, anchor, tag) => (anchor, scalar(text, &style, tag)),
            Event::SequenceStart(anchor, tag) => (anchor, tagged(self.sequence(depth)?, tag)),
            Event::MappingStart(anchor, tag) => (anchor, tagged(self.mapping(depth)?, tag)),
            other => return Err(error(mark, &format!("unexpected {:?}", other))),
        };
        if anchor > 0 {
            self.anchors.insert(anchor, value.clone());
        }
        Ok(value)
    }

    fn sequence(&mut self, depth: usize) -> Result<Value, serde_yaml::Error> {
        let mut items = Vec::new();
        loop {
            let (event, mark) = self.next()?;
            if let Event::SequenceEnd = event {
                return Ok(Value::Sequence(items));
            }
            items.push(self.node(event, mark, depth + 1)?);
        }
    }

    fn mapping(&mut self, depth: usize) -> Result<Value, serde_yaml::Error> {
        let mut mapping = Mapping::new();
        loop {
            let (event, mark) = self.next()?;
            if let Event::MappingEnd = event {
                return Ok(Value::Mapping(mapping));
            }
            let key = self.node(event, mark, depth + 1)?;
            let (event, value_mark) = self.next()?;
            let value = self.node(event, value_mark, depth + 1)?;
            if mapping.contains_key(&key) {
                return Err(error(mark, &format!("duplicate entry with key {:?}", key)));
            }
            mapping.insert(key, value);
        }
    }
}

fn error(mark: Marker, message: &str) -> serde_yaml::Error {
    serde_yaml::Error::custom(format!(
        "{} at line {} column {}",
        message,
        mark.line(),
        mark.col() + 1
    ))
}

fn is_core(tag: &NodeTag) -> bool {
    tag.handle == "!!" || tag.handle == CORE_SCHEMA
}

fn scalar(text: String, style: &TScalarStyle, tag: Option<NodeTag>) -> Value {
    match tag {
        // `!!str x` and the non-specific `! x` both force a string.
        Some(tag) if (is_core(&tag) && tag.suffix == "str") || (tag.handle.is_empty() && tag.suffix == "!") => {
            Value::String(text)
        }
        Some(tag) if is_core(&tag) => resolve_plain(text),
        tag => {
            let value = match style {
                TScalarStyle::Plain => resolve_plain(text),
                _ => Value::String(text),
            };
            tagged(value, tag)
        }
    }
}

fn tagged(value: Value, tag: Option<NodeTag>) -> Value {
    match tag {
        Some(tag) if !is_core(&tag) && !tag.handle.is_empty() => Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(format!("{}{}", tag.handle, tag.suffix)),
            value,
        })),
        _ => value,
    }
}

/// Resolves the text of an untagged plain scalar.
fn resolve_plain(text: String) -> Value {
    if NULL.contains(&text.as_str()) {
        return Value::Null;
    }
    if TRUE.contains(&text.as_str()) {
        return Value::Bool(true);
    }
    if FALSE.contains(&text.as_str()) {
        return Value::Bool(false);
    }
    if let Some(number) = parse_int(&text) {
        return Value::Number(number);
    }
    if let Some(float) = parse_float(&text) {
        return Value::Number(Number::from(float));
    }
    Value::String(text)
}

/// Digits with a leading zero, such as `0123`, are text rather than numbers.
fn zero_padded(unsigned: &str) -> bool {
    unsigned.len() > 1 && unsigned.starts_with('0') && unsigned.bytes().all(|b| b.is_ascii_digit())
}

fn parse_int(text: &str) -> Option<Number> {
    let (negative, unsigned) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let (digits, radix) = if let Some(rest) = unsigned.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = unsigned.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = unsigned.strip_prefix("0b") {
        (rest, 2)
    } else if zero_padded(unsigned) {
        return None;
    } else {
        (unsigned, 10)
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let magnitude = u64::from_str_radix(digits, radix).ok()?;
    if negative {
        0i64.checked_sub_unsigned(magnitude).map(Number::from)
    } else {
        Some(Number::from(magnitude))
    }
}

fn parse_float(text: &str) -> Option<f64> {
    let unsigned = match text.strip_prefix('+') {
        Some(rest) if rest.starts_with(['+', '-']) => return None,
        Some(rest) => rest,
        None => text,
    };
    match (text, unsigned) {
        (_, ".inf" | ".Inf" | ".INF") => return Some(f64::INFINITY),
        ("-.inf" | "-.Inf" | "-.INF", _) => return Some(f64::NEG_INFINITY),
        (".nan" | ".NaN" | ".NAN", _) => return Some(f64::NAN),
        _ => {}
    }
    if zero_padded(unsigned.strip_prefix('-').unwrap_or(unsigned)) {
        return None;
    }
    unsigned.parse::<f64>().ok().filter(|float| float.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(yaml: &str) -> Value {
        from_str(yaml).unwrap()
    }

    #[test]
    fn plain_yaml_1_1_booleans_resolve() {
        let value = load("a: yes\nb: Off\nc: y\nd: 'yes'\ne: \"no\"\nf: true\n");
        assert_eq!(value["a"], Value::Bool(true));
        assert_eq!(value["b"], Value::Bool(false));
        assert_eq!(value["c"], Value::Bool(true));
        assert_eq!(value["d"], Value::String("yes".into()));
        assert_eq!(value["e"], Value::String("no".into()));
        assert_eq!(value["f"], Value::Bool(true));
    }

    #[test]
    fn other_scalars_match_serde_yaml() {
        let yaml = "a: 1\nb: -2\nc: 1.5\nd: 0x1F\nf: ~\ng:\nh: .inf\ni: 1e3\nj: text\nk: 1_000\nl: '1'\nm: 09:00\n";
        let expected: Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(load(yaml), expected);
    }

    #[test]
    fn block_scalars_are_strings() {
        let value = load("a: |\n  yes\nb: >-\n  on\n");
        assert_eq!(value["a"], Value::String("yes\n".into()));
        assert_eq!(value["b"], Value::String("on".into()));
    }

    #[test]
    fn anchors_expand_and_order_is_kept() {
        let value = load("z: &x {k: on}\na: *x\nm: [*x]\n");
        let Value::Mapping(mapping) = &value else {
            panic!("expected a mapping");
        };
        let keys: Vec<&str> = mapping.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(value["a"]["k"], Value::Bool(true));
        assert_eq!(value["m"][0], value["z"]);
    }

    #[test]
    fn tags_are_kept_or_applied() {
        let value = load("a: !secret token\nb: !!str yes\nc: !env {k: v}\n");
        let Value::Tagged(secret) = &value["a"] else {
            panic!("expected a tagged value");
        };
        assert_eq!(secret.tag, Tag::new("secret"));
        assert_eq!(secret.value, Value::String("token".into()));
        assert_eq!(value["b"], Value::String("yes".into()));
        assert!(matches!(value["c"], Value::Tagged(_)));
    }

    #[test]
    fn empty_input_is_null() {
        assert_eq!(load(""), Value::Null);
        assert_eq!(load("# only a comment\n"), Value::Null);
        assert_eq!(load("~"), Value::Null);
    }

    #[test]
    fn malformed_documents_fail() {
        assert!(from_str("a: [1, 2\n").is_err());
        assert!(from_str("a: 1\na: 2\n").is_err());
        assert!(from_str("a: *missing\n").is_err());
    }
}
