//! Renders a [`serde_yaml::Value`] as block-style YAML.
//!
//! The layout is the one Alertmanager tooling has always produced for
//! these files: two-space indentation, sequences under a mapping key at the
//! key's own column, mappings inside sequence items starting on the dash
//! line. Strings are written plain whenever a YAML 1.1 reader would still
//! see a string, so values such as `09:00`, `yes` or `1_000` are quoted.
//! Lines are never folded.

use regex::Regex;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

const INDENT: usize = 2;

/// Errors raised while rendering a document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// A mapping key is a sequence, a mapping or a tagged collection.
    #[error("cannot render non-scalar mapping key: {0}")]
    ComplexKey(String),
    /// A typed value could not be converted into a YAML value.
    #[error("failed to convert value: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Renders `value` as a YAML document ending in a newline.
pub fn to_string(value: &Value) -> Result<String, EncodeError> {
    let mut emitter = Emitter { out: String::new() };
    emitter.node(value, 0, Context::Root)?;
    Ok(emitter.out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Root,
    MappingValue,
    SequenceItem,
}

#[derive(Debug, Clone, Copy)]
enum ScalarContext {
    Key,
    Block { indent: usize, indicator: bool },
}

struct Emitter {
    out: String,
}

impl Emitter {
    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    /// Writes `value` after `key:`, after `-`, or at the start of the document.
    /// `indent` is the column of the owning key or dash.
    fn node(&mut self, value: &Value, indent: usize, context: Context) -> Result<(), EncodeError> {
        match value {
            Value::Mapping(mapping) if !mapping.is_empty() => match context {
                Context::Root => self.mapping(mapping, indent, false),
                Context::MappingValue => {
                    self.out.push('\n');
                    self.mapping(mapping, indent + INDENT, false)
                }
                Context::SequenceItem => {
                    self.out.push(' ');
                    self.mapping(mapping, indent + INDENT, true)
                }
            },
            Value::Sequence(items) if !items.is_empty() => match context {
                Context::Root => self.sequence(items, indent, false),
                Context::MappingValue => {
                    self.out.push('\n');
                    self.sequence(items, indent, false)
                }
                Context::SequenceItem => {
                    self.out.push(' ');
                    self.sequence(items, indent + INDENT, true)
                }
            },
            Value::Tagged(tagged) if is_block_collection(&tagged.value) => {
                if context != Context::Root {
                    self.out.push(' ');
                }
                self.out.push_str(&tagged.tag.to_string());
                self.out.push('\n');
                match (&tagged.value, context) {
                    (Value::Mapping(mapping), Context::Root) => self.mapping(mapping, indent, false),
                    (Value::Mapping(mapping), _) => self.mapping(mapping, indent + INDENT, false),
                    (Value::Sequence(items), Context::SequenceItem) => {
                        self.sequence(items, indent + INDENT, false)
                    }
                    (Value::Sequence(items), _) => self.sequence(items, indent, false),
                    _ => Ok(()),
                }
            }
            scalar => {
                let context = match context {
                    Context::Root => {
                        ScalarContext::Block {
                            indent: INDENT,
                            indicator: false,
                        }
                    }
                    Context::MappingValue | Context::SequenceItem => {
                        self.out.push(' ');
                        ScalarContext::Block {
                            indent: indent + INDENT,
                            indicator: true,
                        }
                    }
                };
                let text = scalar_text(scalar, context)?;
                self.out.push_str(&text);
                self.out.push('\n');
                Ok(())
            }
        }
    }

    fn mapping(&mut self, mapping: &Mapping, indent: usize, inline_first: bool) -> Result<(), EncodeError> {
        for (position, (key, value)) in mapping.iter().enumerate() {
            if position > 0 || !inline_first {
                self.pad(indent);
            }
            let key = key_text(key)?;
            self.out.push_str(&key);
            self.out.push(':');
            self.node(value, indent, Context::MappingValue)?;
        }
        Ok(())
    }

    fn sequence(&mut self, items: &[Value], indent: usize, inline_first: bool) -> Result<(), EncodeError> {
        for (position, item) in items.iter().enumerate() {
            if position > 0 || !inline_first {
                self.pad(indent);
            }
            self.out.push('-');
            self.node(item, indent, Context::SequenceItem)?;
        }
        Ok(())
    }
}

fn is_block_collection(value: &Value) -> bool {
    match value {
        Value::Mapping(mapping) => !mapping.is_empty(),
        Value::Sequence(items) => !items.is_empty(),
        _ => false,
    }
}

fn key_text(key: &Value) -> Result<String, EncodeError> {
    match key {
        Value::Mapping(_) | Value::Sequence(_) => Err(EncodeError::ComplexKey(describe(key))),
        Value::Tagged(tagged) if matches!(tagged.value, Value::Mapping(_) | Value::Sequence(_)) => {
            Err(EncodeError::ComplexKey(describe(key)))
        }
        scalar => scalar_text(scalar, ScalarContext::Key),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Mapping(_) => "mapping".to_string(),
        Value::Sequence(_) => "sequence".to_string(),
        Value::Tagged(tagged) => format!("{} {}", tagged.tag, describe(&tagged.value)),
        _ => "scalar".to_string(),
    }
}

fn scalar_text(value: &Value, context: ScalarContext) -> Result<String, EncodeError> {
    Ok(match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => string_text(s, context),
        Value::Sequence(items) if items.is_empty() => "[]".to_string(),
        Value::Mapping(mapping) if mapping.is_empty() => "{}".to_string(),
        Value::Tagged(tagged) => tagged_scalar(tagged, context)?,
        collection => return Err(EncodeError::ComplexKey(describe(collection))),
    })
}

fn tagged_scalar(tagged: &TaggedValue, context: ScalarContext) -> Result<String, EncodeError> {
    Ok(format!("{} {}", tagged.tag, scalar_text(&tagged.value, context)?))
}

fn string_text(s: &str, context: ScalarContext) -> String {
    if let ScalarContext::Block { indent, indicator } = context {
        if s.contains('\n') {
            return literal(s, indent, indicator).unwrap_or_else(|| double_quoted(s));
        }
    }

    let analysis = Analysis::of(s);
    if s.is_empty() || analysis.special || analysis.line_breaks || resolves_as_non_string(s) {
        double_quoted(s)
    } else if !analysis.plain_allowed() {
        if analysis.single_quoted_allowed() {
            single_quoted(s)
        } else {
            double_quoted(s)
        }
    } else {
        s.to_string()
    }
}

/// Character-level facts that decide which scalar styles can hold a string.
#[derive(Debug, Default)]
struct Analysis {
    indicators: bool,
    line_breaks: bool,
    special: bool,
    leading_space: bool,
    leading_break: bool,
    trailing_space: bool,
    trailing_break: bool,
    break_space: bool,
    space_break: bool,
}

impl Analysis {
    fn of(s: &str) -> Self {
        let mut analysis = Analysis {
            indicators: s.starts_with("---") || s.starts_with("..."),
            ..Analysis::default()
        };
        let chars: Vec<char> = s.chars().collect();
        let mut preceded_by_whitespace = true;
        let mut previous_space = false;
        let mut previous_break = false;

        for (position, &c) in chars.iter().enumerate() {
            let first = position == 0;
            let last = position + 1 == chars.len();
            let followed_by_whitespace = chars.get(position + 1).map_or(true, |next| is_blank_or_break(*next));

            if first {
                match c {
                    '#' | ',' | '[' | ']' | '{' | '}' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%' | '@' | '`' => {
                        analysis.indicators = true
                    }
                    '?' | ':' | '-' if followed_by_whitespace => analysis.indicators = true,
                    _ => {}
                }
            } else {
                match c {
                    ':' if followed_by_whitespace => analysis.indicators = true,
                    '#' if preceded_by_whitespace => analysis.indicators = true,
                    _ => {}
                }
            }

            if !is_printable(c) {
                analysis.special = true;
            }
            if c == ' ' {
                analysis.leading_space |= first;
                analysis.trailing_space |= last;
                analysis.break_space |= previous_break;
                previous_space = true;
                previous_break = false;
            } else if is_break(c) {
                analysis.line_breaks = true;
                analysis.leading_break |= first;
                analysis.trailing_break |= last;
                analysis.space_break |= previous_space;
                previous_break = true;
                previous_space = false;
            } else {
                previous_space = false;
                previous_break = false;
            }
            preceded_by_whitespace = is_blank_or_break(c);
        }
        analysis
    }

    fn plain_allowed(&self) -> bool {
        !(self.indicators
            || self.leading_space
            || self.leading_break
            || self.trailing_space
            || self.trailing_break
            || self.break_space
            || self.space_break
            || self.line_breaks
            || self.special)
    }

    fn single_quoted_allowed(&self) -> bool {
        !(self.break_space || self.space_break || self.special)
    }

    fn block_allowed(&self) -> bool {
        !(self.trailing_space || self.space_break || self.special)
    }
}

fn is_printable(c: char) -> bool {
    c != '\u{FEFF}'
        && matches!(c as u32, 0x0A | 0x20..=0x7E | 0x85 | 0xA0..=0xD7FF | 0xE000..=0xFFFD | 0x1_0000..=0x10_FFFF)
}

fn is_break(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

fn is_blank_or_break(c: char) -> bool {
    c == ' ' || c == '\t' || is_break(c)
}

const RESERVED: &[&str] = &[
    "y", "Y", "yes", "Yes", "YES", "n", "N", "no", "No", "NO", "true", "True", "TRUE", "false", "False",
    "FALSE", "on", "On", "ON", "off", "Off", "OFF", "~", "null", "Null", "NULL", ".nan", ".NaN", ".NAN",
    ".inf", ".Inf", ".INF", "+.inf", "+.Inf", "+.INF", "-.inf", "-.Inf", "-.INF", "<<",
];

fn timestamp_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{1,2}-[0-9]{1,2}(?:[Tt ]|$)").expect("invalid regex"))
}

fn base60_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[-+]?[0-9][0-9_]*(?::[0-5]?[0-9])+(?:\.[0-9_]*)?$").expect("invalid regex")
    })
}

/// Returns true when a YAML 1.1 reader would resolve the plain text `s` to
/// something other than a string.
fn resolves_as_non_string(s: &str) -> bool {
    if RESERVED.contains(&s) {
        return true;
    }
    if !matches!(s.chars().next(), Some('-' | '+' | '.' | '0'..='9')) {
        return false;
    }
    let plain: String = s.chars().filter(|c| *c != '_').collect();
    parses_as_int(&plain) || plain.parse::<f64>().is_ok() || timestamp_regex().is_match(s) || base60_regex().is_match(s)
}

fn parses_as_int(s: &str) -> bool {
    let unsigned = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (digits, radix) = match unsigned.get(..2) {
        Some("0x" | "0X") => (&unsigned[2..], 16),
        Some("0o" | "0O") => (&unsigned[2..], 8),
        Some("0b" | "0B") => (&unsigned[2..], 2),
        _ => (unsigned, 10),
    };
    !digits.is_empty() && u64::from_str_radix(digits, radix).is_ok()
}

fn single_quoted(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn double_quoted(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        let escape = match c {
            '\0' => "\\0",
            '\u{7}' => "\\a",
            '\u{8}' => "\\b",
            '\t' => "\\t",
            '\n' => "\\n",
            '\u{B}' => "\\v",
            '\u{C}' => "\\f",
            '\r' => "\\r",
            '\u{1B}' => "\\e",
            '"' => "\\\"",
            '\\' => "\\\\",
            '\u{85}' => "\\N",
            '\u{2028}' => "\\L",
            '\u{2029}' => "\\P",
            c if !is_printable(c) => {
                let code = c as u32;
                let escaped = if code <= 0xFF {
                    format!("\\x{:02X}", code)
                } else if code <= 0xFFFF {
                    format!("\\u{:04X}", code)
                } else {
                    format!("\\U{:08X}", code)
                };
                out.push_str(&escaped);
                continue;
            }
            c => {
                out.push(c);
                continue;
            }
        };
        out.push_str(escape);
    }
    out.push('"');
    out
}

/// Literal block scalar with content at column `indent`, or `None` when the
/// text cannot be held by one.
fn literal(s: &str, indent: usize, indicator: bool) -> Option<String> {
    if s.chars().all(|c| c == '\n') || s.contains(['\r', '\u{85}', '\u{2028}', '\u{2029}']) {
        return None;
    }
    if !Analysis::of(s).block_allowed() {
        return None;
    }
    let needs_indicator = s.starts_with([' ', '\n']);
    if needs_indicator && !indicator {
        return None;
    }

    let body = s.strip_suffix('\n');
    let chomp = match body {
        None => "-",
        Some(rest) if rest.ends_with('\n') => "+",
        Some(_) => "",
    };

    let mut out = String::from("|");
    if needs_indicator {
        out.push_str(&INDENT.to_string());
    }
    out.push_str(chomp);
    for line in body.unwrap_or(s).split('\n') {
        out.push('\n');
        if !line.is_empty() {
            out.extend(std::iter::repeat(' ').take(indent));
            out.push_str(line);
        }
    }
    Some(out)
}
