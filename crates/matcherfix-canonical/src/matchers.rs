use crate::pattern::AnchoredRegex;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt::{self, Write as _};
use std::sync::OnceLock;
use thiserror::Error;

/// Errors raised while parsing matcher expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
    /// The text is not of the form `label<op>value`.
    #[error("bad matcher format: {0}")]
    BadFormat(String),
    /// A double quote appears somewhere other than around the value.
    #[error("matcher value contains unescaped double quote: {0}")]
    UnescapedQuote(String),
    /// The value of a regex matcher does not compile.
    #[error("invalid regular expression {value:?}: {reason}")]
    InvalidRegex {
        /// Offending value.
        value: String,
        /// Compiler message.
        reason: String,
    },
}

/// Matcher operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchType {
    /// `=`
    Equal,
    /// `!=`
    NotEqual,
    /// `=~`
    Regexp,
    /// `!~`
    NotRegexp,
}

impl MatchType {
    /// Returns the operator as written in a matcher expression.
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Equal => "=",
            MatchType::NotEqual => "!=",
            MatchType::Regexp => "=~",
            MatchType::NotRegexp => "!~",
        }
    }

    /// Returns true for `=~` and `!~`.
    pub fn is_regex(self) -> bool {
        matches!(self, MatchType::Regexp | MatchType::NotRegexp)
    }

    fn from_operator(op: &str) -> Option<Self> {
        match op {
            "=" => Some(MatchType::Equal),
            "!=" => Some(MatchType::NotEqual),
            "=~" => Some(MatchType::Regexp),
            "!~" => Some(MatchType::NotRegexp),
            _ => None,
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single `(label, operator, value)` condition.
///
/// The value is stored unescaped. `Display` renders the canonical spelling,
/// with the value always double-quoted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Matcher {
    /// Label name.
    pub name: String,
    /// Operator.
    pub op: MatchType,
    /// Unescaped value.
    pub value: String,
}

impl Matcher {
    /// Builds a matcher, compiling the value when the operator is a regex one.
    pub fn new(
        name: impl Into<String>,
        op: MatchType,
        value: impl Into<String>,
    ) -> Result<Self, MatcherError> {
        let value = value.into();
        if op.is_regex() {
            AnchoredRegex::new(value.as_str()).map_err(|err| MatcherError::InvalidRegex {
                value: value.clone(),
                reason: err.to_string(),
            })?;
        }
        Ok(Self {
            name: name.into(),
            op,
            value,
        })
    }

    /// Order used by [`Matchers`]: label name, then value, with equality
    /// operators ahead of regex ones.
    pub fn sort_key_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.value.cmp(&other.value))
            .then_with(|| self.op.is_regex().cmp(&other.op.is_regex()))
            .then_with(|| self.op.as_str().cmp(other.op.as_str()))
    }
}

impl fmt::Display for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}\"", self.name, self.op)?;
        for c in self.value.chars() {
            match c {
                '\\' => f.write_str(r"\\")?,
                '\n' => f.write_str(r"\n")?,
                '"' => f.write_str("\\\"")?,
                _ => f.write_char(c)?,
            }
        }
        f.write_char('"')
    }
}

fn matcher_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^[\t\n\f\r ]*([a-zA-Z_:][a-zA-Z0-9_:]*)[\t\n\f\r ]*(=~|=|!=|!~)[\t\n\f\r ]*((?s).*?)[\t\n\f\r ]*$",
        )
        .expect("invalid regex")
    })
}

/// Parses a comma-separated list of matchers, optionally wrapped in braces.
///
/// Values may be quoted or bare: `foo=bar`, `foo="bar"` and `{foo="bar"}`
/// all yield the same matcher.
pub fn parse_matchers(input: &str) -> Result<Vec<Matcher>, MatcherError> {
    let s = input.strip_prefix('{').unwrap_or(input);
    let s = s.strip_suffix('}').unwrap_or(s);

    let mut tokens = Vec::new();
    let mut token = String::new();
    let mut inside_quotes = false;
    let mut escaped = false;
    for c in s.chars() {
        match c {
            ',' if !inside_quotes => {
                tokens.push(std::mem::take(&mut token));
                continue;
            }
            ',' => {}
            '"' => {
                if escaped {
                    escaped = false;
                } else {
                    inside_quotes = !inside_quotes;
                }
            }
            '\\' => escaped = !escaped,
            _ => escaped = false,
        }
        token.push(c);
    }
    let last = token.trim();
    if !last.is_empty() {
        tokens.push(last.to_string());
    }

    tokens.iter().map(|token| parse_matcher(token)).collect()
}

/// Parses exactly one matcher expression.
pub fn parse_matcher(input: &str) -> Result<Matcher, MatcherError> {
    let caps = matcher_pattern()
        .captures(input)
        .ok_or_else(|| MatcherError::BadFormat(input.to_string()))?;
    let raw = &caps[3];
    let op = MatchType::from_operator(&caps[2])
        .ok_or_else(|| MatcherError::BadFormat(input.to_string()))?;

    let (body, mut expect_trailing_quote) = match raw.strip_prefix('"') {
        Some(rest) => (rest, true),
        None => (raw, false),
    };

    let mut value = String::with_capacity(body.len());
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        let is_last = i + c.len_utf8() == body.len();
        if escaped {
            escaped = false;
            match c {
                'n' => value.push('\n'),
                '"' | '\\' => value.push(c),
                // Unknown escapes are kept verbatim, so `\w` stays `\w`.
                _ => {
                    value.push('\\');
                    value.push(c);
                }
            }
            continue;
        }
        match c {
            '\\' if !is_last => escaped = true,
            '\\' => value.push('\\'),
            '"' => {
                if !expect_trailing_quote || !is_last {
                    return Err(MatcherError::UnescapedQuote(raw.to_string()));
                }
                expect_trailing_quote = false;
            }
            _ => value.push(c),
        }
    }
    if expect_trailing_quote {
        return Err(MatcherError::UnescapedQuote(raw.to_string()));
    }

    Matcher::new(&caps[1], op, value)
}

/// Sorted list of matchers as found in `matchers`, `source_matchers` and
/// `target_matchers` fields.
///
/// Decodes from a sequence of strings, each of which may hold several
/// comma-separated matchers. Encodes as one canonical string per matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Matchers(Vec<Matcher>);

impl Matchers {
    /// Sorts by label name, then value, with equality operators ahead of regex ones.
    pub fn new(mut matchers: Vec<Matcher>) -> Self {
        matchers.sort_by(Matcher::sort_key_cmp);
        Self(matchers)
    }

    /// Returns true when there are no matchers.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of matchers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Matchers in sorted order.
    pub fn as_slice(&self) -> &[Matcher] {
        &self.0
    }

    /// Iterates over the matchers in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, Matcher> {
        self.0.iter()
    }
}

impl FromIterator<Matcher> for Matchers {
    fn from_iter<I: IntoIterator<Item = Matcher>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl Serialize for Matchers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter().map(Matcher::to_string))
    }
}

impl<'de> Deserialize<'de> for Matchers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let lines = Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default();
        let mut matchers = Vec::with_capacity(lines.len());
        for line in &lines {
            matchers.extend(parse_matchers(line).map_err(serde::de::Error::custom)?);
        }
        Ok(Self::new(matchers))
    }
}
