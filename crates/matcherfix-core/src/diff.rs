use matcherfix_canonical::{AnchoredRegex, Duration, InhibitRule, Matcher, Matchers, Route};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::config::{Config, GlobalConfig, Receiver};
use crate::timeinterval::{
    DayOfMonthRange, MonthRange, TimeInterval, TimeIntervalSpec, TimeRange, WeekdayRange,
    YearRange,
};
use crate::value::Value;

const MISSING: &str = "<missing>";
const NONE: &str = "<none>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Field(String),
    Index(usize),
}

/// Location of a field inside a configuration, e.g. `route.routes[1].matchers[0]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path {
    segments: Vec<Segment>,
}

impl Path {
    /// The document root.
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Path of a named field below this one.
    pub fn push_field(&self, field: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Field(field.to_string()));
        Self { segments }
    }

    /// Path of a sequence element below this one.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Index(index));
        Self { segments }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return write!(f, "root");
        }
        for (position, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Field(name) if position == 0 => write!(f, "{}", name)?,
                Segment::Field(name) => write!(f, ".{}", name)?,
                Segment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

/// A single differing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Where the values differ.
    pub path: String,
    /// Value in the first document.
    pub left: String,
    /// Value in the second document.
    pub right: String,
}

impl Difference {
    fn new(path: &Path, left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            left: left.into(),
            right: right.into(),
        }
    }
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} != {}", self.path, self.left, self.right)
    }
}

/// Deep comparison that records every differing path instead of stopping at
/// the first one.
pub trait Diff: fmt::Debug {
    /// Appends to `out` one [`Difference`] per differing leaf below `path`.
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>);

    /// Short rendering used when the value appears in a [`Difference`].
    fn describe(&self) -> String {
        format!("{:?}", self)
    }
}

macro_rules! diff_leaf {
    ($($ty:ty => $describe:expr),* $(,)?) => {
        $(
            impl Diff for $ty {
                fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
                    if self != other {
                        out.push(Difference::new(path, self.describe(), other.describe()));
                    }
                }

                fn describe(&self) -> String {
                    let describe: fn(&$ty) -> String = $describe;
                    describe(self)
                }
            }
        )*
    };
}

diff_leaf!(
    String => |s| format!("{:?}", s),
    bool => |b| b.to_string(),
    Duration => |d| d.to_string(),
    AnchoredRegex => |re| format!("{:?}", re.as_str()),
    Matcher => |m| m.to_string(),
    TimeRange => |t| format!(
        "{:02}:{:02}-{:02}:{:02}",
        t.start_minute / 60,
        t.start_minute % 60,
        t.end_minute / 60,
        t.end_minute % 60
    ),
    WeekdayRange => |r| format!("{}:{}", r.begin, r.end),
    DayOfMonthRange => |r| format!("{}:{}", r.begin, r.end),
    MonthRange => |r| format!("{}:{}", r.begin, r.end),
    YearRange => |r| format!("{}:{}", r.begin, r.end),
);

impl<T: Diff> Diff for Option<T> {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        match (self, other) {
            (Some(left), Some(right)) => left.diff(right, path, out),
            (None, None) => {}
            (Some(left), None) => out.push(Difference::new(path, left.describe(), NONE)),
            (None, Some(right)) => out.push(Difference::new(path, NONE, right.describe())),
        }
    }

    fn describe(&self) -> String {
        self.as_ref().map_or_else(|| NONE.to_string(), Diff::describe)
    }
}

impl<T: Diff> Diff for [T] {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        for index in 0..self.len().max(other.len()) {
            let at = path.push_index(index);
            match (self.get(index), other.get(index)) {
                (Some(left), Some(right)) => left.diff(right, &at, out),
                (Some(left), None) => out.push(Difference::new(&at, left.describe(), MISSING)),
                (None, Some(right)) => out.push(Difference::new(&at, MISSING, right.describe())),
                (None, None) => {}
            }
        }
    }

    fn describe(&self) -> String {
        let items: Vec<String> = self.iter().map(Diff::describe).collect();
        format!("[{}]", items.join(", "))
    }
}

impl<T: Diff> Diff for Vec<T> {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        self.as_slice().diff(other.as_slice(), path, out)
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}

impl<T: Diff> Diff for BTreeMap<String, T> {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        let mut keys: Vec<&String> = self.keys().chain(other.keys()).collect();
        keys.sort();
        keys.dedup();
        for key in keys {
            let at = path.push_field(key);
            match (self.get(key), other.get(key)) {
                (Some(left), Some(right)) => left.diff(right, &at, out),
                (Some(left), None) => out.push(Difference::new(&at, left.describe(), MISSING)),
                (None, Some(right)) => out.push(Difference::new(&at, MISSING, right.describe())),
                (None, None) => {}
            }
        }
    }

    fn describe(&self) -> String {
        let entries: Vec<String> = self
            .iter()
            .map(|(key, value)| format!("{}: {}", key, value.describe()))
            .collect();
        format!("{{{}}}", entries.join(", "))
    }
}

/// Matchers are a sorted set, so they are merged rather than compared by
/// position: a removed matcher is one difference, not a shift of every later
/// index. A matcher whose operator or value changed is reported in place.
impl Diff for Matchers {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        let (left, right) = (self.as_slice(), other.as_slice());
        let (mut i, mut j) = (0, 0);
        while i < left.len() || j < right.len() {
            match (left.get(i), right.get(j)) {
                (Some(l), Some(r)) if l == r => {
                    i += 1;
                    j += 1;
                }
                (Some(l), Some(r)) if l.name == r.name && !right.contains(l) && !left.contains(r) => {
                    out.push(Difference::new(&path.push_index(i), l.describe(), r.describe()));
                    i += 1;
                    j += 1;
                }
                (Some(l), Some(r)) if l.sort_key_cmp(r) == Ordering::Greater => {
                    out.push(Difference::new(&path.push_index(j), MISSING, r.describe()));
                    j += 1;
                }
                (Some(l), _) => {
                    out.push(Difference::new(&path.push_index(i), l.describe(), MISSING));
                    i += 1;
                }
                (None, Some(r)) => {
                    out.push(Difference::new(&path.push_index(j), MISSING, r.describe()));
                    j += 1;
                }
                (None, None) => break,
            }
        }
    }

    fn describe(&self) -> String {
        self.as_slice().describe()
    }
}

impl Diff for Value {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        match (self, other) {
            (Value::Sequence(left), Value::Sequence(right)) => left.diff(right, path, out),
            (Value::Mapping(left), Value::Mapping(right)) => left.diff(right, path, out),
            (Value::Tagged(left_tag, left), Value::Tagged(right_tag, right)) if left_tag == right_tag => {
                left.diff(right, path, out)
            }
            (left, right) if left != right => {
                out.push(Difference::new(path, left.describe(), right.describe()))
            }
            _ => {}
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Implements [`Diff`] for a record by comparing each listed field under its
/// YAML name. `field = "name"` overrides the name.
macro_rules! diff_struct {
    (@name $field:ident $name:literal) => {
        $name
    };
    (@name $field:ident) => {
        stringify!($field)
    };
    ($ty:ty { $($field:ident $(= $name:literal)?),* $(,)? }) => {
        impl Diff for $ty {
            fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
                $(
                    self.$field.diff(
                        &other.$field,
                        &path.push_field(diff_struct!(@name $field $($name)?)),
                        out,
                    );
                )*
            }
        }
    };
}

diff_struct!(Config {
    global,
    route,
    inhibit_rules,
    receivers,
    templates,
    mute_time_intervals,
    time_intervals,
});

diff_struct!(Route {
    receiver,
    group_by,
    match_labels = "match",
    match_re,
    matchers,
    mute_time_intervals,
    active_time_intervals,
    continue_matching = "continue",
    routes,
    group_wait,
    group_interval,
    repeat_interval,
});

diff_struct!(InhibitRule {
    source_match,
    source_match_re,
    source_matchers,
    target_match,
    target_match_re,
    target_matchers,
    equal,
});

diff_struct!(TimeInterval {
    name,
    time_intervals,
});

diff_struct!(TimeIntervalSpec {
    times,
    weekdays,
    days_of_month,
    months,
    years,
    location,
});

impl Diff for GlobalConfig {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        self.resolve_timeout
            .diff(&other.resolve_timeout, &path.push_field("resolve_timeout"), out);
        self.smtp_require_tls
            .diff(&other.smtp_require_tls, &path.push_field("smtp_require_tls"), out);
        // Untyped settings sit directly under `global`.
        self.settings.diff(&other.settings, path, out);
    }
}

impl Diff for Receiver {
    fn diff(&self, other: &Self, path: &Path, out: &mut Vec<Difference>) {
        self.name.diff(&other.name, &path.push_field("name"), out);
        self.integrations.diff(&other.integrations, path, out);
    }

    fn describe(&self) -> String {
        format!("receiver {:?}", self.name)
    }
}
