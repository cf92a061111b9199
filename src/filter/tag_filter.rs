//! Atomic tag predicates: the leaves of a filter expression tree.
//!
//! Each leaf knows two things: whether it matches a given element, and how
//! to render itself as an Overpass QL tag filter. The set of leaf kinds is
//! a closed enum so that both operations are checked exhaustively.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use super::date::{DateFilter, parse_check_date};
use super::{Element, EvalContext};

/// A regex pattern that must match a whole key or value.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Pattern {
            source: source.to_string(),
            regex,
        })
    }

    pub fn matches(&self, s: &str) -> bool {
        self.regex.is_match(s)
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

/// Ordering comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt, // >
    Ge, // >=
    Lt, // <
    Le, // <=
}

impl CompareOp {
    pub fn compare<T: PartialOrd>(self, left: T, right: T) -> bool {
        match self {
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
        }
    }
}

/// An atomic tag predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum TagFilter {
    /// `key` - the tag key is present
    HasKey(String),
    /// `!key` - the tag key is absent
    NotHasKey(String),
    /// `~pattern` - some tag key matches the pattern
    HasKeyLike(Pattern),
    /// `!~pattern` - no tag key matches the pattern
    NotHasKeyLike(Pattern),
    /// `~keypattern ~ valuepattern` - some tag matches both patterns
    HasTagLike { key: Pattern, value: Pattern },
    /// `key = value`
    HasTag { key: String, value: String },
    /// `key != value`
    NotHasTag { key: String, value: String },
    /// `key ~ pattern`
    HasTagValueLike { key: String, value: Pattern },
    /// `key !~ pattern`
    NotHasTagValueLike { key: String, value: Pattern },
    /// `key > n` and friends, tag value parsed as a number
    CompareTagValue {
        key: String,
        op: CompareOp,
        value: f64,
    },
    /// `key > 2020-01-01` and friends, tag value parsed as a check date
    CompareTagDate {
        key: String,
        op: CompareOp,
        date: DateFilter,
    },
    /// `older X` / `newer X` - the element's own last-edit date
    CompareElementAge { newer: bool, date: DateFilter },
    /// The age half of `key older X` / `key newer X`: the newest known
    /// survey date for the key (edit date or check-date tags)
    CompareTagAge {
        key: String,
        newer: bool,
        date: DateFilter,
    },
    /// Conjunction of two leaves, used for `key older X` / `key newer X`
    Combine(Box<TagFilter>, Box<TagFilter>),
}

impl TagFilter {
    /// `key older X` / `key newer X`: key present, and its survey dates
    /// older/newer than the operand.
    pub fn tag_age(key: &str, newer: bool, date: DateFilter) -> TagFilter {
        TagFilter::Combine(
            Box::new(TagFilter::HasKey(key.to_string())),
            Box::new(TagFilter::CompareTagAge {
                key: key.to_string(),
                newer,
                date,
            }),
        )
    }

    /// Does this predicate match the element's tags (and edit date)?
    pub fn matches(&self, element: &Element, ctx: &EvalContext) -> bool {
        let tags = &element.tags;
        match self {
            TagFilter::HasKey(key) => tags.contains_key(key),
            TagFilter::NotHasKey(key) => !tags.contains_key(key),
            TagFilter::HasKeyLike(pattern) => tags.keys().any(|k| pattern.matches(k)),
            TagFilter::NotHasKeyLike(pattern) => !tags.keys().any(|k| pattern.matches(k)),
            TagFilter::HasTagLike { key, value } => tags
                .iter()
                .any(|(k, v)| key.matches(k) && value.matches(v)),
            TagFilter::HasTag { key, value } => tags.get(key).is_some_and(|v| v == value),
            TagFilter::NotHasTag { key, value } => !tags.get(key).is_some_and(|v| v == value),
            TagFilter::HasTagValueLike { key, value } => {
                tags.get(key).is_some_and(|v| value.matches(v))
            }
            TagFilter::NotHasTagValueLike { key, value } => {
                !tags.get(key).is_some_and(|v| value.matches(v))
            }
            TagFilter::CompareTagValue { key, op, value } => tags
                .get(key)
                .and_then(|v| parse_numeric(v))
                .is_some_and(|n| op.compare(n, *value)),
            TagFilter::CompareTagDate { key, op, date } => tags
                .get(key)
                .and_then(|v| parse_check_date(v))
                .is_some_and(|d| op.compare(d, date.date(ctx))),
            TagFilter::CompareElementAge { newer, date } => {
                let target = date.date(ctx);
                element
                    .date_edited
                    .is_some_and(|d| if *newer { d > target } else { d < target })
            }
            TagFilter::CompareTagAge { key, newer, date } => {
                let target = date.date(ctx);
                let dates = survey_dates(element, key);
                if *newer {
                    dates.iter().any(|d| *d > target)
                } else {
                    !dates.is_empty() && dates.iter().all(|d| *d < target)
                }
            }
            TagFilter::Combine(a, b) => a.matches(element, ctx) && b.matches(element, ctx),
        }
    }

    /// Render this predicate as an Overpass QL tag filter.
    ///
    /// Relative dates are resolved against the context at compile time, so
    /// the emitted query is a snapshot of "today".
    pub fn to_overpass_ql(&self, ctx: &EvalContext) -> String {
        match self {
            TagFilter::HasKey(key) => format!("[{}]", quote(key)),
            TagFilter::NotHasKey(key) => format!("[!{}]", quote(key)),
            TagFilter::HasKeyLike(pattern) => {
                format!("[~{} ~ \".*\"]", quote_pattern(pattern))
            }
            TagFilter::NotHasKeyLike(pattern) => {
                format!("[!~{} ~ \".*\"]", quote_pattern(pattern))
            }
            TagFilter::HasTagLike { key, value } => {
                format!("[~{} ~ {}]", quote_pattern(key), quote_pattern(value))
            }
            TagFilter::HasTag { key, value } => format!("[{} = {}]", quote(key), quote(value)),
            TagFilter::NotHasTag { key, value } => {
                format!("[{} != {}]", quote(key), quote(value))
            }
            TagFilter::HasTagValueLike { key, value } => {
                format!("[{} ~ {}]", quote(key), quote_pattern(value))
            }
            TagFilter::NotHasTagValueLike { key, value } => {
                format!("[{} !~ {}]", quote(key), quote_pattern(value))
            }
            TagFilter::CompareTagValue { key, op, value } => {
                format!("[{}](if: number(t[{}]) {} {})", quote(key), tag_ref(key), op, value)
            }
            TagFilter::CompareTagDate { key, op, date } => format!(
                "[{}](if: date(t[{}]) {} date('{}'))",
                quote(key),
                tag_ref(key),
                op,
                date.date(ctx)
            ),
            TagFilter::CompareElementAge { newer, date } => format!(
                "(if: date(timestamp()) {} date('{}'))",
                if *newer { ">" } else { "<" },
                date.date(ctx)
            ),
            TagFilter::CompareTagAge { newer, date, .. } => {
                // The check-date tags are only consulted locally; the
                // remote query approximates with the edit timestamp.
                format!(
                    "(if: date(timestamp()) {} date('{}'))",
                    if *newer { ">" } else { "<" },
                    date.date(ctx)
                )
            }
            TagFilter::Combine(a, b) => {
                format!("{}{}", a.to_overpass_ql(ctx), b.to_overpass_ql(ctx))
            }
        }
    }
}

/// All known survey dates for a key: the element's own edit date plus any
/// parseable `check_date:<key>` / `<key>:check_date` tag.
fn survey_dates(element: &Element, key: &str) -> Vec<time::Date> {
    let mut dates = Vec::new();
    if let Some(d) = element.date_edited {
        dates.push(d);
    }
    for check_key in [format!("check_date:{key}"), format!("{key}:check_date")] {
        if let Some(d) = element.tags.get(&check_key).and_then(|v| parse_check_date(v)) {
            dates.push(d);
        }
    }
    dates
}

/// Parse a tag value as a number, tolerating a trailing unit ("50 mph").
fn parse_numeric(s: &str) -> Option<f64> {
    if let Ok(n) = s.parse::<f64>() {
        return Some(n);
    }
    let numeric_part: String = s
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    numeric_part.parse::<f64>().ok()
}

static UNQUOTED: LazyLock<Regex> = LazyLock::new(|| Regex::new("^[a-zA-Z0-9_]+$").unwrap());

/// Quote a key or value for Overpass QL unless it is a plain identifier.
fn quote(s: &str) -> String {
    if UNQUOTED.is_match(s) {
        s.to_string()
    } else {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    }
}

/// A whole-string-anchored, quoted pattern for `~` filters.
fn quote_pattern(pattern: &Pattern) -> String {
    let anchored = format!("^({})$", pattern.source());
    format!(
        "\"{}\"",
        anchored.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// A `t['key']` reference inside an Overpass `if:` evaluator.
fn tag_ref(key: &str) -> String {
    format!("'{}'", key.replace('\\', "\\\\").replace('\'', "\\'"))
}
