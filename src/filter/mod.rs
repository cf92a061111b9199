//! Filter expression language for selecting map elements by type and tags.
//!
//! Syntax:
//!   nodes, ways, relations        - which element types to select
//!   ... with <tag expression>     - optional tag predicate, e.g.:
//!
//!   key                           - tag exists
//!   !key                          - tag doesn't exist
//!   ~keypattern                   - some key matches the pattern
//!   key = value, key != value     - (in)equality
//!   key ~ pattern, key !~ pattern - value (non-)match
//!   key > 3, key >= 2020-01-01    - numeric / date comparison
//!   older today - 2 years         - element last edited before a date
//!   key older today - 2 years     - key present and not resurveyed since
//!   a and b, a or b, (a or b)     - boolean combinations ("and" binds tighter)
//!
//! Example: `ways with (highway = residential or highway = tertiary) and !name`

mod builder;
mod cursor;
pub mod date;
pub mod error;
pub mod tag_filter;
mod parser;
pub mod tree;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;

use time::{Date, OffsetDateTime};

pub use date::{DateFilter, RelativeDate};
pub use error::{ParseError, ParseErrorKind};
pub use tag_filter::{CompareOp, Pattern, TagFilter};
pub use tree::FilterTree;

/// The three kinds of map element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ElementType {
    Node,
    Way,
    Relation,
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementType::Node => write!(f, "node"),
            ElementType::Way => write!(f, "way"),
            ElementType::Relation => write!(f, "relation"),
        }
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "node" => Ok(ElementType::Node),
            "way" => Ok(ElementType::Way),
            "relation" => Ok(ElementType::Relation),
            _ => Err(format!("invalid element type: {value}")),
        }
    }
}

/// A map element: type, tags, and optionally its last-edit date.
#[derive(Debug, Clone)]
pub struct Element {
    pub element_type: ElementType,
    pub tags: HashMap<String, String>,
    pub date_edited: Option<Date>,
}

impl Element {
    pub fn new(element_type: ElementType, tags: HashMap<String, String>) -> Self {
        Element {
            element_type,
            tags,
            date_edited: None,
        }
    }

    pub fn with_date_edited(mut self, date: Date) -> Self {
        self.date_edited = Some(date);
        self
    }
}

/// Evaluation-time configuration, injected into matching and compilation.
///
/// The resurvey-interval multiplier uniformly scales all relative-date
/// thresholds ("today - 2 years") without changing filter strings. It is
/// owned by the caller's settings layer; this crate only reads it.
#[derive(Debug, Clone)]
pub struct EvalContext {
    pub today: Date,
    pub resurvey_multiplier: f64,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext {
            today: OffsetDateTime::now_utc().date(),
            resurvey_multiplier: 1.0,
        }
    }
}

impl EvalContext {
    pub fn with_resurvey_multiplier(multiplier: f64) -> Self {
        EvalContext {
            resurvey_multiplier: multiplier,
            ..Self::default()
        }
    }
}

/// A parsed filter: the selected element types plus an optional predicate
/// tree. `tree == None` accepts any tags.
///
/// Immutable after construction; matching and compilation take `&self` and
/// allocate only transient state, so sharing across threads is safe.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterExpression {
    pub(crate) element_types: BTreeSet<ElementType>,
    pub(crate) tree: Option<FilterTree>,
}

impl FilterExpression {
    pub fn element_types(&self) -> &BTreeSet<ElementType> {
        &self.element_types
    }

    pub fn tree(&self) -> Option<&FilterTree> {
        self.tree.as_ref()
    }

    pub fn includes_element_type(&self, element_type: ElementType) -> bool {
        self.element_types.contains(&element_type)
    }

    /// Does the element match, under default evaluation settings?
    pub fn matches(&self, element: &Element) -> bool {
        self.matches_with(element, &EvalContext::default())
    }

    /// Does the element match, under the given evaluation settings?
    pub fn matches_with(&self, element: &Element, ctx: &EvalContext) -> bool {
        self.includes_element_type(element.element_type)
            && self
                .tree
                .as_ref()
                .is_none_or(|tree| tree.matches(element, ctx))
    }

    /// Compile to an equivalent Overpass QL fragment.
    pub fn to_overpass_ql(&self) -> String {
        crate::overpass::compile(self, &EvalContext::default())
    }

    /// Compile to Overpass QL, resolving relative dates against `ctx`.
    pub fn to_overpass_ql_with(&self, ctx: &EvalContext) -> String {
        crate::overpass::compile(self, ctx)
    }
}

/// Parse a filter string, e.g. `"ways with highway and !name"`.
pub fn parse(input: &str) -> Result<FilterExpression, ParseError> {
    parser::parse_filter(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn element_type_gates_matching() {
        let e = parse("nodes with highway = traffic_signals").unwrap();
        let t = tags(&[("highway", "traffic_signals")]);
        assert!(e.matches(&Element::new(ElementType::Node, t.clone())));
        assert!(!e.matches(&Element::new(ElementType::Way, t)));
    }

    #[test]
    fn missing_tree_accepts_any_tags() {
        let e = parse("ways").unwrap();
        assert!(e.matches(&Element::new(ElementType::Way, tags(&[]))));
        assert!(e.matches(&Element::new(ElementType::Way, tags(&[("x", "y")]))));
        assert!(!e.matches(&Element::new(ElementType::Node, tags(&[]))));
    }

    #[test]
    fn element_type_from_str() {
        assert_eq!("way".parse::<ElementType>(), Ok(ElementType::Way));
        assert_eq!("NODE".parse::<ElementType>(), Ok(ElementType::Node));
        assert!("ways".parse::<ElementType>().is_err());
    }
}
