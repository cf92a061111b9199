//! A filter expression language for OSM-style map elements.
//!
//! A filter string such as
//! `"ways with (highway = residential or highway = tertiary) and !name"`
//! is parsed into a predicate tree that can be evaluated in-process against
//! an element's tags, or compiled into an equivalent Overpass QL fragment
//! so the same filter can be pushed down to a server.
//!
//! ```
//! use tagfilter::filter::{parse, Element, ElementType};
//! use std::collections::HashMap;
//!
//! let expr = parse("ways with highway and !name").unwrap();
//! let tags = HashMap::from([("highway".to_string(), "residential".to_string())]);
//! assert!(expr.matches(&Element::new(ElementType::Way, tags)));
//! assert_eq!(expr.to_overpass_ql(), "way[highway][!name];");
//! ```

pub mod config;
pub mod filter;
pub mod overpass;

pub use filter::{
    Element, ElementType, EvalContext, FilterExpression, ParseError, ParseErrorKind, parse,
};
