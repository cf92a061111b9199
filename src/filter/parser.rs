//! Recursive-descent parser for the element filter language.
//!
//! Grammar (after whitespace normalization):
//!
//! filter        = element_types [ "with" tag_expr ]
//! element_types = type ("," type)*              -- no duplicates
//! type          = "nodes" | "ways" | "relations"
//! tag_expr      = ["("] tag (("and" | "or") tag)* [")"] ...
//! tag           = key
//!               | "!" key
//!               | "~" pattern [ "~" pattern ]
//!               | key ("=" | "!=") value
//!               | key ("~" | "!~") pattern
//!               | key (">" | ">=" | "<" | "<=") (number | date)
//!               | [key] ("older" | "newer") date
//! date          = YYYY-MM-DD | "today" [("+"|"-") number ("years"|"months"|"weeks"|"days")]
//!
//! Keys and values may be quoted with `"` or `'` to contain reserved words
//! or special characters; a bare pattern extends to the next whitespace.
//! Operators are matched longest-first. All errors carry the byte offset
//! in the normalized input where they were detected.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use time::Date;
use time::macros::format_description;

use super::builder::TreeBuilder;
use super::cursor::Cursor;
use super::date::{DateFilter, RelativeDate};
use super::error::{ParseError, ParseErrorKind};
use super::tag_filter::{CompareOp, Pattern, TagFilter};
use super::tree::FilterTree;
use super::{ElementType, FilterExpression};

/// Words that need quoting to be used as a tag key.
const RESERVED_WORDS: [&str; 3] = ["with", "and", "or"];

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static TYPE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z]+").unwrap());
static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^[^\s()'"!=~<>,]+"#).unwrap());
static PATTERN_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"^[^\s'"]+"#).unwrap());
static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?").unwrap());
static DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").unwrap());
static TODAY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^today\b").unwrap());
static RELATIVE_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ ?([+-]) ?(\d+(?:\.\d+)?) ?(years?|months?|weeks?|days?)\b").unwrap());
static AGE_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(older|newer)\b").unwrap());
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(or|and)\b").unwrap());
static OPERATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ ?(!=|!~|>=|<=|>|<|=|~|older\b|newer\b)").unwrap());

/// Parse a filter string into a [`FilterExpression`].
pub(crate) fn parse_filter(input: &str) -> Result<FilterExpression, ParseError> {
    let normalized = WHITESPACE.replace_all(input.trim(), " ").into_owned();
    let mut cursor = Cursor::new(&normalized);

    let element_types = parse_element_types(&mut cursor)?;
    let tree = if cursor.is_at_end() {
        None
    } else {
        let pos = cursor.pos();
        if !cursor.next_is_and_advance("with")
            || !(cursor.is_at_end() || cursor.next_is_char(' ') || cursor.next_is_char('('))
        {
            return Err(ParseErrorKind::MalformedTagExpression("expected 'with'".into()).at(pos));
        }
        parse_tag_tree(&mut cursor)?
    };

    Ok(FilterExpression {
        element_types,
        tree,
    })
}

fn parse_element_types(cursor: &mut Cursor) -> Result<BTreeSet<ElementType>, ParseError> {
    let mut types = BTreeSet::new();
    loop {
        cursor.next_is_and_advance_char(' ');
        let pos = cursor.pos();
        let Some((name, element_type)) = parse_element_type(cursor) else {
            let word = cursor
                .next_matches(&TYPE_WORD)
                .map_or(String::new(), |m| m.as_str().to_string());
            return Err(ParseErrorKind::UnknownElementType(word).at(pos));
        };
        if !types.insert(element_type) {
            return Err(ParseErrorKind::DuplicateElementType(name.to_string()).at(pos));
        }
        cursor.next_is_and_advance_char(' ');
        if !cursor.next_is_and_advance_char(',') {
            break;
        }
    }
    Ok(types)
}

fn parse_element_type(cursor: &mut Cursor) -> Option<(&'static str, ElementType)> {
    const NAMES: [(&str, ElementType); 3] = [
        ("nodes", ElementType::Node),
        ("ways", ElementType::Way),
        ("relations", ElementType::Relation),
    ];
    for (name, element_type) in NAMES {
        if !cursor.next_is_ignore_case(name) {
            continue;
        }
        let at_word_boundary = cursor.is_at_end_offset(name.len())
            || cursor.rest()[name.len()..].starts_with([' ', ',']);
        if at_word_boundary {
            cursor.next_is_and_advance_ignore_case(name);
            return Some((name, element_type));
        }
    }
    None
}

/// Parse the tag expression after "with", driving the tree builder.
fn parse_tag_tree(cursor: &mut Cursor) -> Result<Option<FilterTree>, ParseError> {
    let mut builder = TreeBuilder::new();
    loop {
        cursor.next_is_and_advance_char(' ');
        while cursor.next_is_and_advance_char('(') {
            builder.add_open_bracket();
            cursor.next_is_and_advance_char(' ');
        }

        let filter = parse_tag_filter(cursor)?;
        builder.add_value(filter).map_err(|k| k.at(cursor.pos()))?;

        let mut separated = cursor.next_is_and_advance_char(' ');
        loop {
            let pos = cursor.pos();
            if !cursor.next_is_and_advance_char(')') {
                break;
            }
            builder.add_close_bracket().map_err(|k| k.at(pos))?;
            separated = cursor.next_is_and_advance_char(' ') || separated;
        }

        if cursor.is_at_end() {
            break;
        }
        let pos = cursor.pos();
        if !separated {
            return Err(
                ParseErrorKind::MalformedTagExpression("expected whitespace".into()).at(pos),
            );
        }
        match cursor.next_matches_and_advance(&SEPARATOR) {
            Some("and") => builder.add_and().map_err(|k| k.at(pos))?,
            Some("or") => builder.add_or().map_err(|k| k.at(pos))?,
            _ => {
                return Err(
                    ParseErrorKind::MalformedTagExpression("expected 'and' or 'or'".into())
                        .at(pos),
                );
            }
        }
    }
    builder.build().map_err(|k| k.at(cursor.pos()))
}

fn parse_tag_filter(cursor: &mut Cursor) -> Result<TagFilter, ParseError> {
    // Element age: "older <date>" / "newer <date>"
    if let Some(word) = cursor.next_matches_and_advance(&AGE_WORD) {
        let newer = word == "newer";
        cursor.next_is_and_advance_char(' ');
        let date = parse_date(cursor)?;
        return Ok(TagFilter::CompareElementAge { newer, date });
    }

    if cursor.next_is_and_advance_char('!') {
        cursor.next_is_and_advance_char(' ');
        if cursor.next_is_and_advance_char('~') {
            cursor.next_is_and_advance_char(' ');
            let pattern = parse_pattern(cursor)?;
            return Ok(TagFilter::NotHasKeyLike(pattern));
        }
        let key = parse_key(cursor)?;
        return Ok(TagFilter::NotHasKey(key));
    }

    if cursor.next_is_and_advance_char('~') {
        cursor.next_is_and_advance_char(' ');
        let key = parse_pattern(cursor)?;
        if let Some((op, op_pos)) = parse_operator(cursor) {
            // A key pattern only pairs with the binary "~"
            if op != "~" {
                return Err(ParseErrorKind::InvalidOperator(op).at(op_pos));
            }
            cursor.next_is_and_advance_char(' ');
            let value = parse_pattern(cursor)?;
            return Ok(TagFilter::HasTagLike { key, value });
        }
        return Ok(TagFilter::HasKeyLike(key));
    }

    let key = parse_key(cursor)?;
    let Some((op, op_pos)) = parse_operator(cursor) else {
        return Ok(TagFilter::HasKey(key));
    };
    cursor.next_is_and_advance_char(' ');

    match op.as_str() {
        "=" => {
            let value = parse_value(cursor)?;
            Ok(TagFilter::HasTag { key, value })
        }
        "!=" => {
            let value = parse_value(cursor)?;
            Ok(TagFilter::NotHasTag { key, value })
        }
        "~" => {
            let value = parse_pattern(cursor)?;
            Ok(TagFilter::HasTagValueLike { key, value })
        }
        "!~" => {
            let value = parse_pattern(cursor)?;
            Ok(TagFilter::NotHasTagValueLike { key, value })
        }
        "older" | "newer" => {
            let date = parse_date(cursor)?;
            Ok(TagFilter::tag_age(&key, op == "newer", date))
        }
        ">" | ">=" | "<" | "<=" => {
            let compare_op = match op.as_str() {
                ">" => CompareOp::Gt,
                ">=" => CompareOp::Ge,
                "<" => CompareOp::Lt,
                _ => CompareOp::Le,
            };
            if cursor.next_matches(&TODAY).is_some() || cursor.next_matches(&DATE).is_some() {
                let date = parse_date(cursor)?;
                Ok(TagFilter::CompareTagDate {
                    key,
                    op: compare_op,
                    date,
                })
            } else {
                let pos = cursor.pos();
                let Some(number) = cursor.next_matches_and_advance(&NUMBER) else {
                    return Err(ParseErrorKind::InvalidNumber.at(pos));
                };
                let value = number
                    .parse::<f64>()
                    .map_err(|_| ParseErrorKind::InvalidNumber.at(pos))?;
                Ok(TagFilter::CompareTagValue {
                    key,
                    op: compare_op,
                    value,
                })
            }
        }
        other => Err(ParseErrorKind::InvalidOperator(other.into()).at(op_pos)),
    }
}

/// Consume a comparison operator if one follows, longest-first.
fn parse_operator(cursor: &mut Cursor) -> Option<(String, usize)> {
    let matched = cursor.next_matches(&OPERATOR)?;
    let whole = matched.as_str();
    let op = whole.trim_start();
    let pos = cursor.pos() + (whole.len() - op.len());
    let op = op.to_string();
    cursor.advance_by(whole.len());
    Some((op, pos))
}

fn parse_key(cursor: &mut Cursor) -> Result<String, ParseError> {
    let pos = cursor.pos();
    let Some((key, quoted)) = parse_quoted_or_word(cursor)? else {
        let kind = if cursor.is_at_end() {
            ParseErrorKind::MalformedTagExpression("expected a tag filter".into())
        } else {
            ParseErrorKind::DanglingOperator
        };
        return Err(kind.at(pos));
    };
    if !quoted && RESERVED_WORDS.contains(&key.as_str()) {
        return Err(ParseErrorKind::ReservedWord(key).at(pos));
    }
    Ok(key)
}

fn parse_value(cursor: &mut Cursor) -> Result<String, ParseError> {
    let pos = cursor.pos();
    match parse_quoted_or_word(cursor)? {
        Some((value, _)) => Ok(value),
        None => Err(ParseErrorKind::DanglingOperator.at(pos)),
    }
}

/// A regex pattern operand. Unlike keys and values, a bare pattern may
/// contain regex metacharacters and extends to the next whitespace.
/// Trailing close brackets with no matching open inside the token belong
/// to the surrounding expression, not the pattern.
fn parse_pattern(cursor: &mut Cursor) -> Result<Pattern, ParseError> {
    let pos = cursor.pos();
    let source = if cursor.next_is_char('"') || cursor.next_is_char('\'') {
        match parse_quoted_or_word(cursor)? {
            Some((source, _)) => source,
            None => return Err(ParseErrorKind::DanglingOperator.at(pos)),
        }
    } else {
        let Some(matched) = cursor.next_matches(&PATTERN_WORD) else {
            return Err(ParseErrorKind::DanglingOperator.at(pos));
        };
        let length = pattern_token_len(matched.as_str());
        if length == 0 {
            return Err(ParseErrorKind::DanglingOperator.at(pos));
        }
        cursor.advance_by(length).to_string()
    };
    Pattern::new(&source).map_err(|e| ParseErrorKind::InvalidRegex(e.to_string()).at(pos))
}

/// Length of `token` after stripping trailing `)` characters that have no
/// matching `(` within the token.
fn pattern_token_len(token: &str) -> usize {
    let mut token = token;
    while token.ends_with(')') {
        let opens = token.matches('(').count();
        let closes = token.matches(')').count();
        if closes <= opens {
            break;
        }
        token = &token[..token.len() - 1];
    }
    token.len()
}

/// A quoted string (single or double quotes, quotes stripped) or a bare
/// word up to the next special character. Returns the word and whether it
/// was quoted.
fn parse_quoted_or_word(cursor: &mut Cursor) -> Result<Option<(String, bool)>, ParseError> {
    for quote in ['"', '\''] {
        if !cursor.next_is_char(quote) {
            continue;
        }
        let quote_pos = cursor.pos();
        cursor.next_is_and_advance_char(quote);
        let length = cursor.find_next_char(quote);
        if length == cursor.rest().len() {
            return Err(ParseErrorKind::UnterminatedQuotation.at(quote_pos));
        }
        let word = cursor.advance_by(length).to_string();
        cursor.advance_by(quote.len_utf8());
        return Ok(Some((word, true)));
    }
    Ok(cursor
        .next_matches_and_advance(&WORD)
        .map(|w| (w.to_string(), false)))
}

fn parse_date(cursor: &mut Cursor) -> Result<DateFilter, ParseError> {
    let pos = cursor.pos();
    if cursor.next_matches_and_advance(&TODAY).is_some() {
        if let Some(caps) = RELATIVE_TAIL.captures(cursor.rest()) {
            let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
            let amount: f64 = caps[2]
                .parse()
                .map_err(|_| ParseErrorKind::InvalidNumber.at(pos))?;
            let unit_days = match &caps[3] {
                unit if unit.starts_with("year") => 365.25,
                unit if unit.starts_with("month") => 30.44,
                unit if unit.starts_with("week") => 7.0,
                _ => 1.0,
            };
            let consumed = caps.get(0).map_or(0, |m| m.end());
            cursor.advance_by(consumed);
            return Ok(DateFilter::Relative(RelativeDate::new(
                sign * amount * unit_days,
            )));
        }
        return Ok(DateFilter::Relative(RelativeDate::new(0.0)));
    }
    let Some(matched) = cursor.next_matches(&DATE) else {
        return Err(ParseErrorKind::InvalidDate.at(pos));
    };
    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(matched.as_str(), &format)
        .map_err(|_| ParseErrorKind::InvalidDate.at(pos))?;
    cursor.advance_by(matched.end());
    Ok(DateFilter::Fixed(date))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tag_filter::TagFilter::*;

    fn tree_of(input: &str) -> FilterTree {
        parse_filter(input).unwrap().tree.unwrap()
    }

    fn leaf(filter: TagFilter) -> FilterTree {
        FilterTree::Leaf(filter)
    }

    #[test]
    fn element_types_only() {
        let e = parse_filter("ways").unwrap();
        assert!(e.tree.is_none());
        assert!(e.includes_element_type(ElementType::Way));
        assert!(!e.includes_element_type(ElementType::Node));
    }

    #[test]
    fn multiple_element_types() {
        let e = parse_filter("nodes, ways, relations").unwrap();
        assert!(e.includes_element_type(ElementType::Node));
        assert!(e.includes_element_type(ElementType::Way));
        assert!(e.includes_element_type(ElementType::Relation));
    }

    #[test]
    fn element_types_are_case_insensitive() {
        let e = parse_filter("Nodes, WAYS").unwrap();
        assert!(e.includes_element_type(ElementType::Node));
        assert!(e.includes_element_type(ElementType::Way));
    }

    #[test]
    fn unknown_element_type() {
        let err = parse_filter("houses").unwrap_err();
        assert_eq!(err.offset, 0);
        assert_eq!(
            err.kind,
            ParseErrorKind::UnknownElementType("houses".into())
        );
    }

    #[test]
    fn duplicate_element_type() {
        let err = parse_filter("ways, ways").unwrap_err();
        assert_eq!(err.offset, 6);
        assert_eq!(err.kind, ParseErrorKind::DuplicateElementType("ways".into()));
    }

    #[test]
    fn simple_key() {
        assert_eq!(tree_of("ways with highway"), leaf(HasKey("highway".into())));
    }

    #[test]
    fn negated_key() {
        assert_eq!(tree_of("ways with !name"), leaf(NotHasKey("name".into())));
    }

    #[test]
    fn key_value() {
        assert_eq!(
            tree_of("ways with highway = residential"),
            leaf(HasTag {
                key: "highway".into(),
                value: "residential".into(),
            })
        );
        // spaces around "=" are optional
        assert_eq!(
            tree_of("ways with highway=residential"),
            tree_of("ways with highway = residential")
        );
    }

    #[test]
    fn quoted_key_and_value() {
        assert_eq!(
            tree_of("ways with \"name:etymology\" = 'Ada Lovelace'"),
            leaf(HasTag {
                key: "name:etymology".into(),
                value: "Ada Lovelace".into(),
            })
        );
    }

    #[test]
    fn quoting_allows_reserved_words() {
        assert_eq!(tree_of("ways with 'with'"), leaf(HasKey("with".into())));
        let err = parse_filter("ways with with").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::ReservedWord("with".into()));
        assert_eq!(err.offset, 10);
    }

    #[test]
    fn key_like_and_tag_like() {
        assert_eq!(
            tree_of("ways with ~name(:.*)?"),
            leaf(HasKeyLike(Pattern::new("name(:.*)?").unwrap()))
        );
        assert_eq!(
            tree_of("ways with ~roof:.* ~ gabled"),
            leaf(HasTagLike {
                key: Pattern::new("roof:.*").unwrap(),
                value: Pattern::new("gabled").unwrap(),
            })
        );
        assert_eq!(
            tree_of("ways with !~source:.*"),
            leaf(NotHasKeyLike(Pattern::new("source:.*").unwrap()))
        );
    }

    #[test]
    fn bare_patterns_may_contain_metacharacters() {
        // The crate-internal word token class stops at "(", but a bare
        // pattern runs to the next whitespace
        assert_eq!(
            tree_of("nodes with ~name(:.+)?"),
            leaf(HasKeyLike(Pattern::new("name(:.+)?").unwrap()))
        );
        assert_eq!(
            tree_of("ways with highway ~ primary(_link)?"),
            leaf(HasTagValueLike {
                key: "highway".into(),
                value: Pattern::new("primary(_link)?").unwrap(),
            })
        );
    }

    #[test]
    fn bare_pattern_yields_unmatched_close_bracket_to_the_expression() {
        assert_eq!(
            tree_of("ways with (~name(:.*)? or ref)"),
            FilterTree::AnyOf(vec![
                leaf(HasKeyLike(Pattern::new("name(:.*)?").unwrap())),
                leaf(HasKey("ref".into())),
            ])
        );
        assert_eq!(
            tree_of("ways with (highway ~ .*_link)"),
            leaf(HasTagValueLike {
                key: "highway".into(),
                value: Pattern::new(".*_link").unwrap(),
            })
        );
    }

    #[test]
    fn key_pattern_rejects_other_operators() {
        let err = parse_filter("ways with ~highway = residential").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidOperator("=".into()));
    }

    #[test]
    fn value_patterns() {
        assert_eq!(
            tree_of("ways with highway ~ primary|secondary"),
            leaf(HasTagValueLike {
                key: "highway".into(),
                value: Pattern::new("primary|secondary").unwrap(),
            })
        );
        assert_eq!(
            tree_of("ways with surface !~ .*paved"),
            leaf(NotHasTagValueLike {
                key: "surface".into(),
                value: Pattern::new(".*paved").unwrap(),
            })
        );
    }

    #[test]
    fn numeric_comparisons() {
        assert_eq!(
            tree_of("ways with lanes >= 2"),
            leaf(CompareTagValue {
                key: "lanes".into(),
                op: CompareOp::Ge,
                value: 2.0,
            })
        );
        assert_eq!(
            tree_of("ways with width < 2.5"),
            leaf(CompareTagValue {
                key: "width".into(),
                op: CompareOp::Lt,
                value: 2.5,
            })
        );
    }

    #[test]
    fn invalid_number() {
        let err = parse_filter("ways with lanes > x").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidNumber);
        assert_eq!(err.offset, 18);
    }

    #[test]
    fn date_comparisons() {
        use time::macros::date;
        assert_eq!(
            tree_of("nodes with check_date < 2024-05-01"),
            leaf(CompareTagDate {
                key: "check_date".into(),
                op: CompareOp::Lt,
                date: DateFilter::Fixed(date!(2024 - 05 - 01)),
            })
        );
    }

    #[test]
    fn relative_dates() {
        assert_eq!(
            tree_of("nodes with older today - 2 years"),
            leaf(CompareElementAge {
                newer: false,
                date: DateFilter::Relative(RelativeDate::new(-2.0 * 365.25)),
            })
        );
        assert_eq!(
            tree_of("nodes with newer today"),
            leaf(CompareElementAge {
                newer: true,
                date: DateFilter::Relative(RelativeDate::new(0.0)),
            })
        );
        assert_eq!(
            tree_of("nodes with older today -3 weeks"),
            leaf(CompareElementAge {
                newer: false,
                date: DateFilter::Relative(RelativeDate::new(-21.0)),
            })
        );
    }

    #[test]
    fn invalid_date() {
        let err = parse_filter("nodes with check_date < 2024-13-01").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate);
        assert_eq!(err.offset, 24);
        let err = parse_filter("nodes with older soon").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDate);
    }

    #[test]
    fn tag_age_is_key_presence_plus_age() {
        use time::macros::date;
        let expected = TagFilter::tag_age(
            "surface",
            false,
            DateFilter::Fixed(date!(2024 - 01 - 01)),
        );
        assert_eq!(tree_of("ways with surface older 2024-01-01"), leaf(expected));
    }

    #[test]
    fn precedence_and_over_or() {
        let tree = tree_of("ways with a = 1 and b = 2 or c = 3");
        let FilterTree::AnyOf(children) = &tree else {
            panic!("expected AnyOf at root, got {tree:?}");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], FilterTree::AllOf(_)));
        assert!(matches!(children[1], FilterTree::Leaf(_)));
    }

    #[test]
    fn brackets_override_precedence() {
        let tree = tree_of("ways with (a = 1 or b = 2) and c = 3");
        let FilterTree::AllOf(children) = &tree else {
            panic!("expected AllOf at root, got {tree:?}");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], FilterTree::AnyOf(_)));
    }

    #[test]
    fn deeply_nested_brackets() {
        assert_eq!(
            tree_of("ways with ((a and (b or (c))))"),
            FilterTree::AllOf(vec![
                leaf(HasKey("a".into())),
                FilterTree::AnyOf(vec![leaf(HasKey("b".into())), leaf(HasKey("c".into()))]),
            ])
        );
    }

    #[test]
    fn whitespace_runs_are_normalized() {
        assert_eq!(
            tree_of("ways \t with \n highway   =  residential"),
            tree_of("ways with highway = residential")
        );
    }

    #[test]
    fn missing_tag_after_with() {
        let err = parse_filter("ways with").unwrap_err();
        assert_eq!(err.offset, 9);
        assert!(matches!(
            err.kind,
            ParseErrorKind::MalformedTagExpression(_)
        ));
    }

    #[test]
    fn unbalanced_open_bracket() {
        let err = parse_filter("ways with (a=1").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedBrackets);
        assert_eq!(err.offset, 14);
    }

    #[test]
    fn unbalanced_close_bracket() {
        let err = parse_filter("ways with a=1)").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnbalancedBrackets);
        assert_eq!(err.offset, 13);
    }

    #[test]
    fn unterminated_quotation() {
        let err = parse_filter("ways with \"name").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnterminatedQuotation);
        assert_eq!(err.offset, 10);
    }

    #[test]
    fn dangling_operator() {
        let err = parse_filter("ways with name =").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::DanglingOperator);
        assert_eq!(err.offset, 16);
    }

    #[test]
    fn trailing_garbage_after_tag() {
        let err = parse_filter("ways with a = 1 b = 2").unwrap_err();
        assert!(matches!(
            err.kind,
            ParseErrorKind::MalformedTagExpression(_)
        ));
        assert_eq!(err.offset, 16);
    }

    #[test]
    fn invalid_regex_reported_with_position() {
        let err = parse_filter("ways with ~'('").unwrap_err();
        assert!(matches!(err.kind, ParseErrorKind::InvalidRegex(_)));
        assert_eq!(err.offset, 11);
    }
}
