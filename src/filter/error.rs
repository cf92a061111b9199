//! Parse errors for the filter language.

/// A parse failure, positioned at a character offset in the normalized
/// (whitespace-collapsed) input string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at position {offset}")]
pub struct ParseError {
    pub offset: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(offset: usize, kind: ParseErrorKind) -> Self {
        ParseError { offset, kind }
    }
}

/// What went wrong.
///
/// All variants except `Internal` describe malformed user input.
/// `Internal` signals a violated builder invariant, i.e. a bug in this
/// crate rather than a bad filter string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("unknown element type '{0}'")]
    UnknownElementType(String),
    #[error("duplicate element type '{0}'")]
    DuplicateElementType(String),
    #[error("{0}")]
    MalformedTagExpression(String),
    #[error("operator is missing its key or value")]
    DanglingOperator,
    #[error("unterminated quotation")]
    UnterminatedQuotation,
    #[error("unbalanced brackets")]
    UnbalancedBrackets,
    #[error("invalid operator '{0}'")]
    InvalidOperator(String),
    #[error("invalid number")]
    InvalidNumber,
    #[error("invalid date")]
    InvalidDate,
    #[error("invalid regex: {0}")]
    InvalidRegex(String),
    #[error("reserved word '{0}' must be quoted to be used as a key")]
    ReservedWord(String),
    #[error("internal parser invariant violated: {0}")]
    Internal(&'static str),
}

impl ParseErrorKind {
    pub(crate) fn at(self, offset: usize) -> ParseError {
        ParseError::new(offset, self)
    }
}

impl ParseError {
    /// Render the error with a caret line pointing at the offending
    /// position, for CLI display.
    pub fn display_with_input(&self, input: &str) -> String {
        let mut out = String::new();
        out.push_str(input);
        out.push('\n');
        out.push_str(&" ".repeat(self.offset.min(input.len())));
        out.push_str("^ ");
        out.push_str(&self.kind.to_string());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caret_points_at_offset() {
        let err = ParseError::new(5, ParseErrorKind::InvalidNumber);
        let rendered = err.display_with_input("a > x");
        assert!(rendered.starts_with("a > x\n"));
        assert!(rendered.contains("^ invalid number"));
    }
}
