//! Forward-only scanner over a normalized filter string.

use regex::Regex;

/// A position in an immutable input string, with peek-and-consume
/// primitives for the parser.
///
/// The position only ever moves forward. Advancing past the end of the
/// input is a bug in the parser, not a user error, and panics.
pub(crate) struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    /// Byte offset into the input.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// The not-yet-consumed remainder of the input.
    pub fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    /// Would the cursor be at the end after advancing `offset` bytes?
    pub fn is_at_end_offset(&self, offset: usize) -> bool {
        self.pos + offset >= self.input.len()
    }

    pub fn next_is(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    pub fn next_is_char(&self, c: char) -> bool {
        self.rest().starts_with(c)
    }

    pub fn next_is_ignore_case(&self, s: &str) -> bool {
        match self.rest().get(..s.len()) {
            Some(head) => head.eq_ignore_ascii_case(s),
            None => false,
        }
    }

    pub fn next_is_and_advance(&mut self, s: &str) -> bool {
        if self.next_is(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub fn next_is_and_advance_char(&mut self, c: char) -> bool {
        if self.next_is_char(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn next_is_and_advance_ignore_case(&mut self, s: &str) -> bool {
        if self.next_is_ignore_case(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Distance in bytes to the next occurrence of `c`, or the remaining
    /// length if it does not occur.
    pub fn find_next_char(&self, c: char) -> usize {
        self.rest().find(c).unwrap_or_else(|| self.rest().len())
    }

    /// Consume and return the next `n` bytes.
    pub fn advance_by(&mut self, n: usize) -> &'a str {
        let consumed = &self.input[self.pos..self.pos + n];
        self.pos += n;
        consumed
    }

    /// Match `re` anchored at the current position, without consuming.
    pub fn next_matches(&self, re: &Regex) -> Option<regex::Match<'a>> {
        re.find(self.rest()).filter(|m| m.start() == 0)
    }

    /// Match `re` anchored at the current position and consume the match.
    pub fn next_matches_and_advance(&mut self, re: &Regex) -> Option<&'a str> {
        let m = self.next_matches(re)?;
        self.pos += m.end();
        Some(m.as_str())
    }
}
