//! Incremental construction of a [`FilterTree`] from a left-to-right
//! stream of values, operators, and brackets.
//!
//! The builder keeps an explicit stack of open frames instead of parent
//! pointers in the tree. `and` binds tighter than `or`: an `and` wraps the
//! preceding value into an `AllOf` frame, an `or` closes any open `AllOf`
//! first. Bracket frames are pure grouping and never become tree nodes, so
//! no placeholder can leak into the result.

use super::error::ParseErrorKind;
use super::tag_filter::TagFilter;
use super::tree::FilterTree;

enum Frame {
    /// The root, or an open `(` group.
    Group(Vec<FilterTree>),
    AllOf(Vec<FilterTree>),
    AnyOf(Vec<FilterTree>),
}

impl Frame {
    fn children(&mut self) -> &mut Vec<FilterTree> {
        match self {
            Frame::Group(c) | Frame::AllOf(c) | Frame::AnyOf(c) => c,
        }
    }
}

pub(crate) struct TreeBuilder {
    stack: Vec<Frame>,
    bracket_depth: usize,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            stack: vec![Frame::Group(Vec::new())],
            bracket_depth: 0,
        }
    }

    fn top(&mut self) -> Result<&mut Frame, ParseErrorKind> {
        self.stack
            .last_mut()
            .ok_or(ParseErrorKind::Internal("builder stack is empty"))
    }

    /// Pop the top frame, finalize it to a node, and append that node to
    /// the new top frame. Returns whether the popped frame was a group.
    fn collapse_top(&mut self) -> Result<bool, ParseErrorKind> {
        let frame = self
            .stack
            .pop()
            .ok_or(ParseErrorKind::Internal("builder stack is empty"))?;
        let (node, was_group) = match frame {
            Frame::AllOf(children) => (FilterTree::AllOf(children), false),
            Frame::AnyOf(children) => (FilterTree::AnyOf(children), false),
            Frame::Group(mut children) => {
                let node = children
                    .pop()
                    .ok_or(ParseErrorKind::Internal("empty bracket group"))?;
                if !children.is_empty() {
                    return Err(ParseErrorKind::Internal(
                        "bracket group with unconnected values",
                    ));
                }
                (node, true)
            }
        };
        self.top()?.children().push(node);
        Ok(was_group)
    }

    pub fn add_value(&mut self, filter: TagFilter) -> Result<(), ParseErrorKind> {
        self.top()?.children().push(FilterTree::Leaf(filter));
        Ok(())
    }

    pub fn add_and(&mut self) -> Result<(), ParseErrorKind> {
        if matches!(self.stack.last(), Some(Frame::AllOf(_))) {
            return Ok(());
        }
        let last = self
            .top()?
            .children()
            .pop()
            .ok_or(ParseErrorKind::Internal("'and' without a preceding value"))?;
        self.stack.push(Frame::AllOf(vec![last]));
        Ok(())
    }

    pub fn add_or(&mut self) -> Result<(), ParseErrorKind> {
        if matches!(self.stack.last(), Some(Frame::AnyOf(_))) {
            return Ok(());
        }
        if matches!(self.stack.last(), Some(Frame::AllOf(_))) {
            // Close the tighter-binding AllOf, then join the enclosing
            // AnyOf if there already is one.
            self.collapse_top()?;
            if matches!(self.stack.last(), Some(Frame::AnyOf(_))) {
                return Ok(());
            }
        }
        let last = self
            .top()?
            .children()
            .pop()
            .ok_or(ParseErrorKind::Internal("'or' without a preceding value"))?;
        self.stack.push(Frame::AnyOf(vec![last]));
        Ok(())
    }

    pub fn add_open_bracket(&mut self) {
        self.stack.push(Frame::Group(Vec::new()));
        self.bracket_depth += 1;
    }

    pub fn add_close_bracket(&mut self) -> Result<(), ParseErrorKind> {
        if self.bracket_depth == 0 {
            return Err(ParseErrorKind::UnbalancedBrackets);
        }
        self.bracket_depth -= 1;
        while !self.collapse_top()? {}
        Ok(())
    }

    /// Finish the tree. `None` means no filter (everything matches).
    pub fn build(mut self) -> Result<Option<FilterTree>, ParseErrorKind> {
        if self.bracket_depth != 0 {
            return Err(ParseErrorKind::UnbalancedBrackets);
        }
        while self.stack.len() > 1 {
            self.collapse_top()?;
        }
        let root = self
            .stack
            .pop()
            .ok_or(ParseErrorKind::Internal("builder stack is empty"))?;
        let Frame::Group(mut children) = root else {
            return Err(ParseErrorKind::Internal("root frame is not a group"));
        };
        match children.len() {
            0 => Ok(None),
            1 => Ok(Some(children.pop().unwrap().flatten())),
            _ => Err(ParseErrorKind::Internal("unconnected values at top level")),
        }
    }
}
