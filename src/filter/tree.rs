//! The boolean expression tree over tag predicates.

use super::tag_filter::TagFilter;
use super::{Element, EvalContext};

/// A filter expression tree. `AllOf` is conjunction, `AnyOf` disjunction.
///
/// After [`FilterTree::flatten`] no node has exactly one child and no node
/// has a direct child of its own variant, so a given boolean structure has
/// exactly one tree shape. Children are exclusively owned; the tree never
/// shares subtrees.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterTree {
    Leaf(TagFilter),
    AllOf(Vec<FilterTree>),
    AnyOf(Vec<FilterTree>),
}

impl FilterTree {
    /// Pure recursive fold: AND over `AllOf` children, OR over `AnyOf`.
    pub fn matches(&self, element: &Element, ctx: &EvalContext) -> bool {
        match self {
            FilterTree::Leaf(filter) => filter.matches(element, ctx),
            FilterTree::AllOf(children) => children.iter().all(|c| c.matches(element, ctx)),
            FilterTree::AnyOf(children) => children.iter().any(|c| c.matches(element, ctx)),
        }
    }

    /// Normalize the tree: replace single-child chains by their child and
    /// splice same-variant children into their parent, depth-first.
    pub fn flatten(self) -> FilterTree {
        match self {
            FilterTree::AllOf(children) => {
                let mut flat = Vec::with_capacity(children.len());
                for child in children {
                    match child.flatten() {
                        FilterTree::AllOf(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                match flat.len() {
                    1 => flat.pop().unwrap(),
                    _ => FilterTree::AllOf(flat),
                }
            }
            FilterTree::AnyOf(children) => {
                let mut flat = Vec::with_capacity(children.len());
                for child in children {
                    match child.flatten() {
                        FilterTree::AnyOf(inner) => flat.extend(inner),
                        other => flat.push(other),
                    }
                }
                match flat.len() {
                    1 => flat.pop().unwrap(),
                    _ => FilterTree::AnyOf(flat),
                }
            }
            leaf => leaf,
        }
    }
}
