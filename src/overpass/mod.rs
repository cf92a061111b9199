//! Compile a [`FilterExpression`] into equivalent Overpass QL statements.
//!
//! The tree is lowered to server-side set algebra: a run of leaves under an
//! `AllOf` becomes a single filtering statement, an `AnyOf` becomes one
//! statement per child plus a union of their result sets, and an `AllOf`
//! mixing the two threads each statement's output set into the next
//! statement's input, so conjunction is a pipeline rather than literal
//! syntax. Working sets are numbered monotonically and named by the element
//! keyword's first letter (`.w3`).

use crate::filter::tree::FilterTree;
use crate::filter::{ElementType, EvalContext, FilterExpression, TagFilter};

/// Compile the expression to Overpass QL, one statement per line.
///
/// Output is deterministic for a given tree and context: statements are
/// emitted in tree order and set ids are allocated in emission order.
pub fn compile(expression: &FilterExpression, ctx: &EvalContext) -> String {
    let keywords = element_keywords(expression.element_types());
    let mut query = QueryWriter::new(ctx);

    if let [keyword] = keywords.as_slice() {
        match expression.tree() {
            Some(tree) => query.write_tree(tree, keyword, None, None),
            None => query.statements.push(format!("{keyword};")),
        }
    } else {
        // No combined keyword covers this type set; run the pipeline once
        // per keyword and union the per-type results.
        let mut results = Vec::with_capacity(keywords.len());
        for keyword in &keywords {
            let result = query.new_set(keyword);
            match expression.tree() {
                Some(tree) => query.write_tree(tree, keyword, None, Some(&result)),
                None => query.write_filters(keyword, None, &[], Some(&result)),
            }
            results.push(result);
        }
        query.write_union(&results, None);
    }

    query.statements.join("\n")
}

/// The Overpass keyword(s) for an element type set. Pairs and the full
/// triple use the precombined keywords where Overpass has one; node +
/// relation has none and needs two statements.
fn element_keywords(types: &std::collections::BTreeSet<ElementType>) -> Vec<&'static str> {
    let node = types.contains(&ElementType::Node);
    let way = types.contains(&ElementType::Way);
    let relation = types.contains(&ElementType::Relation);
    match (node, way, relation) {
        (true, true, true) => vec!["nwr"],
        (true, true, false) => vec!["nw"],
        (false, true, true) => vec!["wr"],
        (true, false, true) => vec!["node", "rel"],
        (true, false, false) => vec!["node"],
        (false, true, false) => vec!["way"],
        (false, false, true) => vec!["rel"],
        // An empty type set never survives parsing.
        (false, false, false) => Vec::new(),
    }
}

/// Transient per-compilation state: the emitted statements and the
/// working-set counter.
struct QueryWriter<'a> {
    ctx: &'a EvalContext,
    statements: Vec<String>,
    next_set_id: usize,
}

impl<'a> QueryWriter<'a> {
    fn new(ctx: &'a EvalContext) -> Self {
        QueryWriter {
            ctx,
            statements: Vec::new(),
            next_set_id: 1,
        }
    }

    /// Allocate a fresh working-set name for the given keyword.
    fn new_set(&mut self, keyword: &str) -> String {
        let id = self.next_set_id;
        self.next_set_id += 1;
        format!(".{}{}", &keyword[..1], id)
    }

    fn write_tree(
        &mut self,
        tree: &FilterTree,
        keyword: &str,
        input: Option<&str>,
        output: Option<&str>,
    ) {
        match tree {
            FilterTree::Leaf(filter) => {
                self.write_filters(keyword, input, std::slice::from_ref(&filter), output);
            }
            FilterTree::AnyOf(children) => self.write_union_of(children, keyword, input, output),
            FilterTree::AllOf(children) => {
                // Consecutive leaves collapse into one statement; each
                // chunk's result set feeds the next chunk.
                let chunks = chunk_children(children);
                let mut current_input = input.map(str::to_string);
                for (i, chunk) in chunks.iter().enumerate() {
                    let chunk_output = if i + 1 == chunks.len() {
                        output.map(str::to_string)
                    } else {
                        Some(self.new_set(keyword))
                    };
                    match chunk {
                        Chunk::Leaves(filters) => self.write_filters(
                            keyword,
                            current_input.as_deref(),
                            filters,
                            chunk_output.as_deref(),
                        ),
                        Chunk::Union(children) => self.write_union_of(
                            children,
                            keyword,
                            current_input.as_deref(),
                            chunk_output.as_deref(),
                        ),
                    }
                    current_input = chunk_output;
                }
            }
        }
    }

    /// One statement per child, then a union of their result sets.
    fn write_union_of(
        &mut self,
        children: &[FilterTree],
        keyword: &str,
        input: Option<&str>,
        output: Option<&str>,
    ) {
        let mut results = Vec::with_capacity(children.len());
        for child in children {
            let result = self.new_set(keyword);
            self.write_tree(child, keyword, input, Some(&result));
            results.push(result);
        }
        self.write_union(&results, output);
    }

    /// A single filtering statement: keyword, optional input set, the tag
    /// filters, optional output set.
    fn write_filters(
        &mut self,
        keyword: &str,
        input: Option<&str>,
        filters: &[&TagFilter],
        output: Option<&str>,
    ) {
        let mut statement = String::from(keyword);
        if let Some(input) = input {
            statement.push_str(input);
        }
        for filter in filters {
            statement.push_str(&filter.to_overpass_ql(self.ctx));
        }
        if let Some(output) = output {
            statement.push_str(" -> ");
            statement.push_str(output);
        }
        statement.push(';');
        self.statements.push(statement);
    }

    fn write_union(&mut self, sets: &[String], output: Option<&str>) {
        let members: Vec<String> = sets.iter().map(|set| format!("{set};")).collect();
        let mut statement = format!("({})", members.join(" "));
        if let Some(output) = output {
            statement.push_str(" -> ");
            statement.push_str(output);
        }
        statement.push(';');
        self.statements.push(statement);
    }
}

enum Chunk<'a> {
    Leaves(Vec<&'a TagFilter>),
    Union(&'a [FilterTree]),
}

fn chunk_children(children: &[FilterTree]) -> Vec<Chunk<'_>> {
    let mut chunks = Vec::new();
    let mut run: Vec<&TagFilter> = Vec::new();
    for child in children {
        match child {
            FilterTree::Leaf(filter) => run.push(filter),
            FilterTree::AnyOf(inner) => {
                if !run.is_empty() {
                    chunks.push(Chunk::Leaves(std::mem::take(&mut run)));
                }
                chunks.push(Chunk::Union(inner));
            }
            // flatten() guarantees no AllOf directly under AllOf
            FilterTree::AllOf(_) => unreachable!("unflattened tree passed to compiler"),
        }
    }
    if !run.is_empty() {
        chunks.push(Chunk::Leaves(run));
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse;

    fn ql(input: &str) -> String {
        parse(input).unwrap().to_overpass_ql()
    }

    #[test]
    fn bare_type_set() {
        assert_eq!(ql("ways"), "way;");
        assert_eq!(ql("nodes, ways, relations"), "nwr;");
    }

    #[test]
    fn single_statement_for_leaf_run() {
        assert_eq!(
            ql("ways with highway = residential and !name"),
            "way[highway = residential][!name];"
        );
    }

    #[test]
    fn combined_keyword_for_node_way() {
        assert_eq!(ql("nodes, ways with highway"), "nw[highway];");
        assert_eq!(ql("ways, relations with building"), "wr[building];");
    }

    #[test]
    fn node_relation_has_no_combined_keyword() {
        assert_eq!(
            ql("nodes, relations with amenity"),
            "node[amenity] -> .n1;\nrel[amenity] -> .r2;\n(.n1; .r2;);"
        );
    }

    #[test]
    fn any_of_becomes_union() {
        assert_eq!(
            ql("ways with highway or railway"),
            "way[highway] -> .w1;\nway[railway] -> .w2;\n(.w1; .w2;);"
        );
    }

    #[test]
    fn all_of_with_union_threads_result_sets() {
        // (a or b) and c: the union's result is the last statement's input
        assert_eq!(
            ql("ways with (highway or railway) and bridge"),
            "way[highway] -> .w2;\nway[railway] -> .w3;\n(.w2; .w3;) -> .w1;\nway.w1[bridge];"
        );
    }

    #[test]
    fn leaf_run_before_union_feeds_it() {
        assert_eq!(
            ql("ways with bridge and (highway or railway)"),
            "way[bridge] -> .w1;\nway.w1[highway] -> .w2;\nway.w1[railway] -> .w3;\n(.w2; .w3;);"
        );
    }

    #[test]
    fn nested_all_of_inside_union() {
        assert_eq!(
            ql("ways with highway or (railway and embankment)"),
            "way[highway] -> .w1;\nway[railway][embankment] -> .w2;\n(.w1; .w2;);"
        );
    }

    #[test]
    fn multi_type_union_with_filters() {
        assert_eq!(
            ql("nodes, relations with amenity = recycling"),
            "node[amenity = recycling] -> .n1;\nrel[amenity = recycling] -> .r2;\n(.n1; .r2;);"
        );
    }

    #[test]
    fn output_is_deterministic() {
        let e = parse("ways with (a or b) and c").unwrap();
        assert_eq!(e.to_overpass_ql(), e.to_overpass_ql());
    }
}
