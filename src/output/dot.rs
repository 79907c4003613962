//! Graphviz DOT emission for the CFG and the dominator tree.
//!
//! The emitted text can be rendered with any Graphviz tool, e.g.
//! `dot -Tpng out.dot -o out.png`.

use std::fmt::Write;

use crate::analysis::{Cfg, DomTree};

/// Escapes a string for safe use in DOT labels and identifiers.
///
/// Handles quotes, backslashes, newlines, and angle brackets.
///
/// # Examples
///
/// ```rust
/// use brilssa::output::escape_dot;
///
/// assert_eq!(escape_dot("b<1>"), "b\\<1\\>");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
        .replace('<', "\\<")
        .replace('>', "\\>")
}

/// Renders a CFG as a directed graph, one node per basic block and one edge per
/// successor link. Nodes and edges appear in formation order.
#[must_use]
pub fn cfg_to_dot(cfg: &Cfg, graph_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_dot(graph_name));
    let _ = writeln!(out, "  node [shape=box];");
    for block in cfg.blocks() {
        let _ = writeln!(out, "  \"{}\";", escape_dot(&block.name));
    }
    for block in cfg.blocks() {
        for succ in &block.successors {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\";",
                escape_dot(&block.name),
                escape_dot(succ)
            );
        }
    }
    out.push_str("}\n");
    out
}

/// Renders a dominator tree as a directed graph, edges pointing from each block
/// to the blocks it immediately dominates.
#[must_use]
pub fn dom_tree_to_dot(tree: &DomTree, graph_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph \"{}\" {{", escape_dot(graph_name));
    let _ = writeln!(out, "  node [shape=box];");
    let _ = writeln!(out, "  \"{}\";", escape_dot(tree.root()));
    for node in tree.iter() {
        for child in &node.succs {
            let _ = writeln!(
                out,
                "  \"{}\" -> \"{}\";",
                escape_dot(&node.name),
                escape_dot(child)
            );
        }
    }
    out.push_str("}\n");
    out
}
