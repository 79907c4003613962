//! Human-readable rendering of dominance artifacts.
//!
//! Dominator sets and dominance frontiers share one shape (block name to set of
//! block names), so one renderer serves both. Output is deterministic: blocks
//! in name order, set members in name order.

use std::collections::BTreeSet;
use std::fmt::Write;

use crate::analysis::{DomTree, DominanceFrontiers, DominatorSets};

/// Renders one `name: {a, b, c}` line per entry of a block-to-set map.
fn render_sets<'m>(entries: impl Iterator<Item = (&'m str, &'m BTreeSet<String>)>) -> String {
    let mut out = String::new();
    for (name, set) in entries {
        let members: Vec<&str> = set.iter().map(String::as_str).collect();
        let _ = writeln!(out, "{name}: {{{}}}", members.join(", "));
    }
    out
}

/// Renders dominator sets, one block per line.
///
/// ```text
/// entry: {entry}
/// join: {entry, join}
/// left: {entry, left}
/// ```
#[must_use]
pub fn render_dominators(dom: &DominatorSets) -> String {
    render_sets(dom.iter())
}

/// Renders dominance frontiers in the same line shape as [`render_dominators`].
#[must_use]
pub fn render_frontiers(frontiers: &DominanceFrontiers) -> String {
    render_sets(frontiers.iter())
}

/// Renders the dominator tree as an indented outline, children in discovery
/// order under their parent, starting from the root.
///
/// ```text
/// entry
///   left
///   right
///   join
/// ```
#[must_use]
pub fn render_dom_tree(tree: &DomTree) -> String {
    let mut out = String::new();
    let mut pending: Vec<(&str, usize)> = vec![(tree.root(), 0)];
    while let Some((name, depth)) = pending.pop() {
        let _ = writeln!(out, "{:indent$}{name}", "", indent = depth * 2);
        for child in tree.children(name).iter().rev() {
            pending.push((child, depth + 1));
        }
    }
    out
}
