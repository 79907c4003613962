//! Rendering of analysis results: plain text and Graphviz DOT.

mod dot;
mod print;

pub use dot::{cfg_to_dot, dom_tree_to_dot, escape_dot};
pub use print::{render_dom_tree, render_dominators, render_frontiers};
