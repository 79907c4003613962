//! Dominance analyses: dominator sets, dominator tree, dominance frontiers.
//!
//! The three artifacts are derived from one CFG snapshot and consumed together by
//! SSA construction:
//!
//! 1. [`DominatorSets`] - the fixed-point dominance relation itself
//! 2. [`DomTree`] - immediate-dominance edges, derived from the sets
//! 3. [`DominanceFrontiers`] - phi placement sites, derived from the sets
//!
//! The tree and the frontiers are independent consumers of the sets and can be
//! computed in either order. All three must be recomputed if the CFG's shape
//! (blocks or edges) changes; mutating instruction lists inside blocks does not
//! invalidate them.
//!
//! # Examples
//!
//! ```rust
//! use brilssa::{analysis::{Cfg, DominatorSets, DomTree, DominanceFrontiers}, ir::Program};
//!
//! let program = Program::from_json(r#"{"functions": [
//!     {"name": "main", "instrs": [
//!         {"label": "entry"},
//!         {"op": "const", "dest": "c", "type": "bool", "value": true},
//!         {"op": "br", "args": ["c"], "labels": ["left", "right"]},
//!         {"label": "left"}, {"op": "jmp", "labels": ["join"]},
//!         {"label": "right"}, {"op": "jmp", "labels": ["join"]},
//!         {"label": "join"}, {"op": "ret"}
//!     ]}
//! ]}"#)?;
//! let cfg = Cfg::from_function(&program.functions[0])?;
//!
//! let dom = DominatorSets::compute(&cfg);
//! let tree = DomTree::build(&dom, &cfg);
//! let frontiers = DominanceFrontiers::compute(&dom, &cfg);
//!
//! assert!(dom.dominates("entry", "join"));
//! assert_eq!(tree.immediate_dominator("join")?, Some("entry"));
//! assert!(frontiers.get("left").unwrap().contains("join"));
//! # Ok::<(), brilssa::Error>(())
//! ```

mod frontier;
mod sets;
mod tree;

pub use frontier::DominanceFrontiers;
pub use sets::DominatorSets;
pub use tree::{DomTree, DomTreeNode};
