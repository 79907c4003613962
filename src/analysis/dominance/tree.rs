//! Dominator tree construction.
//!
//! The immediate dominator of a block is its unique closest strict dominator; the
//! tree formed by the immediate-dominator edges is rooted at the entry block. The
//! builder derives the edges from precomputed dominator sets by candidate
//! elimination: among a block's strict dominators, the immediate one is the
//! candidate that dominates none of the others.
//!
//! Irreducible control flow can leave several candidates standing. The tree
//! structure records all of them as parent edges rather than guessing; accessors
//! that assume a true tree raise [`crate::Error::AmbiguousImmediateDominator`].

use std::collections::BTreeMap;

use crate::{
    analysis::{cfg::Cfg, dominance::DominatorSets},
    Error, Result,
};

/// One node of the dominator tree.
///
/// Nodes are doubly linked by name: `preds` holds the immediate dominator(s), and
/// `succs` the blocks this node immediately dominates. For a reducible CFG every
/// non-root node has exactly one entry in `preds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomTreeNode {
    /// The block this node stands for.
    pub name: String,
    /// Immediate dominator(s) of this block. More than one entry means the input
    /// was irreducible.
    pub preds: Vec<String>,
    /// Blocks immediately dominated by this one, in discovery order.
    pub succs: Vec<String>,
}

impl DomTreeNode {
    fn new(name: &str) -> Self {
        DomTreeNode {
            name: name.to_string(),
            preds: Vec::new(),
            succs: Vec::new(),
        }
    }
}

/// The dominator tree of a CFG, rooted at the entry block.
///
/// Nodes exist only for blocks that take part in at least one immediate-dominance
/// edge; an unreachable block with the singleton dominator set `{self}` has no
/// node and no children.
///
/// # Examples
///
/// ```rust
/// use brilssa::{analysis::{Cfg, DominatorSets, DomTree}, ir::Program};
///
/// let program = Program::from_json(r#"{"functions": [
///     {"name": "main", "instrs": [
///         {"label": "entry"},
///         {"op": "const", "dest": "c", "type": "bool", "value": true},
///         {"op": "br", "args": ["c"], "labels": ["left", "right"]},
///         {"label": "left"}, {"op": "jmp", "labels": ["join"]},
///         {"label": "right"}, {"op": "jmp", "labels": ["join"]},
///         {"label": "join"}, {"op": "ret"}
///     ]}
/// ]}"#)?;
/// let cfg = Cfg::from_function(&program.functions[0])?;
/// let dom = DominatorSets::compute(&cfg);
/// let tree = DomTree::build(&dom, &cfg);
///
/// // The join point's immediate dominator is the entry, not either arm.
/// assert_eq!(tree.immediate_dominator("join")?, Some("entry"));
/// # Ok::<(), brilssa::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DomTree {
    root: String,
    nodes: BTreeMap<String, DomTreeNode>,
}

impl DomTree {
    /// Builds the dominator tree from precomputed dominator sets.
    ///
    /// For each block `v`, the candidates are `dom[v] \ {v}`; a candidate is the
    /// immediate dominator iff it dominates no other candidate. Tree nodes are
    /// created lazily for both endpoints of every edge found. Multiple surviving
    /// candidates (possible only for irreducible inputs) are all recorded.
    #[must_use]
    pub fn build(dom: &DominatorSets, cfg: &Cfg) -> Self {
        let mut nodes: BTreeMap<String, DomTreeNode> = BTreeMap::new();

        for vertex in cfg.block_names() {
            let Some(doms) = dom.get(vertex) else {
                continue;
            };
            let candidates: Vec<&str> = doms
                .iter()
                .map(String::as_str)
                .filter(|d| *d != vertex)
                .collect();

            for d in &candidates {
                // d is immediate iff it dominates no other candidate.
                let immediate = candidates
                    .iter()
                    .filter(|dd| *dd != d)
                    .all(|dd| !dom.dominates(d, dd));
                if immediate {
                    nodes
                        .entry((*d).to_string())
                        .or_insert_with(|| DomTreeNode::new(d))
                        .succs
                        .push(vertex.to_string());
                    nodes
                        .entry(vertex.to_string())
                        .or_insert_with(|| DomTreeNode::new(vertex))
                        .preds
                        .push((*d).to_string());
                }
            }
        }

        DomTree {
            root: cfg.entry().to_string(),
            nodes,
        }
    }

    /// The root of the tree: the CFG's entry block.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Looks up a tree node by block name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&DomTreeNode> {
        self.nodes.get(name)
    }

    /// The blocks immediately dominated by `name`, in discovery order.
    ///
    /// Returns an empty slice for blocks without a node (leaves that dominate
    /// nothing, unreachable blocks, unknown names).
    #[must_use]
    pub fn children(&self, name: &str) -> &[String] {
        self.nodes.get(name).map_or(&[], |n| n.succs.as_slice())
    }

    /// The immediate dominator of a block.
    ///
    /// Returns `Ok(None)` for the root and for blocks with no parent edge
    /// (unreachable blocks).
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AmbiguousImmediateDominator`] if the block has
    /// more than one recorded parent, which only happens for irreducible inputs.
    pub fn immediate_dominator(&self, name: &str) -> Result<Option<&str>> {
        let Some(node) = self.nodes.get(name) else {
            return Ok(None);
        };
        match node.preds.as_slice() {
            [] => Ok(None),
            [parent] => Ok(Some(parent)),
            many => Err(Error::AmbiguousImmediateDominator {
                block: name.to_string(),
                candidates: many.to_vec(),
            }),
        }
    }

    /// Verifies that every node has at most one parent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::AmbiguousImmediateDominator`] for the first block
    /// (in name order) with multiple parents.
    pub fn verify(&self) -> Result<()> {
        for name in self.nodes.keys() {
            self.immediate_dominator(name)?;
        }
        Ok(())
    }

    /// Iterates tree nodes in block-name order.
    pub fn iter(&self) -> impl Iterator<Item = &DomTreeNode> {
        self.nodes.values()
    }
}
