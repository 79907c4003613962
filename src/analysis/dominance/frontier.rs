//! Dominance frontier computation.
//!
//! The dominance frontier of a block `n` is the set of blocks where `n`'s
//! dominance "just stops": every `y` in `DF(n)` has a predecessor dominated by
//! `n`, while `y` itself is not strictly dominated by `n`. These are exactly the
//! merge points where SSA construction must place phi nodes.
//!
//! The non-strict formulation is used: a block can appear in its own frontier
//! (`y == n`), which is what a loop back edge produces for the loop header.

use std::collections::{BTreeMap, BTreeSet};

use crate::analysis::{cfg::Cfg, dominance::DominatorSets};

/// The dominance frontiers of a CFG: for every block, the set of merge points at
/// which that block's dominance ends.
///
/// # Examples
///
/// ```rust
/// use brilssa::{analysis::{Cfg, DominatorSets, DominanceFrontiers}, ir::Program};
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
/// let frontiers = DominanceFrontiers::compute(&dom, &cfg);
///
/// // Both arms stop dominating at the join point.
/// assert!(frontiers.get("left").unwrap().contains("join"));
/// assert!(frontiers.get("right").unwrap().contains("join"));
/// # Ok::<(), brilssa::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominanceFrontiers {
    map: BTreeMap<String, BTreeSet<String>>,
}

impl DominanceFrontiers {
    /// Computes the dominance frontier of every block.
    ///
    /// For each block `n`, gathers `domed(n)` (all blocks whose dominator set
    /// contains `n`, including `n` itself) and adds every successor `s` of a
    /// member of `domed(n)` with `s ∉ domed(n)` or `s == n`.
    #[must_use]
    pub fn compute(dom: &DominatorSets, cfg: &Cfg) -> Self {
        let mut map: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

        for vertex in cfg.block_names() {
            let domed: BTreeSet<&str> = cfg
                .block_names()
                .filter(|v| dom.dominates(vertex, v))
                .collect();

            let frontier = map.entry(vertex.to_string()).or_default();
            for d in &domed {
                let Some(block) = cfg.block(d) else { continue };
                for successor in &block.successors {
                    if !domed.contains(successor.as_str()) || successor == vertex {
                        frontier.insert(successor.clone());
                    }
                }
            }
        }

        DominanceFrontiers { map }
    }

    /// The frontier of a block, or `None` for an unknown name.
    #[must_use]
    pub fn get(&self, block: &str) -> Option<&BTreeSet<String>> {
        self.map.get(block)
    }

    /// Iterates `(block, frontier)` pairs in block-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.map.iter().map(|(name, set)| (name.as_str(), set))
    }
}
