//! Dominator set computation via iterative fixed point.
//!
//! A block `a` dominates a block `b` if every path from the entry to `b` passes
//! through `a`. Dominance is reflexive: every block dominates itself.
//!
//! The computation here is the straightforward fixed-point formulation, not an
//! asymptotically optimal algorithm: it repeats full sweeps over the blocks until
//! a sweep changes nothing. Each update either leaves a block's set unchanged or
//! replaces it within a bounded universe, so the sweep loop always terminates on
//! a finite CFG.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::analysis::cfg::Cfg;

/// The dominator sets of a CFG: for every block, the set of blocks that dominate
/// it (always including itself).
///
/// # Invariants
///
/// - `v ∈ dom[v]` for every block `v` (reflexivity).
/// - `dom[entry] = {entry}`, and so does any block with an empty predecessor
///   list (unreachable blocks are never dominated by reachable ones).
///
/// # Examples
///
/// ```rust
/// use brilssa::{analysis::{Cfg, DominatorSets}, ir::Program};
///
/// let program = Program::from_json(r#"{"functions": [
///     {"name": "main", "instrs": [
///         {"op": "const", "dest": "c", "type": "bool", "value": true},
///         {"op": "br", "args": ["c"], "labels": ["left", "right"]},
///         {"label": "left"}, {"op": "jmp", "labels": ["join"]},
///         {"label": "right"}, {"op": "jmp", "labels": ["join"]},
///         {"label": "join"}, {"op": "ret"}
///     ]}
/// ]}"#)?;
/// let cfg = Cfg::from_function(&program.functions[0])?;
/// let dom = DominatorSets::compute(&cfg);
///
/// // The entry dominates the join point; neither arm does.
/// assert!(dom.dominates("b0", "join"));
/// assert!(!dom.dominates("left", "join"));
/// # Ok::<(), brilssa::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DominatorSets {
    sets: BTreeMap<String, BTreeSet<String>>,
}

impl DominatorSets {
    /// Computes the dominator sets of a CFG.
    ///
    /// Visitation order is the CFG's block formation order. The order only
    /// affects how many sweeps the fixed point needs, not the result: the update
    /// rule `dom[v] = {v} ∪ (∩ dom[p] for predecessors p)` has a single smallest
    /// fixed point on a reducible graph regardless of sweep order.
    ///
    /// Blocks enter the map the first time they are visited; a predecessor that
    /// has no entry yet is skipped for that sweep. A block with no contributing
    /// predecessors ends up with the singleton `{v}`.
    #[must_use]
    pub fn compute(cfg: &Cfg) -> Self {
        let mut dom: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut sweeps = 0usize;

        loop {
            let mut changed = false;
            sweeps += 1;

            for block in cfg.blocks() {
                dom.entry(block.name.clone()).or_default();

                // Intersect the sets of all predecessors that already have one.
                let mut common: Option<BTreeSet<String>> = None;
                for pred in &block.predecessors {
                    if let Some(pred_dom) = dom.get(pred) {
                        common = Some(match common {
                            None => pred_dom.clone(),
                            Some(acc) => acc.intersection(pred_dom).cloned().collect(),
                        });
                    }
                }
                let mut next = common.unwrap_or_default();
                next.insert(block.name.clone());

                if dom.get(&block.name) != Some(&next) {
                    dom.insert(block.name.clone(), next);
                    changed = true;
                }
            }

            if !changed {
                break;
            }
        }

        debug!("dominator sets converged after {sweeps} sweeps");
        DominatorSets { sets: dom }
    }

    /// The dominator set of a block, or `None` for an unknown name.
    #[must_use]
    pub fn get(&self, block: &str) -> Option<&BTreeSet<String>> {
        self.sets.get(block)
    }

    /// Checks whether `a` dominates `b`.
    ///
    /// Every block dominates itself. Unknown names dominate nothing.
    #[must_use]
    pub fn dominates(&self, a: &str, b: &str) -> bool {
        self.sets.get(b).is_some_and(|doms| doms.contains(a))
    }

    /// Checks whether `a` strictly dominates `b` (dominates it and `a != b`).
    #[must_use]
    pub fn strictly_dominates(&self, a: &str, b: &str) -> bool {
        a != b && self.dominates(a, b)
    }

    /// Iterates `(block, dominator set)` pairs in block-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Number of blocks covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns `true` if no blocks are covered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Function;

    fn cfg(json: serde_json::Value) -> Cfg {
        let func: Function = serde_json::from_value(json).expect("function should parse");
        Cfg::from_function(&func).expect("CFG should build")
    }

    /// entry -> a -> b -> c
    fn linear_chain() -> Cfg {
        cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"label": "entry"}, {"op": "jmp", "labels": ["a"]},
                {"label": "a"}, {"op": "jmp", "labels": ["b"]},
                {"label": "b"}, {"op": "jmp", "labels": ["c"]},
                {"label": "c"}, {"op": "ret"}
            ]
        }))
    }

    /// entry -> (left, right) -> join
    fn diamond() -> Cfg {
        cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"label": "entry"},
                {"op": "const", "dest": "c", "type": "bool", "value": true},
                {"op": "br", "args": ["c"], "labels": ["left", "right"]},
                {"label": "left"}, {"op": "jmp", "labels": ["join"]},
                {"label": "right"}, {"op": "jmp", "labels": ["join"]},
                {"label": "join"}, {"op": "ret"}
            ]
        }))
    }

    /// entry -> header; header -> (body, exit); body -> header
    fn simple_loop() -> Cfg {
        cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"label": "entry"},
                {"op": "const", "dest": "c", "type": "bool", "value": true},
                {"op": "jmp", "labels": ["header"]},
                {"label": "header"},
                {"op": "br", "args": ["c"], "labels": ["body", "exit"]},
                {"label": "body"}, {"op": "jmp", "labels": ["header"]},
                {"label": "exit"}, {"op": "ret"}
            ]
        }))
    }

    #[test]
    fn test_reflexivity() {
        let cfg = diamond();
        let dom = DominatorSets::compute(&cfg);
        for name in cfg.block_names() {
            assert!(dom.dominates(name, name), "{name} should dominate itself");
        }
    }

    #[test]
    fn test_entry_set_is_singleton() {
        let cfg = diamond();
        let dom = DominatorSets::compute(&cfg);
        let entry_set = dom.get("entry").expect("entry has a set");
        assert_eq!(entry_set.len(), 1);
        assert!(entry_set.contains("entry"));
    }

    #[test]
    fn test_linear_chain_nests() {
        let dom = DominatorSets::compute(&linear_chain());
        assert!(dom.strictly_dominates("entry", "c"));
        assert!(dom.strictly_dominates("a", "c"));
        assert!(dom.strictly_dominates("b", "c"));
        assert!(!dom.dominates("c", "b"));
        assert_eq!(dom.get("c").unwrap().len(), 4);
    }

    #[test]
    fn test_diamond_arms_do_not_dominate_join() {
        let dom = DominatorSets::compute(&diamond());
        assert!(dom.dominates("entry", "join"));
        assert!(!dom.strictly_dominates("left", "join"));
        assert!(!dom.strictly_dominates("right", "join"));
    }

    #[test]
    fn test_back_edge_does_not_grant_dominance() {
        let dom = DominatorSets::compute(&simple_loop());
        assert!(dom.dominates("header", "body"));
        assert!(dom.dominates("header", "exit"));
        assert!(!dom.strictly_dominates("body", "header"));
    }

    #[test]
    fn test_every_reachable_set_contains_entry() {
        let cfg = simple_loop();
        let dom = DominatorSets::compute(&cfg);
        for name in cfg.block_names() {
            assert!(
                dom.get(name).unwrap().contains("entry"),
                "{name} should be dominated by the entry"
            );
        }
    }

    #[test]
    fn test_unreachable_block_is_isolated() {
        // "island" has no predecessors: its set is the singleton, and it does
        // not appear in any reachable block's set.
        let cfg = cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"label": "entry"}, {"op": "jmp", "labels": ["exit"]},
                {"label": "island"}, {"op": "jmp", "labels": ["exit"]},
                {"label": "exit"}, {"op": "ret"}
            ]
        }));
        let dom = DominatorSets::compute(&cfg);
        assert_eq!(dom.get("island").unwrap().len(), 1);
        assert!(!dom.get("exit").unwrap().contains("island"));
    }
}
