//! Control flow graph over named basic blocks.
//!
//! The [`Cfg`] keeps its blocks in formation order, which every downstream analysis
//! treats as the canonical visitation order. Blocks are addressed by name; the
//! name-to-position index is an implementation detail.

use std::collections::HashMap;

use log::debug;

use crate::{
    analysis::cfg::{block::form_basic_blocks, BasicBlock},
    ir::{Function, Instruction},
    Error::GraphError,
    Result,
};

/// A control flow graph built from a function's instruction list.
///
/// # Construction
///
/// Create a CFG from a function with [`from_function`](Self::from_function):
///
/// ```rust
/// use brilssa::{analysis::Cfg, ir::Program};
///
/// let program = Program::from_json(r#"{"functions": [
///     {"name": "main", "instrs": [
///         {"op": "const", "dest": "c", "type": "bool", "value": true},
///         {"op": "br", "args": ["c"], "labels": ["then", "else"]},
///         {"label": "then"}, {"op": "ret"},
///         {"label": "else"}, {"op": "ret"}
///     ]}
/// ]}"#)?;
/// let cfg = Cfg::from_function(&program.functions[0])?;
/// assert_eq!(cfg.block_count(), 3);
/// assert_eq!(cfg.successors(cfg.entry())?, ["then", "else"]);
/// # Ok::<(), brilssa::Error>(())
/// ```
///
/// # Lifecycle
///
/// Dominator sets, the dominator tree, and dominance frontiers are computed from a
/// CFG snapshot and stay valid as long as the graph's shape (blocks and edges) is
/// unchanged. The SSA passes mutate block instruction lists in place but never the
/// shape, so artifacts computed before a pass remain usable during it.
#[derive(Debug, Clone)]
pub struct Cfg {
    /// Blocks in formation order. The first block is the entry.
    blocks: Vec<BasicBlock>,
    /// Name-to-position lookup.
    index: HashMap<String, usize>,
}

impl Cfg {
    /// Builds a CFG from a function body.
    ///
    /// Successor edges come from the terminator of each block (`jmp`/`br` label
    /// targets) or fall through to the next block in formation order; `ret` ends
    /// control flow. Predecessor lists are the exact mirror of successor lists.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if the function body produces no
    /// blocks or a branch names a label that no block carries.
    pub fn from_function(func: &Function) -> Result<Self> {
        Self::from_instructions(&func.instrs)
    }

    /// Builds a CFG directly from an instruction list.
    ///
    /// # Errors
    ///
    /// Same conditions as [`from_function`](Self::from_function).
    pub fn from_instructions(instrs: &[Instruction]) -> Result<Self> {
        let mut blocks = form_basic_blocks(instrs);
        if blocks.is_empty() {
            return Err(GraphError(
                "Cannot create CFG from an empty instruction list".to_string(),
            ));
        }

        let index: HashMap<String, usize> = blocks
            .iter()
            .enumerate()
            .map(|(i, b)| (b.name.clone(), i))
            .collect();
        if index.len() != blocks.len() {
            return Err(GraphError("Duplicate block label in function".to_string()));
        }

        // Wire successor edges, then mirror them as predecessors.
        let mut edges: Vec<(usize, usize)> = Vec::new();
        for (pos, block) in blocks.iter().enumerate() {
            match block.terminator() {
                Some(term) => {
                    for target in &term.labels {
                        let target_pos = *index.get(target).ok_or_else(|| {
                            GraphError(format!(
                                "Block '{}' branches to unknown label '{target}'",
                                block.name
                            ))
                        })?;
                        edges.push((pos, target_pos));
                    }
                }
                None => {
                    if pos + 1 < blocks.len() {
                        edges.push((pos, pos + 1));
                    }
                }
            }
        }
        for (from, to) in edges {
            let target_name = blocks[to].name.clone();
            let source_name = blocks[from].name.clone();
            blocks[from].successors.push(target_name);
            blocks[to].predecessors.push(source_name);
        }

        debug!(
            "built CFG: {} blocks, entry '{}'",
            blocks.len(),
            blocks[0].name
        );
        Ok(Cfg { blocks, index })
    }

    /// The entry block's name. Always the first block in formation order.
    #[must_use]
    pub fn entry(&self) -> &str {
        &self.blocks[0].name
    }

    /// Number of blocks in the graph.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Iterates blocks in formation order.
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Mutable variant of [`blocks`](Self::blocks).
    pub fn blocks_mut(&mut self) -> impl Iterator<Item = &mut BasicBlock> {
        self.blocks.iter_mut()
    }

    /// Iterates block names in formation order.
    pub fn block_names(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(|b| b.name.as_str())
    }

    /// Looks up a block by name.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&BasicBlock> {
        self.index.get(name).map(|&i| &self.blocks[i])
    }

    /// Mutable variant of [`block`](Self::block).
    #[must_use]
    pub fn block_mut(&mut self, name: &str) -> Option<&mut BasicBlock> {
        self.index.get(name).copied().map(move |i| &mut self.blocks[i])
    }

    /// Predecessor names of a block.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if the name is unknown.
    pub fn predecessors(&self, name: &str) -> Result<&[String]> {
        self.block(name)
            .map(|b| b.predecessors.as_slice())
            .ok_or_else(|| GraphError(format!("Unknown block '{name}'")))
    }

    /// Successor names of a block.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::GraphError`] if the name is unknown.
    pub fn successors(&self, name: &str) -> Result<&[String]> {
        self.block(name)
            .map(|b| b.successors.as_slice())
            .ok_or_else(|| GraphError(format!("Unknown block '{name}'")))
    }

    /// Flattens the graph back into an instruction list.
    ///
    /// Every block re-emits a label marker carrying its name, including blocks
    /// whose name was synthesized during formation: SSA construction records block
    /// names in phi `labels`, so every name must remain resolvable after
    /// serialization.
    #[must_use]
    pub fn into_instructions(self) -> Vec<Instruction> {
        let mut instrs = Vec::new();
        for block in self.blocks {
            instrs.push(Instruction::label(block.name));
            instrs.extend(block.instructions);
        }
        instrs
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

    /// Diamond: entry -> (left, right) -> join.
    fn diamond() -> Cfg {
        cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"op": "const", "dest": "c", "type": "bool", "value": true},
                {"op": "br", "args": ["c"], "labels": ["left", "right"]},
                {"label": "left"},
                {"op": "const", "dest": "x", "type": "int", "value": 1},
                {"op": "jmp", "labels": ["join"]},
                {"label": "right"},
                {"op": "const", "dest": "x", "type": "int", "value": 2},
                {"op": "jmp", "labels": ["join"]},
                {"label": "join"},
                {"op": "print", "args": ["x"]},
                {"op": "ret"}
            ]
        }))
    }

    #[test]
    fn test_diamond_edges() {
        let cfg = diamond();
        assert_eq!(cfg.block_count(), 4);
        assert_eq!(cfg.entry(), "b0");
        assert_eq!(cfg.successors("b0").unwrap(), ["left", "right"]);
        assert_eq!(cfg.predecessors("join").unwrap(), ["left", "right"]);
        assert_eq!(cfg.predecessors("b0").unwrap(), Vec::<String>::new().as_slice());
    }

    #[test]
    fn test_fall_through_edge() {
        let cfg = cfg(serde_json::json!({
            "name": "main",
            "instrs": [
                {"op": "const", "dest": "x", "type": "int", "value": 1},
                {"label": "next"},
                {"op": "ret"}
            ]
        }));
        assert_eq!(cfg.successors("b0").unwrap(), ["next"]);
        assert_eq!(cfg.predecessors("next").unwrap(), ["b0"]);
    }

    #[test]
    fn test_empty_function_rejected() {
        let func: Function =
            serde_json::from_value(serde_json::json!({"name": "main", "instrs": []})).unwrap();
        assert!(Cfg::from_function(&func).is_err());
    }

    #[test]
    fn test_unknown_branch_target_rejected() {
        let func: Function = serde_json::from_value(serde_json::json!({
            "name": "main",
            "instrs": [{"op": "jmp", "labels": ["nowhere"]}]
        }))
        .unwrap();
        assert!(Cfg::from_function(&func).is_err());
    }

    #[test]
    fn test_flatten_emits_all_labels() {
        let instrs = diamond().into_instructions();
        let labels: Vec<&str> = instrs.iter().filter_map(|i| i.as_label()).collect();
        assert_eq!(labels, ["b0", "left", "right", "join"]);
    }

    #[test]
    fn test_ret_has_no_successors() {
        let cfg = diamond();
        assert!(cfg.successors("join").unwrap().is_empty());
    }
}
