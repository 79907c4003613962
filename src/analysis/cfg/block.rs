//! Basic block formation.
//!
//! Splits a function's flat instruction list into maximal straight-line sequences.
//! A label marker opens a new block; a terminator (`jmp`, `br`, `ret`) closes the
//! current one. Fragments with neither a label nor any instructions are dropped.

use std::collections::HashSet;

use crate::ir::{Code, Instruction};

/// A basic block: a named, maximal straight-line instruction sequence.
///
/// The label marker itself is not stored in [`instructions`](Self::instructions);
/// the block's [`name`](Self::name) carries it. Blocks that start without an
/// explicit label receive a synthesized name that is unique within the function.
///
/// Predecessor and successor lists hold block names only; the block does not own
/// its neighbors. If block `A` lists `B` as a successor, `B` lists `A` as a
/// predecessor (both lists are produced together during CFG construction).
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    /// The block name: its label, or a synthesized `b<N>` name.
    pub name: String,
    /// The ordered instruction sequence, excluding the label marker.
    pub instructions: Vec<Instruction>,
    /// Names of blocks with an edge into this one.
    pub predecessors: Vec<String>,
    /// Names of blocks this one has an edge to.
    pub successors: Vec<String>,
}

impl BasicBlock {
    fn new(name: String) -> Self {
        BasicBlock {
            name,
            instructions: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    /// Returns the block's terminating instruction, if its last instruction is one.
    #[must_use]
    pub fn terminator(&self) -> Option<&Code> {
        self.instructions
            .last()
            .and_then(Instruction::as_code)
            .filter(|code| code.is_terminator())
    }
}

/// Splits an instruction list into basic blocks.
///
/// Synthesized names never collide with explicit labels elsewhere in the function:
/// the generator skips over taken names.
pub(crate) fn form_basic_blocks(instrs: &[Instruction]) -> Vec<BasicBlock> {
    let mut taken: HashSet<String> = instrs
        .iter()
        .filter_map(|i| i.as_label().map(str::to_string))
        .collect();
    let mut fresh = 0usize;
    let mut synthesize = move |taken: &mut HashSet<String>| loop {
        let candidate = format!("b{fresh}");
        fresh += 1;
        if taken.insert(candidate.clone()) {
            return candidate;
        }
    };

    let mut blocks: Vec<BasicBlock> = Vec::new();
    let mut current: Option<BasicBlock> = None;

    for instr in instrs {
        match instr {
            Instruction::Label { label } => {
                // A label always opens a fresh block, closing whatever came before.
                if let Some(block) = current.take() {
                    blocks.push(block);
                }
                current = Some(BasicBlock::new(label.clone()));
            }
            Instruction::Code(code) => {
                let block = current.get_or_insert_with(|| {
                    BasicBlock::new(synthesize(&mut taken))
                });
                block.instructions.push(instr.clone());
                if code.is_terminator() {
                    blocks.push(current.take().expect("block was just populated"));
                }
            }
        }
    }
    if let Some(block) = current {
        blocks.push(block);
    }
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Instruction;

    fn instrs(json: serde_json::Value) -> Vec<Instruction> {
        serde_json::from_value(json).expect("instructions should parse")
    }

    #[test]
    fn test_terminators_split_blocks() {
        let blocks = form_basic_blocks(&instrs(serde_json::json!([
            {"op": "const", "dest": "c", "type": "bool", "value": true},
            {"op": "br", "args": ["c"], "labels": ["then", "else"]},
            {"label": "then"},
            {"op": "ret"},
            {"label": "else"},
            {"op": "ret"}
        ])));
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].name, "b0");
        assert_eq!(blocks[1].name, "then");
        assert_eq!(blocks[2].name, "else");
        assert_eq!(blocks[0].instructions.len(), 2);
        assert!(blocks[0].terminator().is_some());
    }

    #[test]
    fn test_label_without_terminator_falls_through() {
        let blocks = form_basic_blocks(&instrs(serde_json::json!([
            {"op": "const", "dest": "x", "type": "int", "value": 1},
            {"label": "next"},
            {"op": "print", "args": ["x"]}
        ])));
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].terminator().is_none());
        assert_eq!(blocks[1].name, "next");
    }

    #[test]
    fn test_synthesized_names_avoid_labels() {
        // The function already uses "b0" as an explicit label.
        let blocks = form_basic_blocks(&instrs(serde_json::json!([
            {"op": "jmp", "labels": ["b0"]},
            {"label": "b0"},
            {"op": "ret"}
        ])));
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].name, "b1");
        assert_eq!(blocks[1].name, "b0");
    }

    #[test]
    fn test_label_only_block_survives() {
        let blocks = form_basic_blocks(&instrs(serde_json::json!([
            {"op": "jmp", "labels": ["end"]},
            {"label": "end"}
        ])));
        assert_eq!(blocks.len(), 2);
        assert!(blocks[1].instructions.is_empty());
    }
}
