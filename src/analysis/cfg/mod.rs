//! Control flow graph construction.
//!
//! Splits a function body into basic blocks and wires them into a [`Cfg`] exposing,
//! per block, its ordered instruction list and predecessor/successor name lists.
//! The CFG is the sole input to the dominance analyses and the SSA passes.
//!
//! # Block naming
//!
//! Blocks opened by an explicit label keep the label as their name. Blocks that
//! start without one (the function entry, fall-through fragments) get a synthesized
//! `b<N>` name, chosen to never collide with an explicit label.

mod block;
mod graph;

pub use block::BasicBlock;
pub use graph::Cfg;
