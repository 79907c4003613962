//! Control flow and dominance analyses, and the SSA transformation passes.
//!
//! The layers build on each other in order:
//!
//! 1. [`cfg`] - basic block formation and the control flow graph
//! 2. [`dominance`] - dominator sets, the dominator tree, dominance frontiers
//! 3. [`ssa`] - SSA construction and destruction on top of both
//!
//! The commonly used types and entry points are re-exported here.

pub mod cfg;
pub mod dominance;
pub mod ssa;

pub use cfg::{BasicBlock, Cfg};
pub use dominance::{DomTree, DomTreeNode, DominanceFrontiers, DominatorSets};
pub use ssa::{
    destruct_cfg, from_ssa, program_from_ssa, program_round_trip, program_to_ssa, to_ssa,
    SsaBuilder, UNDEF,
};
