#![doc(html_no_source)]
#![deny(missing_docs)]

//! # brilssa
//!
//! Dominance analysis and SSA transformation for [Bril](https://capra.cs.cornell.edu/bril/)
//! programs in their JSON wire format.
//!
//! ## Features
//!
//! - **Dominator sets** - the full dominance relation via an iterative fixed point
//! - **Dominator tree** - immediate-dominance edges derived from the sets
//! - **Dominance frontiers** - the phi placement sites of every block
//! - **SSA construction** - phi placement at iterated frontiers plus dominator-tree renaming
//! - **SSA destruction** - phi lowering into explicit `id` copies
//! - **Rendering** - plain-text and Graphviz DOT output of every artifact
//!
//! ## Quick Start
//!
//! ```rust
//! use brilssa::{analysis::program_to_ssa, ir::Program};
//!
//! let mut program = Program::from_json(r#"{"functions": [
//!     {"name": "main", "instrs": [
//!         {"op": "const", "dest": "x", "type": "int", "value": 1},
//!         {"op": "const", "dest": "x", "type": "int", "value": 2},
//!         {"op": "print", "args": ["x"]},
//!         {"op": "ret"}
//!     ]}
//! ]}"#)?;
//!
//! program_to_ssa(&mut program)?;
//! println!("{}", program.to_json()?);
//! # Ok::<(), brilssa::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`ir`] - the Bril data model: programs, functions, instructions, types
//! - [`analysis`] - CFG formation, dominance, and the SSA passes
//! - [`output`] - text and DOT rendering of analysis results
//!
//! The layers only point downward: `output` and `analysis` consume `ir`, and
//! nothing in `ir` knows about the analyses.

pub mod analysis;
mod error;
pub mod ir;
pub mod output;

pub use error::Error;

/// Convenience alias for operations that can fail with a crate [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
