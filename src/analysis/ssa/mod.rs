//! SSA form: construction and destruction.
//!
//! [`to_ssa`] rewrites a function so that every variable is assigned exactly
//! once, merging control-flow-dependent values with phi instructions.
//! [`from_ssa`] lowers the phis back into plain copies. The two compose:
//! `to_ssa` then `from_ssa` yields a phi-free program equivalent to the input,
//! with the merges spelled out as `id` instructions.
//!
//! Functions are independent; the program-level drivers fan out across them
//! with rayon.
//!
//! # Examples
//!
//! ```rust
//! use brilssa::{analysis::{program_to_ssa, program_from_ssa}, ir::Program};
//!
//! let mut program = Program::from_json(r#"{"functions": [
//!     {"name": "main", "instrs": [
//!         {"op": "const", "dest": "c", "type": "bool", "value": true},
//!         {"op": "br", "args": ["c"], "labels": ["left", "right"]},
//!         {"label": "left"},
//!         {"op": "const", "dest": "x", "type": "int", "value": 1},
//!         {"op": "jmp", "labels": ["join"]},
//!         {"label": "right"},
//!         {"op": "const", "dest": "x", "type": "int", "value": 2},
//!         {"op": "jmp", "labels": ["join"]},
//!         {"label": "join"},
//!         {"op": "print", "args": ["x"]},
//!         {"op": "ret"}
//!     ]}
//! ]}"#)?;
//!
//! program_to_ssa(&mut program)?;
//! assert!(program.functions[0].contains_phi());
//!
//! program_from_ssa(&mut program)?;
//! assert!(!program.functions[0].contains_phi());
//! # Ok::<(), brilssa::Error>(())
//! ```

use rayon::prelude::*;

use crate::{ir::Program, Result};

mod construct;
mod destruct;

pub use construct::{to_ssa, SsaBuilder, UNDEF};
pub use destruct::{destruct_cfg, from_ssa};

/// Converts every function of a program into SSA form, in parallel.
///
/// # Errors
///
/// Returns the first error any function produces; see
/// [`to_ssa`](crate::analysis::to_ssa). Other functions may or may not have
/// been transformed when an error is returned.
pub fn program_to_ssa(program: &mut Program) -> Result<()> {
    program.functions.par_iter_mut().try_for_each(to_ssa)
}

/// Converts every function of a program out of SSA form, in parallel.
///
/// # Errors
///
/// Returns the first error any function produces; see
/// [`from_ssa`](crate::analysis::from_ssa).
pub fn program_from_ssa(program: &mut Program) -> Result<()> {
    program.functions.par_iter_mut().try_for_each(from_ssa)
}

/// Runs SSA construction followed by destruction on every function.
///
/// The result is phi-free and behaviorally equivalent to the input, with merge
/// points made explicit as `id` copies.
///
/// # Errors
///
/// See [`program_to_ssa`] and [`program_from_ssa`].
pub fn program_round_trip(program: &mut Program) -> Result<()> {
    program_to_ssa(program)?;
    program_from_ssa(program)
}
