//! The Bril intermediate representation.
//!
//! This module models the Bril JSON wire format: programs, functions, and the two
//! shapes of body record (label markers and opcode records). Deserialization
//! decides the record shape once; see [`Instruction`].
//!
//! # Examples
//!
//! ```rust
//! use brilssa::ir::Program;
//!
//! let program = Program::from_json(r#"{"functions": [
//!     {"name": "main", "instrs": [{"op": "ret"}]}
//! ]}"#)?;
//! assert_eq!(program.functions[0].name, "main");
//! # Ok::<(), brilssa::Error>(())
//! ```

mod instruction;
mod program;

pub use instruction::{Code, Instruction, Literal, PhiParts, Type};
pub use program::{Function, FunctionArg, Program};
