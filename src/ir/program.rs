//! Bril program and function containers.
//!
//! A program is a list of functions; each function carries its name, typed
//! arguments, optional return type, and a flat instruction list. This module is
//! the JSON boundary of the crate: everything else operates on the parsed model.

use std::{
    io::{Read, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{
    ir::{Instruction, Type},
    Result,
};

/// A named, typed function argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionArg {
    /// The argument name.
    pub name: String,
    /// The argument type.
    #[serde(rename = "type")]
    pub ty: Type,
}

/// A single Bril function.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    /// The function name, without the leading `@` of the text syntax.
    pub name: String,

    /// Typed arguments, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<FunctionArg>,

    /// Return type, absent for void functions.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,

    /// The flat instruction list: label markers and opcode records.
    pub instrs: Vec<Instruction>,
}

impl Function {
    /// Returns `true` if any instruction of this function is a phi.
    ///
    /// Used to recognize functions that are already in SSA form.
    #[must_use]
    pub fn contains_phi(&self) -> bool {
        self.instrs.iter().any(Instruction::is_phi)
    }
}

/// A complete Bril program.
///
/// # Examples
///
/// ```rust,no_run
/// use brilssa::ir::Program;
///
/// let program = Program::from_file("program.json".as_ref())?;
/// for func in &program.functions {
///     println!("@{}: {} instructions", func.name, func.instrs.len());
/// }
/// # Ok::<(), brilssa::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// All functions of the program, in definition order.
    pub functions: Vec<Function>,
}

impl Program {
    /// Parses a program from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonError`] if the input is not valid Bril JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parses a program from any reader producing Bril JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonError`] if the input is not valid Bril JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Loads a program from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::FileError`] if the file cannot be read, or
    /// [`crate::Error::JsonError`] if it is not valid Bril JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Serializes the program as Bril JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonError`] if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the program as Bril JSON to the given writer.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::JsonError`] if serialization fails.
    pub fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }
}
