//! Bril instruction records.
//!
//! A Bril function body is a flat sequence of records of two shapes: label markers
//! (`{"label": "header"}`) and opcode records (`{"op": "add", ...}`). The distinction
//! is decided once during deserialization and carried as a tagged variant, so the
//! analyses never re-check field presence to tell the two apart.
//!
//! Opcode records keep `op` as an open-ended string: Bril extensions add opcodes
//! freely and the analyses in this crate only ever special-case the three block
//! terminators (`jmp`, `br`, `ret`), the phi pseudo-instruction, and the `id` copy
//! emitted during SSA destruction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::malformed_instruction, Result};

/// A Bril value type.
///
/// Core Bril only has named primitive types (`int`, `bool`, `float`); the memory
/// extension adds parameterized pointer types spelled `{"ptr": <type>}` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Type {
    /// A named primitive type such as `int` or `bool`.
    Name(String),
    /// A pointer type from the Bril memory extension.
    Ptr {
        /// The pointee type.
        ptr: Box<Type>,
    },
}

impl Type {
    /// Convenience constructor for a named primitive type.
    pub fn name(name: impl Into<String>) -> Self {
        Type::Name(name.into())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Name(name) => f.write_str(name),
            Type::Ptr { ptr } => write!(f, "ptr<{ptr}>"),
        }
    }
}

/// A constant literal carried by `const` instructions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// A boolean constant.
    Bool(bool),
    /// An integer constant.
    Int(i64),
    /// A floating-point constant.
    Float(f64),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Bool(v) => write!(f, "{v}"),
            Literal::Int(v) => write!(f, "{v}"),
            Literal::Float(v) => write!(f, "{v}"),
        }
    }
}

/// An opcode record: everything in a function body that is not a label marker.
///
/// Optional fields are omitted from the wire format when absent so that programs
/// round-trip through [`crate::ir::Program`] unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Code {
    /// The operation name, e.g. `add`, `br`, `phi`.
    pub op: String,

    /// The variable this instruction defines, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest: Option<String>,

    /// The type of `dest`. Required whenever `dest` is present.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<Type>,

    /// Ordered variable arguments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// Referenced function names (`call` instructions).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub funcs: Vec<String>,

    /// Referenced labels: branch targets, or for `phi` the predecessor block
    /// names aligned positionally with `args`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Constant value (`const` instructions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Literal>,
}

/// The validated pieces of a phi instruction.
///
/// Produced by [`Code::phi_parts`], which fails fast on misaligned records instead
/// of letting the analyses silently build an inconsistent result.
#[derive(Debug, Clone, Copy)]
pub struct PhiParts<'a> {
    /// The SSA destination of the phi.
    pub dest: &'a str,
    /// The declared type of the destination.
    pub ty: &'a Type,
    /// Predecessor block names, aligned with `args`.
    pub labels: &'a [String],
    /// Incoming value names, aligned with `labels`.
    pub args: &'a [String],
}

impl Code {
    /// Creates an opcode record with only `op` set.
    pub fn new(op: impl Into<String>) -> Self {
        Code {
            op: op.into(),
            dest: None,
            ty: None,
            args: Vec::new(),
            funcs: Vec::new(),
            labels: Vec::new(),
            value: None,
        }
    }

    /// Creates an `id` copy instruction: `dest: ty = id arg`.
    ///
    /// This is the instruction SSA destruction splices into predecessor blocks in
    /// place of phi operands.
    pub fn copy(dest: impl Into<String>, ty: Type, arg: impl Into<String>) -> Self {
        Code {
            op: "id".to_string(),
            dest: Some(dest.into()),
            ty: Some(ty),
            args: vec![arg.into()],
            funcs: Vec::new(),
            labels: Vec::new(),
            value: None,
        }
    }

    /// Returns `true` if this instruction ends a basic block (`jmp`, `br`, `ret`).
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        matches!(self.op.as_str(), "jmp" | "br" | "ret")
    }

    /// Returns `true` if this is a phi pseudo-instruction.
    #[must_use]
    pub fn is_phi(&self) -> bool {
        self.op == "phi"
    }

    /// Validates and destructures this instruction as a phi.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInstruction`] if the instruction is not a
    /// phi, lacks a destination or type, or has `labels` and `args` of different
    /// lengths.
    pub fn phi_parts(&self) -> Result<PhiParts<'_>> {
        if !self.is_phi() {
            return Err(malformed_instruction!("expected a phi, found '{}'", self.op));
        }
        let (dest, ty) = self.typed_dest()?.ok_or_else(|| {
            malformed_instruction!("phi instruction is missing its destination")
        })?;
        if self.labels.len() != self.args.len() {
            return Err(malformed_instruction!(
                "phi for '{}' has {} labels but {} args",
                dest,
                self.labels.len(),
                self.args.len()
            ));
        }
        Ok(PhiParts {
            dest,
            ty,
            labels: &self.labels,
            args: &self.args,
        })
    }

    /// Returns the destination with its declared type, if this instruction defines
    /// a variable.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedInstruction`] if `dest` is present but
    /// `type` is not.
    pub fn typed_dest(&self) -> Result<Option<(&str, &Type)>> {
        match (&self.dest, &self.ty) {
            (Some(dest), Some(ty)) => Ok(Some((dest, ty))),
            (Some(dest), None) => Err(malformed_instruction!(
                "instruction '{}' defines '{}' without a type",
                self.op,
                dest
            )),
            (None, _) => Ok(None),
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(dest), Some(ty)) = (&self.dest, &self.ty) {
            write!(f, "{dest}: {ty} = ")?;
        } else if let Some(dest) = &self.dest {
            write!(f, "{dest} = ")?;
        }
        f.write_str(&self.op)?;
        for func in &self.funcs {
            write!(f, " @{func}")?;
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        for label in &self.labels {
            write!(f, " .{label}")?;
        }
        if let Some(value) = &self.value {
            write!(f, " {value}")?;
        }
        Ok(())
    }
}

/// One record of a function body: a label marker or an opcode record.
///
/// The two shapes are distinguished once, at deserialization, by their required
/// fields (`label` vs `op`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Instruction {
    /// A label marker opening a basic block.
    Label {
        /// The label name, without the leading `.` of the text syntax.
        label: String,
    },
    /// An opcode record.
    Code(Code),
}

impl Instruction {
    /// Creates a label marker.
    pub fn label(name: impl Into<String>) -> Self {
        Instruction::Label { label: name.into() }
    }

    /// Returns the opcode record, or `None` for a label marker.
    #[must_use]
    pub fn as_code(&self) -> Option<&Code> {
        match self {
            Instruction::Code(code) => Some(code),
            Instruction::Label { .. } => None,
        }
    }

    /// Mutable variant of [`as_code`](Self::as_code).
    #[must_use]
    pub fn as_code_mut(&mut self) -> Option<&mut Code> {
        match self {
            Instruction::Code(code) => Some(code),
            Instruction::Label { .. } => None,
        }
    }

    /// Returns the label name, or `None` for an opcode record.
    #[must_use]
    pub fn as_label(&self) -> Option<&str> {
        match self {
            Instruction::Label { label } => Some(label),
            Instruction::Code(_) => None,
        }
    }

    /// Returns `true` if this record ends a basic block.
    #[must_use]
    pub fn is_terminator(&self) -> bool {
        self.as_code().is_some_and(Code::is_terminator)
    }

    /// Returns `true` if this is a phi pseudo-instruction.
    #[must_use]
    pub fn is_phi(&self) -> bool {
        self.as_code().is_some_and(Code::is_phi)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Label { label } => write!(f, ".{label}:"),
            Instruction::Code(code) => code.fmt(f),
        }
    }
}

impl From<Code> for Instruction {
    fn from(code: Code) -> Self {
        Instruction::Code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> Instruction {
        serde_json::from_value(json).expect("instruction should deserialize")
    }

    #[test]
    fn test_label_vs_code_dispatch() {
        let label = parse(serde_json::json!({"label": "header"}));
        assert_eq!(label.as_label(), Some("header"));

        let code = parse(serde_json::json!({"op": "ret"}));
        assert!(code.as_code().is_some());
        assert!(code.is_terminator());
    }

    #[test]
    fn test_const_round_trip() {
        let json = serde_json::json!({"op": "const", "dest": "x", "type": "int", "value": 5});
        let instr = parse(json.clone());
        let back = serde_json::to_value(&instr).expect("serialize");
        assert_eq!(back, json);
    }

    #[test]
    fn test_int_literal_stays_int() {
        let instr = parse(serde_json::json!({"op": "const", "dest": "x", "type": "int", "value": 5}));
        let code = instr.as_code().unwrap();
        assert_eq!(code.value, Some(Literal::Int(5)));
    }

    #[test]
    fn test_phi_parts_valid() {
        let instr = parse(serde_json::json!({
            "op": "phi", "dest": "x.2", "type": "int",
            "args": ["x.0", "x.1"], "labels": ["then", "else"]
        }));
        let code = instr.as_code().unwrap();
        let phi = code.phi_parts().expect("well-formed phi");
        assert_eq!(phi.dest, "x.2");
        assert_eq!(phi.labels, ["then", "else"]);
        assert_eq!(phi.args, ["x.0", "x.1"]);
    }

    #[test]
    fn test_phi_parts_misaligned() {
        let instr = parse(serde_json::json!({
            "op": "phi", "dest": "x.2", "type": "int",
            "args": ["x.0"], "labels": ["then", "else"]
        }));
        let err = instr.as_code().unwrap().phi_parts().unwrap_err();
        assert!(matches!(err, crate::Error::MalformedInstruction { .. }));
    }

    #[test]
    fn test_dest_without_type() {
        let instr = parse(serde_json::json!({"op": "add", "dest": "x", "args": ["a", "b"]}));
        let err = instr.as_code().unwrap().typed_dest().unwrap_err();
        assert!(matches!(err, crate::Error::MalformedInstruction { .. }));
    }

    #[test]
    fn test_ptr_type_display() {
        let ty: Type = serde_json::from_value(serde_json::json!({"ptr": "int"})).unwrap();
        assert_eq!(ty.to_string(), "ptr<int>");
    }
}
