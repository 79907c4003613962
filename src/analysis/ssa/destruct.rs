//! SSA destruction.
//!
//! Lowers a function out of SSA form by turning every phi into explicit data
//! movement: for each incoming `(label, arg)` pair, a copy `dest: type = id arg`
//! is appended to the predecessor block named by the label, placed before that
//! block's terminator so it executes on the way out. Operands equal to the
//! `undef` sentinel produce no copy; the value was never defined along that
//! edge and anything observing it is undefined behavior in the source program.
//! Once all copies are in place the phis themselves are deleted.
//!
//! Version names are kept as-is; no coalescing or renaming back to the original
//! variables is attempted.

use log::debug;

use crate::{
    analysis::{cfg::Cfg, ssa::construct::UNDEF},
    ir::{Code, Function, Instruction},
    Error, Result,
};

/// Rewrites one CFG out of SSA form in place.
///
/// # Errors
///
/// - [`crate::Error::MalformedInstruction`] for a phi with a missing destination
///   or type, or mismatched label/argument counts.
/// - [`crate::Error::GraphError`] if a phi names a predecessor label that is not
///   a block in the CFG.
pub fn destruct_cfg(cfg: &mut Cfg) -> Result<()> {
    // Gather the copies first; inserting while iterating would alias blocks.
    let mut copies: Vec<(String, Code)> = Vec::new();
    let mut phi_count = 0usize;

    for block in cfg.blocks() {
        for instr in &block.instructions {
            let Some(code) = instr.as_code() else { continue };
            if !code.is_phi() {
                continue;
            }
            phi_count += 1;
            let parts = code.phi_parts()?;
            for (label, arg) in parts.labels.iter().zip(parts.args.iter()) {
                if arg.as_str() == UNDEF {
                    continue;
                }
                copies.push((
                    label.clone(),
                    Code::copy(parts.dest, parts.ty.clone(), arg.clone()),
                ));
            }
        }
    }

    for (target, copy) in copies {
        let Some(block) = cfg.block_mut(&target) else {
            return Err(Error::GraphError(format!(
                "Phi instruction references unknown block '{target}'"
            )));
        };
        // The copy must run before control leaves the block.
        let at = match block.instructions.last() {
            Some(instr) if instr.is_terminator() => block.instructions.len() - 1,
            _ => block.instructions.len(),
        };
        block.instructions.insert(at, Instruction::Code(copy));
    }

    for block in cfg.blocks_mut() {
        block.instructions.retain(|instr| !instr.is_phi());
    }

    debug!("lowered {phi_count} phi instructions to copies");
    Ok(())
}

/// Converts a function out of SSA form.
///
/// A function without phis passes through with its CFG normalized (every block
/// labeled) but semantically unchanged.
///
/// # Errors
///
/// See [`destruct_cfg`]; additionally [`crate::Error::GraphError`] if the
/// function body cannot form a CFG.
pub fn from_ssa(func: &mut Function) -> Result<()> {
    let mut cfg = Cfg::from_function(func)?;
    destruct_cfg(&mut cfg)?;
    func.instrs = cfg.into_instructions();
    debug!("converted @{} out of SSA form", func.name);
    Ok(())
}
