//! SSA construction (Cytron et al.).
//!
//! Converts a function into SSA form in four steps over one CFG:
//!
//! 1. **Definition gathering**: record, per variable, the blocks that assign it
//!    and its declared type. Function arguments count as entry-block definitions.
//! 2. **Phi placement**: place a phi for each variable at the iterated dominance
//!    frontier of its definition sites, driven by a worklist (a placed phi is
//!    itself a definition and can demand further phis).
//! 3. **Renaming**: walk the dominator tree depth-first from the entry; give
//!    every definition a fresh `<name>.<k>` version, rewrite uses to the version
//!    on top of the variable's stack, and feed each successor's pending phis with
//!    the version visible along the incoming edge (`undef` when there is none).
//!    The walk uses an explicit action stack with full stack-depth snapshots, so
//!    dominator-tree height never translates into call-stack depth.
//! 4. **Phi materialization**: splice the accumulated phis into their blocks'
//!    instruction sequences, ahead of all other instructions.
//!
//! Versions defined inside a dominator subtree are visible only within that
//! subtree; the snapshot taken before descending into each child and restored
//! when it returns is what realizes this scoping rule.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::{
    analysis::{
        cfg::Cfg,
        dominance::{DomTree, DominanceFrontiers, DominatorSets},
    },
    ir::{Code, Function, FunctionArg, Instruction, Type},
    Error::SsaError,
    Result,
};

/// Sentinel argument for a phi operand with no visible definition along the
/// corresponding edge.
pub const UNDEF: &str = "undef";

/// A phi node accumulated during renaming, before it becomes a real instruction.
#[derive(Debug, Clone)]
struct PendingPhi {
    /// The SSA destination, assigned when the owning block is visited. Stays
    /// `None` for blocks the walk never reaches.
    dest: Option<String>,
    /// Declared type of the original variable.
    ty: Type,
    /// Incoming versions, aligned with `labels`.
    args: Vec<String>,
    /// Predecessor block names, aligned with `args`.
    labels: Vec<String>,
}

/// One step of the explicit renaming walk.
enum Action {
    /// Rename a block, then schedule its dominator-tree children.
    Visit(String),
    /// Restore every version stack to the recorded depth.
    Restore(BTreeMap<String, usize>),
}

/// Builder that rewrites one CFG into SSA form in place.
///
/// Prefer the function-level wrapper [`to_ssa`] unless you already hold a [`Cfg`].
#[derive(Debug)]
pub struct SsaBuilder<'a> {
    cfg: &'a mut Cfg,
    tree: DomTree,
    frontiers: DominanceFrontiers,

    /// Original variable name -> blocks that assign it.
    defs: BTreeMap<String, BTreeSet<String>>,
    /// Original variable name -> declared type (single consistent type assumed).
    types: BTreeMap<String, Type>,
    /// Block name -> variables that need a phi there.
    phi_vars: BTreeMap<String, BTreeSet<String>>,
    /// Block name -> variable -> accumulated phi state.
    pending: BTreeMap<String, BTreeMap<String, PendingPhi>>,
    /// Original variable name -> stack of visible versions.
    stacks: BTreeMap<String, Vec<String>>,
    /// Original variable name -> next version number.
    counters: BTreeMap<String, usize>,
}

impl<'a> SsaBuilder<'a> {
    /// Rewrites the CFG into SSA form.
    ///
    /// `args` are the enclosing function's arguments; they are seeded as
    /// entry-block definitions whose visible version is the original name.
    ///
    /// # Errors
    ///
    /// - [`crate::Error::SsaError`] if the CFG already contains phi instructions.
    /// - [`crate::Error::MalformedInstruction`] if an instruction defines a
    ///   variable without declaring its type.
    /// - [`crate::Error::AmbiguousImmediateDominator`] if the CFG is irreducible;
    ///   the renaming walk assumes a true dominator tree.
    pub fn run(cfg: &'a mut Cfg, args: &[FunctionArg]) -> Result<()> {
        if cfg
            .blocks()
            .flat_map(|b| b.instructions.iter())
            .any(Instruction::is_phi)
        {
            return Err(SsaError(
                "Function already contains phi instructions; SSA construction is not idempotent"
                    .to_string(),
            ));
        }

        let dom = DominatorSets::compute(cfg);
        let tree = DomTree::build(&dom, cfg);
        tree.verify()?;
        let frontiers = DominanceFrontiers::compute(&dom, cfg);

        let mut builder = SsaBuilder {
            cfg,
            tree,
            frontiers,
            defs: BTreeMap::new(),
            types: BTreeMap::new(),
            phi_vars: BTreeMap::new(),
            pending: BTreeMap::new(),
            stacks: BTreeMap::new(),
            counters: BTreeMap::new(),
        };

        builder.gather_definitions(args)?;
        builder.place_phis();
        builder.rename();
        builder.materialize_phis();
        Ok(())
    }

    /// Step 1: collect definition sites and declared types.
    fn gather_definitions(&mut self, args: &[FunctionArg]) -> Result<()> {
        let entry = self.cfg.entry().to_string();
        for arg in args {
            self.defs
                .entry(arg.name.clone())
                .or_default()
                .insert(entry.clone());
            self.types.insert(arg.name.clone(), arg.ty.clone());
            // The version visible before any redefinition is the argument itself.
            self.stacks.insert(arg.name.clone(), vec![arg.name.clone()]);
        }

        for block in self.cfg.blocks() {
            for instr in &block.instructions {
                let Some(code) = instr.as_code() else { continue };
                if let Some((dest, ty)) = code.typed_dest()? {
                    self.defs
                        .entry(dest.to_string())
                        .or_default()
                        .insert(block.name.clone());
                    self.types.insert(dest.to_string(), ty.clone());
                }
            }
        }
        debug!("gathered definitions for {} variables", self.defs.len());
        Ok(())
    }

    /// Step 2: worklist phi placement at iterated dominance frontiers.
    ///
    /// A frontier block that receives a phi becomes a definition site itself and
    /// goes back on the worklist, so chains of merge points are followed to the
    /// end. Recording the same variable twice for a block is a no-op.
    fn place_phis(&mut self) {
        for (var, def_blocks) in &self.defs {
            let mut worklist: Vec<&str> = def_blocks.iter().map(String::as_str).collect();
            let mut placed: BTreeSet<&str> = BTreeSet::new();

            while let Some(d) = worklist.pop() {
                let Some(frontier) = self.frontiers.get(d) else {
                    continue;
                };
                for f in frontier {
                    if placed.insert(f.as_str()) {
                        worklist.push(f.as_str());
                    }
                }
            }

            for f in placed {
                self.phi_vars
                    .entry(f.to_string())
                    .or_default()
                    .insert(var.clone());
            }
        }
        debug!("{} blocks need phi nodes", self.phi_vars.len());
    }

    /// Allocates the next version name for an original variable.
    fn fresh_version(&mut self, var: &str) -> String {
        let counter = self.counters.entry(var.to_string()).or_insert(0);
        let version = format!("{var}.{}", *counter);
        *counter += 1;
        version
    }

    /// Step 3: depth-first renaming over the dominator tree.
    fn rename(&mut self) {
        let entry = self.cfg.entry().to_string();
        let mut actions = vec![Action::Visit(entry)];

        while let Some(action) = actions.pop() {
            match action {
                Action::Restore(snapshot) => {
                    for (var, stack) in &mut self.stacks {
                        stack.truncate(snapshot.get(var).copied().unwrap_or(0));
                    }
                }
                Action::Visit(block) => {
                    self.rename_block(&block);

                    // Snapshot before descending; each child sees this state and
                    // restores it on return, so sibling subtrees are isolated.
                    let snapshot: BTreeMap<String, usize> = self
                        .stacks
                        .iter()
                        .map(|(var, stack)| (var.clone(), stack.len()))
                        .collect();
                    for child in self.tree.children(&block).iter().rev() {
                        actions.push(Action::Restore(snapshot.clone()));
                        actions.push(Action::Visit(child.clone()));
                    }
                }
            }
        }
    }

    /// Renames one block: phi destinations, instruction uses and defs, then the
    /// pending phi operands of every successor.
    fn rename_block(&mut self, block: &str) {
        // Phi destinations come first; they are definitions at the block's top.
        if let Some(vars) = self.phi_vars.get(block).cloned() {
            for var in vars {
                let version = self.fresh_version(&var);
                self.stacks
                    .entry(var.clone())
                    .or_default()
                    .push(version.clone());
                let ty = self.types[&var].clone();
                self.pending
                    .entry(block.to_string())
                    .or_default()
                    .entry(var)
                    .or_insert_with(|| PendingPhi {
                        dest: None,
                        ty,
                        args: Vec::new(),
                        labels: Vec::new(),
                    })
                    .dest = Some(version);
            }
        }

        // Instructions in original order: rewrite uses, then version the def.
        // Each def is pushed immediately so later instructions in the same
        // block read the new version.
        if let Some(bb) = self.cfg.block_mut(block) {
            for instr in &mut bb.instructions {
                let Some(code) = instr.as_code_mut() else { continue };
                for arg in &mut code.args {
                    // Names without a stack entry pass through unchanged.
                    if let Some(top) = self.stacks.get(arg).and_then(|s| s.last()) {
                        *arg = top.clone();
                    }
                }
                if let Some(dest) = code.dest.clone() {
                    let counter = self.counters.entry(dest.clone()).or_insert(0);
                    let version = format!("{dest}.{}", *counter);
                    *counter += 1;
                    code.dest = Some(version.clone());
                    self.stacks.entry(dest).or_default().push(version);
                }
            }
        }

        // Feed the pending phis of every successor with the version visible
        // along this edge, or the undef sentinel when there is none.
        let successors: Vec<String> = self
            .cfg
            .successors(block)
            .map(<[String]>::to_vec)
            .unwrap_or_default();
        for succ in successors {
            let Some(vars) = self.phi_vars.get(&succ).cloned() else {
                continue;
            };
            for var in vars {
                let visible = self
                    .stacks
                    .get(&var)
                    .and_then(|s| s.last())
                    .cloned()
                    .unwrap_or_else(|| UNDEF.to_string());
                let ty = self.types[&var].clone();
                let phi = self
                    .pending
                    .entry(succ.clone())
                    .or_default()
                    .entry(var)
                    .or_insert_with(|| PendingPhi {
                        dest: None,
                        ty,
                        args: Vec::new(),
                        labels: Vec::new(),
                    });
                phi.args.push(visible);
                phi.labels.push(block.to_string());
            }
        }
    }

    /// Step 4: splice accumulated phis into their blocks, ahead of everything
    /// else. Pending phis whose block the walk never reached (unreachable merge
    /// targets) have no destination and are dropped.
    fn materialize_phis(&mut self) {
        let pending = std::mem::take(&mut self.pending);
        for (block, phis) in pending {
            let mut materialized: Vec<Instruction> = Vec::new();
            for (_, phi) in phis {
                let Some(dest) = phi.dest else { continue };
                materialized.push(Instruction::Code(Code {
                    op: "phi".to_string(),
                    dest: Some(dest),
                    ty: Some(phi.ty),
                    args: phi.args,
                    funcs: Vec::new(),
                    labels: phi.labels,
                    value: None,
                }));
            }
            if materialized.is_empty() {
                continue;
            }
            if let Some(bb) = self.cfg.block_mut(&block) {
                bb.instructions.splice(0..0, materialized);
            }
        }
    }
}

/// Converts a function into SSA form.
///
/// The function's instruction list is rebuilt from the transformed CFG; every
/// basic block re-emits its label so phi label references stay resolvable.
///
/// # Errors
///
/// See [`SsaBuilder::run`]; additionally [`crate::Error::GraphError`] if the
/// function body cannot form a CFG.
///
/// # Examples
///
/// ```rust
/// use brilssa::{analysis::to_ssa, ir::Program};
///
/// let mut program = Program::from_json(r#"{"functions": [
///     {"name": "main", "instrs": [
///         {"op": "const", "dest": "c", "type": "bool", "value": true},
///         {"op": "br", "args": ["c"], "labels": ["left", "right"]},
///         {"label": "left"},
///         {"op": "const", "dest": "x", "type": "int", "value": 1},
///         {"op": "jmp", "labels": ["join"]},
///         {"label": "right"},
///         {"op": "const", "dest": "x", "type": "int", "value": 2},
///         {"op": "jmp", "labels": ["join"]},
///         {"label": "join"},
///         {"op": "print", "args": ["x"]},
///         {"op": "ret"}
///     ]}
/// ]}"#)?;
/// to_ssa(&mut program.functions[0])?;
///
/// let phis = program.functions[0].instrs.iter().filter(|i| i.is_phi()).count();
/// assert_eq!(phis, 1);
/// # Ok::<(), brilssa::Error>(())
/// ```
pub fn to_ssa(func: &mut Function) -> Result<()> {
    let mut cfg = Cfg::from_function(func)?;
    SsaBuilder::run(&mut cfg, &func.args)?;
    func.instrs = cfg.into_instructions();
    debug!("converted @{} to SSA form", func.name);
    Ok(())
}
