//! Command line front end for the SSA and dominance passes.
//!
//! Reads a Bril program as JSON from a file or stdin, runs the requested
//! transformation or analysis, and writes the result to stdout: transformed
//! programs as JSON, analysis reports as text or Graphviz DOT.

use std::{
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;

use brilssa::{
    analysis::{
        program_from_ssa, program_round_trip, program_to_ssa, Cfg, DomTree, DominanceFrontiers,
        DominatorSets,
    },
    ir::Program,
    output::{cfg_to_dot, dom_tree_to_dot, render_dom_tree, render_dominators, render_frontiers},
};

#[derive(Parser)]
#[command(
    name = "brilssa",
    version,
    about = "Dominance analysis and SSA construction/destruction for Bril programs"
)]
struct Args {
    /// Convert the program to SSA form and print it as JSON
    #[arg(long)]
    to_ssa: bool,

    /// Convert an SSA-form program back and print it as JSON
    #[arg(long)]
    from_ssa: bool,

    /// Convert to SSA form and immediately back again
    #[arg(long)]
    roundtrip: bool,

    /// Print the dominator sets of every function
    #[arg(long)]
    dom: bool,

    /// Print the dominator tree of every function
    #[arg(long)]
    tree: bool,

    /// Print the dominance frontiers of every function
    #[arg(long)]
    frontier: bool,

    /// Emit Graphviz DOT instead of text for the CFG (and the dominator tree
    /// with --tree)
    #[arg(long)]
    dot: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Input file with a Bril program in JSON form; stdin when omitted
    file: Option<PathBuf>,
}

fn load_program(file: Option<&PathBuf>) -> anyhow::Result<Program> {
    match file {
        Some(path) => Program::from_file(path)
            .with_context(|| format!("failed to load program from {}", path.display())),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read program from stdin")?;
            Program::from_json(&input).context("failed to parse program from stdin")
        }
    }
}

fn report(program: &Program, args: &Args, out: &mut impl Write) -> anyhow::Result<()> {
    for func in &program.functions {
        let cfg = Cfg::from_function(func)
            .with_context(|| format!("failed to build CFG for @{}", func.name))?;
        let dom = DominatorSets::compute(&cfg);

        if args.dot {
            write!(out, "{}", cfg_to_dot(&cfg, &format!("{}-cfg", func.name)))?;
        }
        if args.dom {
            writeln!(out, "@{} dominators:", func.name)?;
            write!(out, "{}", render_dominators(&dom))?;
        }
        if args.tree {
            let tree = DomTree::build(&dom, &cfg);
            if args.dot {
                write!(
                    out,
                    "{}",
                    dom_tree_to_dot(&tree, &format!("{}-domtree", func.name))
                )?;
            } else {
                writeln!(out, "@{} dominator tree:", func.name)?;
                write!(out, "{}", render_dom_tree(&tree))?;
            }
        }
        if args.frontier {
            let frontiers = DominanceFrontiers::compute(&dom, &cfg);
            writeln!(out, "@{} dominance frontiers:", func.name)?;
            write!(out, "{}", render_frontiers(&frontiers))?;
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();

    let mut program = load_program(args.file.as_ref())?;

    let transformed = if args.roundtrip {
        program_round_trip(&mut program).context("SSA round trip failed")?;
        true
    } else if args.to_ssa {
        program_to_ssa(&mut program).context("SSA construction failed")?;
        true
    } else if args.from_ssa {
        program_from_ssa(&mut program).context("SSA destruction failed")?;
        true
    } else {
        false
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.dom || args.tree || args.frontier || args.dot {
        report(&program, &args, &mut out)?;
    }

    if transformed {
        program
            .to_writer(&mut out)
            .context("failed to write transformed program")?;
        writeln!(out)?;
    }

    Ok(())
}
