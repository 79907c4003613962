//! End-to-end tests over the public API: dominance artifacts and the SSA
//! passes on small named control flow scenarios.

use brilssa::{
    analysis::{
        from_ssa, program_round_trip, to_ssa, Cfg, DomTree, DominanceFrontiers, DominatorSets,
        UNDEF,
    },
    ir::{Code, Function, Instruction, Program},
    Error,
};

fn function(json: serde_json::Value) -> Function {
    serde_json::from_value(json).expect("function should parse")
}

fn opcode_records(func: &Function) -> Vec<&Code> {
    func.instrs.iter().filter_map(Instruction::as_code).collect()
}

/// entry branches to left/right, both jump to join, join prints x.
fn diamond_with_two_defs() -> Function {
    function(serde_json::json!({
        "name": "main",
        "instrs": [
            {"label": "entry"},
            {"op": "const", "dest": "cond", "type": "bool", "value": true},
            {"op": "br", "args": ["cond"], "labels": ["left", "right"]},
            {"label": "left"},
            {"op": "const", "dest": "x", "type": "int", "value": 1},
            {"op": "jmp", "labels": ["join"]},
            {"label": "right"},
            {"op": "const", "dest": "x", "type": "int", "value": 2},
            {"op": "jmp", "labels": ["join"]},
            {"label": "join"},
            {"op": "print", "args": ["x"]},
            {"op": "ret"}
        ]
    }))
}

/// entry seeds i, the loop header updates it and branches back or out.
fn counting_loop() -> Function {
    function(serde_json::json!({
        "name": "main",
        "instrs": [
            {"label": "entry"},
            {"op": "const", "dest": "i", "type": "int", "value": 0},
            {"op": "const", "dest": "one", "type": "int", "value": 1},
            {"op": "const", "dest": "limit", "type": "int", "value": 10},
            {"op": "jmp", "labels": ["header"]},
            {"label": "header"},
            {"op": "add", "dest": "i", "type": "int", "args": ["i", "one"]},
            {"op": "lt", "dest": "go", "type": "bool", "args": ["i", "limit"]},
            {"op": "br", "args": ["go"], "labels": ["header", "exit"]},
            {"label": "exit"},
            {"op": "print", "args": ["i"]},
            {"op": "ret"}
        ]
    }))
}

#[test]
fn test_diamond_dominance_artifacts_agree() {
    let func = diamond_with_two_defs();
    let cfg = Cfg::from_function(&func).expect("CFG");
    let dom = DominatorSets::compute(&cfg);
    let tree = DomTree::build(&dom, &cfg);
    let frontiers = DominanceFrontiers::compute(&dom, &cfg);

    // The relation, the tree, and the frontiers tell one consistent story.
    assert!(dom.strictly_dominates("entry", "join"));
    assert!(!dom.dominates("left", "join"));
    assert_eq!(tree.immediate_dominator("join").expect("tree"), Some("entry"));
    assert!(frontiers.get("left").expect("left").contains("join"));
    assert!(frontiers.get("entry").expect("entry").is_empty());
}

#[test]
fn test_tree_parent_strictly_dominates_child() {
    let func = counting_loop();
    let cfg = Cfg::from_function(&func).expect("CFG");
    let dom = DominatorSets::compute(&cfg);
    let tree = DomTree::build(&dom, &cfg);

    for node in tree.iter() {
        if let Some(parent) = tree.immediate_dominator(&node.name).expect("tree") {
            assert!(
                dom.strictly_dominates(parent, &node.name),
                "{parent} should strictly dominate its tree child {}",
                node.name
            );
        }
    }
}

#[test]
fn test_to_ssa_single_assignment_holds() {
    let mut func = diamond_with_two_defs();
    to_ssa(&mut func).expect("construction");

    let mut dests: Vec<&str> = opcode_records(&func)
        .iter()
        .filter_map(|c| c.dest.as_deref())
        .collect();
    let total = dests.len();
    dests.sort_unstable();
    dests.dedup();
    assert_eq!(dests.len(), total, "every destination must be unique");
    assert!(func.contains_phi(), "the join point needs a phi for x");
}

#[test]
fn test_to_ssa_loop_variable_gets_header_phi() {
    let mut func = counting_loop();
    to_ssa(&mut func).expect("construction");

    let phis: Vec<&Code> = opcode_records(&func)
        .into_iter()
        .filter(|c| c.is_phi())
        .collect();
    assert!(!phis.is_empty(), "the loop header must merge i");

    let i_phi = phis
        .iter()
        .find(|c| c.dest.as_deref().is_some_and(|d| d.starts_with("i.")))
        .expect("a phi for i");
    let parts = i_phi.phi_parts().expect("well-formed phi");
    let mut labels: Vec<&str> = parts.labels.iter().map(String::as_str).collect();
    labels.sort_unstable();
    assert_eq!(labels, ["entry", "header"]);
    assert!(parts.args.iter().all(|a| a != UNDEF));
}

#[test]
fn test_destruction_replaces_phis_with_copies() {
    let mut func = diamond_with_two_defs();
    to_ssa(&mut func).expect("construction");
    from_ssa(&mut func).expect("destruction");

    assert!(!func.contains_phi());
    let copies: Vec<&Code> = opcode_records(&func)
        .into_iter()
        .filter(|c| c.op == "id")
        .collect();
    // One copy per incoming edge of the former phi.
    assert_eq!(copies.len(), 2);
    let dest = copies[0].dest.as_deref().expect("copy has a dest");
    assert!(copies.iter().all(|c| c.dest.as_deref() == Some(dest)));
}

#[test]
fn test_round_trip_preserves_shape_without_phis() {
    let mut program: Program = serde_json::from_value(serde_json::json!({
        "functions": [
            serde_json::to_value(diamond_with_two_defs()).expect("serialize"),
            serde_json::to_value(counting_loop()).expect("serialize"),
        ]
    }))
    .expect("program should parse");

    program_round_trip(&mut program).expect("round trip");

    for func in &program.functions {
        assert!(!func.contains_phi(), "@{} should be phi-free", func.name);
        // The result is still a well-formed program: a CFG builds cleanly.
        Cfg::from_function(func).expect("CFG after round trip");
    }
}

#[test]
fn test_construction_is_not_idempotent() {
    let mut func = diamond_with_two_defs();
    to_ssa(&mut func).expect("first construction");

    let err = to_ssa(&mut func).expect_err("second construction must fail");
    assert!(matches!(err, Error::SsaError(_)));
}

#[test]
fn test_unlabeled_entry_gets_synthesized_block() {
    // No leading label: block formation names the entry and the SSA passes
    // still work end to end.
    let mut func = function(serde_json::json!({
        "name": "main",
        "instrs": [
            {"op": "const", "dest": "cond", "type": "bool", "value": false},
            {"op": "br", "args": ["cond"], "labels": ["then", "done"]},
            {"label": "then"},
            {"op": "const", "dest": "y", "type": "int", "value": 4},
            {"op": "jmp", "labels": ["done"]},
            {"label": "done"},
            {"op": "ret"}
        ]
    }));
    to_ssa(&mut func).expect("construction");
    from_ssa(&mut func).expect("destruction");
    assert!(!func.contains_phi());
}

#[test]
fn test_partial_definition_flows_as_undef() {
    let mut func = function(serde_json::json!({
        "name": "main",
        "instrs": [
            {"label": "entry"},
            {"op": "const", "dest": "cond", "type": "bool", "value": true},
            {"op": "br", "args": ["cond"], "labels": ["def", "skip"]},
            {"label": "def"},
            {"op": "const", "dest": "v", "type": "int", "value": 9},
            {"op": "jmp", "labels": ["join"]},
            {"label": "skip"},
            {"op": "jmp", "labels": ["join"]},
            {"label": "join"},
            {"op": "ret"}
        ]
    }));
    to_ssa(&mut func).expect("construction");

    let phi = opcode_records(&func)
        .into_iter()
        .find(|c| c.is_phi())
        .expect("join needs a phi for v");
    let parts = phi.phi_parts().expect("well-formed phi");
    assert!(parts.args.iter().any(|a| a == UNDEF));

    // Destruction drops the undef edge instead of inventing a copy.
    from_ssa(&mut func).expect("destruction");
    let copies = opcode_records(&func)
        .into_iter()
        .filter(|c| c.op == "id")
        .count();
    assert_eq!(copies, 1);
}

#[test]
fn test_malformed_phi_is_reported_with_location() {
    let mut func = function(serde_json::json!({
        "name": "main",
        "instrs": [
            {"label": "entry"},
            {"op": "phi", "dest": "x.0",
             "args": ["a"], "labels": ["entry"]},
            {"op": "ret"}
        ]
    }));
    let err = from_ssa(&mut func).expect_err("phi without a type");
    match err {
        Error::MalformedInstruction { message, file, .. } => {
            assert!(message.contains("x.0"));
            assert!(!file.is_empty());
        }
        other => panic!("expected MalformedInstruction, got {other}"),
    }
}

#[test]
fn test_program_json_survives_transformation() {
    let mut program = Program::from_json(
        &serde_json::json!({
            "functions": [serde_json::to_value(counting_loop()).expect("serialize")]
        })
        .to_string(),
    )
    .expect("program should parse");

    to_ssa(&mut program.functions[0]).expect("construction");
    let json = program.to_json().expect("serialize");
    let reparsed = Program::from_json(&json).expect("reparse");
    assert_eq!(reparsed, program);
}
