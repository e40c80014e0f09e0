use crate::analysis::{self, Abstract, AnalysisResult};
use crate::il;
use crate::Error;

mod random_functions;

fn analyze(cfg: il::ControlFlowGraph) -> (il::Function, AnalysisResult) {
    let function = il::Function::with_control_flow_graph("test", cfg);
    let result = analysis::analyze(&function).unwrap();
    assert!(result.sweeps() <= 2 * function.control_flow_graph().num_blocks());
    (function, result)
}

#[test]
fn straight_line() {
    let mut cfg = il::ControlFlowGraph::new();
    let x = cfg.new_cell("x");
    let y = cfg.new_value("y");
    let z = cfg.new_value("z");
    let entry = {
        let block = cfg.new_block("entry").unwrap();
        block.alloc(x);
        block.store(x, il::Operand::constant(5));
        block.load(y, x);
        block.binop(z, il::BinaryOperator::Add, y.into(), il::Operand::constant(3));
        block.index()
    };
    cfg.set_entry(entry).unwrap();

    let (_, result) = analyze(cfg);
    let at = |instruction| il::Location::new(entry, instruction);
    assert_eq!(result.value_of(&at(1), &x.into()), Abstract::Constant(5));
    assert_eq!(result.value_of(&at(2), &y.into()), Abstract::Constant(5));
    assert_eq!(result.value_of(&at(3), &z.into()), Abstract::Constant(8));
    assert!(result.unreachable_blocks().is_empty());
}

/// entry stores x = 1 and branches on an unknown condition to left and
/// right, which store `left` and `right` into x, and join loads x.
fn diamond(left: i64, right: i64) -> (il::ControlFlowGraph, il::Value, usize) {
    let mut cfg = il::ControlFlowGraph::new();
    let x = cfg.new_cell("x");
    let unknown = cfg.new_value("unknown");
    let y = cfg.new_value("y");

    let entry = {
        let block = cfg.new_block("entry").unwrap();
        block.alloc(x);
        block.store(x, il::Operand::constant(1));
        block.index()
    };
    let left_block = {
        let block = cfg.new_block("left").unwrap();
        block.store(x, il::Operand::constant(left));
        block.index()
    };
    let right_block = {
        let block = cfg.new_block("right").unwrap();
        block.store(x, il::Operand::constant(right));
        block.index()
    };
    let join = {
        let block = cfg.new_block("join").unwrap();
        block.load(y, x);
        block.index()
    };

    cfg.branch(entry, unknown.into(), left_block, right_block)
        .unwrap();
    cfg.jump(left_block, join).unwrap();
    cfg.jump(right_block, join).unwrap();
    cfg.set_entry(entry).unwrap();

    (cfg, y, join)
}

#[test]
fn diamond_disagreeing_stores() {
    let (cfg, y, join) = diamond(2, 3);
    let (_, result) = analyze(cfg);
    assert_eq!(result.exit_value(join, &y.into()), Abstract::NotConstant);
    assert!(result.not_constant().contains(&y.into()));
}

#[test]
fn diamond_identical_stores() {
    let (cfg, y, join) = diamond(4, 4);
    let (_, result) = analyze(cfg);
    assert_eq!(result.exit_value(join, &y.into()), Abstract::Constant(4));
    assert!(result.not_constant().is_empty());
}

#[test]
fn constant_branch_prunes_else() {
    // a = 5; b = 10; cmp = a < b; br cmp then else
    // then: store x 1     else: store x 99
    // join: y = load x
    let mut cfg = il::ControlFlowGraph::new();
    let a = cfg.new_value("a");
    let b = cfg.new_value("b");
    let cmp = cfg.new_value("cmp");
    let x = cfg.new_cell("x");
    let y = cfg.new_value("y");

    let entry = {
        let block = cfg.new_block("entry").unwrap();
        block.alloc(x);
        block.binop(
            a,
            il::BinaryOperator::Add,
            il::Operand::constant(5),
            il::Operand::constant(0),
        );
        block.binop(
            b,
            il::BinaryOperator::Add,
            il::Operand::constant(10),
            il::Operand::constant(0),
        );
        block.compare(cmp, il::Predicate::Slt, a.into(), b.into());
        block.index()
    };
    let then = {
        let block = cfg.new_block("then").unwrap();
        block.store(x, il::Operand::constant(1));
        block.index()
    };
    let otherwise = {
        let block = cfg.new_block("else").unwrap();
        block.store(x, il::Operand::constant(99));
        block.index()
    };
    let join = {
        let block = cfg.new_block("join").unwrap();
        block.load(y, x);
        block.index()
    };
    cfg.branch(entry, cmp.into(), then, otherwise).unwrap();
    cfg.jump(then, join).unwrap();
    cfg.jump(otherwise, join).unwrap();
    cfg.set_entry(entry).unwrap();

    let (_, result) = analyze(cfg);
    assert_eq!(result.exit_value(entry, &cmp.into()), Abstract::Constant(1));
    assert!(result.is_unreachable(otherwise));
    assert!(!result.is_unreachable(then));
    assert!(!result.is_unreachable(join));
    assert_eq!(result.unreachable_blocks(), vec![otherwise]);
    // Nothing from else reaches join.
    assert_eq!(result.exit_value(join, &y.into()), Abstract::Constant(1));
    assert_eq!(result.block_state(otherwise), None);
}

#[test]
fn loop_counter() {
    // preheader: alloc i; alloc k; store i 0; store k 3; jmp header
    // header:    v = load i; c = v < 10; br c body exit
    // body:      w = v + 1; store i w; jmp header
    // exit:      r = load k
    let mut cfg = il::ControlFlowGraph::new();
    let i = cfg.new_cell("i");
    let k = cfg.new_cell("k");
    let v = cfg.new_value("v");
    let c = cfg.new_value("c");
    let w = cfg.new_value("w");
    let r = cfg.new_value("r");

    let preheader = {
        let block = cfg.new_block("preheader").unwrap();
        block.alloc(i);
        block.alloc(k);
        block.store(i, il::Operand::constant(0));
        block.store(k, il::Operand::constant(3));
        block.index()
    };
    let header = {
        let block = cfg.new_block("header").unwrap();
        block.load(v, i);
        block.compare(c, il::Predicate::Slt, v.into(), il::Operand::constant(10));
        block.index()
    };
    let body = {
        let block = cfg.new_block("body").unwrap();
        block.binop(w, il::BinaryOperator::Add, v.into(), il::Operand::constant(1));
        block.store(i, w.into());
        block.index()
    };
    let exit = {
        let block = cfg.new_block("exit").unwrap();
        block.load(r, k);
        block.index()
    };
    cfg.jump(preheader, header).unwrap();
    cfg.branch(header, c.into(), body, exit).unwrap();
    cfg.jump(body, header).unwrap();
    cfg.set_entry(preheader).unwrap();

    let (_, result) = analyze(cfg);
    assert_eq!(result.entry_value(header, &i.into()), Abstract::NotConstant);
    assert_eq!(result.exit_value(header, &v.into()), Abstract::NotConstant);
    assert_eq!(result.exit_value(header, &c.into()), Abstract::NotConstant);
    assert_eq!(result.entry_value(header, &k.into()), Abstract::Constant(3));
    assert_eq!(result.exit_value(exit, &r.into()), Abstract::Constant(3));
    assert!(result.unreachable_blocks().is_empty());
    assert!(result.not_constant().contains(&i.into()));
    assert!(!result.not_constant().contains(&k.into()));
}

#[test]
fn division_by_zero() {
    let mut cfg = il::ControlFlowGraph::new();
    let k = cfg.new_value("k");
    let entry = {
        let block = cfg.new_block("entry").unwrap();
        block.binop(
            k,
            il::BinaryOperator::SDiv,
            il::Operand::constant(10),
            il::Operand::constant(0),
        );
        block.index()
    };
    cfg.set_entry(entry).unwrap();

    let (_, result) = analyze(cfg);
    assert_eq!(result.exit_value(entry, &k.into()), Abstract::NotConstant);
}

#[test]
fn branch_on_constant_in_loop() {
    // entry:  store mode 1; jmp header
    // header: m = load mode; br m fast slow
    // fast:   store x 1; jmp latch
    // slow:   store x 2; jmp latch
    // latch:  n = load x; br n header out
    // out:
    let mut cfg = il::ControlFlowGraph::new();
    let mode = cfg.new_cell("mode");
    let x = cfg.new_cell("x");
    let m = cfg.new_value("m");
    let n = cfg.new_value("n");

    let entry = {
        let block = cfg.new_block("entry").unwrap();
        block.store(mode, il::Operand::constant(1));
        block.index()
    };
    let header = {
        let block = cfg.new_block("header").unwrap();
        block.load(m, mode);
        block.index()
    };
    let fast = {
        let block = cfg.new_block("fast").unwrap();
        block.store(x, il::Operand::constant(1));
        block.index()
    };
    let slow = {
        let block = cfg.new_block("slow").unwrap();
        block.store(x, il::Operand::constant(2));
        block.index()
    };
    let latch = {
        let block = cfg.new_block("latch").unwrap();
        block.load(n, x);
        block.index()
    };
    let out = cfg.new_block("out").unwrap().index();
    cfg.jump(entry, header).unwrap();
    cfg.branch(header, m.into(), fast, slow).unwrap();
    cfg.jump(fast, latch).unwrap();
    cfg.jump(slow, latch).unwrap();
    cfg.branch(latch, n.into(), header, out).unwrap();
    cfg.set_entry(entry).unwrap();

    let function = il::Function::with_control_flow_graph("test", cfg);
    let result = analysis::analyze(&function).unwrap();

    // mode is 1 on every path into the header, so slow never runs. The
    // header sits in a loop, so the decision waits for the fixed point.
    assert_eq!(result.entry_value(header, &mode.into()), Abstract::Constant(1));
    assert!(result.is_unreachable(slow));
    assert!(result.is_edge_dead(header, slow));
    // Without slow, x is always 1 in the latch, and the loop never exits.
    assert_eq!(result.exit_value(latch, &n.into()), Abstract::Constant(1));
    assert!(result.is_edge_dead(latch, out));
    assert!(result.is_unreachable(out));
    assert!(!result.not_constant().contains(&x.into()));
}

#[test]
fn instruction_after_terminator() {
    let mut cfg = il::ControlFlowGraph::new();
    let x = cfg.new_cell("x");
    let entry = cfg.new_block("entry").unwrap().index();
    let exit = cfg.new_block("exit").unwrap().index();
    cfg.jump(entry, exit).unwrap();
    cfg.block_mut(entry).unwrap().alloc(x);
    cfg.set_entry(entry).unwrap();

    let function = il::Function::with_control_flow_graph("test", cfg);
    match analysis::analyze(&function) {
        Err(Error::MalformedCfg(_)) => {}
        other => panic!("expected MalformedCfg, got {:?}", other),
    }
}

#[test]
fn value_defined_twice() {
    // b0: v = icmp ne 1, v; v = add 0, 1; br v b1 b0
    // b1: br 0 b0 b1
    let mut cfg = il::ControlFlowGraph::new();
    let v = cfg.new_value("v");
    let b0 = {
        let block = cfg.new_block("b0").unwrap();
        block.compare(v, il::Predicate::Ne, il::Operand::constant(1), v.into());
        block.binop(
            v,
            il::BinaryOperator::Add,
            il::Operand::constant(0),
            il::Operand::constant(1),
        );
        block.index()
    };
    let b1 = cfg.new_block("b1").unwrap().index();
    cfg.branch(b0, v.into(), b1, b0).unwrap();
    cfg.branch(b1, il::Operand::constant(0), b0, b1).unwrap();
    cfg.set_entry(b0).unwrap();

    let function = il::Function::with_control_flow_graph("test", cfg);
    match analysis::analyze(&function) {
        Err(Error::MalformedCfg(_)) => {}
        other => panic!("expected MalformedCfg, got {:?}", other),
    }
}

#[test]
fn branch_to_missing_block() {
    let mut cfg = il::ControlFlowGraph::new();
    let entry = cfg.new_block("entry").unwrap().index();
    match cfg.branch(entry, il::Operand::constant(1), entry, 7) {
        Err(Error::MalformedCfg(_)) => {}
        other => panic!("expected MalformedCfg, got {:?}", other),
    }
}
