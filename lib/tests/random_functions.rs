use crate::analysis::{self, Abstract, Driver, DriverState, Options};
use crate::il;
use proptest::prelude::*;
use rustc_hash::FxHashMap;

const CELLS: usize = 2;
// Block visits before a concrete run gives up.
const FUEL: usize = 64;

#[derive(Clone, Debug)]
enum Source {
    Literal(i64),
    // Picks one of the function's values, wrapping around.
    Value(usize),
}

// Load, BinOp and Compare each define a fresh value.
#[derive(Clone, Debug)]
enum Instruction {
    Alloc(usize),
    Load(usize),
    Store(usize, Source),
    BinOp(usize, Source, Source),
    Compare(usize, Source, Source),
}

#[derive(Clone, Debug)]
enum Terminator {
    Exit,
    Jump(usize),
    Branch(Source, usize, usize),
}

#[derive(Clone, Debug)]
struct Program {
    // Stored into every cell at the start of the entry block.
    seeds: Vec<i64>,
    blocks: Vec<(Vec<Instruction>, Terminator)>,
}

const OPERATORS: [il::BinaryOperator; 4] = [
    il::BinaryOperator::Add,
    il::BinaryOperator::Sub,
    il::BinaryOperator::Mul,
    il::BinaryOperator::SDiv,
];

const PREDICATES: [il::Predicate; 6] = [
    il::Predicate::Eq,
    il::Predicate::Ne,
    il::Predicate::Slt,
    il::Predicate::Sle,
    il::Predicate::Sgt,
    il::Predicate::Sge,
];

fn source() -> impl Strategy<Value = Source> {
    prop_oneof![
        (-2i64..3).prop_map(Source::Literal),
        (0usize..8).prop_map(Source::Value),
    ]
}

fn instruction() -> impl Strategy<Value = Instruction> {
    prop_oneof![
        1 => (0..CELLS).prop_map(Instruction::Alloc),
        2 => (0..CELLS).prop_map(Instruction::Load),
        3 => (0..CELLS, source()).prop_map(|(cell, src)| Instruction::Store(cell, src)),
        2 => (0..OPERATORS.len(), source(), source())
            .prop_map(|(op, lhs, rhs)| Instruction::BinOp(op, lhs, rhs)),
        2 => (0..PREDICATES.len(), source(), source())
            .prop_map(|(predicate, lhs, rhs)| Instruction::Compare(predicate, lhs, rhs)),
    ]
}

fn terminator(blocks: usize) -> impl Strategy<Value = Terminator> {
    prop_oneof![
        Just(Terminator::Exit),
        (0..blocks).prop_map(Terminator::Jump),
        (source(), 0..blocks, 0..blocks)
            .prop_map(|(condition, t, f)| Terminator::Branch(condition, t, f)),
    ]
}

fn program() -> impl Strategy<Value = Program> {
    (1usize..6).prop_flat_map(|blocks| {
        (
            prop::collection::vec(-2i64..3, CELLS),
            prop::collection::vec(
                (
                    prop::collection::vec(instruction(), 0..5),
                    terminator(blocks),
                ),
                blocks,
            ),
        )
            .prop_map(|(seeds, blocks)| Program { seeds, blocks })
    })
}

fn build(program: &Program) -> il::Function {
    let mut cfg = il::ControlFlowGraph::new();
    let cells: Vec<il::Cell> = (0..CELLS)
        .map(|i| cfg.new_cell(format!("c{}", i)))
        .collect();

    let definitions = program
        .blocks
        .iter()
        .flat_map(|(instructions, _)| instructions)
        .filter(|instruction| !matches!(instruction, Instruction::Alloc(_) | Instruction::Store(..)))
        .count();
    let values: Vec<il::Value> = (0..definitions)
        .map(|i| cfg.new_value(format!("v{}", i)))
        .collect();
    let operand = |source: &Source| match *source {
        Source::Literal(literal) => il::Operand::constant(literal),
        Source::Value(index) if values.is_empty() => il::Operand::constant(index as i64),
        Source::Value(index) => values[index % values.len()].into(),
    };

    let indices: Vec<usize> = (0..program.blocks.len())
        .map(|i| cfg.new_block(format!("b{}", i)).unwrap().index())
        .collect();

    let mut next_value = values.iter();
    for (index, (instructions, terminator)) in indices.iter().zip(&program.blocks) {
        let block = cfg.block_mut(*index).unwrap();
        if *index == indices[0] {
            for (cell, seed) in cells.iter().zip(&program.seeds) {
                block.alloc(*cell);
                block.store(*cell, il::Operand::constant(*seed));
            }
        }
        for instruction in instructions {
            match *instruction {
                Instruction::Alloc(cell) => block.alloc(cells[cell]),
                Instruction::Load(cell) => {
                    block.load(*next_value.next().unwrap(), cells[cell])
                }
                Instruction::Store(cell, ref src) => block.store(cells[cell], operand(src)),
                Instruction::BinOp(op, ref lhs, ref rhs) => block.binop(
                    *next_value.next().unwrap(),
                    OPERATORS[op],
                    operand(lhs),
                    operand(rhs),
                ),
                Instruction::Compare(predicate, ref lhs, ref rhs) => block.compare(
                    *next_value.next().unwrap(),
                    PREDICATES[predicate],
                    operand(lhs),
                    operand(rhs),
                ),
            }
        }
        match *terminator {
            Terminator::Exit => {}
            Terminator::Jump(target) => cfg.jump(*index, indices[target]).unwrap(),
            Terminator::Branch(ref condition, t, f) => cfg
                .branch(*index, operand(condition), indices[t], indices[f])
                .unwrap(),
        }
    }

    cfg.set_entry(indices[0]).unwrap();
    il::Function::with_control_flow_graph("random", cfg)
}

/// What one concrete run of a function did.
#[derive(Debug, Default)]
struct Trace {
    blocks: Vec<usize>,
    edges: Vec<(usize, usize)>,
    definitions: Vec<(il::Location, il::Entity, i64)>,
}

fn read(entities: &FxHashMap<il::Entity, i64>, operand: &il::Operand) -> Option<i64> {
    match *operand {
        il::Operand::Constant(constant) => Some(constant),
        il::Operand::Value(value) => entities.get(&il::Entity::from(value)).cloned(),
    }
}

/// Run `function` from its entry block.
///
/// An entity without a value is undefined. The run stops when it reads an
/// undefined entity, when arithmetic has no signed result, at a block
/// without a terminator, or when the fuel runs out.
fn execute(function: &il::Function) -> Trace {
    let control_flow_graph = function.control_flow_graph();
    let mut trace = Trace::default();
    let mut entities: FxHashMap<il::Entity, i64> = FxHashMap::default();
    let mut index = control_flow_graph.entry().unwrap();

    'blocks: for _ in 0..FUEL {
        trace.blocks.push(index);
        let block = control_flow_graph.block(index).unwrap();

        for instruction in block.instructions() {
            let (entity, value): (il::Entity, i64) = match *instruction.operation() {
                il::Operation::Alloc { cell } => {
                    entities.remove(&il::Entity::from(cell));
                    continue;
                }
                il::Operation::Load { dst, cell } => match entities.get(&il::Entity::from(cell)) {
                    Some(&value) => (dst.into(), value),
                    None => break 'blocks,
                },
                il::Operation::Store { cell, ref src } => match read(&entities, src) {
                    Some(value) => (cell.into(), value),
                    None => break 'blocks,
                },
                il::Operation::BinOp {
                    dst,
                    op,
                    ref lhs,
                    ref rhs,
                } => {
                    let (lhs, rhs) = match (read(&entities, lhs), read(&entities, rhs)) {
                        (Some(lhs), Some(rhs)) => (lhs, rhs),
                        _ => break 'blocks,
                    };
                    let value = match op {
                        il::BinaryOperator::Add => lhs.checked_add(rhs),
                        il::BinaryOperator::Sub => lhs.checked_sub(rhs),
                        il::BinaryOperator::Mul => lhs.checked_mul(rhs),
                        il::BinaryOperator::SDiv => lhs.checked_div(rhs),
                    };
                    match value {
                        Some(value) => (dst.into(), value),
                        None => break 'blocks,
                    }
                }
                il::Operation::Compare {
                    dst,
                    predicate,
                    ref lhs,
                    ref rhs,
                } => match (read(&entities, lhs), read(&entities, rhs)) {
                    (Some(lhs), Some(rhs)) => (dst.into(), predicate.evaluate(lhs, rhs) as i64),
                    _ => break 'blocks,
                },
                il::Operation::Branch {
                    ref condition,
                    true_target,
                    false_target,
                } => {
                    let next = match read(&entities, condition) {
                        Some(0) => false_target,
                        Some(_) => true_target,
                        None => break 'blocks,
                    };
                    trace.edges.push((index, next));
                    index = next;
                    continue 'blocks;
                }
                il::Operation::Jump { target } => {
                    trace.edges.push((index, target));
                    index = target;
                    continue 'blocks;
                }
            };

            trace.definitions.push((
                il::Location::new(index, instruction.index()),
                entity,
                value,
            ));
            entities.insert(entity, value);
        }

        // No terminator, the function returns.
        break;
    }

    trace
}

/// Every recorded value, keyed by where it was recorded.
fn snapshot(driver: &Driver) -> Vec<(usize, il::Entity, usize, Abstract)> {
    let mut values = Vec::new();
    for block in driver.function().blocks() {
        if let Some(state) = driver.block_state(block.index()) {
            for (entity, position, value) in state.definitions() {
                values.push((block.index(), entity, position, value));
            }
        }
    }
    values
}

#[test]
fn execute_follows_branches() {
    let program = Program {
        seeds: vec![4, 0],
        blocks: vec![
            (
                vec![
                    Instruction::Load(0),
                    Instruction::Compare(5, Source::Value(0), Source::Literal(3)),
                ],
                Terminator::Branch(Source::Value(1), 1, 2),
            ),
            (vec![Instruction::Store(1, Source::Literal(7))], Terminator::Exit),
            (
                vec![Instruction::BinOp(3, Source::Value(0), Source::Literal(0))],
                Terminator::Exit,
            ),
        ],
    };
    let function = build(&program);
    let trace = execute(&function);

    assert_eq!(trace.blocks, vec![0, 1]);
    assert_eq!(trace.edges, vec![(0, 1)]);
    let (_, _, last) = trace.definitions.last().unwrap();
    assert_eq!(*last, 7);

    let result = analysis::analyze(&function).unwrap();
    assert!(result.is_unreachable(2));
}

proptest! {
    #[test]
    fn analysis_terminates(program in program()) {
        let function = build(&program);
        let result = analysis::analyze(&function).unwrap();
        let entry = function.control_flow_graph().entry().unwrap();
        prop_assert!(!result.is_unreachable(entry));
    }

    #[test]
    fn analysis_agrees_with_execution(program in program()) {
        let function = build(&program);
        let result = analysis::analyze(&function).unwrap();
        let trace = execute(&function);

        for block in &trace.blocks {
            prop_assert!(!result.is_unreachable(*block), "ran unreachable block 0x{:X}", block);
        }
        for &(head, tail) in &trace.edges {
            prop_assert!(
                !result.is_edge_dead(head, tail),
                "took dead edge 0x{:X} -> 0x{:X}",
                head,
                tail
            );
        }
        for (location, entity, concrete) in &trace.definitions {
            let value = result.value_of(location, entity);
            prop_assert!(value != Abstract::Undefined, "{} at {} is undef", entity, location);
            if let Some(constant) = value.constant() {
                prop_assert_eq!(constant, *concrete, "{} at {}", entity, location);
            }
        }
    }

    #[test]
    fn sweeps_only_raise_values(program in program()) {
        let function = build(&program);
        let mut driver = Driver::new(&function, &Options::default()).unwrap();

        loop {
            let before = snapshot(&driver);
            let restarts = driver.restarts();
            let unreachable: Vec<usize> = driver.reachability().unreachable_blocks().collect();
            let dead_edges: Vec<(usize, usize)> = driver.reachability().dead_edges().collect();

            let state = driver.step().unwrap();

            // A restart drops every value.
            if driver.restarts() == restarts {
                for (block, entity, position, value) in before {
                    let now = driver
                        .block_state(block)
                        .and_then(|state| state.definition(position, &entity))
                        .unwrap();
                    prop_assert!(now >= value, "{} fell from {} to {}", entity, value, now);
                }
            }
            for block in unreachable {
                prop_assert!(driver.reachability().is_unreachable(block));
            }
            for (head, tail) in dead_edges {
                prop_assert!(driver.reachability().is_edge_dead(head, tail));
            }

            if state == DriverState::Stable {
                break;
            }
        }
    }

    #[test]
    fn pruning_only_refines(program in program()) {
        // Without pruning every block contributes, so any constant found
        // without pruning is found with it too.
        let function = build(&program);
        let pruned = analysis::analyze(&function).unwrap();
        let options = analysis::OptionsBuilder::new().prune_unreachable(false).build();
        let unpruned = analysis::analyze_with_options(&function, &options).unwrap();
        prop_assert!(unpruned.unreachable_blocks().is_empty());

        for location in function.locations() {
            if pruned.is_unreachable(location.block_index()) {
                continue;
            }
            let instruction = location.apply(&function).unwrap();
            if let Some(entity) = instruction.entity_written() {
                if let Some(constant) = unpruned.value_of(&location, &entity).constant() {
                    let value = pruned.value_of(&location, &entity);
                    prop_assert!(
                        value == Abstract::Constant(constant) || value == Abstract::Undefined,
                        "{} at {} is {} pruned, {} unpruned",
                        entity,
                        location,
                        value,
                        constant
                    );
                }
            }
        }
    }
}
