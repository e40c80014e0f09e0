//! Functions described as JSON.
//!
//! ```json
//! { "name": "f",
//!   "blocks": [
//!     { "name": "entry", "instructions": [
//!       { "op": "alloc", "cell": "x" },
//!       { "op": "store", "cell": "x", "src": 5 },
//!       { "op": "load", "dst": "y", "cell": "x" },
//!       { "op": "icmp", "dst": "c", "pred": "slt", "lhs": "y", "rhs": 10 },
//!       { "op": "br", "cond": "c", "then": "a", "else": "b" } ] },
//!     { "name": "a" },
//!     { "name": "b" } ] }
//! ```
//!
//! Cells and values live in separate namespaces. An operand naming a value
//! which no instruction defines reads as `Undefined`.

use crate::il;
use crate::loader::Loader;
use crate::Error;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

#[derive(Clone, Debug, Deserialize, Serialize)]
struct FunctionSource {
    name: String,
    blocks: Vec<BlockSource>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct BlockSource {
    name: String,
    #[serde(default)]
    instructions: Vec<InstructionSource>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(untagged)]
enum OperandSource {
    Constant(i64),
    Name(String),
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum PredicateSource {
    Eq,
    Ne,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl From<PredicateSource> for il::Predicate {
    fn from(predicate: PredicateSource) -> il::Predicate {
        match predicate {
            PredicateSource::Eq => il::Predicate::Eq,
            PredicateSource::Ne => il::Predicate::Ne,
            PredicateSource::Slt => il::Predicate::Slt,
            PredicateSource::Sle => il::Predicate::Sle,
            PredicateSource::Sgt => il::Predicate::Sgt,
            PredicateSource::Sge => il::Predicate::Sge,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum InstructionSource {
    Alloc {
        cell: String,
    },
    Load {
        dst: String,
        cell: String,
    },
    Store {
        cell: String,
        src: OperandSource,
    },
    Add {
        dst: String,
        lhs: OperandSource,
        rhs: OperandSource,
    },
    Sub {
        dst: String,
        lhs: OperandSource,
        rhs: OperandSource,
    },
    Mul {
        dst: String,
        lhs: OperandSource,
        rhs: OperandSource,
    },
    Sdiv {
        dst: String,
        lhs: OperandSource,
        rhs: OperandSource,
    },
    Icmp {
        dst: String,
        pred: PredicateSource,
        lhs: OperandSource,
        rhs: OperandSource,
    },
    Br {
        cond: OperandSource,
        then: String,
        #[serde(rename = "else")]
        otherwise: String,
    },
    Jmp {
        target: String,
    },
}

impl InstructionSource {
    /// The value this instruction defines.
    fn dst(&self) -> Option<&str> {
        match *self {
            InstructionSource::Load { ref dst, .. }
            | InstructionSource::Add { ref dst, .. }
            | InstructionSource::Sub { ref dst, .. }
            | InstructionSource::Mul { ref dst, .. }
            | InstructionSource::Sdiv { ref dst, .. }
            | InstructionSource::Icmp { ref dst, .. } => Some(dst),
            InstructionSource::Alloc { .. }
            | InstructionSource::Store { .. }
            | InstructionSource::Br { .. }
            | InstructionSource::Jmp { .. } => None,
        }
    }
}

/// Interns names into the cells, values and blocks of a control flow graph.
struct Names {
    cells: HashMap<String, il::Cell>,
    values: HashMap<String, il::Value>,
    blocks: HashMap<String, usize>,
}

impl Names {
    fn cell(&mut self, control_flow_graph: &mut il::ControlFlowGraph, name: &str) -> il::Cell {
        *self
            .cells
            .entry(name.to_string())
            .or_insert_with(|| control_flow_graph.new_cell(name))
    }

    fn value(&mut self, control_flow_graph: &mut il::ControlFlowGraph, name: &str) -> il::Value {
        *self.values.entry(name.to_string()).or_insert_with(|| {
            debug!("value {} is never defined", name);
            control_flow_graph.new_value(name)
        })
    }

    fn operand(
        &mut self,
        control_flow_graph: &mut il::ControlFlowGraph,
        operand: &OperandSource,
    ) -> il::Operand {
        match *operand {
            OperandSource::Constant(constant) => il::Operand::constant(constant),
            OperandSource::Name(ref name) => self.value(control_flow_graph, name).into(),
        }
    }

    fn block(&self, name: &str) -> Result<usize, Error> {
        self.blocks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::MalformedCfg(format!("branch to unknown block {}", name)))
    }
}

/// A function read from JSON.
#[derive(Clone, Debug)]
pub struct Json {
    source: FunctionSource,
}

impl Json {
    pub fn from_file(filename: &Path) -> Result<Json, Error> {
        let mut file = File::open(filename)?;
        let mut text = String::new();
        file.read_to_string(&mut text)?;
        Json::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Json, Error> {
        Ok(Json {
            source: serde_json::from_str(text)?,
        })
    }

    /// The number of blocks in the function.
    pub fn num_blocks(&self) -> usize {
        self.source.blocks.len()
    }
}

impl Loader for Json {
    fn name(&self) -> &str {
        &self.source.name
    }

    fn function(&self) -> Result<il::Function, Error> {
        let mut control_flow_graph = il::ControlFlowGraph::new();
        let mut names = Names {
            cells: HashMap::new(),
            values: HashMap::new(),
            blocks: HashMap::new(),
        };

        // Blocks and value definitions first, so branches and operands may
        // refer forward.
        for block in &self.source.blocks {
            let index = control_flow_graph.new_block(block.name.as_str())?.index();
            if names.blocks.insert(block.name.clone(), index).is_some() {
                return Err(Error::Loader(format!("block {} is defined twice", block.name)));
            }
            for instruction in &block.instructions {
                if let Some(dst) = instruction.dst() {
                    if names.values.contains_key(dst) {
                        return Err(Error::Loader(format!("value {} is defined twice", dst)));
                    }
                    let value = control_flow_graph.new_value(dst);
                    names.values.insert(dst.to_string(), value);
                }
            }
        }

        for block in &self.source.blocks {
            let head = names.block(&block.name)?;
            for instruction in &block.instructions {
                let cfg = &mut control_flow_graph;
                match *instruction {
                    InstructionSource::Alloc { ref cell } => {
                        let cell = names.cell(cfg, cell);
                        cfg.block_mut(head)?.alloc(cell);
                    }
                    InstructionSource::Load { ref dst, ref cell } => {
                        let dst = names.value(cfg, dst);
                        let cell = names.cell(cfg, cell);
                        cfg.block_mut(head)?.load(dst, cell);
                    }
                    InstructionSource::Store { ref cell, ref src } => {
                        let cell = names.cell(cfg, cell);
                        let src = names.operand(cfg, src);
                        cfg.block_mut(head)?.store(cell, src);
                    }
                    InstructionSource::Add {
                        ref dst,
                        ref lhs,
                        ref rhs,
                    }
                    | InstructionSource::Sub {
                        ref dst,
                        ref lhs,
                        ref rhs,
                    }
                    | InstructionSource::Mul {
                        ref dst,
                        ref lhs,
                        ref rhs,
                    }
                    | InstructionSource::Sdiv {
                        ref dst,
                        ref lhs,
                        ref rhs,
                    } => {
                        let op = match *instruction {
                            InstructionSource::Add { .. } => il::BinaryOperator::Add,
                            InstructionSource::Sub { .. } => il::BinaryOperator::Sub,
                            InstructionSource::Mul { .. } => il::BinaryOperator::Mul,
                            _ => il::BinaryOperator::SDiv,
                        };
                        let dst = names.value(cfg, dst);
                        let lhs = names.operand(cfg, lhs);
                        let rhs = names.operand(cfg, rhs);
                        cfg.block_mut(head)?.binop(dst, op, lhs, rhs);
                    }
                    InstructionSource::Icmp {
                        ref dst,
                        pred,
                        ref lhs,
                        ref rhs,
                    } => {
                        let dst = names.value(cfg, dst);
                        let lhs = names.operand(cfg, lhs);
                        let rhs = names.operand(cfg, rhs);
                        cfg.block_mut(head)?.compare(dst, pred.into(), lhs, rhs);
                    }
                    InstructionSource::Br {
                        ref cond,
                        ref then,
                        ref otherwise,
                    } => {
                        let condition = names.operand(cfg, cond);
                        let true_target = names.block(then)?;
                        let false_target = names.block(otherwise)?;
                        cfg.branch(head, condition, true_target, false_target)?;
                    }
                    InstructionSource::Jmp { ref target } => {
                        let target = names.block(target)?;
                        cfg.jump(head, target)?;
                    }
                }
            }
        }

        if let Some(first) = self.source.blocks.first() {
            control_flow_graph.set_entry(names.block(&first.name)?)?;
        }
        control_flow_graph.validate()?;

        debug!(
            "loaded {} with {} blocks, {} cells and {} values",
            self.source.name,
            control_flow_graph.num_blocks(),
            control_flow_graph.num_cells(),
            control_flow_graph.num_values()
        );

        Ok(il::Function::with_control_flow_graph(
            self.source.name.as_str(),
            control_flow_graph,
        ))
    }
}
