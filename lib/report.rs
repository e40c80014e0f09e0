//! Presenting the result of an analysis.
//!
//! `Report` prints every definition of a function with its abstract value,
//! block by block, followed by the list of values which are not constants.
//! `Summary` carries the same information for serialization, and `dot`
//! renders the control flow graph with unreachable blocks and dead edges
//! marked.

use crate::analysis::{Abstract, AnalysisResult};
use crate::graph;
use crate::il;
use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The analysis of a function, printed one definition per line.
///
/// ```text
/// Block: entry
///   Inst 1: store @x, 5 = 5
/// ----- Not-A-Constant Values -----
/// ---------------------------------
/// ```
pub struct Report<'r> {
    function: &'r il::Function,
    result: &'r AnalysisResult,
}

impl<'r> Report<'r> {
    pub fn new(function: &'r il::Function, result: &'r AnalysisResult) -> Report<'r> {
        Report { function, result }
    }
}

impl<'r> fmt::Display for Report<'r> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let control_flow_graph = self.function.control_flow_graph();

        for block in self.function.blocks() {
            if self.result.is_unreachable(block.index()) {
                writeln!(f, "Block: {} (unreachable)", block.name())?;
                continue;
            }
            writeln!(f, "Block: {}", block.name())?;

            for instruction in block.instructions() {
                if let Some(entity) = instruction.entity_written() {
                    let location = il::Location::new(block.index(), instruction.index());
                    writeln!(
                        f,
                        "  Inst {}: {} = {}",
                        instruction.index(),
                        control_flow_graph.operation_string(instruction.operation()),
                        self.result.value_of(&location, &entity)
                    )?;
                }
            }
        }

        writeln!(f, "----- Not-A-Constant Values -----")?;
        for entity in self.result.not_constant() {
            writeln!(f, "Value: {}", control_flow_graph.entity_name(&entity))?;
        }
        writeln!(f, "---------------------------------")
    }
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct DefinitionSummary {
    pub instruction: usize,
    pub text: String,
    pub entity: String,
    pub value: Abstract,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct BlockSummary {
    pub name: String,
    pub unreachable: bool,
    pub definitions: Vec<DefinitionSummary>,
}

/// Everything a `Report` prints, by name.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Summary {
    pub function: String,
    pub sweeps: usize,
    pub blocks: Vec<BlockSummary>,
    pub dead_edges: Vec<(String, String)>,
    pub not_constant: Vec<String>,
}

impl Summary {
    pub fn new(function: &il::Function, result: &AnalysisResult) -> Result<Summary, Error> {
        let control_flow_graph = function.control_flow_graph();

        let blocks = function
            .blocks()
            .into_iter()
            .map(|block| {
                let unreachable = result.is_unreachable(block.index());
                let definitions = if unreachable {
                    Vec::new()
                } else {
                    block
                        .instructions()
                        .iter()
                        .filter_map(|instruction| {
                            instruction.entity_written().map(|entity| {
                                let location =
                                    il::Location::new(block.index(), instruction.index());
                                DefinitionSummary {
                                    instruction: instruction.index(),
                                    text: control_flow_graph
                                        .operation_string(instruction.operation()),
                                    entity: control_flow_graph.entity_name(&entity),
                                    value: result.value_of(&location, &entity),
                                }
                            })
                        })
                        .collect()
                };
                BlockSummary {
                    name: block.name().to_string(),
                    unreachable,
                    definitions,
                }
            })
            .collect();

        let dead_edges = result
            .reachability()
            .dead_edges()
            .map(|(head, tail)| {
                Ok((
                    control_flow_graph.block(head)?.name().to_string(),
                    control_flow_graph.block(tail)?.name().to_string(),
                ))
            })
            .collect::<Result<Vec<(String, String)>, Error>>()?;

        Ok(Summary {
            function: function.name().to_string(),
            sweeps: result.sweeps(),
            blocks,
            dead_edges,
            not_constant: result
                .not_constant()
                .iter()
                .map(|entity| control_flow_graph.entity_name(entity))
                .collect(),
        })
    }
}

#[derive(Clone, Debug)]
struct DotBlock {
    index: usize,
    label: String,
    unreachable: bool,
}

impl graph::Vertex for DotBlock {
    fn index(&self) -> usize {
        self.index
    }

    fn dot_label(&self) -> String {
        self.label.clone()
    }

    fn dot_fill_color(&self) -> String {
        if self.unreachable {
            "#a0a0a0".to_string()
        } else {
            "#ffddcc".to_string()
        }
    }
}

#[derive(Clone, Debug)]
struct DotEdge {
    head: usize,
    tail: usize,
    label: String,
    dead: bool,
}

impl graph::Edge for DotEdge {
    fn head(&self) -> usize {
        self.head
    }

    fn tail(&self) -> usize {
        self.tail
    }

    fn dot_label(&self) -> String {
        self.label.clone()
    }

    fn dot_style(&self) -> String {
        if self.dead {
            "dashed".to_string()
        } else {
            "solid".to_string()
        }
    }
}

/// Render the control flow graph of `function` in graphviz dot format, with
/// the value of every definition.
pub fn dot(function: &il::Function, result: &AnalysisResult) -> Result<String, Error> {
    let control_flow_graph = function.control_flow_graph();
    let mut graph = graph::Graph::new();

    for block in function.blocks() {
        let mut label = format!("{}\n", block.name());
        for instruction in block.instructions() {
            label.push_str(&control_flow_graph.operation_string(instruction.operation()));
            if let Some(entity) = instruction.entity_written() {
                let location = il::Location::new(block.index(), instruction.index());
                label.push_str(&format!(" ; {}", result.value_of(&location, &entity)));
            }
            label.push('\n');
        }
        graph.insert_vertex(DotBlock {
            index: block.index(),
            label,
            unreachable: result.is_unreachable(block.index()),
        })?;
    }

    for edge in control_flow_graph.edges() {
        graph.insert_edge(DotEdge {
            head: edge.head(),
            tail: edge.tail(),
            label: edge
                .guard()
                .map(|guard| {
                    format!(
                        "{} == {}",
                        control_flow_graph.operand_string(guard.condition()),
                        guard.taken_when()
                    )
                })
                .unwrap_or_default(),
            dead: result.is_edge_dead(edge.head(), edge.tail()),
        })?;
    }

    Ok(graph.dot_graph())
}
