use crate::il::*;
use crate::Error;
use serde::{Deserialize, Serialize};

/// A named `ControlFlowGraph`.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Function {
    // The name of the function
    name: String,
    // The `ControlFlowGraph` capturing semantics of the function
    control_flow_graph: ControlFlowGraph,
}

impl Function {
    pub fn new<S: Into<String>>(name: S) -> Function {
        Function::with_control_flow_graph(name, ControlFlowGraph::new())
    }

    pub fn with_control_flow_graph<S: Into<String>>(
        name: S,
        control_flow_graph: ControlFlowGraph,
    ) -> Function {
        Function {
            name: name.into(),
            control_flow_graph,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get a block from this function's `ControlFlowGraph`.
    pub fn block(&self, index: usize) -> Result<&Block, Error> {
        self.control_flow_graph.block(index)
    }

    /// Get every block of this function, in program order.
    pub fn blocks(&self) -> Vec<&Block> {
        self.control_flow_graph.blocks()
    }

    pub fn control_flow_graph(&self) -> &ControlFlowGraph {
        &self.control_flow_graph
    }

    pub fn control_flow_graph_mut(&mut self) -> &mut ControlFlowGraph {
        &mut self.control_flow_graph
    }

    /// Every instruction location in this function, in program order.
    pub fn locations(&self) -> Vec<Location> {
        self.blocks()
            .into_iter()
            .flat_map(|block| {
                block
                    .instructions()
                    .iter()
                    .map(move |instruction| Location::new(block.index(), instruction.index()))
            })
            .collect()
    }
}
