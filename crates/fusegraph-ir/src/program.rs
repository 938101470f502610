//! Graph programs: the compiler's input bundle.
//!
//! A [`GraphProgram`] carries everything the upstream pattern compiler hands
//! over: the entanglement graph, per-node measurement angles (in units of π),
//! per-node correction indices into the 24-element Clifford group, and the
//! ordered list of output nodes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{IrError, IrResult};
use crate::graph::{Graph, NodeId};

/// Entanglement graph plus measurement and correction annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphProgram {
    /// The entanglement graph.
    pub graph: Graph,
    /// Measurement angle per node, in units of π. Absent nodes use the X basis.
    #[serde(default)]
    pub angles: BTreeMap<NodeId, f64>,
    /// Correction index per node. Absent nodes are not corrected.
    #[serde(default)]
    pub corrections: BTreeMap<NodeId, u8>,
    /// Nodes carrying logical outputs.
    #[serde(default)]
    pub outputs: Vec<NodeId>,
}

impl GraphProgram {
    /// Create a program with no annotations.
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            angles: BTreeMap::new(),
            corrections: BTreeMap::new(),
            outputs: vec![],
        }
    }

    /// Set the measurement angle of a node.
    pub fn with_angle(mut self, node: impl Into<NodeId>, angle: f64) -> Self {
        self.angles.insert(node.into(), angle);
        self
    }

    /// Set the correction index of a node.
    pub fn with_correction(mut self, node: impl Into<NodeId>, index: u8) -> Self {
        self.corrections.insert(node.into(), index);
        self
    }

    /// Set the output nodes.
    pub fn with_outputs<I>(mut self, outputs: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<NodeId>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Check whether `node` is an output node.
    pub fn is_output(&self, node: NodeId) -> bool {
        self.outputs.contains(&node)
    }

    /// Nodes that are measured rather than read out.
    pub fn measured_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.nodes().filter(|n| !self.is_output(*n))
    }

    /// Check that every annotation references a declared node.
    pub fn validate(&self) -> IrResult<()> {
        let check = |node: NodeId, what: &str| {
            if self.graph.contains_node(node) {
                Ok(())
            } else {
                Err(IrError::UnknownNode {
                    node,
                    context: Some(what.to_string()),
                })
            }
        };
        for &node in self.angles.keys() {
            check(node, "angle map")?;
        }
        for &node in self.corrections.keys() {
            check(node, "correction map")?;
        }
        for &node in &self.outputs {
            check(node, "output list")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell() -> GraphProgram {
        let graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        GraphProgram::new(graph)
            .with_correction(1u32, 6)
            .with_outputs([0u32, 1])
    }

    #[test]
    fn test_builder() {
        let program = bell().with_angle(0u32, 0.25);
        assert_eq!(program.angles[&NodeId(0)], 0.25);
        assert_eq!(program.corrections[&NodeId(1)], 6);
        assert!(program.is_output(NodeId(1)));
        assert_eq!(program.measured_nodes().count(), 0);
        assert!(program.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unknown_output() {
        let program = bell().with_outputs([0u32, 5]);
        let err = program.validate().unwrap_err();
        assert!(matches!(err, IrError::UnknownNode { node: NodeId(5), .. }));
    }

    #[test]
    fn test_json_roundtrip() {
        let program = bell().with_angle(0u32, 0.5);
        let json = serde_json::to_string(&program).unwrap();
        let back: GraphProgram = serde_json::from_str(&json).unwrap();
        assert_eq!(back, program);
    }

    #[test]
    fn test_yaml_input() {
        let yaml = "graph:\n  nodes: [0, 1, 2]\n  edges: [[0, 1], [1, 2]]\nangles:\n  0: 0.25\ncorrections:\n  2: 6\noutputs: [2]\n";
        let program: GraphProgram = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(program.graph.num_edges(), 2);
        assert_eq!(program.angles[&NodeId(0)], 0.25);
        assert_eq!(program.outputs, vec![NodeId(2)]);
    }
}
