//! Undirected entanglement graphs.
//!
//! A [`Graph`] is the read-only input of the compiler: a set of opaque node
//! identifiers and undirected edges between them. Node and edge enumeration
//! follows insertion order, which makes every downstream pass deterministic
//! for a fixed input.

use petgraph::graphmap::UnGraphMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Identifier of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        NodeId(id)
    }
}

/// Serialized form of a graph: declared nodes plus an edge list.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphRepr {
    nodes: Vec<NodeId>,
    #[serde(default)]
    edges: Vec<(NodeId, NodeId)>,
}

/// An undirected simple graph over [`NodeId`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "GraphRepr", into = "GraphRepr")]
pub struct Graph {
    inner: UnGraphMap<NodeId, ()>,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a node list and an edge list.
    ///
    /// Every edge must reference declared nodes.
    pub fn from_parts<N, E>(nodes: N, edges: E) -> IrResult<Self>
    where
        N: IntoIterator,
        N::Item: Into<NodeId>,
        E: IntoIterator<Item = (N::Item, N::Item)>,
    {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node)?;
        }
        for (a, b) in edges {
            graph.add_edge(a, b)?;
        }
        Ok(graph)
    }

    /// Declare a node.
    pub fn add_node(&mut self, node: impl Into<NodeId>) -> IrResult<&mut Self> {
        let node = node.into();
        if self.inner.contains_node(node) {
            return Err(IrError::DuplicateNode(node));
        }
        self.inner.add_node(node);
        Ok(self)
    }

    /// Add an undirected edge between two declared nodes.
    ///
    /// Adding an edge that already exists is a no-op.
    pub fn add_edge(&mut self, a: impl Into<NodeId>, b: impl Into<NodeId>) -> IrResult<&mut Self> {
        let (a, b) = (a.into(), b.into());
        if a == b {
            return Err(IrError::SelfLoop(a));
        }
        for node in [a, b] {
            if !self.inner.contains_node(node) {
                return Err(IrError::UnknownNode {
                    node,
                    context: Some(format!("edge {a}-{b}")),
                });
            }
        }
        self.inner.add_edge(a, b, ());
        Ok(self)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.nodes()
    }

    /// Edges in insertion order, each reported as `(min, max)`.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.inner.all_edges().map(|(a, b, _)| (a, b))
    }

    /// Neighbors of `node` in edge insertion order.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.inner.neighbors(node)
    }

    /// Degree of `node` (zero for undeclared nodes).
    pub fn degree(&self, node: NodeId) -> usize {
        if self.inner.contains_node(node) {
            self.inner.neighbors(node).count()
        } else {
            0
        }
    }

    /// Check whether a node is declared.
    pub fn contains_node(&self, node: NodeId) -> bool {
        self.inner.contains_node(node)
    }

    /// Check whether an undirected edge exists.
    pub fn contains_edge(&self, a: NodeId, b: NodeId) -> bool {
        self.inner.contains_edge(a, b)
    }

    /// Number of declared nodes.
    pub fn num_nodes(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.inner.edge_count()
    }

    /// Check whether the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.inner.node_count() == 0
    }

    /// Edge set with each edge normalized to `(min, max)`.
    pub fn edge_set(&self) -> FxHashSet<(NodeId, NodeId)> {
        self.edges().map(|(a, b)| normalize_edge(a, b)).collect()
    }
}

/// Order an undirected edge as `(min, max)`.
pub fn normalize_edge(a: NodeId, b: NodeId) -> (NodeId, NodeId) {
    if a <= b { (a, b) } else { (b, a) }
}

impl PartialEq for Graph {
    /// Graphs are equal when they declare the same nodes in the same order
    /// and share the same edge set.
    fn eq(&self, other: &Self) -> bool {
        self.nodes().eq(other.nodes()) && self.edge_set() == other.edge_set()
    }
}

impl TryFrom<GraphRepr> for Graph {
    type Error = IrError;

    fn try_from(repr: GraphRepr) -> IrResult<Self> {
        Graph::from_parts(repr.nodes, repr.edges)
    }
}

impl From<Graph> for GraphRepr {
    fn from(graph: Graph) -> Self {
        GraphRepr {
            nodes: graph.nodes().collect(),
            edges: graph.edges().collect(),
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<String> = self.nodes().map(|n| n.to_string()).collect();
        let edges: Vec<String> = self.edges().map(|(a, b)| format!("{a}-{b}")).collect();
        write!(f, "nodes [{}] edges [{}]", nodes.join(", "), edges.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(id: u32) -> NodeId {
        NodeId(id)
    }

    #[test]
    fn test_from_parts() {
        let graph = Graph::from_parts([0u32, 1, 2], [(0, 1), (1, 2)]).unwrap();
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.degree(n(1)), 2);
        assert!(graph.contains_edge(n(2), n(1)));
    }

    #[test]
    fn test_enumeration_follows_insertion_order() {
        let graph = Graph::from_parts([5u32, 3, 9], [(9, 3), (5, 9)]).unwrap();
        let nodes: Vec<_> = graph.nodes().collect();
        assert_eq!(nodes, vec![n(5), n(3), n(9)]);
        let neighbors: Vec<_> = graph.neighbors(n(9)).collect();
        assert_eq!(neighbors, vec![n(3), n(5)]);
    }

    #[test]
    fn test_unknown_node_rejected() {
        let err = Graph::from_parts([0u32, 1], [(0, 7)]).unwrap_err();
        assert!(matches!(err, IrError::UnknownNode { node, .. } if node == n(7)));
    }

    #[test]
    fn test_self_loop_rejected() {
        let err = Graph::from_parts([0u32], [(0, 0)]).unwrap_err();
        assert!(matches!(err, IrError::SelfLoop(_)));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut graph = Graph::new();
        graph.add_node(1u32).unwrap();
        assert!(matches!(graph.add_node(1u32), Err(IrError::DuplicateNode(_))));
    }

    #[test]
    fn test_duplicate_edge_is_noop() {
        let mut graph = Graph::from_parts([0u32, 1], [(0, 1)]).unwrap();
        graph.add_edge(1u32, 0u32).unwrap();
        assert_eq!(graph.num_edges(), 1);
    }

    #[test]
    fn test_serde_roundtrip_preserves_order() {
        let graph = Graph::from_parts([2u32, 0, 1], [(0, 1), (2, 0)]).unwrap();
        let json = serde_json::to_string(&graph).unwrap();
        assert_eq!(json, r#"{"nodes":[2,0,1],"edges":[[0,1],[0,2]]}"#);
        let back: Graph = serde_json::from_str(&json).unwrap();
        assert_eq!(back, graph);
    }

    #[test]
    fn test_deserialize_rejects_dangling_edge() {
        let result: Result<Graph, _> = serde_json::from_str(r#"{"nodes":[0],"edges":[[0,1]]}"#);
        assert!(result.is_err());
    }
}
