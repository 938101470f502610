//! Cluster decomposition of entanglement graphs.
//!
//! The decomposer partitions the edge set of a [`Graph`] into clusters that a
//! fixed optical generator can produce:
//!
//! - **GHZ**: a star, hub first, or any pattern with fewer than 4 nodes.
//! - **LINEAR**: a simple path of at least 4 nodes, in walk order.
//!
//! Nodes of remaining degree 3 or more become star hubs first, in node
//! order. What is left has maximum degree 2 and splits into paths and
//! cycles. A cycle `v0 … v(n-1)` is cut into the two segments
//! `v0..=vk` and `vk..=v(n-1), v0` with `k = min(⌊n/2⌋, 2)`: a triangle gives
//! an edge and a 3-node GHZ, every longer cycle gives a 3-node GHZ and a
//! LINEAR remainder (a square: two 3-node GHZs). A node that lands in
//! more than one cluster keeps its id in each; the photon registry later
//! reconnects the copies through fusion.

use std::fmt;

use fusegraph_ir::{Graph, NodeId, normalize_edge};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Generator archetype of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClusterKind {
    /// Star-shaped GHZ generator.
    Ghz,
    /// Chain-shaped generator.
    Linear,
}

impl fmt::Display for ClusterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClusterKind::Ghz => write!(f, "GHZ"),
            ClusterKind::Linear => write!(f, "LINEAR"),
        }
    }
}

/// A sub-pattern of the entanglement graph.
///
/// The graph's node order is the photon order of the cluster: the hub comes
/// first in a star, and a chain lists its nodes from one end to the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cluster {
    kind: ClusterKind,
    graph: Graph,
}

impl Cluster {
    /// Create a cluster, checking that the graph has the shape the kind requires.
    pub fn new(kind: ClusterKind, graph: Graph) -> CompileResult<Self> {
        let nodes: Vec<NodeId> = graph.nodes().collect();
        let n = nodes.len();
        let valid = match kind {
            ClusterKind::Ghz => n < 4 || is_star(&graph, &nodes),
            ClusterKind::Linear => n >= 4 && is_path(&graph, &nodes),
        };
        if !valid {
            return Err(CompileError::UnsupportedCluster(format!(
                "{kind} cluster over {graph}"
            )));
        }
        Ok(Self { kind, graph })
    }

    /// Generator archetype.
    pub fn kind(&self) -> ClusterKind {
        self.kind
    }

    /// The cluster's nodes and edges.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Nodes in photon order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.nodes()
    }

    /// Number of photons the cluster needs.
    pub fn len(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Check whether the cluster has no nodes.
    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes: Vec<String> = self.nodes().map(|n| n.to_string()).collect();
        write!(f, "{}({})", self.kind, nodes.join(", "))
    }
}

fn is_star(graph: &Graph, nodes: &[NodeId]) -> bool {
    let Some((&hub, leaves)) = nodes.split_first() else {
        return false;
    };
    graph.num_edges() == leaves.len() && leaves.iter().all(|&leaf| graph.contains_edge(hub, leaf))
}

fn is_path(graph: &Graph, nodes: &[NodeId]) -> bool {
    graph.num_edges() + 1 == nodes.len()
        && nodes.windows(2).all(|w| graph.contains_edge(w[0], w[1]))
}

/// Edge bookkeeping shared by the decomposition phases.
struct Decomposer<'a> {
    graph: &'a Graph,
    consumed: FxHashSet<(NodeId, NodeId)>,
    clusters: Vec<Cluster>,
}

impl<'a> Decomposer<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            consumed: FxHashSet::default(),
            clusters: vec![],
        }
    }

    /// Neighbors of `node` reachable over unconsumed edges, in edge order.
    fn remaining(&self, node: NodeId) -> Vec<NodeId> {
        self.graph
            .neighbors(node)
            .filter(|&m| !self.consumed.contains(&normalize_edge(node, m)))
            .collect()
    }

    fn push(
        &mut self,
        kind: ClusterKind,
        nodes: Vec<NodeId>,
        edges: Vec<(NodeId, NodeId)>,
    ) -> CompileResult<()> {
        for &(a, b) in &edges {
            self.consumed.insert(normalize_edge(a, b));
        }
        let cluster = Cluster::new(kind, Graph::from_parts(nodes, edges)?)?;
        debug!("Cluster {}: {}", self.clusters.len(), cluster);
        self.clusters.push(cluster);
        Ok(())
    }

    fn extract_stars(&mut self) -> CompileResult<()> {
        let graph = self.graph;
        for hub in graph.nodes() {
            let leaves = self.remaining(hub);
            if leaves.len() >= 3 {
                let edges = leaves.iter().map(|&leaf| (hub, leaf)).collect();
                let nodes = std::iter::once(hub).chain(leaves).collect();
                self.push(ClusterKind::Ghz, nodes, edges)?;
            }
        }
        Ok(())
    }

    fn extract_chains(&mut self) -> CompileResult<()> {
        let graph = self.graph;
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        for node in graph.nodes() {
            if seen.contains(&node) {
                continue;
            }
            if graph.degree(node) == 0 {
                seen.insert(node);
                self.push(ClusterKind::Ghz, vec![node], vec![])?;
                continue;
            }
            if self.remaining(node).is_empty() {
                continue;
            }

            let component = self.component(node, &mut seen);
            let endpoint = component
                .iter()
                .copied()
                .find(|&n| self.remaining(n).len() == 1);
            match endpoint {
                Some(start) => {
                    let path = self.walk(start);
                    self.push_segment(path)?;
                }
                None => {
                    let cycle = self.walk(component[0]);
                    let k = (cycle.len() / 2).min(2);
                    let first = cycle[..=k].to_vec();
                    let mut second = cycle[k..].to_vec();
                    second.push(cycle[0]);
                    debug!("Cutting cycle of {} nodes at {} and {}", cycle.len(), cycle[0], cycle[k]);
                    self.push_segment(first)?;
                    self.push_segment(second)?;
                }
            }
        }
        Ok(())
    }

    /// Nodes connected to `start` over unconsumed edges, in node order.
    fn component(&self, start: NodeId, seen: &mut FxHashSet<NodeId>) -> Vec<NodeId> {
        let mut members: FxHashSet<NodeId> = FxHashSet::default();
        let mut stack = vec![start];
        members.insert(start);
        while let Some(node) = stack.pop() {
            for next in self.remaining(node) {
                if members.insert(next) {
                    stack.push(next);
                }
            }
        }
        seen.extend(members.iter().copied());
        self.graph.nodes().filter(|n| members.contains(n)).collect()
    }

    /// Walk a degree-2 component from `start` until it ends or closes.
    fn walk(&self, start: NodeId) -> Vec<NodeId> {
        let mut path = vec![start];
        let mut prev: Option<NodeId> = None;
        let mut current = start;
        loop {
            let next = self
                .remaining(current)
                .into_iter()
                .find(|&m| Some(m) != prev && m != start);
            match next {
                Some(m) if !path.contains(&m) => {
                    prev = Some(current);
                    current = m;
                    path.push(m);
                }
                _ => break,
            }
        }
        path
    }

    fn push_segment(&mut self, mut path: Vec<NodeId>) -> CompileResult<()> {
        let edges: Vec<_> = path.windows(2).map(|w| (w[0], w[1])).collect();
        if path.len() < 4 {
            if path.len() == 3 {
                path.swap(0, 1);
            }
            self.push(ClusterKind::Ghz, path, edges)
        } else {
            self.push(ClusterKind::Linear, path, edges)
        }
    }
}

/// Partition `graph` into GHZ and LINEAR clusters.
///
/// Every edge ends up in exactly one cluster; isolated nodes become
/// single-photon GHZ clusters. The output depends only on the node and edge
/// enumeration order of `graph`.
pub fn decompose(graph: &Graph) -> CompileResult<Vec<Cluster>> {
    let mut decomposer = Decomposer::new(graph);
    decomposer.extract_stars()?;
    decomposer.extract_chains()?;
    Ok(decomposer.clusters)
}
