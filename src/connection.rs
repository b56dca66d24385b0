//! Edit-time gate for connections drawn between step nodes.
//!
//! A proposal runs through the rules in order and the first failure is returned.
//! Nothing is mutated on rejection; accepted connections are added as
//! [`EdgeKind::Manual`] edges and can then be committed to the store with
//! [`StepStore::bind_callback`](crate::store::StepStore::bind_callback).

use crate::error::ConnectionError;
use crate::graph::{EdgeKind, GraphEdge, StepGraph};
use ahash::AHashSet;
use serde::{Deserialize, Serialize};

/// A proposed edge between two node ids (step codes).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub source: String,
    pub target: String,
}

impl Connection {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

type Rule = fn(&EditableGraph, &Connection) -> Result<(), ConnectionError>;

const RULES: [(&str, Rule); 4] = [
    ("self-loop", no_self_loop),
    ("reverse-duplicate", no_reverse_duplicate),
    ("single-outgoing", single_outgoing_default),
    ("known-nodes", known_nodes),
];

fn no_self_loop(_: &EditableGraph, connection: &Connection) -> Result<(), ConnectionError> {
    if connection.source == connection.target {
        return Err(ConnectionError::SelfLoop {
            node_id: connection.source.clone(),
        });
    }
    Ok(())
}

fn no_reverse_duplicate(graph: &EditableGraph, connection: &Connection) -> Result<(), ConnectionError> {
    if graph
        .edges
        .iter()
        .any(|e| e.connects(&connection.target, &connection.source))
    {
        return Err(ConnectionError::ReverseDuplicate {
            from: connection.source.clone(),
            to: connection.target.clone(),
        });
    }
    Ok(())
}

fn single_outgoing_default(graph: &EditableGraph, connection: &Connection) -> Result<(), ConnectionError> {
    if graph
        .edges
        .iter()
        .any(|e| e.source == connection.source && e.kind.is_default())
    {
        return Err(ConnectionError::MultipleOutgoing {
            from: connection.source.clone(),
        });
    }
    Ok(())
}

fn known_nodes(graph: &EditableGraph, connection: &Connection) -> Result<(), ConnectionError> {
    for id in [&connection.source, &connection.target] {
        if !graph.nodes.contains(id) {
            return Err(ConnectionError::UnknownNode(id.clone()));
        }
    }
    Ok(())
}

/// The edge set a canvas edits: the derived edges plus accepted manual ones.
#[derive(Debug, Clone, Default)]
pub struct EditableGraph {
    nodes: AHashSet<String>,
    edges: Vec<GraphEdge>,
}

impl EditableGraph {
    pub fn new(graph: &StepGraph) -> Self {
        Self {
            nodes: graph.nodes.iter().map(|n| n.id.clone()).collect(),
            edges: graph.edges.clone(),
        }
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    pub fn manual_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.kind == EdgeKind::Manual)
    }

    /// Checks `connection` against every rule without changing anything.
    pub fn validate(&self, connection: &Connection) -> Result<(), ConnectionError> {
        for (rule, check) in RULES {
            if let Err(err) = check(self, connection) {
                tracing::debug!(
                    rule,
                    source = %connection.source,
                    target = %connection.target,
                    "rejected connection"
                );
                return Err(err);
            }
        }
        Ok(())
    }

    /// Validates and, on success, adds the connection as a manual edge.
    pub fn connect(&mut self, connection: Connection) -> Result<&GraphEdge, ConnectionError> {
        self.validate(&connection)?;
        let edge = GraphEdge::new(EdgeKind::Manual, &connection.source, &connection.target);
        self.edges.push(edge);
        Ok(&self.edges[self.edges.len() - 1])
    }
}

impl From<&StepGraph> for EditableGraph {
    fn from(graph: &StepGraph) -> Self {
        Self::new(graph)
    }
}
