use crate::workflow::Step;
use serde::{Deserialize, Serialize};

/// Canvas coordinates of a node.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Why an edge exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Implied by adjacent sequence levels.
    Sequence,
    /// Declared through a step's `callbackStepCode`.
    Callback,
    /// Drawn by the author and not yet committed to the store.
    Manual,
}

impl EdgeKind {
    /// Callback edges reroute flow; every other kind is a default connection.
    pub fn is_default(&self) -> bool {
        !matches!(self, EdgeKind::Callback)
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            EdgeKind::Sequence => "seq",
            EdgeKind::Callback => "cb",
            EdgeKind::Manual => "manual",
        }
    }

    pub fn style(&self) -> EdgeStyle {
        match self {
            EdgeKind::Sequence => EdgeStyle {
                animated: false,
                dashed: false,
                z_index: 0,
            },
            EdgeKind::Callback => EdgeStyle {
                animated: false,
                dashed: true,
                z_index: 1,
            },
            EdgeKind::Manual => EdgeStyle {
                animated: true,
                dashed: false,
                z_index: 2,
            },
        }
    }
}

/// Rendering hints so callback and authored edges stand apart from sequence flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub animated: bool,
    pub dashed: bool,
    pub z_index: i32,
}

/// One node per step, keyed by the step's code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    pub id: String,
    /// Position of the step in the store's list, for display only.
    pub index: usize,
    /// Rank of the step's sequence value among the distinct sequence values.
    pub level: usize,
    pub position: Position,
    pub has_error: bool,
    pub step: Step,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub style: EdgeStyle,
    pub has_error: bool,
}

impl GraphEdge {
    pub fn new(kind: EdgeKind, source: &str, target: &str) -> Self {
        Self {
            id: format!("{}-{}-{}", kind.id_prefix(), source, target),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            style: kind.style(),
            has_error: false,
        }
    }

    pub fn connects(&self, source: &str, target: &str) -> bool {
        self.source == source && self.target == target
    }
}

/// The renderable graph derived from a step list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StepGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl StepGraph {
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.kind == kind)
    }

    pub fn has_edge(&self, source: &str, target: &str) -> bool {
        self.edges.iter().any(|e| e.connects(source, target))
    }
}
