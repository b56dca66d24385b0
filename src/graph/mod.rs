//! Derivation of the renderable step graph.
//!
//! The graph is never stored: it is rebuilt in full from the current step list
//! whenever the list or its error map changes. Levels come from the distinct
//! `sequence` values in ascending order, so a single edit can reshuffle every
//! level below it.

mod types;

pub use types::*;

use crate::config::LayoutConfig;
use crate::store::ErrorMap;
use crate::workflow::Step;
use ahash::AHashMap;
use itertools::Itertools;

/// Builds nodes and edges for `steps`.
///
/// * One node per step, at `(slot * horizontal_spacing, level * vertical_spacing)`
///   relative to the layout origin; slots follow list order within a level.
/// * A sequence edge from every node of a level to every node of the next level.
/// * A callback edge for every `callbackStepCode` that resolves to a step.
///   Unresolved codes produce nothing.
pub fn derive_graph(steps: &[Step], errors: &ErrorMap, layout: &LayoutConfig) -> StepGraph {
    let levels: Vec<Vec<usize>> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| (step.sequence, index))
        .into_group_map()
        .into_iter()
        .sorted_by_key(|(sequence, _)| *sequence)
        .map(|(_, members)| members)
        .collect();

    let mut placement = vec![(0usize, 0usize); steps.len()];
    for (level, members) in levels.iter().enumerate() {
        for (slot, &index) in members.iter().enumerate() {
            placement[index] = (level, slot);
        }
    }

    let flagged: Vec<bool> = (0..steps.len())
        .map(|i| errors.step_has_errors(i))
        .collect();

    let nodes: Vec<GraphNode> = steps
        .iter()
        .enumerate()
        .map(|(index, step)| {
            let (level, slot) = placement[index];
            GraphNode {
                id: step.step_code.to_string(),
                index,
                level,
                position: Position {
                    x: layout.origin_x + slot as f64 * layout.horizontal_spacing,
                    y: layout.origin_y + level as f64 * layout.vertical_spacing,
                },
                has_error: flagged[index],
                step: step.clone(),
            }
        })
        .collect();

    let edge_between = |kind: EdgeKind, from: usize, to: usize| {
        let mut edge = GraphEdge::new(kind, &nodes[from].id, &nodes[to].id);
        edge.has_error = flagged[from] || flagged[to];
        edge
    };

    let mut edges: Vec<GraphEdge> = levels
        .iter()
        .tuple_windows()
        .flat_map(|(previous, current)| previous.iter().cartesian_product(current.iter()))
        .map(|(&from, &to)| edge_between(EdgeKind::Sequence, from, to))
        .collect();

    let mut by_code: AHashMap<&str, usize> = AHashMap::with_capacity(steps.len());
    for (index, step) in steps.iter().enumerate() {
        by_code.entry(step.step_code.as_str()).or_insert(index);
    }

    edges.extend(steps.iter().enumerate().filter_map(|(from, step)| {
        let code = step.callback_step_code.as_ref()?;
        let to = *by_code.get(code.as_str())?;
        Some(edge_between(EdgeKind::Callback, from, to))
    }));

    tracing::trace!(
        nodes = nodes.len(),
        edges = edges.len(),
        levels = levels.len(),
        "derived step graph"
    );

    StepGraph { nodes, edges }
}
