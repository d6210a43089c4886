//! Graph-element export for visualization and interchange consumers.

use crate::automaton::graph::StateGraph;
use crate::automaton::state::{StateId, StateSet};
use serde::Serialize;

/// A descriptor in the exported element sequence: either a vertex or an
/// edge.
///
/// The sequence is a single combined stream; serialization is untagged, so
/// consumers distinguish edges from vertices by the presence of the
/// `source`/`target` fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum GraphElement {
    /// A visited state.
    Vertex {
        /// The state label.
        id: StateId,
        /// Printed form of the label.
        label: String,
    },
    /// A traversed transition.
    Edge {
        /// Source state label.
        source: StateId,
        /// Target state label.
        target: StateId,
        /// Printed form of the transition symbol.
        label: String,
    },
}

impl GraphElement {
    fn vertex(id: StateId) -> Self {
        GraphElement::Vertex {
            id,
            label: id.to_string(),
        }
    }
}

/// Export the graph reachable from `initial` as a combined sequence of
/// vertex and edge descriptors.
///
/// The walk is depth-first; each state is expanded at most once, emitting
/// its vertex descriptor at discovery and its edge descriptors in
/// transition insertion order. Edges into already-visited states are still
/// emitted, exactly once, at the point they are traversed — the visited
/// guard applies to vertex re-expansion only, so cyclic automata terminate
/// without dropping back-edges.
pub fn graph_elements(graph: &StateGraph, initial: StateId) -> Vec<GraphElement> {
    let mut elements = Vec::new();
    let mut seen = StateSet::with_capacity(graph.num_states() as usize);

    seen.insert(initial);
    elements.push(GraphElement::vertex(initial));

    // Each frame is (state, index of the next outgoing transition to emit).
    let mut stack: Vec<(StateId, usize)> = vec![(initial, 0)];

    while let Some((state, idx)) = stack.pop() {
        let transitions = graph.transitions(state);
        let Some(t) = transitions.get(idx) else {
            continue; // state exhausted
        };
        stack.push((state, idx + 1));

        elements.push(GraphElement::Edge {
            source: state,
            target: t.target,
            label: t.symbol.to_string(),
        });

        if !seen.contains(t.target) {
            seen.insert(t.target);
            elements.push(GraphElement::vertex(t.target));
            stack.push((t.target, 0));
        }
    }

    elements
}
