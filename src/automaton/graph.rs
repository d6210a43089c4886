//! Graph arena of labeled states and ordered labeled transitions.

use crate::automaton::state::{StateId, StateSet};
use crate::automaton::symbol::Symbol;
use indexmap::IndexMap;

/// A directed, labeled arc between two states.
///
/// The target is a plain label reference: the graph is a general directed
/// structure that may contain cycles (repetition loops), so no ownership
/// relation exists between states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// The transition label.
    pub symbol: Symbol,
    /// The target state.
    pub target: StateId,
}

/// A mutable directed labeled multigraph of automaton states.
///
/// States are kept in an arena indexed by label; labels are assigned in
/// strictly increasing allocation order starting at 0. Each state carries an
/// ordered list of outgoing transitions; insertion order is preserved and
/// determines traversal and export order. Duplicate labels out of one state
/// and self-loops are permitted.
#[derive(Debug, Clone, Default)]
pub struct StateGraph {
    /// Outgoing transitions per state, indexed by state label.
    states: Vec<Vec<Transition>>,
}

impl StateGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self { states: Vec::new() }
    }

    /// Allocate a new state and return its label.
    pub fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(Vec::new());
        id
    }

    /// Ensure a state exists, expanding the arena if needed.
    fn ensure_state(&mut self, state: StateId) {
        let idx = state as usize;
        if idx >= self.states.len() {
            self.states.resize_with(idx + 1, Vec::new);
        }
    }

    /// Append an outgoing transition from source to target.
    ///
    /// The symbol content is not validated and duplicates are not removed;
    /// the call always succeeds.
    pub fn add_transition(&mut self, source: StateId, symbol: Symbol, target: StateId) {
        self.ensure_state(source);
        self.ensure_state(target);
        self.states[source as usize].push(Transition { symbol, target });
    }

    /// Get the ordered outgoing transitions of a state.
    pub fn transitions(&self, state: StateId) -> &[Transition] {
        self.states
            .get(state as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Get the number of states.
    pub fn num_states(&self) -> StateId {
        self.states.len() as StateId
    }

    /// Get the total number of transitions.
    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(Vec::len).sum()
    }

    /// Iterate over all transitions as (source, transition) pairs, in state
    /// order and per-state insertion order.
    pub fn transitions_iter(&self) -> impl Iterator<Item = (StateId, &Transition)> + '_ {
        self.states
            .iter()
            .enumerate()
            .flat_map(|(src, ts)| ts.iter().map(move |t| (src as StateId, t)))
    }

    /// Compute the set of states reachable from any seed by following zero
    /// or more transitions labeled exactly with the given symbol.
    ///
    /// The result is duplicate-free, in first-discovery order of a
    /// depth-first traversal that explores transitions in insertion order.
    /// A visited guard makes the traversal terminate on cyclic graphs.
    pub fn closure(&self, seeds: &[StateId], symbol: &Symbol) -> Vec<StateId> {
        let mut seen = StateSet::with_capacity(self.states.len());
        let mut order = Vec::new();
        // Seeds and successors are pushed in reverse so the stack pops them
        // in insertion order, matching the recursive formulation.
        let mut stack: Vec<StateId> = seeds.iter().rev().copied().collect();

        while let Some(state) = stack.pop() {
            if seen.contains(state) {
                continue;
            }
            seen.insert(state);
            order.push(state);

            for t in self.transitions(state).iter().rev() {
                if t.symbol == *symbol && !seen.contains(t.target) {
                    stack.push(t.target);
                }
            }
        }

        order
    }

    /// Compute the closure of a single state.
    pub fn closure_from(&self, state: StateId, symbol: &Symbol) -> Vec<StateId> {
        self.closure(&[state], symbol)
    }

    /// Convert to a map representation for debugging, with transition
    /// labels in printed form.
    pub fn to_transition_map(&self) -> IndexMap<StateId, Vec<(String, StateId)>> {
        let mut map: IndexMap<StateId, Vec<(String, StateId)>> = IndexMap::new();

        for (src, t) in self.transitions_iter() {
            map.entry(src)
                .or_default()
                .push((t.symbol.to_string(), t.target));
        }

        map
    }
}
