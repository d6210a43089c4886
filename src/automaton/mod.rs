//! Finite automaton primitives and construction.
//!
//! This module provides:
//! - A graph arena of labeled states with ordered, labeled transitions
//! - Symbol-restricted closure computation (epsilon closure and beyond)
//! - A graph-element export suitable for visualization consumers
//! - Thompson's construction of an epsilon-NFA from a regex syntax tree

mod export;
mod graph;
mod state;
mod symbol;
mod thompson;

pub use export::GraphElement;
pub use graph::{StateGraph, Transition};
pub use state::{StateId, StateSet};
pub use symbol::{Symbol, EPSILON_LABEL};
pub use thompson::Nfa;

use thiserror::Error;

/// A structural error in the input syntax tree.
///
/// Any of these aborts the whole build: the caller never observes a
/// partially constructed automaton. Unrecognized node kinds and missing
/// fields are unrepresentable in [`crate::syntax::Ast`] and fail earlier,
/// at the deserialization boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// An `or` or `cat` node with an empty parts list.
    #[error("`{kind}` node has an empty parts list")]
    EmptyParts { kind: &'static str },
    /// A `text` node whose symbol is the empty string.
    #[error("`text` node has an empty symbol")]
    EmptySymbol,
}

/// A finite automaton built from typed input data.
///
/// A successful build produces exactly one initial/accept state pair over a
/// fully constructed graph; both references are assigned once and never
/// reassigned. Concrete kinds supply the construction algorithm; the graph
/// export is shared.
pub trait Automaton: Sized {
    /// The input data the automaton is built from.
    type Input;

    /// Build the automaton from input data in a single call.
    fn build(input: &Self::Input) -> Result<Self, BuildError>;

    /// The underlying state graph.
    fn graph(&self) -> &StateGraph;

    /// The distinguished initial state.
    fn initial_state(&self) -> StateId;

    /// The distinguished accept state.
    fn accept_state(&self) -> StateId;

    /// Export the automaton as a combined sequence of vertex and edge
    /// descriptors, walking depth-first from the initial state.
    fn to_graph_elements(&self) -> Vec<GraphElement> {
        export::graph_elements(self.graph(), self.initial_state())
    }
}
