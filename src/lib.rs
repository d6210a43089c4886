//! Thompson construction of epsilon-NFAs from regex syntax trees.
//!
//! This crate provides:
//! - A graph arena of labeled states and ordered, labeled transitions
//! - An [`Automaton`] capability trait (build from input data, export)
//! - Thompson's construction over a typed regex syntax tree ([`Ast`])
//! - Symbol-restricted closure computation (epsilon closure and beyond)
//! - A cytoscape-style graph-element export for visualization consumers
//!
//! Parsing regex strings into an [`Ast`], subset construction, and match
//! execution are external collaborators and not part of this crate.

pub mod automaton;
pub mod syntax;

pub use automaton::{
    Automaton, BuildError, GraphElement, Nfa, StateGraph, StateId, StateSet, Symbol, Transition,
};
pub use syntax::Ast;
