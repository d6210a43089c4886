//! Symbol types for automata transitions.

use std::fmt;

/// Printed form of the epsilon marker.
pub const EPSILON_LABEL: &str = "ε";

/// A transition label: either the reserved epsilon marker or a literal
/// symbol.
///
/// Well-formed automata only use single-character literals, but the graph
/// layer accepts any string label, including multi-character ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// An epsilon transition, consumable without reading input.
    Epsilon,
    /// A literal alphabet symbol.
    Lit(String),
}

impl Symbol {
    /// Create a literal symbol.
    pub fn lit(symbol: impl Into<String>) -> Self {
        Symbol::Lit(symbol.into())
    }

    /// Check if this symbol is the epsilon marker.
    #[inline]
    pub fn is_epsilon(&self) -> bool {
        matches!(self, Symbol::Epsilon)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => f.write_str(EPSILON_LABEL),
            Symbol::Lit(s) => f.write_str(s),
        }
    }
}
