//! Regex syntax tree, the contract with the external parser.

use serde::{Deserialize, Serialize};

/// A regex syntax tree node, tagged with one of the five construct kinds.
///
/// This is the shape the external parsing collaborator produces: `text`
/// carries its literal `symbol`, `or`/`cat` carry an ordered list of
/// `parts`, and the repetition kinds wrap exactly one `sub` node. Trees
/// serialized by such a parser deserialize directly; an unrecognized kind
/// or a missing field fails at the deserialization boundary with an error
/// naming the offender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Ast {
    /// Matches the empty string.
    Empty,
    /// Matches one literal alphabet symbol.
    Text { symbol: String },
    /// Alternation over an ordered list of sub-nodes.
    Or { parts: Vec<Ast> },
    /// Concatenation over an ordered list of sub-nodes.
    Cat { parts: Vec<Ast> },
    /// Zero or more repetitions of the sub-node.
    Star { sub: Box<Ast> },
    /// One or more repetitions of the sub-node.
    Plus { sub: Box<Ast> },
    /// Zero or one occurrence of the sub-node.
    Optional { sub: Box<Ast> },
}

impl Ast {
    /// A `text` node matching the given literal symbol.
    pub fn text(symbol: impl Into<String>) -> Self {
        Ast::Text {
            symbol: symbol.into(),
        }
    }

    /// An `or` node over the given parts.
    pub fn or(parts: Vec<Ast>) -> Self {
        Ast::Or { parts }
    }

    /// A `cat` node over the given parts.
    pub fn cat(parts: Vec<Ast>) -> Self {
        Ast::Cat { parts }
    }

    /// A `star` node wrapping the given sub-node.
    pub fn star(sub: Ast) -> Self {
        Ast::Star { sub: Box::new(sub) }
    }

    /// A `plus` node wrapping the given sub-node.
    pub fn plus(sub: Ast) -> Self {
        Ast::Plus { sub: Box::new(sub) }
    }

    /// An `optional` node wrapping the given sub-node.
    pub fn optional(sub: Ast) -> Self {
        Ast::Optional { sub: Box::new(sub) }
    }
}
