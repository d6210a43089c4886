//! Thompson's construction of an epsilon-NFA from a regex syntax tree.

use crate::automaton::graph::StateGraph;
use crate::automaton::state::StateId;
use crate::automaton::symbol::Symbol;
use crate::automaton::{Automaton, BuildError};
use crate::syntax::Ast;
use tracing::debug;

/// A nondeterministic finite automaton produced by Thompson's construction.
///
/// Every construct of the input tree maps to a fixed automaton fragment;
/// the whole build allocates state 0 as the initial state and the root
/// construct's accept state becomes the automaton's accept state.
#[derive(Debug, Clone)]
pub struct Nfa {
    graph: StateGraph,
    initial: StateId,
    accept: StateId,
}

impl Nfa {
    /// The set of states reachable from the seeds by epsilon transitions
    /// alone, in first-discovery order.
    pub fn epsilon_closure(&self, seeds: &[StateId]) -> Vec<StateId> {
        self.graph.closure(seeds, &Symbol::Epsilon)
    }

    /// The set of states reachable from the seeds by transitions carrying
    /// exactly the given symbol, in first-discovery order.
    pub fn closure(&self, seeds: &[StateId], symbol: &Symbol) -> Vec<StateId> {
        self.graph.closure(seeds, symbol)
    }
}

impl Automaton for Nfa {
    type Input = Ast;

    fn build(input: &Ast) -> Result<Self, BuildError> {
        Builder::new().run(input)
    }

    fn graph(&self) -> &StateGraph {
        &self.graph
    }

    fn initial_state(&self) -> StateId {
        self.initial
    }

    fn accept_state(&self) -> StateId {
        self.accept
    }
}

#[derive(Debug, Clone, Copy)]
enum RepeatKind {
    Star,
    Plus,
    Optional,
}

impl RepeatKind {
    /// Repetition (loop back to the inner initial state) is permitted.
    fn loops(self) -> bool {
        matches!(self, RepeatKind::Star | RepeatKind::Plus)
    }

    /// The zero-occurrence bypass to the final accept state is permitted.
    fn bypasses(self) -> bool {
        matches!(self, RepeatKind::Star | RepeatKind::Optional)
    }
}

/// A unit of pending work on the construction worklist.
///
/// `Enter` expands one syntax node; the other variants run after a
/// sub-construction has completed and consume its accept state from the
/// value stack. The worklist replaces the recursive walk so that input
/// nesting depth never bounds the call stack, while producing labels and
/// transitions in the exact order of the recursive formulation.
enum Task<'a> {
    Enter {
        node: &'a Ast,
        initial: StateId,
    },
    /// One alternation branch: allocate its entry state, then build it.
    Branch {
        part: &'a Ast,
        outer: StateId,
    },
    /// Join the last `count` branch accepts into one shared accept state.
    Join {
        count: usize,
    },
    /// Continue a concatenation from the previous part's accept state.
    Chain {
        rest: &'a [Ast],
    },
    /// Wire the loop/bypass epsilons of a repetition construct.
    CloseRepeat {
        kind: RepeatKind,
        outer: StateId,
        inner_initial: StateId,
    },
}

struct Builder<'a> {
    graph: StateGraph,
    tasks: Vec<Task<'a>>,
    /// Accept states of completed sub-constructions, innermost last.
    accepts: Vec<StateId>,
}

impl<'a> Builder<'a> {
    fn new() -> Self {
        Self {
            graph: StateGraph::new(),
            tasks: Vec::new(),
            accepts: Vec::new(),
        }
    }

    fn run(mut self, root: &'a Ast) -> Result<Nfa, BuildError> {
        let initial = self.graph.add_state();
        self.tasks.push(Task::Enter {
            node: root,
            initial,
        });

        while let Some(task) = self.tasks.pop() {
            match task {
                Task::Enter { node, initial } => self.enter(node, initial)?,
                Task::Branch { part, outer } => {
                    let entry = self.graph.add_state();
                    self.graph.add_transition(outer, Symbol::Epsilon, entry);
                    self.tasks.push(Task::Enter {
                        node: part,
                        initial: entry,
                    });
                }
                Task::Join { count } => self.join(count),
                Task::Chain { rest } => {
                    let initial = self.pop_accept();
                    // Invariant: Chain is only scheduled with work left.
                    let (next, rest) = rest.split_first().expect("non-empty chain");
                    if !rest.is_empty() {
                        self.tasks.push(Task::Chain { rest });
                    }
                    self.tasks.push(Task::Enter {
                        node: next,
                        initial,
                    });
                }
                Task::CloseRepeat {
                    kind,
                    outer,
                    inner_initial,
                } => self.close_repeat(kind, outer, inner_initial),
            }
        }

        let accept = self.pop_accept();
        debug!(
            states = self.graph.num_states(),
            transitions = self.graph.num_transitions(),
            "thompson construction complete"
        );

        Ok(Nfa {
            graph: self.graph,
            initial,
            accept,
        })
    }

    /// Expand one syntax node starting at the given initial state.
    ///
    /// Validation runs before the node allocates anything, so a structural
    /// error leaves no trace of the offending construct.
    fn enter(&mut self, node: &'a Ast, initial: StateId) -> Result<(), BuildError> {
        match node {
            Ast::Empty => {
                let accept = self.graph.add_state();
                self.graph.add_transition(initial, Symbol::Epsilon, accept);
                self.accepts.push(accept);
            }
            Ast::Text { symbol } => {
                if symbol.is_empty() {
                    return Err(BuildError::EmptySymbol);
                }
                let accept = self.graph.add_state();
                self.graph
                    .add_transition(initial, Symbol::lit(symbol.clone()), accept);
                self.accepts.push(accept);
            }
            Ast::Or { parts } => {
                if parts.is_empty() {
                    return Err(BuildError::EmptyParts { kind: "or" });
                }
                // Tasks pop in reverse push order: branches build left to
                // right, then the join collects their accepts.
                self.tasks.push(Task::Join { count: parts.len() });
                for part in parts.iter().rev() {
                    self.tasks.push(Task::Branch {
                        part,
                        outer: initial,
                    });
                }
            }
            Ast::Cat { parts } => {
                let Some((first, rest)) = parts.split_first() else {
                    return Err(BuildError::EmptyParts { kind: "cat" });
                };
                if !rest.is_empty() {
                    self.tasks.push(Task::Chain { rest });
                }
                self.tasks.push(Task::Enter {
                    node: first,
                    initial,
                });
            }
            Ast::Star { sub } => self.enter_repeat(RepeatKind::Star, sub, initial),
            Ast::Plus { sub } => self.enter_repeat(RepeatKind::Plus, sub, initial),
            Ast::Optional { sub } => self.enter_repeat(RepeatKind::Optional, sub, initial),
        }
        Ok(())
    }

    fn enter_repeat(&mut self, kind: RepeatKind, sub: &'a Ast, outer: StateId) {
        let inner_initial = self.graph.add_state();
        self.graph
            .add_transition(outer, Symbol::Epsilon, inner_initial);
        self.tasks.push(Task::CloseRepeat {
            kind,
            outer,
            inner_initial,
        });
        self.tasks.push(Task::Enter {
            node: sub,
            initial: inner_initial,
        });
    }

    fn close_repeat(&mut self, kind: RepeatKind, outer: StateId, inner_initial: StateId) {
        let inner_accept = self.pop_accept();
        let accept = self.graph.add_state();
        self.graph
            .add_transition(inner_accept, Symbol::Epsilon, accept);
        if kind.loops() {
            self.graph
                .add_transition(inner_accept, Symbol::Epsilon, inner_initial);
        }
        if kind.bypasses() {
            self.graph.add_transition(outer, Symbol::Epsilon, accept);
        }
        self.accepts.push(accept);
    }

    fn join(&mut self, count: usize) {
        let accept = self.graph.add_state();
        let first = self.accepts.len() - count;
        for &part_accept in &self.accepts[first..] {
            self.graph
                .add_transition(part_accept, Symbol::Epsilon, accept);
        }
        self.accepts.truncate(first);
        self.accepts.push(accept);
    }

    fn pop_accept(&mut self) -> StateId {
        // Invariant: every completed sub-construction pushed its accept.
        self.accepts.pop().expect("accept state on value stack")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::GraphElement;

    fn build(ast: &Ast) -> Nfa {
        Nfa::build(ast).unwrap()
    }

    fn edge_count(nfa: &Nfa, label: &str) -> usize {
        nfa.graph()
            .transitions_iter()
            .filter(|(_, t)| t.symbol.to_string() == label)
            .count()
    }

    #[test]
    fn test_literal() {
        let nfa = build(&Ast::text("a"));
        assert_eq!(nfa.graph().num_states(), 2);
        assert_eq!(nfa.graph().num_transitions(), 1);
        assert_eq!(nfa.initial_state(), 0);
        assert_eq!(nfa.accept_state(), 1);

        let t = &nfa.graph().transitions(0)[0];
        assert_eq!(t.symbol, Symbol::lit("a"));
        assert_eq!(t.target, 1);
    }

    #[test]
    fn test_empty() {
        let nfa = build(&Ast::Empty);
        assert_eq!(nfa.graph().num_states(), 2);
        let t = &nfa.graph().transitions(0)[0];
        assert!(t.symbol.is_epsilon());
        assert_eq!(t.target, nfa.accept_state());
    }

    #[test]
    fn test_labels_are_allocation_ordered() {
        // or([a, b]) allocates: initial, entry_a, accept_a, entry_b,
        // accept_b, shared accept.
        let nfa = build(&Ast::or(vec![Ast::text("a"), Ast::text("b")]));
        assert_eq!(nfa.initial_state(), 0);
        assert_eq!(nfa.accept_state(), 5);

        let map = nfa.graph().to_transition_map();
        assert_eq!(map[&0], vec![("ε".to_string(), 1), ("ε".to_string(), 3)]);
        assert_eq!(map[&1], vec![("a".to_string(), 2)]);
        assert_eq!(map[&3], vec![("b".to_string(), 4)]);
        assert_eq!(map[&2], vec![("ε".to_string(), 5)]);
        assert_eq!(map[&4], vec![("ε".to_string(), 5)]);
    }

    #[test]
    fn test_cat_adds_no_states_or_transitions() {
        let x = Ast::star(Ast::text("a"));
        let y = Ast::or(vec![Ast::text("b"), Ast::Empty]);

        let nfa_x = build(&x);
        let nfa_y = build(&y);
        let nfa_cat = build(&Ast::cat(vec![x.clone(), y.clone()]));

        // The two independent builds each allocate their own initial
        // state; the concatenation shares one.
        assert_eq!(
            nfa_cat.graph().num_states(),
            nfa_x.graph().num_states() + nfa_y.graph().num_states() - 1
        );
        assert_eq!(
            nfa_cat.graph().num_transitions(),
            nfa_x.graph().num_transitions() + nfa_y.graph().num_transitions()
        );
    }

    #[test]
    fn test_single_part_cat_degenerates() {
        let direct = build(&Ast::text("a"));
        let wrapped = build(&Ast::cat(vec![Ast::text("a")]));
        assert_eq!(
            wrapped.graph().num_states(),
            direct.graph().num_states()
        );
        assert_eq!(wrapped.accept_state(), direct.accept_state());
    }

    #[test]
    fn test_or_size_law() {
        let x = Ast::text("a");
        let y = Ast::plus(Ast::text("b"));

        let nfa_x = build(&x);
        let nfa_y = build(&y);
        let nfa_or = build(&Ast::or(vec![x.clone(), y.clone()]));

        // Two entry states and one shared accept on top of the parts'
        // states (the parts' own initial states become the entries, so
        // against two independent builds the difference is +2).
        assert_eq!(
            nfa_or.graph().num_states(),
            nfa_x.graph().num_states() + nfa_y.graph().num_states() + 2
        );
        // Two epsilon-in plus two epsilon-out-to-accept transitions.
        assert_eq!(
            nfa_or.graph().num_transitions(),
            nfa_x.graph().num_transitions() + nfa_y.graph().num_transitions() + 4
        );
    }

    #[test]
    fn test_star_topology() {
        // States: 0 initial, 1 inner initial, 2 inner accept, 3 accept.
        let nfa = build(&Ast::star(Ast::text("a")));
        assert_eq!(nfa.graph().num_states(), 4);

        let closure = nfa.epsilon_closure(&[nfa.initial_state()]);
        // Zero-occurrence bypass and one-occurrence entry both exist.
        assert!(closure.contains(&nfa.accept_state()));
        assert!(closure.contains(&1));
        // Loop back: the inner accept reaches the inner initial.
        assert!(nfa.epsilon_closure(&[2]).contains(&1));
    }

    #[test]
    fn test_plus_topology() {
        let nfa = build(&Ast::plus(Ast::text("a")));
        assert_eq!(nfa.graph().num_states(), 4);

        let closure = nfa.epsilon_closure(&[nfa.initial_state()]);
        // Entry into the sub-automaton, but no zero-occurrence bypass.
        assert!(closure.contains(&1));
        assert!(!closure.contains(&nfa.accept_state()));
        // The accept state is reachable only after traversing the sub:
        // from the inner accept the loop-back and the exit both exist.
        let after_a = nfa.epsilon_closure(&[2]);
        assert!(after_a.contains(&nfa.accept_state()));
        assert!(after_a.contains(&1));
    }

    #[test]
    fn test_optional_topology() {
        let nfa = build(&Ast::optional(Ast::text("a")));
        assert_eq!(nfa.graph().num_states(), 4);

        let closure = nfa.epsilon_closure(&[nfa.initial_state()]);
        assert!(closure.contains(&nfa.accept_state()));
        assert!(closure.contains(&1));

        // No repetition: nothing loops back into the inner initial state
        // besides the single entry epsilon from the outer initial.
        let into_inner: Vec<StateId> = nfa
            .graph()
            .transitions_iter()
            .filter(|(_, t)| t.target == 1)
            .map(|(src, _)| src)
            .collect();
        assert_eq!(into_inner, vec![nfa.initial_state()]);
    }

    #[test]
    fn test_closure_idempotent_and_monotonic() {
        let nfa = build(&Ast::star(Ast::or(vec![Ast::text("a"), Ast::Empty])));

        let once = nfa.epsilon_closure(&[nfa.initial_state()]);
        let twice = nfa.epsilon_closure(&once);
        let mut once_sorted = once.clone();
        once_sorted.sort_unstable();
        let mut twice_sorted = twice.clone();
        twice_sorted.sort_unstable();
        assert_eq!(once_sorted, twice_sorted);

        // Closing a subset yields a subset of the full closure.
        let sub = nfa.epsilon_closure(&once[..1]);
        assert!(sub.iter().all(|s| once.contains(s)));

        // No duplicates regardless of seed ordering.
        let mut seeds = once.clone();
        seeds.reverse();
        let reversed = nfa.epsilon_closure(&seeds);
        assert_eq!(reversed.len(), once.len());
        let mut reversed_sorted = reversed;
        reversed_sorted.sort_unstable();
        assert_eq!(reversed_sorted, once_sorted);
    }

    #[test]
    fn test_closure_over_literal_symbol() {
        // a|a from one state: both literal edges are reachable territory
        // when closing over "a".
        let nfa = build(&Ast::or(vec![Ast::text("a"), Ast::text("a")]));
        let from_entries = nfa.closure(&[1, 3], &Symbol::lit("a"));
        assert_eq!(from_entries, vec![1, 2, 3, 4]);
        // Closing over a symbol the state has no edges for is just the seed.
        assert_eq!(nfa.closure(&[1], &Symbol::lit("b")), vec![1]);
    }

    #[test]
    fn test_export_completeness() {
        let nfa = build(&Ast::cat(vec![Ast::text("a"), Ast::text("b")]));
        let elements = nfa.to_graph_elements();

        let mut vertex_ids = Vec::new();
        let mut edges = Vec::new();
        for element in &elements {
            match element {
                GraphElement::Vertex { id, .. } => vertex_ids.push(*id),
                GraphElement::Edge {
                    source,
                    target,
                    label,
                } => edges.push((*source, *target, label.clone())),
            }
        }

        assert_eq!(vertex_ids, vec![0, 1, 2]);
        assert_eq!(
            edges,
            vec![(0, 1, "a".to_string()), (1, 2, "b".to_string())]
        );
        // Every edge endpoint is a reported vertex.
        assert!(edges
            .iter()
            .all(|(s, t, _)| vertex_ids.contains(s) && vertex_ids.contains(t)));
    }

    #[test]
    fn test_export_terminates_on_repetition_loops() {
        for ast in [
            Ast::star(Ast::text("a")),
            Ast::plus(Ast::text("a")),
            Ast::star(Ast::plus(Ast::or(vec![Ast::text("a"), Ast::text("b")]))),
        ] {
            let nfa = build(&ast);
            let elements = nfa.to_graph_elements();

            let mut vertex_ids: Vec<StateId> = elements
                .iter()
                .filter_map(|e| match e {
                    GraphElement::Vertex { id, .. } => Some(*id),
                    GraphElement::Edge { .. } => None,
                })
                .collect();
            let unique = vertex_ids.len();
            vertex_ids.sort_unstable();
            vertex_ids.dedup();
            assert_eq!(vertex_ids.len(), unique, "looped vertex exported twice");

            // Every transition of the (fully reachable) automaton appears
            // exactly once.
            let edge_total = elements.len() - unique;
            assert_eq!(edge_total, nfa.graph().num_transitions());
        }
    }

    #[test]
    fn test_epsilon_label_in_export() {
        let nfa = build(&Ast::Empty);
        assert_eq!(edge_count(&nfa, "ε"), 1);
    }

    #[test]
    fn test_empty_or_fails() {
        let err = Nfa::build(&Ast::or(vec![])).unwrap_err();
        assert_eq!(err, BuildError::EmptyParts { kind: "or" });
    }

    #[test]
    fn test_empty_cat_fails_even_nested() {
        let err = Nfa::build(&Ast::cat(vec![Ast::text("a"), Ast::cat(vec![])])).unwrap_err();
        assert_eq!(err, BuildError::EmptyParts { kind: "cat" });
        assert_eq!(err.to_string(), "`cat` node has an empty parts list");
    }

    #[test]
    fn test_empty_symbol_fails() {
        let err = Nfa::build(&Ast::star(Ast::text(""))).unwrap_err();
        assert_eq!(err, BuildError::EmptySymbol);
    }

    #[test]
    fn test_deep_nesting_does_not_overflow() {
        let mut ast = Ast::text("a");
        for _ in 0..10_000 {
            ast = Ast::star(ast);
        }
        let nfa = build(&ast);
        // Two states per star wrapper plus the literal pair.
        assert_eq!(nfa.graph().num_states(), 2 * 10_000 + 2);
        assert!(nfa
            .epsilon_closure(&[nfa.initial_state()])
            .contains(&nfa.accept_state()));
    }
}
