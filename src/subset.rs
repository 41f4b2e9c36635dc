/* Subset construction: the epsilon closure and move engines and the worklist driver which turns
 * an NFA into a DFA whose states are sets of NFA states. */

use bitvec::prelude::*;
use color_eyre::eyre::{Report, Result};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use tracing::{debug, trace};

use crate::dfa::DFA;
use crate::fa::{Symbol, FA};
use crate::nfa::NFA;
use crate::state_set::StateSet;

/// Structural errors found while running the construction
#[derive(Debug, PartialEq, Eq)]
pub enum SubsetError {
    /// A move was requested on a character the NFA alphabet does not contain
    UnknownSymbol(char),
    /// A state set sized for a different NFA was handed to an engine
    CapacityMismatch { expected: usize, found: usize },
}

impl fmt::Display for SubsetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetError::UnknownSymbol(ch) => {
                write!(f, "Error: Cannot move on {}, it is not in the alphabet!", ch)
            }
            SubsetError::CapacityMismatch { expected, found } => write!(
                f,
                "Error: State set holds {} ids but the NFA has {}",
                found, expected
            ),
        }
    }
}

impl std::error::Error for SubsetError {}

/// One intermediate computation of the construction, in the order it happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceStep {
    /// The closure of the NFA start state became DFA state `dfa_state`
    InitialClosure { closure: StateSet, dfa_state: usize },
    /// `dfa_state` is about to have its transitions computed
    Mark { dfa_state: usize },
    /// Moving `from` on `symbol`. `target` is `None` when the move is empty, `created` tells
    /// whether the target was discovered by this step.
    Move {
        from: StateSet,
        symbol: char,
        moved: StateSet,
        closure: StateSet,
        target: Option<usize>,
        created: bool,
    },
}

/// Every state reachable from `states` using epsilon transitions only, `states` included.
/// `states` must be sized for `nfa`, see `NFA::state_set`.
pub fn epsilon_closure(nfa: &NFA, states: &StateSet) -> StateSet {
    debug_assert_eq!(
        states.capacity(),
        nfa.id_bound(),
        "state set sized for a different NFA"
    );
    let mut closure: BitVec<u8> = states.as_bitslice().to_bitvec();
    closure.resize(nfa.id_bound(), false);

    let mut work_list: VecDeque<usize> = states.iter().collect();

    while let Some(state) = work_list.pop_front() {
        let state = match nfa.get_state(state) {
            Some(state) => state,
            None => continue,
        };

        for target in state.get_targets(Symbol::Epsilon) {
            if !closure[target] {
                closure.set(target, true);
                work_list.push_back(target);
            }
        }
    }

    StateSet::new(closure)
}

/// The set of states reachable from any state in `states` with a single transition on `c`
pub fn delta(nfa: &NFA, states: &StateSet, c: char) -> Result<StateSet> {
    if !nfa.has_symbol(c) {
        return Err(Report::new(SubsetError::UnknownSymbol(c)));
    }
    if states.capacity() != nfa.id_bound() {
        return Err(Report::new(SubsetError::CapacityMismatch {
            expected: nfa.id_bound(),
            found: states.capacity(),
        }));
    }

    let mut result: BitVec<u8> = BitVec::repeat(false, nfa.id_bound());
    for node in states.iter() {
        let nfa_state = match nfa.get_state(node) {
            None => continue,
            Some(nfa_state) => nfa_state,
        };
        for target in nfa_state.get_targets(Symbol::Char(c)) {
            result.set(target, true);
        }
    }
    Ok(StateSet::new(result))
}

/// Apply the subset construction algorithm on an NFA to build a DFA
pub fn construct_dfa(nfa: &NFA) -> Result<DFA> {
    run_construction(nfa, &mut |_| {})
}

/// Same as `construct_dfa` but also returns every closure and move computed on the way
pub fn construct_dfa_with_trace(nfa: &NFA) -> Result<(DFA, Vec<TraceStep>)> {
    let mut steps = Vec::new();
    let dfa = run_construction(nfa, &mut |step| steps.push(step))?;
    Ok((dfa, steps))
}

fn run_construction(nfa: &NFA, record: &mut dyn FnMut(TraceStep)) -> Result<DFA> {
    let mut result = DFA::new(nfa.get_alphabet().to_vec());
    let mut q_list: HashMap<StateSet, usize> = HashMap::new(); // Reverse index from NFA state set to DFA state
    let mut work_list: VecDeque<usize> = VecDeque::new();

    let start = nfa.state_set([nfa.get_start_state()]);
    let q0 = epsilon_closure(nfa, &start);
    let d0 = result.add_state(q0.clone());
    q_list.insert(q0.clone(), d0);
    work_list.push_back(d0);

    debug!(closure = %q0, dfa_state = d0, "initial closure");
    record(TraceStep::InitialClosure {
        closure: q0,
        dfa_state: d0,
    });

    // New states are appended, so popping the front always yields the lowest unmarked index
    while let Some(k) = work_list.pop_front() {
        if result.states[k].is_marked() {
            continue;
        }
        result.states[k].mark();
        trace!(dfa_state = k, "mark");
        record(TraceStep::Mark { dfa_state: k });

        let q = result.states[k].get_nfa_states().clone();

        for &c in nfa.get_alphabet() {
            let moved = delta(nfa, &q, c)?;

            if moved.is_empty() {
                trace!(from = %q, symbol = %c, "no transition");
                record(TraceStep::Move {
                    from: q.clone(),
                    closure: moved.clone(),
                    moved,
                    symbol: c,
                    target: None,
                    created: false,
                });
                continue;
            }

            let t = epsilon_closure(nfa, &moved);

            let (target, created) = match q_list.get(&t) {
                Some(&existing) => (existing, false),
                None => {
                    let target = result.add_state(t.clone());
                    q_list.insert(t.clone(), target);
                    work_list.push_back(target);
                    (target, true)
                }
            };

            trace!(from = %q, symbol = %c, moved = %moved, closure = %t, target, created, "move");
            result.states[k].add_transition(c, target);
            record(TraceStep::Move {
                from: q.clone(),
                symbol: c,
                moved,
                closure: t,
                target: Some(target),
                created,
            });
        }
    }

    for (k, state) in result.states.iter().enumerate() {
        if state.get_nfa_states().intersects(nfa.get_acceptor_states()) {
            result.accept_states.set(k, true);
        }
    }

    debug!(
        dfa_states = result.get_num_states(),
        accepting = result.get_acceptor_states().count_ones(),
        "subset construction finished"
    );

    Ok(result)
}
