/* The DFA produced by subset construction. Every DFA state remembers the set of NFA states it
 * stands for. A missing transition means the input is rejected. */

use crate::fa::{Symbol, FA};
use crate::state_set::StateSet;
use bitvec::prelude::*;
use color_eyre::eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Write};
use std::ops::Range;
use tracing::info;

/// Inconsistencies found in a DFA loaded from disk
#[derive(Debug, PartialEq, Eq)]
pub enum DFAError {
    /// The saved DFA has no states at all
    NoStates,
    /// The start state does not exist
    BadStartState(usize),
    /// The accepting bit vector does not cover exactly the states
    AcceptLengthMismatch { states: usize, accepts: usize },
    /// A transition points at a state which does not exist
    BadTransitionTarget { from: usize, symbol: char, to: usize },
    /// A transition uses a symbol outside the alphabet
    BadTransitionSymbol { from: usize, symbol: char },
}

impl fmt::Display for DFAError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DFAError::NoStates => write!(f, "Error: The DFA has no states!"),
            DFAError::BadStartState(state) => {
                write!(f, "Error: Start state {} does not exist!", state)
            }
            DFAError::AcceptLengthMismatch { states, accepts } => write!(
                f,
                "Error: {} states but {} accept flags were saved",
                states, accepts
            ),
            DFAError::BadTransitionTarget { from, symbol, to } => write!(
                f,
                "Error: Transition {} --{}--> {} leads to a missing state",
                from, symbol, to
            ),
            DFAError::BadTransitionSymbol { from, symbol } => write!(
                f,
                "Error: State {} has a transition on {} which is not in the alphabet",
                from, symbol
            ),
        }
    }
}

impl std::error::Error for DFAError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DFAState {
    nfa_states: StateSet,
    marked: bool,
    transitions: BTreeMap<char, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DFA {
    pub(crate) states: Vec<DFAState>,
    start_state: usize,
    pub(crate) accept_states: BitVec<u8>,
    alphabet: Vec<char>,
}

impl FA for DFA {
    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_state_ids(&self) -> Range<usize> {
        0..self.states.len()
    }

    fn get_start_state(&self) -> usize {
        self.start_state
    }

    fn get_alphabet(&self) -> &[char] {
        &self.alphabet
    }

    fn get_acceptor_states(&self) -> &BitVec<u8> {
        &self.accept_states
    }

    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)> {
        let mut transition_list: Vec<(Symbol, usize)> = Vec::new();
        if let Some(state) = self.states.get(state_id) {
            for (symbol, target) in state.transitions.iter() {
                transition_list.push((Symbol::Char(*symbol), *target));
            }
        }
        transition_list
    }
}

impl DFAState {
    fn new(nfa_states: StateSet) -> Self {
        DFAState {
            nfa_states,
            marked: false,
            transitions: BTreeMap::new(),
        }
    }

    /// The set of NFA states this DFA state stands for
    pub fn get_nfa_states(&self) -> &StateSet {
        &self.nfa_states
    }

    /// True once the construction has computed every transition of this state
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub(crate) fn mark(&mut self) {
        self.marked = true;
    }

    pub(crate) fn add_transition(&mut self, symbol: char, to: usize) {
        self.transitions.insert(symbol, to);
    }

    /// Destination on `symbol`, `None` if the DFA rejects
    pub fn get_transition(&self, symbol: char) -> Option<usize> {
        self.transitions.get(&symbol).copied()
    }

    pub fn get_transitions(&self) -> &BTreeMap<char, usize> {
        &self.transitions
    }
}

impl DFA {
    pub(crate) fn new(alphabet: Vec<char>) -> Self {
        DFA {
            states: Vec::new(),
            start_state: 0,
            accept_states: BitVec::new(),
            alphabet,
        }
    }

    pub(crate) fn add_state(&mut self, nfa_states: StateSet) -> usize {
        let state_id = self.states.len();
        self.states.push(DFAState::new(nfa_states));
        self.accept_states.push(false);
        state_id
    }

    /// Returns a reference to the DFA state whose id is provided, `None` if there is no such state
    pub fn get_state(&self, id: usize) -> Option<&DFAState> {
        self.states.get(id)
    }

    /// Returns all states in discovery order
    pub fn get_states(&self) -> &[DFAState] {
        &self.states
    }

    /// Ids of the accepting states in ascending order
    pub fn get_accepting_states(&self) -> Vec<usize> {
        self.accept_states.iter_ones().collect()
    }

    /// Walk the DFA on `word`. Symbols outside the alphabet and missing transitions reject.
    pub fn accepts(&self, word: &str) -> bool {
        let mut state = self.start_state;
        for ch in word.chars() {
            state = match self.states[state].get_transition(ch) {
                Some(next) => next,
                None => return false,
            };
        }
        self.is_accept_state(state)
    }

    fn check(&self) -> Result<(), DFAError> {
        if self.states.is_empty() {
            return Err(DFAError::NoStates);
        }
        if self.start_state >= self.states.len() {
            return Err(DFAError::BadStartState(self.start_state));
        }
        if self.accept_states.len() != self.states.len() {
            return Err(DFAError::AcceptLengthMismatch {
                states: self.states.len(),
                accepts: self.accept_states.len(),
            });
        }
        for (from, state) in self.states.iter().enumerate() {
            for (&symbol, &to) in state.transitions.iter() {
                if !self.alphabet.contains(&symbol) {
                    return Err(DFAError::BadTransitionSymbol { from, symbol });
                }
                if to >= self.states.len() {
                    return Err(DFAError::BadTransitionTarget { from, symbol, to });
                }
            }
        }
        Ok(())
    }

    /// Save the DFA as pretty printed json
    pub fn save_dfa(&self, file_name: &str) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;

        let mut file = File::create(file_name)
            .wrap_err_with(|| format!("Failed to create {}", file_name))?;

        writeln!(file, "{}", json_string)?;
        info!("DFA saved to {}", file_name);
        Ok(())
    }
}

/// Load a DFA from a saved json file
pub fn load_dfa(file_name: &str) -> Result<DFA> {
    let file =
        File::open(file_name).wrap_err_with(|| format!("Failed to open {}", file_name))?;

    let buf_reader = BufReader::new(file);

    let dfa: DFA = serde_json::from_reader(buf_reader)
        .wrap_err_with(|| format!("{} is not a saved DFA", file_name))?;

    dfa.check()?;
    Ok(dfa)
}

#[cfg(test)]
mod dfa_tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        let mut path = std::env::temp_dir();
        path.push(format!("nfa2dfa_{}_{}.json", name, std::process::id()));
        path.to_string_lossy().to_string()
    }

    fn two_state_dfa() -> DFA {
        let mut dfa = DFA::new(vec!['a', 'b']);
        let start = dfa.add_state(StateSet::from_ids(3, [0, 1]));
        let end = dfa.add_state(StateSet::from_ids(3, [2]));
        dfa.states[start].add_transition('a', end);
        dfa.states[end].add_transition('b', end);
        dfa.accept_states.set(end, true);
        dfa
    }

    #[test]
    fn test_dfa_state_creation() {
        let state = DFAState::new(StateSet::from_ids(4, [1, 3]));
        assert_eq!(state.get_transitions().len(), 0);
        assert!(!state.is_marked());
        assert_eq!(state.get_nfa_states().to_string(), "{1,3}");
    }

    #[test]
    fn test_dfa_basic_construction() {
        let mut dfa = DFA::new(vec!['a']);
        let start = dfa.add_state(StateSet::from_ids(2, [0]));
        let end = dfa.add_state(StateSet::from_ids(2, [1]));

        assert_eq!(dfa.get_num_states(), 2);
        assert_eq!(dfa.get_start_state(), 0);
        assert_eq!(dfa.get_acceptor_states().len(), 2);
        assert!(!dfa.get_acceptor_states()[end]);
        assert!(!dfa.get_acceptor_states()[start]);

        // Mark end as accept state
        dfa.accept_states.set(end, true);
        assert!(dfa.get_acceptor_states()[end]);

        // Add transition
        dfa.states[start].add_transition('a', end);
        let transitions = dfa.get_state_transitions(start);
        assert_eq!(transitions, vec![(Symbol::Char('a'), end)]);
        assert!(dfa.get_state_transitions(end).is_empty());
    }

    #[test]
    fn test_fa_trait_implementation_for_dfa() {
        let dfa = two_state_dfa();

        assert_eq!(dfa.get_state_ids(), 0..2);
        assert_eq!(dfa.get_alphabet(), &['a', 'b']);
        assert_eq!(dfa.get_accepting_states(), vec![1]);
        assert!(dfa.is_accept_state(1));
        assert!(!dfa.is_accept_state(0));
        assert!(!dfa.is_accept_state(5));
    }

    #[test]
    fn test_get_state_out_of_range() {
        let dfa = two_state_dfa();

        assert_eq!(dfa.get_state(1).unwrap().get_transition('b'), Some(1));
        assert!(dfa.get_state(2).is_none());
        assert!(dfa.get_state(usize::MAX).is_none());
    }

    #[test]
    fn test_dfa_accepts() {
        let dfa = two_state_dfa();

        assert!(dfa.accepts("a"));
        assert!(dfa.accepts("abbb"));
        assert!(!dfa.accepts(""));
        assert!(!dfa.accepts("b"));
        assert!(!dfa.accepts("aa"));
        assert!(!dfa.accepts("ac"));
    }

    #[test]
    fn test_dot_output_merges_parallel_edges() {
        let mut dfa = two_state_dfa();
        dfa.states[0].add_transition('b', 1);

        let dot = dfa.to_dot();
        assert!(dot.contains("a, b"));
        assert!(dot.contains("Start"));
        assert!(dot.contains("Accept"));
    }

    #[test]
    fn test_save_and_load_dfa() {
        let dfa = two_state_dfa();
        let path = temp_path("save_load");

        dfa.save_dfa(&path).unwrap();
        let loaded = load_dfa(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(loaded.get_states(), dfa.get_states());
        assert_eq!(loaded.get_acceptor_states(), dfa.get_acceptor_states());
        assert_eq!(loaded.get_alphabet(), dfa.get_alphabet());
    }

    #[test]
    fn test_load_rejects_dangling_transition() {
        let mut dfa = two_state_dfa();
        dfa.states[1].add_transition('a', 9);
        let path = temp_path("dangling");

        dfa.save_dfa(&path).unwrap();
        let err = load_dfa(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            err.downcast_ref::<DFAError>(),
            Some(&DFAError::BadTransitionTarget {
                from: 1,
                symbol: 'a',
                to: 9
            })
        );
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_dfa("this/file/does/not/exist.json").is_err());
    }
}
