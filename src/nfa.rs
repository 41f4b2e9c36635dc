use bitvec::prelude::*;
use color_eyre::eyre::{Report, Result};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Range;

use crate::fa::{Symbol, FA};
use crate::state_set::StateSet;
use crate::subset::{delta, epsilon_closure};

/// Violations of the NFA model's invariants
#[derive(Debug, PartialEq, Eq)]
pub enum NFAError {
    /// The NFA was declared with zero states
    EmptyAutomaton,
    /// A state id outside `first..first + num_states`
    StateOutOfRange {
        state: usize,
        first: usize,
        last: usize,
    },
    /// A transition on a character which is not in the alphabet
    UnknownSymbol(char),
    /// The alphabet lists the same character twice
    DuplicateSymbol(char),
    /// `first + num_states` does not fit in a state id
    TooManyStates { first: usize, num_states: usize },
}

impl fmt::Display for NFAError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NFAError::EmptyAutomaton => write!(f, "Error: An NFA needs at least one state!"),
            NFAError::StateOutOfRange { state, first, last } => write!(
                f,
                "Error: State {} is out of range, states are numbered {} to {}",
                state, first, last
            ),
            NFAError::UnknownSymbol(ch) => {
                write!(f, "Error: Symbol {} is not part of the alphabet!", ch)
            }
            NFAError::DuplicateSymbol(ch) => {
                write!(f, "Error: Symbol {} appears twice in the alphabet!", ch)
            }
            NFAError::TooManyStates { first, num_states } => write!(
                f,
                "Error: {} states numbered from {} overflow the state ids!",
                num_states, first
            ),
        }
    }
}

impl std::error::Error for NFAError {}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NFAState {
    id: usize,
    transitions: HashMap<Symbol, HashSet<usize>>,
}

impl Hash for NFAState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl NFAState {
    fn new(id: usize) -> Self {
        NFAState {
            id,
            transitions: HashMap::new(),
        }
    }

    fn add_transition(&mut self, symbol: Symbol, to: usize) {
        self.transitions.entry(symbol).or_default().insert(to);
    }

    pub fn get_transitions(&self) -> &HashMap<Symbol, HashSet<usize>> {
        &self.transitions
    }

    /// Destinations of this state on `symbol`, empty if there are none
    pub fn get_targets(&self, symbol: Symbol) -> impl Iterator<Item = usize> + '_ {
        self.transitions
            .get(&symbol)
            .into_iter()
            .flat_map(|targets| targets.iter().copied())
    }

    pub fn get_id(&self) -> usize {
        self.id
    }
}

/// A nondeterministic finite automaton with epsilon moves. States are numbered densely starting
/// at `first_state`, files written by hand usually start at 1.
#[derive(Debug, Clone)]
pub struct NFA {
    states: Vec<NFAState>,
    first_state: usize,
    start_state: usize,
    accept_states: BitVec<u8>,
    alphabet: Vec<char>,
}

impl FA for NFA {
    fn get_num_states(&self) -> usize {
        self.states.len()
    }

    fn get_state_ids(&self) -> Range<usize> {
        self.first_state..self.id_bound()
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
        let mut transition_list: Vec<(Symbol, usize)> = match self.get_state(state_id) {
            None => return Vec::new(),
            Some(state) => state
                .transitions
                .iter()
                .flat_map(|(symbol, targets)| targets.iter().map(move |target| (*symbol, *target)))
                .collect(),
        };
        transition_list.sort();
        transition_list
    }
}

impl NFA {
    /// Create an NFA without transitions. The start state defaults to `first_state` and no state
    /// accepts.
    pub fn new(alphabet: Vec<char>, num_states: usize, first_state: usize) -> Result<Self> {
        if num_states == 0 {
            return Err(Report::new(NFAError::EmptyAutomaton));
        }

        let id_bound = match first_state.checked_add(num_states) {
            Some(bound) => bound,
            None => {
                return Err(Report::new(NFAError::TooManyStates {
                    first: first_state,
                    num_states,
                }))
            }
        };

        let mut seen = HashSet::new();
        for ch in alphabet.iter() {
            if !seen.insert(*ch) {
                return Err(Report::new(NFAError::DuplicateSymbol(*ch)));
            }
        }

        let states = (first_state..id_bound)
            .map(NFAState::new)
            .collect();

        Ok(NFA {
            states,
            first_state,
            start_state: first_state,
            accept_states: BitVec::repeat(false, id_bound),
            alphabet,
        })
    }

    fn check_state(&self, state_id: usize) -> Result<(), NFAError> {
        if self.get_state_ids().contains(&state_id) {
            Ok(())
        } else {
            Err(NFAError::StateOutOfRange {
                state: state_id,
                first: self.first_state,
                last: self.id_bound() - 1,
            })
        }
    }

    pub fn add_transition(&mut self, from: usize, symbol: Symbol, to: usize) -> Result<()> {
        self.check_state(from)?;
        self.check_state(to)?;
        if let Symbol::Char(ch) = symbol {
            if !self.has_symbol(ch) {
                return Err(Report::new(NFAError::UnknownSymbol(ch)));
            }
        }
        let index = from - self.first_state;
        self.states[index].add_transition(symbol, to);
        Ok(())
    }

    pub fn set_start_state(&mut self, state_id: usize) -> Result<()> {
        self.check_state(state_id)?;
        self.start_state = state_id;
        Ok(())
    }

    pub fn set_accept_state(&mut self, state_id: usize) -> Result<()> {
        self.check_state(state_id)?;
        self.accept_states.set(state_id, true);
        Ok(())
    }

    pub fn get_state(&self, state_id: usize) -> Option<&NFAState> {
        state_id
            .checked_sub(self.first_state)
            .and_then(|index| self.states.get(index))
    }

    pub fn get_first_state(&self) -> usize {
        self.first_state
    }

    /// One past the largest state id, the capacity of every state set built for this NFA
    pub fn id_bound(&self) -> usize {
        self.first_state + self.states.len()
    }

    pub fn has_symbol(&self, ch: char) -> bool {
        self.alphabet.contains(&ch)
    }

    /// Build a state set sized for this NFA
    pub fn state_set<I: IntoIterator<Item = usize>>(&self, ids: I) -> StateSet {
        StateSet::from_ids(self.id_bound(), ids)
    }

    /// Run the NFA on `word` by tracking the set of states it can be in
    pub fn accepts(&self, word: &str) -> bool {
        let mut current = epsilon_closure(self, &self.state_set([self.start_state]));

        for ch in word.chars() {
            if !self.has_symbol(ch) {
                return false;
            }
            current = match delta(self, &current, ch) {
                Ok(moved) => epsilon_closure(self, &moved),
                Err(_) => return false,
            };
            if current.is_empty() {
                return false;
            }
        }

        current.intersects(&self.accept_states)
    }
}
