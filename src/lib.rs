//! # nfa2dfa
//!
//! Conversion of nondeterministic finite automata with epsilon moves into deterministic ones,
//! following the subset construction from "Engineering a Compiler 2e" by Keith Cooper and Linda
//! Torczan.
//!
//! This library provides functionality to:
//! - Read NFA descriptions from text files
//! - Compute epsilon closures and moves over sets of NFA states
//! - Convert NFAs to DFAs using Subset Construction, optionally recording every step
//! - Print the DFA transition table and the construction trace
//! - Save DFAs as json, export both automata to Graphviz and visualize them

pub mod dfa;
pub mod fa;
pub mod nfa;
pub mod parser;
pub mod state_set;
pub mod subset;
pub mod table;
pub mod visualizer;

// Re-export commonly used functions for convenience
pub use dfa::load_dfa;
pub use parser::{parse_nfa_description, read_nfa_file};
pub use subset::{construct_dfa, construct_dfa_with_trace, delta, epsilon_closure};
pub use table::{format_dfa_table, format_trace, DfaTable, Trace};
pub use visualizer::visualize;
