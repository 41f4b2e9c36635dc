use bitvec::prelude::BitVec;
use color_eyre::eyre::{eyre, Result, WrapErr};
use petgraph::dot::Dot;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::ops::Range;
use std::process::Command;
use tracing::{debug, info};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum Symbol {
    Epsilon,
    Char(char),
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Epsilon => write!(f, "eps"),
            Symbol::Char(ch) => write!(f, "{}", ch),
        }
    }
}

/// Behaviour shared by the NFA and the DFA so they can be exported and visualized the same way.
/// State ids are dense in the range returned by `get_state_ids`.
pub trait FA {
    fn get_num_states(&self) -> usize;
    fn get_state_ids(&self) -> Range<usize>;
    fn get_start_state(&self) -> usize;
    fn get_alphabet(&self) -> &[char];
    /// Bit vector indexed by state id
    fn get_acceptor_states(&self) -> &BitVec<u8>;
    /// Outgoing transitions of a state, sorted by symbol and then target
    fn get_state_transitions(&self, state_id: usize) -> Vec<(Symbol, usize)>;

    fn is_accept_state(&self, state_id: usize) -> bool {
        self.get_acceptor_states()
            .get(state_id)
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// Render the automaton in Graphviz dot syntax
    fn to_dot(&self) -> String {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<usize, NodeIndex> = HashMap::new();

        for state_id in self.get_state_ids() {
            let mut label = format!("State {}", state_id);
            if state_id == self.get_start_state() {
                label = format!("Start\n{}", label);
            }
            if self.is_accept_state(state_id) {
                label = format!("Accept\n{}", label);
            }
            node_map.insert(state_id, graph.add_node(label));
        }

        for (from, to, label) in labelled_edges(self) {
            graph.add_edge(node_map[&from], node_map[&to], label);
        }

        Dot::new(&graph).to_string()
    }

    /// Write `<filename>.dot` and render it to `<filename>.jpg` with Graphviz
    fn show_fa(&self, filename: &str) -> Result<()> {
        let dot_filename = format!("{}.dot", filename);
        let jpg_filename = format!("{}.jpg", filename);

        let mut dot_file = File::create(&dot_filename)
            .wrap_err_with(|| format!("Failed to create dot file {}", dot_filename))?;
        dot_file
            .write_all(self.to_dot().as_bytes())
            .wrap_err("Failed to write dot file")?;
        debug!(file = %dot_filename, "wrote dot file");

        let output = Command::new("dot")
            .args(["-Tjpg", &dot_filename, "-o", &jpg_filename])
            .output()
            .wrap_err("Failed to execute Graphviz")?;

        if !output.status.success() {
            return Err(eyre!(
                "Graphviz failed on {}: {}",
                dot_filename,
                String::from_utf8_lossy(&output.stderr)
            ));
        }

        info!("vizualization saved as {}", jpg_filename);
        Ok(())
    }
}

/// Collapse parallel transitions into one edge per state pair, labelled `a, b`
pub fn labelled_edges<T: FA + ?Sized>(fa: &T) -> Vec<(usize, usize, String)> {
    let mut edges: Vec<(usize, usize, String)> = Vec::new();
    let mut edge_map: HashMap<(usize, usize), usize> = HashMap::new();

    for state_id in fa.get_state_ids() {
        for (symbol, target) in fa.get_state_transitions(state_id) {
            match edge_map.get(&(state_id, target)) {
                Some(&position) => {
                    let label = &mut edges[position].2;
                    label.push_str(", ");
                    label.push_str(&symbol.to_string());
                }
                None => {
                    edge_map.insert((state_id, target), edges.len());
                    edges.push((state_id, target, symbol.to_string()));
                }
            }
        }
    }
    edges
}

#[cfg(test)]
mod fa_tests {
    use super::*;
    use crate::nfa::NFA;

    #[test]
    fn test_labelled_edges_merge_symbols() {
        let mut nfa = NFA::new(vec!['a', 'b'], 3, 1).unwrap();
        nfa.add_transition(1, Symbol::Epsilon, 2).unwrap();
        nfa.add_transition(1, Symbol::Char('a'), 2).unwrap();
        nfa.add_transition(1, Symbol::Char('b'), 2).unwrap();
        nfa.add_transition(2, Symbol::Char('a'), 3).unwrap();

        assert_eq!(
            labelled_edges(&nfa),
            vec![
                (1, 2, "eps, a, b".to_string()),
                (2, 3, "a".to_string())
            ]
        );
    }

    #[test]
    fn test_nfa_dot_labels() {
        let mut nfa = NFA::new(vec!['a'], 2, 1).unwrap();
        nfa.add_transition(1, Symbol::Char('a'), 2).unwrap();
        nfa.set_accept_state(2).unwrap();

        let dot = nfa.to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("State 1"));
        assert!(dot.contains("Accept"));
        assert!(!dot.contains("State 0"));
    }
}
