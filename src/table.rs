/* Text rendering of the constructed DFA and of the construction trace */

use std::fmt;

use crate::dfa::DFA;
use crate::fa::FA;
use crate::state_set::StateSet;
use crate::subset::TraceStep;

const LABEL_WIDTH: usize = 11;
const CELL_WIDTH: usize = 9;

/// `{1,2,3}`, or `{}` for the empty set
pub fn format_state_set(set: &StateSet) -> String {
    set.to_string()
}

fn format_id_list(ids: &[usize]) -> String {
    let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    format!("{{{}}}", ids.join(","))
}

/// Displays a DFA as a transition matrix: one row per state, one column per symbol and `{}`
/// where the DFA has no transition.
pub struct DfaTable<'a>(pub &'a DFA);

impl fmt::Display for DfaTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dfa = self.0;

        writeln!(f, "Initial State: {{{}}}", dfa.get_start_state())?;
        writeln!(
            f,
            "Final State(s): {}",
            format_id_list(&dfa.get_accepting_states())
        )?;

        let mut header = format!("{:<width$}", "State", width = LABEL_WIDTH);
        for symbol in dfa.get_alphabet() {
            header.push_str(&format!("{:<width$}", symbol, width = CELL_WIDTH));
        }
        writeln!(f, "{}", header.trim_end())?;

        for (state_id, state) in dfa.get_states().iter().enumerate() {
            let mut row = format!("{:<width$}", state_id, width = LABEL_WIDTH);
            for symbol in dfa.get_alphabet() {
                let cell = match state.get_transition(*symbol) {
                    Some(target) => format!("{{{}}}", target),
                    None => "{}".to_string(),
                };
                row.push_str(&format!("{:<width$}", cell, width = CELL_WIDTH));
            }
            writeln!(f, "{}", row.trim_end())?;
        }
        Ok(())
    }
}

/// Displays every closure and non empty move of the construction, in the order they were
/// computed
pub struct Trace<'a>(pub &'a [TraceStep]);

impl fmt::Display for Trace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in self.0 {
            match step {
                TraceStep::InitialClosure { closure, dfa_state } => {
                    writeln!(f, "E-closure(I0) = {} = {}", closure, dfa_state)?;
                }
                TraceStep::Mark { dfa_state } => {
                    writeln!(f, "\nMark {}", dfa_state)?;
                }
                TraceStep::Move {
                    from,
                    symbol,
                    moved,
                    closure,
                    target: Some(target),
                    ..
                } => {
                    writeln!(f, "{} --{}--> {}", from, symbol, moved)?;
                    writeln!(f, "E-closure{} = {} = {}", moved, closure, target)?;
                }
                TraceStep::Move { target: None, .. } => {}
            }
        }
        Ok(())
    }
}

/// The DFA transition matrix as text, see `DfaTable`
pub fn format_dfa_table(dfa: &DFA) -> String {
    DfaTable(dfa).to_string()
}

/// The construction trace as text, see `Trace`
pub fn format_trace(steps: &[TraceStep]) -> String {
    Trace(steps).to_string()
}
