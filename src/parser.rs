/* Reader for NFA description files:
 *
 *   Initial State: {1}
 *   Final States: {3}
 *   Total States: 3
 *   State a b E
 *   1 {} {} {2}
 *   2 {3} {} {}
 *   3 {} {} {}
 *
 * The last column of the symbol line is the epsilon column. Rows are numbered from 1. */

use color_eyre::eyre::{Report, Result, WrapErr};
use std::fs;
use tracing::debug;

use crate::fa::Symbol;
use crate::nfa::NFA;

/// Id of the first row in a description file
pub const FIRST_STATE: usize = 1;

/// Names accepted for the epsilon column
const EPSILON_COLUMNS: [&str; 2] = ["E", "ε"];

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    FileOpenError(String),
    /// The file ended before `expected` was found
    MissingLine { line: usize, expected: &'static str },
    /// Braces are missing, nested or unbalanced
    UnbalancedBraces { line: usize },
    InvalidStateId { line: usize, token: String },
    InvalidStateCount { line: usize, token: String },
    /// The initial state group must name exactly one state
    InvalidStartState { line: usize, found: usize },
    MissingAlphabet { line: usize },
    MissingEpsilonColumn { line: usize, found: String },
    /// Symbols are single characters
    InvalidSymbol { line: usize, token: String },
    DuplicateSymbol { line: usize, symbol: char },
    ColumnCountMismatch {
        line: usize,
        expected: usize,
        found: usize,
    },
    UnexpectedRowLabel {
        line: usize,
        expected: usize,
        found: String,
    },
    TrailingContent { line: usize },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::FileOpenError(err_line) => write!(f, "{}", err_line),
            ParseError::MissingLine { line, expected } => {
                write!(f, "Error: Line {}: expected {}, found end of file", line, expected)
            }
            ParseError::UnbalancedBraces { line } => {
                write!(f, "Error: Line {}: unbalanced braces in state list", line)
            }
            ParseError::InvalidStateId { line, token } => {
                write!(f, "Error: Line {}: {:?} is not a state number", line, token)
            }
            ParseError::InvalidStateCount { line, token } => {
                write!(f, "Error: Line {}: invalid state count {:?}", line, token)
            }
            ParseError::InvalidStartState { line, found } => write!(
                f,
                "Error: Line {}: exactly one initial state expected, found {}",
                line, found
            ),
            ParseError::MissingAlphabet { line } => {
                write!(f, "Error: Line {}: the alphabet is empty", line)
            }
            ParseError::MissingEpsilonColumn { line, found } => write!(
                f,
                "Error: Line {}: the last column must be the epsilon column E, found {:?}",
                line, found
            ),
            ParseError::InvalidSymbol { line, token } => write!(
                f,
                "Error: Line {}: symbol {:?} must be a single character",
                line, token
            ),
            ParseError::DuplicateSymbol { line, symbol } => {
                write!(f, "Error: Line {}: symbol {} appears twice", line, symbol)
            }
            ParseError::ColumnCountMismatch {
                line,
                expected,
                found,
            } => write!(
                f,
                "Error: Line {}: expected {} state lists, found {}",
                line, expected, found
            ),
            ParseError::UnexpectedRowLabel {
                line,
                expected,
                found,
            } => write!(
                f,
                "Error: Line {}: expected the row of state {}, found {:?}",
                line, expected, found
            ),
            ParseError::TrailingContent { line } => {
                write!(f, "Error: Line {}: unexpected content after the last state", line)
            }
        }
    }
}

impl std::error::Error for ParseError {}

fn parse_state_id(token: &str, line: usize) -> Result<usize, ParseError> {
    token
        .trim()
        .parse::<usize>()
        .map_err(|_| ParseError::InvalidStateId {
            line,
            token: token.trim().to_string(),
        })
}

// Parse the inside of a brace group, "1,2,3" or ""
fn parse_state_list(inner: &str, line: usize) -> Result<Vec<usize>, ParseError> {
    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }
    inner
        .split(',')
        .map(|token| parse_state_id(token, line))
        .collect()
}

// Header lines carry exactly one brace group, anything before it is a label
fn single_brace_group(text: &str, line: usize) -> Result<Vec<usize>, ParseError> {
    let open = text.find('{');
    let close = text.rfind('}');

    match (open, close) {
        (Some(open), Some(close))
            if open < close
                && text.matches('{').count() == 1
                && text.matches('}').count() == 1 =>
        {
            if !text[close + 1..].trim().is_empty() {
                return Err(ParseError::TrailingContent { line });
            }
            parse_state_list(&text[open + 1..close], line)
        }
        _ => Err(ParseError::UnbalancedBraces { line }),
    }
}

// Split "{1} {} {2,3}" into the insides of each group
fn brace_groups(text: &str, line: usize) -> Result<Vec<&str>, ParseError> {
    let mut groups = Vec::new();
    let mut rest = text.trim_start();

    while !rest.is_empty() {
        if !rest.starts_with('{') {
            return Err(ParseError::UnbalancedBraces { line });
        }
        let close = rest.find('}').ok_or(ParseError::UnbalancedBraces { line })?;
        let inner = &rest[1..close];
        if inner.contains('{') {
            return Err(ParseError::UnbalancedBraces { line });
        }
        groups.push(inner);
        rest = rest[close + 1..].trim_start();
    }
    Ok(groups)
}

fn parse_alphabet(text: &str, line: usize) -> Result<Vec<char>, ParseError> {
    // The first word names the row label column
    let columns: Vec<&str> = text.split_whitespace().skip(1).collect();

    let (epsilon, symbols) = match columns.split_last() {
        None => return Err(ParseError::MissingAlphabet { line }),
        Some(split) => split,
    };
    if !EPSILON_COLUMNS.contains(epsilon) {
        return Err(ParseError::MissingEpsilonColumn {
            line,
            found: epsilon.to_string(),
        });
    }
    if symbols.is_empty() {
        return Err(ParseError::MissingAlphabet { line });
    }

    let mut alphabet = Vec::new();
    for token in symbols {
        let mut chars = token.chars();
        let symbol = match (chars.next(), chars.next()) {
            (Some(symbol), None) => symbol,
            _ => {
                return Err(ParseError::InvalidSymbol {
                    line,
                    token: token.to_string(),
                })
            }
        };
        if alphabet.contains(&symbol) || EPSILON_COLUMNS.contains(token) {
            return Err(ParseError::DuplicateSymbol { line, symbol });
        }
        alphabet.push(symbol);
    }
    Ok(alphabet)
}

/// Parse the text of an NFA description
pub fn parse_nfa_description(text: &str) -> Result<NFA> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(number, content)| (number + 1, content))
        .filter(|(_, content)| !content.trim().is_empty());

    let mut last_line = 0;
    let mut next_line = |expected: &'static str| match lines.next() {
        Some((number, content)) => {
            last_line = number;
            Ok((number, content))
        }
        None => Err(ParseError::MissingLine {
            line: last_line + 1,
            expected,
        }),
    };

    let (line, content) = next_line("the initial state")?;
    let start_states = single_brace_group(content, line)?;
    if start_states.len() != 1 {
        return Err(Report::new(ParseError::InvalidStartState {
            line,
            found: start_states.len(),
        }));
    }
    let start_state = start_states[0];

    let (line, content) = next_line("the final states")?;
    let accept_states = single_brace_group(content, line)?;

    let (line, content) = next_line("the total state count")?;
    let count_token = content.split_once(':').map(|(_, count)| count.trim());
    let num_states = match count_token.map(|token| token.parse::<usize>()) {
        Some(Ok(count)) if count > 0 => count,
        _ => {
            return Err(Report::new(ParseError::InvalidStateCount {
                line,
                token: count_token.unwrap_or(content).to_string(),
            }))
        }
    };

    let (line, content) = next_line("the alphabet")?;
    let alphabet = parse_alphabet(content, line)?;
    let columns = alphabet.len() + 1;

    debug!(num_states, ?alphabet, start_state, "parsed NFA header");

    // The declared count must match the rows before anything is allocated for it
    let rows: Vec<(usize, &str)> = lines.collect();
    if rows.len() < num_states {
        return Err(Report::new(ParseError::MissingLine {
            line: rows.last().map_or(line, |(number, _)| *number) + 1,
            expected: "a state row",
        }));
    }
    if let Some((line, _)) = rows.get(num_states) {
        return Err(Report::new(ParseError::TrailingContent { line: *line }));
    }

    let mut nfa = NFA::new(alphabet.clone(), num_states, FIRST_STATE)?;

    for (expected, (line, content)) in (FIRST_STATE..).zip(rows) {
        let content = content.trim_start();

        let label_end = content.find(char::is_whitespace).unwrap_or(content.len());
        let (label, rest) = content.split_at(label_end);
        if label.parse::<usize>().ok() != Some(expected) {
            return Err(Report::new(ParseError::UnexpectedRowLabel {
                line,
                expected,
                found: label.to_string(),
            }));
        }

        let groups = brace_groups(rest, line)?;
        if groups.len() != columns {
            return Err(Report::new(ParseError::ColumnCountMismatch {
                line,
                expected: columns,
                found: groups.len(),
            }));
        }

        for (column, group) in groups.iter().enumerate() {
            let symbol = match alphabet.get(column) {
                Some(ch) => Symbol::Char(*ch),
                None => Symbol::Epsilon,
            };
            for target in parse_state_list(group, line)? {
                nfa.add_transition(expected, symbol, target)
                    .wrap_err_with(|| format!("Error: Line {}: bad transition", line))?;
            }
        }
    }

    nfa.set_start_state(start_state)
        .wrap_err("Error: Line 1: bad initial state")?;
    for accept in accept_states {
        nfa.set_accept_state(accept)
            .wrap_err("Error: Line 2: bad final state")?;
    }

    Ok(nfa)
}

/// Read and parse an NFA description file
pub fn read_nfa_file(file_path: &str) -> Result<NFA> {
    let text = match fs::read_to_string(file_path) {
        Ok(text) => text,
        Err(error) => {
            let err_line = format!("Error: Failed to open the NFA file {}: {}", file_path, error);
            return Err(Report::new(ParseError::FileOpenError(err_line)));
        }
    };
    debug!(file = file_path, "read NFA description");
    parse_nfa_description(&text)
}
