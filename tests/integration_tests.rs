mod integration_tests_helper {

    use nfa2dfa::dfa::DFA;
    use nfa2dfa::nfa::NFA;
    use nfa2dfa::{construct_dfa, read_nfa_file};
    use std::path::PathBuf;

    pub fn data_path(file_name: &str) -> String {
        let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        path.push("test_data");
        path.push(file_name);
        path.to_string_lossy().to_string()
    }

    pub fn get_automata(file_name: &str) -> (NFA, DFA) {
        let nfa = read_nfa_file(&data_path(file_name));

        // assert that reading the file was successful
        assert!(nfa.is_ok());

        let nfa = nfa.unwrap();

        let dfa = construct_dfa(&nfa);

        // assert that the construction was successful
        assert!(dfa.is_ok());

        (nfa, dfa.unwrap())
    }

    /// Every word over `alphabet` of length at most `max_len`
    pub fn all_words(alphabet: &[char], max_len: usize) -> Vec<String> {
        let mut words = vec![String::new()];
        let mut frontier = vec![String::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for word in frontier.iter() {
                for ch in alphabet {
                    next.push(format!("{}{}", word, ch));
                }
            }
            words.extend(next.iter().cloned());
            frontier = next;
        }
        words
    }
}

mod integration_tests {
    use crate::integration_tests_helper::{all_words, data_path, get_automata};

    use nfa2dfa::fa::FA;
    use nfa2dfa::parser::ParseError;
    use nfa2dfa::subset::TraceStep;
    use nfa2dfa::{
        construct_dfa_with_trace, epsilon_closure, format_dfa_table, format_trace, load_dfa,
        read_nfa_file,
    };

    #[test]
    fn test_small_scenario() {
        let (nfa, dfa) = get_automata("small.nfa");

        assert_eq!(dfa.get_num_states(), 2);
        assert_eq!(dfa.get_state(0).unwrap().get_nfa_states(), &nfa.state_set([1, 2]));
        assert_eq!(dfa.get_state(1).unwrap().get_nfa_states(), &nfa.state_set([3]));
        assert_eq!(dfa.get_state(0).unwrap().get_transition('a'), Some(1));
        assert_eq!(dfa.get_state(0).unwrap().get_transition('b'), None);
        assert_eq!(dfa.get_state(1).unwrap().get_transitions().len(), 0);
        assert_eq!(dfa.get_accepting_states(), vec![1]);
    }

    #[test]
    fn test_abb_table() {
        let (_, dfa) = get_automata("abb.nfa");

        let expected = "Initial State: {0}\n\
                        Final State(s): {4}\n\
                        State      a        b\n\
                        0          {1}      {2}\n\
                        1          {1}      {3}\n\
                        2          {1}      {2}\n\
                        3          {1}      {4}\n\
                        4          {1}      {2}\n";
        assert_eq!(format_dfa_table(&dfa), expected);

        let sets: Vec<String> = dfa
            .get_states()
            .iter()
            .map(|state| state.get_nfa_states().to_string())
            .collect();
        assert_eq!(
            sets,
            vec![
                "{1,2,3,5,8}",
                "{2,3,4,5,7,8,9}",
                "{2,3,5,6,7,8}",
                "{2,3,5,6,7,8,10}",
                "{2,3,5,6,7,8,11}",
            ]
        );
    }

    #[test]
    fn test_abb_language_is_preserved() {
        let (nfa, dfa) = get_automata("abb.nfa");

        for word in all_words(&['a', 'b'], 8) {
            assert_eq!(nfa.accepts(&word), dfa.accepts(&word), "word {:?}", word);
            assert_eq!(dfa.accepts(&word), word.ends_with("abb"), "word {:?}", word);
        }
    }

    #[test]
    fn test_construction_is_reproducible() {
        let (nfa, first) = get_automata("abb.nfa");
        let (second, steps) = construct_dfa_with_trace(&nfa).unwrap();

        assert_eq!(first.get_states(), second.get_states());
        assert_eq!(format_dfa_table(&first), format_dfa_table(&second));

        // Every marked state was first discovered, and was marked exactly once
        let marks: Vec<usize> = steps
            .iter()
            .filter_map(|step| match step {
                TraceStep::Mark { dfa_state } => Some(*dfa_state),
                _ => None,
            })
            .collect();
        assert_eq!(marks, (0..second.get_num_states()).collect::<Vec<_>>());

        let start = epsilon_closure(&nfa, &nfa.state_set([nfa.get_start_state()]));
        assert_eq!(second.get_state(0).unwrap().get_nfa_states(), &start);
    }

    #[test]
    fn test_trace_output() {
        let nfa = read_nfa_file(&data_path("small.nfa")).unwrap();
        let (_, steps) = construct_dfa_with_trace(&nfa).unwrap();

        let trace = format_trace(&steps);
        assert!(trace.starts_with("E-closure(I0) = {1,2} = 0\n"));
        assert!(trace.contains("{1,2} --a--> {3}\nE-closure{3} = {3} = 1\n"));
        assert!(!trace.contains("--b-->"));
    }

    #[test]
    fn test_unreachable_states() {
        let (nfa, dfa) = get_automata("unreachable.nfa");

        assert_eq!(dfa.get_num_states(), 2);
        for state in dfa.get_states() {
            assert!(!state.get_nfa_states().contains(3));
            assert!(!state.get_nfa_states().contains(4));
        }
        assert_eq!(dfa.get_accepting_states(), vec![1]);

        for word in all_words(&['0', '1'], 6) {
            assert_eq!(nfa.accepts(&word), dfa.accepts(&word), "word {:?}", word);
        }
    }

    #[test]
    fn test_malformed_file() {
        let err = read_nfa_file(&data_path("malformed.nfa")).unwrap_err();

        let err = err.downcast_ref::<ParseError>().unwrap();

        match err {
            ParseError::InvalidStateId { line, token } => {
                assert_eq!(*line, 5);
                assert_eq!(token, "x");
            }
            _ => panic!("Expected an invalid state id, got {:?}", err),
        }
    }

    #[test]
    fn test_saved_dfa_loads_back() {
        let (_, dfa) = get_automata("abb.nfa");

        let mut path = std::env::temp_dir();
        path.push(format!("nfa2dfa_integration_{}.json", std::process::id()));
        let path = path.to_string_lossy().to_string();

        dfa.save_dfa(&path).unwrap();
        let loaded = load_dfa(&path);
        std::fs::remove_file(&path).unwrap();

        let loaded = loaded.unwrap();
        assert_eq!(format_dfa_table(&loaded), format_dfa_table(&dfa));
        assert!(loaded.accepts("babb"));
        assert!(!loaded.accepts("abba"));
    }
}
