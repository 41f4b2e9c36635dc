use clap::{Arg, ArgAction, Command};
use color_eyre::eyre::{eyre, Result};
use nfa2dfa::fa::FA;
use nfa2dfa::{construct_dfa_with_trace, format_dfa_table, format_trace, read_nfa_file, visualize};
use tracing::Level;

enum Visualize {
    None,
    NFA,
    DFA,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Command::new("nfa2dfa")
        .version("0.1")
        .about("Convert an NFA with epsilon moves into a DFA using the subset construction")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("The NFA description file")
                .value_name("NFA FILE")
                .value_parser(clap::value_parser!(String))
                .required(true),
        )
        .arg(
            Arg::new("trace")
                .short('t')
                .long("trace")
                .help("Print every epsilon closure and move computed during the construction")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-nfa")
                .short('n')
                .long("save-nfa")
                .help("Save the NFA read from the input file as constructed_nfa.jpg")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("save-dfa")
                .short('d')
                .long("save-dfa")
                .help("Save the DFA obtained after Subset Construction as constructed_dfa.jpg")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .short('j')
                .long("json")
                .help("Save the DFA as json to the given file")
                .value_name("JSON FILE")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("word")
                .short('w')
                .long("word")
                .help("Run the DFA on a word and report whether it is accepted. May be repeated")
                .value_name("WORD")
                .action(ArgAction::Append)
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new("visualize")
                .short('V')
                .long("visualize")
                .help("Visualize the automaton inside an interactive window that allows for zooming, panning and clicking of elements")
                .value_name("NFA, DFA")
                .value_parser(clap::value_parser!(String))
                .num_args(1),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log more details to stderr, repeat for more")
                .action(ArgAction::Count),
        )
        .get_matches();

    let level = match args.get_count("verbose") {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let input = match args.get_one::<String>("input") {
        Some(file_path) => file_path,
        None => return Err(eyre!("Error: Input NFA file not provided!")),
    };

    let visualize_target = match args.get_one::<String>("visualize") {
        None => Visualize::None,
        Some(target) if target.eq_ignore_ascii_case("nfa") => Visualize::NFA,
        Some(target) if target.eq_ignore_ascii_case("dfa") => Visualize::DFA,
        Some(target) => {
            return Err(eyre!(
                "visualize should be one of NFA | DFA, found {}",
                target
            ))
        }
    };

    println!("\n************************\nNFA to DFA CONVERSION\n************************\n");

    let nfa = read_nfa_file(input)?;
    let (dfa, steps) = construct_dfa_with_trace(&nfa)?;

    if args.get_flag("trace") {
        println!("{}", format_trace(&steps));
    }

    print!("{}", format_dfa_table(&dfa));

    if let Some(words) = args.get_many::<String>("word") {
        println!();
        for word in words {
            let verdict = if dfa.accepts(word) { "accept" } else { "reject" };
            println!("{:?}: {}", word, verdict);
        }
    }

    if args.get_flag("save-nfa") {
        nfa.show_fa("constructed_nfa")?;
    }

    if args.get_flag("save-dfa") {
        dfa.show_fa("constructed_dfa")?;
    }

    if let Some(json_path) = args.get_one::<String>("json") {
        dfa.save_dfa(json_path)?;
    }

    match visualize_target {
        Visualize::None => {}
        Visualize::NFA => visualize(&nfa)?,
        Visualize::DFA => visualize(&dfa)?,
    }

    Ok(())
}
