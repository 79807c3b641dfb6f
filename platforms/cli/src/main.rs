mod loader;

use clap::Parser;
use loader::MachineLoader;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tmsim::types::{DEFAULT_DEADLINE_MS, INPUT_BLANK_SYMBOL};
use tmsim::{
    check_deadline, formal, readiness, samples, ExecutionEngine, ExecutionSnapshot,
    ProgramResult, RunController, Status, TuringMachine,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None, arg_required_else_help = true)]
#[clap(after_help = "EXAMPLES:
  tmsim-cli --sample binary-increment --input 1011
  tmsim-cli --machine machine.json --input 0110 --step
  cat machine.json | tmsim-cli --input 01 --deadline-ms 50")]
struct Cli {
    /// Machine definition file (JSON). Read from stdin when omitted and input is piped.
    #[clap(short, long, conflicts_with = "sample")]
    machine: Option<PathBuf>,

    /// Use a built-in sample machine instead of a file
    #[clap(short, long)]
    sample: Option<String>,

    /// The input tape. '_' stands for the blank unless it is a working symbol.
    #[clap(short, long)]
    input: Option<String>,

    /// Maximum execution time in milliseconds
    #[clap(short, long, default_value_t = DEFAULT_DEADLINE_MS)]
    deadline_ms: u64,

    /// Print each step of the execution
    #[clap(long)]
    step: bool,

    /// Print the formal description and transition function of the machine
    #[clap(long)]
    describe: bool,

    /// List the built-in sample machines
    #[clap(long)]
    list: bool,

    /// Log engine activity to stderr
    #[clap(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list {
        for sample in samples::SAMPLES.iter() {
            println!("{:<18} {}", sample.name, sample.description);
        }
        return Ok(());
    }

    let machine = load_machine(&cli)?;
    tracing::debug!(
        states = machine.state_count,
        symbols = machine.alphabet.len(),
        "machine loaded"
    );

    if cli.describe {
        print_description(&machine)?;
    }

    let Some(input) = cli.input.as_deref() else {
        if cli.describe {
            return Ok(());
        }
        return Err("no input tape given (use --input)".into());
    };

    check_deadline(cli.deadline_ms)?;

    let status = readiness(&machine);
    if !status.is_ready() {
        match cli.sample.as_deref().and_then(samples::by_name) {
            // Built-in samples document their intentionally empty cells
            Some(sample) => tracing::debug!(sample = %sample.name, "{}", status.status()),
            None => eprintln!("Warning: {}", status.status()),
        }
    }

    let program = Arc::new(machine.compile()?);
    let input = rewrite_blanks(input, &machine);

    let result = if cli.step {
        run_stepwise(program, &input, cli.deadline_ms)?
    } else {
        let controller = RunController::new(program);
        controller.start_run(&input, cli.deadline_ms)?.wait()?
    };

    print_result(&result);
    Ok(())
}

/// Installs a stderr subscriber filtered by `RUST_LOG`, falling back to `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the machine from a sample name, a file, or piped stdin, in that order.
fn load_machine(cli: &Cli) -> Result<TuringMachine, Box<dyn Error>> {
    if let Some(name) = &cli.sample {
        let sample = samples::by_name(name).ok_or_else(|| {
            format!(
                "unknown sample '{}' (available: {})",
                name,
                samples::names().join(", ")
            )
        })?;
        Ok(sample.machine.clone())
    } else if let Some(path) = &cli.machine {
        Ok(MachineLoader::load_machine(path)?)
    } else if atty::isnt(atty::Stream::Stdin) {
        Ok(MachineLoader::load_machine_from_stdin()?)
    } else {
        Err("no machine given (use --machine, --sample or pipe a definition)".into())
    }
}

/// Replaces `INPUT_BLANK_SYMBOL` with the machine's blank unless it is a working symbol.
fn rewrite_blanks(input: &str, machine: &TuringMachine) -> String {
    if machine.accepts_symbol(INPUT_BLANK_SYMBOL) {
        return input.to_string();
    }

    input
        .chars()
        .map(|c| {
            if c == INPUT_BLANK_SYMBOL {
                machine.blank
            } else {
                c
            }
        })
        .collect()
}

/// Steps on the current thread, printing every snapshot, until the machine halts or the
/// deadline passes.
fn run_stepwise(
    program: Arc<tmsim::CompiledMachine>,
    input: &str,
    deadline_ms: u64,
) -> Result<ProgramResult, Box<dyn Error>> {
    check_deadline(deadline_ms)?;
    let mut engine = ExecutionEngine::with_tape(program, input)?;
    let deadline = Instant::now() + Duration::from_millis(deadline_ms);

    print_snapshot(&engine.snapshot()?);
    while !engine.is_halted() {
        if Instant::now() >= deadline {
            return Ok(engine.result(Status::TimedOut)?);
        }
        print_snapshot(&engine.step()?);
    }

    Ok(engine.result(engine.status())?)
}

fn print_description(machine: &TuringMachine) -> Result<(), Box<dyn Error>> {
    println!("{}", formal::describe(machine));
    for line in formal::describe_transitions(&machine.compile()?) {
        println!("  {line}");
    }
    println!("{}", readiness(machine).status());
    Ok(())
}

fn print_snapshot(snapshot: &ExecutionSnapshot) {
    println!(
        "Step: {}, State: q{}, Head: {}, Tape: [{}] from {}",
        snapshot.steps, snapshot.state, snapshot.head, snapshot.tape, snapshot.tape_start
    );
}

fn print_result(result: &ProgramResult) {
    match result.status {
        Status::TimedOut => println!("\nMachine did not halt before the deadline."),
        status => println!("\nMachine {status}."),
    }
    println!("State: {}", result.state_label);
    println!("Head: {}", result.head);
    println!("Steps: {}", result.steps);
    println!("Tape: {}", result.tape);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tmsim::TuringMachineError;

    #[test]
    fn test_rewrite_blanks() {
        let mut machine = TuringMachine::new();
        machine.add_symbol('1');
        machine.set_blank('#');

        assert_eq!(rewrite_blanks("1_1", &machine), "1#1");
    }

    #[test]
    fn test_rewrite_blanks_keeps_working_underscore() {
        let mut machine = TuringMachine::new();
        machine.add_symbol('_');

        assert_eq!(rewrite_blanks("_a_", &machine), "_a_");
    }

    #[test]
    fn test_run_stepwise_reaches_result() {
        let sample = samples::by_name("even-ones").unwrap();
        let program = Arc::new(sample.machine.compile().unwrap());

        let result = run_stepwise(program, "11", 5_000).unwrap();

        assert_eq!(result.status, Status::Accepted);
        assert_eq!(result.tape, "11_");
    }

    #[test]
    fn test_run_stepwise_rejects_out_of_range_deadline() {
        let sample = samples::by_name("even-ones").unwrap();
        let program = Arc::new(sample.machine.compile().unwrap());

        let err = run_stepwise(program, "11", 0).unwrap_err();

        assert_eq!(
            err.to_string(),
            TuringMachineError::InvalidDeadline(0).to_string()
        );
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::parse_from([
            "tmsim-cli",
            "--sample",
            "even-ones",
            "--input",
            "0110",
            "--deadline-ms",
            "50",
            "--step",
        ]);

        assert_eq!(cli.sample.as_deref(), Some("even-ones"));
        assert_eq!(cli.input.as_deref(), Some("0110"));
        assert_eq!(cli.deadline_ms, 50);
        assert!(cli.step);
        assert!(!cli.describe);
    }
}
