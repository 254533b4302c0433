use std::io::Read;
use std::path::PathBuf;

use clap::Parser;

use nor_synth::error::Error;
use nor_synth::search::SearchConfig;
use nor_synth::synth::{solve, Problem, SynthesisConfig};
use nor_synth::truth_table::TruthTable;

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Truth table as a string of `0`/`1` characters, row 0 first.
    #[arg(value_name = "BITS")]
    table: Option<String>,

    /// Number of inputs (inferred from the table length if omitted).
    #[clap(long, value_name = "INT")]
    inputs: Option<u32>,

    /// Read the problem from a file (`-` for stdin) instead.
    #[clap(long, value_name = "FILE", conflicts_with = "table")]
    file: Option<PathBuf>,

    /// Try depths `0..max_depth`.
    #[clap(long, value_name = "INT", default_value = "4")]
    max_depth: u32,

    /// Search on the rayon pool.
    #[clap(long)]
    parallel: bool,

    /// Print the circuit in DOT format.
    #[clap(long)]
    dot: bool,
}

fn read_problem(args: &Cli) -> color_eyre::Result<Problem> {
    if let Some(path) = &args.file {
        let mut text = String::new();
        if path.as_os_str() == "-" {
            std::io::stdin().read_to_string(&mut text)?;
        } else {
            text = std::fs::read_to_string(path)?;
        }
        return Ok(text.parse()?);
    }

    let Some(bits) = &args.table else {
        color_eyre::eyre::bail!("either a truth table or --file is required");
    };
    let target = match args.inputs {
        Some(n) => TruthTable::parse(n, bits)?,
        None => TruthTable::parse_inferred(bits)?,
    };
    Ok(Problem { target, max_depth: None })
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let problem = read_problem(&args)?;
    println!("target = {} ({} inputs)", problem.target, problem.target.num_inputs());

    let config = SynthesisConfig {
        max_depth: args.max_depth,
        search: SearchConfig {
            parallel: args.parallel,
            ..SearchConfig::default()
        },
    };

    match solve(&problem, &config) {
        Ok(solution) => {
            let circuit = solution.circuit()?;
            println!("circuit = {}", circuit);
            println!("stats = {:?}", solution.stats);
            print!("{}", solution);
            if args.dot {
                print!("{}", circuit.to_dot()?);
            }
        }
        Err(err @ Error::SynthesisFailed { .. }) => {
            println!("{}", err);
        }
        Err(err) => return Err(err.into()),
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.2} s", time_total.as_secs_f64());

    Ok(())
}
