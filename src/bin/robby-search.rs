use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use robby::{ActionAlphabet, Level, PlanVisualizer, Planner, PlannerConfig, SearchOutcome};

/// Use breadth-first search to help Robby the Robot pick up every can
/// without running out of battery
#[derive(Parser)]
#[command(name = "robby-search")]
struct Cli {
    /// Path to a text file containing the world design
    file: PathBuf,

    /// Order in which actions are tried
    #[arg(short, long, default_value = "GNESW")]
    actions: ActionAlphabet,

    /// Full battery power
    #[arg(short, long, default_value_t = 7)]
    battery: u32,

    /// Display details about the search
    #[arg(short, long)]
    verbose: bool,

    /// Drive a live world along the plan, printing each step
    #[arg(long)]
    replay: bool,

    /// Pause between replayed steps
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Ignore battery level when discarding already-seen states
    #[arg(long)]
    ignore_battery: bool,

    /// Accept plans that leave the battery at exactly zero
    #[arg(long)]
    allow_empty_battery: bool,

    /// Grab every can as soon as Robby stands on it
    #[arg(long)]
    must_grab: bool,

    /// Give up after this many expansions
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Write the plan as a Graphviz DOT file
    #[arg(long)]
    dot: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    env_logger::init();
    let cli = Cli::parse();

    let level = Level::load(&cli.file)?;
    let initial = level.initial_state(cli.battery)?;

    let mut config = PlannerConfig::default()
        .dedupe_on_battery(!cli.ignore_battery)
        .allow_empty_battery(cli.allow_empty_battery)
        .must_grab_cans(cli.must_grab);
    if let Some(limit) = cli.max_expansions {
        config = config.max_expansions(limit);
    }
    let planner = Planner::with_config(cli.actions, config);

    if cli.verbose {
        println!("{}", initial);
        println!("Running breadth-first search...");
    }
    let report = planner.plan(&initial)?;

    match &report.outcome {
        SearchOutcome::Solved(path) => println!("{}", path),
        SearchOutcome::Exhausted => println!("No solution found."),
    }
    if cli.verbose {
        println!("--> searched {} paths", report.stats.expanded);
        println!(
            "    generated {}, pruned {}, largest frontier {}",
            report.stats.generated, report.stats.pruned, report.stats.max_frontier
        );
    }

    let Some(path) = report.outcome.path() else {
        return Ok(());
    };

    if let Some(dot) = &cli.dot {
        PlanVisualizer::new()
            .with_rules(config.rules())
            .visualize_plan(&initial, path, dot)?;
        println!("Wrote {}", dot.display());
    }

    if cli.replay {
        let mut world = level.world(cli.battery)?;
        let delay = Duration::from_millis(cli.delay_ms);
        println!("{}{}", world, world.status());
        world.replay(path, |world, action, outcome| {
            thread::sleep(delay);
            println!("\n{} -> {:?}", action, outcome);
            println!("{}{}", world, world.status());
        });
        if world.cans_remaining() == 0 {
            println!("Robby wins!");
        }
    }

    Ok(())
}
