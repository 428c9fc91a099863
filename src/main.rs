//! # Connect Four in the terminal
//!
//! Human vs engine, or engine vs engine, on a colored text board. After
//! every engine move the root statistics of the search are printed.
//!
//! ## Usage
//! Run with `cargo run --release --bin play -- --human a` to move first.

use std::error::Error;
use std::io::{self, BufRead, Write};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use colored::Colorize;
use mcts::lines::{NUM_COLS, NUM_ROWS};
use mcts::{
    BudgetSchedule, Decision, DecisionSource, Engine, EngineConfig, GameController, Position, Side,
    Status,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Human {
    A,
    B,
    /// Engine plays both sides
    None,
}

impl Human {
    fn plays(self, side: Side) -> bool {
        matches!((self, side), (Human::A, Side::A) | (Human::B, Side::B))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Side controlled from the keyboard; A always moves first
    #[arg(long, value_enum, default_value_t = Human::A)]
    human: Human,

    /// MCTS iterations per engine move
    #[arg(short, long, default_value_t = mcts::config::DEFAULT_ITERATIONS)]
    iterations: u32,

    /// Rollouts simulated from the chosen node in each iteration
    #[arg(short, long, default_value_t = 1)]
    simulations: u32,

    /// UCT exploration constant
    #[arg(short, long, default_value_t = std::f64::consts::SQRT_2)]
    exploration: f64,

    /// Worker threads for root-parallel search (0 = one per CPU)
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Fixed seed for reproducible engine moves
    #[arg(long)]
    seed: Option<u64>,

    /// Wall-clock bound per engine move in milliseconds
    #[arg(long)]
    time_limit_ms: Option<u64>,

    /// Take immediate wins and block immediate losses without searching
    #[arg(long, action = clap::ArgAction::SetTrue)]
    tactics: bool,

    /// Reduce the budget after every engine move by the number of discs on the board
    #[arg(long, action = clap::ArgAction::SetTrue)]
    shrink_budget: bool,

    /// Lowest budget reachable with --shrink-budget
    #[arg(long, default_value_t = 100)]
    min_iterations: u32,

    /// Node cap of each search tree
    #[arg(long, default_value_t = mcts::config::DEFAULT_MAX_NODES)]
    max_nodes: usize,

    /// Hide the per-move search statistics
    #[arg(long, action = clap::ArgAction::SetTrue)]
    quiet: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn engine_config(&self) -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_iterations(self.iterations)
            .with_simulations_per_iteration(self.simulations)
            .with_exploration(self.exploration)
            .with_threads(self.threads)
            .with_max_nodes(self.max_nodes)
            .with_immediate_tactics(self.tactics);
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(ms) = self.time_limit_ms {
            config = config.with_time_limit(Duration::from_millis(ms));
        }
        config
    }
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn disc(side: Option<Side>) -> String {
    match side {
        Some(Side::A) => "●".red().bold().to_string(),
        Some(Side::B) => "●".yellow().bold().to_string(),
        None => "·".dimmed().to_string(),
    }
}

fn render(position: &Position) -> String {
    let mut out = String::new();
    for row in 0..NUM_ROWS {
        out.push_str(" │");
        for col in 0..NUM_COLS {
            out.push(' ');
            out.push_str(&disc(position.cell_at(col, row)));
        }
        out.push_str(" │\n");
    }
    out.push_str(" └");
    out.push_str(&"──".repeat(NUM_COLS));
    out.push_str("─┘\n  ");
    for col in 0..NUM_COLS {
        out.push_str(&format!(" {col}"));
    }
    out.push('\n');
    out
}

fn print_decision(side: Side, decision: &Decision) {
    match decision.source {
        DecisionSource::ImmediateWin => {
            println!("{side} plays {} (immediate win)", decision.column);
            return;
        }
        DecisionSource::ForcedBlock => {
            println!("{side} plays {} (forced block)", decision.column);
            return;
        }
        DecisionSource::Search => {}
    }

    println!(
        "{side} plays {} after {} iterations x {} simulations, {} nodes in {:.3}s (seed {})",
        decision.column,
        decision.iterations,
        decision.simulations_per_iteration,
        decision.nodes,
        decision.elapsed.as_secs_f64(),
        decision.seed
    );
    println!("  {:>6} {:>7} {:>7} {:>7} {:>7} {:>8}", "column", "visits", "wins A", "wins B", "draws", "score");
    for child in &decision.children {
        let score = child
            .average_score
            .map_or_else(|| "-".to_string(), |s| format!("{s:.3}"));
        let line = format!(
            "  {:>6} {:>7} {:>7} {:>7} {:>7} {:>8}",
            child.column, child.stats.visits, child.stats.wins_a, child.stats.wins_b, child.stats.draws, score
        );
        if child.column == decision.column {
            println!("{}", line.as_str().bold());
        } else {
            println!("{line}");
        }
    }
}

/// Reads columns until one is legal. `None` on end of input.
fn read_column(controller: &GameController, input: &mut impl BufRead) -> io::Result<Option<usize>> {
    loop {
        print!("{} to move, column 0-{}: ", controller.to_move(), NUM_COLS - 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        match trimmed.parse::<usize>() {
            Ok(column) => match controller.validate_move(column) {
                Ok(()) => return Ok(Some(column)),
                Err(err) => println!("{}", err.to_string().as_str().red()),
            },
            Err(_) => println!("{}", format!("'{trimmed}' is not a column").as_str().red()),
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    let mut engine = Engine::new(args.engine_config())?;
    let mut controller = GameController::new(Side::A);
    if args.shrink_budget {
        controller = controller.with_budget_schedule(BudgetSchedule {
            min_iterations: args.min_iterations,
        });
    }

    let stdin = io::stdin();
    let mut input = stdin.lock();

    print!("{}", render(controller.position()));
    while !controller.is_game_over() {
        let side = controller.to_move();
        if args.human.plays(side) {
            let Some(column) = read_column(&controller, &mut input)? else {
                println!("Bye.");
                return Ok(());
            };
            controller.apply_move(column)?;
        } else {
            let (decision, _) = controller.engine_move(&mut engine)?;
            if args.quiet {
                println!("{side} plays {}", decision.column);
            } else {
                print_decision(side, &decision);
            }
        }
        println!();
        print!("{}", render(controller.position()));
    }

    let notice = match controller.status() {
        Status::Win(side) if args.human.plays(side) => "You win!".green().bold(),
        Status::Win(side) => format!("{side} wins.").as_str().yellow().bold(),
        _ => "Draw.".normal(),
    };
    println!("\n{notice}\n");
    print!("{}", controller.format_history());
    Ok(())
}
