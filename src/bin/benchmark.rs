use std::error::Error;
use std::time::{Duration, Instant};

use clap::Parser;
use mcts::{Engine, EngineConfig, GameState, Position, Side};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Iterations per decision
    #[arg(long, default_value_t = 20_000)]
    iterations: u32,

    /// Decisions timed per thread count
    #[arg(long, default_value_t = 5)]
    rounds: u32,

    /// Thread counts to compare (0 = one per CPU)
    #[arg(long, value_delimiter = ',', default_values_t = vec![1, 2, 4, 0])]
    threads: Vec<usize>,

    /// Base seed; round `n` uses `seed + n` (wrapping)
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

struct RunStats {
    iterations: u64,
    nodes: u64,
    elapsed: Duration,
}

/// Seed of one timed round; wraps instead of overflowing near `u64::MAX`.
fn round_seed(base: u64, round: u32) -> u64 {
    base.wrapping_add(u64::from(round))
}

fn bench(args: &Args, threads: usize) -> Result<RunStats, Box<dyn Error>> {
    let opening = GameState::new(Position::new(), Side::A);
    let mut stats = RunStats {
        iterations: 0,
        nodes: 0,
        elapsed: Duration::ZERO,
    };

    for round in 0..args.rounds {
        let config = EngineConfig::default()
            .with_iterations(args.iterations)
            .with_threads(threads)
            .with_seed(round_seed(args.seed, round));
        let engine = Engine::new(config)?;

        let start = Instant::now();
        let decision = engine.decide(&opening)?;
        stats.elapsed += start.elapsed();
        stats.iterations += u64::from(decision.iterations);
        stats.nodes += decision.nodes as u64;
    }
    Ok(stats)
}

fn print_stats(threads: usize, stats: &RunStats) {
    let secs = stats.elapsed.as_secs_f64();
    println!("{} thread(s):", threads);
    println!("  Iterations: {}", stats.iterations);
    println!("  Nodes: {}", stats.nodes);
    println!("  Time: {:.3}s", secs);
    println!("  IPS: {:.0} iterations/sec", stats.iterations as f64 / secs);
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(&args.log_level);

    println!("Connect Four MCTS - Benchmark");
    println!("=============================");
    println!("Iterations per decision: {}", args.iterations);
    println!("Rounds: {}", args.rounds);
    println!("-----------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    for &requested in &args.threads {
        let threads = EngineConfig::default().with_threads(requested).effective_threads();
        let stats = bench(&args, threads)?;
        print_stats(threads, &stats);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_seed_wraps() {
        assert_eq!(round_seed(1, 4), 5);
        assert_eq!(round_seed(u64::MAX, 0), u64::MAX);
        assert_eq!(round_seed(u64::MAX, 1), 0);
        assert_eq!(round_seed(u64::MAX - 1, 3), 1);
    }
}
