#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use torus_life::{Backend, Grid, TorusLife, TorusLifeConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_SIDE: usize = 500;
const MIN_SIDE: usize = 8;
const LIVE_DENSITY: f64 = 0.1;
const DEFAULT_STEPS: u64 = 200;
const CHECK_INTERVAL: u64 = 50;

struct MainArgs {
    side: usize,
    steps: u64,
    config: TorusLifeConfig,
    parallel_only: bool,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut side = DEFAULT_SIDE;
    let mut steps = DEFAULT_STEPS;
    let mut config = TorusLifeConfig::default();
    let mut parallel_only = false;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--side" => {
                i += 1;
                let n: usize = next_arg(i, "--side")
                    .parse()
                    .expect("--side requires a positive integer");
                side = n.max(MIN_SIDE);
            }
            "--steps" => {
                i += 1;
                steps = next_arg(i, "--steps")
                    .parse()
                    .expect("--steps requires a positive integer");
            }
            "--threads" => {
                i += 1;
                let n: usize = next_arg(i, "--threads")
                    .parse()
                    .expect("--threads requires a positive integer");
                config = config.thread_count(n);
            }
            "--parallel-only" => {
                parallel_only = true;
            }
            other => panic!(
                "unknown argument: {other}\nusage: torus-life [--side N] [--steps N] [--threads N] [--parallel-only]"
            ),
        }
        i += 1;
    }
    MainArgs {
        side,
        steps,
        config,
        parallel_only,
    }
}

fn random_grid(side: usize) -> Grid {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    let threshold = (u64::MAX as f64 * LIVE_DENSITY) as u64;
    let mut grid = Grid::new(side);
    for row in 0..side as i64 {
        for col in 0..side as i64 {
            if rng.next_u64() <= threshold {
                grid.set(row, col, true);
            }
        }
    }
    grid
}

fn engine(grid: Grid, config: TorusLifeConfig) -> TorusLife {
    TorusLife::from_grid(grid, config).expect("random grid is 0/1 encoded")
}

fn run_checked(args: &MainArgs) {
    let grid = random_grid(args.side);
    let mut sequential = engine(grid.clone(), args.config.clone().backend(Backend::Sequential));
    let mut parallel = engine(grid, args.config.clone().backend(Backend::Parallel));

    let mut seq_total = Duration::ZERO;
    let mut par_total = Duration::ZERO;
    let checkpoints = (args.steps / CHECK_INTERVAL).max(1);
    let interval = args.steps.min(CHECK_INTERVAL).max(1);

    for checkpoint in 1..=checkpoints {
        let iteration = checkpoint * interval;

        let start = Instant::now();
        sequential.step_n(interval);
        let seq_phase = start.elapsed();
        seq_total += seq_phase;

        let start = Instant::now();
        parallel.step_n(interval);
        let par_phase = start.elapsed();
        par_total += par_phase;

        let seq_population = sequential.population();
        let par_population = parallel.population();
        let match_status = if sequential.grid() == parallel.grid() {
            "MATCH"
        } else {
            "MISMATCH"
        };
        println!(
            "Generation {iteration}: sequential pop = {seq_population}, parallel pop = {par_population} [{match_status}]"
        );
        println!(
            "  sequential: {:.3} ms | parallel ({:?}): {:.3} ms",
            seq_phase.as_secs_f64() * 1000.0,
            parallel.backend(),
            par_phase.as_secs_f64() * 1000.0
        );
    }

    let generations = checkpoints * interval;
    let seq_ms = seq_total.as_secs_f64() * 1000.0;
    let par_ms = par_total.as_secs_f64() * 1000.0;
    println!("\n--- Summary ({generations} generations, {0}x{0}) ---", args.side);
    println!(
        "sequential: {seq_ms:.3} ms total, {:.6} ms/gen",
        seq_ms / generations as f64
    );
    println!(
        "parallel:   {par_ms:.3} ms total, {:.6} ms/gen",
        par_ms / generations as f64
    );
    println!("Speedup (sequential / parallel): {:.2}x", seq_ms / par_ms);
}

fn run_parallel_only(args: &MainArgs) {
    let mut parallel = engine(
        random_grid(args.side),
        args.config.clone().backend(Backend::Parallel),
    );
    let start = Instant::now();
    parallel.step_n(args.steps);
    let ms = start.elapsed().as_secs_f64() * 1000.0;
    println!(
        "{} generations on {}x{}: {ms:.3} ms, population {}",
        args.steps,
        args.side,
        args.side,
        parallel.population()
    );
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();
    if args.parallel_only {
        run_parallel_only(&args);
    } else {
        run_checked(&args);
    }
}
