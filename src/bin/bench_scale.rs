use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;
use torus_life::{Backend, Grid, TorusLife, TorusLifeConfig};

fn bench_torus(side: usize, density: f64, iterations: u64, backend: Backend) -> (f64, u64) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    let threshold = (u64::MAX as f64 * density) as u64;
    let mut grid = Grid::new(side);
    for row in 0..side as i64 {
        for col in 0..side as i64 {
            if rng.next_u64() <= threshold {
                grid.set(row, col, true);
            }
        }
    }

    let mut engine = TorusLife::from_grid(grid, TorusLifeConfig::default().backend(backend))
        .expect("seeded grid is 0/1 encoded");
    let start = Instant::now();
    engine.step_n(iterations);
    let duration = start.elapsed();

    let total_ms = duration.as_secs_f64() * 1000.0;
    (total_ms, engine.population())
}

fn main() {
    let scales: &[(usize, u64)] = &[
        (256, 200),
        (512, 100),
        (1024, 50),
        (2048, 20),
        (4096, 5),
    ];

    println!(
        "{:<12} {:>8} {:>14} {:>14} {:>9}",
        "Grid", "Iters", "Seq avg(ms)", "Par avg(ms)", "Speedup"
    );
    println!("{}", "-".repeat(61));

    for &(side, iters) in scales {
        let (seq_ms, seq_pop) = bench_torus(side, 0.1, iters, Backend::Sequential);
        let (par_ms, par_pop) = bench_torus(side, 0.1, iters, Backend::Parallel);
        assert_eq!(seq_pop, par_pop, "population mismatch at {side}");
        println!(
            "{:<12} {:>8} {:>14.4} {:>14.4} {:>8.2}x",
            format!("{side}x{side}"),
            iters,
            seq_ms / iters as f64,
            par_ms / iters as f64,
            seq_ms / par_ms
        );
    }
}
