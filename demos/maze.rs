//! Maze pathfinding demo: builds a maze world, preprocesses it, runs a
//! hierarchical and a low-level query, then blocks the route and queries
//! again.
//!
//! Run: cargo run --bin maze -- [size] [seed] [resolution]
//!
//! Set `RUST_LOG=debug` to see the query stages.

use std::error::Error;

use hpa_core::{CellGrid, Point};
use hpa_demos::{create_border, generate_maze, ground_near, init_logging, render_path};
use hpa_paths::{HierarchicalPathfinder, HpaConfig, path_weight};
use rand::SeedableRng;
use rand::rngs::StdRng;

const WALL_THICKNESS: i32 = 3;
const BORDER_WIDTH: i32 = 1;

fn arg<T: std::str::FromStr>(n: usize, default: T) -> Result<T, String> {
    match std::env::args().nth(n) {
        Some(s) => s.parse().map_err(|_| format!("invalid argument {n}: {s:?}")),
        None => Ok(default),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    init_logging(None);
    let size: i32 = arg(1, 48)?;
    let seed: u64 = arg(2, 42)?;
    let resolution: i32 = arg(3, 4)?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = CellGrid::new(size, size);
    generate_maze(&mut grid, WALL_THICKNESS, &mut rng)?;
    create_border(&mut grid, BORDER_WIDTH);

    let start = ground_near(&grid, Point::new(0, 0)).ok_or("the maze has no ground")?;
    let goal = ground_near(&grid, Point::new(size - 1, size - 1)).ok_or("the maze has no ground")?;

    let config = HpaConfig {
        resolution,
        ..HpaConfig::default()
    };
    let mut hpa = HierarchicalPathfinder::build(grid, config)?;
    log::info!(
        "{} clusters of {} cells, {} nodes, {} connections",
        hpa.clusters().len(),
        hpa.cluster_size(),
        hpa.graph().len(),
        hpa.graph().connection_count()
    );

    let path = hpa.find_path_hierarchical(start, goal)?;
    let bounds = hpa.grid().bounds();
    let optimal = hpa.find_path_low_level(start, goal, bounds)?;
    println!("{}\n", render_path(hpa.grid(), &path));
    println!(
        "hierarchical: {} cells, length {:.2}; low-level: {} cells, length {:.2}",
        path.len(),
        path_weight(&path),
        optimal.len(),
        path_weight(&optimal)
    );

    let inner = &path[1..path.len() - 1];
    let Some(&blocked) = inner.get(inner.len() / 2) else {
        return Ok(());
    };
    hpa.toggle_cell(blocked)?;
    println!("\nwalled {blocked}");
    match hpa.find_path_hierarchical(start, goal) {
        Ok(detour) => {
            println!("{}\n", render_path(hpa.grid(), &detour));
            println!("detour: {} cells, length {:.2}", detour.len(), path_weight(&detour));
        }
        Err(e) if e.is_no_path() => println!("{e}"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
