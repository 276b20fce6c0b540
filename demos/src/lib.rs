//! Maze world generation and text rendering for the pathfinding demo.
//!
//! The generator places square wall blocks on a regular lattice and grows
//! each block in one random direction, which yields a maze-like field of
//! corridors. Rendering overlays a path on the ASCII form of the grid.

use std::fmt;

use env_logger::Env;
use hpa_core::{CellGrid, CellKind, Point, Range};
use rand::{Rng, RngExt};

/// Install `env_logger`, honouring `RUST_LOG` and falling back to `level`.
pub fn init_logging(level: Option<&str>) {
    let default = level.unwrap_or("info");
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default)).try_init();
}

/// Errors from world generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MazeError {
    /// Wall blocks are centred on a cell and need an odd side length.
    EvenThickness(i32),
}

impl fmt::Display for MazeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EvenThickness(t) => write!(f, "wall thickness must be odd and positive, got {t}"),
        }
    }
}

impl std::error::Error for MazeError {}

/// Fill a `size × size` block of walls centred on `center`, clipped to the grid.
fn make_wall(grid: &mut CellGrid, size: i32, center: Point) {
    let min = center - Point::new(size / 2, size / 2);
    grid.fill(Range::square(min, size), CellKind::Wall);
}

/// Scatter wall blocks of side `thickness` over the grid.
///
/// Block centres sit on a lattice with spacing `2 * thickness`. Each block
/// gets one extra block next to it, on a randomly chosen side. Returns the
/// number of lattice blocks placed.
pub fn generate_maze(grid: &mut CellGrid, thickness: i32, rng: &mut impl Rng) -> Result<usize, MazeError> {
    if thickness <= 0 || thickness % 2 == 0 {
        return Err(MazeError::EvenThickness(thickness));
    }
    let spacing = thickness * 2;
    let phase = thickness + thickness / 2;
    let mut placed = 0;
    for p in grid.bounds() {
        if p.x % spacing != phase || p.y % spacing != phase {
            continue;
        }
        make_wall(grid, thickness, p);
        let extra = match rng.random_range(0..4u32) {
            0 => Point::new(thickness, 0),
            1 => Point::new(-thickness, 0),
            2 => Point::new(0, thickness),
            _ => Point::new(0, -thickness),
        };
        make_wall(grid, thickness, p + extra);
        placed += 1;
    }
    log::debug!("placed {placed} wall blocks of size {thickness}");
    Ok(placed)
}

/// Wall off every cell within `width` of the grid edge.
pub fn create_border(grid: &mut CellGrid, width: i32) {
    let inner = Range::new(width, width, grid.width() - width, grid.height() - width);
    for p in grid.bounds() {
        if !inner.contains(p) {
            grid.set_kind(p, CellKind::Wall);
        }
    }
}

/// The first ground cell found scanning outward from `near`, ring by ring.
pub fn ground_near(grid: &CellGrid, near: Point) -> Option<Point> {
    let reach = grid.width().max(grid.height());
    (0..=reach).find_map(|r| {
        Range::new(near.x - r, near.y - r, near.x + r + 1, near.y + r + 1)
            .iter()
            .find(|&p| grid.is_walkable(p))
    })
}

/// A uniformly chosen ground cell, or `None` if there is none.
pub fn random_ground(grid: &CellGrid, rng: &mut impl Rng) -> Option<Point> {
    let ground: Vec<Point> = grid
        .iter()
        .filter(|c| c.kind == CellKind::Ground)
        .map(|c| c.pos)
        .collect();
    if ground.is_empty() {
        return None;
    }
    Some(ground[rng.random_range(0..ground.len())])
}

/// ASCII picture of `grid` with `path` drawn as `*`, its ends as `S`/`G`.
pub fn render_path(grid: &CellGrid, path: &[Point]) -> String {
    let start = path.first().copied();
    let goal = path.last().copied();
    grid.render(|p, kind| {
        if Some(p) == start {
            'S'
        } else if Some(p) == goal {
            'G'
        } else if path.contains(&p) {
            '*'
        } else {
            kind.glyph()
        }
    })
}
