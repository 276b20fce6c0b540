//! The walkable/blocked cell grid.
//!
//! [`CellGrid`] owns one [`Cell`] per coordinate of a fixed `width × height`
//! rectangle. Only a cell's [`CellKind`] ever changes after construction;
//! the grid is never resized.

use crate::geom::{Point, Range};
use std::fmt;

/// Terrain of a single cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    Ground,
    Wall,
}

impl CellKind {
    /// The opposite kind.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Ground => Self::Wall,
            Self::Wall => Self::Ground,
        }
    }

    /// Character used by [`CellGrid::from_ascii`] and [`CellGrid::to_ascii`].
    pub const fn glyph(self) -> char {
        match self {
            Self::Ground => '.',
            Self::Wall => '#',
        }
    }
}

/// A grid cell. The position is its identity and never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub pos: Point,
    pub kind: CellKind,
}

/// A fixed-size 2D grid of [`Cell`]s, stored row-major from the bottom row.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellGrid {
    cells: Vec<Cell>,
    width: i32,
    height: i32,
}

impl CellGrid {
    /// Create a grid of the given size filled with [`CellKind::Ground`].
    ///
    /// Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let cells = Range::new(0, 0, width, height)
            .iter()
            .map(|pos| Cell {
                pos,
                kind: CellKind::Ground,
            })
            .collect();
        Self {
            cells,
            width,
            height,
        }
    }

    /// Parse a grid from ASCII art: `.` is ground, `#` is wall.
    ///
    /// The first text line is the TOP row, so the picture reads the way it
    /// is drawn. Surrounding whitespace of the whole string is ignored and
    /// every line must have the same width.
    pub fn from_ascii(s: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> = s.trim().lines().map(str::trim_end).collect();
        let width = lines.first().map_or(0, |l| l.chars().count()) as i32;
        let height = lines.len() as i32;
        if lines.iter().any(|l| l.chars().count() as i32 != width) {
            return Err(GridError::InconsistentSize(s.trim().to_string()));
        }

        let mut grid = Self::new(width, height);
        for (row, line) in lines.iter().enumerate() {
            let y = height - 1 - row as i32;
            for (x, ch) in line.chars().enumerate() {
                let pos = Point::new(x as i32, y);
                let kind = match ch {
                    '.' => CellKind::Ground,
                    '#' => CellKind::Wall,
                    _ => return Err(GridError::InvalidGlyph { ch, pos }),
                };
                grid.set_kind(pos, kind);
            }
        }
        Ok(grid)
    }

    /// Render the grid back to the [`from_ascii`](Self::from_ascii) format.
    pub fn to_ascii(&self) -> String {
        self.render(|_, kind| kind.glyph())
    }

    /// Render the grid top row first, choosing each character with `glyph`.
    pub fn render(&self, mut glyph: impl FnMut(Point, CellKind) -> char) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.height as usize);
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                let cell = self.cells[self.index(Point::new(x, y))];
                out.push(glyph(cell.pos, cell.kind));
            }
            if y > 0 {
                out.push('\n');
            }
        }
        out
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// The full grid rectangle `[0,width) × [0,height)`.
    pub fn bounds(&self) -> Range {
        Range::new(0, 0, self.width, self.height)
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bounds().contains(p)
    }

    /// Get the cell at a point, or `None` if out of bounds.
    pub fn at(&self, p: Point) -> Option<Cell> {
        if !self.contains(p) {
            return None;
        }
        Some(self.cells[self.index(p)])
    }

    /// Kind of the cell at `p`, or `None` if out of bounds.
    pub fn kind(&self, p: Point) -> Option<CellKind> {
        self.at(p).map(|c| c.kind)
    }

    /// In bounds and [`CellKind::Ground`].
    pub fn is_walkable(&self, p: Point) -> bool {
        self.kind(p) == Some(CellKind::Ground)
    }

    /// Set the kind of the cell at `p`. Returns `false` if out of bounds.
    pub fn set_kind(&mut self, p: Point, kind: CellKind) -> bool {
        if !self.contains(p) {
            return false;
        }
        let idx = self.index(p);
        self.cells[idx].kind = kind;
        true
    }

    /// Flip the cell at `p` and return its new kind.
    pub fn toggle(&mut self, p: Point) -> Option<CellKind> {
        if !self.contains(p) {
            return None;
        }
        let idx = self.index(p);
        let kind = self.cells[idx].kind.toggled();
        self.cells[idx].kind = kind;
        Some(kind)
    }

    /// Fill every cell of `rng` (clipped to the grid) with `kind`.
    pub fn fill(&mut self, rng: Range, kind: CellKind) {
        for p in rng.intersect(self.bounds()) {
            let idx = self.index(p);
            self.cells[idx].kind = kind;
        }
    }

    /// Count cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind == kind).count()
    }

    /// All cells, row-major from the bottom row.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    fn index(&self, p: Point) -> usize {
        (p.y * self.width + p.x) as usize
    }
}

/// Errors produced while parsing a grid from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Lines have inconsistent widths.
    InconsistentSize(String),
    /// A character other than `.` or `#` was found.
    InvalidGlyph { ch: char, pos: Point },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InconsistentSize(s) => write!(f, "grid: inconsistent line widths:\n{s}"),
            Self::InvalidGlyph { ch, pos } => {
                write!(f, "grid: invalid glyph \u{201c}{ch}\u{201d} at {pos}")
            }
        }
    }
}

impl std::error::Error for GridError {}
