use std::collections::BinaryHeap;

use hpa_core::{CellGrid, Point, Range};

use crate::distance::euclidean;
use crate::error::PathError;
use crate::search::{GridSearch, NodeRef};
use crate::traits::{AstarPather, Pather, WeightedPather};

impl GridSearch {
    /// Compute the shortest path from `from` to `to` using A*.
    ///
    /// Returns the full path including both endpoints. Points outside the
    /// cached range are `OutOfBounds`; an exhausted open list is `NoPath`.
    pub fn astar_path<P: AstarPather>(
        &mut self,
        pather: &P,
        from: Point,
        to: Point,
    ) -> Result<Vec<Point>, PathError> {
        let start_idx = self.idx(from).ok_or(PathError::OutOfBounds(from))?;
        let goal_idx = self.idx(to).ok_or(PathError::OutOfBounds(to))?;
        self.expansions = 0;

        if start_idx == goal_idx {
            return Ok(vec![from]);
        }

        let cur_gen = self.next_generation();
        let mut seq = 0u64;

        {
            let node = &mut self.nodes[start_idx];
            node.g = 0.0;
            node.f = pather.estimate(from, to);
            node.parent = usize::MAX;
            node.generation = cur_gen;
            node.open = true;
        }

        let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
        open.push(NodeRef {
            idx: start_idx,
            f: self.nodes[start_idx].f,
            seq,
        });

        let mut nbuf = std::mem::take(&mut self.nbuf);

        let outcome = 'search: loop {
            let Some(current) = open.pop() else {
                break 'search Err(PathError::NoPath { from, to });
            };

            let ci = current.idx;

            // Skip stale entries.
            let node = &self.nodes[ci];
            if node.generation != cur_gen || !node.open || current.f > node.f {
                continue;
            }

            if ci == goal_idx {
                break 'search Ok(());
            }

            if self.limit.is_some_and(|max| self.expansions >= max) {
                break 'search Err(PathError::SearchLimit {
                    expansions: self.expansions,
                });
            }
            self.expansions += 1;

            self.nodes[ci].open = false;
            let current_g = self.nodes[ci].g;
            let current_point = self.point(ci);

            nbuf.clear();
            pather.neighbors(current_point, &mut nbuf);

            for &np in nbuf.iter() {
                let Some(ni) = self.idx(np) else {
                    continue;
                };
                let tentative_g = current_g + pather.cost(current_point, np);

                let n = &mut self.nodes[ni];
                if n.generation == cur_gen && tentative_g >= n.g {
                    continue;
                }

                n.generation = cur_gen;
                n.g = tentative_g;
                n.f = tentative_g + pather.estimate(np, to);
                n.parent = ci;
                n.open = true;

                seq += 1;
                open.push(NodeRef { idx: ni, f: n.f, seq });
            }
        };

        self.nbuf = nbuf;
        outcome?;

        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != usize::MAX {
            path.push(self.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        Ok(path)
    }
}

// ---------------------------------------------------------------------------
// RectPather
// ---------------------------------------------------------------------------

/// 8-directional movement over Ground cells inside a rectangle.
///
/// Steps cost their Euclidean length and the heuristic is the straight-line
/// distance, so the estimate is consistent. Diagonal steps only look at the
/// destination cell.
pub struct RectPather<'a> {
    grid: &'a CellGrid,
    rect: Range,
}

impl<'a> RectPather<'a> {
    /// `rect` is clipped to the grid bounds.
    pub fn new(grid: &'a CellGrid, rect: Range) -> Self {
        Self {
            grid,
            rect: rect.intersect(grid.bounds()),
        }
    }

    pub fn rect(&self) -> Range {
        self.rect
    }
}

impl Pather for RectPather<'_> {
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        buf.extend(
            p.neighbors_8()
                .into_iter()
                .filter(|&n| self.rect.contains(n) && self.grid.is_walkable(n)),
        );
    }
}

impl WeightedPather for RectPather<'_> {
    fn cost(&self, from: Point, to: Point) -> f32 {
        euclidean(from, to)
    }
}

impl AstarPather for RectPather<'_> {
    fn estimate(&self, from: Point, to: Point) -> f32 {
        euclidean(from, to)
    }
}

/// Validated low-level A* between two cells inside `rect`.
///
/// Errors, checked in order: either endpoint outside `rect ∩ grid` is
/// `OutOfBounds`, identical endpoints are `SameCell`, a wall endpoint is
/// `Blocked`. On success the path starts at `from` and ends at `to`.
pub fn find_grid_path(
    search: &mut GridSearch,
    grid: &CellGrid,
    rect: Range,
    from: Point,
    to: Point,
) -> Result<Vec<Point>, PathError> {
    let pather = RectPather::new(grid, rect);
    for p in [from, to] {
        if !pather.rect().contains(p) {
            return Err(PathError::OutOfBounds(p));
        }
    }
    if from == to {
        return Err(PathError::SameCell(from));
    }
    for p in [from, to] {
        if !grid.is_walkable(p) {
            return Err(PathError::Blocked(p));
        }
    }
    search.astar_path(&pather, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance::path_weight;
    use std::f32::consts::SQRT_2;

    fn search_for(grid: &CellGrid) -> GridSearch {
        GridSearch::new(grid.bounds())
    }

    fn assert_steps_are_adjacent(path: &[Point]) {
        for w in path.windows(2) {
            assert!(w[0].is_adjacent(w[1]), "{} -> {}", w[0], w[1]);
        }
    }

    #[test]
    fn open_field_goes_diagonal() {
        let grid = CellGrid::new(6, 6);
        let mut search = search_for(&grid);
        let path = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 0), Point::new(4, 4))
            .unwrap();
        assert_eq!(path.len(), 5);
        assert_eq!(path[0], Point::new(0, 0));
        assert_eq!(path[4], Point::new(4, 4));
        assert!((path_weight(&path) - 4.0 * SQRT_2).abs() < 1e-4);
    }

    #[test]
    fn routes_around_a_wall() {
        let grid = CellGrid::from_ascii(
            "\
.....
.###.
.#...
.#...
.....",
        )
        .unwrap();
        let mut search = search_for(&grid);
        let from = Point::new(0, 2);
        let to = Point::new(3, 2);
        let path = find_grid_path(&mut search, &grid, grid.bounds(), from, to).unwrap();
        assert_eq!(path.first(), Some(&from));
        assert_eq!(path.last(), Some(&to));
        assert_steps_are_adjacent(&path);
        assert!(path.iter().all(|&p| grid.is_walkable(p)));
        // One step down, then diagonally under the wall and back up.
        assert!((path_weight(&path) - (1.0 + 3.0 * SQRT_2)).abs() < 1e-4);
    }

    #[test]
    fn input_errors() {
        let grid = CellGrid::from_ascii("..#\n...\n...").unwrap();
        let mut search = search_for(&grid);
        let b = grid.bounds();
        let p = Point::new(1, 1);
        assert_eq!(
            find_grid_path(&mut search, &grid, b, p, p),
            Err(PathError::SameCell(p))
        );
        assert_eq!(
            find_grid_path(&mut search, &grid, b, p, Point::new(3, 0)),
            Err(PathError::OutOfBounds(Point::new(3, 0)))
        );
        assert_eq!(
            find_grid_path(&mut search, &grid, b, Point::new(-1, 0), p),
            Err(PathError::OutOfBounds(Point::new(-1, 0)))
        );
        assert_eq!(
            find_grid_path(&mut search, &grid, b, p, Point::new(2, 2)),
            Err(PathError::Blocked(Point::new(2, 2)))
        );
    }

    #[test]
    fn no_path_when_walled_off() {
        let grid = CellGrid::from_ascii("..#..\n..#..\n..#..").unwrap();
        let mut search = search_for(&grid);
        let err = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 0), Point::new(4, 0))
            .unwrap_err();
        assert!(err.is_no_path());
    }

    #[test]
    fn search_stays_inside_rect() {
        // The only way from (0,0) to (0,2) leaves x < 2.
        let grid = CellGrid::from_ascii("...\n##.\n...").unwrap();
        let mut search = search_for(&grid);
        let from = Point::new(0, 0);
        let to = Point::new(0, 2);
        assert!(find_grid_path(&mut search, &grid, grid.bounds(), from, to).is_ok());
        let narrow = Range::new(0, 0, 2, 3);
        let err = find_grid_path(&mut search, &grid, narrow, from, to).unwrap_err();
        assert!(err.is_no_path());
        // Endpoint outside the rect is an input error, not a failed search.
        assert_eq!(
            find_grid_path(&mut search, &grid, narrow, from, Point::new(2, 2)),
            Err(PathError::OutOfBounds(Point::new(2, 2)))
        );
    }

    #[test]
    fn diagonal_corner_cutting_is_allowed() {
        let grid = CellGrid::from_ascii(".#\n#.").unwrap();
        let mut search = search_for(&grid);
        let path = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 1), Point::new(1, 0))
            .unwrap();
        assert_eq!(path, vec![Point::new(0, 1), Point::new(1, 0)]);
    }

    #[test]
    fn expansion_limit() {
        let grid = CellGrid::new(20, 20);
        let mut search = search_for(&grid).with_limit(Some(3));
        let err = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 0), Point::new(19, 19))
            .unwrap_err();
        assert_eq!(err, PathError::SearchLimit { expansions: 3 });
        search.set_limit(None);
        assert!(find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 0), Point::new(19, 19)).is_ok());
        assert!(search.expansions() >= 19);
    }

    #[test]
    fn cache_is_reused_between_searches() {
        let grid = CellGrid::from_ascii(".....\n.###.\n.....").unwrap();
        let mut search = search_for(&grid);
        let a = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 1), Point::new(4, 1)).unwrap();
        let b = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(4, 1), Point::new(0, 1)).unwrap();
        assert_eq!(a.len(), b.len());
        assert!((path_weight(&a) - path_weight(&b)).abs() < 1e-4);
        let again = find_grid_path(&mut search, &grid, grid.bounds(), Point::new(0, 1), Point::new(4, 1)).unwrap();
        assert_eq!(a, again);
    }
}
