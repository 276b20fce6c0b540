use hpa_core::Point;

/// Enumerates the cells reachable in one step.
pub trait Pather {
    /// Append the successors of `p` to `buf`. The caller clears `buf` first.
    fn neighbors(&self, p: Point, buf: &mut Vec<Point>);
}

/// A [`Pather`] whose steps carry a non-negative cost.
pub trait WeightedPather: Pather {
    /// Cost of the step from `from` to the adjacent cell `to`.
    fn cost(&self, from: Point, to: Point) -> f32;
}

/// A [`WeightedPather`] with a heuristic, usable by A*.
pub trait AstarPather: WeightedPather {
    /// Lower bound on the cost from `from` to `to`. Must never overestimate.
    fn estimate(&self, from: Point, to: Point) -> f32;
}
