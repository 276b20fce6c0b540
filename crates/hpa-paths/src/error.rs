use hpa_core::Point;
use std::fmt;

use crate::graph::NodeId;

/// Why a pathfinding or graph operation did not produce a result.
///
/// `OutOfBounds`, `Blocked` and `SameCell` are input errors detected before
/// any search runs. `NoPath` is the ordinary outcome of an exhausted search.
/// `DuplicateNode` and `UnknownNode` mean the abstract graph invariants were
/// broken and should never surface from correct use of the public API.
#[derive(Debug, Clone, PartialEq)]
pub enum PathError {
    /// Position outside the grid or the search rectangle.
    OutOfBounds(Point),
    /// Start or goal is a wall.
    Blocked(Point),
    /// Start and goal are the same cell.
    SameCell(Point),
    /// A node already exists at this position.
    DuplicateNode(Point),
    /// The handle does not refer to a live node.
    UnknownNode(NodeId),
    /// Hierarchical query before any preprocessing.
    NotPreprocessed,
    /// The search exhausted its open set without reaching the goal.
    NoPath { from: Point, to: Point },
    /// The configured expansion budget ran out before the goal was reached.
    SearchLimit { expansions: usize },
    /// Resolution or entrance width unusable for the grid.
    InvalidConfig(String),
}

impl PathError {
    /// `NoPath` is an expected result rather than a fault.
    pub fn is_no_path(&self) -> bool {
        matches!(self, Self::NoPath { .. })
    }

    /// Graph invariant breakage (a bug in preprocessing, not bad input).
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::DuplicateNode(_) | Self::UnknownNode(_))
    }
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBounds(p) => write!(f, "position {p} is out of bounds"),
            Self::Blocked(p) => write!(f, "cell {p} is a wall"),
            Self::SameCell(p) => write!(f, "start and goal are both {p}"),
            Self::DuplicateNode(p) => write!(f, "graph already has a node at {p}"),
            Self::UnknownNode(id) => write!(f, "graph has no node {id}"),
            Self::NotPreprocessed => write!(f, "abstract graph is empty; preprocess the grid first"),
            Self::NoPath { from, to } => write!(f, "no path from {from} to {to}"),
            Self::SearchLimit { expansions } => {
                write!(f, "search gave up after {expansions} expansions")
            }
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
        }
    }
}

impl std::error::Error for PathError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        let no_path = PathError::NoPath {
            from: Point::new(0, 0),
            to: Point::new(1, 1),
        };
        assert!(no_path.is_no_path());
        assert!(!no_path.is_invariant());
        assert!(PathError::DuplicateNode(Point::ZERO).is_invariant());
        assert!(PathError::UnknownNode(NodeId(3)).is_invariant());
        assert!(!PathError::Blocked(Point::ZERO).is_no_path());
    }

    #[test]
    fn display_mentions_position() {
        let msg = PathError::Blocked(Point::new(2, 7)).to_string();
        assert_eq!(msg, "cell (2, 7) is a wall");
        let msg = PathError::UnknownNode(NodeId(4)).to_string();
        assert_eq!(msg, "graph has no node #4");
    }
}
