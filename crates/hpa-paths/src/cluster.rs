//! Square partition of the grid and per-cluster border-node membership.
//!
//! Clusters are addressed by their cluster coordinate: `(0, 0)` is the
//! bottom-left cluster, `(r-1, r-1)` the top-right one for resolution `r`.

use hpa_core::{Point, Range};

use crate::graph::NodeId;

/// One of the four sides of a cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
    Bottom,
    Top,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Left, Side::Right, Side::Bottom, Side::Top];

    /// Unit step from a cluster to its neighbour on this side.
    pub const fn delta(self) -> Point {
        match self {
            Side::Left => Point::new(-1, 0),
            Side::Right => Point::new(1, 0),
            Side::Bottom => Point::new(0, -1),
            Side::Top => Point::new(0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
            Side::Bottom => Side::Top,
            Side::Top => Side::Bottom,
        }
    }
}

/// A square block of cells and the abstract nodes on its border.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    index: Point,
    origin: Point,
    size: i32,
    border: Vec<NodeId>,
}

impl Cluster {
    /// Cluster coordinate.
    pub fn index(&self) -> Point {
        self.index
    }

    /// Bottom-left cell.
    pub fn origin(&self) -> Point {
        self.origin
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    /// The cells of the cluster, used as its search rectangle.
    pub fn rect(&self) -> Range {
        Range::square(self.origin, self.size)
    }

    /// Border nodes owned by the cluster, in insertion order.
    pub fn border(&self) -> &[NodeId] {
        &self.border
    }

    /// Cell pairs straddling the border on `side`, in ascending coordinate
    /// order. The first cell of each pair is inside this cluster, the second
    /// just outside it.
    pub fn border_line(&self, side: Side) -> impl Iterator<Item = (Point, Point)> + use<> {
        let o = self.origin;
        let s = self.size;
        let d = side.delta();
        (0..s).map(move |i| {
            let near = match side {
                Side::Left => Point::new(o.x, o.y + i),
                Side::Right => Point::new(o.x + s - 1, o.y + i),
                Side::Bottom => Point::new(o.x + i, o.y),
                Side::Top => Point::new(o.x + i, o.y + s - 1),
            };
            (near, near + d)
        })
    }
}

/// The fixed `r × r` array of clusters covering the grid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterIndex {
    clusters: Vec<Cluster>,
    resolution: i32,
    size: i32,
}

impl ClusterIndex {
    /// Partition into `resolution × resolution` clusters of side `size`.
    pub fn new(resolution: i32, size: i32) -> Self {
        let resolution = resolution.max(0);
        let size = size.max(0);
        let clusters = Range::new(0, 0, resolution, resolution)
            .iter()
            .map(|index| Cluster {
                index,
                origin: index * size,
                size,
                border: Vec::new(),
            })
            .collect();
        Self {
            clusters,
            resolution,
            size,
        }
    }

    pub fn resolution(&self) -> i32 {
        self.resolution
    }

    pub fn cluster_size(&self) -> i32 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Cells covered by some cluster. Cells of the grid outside this
    /// rectangle belong to no cluster.
    pub fn covered(&self) -> Range {
        Range::square(Point::ZERO, self.resolution * self.size)
    }

    /// Coordinate of the cluster containing `pos`.
    pub fn cluster_of(&self, pos: Point) -> Option<Point> {
        if self.size <= 0 || !self.covered().contains(pos) {
            return None;
        }
        Some(Point::new(pos.x / self.size, pos.y / self.size))
    }

    pub fn get(&self, index: Point) -> Option<&Cluster> {
        let i = self.slot(index)?;
        self.clusters.get(i)
    }

    fn get_mut(&mut self, index: Point) -> Option<&mut Cluster> {
        let i = self.slot(index)?;
        self.clusters.get_mut(i)
    }

    /// The cluster next to `index` on `side`, if it exists.
    pub fn neighbor(&self, index: Point, side: Side) -> Option<Point> {
        let n = index + side.delta();
        self.slot(n).map(|_| n)
    }

    /// Search rectangle of a cluster.
    pub fn rect(&self, index: Point) -> Option<Range> {
        self.get(index).map(Cluster::rect)
    }

    /// Border nodes of a cluster; empty for an unknown coordinate.
    pub fn border(&self, index: Point) -> &[NodeId] {
        self.get(index).map(Cluster::border).unwrap_or_default()
    }

    /// Clusters in row-major order from the bottom-left one.
    pub fn iter(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.iter()
    }

    /// Record `id` as a border node of `index`. Returns `false` if the
    /// cluster is unknown or already lists the node.
    pub fn add_border_node(&mut self, index: Point, id: NodeId) -> bool {
        match self.get_mut(index) {
            Some(c) if !c.border.contains(&id) => {
                c.border.push(id);
                true
            }
            _ => false,
        }
    }

    /// Forget `id` as a border node of `index`.
    pub fn remove_border_node(&mut self, index: Point, id: NodeId) -> bool {
        let Some(c) = self.get_mut(index) else {
            return false;
        };
        let before = c.border.len();
        c.border.retain(|&n| n != id);
        c.border.len() != before
    }

    /// Empty the border set of a cluster, returning the previous members.
    pub fn take_border(&mut self, index: Point) -> Vec<NodeId> {
        self.get_mut(index)
            .map(|c| std::mem::take(&mut c.border))
            .unwrap_or_default()
    }

    /// Empty every border set.
    pub fn clear_borders(&mut self) {
        for c in &mut self.clusters {
            c.border.clear();
        }
    }

    /// Total number of border memberships.
    pub fn border_count(&self) -> usize {
        self.clusters.iter().map(|c| c.border.len()).sum()
    }

    fn slot(&self, index: Point) -> Option<usize> {
        let r = self.resolution;
        if index.x < 0 || index.y < 0 || index.x >= r || index.y >= r {
            return None;
        }
        Some((index.y * r + index.x) as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_and_lookup() {
        let ci = ClusterIndex::new(3, 4);
        assert_eq!(ci.len(), 9);
        assert_eq!(ci.covered(), Range::new(0, 0, 12, 12));
        assert_eq!(ci.cluster_of(Point::new(0, 0)), Some(Point::new(0, 0)));
        assert_eq!(ci.cluster_of(Point::new(4, 3)), Some(Point::new(1, 0)));
        assert_eq!(ci.cluster_of(Point::new(11, 11)), Some(Point::new(2, 2)));
        // Remainder cells of a 13-wide grid belong to no cluster.
        assert_eq!(ci.cluster_of(Point::new(12, 0)), None);
        assert_eq!(ci.cluster_of(Point::new(-1, 0)), None);
        let c = ci.get(Point::new(1, 2)).unwrap();
        assert_eq!(c.origin(), Point::new(4, 8));
        assert_eq!(c.rect(), Range::new(4, 8, 8, 12));
        let order: Vec<Point> = ci.iter().take(4).map(Cluster::index).collect();
        assert_eq!(
            order,
            vec![Point::new(0, 0), Point::new(1, 0), Point::new(2, 0), Point::new(0, 1)]
        );
    }

    #[test]
    fn neighbors_stop_at_the_edge() {
        let ci = ClusterIndex::new(2, 3);
        let o = Point::new(0, 0);
        assert_eq!(ci.neighbor(o, Side::Right), Some(Point::new(1, 0)));
        assert_eq!(ci.neighbor(o, Side::Top), Some(Point::new(0, 1)));
        assert_eq!(ci.neighbor(o, Side::Left), None);
        assert_eq!(ci.neighbor(o, Side::Bottom), None);
        assert_eq!(ci.neighbor(Point::new(1, 1), Side::Right), None);
        for side in Side::ALL {
            assert_eq!(side.opposite().opposite(), side);
            assert_eq!(side.delta() + side.opposite().delta(), Point::ZERO);
        }
    }

    #[test]
    fn border_lines() {
        let ci = ClusterIndex::new(3, 3);
        let c = ci.get(Point::new(1, 1)).unwrap();
        let right: Vec<_> = c.border_line(Side::Right).collect();
        assert_eq!(
            right,
            vec![
                (Point::new(5, 3), Point::new(6, 3)),
                (Point::new(5, 4), Point::new(6, 4)),
                (Point::new(5, 5), Point::new(6, 5)),
            ]
        );
        let bottom: Vec<_> = c.border_line(Side::Bottom).collect();
        assert_eq!(bottom[0], (Point::new(3, 3), Point::new(3, 2)));
        assert_eq!(bottom[2], (Point::new(5, 3), Point::new(5, 2)));
        let left: Vec<_> = c.border_line(Side::Left).collect();
        assert_eq!(left[1], (Point::new(3, 4), Point::new(2, 4)));
        let top: Vec<_> = c.border_line(Side::Top).collect();
        assert_eq!(top[1], (Point::new(4, 5), Point::new(4, 6)));
        // The far cell always lies in the neighbouring cluster.
        for side in Side::ALL {
            let n = ci.neighbor(c.index(), side).unwrap();
            for (near, far) in c.border_line(side) {
                assert_eq!(ci.cluster_of(near), Some(c.index()));
                assert_eq!(ci.cluster_of(far), Some(n));
            }
        }
    }

    #[test]
    fn border_membership() {
        let mut ci = ClusterIndex::new(2, 2);
        let p = Point::new(1, 0);
        assert!(ci.add_border_node(p, NodeId(4)));
        assert!(!ci.add_border_node(p, NodeId(4)));
        assert!(ci.add_border_node(p, NodeId(7)));
        assert!(!ci.add_border_node(Point::new(5, 5), NodeId(1)));
        assert_eq!(ci.border(p), &[NodeId(4), NodeId(7)]);
        assert!(ci.remove_border_node(p, NodeId(4)));
        assert!(!ci.remove_border_node(p, NodeId(4)));
        assert_eq!(ci.border_count(), 1);
        assert_eq!(ci.take_border(p), vec![NodeId(7)]);
        assert!(ci.border(p).is_empty());
    }
}
