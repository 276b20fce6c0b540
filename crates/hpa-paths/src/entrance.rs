//! Entrance detection on the border between two adjacent clusters.
//!
//! A border cell pair is open when both the inside and the outside cell are
//! Ground. Maximal runs of open pairs become entrances, each reduced to one
//! or two node pairs joined by unit-weight connections.

use hpa_core::{CellGrid, Point};

use crate::cluster::{ClusterIndex, Side};
use crate::error::PathError;
use crate::graph::{NodeGraph, NodeId};

/// A maximal run of open cell pairs along one border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Opening {
    /// Offset of the first open pair along the border.
    pub start: i32,
    pub width: i32,
}

/// Offsets within an opening of `width` cells where node pairs go.
///
/// One pair for narrow openings (the only cell, or the midpoint), two for
/// openings wider than `min_width` (first and last cell).
pub fn entrance_offsets(width: i32, min_width: i32) -> Vec<i32> {
    match width {
        w if w <= 0 => Vec::new(),
        1 => vec![0],
        w if w <= min_width => vec![(min_width / 2).min(w - 1)],
        w => vec![0, w - 1],
    }
}

/// Result of one border scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entrances {
    /// Node pairs emitted, including pairs whose nodes already existed.
    pub pairs: usize,
    /// Nodes newly inserted into the graph.
    pub created: Vec<NodeId>,
}

impl Entrances {
    fn merge(&mut self, other: Entrances) {
        self.pairs += other.pairs;
        self.created.extend(other.created);
    }
}

/// Finds openings on cluster borders and turns them into graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntranceDetector {
    min_width: i32,
}

impl EntranceDetector {
    pub fn new(min_width: i32) -> Self {
        Self {
            min_width: min_width.max(1),
        }
    }

    pub fn min_width(&self) -> i32 {
        self.min_width
    }

    /// Open runs along the `side` border of `cluster`, in ascending order.
    pub fn openings(
        &self,
        grid: &CellGrid,
        clusters: &ClusterIndex,
        cluster: Point,
        side: Side,
    ) -> Vec<Opening> {
        let Some(c) = clusters.get(cluster) else {
            return Vec::new();
        };
        let mut out = Vec::new();
        let mut run: Option<Opening> = None;
        for (i, (near, far)) in c.border_line(side).enumerate() {
            let i = i as i32;
            if grid.is_walkable(near) && grid.is_walkable(far) {
                match run.as_mut() {
                    Some(r) => r.width += 1,
                    None => run = Some(Opening { start: i, width: 1 }),
                }
            } else if let Some(r) = run.take() {
                out.push(r);
            }
        }
        out.extend(run);
        out
    }

    /// Scan the border between `cluster` and its neighbour on `side`,
    /// adding nodes and entrance connections for every opening.
    ///
    /// Nodes already present at an entrance position are reused. A new node
    /// joins the border set of the cluster that contains it. Nothing happens
    /// if there is no neighbour on that side.
    pub fn scan(
        &self,
        grid: &CellGrid,
        graph: &mut NodeGraph,
        clusters: &mut ClusterIndex,
        cluster: Point,
        side: Side,
    ) -> Result<Entrances, PathError> {
        let mut found = Entrances::default();
        if clusters.neighbor(cluster, side).is_none() {
            return Ok(found);
        }
        let Some(line) = clusters
            .get(cluster)
            .map(|c| c.border_line(side).collect::<Vec<_>>())
        else {
            return Ok(found);
        };

        for opening in self.openings(grid, clusters, cluster, side) {
            for off in entrance_offsets(opening.width, self.min_width) {
                let (near, far) = line[(opening.start + off) as usize];
                found.merge(emit_pair(graph, clusters, near, far)?);
            }
        }
        log::trace!(
            "cluster {cluster} {side:?}: {} entrance pairs, {} new nodes",
            found.pairs,
            found.created.len()
        );
        Ok(found)
    }

    /// Scan each of `sides` in turn.
    pub fn scan_sides(
        &self,
        grid: &CellGrid,
        graph: &mut NodeGraph,
        clusters: &mut ClusterIndex,
        cluster: Point,
        sides: &[Side],
    ) -> Result<Entrances, PathError> {
        let mut found = Entrances::default();
        for &side in sides {
            found.merge(self.scan(grid, graph, clusters, cluster, side)?);
        }
        Ok(found)
    }
}

fn emit_pair(
    graph: &mut NodeGraph,
    clusters: &mut ClusterIndex,
    near: Point,
    far: Point,
) -> Result<Entrances, PathError> {
    let mut created = Vec::new();
    let mut ids = [None, None];
    for (slot, pos) in ids.iter_mut().zip([near, far]) {
        let id = match graph.node_at(pos) {
            Some(id) => id,
            None => {
                let id = graph.add_node(pos)?;
                if let Some(owner) = clusters.cluster_of(pos) {
                    clusters.add_border_node(owner, id);
                }
                created.push(id);
                id
            }
        };
        *slot = Some(id);
    }
    if let [Some(a), Some(b)] = ids {
        graph.link(a, b, 1.0)?;
    }
    Ok(Entrances { pairs: 1, created })
}
