use hpa_core::{CellGrid, Point, Range};

use crate::astar::find_grid_path;
use crate::cluster::ClusterIndex;
use crate::distance::path_weight;
use crate::error::PathError;
use crate::graph::{NodeGraph, NodeId};
use crate::search::GridSearch;

/// Connects the border nodes of a cluster with their exact in-cluster
/// distances.
///
/// Every unordered pair is searched once with low-level A* confined to the
/// cluster rectangle. Reachable pairs get a connection in each direction
/// weighted by the realized path length; unreachable pairs get nothing.
pub struct IntraClusterLinker<'a> {
    grid: &'a CellGrid,
    search: &'a mut GridSearch,
}

impl<'a> IntraClusterLinker<'a> {
    pub fn new(grid: &'a CellGrid, search: &'a mut GridSearch) -> Self {
        Self { grid, search }
    }

    /// Link all border-node pairs of `cluster`. Returns the number of pairs
    /// that were connected.
    pub fn link_cluster(
        &mut self,
        graph: &mut NodeGraph,
        clusters: &ClusterIndex,
        cluster: Point,
    ) -> Result<usize, PathError> {
        let Some(rect) = clusters.rect(cluster) else {
            return Ok(0);
        };
        let border = clusters.border(cluster);
        let mut linked = 0;
        for (i, &a) in border.iter().enumerate() {
            linked += self.connect(graph, rect, a, &border[i + 1..])?;
        }
        log::trace!(
            "cluster {cluster}: linked {linked} of {} border pairs",
            border.len() * border.len().saturating_sub(1) / 2
        );
        Ok(linked)
    }

    /// Remove the connections between border nodes of `cluster`, leaving
    /// entrance connections to other clusters in place.
    pub fn unlink_cluster(graph: &mut NodeGraph, clusters: &ClusterIndex, cluster: Point) -> usize {
        let border = clusters.border(cluster);
        let mut removed = 0;
        for (i, &a) in border.iter().enumerate() {
            for &b in &border[i + 1..] {
                removed += graph.unlink(a, b);
            }
        }
        removed
    }

    /// Connect `node` both ways to each of `targets` reachable inside `rect`.
    ///
    /// Pairs the search cannot join are skipped. Returns how many targets
    /// were connected.
    pub fn connect(
        &mut self,
        graph: &mut NodeGraph,
        rect: Range,
        node: NodeId,
        targets: &[NodeId],
    ) -> Result<usize, PathError> {
        let from = graph.pos(node).ok_or(PathError::UnknownNode(node))?;
        let mut linked = 0;
        for &target in targets {
            let to = graph.pos(target).ok_or(PathError::UnknownNode(target))?;
            match find_grid_path(self.search, self.grid, rect, from, to) {
                Ok(path) => {
                    graph.link(node, target, path_weight(&path))?;
                    linked += 1;
                }
                Err(PathError::NoPath { .. } | PathError::SearchLimit { .. }) => {}
                Err(err) => {
                    log::warn!("linking {from} to {to} inside {rect}: {err}");
                    return Err(err);
                }
            }
        }
        Ok(linked)
    }
}
