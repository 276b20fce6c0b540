//! The hierarchical pathfinder: owner of the grid, the abstract graph and
//! the cluster index.
//!
//! Preprocessing cuts the grid into clusters, turns every opening between
//! two adjacent clusters into an entrance node pair and links the entrance
//! nodes of each cluster by their exact in-cluster distance. Queries whose
//! endpoints lie in different clusters run A* on that abstract graph and
//! expand the result back into grid cells. Toggling a cell rebuilds only
//! the cluster containing it and touches at most its four neighbours.

use std::collections::HashSet;

use hpa_core::{CellGrid, CellKind, Point, Range};

use crate::Path;
use crate::astar::find_grid_path;
use crate::cluster::{ClusterIndex, Side};
use crate::config::HpaConfig;
use crate::entrance::EntranceDetector;
use crate::error::PathError;
use crate::graph::{NodeGraph, NodeId};
use crate::graph_astar::astar_graph;
use crate::linker::IntraClusterLinker;
use crate::search::GridSearch;

/// Summary of a preprocessing step.
///
/// `nodes` and `connections` describe the whole abstract graph afterwards.
/// `clusters` counts the clusters that were linked by the step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PreprocessStats {
    pub clusters: usize,
    pub entrance_pairs: usize,
    pub nodes: usize,
    pub connections: usize,
}

/// Two-level pathfinder over a [`CellGrid`].
///
/// Single owner of all mutable state. All operations run to completion on
/// the calling thread.
pub struct HierarchicalPathfinder {
    grid: CellGrid,
    graph: NodeGraph,
    clusters: ClusterIndex,
    search: GridSearch,
    config: HpaConfig,
}

impl HierarchicalPathfinder {
    /// Take ownership of `grid` without preprocessing it.
    pub fn new(grid: CellGrid, config: HpaConfig) -> Result<Self, PathError> {
        config.validate(grid.width(), grid.height())?;
        let search = GridSearch::new(grid.bounds()).with_limit(config.max_expansions);
        Ok(Self {
            grid,
            graph: NodeGraph::new(),
            clusters: ClusterIndex::default(),
            search,
            config,
        })
    }

    /// [`new`](Self::new) followed by [`preprocess`](Self::preprocess) at the
    /// configured resolution.
    pub fn build(grid: CellGrid, config: HpaConfig) -> Result<Self, PathError> {
        let mut hpa = Self::new(grid, config)?;
        hpa.preprocess(config.resolution)?;
        Ok(hpa)
    }

    pub fn grid(&self) -> &CellGrid {
        &self.grid
    }

    pub fn graph(&self) -> &NodeGraph {
        &self.graph
    }

    pub fn clusters(&self) -> &ClusterIndex {
        &self.clusters
    }

    pub fn config(&self) -> &HpaConfig {
        &self.config
    }

    /// Side length of a cluster, 0 before preprocessing.
    pub fn cluster_size(&self) -> i32 {
        self.clusters.cluster_size()
    }

    /// Clusters per axis, 0 before preprocessing.
    pub fn resolution(&self) -> i32 {
        self.clusters.resolution()
    }

    pub fn is_preprocessed(&self) -> bool {
        !self.clusters.is_empty()
    }

    // -----------------------------------------------------------------------
    // Preprocessing
    // -----------------------------------------------------------------------

    /// Rebuild the cluster index and the abstract graph from scratch.
    ///
    /// Each border is scanned once, from the cluster on its left or below.
    /// On failure the pathfinder is left unpreprocessed.
    pub fn preprocess(&mut self, resolution: i32) -> Result<PreprocessStats, PathError> {
        let config = HpaConfig {
            resolution,
            ..self.config
        };
        config.validate(self.grid.width(), self.grid.height())?;
        self.config = config;

        let size = config.cluster_size(self.grid.width(), self.grid.height());
        self.graph.clear();
        self.clusters = ClusterIndex::new(resolution, size);

        match self.build_graph() {
            Ok(stats) => {
                log::info!(
                    "preprocessed {}x{} grid: {} clusters of {size}, {} entrance pairs, {} nodes, {} connections",
                    self.grid.width(),
                    self.grid.height(),
                    stats.clusters,
                    stats.entrance_pairs,
                    stats.nodes,
                    stats.connections
                );
                Ok(stats)
            }
            Err(err) => {
                log::warn!("preprocessing failed: {err}");
                self.graph.clear();
                self.clusters = ClusterIndex::default();
                Err(err)
            }
        }
    }

    fn build_graph(&mut self) -> Result<PreprocessStats, PathError> {
        let detector = EntranceDetector::new(self.config.entrance_min_width);
        let indices: Vec<Point> = self.clusters.iter().map(|c| c.index()).collect();

        let mut entrance_pairs = 0;
        for &index in &indices {
            let found = detector.scan_sides(
                &self.grid,
                &mut self.graph,
                &mut self.clusters,
                index,
                &[Side::Right, Side::Top],
            )?;
            entrance_pairs += found.pairs;
        }

        let mut linker = IntraClusterLinker::new(&self.grid, &mut self.search);
        for &index in &indices {
            linker.link_cluster(&mut self.graph, &self.clusters, index)?;
        }

        Ok(self.stats(indices.len(), entrance_pairs))
    }

    /// Restore the abstract graph around `cell_pos` after its cell changed.
    ///
    /// The containing cluster loses all its border nodes, along with the
    /// neighbouring nodes left without any connection to another cluster.
    /// Then all four borders are rescanned and the cluster is relinked.
    /// Neighbours that gained nodes are relinked as well. A cell outside
    /// every cluster needs no work.
    pub fn preprocess_cluster(&mut self, cell_pos: Point) -> Result<PreprocessStats, PathError> {
        if !self.is_preprocessed() {
            return Err(PathError::NotPreprocessed);
        }
        if !self.grid.contains(cell_pos) {
            return Err(PathError::OutOfBounds(cell_pos));
        }
        let Some(index) = self.clusters.cluster_of(cell_pos) else {
            return Ok(self.stats(0, 0));
        };

        let removed = self.reset_cluster(index)?;

        let detector = EntranceDetector::new(self.config.entrance_min_width);
        let found = detector.scan_sides(
            &self.grid,
            &mut self.graph,
            &mut self.clusters,
            index,
            &Side::ALL,
        )?;

        let mut relink = vec![index];
        let owners = found
            .created
            .iter()
            .filter_map(|&id| self.graph.pos(id))
            .filter_map(|p| self.clusters.cluster_of(p));
        for owner in owners {
            if !relink.contains(&owner) {
                relink.push(owner);
            }
        }

        let mut linker = IntraClusterLinker::new(&self.grid, &mut self.search);
        for &c in &relink {
            if c != index {
                IntraClusterLinker::unlink_cluster(&mut self.graph, &self.clusters, c);
            }
            linker.link_cluster(&mut self.graph, &self.clusters, c)?;
        }

        log::debug!(
            "reclustered {index}: removed {removed} nodes, {} entrance pairs, {} new nodes, relinked {} clusters",
            found.pairs,
            found.created.len(),
            relink.len()
        );
        Ok(self.stats(relink.len(), found.pairs))
    }

    /// Remove the border nodes of `index` and every neighbouring node that
    /// would be left without a connection into another cluster. Returns the
    /// number of nodes removed.
    fn reset_cluster(&mut self, index: Point) -> Result<usize, PathError> {
        let own = self.clusters.take_border(index);
        let mut doomed: HashSet<NodeId> = own.iter().copied().collect();
        let mut work: Vec<NodeId> = own.clone();
        let mut stranded = Vec::new();

        while let Some(id) = work.pop() {
            let candidates: Vec<NodeId> = self.graph.connections(id).map(|c| c.to).collect();
            for n in candidates {
                if doomed.contains(&n) || self.has_outside_link(n, &doomed) {
                    continue;
                }
                doomed.insert(n);
                stranded.push(n);
                work.push(n);
            }
        }

        for &id in &stranded {
            let Some(pos) = self.graph.pos(id) else {
                continue;
            };
            if let Some(owner) = self.clusters.cluster_of(pos) {
                self.clusters.remove_border_node(owner, id);
            }
        }
        for id in own.into_iter().chain(stranded) {
            if let Err(err) = self.graph.remove_node(id) {
                log::warn!("resetting cluster {index}: {err}");
                return Err(err);
            }
        }
        Ok(doomed.len())
    }

    /// Whether `id` keeps a connection to a surviving node of another cluster.
    fn has_outside_link(&self, id: NodeId, doomed: &HashSet<NodeId>) -> bool {
        let home = self.graph.pos(id).and_then(|p| self.clusters.cluster_of(p));
        self.graph.connections(id).any(|c| {
            !doomed.contains(&c.to)
                && self.graph.pos(c.to).and_then(|p| self.clusters.cluster_of(p)) != home
        })
    }

    fn stats(&self, clusters: usize, entrance_pairs: usize) -> PreprocessStats {
        PreprocessStats {
            clusters,
            entrance_pairs,
            nodes: self.graph.len(),
            connections: self.graph.connection_count(),
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// Exact grid A* from `start` to `goal` inside `rect`.
    pub fn find_path_low_level(
        &mut self,
        start: Point,
        goal: Point,
        rect: Range,
    ) -> Result<Path, PathError> {
        find_grid_path(&mut self.search, &self.grid, rect, start, goal)
    }

    /// Path from `start` to `goal` through the abstract graph.
    ///
    /// Endpoints in the same cluster, or outside every cluster, are served
    /// by low-level A* over the whole grid. The abstract graph is left as it
    /// was found whatever the outcome.
    pub fn find_path_hierarchical(
        &mut self,
        start: Point,
        goal: Point,
    ) -> Result<Path, PathError> {
        if !self.is_preprocessed() {
            return Err(PathError::NotPreprocessed);
        }
        for p in [start, goal] {
            if !self.grid.contains(p) {
                return Err(PathError::OutOfBounds(p));
            }
        }
        if start == goal {
            return Err(PathError::SameCell(start));
        }
        for p in [start, goal] {
            if !self.grid.is_walkable(p) {
                return Err(PathError::Blocked(p));
            }
        }

        let (sc, gc) = match (self.clusters.cluster_of(start), self.clusters.cluster_of(goal)) {
            (Some(sc), Some(gc)) if sc != gc => (sc, gc),
            _ => {
                log::debug!("{start} -> {goal}: low-level search");
                return self.find_path_low_level(start, goal, self.grid.bounds());
            }
        };

        let mut temps = Vec::new();
        let route = self.abstract_route(start, sc, goal, gc, &mut temps);
        self.graph.remove_nodes(temps);
        let route = route?;
        log::debug!("{start} -> {goal}: abstract route of {} nodes", route.len());

        self.stitch(&route, goal)
    }

    fn abstract_route(
        &mut self,
        start: Point,
        sc: Point,
        goal: Point,
        gc: Point,
        temps: &mut Vec<NodeId>,
    ) -> Result<Vec<Point>, PathError> {
        let s = self.attach(start, sc, temps)?;
        let g = self.attach(goal, gc, temps)?;
        let ids = astar_graph(&self.graph, s, g, self.config.max_expansions)?;
        Ok(ids.into_iter().filter_map(|id| self.graph.pos(id)).collect())
    }

    /// Node for a query endpoint: the existing node at `pos`, or a temporary
    /// one linked to every border node of `cluster` it can reach.
    fn attach(
        &mut self,
        pos: Point,
        cluster: Point,
        temps: &mut Vec<NodeId>,
    ) -> Result<NodeId, PathError> {
        if let Some(id) = self.graph.node_at(pos) {
            return Ok(id);
        }
        let rect = self.clusters.rect(cluster).ok_or(PathError::OutOfBounds(pos))?;
        let id = self.graph.add_node(pos)?;
        temps.push(id);
        let linked = IntraClusterLinker::new(&self.grid, &mut self.search).connect(
            &mut self.graph,
            rect,
            id,
            self.clusters.border(cluster),
        )?;
        log::debug!(
            "attached {pos} to {linked} of {} border nodes of cluster {cluster}",
            self.clusters.border(cluster).len()
        );
        Ok(id)
    }

    /// Expand an abstract route into grid cells.
    fn stitch(&mut self, route: &[Point], goal: Point) -> Result<Path, PathError> {
        let bounds = self.grid.bounds();
        let mut path = Path::new();
        for w in route.windows(2) {
            let segment = find_grid_path(&mut self.search, &self.grid, bounds, w[0], w[1])?;
            let skip = usize::from(path.last() == segment.first());
            path.extend(segment.into_iter().skip(skip));
        }
        if path.last() != Some(&goal) {
            path.push(goal);
        }
        Ok(path)
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Flip the cell at `pos` between Ground and Wall and bring the abstract
    /// graph up to date. Returns the new kind.
    pub fn toggle_cell(&mut self, pos: Point) -> Result<CellKind, PathError> {
        let kind = self.grid.toggle(pos).ok_or(PathError::OutOfBounds(pos))?;
        if self.is_preprocessed() && self.clusters.cluster_of(pos).is_some() {
            self.preprocess_cluster(pos)?;
        }
        Ok(kind)
    }
}
