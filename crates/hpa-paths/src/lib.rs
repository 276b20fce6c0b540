//! Hierarchical pathfinding (HPA*) on grids of ground and wall cells.
//!
//! The grid is cut into square clusters. Openings between adjacent clusters
//! become entrance nodes of a small abstract graph whose edges carry exact
//! in-cluster distances. Long queries search that graph and expand the
//! result with local A*, and toggling a cell only rebuilds the cluster it
//! lies in.
//!
//! - **Grid A\*** with a rectangle bound ([`find_grid_path`], [`GridSearch::astar_path`])
//! - **Graph A\*** over the abstract graph ([`astar_graph`])
//! - **Preprocessing** and **re-clustering** ([`HierarchicalPathfinder::preprocess`],
//!   [`HierarchicalPathfinder::preprocess_cluster`])
//! - **Hierarchical queries** ([`HierarchicalPathfinder::find_path_hierarchical`])
//!
//! [`HierarchicalPathfinder`] owns the grid, the [`NodeGraph`] and the
//! [`ClusterIndex`]; the lower-level pieces are public for callers that want
//! to drive them directly.
//!
//! # Trait hierarchy
//!
//! | Trait | Provides |
//! |---|---|
//! | [`Pather`] | successors of a cell |
//! | [`WeightedPather`] : [`Pather`] | step costs |
//! | [`AstarPather`] : [`WeightedPather`] | admissible estimate, required by A* |

mod astar;
mod cluster;
mod config;
mod distance;
mod entrance;
mod error;
mod graph;
mod graph_astar;
mod hierarchy;
mod linker;
mod search;
mod traits;

pub use astar::{RectPather, find_grid_path};
pub use cluster::{Cluster, ClusterIndex, Side};
pub use config::HpaConfig;
pub use distance::{euclidean, path_weight};
pub use entrance::{EntranceDetector, Entrances, Opening, entrance_offsets};
pub use error::PathError;
pub use graph::{Connection, EdgeId, NodeGraph, NodeId};
pub use graph_astar::astar_graph;
pub use hierarchy::{HierarchicalPathfinder, PreprocessStats};
pub use linker::IntraClusterLinker;
pub use search::GridSearch;
pub use traits::{AstarPather, Pather, WeightedPather};

/// A walkable sequence of cells, start first.
pub type Path = Vec<hpa_core::Point>;
