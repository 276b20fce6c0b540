//! **hpa-core**: grid types shared by the hierarchical pathfinding crates.
//!
//! This crate provides the geometry primitives ([`Point`], [`Range`]) and
//! the [`CellGrid`] of ground/wall cells that every search runs over.

pub mod geom;
pub mod grid;

pub use geom::{Point, Range};
pub use grid::{Cell, CellGrid, CellKind, GridError};
