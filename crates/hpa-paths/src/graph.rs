//! Mutable abstract graph of positioned nodes and weighted directed edges.
//!
//! Nodes and connections live in slot arenas addressed by [`NodeId`] and
//! [`EdgeId`]. A position index enforces one node per grid position. Each
//! node keeps its outgoing and incoming edge ids, so removing a node only
//! touches its own edges.
//!
//! Handles of removed items may be reused by later insertions.

use std::collections::HashMap;
use std::fmt;

use hpa_core::Point;

use crate::error::PathError;

/// Handle to a node of a [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a connection of a [`NodeGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub(crate) u32);

/// A directed weighted edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connection {
    pub from: NodeId,
    pub to: NodeId,
    pub weight: f32,
}

#[derive(Debug, Clone)]
struct NodeSlot {
    pos: Point,
    out: Vec<EdgeId>,
    inc: Vec<EdgeId>,
}

/// Graph storage only: no search logic lives here.
///
/// Connections are directed. Callers wanting a two-way corridor insert both
/// directions, or use [`link`](Self::link).
#[derive(Debug, Clone, Default)]
pub struct NodeGraph {
    nodes: Vec<Option<NodeSlot>>,
    free_nodes: Vec<u32>,
    edges: Vec<Option<Connection>>,
    free_edges: Vec<u32>,
    by_pos: HashMap<Point, NodeId>,
    edge_count: usize,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.by_pos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_pos.is_empty()
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.edge_count
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Insert a node at `pos`. Fails with `DuplicateNode` if one exists.
    pub fn add_node(&mut self, pos: Point) -> Result<NodeId, PathError> {
        if self.by_pos.contains_key(&pos) {
            return Err(PathError::DuplicateNode(pos));
        }
        let slot = NodeSlot {
            pos,
            out: Vec::new(),
            inc: Vec::new(),
        };
        let id = match self.free_nodes.pop() {
            Some(i) => {
                self.nodes[i as usize] = Some(slot);
                NodeId(i)
            }
            None => {
                self.nodes.push(Some(slot));
                NodeId((self.nodes.len() - 1) as u32)
            }
        };
        self.by_pos.insert(pos, id);
        Ok(id)
    }

    /// The node at `pos`, if any.
    pub fn node_at(&self, pos: Point) -> Option<NodeId> {
        self.by_pos.get(&pos).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slot(id).is_some()
    }

    /// Position of a live node.
    pub fn pos(&self, id: NodeId) -> Option<Point> {
        self.slot(id).map(|s| s.pos)
    }

    /// Append the directed edge `from → to`.
    pub fn add_connection(
        &mut self,
        from: NodeId,
        to: NodeId,
        weight: f32,
    ) -> Result<EdgeId, PathError> {
        for id in [from, to] {
            if !self.contains(id) {
                return Err(PathError::UnknownNode(id));
            }
        }
        let conn = Connection { from, to, weight };
        let eid = match self.free_edges.pop() {
            Some(i) => {
                self.edges[i as usize] = Some(conn);
                EdgeId(i)
            }
            None => {
                self.edges.push(Some(conn));
                EdgeId((self.edges.len() - 1) as u32)
            }
        };
        if let Some(s) = self.slot_mut(from) {
            s.out.push(eid);
        }
        if let Some(s) = self.slot_mut(to) {
            s.inc.push(eid);
        }
        self.edge_count += 1;
        Ok(eid)
    }

    /// Add `a → b` and `b → a` with the same weight, skipping a direction
    /// that already has a connection. Returns how many edges were added.
    pub fn link(&mut self, a: NodeId, b: NodeId, weight: f32) -> Result<usize, PathError> {
        let mut added = 0;
        for (from, to) in [(a, b), (b, a)] {
            if !self.has_connection(from, to) {
                self.add_connection(from, to, weight)?;
                added += 1;
            }
        }
        Ok(added)
    }

    /// Whether a direct edge `from → to` exists.
    pub fn has_connection(&self, from: NodeId, to: NodeId) -> bool {
        self.connections(from).any(|c| c.to == to)
    }

    pub fn connection(&self, id: EdgeId) -> Option<&Connection> {
        self.edges.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Outgoing connections of `id`. Empty for an unknown node.
    pub fn connections(&self, id: NodeId) -> impl Iterator<Item = &Connection> + '_ {
        self.slot(id)
            .map(|s| s.out.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&eid| self.connection(eid))
    }

    /// Number of outgoing connections.
    pub fn degree(&self, id: NodeId) -> usize {
        self.slot(id).map_or(0, |s| s.out.len())
    }

    /// Every live node with its position.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, Point)> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.as_ref().map(|s| (NodeId(i as u32), s.pos)))
    }

    /// Every live connection.
    pub fn all_connections(&self) -> impl Iterator<Item = &Connection> + '_ {
        self.edges.iter().flatten()
    }

    /// Remove a node and every connection it is the source or target of.
    ///
    /// Neighbours are left in place even if this strands them.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Point, PathError> {
        let Some(slot) = self.nodes.get_mut(id.0 as usize).and_then(Option::take) else {
            return Err(PathError::UnknownNode(id));
        };
        for eid in slot.out.iter().chain(slot.inc.iter()) {
            self.drop_edge(*eid);
        }
        self.by_pos.remove(&slot.pos);
        self.free_nodes.push(id.0);
        Ok(slot.pos)
    }

    /// Remove each listed node that is still present. Returns how many were
    /// removed; the final graph does not depend on the order of `ids`.
    pub fn remove_nodes(&mut self, ids: impl IntoIterator<Item = NodeId>) -> usize {
        ids.into_iter()
            .filter(|&id| self.remove_node(id).is_ok())
            .count()
    }

    /// Remove every edge between `a` and `b`, in both directions.
    pub fn unlink(&mut self, a: NodeId, b: NodeId) -> usize {
        let doomed: Vec<EdgeId> = self
            .slot(a)
            .map(|s| s.out.iter().chain(s.inc.iter()).copied().collect())
            .unwrap_or_default();
        let mut removed = 0;
        for eid in doomed {
            let Some(c) = self.connection(eid) else {
                continue;
            };
            if (c.from == a && c.to == b) || (c.from == b && c.to == a) {
                self.drop_edge(eid);
                removed += 1;
            }
        }
        removed
    }

    fn drop_edge(&mut self, eid: EdgeId) {
        let Some(conn) = self.edges.get_mut(eid.0 as usize).and_then(Option::take) else {
            return;
        };
        if let Some(s) = self.slot_mut(conn.from) {
            s.out.retain(|&e| e != eid);
        }
        if let Some(s) = self.slot_mut(conn.to) {
            s.inc.retain(|&e| e != eid);
        }
        self.free_edges.push(eid.0);
        self.edge_count -= 1;
    }

    fn slot(&self, id: NodeId) -> Option<&NodeSlot> {
        self.nodes.get(id.0 as usize).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, id: NodeId) -> Option<&mut NodeSlot> {
        self.nodes.get_mut(id.0 as usize).and_then(Option::as_mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> (NodeGraph, [NodeId; 3]) {
        let mut g = NodeGraph::new();
        let a = g.add_node(Point::new(0, 0)).unwrap();
        let b = g.add_node(Point::new(3, 0)).unwrap();
        let c = g.add_node(Point::new(0, 4)).unwrap();
        g.link(a, b, 3.0).unwrap();
        g.link(b, c, 5.0).unwrap();
        g.link(a, c, 4.0).unwrap();
        (g, [a, b, c])
    }

    #[test]
    fn positions_are_unique() {
        let mut g = NodeGraph::new();
        let a = g.add_node(Point::new(1, 2)).unwrap();
        assert_eq!(
            g.add_node(Point::new(1, 2)),
            Err(PathError::DuplicateNode(Point::new(1, 2)))
        );
        assert_eq!(g.node_at(Point::new(1, 2)), Some(a));
        assert_eq!(g.pos(a), Some(Point::new(1, 2)));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn connections_are_directed() {
        let mut g = NodeGraph::new();
        let a = g.add_node(Point::new(0, 0)).unwrap();
        let b = g.add_node(Point::new(1, 0)).unwrap();
        g.add_connection(a, b, 1.5).unwrap();
        assert!(g.has_connection(a, b));
        assert!(!g.has_connection(b, a));
        assert_eq!(g.degree(a), 1);
        assert_eq!(g.degree(b), 0);
        let c: Vec<_> = g.connections(a).copied().collect();
        assert_eq!(c, vec![Connection { from: a, to: b, weight: 1.5 }]);
    }

    #[test]
    fn unknown_endpoints_are_rejected() {
        let (mut g, [a, b, _]) = triangle();
        g.remove_node(b).unwrap();
        assert_eq!(g.add_connection(a, b, 1.0), Err(PathError::UnknownNode(b)));
        assert_eq!(g.remove_node(b), Err(PathError::UnknownNode(b)));
        assert_eq!(g.connections(b).count(), 0);
    }

    #[test]
    fn link_skips_existing_directions() {
        let mut g = NodeGraph::new();
        let a = g.add_node(Point::new(0, 0)).unwrap();
        let b = g.add_node(Point::new(0, 1)).unwrap();
        g.add_connection(a, b, 1.0).unwrap();
        assert_eq!(g.link(a, b, 1.0), Ok(1));
        assert_eq!(g.link(a, b, 1.0), Ok(0));
        assert_eq!(g.connection_count(), 2);
    }

    #[test]
    fn remove_node_drops_incident_edges_only() {
        let (mut g, [a, b, c]) = triangle();
        assert_eq!(g.connection_count(), 6);
        assert_eq!(g.remove_node(a), Ok(Point::new(0, 0)));
        assert_eq!(g.connection_count(), 2);
        assert!(g.has_connection(b, c));
        assert!(g.has_connection(c, b));
        assert_eq!(g.degree(b), 1);
        assert_eq!(g.node_at(Point::new(0, 0)), None);
        assert!(g.all_connections().all(|e| e.from != a && e.to != a));
    }

    #[test]
    fn remove_nodes_is_order_independent() {
        let (mut g1, [a, b, c]) = triangle();
        let (mut g2, _) = triangle();
        assert_eq!(g1.remove_nodes([a, c, a]), 2);
        assert_eq!(g2.remove_nodes([c, a]), 2);
        let n1: Vec<_> = g1.nodes().map(|(_, p)| p).collect();
        let n2: Vec<_> = g2.nodes().map(|(_, p)| p).collect();
        assert_eq!(n1, n2);
        assert_eq!(n1, vec![Point::new(3, 0)]);
        assert_eq!(g1.connection_count(), 0);
        assert_eq!(g1.degree(b), 0);
    }

    #[test]
    fn slots_are_reused() {
        let (mut g, [a, _, _]) = triangle();
        g.remove_node(a).unwrap();
        let d = g.add_node(Point::new(9, 9)).unwrap();
        assert_eq!(d, a);
        assert_eq!(g.degree(d), 0);
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn unlink_removes_both_directions() {
        let (mut g, [a, b, c]) = triangle();
        assert_eq!(g.unlink(a, b), 2);
        assert!(!g.has_connection(a, b));
        assert!(!g.has_connection(b, a));
        assert!(g.has_connection(a, c));
        assert_eq!(g.connection_count(), 4);
        assert_eq!(g.unlink(a, b), 0);
    }
}
