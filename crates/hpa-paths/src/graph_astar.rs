use std::collections::hash_map::Entry;
use std::collections::{BinaryHeap, HashMap};

use crate::distance::euclidean;
use crate::error::PathError;
use crate::graph::{NodeGraph, NodeId};
use crate::search::NodeRef;

struct Record {
    g: f32,
    f: f32,
    parent: Option<NodeId>,
    open: bool,
}

/// A* over the abstract graph.
///
/// Edge cost is the connection weight and the heuristic is the straight-line
/// distance between node positions. Returns the node sequence from `start`
/// to `goal` inclusive. `limit` caps the number of expanded nodes.
pub fn astar_graph(
    graph: &NodeGraph,
    start: NodeId,
    goal: NodeId,
    limit: Option<usize>,
) -> Result<Vec<NodeId>, PathError> {
    let start_pos = graph.pos(start).ok_or(PathError::UnknownNode(start))?;
    let goal_pos = graph.pos(goal).ok_or(PathError::UnknownNode(goal))?;
    if start == goal {
        return Ok(vec![start]);
    }

    // Node ids index the heap entries through their arena slot.
    let mut records: HashMap<NodeId, Record> = HashMap::new();
    let mut open: BinaryHeap<NodeRef> = BinaryHeap::new();
    let mut seq = 0u64;
    let mut expansions = 0usize;

    let h = euclidean(start_pos, goal_pos);
    records.insert(
        start,
        Record {
            g: 0.0,
            f: h,
            parent: None,
            open: true,
        },
    );
    open.push(NodeRef {
        idx: start.index(),
        f: h,
        seq,
    });

    let found = 'search: loop {
        let Some(current) = open.pop() else {
            break 'search false;
        };
        let cid = NodeId(current.idx as u32);

        let Some(rec) = records.get_mut(&cid) else {
            continue;
        };
        if !rec.open || current.f > rec.f {
            continue;
        }
        if cid == goal {
            break 'search true;
        }
        if limit.is_some_and(|max| expansions >= max) {
            return Err(PathError::SearchLimit { expansions });
        }
        expansions += 1;
        rec.open = false;
        let current_g = rec.g;

        for conn in graph.connections(cid) {
            let Some(npos) = graph.pos(conn.to) else {
                continue;
            };
            let tentative_g = current_g + conn.weight;
            let f = tentative_g + euclidean(npos, goal_pos);
            match records.entry(conn.to) {
                Entry::Occupied(mut e) => {
                    let r = e.get_mut();
                    if tentative_g >= r.g {
                        continue;
                    }
                    *r = Record {
                        g: tentative_g,
                        f,
                        parent: Some(cid),
                        open: true,
                    };
                }
                Entry::Vacant(e) => {
                    e.insert(Record {
                        g: tentative_g,
                        f,
                        parent: Some(cid),
                        open: true,
                    });
                }
            }
            seq += 1;
            open.push(NodeRef {
                idx: conn.to.index(),
                f,
                seq,
            });
        }
    };

    if !found {
        return Err(PathError::NoPath {
            from: start_pos,
            to: goal_pos,
        });
    }

    let mut path = vec![goal];
    let mut cur = goal;
    while let Some(parent) = records.get(&cur).and_then(|r| r.parent) {
        path.push(parent);
        cur = parent;
    }
    path.reverse();
    Ok(path)
}
