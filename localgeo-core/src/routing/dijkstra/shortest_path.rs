use std::collections::BinaryHeap;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::{EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;

use super::state::State;
use crate::model::RoadGraph;
use crate::{Error, Miles, Minutes};

/// Shortest road path between two graph nodes
#[derive(Debug, Clone)]
pub struct RoadPath {
    nodes: Vec<NodeIndex>,
    edges: Vec<EdgeIndex>,
    length_miles: Miles,
    travel_minutes: Minutes,
}

impl RoadPath {
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeIndex] {
        &self.edges
    }

    pub fn length_miles(&self) -> Miles {
        self.length_miles
    }

    /// Travel time summed over the edges actually on the path
    pub fn travel_minutes(&self) -> Minutes {
        self.travel_minutes
    }

    /// Node coordinates along the path as (lat, lon)
    pub fn coordinates(&self, graph: &RoadGraph) -> Vec<(f64, f64)> {
        self.nodes
            .iter()
            .filter_map(|&idx| graph.node(idx))
            .map(|node| (node.geometry.y(), node.geometry.x()))
            .collect()
    }
}

/// Dijkstra's algorithm weighted by edge length, stopping at `target`.
///
/// Predecessors are recorded as edges, so among parallel edges the one that
/// produced the shortest length is the one whose travel time is summed.
///
/// # Errors
///
/// Returns [`Error::InvalidNodeIndex`] if either node is not in the graph and
/// [`Error::NoPath`] if `target` cannot be reached from `start`
pub fn shortest_path(
    graph: &RoadGraph,
    start: NodeIndex,
    target: NodeIndex,
) -> Result<RoadPath, Error> {
    if graph.node(start).is_none() || graph.node(target).is_none() {
        return Err(Error::InvalidNodeIndex);
    }

    let estimated_nodes = graph.node_count().min(1000);
    let mut distances: HashMap<NodeIndex, f64> = HashMap::with_capacity(estimated_nodes);
    let mut predecessors: HashMap<NodeIndex, EdgeIndex> = HashMap::with_capacity(estimated_nodes);
    let mut settled = FixedBitSet::with_capacity(graph.node_count());
    let mut heap = BinaryHeap::with_capacity(estimated_nodes / 4);

    heap.push(State {
        cost: 0.0,
        node: start,
    });
    distances.insert(start, 0.0);

    while let Some(State { cost, node }) = heap.pop() {
        if node == target {
            return Ok(trace_path(graph, &predecessors, start, target));
        }

        // Stale heap entry
        if settled.put(node.index()) {
            continue;
        }

        for edge in graph.edges(node) {
            let next = edge.target();
            if settled.contains(next.index()) {
                continue;
            }

            let next_cost = cost + edge.weight().length_miles;
            match distances.entry(next) {
                hashbrown::hash_map::Entry::Vacant(entry) => {
                    entry.insert(next_cost);
                    heap.push(State {
                        cost: next_cost,
                        node: next,
                    });
                    predecessors.insert(next, edge.id());
                }
                hashbrown::hash_map::Entry::Occupied(mut entry) => {
                    if next_cost < *entry.get() {
                        *entry.get_mut() = next_cost;
                        heap.push(State {
                            cost: next_cost,
                            node: next,
                        });
                        predecessors.insert(next, edge.id());
                    }
                }
            }
        }
    }

    Err(Error::NoPath)
}

fn trace_path(
    graph: &RoadGraph,
    predecessors: &HashMap<NodeIndex, EdgeIndex>,
    start: NodeIndex,
    target: NodeIndex,
) -> RoadPath {
    let mut nodes = vec![target];
    let mut edges = Vec::new();

    let mut current = target;
    while current != start {
        let Some(&edge) = predecessors.get(&current) else {
            break;
        };
        let Some((source, _)) = graph.graph.edge_endpoints(edge) else {
            break;
        };
        edges.push(edge);
        nodes.push(source);
        current = source;
    }
    nodes.reverse();
    edges.reverse();

    let (length_miles, travel_minutes) = edges
        .iter()
        .filter_map(|&edge| graph.edge(edge))
        .fold((0.0, 0.0), |(length, time), edge| {
            (length + edge.length_miles, time + edge.travel_time_minutes)
        });

    RoadPath {
        nodes,
        edges,
        length_miles,
        travel_minutes,
    }
}
