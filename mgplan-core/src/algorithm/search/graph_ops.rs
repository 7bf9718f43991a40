//! shared roadmap-facing plumbing for the graph adapters: validity checks
//! and edge-cost resolutions that report invalidated cached values as
//! edge-change events.

use crate::model::roadmap::{NodeId, Roadmap, RoadmapError};
use crate::model::space::GraspId;
use crate::model::unit::Cost;

use super::{EdgeChange, GraphLayer, SearchError, SearchVertexId, VertexKind, VertexTable};

/// resolves node validity in a layer. a node found base-invalid is deleted
/// by the roadmap, killing its incident edges; for every materialized
/// incident vertex of `event_layers` an edge-change pair (both directions)
/// is emitted with the pre-deletion cached cost.
pub(super) fn check_node_validity(
    roadmap: &mut Roadmap,
    table: &mut VertexTable,
    uid: NodeId,
    gid: Option<GraspId>,
    event_layers: &[GraphLayer],
    pending: &mut Vec<EdgeChange>,
) -> Result<bool, SearchError> {
    let initialized = match roadmap.node(uid) {
        None => return Ok(false),
        Some(node) => node.is_initialized(),
    };
    // snapshot cached costs before a failing base check deletes the node
    let snapshot: Vec<(NodeId, Vec<(GraphLayer, Cost)>)> = if initialized {
        Vec::new()
    } else {
        roadmap
            .neighbors_of(uid)
            .into_iter()
            .map(|n| {
                let costs = event_layers
                    .iter()
                    .map(|layer| (*layer, roadmap.lazy_cost(uid, n, layer.grasp())))
                    .collect();
                (n, costs)
            })
            .collect()
    };
    if !roadmap.is_valid(uid) {
        for (neighbor, costs) in snapshot {
            for (layer, old_cost) in costs {
                if old_cost.is_infinite() {
                    continue;
                }
                let here = match table.get(VertexKind::roadmap(uid, layer)) {
                    None => continue,
                    Some(v) => v,
                };
                let there = table.id_of(VertexKind::roadmap(neighbor, layer));
                pending.push(EdgeChange {
                    u: there,
                    v: here,
                    old_cost,
                });
                pending.push(EdgeChange {
                    u: here,
                    v: there,
                    old_cost,
                });
            }
        }
        return Ok(false);
    }
    match gid {
        None => Ok(true),
        Some(gid) => Ok(roadmap.is_valid_for_grasp(uid, gid)?),
    }
}

/// the cost of the roadmap edge between `a` and `b` in a layer. exact
/// resolution emits edge-change pairs when it invalidates the cached value.
pub(super) fn layer_edge_cost(
    roadmap: &mut Roadmap,
    table: &mut VertexTable,
    a: NodeId,
    b: NodeId,
    layer: GraphLayer,
    lazy: bool,
    pending: &mut Vec<EdgeChange>,
) -> Result<Cost, SearchError> {
    if lazy {
        return Ok(roadmap.lazy_cost(a, b, layer.grasp()));
    }
    let resolution = match layer.grasp() {
        None => roadmap.compute_base_cost(a, b),
        Some(gid) => roadmap.compute_grasp_cost(a, b, gid),
    };
    let resolution = match resolution {
        Ok(r) => r,
        // the edge was pruned between discovery and evaluation
        Err(RoadmapError::UnknownEdge(_, _)) => return Ok(Cost::INFINITY),
        Err(e) => return Err(e.into()),
    };
    if let Some(old_cost) = resolution.previous {
        let va = table.id_of(VertexKind::roadmap(a, layer));
        let vb = table.id_of(VertexKind::roadmap(b, layer));
        pending.push(EdgeChange {
            u: va,
            v: vb,
            old_cost,
        });
        pending.push(EdgeChange {
            u: vb,
            v: va,
            old_cost,
        });
    }
    Ok(resolution.cost)
}

/// roadmap-adjacency successors of `uid` seen through a layer, refreshing
/// adjacency first. lazy filtering skips only nodes already known invalid;
/// exact filtering resolves validity, reporting node deaths across every
/// layer of `event_layers` (a death kills the edge in all of them).
pub(super) fn successors_in_layer(
    roadmap: &mut Roadmap,
    table: &mut VertexTable,
    uid: NodeId,
    layer: GraphLayer,
    event_layers: &[GraphLayer],
    lazy: bool,
    pending: &mut Vec<EdgeChange>,
) -> Result<Vec<SearchVertexId>, SearchError> {
    roadmap.update_adjacency(uid);
    let mut out = Vec::new();
    for neighbor in roadmap.neighbors_of(uid) {
        if lazy {
            if roadmap.known_invalid(neighbor, layer.grasp()) {
                continue;
            }
        } else if !check_node_validity(
            roadmap,
            table,
            neighbor,
            layer.grasp(),
            event_layers,
            pending,
        )? {
            continue;
        }
        out.push(table.id_of(VertexKind::roadmap(neighbor, layer)));
    }
    Ok(out)
}

/// the roadmap node behind a search vertex; virtual vertices have none.
pub(super) fn roadmap_uid(
    table: &VertexTable,
    v: SearchVertexId,
) -> Result<(NodeId, GraphLayer), SearchError> {
    match table.kind_of(v) {
        Some(VertexKind::Roadmap { uid, layer }) => Ok((uid, layer)),
        _ => Err(SearchError::UnknownVertex(v)),
    }
}
