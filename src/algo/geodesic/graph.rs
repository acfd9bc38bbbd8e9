//! Graphs over mesh elements and label-correcting search.
//!
//! Two graphs are built from a mesh:
//!
//! - the dual graph, one node per face, used to find an initial strip of
//!   faces between two surface points;
//! - the vertex graph, one node per vertex, used for approximate distance
//!   fields.
//!
//! Both are plain adjacency lists keyed by dense element indices and are
//! never mutated after construction, so they can be shared between threads.

use std::collections::VecDeque;

use nalgebra::Vector2;

use super::unfold::{init_flat_triangle, unfold_face};
use crate::error::{GeodesicError, Result};
use crate::mesh::{FaceId, HalfEdgeId, HalfEdgeMesh, MeshIndex};

/// A weighted, directed arc of a [`GeodesicGraph`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphEdge {
    /// The node this arc leads to.
    pub node: usize,
    /// The arc length.
    pub length: f64,
}

/// Adjacency-list graph with non-negative arc lengths.
#[derive(Debug, Clone, Default)]
pub struct GeodesicGraph {
    adjacency: Vec<Vec<GraphEdge>>,
}

impl GeodesicGraph {
    /// Create a graph with `num_nodes` nodes and no arcs.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); num_nodes],
        }
    }

    /// Number of nodes.
    #[inline]
    pub fn num_nodes(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed arcs.
    pub fn num_arcs(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Arcs leaving `node`.
    #[inline]
    pub fn neighbors(&self, node: usize) -> &[GraphEdge] {
        &self.adjacency[node]
    }

    /// Add a directed arc.
    pub fn add_arc(&mut self, from: usize, to: usize, length: f64) {
        self.adjacency[from].push(GraphEdge { node: to, length });
    }

    /// Add arcs in both directions.
    pub fn connect(&mut self, a: usize, b: usize, length: f64) {
        self.add_arc(a, b, length);
        self.add_arc(b, a, length);
    }
}

/// Centroid of a planar triangle.
fn centroid(tr: &[Vector2<f64>; 3]) -> Vector2<f64> {
    (tr[0] + tr[1] + tr[2]) / 3.0
}

/// Distance between the centroids of the two faces of `h`, unfolded into a
/// common plane.
fn dual_weight<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, h: HalfEdgeId<I>) -> Result<f64> {
    let flat = init_flat_triangle(mesh, h)?;
    let nei = unfold_face(mesh, h, &flat)?;
    Ok((centroid(&nei) - centroid(&flat)).norm())
}

/// Build the dual graph of a mesh.
///
/// Nodes are faces. Every interior halfedge `h` contributes an arc from its
/// face to the face across it, weighted by the distance between the two
/// unfolded centroids.
pub fn dual_graph<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<GeodesicGraph> {
    let mut graph = GeodesicGraph::new(mesh.num_faces());
    for f in mesh.face_ids() {
        for h in mesh.face_halfedges(f) {
            let g = mesh.face_of(mesh.opposite(h));
            if !g.is_valid() {
                continue;
            }
            graph.add_arc(f.index(), g.index(), dual_weight(mesh, h)?);
        }
    }
    log::debug!(
        "dual graph: {} nodes, {} arcs",
        graph.num_nodes(),
        graph.num_arcs()
    );
    Ok(graph)
}

/// Check that the segment `p -> q` passes strictly between `a` and `b`.
pub(crate) fn separates(
    p: &Vector2<f64>,
    q: &Vector2<f64>,
    a: &Vector2<f64>,
    b: &Vector2<f64>,
) -> bool {
    let d = q - p;
    let side = |x: &Vector2<f64>| {
        let r = x - p;
        d.x * r.y - d.y * r.x
    };
    side(a) * side(b) < 0.0
}

/// Unfolded distance between the two vertices opposite to the edge of `h`.
///
/// Returns `None` when the unfolded quadrilateral is not strictly convex, in
/// which case the straight segment would leave the two triangles.
fn opposite_vertex_distance<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    h: HalfEdgeId<I>,
) -> Result<Option<f64>> {
    let flat = init_flat_triangle(mesh, h)?;
    let nei = unfold_face(mesh, h, &flat)?;
    if separates(&flat[2], &nei[2], &flat[0], &flat[1]) {
        Ok(Some((nei[2] - flat[2]).norm()))
    } else {
        Ok(None)
    }
}

/// Build the vertex graph of a mesh.
///
/// Nodes are vertices. Every mesh edge is an arc pair weighted by its 3D
/// length; every interior edge whose two triangles unfold into a convex
/// quadrilateral also links its two opposite vertices by their unfolded
/// distance.
pub fn vertex_graph<I: MeshIndex>(mesh: &HalfEdgeMesh<I>) -> Result<GeodesicGraph> {
    let mut graph = GeodesicGraph::new(mesh.num_vertices());
    for e in mesh.edge_ids() {
        let h = mesh.edge_halfedge(e);
        let a = mesh.source(h);
        let b = mesh.target(h);
        graph.connect(a.index(), b.index(), mesh.edge_length(h));

        if mesh.is_boundary_edge(h) {
            continue;
        }
        let v0 = mesh.target(mesh.next(h));
        let v1 = mesh.target(mesh.next(mesh.opposite(h)));
        if v0 == v1 {
            continue;
        }
        if let Some(length) = opposite_vertex_distance(mesh, h)? {
            graph.connect(v0.index(), v1.index(), length);
        }
    }
    log::debug!(
        "vertex graph: {} nodes, {} arcs",
        graph.num_nodes(),
        graph.num_arcs()
    );
    Ok(graph)
}

/// Label-correcting shortest path search.
///
/// `field` holds the current distance label of every node and must be
/// initialised by the caller (sources finite, everything else
/// `f64::INFINITY`). The work queue uses the Small Label First rule on
/// insertion and the Large Label Last rule on extraction.
///
/// - `update(node, neighbor, distance)` runs on every label improvement;
/// - `stop(node)` prevents a popped node from being expanded;
/// - `exit(node)` ends the search when `node` is popped.
pub fn visit_graph<U, S, X>(
    field: &mut [f64],
    graph: &GeodesicGraph,
    sources: &[usize],
    mut update: U,
    mut stop: S,
    mut exit: X,
) where
    U: FnMut(usize, usize, f64),
    S: FnMut(usize) -> bool,
    X: FnMut(usize) -> bool,
{
    let mut in_queue = vec![false; graph.num_nodes()];
    // Sum of the labels currently queued, for the queue average.
    let mut cumulative_weight = 0.0;
    let mut queue = VecDeque::with_capacity(sources.len());

    for &source in sources {
        if in_queue[source] {
            continue;
        }
        in_queue[source] = true;
        cumulative_weight += field[source];
        queue.push_back(source);
    }

    while let Some(&front) = queue.front() {
        let average_weight = cumulative_weight / queue.len() as f64;

        // Large Label Last: rotate heavy nodes to the back.
        let mut node = front;
        for _ in 0..=queue.len() {
            if field[node] <= average_weight {
                break;
            }
            queue.rotate_left(1);
            node = queue[0];
        }

        queue.pop_front();
        in_queue[node] = false;
        cumulative_weight -= field[node];

        if exit(node) {
            break;
        }
        if stop(node) {
            continue;
        }

        for arc in graph.neighbors(node) {
            let new_distance = field[node] + arc.length;
            let neighbor = arc.node;
            let old_distance = field[neighbor];
            if new_distance >= old_distance {
                continue;
            }

            if in_queue[neighbor] {
                cumulative_weight += new_distance - old_distance;
            } else {
                // Small Label First.
                match queue.front() {
                    Some(&first) if new_distance >= field[first] => queue.push_back(neighbor),
                    _ => queue.push_front(neighbor),
                }
                in_queue[neighbor] = true;
                cumulative_weight += new_distance;
            }

            field[neighbor] = new_distance;
            update(node, neighbor, new_distance);
        }
    }
}

/// Find a strip of faces from `src` to `tgt` on the dual graph.
///
/// The result lists the halfedges crossed, in order; each lies in the face
/// being entered. Equal faces yield an empty strip.
pub fn strip_on_dual_graph<I: MeshIndex>(
    graph: &GeodesicGraph,
    mesh: &HalfEdgeMesh<I>,
    src: FaceId<I>,
    tgt: FaceId<I>,
) -> Result<Vec<HalfEdgeId<I>>> {
    if src == tgt {
        return Ok(Vec::new());
    }

    let disconnected = || GeodesicError::DisconnectedMesh {
        from: src.index(),
        to: tgt.index(),
    };

    let n = graph.num_nodes();
    let mut parents: Vec<Option<usize>> = vec![None; n];
    let mut field = vec![f64::INFINITY; n];
    field[src.index()] = 0.0;

    let target = tgt.index();
    visit_graph(
        &mut field,
        graph,
        &[src.index()],
        |node, neighbor, _| parents[neighbor] = Some(node),
        |_| false,
        |node| node == target,
    );

    let mut strip = Vec::new();
    let mut node = target;
    while node != src.index() {
        let parent = parents[node].ok_or_else(disconnected)?;
        let h = mesh
            .common_halfedge(FaceId::new(node), FaceId::new(parent))
            .ok_or_else(disconnected)?;
        strip.push(h);
        node = parent;
        if strip.len() > n {
            return Err(disconnected());
        }
    }
    strip.reverse();
    Ok(strip)
}
