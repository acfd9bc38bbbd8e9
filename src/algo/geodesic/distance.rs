//! Approximate geodesic distance fields.
//!
//! Distances are propagated over the vertex graph (see
//! [`vertex_graph`](super::vertex_graph)), which adds a straight unfolded
//! link across every convex edge pair to the mesh edges. The result
//! over-estimates true geodesic distance but is exact for points joined by a
//! chain of graph arcs lying on a straight line.

use std::marker::PhantomData;

use super::graph::{separates, vertex_graph, visit_graph, GeodesicGraph};
use super::unfold::{init_flat_triangle, unfold_face};
use crate::error::Result;
use crate::mesh::{FaceLocation, HalfEdgeMesh, MeshIndex, VertexId};

/// Tolerance for treating a location as sitting on a vertex.
const VERTEX_TOLERANCE: f64 = 1e-5;

/// Tolerance for validating the field's center.
const LOCATION_TOLERANCE: f64 = 1e-6;

/// Per-vertex geodesic distances from a surface point.
///
/// Unreachable vertices have distance `f64::INFINITY`.
#[derive(Debug, Clone)]
pub struct DistanceField<I: MeshIndex = u32> {
    distances: Vec<f64>,
    /// Previous vertex on the graph path to each vertex. `None` for seeds and
    /// unreachable vertices.
    predecessors: Vec<Option<usize>>,
    _marker: PhantomData<I>,
}

impl<I: MeshIndex> DistanceField<I> {
    /// Get the distance to a vertex.
    #[inline]
    pub fn distance(&self, v: VertexId<I>) -> f64 {
        self.distances[v.index()]
    }

    /// Get all distances as a slice, indexed by vertex.
    #[inline]
    pub fn distances(&self) -> &[f64] {
        &self.distances
    }

    /// Consume the field and return the distances.
    pub fn into_distances(self) -> Vec<f64> {
        self.distances
    }

    /// Get the number of vertices.
    #[inline]
    pub fn len(&self) -> usize {
        self.distances.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.distances.is_empty()
    }

    /// Find the vertex with the largest finite distance.
    pub fn farthest_vertex(&self) -> Option<(VertexId<I>, f64)> {
        let mut max_dist = f64::NEG_INFINITY;
        let mut max_vertex = None;

        for (i, &d) in self.distances.iter().enumerate() {
            if d.is_finite() && d > max_dist {
                max_dist = d;
                max_vertex = Some(i);
            }
        }

        max_vertex.map(|i| (VertexId::new(i), max_dist))
    }

    /// The graph path from the nearest seed vertex to `target`.
    ///
    /// Returns `None` for unreachable vertices. Both ends are included.
    pub fn path_to(&self, target: VertexId<I>) -> Option<Vec<VertexId<I>>> {
        if !self.distances[target.index()].is_finite() {
            return None;
        }

        let mut path = Vec::new();
        let mut current = target.index();
        loop {
            path.push(VertexId::new(current));
            match self.predecessors[current] {
                Some(pred) => current = pred,
                None => break,
            }
            if path.len() > self.distances.len() {
                return None;
            }
        }

        path.reverse();
        Some(path)
    }

    /// Check if a vertex is reachable.
    #[inline]
    pub fn is_reachable(&self, v: VertexId<I>) -> bool {
        self.distances[v.index()].is_finite()
    }

    /// Count the number of reachable vertices.
    pub fn reachable_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_finite()).count()
    }

    /// Iterate over all vertices with their distances.
    pub fn iter(&self) -> impl Iterator<Item = (VertexId<I>, f64)> + '_ {
        self.distances
            .iter()
            .enumerate()
            .map(|(i, &d)| (VertexId::new(i), d))
    }

    /// Iterate over only reachable vertices with their distances.
    pub fn reachable_iter(&self) -> impl Iterator<Item = (VertexId<I>, f64)> + '_ {
        self.iter().filter(|(_, d)| d.is_finite())
    }
}

/// Graph seeds around a surface point: vertices with their initial distance.
///
/// A point on a vertex seeds only that vertex, at distance zero. Any other
/// point seeds the three corners of its face at their 3D distance, and the
/// vertex opposite each interior face edge at its unfolded distance when the
/// straight segment to it crosses that edge. Each vertex appears once, with
/// its smallest distance.
pub fn nodes_around_point<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    p: &FaceLocation<I>,
) -> Result<Vec<(VertexId<I>, f64)>> {
    if let Some(v) = p.vertex(mesh, VERTEX_TOLERANCE) {
        return Ok(vec![(v, 0.0)]);
    }

    let pos = p.point(mesh);
    let mut nodes: Vec<(VertexId<I>, f64)> = Vec::with_capacity(6);
    let mut push = |v: VertexId<I>, d: f64| match nodes.iter_mut().find(|(u, _)| *u == v) {
        Some(node) => node.1 = node.1.min(d),
        None => nodes.push((v, d)),
    };

    for h in mesh.face_halfedges(p.face) {
        let v = mesh.source(h);
        push(v, (mesh.position(v) - pos).norm());

        if mesh.is_boundary_edge(h) {
            continue;
        }
        let Some(bary) = p.rebased(mesh, h) else {
            continue;
        };
        let flat = init_flat_triangle(mesh, h)?;
        let nei = unfold_face(mesh, h, &flat)?;
        let p2 = flat[0] * bary[0] + flat[1] * bary[1] + flat[2] * bary[2];
        if separates(&p2, &nei[2], &flat[0], &flat[1]) {
            let opp = mesh.target(mesh.next(mesh.opposite(h)));
            push(opp, (nei[2] - p2).norm());
        }
    }

    Ok(nodes)
}

/// Propagate seed distances over `graph`.
///
/// When `targets` is non-empty, propagation stops once every target vertex
/// has been taken from the queue.
fn propagate<I: MeshIndex>(
    graph: &GeodesicGraph,
    seeds: &[(VertexId<I>, f64)],
    targets: &[VertexId<I>],
) -> DistanceField<I> {
    let n = graph.num_nodes();
    let mut distances = vec![f64::INFINITY; n];
    let mut predecessors: Vec<Option<usize>> = vec![None; n];

    let mut sources = Vec::with_capacity(seeds.len());
    for &(v, d) in seeds {
        let idx = v.index();
        if idx < n {
            distances[idx] = distances[idx].min(d);
            sources.push(idx);
        }
    }

    let mut remaining: Vec<usize> = targets.iter().map(|v| v.index()).collect();
    let pruned = !remaining.is_empty();

    visit_graph(
        &mut distances,
        graph,
        &sources,
        |node, neighbor, _| predecessors[neighbor] = Some(node),
        |_| false,
        |node| {
            if !pruned {
                return false;
            }
            remaining.retain(|&t| t != node);
            remaining.is_empty()
        },
    );

    DistanceField {
        distances,
        predecessors,
        _marker: PhantomData,
    }
}

/// Approximate geodesic distance from `center` to every vertex.
///
/// Builds the vertex graph of `mesh`, seeds it with
/// [`nodes_around_point`] and propagates over the whole graph.
pub fn approximate_geodesic_distance_field<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    center: &FaceLocation<I>,
) -> Result<DistanceField<I>> {
    center.validate(mesh, LOCATION_TOLERANCE)?;
    let graph = vertex_graph(mesh)?;
    let seeds = nodes_around_point(mesh, center)?;
    let field = propagate(&graph, &seeds, &[]);
    log::debug!(
        "distance field from {:?}: {} seeds, {} of {} vertices reached",
        center.face,
        seeds.len(),
        field.reachable_count(),
        field.len()
    );
    Ok(field)
}

/// Distance field from `src` that stops once the vertices around `tgt` have
/// been reached.
///
/// Distances of vertices far from both points may be left at infinity or at
/// an over-estimate; those around `tgt` are settled.
pub fn pruned_geodesic_distance_field<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
) -> Result<DistanceField<I>> {
    src.validate(mesh, LOCATION_TOLERANCE)?;
    tgt.validate(mesh, LOCATION_TOLERANCE)?;
    let graph = vertex_graph(mesh)?;
    let seeds = nodes_around_point(mesh, src)?;
    let targets: Vec<VertexId<I>> = nodes_around_point(mesh, tgt)?
        .into_iter()
        .map(|(v, _)| v)
        .collect();
    Ok(propagate(&graph, &seeds, &targets))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeodesicError;
    use crate::mesh::FaceId;
    use crate::test_meshes::{disconnected, flat_grid, grid_location, icosahedron};

    /// Vertex `(i, j)` of `flat_grid(n, _)`.
    fn grid_vertex(n: usize, i: usize, j: usize) -> VertexId {
        VertexId::new(j * (n + 1) + i)
    }

    #[test]
    fn test_nodes_on_vertex() {
        let mesh = flat_grid(2, 2.0);
        let loc = FaceLocation::new(FaceId::new(0), [0.0, 1.0, 0.0]);
        let nodes = nodes_around_point(&mesh, &loc).unwrap();
        assert_eq!(nodes, vec![(grid_vertex(2, 1, 0), 0.0)]);
    }

    #[test]
    fn test_nodes_inside_face() {
        let mesh = flat_grid(4, 4.0);
        let loc = grid_location(&mesh, 4, 1.6, 1.3);
        let p = loc.point(&mesh);
        let nodes = nodes_around_point(&mesh, &loc).unwrap();

        // Three corners plus the opposite vertex across each interior edge.
        assert_eq!(nodes.len(), 6);
        for &(v, d) in &nodes {
            assert!((d - (mesh.position(v) - p).norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_flat_grid_exact_distances() {
        let n = 4;
        let mesh = flat_grid(n, n as f64);
        let center = FaceLocation::from_vertex(&mesh, grid_vertex(n, 0, 0)).unwrap();
        let field = approximate_geodesic_distance_field(&mesh, &center).unwrap();

        assert_eq!(field.len(), mesh.num_vertices());
        assert_eq!(field.reachable_count(), mesh.num_vertices());
        assert_eq!(field.distance(grid_vertex(n, 0, 0)), 0.0);
        assert!((field.distance(grid_vertex(n, 3, 0)) - 3.0).abs() < 1e-12);
        assert!((field.distance(grid_vertex(n, 2, 2)) - 8.0_f64.sqrt()).abs() < 1e-12);
        // Linked through the unfolded arc across a convex edge pair.
        assert!((field.distance(grid_vertex(n, 2, 1)) - 5.0_f64.sqrt()).abs() < 1e-12);

        let (far, d) = field.farthest_vertex().unwrap();
        assert_eq!(far, grid_vertex(n, 4, 4));
        assert!((d - 32.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_distances_bound_euclidean() {
        let mesh = flat_grid(4, 4.0);
        let center = grid_location(&mesh, 4, 2.3, 1.4);
        let p = center.point(&mesh);
        let field = approximate_geodesic_distance_field(&mesh, &center).unwrap();

        for (v, d) in field.iter() {
            assert!(d >= (mesh.position(v) - p).norm() - 1e-12);
        }
        for v in mesh.face_triangle(center.face) {
            assert!((field.distance(v) - (mesh.position(v) - p).norm()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_path_to() {
        let n = 4;
        let mesh = flat_grid(n, n as f64);
        let center = FaceLocation::from_vertex(&mesh, grid_vertex(n, 0, 0)).unwrap();
        let field = approximate_geodesic_distance_field(&mesh, &center).unwrap();

        let path = field.path_to(grid_vertex(n, 2, 0)).unwrap();
        assert_eq!(
            path,
            vec![grid_vertex(n, 0, 0), grid_vertex(n, 1, 0), grid_vertex(n, 2, 0)]
        );
        assert_eq!(field.path_to(grid_vertex(n, 0, 0)).unwrap(), vec![grid_vertex(n, 0, 0)]);
    }

    #[test]
    fn test_icosahedron_field() {
        let mesh = icosahedron();
        let center = FaceLocation::centroid(FaceId::new(0));
        let p = center.point(&mesh);
        let field = approximate_geodesic_distance_field(&mesh, &center).unwrap();

        assert_eq!(field.reachable_count(), 12);
        for (v, d) in field.iter() {
            assert!(d >= (mesh.position(v) - p).norm() - 1e-12);
        }
        // Corners sit at the circumradius of a unit triangle.
        for v in mesh.face_triangle(FaceId::new(0)) {
            assert!((field.distance(v) - 1.0 / 3.0_f64.sqrt()).abs() < 1e-12);
        }
    }

    #[test]
    fn test_disconnected_field() {
        let mesh = disconnected();
        let center = FaceLocation::centroid(FaceId::new(0));
        let field = approximate_geodesic_distance_field(&mesh, &center).unwrap();

        assert_eq!(field.reachable_count(), 3);
        assert!(!field.is_reachable(VertexId::new(4)));
        assert!(field.path_to(VertexId::new(4)).is_none());
        assert!(field.reachable_iter().all(|(v, _)| v.index() < 3));
    }

    #[test]
    fn test_pruned_field() {
        let mesh = flat_grid(4, 4.0);
        let src = grid_location(&mesh, 4, 0.3, 0.6);
        let tgt = grid_location(&mesh, 4, 1.7, 1.2);
        let full = approximate_geodesic_distance_field(&mesh, &src).unwrap();
        let pruned = pruned_geodesic_distance_field(&mesh, &src, &tgt).unwrap();

        for (v, d) in pruned.iter() {
            assert!(d >= full.distance(v) - 1e-12);
        }
        for v in mesh.face_triangle(tgt.face) {
            assert!(pruned.is_reachable(v));
        }
    }

    #[test]
    fn test_invalid_center() {
        let mesh = icosahedron();
        let center = FaceLocation::new(FaceId::new(40), [1.0, 0.0, 0.0]);
        let err = approximate_geodesic_distance_field(&mesh, &center).unwrap_err();
        assert!(matches!(err, GeodesicError::InvalidFaceLocation { face: 40, .. }));
    }
}
