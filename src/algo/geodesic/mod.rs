//! Locally shortest paths on triangle meshes.
//!
//! A geodesic between two [`FaceLocation`]s is found in four stages:
//!
//! 1. a strip of faces joining the two locations is picked on the dual graph
//!    ([`strip_on_dual_graph`]);
//! 2. the strip is unfolded into the plane ([`unfold_strip`]);
//! 3. the funnel algorithm finds the shortest path inside the strip
//!    ([`funnel`]);
//! 4. while that path bends around a mesh vertex, the strip is re-routed
//!    around the vertex and the previous two steps repeat
//!    ([`straighten_path`]).
//!
//! The result is a [`GeodesicPath`]: the two end locations and the list of
//! edge crossings between them.
//!
//! # Example
//!
//! ```
//! use geodex::prelude::*;
//! use geodex::algo::geodesic::{locally_shortest_path, ShortestPathOptions};
//! use nalgebra::Point3;
//!
//! // Unit square split along its diagonal.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let src = FaceLocation::centroid(FaceId::new(0));
//! let tgt = FaceLocation::centroid(FaceId::new(1));
//! let path = locally_shortest_path(&mesh, &src, &tgt, &ShortestPathOptions::default()).unwrap();
//!
//! assert_eq!(path.edges().len(), 1);
//! assert!(path.convergence().is_converged());
//! let chord = (src.point(&mesh) - tgt.point(&mesh)).norm();
//! assert!((path.length(&mesh) - chord).abs() < 1e-12);
//! ```

mod distance;
mod eval;
mod funnel;
mod graph;
mod straighten;
mod unfold;

use nalgebra::Point3;
use rayon::prelude::*;

pub use distance::{
    approximate_geodesic_distance_field, nodes_around_point, pruned_geodesic_distance_field,
    DistanceField,
};
pub use eval::{eval_point_on_geodesic, geodesic_lerp, path_parameters};
pub use funnel::{funnel, intersect_segments, max_curvature_point, FunnelPath, FunnelPoint};
pub use graph::{
    dual_graph, strip_on_dual_graph, vertex_graph, visit_graph, GeodesicGraph, GraphEdge,
};
pub use straighten::{straighten_path, Convergence, Straightened};
pub use unfold::{
    init_flat_triangle, init_source_triangle, init_target_triangle, intersect_circles,
    unfold_face, unfold_portal, unfold_strip, Portal,
};

use crate::error::{GeodesicError, Result};
use crate::mesh::{EdgeLocation, FaceLocation, HalfEdgeMesh, MeshIndex};

/// Options for shortest path queries.
#[derive(Debug, Clone)]
pub struct ShortestPathOptions {
    /// Maximum number of straightening steps.
    ///
    /// `None` uses twice the number of portals of the current strip.
    pub max_iterations: Option<usize>,

    /// Fail with [`GeodesicError::NonConvergent`] when the iteration bound
    /// runs out with a bend left, instead of returning the partial path.
    pub require_convergence: bool,

    /// Tolerance used when validating barycentric coordinates.
    pub location_tolerance: f64,
}

impl Default for ShortestPathOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            require_convergence: false,
            location_tolerance: 1e-6,
        }
    }
}

impl ShortestPathOptions {
    /// Set an explicit bound on straightening steps.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// Set whether exhausting the iteration bound is an error.
    pub fn with_require_convergence(mut self, require: bool) -> Self {
        self.require_convergence = require;
        self
    }

    /// Set the barycentric validation tolerance.
    pub fn with_location_tolerance(mut self, tolerance: f64) -> Self {
        self.location_tolerance = tolerance;
        self
    }

    fn validate(&self) -> Result<()> {
        if !self.location_tolerance.is_finite() || self.location_tolerance < 0.0 {
            return Err(GeodesicError::invalid_param(
                "location_tolerance",
                self.location_tolerance,
                "must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// A locally shortest path between two surface points.
#[derive(Debug, Clone, PartialEq)]
pub struct GeodesicPath<I: MeshIndex = u32> {
    src: FaceLocation<I>,
    tgt: FaceLocation<I>,
    edges: Vec<EdgeLocation<I>>,
    convergence: Convergence<I>,
    iterations: usize,
}

impl<I: MeshIndex> GeodesicPath<I> {
    /// The start point.
    #[inline]
    pub fn source(&self) -> &FaceLocation<I> {
        &self.src
    }

    /// The end point.
    #[inline]
    pub fn target(&self) -> &FaceLocation<I> {
        &self.tgt
    }

    /// The edge crossings, from source to target.
    #[inline]
    pub fn edges(&self) -> &[EdgeLocation<I>] {
        &self.edges
    }

    /// How straightening ended.
    #[inline]
    pub fn convergence(&self) -> Convergence<I> {
        self.convergence
    }

    /// Number of straightening steps performed.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// 3D points of the path: source, crossings, target.
    pub fn positions(&self, mesh: &HalfEdgeMesh<I>) -> Vec<Point3<f64>> {
        let mut points = Vec::with_capacity(self.edges.len() + 2);
        points.push(self.src.point(mesh));
        points.extend(self.edges.iter().map(|e| e.point(mesh)));
        points.push(self.tgt.point(mesh));
        points
    }

    /// Total 3D length of the path.
    pub fn length(&self, mesh: &HalfEdgeMesh<I>) -> f64 {
        self.positions(mesh)
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum()
    }

    /// Normalised arc-length parameter of every path point.
    pub fn parameters(&self, mesh: &HalfEdgeMesh<I>) -> Vec<f64> {
        path_parameters(mesh, self)
    }

    /// The point at arc-length fraction `t`.
    pub fn eval(&self, mesh: &HalfEdgeMesh<I>, t: f64) -> Result<FaceLocation<I>> {
        eval_point_on_geodesic(mesh, self, &self.parameters(mesh), t)
    }
}

/// Check both end points of a query.
fn validate_query<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
    options: &ShortestPathOptions,
) -> Result<()> {
    options.validate()?;
    src.validate(mesh, options.location_tolerance)?;
    tgt.validate(mesh, options.location_tolerance)
}

/// Trace a path on a prebuilt dual graph. Both locations must be valid.
fn trace_path<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    dual: &GeodesicGraph,
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
    options: &ShortestPathOptions,
) -> Result<GeodesicPath<I>> {
    if src.face == tgt.face {
        return Ok(GeodesicPath {
            src: *src,
            tgt: *tgt,
            edges: Vec::new(),
            convergence: Convergence::Geodesic,
            iterations: 0,
        });
    }

    let strip = strip_on_dual_graph(dual, mesh, src.face, tgt.face)?;
    let initial_len = strip.len();
    let straightened = straighten_path(mesh, strip, src, tgt, options.max_iterations)?;

    log::debug!(
        "geodesic {:?} -> {:?}: strip {} -> {} halfedges, {} iterations, {:?}",
        src.face,
        tgt.face,
        initial_len,
        straightened.strip.len(),
        straightened.iterations,
        straightened.convergence
    );

    if options.require_convergence && straightened.convergence == Convergence::IterationLimit {
        return Err(GeodesicError::NonConvergent {
            iterations: straightened.iterations,
        });
    }

    let edges = straightened
        .strip
        .iter()
        .zip(&straightened.lerps)
        .map(|(&h, &lerp)| EdgeLocation::new(h, [lerp, 1.0 - lerp]))
        .collect();

    Ok(GeodesicPath {
        src: *src,
        tgt: *tgt,
        edges,
        convergence: straightened.convergence,
        iterations: straightened.iterations,
    })
}

/// Compute a locally shortest path from `src` to `tgt`.
///
/// Both locations are validated before any graph work. Locations on the same
/// face are joined directly, with no edge crossings. The dual graph is built
/// for this call only; use [`GeodesicSolver`] to reuse it across queries.
pub fn locally_shortest_path<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
    options: &ShortestPathOptions,
) -> Result<GeodesicPath<I>> {
    validate_query(mesh, src, tgt, options)?;
    if src.face == tgt.face {
        return trace_path(mesh, &GeodesicGraph::default(), src, tgt, options);
    }
    let dual = dual_graph(mesh)?;
    trace_path(mesh, &dual, src, tgt, options)
}

/// Shortest path queries against one mesh with a cached dual graph.
///
/// The solver only reads the mesh and the graph, so it can be shared between
/// threads; [`shortest_paths`](Self::shortest_paths) runs a batch of queries
/// in parallel.
#[derive(Debug, Clone)]
pub struct GeodesicSolver<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    dual: GeodesicGraph,
    options: ShortestPathOptions,
}

impl<'a, I: MeshIndex> GeodesicSolver<'a, I> {
    /// Build the dual graph of `mesh`.
    pub fn new(mesh: &'a HalfEdgeMesh<I>) -> Result<Self> {
        Ok(Self {
            mesh,
            dual: dual_graph(mesh)?,
            options: ShortestPathOptions::default(),
        })
    }

    /// Use `options` for every query.
    pub fn with_options(mut self, options: ShortestPathOptions) -> Self {
        self.options = options;
        self
    }

    /// The mesh being queried.
    #[inline]
    pub fn mesh(&self) -> &'a HalfEdgeMesh<I> {
        self.mesh
    }

    /// The cached dual graph.
    #[inline]
    pub fn dual_graph(&self) -> &GeodesicGraph {
        &self.dual
    }

    /// The query options.
    #[inline]
    pub fn options(&self) -> &ShortestPathOptions {
        &self.options
    }

    /// Compute a locally shortest path from `src` to `tgt`.
    pub fn shortest_path(
        &self,
        src: &FaceLocation<I>,
        tgt: &FaceLocation<I>,
    ) -> Result<GeodesicPath<I>> {
        validate_query(self.mesh, src, tgt, &self.options)?;
        trace_path(self.mesh, &self.dual, src, tgt, &self.options)
    }

    /// Compute many independent paths in parallel.
    pub fn shortest_paths(
        &self,
        queries: &[(FaceLocation<I>, FaceLocation<I>)],
    ) -> Vec<Result<GeodesicPath<I>>> {
        queries
            .par_iter()
            .map(|(src, tgt)| self.shortest_path(src, tgt))
            .collect()
    }

    /// The point at arc-length fraction `t` along the geodesic from `src` to
    /// `tgt`.
    pub fn lerp(
        &self,
        src: &FaceLocation<I>,
        tgt: &FaceLocation<I>,
        t: f64,
    ) -> Result<FaceLocation<I>> {
        eval::check_unit(t)?;
        if t == 0.0 {
            return Ok(*src);
        }
        if t == 1.0 {
            return Ok(*tgt);
        }
        let path = self.shortest_path(src, tgt)?;
        path.eval(self.mesh, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::{FaceId, VertexId};
    use crate::test_meshes::{
        disconnected, flat_grid, folded_grid, folded_location, grid_location, icosahedron,
        l_shape, locate, saddle, tetrahedron,
    };

    fn shortest(mesh: &HalfEdgeMesh, src: &FaceLocation, tgt: &FaceLocation) -> GeodesicPath {
        locally_shortest_path(mesh, src, tgt, &ShortestPathOptions::default()).unwrap()
    }

    #[test]
    fn test_same_face_shortcut() {
        let mesh = icosahedron();
        let f = FaceId::new(4);
        let src = FaceLocation::new(f, [0.6, 0.2, 0.2]);
        let tgt = FaceLocation::new(f, [0.1, 0.1, 0.8]);
        let path = shortest(&mesh, &src, &tgt);

        assert!(path.edges().is_empty());
        assert_eq!(path.convergence(), Convergence::Geodesic);

        let mid = path.eval(&mesh, 0.5).unwrap();
        let expected = FaceLocation::new(f, [0.35, 0.15, 0.5]);
        assert_eq!(mid.face, f);
        assert!((mid.point(&mesh) - expected.point(&mesh)).norm() < 1e-12);
    }

    #[test]
    fn test_flat_grid_straight_line() {
        let mesh = flat_grid(4, 4.0);
        let src = grid_location(&mesh, 4, 0.3, 0.5);
        let tgt = grid_location(&mesh, 4, 3.7, 0.5);
        let path = shortest(&mesh, &src, &tgt);

        assert_eq!(path.convergence(), Convergence::Geodesic);
        assert_eq!(path.edges().len(), 7);
        assert!((path.length(&mesh) - 3.4).abs() < 1e-9);
    }

    #[test]
    fn test_flat_grid_diagonal() {
        let mesh = flat_grid(4, 4.0);
        let src = grid_location(&mesh, 4, 0.35, 0.2);
        let tgt = grid_location(&mesh, 4, 3.6, 3.1);
        let path = shortest(&mesh, &src, &tgt);

        assert!(path.convergence().is_converged());
        let chord = (src.point(&mesh) - tgt.point(&mesh)).norm();
        assert!((path.length(&mesh) - chord).abs() < 1e-9);

        // Every crossing lies on the straight segment.
        let (p, q) = (src.point(&mesh), tgt.point(&mesh));
        let dir = (q - p).normalize();
        for x in path.positions(&mesh) {
            let off = (x - p) - dir * (x - p).dot(&dir);
            assert!(off.norm() < 1e-9);
        }
    }

    #[test]
    fn test_folded_strip_unfolds_flat() {
        let n = 3;
        let mesh = folded_grid(n);
        let src = folded_location(&mesh, n, 0.25, 0.2);
        let tgt = folded_location(&mesh, n, 1.75, 0.7);
        let path = shortest(&mesh, &src, &tgt);

        assert!(path.convergence().is_converged());
        let expected = (1.5_f64.powi(2) + 0.5_f64.powi(2)).sqrt();
        assert!((path.length(&mesh) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_icosahedron_adjacent_centroids() {
        let mesh = icosahedron();
        let f = FaceId::new(0);
        let h = mesh.face_halfedge(f);
        let g = mesh.face_of(mesh.opposite(h));

        let src = FaceLocation::centroid(f);
        let tgt = FaceLocation::centroid(g);
        let path = shortest(&mesh, &src, &tgt);

        assert_eq!(path.edges().len(), 1);
        assert_eq!(path.edges()[0].edge(&mesh), mesh.edge_of(h));

        let mid = Point3::from(
            (mesh.position(mesh.source(h)).coords + mesh.position(mesh.target(h)).coords) / 2.0,
        );
        let bound = (src.point(&mesh) - mid).norm() + (mid - tgt.point(&mesh)).norm();
        assert!(path.length(&mesh) <= bound + 1e-12);
        // Twice the inradius of a unit triangle.
        assert!((path.length(&mesh) - 1.0 / 3.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_icosahedron_long_paths_are_valid() {
        let mesh = icosahedron();
        let src = FaceLocation::new(FaceId::new(0), [0.5, 0.3, 0.2]);
        for g in 1..mesh.num_faces() {
            let tgt = FaceLocation::new(FaceId::new(g), [0.2, 0.2, 0.6]);
            let path = shortest(&mesh, &src, &tgt);

            let chord = (src.point(&mesh) - tgt.point(&mesh)).norm();
            assert!(path.length(&mesh) >= chord - 1e-12);
            assert!(path.edges().iter().all(|e| (0.0..=1.0).contains(&e.bary[0])));

            // Consecutive crossings share a face.
            let edges = path.edges();
            assert_eq!(mesh.face_of(mesh.opposite(edges[0].halfedge)), src.face);
            assert_eq!(mesh.face_of(edges[edges.len() - 1].halfedge), tgt.face);
            for w in edges.windows(2) {
                assert_eq!(
                    mesh.face_of(w[0].halfedge),
                    mesh.face_of(mesh.opposite(w[1].halfedge))
                );
            }
        }
    }

    #[test]
    fn test_tetrahedron_path() {
        let mesh = tetrahedron();
        let src = FaceLocation::centroid(FaceId::new(0));
        let tgt = FaceLocation::centroid(FaceId::new(2));
        let path = shortest(&mesh, &src, &tgt);
        assert!(!path.edges().is_empty());
        assert!(path.length(&mesh).is_finite());
    }

    #[test]
    fn test_invalid_location_rejected() {
        let mesh = icosahedron();
        let src = FaceLocation::new(FaceId::new(0), [0.5, 0.5, 0.5]);
        let tgt = FaceLocation::centroid(FaceId::new(3));
        let err = locally_shortest_path(&mesh, &src, &tgt, &ShortestPathOptions::default())
            .unwrap_err();
        assert!(matches!(err, GeodesicError::InvalidFaceLocation { face: 0, .. }));

        let options = ShortestPathOptions::default().with_location_tolerance(-1.0);
        let src = FaceLocation::centroid(FaceId::new(0));
        let err = locally_shortest_path(&mesh, &src, &tgt, &options).unwrap_err();
        assert!(matches!(err, GeodesicError::InvalidParameter { .. }));
    }

    #[test]
    fn test_disconnected_mesh() {
        let mesh = disconnected();
        let src = FaceLocation::centroid(FaceId::new(0));
        let tgt = FaceLocation::centroid(FaceId::new(1));
        let err = locally_shortest_path(&mesh, &src, &tgt, &ShortestPathOptions::default())
            .unwrap_err();
        assert_eq!(err, GeodesicError::DisconnectedMesh { from: 0, to: 1 });
    }

    /// End points on either side of the reflex corner `(1, 1)` of [`l_shape`].
    fn around_corner(mesh: &HalfEdgeMesh) -> (FaceLocation, FaceLocation) {
        (
            locate(mesh, FaceId::new(2), Point3::new(1.9, 0.4, 0.0)),
            locate(mesh, FaceId::new(5), Point3::new(0.4, 1.9, 0.0)),
        )
    }

    #[test]
    fn test_path_around_boundary_corner_converges() {
        let mesh = l_shape();
        let (src, tgt) = around_corner(&mesh);
        let options = ShortestPathOptions::default().with_require_convergence(true);

        let path = locally_shortest_path(&mesh, &src, &tgt, &options).unwrap();
        assert_eq!(path.convergence(), Convergence::Boundary(VertexId::new(4)));
        assert_eq!(path.iterations(), 0);
        assert!((path.length(&mesh) - 2.0 * 1.17_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_iteration_limit_is_an_error_when_required() {
        let mesh = l_shape();
        let (src, tgt) = around_corner(&mesh);
        let solver = GeodesicSolver::new(&mesh).unwrap();

        let bounded = ShortestPathOptions::default().with_max_iterations(0);
        let path = solver
            .clone()
            .with_options(bounded.clone())
            .shortest_path(&src, &tgt)
            .unwrap();
        assert_eq!(path.convergence(), Convergence::IterationLimit);
        assert!(!path.convergence().is_converged());

        let strict = solver.with_options(bounded.with_require_convergence(true));
        assert_eq!(
            strict.shortest_path(&src, &tgt),
            Err(GeodesicError::NonConvergent { iterations: 0 })
        );
    }

    #[test]
    fn test_saddle_path_is_pinned() {
        let mesh = saddle();
        let src = FaceLocation::centroid(FaceId::new(0));
        let tgt = FaceLocation::centroid(FaceId::new(3));
        let options = ShortestPathOptions::default().with_require_convergence(true);

        let path = locally_shortest_path(&mesh, &src, &tgt, &options).unwrap();
        assert_eq!(path.convergence(), Convergence::Pinned(VertexId::new(0)));
        assert_eq!(path.iterations(), 1);
        assert!((path.length(&mesh) - 2.0 / 3.0_f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_solver_matches_free_function() {
        let mesh = icosahedron();
        let solver = GeodesicSolver::new(&mesh).unwrap();
        let queries: Vec<_> = (1..6)
            .map(|g| {
                (
                    FaceLocation::centroid(FaceId::new(0)),
                    FaceLocation::centroid(FaceId::new(g * 3)),
                )
            })
            .collect();

        let batch = solver.shortest_paths(&queries);
        for ((src, tgt), result) in queries.iter().zip(batch) {
            let single = shortest(&mesh, src, tgt);
            assert_eq!(result.unwrap(), single);
        }
    }

    #[test]
    fn test_solver_lerp_endpoints() {
        let mesh = icosahedron();
        let solver = GeodesicSolver::new(&mesh).unwrap();
        let src = FaceLocation::new(FaceId::new(0), [0.2, 0.3, 0.5]);
        let tgt = FaceLocation::new(FaceId::new(11), [0.6, 0.3, 0.1]);

        assert_eq!(solver.lerp(&src, &tgt, 0.0).unwrap(), src);
        assert_eq!(solver.lerp(&src, &tgt, 1.0).unwrap(), tgt);
        assert!(solver.lerp(&src, &tgt, 1.5).is_err());

        let mid = solver.lerp(&src, &tgt, 0.5).unwrap();
        assert!(mid.validate(&mesh, 1e-9).is_ok());
    }
}
