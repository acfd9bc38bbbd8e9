//! # Geodex
//!
//! Locally shortest paths on the surface of triangle meshes.
//!
//! Geodex traces geodesics between points given as a face and barycentric
//! coordinates. A path is found by routing a strip of faces on the dual
//! graph, unfolding the strip into the plane, running the funnel algorithm
//! over it and re-routing the strip around any vertex the path bends at.
//! On top of that it provides geodesic interpolation, cubic Bézier curves on
//! the surface and an approximate per-vertex distance field.
//!
//! ## Features
//!
//! - **Half-edge data structure**: O(1) adjacency queries with type-safe indices
//! - **Flexible indexing**: Support for 16-bit, 32-bit, and 64-bit indices
//! - **Shortest paths**: strip unfolding, funnel and iterative straightening
//! - **Surface curves**: geodesic lerp and recursive de Casteljau subdivision
//! - **Distance fields**: label-correcting search over an unfolded vertex graph
//!
//! ## Quick Start
//!
//! ```
//! use geodex::prelude::*;
//! use geodex::algo::geodesic::{GeodesicSolver, approximate_geodesic_distance_field};
//! use nalgebra::Point3;
//!
//! // A closed tetrahedron.
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//!     Point3::new(0.5, 0.5, 1.0),
//! ];
//! let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//!
//! let solver = GeodesicSolver::new(&mesh).unwrap();
//! let src = FaceLocation::centroid(FaceId::new(0));
//! let tgt = FaceLocation::new(FaceId::new(2), [0.2, 0.2, 0.6]);
//!
//! let path = solver.shortest_path(&src, &tgt).unwrap();
//! println!("{} crossings, length {}", path.edges().len(), path.length(&mesh));
//!
//! let midpoint = path.eval(&mesh, 0.5).unwrap();
//! println!("midpoint: {:?}", midpoint.point(&mesh));
//!
//! let field = approximate_geodesic_distance_field(&mesh, &src).unwrap();
//! assert_eq!(field.reachable_count(), 4);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algo;
pub mod error;
pub mod mesh;

#[cfg(test)]
mod test_meshes;

/// Prelude module for convenient imports.
///
/// This module re-exports the most commonly used types and functions:
///
/// ```
/// use geodex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::algo::bezier::{recursive_de_casteljau, BezierOptions, BezierSegment};
    pub use crate::algo::geodesic::{
        geodesic_lerp, locally_shortest_path, Convergence, GeodesicPath, GeodesicSolver,
        ShortestPathOptions,
    };
    pub use crate::error::{GeodesicError, Result};
    pub use crate::mesh::{
        build_from_triangles, EdgeId, EdgeLocation, FaceId, FaceLocation, HalfEdgeId,
        HalfEdgeMesh, MeshIndex, VertexId,
    };
}

// Re-export nalgebra types for convenience
pub use nalgebra;

#[cfg(test)]
mod tests {
    use super::prelude::*;
    use nalgebra::Point3;

    #[test]
    fn test_tetrahedron_round_trip() {
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 0.0),
            Point3::new(0.5, 0.5, 1.0),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
        assert!(mesh.is_valid());

        let solver = GeodesicSolver::new(&mesh).unwrap();
        for f in 1..4 {
            let src = FaceLocation::centroid(FaceId::new(0));
            let tgt = FaceLocation::centroid(FaceId::new(f));
            let there = solver.shortest_path(&src, &tgt).unwrap();
            let back = solver.shortest_path(&tgt, &src).unwrap();
            assert_eq!(there.edges().len(), 1);
            assert!((there.length(&mesh) - back.length(&mesh)).abs() < 1e-12);
        }
    }
}
