//! Core mesh data structures.
//!
//! This module provides the half-edge mesh that the geodesic algorithms walk,
//! and the surface point types ([`FaceLocation`], [`EdgeLocation`]) they
//! consume and produce.
//!
//! # Overview
//!
//! The primary type is [`HalfEdgeMesh`], a triangle mesh stored as a half-edge
//! (doubly-connected edge list) structure with O(1) adjacency queries. Meshes
//! are read-only once built; every query allocates its own scratch state.
//!
//! # Index Types
//!
//! Mesh elements are identified by type-safe index wrappers:
//! - [`VertexId`] - Identifies a vertex
//! - [`HalfEdgeId`] - Identifies a half-edge
//! - [`FaceId`] - Identifies a face
//! - [`EdgeId`] - Identifies an undirected edge
//!
//! These indices are generic over the underlying integer type ([`MeshIndex`] trait),
//! allowing you to choose `u16`, `u32`, or `u64` based on mesh size.
//!
//! # Construction
//!
//! ```
//! use geodex::mesh::{build_from_triangles, FaceLocation, HalfEdgeMesh};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.5, 1.0, 0.0),
//! ];
//! let faces = vec![[0, 1, 2]];
//!
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &faces).unwrap();
//! let center = FaceLocation::centroid(mesh.face_ids().next().unwrap());
//! assert!((center.point(&mesh).y - 1.0 / 3.0).abs() < 1e-12);
//! ```

mod builder;
mod halfedge;
mod index;
mod location;

pub use builder::build_from_triangles;
pub use halfedge::{HalfEdge, HalfEdgeMesh, OutgoingHalfEdges, Vertex};
pub use index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
pub use location::{construct_point, EdgeLocation, FaceLocation};
