//! Points on the surface of a mesh.
//!
//! A [`FaceLocation`] is a face plus barycentric weights; an [`EdgeLocation`]
//! is a directed halfedge plus weights for its two endpoints. Geodesic paths
//! are described as a source and a target face location joined by the list of
//! edge locations where the path crosses from one face into the next.

use nalgebra::Point3;

use super::halfedge::HalfEdgeMesh;
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{GeodesicError, Result};

/// A point inside a face, given by barycentric coordinates.
///
/// The weights apply to the vertices returned by
/// [`HalfEdgeMesh::face_triangle`]: the source of the face's canonical
/// halfedge, its target, then the remaining vertex. They sum to one and are
/// non-negative for points inside the face; a zero weight puts the point on
/// the edge opposite that corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceLocation<I: MeshIndex = u32> {
    /// The face containing the point.
    pub face: FaceId<I>,
    /// Barycentric weights in the face's canonical vertex order.
    pub bary: [f64; 3],
}

impl<I: MeshIndex> FaceLocation<I> {
    /// Create a face location.
    pub fn new(face: FaceId<I>, bary: [f64; 3]) -> Self {
        Self { face, bary }
    }

    /// The centroid of a face.
    pub fn centroid(face: FaceId<I>) -> Self {
        let w = 1.0 / 3.0;
        Self::new(face, [w, w, w])
    }

    /// A location sitting exactly on vertex `v`, expressed in one of its
    /// incident faces.
    ///
    /// Returns `None` for isolated vertices.
    pub fn from_vertex(mesh: &HalfEdgeMesh<I>, v: VertexId<I>) -> Option<Self> {
        mesh.vertex_halfedges(v).find_map(|h| {
            let k = mesh.offset_in_face(h)?;
            let mut bary = [0.0; 3];
            bary[k] = 1.0;
            Some(Self::new(mesh.face_of(h), bary))
        })
    }

    /// The 3D position of the location.
    pub fn point(&self, mesh: &HalfEdgeMesh<I>) -> Point3<f64> {
        let [p0, p1, p2] = mesh.face_positions(self.face);
        let [w0, w1, w2] = self.bary;
        Point3::from(p0.coords * w0 + p1.coords * w1 + p2.coords * w2)
    }

    /// The barycentric weights re-expressed relative to halfedge `h`.
    ///
    /// The result is ordered as `[source(h), target(h), target(next(h))]`.
    /// Returns `None` if `h` does not bound this location's face.
    pub fn rebased(&self, mesh: &HalfEdgeMesh<I>, h: HalfEdgeId<I>) -> Option<[f64; 3]> {
        if mesh.face_of(h) != self.face {
            return None;
        }
        mesh.offset_in_face(h).map(|k| rotate(self.bary, k))
    }

    /// Check that the location lies on a face of `mesh`.
    ///
    /// The weights must be finite, sum to one and be no smaller than
    /// `-tolerance`.
    pub fn validate(&self, mesh: &HalfEdgeMesh<I>, tolerance: f64) -> Result<()> {
        let face = self.face.index();
        if !self.face.is_valid() || face >= mesh.num_faces() {
            return Err(GeodesicError::location(face, "face index out of range"));
        }
        if self.bary.iter().any(|w| !w.is_finite()) {
            return Err(GeodesicError::location(face, "non-finite barycentric weight"));
        }
        let sum: f64 = self.bary.iter().sum();
        if (sum - 1.0).abs() > tolerance {
            return Err(GeodesicError::location(face, "barycentric weights do not sum to one"));
        }
        if self.bary.iter().any(|&w| w < -tolerance) {
            return Err(GeodesicError::location(face, "negative barycentric weight"));
        }
        Ok(())
    }

    /// Which corner of the face the location sits on, if any.
    ///
    /// A corner matches when its weight exceeds `tolerance` and both other
    /// weights do not.
    pub fn vertex_index(&self, tolerance: f64) -> Option<usize> {
        let [a, b, c] = self.bary;
        match (a > tolerance, b > tolerance, c > tolerance) {
            (true, false, false) => Some(0),
            (false, true, false) => Some(1),
            (false, false, true) => Some(2),
            _ => None,
        }
    }

    /// The mesh vertex the location sits on, if any.
    pub fn vertex(&self, mesh: &HalfEdgeMesh<I>, tolerance: f64) -> Option<VertexId<I>> {
        self.vertex_index(tolerance)
            .map(|k| mesh.face_triangle(self.face)[k])
    }
}

/// A point on an edge, where a geodesic crosses from one face into another.
///
/// The weights apply to `source(halfedge)` and `target(halfedge)`. Along a
/// path, the halfedge lies in the face entered by the crossing and its
/// opposite in the face being left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLocation<I: MeshIndex = u32> {
    /// The directed halfedge being crossed.
    pub halfedge: HalfEdgeId<I>,
    /// Weights of the halfedge's source and target.
    pub bary: [f64; 2],
}

impl<I: MeshIndex> EdgeLocation<I> {
    /// Create an edge location.
    pub fn new(halfedge: HalfEdgeId<I>, bary: [f64; 2]) -> Self {
        Self { halfedge, bary }
    }

    /// The undirected edge being crossed.
    pub fn edge(&self, mesh: &HalfEdgeMesh<I>) -> EdgeId<I> {
        mesh.edge_of(self.halfedge)
    }

    /// The same point expressed on the opposite halfedge.
    pub fn flipped(&self, mesh: &HalfEdgeMesh<I>) -> Self {
        Self::new(mesh.opposite(self.halfedge), [self.bary[1], self.bary[0]])
    }

    /// The 3D position of the location.
    pub fn point(&self, mesh: &HalfEdgeMesh<I>) -> Point3<f64> {
        let p0 = mesh.position(mesh.source(self.halfedge));
        let p1 = mesh.position(mesh.target(self.halfedge));
        Point3::from(p0.coords * self.bary[0] + p1.coords * self.bary[1])
    }

    /// The point as barycentric weights of `face`.
    ///
    /// `face` must contain the halfedge or its opposite; otherwise `None`.
    pub fn in_face(&self, mesh: &HalfEdgeMesh<I>, face: FaceId<I>) -> Option<[f64; 3]> {
        let local = if mesh.face_of(self.halfedge) == face {
            *self
        } else if mesh.face_of(mesh.opposite(self.halfedge)) == face {
            self.flipped(mesh)
        } else {
            return None;
        };
        let k = mesh.offset_in_face(local.halfedge)?;
        Some(unrotate([local.bary[0], local.bary[1], 0.0], k))
    }
}

/// The 3D position of an edge location.
pub fn construct_point<I: MeshIndex>(
    location: &EdgeLocation<I>,
    mesh: &HalfEdgeMesh<I>,
) -> Point3<f64> {
    location.point(mesh)
}

/// Canonical weights seen from the halfedge `k` steps after the canonical one.
#[inline]
pub(crate) fn rotate(bary: [f64; 3], k: usize) -> [f64; 3] {
    [bary[k % 3], bary[(k + 1) % 3], bary[(k + 2) % 3]]
}

/// Inverse of [`rotate`].
#[inline]
pub(crate) fn unrotate(local: [f64; 3], k: usize) -> [f64; 3] {
    let k = k % 3;
    [local[(3 - k) % 3], local[(4 - k) % 3], local[(5 - k) % 3]]
}
