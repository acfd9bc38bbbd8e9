//! Mesh construction from face-vertex lists.

use std::collections::HashMap;

use nalgebra::Point3;

use super::halfedge::{HalfEdge, HalfEdgeMesh, Vertex};
use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};
use crate::error::{GeodesicError, Result};

/// Build a half-edge mesh from vertex positions and triangles.
///
/// Triangles are given as counter-clockwise vertex index triples. Each
/// directed edge may be used by at most one triangle; a repeated directed
/// edge means a non-manifold edge or inconsistent orientation.
///
/// Face `i` of the result is triangle `i` of the input, and its canonical
/// halfedge starts at the triangle's first vertex, so barycentric coordinates
/// follow the input vertex order.
///
/// # Example
/// ```
/// use geodex::mesh::{build_from_triangles, HalfEdgeMesh};
/// use nalgebra::Point3;
///
/// let vertices = vec![
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 1.0, 0.0),
/// ];
/// let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2]]).unwrap();
/// assert_eq!(mesh.num_faces(), 1);
/// assert_eq!(mesh.num_edges(), 3);
/// ```
pub fn build_from_triangles<I: MeshIndex>(
    vertices: &[Point3<f64>],
    faces: &[[usize; 3]],
) -> Result<HalfEdgeMesh<I>> {
    if faces.is_empty() {
        return Err(GeodesicError::EmptyMesh);
    }

    for (fi, face) in faces.iter().enumerate() {
        if let Some(&vi) = face.iter().find(|&&vi| vi >= vertices.len()) {
            return Err(GeodesicError::InvalidVertexIndex { face: fi, vertex: vi });
        }
        if face[0] == face[1] || face[1] == face[2] || face[0] == face[2] {
            return Err(GeodesicError::DegenerateFace { face: fi });
        }
    }

    let mut mesh = HalfEdgeMesh::with_capacity(vertices.len(), faces.len());
    mesh.vertices = vertices.iter().map(|&p| Vertex::new(p)).collect();

    // Directed edge (v0, v1) -> halfedge.
    let mut directed: HashMap<(usize, usize), HalfEdgeId<I>> =
        HashMap::with_capacity(faces.len() * 3);

    for (fi, face) in faces.iter().enumerate() {
        let base = mesh.halfedges.len();
        let face_id = FaceId::<I>::new(fi);
        mesh.faces.push(HalfEdgeId::new(base));

        for k in 0..3 {
            let h = HalfEdgeId::<I>::new(base + k);
            let (v0, v1) = (face[k], face[(k + 1) % 3]);
            if directed.insert((v0, v1), h).is_some() {
                return Err(GeodesicError::NonManifoldEdge { v0, v1 });
            }

            let mut rec = HalfEdge::unlinked();
            rec.source = VertexId::new(v0);
            rec.next = HalfEdgeId::new(base + (k + 1) % 3);
            rec.prev = HalfEdgeId::new(base + (k + 2) % 3);
            rec.face = face_id;
            mesh.halfedges.push(rec);
            mesh.vertices[v0].halfedge = h;
        }
    }

    // Pair interior halfedges and create boundary halfedges, in face order so
    // ids do not depend on hash iteration.
    let num_interior = mesh.halfedges.len();
    for hi in 0..num_interior {
        if mesh.halfedges[hi].opposite.is_valid() {
            continue;
        }
        let h = HalfEdgeId::<I>::new(hi);
        let v0 = mesh.halfedges[hi].source.index();
        let v1 = mesh.halfedges[mesh.halfedges[hi].next.index()].source.index();

        let opp = match directed.get(&(v1, v0)) {
            Some(&twin) => twin,
            None => {
                let boundary = HalfEdgeId::<I>::new(mesh.halfedges.len());
                let mut rec = HalfEdge::unlinked();
                rec.source = VertexId::new(v1);
                mesh.halfedges.push(rec);
                boundary
            }
        };

        let edge = EdgeId::<I>::new(mesh.edges.len());
        mesh.edges.push(h);
        for (a, b) in [(h, opp), (opp, h)] {
            let rec = &mut mesh.halfedges[a.index()];
            rec.opposite = b;
            rec.edge = edge;
        }
    }

    link_boundary_loops(&mut mesh);
    fix_boundary_vertex_halfedges(&mut mesh);

    Ok(mesh)
}

/// Link boundary halfedges into loops.
fn link_boundary_loops<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    let boundary: Vec<HalfEdgeId<I>> = mesh
        .halfedge_ids()
        .filter(|&h| mesh.is_boundary_halfedge(h))
        .collect();

    let mut outgoing: HashMap<usize, HalfEdgeId<I>> = HashMap::with_capacity(boundary.len());
    for &h in &boundary {
        outgoing.insert(mesh.source(h).index(), h);
    }

    for &h in &boundary {
        if let Some(&next) = outgoing.get(&mesh.target(h).index()) {
            mesh.halfedges[h.index()].next = next;
            mesh.halfedges[next.index()].prev = h;
        }
    }
}

/// Make boundary vertices point at an outgoing boundary halfedge.
fn fix_boundary_vertex_halfedges<I: MeshIndex>(mesh: &mut HalfEdgeMesh<I>) {
    for hi in 0..mesh.halfedges.len() {
        let h = HalfEdgeId::<I>::new(hi);
        if mesh.is_boundary_halfedge(h) {
            let v = mesh.source(h);
            mesh.vertices[v.index()].halfedge = h;
        }
    }
}
