//! Half-edge triangle mesh.
//!
//! Every undirected edge is stored as two opposite halfedges. A halfedge knows
//! its source vertex, its opposite, the next and previous halfedges around its
//! face, the face it bounds and the undirected edge it belongs to. Faces and
//! vertices keep one incident halfedge each.
//!
//! Boundary halfedges have an invalid face id; they are linked into loops
//! through `next`/`prev` like interior halfedges.
//!
//! The geodesic algorithms only ever read a mesh. All navigation goes through
//! `source`, `target`, `next`, `prev`, `opposite` and `face_of`.

use nalgebra::Point3;

use super::index::{EdgeId, FaceId, HalfEdgeId, MeshIndex, VertexId};

/// A vertex: its position and one outgoing halfedge.
#[derive(Debug, Clone)]
pub struct Vertex<I: MeshIndex = u32> {
    /// The 3D position of this vertex.
    pub position: Point3<f64>,

    /// One outgoing halfedge. Boundary vertices point at a boundary halfedge.
    pub halfedge: HalfEdgeId<I>,
}

impl<I: MeshIndex> Vertex<I> {
    /// Create a new, still unconnected vertex.
    pub fn new(position: Point3<f64>) -> Self {
        Self {
            position,
            halfedge: HalfEdgeId::invalid(),
        }
    }
}

/// Connectivity record of one halfedge.
#[derive(Debug, Clone, Copy)]
pub struct HalfEdge<I: MeshIndex = u32> {
    /// The vertex this halfedge starts at.
    pub source: VertexId<I>,

    /// The halfedge running the other way along the same edge.
    pub opposite: HalfEdgeId<I>,

    /// The next halfedge around the face (counter-clockwise).
    pub next: HalfEdgeId<I>,

    /// The previous halfedge around the face.
    pub prev: HalfEdgeId<I>,

    /// The face on the left of this halfedge. Invalid on the boundary.
    pub face: FaceId<I>,

    /// The undirected edge.
    pub edge: EdgeId<I>,
}

impl<I: MeshIndex> HalfEdge<I> {
    pub(crate) fn unlinked() -> Self {
        Self {
            source: VertexId::invalid(),
            opposite: HalfEdgeId::invalid(),
            next: HalfEdgeId::invalid(),
            prev: HalfEdgeId::invalid(),
            face: FaceId::invalid(),
            edge: EdgeId::invalid(),
        }
    }

    /// Check if this halfedge lies on the boundary.
    #[inline]
    pub fn is_boundary(&self) -> bool {
        !self.face.is_valid()
    }
}

/// A triangle mesh stored as halfedges.
///
/// Built with [`build_from_triangles`](super::build_from_triangles).
#[derive(Debug, Clone)]
pub struct HalfEdgeMesh<I: MeshIndex = u32> {
    pub(crate) vertices: Vec<Vertex<I>>,
    pub(crate) halfedges: Vec<HalfEdge<I>>,
    /// Canonical halfedge of every face.
    pub(crate) faces: Vec<HalfEdgeId<I>>,
    /// Canonical halfedge of every undirected edge.
    pub(crate) edges: Vec<HalfEdgeId<I>>,
}

impl<I: MeshIndex> Default for HalfEdgeMesh<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: MeshIndex> HalfEdgeMesh<I> {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            halfedges: Vec::new(),
            faces: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(num_vertices: usize, num_faces: usize) -> Self {
        // A closed triangle mesh has E = 3F/2; leave some room for the boundary.
        let num_halfedges = num_faces * 3 + num_faces / 2;
        Self {
            vertices: Vec::with_capacity(num_vertices),
            halfedges: Vec::with_capacity(num_halfedges),
            faces: Vec::with_capacity(num_faces),
            edges: Vec::with_capacity(num_halfedges / 2),
        }
    }

    // ==================== Counts ====================

    /// Number of vertices.
    #[inline]
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of halfedges, boundary halfedges included.
    #[inline]
    pub fn num_halfedges(&self) -> usize {
        self.halfedges.len()
    }

    /// Number of undirected edges.
    #[inline]
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[inline]
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    // ==================== Topology ====================

    #[inline]
    fn he(&self, h: HalfEdgeId<I>) -> &HalfEdge<I> {
        &self.halfedges[h.index()]
    }

    /// The vertex a halfedge starts at.
    #[inline]
    pub fn source(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.he(h).source
    }

    /// The vertex a halfedge points to.
    #[inline]
    pub fn target(&self, h: HalfEdgeId<I>) -> VertexId<I> {
        self.he(self.he(h).opposite).source
    }

    /// The next halfedge around the face.
    #[inline]
    pub fn next(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.he(h).next
    }

    /// The previous halfedge around the face.
    #[inline]
    pub fn prev(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.he(h).prev
    }

    /// The halfedge running the other way along the same edge.
    #[inline]
    pub fn opposite(&self, h: HalfEdgeId<I>) -> HalfEdgeId<I> {
        self.he(h).opposite
    }

    /// The face a halfedge bounds (invalid on the boundary).
    #[inline]
    pub fn face_of(&self, h: HalfEdgeId<I>) -> FaceId<I> {
        self.he(h).face
    }

    /// The undirected edge of a halfedge.
    #[inline]
    pub fn edge_of(&self, h: HalfEdgeId<I>) -> EdgeId<I> {
        self.he(h).edge
    }

    /// The canonical halfedge of a face.
    ///
    /// Barycentric coordinates on a face are expressed relative to this
    /// halfedge: its source, its target, then the third vertex.
    #[inline]
    pub fn face_halfedge(&self, f: FaceId<I>) -> HalfEdgeId<I> {
        self.faces[f.index()]
    }

    /// The canonical halfedge of an edge.
    #[inline]
    pub fn edge_halfedge(&self, e: EdgeId<I>) -> HalfEdgeId<I> {
        self.edges[e.index()]
    }

    /// One outgoing halfedge of a vertex.
    #[inline]
    pub fn vertex_halfedge(&self, v: VertexId<I>) -> HalfEdgeId<I> {
        self.vertices[v.index()].halfedge
    }

    /// Check if a halfedge lies on the boundary.
    #[inline]
    pub fn is_boundary_halfedge(&self, h: HalfEdgeId<I>) -> bool {
        self.he(h).is_boundary()
    }

    /// Check if either side of an edge is a boundary.
    #[inline]
    pub fn is_boundary_edge(&self, h: HalfEdgeId<I>) -> bool {
        self.is_boundary_halfedge(h) || self.is_boundary_halfedge(self.opposite(h))
    }

    /// The three halfedges of a face, starting at the canonical one.
    pub fn face_halfedges(&self, f: FaceId<I>) -> [HalfEdgeId<I>; 3] {
        let h0 = self.face_halfedge(f);
        let h1 = self.next(h0);
        [h0, h1, self.next(h1)]
    }

    /// The three vertices of a face in barycentric order.
    pub fn face_triangle(&self, f: FaceId<I>) -> [VertexId<I>; 3] {
        self.face_halfedges(f).map(|h| self.source(h))
    }

    /// Position of `h` in its face's halfedge loop, counted from the
    /// canonical halfedge.
    ///
    /// Returns `None` if `h` does not bound a face.
    pub fn offset_in_face(&self, h: HalfEdgeId<I>) -> Option<usize> {
        let f = self.face_of(h);
        if !f.is_valid() {
            return None;
        }
        self.face_halfedges(f).iter().position(|&x| x == h)
    }

    /// The halfedge of `f` whose opposite lies in `g`, if the faces are adjacent.
    pub fn common_halfedge(&self, f: FaceId<I>, g: FaceId<I>) -> Option<HalfEdgeId<I>> {
        self.face_halfedges(f)
            .into_iter()
            .find(|&h| self.face_of(self.opposite(h)) == g)
    }

    /// Iterate over the outgoing halfedges of a vertex.
    pub fn vertex_halfedges(&self, v: VertexId<I>) -> OutgoingHalfEdges<'_, I> {
        OutgoingHalfEdges::new(self, v)
    }

    /// Number of edges incident to a vertex.
    pub fn valence(&self, v: VertexId<I>) -> usize {
        self.vertex_halfedges(v).count()
    }

    // ==================== Enumeration ====================

    /// Iterate over all vertex ids.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId<I>> + '_ {
        (0..self.vertices.len()).map(VertexId::new)
    }

    /// Iterate over all halfedge ids.
    pub fn halfedge_ids(&self) -> impl Iterator<Item = HalfEdgeId<I>> + '_ {
        (0..self.halfedges.len()).map(HalfEdgeId::new)
    }

    /// Iterate over all edge ids.
    pub fn edge_ids(&self) -> impl Iterator<Item = EdgeId<I>> + '_ {
        (0..self.edges.len()).map(EdgeId::new)
    }

    /// Iterate over all face ids.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId<I>> + '_ {
        (0..self.faces.len()).map(FaceId::new)
    }

    // ==================== Geometry ====================

    /// The position of a vertex.
    #[inline]
    pub fn position(&self, v: VertexId<I>) -> &Point3<f64> {
        &self.vertices[v.index()].position
    }

    /// Squared distance between two vertices.
    #[inline]
    pub fn squared_distance(&self, a: VertexId<I>, b: VertexId<I>) -> f64 {
        (self.position(a) - self.position(b)).norm_squared()
    }

    /// Length of the edge under a halfedge.
    pub fn edge_length(&self, h: HalfEdgeId<I>) -> f64 {
        self.squared_distance(self.source(h), self.target(h)).sqrt()
    }

    /// Positions of the three corners of a face, in barycentric order.
    pub fn face_positions(&self, f: FaceId<I>) -> [Point3<f64>; 3] {
        self.face_triangle(f).map(|v| *self.position(v))
    }

    // ==================== Validation ====================

    /// Check that all connectivity is consistent.
    pub fn is_valid(&self) -> bool {
        for v in self.vertex_ids() {
            let h = self.vertex_halfedge(v);
            if h.is_valid() && self.source(h) != v {
                return false;
            }
        }

        for h in self.halfedge_ids() {
            let rec = self.he(h);
            if !rec.opposite.is_valid() || self.opposite(rec.opposite) != h {
                return false;
            }
            if rec.next.is_valid() && self.prev(rec.next) != h {
                return false;
            }
            if rec.prev.is_valid() && self.next(rec.prev) != h {
                return false;
            }
            if self.edge_of(rec.opposite) != rec.edge {
                return false;
            }
        }

        for f in self.face_ids() {
            let [h0, h1, h2] = self.face_halfedges(f);
            if self.next(h2) != h0 || [h0, h1, h2].iter().any(|&h| self.face_of(h) != f) {
                return false;
            }
        }

        self.edge_ids().all(|e| self.edge_of(self.edge_halfedge(e)) == e)
    }
}

/// Iterator over the outgoing halfedges of a vertex.
///
/// Rotates with `next(opposite(h))`, so after a boundary halfedge it steps
/// through the boundary loop back into the fan.
pub struct OutgoingHalfEdges<'a, I: MeshIndex = u32> {
    mesh: &'a HalfEdgeMesh<I>,
    start: HalfEdgeId<I>,
    current: HalfEdgeId<I>,
    done: bool,
}

impl<'a, I: MeshIndex> OutgoingHalfEdges<'a, I> {
    fn new(mesh: &'a HalfEdgeMesh<I>, v: VertexId<I>) -> Self {
        let start = mesh.vertex_halfedge(v);
        Self {
            mesh,
            start,
            current: start,
            done: !start.is_valid(),
        }
    }
}

impl<'a, I: MeshIndex> Iterator for OutgoingHalfEdges<'a, I> {
    type Item = HalfEdgeId<I>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let result = self.current;
        self.current = self.mesh.next(self.mesh.opposite(self.current));
        if self.current == self.start || !self.current.is_valid() {
            self.done = true;
        }

        Some(result)
    }
}
