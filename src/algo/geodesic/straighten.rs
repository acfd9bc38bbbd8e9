//! Iterative straightening of a strip around mesh vertices.
//!
//! The funnel finds the shortest path inside a fixed strip of faces. When
//! that path bends around a mesh vertex, the strip is on the wrong side of
//! the vertex: the faces on the near side of the bend are replaced by the
//! faces on the other side of the vertex's one-ring, and the strip is
//! unfolded and funnelled again.

use super::funnel::{funnel, FunnelPath};
use super::unfold::{unfold_strip, Portal};
use crate::error::Result;
use crate::mesh::{FaceLocation, HalfEdgeId, HalfEdgeMesh, MeshIndex, VertexId};

/// How straightening ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence<I: MeshIndex = u32> {
    /// The funnel path has no corner left.
    Geodesic,
    /// The path kept bending around the same vertex after re-routing, for
    /// example at a saddle vertex. This is the stable end state.
    Pinned(VertexId<I>),
    /// The path wraps a boundary vertex. The other side of its one-ring is
    /// open, so the corner is already the shortest way around.
    Boundary(VertexId<I>),
    /// The sharpest corner could not be re-routed: it does not sit on a mesh
    /// vertex, or the one-ring walk never rejoined the strip.
    Stalled,
    /// The iteration bound was exhausted with a corner left.
    IterationLimit,
}

impl<I: MeshIndex> Convergence<I> {
    /// Whether the path reached a fixed point.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Convergence::Geodesic | Convergence::Pinned(_) | Convergence::Boundary(_)
        )
    }
}

/// A straightened strip together with its crossing parameters.
#[derive(Debug, Clone)]
pub struct Straightened<I: MeshIndex = u32> {
    /// Halfedges crossed, each lying in the face being entered.
    pub strip: Vec<HalfEdgeId<I>>,
    /// Crossing parameter of every strip halfedge, `0` at its target and `1`
    /// at its source.
    pub lerps: Vec<f64>,
    /// How the iteration ended.
    pub convergence: Convergence<I>,
    /// Number of re-routing steps performed.
    pub iterations: usize,
}

/// Where a corner touches the mesh.
struct Pivot<I: MeshIndex> {
    vertex: VertexId<I>,
    /// The vertex is the target of the strip halfedge, not its source.
    is_target: bool,
}

fn pivot_at<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    strip: &[HalfEdgeId<I>],
    path: &FunnelPath<f64>,
    index: usize,
) -> Option<Pivot<I>> {
    let h = *strip.get(index)?;
    let lerp = *path.lerps.get(index)?;
    if lerp == 0.0 {
        Some(Pivot {
            vertex: mesh.target(h),
            is_target: true,
        })
    } else if lerp == 1.0 {
        Some(Pivot {
            vertex: mesh.source(h),
            is_target: false,
        })
    } else {
        None
    }
}

/// Outcome of walking the other way around a pivot.
enum RingWalk<I: MeshIndex> {
    Rerouted(Vec<HalfEdgeId<I>>),
    /// The walk left the mesh through a boundary halfedge.
    Boundary,
    /// The walk went all the way round without finding the strip again.
    Lost,
}

/// Re-route `strip` around the pivot at strip position `index`.
fn reroute<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    strip: &[HalfEdgeId<I>],
    index: usize,
    pivot: &Pivot<I>,
    tgt: &FaceLocation<I>,
) -> RingWalk<I> {
    let v = pivot.vertex;
    let touches = |h: HalfEdgeId<I>| {
        if pivot.is_target {
            mesh.target(h) == v
        } else {
            mesh.source(h) == v
        }
    };
    let step = |h: HalfEdgeId<I>| {
        if pivot.is_target {
            mesh.opposite(mesh.prev(h))
        } else {
            mesh.opposite(mesh.next(h))
        }
    };

    // Skip the strip halfedges that still turn around the pivot.
    let mut curr = index + 1;
    while curr < strip.len() && touches(strip[curr]) {
        curr += 1;
    }
    let target_face = match strip.get(curr) {
        Some(&h) => mesh.face_of(mesh.opposite(h)),
        None => tgt.face,
    };

    // Walk the other way around the pivot until the strip can resume.
    let limit = mesh.valence(v) + 2;
    let mut new_hedges = Vec::new();
    let mut h_loop = step(mesh.opposite(strip[index]));
    loop {
        if mesh.is_boundary_halfedge(h_loop) {
            return RingWalk::Boundary;
        }
        if new_hedges.len() > limit {
            return RingWalk::Lost;
        }
        new_hedges.push(h_loop);
        if mesh.face_of(h_loop) == target_face {
            break;
        }
        h_loop = step(h_loop);
    }

    let mut rerouted = Vec::with_capacity(strip.len() + new_hedges.len());
    rerouted.extend_from_slice(&strip[..index]);
    rerouted.extend(new_hedges);
    rerouted.extend_from_slice(&strip[curr..]);
    RingWalk::Rerouted(rerouted)
}

/// Straighten `strip` into a locally shortest path from `src` to `tgt`.
///
/// Runs until the funnel path has no corner, the same vertex is hit twice in
/// a row, the corner is a boundary vertex, or `max_iterations` re-routing
/// steps have been made. Without an explicit bound, the limit is twice the
/// current number of portals, re-evaluated as the strip changes.
///
/// Non-convergence is not an error here; it is reported through
/// [`Straightened::convergence`].
pub fn straighten_path<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    strip: Vec<HalfEdgeId<I>>,
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
    max_iterations: Option<usize>,
) -> Result<Straightened<I>> {
    let mut strip = strip;
    let mut portals: Vec<Portal> = unfold_strip(mesh, &strip, src, tgt)?;
    let mut path = funnel(&portals);
    let mut last_pivot: Option<VertexId<I>> = None;
    let mut iterations = 0;

    let convergence = loop {
        let Some(index) = path.apex else {
            break Convergence::Geodesic;
        };

        let bound = max_iterations.unwrap_or(2 * portals.len());
        if iterations >= bound {
            log::warn!(
                "path straightening stopped after {} iterations with a bend at portal {}",
                iterations,
                index
            );
            break Convergence::IterationLimit;
        }

        let Some(pivot) = pivot_at(mesh, &strip, &path, index) else {
            log::debug!("sharpest bend at portal {} is not on a vertex", index);
            break Convergence::Stalled;
        };
        if last_pivot == Some(pivot.vertex) {
            break Convergence::Pinned(pivot.vertex);
        }
        last_pivot = Some(pivot.vertex);

        let rerouted = match reroute(mesh, &strip, index, &pivot, tgt) {
            RingWalk::Rerouted(rerouted) => rerouted,
            RingWalk::Boundary => {
                log::debug!("path wraps boundary vertex {:?}", pivot.vertex);
                break Convergence::Boundary(pivot.vertex);
            }
            RingWalk::Lost => {
                log::warn!("one-ring walk around {:?} never rejoined the strip", pivot.vertex);
                break Convergence::Stalled;
            }
        };

        log::trace!(
            "iteration {}: re-routed around {:?}, strip {} -> {} halfedges",
            iterations,
            pivot.vertex,
            strip.len(),
            rerouted.len()
        );

        strip = rerouted;
        portals = unfold_strip(mesh, &strip, src, tgt)?;
        path = funnel(&portals);
        iterations += 1;
    };

    Ok(Straightened {
        strip,
        lerps: path.lerps,
        convergence,
        iterations,
    })
}
