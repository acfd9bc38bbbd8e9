//! Isometric unfolding of triangle strips into the plane.
//!
//! A strip of adjacent triangles is laid out one triangle at a time: each new
//! vertex is placed at the intersection of two circles centred on the already
//! placed endpoints of the shared edge, with radii equal to the true 3D edge
//! lengths. Planar distances in the layout are therefore surface distances
//! along the unfolded strip.
//!
//! Orientation: the circle intersection always picks the root on the right of
//! `c1 -> c2`. Every caller passes the shared edge so that this places the new
//! vertex on the far side of the edge, which keeps counter-clockwise faces
//! counter-clockwise in the layout.

use nalgebra::Vector2;

use crate::error::{GeodesicError, Result};
use crate::mesh::{FaceId, FaceLocation, HalfEdgeId, HalfEdgeMesh, MeshIndex};

/// Two planar points bounding the corridor between consecutive triangles.
///
/// For a strip halfedge `h`, the portal is `[image of target(h), image of
/// source(h)]`.
pub type Portal = [Vector2<f64>; 2];

/// Intersect the circle around `c2` (squared radius `r2`) with the circle
/// around `c1` (squared radius `r1`).
///
/// Returns the intersection on the right of the direction `c1 -> c2`, or
/// `None` when the circles do not meet in two distinct points.
pub fn intersect_circles(
    c2: &Vector2<f64>,
    r2: f64,
    c1: &Vector2<f64>,
    r1: f64,
) -> Option<Vector2<f64>> {
    let d = c2 - c1;
    let r = d.norm_squared();
    if r <= 0.0 {
        return None;
    }
    let inv_r = 1.0 / r;
    let a = 2.0 * (r1 + r2) * inv_r;
    let b = (r1 - r2) * inv_r;
    let s = a - b * b - 1.0;
    if !(s > 0.0) {
        return None;
    }

    let perp = Vector2::new(c2.y - c1.y, c1.x - c2.x);
    Some((c1 + c2 + d * b + perp * s.sqrt()) * 0.5)
}

fn degenerate<I: MeshIndex>(face: FaceId<I>) -> GeodesicError {
    GeodesicError::GeometryDegenerate { face: face.index() }
}

/// Lay out the face of `h` with `source(h)` at the origin and `target(h)` on
/// the positive Y axis.
///
/// The result is `[source(h), target(h), target(next(h))]`.
pub fn init_flat_triangle<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    h: HalfEdgeId<I>,
) -> Result<[Vector2<f64>; 3]> {
    let v0 = mesh.source(h);
    let v1 = mesh.target(h);
    let v2 = mesh.target(mesh.next(h));

    let tr0 = Vector2::zeros();
    let tr1 = Vector2::new(0.0, mesh.squared_distance(v0, v1).sqrt());
    let tr2 = intersect_circles(
        &tr0,
        mesh.squared_distance(v0, v2),
        &tr1,
        mesh.squared_distance(v1, v2),
    )
    .ok_or_else(|| degenerate(mesh.face_of(h)))?;

    Ok([tr0, tr1, tr2])
}

/// Unfold the face across `h` next to the already flattened face of `h`.
///
/// `flat` is the layout returned by [`init_flat_triangle`] for `h`. The first
/// two entries of the result are shared with it; the third is the neighbour's
/// remaining vertex.
pub fn unfold_face<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    h: HalfEdgeId<I>,
    flat: &[Vector2<f64>; 3],
) -> Result<[Vector2<f64>; 3]> {
    let h_opp = mesh.opposite(h);
    let v = mesh.target(mesh.next(h_opp));
    let a = mesh.target(h_opp);
    let b = mesh.source(h_opp);

    let v2 = intersect_circles(
        &flat[1],
        mesh.squared_distance(v, b),
        &flat[0],
        mesh.squared_distance(v, a),
    )
    .ok_or_else(|| degenerate(mesh.face_of(h_opp)))?;

    Ok([flat[0], flat[1], v2])
}

/// First portal of a strip, translated so that the source point is the origin.
pub fn init_source_triangle<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    first: HalfEdgeId<I>,
    src: &FaceLocation<I>,
) -> Result<Portal> {
    let h = mesh.opposite(first);
    let tr = init_flat_triangle(mesh, h)?;
    let bary = src.rebased(mesh, h).ok_or_else(|| {
        GeodesicError::location(src.face.index(), "strip does not start in the source face")
    })?;

    let p = tr[0] * bary[0] + tr[1] * bary[1] + tr[2] * bary[2];
    Ok([tr[0] - p, tr[1] - p])
}

/// Portal of `h_next` given the portal of `h_curr`, the previous strip
/// halfedge.
///
/// Both halfedges bound the same face: `h_curr` enters it and `h_next`'s
/// opposite leaves it.
pub fn unfold_portal<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    h_curr: HalfEdgeId<I>,
    h_next: HalfEdgeId<I>,
    prev: &Portal,
) -> Result<Portal> {
    debug_assert_eq!(mesh.face_of(h_curr), mesh.face_of(mesh.opposite(h_next)));

    let v = mesh.target(mesh.next(h_curr));
    let a = mesh.target(h_curr);
    let b = mesh.source(h_curr);

    let v2 = intersect_circles(
        &prev[1],
        mesh.squared_distance(v, b),
        &prev[0],
        mesh.squared_distance(v, a),
    )
    .ok_or_else(|| degenerate(mesh.face_of(h_curr)))?;

    if mesh.next(h_curr) == mesh.opposite(h_next) {
        Ok([prev[0], v2])
    } else {
        Ok([v2, prev[1]])
    }
}

/// Last portal of a strip: both endpoints are the unfolded target point.
pub fn init_target_triangle<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    last: HalfEdgeId<I>,
    prev: &Portal,
    tgt: &FaceLocation<I>,
) -> Result<Portal> {
    let v0 = mesh.source(last);
    let v1 = mesh.target(last);
    let v2 = mesh.target(mesh.next(last));

    let tr0 = prev[1];
    let tr1 = prev[0];
    let tr2 = intersect_circles(
        &tr0,
        mesh.squared_distance(v0, v2),
        &tr1,
        mesh.squared_distance(v1, v2),
    )
    .ok_or_else(|| degenerate(mesh.face_of(last)))?;

    let bary = tgt.rebased(mesh, last).ok_or_else(|| {
        GeodesicError::location(tgt.face.index(), "strip does not end in the target face")
    })?;

    let p = tr0 * bary[0] + tr1 * bary[1] + tr2 * bary[2];
    Ok([p, p])
}

/// Unfold a whole strip into its portal sequence.
///
/// Returns `strip.len() + 1` portals; an empty strip yields no portals.
pub fn unfold_strip<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    strip: &[HalfEdgeId<I>],
    src: &FaceLocation<I>,
    tgt: &FaceLocation<I>,
) -> Result<Vec<Portal>> {
    let Some((&first, _)) = strip.split_first() else {
        return Ok(Vec::new());
    };

    let mut portals = Vec::with_capacity(strip.len() + 1);
    portals.push(init_source_triangle(mesh, first, src)?);
    for pair in strip.windows(2) {
        let prev = portals[portals.len() - 1];
        portals.push(unfold_portal(mesh, pair[0], pair[1], &prev)?);
    }
    let prev = portals[portals.len() - 1];
    portals.push(init_target_triangle(mesh, strip[strip.len() - 1], &prev, tgt)?);

    Ok(portals)
}
