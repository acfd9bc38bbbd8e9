//! Points along a geodesic path.

use super::{locally_shortest_path, GeodesicPath, ShortestPathOptions};
use crate::error::{GeodesicError, Result};
use crate::mesh::{FaceLocation, HalfEdgeMesh, MeshIndex};

/// Reject parameters outside `[0, 1]`.
pub(crate) fn check_unit(t: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&t) {
        return Err(GeodesicError::invalid_param("t", t, "must lie in [0, 1]"));
    }
    Ok(())
}

/// Normalised cumulative arc length of every path point.
///
/// The points are the source, each edge crossing, then the target, so the
/// result has `path.edges().len() + 2` entries running from `0` to `1`. A path
/// of zero length yields zeros followed by a final `1`.
pub fn path_parameters<I: MeshIndex>(mesh: &HalfEdgeMesh<I>, path: &GeodesicPath<I>) -> Vec<f64> {
    let points = path.positions(mesh);
    let mut params = Vec::with_capacity(points.len());
    let mut total = 0.0;
    params.push(0.0);
    for w in points.windows(2) {
        total += (w[1] - w[0]).norm();
        params.push(total);
    }

    if total > 0.0 {
        for s in &mut params {
            *s /= total;
        }
    }
    if let Some(last) = params.last_mut() {
        *last = 1.0;
    }
    params
}

fn lerp_bary(a: &[f64; 3], b: &[f64; 3], alpha: f64) -> [f64; 3] {
    [
        a[0] + (b[0] - a[0]) * alpha,
        a[1] + (b[1] - a[1]) * alpha,
        a[2] + (b[2] - a[2]) * alpha,
    ]
}

/// The point at arc-length fraction `t` of `path`.
///
/// `params` must come from [`path_parameters`] for the same path. The end
/// points are returned unchanged for `t == 0` and `t == 1`. Otherwise the
/// segment containing `t` is found and its two ends, expressed in the face the
/// segment runs through, are interpolated.
pub fn eval_point_on_geodesic<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    path: &GeodesicPath<I>,
    params: &[f64],
    t: f64,
) -> Result<FaceLocation<I>> {
    check_unit(t)?;
    let src = path.source();
    let tgt = path.target();
    let edges = path.edges();

    if params.len() != edges.len() + 2 {
        return Err(GeodesicError::invalid_param(
            "params",
            params.len(),
            "must hold one entry per path point",
        ));
    }
    if t == 0.0 {
        return Ok(*src);
    }
    if t == 1.0 {
        return Ok(*tgt);
    }
    if src.face == tgt.face {
        return Ok(FaceLocation::new(src.face, lerp_bary(&src.bary, &tgt.bary, t)));
    }

    let last = params.len() - 2;
    let i = (0..last).find(|&i| params[i + 1] >= t).unwrap_or(last);
    let (t_low, t_high) = (params[i], params[i + 1]);
    let alpha = if t_high == t_low {
        0.0
    } else {
        (t - t_low) / (t_high - t_low)
    };

    let face = if i == 0 {
        src.face
    } else {
        mesh.face_of(edges[i - 1].halfedge)
    };
    let out_of_face =
        || GeodesicError::location(face.index(), "path crossings do not share a face");

    let low = if i == 0 {
        src.bary
    } else {
        edges[i - 1].in_face(mesh, face).ok_or_else(out_of_face)?
    };
    let high = if i == last {
        tgt.bary
    } else {
        edges[i].in_face(mesh, face).ok_or_else(out_of_face)?
    };

    Ok(FaceLocation::new(face, lerp_bary(&low, &high, alpha)))
}

/// The point at arc-length fraction `t` along the geodesic from `a` to `b`.
///
/// Computes the path with [`locally_shortest_path`] and evaluates it. For
/// repeated queries on one mesh, prefer
/// [`GeodesicSolver::lerp`](super::GeodesicSolver::lerp).
pub fn geodesic_lerp<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    a: &FaceLocation<I>,
    b: &FaceLocation<I>,
    t: f64,
    options: &ShortestPathOptions,
) -> Result<FaceLocation<I>> {
    check_unit(t)?;
    if t == 0.0 {
        return Ok(*a);
    }
    if t == 1.0 {
        return Ok(*b);
    }
    let path = locally_shortest_path(mesh, a, b, options)?;
    path.eval(mesh, t)
}
