//! Cubic Bézier curves on the surface of a mesh.
//!
//! De Casteljau's construction only needs affine combinations of two points.
//! On a surface, the combination of `a` and `b` at parameter `t` is taken to
//! be the point at arc-length fraction `t` along the geodesic from `a` to `b`
//! ([`geodesic_lerp`](super::geodesic::geodesic_lerp)). Recursive subdivision
//! at `t = 0.5` then yields a chain of short control polygons approximating
//! the curve.
//!
//! # Example
//!
//! ```
//! use geodex::prelude::*;
//! use geodex::algo::bezier::{recursive_de_casteljau, BezierOptions};
//! use nalgebra::Point3;
//!
//! let vertices = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh: HalfEdgeMesh = build_from_triangles(&vertices, &[[0, 1, 2], [0, 2, 3]]).unwrap();
//!
//! let control = [
//!     FaceLocation::new(FaceId::new(0), [0.8, 0.1, 0.1]),
//!     FaceLocation::new(FaceId::new(0), [0.1, 0.8, 0.1]),
//!     FaceLocation::new(FaceId::new(1), [0.1, 0.1, 0.8]),
//!     FaceLocation::new(FaceId::new(1), [0.1, 0.8, 0.1]),
//! ];
//! let points = recursive_de_casteljau(&mesh, &control, 2, &BezierOptions::default()).unwrap();
//! assert_eq!(points.len(), 16);
//! ```

use rayon::prelude::*;

use super::geodesic::{GeodesicSolver, ShortestPathOptions};
use super::Progress;
use crate::error::{GeodesicError, Result};
use crate::mesh::{FaceLocation, HalfEdgeMesh, MeshIndex};

/// The four control points of a cubic Bézier segment.
pub type BezierSegment<I = u32> = [FaceLocation<I>; 4];

/// Options for Bézier subdivision.
#[derive(Debug, Clone)]
pub struct BezierOptions {
    /// Options for every geodesic traced during subdivision.
    pub path: ShortestPathOptions,

    /// Whether to subdivide the segments of one level in parallel (default: true).
    pub parallel: bool,
}

impl Default for BezierOptions {
    fn default() -> Self {
        Self {
            path: ShortestPathOptions::default(),
            parallel: true,
        }
    }
}

impl BezierOptions {
    /// Set the shortest path options.
    pub fn with_path_options(mut self, path: ShortestPathOptions) -> Self {
        self.path = path;
        self
    }

    /// Set whether to use parallel execution.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Create options for single-threaded execution.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}

fn validate_polygon<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    polygon: &BezierSegment<I>,
    options: &BezierOptions,
) -> Result<()> {
    polygon
        .iter()
        .try_for_each(|p| p.validate(mesh, options.path.location_tolerance))
}

/// One de Casteljau step with geodesic interpolation.
fn split<I: MeshIndex>(
    solver: &GeodesicSolver<'_, I>,
    polygon: &BezierSegment<I>,
    t: f64,
) -> Result<(BezierSegment<I>, BezierSegment<I>)> {
    let [p0, p1, p2, p3] = *polygon;
    let q0 = solver.lerp(&p0, &p1, t)?;
    let q1 = solver.lerp(&p1, &p2, t)?;
    let q2 = solver.lerp(&p2, &p3, t)?;
    let r0 = solver.lerp(&q0, &q1, t)?;
    let r1 = solver.lerp(&q1, &q2, t)?;
    let s = solver.lerp(&r0, &r1, t)?;
    Ok(([p0, q0, r0, s], [s, r1, q2, p3]))
}

/// Split a control polygon at parameter `t`.
///
/// Returns `([P0, Q0, R0, S], [S, R1, Q2, P3])`: the control polygons of the
/// curve before and after `S`, the point at `t`.
pub fn subdivide_bezier_polygon<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    polygon: &BezierSegment<I>,
    t: f64,
    options: &BezierOptions,
) -> Result<(BezierSegment<I>, BezierSegment<I>)> {
    if !(0.0..=1.0).contains(&t) {
        return Err(GeodesicError::invalid_param("t", t, "must lie in [0, 1]"));
    }
    validate_polygon(mesh, polygon, options)?;
    let solver = GeodesicSolver::new(mesh)?.with_options(options.path.clone());
    split(&solver, polygon, t)
}

/// Subdivide a control polygon `depth` times at `t = 0.5`.
///
/// Returns the control points of the `2^depth` resulting segments, four per
/// segment and in curve order. The last point of each segment equals the
/// first point of the next.
pub fn recursive_de_casteljau<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    control_points: &BezierSegment<I>,
    depth: usize,
    options: &BezierOptions,
) -> Result<Vec<FaceLocation<I>>> {
    recursive_de_casteljau_internal(mesh, control_points, depth, options, None)
}

/// Recursive de Casteljau subdivision with progress reporting.
///
/// Reports once per subdivision level.
pub fn recursive_de_casteljau_with_progress<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    control_points: &BezierSegment<I>,
    depth: usize,
    options: &BezierOptions,
    progress: &Progress,
) -> Result<Vec<FaceLocation<I>>> {
    recursive_de_casteljau_internal(mesh, control_points, depth, options, Some(progress))
}

fn recursive_de_casteljau_internal<I: MeshIndex>(
    mesh: &HalfEdgeMesh<I>,
    control_points: &BezierSegment<I>,
    depth: usize,
    options: &BezierOptions,
    progress: Option<&Progress>,
) -> Result<Vec<FaceLocation<I>>> {
    let num_points = u32::try_from(depth)
        .ok()
        .and_then(|d| 1usize.checked_shl(d))
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| GeodesicError::invalid_param("depth", depth, "too many segments"))?;

    validate_polygon(mesh, control_points, options)?;
    let solver = GeodesicSolver::new(mesh)?.with_options(options.path.clone());

    let mut segments: Vec<BezierSegment<I>> = vec![*control_points];
    for level in 0..depth {
        if let Some(p) = progress {
            p.report(level, depth, "de Casteljau subdivision");
        }

        let halves: Vec<(BezierSegment<I>, BezierSegment<I>)> = if options.parallel {
            segments
                .par_iter()
                .map(|segment| split(&solver, segment, 0.5))
                .collect::<Result<_>>()?
        } else {
            segments
                .iter()
                .map(|segment| split(&solver, segment, 0.5))
                .collect::<Result<_>>()?
        };

        segments = halves.into_iter().flat_map(|(a, b)| [a, b]).collect();
        log::trace!("de Casteljau level {}: {} segments", level + 1, segments.len());
    }

    if let Some(p) = progress {
        p.report(depth, depth, "de Casteljau subdivision");
    }

    let points: Vec<FaceLocation<I>> = segments.into_iter().flatten().collect();
    debug_assert_eq!(points.len(), num_points);
    Ok(points)
}
