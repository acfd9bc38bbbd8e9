//! Shortest path through a corridor of portals.
//!
//! Implements the simple stupid funnel algorithm: the funnel is a pair of
//! bounds anchored at an apex; each portal tightens one side, and when a side
//! crosses over the other, the crossed bound becomes a new path vertex and
//! the scan restarts just after it.
//!
//! The routines are generic over [`RealField`] so they can run on any scalar
//! type nalgebra supports; the rest of the crate uses `f64`.

use nalgebra::{RealField, Vector2};

/// A corner of the funnel path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FunnelPoint<T: RealField + Copy> {
    /// Index of the first portal containing the point.
    pub face: usize,
    /// Planar position.
    pub pos: Vector2<T>,
}

/// Result of running the funnel over a portal sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct FunnelPath<T: RealField + Copy> {
    /// Crossing parameter of every portal but the last, in `[0, 1]`.
    ///
    /// `0` is the portal's first endpoint, `1` its second.
    pub lerps: Vec<T>,
    /// Corners of the path, from the source to the target.
    pub points: Vec<FunnelPoint<T>>,
    /// Portal index of the sharpest interior corner, `None` for a straight path.
    pub apex: Option<usize>,
}

#[inline]
fn area<T: RealField + Copy>(a: &Vector2<T>, b: &Vector2<T>, c: &Vector2<T>) -> T {
    let u = b - a;
    let v = c - a;
    u.x * v.y - u.y * v.x
}

/// Parameter along `start2 -> end2` where it meets the line `start1 -> end1`.
///
/// Shared endpoints short-circuit to exactly `0` or `1`. Parallel segments
/// yield `0`.
pub fn intersect_segments<T: RealField + Copy>(
    start1: &Vector2<T>,
    end1: &Vector2<T>,
    start2: &Vector2<T>,
    end2: &Vector2<T>,
) -> T {
    if end1 == start2 {
        return T::zero();
    }
    if end2 == start1 {
        return T::one();
    }
    if start2 == start1 {
        // Segment and portal coincide.
        return if end2 == end1 { T::one() } else { T::zero() };
    }
    if end2 == end1 {
        return T::one();
    }

    let a = end1 - start1;
    let b = start2 - end2;
    let d = start2 - start1;
    let det = a.x * b.y - a.y * b.x;
    if det == T::zero() {
        return T::zero();
    }
    (a.x * d.y - a.y * d.x) / det
}

fn clamp_unit<T: RealField + Copy>(s: T) -> T {
    if s < T::zero() {
        T::zero()
    } else if s > T::one() {
        T::one()
    } else {
        s
    }
}

/// Run the funnel over `portals`.
///
/// The path starts at the origin and ends at the last portal, which must be
/// degenerate. Returns no lerps for an empty portal list.
pub fn funnel<T: RealField + Copy>(portals: &[[Vector2<T>; 2]]) -> FunnelPath<T> {
    let Some(last) = portals.last() else {
        return FunnelPath {
            lerps: Vec::new(),
            points: Vec::new(),
            apex: None,
        };
    };

    let mut apex = Vector2::zeros();
    let mut left_bound = portals[0][0];
    let mut right_bound = portals[0][1];
    let mut left_index = 0;
    let mut right_index = 0;

    let mut points = Vec::with_capacity(portals.len());
    points.push(FunnelPoint { face: 0, pos: apex });

    let mut i = 0;
    while i < portals.len() {
        let [left, right] = portals[i];

        if area(&apex, &right_bound, &right) <= T::zero() {
            if apex == right_bound || area(&apex, &left_bound, &right) > T::zero() {
                right_bound = right;
                right_index = i;
            } else if left_bound != apex {
                // Right crossed over left: the left bound becomes a corner.
                points.push(FunnelPoint {
                    face: left_index,
                    pos: left_bound,
                });
                apex = left_bound;
                right_bound = apex;
                right_index = left_index;
                i = left_index + 1;
                continue;
            }
        }

        if area(&apex, &left_bound, &left) >= T::zero() {
            if apex == left_bound || area(&apex, &right_bound, &left) < T::zero() {
                left_bound = left;
                left_index = i;
            } else if right_bound != apex {
                points.push(FunnelPoint {
                    face: right_index,
                    pos: right_bound,
                });
                apex = right_bound;
                left_bound = apex;
                left_index = right_index;
                i = right_index + 1;
                continue;
            }
        }

        i += 1;
    }

    // The apex may already sit on the last portal.
    if points.last().map(|p| p.pos) != Some(last[0]) {
        points.push(FunnelPoint {
            face: portals.len() - 1,
            pos: last[0],
        });
    }

    let mut lerps = Vec::with_capacity(portals.len() - 1);
    for pair in points.windows(2) {
        let (a, b) = (pair[0].pos, pair[1].pos);
        for portal in &portals[pair[0].face..pair[1].face] {
            lerps.push(clamp_unit(intersect_segments(&a, &b, &portal[0], &portal[1])));
        }
    }

    // Re-index corners to the first portal that contains them.
    let mut index = 1;
    for (i, portal) in portals.iter().enumerate() {
        let Some(point) = points.get_mut(index) else {
            break;
        };
        if portal[0] == point.pos || portal[1] == point.pos {
            point.face = i;
            index += 1;
        }
    }

    let apex = max_curvature_point(&points);
    FunnelPath {
        lerps,
        points,
        apex,
    }
}

/// Portal index of the interior corner with the largest turning angle.
///
/// The angle measure is `1 - cos(turn)`; a straight path yields `None`.
pub fn max_curvature_point<T: RealField + Copy>(points: &[FunnelPoint<T>]) -> Option<usize> {
    let mut max_index = None;
    let mut max_angle = T::zero();

    for w in points.windows(3) {
        let (prev, pos, next) = (w[0].pos, w[1].pos, w[2].pos);
        let (Some(v0), Some(v1)) = (
            (pos - prev).try_normalize(T::zero()),
            (next - pos).try_normalize(T::zero()),
        ) else {
            continue;
        };
        let angle = T::one() - v0.dot(&v1);
        if angle > max_angle {
            max_index = Some(w[1].face);
            max_angle = angle;
        }
    }

    max_index
}
