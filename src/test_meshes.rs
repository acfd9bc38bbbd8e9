//! Fixture meshes shared by the unit tests.

use nalgebra::Point3;

use crate::mesh::{build_from_triangles, FaceId, FaceLocation, HalfEdgeMesh};

/// Grid faces over `nu x nv` cells, two triangles per cell.
///
/// Cell `(i, j)` owns faces `2 * (j * nu + i)` (lower right, `[v00, v10, v11]`)
/// and `2 * (j * nu + i) + 1` (upper left, `[v00, v11, v01]`).
fn grid_faces(nu: usize, nv: usize) -> Vec<[usize; 3]> {
    let mut faces = Vec::with_capacity(nu * nv * 2);
    for j in 0..nv {
        for i in 0..nu {
            let v00 = j * (nu + 1) + i;
            let v10 = v00 + 1;
            let v01 = v00 + nu + 1;
            let v11 = v01 + 1;
            faces.push([v00, v10, v11]);
            faces.push([v00, v11, v01]);
        }
    }
    faces
}

/// A flat `n x n` grid covering `[0, size]^2` in the z = 0 plane.
pub(crate) fn flat_grid(n: usize, size: f64) -> HalfEdgeMesh {
    let step = size / n as f64;
    let mut vertices = Vec::with_capacity((n + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(Point3::new(i as f64 * step, j as f64 * step, 0.0));
        }
    }
    build_from_triangles(&vertices, &grid_faces(n, n)).unwrap()
}

/// Face of [`flat_grid`] containing the planar point `(x, y)`, with `x` and `y`
/// measured in cells.
pub(crate) fn grid_face(n: usize, x: f64, y: f64) -> FaceId {
    let i = (x.floor() as usize).min(n - 1);
    let j = (y.floor() as usize).min(n - 1);
    let upper = y - j as f64 > x - i as f64;
    FaceId::new(2 * (j * n + i) + upper as usize)
}

/// Barycentric location of the 3D point `p`, which must lie in `face`'s plane.
pub(crate) fn locate(mesh: &HalfEdgeMesh, face: FaceId, p: Point3<f64>) -> FaceLocation {
    let [a, b, c] = mesh.face_positions(face);
    let (e0, e1, e2) = (b - a, c - a, p - a);
    let (d00, d01, d11) = (e0.dot(&e0), e0.dot(&e1), e1.dot(&e1));
    let (d20, d21) = (e2.dot(&e0), e2.dot(&e1));
    let denom = d00 * d11 - d01 * d01;
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    FaceLocation::new(face, [1.0 - v - w, v, w])
}

/// Location of the planar point `(x, y)` on `flat_grid(n, n as f64)`.
pub(crate) fn grid_location(mesh: &HalfEdgeMesh, n: usize, x: f64, y: f64) -> FaceLocation {
    locate(mesh, grid_face(n, x, y), Point3::new(x, y, 0.0))
}

/// Location of parameter point `(u, v)` on `folded_grid(n)`.
pub(crate) fn folded_location(mesh: &HalfEdgeMesh, n: usize, u: f64, v: f64) -> FaceLocation {
    let (x, y) = (u * n as f64, v * n as f64);
    let i = (x.floor() as usize).min(2 * n - 1);
    let j = (y.floor() as usize).min(n - 1);
    let upper = y - j as f64 > x - i as f64;
    let face = FaceId::new(2 * (j * 2 * n + i) + upper as usize);
    locate(mesh, face, fold(u, v))
}

/// A `2 x 1` strip bent by 90 degrees along `u = 1`, with `n` cells per unit.
///
/// Parameter point `(u, v)` maps to `(u, v, 0)` for `u <= 1` and to
/// `(1, v, u - 1)` beyond the fold.
pub(crate) fn folded_grid(n: usize) -> HalfEdgeMesh {
    let nu = 2 * n;
    let step = 1.0 / n as f64;
    let mut vertices = Vec::with_capacity((nu + 1) * (n + 1));
    for j in 0..=n {
        for i in 0..=nu {
            vertices.push(fold(i as f64 * step, j as f64 * step));
        }
    }
    build_from_triangles(&vertices, &grid_faces(nu, n)).unwrap()
}

/// Map a parameter point of [`folded_grid`] into 3D.
pub(crate) fn fold(u: f64, v: f64) -> Point3<f64> {
    if u <= 1.0 {
        Point3::new(u, v, 0.0)
    } else {
        Point3::new(1.0, v, u - 1.0)
    }
}

/// A regular icosahedron with unit edge length.
pub(crate) fn icosahedron() -> HalfEdgeMesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let s = 0.5;
    let vertices: Vec<Point3<f64>> = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ]
    .iter()
    .map(|p| Point3::new(p[0] * s, p[1] * s, p[2] * s))
    .collect();

    let faces = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];
    build_from_triangles(&vertices, &faces).unwrap()
}

/// Six triangles fanned around a saddle vertex at the origin.
///
/// The rim vertices alternate above and below the plane, so the angles at
/// vertex 0 sum to well over 360 degrees. Face `k` is `[0, k + 1, k + 2]`.
pub(crate) fn saddle() -> HalfEdgeMesh {
    let h = 0.45;
    let mut vertices = vec![Point3::origin()];
    for k in 0..6 {
        let theta = k as f64 * std::f64::consts::FRAC_PI_3;
        let z = if k % 2 == 0 { h } else { -h };
        vertices.push(Point3::new(theta.cos(), theta.sin(), z));
    }
    let faces: Vec<[usize; 3]> = (1..=6).map(|k| [0, k, k % 6 + 1]).collect();
    build_from_triangles(&vertices, &faces).unwrap()
}

/// An L-shaped flat patch: the unit cells `(0, 0)`, `(1, 0)` and `(0, 1)`.
///
/// Faces are numbered as in [`flat_grid`], cell by cell, so the cell at
/// `(1, 0)` owns faces 2 and 3. Vertex 4 at `(1, 1)` is the reflex corner.
pub(crate) fn l_shape() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(2.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(1.0, 1.0, 0.0),
        Point3::new(2.0, 1.0, 0.0),
        Point3::new(0.0, 2.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
    ];
    let faces = [
        [0, 1, 4],
        [0, 4, 3],
        [1, 2, 5],
        [1, 5, 4],
        [3, 4, 7],
        [3, 7, 6],
    ];
    build_from_triangles(&vertices, &faces).unwrap()
}

/// A closed tetrahedron.
pub(crate) fn tetrahedron() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.5, 1.0, 0.0),
        Point3::new(0.5, 0.5, 1.0),
    ];
    build_from_triangles(&vertices, &[[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]]).unwrap()
}

/// Two triangles that share no vertex.
pub(crate) fn disconnected() -> HalfEdgeMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(5.0, 0.0, 0.0),
        Point3::new(6.0, 0.0, 0.0),
        Point3::new(5.0, 1.0, 0.0),
    ];
    build_from_triangles(&vertices, &[[0, 1, 2], [3, 4, 5]]).unwrap()
}
