//! Helper functions for the single process heat solver
use crate::field::Field2;
use ndarray::Array2;

/// Five point diffusion term k (d2T/dx2 + d2T/dy2) at the
/// interior points. Edge values of `rhs` are not touched.
pub fn get_rhs(field: &Field2, kdiff: f64, rhs: &mut Array2<f64>) {
    let t = &field.v;
    let (nx, ny) = t.dim();
    let dxsq = field.dx * field.dx;
    let dysq = field.dy * field.dy;
    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            rhs[[i, j]] = kdiff * (t[[i + 1, j]] + t[[i - 1, j]] - 2.0 * t[[i, j]]) / dxsq
                + kdiff * (t[[i, j + 1]] + t[[i, j - 1]] - 2.0 * t[[i, j]]) / dysq;
        }
    }
}
