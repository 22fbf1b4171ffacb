//! Dirichlet conditions, T = 0 on all four edges
use ndarray::Array2;

/// Zero first and last row and column
pub fn enforce_bcs(v: &mut Array2<f64>) {
    let (nx, ny) = v.dim();
    v.row_mut(0).fill(0.);
    v.row_mut(nx - 1).fill(0.);
    v.column_mut(0).fill(0.);
    v.column_mut(ny - 1).fill(0.);
}
