//! Gauss-Seidel iteration
//!
//! Points are updated in place, in raster order (i outer, j inner),
//! so that values left and below of a point are already new.
//! On a decomposed grid the ghost values stem from the previous
//! sweep of the neighbor (block Gauss-Seidel).
use super::{Halo, SolveImplicit, SolveInfo};
use ndarray::Array2;

/// Gauss-Seidel solver
#[derive(Clone, Debug)]
pub struct GaussSeidel {
    rx: f64,
    ry: f64,
    /// Maximum number of sweeps
    pub max_iter: usize,
    /// Tolerance of the rms difference of successive iterates
    pub tol: f64,
}

impl GaussSeidel {
    /// Return new Gauss-Seidel solver
    pub fn new(rx: f64, ry: f64, max_iter: usize, tol: f64) -> Self {
        Self {
            rx,
            ry,
            max_iter,
            tol,
        }
    }
}

impl SolveImplicit for GaussSeidel {
    fn solve(&self, halo: &mut dyn Halo, rhs: &Array2<f64>, v: &mut Array2<f64>) -> SolveInfo {
        let ([i0, i1], [j0, j1]) = halo.interior();
        let (rx, ry) = (self.rx, self.ry);
        let denom = 1. + 2. * rx + 2. * ry;
        let mut old = v.clone();
        let mut residual = f64::INFINITY;
        for it in 1..=self.max_iter {
            old.assign(v);
            halo.exchange(v);
            let ghosts = halo.ghosts();
            for i in i0..i1 {
                for j in j0..j1 {
                    let [w, e, s, n] = ghosts.around(v, i, j);
                    v[[i, j]] = (rhs[[i, j]] + rx * w + rx * e + ry * s + ry * n) / denom;
                }
            }
            residual = halo.global_rms_diff(v, &old);
            if residual < self.tol {
                log::debug!("Gauss-Seidel converged: {} {:e}", it, residual);
                return SolveInfo {
                    iterations: it,
                    residual,
                    converged: true,
                };
            }
        }
        log::warn!(
            "Gauss-Seidel not converged after {} iterations, residual {:e}",
            self.max_iter,
            residual
        );
        SolveInfo {
            iterations: self.max_iter,
            residual,
            converged: false,
        }
    }
}
