//! Point Jacobi iteration
use super::{Halo, SolveImplicit, SolveInfo};
use ndarray::Array2;

/// Jacobi solver
///
/// Every sweep reads only the previous full iterate.
#[derive(Clone, Debug)]
pub struct Jacobi {
    rx: f64,
    ry: f64,
    /// Maximum number of sweeps
    pub max_iter: usize,
    /// Tolerance of the rms difference of successive iterates
    pub tol: f64,
}

impl Jacobi {
    /// Return new Jacobi solver
    pub fn new(rx: f64, ry: f64, max_iter: usize, tol: f64) -> Self {
        Self {
            rx,
            ry,
            max_iter,
            tol,
        }
    }
}

impl SolveImplicit for Jacobi {
    fn solve(&self, halo: &mut dyn Halo, rhs: &Array2<f64>, v: &mut Array2<f64>) -> SolveInfo {
        let ([i0, i1], [j0, j1]) = halo.interior();
        let (rx, ry) = (self.rx, self.ry);
        let denom = 1. + 2. * rx + 2. * ry;
        let mut old = v.clone();
        let mut residual = f64::INFINITY;
        for it in 1..=self.max_iter {
            old.assign(v);
            halo.exchange(&old);
            let ghosts = halo.ghosts();
            for i in i0..i1 {
                for j in j0..j1 {
                    let [w, e, s, n] = ghosts.around(&old, i, j);
                    v[[i, j]] = (rhs[[i, j]] + rx * w + rx * e + ry * s + ry * n) / denom;
                }
            }
            residual = halo.global_rms_diff(v, &old);
            if residual < self.tol {
                log::debug!("Jacobi converged: {} {:e}", it, residual);
                return SolveInfo {
                    iterations: it,
                    residual,
                    converged: true,
                };
            }
        }
        log::warn!(
            "Jacobi not converged after {} iterations, residual {:e}",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::DirichletHalo;

    #[test]
    fn test_jacobi_reads_previous_iterate() {
        let (nx, ny) = (4, 3);
        let mut rhs = Array2::zeros((nx, ny));
        rhs[[1, 1]] = 1.;
        let mut halo = DirichletHalo::new(nx, ny);
        let jacobi = Jacobi::new(1., 1., 1, 0.);
        let mut v = Array2::zeros((nx, ny));
        jacobi.solve(&mut halo, &rhs, &mut v);
        assert!((v[[1, 1]] - 0.2).abs() < 1e-14);
        // neighbor saw the old zero value
        assert!(v[[2, 1]].abs() < 1e-14);
    }
}
