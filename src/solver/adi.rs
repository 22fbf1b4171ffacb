//! Alternating direction sweep
//!
//! One sweep along x, coupling only neighbors in x, followed by one
//! sweep along y on the intermediate field. This approximates the
//! two dimensional implicit system, the splitting error grows with
//! rx and ry. No iteration to convergence takes place.
use super::{Halo, SolveImplicit, SolveInfo};
use ndarray::Array2;

/// Single pass alternating direction solver
#[derive(Clone, Debug)]
pub struct Adi {
    rx: f64,
    ry: f64,
}

impl Adi {
    /// Return new alternating direction solver
    pub fn new(rx: f64, ry: f64) -> Self {
        Self { rx, ry }
    }
}

impl SolveImplicit for Adi {
    fn solve(&self, halo: &mut dyn Halo, rhs: &Array2<f64>, v: &mut Array2<f64>) -> SolveInfo {
        let ([i0, i1], [j0, j1]) = halo.interior();
        let (rx, ry) = (self.rx, self.ry);
        let old = v.clone();

        // sweep along x
        let mut tmp = v.clone();
        halo.exchange(v);
        let ghosts = halo.ghosts();
        for i in i0..i1 {
            for j in j0..j1 {
                let [w, e, _, _] = ghosts.around(v, i, j);
                tmp[[i, j]] = (rhs[[i, j]] + rx * (e + w)) / (1. + 2. * rx);
            }
        }

        // sweep along y
        halo.exchange(&tmp);
        let ghosts = halo.ghosts();
        for i in i0..i1 {
            for j in j0..j1 {
                let [_, _, s, n] = ghosts.around(&tmp, i, j);
                v[[i, j]] = (tmp[[i, j]] + ry * (n + s)) / (1. + 2. * ry);
            }
        }

        let residual = halo.global_rms_diff(v, &old);
        log::debug!("Adi: {:e}", residual);
        SolveInfo {
            iterations: 1,
            residual,
            converged: true,
        }
    }
}
