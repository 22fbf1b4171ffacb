//! # Iterative solver for the implicit heat equation
//!
//! Solve equations of the form:
//!
//! (1 + 2 rx + 2 ry) T\[i,j\] - rx (T\[i-1,j\] + T\[i+1,j\]) - ry (T\[i,j-1\] + T\[i,j+1\]) = rhs\[i,j\]
//!
//! at all points which do not lie on the global boundary. Values
//! on the boundary are kept fixed (Dirichlet).
//!
//! The solver work on a single subdomain. All communication
//! with neighboring subdomains goes through the [`Halo`] trait,
//! such that the same solver serve the single-process and the
//! distributed heat solver.
pub mod adi;
pub mod gauss_seidel;
pub mod jacobi;
pub use adi::Adi;
pub use gauss_seidel::GaussSeidel;
pub use jacobi::Jacobi;

use crate::mpi::GhostBuffers;
use ndarray::Array2;

/// Connection of one subdomain to its neighbors
pub trait Halo {
    /// Refresh ghost buffers with the edges of the neighbors of `v`
    fn exchange(&mut self, v: &Array2<f64>);

    /// Ghost values of the last exchange
    fn ghosts(&self) -> &GhostBuffers;

    /// Local index ranges `[i0, i1) x [j0, j1)` of the unknowns
    fn interior(&self) -> ([usize; 2], [usize; 2]);

    /// Sum over all subdomains
    fn global_sum(&self, local: f64) -> f64;

    /// Number of points of the global grid
    fn global_count(&self) -> usize;

    /// Root mean square difference of two iterates, over the global grid
    fn global_rms_diff(&self, a: &Array2<f64>, b: &Array2<f64>) -> f64 {
        let sum = self.global_sum(crate::field::sum_sq_diff(a, b));
        (sum / self.global_count() as f64).sqrt()
    }
}

/// Single domain with zero Dirichlet conditions on all four edges
#[derive(Clone, Debug)]
pub struct DirichletHalo {
    ghosts: GhostBuffers,
    shape: [usize; 2],
}

impl DirichletHalo {
    /// Domain of `nx` x `ny` points
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            ghosts: GhostBuffers::new(nx, ny),
            shape: [nx, ny],
        }
    }
}

impl Halo for DirichletHalo {
    fn exchange(&mut self, _v: &Array2<f64>) {}

    fn ghosts(&self) -> &GhostBuffers {
        &self.ghosts
    }

    fn interior(&self) -> ([usize; 2], [usize; 2]) {
        ([1, self.shape[0] - 1], [1, self.shape[1] - 1])
    }

    fn global_sum(&self, local: f64) -> f64 {
        local
    }

    fn global_count(&self) -> usize {
        self.shape[0] * self.shape[1]
    }
}

/// Outcome of a linear solve
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolveInfo {
    /// Number of iterations performed
    pub iterations: usize,
    /// Root mean square difference of the last two iterates
    pub residual: f64,
    /// Residual dropped below tolerance
    pub converged: bool,
}

/// Solve the implicit system of one time step
#[enum_dispatch]
pub trait SolveImplicit {
    /// Solve for `v`, using its content as initial guess.
    /// On return `v` holds the latest iterate.
    fn solve(&self, halo: &mut dyn Halo, rhs: &Array2<f64>, v: &mut Array2<f64>) -> SolveInfo;
}

/// Collection of implicit solver
#[enum_dispatch(SolveImplicit)]
#[derive(Clone, Debug)]
pub enum LinearSolver {
    /// Point Jacobi
    Jacobi(Jacobi),
    /// Gauss-Seidel, raster order
    GaussSeidel(GaussSeidel),
    /// Single alternating direction sweep
    Adi(Adi),
}

/// Selects a [`LinearSolver`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SolverKind {
    /// Point Jacobi
    Jacobi,
    /// Gauss-Seidel
    GaussSeidel,
    /// Alternating direction sweep
    Adi,
}

impl LinearSolver {
    /// Setup solver for coefficients `rx = k dt / dx^2` and `ry = k dt / dy^2`.
    /// `max_iter` and `tol` are ignored by `Adi`.
    pub fn new(kind: SolverKind, rx: f64, ry: f64, max_iter: usize, tol: f64) -> Self {
        match kind {
            SolverKind::Jacobi => Self::Jacobi(Jacobi::new(rx, ry, max_iter, tol)),
            SolverKind::GaussSeidel => Self::GaussSeidel(GaussSeidel::new(rx, ry, max_iter, tol)),
            SolverKind::Adi => Self::Adi(Adi::new(rx, ry)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::field::norm_rms_diff;

    /// Right hand side of a smooth problem, zero on the edges
    pub(crate) fn rhs_sin(nx: usize, ny: usize) -> Array2<f64> {
        use std::f64::consts::PI;
        let mut rhs = Array2::from_shape_fn((nx, ny), |(i, j)| {
            (PI * i as f64 / (nx - 1) as f64).sin() * (PI * j as f64 / (ny - 1) as f64).sin()
        });
        rhs.row_mut(0).fill(0.);
        rhs.row_mut(nx - 1).fill(0.);
        rhs.column_mut(0).fill(0.);
        rhs.column_mut(ny - 1).fill(0.);
        rhs
    }

    /// Max. violation of the discrete equations at interior points
    pub(crate) fn defect(v: &Array2<f64>, rhs: &Array2<f64>, rx: f64, ry: f64) -> f64 {
        let (nx, ny) = v.dim();
        let mut max: f64 = 0.;
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                let lhs = (1. + 2. * rx + 2. * ry) * v[[i, j]]
                    - rx * (v[[i - 1, j]] + v[[i + 1, j]])
                    - ry * (v[[i, j - 1]] + v[[i, j + 1]]);
                max = max.max((lhs - rhs[[i, j]]).abs());
            }
        }
        max
    }

    #[test]
    fn test_jacobi_and_gauss_seidel_share_fixed_point() {
        let (nx, ny, rx, ry) = (17, 13, 0.8, 0.5);
        let rhs = rhs_sin(nx, ny);
        let mut halo = DirichletHalo::new(nx, ny);

        let jacobi = LinearSolver::new(SolverKind::Jacobi, rx, ry, 1000, 1e-10);
        let mut v_jac = rhs.clone();
        let info_jac = jacobi.solve(&mut halo, &rhs, &mut v_jac);

        let gs = LinearSolver::new(SolverKind::GaussSeidel, rx, ry, 1000, 1e-10);
        let mut v_gs = rhs.clone();
        let info_gs = gs.solve(&mut halo, &rhs, &mut v_gs);

        assert!(info_jac.converged && info_gs.converged);
        assert!(info_gs.iterations <= info_jac.iterations);
        assert!(norm_rms_diff(&v_jac, &v_gs) < 1e-8);
        assert!(defect(&v_jac, &rhs, rx, ry) < 1e-7);
        assert!(defect(&v_gs, &rhs, rx, ry) < 1e-7);
    }

    #[test]
    fn test_non_convergence_is_reported() {
        let (nx, ny) = (33, 33);
        let rhs = rhs_sin(nx, ny);
        let mut halo = DirichletHalo::new(nx, ny);
        let solver = LinearSolver::new(SolverKind::Jacobi, 50., 50., 3, 1e-12);
        let mut v = Array2::zeros((nx, ny));
        let info = solver.solve(&mut halo, &rhs, &mut v);
        assert_eq!(info.iterations, 3);
        assert!(!info.converged);
        assert!(info.residual > 1e-12);
        // best available iterate is returned
        assert!(v.iter().any(|x| *x != 0.));
    }

    #[test]
    fn test_adi_is_single_pass() {
        let (nx, ny) = (9, 9);
        let rhs = rhs_sin(nx, ny);
        let mut halo = DirichletHalo::new(nx, ny);
        let solver = LinearSolver::new(SolverKind::Adi, 0.3, 0.3, 1000, 1e-12);
        let mut v = rhs.clone();
        let info = solver.solve(&mut halo, &rhs, &mut v);
        assert_eq!(info.iterations, 1);
        // boundary untouched
        assert!(v.row(0).iter().all(|x| *x == 0.));
        assert!(v.column(ny - 1).iter().all(|x| *x == 0.));
    }

    #[test]
    fn test_non_convergence_agrees_on_all_ranks() {
        use crate::mpi::{Communicator, Decomp2d, HaloExchange, ThreadComm, Topology};
        use ndarray::s;
        let nglob = [16, 16];
        let rhs = rhs_sin(nglob[0], nglob[1]);
        for kind in [SolverKind::Jacobi, SolverKind::GaussSeidel] {
            let solver = LinearSolver::new(kind, 50., 50., 3, 1e-12);
            let infos = ThreadComm::run(4, |comm| {
                let topo = Topology::new(comm.rank(), comm.size(), 2, 2).unwrap();
                let dcp = Decomp2d::new(&topo, nglob).unwrap();
                let local = rhs
                    .slice(s![dcp.st[0]..=dcp.en[0], dcp.st[1]..=dcp.en[1]])
                    .to_owned();
                let mut halo = HaloExchange::new(comm, topo, dcp);
                let mut v = Array2::zeros((dcp.sz[0], dcp.sz[1]));
                let info = solver.solve(&mut halo, &local, &mut v);
                // ranks are still in step
                halo.exchange_all(&v);
                info
            });
            for info in &infos {
                assert_eq!(*info, infos[0], "{:?}", kind);
            }
            assert_eq!(infos[0].iterations, 3);
            assert!(!infos[0].converged);
            assert!(infos[0].residual > 1e-12);
        }
    }
}
