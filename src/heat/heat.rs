//! # Transient heat diffusion on a single process
//!
//! Reference solver on the full grid, for validation of
//! [`crate::heat_mpi::Heat2DMpi`].
//!
//! # Example
//! ```
//! use rustheat::config::{Config, RunOptions};
//! use rustheat::heat::Heat2D;
//! use rustheat::integrate;
//!
//! let input = "21 21\n0 1 0 1\n0 0.01\n1.0\n";
//! let config = Config::parse(input, RunOptions::default()).unwrap();
//! let mut heat = Heat2D::new(&config);
//! heat.write_output = false;
//! integrate(&mut heat, config.num_time_steps(), None);
//! ```
use super::boundary_conditions::enforce_bcs;
use super::functions::get_rhs;
use crate::config::{Config, Scheme};
use crate::field::{norm_rms, Field2};
use crate::solver::{DirichletHalo, LinearSolver, SolveImplicit, SolveInfo};
use crate::Integrate;
use ndarray::Array2;
use std::path::PathBuf;

/// Solve 2-dimensional heat equation on the full grid
pub struct Heat2D {
    /// Temperature
    pub temp: Field2,
    /// Buffer, explicit increment or implicit right hand side
    pub(crate) rhs: Array2<f64>,
    /// Linear solver of the implicit scheme
    pub(crate) solver: Option<LinearSolver>,
    /// Boundary of the linear solver
    pub(crate) halo: DirichletHalo,
    /// Diffusivity
    pub kdiff: f64,
    /// Time
    pub time: f64,
    /// Time step size
    pub dt: f64,
    /// Number of steps taken
    pub step: usize,
    /// Write validation snapshot after this step
    pub snapshot_step: Option<usize>,
    /// Output folder
    pub output_dir: PathBuf,
    /// Write files in `callback`
    pub write_output: bool,
    /// Report of the last implicit solve
    pub last_solve: Option<SolveInfo>,
}

impl Heat2D {
    /// Setup solver for `config`, process grid is ignored
    pub fn new(config: &Config) -> Self {
        let nglob = config.nglob;
        let mut temp = Field2::new(nglob, nglob, [0, 0], config.bounds);
        temp.set_tanh_bump();
        enforce_bcs(&mut temp.v);
        let solver = match config.run.scheme {
            Scheme::Explicit => None,
            Scheme::Implicit => {
                let rx = config.kdiff * config.dt / (temp.dx * temp.dx);
                let ry = config.kdiff * config.dt / (temp.dy * temp.dy);
                Some(LinearSolver::new(
                    config.run.solver,
                    rx,
                    ry,
                    config.run.max_iter,
                    config.run.tol,
                ))
            }
        };
        Self {
            temp,
            rhs: Array2::zeros((nglob[0], nglob[1])),
            solver,
            halo: DirichletHalo::new(nglob[0], nglob[1]),
            kdiff: config.kdiff,
            time: config.tst,
            dt: config.dt,
            step: 0,
            snapshot_step: Some(config.run.snapshot_step),
            output_dir: PathBuf::from("data"),
            write_output: true,
            last_solve: None,
        }
    }

    /// Forward Euler, interior points only
    pub fn forward_euler(&mut self) {
        get_rhs(&self.temp, self.kdiff, &mut self.rhs);
        let (nx, ny) = self.temp.v.dim();
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                self.temp.v[[i, j]] = self.temp.v[[i, j]] + self.dt * self.rhs[[i, j]];
            }
        }
        enforce_bcs(&mut self.temp.v);
    }

    /// Backward Euler, right hand side is T at the interior points
    pub fn backward_euler(&mut self, solver: &LinearSolver) {
        let (nx, ny) = self.temp.v.dim();
        self.rhs.fill(0.);
        for i in 1..nx - 1 {
            for j in 1..ny - 1 {
                self.rhs[[i, j]] = self.temp.v[[i, j]];
            }
        }
        let info = solver.solve(&mut self.halo, &self.rhs, &mut self.temp.v);
        self.last_solve = Some(info);
        enforce_bcs(&mut self.temp.v);
    }
}

impl Integrate for Heat2D {
    /// Update 1 timestep
    fn update(&mut self) {
        match self.solver.take() {
            Some(solver) => {
                self.backward_euler(&solver);
                self.solver = Some(solver);
            }
            None => self.forward_euler(),
        }
        self.step += 1;
        self.time += self.dt;
        if self.write_output && self.snapshot_step == Some(self.step) {
            self.write_snapshot_unwrap();
        }
    }

    fn get_time(&self) -> f64 {
        self.time
    }

    fn get_dt(&self) -> f64 {
        self.dt
    }

    fn callback(&mut self) {
        log::info!(
            "step = {:6}    time = {:8.5}    |T| = {:10.4e}",
            self.step,
            self.time,
            norm_rms(&self.temp.v)
        );
        if self.write_output {
            self.write_unwrap();
        }
    }

    fn exit(&mut self) -> bool {
        // Break if temperature is nan
        norm_rms(&self.temp.v).is_nan()
    }
}
