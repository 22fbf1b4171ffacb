//! # Transient heat diffusion (mpi supported)
//!
//! dT/dt = k (d2T/dx2 + d2T/dy2)
//!
//! on a rectangle with T = 0 on its boundary. The grid is split
//! into blocks, one per process, see [`crate::mpi`].
//!
//! # Example
//! Solve on 2 x 2 threads
//! ```
//! use rustheat::config::{Config, RunOptions};
//! use rustheat::heat_mpi::Heat2DMpi;
//! use rustheat::mpi::ThreadComm;
//! use rustheat::integrate;
//!
//! let input = "16 16\n0 1 0 1\n0 0.01 0.0009765625 0.01\n1.0\n2 2\n";
//! let config = Config::parse(input, RunOptions::default()).unwrap();
//! let rms = ThreadComm::run(4, |comm| {
//!     let mut heat = Heat2DMpi::new(comm, &config).unwrap();
//!     heat.write_output = false;
//!     integrate(&mut heat, 5, None);
//!     heat.temp.norm_rms()
//! });
//! assert!(rms.iter().all(|r| *r == rms[0]));
//! ```
use super::boundary_conditions::enforce_bcs;
use super::functions::get_rhs;
use crate::config::{Config, ConfigError, Scheme};
use crate::mpi::{Communicator, Field2Mpi};
use crate::solver::{LinearSolver, SolveImplicit, SolveInfo};
use crate::Integrate;
use ndarray::{s, Array2, Zip};
use std::path::PathBuf;
use std::time::Instant;

/// Solve 2-dimensional heat equation on a subdomain
pub struct Heat2DMpi<'a> {
    /// Temperature
    pub temp: Field2Mpi<'a>,
    /// Buffer, explicit increment or implicit right hand side
    pub(crate) rhs: Array2<f64>,
    /// Linear solver of the implicit scheme
    pub(crate) solver: Option<LinearSolver>,
    /// Global domain \[xst, xen, yst, yen\]
    pub bounds: [f64; 4],
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

impl<'a> Heat2DMpi<'a> {
    /// Setup solver for `config`, with the smoothed top hat
    /// as initial condition.
    ///
    /// # Errors
    /// Process grid does not fit the communicator or the global grid
    pub fn new(comm: &'a dyn Communicator, config: &Config) -> Result<Self, ConfigError> {
        let mut temp = Field2Mpi::from_config(comm, config)?;
        temp.field.set_tanh_bump();
        enforce_bcs(&mut temp.field.v, &temp.halo.dcp);
        let [nx, ny] = temp.field.shape();
        let solver = match config.run.scheme {
            Scheme::Explicit => None,
            Scheme::Implicit => {
                let rx = config.kdiff * config.dt / (temp.field.dx * temp.field.dx);
                let ry = config.kdiff * config.dt / (temp.field.dy * temp.field.dy);
                Some(LinearSolver::new(
                    config.run.solver,
                    rx,
                    ry,
                    config.run.max_iter,
                    config.run.tol,
                ))
            }
        };
        Ok(Self {
            temp,
            rhs: Array2::zeros((nx, ny)),
            solver,
            bounds: config.bounds,
            kdiff: config.kdiff,
            time: config.tst,
            dt: config.dt,
            step: 0,
            snapshot_step: Some(config.run.snapshot_step),
            output_dir: PathBuf::from("data"),
            write_output: true,
            last_solve: None,
        })
    }

    /// Return current rank
    pub fn nrank(&self) -> usize {
        self.temp.nrank()
    }

    /// Return total number of processors
    pub fn nprocs(&self) -> usize {
        self.temp.topo().size
    }

    /// Forward Euler: T <- T + dt k Lap(T)
    pub fn forward_euler(&mut self) {
        self.temp.exchange();
        get_rhs(
            &self.temp.field,
            &self.temp.halo.ghosts,
            &self.temp.halo.dcp,
            self.kdiff,
            &mut self.rhs,
        );
        let dt = self.dt;
        Zip::from(&mut self.temp.field.v)
            .and(&self.rhs)
            .for_each(|t, r| *t = *t + dt * r);
        enforce_bcs(&mut self.temp.field.v, &self.temp.halo.dcp);
    }

    /// Backward Euler: (I - dt k Lap) T_new = T
    pub fn backward_euler(&mut self, solver: &LinearSolver) {
        let ([i0, i1], [j0, j1]) = self.temp.halo.dcp.interior();
        self.rhs.fill(0.);
        self.rhs
            .slice_mut(s![i0..i1, j0..j1])
            .assign(&self.temp.field.v.slice(s![i0..i1, j0..j1]));
        let info = solver.solve(&mut self.temp.halo, &self.rhs, &mut self.temp.field.v);
        if !info.converged && self.nrank() == 0 {
            log::warn!(
                "step {}: implicit solve stopped at residual {:e}",
                self.step + 1,
                info.residual
            );
        }
        self.last_solve = Some(info);
        enforce_bcs(&mut self.temp.field.v, &self.temp.halo.dcp);
    }
}

impl Integrate for Heat2DMpi<'_> {
    /// Update 1 timestep
    fn update(&mut self) {
        let start = Instant::now();
        match self.solver.take() {
            Some(solver) => {
                self.backward_euler(&solver);
                self.solver = Some(solver);
            }
            None => self.forward_euler(),
        }
        self.step += 1;
        self.time += self.dt;
        log::debug!(
            "rank {}: step {} took {:.3e} s",
            self.nrank(),
            self.step,
            start.elapsed().as_secs_f64()
        );
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
        let rms = self.temp.norm_rms();
        if self.nrank() == 0 {
            log::info!(
                "step = {:6}    time = {:8.5}    |T| = {:10.4e}",
                self.step,
                self.time,
                rms
            );
        }
        if self.write_output {
            self.write_unwrap();
        }
    }

    fn exit(&mut self) -> bool {
        // Break if temperature is nan
        self.temp.norm_rms().is_nan()
    }
}
