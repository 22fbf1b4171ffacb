//! # `rustheat`: Finite difference solver for the 2-D heat equation
//!
//! Solves dT/dt = k (d2T/dx2 + d2T/dy2) on a rectangle with
//! homogeneous Dirichlet boundaries. The global grid is split into
//! `px x py` equal blocks, one per process, which trade one layer of
//! edge values with their neighbors every step.
//!
//! # Dependencies
//! - cargo >= v1.62
//! - `hdf5` (only with feature `hdf5`, sudo apt-get install -y libhdf5-dev)
//! - mpi installation and libclang (only with feature `mpi`)
//!
//! Without the `mpi` feature, decomposed runs use one thread per block,
//! see [`mpi::ThreadComm`].
//!
//! ## Implemented solver
//!
//! - `Distributed solver`, see [`heat_mpi::Heat2DMpi`]
//! - `Single process reference`, see [`heat::Heat2D`]
//!
//! Time stepping is forward Euler (explicit, stable for
//! dt <= h^2 / (4 k)) or backward Euler. The linear systems of
//! backward Euler are solved by one of [`solver::LinearSolver`]:
//! - `Jacobi`
//! - `Gauss-Seidel`
//! - `Adi`, a single alternating direction sweep per step
//!
//! # Example
//! Explicit run on four threads
//! ```
//! use rustheat::config::{Config, RunOptions};
//! use rustheat::heat_mpi::Heat2DMpi;
//! use rustheat::integrate;
//! use rustheat::mpi::ThreadComm;
//!
//! let input = "32 32\n0 1 0 1\n0 0.01\n1.0\n2 2\n";
//! let config = Config::parse(input, RunOptions::default()).unwrap();
//! ThreadComm::run(4, |comm| {
//!     let mut heat = Heat2DMpi::new(comm, &config).unwrap();
//!     heat.write_output = false;
//!     integrate(&mut heat, config.num_time_steps(), None);
//! });
//! ```
//!
//! ## Input file
//!
//! ```text
//! nxglob nyglob
//! xst xen yst yen
//! tst ten [dt t_print]
//! kdiff
//! px py
//! ```
//! Without `dt`, the largest stable explicit step is used.
//!
//! ## Documentation
//!
//! Download and run:
//!
//! `cargo doc --open`
#![warn(missing_docs)]
#![allow(clippy::unnecessary_cast)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]
#[macro_use]
extern crate enum_dispatch;
pub mod config;
pub mod field;
pub mod heat;
pub mod heat_mpi;
pub mod io;
pub mod mpi;
pub mod solver;

const MAX_TIMESTEP: usize = 10_000_000;

/// Integrate trait, step forward in time, and write results
pub trait Integrate {
    /// Update solution
    fn update(&mut self);
    /// Receive current time
    fn get_time(&self) -> f64;
    /// Get timestep
    fn get_dt(&self) -> f64;
    /// Callback function (can be used for i/o)
    fn callback(&mut self);
    /// Additional break criteria
    fn exit(&mut self) -> bool;
}

/// Integrate pde, that implements the Integrate trait.
///
/// Specify `save_every` to call `callback` every n-th step, and
/// after the last step. Returns the number of steps taken.
///
/// Stop Criteria:
/// 1. Step limit
/// 2. Timestep limit
/// 3. `exit` of the pde
pub fn integrate<T: Integrate>(pde: &mut T, num_steps: usize, save_every: Option<usize>) -> usize {
    let mut timestep: usize = 0;
    while timestep < num_steps {
        // Update
        pde.update();
        timestep += 1;

        // Save
        if let Some(every) = save_every {
            if every > 0 && timestep % every == 0 {
                pde.callback();
            }
        }

        // Break
        if timestep >= MAX_TIMESTEP {
            log::warn!("timestep limit reached: {:?}", timestep);
            break;
        }
        if pde.exit() {
            log::warn!("break criteria triggered at time {:?}", pde.get_time());
            break;
        }
    }
    // Final state
    if let Some(every) = save_every {
        if every > 0 && timestep % every != 0 {
            pde.callback();
        }
    }
    log::debug!("integrated {} steps up to time {:?}", timestep, pde.get_time());
    timestep
}
