//! # Domain decomposition
//!
//! The global grid is split into `px` x `py` blocks, one per process.
//! Processes communicate only through a [`Communicator`], either
//! MPI (feature `mpi`), threads, or nothing at all on a single process.
pub mod comm;
pub mod decomp;
pub mod field;
pub mod halo;
pub mod topology;
#[cfg(feature = "mpi")]
pub use comm::MpiComm;
pub use comm::{Communicator, SerialComm, ThreadComm};
pub use decomp::{Decomp2d, DecompError};
pub use field::Field2Mpi;
pub use halo::{GhostBuffers, HaloExchange};
pub use topology::{derive_coordinates, Direction, Topology, TopologyError};
