//! Heat equation solver (single process)
pub mod boundary_conditions;
pub mod functions;
pub mod heat;
pub mod heat_io;
pub use heat::Heat2D;
