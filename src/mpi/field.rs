//! # Field of one subdomain
//! Local block of the temperature field together with its
//! position in the process grid and the halo exchange to its neighbors.
//!
//! `Field2Mpi` is the per-process context which is handed to all
//! distributed routines.
use super::comm::Communicator;
use super::decomp::Decomp2d;
use super::halo::HaloExchange;
use super::topology::{derive_coordinates, Direction, Topology};
use crate::config::{Config, ConfigError};
use crate::field::Field2;
use ndarray::{s, Array2};

/// Tag of gather messages
const TAG_GATHER: u16 = 20;

/// Distributed two dimensional field
pub struct Field2Mpi<'a> {
    /// Local block (values and coordinates)
    pub field: Field2,
    /// Ghost values and exchange with neighbors
    pub halo: HaloExchange<'a>,
}

impl<'a> Field2Mpi<'a> {
    /// Return zero field on the block of `topo`
    pub fn new(comm: &'a dyn Communicator, topo: Topology, dcp: Decomp2d, bounds: [f64; 4]) -> Self {
        let field = Field2::new(dcp.sz, dcp.nglob, dcp.st, bounds);
        log::debug!(
            "rank {} at ({}, {}): i {}..={} of {}, j {}..={} of {}",
            topo.rank,
            topo.rank_x,
            topo.rank_y,
            dcp.st[0],
            dcp.en[0],
            dcp.nglob[0],
            dcp.st[1],
            dcp.en[1],
            dcp.nglob[1],
        );
        log::debug!(
            "rank {}: x {:.6}..{:.6}, y {:.6}..{:.6}, dx {:e}, dy {:e}",
            topo.rank,
            field.x[0],
            field.x[field.x.len() - 1],
            field.y[0],
            field.y[field.y.len() - 1],
            field.dx,
            field.dy,
        );
        log::debug!(
            "rank {}: neighbors left, right, bottom, top {:?}",
            topo.rank,
            Direction::ALL.map(|d| topo.neighbor(d)),
        );
        Self {
            field,
            halo: HaloExchange::new(comm, topo, dcp),
        }
    }

    /// Return zero field of this process for the setup in `config`
    ///
    /// # Errors
    /// Process grid does not fit the communicator or the global grid
    pub fn from_config(comm: &'a dyn Communicator, config: &Config) -> Result<Self, ConfigError> {
        let [px, py] = config.procs;
        let topo = Topology::new(comm.rank(), comm.size(), px, py)?;
        let dcp = Decomp2d::new(&topo, config.nglob)?;
        Ok(Self::new(comm, topo, dcp, config.bounds))
    }

    /// Communicator
    pub fn comm(&self) -> &'a dyn Communicator {
        self.halo.comm()
    }

    /// Position in the process grid
    pub fn topo(&self) -> &Topology {
        &self.halo.topo
    }

    /// Local index range
    pub fn dcp(&self) -> &Decomp2d {
        &self.halo.dcp
    }

    /// Rank of this process
    pub fn nrank(&self) -> usize {
        self.halo.topo.rank
    }

    /// Refresh all four ghost buffers from the current field values
    pub fn exchange(&mut self) {
        self.halo.exchange_all(&self.field.v);
    }

    /// Global root mean square of the field
    pub fn norm_rms(&self) -> f64 {
        let local: f64 = self.field.v.iter().map(|x| x * x).sum();
        let global = self.comm().all_reduce_sum(local);
        let [nx, ny] = self.halo.dcp.nglob;
        (global / (nx * ny) as f64).sqrt()
    }

    /// Collect the global field on root.
    /// Returns `None` on all other processes.
    ///
    /// # Info
    /// Must be called from all processors
    pub fn gather(&self) -> Option<Array2<f64>> {
        let comm = self.comm();
        let topo = &self.halo.topo;
        let dcp = &self.halo.dcp;
        if !comm.is_root() {
            let buf: Vec<f64> = self.field.v.iter().copied().collect();
            comm.send(0, TAG_GATHER, &buf);
            return None;
        }
        let [nx, ny] = dcp.nglob;
        let mut global = Array2::zeros((nx, ny));
        global
            .slice_mut(s![dcp.st[0]..=dcp.en[0], dcp.st[1]..=dcp.en[1]])
            .assign(&self.field.v);
        let mut buf = vec![0.; dcp.sz[0] * dcp.sz[1]];
        for rank in 1..topo.size {
            // All blocks have the same shape
            let [rank_x, rank_y] = derive_coordinates(rank, topo.px);
            let i0 = rank_x * dcp.sz[0];
            let j0 = rank_y * dcp.sz[1];
            comm.receive(rank, TAG_GATHER, &mut buf);
            let mut block = global.slice_mut(s![i0..i0 + dcp.sz[0], j0..j0 + dcp.sz[1]]);
            for (g, b) in block.iter_mut().zip(buf.iter()) {
                *g = *b;
            }
        }
        Some(global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpi::ThreadComm;

    #[test]
    fn test_gather_reassembles_global_field() {
        let (px, py, nglob) = (2, 3, [6, 9]);
        let got = ThreadComm::run(px * py, |comm| {
            let topo = Topology::new(comm.rank(), comm.size(), px, py).unwrap();
            let dcp = Decomp2d::new(&topo, nglob).unwrap();
            let mut field = Field2Mpi::new(comm, topo, dcp, [0., 1., 0., 1.]);
            for ((i, j), v) in field.field.v.indexed_iter_mut() {
                *v = ((dcp.st[0] + i) * 100 + dcp.st[1] + j) as f64;
            }
            field.gather()
        });
        let global = got[0].as_ref().unwrap();
        assert!(got[1..].iter().all(Option::is_none));
        for ((i, j), v) in global.indexed_iter() {
            assert_eq!(*v, (i * 100 + j) as f64);
        }
    }

    #[test]
    fn test_norm_rms_is_global() {
        let got = ThreadComm::run(2, |comm| {
            let topo = Topology::new(comm.rank(), comm.size(), 2, 1).unwrap();
            let dcp = Decomp2d::new(&topo, [4, 2]).unwrap();
            let mut field = Field2Mpi::new(comm, topo, dcp, [0., 1., 0., 1.]);
            field.field.v.fill(if comm.rank() == 0 { 1. } else { 3. });
            field.norm_rms()
        });
        for rms in got {
            assert!((rms - 5f64.sqrt()).abs() < 1e-14);
        }
    }
}
