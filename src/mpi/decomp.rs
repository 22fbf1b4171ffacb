//! Block decomposition of the global grid
//!
//! Every process owns a contiguous block of `nxglob/px` x `nyglob/py`
//! points. `st` and `en` are the (inclusive) global indices of the
//! first and last local point.
use super::topology::Topology;
use thiserror::Error;

/// Global grid can not be split evenly
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecompError {
    /// Number of points not divisible by the number of processes
    #[error("{nglob} points along axis {axis} can not be split on {procs} processes")]
    NotDivisible {
        /// Axis
        axis: usize,
        /// Global number of points
        nglob: usize,
        /// Processes along axis
        procs: usize,
    },
    /// Subdomain must hold at least two points along each axis
    #[error("Subdomain has {n} point(s) along axis {axis}, need at least 2")]
    TooThin {
        /// Axis
        axis: usize,
        /// Local number of points
        n: usize,
    },
}

/// Local index range of one process
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decomp2d {
    /// Global number of points
    pub nglob: [usize; 2],
    /// Global index of the first local point
    pub st: [usize; 2],
    /// Global index of the last local point
    pub en: [usize; 2],
    /// Number of local points
    pub sz: [usize; 2],
}

impl Decomp2d {
    /// Local block of process `topo`
    ///
    /// # Errors
    /// When the global grid is not divisible by the process grid,
    /// or when a block would be thinner than two points.
    pub fn new(topo: &Topology, nglob: [usize; 2]) -> Result<Self, DecompError> {
        let mut st = [0; 2];
        let mut en = [0; 2];
        let mut sz = [0; 2];
        for axis in 0..2 {
            let procs = topo.procs(axis);
            if nglob[axis] % procs != 0 {
                return Err(DecompError::NotDivisible {
                    axis,
                    nglob: nglob[axis],
                    procs,
                });
            }
            let n = nglob[axis] / procs;
            if n < 2 {
                return Err(DecompError::TooThin { axis, n });
            }
            st[axis] = topo.coord(axis) * n;
            en[axis] = (topo.coord(axis) + 1) * n - 1;
            sz[axis] = n;
        }
        Ok(Self { nglob, st, en, sz })
    }

    /// Local block is adjacent to the global boundary at lower x
    pub fn at_left(&self) -> bool {
        self.st[0] == 0
    }

    /// Local block is adjacent to the global boundary at higher x
    pub fn at_right(&self) -> bool {
        self.en[0] == self.nglob[0] - 1
    }

    /// Local block is adjacent to the global boundary at lower y
    pub fn at_bottom(&self) -> bool {
        self.st[1] == 0
    }

    /// Local block is adjacent to the global boundary at higher y
    pub fn at_top(&self) -> bool {
        self.en[1] == self.nglob[1] - 1
    }

    /// Local index ranges `[i0, i1) x [j0, j1)` of points
    /// which are not on the global boundary
    pub fn interior(&self) -> ([usize; 2], [usize; 2]) {
        let i0 = usize::from(self.at_left());
        let i1 = self.sz[0] - usize::from(self.at_right());
        let j0 = usize::from(self.at_bottom());
        let j1 = self.sz[1] - usize::from(self.at_top());
        ([i0, i1], [j0, j1])
    }
}
