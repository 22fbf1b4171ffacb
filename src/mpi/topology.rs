//! Cartesian process grid
//!
//! Ranks are laid out row by row, `rank = rank_y * px + rank_x`.
use thiserror::Error;

/// Process grid does not match the number of processes
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    /// px * py differs from the number of processes
    #[error("Processor grid {px} x {py} is not consistent with {size} processes")]
    GridMismatch {
        /// Processes along x
        px: usize,
        /// Processes along y
        py: usize,
        /// Total number of processes
        size: usize,
    },
    /// Rank outside of `[0, size)`
    #[error("Rank {rank} out of range for {size} processes")]
    InvalidRank {
        /// Rank
        rank: usize,
        /// Total number of processes
        size: usize,
    },
}

/// Directions of the four neighbors
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Towards lower x
    Left,
    /// Towards higher x
    Right,
    /// Towards lower y
    Bottom,
    /// Towards higher y
    Top,
}

impl Direction {
    /// All directions
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Bottom,
        Direction::Top,
    ];

    /// Direction pointing the other way
    pub fn opposite(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Bottom => Direction::Top,
            Direction::Top => Direction::Bottom,
        }
    }
}

/// Derive process grid coordinates \[rank_x, rank_y\] from a linear rank
pub fn derive_coordinates(rank: usize, px: usize) -> [usize; 2] {
    let rank_y = rank / px;
    let rank_x = rank - rank_y * px;
    [rank_x, rank_y]
}

/// Position of one process within the px x py process grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Topology {
    /// Rank of this process
    pub rank: usize,
    /// Total number of processes
    pub size: usize,
    /// Processes along x
    pub px: usize,
    /// Processes along y
    pub py: usize,
    /// Process coordinate along x
    pub rank_x: usize,
    /// Process coordinate along y
    pub rank_y: usize,
}

impl Topology {
    /// Place `rank` in a `px` x `py` process grid
    ///
    /// # Errors
    /// If `px * py != size` or `rank >= size`
    pub fn new(rank: usize, size: usize, px: usize, py: usize) -> Result<Self, TopologyError> {
        if px * py != size || px == 0 || py == 0 {
            return Err(TopologyError::GridMismatch { px, py, size });
        }
        if rank >= size {
            return Err(TopologyError::InvalidRank { rank, size });
        }
        let [rank_x, rank_y] = derive_coordinates(rank, px);
        Ok(Self {
            rank,
            size,
            px,
            py,
            rank_x,
            rank_y,
        })
    }

    /// Rank of the neighbor in direction `dir`, `None` at the
    /// boundary of the process grid
    pub fn neighbor(&self, dir: Direction) -> Option<usize> {
        match dir {
            Direction::Left => (self.rank_x > 0).then(|| self.rank - 1),
            Direction::Right => (self.rank_x + 1 < self.px).then(|| self.rank + 1),
            Direction::Bottom => (self.rank_y > 0).then(|| self.rank - self.px),
            Direction::Top => (self.rank_y + 1 < self.py).then(|| self.rank + self.px),
        }
    }

    /// Process coordinate along `axis`
    pub fn coord(&self, axis: usize) -> usize {
        [self.rank_x, self.rank_y][axis]
    }

    /// Processes along `axis`
    pub fn procs(&self, axis: usize) -> usize {
        [self.px, self.py][axis]
    }
}
