//! Ghost cell (halo) exchange between neighboring subdomains
//!
//! Every process holds one layer of ghost values per side. An exchange
//! along an axis runs two phases: first data flows towards lower ranks,
//! then towards higher ranks. Within a phase, processes with an even
//! coordinate along the axis send before they receive, odd processes
//! receive before they send. Every send is thus matched by a receive
//! posted in the same round, independent of the process grid size.
use super::comm::Communicator;
use super::decomp::Decomp2d;
use super::topology::{Direction, Topology};
use crate::solver::Halo;
use ndarray::{Array1, Array2};

/// Tag of messages travelling in direction `dir`
fn tag(dir: Direction) -> u16 {
    match dir {
        Direction::Left => 10,
        Direction::Right => 11,
        Direction::Bottom => 12,
        Direction::Top => 13,
    }
}

/// One blocking call of a halo exchange
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transfer {
    /// Send the local edge facing `dir` to `peer`
    Send {
        /// Side of the neighbor
        dir: Direction,
        /// Rank of the neighbor
        peer: usize,
        /// Message tag
        tag: u16,
    },
    /// Receive the ghost layer on side `dir` from `peer`
    Receive {
        /// Side of the neighbor
        dir: Direction,
        /// Rank of the neighbor
        peer: usize,
        /// Message tag
        tag: u16,
    },
}

/// Ordered transfers of an exchange along `axis` (0: x, 1: y)
pub fn schedule(topo: &Topology, axis: usize) -> Vec<Transfer> {
    let (lower, upper) = if axis == 0 {
        (Direction::Left, Direction::Right)
    } else {
        (Direction::Bottom, Direction::Top)
    };
    let even = topo.coord(axis) % 2 == 0;
    let mut transfers = Vec::with_capacity(4);
    for flow in [lower, upper] {
        let send = topo.neighbor(flow).map(|peer| Transfer::Send {
            dir: flow,
            peer,
            tag: tag(flow),
        });
        let recv = topo.neighbor(flow.opposite()).map(|peer| Transfer::Receive {
            dir: flow.opposite(),
            peer,
            tag: tag(flow),
        });
        let pair = if even { [send, recv] } else { [recv, send] };
        transfers.extend(pair.into_iter().flatten());
    }
    transfers
}

/// Ghost values received from the four neighbors
///
/// `left`/`right` run along y (length ny), `bottom`/`top` run along x
/// (length nx). Sides without neighbor are never read.
#[derive(Clone, Debug)]
pub struct GhostBuffers {
    /// Last column of the left neighbor
    pub left: Array1<f64>,
    /// First column of the right neighbor
    pub right: Array1<f64>,
    /// Last row of the bottom neighbor
    pub bottom: Array1<f64>,
    /// First row of the top neighbor
    pub top: Array1<f64>,
}

impl GhostBuffers {
    /// Zero ghost buffers for a `nx` x `ny` subdomain
    pub fn new(nx: usize, ny: usize) -> Self {
        Self {
            left: Array1::zeros(ny),
            right: Array1::zeros(ny),
            bottom: Array1::zeros(nx),
            top: Array1::zeros(nx),
        }
    }

    fn side_mut(&mut self, dir: Direction) -> &mut Array1<f64> {
        match dir {
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
            Direction::Bottom => &mut self.bottom,
            Direction::Top => &mut self.top,
        }
    }

    /// Values west, east, south and north of local point `(i, j)`.
    /// Points outside the local array are taken from the ghost layer.
    #[inline]
    pub fn around(&self, v: &Array2<f64>, i: usize, j: usize) -> [f64; 4] {
        let (nx, ny) = v.dim();
        let w = if i > 0 { v[[i - 1, j]] } else { self.left[j] };
        let e = if i + 1 < nx { v[[i + 1, j]] } else { self.right[j] };
        let s = if j > 0 { v[[i, j - 1]] } else { self.bottom[i] };
        let n = if j + 1 < ny { v[[i, j + 1]] } else { self.top[i] };
        [w, e, s, n]
    }
}

/// Halo exchange of one subdomain
pub struct HaloExchange<'a> {
    comm: &'a dyn Communicator,
    /// Position in the process grid
    pub topo: Topology,
    /// Local index range
    pub dcp: Decomp2d,
    /// Received ghost values
    pub ghosts: GhostBuffers,
    schedule: [Vec<Transfer>; 2],
    sendbuf: [Vec<f64>; 2],
    recvbuf: [Vec<f64>; 2],
}

impl<'a> HaloExchange<'a> {
    /// Setup buffers and exchange schedule
    pub fn new(comm: &'a dyn Communicator, topo: Topology, dcp: Decomp2d) -> Self {
        let [nx, ny] = dcp.sz;
        Self {
            comm,
            topo,
            dcp,
            ghosts: GhostBuffers::new(nx, ny),
            schedule: [schedule(&topo, 0), schedule(&topo, 1)],
            sendbuf: [vec![0.; ny], vec![0.; nx]],
            recvbuf: [vec![0.; ny], vec![0.; nx]],
        }
    }

    /// Communicator
    pub fn comm(&self) -> &'a dyn Communicator {
        self.comm
    }

    /// Exchange the edges of `v` along x (`axis = 0`) or y (`axis = 1`)
    pub fn exchange_axis(&mut self, v: &Array2<f64>, axis: usize) {
        for transfer in &self.schedule[axis] {
            match *transfer {
                Transfer::Send { dir, peer, tag } => {
                    let buf = &mut self.sendbuf[axis];
                    pack(v, dir, buf);
                    self.comm.send(peer, tag, buf);
                }
                Transfer::Receive { dir, peer, tag } => {
                    let buf = &mut self.recvbuf[axis];
                    self.comm.receive(peer, tag, buf);
                    for (g, r) in self.ghosts.side_mut(dir).iter_mut().zip(buf.iter()) {
                        *g = *r;
                    }
                }
            }
        }
    }

    /// Exchange all four edges of `v`
    pub fn exchange_all(&mut self, v: &Array2<f64>) {
        self.exchange_axis(v, 0);
        self.exchange_axis(v, 1);
    }
}

/// Copy the edge of `v` facing `dir` into `buf`
fn pack(v: &Array2<f64>, dir: Direction, buf: &mut [f64]) {
    let (nx, ny) = v.dim();
    let edge = match dir {
        Direction::Left => v.row(0),
        Direction::Right => v.row(nx - 1),
        Direction::Bottom => v.column(0),
        Direction::Top => v.column(ny - 1),
    };
    for (b, e) in buf.iter_mut().zip(edge.iter()) {
        *b = *e;
    }
}

impl Halo for HaloExchange<'_> {
    fn exchange(&mut self, v: &Array2<f64>) {
        self.exchange_all(v);
    }

    fn ghosts(&self) -> &GhostBuffers {
        &self.ghosts
    }

    fn interior(&self) -> ([usize; 2], [usize; 2]) {
        self.dcp.interior()
    }

    fn global_sum(&self, local: f64) -> f64 {
        self.comm.all_reduce_sum(local)
    }

    fn global_count(&self) -> usize {
        self.dcp.nglob[0] * self.dcp.nglob[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpi::comm::ThreadComm;
    use std::collections::VecDeque;

    /// Match transfers of all ranks with rendezvous semantics.
    /// Returns the number of rounds, or `None` on deadlock.
    fn simulate(schedules: Vec<Vec<Transfer>>) -> Option<usize> {
        let mut queues: Vec<VecDeque<Transfer>> =
            schedules.into_iter().map(VecDeque::from).collect();
        let mut rounds = 0;
        while queues.iter().any(|q| !q.is_empty()) {
            let mut matched = Vec::new();
            for (a, q) in queues.iter().enumerate() {
                if let Some(Transfer::Send { peer, tag, .. }) = q.front() {
                    if let Some(Transfer::Receive {
                        peer: src, tag: t, ..
                    }) = queues[*peer].front()
                    {
                        if *src == a && t == tag {
                            matched.push((a, *peer));
                        }
                    }
                }
            }
            if matched.is_empty() {
                return None;
            }
            for (a, b) in matched {
                queues[a].pop_front();
                queues[b].pop_front();
            }
            rounds += 1;
        }
        Some(rounds)
    }

    fn schedules(px: usize, py: usize, axis: usize) -> Vec<Vec<Transfer>> {
        (0..px * py)
            .map(|rank| schedule(&Topology::new(rank, px * py, px, py).unwrap(), axis))
            .collect()
    }

    #[test]
    fn schedule_completes_in_constant_rounds() {
        for (px, py) in [(1, 1), (2, 1), (1, 2), (3, 2), (8, 1), (1, 7), (5, 4)] {
            for axis in 0..2 {
                let rounds = simulate(schedules(px, py, axis));
                assert!(
                    matches!(rounds, Some(r) if r <= 4),
                    "{}x{} axis {}: {:?}",
                    px,
                    py,
                    axis,
                    rounds
                );
            }
        }
    }

    #[test]
    fn schedule_sends_and_receives_balance() {
        let sched = schedules(4, 3, 0);
        let sends = sched
            .iter()
            .flatten()
            .filter(|t| matches!(t, Transfer::Send { .. }))
            .count();
        let recvs = sched
            .iter()
            .flatten()
            .filter(|t| matches!(t, Transfer::Receive { .. }))
            .count();
        // 3 horizontal links per row, two directions each
        assert_eq!(sends, 3 * 3 * 2);
        assert_eq!(sends, recvs);
    }

    #[test]
    fn mismatched_phase_order_deadlocks() {
        let mut sched = schedules(2, 1, 0);
        // rank 1 exchanges towards the right before towards the left
        assert_eq!(sched[1].len(), 2);
        sched[1].reverse();
        assert_eq!(simulate(sched), None);
    }

    fn linear(v: &mut Array2<f64>, dcp: &Decomp2d) {
        for ((i, j), x) in v.indexed_iter_mut() {
            *x = (dcp.st[0] + i) as f64 + 100. * (dcp.st[1] + j) as f64;
        }
    }

    #[test]
    fn ghosts_2x1_hold_neighbor_edges() {
        let (px, py, nglob) = (2, 1, [6, 4]);
        let ghosts = ThreadComm::run(px * py, |comm| {
            let topo = Topology::new(comm.rank(), comm.size(), px, py).unwrap();
            let dcp = Decomp2d::new(&topo, nglob).unwrap();
            let mut v = Array2::zeros((dcp.sz[0], dcp.sz[1]));
            linear(&mut v, &dcp);
            let mut halo = HaloExchange::new(comm, topo, dcp);
            halo.exchange_all(&v);
            halo.ghosts
        });
        for j in 0..4 {
            // left neighbor's last column is global i = 2
            assert!((ghosts[1].left[j] - (2. + 100. * j as f64)).abs() < 1e-14);
            // right neighbor's first column is global i = 3
            assert!((ghosts[0].right[j] - (3. + 100. * j as f64)).abs() < 1e-14);
        }
    }

    #[test]
    fn ghosts_1x2_hold_neighbor_edges() {
        let (px, py, nglob) = (1, 2, [3, 8]);
        let ghosts = ThreadComm::run(px * py, |comm| {
            let topo = Topology::new(comm.rank(), comm.size(), px, py).unwrap();
            let dcp = Decomp2d::new(&topo, nglob).unwrap();
            let mut v = Array2::zeros((dcp.sz[0], dcp.sz[1]));
            linear(&mut v, &dcp);
            let mut halo = HaloExchange::new(comm, topo, dcp);
            halo.exchange_all(&v);
            halo.ghosts
        });
        for i in 0..3 {
            assert!((ghosts[1].bottom[i] - (i as f64 + 300.)).abs() < 1e-14);
            assert!((ghosts[0].top[i] - (i as f64 + 400.)).abs() < 1e-14);
        }
    }

    #[test]
    fn ghosts_3x3_match_global_field() {
        let (px, py, nglob) = (3, 3, [9, 6]);
        let results = ThreadComm::run(px * py, |comm| {
            let topo = Topology::new(comm.rank(), comm.size(), px, py).unwrap();
            let dcp = Decomp2d::new(&topo, nglob).unwrap();
            let mut v = Array2::zeros((dcp.sz[0], dcp.sz[1]));
            linear(&mut v, &dcp);
            let mut halo = HaloExchange::new(comm, topo, dcp);
            // twice, buffers are overwritten and not accumulated
            halo.exchange_all(&v);
            halo.exchange_all(&v);
            (topo, dcp, halo.ghosts)
        });
        let global = |i: usize, j: usize| i as f64 + 100. * j as f64;
        for (topo, dcp, g) in &results {
            for j in 0..dcp.sz[1] {
                let jg = dcp.st[1] + j;
                if topo.neighbor(Direction::Left).is_some() {
                    assert_eq!(g.left[j], global(dcp.st[0] - 1, jg));
                }
                if topo.neighbor(Direction::Right).is_some() {
                    assert_eq!(g.right[j], global(dcp.en[0] + 1, jg));
                }
            }
            for i in 0..dcp.sz[0] {
                let ig = dcp.st[0] + i;
                if topo.neighbor(Direction::Bottom).is_some() {
                    assert_eq!(g.bottom[i], global(ig, dcp.st[1] - 1));
                }
                if topo.neighbor(Direction::Top).is_some() {
                    assert_eq!(g.top[i], global(ig, dcp.en[1] + 1));
                }
            }
        }
    }

    #[test]
    fn around_uses_ghosts_outside_local_block() {
        let v = Array2::from_shape_fn((2, 2), |(i, j)| (10 * i + j) as f64);
        let mut g = GhostBuffers::new(2, 2);
        g.left.fill(-1.);
        g.right.fill(-2.);
        g.bottom.fill(-3.);
        g.top.fill(-4.);
        assert_eq!(g.around(&v, 0, 0), [-1., 10., -3., 1.]);
        assert_eq!(g.around(&v, 1, 1), [1., -2., 10., -4.]);
    }
}
