//! Thin facade over inter-process (MPI) or intra-process (threads)
//! message passing.
//!
//! All point-to-point calls are *blocking*. The thread backend
//! delivers messages over rendezvous channels, i.e. a send returns
//! only after the partner picked up the message, which is the
//! strictest behaviour a synchronous MPI send may show. A schedule
//! that completes on `ThreadComm` completes on every MPI implementation.
use std::sync::mpsc::{sync_channel, Receiver, SyncSender};

/// Tag reserved for collectives of the thread backend
const TAG_COLLECTIVE: u16 = u16::MAX;

/// Blocking communication interface
pub trait Communicator {
    /// Rank of this process
    fn rank(&self) -> usize;

    /// Number of participating processes
    fn size(&self) -> usize;

    /// Send `buf` to `peer`. Blocks until the message is handed over.
    fn send(&self, peer: usize, tag: u16, buf: &[f64]);

    /// Receive a message from `peer` into `buf`. Blocks until it arrives.
    ///
    /// # Panics
    /// On message length or tag mismatch. Both indicate
    /// that sender and receiver disagree on the exchange order.
    fn receive(&self, peer: usize, tag: u16, buf: &mut [f64]);

    /// Broadcast `buf` from `root` to all processes
    fn broadcast(&self, buf: &mut [f64], root: usize);

    /// Sum `local` over all processes, result is known to everyone
    fn all_reduce_sum(&self, local: f64) -> f64;

    /// Terminate all processes
    fn abort(&self, code: i32) -> !;

    /// Return true on process 0
    fn is_root(&self) -> bool {
        self.rank() == 0
    }
}

/// Single process, no peers
#[derive(Clone, Debug, Default)]
pub struct SerialComm;

impl Communicator for SerialComm {
    fn rank(&self) -> usize {
        0
    }

    fn size(&self) -> usize {
        1
    }

    fn send(&self, peer: usize, _tag: u16, _buf: &[f64]) {
        panic!("SerialComm has no peer {}", peer);
    }

    fn receive(&self, peer: usize, _tag: u16, _buf: &mut [f64]) {
        panic!("SerialComm has no peer {}", peer);
    }

    fn broadcast(&self, _buf: &mut [f64], _root: usize) {}

    fn all_reduce_sum(&self, local: f64) -> f64 {
        local
    }

    fn abort(&self, code: i32) -> ! {
        std::process::exit(code)
    }
}

type Message = (u16, Vec<f64>);

/// One thread per rank, messages over rendezvous channels
pub struct ThreadComm {
    rank: usize,
    /// Sender to each destination (`None` for self)
    to: Vec<Option<SyncSender<Message>>>,
    /// Receiver from each source (`None` for self)
    from: Vec<Option<Receiver<Message>>>,
}

impl ThreadComm {
    /// Create `size` connected communicators, one per rank
    pub fn universe(size: usize) -> Vec<Self> {
        let mut to: Vec<Vec<Option<SyncSender<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        let mut from: Vec<Vec<Option<Receiver<Message>>>> =
            (0..size).map(|_| (0..size).map(|_| None).collect()).collect();
        for src in 0..size {
            for dst in 0..size {
                if src != dst {
                    let (tx, rx) = sync_channel(0);
                    to[src][dst] = Some(tx);
                    from[dst][src] = Some(rx);
                }
            }
        }
        to.into_iter()
            .zip(from)
            .enumerate()
            .map(|(rank, (to, from))| Self { rank, to, from })
            .collect()
    }

    /// Run `f` on `size` ranks, one thread each. Returns the results
    /// ordered by rank.
    ///
    /// # Panics
    /// Propagates the panic of any rank.
    pub fn run<F, R>(size: usize, f: F) -> Vec<R>
    where
        F: Fn(&ThreadComm) -> R + Sync,
        R: Send,
    {
        let comms = Self::universe(size);
        let f = &f;
        std::thread::scope(|scope| {
            let handles: Vec<_> = comms
                .into_iter()
                .map(|comm| scope.spawn(move || f(&comm)))
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                .collect()
        })
    }

    fn sender(&self, peer: usize) -> &SyncSender<Message> {
        self.to
            .get(peer)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("rank {}: invalid destination {}", self.rank, peer))
    }

    fn receiver(&self, peer: usize) -> &Receiver<Message> {
        self.from
            .get(peer)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("rank {}: invalid source {}", self.rank, peer))
    }
}

impl Communicator for ThreadComm {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.to.len()
    }

    fn send(&self, peer: usize, tag: u16, buf: &[f64]) {
        if self.sender(peer).send((tag, buf.to_vec())).is_err() {
            panic!("rank {}: peer {} hung up", self.rank, peer);
        }
    }

    fn receive(&self, peer: usize, tag: u16, buf: &mut [f64]) {
        let (got_tag, data) = self
            .receiver(peer)
            .recv()
            .unwrap_or_else(|_| panic!("rank {}: peer {} hung up", self.rank, peer));
        assert!(
            got_tag == tag,
            "rank {}: expected tag {} from {}, got {}",
            self.rank,
            tag,
            peer,
            got_tag
        );
        assert!(
            data.len() == buf.len(),
            "rank {}: expected {} values from {}, got {}",
            self.rank,
            buf.len(),
            peer,
            data.len()
        );
        buf.copy_from_slice(&data);
    }

    fn broadcast(&self, buf: &mut [f64], root: usize) {
        if self.rank == root {
            for peer in (0..self.size()).filter(|p| *p != root) {
                self.send(peer, TAG_COLLECTIVE, buf);
            }
        } else {
            self.receive(root, TAG_COLLECTIVE, buf);
        }
    }

    fn all_reduce_sum(&self, local: f64) -> f64 {
        // Reduce in rank order, so that all ranks see the same rounding
        let mut sum = [local];
        if self.is_root() {
            let mut part = [0.];
            for peer in 1..self.size() {
                self.receive(peer, TAG_COLLECTIVE, &mut part);
                sum[0] += part[0];
            }
        } else {
            self.send(0, TAG_COLLECTIVE, &sum);
        }
        self.broadcast(&mut sum, 0);
        sum[0]
    }

    fn abort(&self, code: i32) -> ! {
        log::error!("rank {}: abort with code {}", self.rank, code);
        std::process::exit(code)
    }
}

#[cfg(feature = "mpi")]
mod mpi_backend {
    use super::Communicator;
    use ::mpi::collective::SystemOperation;
    use ::mpi::environment::Universe;
    use ::mpi::topology::SimpleCommunicator;
    use ::mpi::traits::{
        Communicator as MpiCommunicator, CommunicatorCollectives, Destination, Root, Source,
    };

    /// Light wrapper around `MPI_COMM_WORLD`
    pub struct MpiComm {
        _universe: Option<Universe>,
        world: SimpleCommunicator,
    }

    impl MpiComm {
        /// Calls `MPI_Init` (unless already initialized)
        pub fn init() -> Self {
            let (world, _universe) = match ::mpi::initialize() {
                Some(universe) => (universe.world(), Some(universe)),
                None => (SimpleCommunicator::world(), None),
            };
            Self { _universe, world }
        }
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    impl Communicator for MpiComm {
        fn rank(&self) -> usize {
            self.world.rank() as usize
        }

        fn size(&self) -> usize {
            self.world.size() as usize
        }

        fn send(&self, peer: usize, tag: u16, buf: &[f64]) {
            self.world
                .process_at_rank(peer as i32)
                .send_with_tag(buf, i32::from(tag));
        }

        fn receive(&self, peer: usize, tag: u16, buf: &mut [f64]) {
            self.world
                .process_at_rank(peer as i32)
                .receive_into_with_tag(buf, i32::from(tag));
        }

        fn broadcast(&self, buf: &mut [f64], root: usize) {
            self.world.process_at_rank(root as i32).broadcast_into(buf);
        }

        fn all_reduce_sum(&self, local: f64) -> f64 {
            let mut global = 0.;
            self.world
                .all_reduce_into(&local, &mut global, SystemOperation::sum());
            global
        }

        fn abort(&self, code: i32) -> ! {
            self.world.abort(code)
        }
    }
}

#[cfg(feature = "mpi")]
pub use mpi_backend::MpiComm;
