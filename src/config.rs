//! # Startup configuration
//!
//! Read from a whitespace separated input file:
//!
//! ```text
//! nxglob nyglob
//! xst xen yst yen
//! tst ten [dt t_print]
//! kdiff
//! [px py]
//! ```
//!
//! Without `dt`, the largest stable time step of the explicit scheme is
//! taken and the solution is written five times per run. Without
//! `px py`, a single process is assumed.
//!
//! Rank 0 reads the file and broadcasts it, see [`Config::broadcast`].
use crate::mpi::{Communicator, Decomp2d, DecompError, Topology, TopologyError};
use crate::solver::SolverKind;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Number of values of the broadcast buffer
pub const BUFFER_LEN: usize = 18;

/// Invalid or unreadable configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File can not be read
    #[error("Can not read {path}: {source}")]
    Io {
        /// Input file
        path: String,
        /// Cause
        source: std::io::Error,
    },
    /// Malformed line
    #[error("Line {line}: {msg}")]
    Parse {
        /// Line number, starting at 1
        line: usize,
        /// What went wrong
        msg: String,
    },
    /// Global grid too small
    #[error("Need at least two points along axis {axis}, got {n}")]
    TooFewPoints {
        /// Axis
        axis: usize,
        /// Number of points
        n: usize,
    },
    /// Non-positive or non-finite parameter
    #[error("Invalid value of {name}: {value}")]
    InvalidValue {
        /// Parameter
        name: &'static str,
        /// Value
        value: f64,
    },
    /// Broadcast buffer of wrong size or content
    #[error("Corrupt configuration buffer of length {0}")]
    Buffer(usize),
    /// Process grid does not match number of processes
    #[error(transparent)]
    Topology(#[from] TopologyError),
    /// Global grid does not split on the process grid
    #[error(transparent)]
    Decomp(#[from] DecompError),
}

/// Time integration scheme
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Scheme {
    /// Forward Euler
    Explicit,
    /// Backward Euler
    Implicit,
}

/// Options which are not part of the input file
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RunOptions {
    /// Time integration scheme
    pub scheme: Scheme,
    /// Linear solver of the implicit scheme
    pub solver: SolverKind,
    /// Maximum iterations of the linear solver
    pub max_iter: usize,
    /// Tolerance of the linear solver
    pub tol: f64,
    /// Write a validation snapshot after this many steps
    pub snapshot_step: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            scheme: Scheme::Explicit,
            solver: SolverKind::Jacobi,
            max_iter: 1000,
            tol: 1e-6,
            snapshot_step: 10,
        }
    }
}

/// Problem setup, identical on all processes
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Global number of points \[nxglob, nyglob\]
    pub nglob: [usize; 2],
    /// Global domain \[xst, xen, yst, yen\]
    pub bounds: [f64; 4],
    /// Start time
    pub tst: f64,
    /// End time
    pub ten: f64,
    /// Time step size
    pub dt: f64,
    /// Time between solution outputs
    pub t_print: Option<f64>,
    /// Diffusivity
    pub kdiff: f64,
    /// Process grid \[px, py\]
    pub procs: [usize; 2],
    /// Run options
    pub run: RunOptions,
}

/// Parse whitespace separated values of one line
fn values<T: FromStr>(line: usize, text: &str, min: usize, max: usize) -> Result<Vec<T>, ConfigError> {
    let vals = text
        .split_whitespace()
        .map(|s| {
            s.parse::<T>().map_err(|_| ConfigError::Parse {
                line,
                msg: format!("can not parse {:?}", s),
            })
        })
        .collect::<Result<Vec<T>, ConfigError>>()?;
    if vals.len() < min || vals.len() > max {
        return Err(ConfigError::Parse {
            line,
            msg: format!("expected {} to {} values, got {}", min, max, vals.len()),
        });
    }
    Ok(vals)
}

impl Config {
    /// Read configuration from input file
    ///
    /// # Errors
    /// File not readable or malformed
    pub fn from_file<P: AsRef<Path>>(path: P, run: RunOptions) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text, run)
    }

    /// Parse content of an input file
    ///
    /// # Errors
    /// Missing lines or values which can not be parsed
    ///
    /// # Example
    ///```
    /// use rustheat::config::{Config, RunOptions};
    /// let input = "8 8\n0 1 0 1\n0 0.5 0.0078125 0.0625\n1.0\n2 2\n";
    /// let config = Config::parse(input, RunOptions::default()).unwrap();
    /// assert_eq!(config.procs, [2, 2]);
    /// assert_eq!(config.num_time_steps(), 65);
    /// assert_eq!(config.it_print(), 8);
    ///```
    pub fn parse(text: &str, run: RunOptions) -> Result<Self, ConfigError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l))
            .filter(|(_, l)| !l.trim().is_empty());
        let mut next = |what: &str| {
            lines.next().ok_or_else(|| ConfigError::Parse {
                line: 0,
                msg: format!("missing line with {}", what),
            })
        };

        let (l, text) = next("nxglob nyglob")?;
        let n = values::<usize>(l, text, 2, 2)?;
        let (l, text) = next("xst xen yst yen")?;
        let b = values::<f64>(l, text, 4, 4)?;
        let (l, text) = next("tst ten [dt t_print]")?;
        let t = values::<f64>(l, text, 2, 4)?;
        if t.len() == 3 {
            return Err(ConfigError::Parse {
                line: l,
                msg: "dt requires t_print".to_string(),
            });
        }
        let (l, text) = next("kdiff")?;
        let kdiff = values::<f64>(l, text, 1, 1)?[0];
        let procs = match next("px py") {
            Ok((l, text)) => {
                let p = values::<usize>(l, text, 2, 2)?;
                [p[0], p[1]]
            }
            Err(_) => [1, 1],
        };

        let nglob = [n[0], n[1]];
        for (axis, n) in nglob.iter().enumerate() {
            if *n < 2 {
                return Err(ConfigError::TooFewPoints { axis, n: *n });
            }
        }
        if !(kdiff > 0.) {
            return Err(ConfigError::InvalidValue {
                name: "kdiff",
                value: kdiff,
            });
        }
        let bounds = [b[0], b[1], b[2], b[3]];
        // Domain length must be positive and finite
        for (name, length) in [("xen - xst", b[1] - b[0]), ("yen - yst", b[3] - b[2])] {
            if !(length > 0.) || !length.is_finite() {
                return Err(ConfigError::InvalidValue {
                    name,
                    value: length,
                });
            }
        }
        let (dt, t_print) = if t.len() == 4 {
            (t[2], Some(t[3]))
        } else {
            let dx = (bounds[1] - bounds[0]) / (nglob[0] - 1) as f64;
            let dy = (bounds[3] - bounds[2]) / (nglob[1] - 1) as f64;
            let h = dx.min(dy);
            (0.25 / kdiff * (h * h), None)
        };
        if !(dt > 0.) || !dt.is_finite() {
            return Err(ConfigError::InvalidValue {
                name: "dt",
                value: dt,
            });
        }
        Ok(Self {
            nglob,
            bounds,
            tst: t[0],
            ten: t[1],
            dt,
            t_print,
            kdiff,
            procs,
            run,
        })
    }

    /// Number of time steps
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn num_time_steps(&self) -> usize {
        ((self.ten - self.tst) / self.dt) as usize + 1
    }

    /// Write solution every `it_print` time steps
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn it_print(&self) -> usize {
        let it = match self.t_print {
            Some(t_print) => (t_print / self.dt) as usize,
            None => self.num_time_steps() / 5,
        };
        it.max(1)
    }

    /// Grid spacing \[dx, dy\]
    pub fn spacing(&self) -> [f64; 2] {
        [
            (self.bounds[1] - self.bounds[0]) / (self.nglob[0] - 1) as f64,
            (self.bounds[3] - self.bounds[2]) / (self.nglob[1] - 1) as f64,
        ]
    }

    /// Largest stable time step of the explicit scheme
    pub fn dt_stable(&self) -> f64 {
        let [dx, dy] = self.spacing();
        let h = dx.min(dy);
        0.25 * h * h / self.kdiff
    }

    /// Check that the grid splits on `size` processes
    ///
    /// # Errors
    /// `px * py != size`, or a subdomain would be uneven or too thin
    pub fn validate(&self, size: usize) -> Result<(), ConfigError> {
        let [px, py] = self.procs;
        // All blocks have the same extent, checking one suffices
        let topo = Topology::new(0, size, px, py)?;
        Decomp2d::new(&topo, self.nglob)?;
        Ok(())
    }

    /// Encode as flat buffer
    pub fn to_buffer(&self) -> Vec<f64> {
        let scheme = match self.run.scheme {
            Scheme::Explicit => 0.,
            Scheme::Implicit => 1.,
        };
        let solver = match self.run.solver {
            SolverKind::Jacobi => 0.,
            SolverKind::GaussSeidel => 1.,
            SolverKind::Adi => 2.,
        };
        vec![
            self.nglob[0] as f64,
            self.nglob[1] as f64,
            self.bounds[0],
            self.bounds[1],
            self.bounds[2],
            self.bounds[3],
            self.tst,
            self.ten,
            self.dt,
            self.t_print.unwrap_or(f64::NAN),
            self.kdiff,
            self.procs[0] as f64,
            self.procs[1] as f64,
            scheme,
            solver,
            self.run.max_iter as f64,
            self.run.tol,
            self.run.snapshot_step as f64,
        ]
    }

    /// Decode from flat buffer, see [`Config::to_buffer`]
    ///
    /// # Errors
    /// Wrong buffer length or unknown scheme/solver code
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_buffer(buf: &[f64]) -> Result<Self, ConfigError> {
        if buf.len() != BUFFER_LEN {
            return Err(ConfigError::Buffer(buf.len()));
        }
        let scheme = match buf[13] as usize {
            0 => Scheme::Explicit,
            1 => Scheme::Implicit,
            _ => return Err(ConfigError::Buffer(buf.len())),
        };
        let solver = match buf[14] as usize {
            0 => SolverKind::Jacobi,
            1 => SolverKind::GaussSeidel,
            2 => SolverKind::Adi,
            _ => return Err(ConfigError::Buffer(buf.len())),
        };
        Ok(Self {
            nglob: [buf[0] as usize, buf[1] as usize],
            bounds: [buf[2], buf[3], buf[4], buf[5]],
            tst: buf[6],
            ten: buf[7],
            dt: buf[8],
            t_print: (!buf[9].is_nan()).then(|| buf[9]),
            kdiff: buf[10],
            procs: [buf[11] as usize, buf[12] as usize],
            run: RunOptions {
                scheme,
                solver,
                max_iter: buf[15] as usize,
                tol: buf[16],
                snapshot_step: buf[17] as usize,
            },
        })
    }

    /// Distribute the configuration of rank 0 to all processes.
    /// Only the root needs to supply `config`.
    ///
    /// # Errors
    /// Received buffer is corrupt
    pub fn broadcast(comm: &dyn Communicator, config: Option<&Self>) -> Result<Self, ConfigError> {
        let mut buf = config.map_or_else(|| vec![0.; BUFFER_LEN], Self::to_buffer);
        comm.broadcast(&mut buf, 0);
        Self::from_buffer(&buf)
    }
}
