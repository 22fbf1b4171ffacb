//! Run example:
//!
//! cargo run --release -- input2d.in --backend threads --scheme implicit --solver adi
//!
//! With mpi:
//!
//! cargo build --release --features mpi
//! mpirun -np 4 target/release/rustheat input2d.in --backend mpi
//!
//! Set `RUST_LOG=debug` for per process messages.
use clap::Parser;
use rustheat::config::{Config, ConfigError, RunOptions, Scheme};
use rustheat::heat::Heat2D;
use rustheat::heat_mpi::Heat2DMpi;
use rustheat::mpi::{Communicator, SerialComm, ThreadComm};
use rustheat::solver::SolverKind;
use rustheat::{integrate, Integrate};
use std::path::PathBuf;
use std::time::Instant;

/// Communication backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Backend {
    /// One process, process grid must be 1 x 1
    Serial,
    /// One thread per block
    Threads,
    /// One mpi process per block
    #[cfg(feature = "mpi")]
    Mpi,
}

/// Transient 2-D heat diffusion with domain decomposition
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct CliArgs {
    /// Input file
    #[arg(default_value = "input2d.in")]
    input: PathBuf,
    /// Time integration scheme
    #[arg(long, value_enum, default_value_t = Scheme::Explicit)]
    scheme: Scheme,
    /// Linear solver of the implicit scheme
    #[arg(long, value_enum, default_value_t = SolverKind::Jacobi)]
    solver: SolverKind,
    /// Maximum iterations of the linear solver
    #[arg(long, default_value_t = 1000)]
    max_iter: usize,
    /// Tolerance of the linear solver
    #[arg(long, default_value_t = 1e-6)]
    tol: f64,
    /// Write a validation snapshot after this many steps
    #[arg(long, default_value_t = 10)]
    snapshot_step: usize,
    /// Output folder
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,
    /// Communication backend
    #[arg(long, value_enum, default_value_t = Backend::Serial)]
    backend: Backend,
    /// Solve on the full grid without decomposition
    #[arg(long)]
    reference: bool,
}

impl CliArgs {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            scheme: self.scheme,
            solver: self.solver,
            max_iter: self.max_iter,
            tol: self.tol,
            snapshot_step: self.snapshot_step,
        }
    }
}

/// Read and check input on root, then share it with all processes
fn setup(
    comm: &dyn Communicator,
    args: &CliArgs,
    preloaded: Option<&Config>,
) -> Result<Config, ConfigError> {
    let config = if comm.is_root() {
        let loaded = match preloaded {
            Some(config) => Ok(config.clone()),
            None => Config::from_file(&args.input, args.run_options()),
        };
        match loaded.and_then(|config| config.validate(comm.size()).map(|()| config)) {
            Ok(config) => Some(config),
            Err(e) => {
                log::error!("{:?}: {}", args.input, e);
                comm.abort(1)
            }
        }
    } else {
        None
    };
    Config::broadcast(comm, config.as_ref())
}

fn log_timing(steps: usize, start: Instant) {
    let elapsed = start.elapsed().as_secs_f64();
    log::info!("steps: {}", steps);
    log::info!("total time: {:.4e} s", elapsed);
    if steps > 0 {
        log::info!("time per step: {:.4e} s", elapsed / steps as f64);
    }
}

fn run(comm: &dyn Communicator, args: &CliArgs, preloaded: Option<&Config>) -> Result<(), ConfigError> {
    let config = setup(comm, args, preloaded)?;
    let mut heat = Heat2DMpi::new(comm, &config)?;
    heat.output_dir = args.output_dir.clone();
    if heat.nrank() == 0 {
        log::info!(
            "grid {} x {} on {} processes, dt = {:e}, {} steps",
            config.nglob[0],
            config.nglob[1],
            heat.nprocs(),
            config.dt,
            config.num_time_steps()
        );
        if config.run.scheme == Scheme::Explicit && config.dt > config.dt_stable() {
            log::warn!(
                "dt = {:e} exceeds the explicit stability bound {:e}",
                config.dt,
                config.dt_stable()
            );
        }
    }
    heat.callback();
    let start = Instant::now();
    let steps = integrate(&mut heat, config.num_time_steps(), Some(config.it_print()));
    if heat.nrank() == 0 {
        log_timing(steps, start);
    }
    #[cfg(feature = "hdf5")]
    {
        let filename = args.output_dir.join("temp.h5");
        if let Err(e) = heat.write_hdf5(&filename.to_string_lossy()) {
            log::error!("Error while writing {:?}: {}", filename, e);
        }
    }
    Ok(())
}

fn run_reference(args: &CliArgs) -> Result<(), ConfigError> {
    let config = Config::from_file(&args.input, args.run_options())?;
    let mut heat = Heat2D::new(&config);
    heat.output_dir = args.output_dir.clone();
    heat.callback();
    let start = Instant::now();
    let steps = integrate(&mut heat, config.num_time_steps(), Some(config.it_print()));
    log_timing(steps, start);
    Ok(())
}

fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
    let args = CliArgs::parse();
    if args.reference {
        if let Err(e) = run_reference(&args) {
            log::error!("{}", e);
            std::process::exit(1);
        }
        return;
    }
    let result = match args.backend {
        Backend::Serial => run(&SerialComm, &args, None),
        Backend::Threads => match Config::from_file(&args.input, args.run_options())
            .and_then(|config| config.validate(config.procs[0] * config.procs[1]).map(|()| config))
        {
            Ok(config) => {
                let [px, py] = config.procs;
                ThreadComm::run(px * py, |comm| {
                    let preloaded = comm.is_root().then_some(&config);
                    run(comm, &args, preloaded)
                })
                .into_iter()
                .collect()
            }
            Err(e) => Err(e),
        },
        #[cfg(feature = "mpi")]
        Backend::Mpi => {
            let comm = rustheat::mpi::MpiComm::init();
            run(&comm, &args, None)
        }
    };
    if let Err(e) = result {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
