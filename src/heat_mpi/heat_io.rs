//! Implement io routines for `Heat2DMpi`
use super::Heat2DMpi;
use crate::io::dat::{write_rows, write_xyz};
use crate::io::Result;
use std::path::PathBuf;

impl Heat2DMpi<'_> {
    /// Solution file of the current step, one per process
    pub fn filename(&self) -> PathBuf {
        self.output_dir
            .join(format!("T_x_y_{:06}_{:04}.dat", self.step, self.nrank()))
    }

    /// Validation snapshot of the current step, one per process
    pub fn snapshot_filename(&self) -> PathBuf {
        self.output_dir.join(format!(
            "parallel_solution_t{}_rank{}.txt",
            self.step,
            self.nrank()
        ))
    }

    /// Write local block as `x y T` lines
    ///
    /// # Errors
    /// Failed to create folder or write file
    pub fn write(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let field = &self.temp.field;
        write_xyz(self.filename(), &field.x, &field.y, &field.v)
    }

    /// Write local block, and handle error
    pub fn write_unwrap(&self) {
        match self.write() {
            Ok(_) => log::debug!("rank {}: wrote {:?}", self.nrank(), self.filename()),
            Err(e) => log::error!(
                "Error while writing file {:?}. Error: {}",
                self.filename(),
                e
            ),
        }
    }

    /// Write local block, one row per i
    ///
    /// # Errors
    /// Failed to create folder or write file
    pub fn write_snapshot(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        write_rows(self.snapshot_filename(), &self.temp.field.v)
    }

    /// Write snapshot, and handle error
    pub fn write_snapshot_unwrap(&self) {
        if let Err(e) = self.write_snapshot() {
            log::error!(
                "Error while writing file {:?}. Error: {}",
                self.snapshot_filename(),
                e
            );
        }
    }

    /// Gather field on root and write temperature, grid and time
    /// to a single hdf5 file
    ///
    /// # Errors
    /// Failed to write
    #[cfg(feature = "hdf5")]
    pub fn write_hdf5(&self, filename: &str) -> Result<()> {
        use crate::field::grid;
        use crate::io::read_write_hdf5::{write_scalar_to_hdf5, write_to_hdf5};
        let global = self.temp.gather();
        if let Some(temp) = global {
            let [nx, ny] = self.temp.dcp().nglob;
            let (x, _) = grid(nx, nx, 0, self.bounds[0], self.bounds[1]);
            let (y, _) = grid(ny, ny, 0, self.bounds[2], self.bounds[3]);
            write_to_hdf5(filename, "temp", &temp)?;
            write_to_hdf5(filename, "x", &x)?;
            write_to_hdf5(filename, "y", &y)?;
            write_scalar_to_hdf5(filename, "time", self.time)?;
            write_scalar_to_hdf5(filename, "kdiff", self.kdiff)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::{Config, RunOptions};
    use crate::heat_mpi::Heat2DMpi;
    use crate::io::dat::read_rows;
    use crate::mpi::{SerialComm, ThreadComm};
    use crate::Integrate;

    #[test]
    fn test_snapshot_files_per_rank() {
        let dir = std::env::temp_dir().join("rustheat_heat_mpi_io");
        let _ = std::fs::remove_dir_all(&dir);
        let input = "8 6\n0 1 0 1\n0 0.01 0.001953125 0.01\n1.0\n2 1\n";
        let mut run = RunOptions::default();
        run.snapshot_step = 2;
        let config = Config::parse(input, run).unwrap();
        let dir_ref = &dir;
        ThreadComm::run(2, |comm| {
            let mut heat = Heat2DMpi::new(comm, &config).unwrap();
            heat.output_dir = dir_ref.clone();
            heat.callback();
            for _ in 0..3 {
                heat.update();
            }
        });
        for rank in 0..2 {
            let snap = read_rows(dir.join(format!("parallel_solution_t2_rank{}.txt", rank))).unwrap();
            assert_eq!(snap.dim(), (4, 6));
            let xyz = std::fs::read_to_string(dir.join(format!("T_x_y_000000_{:04}.dat", rank))).unwrap();
            assert_eq!(xyz.lines().count(), 24);
        }
    }

    #[test]
    fn test_last_step_is_written() {
        let dir = std::env::temp_dir().join("rustheat_heat_mpi_last_step");
        let _ = std::fs::remove_dir_all(&dir);
        let input = "6 6\n0 1 0 1\n0 0.01 0.001953125 0.005859375\n1.0\n1 1\n";
        let config = Config::parse(input, RunOptions::default()).unwrap();
        assert_eq!(config.it_print(), 3);
        let comm = SerialComm;
        let mut heat = Heat2DMpi::new(&comm, &config).unwrap();
        heat.output_dir = dir.clone();
        assert_eq!(crate::integrate(&mut heat, 7, Some(config.it_print())), 7);
        for step in [3, 6, 7] {
            assert!(dir.join(format!("T_x_y_{:06}_0000.dat", step)).exists());
        }
        assert!(!dir.join("T_x_y_000004_0000.dat").exists());
    }
}
