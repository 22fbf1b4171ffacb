//! Implement io routines for `Heat2D`
use super::Heat2D;
use crate::io::dat::{write_rows, write_xyz};
use crate::io::Result;
use std::path::PathBuf;

impl Heat2D {
    /// Solution file of the current step
    pub fn filename(&self) -> PathBuf {
        self.output_dir.join(format!("T_x_y_{:06}.dat", self.step))
    }

    /// Validation snapshot of the current step
    pub fn snapshot_filename(&self) -> PathBuf {
        self.output_dir
            .join(format!("serial_solution_t{}.txt", self.step))
    }

    /// Write field as `x y T` lines
    ///
    /// # Errors
    /// Failed to create folder or write file
    pub fn write(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        write_xyz(self.filename(), &self.temp.x, &self.temp.y, &self.temp.v)
    }

    /// Write field, and handle error
    pub fn write_unwrap(&self) {
        match self.write() {
            Ok(_) => log::debug!("wrote {:?}", self.filename()),
            Err(e) => log::error!(
                "Error while writing file {:?}. Error: {}",
                self.filename(),
                e
            ),
        }
    }

    /// Write field, one row per i
    ///
    /// # Errors
    /// Failed to create folder or write file
    pub fn write_snapshot(&self) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        write_rows(self.snapshot_filename(), &self.temp.v)
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

    /// Write temperature, grid and time to hdf5 file
    ///
    /// # Errors
    /// Failed to write
    #[cfg(feature = "hdf5")]
    pub fn write_hdf5(&self, filename: &str) -> Result<()> {
        use crate::io::read_write_hdf5::{write_scalar_to_hdf5, write_to_hdf5};
        write_to_hdf5(filename, "temp", &self.temp.v)?;
        write_to_hdf5(filename, "x", &self.temp.x)?;
        write_to_hdf5(filename, "y", &self.temp.y)?;
        write_scalar_to_hdf5(filename, "time", self.time)?;
        write_scalar_to_hdf5(filename, "kdiff", self.kdiff)?;
        Ok(())
    }
}
