//! `Hdf5` functions to write ndarrays
use super::Result;
use hdf5::H5Type;
use ndarray::{Array, ArrayBase, ArrayD, Dimension};
use std::path::Path;

/// Interface to write scalar to hdf5 file
///
/// # Errors
/// When file can not be opened or created.
pub fn write_scalar_to_hdf5<T>(filename: &str, name: &str, scalar: T) -> Result<()>
where
    T: H5Type + Copy,
{
    use ndarray::Array1;
    let x = Array1::<T>::from_elem(1, scalar);
    write_to_hdf5(filename, name, &x)
}

/// Read ndarray from hdf5 file
///
/// # Errors
/// Errors when file/variable does not exist or
/// has a different dimensionality than requested.
pub fn read_from_hdf5<A, D>(filename: &str, varname: &str) -> Result<Array<A, D>>
where
    A: H5Type,
    D: Dimension,
{
    // Open file
    let file = hdf5::File::open(filename)?;

    //Read dataset
    let data = file.dataset(varname)?;
    let y: ArrayD<A> = data.read_dyn::<A>()?;

    // Dyn to static
    y.into_dimensionality::<D>()
        .map_err(|e| hdf5::Error::from(e.to_string()).into())
}

/// Write ndarray to hdf5 file
///
/// # Errors
/// When file does not exist or when file and
/// variable exists, but variable has different
/// shape than input array (assign new value will fail).
pub fn write_to_hdf5<A, S, D>(filename: &str, varname: &str, array: &ArrayBase<S, D>) -> Result<()>
where
    A: H5Type,
    S: ndarray::Data<Elem = A>,
    D: ndarray::Dimension,
{
    // Open file
    let file = if Path::new(filename).exists() {
        hdf5::File::append(filename)?
    } else {
        hdf5::File::create(filename)?
    };

    //Write dataset
    let dset = match file.dataset(varname) {
        // Overwrite
        Ok(dset) => dset,
        // Create new dataset
        Err(..) => file
            .new_dataset::<A>()
            .no_chunk()
            .shape(array.shape())
            .create(varname)?,
    };
    dset.write(&array.view())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Ix2};

    #[test]
    fn test_write_read_field() {
        let dir = std::env::temp_dir().join("rustheat_hdf5_test");
        std::fs::create_dir_all(&dir).unwrap();
        let filename = dir.join("field.h5");
        let filename = filename.to_str().unwrap();
        let _ = std::fs::remove_file(filename);
        let v = Array2::from_shape_fn((4, 3), |(i, j)| (i * 3 + j) as f64);
        write_to_hdf5(filename, "temp", &v).unwrap();
        write_scalar_to_hdf5(filename, "time", 0.5).unwrap();
        let w: Array2<f64> = read_from_hdf5::<f64, Ix2>(filename, "temp").unwrap();
        assert_eq!(v, w);
    }
}
