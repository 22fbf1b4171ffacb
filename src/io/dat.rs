//! Plain text files
use super::{IoError, Result};
use ndarray::{Array1, Array2};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Write one line `x y T` per grid point, i outer and j inner
///
/// # Errors
/// File can not be created or written
pub fn write_xyz<P: AsRef<Path>>(
    filename: P,
    x: &Array1<f64>,
    y: &Array1<f64>,
    v: &Array2<f64>,
) -> Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    for (i, xi) in x.iter().enumerate() {
        for (j, yj) in y.iter().enumerate() {
            writeln!(file, "{:.6} {:.6} {:.6}", xi, yj, v[[i, j]])?;
        }
    }
    file.flush()?;
    Ok(())
}

/// Write one row per i, 15 decimals per value
///
/// # Errors
/// File can not be created or written
pub fn write_rows<P: AsRef<Path>>(filename: P, v: &Array2<f64>) -> Result<()> {
    let mut file = BufWriter::new(File::create(filename)?);
    for row in v.rows() {
        for x in row {
            write!(file, "{:.15} ", x)?;
        }
        writeln!(file)?;
    }
    file.flush()?;
    Ok(())
}

/// Read file written by [`write_rows`]
///
/// # Errors
/// File can not be read, or rows differ in length
pub fn read_rows<P: AsRef<Path>>(filename: P) -> Result<Array2<f64>> {
    let name = filename.as_ref().display().to_string();
    let parse_err = |line: usize, msg: String| IoError::Parse {
        file: name.clone(),
        line,
        msg,
    };
    let file = BufReader::new(File::open(&filename)?);
    let mut data = Vec::new();
    let mut ncols = None;
    let mut nrows = 0;
    for (l, line) in file.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|s| s.parse::<f64>().map_err(|e| parse_err(l + 1, e.to_string())))
            .collect::<Result<Vec<f64>>>()?;
        match ncols {
            None => ncols = Some(row.len()),
            Some(n) if n != row.len() => {
                return Err(parse_err(
                    l + 1,
                    format!("expected {} values, got {}", n, row.len()),
                ))
            }
            Some(_) => (),
        }
        data.extend(row);
        nrows += 1;
    }
    Array2::from_shape_vec((nrows, ncols.unwrap_or(0)), data)
        .map_err(|e| parse_err(0, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("rustheat_dat_test");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_rows_keep_fifteen_decimals() {
        let v = Array2::from_shape_fn((3, 4), |(i, j)| 1. / (1 + i + 2 * j) as f64);
        let path = tmp("rows.txt");
        write_rows(&path, &v).unwrap();
        let w = read_rows(&path).unwrap();
        assert_eq!(w.dim(), (3, 4));
        for (a, b) in v.iter().zip(w.iter()) {
            assert!((a - b).abs() < 1e-15);
        }
    }

    #[test]
    fn test_xyz_has_one_line_per_point() {
        let x = Array1::from(vec![0., 0.5, 1.]);
        let y = Array1::from(vec![0., 1.]);
        let v = Array2::from_elem((3, 2), 0.25);
        let path = tmp("xyz.dat");
        write_xyz(&path, &x, &y, &v).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "0.000000 1.000000 0.250000");
        assert_eq!(lines[4], "1.000000 0.000000 0.250000");
    }
}
