//! # Two dimensional field on a uniform grid
//! Let field store the temperature as contiguous
//! 2-dimensional array, indexed `[i, j]`, together
//! with the physical coordinates of the local grid lines.
use ndarray::{Array1, Array2, ArrayBase, Data, Ix2, Zip};

/// Grid coordinates of a (sub)domain along one axis.
///
/// The global domain `[xst, xen]` carries `nglob` uniformly spaced
/// points. Returns the coordinates of the `n` local points which start
/// at global index `ist`, and the grid spacing.
///
/// # Example
///```
/// use rustheat::field::grid;
/// let (x, dx) = grid(3, 9, 6, 0., 1.);
/// assert!((dx - 0.125).abs() < 1e-14);
/// assert!((x[2] - 1.).abs() < 1e-14);
///```
pub fn grid(n: usize, nglob: usize, ist: usize, xst: f64, xen: f64) -> (Array1<f64>, f64) {
    let dx = (xen - xst) / (nglob - 1) as f64;
    let x = Array1::from_shape_fn(n, |i| xst + (ist + i) as f64 * dx);
    (x, dx)
}

/// Field struct
///
/// v: ndarray
///
///   Temperature at the local grid points
///
/// x, y: ndarray
///
///   Local grid coordinates (physical space)
///
/// dx, dy: f64
///
///   Grid spacing, uniform
#[derive(Clone, Debug)]
pub struct Field2 {
    /// Field values
    pub v: Array2<f64>,
    /// Grid coordinates along x
    pub x: Array1<f64>,
    /// Grid coordinates along y
    pub y: Array1<f64>,
    /// Grid spacing along x
    pub dx: f64,
    /// Grid spacing along y
    pub dy: f64,
}

impl Field2 {
    /// Return a zero field on the local part `[ist, ist+n)` of a global grid
    ///
    /// # Arguments
    ///
    /// * `n` - Number of local points \[nx, ny\]
    ///
    /// * `nglob` - Number of global points \[nxglob, nyglob\]
    ///
    /// * `st` - Global index of the first local point \[istglob, jstglob\]
    ///
    /// * `bounds` - Global domain \[xst, xen, yst, yen\]
    pub fn new(n: [usize; 2], nglob: [usize; 2], st: [usize; 2], bounds: [f64; 4]) -> Self {
        let (x, dx) = grid(n[0], nglob[0], st[0], bounds[0], bounds[1]);
        let (y, dy) = grid(n[1], nglob[1], st[1], bounds[2], bounds[3]);
        Self {
            v: Array2::zeros((n[0], n[1])),
            x,
            y,
            dx,
            dy,
        }
    }

    /// Number of local points \[nx, ny\]
    pub fn shape(&self) -> [usize; 2] {
        [self.x.len(), self.y.len()]
    }

    /// Smoothed top hat, located in `[0.4, 0.6]^2`
    ///
    /// T = 0.25 (tanh((x-0.4)/dx) - tanh((x-0.6)/dx)) (tanh((y-0.4)/dy) - tanh((y-0.6)/dy))
    pub fn set_tanh_bump(&mut self) {
        let (dx, dy) = (self.dx, self.dy);
        let x = &self.x;
        let y = &self.y;
        Zip::indexed(&mut self.v).for_each(|(i, j), v| {
            *v = 0.25
                * (((x[i] - 0.4) / dx).tanh() - ((x[i] - 0.6) / dx).tanh())
                * (((y[j] - 0.4) / dy).tanh() - ((y[j] - 0.6) / dy).tanh());
        });
    }

    /// Sinusoidal mode sin(m pi x) sin(n pi y) on the unit square
    pub fn set_sin_sin(&mut self, amp: f64, m: f64, n: f64) {
        use std::f64::consts::PI;
        let x = &self.x;
        let y = &self.y;
        Zip::indexed(&mut self.v).for_each(|(i, j), v| {
            *v = amp * (m * PI * x[i]).sin() * (n * PI * y[j]).sin();
        });
    }
}

/// Sum of squared differences between two arrays
pub fn sum_sq_diff<S1, S2>(a: &ArrayBase<S1, Ix2>, b: &ArrayBase<S2, Ix2>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    let mut sum = 0.;
    Zip::from(a).and(b).for_each(|x, y| sum += (x - y) * (x - y));
    sum
}

/// Root mean square difference between two arrays
pub fn norm_rms_diff<S1, S2>(a: &ArrayBase<S1, Ix2>, b: &ArrayBase<S2, Ix2>) -> f64
where
    S1: Data<Elem = f64>,
    S2: Data<Elem = f64>,
{
    (sum_sq_diff(a, b) / a.len() as f64).sqrt()
}

/// Root mean square of an array
pub fn norm_rms<S: Data<Elem = f64>>(a: &ArrayBase<S, Ix2>) -> f64 {
    (a.iter().map(|x| x * x).sum::<f64>() / a.len() as f64).sqrt()
}
