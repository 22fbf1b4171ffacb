//! Dirichlet conditions on the global boundary
use crate::mpi::Decomp2d;
use ndarray::Array2;

/// Zero all local edges which coincide with the global boundary.
///
/// Edges between two subdomains are left untouched.
pub fn enforce_bcs(v: &mut Array2<f64>, dcp: &Decomp2d) {
    let (nx, ny) = v.dim();
    if dcp.at_left() {
        v.row_mut(0).fill(0.);
    }
    if dcp.at_right() {
        v.row_mut(nx - 1).fill(0.);
    }
    if dcp.at_bottom() {
        v.column_mut(0).fill(0.);
    }
    if dcp.at_top() {
        v.column_mut(ny - 1).fill(0.);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mpi::Topology;

    #[test]
    fn test_only_global_edges_are_zeroed() {
        // 3 x 3 process grid, every block 3 x 3 points
        let (px, py) = (3, 3);
        for rank in 0..px * py {
            let topo = Topology::new(rank, px * py, px, py).unwrap();
            let dcp = Decomp2d::new(&topo, [9, 9]).unwrap();
            let mut v = Array2::from_elem((3, 3), 1.);
            enforce_bcs(&mut v, &dcp);
            assert_eq!(v[[1, 1]], 1.);
            assert_eq!(v[[0, 1]] == 0., dcp.st[0] == 0);
            assert_eq!(v[[2, 1]] == 0., dcp.en[0] == 8);
            assert_eq!(v[[1, 0]] == 0., dcp.st[1] == 0);
            assert_eq!(v[[1, 2]] == 0., dcp.en[1] == 8);
        }
    }

    #[test]
    fn test_center_block_untouched() {
        let topo = Topology::new(4, 9, 3, 3).unwrap();
        let dcp = Decomp2d::new(&topo, [6, 6]).unwrap();
        let mut v = Array2::from_elem((2, 2), 7.);
        enforce_bcs(&mut v, &dcp);
        assert!(v.iter().all(|x| *x == 7.));
    }
}
