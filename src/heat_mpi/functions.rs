//! Right hand side of the heat equation on one subdomain
use crate::field::Field2;
use crate::mpi::{Decomp2d, GhostBuffers};
use ndarray::Array2;

/// Discrete diffusion term k (d2T/dx2 + d2T/dy2) at every local point.
///
/// Missing neighbors at subdomain edges are taken from the ghost
/// buffers, which must hold the neighbors' values of the current
/// step. Points on the global boundary get a zero right hand side.
///
/// The four edges and the four corners are treated separately,
/// every subdomain needs at least 2 x 2 points.
#[allow(clippy::many_single_char_names)]
pub fn get_rhs(
    field: &Field2,
    ghosts: &GhostBuffers,
    dcp: &Decomp2d,
    kdiff: f64,
    rhs: &mut Array2<f64>,
) {
    let t = &field.v;
    let (nx, ny) = t.dim();
    let dxsq = field.dx * field.dx;
    let dysq = field.dy * field.dy;
    let lap = |c: f64, w: f64, e: f64, s: f64, n: f64| {
        kdiff * (e + w - 2.0 * c) / dxsq + kdiff * (n + s - 2.0 * c) / dysq
    };
    let (at_left, at_right) = (dcp.at_left(), dcp.at_right());
    let (at_bottom, at_top) = (dcp.at_bottom(), dcp.at_top());

    // interior
    for i in 1..nx - 1 {
        for j in 1..ny - 1 {
            rhs[[i, j]] = lap(t[[i, j]], t[[i - 1, j]], t[[i + 1, j]], t[[i, j - 1]], t[[i, j + 1]]);
        }
    }

    // left edge
    let i = 0;
    for j in 1..ny - 1 {
        rhs[[i, j]] = if at_left {
            0.0
        } else {
            lap(t[[i, j]], ghosts.left[j], t[[i + 1, j]], t[[i, j - 1]], t[[i, j + 1]])
        };
    }

    // right edge
    let i = nx - 1;
    for j in 1..ny - 1 {
        rhs[[i, j]] = if at_right {
            0.0
        } else {
            lap(t[[i, j]], t[[i - 1, j]], ghosts.right[j], t[[i, j - 1]], t[[i, j + 1]])
        };
    }

    // bottom edge
    let j = 0;
    for i in 1..nx - 1 {
        rhs[[i, j]] = if at_bottom {
            0.0
        } else {
            lap(t[[i, j]], t[[i - 1, j]], t[[i + 1, j]], ghosts.bottom[i], t[[i, j + 1]])
        };
    }

    // top edge
    let j = ny - 1;
    for i in 1..nx - 1 {
        rhs[[i, j]] = if at_top {
            0.0
        } else {
            lap(t[[i, j]], t[[i - 1, j]], t[[i + 1, j]], t[[i, j - 1]], ghosts.top[i])
        };
    }

    // bottom-left corner
    let (i, j) = (0, 0);
    rhs[[i, j]] = if at_left || at_bottom {
        0.0
    } else {
        lap(t[[i, j]], ghosts.left[j], t[[i + 1, j]], ghosts.bottom[i], t[[i, j + 1]])
    };

    // bottom-right corner
    let (i, j) = (nx - 1, 0);
    rhs[[i, j]] = if at_right || at_bottom {
        0.0
    } else {
        lap(t[[i, j]], t[[i - 1, j]], ghosts.right[j], ghosts.bottom[i], t[[i, j + 1]])
    };

    // top-left corner
    let (i, j) = (0, ny - 1);
    rhs[[i, j]] = if at_left || at_top {
        0.0
    } else {
        lap(t[[i, j]], ghosts.left[j], t[[i + 1, j]], t[[i, j - 1]], ghosts.top[i])
    };

    // top-right corner
    let (i, j) = (nx - 1, ny - 1);
    rhs[[i, j]] = if at_right || at_top {
        0.0
    } else {
        lap(t[[i, j]], t[[i - 1, j]], ghosts.right[j], t[[i, j - 1]], ghosts.top[i])
    };
}
