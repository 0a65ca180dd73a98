//! Derivative-free minimization for the MAP warm-start.
//!
//! [`nelder_mead`] is a port of SciPy's `fmin` downhill-simplex method
//! with the same reflection/expansion/contraction/shrink coefficients and
//! initial-simplex construction. The objective is fallible so posterior
//! errors propagate out of the search; non-convergence is not an error,
//! the best point found is returned as-is.

use crate::error::Result;

const RHO: f64 = 1.0;
const CHI: f64 = 2.0;
const PSI: f64 = 0.5;
const SIGMA: f64 = 0.5;

// SciPy's nonzero/zero initial simplex perturbations.
const NONZDELT: f64 = 0.05;
const ZDELT: f64 = 0.00025;

/// Minimizes `f` starting from `x0` and returns the best point found.
///
/// `xatol_opt` is the absolute simplex-size tolerance (default `1e-4`,
/// also used for the function-value spread); `maxiter_opt` defaults to
/// `200 * n`.
pub fn nelder_mead<F>(
    mut f: F,
    x0: &[f64],
    xatol_opt: Option<f64>,
    maxiter_opt: Option<usize>,
) -> Result<Vec<f64>>
where
    F: FnMut(&[f64]) -> Result<f64>,
{
    let n = x0.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    let xatol = xatol_opt.unwrap_or(1e-4);
    let fatol = xatol;
    let maxiter = maxiter_opt.unwrap_or(200 * n);

    // Initial simplex: the guess plus one per-coordinate perturbation.
    let mut sim: Vec<Vec<f64>> = Vec::with_capacity(n + 1);
    sim.push(x0.to_vec());
    for k in 0..n {
        let mut y = x0.to_vec();
        if y[k] != 0.0 {
            y[k] *= 1.0 + NONZDELT;
        } else {
            y[k] = ZDELT;
        }
        sim.push(y);
    }
    let mut fsim: Vec<f64> = Vec::with_capacity(n + 1);
    for v in &sim {
        fsim.push(f(v)?);
    }
    sort_simplex(&mut sim, &mut fsim);

    for _ in 0..maxiter {
        let spread_x = sim[1..]
            .iter()
            .flat_map(|v| v.iter().zip(&sim[0]).map(|(a, b)| (a - b).abs()))
            .fold(0.0f64, f64::max);
        let spread_f = fsim[1..]
            .iter()
            .map(|&v| (v - fsim[0]).abs())
            .fold(0.0f64, f64::max);
        if spread_x <= xatol && spread_f <= fatol {
            break;
        }

        // Centroid of all vertices except the worst.
        let mut xbar = vec![0.0; n];
        for v in &sim[..n] {
            for (acc, &x) in xbar.iter_mut().zip(v) {
                *acc += x / n as f64;
            }
        }

        let xr = affine(&xbar, &sim[n], 1.0 + RHO, -RHO);
        let fxr = f(&xr)?;
        let mut shrink = false;

        if fxr < fsim[0] {
            let xe = affine(&xbar, &sim[n], 1.0 + RHO * CHI, -RHO * CHI);
            let fxe = f(&xe)?;
            if fxe < fxr {
                sim[n] = xe;
                fsim[n] = fxe;
            } else {
                sim[n] = xr;
                fsim[n] = fxr;
            }
        } else if fxr < fsim[n - 1] {
            sim[n] = xr;
            fsim[n] = fxr;
        } else if fxr < fsim[n] {
            // Outside contraction.
            let xc = affine(&xbar, &sim[n], 1.0 + PSI * RHO, -PSI * RHO);
            let fxc = f(&xc)?;
            if fxc <= fxr {
                sim[n] = xc;
                fsim[n] = fxc;
            } else {
                shrink = true;
            }
        } else {
            // Inside contraction.
            let xcc = affine(&xbar, &sim[n], 1.0 - PSI, PSI);
            let fxcc = f(&xcc)?;
            if fxcc < fsim[n] {
                sim[n] = xcc;
                fsim[n] = fxcc;
            } else {
                shrink = true;
            }
        }

        if shrink {
            let best = sim[0].clone();
            for j in 1..=n {
                for (x, &b) in sim[j].iter_mut().zip(&best) {
                    *x = b + SIGMA * (*x - b);
                }
                fsim[j] = f(&sim[j])?;
            }
        }
        sort_simplex(&mut sim, &mut fsim);
    }

    Ok(sim.swap_remove(0))
}

/// `a * xbar + b * worst`, elementwise.
fn affine(xbar: &[f64], worst: &[f64], a: f64, b: f64) -> Vec<f64> {
    xbar.iter()
        .zip(worst)
        .map(|(&xb, &xw)| a * xb + b * xw)
        .collect()
}

fn sort_simplex(sim: &mut [Vec<f64>], fsim: &mut [f64]) {
    let mut order: Vec<usize> = (0..fsim.len()).collect();
    order.sort_by(|&i, &j| fsim[i].partial_cmp(&fsim[j]).unwrap_or(std::cmp::Ordering::Equal));
    let sim_old = sim.to_vec();
    let fsim_old = fsim.to_vec();
    for (dst, &src) in order.iter().enumerate() {
        sim[dst] = sim_old[src].clone();
        fsim[dst] = fsim_old[src];
    }
}
