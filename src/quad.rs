//! Adaptive Simpson quadrature in one and two dimensions.
//!
//! [`quad`] integrates a scalar function over an interval; [`dblquad`]
//! integrates over a region whose inner (y) bounds may depend on the outer
//! (x) coordinate, which is what the censoring correction needs for curved
//! observation windows. The recursion keeps its own error estimate; only
//! the integral value is returned.

/// Tuning knobs for the adaptive recursion.
#[derive(Debug, Clone, Copy)]
pub struct QuadConfig {
    pub max_depth: u32,
    pub err_tol: f64,
}

impl Default for QuadConfig {
    fn default() -> Self {
        QuadConfig {
            max_depth: 12,
            err_tol: 1e-10,
        }
    }
}

#[inline]
fn simpsons_rule<F>(func: &F, a: f64, fa: f64, b: f64, fb: f64) -> (f64, f64, f64)
where
    F: Fn(f64) -> f64,
{
    let m = (a + b) / 2.0;
    let h6 = (b - a).abs() / 6.0;
    let fm = func(m);
    (m, fm, h6 * (fa + 4.0 * fm + fb))
}

// a/b: interval bounds, m: midpoint, f*: function values there,
// whole: the single-panel Simpson estimate being refined.
#[allow(clippy::too_many_arguments)]
fn quad_recr<F>(
    func: &F,
    a: f64,
    fa: f64,
    m: f64,
    fm: f64,
    b: f64,
    fb: f64,
    err: f64,
    whole: f64,
    depth: u32,
    max_depth: u32,
) -> f64
where
    F: Fn(f64) -> f64,
{
    let (ml, fml, left) = simpsons_rule(func, a, fa, m, fm);
    let (mr, fmr, right) = simpsons_rule(func, m, fm, b, fb);
    let eps = left + right - whole;
    if eps.abs() <= 15.0 * err || depth == max_depth {
        left + right + eps / 15.0
    } else {
        let half_err = err / 2.0;
        let next = depth + 1;
        quad_recr(func, a, fa, ml, fml, m, fm, half_err, left, next, max_depth)
            + quad_recr(func, m, fm, mr, fmr, b, fb, half_err, right, next, max_depth)
    }
}

/// Definite integral of `f` over `[a, b]`.
pub fn quad<F>(f: &F, a: f64, b: f64, config: &QuadConfig) -> f64
where
    F: Fn(f64) -> f64,
{
    if a == b {
        return 0.0;
    }
    let fa = f(a);
    let fb = f(b);
    let (m, fm, whole) = simpsons_rule(f, a, fa, b, fb);
    quad_recr(
        f,
        a,
        fa,
        m,
        fm,
        b,
        fb,
        config.err_tol,
        whole,
        1,
        config.max_depth,
    )
}

/// Double integral of `f(x, y)` over `x` in `[xmin, xmax]` and, for each
/// `x`, `y` in `[gmin(x), gmax(x)]`.
pub fn dblquad<F, GL, GU>(
    f: &F,
    xmin: f64,
    xmax: f64,
    gmin: &GL,
    gmax: &GU,
    config: &QuadConfig,
) -> f64
where
    F: Fn(f64, f64) -> f64,
    GL: Fn(f64) -> f64,
    GU: Fn(f64) -> f64,
{
    let outer = |x: f64| {
        let inner = |y: f64| f(x, y);
        quad(&inner, gmin(x), gmax(x), config)
    };
    quad(&outer, xmin, xmax, config)
}
