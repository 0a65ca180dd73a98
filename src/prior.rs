//! Prior strategies.
//!
//! A prior is an explicit policy object passed to the posterior by the
//! caller. [`FlatPrior`] is the concrete strategy used throughout the
//! examples and tests: a uniform, unnormalized density over per-parameter
//! open intervals.

/// Log-prior evaluated on a parameter vector.
pub trait Prior: Send + Sync {
    /// Returns the natural log of the (unnormalized) prior density.
    ///
    /// Must be finite or exactly `f64::NEG_INFINITY`, never NaN.
    fn lnprior(&self, params: &[f64]) -> f64;
}

/// Flat prior over per-parameter bounds.
///
/// Returns `0.0` (the log of a constant) when every parameter lies inside
/// its open `(lower, upper)` interval and `-inf` otherwise. Bounds are not
/// validated; `lower < upper` is required for a proper posterior.
#[derive(Debug, Clone)]
pub struct FlatPrior {
    bounds: Vec<(f64, f64)>,
}

impl FlatPrior {
    pub fn new(bounds: Vec<(f64, f64)>) -> Self {
        Self { bounds }
    }
}

impl Prior for FlatPrior {
    fn lnprior(&self, params: &[f64]) -> f64 {
        for (param, (lbound, ubound)) in params.iter().zip(&self.bounds) {
            if !(*lbound < *param && *param < *ubound) {
                return f64::NEG_INFINITY;
            }
        }
        0.0
    }
}
