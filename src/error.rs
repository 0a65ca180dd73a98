//! Error taxonomy for posterior construction and MCMC runs.
//!
//! Every variant is fatal to the current call: nothing in this crate
//! retries or degrades silently. The driver does not catch errors from
//! the posterior or the optimizer, so a failing evaluation aborts the
//! whole run.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The log-posterior is not finite at the initial guess, so no
    /// meaningful exploration is possible.
    #[error("zero posterior probability at the initial guess")]
    InvalidGuess,

    /// A posterior was evaluated without a data set attached.
    #[error("data needed to evaluate the posterior")]
    MissingData,

    /// The intrinsic scatter flag is not one of `none`, `vert`, `perp`.
    #[error("intrinsic scatter mode should be 'none', 'vert' or 'perp', got '{0}'")]
    InvalidScatterMode(String),

    /// Scatter mode `none` combined with an all-zero measurement
    /// covariance leaves the line model with no source of variance.
    #[error("intrinsic scatter mode 'none' requires a nonzero measurement covariance")]
    UnderdeterminedVariance,

    /// The censoring adapter was invoked without a model posterior to wrap.
    #[error("a model function is needed to evaluate the posterior")]
    MissingModelFunction,

    /// A data point lies outside the declared observable region; the
    /// model must not be asked to explain unobservable data.
    #[error("data point ({x}, {y}) found in censored area")]
    DataOutsideCensoringBounds { x: f64, y: f64 },

    /// Structural misuse: bad shapes, walker counts, parameter arity.
    #[error("{0}")]
    InvalidParameter(String),
}
