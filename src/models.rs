/*!
Closed-form log-likelihoods for the supported model families.

Two models are provided:

- [`LineModel`]: a line `y = tan(incl) * x + inter` with Gaussian
  measurement error and optional intrinsic scatter (vertical or
  perpendicular to the line).
- [`Gauss2dModel`]: an anisotropic 2D Gaussian blob parameterized by its
  center, log axis scatters, and position angle.

Both implement [`Model2D`], whose single-point form is what the censoring
adapter integrates: it is the *uncensored* log-density of one synthetic
measurement under a given covariance, exposed distinctly from the full
data-set sum.
*/

use ndarray::ArrayView2;
use std::f64::consts::PI;
use std::str::FromStr;

use crate::data::DataSet;
use crate::error::{Error, Result};

/// A 2D model with a pointwise Gaussian log-density.
pub trait Model2D: Send + Sync {
    /// Uncensored log-density of a single `(x, y)` measurement with
    /// measurement covariance `cov` (`None` means no measurement error).
    fn lnlike_point(
        &self,
        params: &[f64],
        x: f64,
        y: f64,
        cov: Option<ArrayView2<'_, f64>>,
    ) -> Result<f64>;

    /// Log-likelihood of a whole data set: the sum of per-point densities,
    /// each with its own effective covariance.
    fn lnlike(&self, params: &[f64], data: &DataSet) -> Result<f64> {
        let mut total = 0.0;
        for (i, point) in data.points().outer_iter().enumerate() {
            total += self.lnlike_point(params, point[0], point[1], data.cov_at(i))?;
        }
        Ok(total)
    }
}

/// How intrinsic scatter inflates the line model's variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScatterMode {
    /// No intrinsic scatter; all variance comes from measurement error.
    #[default]
    None,
    /// Scatter along the vertical (y) direction.
    Vert,
    /// Scatter perpendicular to the line, projected into the vertical
    /// residual frame by `sqrt(slope^2 + 1)`.
    Perp,
}

impl FromStr for ScatterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(ScatterMode::None),
            "vert" => Ok(ScatterMode::Vert),
            "perp" => Ok(ScatterMode::Perp),
            other => Err(Error::InvalidScatterMode(other.to_string())),
        }
    }
}

impl ScatterMode {
    fn n_params(self) -> usize {
        match self {
            ScatterMode::None => 2,
            ScatterMode::Vert | ScatterMode::Perp => 3,
        }
    }
}

/// Log-density of a zero-mean Gaussian with variance `var`.
fn ln_normal_pdf(dy: f64, var: f64) -> f64 {
    -0.5 * (2.0 * PI * var).ln() - dy * dy / (2.0 * var)
}

/**
A line in a rotated coordinate frame, `y = tan(incl) * x + inter`.

Parameters are `(incl, inter)` for [`ScatterMode::None`] and
`(incl, inter, log10(scatter))` otherwise. Per-point residuals are taken
along the unit normal `(-slope, 1)`, and the per-point variance is the
measurement covariance projected onto that normal plus the squared
intrinsic scatter.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct LineModel {
    pub scatter: ScatterMode,
}

impl LineModel {
    pub fn new(scatter: ScatterMode) -> Self {
        Self { scatter }
    }

    fn unpack(&self, params: &[f64]) -> Result<(f64, f64, f64)> {
        if params.len() != self.scatter.n_params() {
            return Err(Error::InvalidParameter(format!(
                "line model with scatter mode {:?} takes {} parameters, got {}",
                self.scatter,
                self.scatter.n_params(),
                params.len()
            )));
        }
        let scatter = match self.scatter {
            ScatterMode::None => 0.0,
            ScatterMode::Vert | ScatterMode::Perp => 10f64.powf(params[2]),
        };
        Ok((params[0], params[1], scatter))
    }
}

impl Model2D for LineModel {
    fn lnlike_point(
        &self,
        params: &[f64],
        x: f64,
        y: f64,
        cov: Option<ArrayView2<'_, f64>>,
    ) -> Result<f64> {
        let (incl, inter, mut scatter) = self.unpack(params)?;

        if self.scatter == ScatterMode::None {
            let all_zero = match &cov {
                Some(c) => c.iter().all(|&v| v == 0.0),
                None => true,
            };
            if all_zero {
                return Err(Error::UnderdeterminedVariance);
            }
        }

        let slope = incl.tan();
        if self.scatter == ScatterMode::Perp {
            scatter *= (slope * slope + 1.0).sqrt();
        }

        // Residual and variance along the line's unit normal (-slope, 1).
        let dy = -slope * x + y - inter;
        let var_meas = match cov {
            Some(c) => {
                slope * slope * c[[0, 0]] - slope * (c[[0, 1]] + c[[1, 0]]) + c[[1, 1]]
            }
            None => 0.0,
        };
        Ok(ln_normal_pdf(dy, var_meas + scatter * scatter))
    }
}

/**
An oriented 2D Gaussian blob.

Parameters are `(x0, y0, log10(s_maj), log10(s_min), pa)`: the center, the
log scatters along the major and minor axes, and the position angle. The
model covariance `R * diag(s_maj^2, s_min^2) * R^T` is added to the
measurement covariance before evaluating the bivariate normal density.
*/
#[derive(Debug, Clone, Copy, Default)]
pub struct Gauss2dModel;

impl Model2D for Gauss2dModel {
    fn lnlike_point(
        &self,
        params: &[f64],
        x: f64,
        y: f64,
        cov: Option<ArrayView2<'_, f64>>,
    ) -> Result<f64> {
        if params.len() != 5 {
            return Err(Error::InvalidParameter(format!(
                "2D Gaussian model takes 5 parameters, got {}",
                params.len()
            )));
        }
        let (x0, y0) = (params[0], params[1]);
        let smaj2 = 10f64.powf(2.0 * params[2]);
        let smin2 = 10f64.powf(2.0 * params[3]);
        let (sin, cos) = params[4].sin_cos();

        // R * diag(smaj^2, smin^2) * R^T, written out.
        let mut a = cos * cos * smaj2 + sin * sin * smin2;
        let mut b = sin * cos * (smaj2 - smin2);
        let mut d = sin * sin * smaj2 + cos * cos * smin2;
        if let Some(c) = cov {
            a += c[[0, 0]];
            b += 0.5 * (c[[0, 1]] + c[[1, 0]]);
            d += c[[1, 1]];
        }

        let det = a * d - b * b;
        let (dx, dy) = (x - x0, y - y0);
        let quad = (d * dx * dx - 2.0 * b * dx * dy + a * dy * dy) / det;
        Ok(-(2.0 * PI).ln() - 0.5 * det.abs().ln() - 0.5 * quad)
    }
}
