/*!
Censoring correction for truncated observation windows.

When data are only observable inside a bounded region of the `(x, y)`
plane, the likelihood of each point must be renormalized by the
probability mass the model places inside that region. The window is a
rectangle in `x` whose `y` edges may each be a constant or a function of
`x` (a curved boundary, e.g. a magnitude-dependent cutoff).

The correction integrates the wrapped model's *uncensored* single-point
density ([`Model2D::lnlike_point`]) over the window with the same
covariance used for the real data: one integral reused for all points
when the covariance is shared, or one integral per point when each point
carries its own matrix.
*/

use std::fmt;

use ndarray::ArrayView2;

use crate::data::{DataSet, MeasurementCov};
use crate::error::{Error, Result};
use crate::models::Model2D;
use crate::quad::{dblquad, QuadConfig};

/// A `y` edge of the observation window: fixed, or varying with `x`.
pub enum YBound {
    Constant(f64),
    FunctionOfX(Box<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl YBound {
    /// The edge value at abscissa `x`.
    pub fn at(&self, x: f64) -> f64 {
        match self {
            YBound::Constant(y) => *y,
            YBound::FunctionOfX(f) => f(x),
        }
    }
}

impl From<f64> for YBound {
    fn from(y: f64) -> Self {
        YBound::Constant(y)
    }
}

impl fmt::Debug for YBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            YBound::Constant(y) => write!(f, "Constant({y})"),
            YBound::FunctionOfX(_) => write!(f, "FunctionOfX(..)"),
        }
    }
}

/// Rectangular (possibly curved-boundary) observation window.
#[derive(Debug)]
pub struct CensoringBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: YBound,
    pub ymax: YBound,
}

impl CensoringBounds {
    pub fn new(xmin: f64, xmax: f64, ymin: YBound, ymax: YBound) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    /// A plain rectangle with constant `y` edges.
    pub fn rect(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self::new(xmin, xmax, ymin.into(), ymax.into())
    }

    /// Checks that every data point lies inside the window.
    pub(crate) fn validate(&self, data: &DataSet) -> Result<()> {
        for point in data.points().outer_iter() {
            let (x, y) = (point[0], point[1]);
            if x < self.xmin || x > self.xmax || y < self.ymin.at(x) || y > self.ymax.at(x) {
                return Err(Error::DataOutsideCensoringBounds { x, y });
            }
        }
        Ok(())
    }

    /// Total log mass to subtract from the raw log-posterior: `N` copies
    /// of one integral for a shared covariance, or one integral per point
    /// for a per-point stack.
    pub(crate) fn lncorrection(
        &self,
        model: &dyn Model2D,
        params: &[f64],
        data: &DataSet,
    ) -> Result<f64> {
        if data.is_empty() {
            return Ok(0.0);
        }
        match data.cov() {
            MeasurementCov::PerPoint(_) => {
                let mut total = 0.0;
                for i in 0..data.len() {
                    total += self.window_mass(model, params, data.cov_at(i))?.ln();
                }
                Ok(total)
            }
            _ => {
                let mass = self.window_mass(model, params, data.cov_at(0))?;
                Ok(data.len() as f64 * mass.ln())
            }
        }
    }

    /// Probability mass the model places inside the window for one
    /// effective covariance.
    fn window_mass(
        &self,
        model: &dyn Model2D,
        params: &[f64],
        cov: Option<ArrayView2<'_, f64>>,
    ) -> Result<f64> {
        // Structural failures (arity, variance) do not depend on (x, y);
        // probe once so they propagate before the quadrature starts.
        let xm = 0.5 * (self.xmin + self.xmax);
        let ym = 0.5 * (self.ymin.at(xm) + self.ymax.at(xm));
        model.lnlike_point(params, xm, ym, cov)?;

        let config = QuadConfig {
            max_depth: 10,
            ..QuadConfig::default()
        };
        let integrand = |x: f64, y: f64| {
            model
                .lnlike_point(params, x, y, cov)
                .map(f64::exp)
                .unwrap_or(0.0)
        };
        Ok(dblquad(
            &integrand,
            self.xmin,
            self.xmax,
            &|x| self.ymin.at(x),
            &|x| self.ymax.at(x),
            &config,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gauss2dModel;
    use approx::assert_abs_diff_eq;
    use ndarray::{arr2, Array3};

    /// A density that is uniform over [-1, 1] x [-1, 1] and integrates to
    /// exactly one there.
    struct UnitUniform;

    impl Model2D for UnitUniform {
        fn lnlike_point(
            &self,
            _params: &[f64],
            _x: f64,
            _y: f64,
            _cov: Option<ArrayView2<'_, f64>>,
        ) -> Result<f64> {
            Ok(0.25f64.ln())
        }
    }

    #[test]
    fn validate_accepts_interior_points() {
        let bounds = CensoringBounds::rect(-1.0, 1.0, -1.0, 1.0);
        let data = DataSet::new(arr2(&[[0.0, 0.0], [0.5, -0.9]])).unwrap();
        assert!(bounds.validate(&data).is_ok());
    }

    #[test]
    fn validate_rejects_point_beyond_xmax() {
        let bounds = CensoringBounds::rect(-1.0, 1.0, -1.0, 1.0);
        let data = DataSet::new(arr2(&[[2.0, 0.0]])).unwrap();
        assert_eq!(
            bounds.validate(&data),
            Err(Error::DataOutsideCensoringBounds { x: 2.0, y: 0.0 })
        );
    }

    #[test]
    fn validate_honors_curved_boundary() {
        // Observable region: y >= x for x in [0, 1].
        let bounds = CensoringBounds::new(
            0.0,
            1.0,
            YBound::FunctionOfX(Box::new(|x| x)),
            YBound::Constant(2.0),
        );
        let inside = DataSet::new(arr2(&[[0.5, 0.8]])).unwrap();
        let below = DataSet::new(arr2(&[[0.5, 0.2]])).unwrap();
        assert!(bounds.validate(&inside).is_ok());
        assert!(matches!(
            bounds.validate(&below),
            Err(Error::DataOutsideCensoringBounds { .. })
        ));
    }

    #[test]
    fn unit_mass_gives_zero_correction() {
        let bounds = CensoringBounds::rect(-1.0, 1.0, -1.0, 1.0);
        let data = DataSet::new(arr2(&[[0.0, 0.0]])).unwrap();
        let corr = bounds.lncorrection(&UnitUniform, &[], &data).unwrap();
        assert_abs_diff_eq!(corr, 0.0, epsilon = 1e-8);
    }

    #[test]
    fn truncated_gaussian_correction_is_negative() {
        // A window one sigma wide holds well under the full mass, so the
        // log correction must be negative.
        let bounds = CensoringBounds::rect(-1.0, 1.0, -1.0, 1.0);
        let data = DataSet::new(arr2(&[[0.0, 0.0]])).unwrap();
        let params = [0.0, 0.0, 0.0, 0.0, 0.0];
        let corr = bounds
            .lncorrection(&Gauss2dModel, &params, &data)
            .unwrap();
        assert!(corr < -0.1);
    }

    #[test]
    fn per_point_stack_of_equal_matrices_matches_shared() {
        let bounds = CensoringBounds::rect(-2.0, 2.0, -2.0, 2.0);
        let params = [0.0, 0.0, -0.3, -0.3, 0.0];
        let points = arr2(&[[0.1, 0.0], [-0.4, 0.5]]);
        let cov = arr2(&[[0.04, 0.0], [0.0, 0.04]]);

        let shared = DataSet::new(points.clone())
            .unwrap()
            .with_shared_cov(cov.clone())
            .unwrap();
        let mut stack = Array3::zeros((2, 2, 2));
        stack.index_axis_mut(ndarray::Axis(0), 0).assign(&cov);
        stack.index_axis_mut(ndarray::Axis(0), 1).assign(&cov);
        let per_point = DataSet::new(points)
            .unwrap()
            .with_per_point_cov(stack)
            .unwrap();

        let corr_shared = bounds
            .lncorrection(&Gauss2dModel, &params, &shared)
            .unwrap();
        let corr_pp = bounds
            .lncorrection(&Gauss2dModel, &params, &per_point)
            .unwrap();
        assert_abs_diff_eq!(corr_shared, corr_pp, epsilon = 1e-6);
    }
}
