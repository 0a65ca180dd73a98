//! 2D measurement sets with optional measurement covariance.
//!
//! A [`DataSet`] is an `(n, 2)` point cloud of `(x, y)` measurements.
//! Measurement uncertainty is a 2×2 covariance matrix, either shared by
//! all points or supplied per point as an `(n, 2, 2)` stack.

use ndarray::{Array2, Array3, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Measurement covariance attached to a data set.
#[derive(Debug, Clone)]
pub enum MeasurementCov {
    /// No measurement error (treated as an all-zero matrix).
    None,
    /// One 2×2 matrix shared by every point.
    Shared(Array2<f64>),
    /// One 2×2 matrix per point, shape `(n, 2, 2)`.
    PerPoint(Array3<f64>),
}

/// An ordered set of `(x, y)` measurement pairs.
#[derive(Debug, Clone)]
pub struct DataSet {
    points: Array2<f64>,
    cov: MeasurementCov,
}

impl DataSet {
    /// Creates a data set without measurement errors.
    ///
    /// `points` must have shape `(n, 2)`.
    pub fn new(points: Array2<f64>) -> Result<Self> {
        if points.ncols() != 2 {
            return Err(Error::InvalidParameter(format!(
                "expected (n, 2) data points, got {:?}",
                points.shape()
            )));
        }
        Ok(Self {
            points,
            cov: MeasurementCov::None,
        })
    }

    /// Attaches a single 2×2 covariance matrix shared by all points.
    pub fn with_shared_cov(mut self, cov: Array2<f64>) -> Result<Self> {
        if cov.shape() != [2, 2] {
            return Err(Error::InvalidParameter(format!(
                "expected a (2, 2) covariance matrix, got {:?}",
                cov.shape()
            )));
        }
        self.cov = MeasurementCov::Shared(cov);
        Ok(self)
    }

    /// Attaches an `(n, 2, 2)` stack with one covariance matrix per point.
    pub fn with_per_point_cov(mut self, cov: Array3<f64>) -> Result<Self> {
        if cov.shape() != [self.points.nrows(), 2, 2] {
            return Err(Error::InvalidParameter(format!(
                "expected a ({}, 2, 2) covariance stack, got {:?}",
                self.points.nrows(),
                cov.shape()
            )));
        }
        self.cov = MeasurementCov::PerPoint(cov);
        Ok(self)
    }

    /// Number of measurement pairs.
    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// The `(n, 2)` point cloud.
    pub fn points(&self) -> ArrayView2<'_, f64> {
        self.points.view()
    }

    pub fn cov(&self) -> &MeasurementCov {
        &self.cov
    }

    /// Effective 2×2 measurement covariance for point `i`, or `None` when
    /// the data carry no measurement error.
    pub fn cov_at(&self, i: usize) -> Option<ArrayView2<'_, f64>> {
        match &self.cov {
            MeasurementCov::None => None,
            MeasurementCov::Shared(cov) => Some(cov.view()),
            MeasurementCov::PerPoint(cov) => Some(cov.index_axis(Axis(0), i)),
        }
    }
}
