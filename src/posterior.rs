/*!
Log-posterior composition: prior + model likelihood, optionally corrected
for data censoring.

A [`Posterior`] owns a prior strategy and, once configured, a model and a
reference to the data it explains. Evaluation order matches the structure
of the density itself: the prior is evaluated first and a `-inf` prior
short-circuits everything else, so the likelihood (and any error it might
raise) is never touched for parameters the prior excludes.
*/

use crate::censor::CensoringBounds;
use crate::data::DataSet;
use crate::error::{Error, Result};
use crate::models::Model2D;
use crate::prior::Prior;

/// A composed log-posterior over a 2D data set.
pub struct Posterior<'a, P: Prior> {
    prior: P,
    model: Option<Box<dyn Model2D + 'a>>,
    data: Option<&'a DataSet>,
    censoring: Option<CensoringBounds>,
}

impl<'a, P: Prior> Posterior<'a, P> {
    /// Starts a posterior from a prior strategy. The prior is always
    /// supplied explicitly by the caller.
    pub fn new(prior: P) -> Self {
        Self {
            prior,
            model: None,
            data: None,
            censoring: None,
        }
    }

    /// Sets the model whose likelihood this posterior evaluates.
    pub fn model<M: Model2D + 'a>(mut self, model: M) -> Self {
        self.model = Some(Box::new(model));
        self
    }

    /// Attaches the observed data.
    pub fn data(mut self, data: &'a DataSet) -> Self {
        self.data = Some(data);
        self
    }

    /// Declares the observation window the data were censored to.
    pub fn censoring(mut self, bounds: CensoringBounds) -> Self {
        self.censoring = Some(bounds);
        self
    }

    /// Natural log of the (unnormalized) posterior density at `params`.
    ///
    /// Finite or exactly `-inf` for valid inputs, never NaN. Fails with
    /// [`Error::MissingModelFunction`] / [`Error::MissingData`] when
    /// invoked before a model or data set is attached, and with
    /// [`Error::DataOutsideCensoringBounds`] when a point falls outside a
    /// declared window.
    pub fn lnpost(&self, params: &[f64]) -> Result<f64> {
        let lnpr = self.prior.lnprior(params);
        if !lnpr.is_finite() {
            return Ok(f64::NEG_INFINITY);
        }

        let model = self.model.as_deref().ok_or(Error::MissingModelFunction)?;
        let data = self.data.ok_or(Error::MissingData)?;
        let mut lnpost = lnpr + model.lnlike(params, data)?;

        if let Some(bounds) = &self.censoring {
            // No integration when it cannot matter.
            if !lnpost.is_finite() {
                return Ok(lnpost);
            }
            bounds.validate(data)?;
            lnpost -= bounds.lncorrection(model, params, data)?;
        }
        Ok(lnpost)
    }
}
