/*!
# MCMC model-fitting driver

[`modelfit`] is the one-call interface for Bayesian model fitting: it
validates the initial guess, warms up with a Nelder-Mead search for the
maximum-a-posteriori point, seeds an ensemble of walkers in a small
Gaussian ball around it, and then advances the sampler in fixed-size
chunks. After each full chunk a 16/50/84 percentile summary of that
chunk's samples is reported, so convergence can be watched while the run
is still going.

Errors from the posterior or the optimizer are not caught anywhere in
the driver; the first one aborts the run.
*/

use indicatif::{ProgressBar, ProgressStyle};
use ndarray::Array2;
use rand::prelude::*;
use rand_distr::{Distribution, Normal};

use crate::ensemble::EnsembleSampler;
use crate::error::{Error, Result};
use crate::optimize::nelder_mead;
use crate::stats::{credible_summary, format_summary};

/// Knobs for [`modelfit`]. Defaults match a short exploratory run.
#[derive(Debug, Clone)]
pub struct FitOptions {
    /// Skip the MAP warm-start and sample from the guess directly.
    pub skip_minimize: bool,
    /// Parallel posterior evaluations per ensemble step.
    pub threads: usize,
    /// Number of walkers in the ensemble (even, at least 2).
    pub n_walkers: usize,
    /// Standard deviation of the Gaussian ball seeding the walkers.
    pub d_walker: f64,
    /// Total number of ensemble steps.
    pub n_step: usize,
    /// Report running percentile summaries through a progress bar.
    pub verbose: bool,
    /// Chunk length between summaries.
    pub n_info: usize,
    /// Fixed seed for reproducible runs; entropy-seeded when `None`.
    pub seed: Option<u64>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            skip_minimize: false,
            threads: 1,
            n_walkers: 20,
            d_walker: 1e-3,
            n_step: 1000,
            verbose: true,
            n_info: 100,
            seed: None,
        }
    }
}

/// Fits a model by ensemble MCMC and returns the flattened chain, shape
/// `(n_walkers * n_step, n_params)`.
///
/// Fails with [`Error::InvalidGuess`] when the log-posterior is not
/// finite at `guess`; any error raised by `lnpost` itself propagates
/// unchanged.
pub fn modelfit<F>(lnpost: F, guess: &[f64], opts: &FitOptions) -> Result<Array2<f64>>
where
    F: Fn(&[f64]) -> Result<f64> + Sync,
{
    if !lnpost(guess)?.is_finite() {
        return Err(Error::InvalidGuess);
    }
    if opts.n_info == 0 {
        return Err(Error::InvalidParameter(
            "chunk length n_info must be positive".to_string(),
        ));
    }
    let n_params = guess.len();

    let pb = if opts.verbose {
        let pb = ProgressBar::new(opts.n_step as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
                .expect("progress template is valid")
                .progress_chars("##-"),
        );
        pb.set_prefix("modelfit");
        pb
    } else {
        ProgressBar::hidden()
    };

    // MAP warm-start: minimize the negative log-posterior from the guess.
    // The optimizer's answer is used as-is, converged or not.
    let start = if opts.skip_minimize {
        guess.to_vec()
    } else {
        let map = nelder_mead(|p| lnpost(p).map(|v| -v), guess, None, None)?;
        pb.println("MAP solution found.");
        map
    };

    let mut sampler = EnsembleSampler::new(opts.n_walkers, n_params, &lnpost, opts.threads)?;
    if let Some(seed) = opts.seed {
        sampler = sampler.set_seed(seed);
    }

    // Independent Gaussian perturbations seed the walkers around `start`.
    let mut rng = match opts.seed {
        Some(seed) => SmallRng::seed_from_u64(seed.wrapping_add(1)),
        None => SmallRng::from_entropy(),
    };
    let noise = Normal::new(0.0, opts.d_walker)
        .map_err(|e| Error::InvalidParameter(e.to_string()))?;
    let pos = Array2::from_shape_fn((opts.n_walkers, n_params), |(_, k)| {
        start[k] + noise.sample(&mut rng)
    });
    pb.println("MCMC sampler initialized.");

    // Full chunks, then one partial chunk for any remainder.
    let mut count = 0;
    while count + opts.n_info <= opts.n_step {
        if count == 0 {
            sampler.run_mcmc(Some(&pos), opts.n_info)?;
        } else {
            sampler.run_mcmc(None, opts.n_info)?;
        }
        count += opts.n_info;
        pb.inc(opts.n_info as u64);
        if opts.verbose {
            let block = sampler.last_steps(opts.n_info);
            let summary = credible_summary(block.view());
            pb.println(format!(
                "Summary for the {} - {} steps:\n{}",
                count - opts.n_info + 1,
                count,
                format_summary(summary.view())
            ));
        }
    }
    if count < opts.n_step {
        let rest = opts.n_step - count;
        if count == 0 {
            sampler.run_mcmc(Some(&pos), rest)?;
        } else {
            sampler.run_mcmc(None, rest)?;
        }
        pb.inc(rest as u64);
    }

    let flat = sampler.flatchain();
    if opts.verbose {
        let summary = credible_summary(flat.view());
        pb.println(format!(
            "Summary for all {} steps (mean acceptance rate {:.2}):\n{}",
            opts.n_step,
            sampler.mean_acceptance_rate(),
            format_summary(summary.view())
        ));
        pb.finish_with_message("Done!");
    }
    Ok(flat)
}
