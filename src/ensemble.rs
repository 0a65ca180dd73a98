/*!
# Affine-Invariant Ensemble Sampler

Implements the Goodman & Weare (2010) stretch move: an ensemble of
walkers explores parameter space together, each walker's proposal drawn
toward a randomly chosen member of the complementary half-ensemble. The
move is affine-invariant, so no proposal-scale tuning is needed for
correlated or badly scaled parameters.

Each update step evaluates the log-posterior for one half-ensemble's
proposals on a dedicated rayon pool (the thread-count knob), gathers the
results (the per-step barrier), then accepts or rejects each proposal
with probability `min(1, z^(d-1) * exp(lnp_new - lnp_old))`.

Posterior evaluations are fallible; the first error aborts the run and
surfaces to the caller untouched.

## References

Goodman, J., & Weare, J. (2010). Ensemble samplers with affine
invariance. Communications in Applied Mathematics and Computational
Science, 5(1), 65-80.
*/

use ndarray::{s, Array1, Array2};
use rand::prelude::*;
use rayon::prelude::*;
use std::ops::Range;

use crate::error::{Error, Result};

/// Ensemble sampler over a log-posterior callable.
///
/// The callable is shared across worker threads, so it must be `Sync`;
/// posteriors in this crate are pure and satisfy that by construction.
pub struct EnsembleSampler<F> {
    lnprob: F,
    n_walkers: usize,
    n_params: usize,
    /// Stretch-move scale parameter (Goodman & Weare recommend 2).
    a: f64,
    pool: rayon::ThreadPool,
    seed: u64,
    rng: SmallRng,
    positions: Array2<f64>,
    log_probs: Array1<f64>,
    initialized: bool,
    n_accepted: Vec<usize>,
    n_proposed: Vec<usize>,
    /// One `(n_walkers, n_params)` snapshot per completed step.
    chain: Vec<Array2<f64>>,
}

impl<F> EnsembleSampler<F>
where
    F: Fn(&[f64]) -> Result<f64> + Sync,
{
    /// Creates a sampler with `n_walkers` walkers in `n_params` dimensions.
    ///
    /// `threads` bounds how many posterior evaluations run concurrently
    /// within one half-ensemble update. The walker count must be even and
    /// at least 2.
    pub fn new(n_walkers: usize, n_params: usize, lnprob: F, threads: usize) -> Result<Self> {
        if n_walkers < 2 {
            return Err(Error::InvalidParameter(
                "ensemble sampling needs at least 2 walkers".to_string(),
            ));
        }
        if n_walkers % 2 != 0 {
            return Err(Error::InvalidParameter(format!(
                "number of walkers must be even, got {n_walkers}"
            )));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .build()
            .map_err(|e| Error::InvalidParameter(e.to_string()))?;
        let seed = thread_rng().gen::<u64>();
        Ok(Self {
            lnprob,
            n_walkers,
            n_params,
            a: 2.0,
            pool,
            seed,
            rng: SmallRng::seed_from_u64(seed),
            positions: Array2::zeros((n_walkers, n_params)),
            log_probs: Array1::from_elem(n_walkers, f64::NEG_INFINITY),
            initialized: false,
            n_accepted: vec![0; n_walkers],
            n_proposed: vec![0; n_walkers],
            chain: Vec::new(),
        })
    }

    /// Returns the sampler reseeded for a reproducible run.
    pub fn set_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    /// Overrides the stretch scale parameter; must exceed 1.
    pub fn set_stretch_param(mut self, a: f64) -> Result<Self> {
        if a <= 1.0 {
            return Err(Error::InvalidParameter(format!(
                "stretch scale parameter must be > 1, got {a}"
            )));
        }
        self.a = a;
        Ok(self)
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of completed steps.
    pub fn n_steps(&self) -> usize {
        self.chain.len()
    }

    /// Per-walker ratio of accepted to proposed moves.
    pub fn acceptance_fraction(&self) -> Vec<f64> {
        self.n_accepted
            .iter()
            .zip(&self.n_proposed)
            .map(|(&acc, &prop)| if prop > 0 { acc as f64 / prop as f64 } else { 0.0 })
            .collect()
    }

    pub fn mean_acceptance_rate(&self) -> f64 {
        let accepted: usize = self.n_accepted.iter().sum();
        let proposed: usize = self.n_proposed.iter().sum();
        if proposed > 0 {
            accepted as f64 / proposed as f64
        } else {
            0.0
        }
    }

    /// Advances the ensemble by `n_steps`.
    ///
    /// Pass `Some(pos)` with shape `(n_walkers, n_params)` on the first
    /// call to seed the walkers (their log-posteriors are evaluated up
    /// front); pass `None` afterwards to continue from the current state.
    pub fn run_mcmc(&mut self, pos: Option<&Array2<f64>>, n_steps: usize) -> Result<()> {
        if let Some(pos) = pos {
            if pos.shape() != [self.n_walkers, self.n_params] {
                return Err(Error::InvalidParameter(format!(
                    "initial ensemble must have shape ({}, {}), got {:?}",
                    self.n_walkers,
                    self.n_params,
                    pos.shape()
                )));
            }
            let rows: Vec<Vec<f64>> = pos.outer_iter().map(|r| r.to_vec()).collect();
            self.log_probs = Array1::from_vec(self.eval_batch(&rows)?);
            self.positions = pos.to_owned();
            self.initialized = true;
        }
        if !self.initialized {
            return Err(Error::InvalidParameter(
                "sampler has no walker positions; pass an initial ensemble first".to_string(),
            ));
        }
        for _ in 0..n_steps {
            self.step()?;
        }
        Ok(())
    }

    /// One full step: both half-ensembles updated, snapshot recorded.
    fn step(&mut self) -> Result<()> {
        let half = self.n_walkers / 2;
        self.update_group(0..half, half..self.n_walkers)?;
        self.update_group(half..self.n_walkers, 0..half)?;
        self.chain.push(self.positions.clone());
        Ok(())
    }

    fn update_group(&mut self, active: Range<usize>, complementary: Range<usize>) -> Result<()> {
        let comp = self.positions.slice(s![complementary, ..]).to_owned();
        let n_comp = comp.nrows();

        let mut proposals: Vec<Vec<f64>> = Vec::with_capacity(active.len());
        let mut stretches: Vec<f64> = Vec::with_capacity(active.len());
        for i in active.clone() {
            // z ~ g(z) with g(z) proportional to 1/sqrt(z) on [1/a, a].
            let u: f64 = self.rng.gen();
            let z = ((self.a - 1.0) * u + 1.0).powi(2) / self.a;
            let j = self.rng.gen_range(0..n_comp);
            // y = c + z * (x - c)
            let proposal: Vec<f64> = (0..self.n_params)
                .map(|k| comp[[j, k]] + z * (self.positions[[i, k]] - comp[[j, k]]))
                .collect();
            proposals.push(proposal);
            stretches.push(z);
        }

        let new_lps = self.eval_batch(&proposals)?;

        for (idx, i) in active.enumerate() {
            self.n_proposed[i] += 1;
            // A non-finite proposal is never accepted.
            if !new_lps[idx].is_finite() {
                continue;
            }
            let log_ratio = (self.n_params as f64 - 1.0) * stretches[idx].ln()
                + new_lps[idx]
                - self.log_probs[i];
            if self.rng.gen::<f64>().ln() < log_ratio {
                for (k, &v) in proposals[idx].iter().enumerate() {
                    self.positions[[i, k]] = v;
                }
                self.log_probs[i] = new_lps[idx];
                self.n_accepted[i] += 1;
            }
        }
        Ok(())
    }

    /// Evaluates the log-posterior for a batch of parameter vectors on the
    /// sampler's thread pool, propagating the first error.
    fn eval_batch(&self, batch: &[Vec<f64>]) -> Result<Vec<f64>> {
        let lnprob = &self.lnprob;
        self.pool
            .install(|| batch.par_iter().map(|p| lnprob(p)).collect())
    }

    /// All post-step walker positions flattened to
    /// `(n_steps * n_walkers, n_params)`.
    pub fn flatchain(&self) -> Array2<f64> {
        self.flatten_from(0)
    }

    /// The last `k` steps flattened to `(k * n_walkers, n_params)`.
    pub fn last_steps(&self, k: usize) -> Array2<f64> {
        self.flatten_from(self.chain.len().saturating_sub(k))
    }

    fn flatten_from(&self, from: usize) -> Array2<f64> {
        let kept = &self.chain[from.min(self.chain.len())..];
        let mut out = Array2::zeros((kept.len() * self.n_walkers, self.n_params));
        for (step, snapshot) in kept.iter().enumerate() {
            for (w, row) in snapshot.outer_iter().enumerate() {
                out.row_mut(step * self.n_walkers + w).assign(&row);
            }
        }
        out
    }
}
