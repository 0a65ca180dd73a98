/*!
# astrofit

A compact Rust library for Bayesian model fitting of astronomical
measurements with ensemble MCMC.

The pieces compose from leaf to root: a [`prior::Prior`] strategy and a
[`models::Model2D`] likelihood are combined into a
[`posterior::Posterior`], optionally corrected for data censoring
through [`censor::CensoringBounds`]; the [`fit::modelfit`] driver then
warms up at the maximum-a-posteriori point and explores the posterior
with the affine-invariant [`ensemble::EnsembleSampler`].

## Example

```rust
use astrofit::data::DataSet;
use astrofit::fit::{modelfit, FitOptions};
use astrofit::models::{LineModel, ScatterMode};
use astrofit::posterior::Posterior;
use astrofit::prior::FlatPrior;
use ndarray::arr2;

// Measurements scattered around y = 0.5 x + 1.
let data = DataSet::new(arr2(&[
    [0.0, 1.1],
    [1.0, 1.4],
    [2.0, 2.1],
    [3.0, 2.4],
])).unwrap();

let prior = FlatPrior::new(vec![(-1.5, 1.5), (-10.0, 10.0), (-3.0, 1.0)]);
let post = Posterior::new(prior)
    .model(LineModel::new(ScatterMode::Vert))
    .data(&data);

let opts = FitOptions {
    n_step: 100,
    verbose: false,
    seed: Some(1),
    ..FitOptions::default()
};
let guess = [0.4, 1.0, -1.0];
let chain = modelfit(|p| post.lnpost(p), &guess, &opts).unwrap();
assert_eq!(chain.shape(), &[20 * 100, 3]);
```
*/

pub mod censor;
pub mod data;
pub mod ensemble;
pub mod error;
pub mod fit;
pub mod models;
pub mod optimize;
pub mod posterior;
pub mod prior;
pub mod quad;
pub mod stats;

pub use error::{Error, Result};
