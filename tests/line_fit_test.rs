//! Parameter-recovery tests for the line and 2D Gaussian posteriors,
//! run through the full `modelfit` driver.

use astrofit::censor::CensoringBounds;
use astrofit::data::DataSet;
use astrofit::fit::{modelfit, FitOptions};
use astrofit::models::{Gauss2dModel, LineModel, ScatterMode};
use astrofit::posterior::Posterior;
use astrofit::prior::FlatPrior;
use astrofit::stats::credible_summary;
use ndarray::{arr2, Array2};

const SEED: u64 = 42;

/// Ten points on y = 0.5 x + 1 with alternating +-0.1 vertical offsets.
fn line_points() -> Array2<f64> {
    let mut rows = Vec::with_capacity(10);
    for i in 0..10 {
        let x = i as f64 * 0.5;
        let off = if i % 2 == 0 { 0.1 } else { -0.1 };
        rows.push([x, 0.5 * x + 1.0 + off]);
    }
    Array2::from(rows)
}

fn quiet(n_step: usize) -> FitOptions {
    FitOptions {
        n_step,
        verbose: false,
        seed: Some(SEED),
        ..FitOptions::default()
    }
}

#[test]
fn line_fit_with_vertical_scatter_recovers_truth() {
    let data = DataSet::new(line_points()).unwrap();
    let prior = FlatPrior::new(vec![(-1.5, 1.5), (-10.0, 10.0), (-3.0, 1.0)]);
    let post = Posterior::new(prior)
        .model(LineModel::new(ScatterMode::Vert))
        .data(&data);

    let guess = [0.3, 0.5, -1.0];
    let chain = modelfit(|p| post.lnpost(p), &guess, &quiet(400)).unwrap();
    assert_eq!(chain.shape(), &[20 * 400, 3]);

    let summary = credible_summary(chain.view());
    let incl_med = summary[[1, 0]];
    let inter_med = summary[[1, 1]];
    let truth_incl = 0.5f64.atan();
    assert!(
        (incl_med - truth_incl).abs() < 0.1,
        "median inclination {incl_med} too far from {truth_incl}"
    );
    assert!(
        (inter_med - 1.0).abs() < 0.3,
        "median intercept {inter_med} too far from 1.0"
    );
}

#[test]
fn line_fit_with_shared_covariance_and_no_scatter() {
    // Points exactly on the line; all variance comes from the shared
    // measurement covariance.
    let mut rows = Vec::with_capacity(8);
    for i in 0..8 {
        let x = i as f64 * 0.5;
        rows.push([x, 0.5 * x + 1.0]);
    }
    let cov = arr2(&[[0.0, 0.0], [0.0, 0.04]]);
    let data = DataSet::new(Array2::from(rows))
        .unwrap()
        .with_shared_cov(cov)
        .unwrap();

    let prior = FlatPrior::new(vec![(-1.5, 1.5), (-10.0, 10.0)]);
    let post = Posterior::new(prior)
        .model(LineModel::new(ScatterMode::None))
        .data(&data);

    let guess = [0.4, 0.8];
    let chain = modelfit(|p| post.lnpost(p), &guess, &quiet(300)).unwrap();

    let summary = credible_summary(chain.view());
    assert!((summary[[1, 0]] - 0.5f64.atan()).abs() < 0.05);
    assert!((summary[[1, 1]] - 1.0).abs() < 0.1);
}

#[test]
fn censored_gauss2d_fit_runs_end_to_end() {
    // A handful of points near (0.2, -0.1) inside a wide window. With a
    // shared covariance the correction costs one integral per posterior
    // evaluation, so keep the run short.
    let points = arr2(&[[0.2, -0.1], [0.3, 0.0], [0.1, -0.2], [0.25, -0.05]]);
    let cov = arr2(&[[0.01, 0.0], [0.0, 0.01]]);
    let data = DataSet::new(points)
        .unwrap()
        .with_shared_cov(cov)
        .unwrap();

    let prior = FlatPrior::new(vec![
        (-1.0, 1.0),
        (-1.0, 1.0),
        (-2.0, 0.5),
        (-2.0, 0.5),
        (-2.0, 2.0),
    ]);
    let post = Posterior::new(prior)
        .model(Gauss2dModel)
        .data(&data)
        .censoring(CensoringBounds::rect(-2.0, 2.0, -2.0, 2.0));

    let guess = [0.2, -0.1, -0.7, -0.7, 0.0];
    let opts = FitOptions {
        n_walkers: 12,
        n_step: 40,
        n_info: 20,
        skip_minimize: true,
        d_walker: 0.05,
        ..quiet(40)
    };
    let chain = modelfit(|p| post.lnpost(p), &guess, &opts).unwrap();
    assert_eq!(chain.shape(), &[12 * 40, 5]);

    // The center should stay near the data even in a short run.
    let summary = credible_summary(chain.view());
    assert!((summary[[1, 0]] - 0.2).abs() < 0.3);
    assert!((summary[[1, 1]] + 0.1).abs() < 0.3);
    assert!(chain.iter().all(|v| v.is_finite()));
}
