//! Sweep a grid of network-constrained lasso models over a simulated panel
//! of correlated features, reusing a single Laplacian square root factor for
//! every fit.

use linfa::prelude::*;
use linfa_nclasso::{LaplacianSqrt, NcLasso, Result};
use ndarray::{s, Array, Array1, Array2};
use ndarray_rand::rand::SeedableRng;
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use rand_xoshiro::Xoshiro256Plus;

fn main() -> Result<()> {
    let mut rng = Xoshiro256Plus::seed_from_u64(17);

    // 20 features in two cliques of 10; only the first clique carries signal
    let nfeatures = 20;
    let half = nfeatures / 2;
    let mut adjacency = Array2::<f64>::zeros((nfeatures, nfeatures));
    for u in 0..nfeatures {
        for v in 0..nfeatures {
            if u != v && (u < half) == (v < half) {
                adjacency[(u, v)] = 1.0;
            }
        }
    }

    let mut coefficients = Array1::<f64>::zeros(nfeatures);
    coefficients.slice_mut(s![..half]).fill(1.0);

    let records = Array::random_using((120, nfeatures), Uniform::new(-1., 1.), &mut rng);
    let noise = Array::random_using(120, Uniform::new(-0.5, 0.5), &mut rng);
    let targets = records.dot(&coefficients) + noise;

    let (train, valid) = Dataset::new(records, targets).split_with_ratio(0.5);

    // the expensive part happens exactly once
    let penalty_sqrt = LaplacianSqrt::from_adjacency(&adjacency)?;

    for &graph_penalty in &[0.0, 0.5, 1.0, 4.0] {
        for &penalty in &[0.01, 0.05, 0.2] {
            let model = NcLasso::params(&penalty_sqrt)
                .penalty(penalty)
                .graph_penalty(graph_penalty)
                .fit(&train)?;

            let prediction = model.predict(valid.records());
            let residual = &prediction - valid.targets();
            let rmse = residual.mapv(|v| v * v).mean().unwrap().sqrt();
            let active = model
                .hyperplane()
                .iter()
                .filter(|w| w.abs() > 1e-3)
                .count();

            println!(
                "lambda1 {:>4.2} lambda2 {:>3.1} -> validation rmse {:.3}, {:>2} active features",
                penalty, graph_penalty, rmse, active
            );
        }
    }

    Ok(())
}
