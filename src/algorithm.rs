use linfa::dataset::AsSingleTargets;
use linfa::prelude::Records;
use linfa::traits::{Fit, PredictInplace};
use linfa::{Dataset, DatasetBase, Float};
use linfa_elasticnet::{ElasticNet, ElasticNetParams};
use ndarray::{
    concatenate, Array1, Array2, ArrayBase, ArrayView1, Axis, CowArray, Data, Ix1, Ix2,
};

use crate::error::{NcLassoError, Result};
use crate::hyperparams::NcLassoValidParams;
use crate::NcLasso;

impl<F, D, T> Fit<ArrayBase<D, Ix2>, T, NcLassoError> for NcLassoValidParams<'_, F>
where
    F: Float,
    D: Data<Elem = F>,
    T: AsSingleTargets<Elem = F>,
{
    type Object = NcLasso<F>;

    /// Fit a network-constrained lasso model given a feature matrix `x` and a
    /// target variable `y`.
    ///
    /// The feature matrix `x` must have shape `(n_samples, n_features)`, the
    /// target variable `y` shape `(n_samples)`, and the borrowed square root
    /// factor must cover the same `n_features` columns.
    ///
    /// The graph penalty `graph_penalty * wᵀLw` is folded into the design by
    /// stacking the scaled factor rows below the records and shrinking
    /// everything by `1/√(1 + graph_penalty)`, which turns the problem into a
    /// plain lasso on the augmented system. The inner solver never sees the
    /// intercept: it is computed from the real rows alone before the
    /// synthetic rows are appended.
    fn fit(&self, dataset: &DatasetBase<ArrayBase<D, Ix2>, T>) -> Result<Self::Object> {
        let records = dataset.records();
        let targets = dataset.as_single_targets();

        let factor = self.laplacian_sqrt().factor();
        if factor.ncols() != records.nfeatures() {
            return Err(NcLassoError::PenaltyDimMismatch {
                factor: factor.ncols(),
                records: records.nfeatures(),
            });
        }
        if records.nsamples() != targets.len() {
            return Err(NcLassoError::SampleMismatch {
                records: records.nsamples(),
                targets: targets.len(),
            });
        }
        if targets.is_empty() {
            return Err(NcLassoError::NotEnoughSamples);
        }

        let (intercept, y) = compute_intercept(self.with_intercept(), targets);

        let graph_penalty = self.graph_penalty();
        let shrink = (F::one() + graph_penalty).sqrt().recip();
        // an edgeless graph contributes nothing, augmenting with its factor
        // would only distort the inner solver's sample normalization
        let augment = graph_penalty != F::zero() && !is_zero(factor);

        let (inner, rescale) = if augment {
            let root = graph_penalty.sqrt();
            let scaled = records.mapv(|v| v * shrink);
            let penalty_rows = factor.mapv(|v| v * root * shrink);
            let zeros = Array1::zeros(factor.nrows());
            let design = concatenate(Axis(0), &[scaled.view(), penalty_rows.view()]).unwrap();
            let response = concatenate(Axis(0), &[y.view(), zeros.view()]).unwrap();
            let model = self
                .inner_lasso(self.penalty() * shrink)
                .fit(&Dataset::new(design, response))?;
            (model, shrink)
        } else {
            let model = self
                .inner_lasso(self.penalty())
                .fit(&Dataset::new(records.to_owned(), y.into_owned()))?;
            (model, F::one())
        };

        // undo the row rescaling of the augmented design
        let hyperplane = inner.hyperplane().mapv(|v| v * rescale);

        Ok(NcLasso {
            hyperplane,
            intercept,
            penalty: self.penalty(),
            graph_penalty,
            duality_gap: inner.duality_gap(),
            n_steps: inner.n_steps(),
        })
    }
}

impl<F: Float> NcLassoValidParams<'_, F> {
    /// Inner lasso solver configured for the (possibly augmented) problem
    fn inner_lasso(&self, penalty: F) -> ElasticNetParams<F> {
        ElasticNet::lasso()
            .penalty(penalty)
            .with_intercept(false)
            .max_iterations(self.max_iterations())
            .tolerance(self.tolerance())
    }
}

impl<F: Float, D: Data<Elem = F>> PredictInplace<ArrayBase<D, Ix2>, Array1<F>> for NcLasso<F> {
    /// Given an input matrix `X`, with shape `(n_samples, n_features)`,
    /// `predict` returns the target variable according to the
    /// network-constrained lasso learned from the training data distribution.
    fn predict_inplace(&self, x: &ArrayBase<D, Ix2>, y: &mut Array1<F>) {
        assert_eq!(
            x.nrows(),
            y.len(),
            "The number of data points must match the number of output targets."
        );
        assert_eq!(
            x.ncols(),
            self.hyperplane.len(),
            "Number of data features must match the number of features the model was trained with."
        );

        *y = x.dot(&self.hyperplane) + self.intercept;
    }

    fn default_target(&self, x: &ArrayBase<D, Ix2>) -> Array1<F> {
        Array1::zeros(x.nrows())
    }
}

/// View the fitted parameters and make predictions with a fitted
/// network-constrained lasso model
impl<F: Float> NcLasso<F> {
    /// Get the fitted hyperplane
    pub fn hyperplane(&self) -> &Array1<F> {
        &self.hyperplane
    }

    /// Get the fitted intercept, 0. if no intercept was fitted
    pub fn intercept(&self) -> F {
        self.intercept
    }

    /// Get the lasso penalty the model was fitted with
    pub fn penalty(&self) -> F {
        self.penalty
    }

    /// Get the graph penalty the model was fitted with
    pub fn graph_penalty(&self) -> F {
        self.graph_penalty
    }

    /// Get the duality gap reported by the inner solver
    pub fn duality_gap(&self) -> F {
        self.duality_gap
    }

    /// Get the number of steps taken by the inner solver
    pub fn n_steps(&self) -> u32 {
        self.n_steps
    }
}

/// Compute the intercept as the mean of `y` and center `y` if an intercept
/// should be used, use `0.0` as intercept and leave `y` unchanged otherwise.
fn compute_intercept<F: Float>(with_intercept: bool, y: ArrayView1<F>) -> (F, CowArray<F, Ix1>) {
    if with_intercept {
        let y_mean = y.mean().unwrap();
        let y_centered = &y - y_mean;
        (y_mean, y_centered.into())
    } else {
        (F::zero(), y.into())
    }
}

fn is_zero<F: Float>(factor: &Array2<F>) -> bool {
    factor.iter().all(|v| v.is_zero())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LaplacianSqrt, NcLassoParams};
    use approx::assert_abs_diff_eq;
    use linfa::traits::Predict;
    use linfa::ParamGuard;
    use ndarray::{array, s, Array};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Uniform;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<NcLasso<f64>>();
        has_autotraits::<NcLassoParams<'static, f64>>();
        has_autotraits::<NcLassoValidParams<'static, f64>>();
        has_autotraits::<NcLassoError>();
    }

    fn two_clique_adjacency(nfeatures: usize) -> Array2<f64> {
        let half = nfeatures / 2;
        let mut adjacency = Array2::zeros((nfeatures, nfeatures));
        for u in 0..nfeatures {
            for v in 0..nfeatures {
                if u != v && (u < half) == (v < half) {
                    adjacency[(u, v)] = 1.0;
                }
            }
        }
        adjacency
    }

    /// 20 features split into two 10-cliques; only the first clique carries
    /// signal, with equal weights
    fn two_clique_data(nsamples: usize, seed: u64) -> (Dataset<f64, f64>, Array2<f64>) {
        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let records = Array::random_using((nsamples, 20), Uniform::new(-1., 1.), &mut rng);
        let mut coefficients = Array1::zeros(20);
        coefficients.slice_mut(s![..10]).fill(1.0);
        let noise = Array::random_using(nsamples, Uniform::new(-0.5, 0.5), &mut rng);
        let targets = records.dot(&coefficients) + noise;
        (Dataset::new(records, targets), two_clique_adjacency(20))
    }

    fn edge_spread(hyperplane: &Array1<f64>, adjacency: &Array2<f64>) -> f64 {
        let mut total = 0.0;
        let mut edges = 0;
        for u in 0..adjacency.nrows() {
            for v in (u + 1)..adjacency.ncols() {
                if adjacency[(u, v)] != 0.0 {
                    total += (hyperplane[u] - hyperplane[v]).abs();
                    edges += 1;
                }
            }
        }
        total / edges as f64
    }

    fn rmse(prediction: &Array1<f64>, truth: &Array1<f64>) -> f64 {
        (prediction - truth).mapv(|v| v * v).mean().unwrap().sqrt()
    }

    #[test]
    fn negative_strengths_are_rejected() {
        let sqrt = LaplacianSqrt::from_adjacency(&Array2::<f64>::zeros((2, 2))).unwrap();

        let result = NcLasso::params(&sqrt).penalty(-0.1).check();
        assert!(matches!(result, Err(NcLassoError::InvalidL1Penalty(_))));

        let result = NcLasso::params(&sqrt).graph_penalty(-1.0).check();
        assert!(matches!(result, Err(NcLassoError::InvalidL2Penalty(_))));
    }

    #[test]
    fn mismatched_penalty_factor_is_rejected() {
        let mut rng = Xoshiro256Plus::seed_from_u64(0);
        let records = Array::random_using((100, 50), Uniform::new(-1., 1.), &mut rng);
        let targets = Array1::zeros(100);
        let sqrt = LaplacianSqrt::from_adjacency(&Array2::<f64>::zeros((60, 60))).unwrap();

        let result = NcLasso::params(&sqrt).fit(&Dataset::new(records, targets));
        assert!(matches!(
            result,
            Err(NcLassoError::PenaltyDimMismatch {
                factor: 60,
                records: 50
            })
        ));
    }

    #[test]
    fn no_graph_penalty_matches_plain_lasso() {
        let dataset = linfa_datasets::diabetes();
        let nfeatures = dataset.nfeatures();
        let sqrt =
            LaplacianSqrt::from_adjacency(&Array2::<f64>::zeros((nfeatures, nfeatures))).unwrap();

        let model = NcLasso::params(&sqrt)
            .penalty(0.3)
            .graph_penalty(0.0)
            .fit(&dataset)
            .unwrap();
        let reference = ElasticNet::lasso().penalty(0.3).fit(&dataset).unwrap();

        assert_abs_diff_eq!(model.hyperplane(), reference.hyperplane(), epsilon = 1e-12);
        assert_abs_diff_eq!(model.intercept(), reference.intercept(), epsilon = 1e-12);
    }

    #[test]
    fn edgeless_graph_matches_plain_lasso_for_any_graph_penalty() {
        // the incidence factor of an edgeless graph has no rows, the spectral
        // one is all zeros; both must degenerate to the plain lasso
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let records = Array::random_using((40, 8), Uniform::new(-1., 1.), &mut rng);
        let coefficients = array![1.4, 0.0, 0.0, -2.1, 0.0, 0.6, 0.0, 0.0];
        let targets = records.dot(&coefficients);
        let dataset = Dataset::new(records, targets);

        let adjacency = Array2::<f64>::zeros((8, 8));
        let reference = ElasticNet::lasso().penalty(0.05).fit(&dataset).unwrap();

        for sqrt in [
            LaplacianSqrt::incidence(&adjacency).unwrap(),
            LaplacianSqrt::spectral(&adjacency).unwrap(),
        ] {
            let model = NcLasso::params(&sqrt)
                .penalty(0.05)
                .graph_penalty(3.0)
                .fit(&dataset)
                .unwrap();

            assert_abs_diff_eq!(model.hyperplane(), reference.hyperplane(), epsilon = 1e-12);
            assert_abs_diff_eq!(model.intercept(), reference.intercept(), epsilon = 1e-12);
        }
    }

    #[test]
    fn zero_l1_gives_dense_graph_ridge_fit() {
        // y depends on the first feature only, but a strong tie between the
        // two features splits the weight evenly
        let mut rng = Xoshiro256Plus::seed_from_u64(3);
        let records = Array::random_using((200, 2), Uniform::new(-1., 1.), &mut rng);
        let targets = records.column(0).to_owned();
        let dataset = Dataset::new(records, targets);

        let adjacency = array![[0.0, 1.0], [1.0, 0.0]];
        let sqrt = LaplacianSqrt::from_adjacency(&adjacency).unwrap();
        let model = NcLasso::params(&sqrt)
            .penalty(0.0)
            .graph_penalty(500.0)
            .fit(&dataset)
            .unwrap();

        let hyperplane = model.hyperplane();
        assert!(hyperplane.iter().all(|&w| w.abs() > 0.1));
        assert_abs_diff_eq!(hyperplane[0], hyperplane[1], epsilon = 0.1);
    }

    #[test]
    fn graph_penalty_pulls_connected_coefficients_together() {
        let (dataset, adjacency) = two_clique_data(60, 1);
        let sqrt = LaplacianSqrt::from_adjacency(&adjacency).unwrap();

        let mut last = f64::INFINITY;
        for &graph_penalty in &[0.0, 0.5, 2.0, 8.0, 32.0] {
            let model = NcLasso::params(&sqrt)
                .penalty(0.02)
                .graph_penalty(graph_penalty)
                .tolerance(1e-8)
                .max_iterations(10_000)
                .fit(&dataset)
                .unwrap();

            let spread = edge_spread(model.hyperplane(), &adjacency);
            assert!(spread <= last + 1e-6);
            last = spread;
        }
    }

    #[test]
    fn clique_structure_improves_generalization() {
        let (train, adjacency) = two_clique_data(50, 7);
        let (test, _) = two_clique_data(200, 8);
        let sqrt = LaplacianSqrt::from_adjacency(&adjacency).unwrap();

        let nclasso = NcLasso::params(&sqrt)
            .penalty(0.02)
            .graph_penalty(1.0)
            .fit(&train)
            .unwrap();
        let lasso = ElasticNet::lasso().penalty(0.02).fit(&train).unwrap();

        // weight concentrates on the informative clique
        let weight = nclasso.hyperplane().mapv(f64::abs);
        let informative = weight.slice(s![..10]).sum();
        let idle = weight.slice(s![10..]).sum();
        assert!(informative > 4.0 * idle);

        // exploiting the clique structure pays off out of sample
        let nclasso_rmse = rmse(&nclasso.predict(test.records()), test.targets());
        let lasso_rmse = rmse(&lasso.predict(test.records()), test.targets());
        assert!(nclasso_rmse < lasso_rmse);
    }
}
