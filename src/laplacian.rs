//! Square roots of feature-graph Laplacians
//!
//! The graph penalty of the network-constrained lasso is `βᵀLβ` with
//! `L = diag(rowsum(W)) - W` the Laplacian of the feature graph. Rewriting the
//! penalty as `‖Sβ‖²` with `SᵀS = L` is what allows the estimator to hand the
//! whole problem to a plain lasso solver, so everything here revolves around
//! producing such an `S` and proving that it reproduces `L`.

use linfa::Float;
use linfa_linalg::eigh::*;
use ndarray::{Array2, ArrayBase, Data, Ix2};

use crate::error::{NcLassoError, Result};

/// Relative tolerance when checking the adjacency matrix for symmetry
const SYMMETRY_TOL: f64 = 1e-6;
/// Relative tolerance for the `SᵀS = L` self-check of the spectral factor
const GRAM_TOL: f64 = 1e-6;

/// Square root factor `S` of a feature-graph Laplacian, with `SᵀS = L`
///
/// The factor is built once per feature graph and borrowed by every
/// [`NcLassoParams`](crate::NcLassoParams) that fits against this graph. The
/// spectral construction runs a full symmetric eigendecomposition and is by
/// far the most expensive step of the pipeline, which is why the estimator
/// never rebuilds the factor on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct LaplacianSqrt<F> {
    factor: Array2<F>,
}

impl<F: Float> LaplacianSqrt<F> {
    /// Build a square root factor, choosing the construction automatically
    ///
    /// Sparse graphs get the exact incidence factor, which needs no
    /// decomposition and adds one synthetic row per edge to every subsequent
    /// fit. Once the graph has more edges than features the spectral factor
    /// is smaller, so denser graphs switch to the eigendecomposition.
    pub fn from_adjacency<D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<Self> {
        validate_adjacency(adjacency)?;
        if edge_count(adjacency) <= adjacency.nrows() {
            Ok(Self::incidence_of(adjacency))
        } else {
            Self::spectral_of(adjacency)
        }
    }

    /// Build the signed incidence factor, one row per edge of the graph
    ///
    /// A row for the edge `(u, v)` carries `+√w` at `u` and `-√w` at `v`, so
    /// the Gram matrix equals the Laplacian exactly and no decomposition is
    /// needed. Memory is O(edges · features).
    pub fn incidence<D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<Self> {
        validate_adjacency(adjacency)?;
        Ok(Self::incidence_of(adjacency))
    }

    /// Build the spectral factor `diag(√σ)·Uᵀ` from the eigendecomposition
    /// `L = U diag(σ) Uᵀ`
    ///
    /// The Laplacian is positive semi-definite, but roundoff can push zero
    /// eigenvalues slightly negative, so eigenvalues are clamped at zero
    /// before the square root. The factor is verified against the Laplacian
    /// and construction fails if the residual exceeds the tolerance.
    pub fn spectral<D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<Self> {
        validate_adjacency(adjacency)?;
        Self::spectral_of(adjacency)
    }

    fn incidence_of<D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Self {
        let nfeatures = adjacency.nrows();
        let mut factor = Array2::zeros((edge_count(adjacency), nfeatures));
        let mut row = 0;
        for u in 0..nfeatures {
            for v in (u + 1)..nfeatures {
                let weight = adjacency[(u, v)];
                if weight != F::zero() {
                    let root = weight.sqrt();
                    factor[(row, u)] = root;
                    factor[(row, v)] = -root;
                    row += 1;
                }
            }
        }
        LaplacianSqrt { factor }
    }

    fn spectral_of<D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<Self> {
        let lap = laplacian_of(adjacency);
        let (vals, vecs) = lap.eigh()?;
        let roots = vals.mapv(|v| v.max(F::zero()).sqrt());

        let mut factor = vecs.t().to_owned();
        for (mut row, &root) in factor.rows_mut().into_iter().zip(roots.iter()) {
            row *= root;
        }

        let sqrt = LaplacianSqrt { factor };
        sqrt.check_gram(&lap)?;
        Ok(sqrt)
    }

    /// Verify `SᵀS = L` up to a tolerance relative to the Laplacian scale
    fn check_gram(&self, laplacian: &Array2<F>) -> Result<()> {
        let gram = self.factor.t().dot(&self.factor);
        let scale = laplacian.iter().fold(F::zero(), |max, v| max.max(v.abs()));
        let tolerance = F::cast(GRAM_TOL) * scale.max(F::one());
        let residual = (&gram - laplacian)
            .iter()
            .fold(F::zero(), |max, v| max.max(v.abs()));

        if residual > tolerance {
            Err(NcLassoError::FactorCheckFailed {
                residual: residual.to_f32().unwrap(),
                tolerance: tolerance.to_f32().unwrap(),
            })
        } else {
            Ok(())
        }
    }

    /// The factor matrix, one column per feature
    pub fn factor(&self) -> &Array2<F> {
        &self.factor
    }

    /// Number of features the factor covers
    pub fn nfeatures(&self) -> usize {
        self.factor.ncols()
    }

    /// Number of synthetic rows a fit against this factor appends
    pub fn nrows(&self) -> usize {
        self.factor.nrows()
    }
}

/// Build the graph Laplacian `diag(rowsum(W)) - W` of a validated adjacency
/// matrix
///
/// Diagonal entries of the adjacency matrix cancel in the Laplacian and are
/// skipped, so every row of the result sums to zero by construction.
pub fn laplacian<F: Float, D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<Array2<F>> {
    validate_adjacency(adjacency)?;
    Ok(laplacian_of(adjacency))
}

fn laplacian_of<F: Float, D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Array2<F> {
    let nfeatures = adjacency.nrows();
    let mut lap = Array2::zeros((nfeatures, nfeatures));
    for i in 0..nfeatures {
        let mut degree = F::zero();
        for j in 0..nfeatures {
            if i == j {
                continue;
            }
            let weight = adjacency[(i, j)];
            degree += weight;
            lap[(i, j)] = -weight;
        }
        lap[(i, i)] = degree;
    }
    lap
}

fn edge_count<F: Float, D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> usize {
    let nfeatures = adjacency.nrows();
    let mut edges = 0;
    for u in 0..nfeatures {
        for v in (u + 1)..nfeatures {
            if adjacency[(u, v)] != F::zero() {
                edges += 1;
            }
        }
    }
    edges
}

fn validate_adjacency<F: Float, D: Data<Elem = F>>(adjacency: &ArrayBase<D, Ix2>) -> Result<()> {
    if adjacency.nrows() != adjacency.ncols() {
        return Err(NcLassoError::AdjacencyNotSquare(
            adjacency.nrows(),
            adjacency.ncols(),
        ));
    }

    let scale = adjacency.iter().fold(F::zero(), |max, w| max.max(w.abs()));
    let tolerance = F::cast(SYMMETRY_TOL) * scale.max(F::one());

    let mut asymmetry = F::zero();
    for ((i, j), &weight) in adjacency.indexed_iter() {
        if weight < F::zero() {
            return Err(NcLassoError::NegativeWeight {
                weight: weight.to_f32().unwrap(),
                row: i,
                col: j,
            });
        }
        if j > i {
            asymmetry = asymmetry.max((weight - adjacency[(j, i)]).abs());
        }
    }
    if asymmetry > tolerance {
        return Err(NcLassoError::AsymmetricAdjacency(
            asymmetry.to_f32().unwrap(),
        ));
    }

    Ok(())
}
