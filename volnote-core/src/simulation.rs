//! Correlated GBM paths folded into a fixed-weight basket level.
//!
//! Each asset follows
//! `S(t+1) = S(t) * exp((r - q - vol^2 / 2) * dt + vol * sqrt(dt) * (L z)_i)`
//! where `z` is the step's slice of the random field and `L` the Cholesky
//! factor of the constant-correlation matrix. The basket is the linear
//! combination of asset levels with the trade weights, never renormalized.

use crate::correlation::{cholesky, constant_correlation, CholeskyFactor};

/// Per-asset inputs of the diffusion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetDynamics {
    pub spot: f64,
    pub vol: f64,
    pub div_yield: f64,
}

/// Simulates basket-level paths for one market scenario.
///
/// Drift and diffusion scale are precomputed per asset; `simulate_path` only
/// reads `self`, so a simulator can be shared across worker threads.
#[derive(Debug, Clone)]
pub struct BasketSimulator {
    weights: Vec<f64>,
    spots: Vec<f64>,
    log_drift: Vec<f64>,
    diffusion: Vec<f64>,
    factor: CholeskyFactor,
    steps: usize,
}

impl BasketSimulator {
    /// # Panics
    /// If `weights` and `assets` differ in length.
    pub fn new(
        weights: &[f64],
        assets: &[AssetDynamics],
        rate: f64,
        rho: f64,
        steps: usize,
        dt: f64,
    ) -> Self {
        assert_eq!(
            weights.len(),
            assets.len(),
            "one weight per simulated asset is required"
        );
        let sqrt_dt = dt.sqrt();
        Self {
            weights: weights.to_vec(),
            spots: assets.iter().map(|a| a.spot).collect(),
            log_drift: assets
                .iter()
                .map(|a| (rate - a.div_yield - 0.5 * a.vol * a.vol) * dt)
                .collect(),
            diffusion: assets.iter().map(|a| a.vol * sqrt_dt).collect(),
            factor: cholesky(&constant_correlation(assets.len(), rho)),
            steps,
        }
    }

    pub fn assets(&self) -> usize {
        self.spots.len()
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn factor(&self) -> &CholeskyFactor {
        &self.factor
    }

    /// Basket levels `B(0), ..., B(steps)` for one path.
    ///
    /// # Panics
    /// If `shocks` does not hold exactly `steps * assets` values.
    pub fn simulate_path(&self, shocks: &[f64]) -> Vec<f64> {
        let n = self.assets();
        assert_eq!(
            shocks.len(),
            self.steps * n,
            "random field slice does not match the simulation grid"
        );

        let mut levels = self.spots.clone();
        let mut correlated = vec![0.0; n];
        let mut basket = Vec::with_capacity(self.steps + 1);
        basket.push(basket_level(&self.weights, &levels));

        for z in shocks.chunks_exact(n) {
            self.factor.correlate(z, &mut correlated);
            for i in 0..n {
                levels[i] *= (self.log_drift[i] + self.diffusion[i] * correlated[i]).exp();
            }
            basket.push(basket_level(&self.weights, &levels));
        }

        basket
    }
}

/// Weighted sum of asset levels.
pub fn basket_level(weights: &[f64], levels: &[f64]) -> f64 {
    weights.iter().zip(levels).map(|(w, s)| w * s).sum()
}
