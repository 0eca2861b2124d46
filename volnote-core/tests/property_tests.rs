//! Property tests for engine invariants.
//!
//! Uses proptest to verify:
//! 1. Exposure bounds: every exposure lies in [0, 1] and moves by at most the cap
//! 2. Realized-vol default: the first step always reports the target vol
//! 3. Weight invariant: baskets off 1 by more than the tolerance are rejected
//! 4. Cholesky: the factor reproduces any positive-definite constant-correlation matrix

use proptest::prelude::*;
use volnote_core::domain::{StrategyParams, WeightItem};
use volnote_core::{
    cholesky, constant_correlation, validate_basket, AssetDynamics, BasketSimulator, RandomField,
    StrategyEvolver, ValidationError,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_params() -> impl Strategy<Value = StrategyParams> {
    (0.02..0.5_f64, 1usize..60, 0.01..=1.0_f64).prop_map(|(target_vol, lookback_bd, cap)| {
        StrategyParams {
            target_vol,
            lookback_bd,
            exposure_step_cap: cap,
        }
    })
}

fn arb_assets() -> impl Strategy<Value = Vec<AssetDynamics>> {
    prop::collection::vec(
        (20.0..500.0_f64, 0.05..0.9_f64, 0.0..0.05_f64).prop_map(|(spot, vol, div_yield)| {
            AssetDynamics {
                spot,
                vol,
                div_yield,
            }
        }),
        1..6,
    )
}

fn equal_weights(n: usize) -> Vec<f64> {
    vec![1.0 / n as f64; n]
}

// ── 1 & 2. Exposure bounds, vol default ──────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn exposure_stays_bounded_and_rate_limited(
        params in arb_params(),
        assets in arb_assets(),
        rho in 0.0..0.95_f64,
        rate in 0.0..0.08_f64,
        seed in any::<u64>(),
    ) {
        let steps = 120;
        let dt = 1.0 / 252.0;
        let weights = equal_weights(assets.len());
        let sim = BasketSimulator::new(&weights, &assets, rate, rho, steps, dt);
        let evolver = StrategyEvolver::new(params, 100.0, rate, dt);
        let field = RandomField::generate(4, steps, assets.len(), seed);

        for p in 0..4 {
            let path = evolver.evolve(&sim.simulate_path(field.path(p)));
            prop_assert_eq!(path.exposure.len(), steps);
            prop_assert_eq!(path.index.len(), steps + 1);

            let mut previous = 1.0;
            for &a in &path.exposure {
                prop_assert!((0.0..=1.0).contains(&a), "exposure {} out of bounds", a);
                prop_assert!(
                    (a - previous).abs() <= params.exposure_step_cap + 1e-12,
                    "step {} -> {} exceeds cap {}", previous, a, params.exposure_step_cap
                );
                previous = a;
            }
            prop_assert!(path.index.iter().all(|x| x.is_finite() && *x > 0.0));
            prop_assert!(path.sigma_hat.iter().all(|s| s.is_finite() && *s >= 0.0));
        }
    }

    #[test]
    fn first_step_reports_target_vol(params in arb_params(), seed in any::<u64>()) {
        let assets = vec![AssetDynamics { spot: 100.0, vol: 0.3, div_yield: 0.0 }; 2];
        let sim = BasketSimulator::new(&[0.5, 0.5], &assets, 0.03, 0.5, 10, 0.01);
        let evolver = StrategyEvolver::new(params, 100.0, 0.03, 0.01);
        let field = RandomField::generate(1, 10, 2, seed);
        let path = evolver.evolve(&sim.simulate_path(field.path(0)));

        prop_assert_eq!(path.sigma_hat[0], params.target_vol);
        if params.lookback_bd == 1 {
            // A one-value window never has two observations.
            prop_assert!(path.sigma_hat.iter().all(|&s| s == params.target_vol));
        }
    }
}

// ── 3. Weight invariant ──────────────────────────────────────────────

proptest! {
    #[test]
    fn off_balance_baskets_are_rejected(
        raw in prop::collection::vec(0.01..1.0_f64, 2..20),
        skew in prop_oneof![-0.5..-1e-5_f64, 1e-5..0.5_f64],
    ) {
        let total: f64 = raw.iter().sum();
        let mut basket: Vec<WeightItem> = raw
            .iter()
            .enumerate()
            .map(|(i, w)| WeightItem::new(format!("N{i}"), w / total))
            .collect();

        prop_assert!(validate_basket(&basket, basket.len()).is_ok());

        basket[0].weight += skew;
        let rejected = matches!(
            validate_basket(&basket, basket.len()),
            Err(ValidationError::WeightSum { .. })
        );
        prop_assert!(rejected);
    }
}

// ── 4. Cholesky ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn cholesky_reconstructs_constant_correlation(n in 1usize..12, frac in 0.0..0.98_f64) {
        // Positive definite iff rho in (-1/(n-1), 1); sample inside that range.
        let lower = if n > 1 { -1.0 / (n as f64 - 1.0) } else { -0.99 };
        let rho = lower + (1.0 - lower) * (0.01 + frac);
        prop_assume!(rho < 1.0);

        let a = constant_correlation(n, rho);
        let l = cholesky(&a);
        for i in 0..n {
            for j in 0..n {
                let v: f64 = (0..n).map(|k| l.get(i, k) * l.get(j, k)).sum();
                prop_assert!((v - a[i][j]).abs() < 1e-9, "({}, {}) {} vs {}", i, j, v, a[i][j]);
            }
        }
    }
}
