//! Special-function helpers shared by the distribution code.

use statrs::function::erf;
use statrs::function::gamma::ln_gamma;

/// `1 / sqrt(2π)` (precomputed to keep this crate const-friendly).
const INV_SQRT_2PI: f64 = 0.398_942_280_401_432_7;

fn ln_choose(n: u32, k: u32) -> f64 {
    // ln(n choose k) = ln Γ(n+1) - ln Γ(k+1) - ln Γ(n-k+1)
    let n1 = f64::from(n) + 1.0;
    let k1 = f64::from(k) + 1.0;
    let nk1 = f64::from(n - k) + 1.0;
    ln_gamma(n1) - ln_gamma(k1) - ln_gamma(nk1)
}

/// Binomial coefficient `C(n, k)` as an exact float; zero when `k > n`.
pub fn choose(n: u32, k: u32) -> f64 {
    if k > n {
        return 0.0;
    }
    // The coefficient is an integer, so rounding removes the ln-space noise.
    ln_choose(n, k).exp().round()
}

/// Multi-index binomial coefficient: the product of per-axis `C(k_i, j_i)`.
pub fn multi_choose(key: &[u32], sub: &[u32]) -> f64 {
    key.iter().zip(sub).map(|(&k, &j)| choose(k, j)).product()
}

/// Standard normal density.
pub fn standard_normal_pdf(x: f64) -> f64 {
    INV_SQRT_2PI * (-0.5 * x * x).exp()
}

/// Standard normal CDF via the complementary error function.
pub fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * erf::erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal quantile (inverse CDF).
///
/// Starts from the inverse error function and applies one Newton step, which
/// tightens the approximation to the CDF's own precision so that
/// `cdf(inv(p))` round-trips to floating-point tolerance.
pub fn standard_normal_inv(p: f64) -> f64 {
    if p <= 0.0 {
        return f64::NEG_INFINITY;
    }
    if p >= 1.0 {
        return f64::INFINITY;
    }
    let mut x = std::f64::consts::SQRT_2 * erf::erf_inv(2.0 * p - 1.0);
    let density = standard_normal_pdf(x);
    if density > 0.0 {
        x -= (standard_normal_cdf(x) - p) / density;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_choose_small_values() {
        assert_eq!(choose(0, 0), 1.0);
        assert_eq!(choose(4, 2), 6.0);
        assert_eq!(choose(10, 3), 120.0);
        assert_eq!(choose(3, 5), 0.0);
    }

    #[test]
    fn test_choose_pascal_rule() {
        for n in 1..30u32 {
            for k in 1..n {
                let lhs = choose(n, k);
                let rhs = choose(n - 1, k - 1) + choose(n - 1, k);
                assert_relative_eq!(lhs, rhs, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn test_multi_choose_is_per_axis_product() {
        assert_eq!(multi_choose(&[2, 3], &[1, 2]), 2.0 * 3.0);
        assert_eq!(multi_choose(&[2, 3], &[3, 0]), 0.0);
    }

    #[test]
    fn test_normal_cdf_known_values() {
        assert_relative_eq!(standard_normal_cdf(0.0), 0.5, epsilon = 1e-15);
        assert_relative_eq!(standard_normal_cdf(1.0), 0.841_344_746_068_543, epsilon = 1e-12);
        assert_relative_eq!(standard_normal_cdf(-1.0), 0.158_655_253_931_457, epsilon = 1e-12);
    }

    #[test]
    fn test_normal_inv_roundtrip() {
        for p in [1e-8, 1e-4, 0.1, 0.25, 0.5, 0.75, 0.9, 1.0 - 1e-4, 1.0 - 1e-8] {
            let x = standard_normal_inv(p);
            assert_relative_eq!(standard_normal_cdf(x), p, epsilon = 1e-11, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_normal_inv_edges() {
        assert_eq!(standard_normal_inv(0.0), f64::NEG_INFINITY);
        assert_eq!(standard_normal_inv(1.0), f64::INFINITY);
        assert_relative_eq!(standard_normal_inv(0.5), 0.0, epsilon = 1e-15);
    }
}
