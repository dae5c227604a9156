//! Normal (Gaussian) distribution.

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::{dvector, DMatrix, DVector};
use pc_core::{Error, Recurrence, Result};

use crate::baseclass::{DepId, DistId, Distribution};
use crate::cache::EvalCache;
use crate::math::{standard_normal_cdf, standard_normal_inv, standard_normal_pdf};

/// Tail mass left outside the practical bounds on each side.
const BOUND_TAIL: f64 = 1e-10;

/// Univariate normal distribution `N(mu, sigma)`.
#[derive(Debug)]
pub struct Normal {
    id: DistId,
    dep: DepId,
    mu: f64,
    sigma: f64,
}

impl Normal {
    /// Create `N(mu, sigma)`.
    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        if !mu.is_finite() || !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::Validation(format!(
                "Normal parameters must be finite with sigma > 0, got mu={mu}, sigma={sigma}"
            )));
        }
        Ok(Self { id: DistId::fresh(), dep: DepId::fresh(), mu, sigma })
    }

    /// The standard normal `N(0, 1)`.
    pub fn standard() -> Self {
        Self { id: DistId::fresh(), dep: DepId::fresh(), mu: 0.0, sigma: 1.0 }
    }

    fn check_axes(&self, nrows: usize) -> Result<()> {
        if nrows != 1 {
            return Err(Error::Validation(format!(
                "{self}: location must have 1 row, got {nrows}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Normal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Normal(mu={}, sigma={})", self.mu, self.sigma)
    }
}

impl Distribution for Normal {
    fn id(&self) -> DistId {
        self.id
    }

    fn dim(&self) -> usize {
        1
    }

    fn dependencies(&self) -> BTreeSet<DepId> {
        [self.dep].into_iter().collect()
    }

    fn eval_lower(&self, _cache: &mut EvalCache) -> Result<DVector<f64>> {
        Ok(dvector![self.mu + self.sigma * standard_normal_inv(BOUND_TAIL)])
    }

    fn eval_upper(&self, _cache: &mut EvalCache) -> Result<DVector<f64>> {
        Ok(dvector![self.mu + self.sigma * standard_normal_inv(1.0 - BOUND_TAIL)])
    }

    fn eval_fwd(&self, xloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        Ok(xloc.map(|x| standard_normal_cdf((x - self.mu) / self.sigma)))
    }

    fn eval_pdf(&self, xloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        Ok(xloc.map(|x| standard_normal_pdf((x - self.mu) / self.sigma) / self.sigma))
    }

    fn eval_inv(&self, uloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(uloc.nrows())?;
        Ok(uloc.map(|u| self.mu + self.sigma * standard_normal_inv(u)))
    }

    /// Raw moments by the recursion
    /// `m_k = mu * m_{k-1} + (k-1) * sigma^2 * m_{k-2}`.
    fn eval_mom(&self, key: &[u32]) -> Result<f64> {
        if key.len() != 1 {
            return Err(Error::Validation(format!(
                "{self}: moment key has {} axes, expected 1",
                key.len()
            )));
        }
        let order = key[0] as usize;
        let sigma2 = self.sigma * self.sigma;
        let mut moments = vec![1.0; order + 1];
        if order >= 1 {
            moments[1] = self.mu;
        }
        for k in 2..=order {
            moments[k] = self.mu * moments[k - 1] + ((k - 1) as f64) * sigma2 * moments[k - 2];
        }
        Ok(moments[order])
    }

    fn eval_ttr(&self, key: &[u32]) -> Result<Recurrence> {
        if key.len() != 1 {
            return Err(Error::Validation(format!(
                "{self}: recurrence key has {} axes, expected 1",
                key.len()
            )));
        }
        let sigma2 = self.sigma * self.sigma;
        Ok(Recurrence::new(dvector![self.mu], dvector![f64::from(key[0]) * sigma2]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::dmatrix;

    #[test]
    fn test_invalid_sigma() {
        assert!(Normal::new(0.0, 0.0).is_err());
        assert!(Normal::new(0.0, -1.0).is_err());
        assert!(Normal::new(f64::NAN, 1.0).is_err());
    }

    #[test]
    fn test_fwd_standard_values() {
        let dist = Normal::standard();
        let out = dist.fwd(&dmatrix![-1.0, 0.0, 1.0]).unwrap();
        assert_relative_eq!(out[(0, 0)], 0.1587, epsilon = 1e-4);
        assert_relative_eq!(out[(0, 1)], 0.5, epsilon = 1e-12);
        assert_relative_eq!(out[(0, 2)], 0.8413, epsilon = 1e-4);
    }

    #[test]
    fn test_inv_roundtrip() {
        let dist = Normal::new(2.0, 0.5).unwrap();
        let xloc = dmatrix![1.0, 2.0, 3.5];
        let back = dist.inv(&dist.fwd(&xloc).unwrap()).unwrap();
        for col in 0..3 {
            assert_relative_eq!(back[(0, col)], xloc[(0, col)], epsilon = 1e-9);
        }
    }

    #[test]
    fn test_raw_moments_standard() {
        let dist = Normal::standard();
        // E[X^k] = 0, 1, 0, 3, 0, 15 for k = 1..6
        let moments =
            dist.mom(&[vec![1], vec![2], vec![3], vec![4], vec![5], vec![6]]).unwrap();
        assert_eq!(moments, vec![0.0, 1.0, 0.0, 3.0, 0.0, 15.0]);
    }

    #[test]
    fn test_raw_moments_shifted() {
        let dist = Normal::new(1.0, 2.0).unwrap();
        // E[X] = mu, E[X^2] = mu^2 + sigma^2
        let moments = dist.mom(&[vec![1], vec![2]]).unwrap();
        assert_relative_eq!(moments[0], 1.0);
        assert_relative_eq!(moments[1], 5.0);
    }

    #[test]
    fn test_ttr() {
        let dist = Normal::new(3.0, 2.0).unwrap();
        let rec = dist.get_ttr(&[4]).unwrap();
        assert_eq!(rec.alpha, dvector![3.0]);
        assert_eq!(rec.beta, dvector![16.0]);
    }

    #[test]
    fn test_bounds_are_symmetric_about_mu() {
        let dist = Normal::new(5.0, 1.0).unwrap();
        let lo = dist.lower().unwrap()[0];
        let hi = dist.upper().unwrap()[0];
        assert_relative_eq!(hi - 5.0, 5.0 - lo, epsilon = 1e-9);
        assert!(lo < 0.0 && hi > 10.0);
    }
}
