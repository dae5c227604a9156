//! Uniform distribution on an interval.

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::{dvector, DMatrix, DVector};
use pc_core::{Error, Recurrence, Result};

use crate::baseclass::{DepId, DistId, Distribution};
use crate::cache::EvalCache;

/// Univariate uniform distribution on `[lower, upper]`.
#[derive(Debug)]
pub struct Uniform {
    id: DistId,
    dep: DepId,
    lower: f64,
    upper: f64,
}

impl Uniform {
    /// Create a uniform distribution on `[lower, upper]`.
    pub fn new(lower: f64, upper: f64) -> Result<Self> {
        if !lower.is_finite() || !upper.is_finite() || upper <= lower {
            return Err(Error::Validation(format!(
                "Uniform bounds must be finite with lower < upper, got ({lower}, {upper})"
            )));
        }
        Ok(Self { id: DistId::fresh(), dep: DepId::fresh(), lower, upper })
    }

    fn width(&self) -> f64 {
        self.upper - self.lower
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

impl fmt::Display for Uniform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uniform(lower={}, upper={})", self.lower, self.upper)
    }
}

impl Distribution for Uniform {
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
        Ok(dvector![self.lower])
    }

    fn eval_upper(&self, _cache: &mut EvalCache) -> Result<DVector<f64>> {
        Ok(dvector![self.upper])
    }

    fn eval_fwd(&self, xloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        Ok(xloc.map(|x| ((x - self.lower) / self.width()).clamp(0.0, 1.0)))
    }

    fn eval_pdf(&self, xloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        let density = 1.0 / self.width();
        Ok(xloc.map(|x| if (self.lower..=self.upper).contains(&x) { density } else { 0.0 }))
    }

    fn eval_inv(&self, uloc: &DMatrix<f64>, _cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(uloc.nrows())?;
        Ok(uloc.map(|u| self.lower + u.clamp(0.0, 1.0) * self.width()))
    }

    /// Raw moments: `E[X^k] = (b^(k+1) - a^(k+1)) / ((k+1)(b-a))`.
    fn eval_mom(&self, key: &[u32]) -> Result<f64> {
        if key.len() != 1 {
            return Err(Error::Validation(format!(
                "{self}: moment key has {} axes, expected 1",
                key.len()
            )));
        }
        let k1 = key[0] as i32 + 1;
        let numer = self.upper.powi(k1) - self.lower.powi(k1);
        Ok(numer / (f64::from(k1) * self.width()))
    }

    fn eval_ttr(&self, key: &[u32]) -> Result<Recurrence> {
        if key.len() != 1 {
            return Err(Error::Validation(format!(
                "{self}: recurrence key has {} axes, expected 1",
                key.len()
            )));
        }
        let k = f64::from(key[0]);
        let alpha = 0.5 * (self.lower + self.upper);
        let beta = k * k * self.width() * self.width() / (4.0 * (4.0 * k * k - 1.0));
        Ok(Recurrence::new(dvector![alpha], dvector![beta]))
    }
}
