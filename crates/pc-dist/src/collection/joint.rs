//! Independent joint distributions.

use std::collections::BTreeSet;
use std::fmt;

use nalgebra::{DMatrix, DVector};
use pc_core::{Error, Recurrence, Result};

use crate::baseclass::{DepId, DistId, DistRef, Distribution};
use crate::cache::EvalCache;

/// Product distribution of stochastically independent components.
///
/// Components keep their own dimensionality; the joint concatenates their
/// axes in construction order. Dependent components are rejected up front
/// since this container carries no decorrelation machinery.
#[derive(Debug)]
pub struct Joint {
    id: DistId,
    parts: Vec<DistRef>,
    offsets: Vec<usize>,
    dim: usize,
}

impl Joint {
    /// Combine independent components into one joint distribution.
    pub fn new(parts: Vec<DistRef>) -> Result<Self> {
        if parts.is_empty() {
            return Err(Error::Validation("Joint requires at least one component".into()));
        }
        for (idx, a) in parts.iter().enumerate() {
            for b in &parts[idx + 1..] {
                if a.shares_dependencies(b.as_ref()) {
                    return Err(Error::StochasticallyDependent(format!(
                        "Joint components '{a}' and '{b}' share a source of randomness"
                    )));
                }
            }
        }
        let mut offsets = Vec::with_capacity(parts.len());
        let mut dim = 0;
        for part in &parts {
            offsets.push(dim);
            dim += part.dim();
        }
        Ok(Self { id: DistId::fresh(), parts, offsets, dim })
    }

    fn check_axes(&self, nrows: usize) -> Result<()> {
        if nrows != self.dim {
            return Err(Error::Validation(format!(
                "{self}: location must have {} rows, got {nrows}",
                self.dim
            )));
        }
        Ok(())
    }

    fn blocks(&self) -> impl Iterator<Item = (&DistRef, usize, usize)> + '_ {
        self.parts
            .iter()
            .zip(&self.offsets)
            .map(|(part, &offset)| (part, offset, part.dim()))
    }

    /// Apply one memoized transform block-wise and reassemble the result.
    fn per_block(
        &self,
        loc: &DMatrix<f64>,
        cache: &mut EvalCache,
        eval: impl Fn(&DistRef, &DMatrix<f64>, &mut EvalCache) -> Result<DMatrix<f64>>,
    ) -> Result<DMatrix<f64>> {
        let mut out = DMatrix::zeros(self.dim, loc.ncols());
        for (part, offset, rows) in self.blocks() {
            let block = loc.rows(offset, rows).into_owned();
            let result = eval(part, &block, cache)?;
            out.rows_mut(offset, rows).copy_from(&result);
        }
        Ok(out)
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Joint(")?;
        for (idx, part) in self.parts.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

impl Distribution for Joint {
    fn id(&self) -> DistId {
        self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn dependencies(&self) -> BTreeSet<DepId> {
        self.parts.iter().flat_map(|part| part.dependencies()).collect()
    }

    fn eval_lower(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        let mut out = DVector::zeros(self.dim);
        for (part, offset, rows) in self.blocks() {
            out.rows_mut(offset, rows).copy_from(&part.get_lower(cache)?);
        }
        Ok(out)
    }

    fn eval_upper(&self, cache: &mut EvalCache) -> Result<DVector<f64>> {
        let mut out = DVector::zeros(self.dim);
        for (part, offset, rows) in self.blocks() {
            out.rows_mut(offset, rows).copy_from(&part.get_upper(cache)?);
        }
        Ok(out)
    }

    fn eval_fwd(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        self.per_block(xloc, cache, |part, block, cache| part.get_fwd(block, cache))
    }

    fn eval_pdf(&self, xloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(xloc.nrows())?;
        self.per_block(xloc, cache, |part, block, cache| part.get_pdf(block, cache))
    }

    fn eval_inv(&self, uloc: &DMatrix<f64>, cache: &mut EvalCache) -> Result<DMatrix<f64>> {
        self.check_axes(uloc.nrows())?;
        self.per_block(uloc, cache, |part, block, cache| part.get_inv(block, cache))
    }

    /// Independence factorizes the joint moment into the per-component ones.
    fn eval_mom(&self, key: &[u32]) -> Result<f64> {
        if key.len() != self.dim {
            return Err(Error::Validation(format!(
                "{self}: moment key has {} axes, expected {}",
                key.len(),
                self.dim
            )));
        }
        let mut out = 1.0;
        for (part, offset, rows) in self.blocks() {
            out *= part.get_mom(&key[offset..offset + rows])?;
        }
        Ok(out)
    }

    fn eval_ttr(&self, key: &[u32]) -> Result<Recurrence> {
        if key.len() != self.dim {
            return Err(Error::Validation(format!(
                "{self}: recurrence key has {} axes, expected {}",
                key.len(),
                self.dim
            )));
        }
        let mut alpha = DVector::zeros(self.dim);
        let mut beta = DVector::zeros(self.dim);
        for (part, offset, rows) in self.blocks() {
            let rec = part.get_ttr(&key[offset..offset + rows])?;
            alpha.rows_mut(offset, rows).copy_from(&rec.alpha);
            beta.rows_mut(offset, rows).copy_from(&rec.beta);
        }
        Ok(Recurrence::new(alpha, beta))
    }
}
