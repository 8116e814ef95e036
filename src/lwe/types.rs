//! LWE key and sample types.

use serde::{Deserialize, Serialize};

use crate::math::torus::Torus32;
use crate::params::LweParams;

/// LWE secret key: a vector of n uniform bits.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LweKey {
    /// Parameter set the key was generated for.
    pub params: LweParams,
    /// Secret bits, stored as 0/1 integers.
    pub key: Vec<i32>,
}

impl LweKey {
    /// Wraps existing key bits. Used when deriving an LWE key from the
    /// coefficients of a ring key.
    pub fn from_bits(params: LweParams, key: Vec<i32>) -> Self {
        assert_eq!(key.len(), params.dimension, "key length must match the parameter set");
        Self { params, key }
    }

    /// Mask dimension n.
    pub fn dimension(&self) -> usize {
        self.key.len()
    }
}

/// LWE sample (a, b) with b approximately <a, s> + message.
///
/// `current_variance` tracks the accumulated noise variance through linear
/// operations; it is bookkeeping only and never consulted by decryption.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LweSample {
    /// Mask, n uniform torus elements.
    pub a: Vec<Torus32>,
    /// Body, <a, s> + message + noise.
    pub b: Torus32,
    /// Accumulated noise variance estimate.
    pub current_variance: f64,
}

impl LweSample {
    /// An all-zero sample of dimension n.
    pub fn zero(n: usize) -> Self {
        Self { a: vec![0; n], b: 0, current_variance: 0.0 }
    }

    /// A noiseless encryption of `mu` under any key: zero mask, body mu.
    pub fn noiseless_trivial(mu: Torus32, n: usize) -> Self {
        Self { a: vec![0; n], b: mu, current_variance: 0.0 }
    }

    /// Mask dimension n.
    pub fn dimension(&self) -> usize {
        self.a.len()
    }

    /// Adds another sample componentwise; variances add.
    pub fn add_assign(&mut self, rhs: &LweSample) {
        assert_eq!(self.dimension(), rhs.dimension(), "sample dimensions must match");
        for (x, &y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x = x.wrapping_add(y);
        }
        self.b = self.b.wrapping_add(rhs.b);
        self.current_variance += rhs.current_variance;
    }

    /// Subtracts another sample componentwise; variances add.
    pub fn sub_assign(&mut self, rhs: &LweSample) {
        assert_eq!(self.dimension(), rhs.dimension(), "sample dimensions must match");
        for (x, &y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x = x.wrapping_sub(y);
        }
        self.b = self.b.wrapping_sub(rhs.b);
        self.current_variance += rhs.current_variance;
    }

    /// Adds `factor` times another sample; the variance grows by the
    /// square of the factor.
    pub fn add_mul_assign(&mut self, factor: i32, rhs: &LweSample) {
        assert_eq!(self.dimension(), rhs.dimension(), "sample dimensions must match");
        for (x, &y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x = x.wrapping_add(y.wrapping_mul(factor));
        }
        self.b = self.b.wrapping_add(rhs.b.wrapping_mul(factor));
        self.current_variance += (factor as f64) * (factor as f64) * rhs.current_variance;
    }

    /// Negates the sample in place; the encoded message negates with it.
    pub fn negate(&mut self) {
        for x in self.a.iter_mut() {
            *x = x.wrapping_neg();
        }
        self.b = self.b.wrapping_neg();
    }
}
