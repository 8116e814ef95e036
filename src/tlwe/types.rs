//! TLWE key and sample types.

use serde::{Deserialize, Serialize};

use crate::lwe::LweSample;
use crate::math::poly::{IntPolynomial, TorusPolynomial};
use crate::params::TLweParams;

/// TLWE secret key: k polynomials with uniform {0, 1} coefficients.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TLweKey {
    /// Parameter set the key was generated for.
    pub params: TLweParams,
    /// Secret polynomials.
    pub key: Vec<IntPolynomial>,
}

/// TLWE sample: k mask polynomials and a body polynomial.
///
/// The invariant is that b - sum_j a_j * s_j approximates the plaintext
/// polynomial.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TLweSample {
    /// Mask polynomials.
    pub a: Vec<TorusPolynomial>,
    /// Body polynomial.
    pub b: TorusPolynomial,
    /// Accumulated noise variance estimate.
    pub current_variance: f64,
}

impl TLweSample {
    /// The all-zero sample for the given parameters.
    pub fn zero(params: &TLweParams) -> Self {
        Self {
            a: (0..params.mask_size).map(|_| TorusPolynomial::zero(params.degree)).collect(),
            b: TorusPolynomial::zero(params.degree),
            current_variance: 0.0,
        }
    }

    /// A noiseless encryption of `mu`: zero mask, body mu.
    pub fn noiseless_trivial(mu: TorusPolynomial, mask_size: usize) -> Self {
        let degree = mu.degree();
        Self {
            a: (0..mask_size).map(|_| TorusPolynomial::zero(degree)).collect(),
            b: mu,
            current_variance: 0.0,
        }
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.b.degree()
    }

    /// Number of mask polynomials k.
    pub fn mask_size(&self) -> usize {
        self.a.len()
    }

    /// Adds another sample componentwise; variances add.
    pub fn add_assign(&mut self, rhs: &TLweSample) {
        assert_eq!(self.mask_size(), rhs.mask_size(), "sample mask sizes must match");
        for (x, y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x += y;
        }
        self.b += &rhs.b;
        self.current_variance += rhs.current_variance;
    }

    /// Subtracts another sample componentwise; variances add.
    pub fn sub_assign(&mut self, rhs: &TLweSample) {
        assert_eq!(self.mask_size(), rhs.mask_size(), "sample mask sizes must match");
        for (x, y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x -= y;
        }
        self.b -= &rhs.b;
        self.current_variance += rhs.current_variance;
    }

    /// Multiplies every polynomial of the sample by X^a - 1.
    pub fn mul_by_xai_minus_one(&self, rotation: usize) -> Self {
        Self {
            a: self.a.iter().map(|p| p.mul_by_xai_minus_one(rotation)).collect(),
            b: self.b.mul_by_xai_minus_one(rotation),
            current_variance: self.current_variance,
        }
    }

    /// Multiplies every polynomial of the sample by X^a.
    pub fn mul_by_xai(&self, rotation: usize) -> Self {
        Self {
            a: self.a.iter().map(|p| p.mul_by_xai(rotation)).collect(),
            b: self.b.mul_by_xai(rotation),
            current_variance: self.current_variance,
        }
    }

    /// Extracts the LWE sample whose phase is the constant coefficient of
    /// this sample's phase polynomial.
    ///
    /// The mask of the extracted sample is the reversed polynomial with the
    /// anticyclic sign: a_lwe[j*N] = a_j[0] and a_lwe[j*N + i] = -a_j[N - i]
    /// for i > 0. The matching LWE key is [`TLweKey::extract_lwe_key`].
    pub fn extract_sample(&self) -> LweSample {
        let n = self.degree();
        let k = self.mask_size();
        let mut a = Vec::with_capacity(k * n);
        for poly in &self.a {
            a.push(poly.coeffs[0]);
            for i in 1..n {
                a.push(poly.coeffs[n - i].wrapping_neg());
            }
        }
        LweSample { a, b: self.b.coeffs[0], current_variance: self.current_variance }
    }
}
