//! Shared randomness, public keys and multi-key ring samples.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lwe::LweSample;
use crate::math::fft::mul_int_torus;
use crate::math::poly::TorusPolynomial;
use crate::params::MkParams;
use crate::tlwe::TLweKey;

/// The common reference string: one uniform torus polynomial per gadget
/// index, known to every party.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SharedKey {
    /// l uniform polynomials.
    pub a: Vec<TorusPolynomial>,
}

impl SharedKey {
    /// Draws the shared polynomials.
    pub fn generate<R: Rng>(params: &MkParams, rng: &mut R) -> Self {
        let degree = params.tlwe().degree;
        let a = (0..params.tgsw.decomp_length)
            .map(|_| TorusPolynomial::uniform(degree, rng))
            .collect();
        Self { a }
    }
}

/// A party's public key: b_i = s * a_i + e_i against the shared
/// polynomials.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PublicKey {
    /// l masked polynomials.
    pub b: Vec<TorusPolynomial>,
}

impl PublicKey {
    /// Publishes the party's ring key against the shared randomness.
    pub fn generate<R: Rng>(
        ring_key: &TLweKey,
        shared: &SharedKey,
        params: &MkParams,
        rng: &mut R,
    ) -> Self {
        params.assert_single_mask();
        let alpha = params.tlwe().min_noise;
        let s = &ring_key.key[0];
        let b = shared
            .a
            .iter()
            .map(|ai| {
                let mut bi = mul_int_torus(s, ai);
                bi += &TorusPolynomial::gaussian(ai.degree(), alpha, rng);
                bi
            })
            .collect();
        Self { b }
    }
}

/// Multi-key TLWE sample: one mask polynomial per party plus a body.
///
/// The invariant is that b - sum_p a_p * s_p approximates the plaintext
/// polynomial, where s_p is party p's ring key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MkTLweSample {
    /// One mask polynomial per party.
    pub a: Vec<TorusPolynomial>,
    /// Body polynomial.
    pub b: TorusPolynomial,
    /// Accumulated noise variance estimate.
    pub current_variance: f64,
}

impl MkTLweSample {
    /// A noiseless encryption of `mu` involving `parties` parties.
    pub fn noiseless_trivial(mu: TorusPolynomial, parties: usize) -> Self {
        let degree = mu.degree();
        Self {
            a: (0..parties).map(|_| TorusPolynomial::zero(degree)).collect(),
            b: mu,
            current_variance: 0.0,
        }
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.b.degree()
    }

    /// Number of participating parties P.
    pub fn parties(&self) -> usize {
        self.a.len()
    }

    /// Adds another sample componentwise; variances add.
    pub fn add_assign(&mut self, rhs: &MkTLweSample) {
        assert_eq!(self.parties(), rhs.parties(), "party counts must match");
        for (x, y) in self.a.iter_mut().zip(rhs.a.iter()) {
            *x += y;
        }
        self.b += &rhs.b;
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

    /// Extracts the flat multi-key LWE sample of the constant coefficient.
    ///
    /// Each party's block of the output mask is that party's polynomial
    /// reversed with the anticyclic sign, exactly as in the single-key
    /// extraction; the blocks are concatenated in party order.
    pub fn extract_sample(&self) -> LweSample {
        let n = self.degree();
        let mut a = Vec::with_capacity(self.parties() * n);
        for poly in &self.a {
            a.push(poly.coeffs[0]);
            for i in 1..n {
                a.push(poly.coeffs[n - i].wrapping_neg());
            }
        }
        LweSample { a, b: self.b.coeffs[0], current_variance: self.current_variance }
    }
}
