//! TGSW sample types.
//!
//! A TGSW sample is a (k+1) x l matrix of TLWE samples: row (i, j) is an
//! encryption of zero with m * g_j added to component i, where g_j is the
//! j-th gadget value. This layout is what makes the external product a
//! plain decompose-transform-dot pipeline.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::fft::FftPolynomial;
use crate::params::TGswParams;
use crate::tlwe::{tlwe_encrypt_zero, TLweKey, TLweSample};

/// TGSW sample in coefficient domain.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TGswSample {
    /// (k+1) x l TLWE samples; the final row block offsets the body.
    pub rows: Vec<Vec<TLweSample>>,
    /// Gadget parameters of this sample.
    pub params: TGswParams,
    /// Noise variance of the underlying zero encryptions.
    pub current_variance: f64,
}

/// A TLWE sample with every polynomial in the transformed domain.
#[derive(Clone, Debug)]
pub struct TransformedTLweSample {
    /// Transformed mask polynomials.
    pub a: Vec<FftPolynomial>,
    /// Transformed body polynomial.
    pub b: FftPolynomial,
}

/// TGSW sample with every polynomial transformed, ready for external
/// products in the blind-rotation loop.
#[derive(Clone, Debug)]
pub struct TransformedTGswSample {
    /// (k+1) x l transformed TLWE samples.
    pub rows: Vec<Vec<TransformedTLweSample>>,
    /// Gadget parameters of this sample.
    pub params: TGswParams,
    /// Noise variance of the underlying zero encryptions.
    pub current_variance: f64,
}

/// Encrypts a small integer (in practice a secret bit) as a TGSW sample.
pub fn tgsw_encrypt_int<R: Rng>(
    message: i32,
    alpha: f64,
    key: &TLweKey,
    params: &TGswParams,
    rng: &mut R,
) -> TGswSample {
    assert_eq!(key.params, params.tlwe, "key and gadget parameters disagree on the ring");
    let k = params.tlwe.mask_size;
    let l = params.decomp_length;

    let mut rows = Vec::with_capacity(k + 1);
    for i in 0..=k {
        let mut row = Vec::with_capacity(l);
        for j in 0..l {
            let mut sample = tlwe_encrypt_zero(alpha, key, rng);
            let shift = message.wrapping_mul(params.gadget(j));
            if i < k {
                sample.a[i].coeffs[0] = sample.a[i].coeffs[0].wrapping_add(shift);
            } else {
                sample.b.coeffs[0] = sample.b.coeffs[0].wrapping_add(shift);
            }
            row.push(sample);
        }
        rows.push(row);
    }
    TGswSample { rows, params: *params, current_variance: alpha * alpha }
}

impl TGswSample {
    /// Transforms every polynomial of the sample.
    pub fn transform(&self) -> TransformedTGswSample {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|sample| TransformedTLweSample {
                        a: sample.a.iter().map(|p| p.forward()).collect(),
                        b: sample.b.forward(),
                    })
                    .collect()
            })
            .collect();
        TransformedTGswSample {
            rows,
            params: self.params,
            current_variance: self.current_variance,
        }
    }
}
