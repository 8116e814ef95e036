//! Uni-encryption and expansion.
//!
//! Uni-encryption lets one party encrypt a message in a form that, after
//! the expansion against every party's public key, behaves like a ring-GSW
//! sample under the concatenation of all parties' keys. The shared
//! polynomials play the role of the gadget mask; the f pair carries the
//! encryption randomness r in gadget form so other parties can be grafted
//! in without knowing it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::fft::{mul_int_torus, FftPolynomial};
use crate::math::poly::{IntPolynomial, TorusPolynomial};
use crate::math::torus::Torus32;
use crate::params::MkParams;
use crate::tgsw::gadget_decompose;
use crate::tlwe::TLweKey;

use super::types::{PublicKey, SharedKey};

/// A uni-encrypted message: three ciphertext pairs, each an l-vector of
/// torus polynomials.
///
/// Per gadget index i:
/// - c0 = s * c1 + e + m * g_i, a ring encryption of the message
/// - d1 = r * shared.a_i + e + m * g_i, the message against the CRS
/// - d0 = r * public.b_i + e, the randomness against the own public key
/// - f0 = s * f1 + e + r * g_i, the randomness in gadget form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UniEncrypted {
    pub c0: Vec<TorusPolynomial>,
    pub c1: Vec<TorusPolynomial>,
    pub d0: Vec<TorusPolynomial>,
    pub d1: Vec<TorusPolynomial>,
    pub f0: Vec<TorusPolynomial>,
    pub f1: Vec<TorusPolynomial>,
    /// Noise variance of the fresh encryptions.
    pub current_variance: f64,
}

/// Scales an integer polynomial by a torus constant.
fn scale_by_gadget(p: &IntPolynomial, g: Torus32) -> TorusPolynomial {
    TorusPolynomial::from_coeffs(p.coeffs.iter().map(|&c| c.wrapping_mul(g)).collect())
}

/// Uni-encrypts `message` for the party owning `ring_key` and `public`.
pub fn uni_encrypt<R: Rng>(
    message: &IntPolynomial,
    ring_key: &TLweKey,
    public: &PublicKey,
    shared: &SharedKey,
    params: &MkParams,
    rng: &mut R,
) -> UniEncrypted {
    params.assert_single_mask();
    let degree = params.tlwe().degree;
    let l = params.tgsw.decomp_length;
    let alpha = params.tlwe().min_noise;
    assert_eq!(message.degree(), degree, "message degree must match the ring");

    let s = &ring_key.key[0];
    let r = IntPolynomial::uniform_binary(degree, rng);

    let mut out = UniEncrypted {
        c0: Vec::with_capacity(l),
        c1: Vec::with_capacity(l),
        d0: Vec::with_capacity(l),
        d1: Vec::with_capacity(l),
        f0: Vec::with_capacity(l),
        f1: Vec::with_capacity(l),
        current_variance: alpha * alpha,
    };

    for i in 0..l {
        let g = params.tgsw.gadget(i);
        let m_g = scale_by_gadget(message, g);
        let r_g = scale_by_gadget(&r, g);

        let c1 = TorusPolynomial::uniform(degree, rng);
        let mut c0 = mul_int_torus(s, &c1);
        c0 += &TorusPolynomial::gaussian(degree, alpha, rng);
        c0 += &m_g;

        let mut d1 = mul_int_torus(&r, &shared.a[i]);
        d1 += &TorusPolynomial::gaussian(degree, alpha, rng);
        d1 += &m_g;

        let mut d0 = mul_int_torus(&r, &public.b[i]);
        d0 += &TorusPolynomial::gaussian(degree, alpha, rng);

        let f1 = TorusPolynomial::uniform(degree, rng);
        let mut f0 = mul_int_torus(s, &f1);
        f0 += &TorusPolynomial::gaussian(degree, alpha, rng);
        f0 += &r_g;

        out.c0.push(c0);
        out.c1.push(c1);
        out.d0.push(d0);
        out.d1.push(d1);
        out.f0.push(f0);
        out.f1.push(f1);
    }
    out
}

/// A uni-encryption expanded against all parties' public keys, in the
/// transform domain.
///
/// x and y are l x P matrices; column p (the owner) holds d0 and d1, the
/// other columns graft party q in through the gadget decomposition of
/// b_q - b_p paired with the f vector.
#[derive(Clone, Debug)]
pub struct ExpandedSample {
    /// Index of the owning party.
    pub party: usize,
    /// x[i][q], l x P.
    pub x: Vec<Vec<FftPolynomial>>,
    /// y[i][q], l x P.
    pub y: Vec<Vec<FftPolynomial>>,
    /// Transformed c0 vector.
    pub c0: Vec<FftPolynomial>,
    /// Transformed c1 vector.
    pub c1: Vec<FftPolynomial>,
    /// First-principles estimate of the per-column noise variance.
    pub current_variance: f64,
}

/// Expands `uni`, owned by `party`, against all public keys.
pub fn expand(
    uni: &UniEncrypted,
    party: usize,
    pubkeys: &[PublicKey],
    params: &MkParams,
) -> ExpandedSample {
    let parties = pubkeys.len();
    assert!(party < parties, "owner index out of range");
    let l = params.tgsw.decomp_length;
    let degree = params.tlwe().degree;

    let f0_fft: Vec<FftPolynomial> = uni.f0.iter().map(|p| p.forward()).collect();
    let f1_fft: Vec<FftPolynomial> = uni.f1.iter().map(|p| p.forward()).collect();

    let mut x = Vec::with_capacity(l);
    let mut y = Vec::with_capacity(l);
    for i in 0..l {
        let mut x_row = Vec::with_capacity(parties);
        let mut y_row = Vec::with_capacity(parties);
        for q in 0..parties {
            if q == party {
                x_row.push(uni.d0[i].forward());
                y_row.push(uni.d1[i].forward());
                continue;
            }
            let diff = &pubkeys[q].b[i] - &pubkeys[party].b[i];
            let digits = gadget_decompose(&diff, &params.tgsw);
            let mut xq = uni.d0[i].forward();
            let mut yq = FftPolynomial::zero(degree);
            for (t, digit) in digits.iter().enumerate() {
                let u = digit.forward();
                xq.add_mul_assign(&u, &f0_fft[t]);
                yq.add_mul_assign(&u, &f1_fft[t]);
            }
            x_row.push(xq);
            y_row.push(yq);
        }
        x.push(x_row);
        y.push(y_row);
    }

    let c0 = uni.c0.iter().map(|p| p.forward()).collect();
    let c1 = uni.c1.iter().map(|p| p.forward()).collect();

    // The grafted columns pick up l inner products of gadget digits with
    // the f noise.
    let half_bg = params.tgsw.half_bg as f64;
    let variance = uni.current_variance
        * (1.0 + (l * degree) as f64 * half_bg * half_bg / 3.0);

    ExpandedSample { party, x, y, c0, c1, current_variance: variance }
}
