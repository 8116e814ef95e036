//! Multi-key external product and CMux.

use crate::math::fft::FftPolynomial;
use crate::math::poly::TorusPolynomial;
use crate::params::MkParams;
use crate::tgsw::gadget_decompose;

use super::types::MkTLweSample;
use super::unienc::ExpandedSample;

/// Multi-key external product of a P-party TLWE sample by an expanded
/// sample owned by party p.
///
/// With u_a[i] and u_b the gadget decompositions of the mask and body
/// polynomials, the result follows the party-indexed summation pattern of
/// the construction:
///
/// - a'[i] = sum_t u_a[i][t] * y[t][p] for i != p
/// - a'[p] = sum_{i,t} u_a[i][t] * y[t][i] + sum_t u_b[t] * c1[t]
/// - b'    = sum_{i,t} u_a[i][t] * x[t][i] + sum_t u_b[t] * c0[t]
///
/// Every product is inverse-transformed on its own and accumulated in the
/// coefficient domain; summing first in the transform domain would push
/// the dynamic range past what f64 precision can carry exactly.
pub fn mk_external_product(
    sample: &MkTLweSample,
    expanded: &ExpandedSample,
    params: &MkParams,
) -> MkTLweSample {
    let parties = sample.parties();
    let p = expanded.party;
    let degree = sample.degree();
    let l = params.tgsw.decomp_length;
    assert!(p < parties, "expanded sample owner outside the party set");
    assert_eq!(degree, params.tlwe().degree, "sample and parameters disagree on the ring");

    let ua_fft: Vec<Vec<FftPolynomial>> = sample
        .a
        .iter()
        .map(|ai| gadget_decompose(ai, &params.tgsw).iter().map(|d| d.forward()).collect())
        .collect();
    let ub_fft: Vec<FftPolynomial> =
        gadget_decompose(&sample.b, &params.tgsw).iter().map(|d| d.forward()).collect();

    let mut out_a: Vec<TorusPolynomial> =
        (0..parties).map(|_| TorusPolynomial::zero(degree)).collect();
    let mut out_b = TorusPolynomial::zero(degree);

    for i in 0..parties {
        for t in 0..l {
            let digit = &ua_fft[i][t];
            if i != p {
                let contribution = digit.mul(&expanded.y[t][p]).inverse();
                out_a[i] += &contribution;
            }
            out_a[p] += &digit.mul(&expanded.y[t][i]).inverse();
            out_b += &digit.mul(&expanded.x[t][i]).inverse();
        }
    }
    for t in 0..l {
        out_a[p] += &ub_fft[t].mul(&expanded.c1[t]).inverse();
        out_b += &ub_fft[t].mul(&expanded.c0[t]).inverse();
    }

    // Additive noise model: (P+1) l dot products of balanced digits
    // against the expanded columns, plus the decomposition rounding.
    let n = degree as f64;
    let half_bg = params.tgsw.half_bg as f64;
    let decomp_err = 2f64.powi(-((l as u32 * params.tgsw.bg_bits + 1) as i32));
    let variance = sample.current_variance
        + ((parties + 1) * l) as f64 * n * half_bg * half_bg * expanded.current_variance
        + ((parties + 1) as f64) * n * decomp_err * decomp_err;

    MkTLweSample { a: out_a, b: out_b, current_variance: variance }
}

/// One step of the multi-key blind rotation: acc picks up the rotation by
/// the owner's encrypted secret bit. Zero rotations are skipped.
pub fn mk_cmux(
    acc: &mut MkTLweSample,
    expanded: &ExpandedSample,
    rotation: usize,
    params: &MkParams,
) {
    if rotation == 0 {
        return;
    }
    let shifted = acc.mul_by_xai_minus_one(rotation);
    let delta = mk_external_product(&shifted, expanded, params);
    // delta's variance already carries the rotated accumulator's noise;
    // it replaces the tracked value instead of adding to it.
    let variance = delta.current_variance;
    acc.add_assign(&delta);
    acc.current_variance = variance;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::fft::mul_int_torus;
    use crate::math::poly::IntPolynomial;
    use crate::math::torus::encode_message;
    use crate::params::{MkParams, TGswParams, TLweParams};
    use crate::tlwe::TLweKey;
    use crate::mk::types::{PublicKey, SharedKey};
    use crate::mk::unienc::{expand, uni_encrypt};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn small_params(parties: usize) -> MkParams {
        let mut params = MkParams::default_128(parties);
        let tlwe = TLweParams::new(256, 1, params.tlwe().min_noise, params.tlwe().max_noise);
        params.tgsw = TGswParams::new(4, 7, tlwe);
        params
    }

    struct Fixture {
        params: MkParams,
        keys: Vec<TLweKey>,
        pubkeys: Vec<PublicKey>,
        shared: SharedKey,
    }

    fn fixture(parties: usize, seed: u64) -> Fixture {
        let params = small_params(parties);
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let shared = SharedKey::generate(&params, &mut rng);
        let keys: Vec<TLweKey> =
            (0..parties).map(|_| TLweKey::generate(*params.tlwe(), &mut rng)).collect();
        let pubkeys: Vec<PublicKey> = keys
            .iter()
            .map(|k| PublicKey::generate(k, &shared, &params, &mut rng))
            .collect();
        Fixture { params, keys, pubkeys, shared }
    }

    fn mk_phase(sample: &MkTLweSample, keys: &[TLweKey]) -> TorusPolynomial {
        let mut phase = sample.b.clone();
        for (ai, key) in sample.a.iter().zip(keys.iter()) {
            phase -= &mul_int_torus(&key.key[0], ai);
        }
        phase
    }

    fn encrypt_bit(f: &Fixture, party: usize, bit: i32, seed: u64) -> ExpandedSample {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let degree = f.params.tlwe().degree;
        let mut message = IntPolynomial::zero(degree);
        message.coeffs[0] = bit;
        let uni = uni_encrypt(
            &message,
            &f.keys[party],
            &f.pubkeys[party],
            &f.shared,
            &f.params,
            &mut rng,
        );
        expand(&uni, party, &f.pubkeys, &f.params)
    }

    #[test]
    fn test_mk_external_product_by_zero() {
        let f = fixture(2, 61);
        let degree = f.params.tlwe().degree;
        let mu = encode_message(1, 8);
        let acc =
            MkTLweSample::noiseless_trivial(TorusPolynomial::filled(mu, degree), 2);

        for party in 0..2 {
            let expanded = encrypt_bit(&f, party, 0, 610 + party as u64);
            let product = mk_external_product(&acc, &expanded, &f.params);
            let phase = mk_phase(&product, &f.keys);
            assert!(phase.max_abs() < 1 << 24, "party {} phase {}", party, phase.max_abs());
        }
    }

    #[test]
    fn test_mk_external_product_by_one() {
        let f = fixture(2, 62);
        let degree = f.params.tlwe().degree;
        let mu = encode_message(1, 8);
        let message = TorusPolynomial::filled(mu, degree);
        let acc = MkTLweSample::noiseless_trivial(message.clone(), 2);

        for party in 0..2 {
            let expanded = encrypt_bit(&f, party, 1, 620 + party as u64);
            let product = mk_external_product(&acc, &expanded, &f.params);
            let phase = mk_phase(&product, &f.keys);
            for i in 0..degree {
                let err = phase.coeffs[i].wrapping_sub(message.coeffs[i]);
                assert!(err.abs() < 1 << 24, "party {} coeff {} err {}", party, i, err);
            }
        }
    }

    #[test]
    fn test_mk_cmux_selects_rotation() {
        // Scenario with three parties: an encrypted zero bit leaves the
        // accumulator unchanged up to noise, an encrypted one bit rotates
        // it.
        let f = fixture(3, 63);
        let degree = f.params.tlwe().degree;
        let mu = encode_message(1, 8);
        let mut v = TorusPolynomial::zero(degree);
        v.coeffs[0] = mu;
        let rotation = 5usize;

        for (party, bit) in [(0usize, 0i32), (1, 1), (2, 0), (2, 1)] {
            let expanded = encrypt_bit(&f, party, bit, 630 + 4 * party as u64 + bit as u64);
            let mut acc = MkTLweSample::noiseless_trivial(v.clone(), 3);
            mk_cmux(&mut acc, &expanded, rotation, &f.params);

            let expected = if bit == 1 { v.mul_by_xai(rotation) } else { v.clone() };
            let phase = mk_phase(&acc, &f.keys);
            for i in 0..degree {
                let err = phase.coeffs[i].wrapping_sub(expected.coeffs[i]);
                assert!(
                    err.abs() < 1 << 24,
                    "party {} bit {} coeff {} err {}",
                    party,
                    bit,
                    i,
                    err
                );
            }
        }
    }
}
