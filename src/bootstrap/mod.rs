//! The gate-bootstrapping core: CMux, blind rotation, extraction and the
//! full bootstrap.
//!
//! After every homomorphic gate the ciphertext noise has grown; the
//! bootstrap refreshes it by homomorphically evaluating the decryption of
//! the sample inside the exponent of a test polynomial. The rotation count
//! is encrypted bit by bit in the bootstrapping key, so the whole loop is
//! n CMux steps followed by one sample extraction.

use rand::Rng;

use crate::ks::{keyswitch, KeySwitchKey};
use crate::lwe::{LweKey, LweSample};
use crate::math::fft::prewarm_transforms;
use crate::math::poly::TorusPolynomial;
use crate::math::torus::{mod_switch_from_torus32, Torus32};
use crate::params::{LweParams, TGswParams};
use crate::tgsw::{external_product, tgsw_encrypt_int, TransformedTGswSample};
use crate::tlwe::{TLweKey, TLweSample};

/// Bootstrapping key: one transformed TGSW sample per input secret bit.
///
/// Sample i encrypts s_i of the input LWE key under the ring key, so a
/// CMux against it rotates the accumulator by s_i times the requested
/// amount without revealing s_i.
#[derive(Clone, Debug)]
pub struct BootstrapKey {
    /// Parameter set of the LWE samples this key can bootstrap.
    pub in_params: LweParams,
    /// Gadget parameters shared by all samples.
    pub tgsw_params: TGswParams,
    /// n transformed TGSW samples.
    pub samples: Vec<TransformedTGswSample>,
}

impl BootstrapKey {
    /// Encrypts every bit of `lwe_key` under `ring_key` and transforms the
    /// result.
    ///
    /// Also prewarms the transform-plan cache for the ring degree, so the
    /// bootstrap hot path never constructs a plan.
    pub fn generate<R: Rng>(
        lwe_key: &LweKey,
        ring_key: &TLweKey,
        params: &TGswParams,
        rng: &mut R,
    ) -> Self {
        assert_eq!(ring_key.params, params.tlwe, "ring key and gadget parameters disagree");
        prewarm_transforms(params.tlwe.degree);
        tracing::debug!(n = lwe_key.dimension(), "generating bootstrapping key");
        let alpha = params.tlwe.min_noise;
        let samples = lwe_key
            .key
            .iter()
            .map(|&bit| tgsw_encrypt_int(bit, alpha, ring_key, params, rng).transform())
            .collect();
        Self { in_params: lwe_key.params, tgsw_params: *params, samples }
    }
}

/// One step of the blind rotation.
///
/// Replaces acc with acc + bk x ((X^rotation - 1) * acc), which rotates
/// acc by `rotation` positions exactly when the encrypted bit is one. A
/// zero rotation is a no-op and is skipped.
pub fn cmux(acc: &mut TLweSample, bk: &TransformedTGswSample, rotation: usize) {
    if rotation == 0 {
        return;
    }
    let shifted = acc.mul_by_xai_minus_one(rotation);
    let delta = external_product(bk, &shifted);
    // The new accumulator is the rotated old one plus the product noise;
    // delta's variance already carries both, so it replaces rather than
    // adds to the tracked value.
    let variance = delta.current_variance;
    acc.add_assign(&delta);
    acc.current_variance = variance;
}

/// Rotates the accumulator by sum_i s_i * rotations[i] positions, where
/// the s_i are the secret bits hidden in the bootstrapping key.
pub fn blind_rotate(acc: &mut TLweSample, bk: &BootstrapKey, rotations: &[usize]) {
    assert_eq!(
        rotations.len(),
        bk.samples.len(),
        "rotation count must match the bootstrapping key"
    );
    for (sample, &rotation) in bk.samples.iter().zip(rotations.iter()) {
        cmux(acc, sample, rotation);
    }
}

/// Blind-rotates a test polynomial and extracts the constant coefficient.
///
/// The accumulator starts at the trivial encryption of X^(2N - bar_b) * v;
/// after the rotation the extracted LWE sample encrypts the coefficient of
/// X^(bar_b - sum_i s_i * bar_a[i]) in v, negated whenever the index wraps
/// past N.
pub fn blind_rotate_and_extract(
    v: &TorusPolynomial,
    bk: &BootstrapKey,
    bar_b: usize,
    bar_a: &[usize],
) -> LweSample {
    let positions = 2 * v.degree();
    assert!(bar_b < positions, "rotation index out of range");
    let shifted = v.mul_by_xai((positions - bar_b) % positions);
    let mut acc = TLweSample::noiseless_trivial(shifted, bk.tgsw_params.tlwe.mask_size);
    blind_rotate(&mut acc, bk, bar_a);
    acc.extract_sample()
}

/// Bootstrap without the final key switch.
///
/// Mod-switches the sample into 2N rotation positions and blind-rotates
/// the constant test polynomial [mu, ..., mu]; the output lives in the
/// extracted parameter set and encrypts +mu or -mu according to the sign
/// of the input phase.
pub fn bootstrap_wo_ks(bk: &BootstrapKey, mu: Torus32, x: &LweSample) -> LweSample {
    assert_eq!(
        x.dimension(),
        bk.in_params.dimension,
        "sample and bootstrapping key are from different parameter sets"
    );
    let degree = bk.tgsw_params.tlwe.degree;
    let positions = 2 * degree;
    let bar_b = mod_switch_from_torus32(x.b, positions);
    let bar_a: Vec<usize> =
        x.a.iter().map(|&ai| mod_switch_from_torus32(ai, positions)).collect();
    let test_poly = TorusPolynomial::filled(mu, degree);
    blind_rotate_and_extract(&test_poly, bk, bar_b, &bar_a)
}

/// The full bootstrap: refresh the noise of `x` and return to its
/// original parameter set.
pub fn bootstrap(
    bk: &BootstrapKey,
    ks: &KeySwitchKey,
    mu: Torus32,
    x: &LweSample,
) -> LweSample {
    keyswitch(ks, &bootstrap_wo_ks(bk, mu, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::{lwe_encrypt, lwe_phase};
    use crate::math::torus::encode_message;
    use crate::params::SchemeParams;
    use crate::tlwe::tlwe_phase;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    struct Fixture {
        params: SchemeParams,
        lwe_key: LweKey,
        ring_key: TLweKey,
        extracted_key: LweKey,
        bk: BootstrapKey,
    }

    fn fixture(seed: u64) -> Fixture {
        let params = SchemeParams::default_128();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let lwe_key = LweKey::generate(params.lwe, &mut rng);
        let ring_key = TLweKey::generate(*params.tlwe(), &mut rng);
        let extracted_key = ring_key.extract_lwe_key();
        let bk = BootstrapKey::generate(&lwe_key, &ring_key, &params.tgsw, &mut rng);
        Fixture { params, lwe_key, ring_key, extracted_key, bk }
    }

    #[test]
    fn test_cmux_zero_rotation_is_noop() {
        let f = fixture(40);
        let mu = encode_message(1, 8);
        let mut acc = TLweSample::noiseless_trivial(
            TorusPolynomial::filled(mu, f.params.tlwe().degree),
            f.params.tlwe().mask_size,
        );
        let before = acc.b.coeffs.clone();
        cmux(&mut acc, &f.bk.samples[0], 0);
        assert_eq!(acc.b.coeffs, before);
        assert!(acc.a[0].coeffs.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_cmux_rotates_by_secret_bit() {
        let f = fixture(41);
        let mu = encode_message(1, 8);
        let degree = f.params.tlwe().degree;
        let mut v = TorusPolynomial::zero(degree);
        v.coeffs[0] = mu;

        // Find one key bit of each value so both CMux branches are
        // exercised.
        let one = f.lwe_key.key.iter().position(|&b| b == 1).unwrap();
        let zero = f.lwe_key.key.iter().position(|&b| b == 0).unwrap();
        let rotation = 3usize;

        for (idx, expected_shift) in [(one, rotation), (zero, 0)] {
            let mut acc =
                TLweSample::noiseless_trivial(v.clone(), f.params.tlwe().mask_size);
            cmux(&mut acc, &f.bk.samples[idx], rotation);
            let phase = tlwe_phase(&acc, &f.ring_key);
            let expected = v.mul_by_xai(expected_shift);
            for i in 0..degree {
                let err = phase.coeffs[i].wrapping_sub(expected.coeffs[i]);
                assert!(err.abs() < 1 << 25, "bit {} coeff {} err {}", idx, i, err);
            }
        }
    }

    #[test]
    fn test_extract_without_rotation() {
        // bar_b = 0 and all-zero rotations leave the test polynomial in
        // place: the extracted sample must decrypt to +mu.
        let f = fixture(42);
        let mu = encode_message(1, 8);
        let degree = f.params.tlwe().degree;
        let test_poly = TorusPolynomial::filled(mu, degree);
        let bar_a = vec![0usize; f.params.lwe.dimension];

        let out = blind_rotate_and_extract(&test_poly, &f.bk, 0, &bar_a);
        let phase = lwe_phase(&out, &f.extracted_key);
        assert_eq!(phase, mu);
    }

    #[test]
    fn test_extract_offset_by_one() {
        // bar_b = 1 with v = [mu, 0, ..., 0] selects a zero coefficient of
        // the test polynomial.
        let f = fixture(43);
        let mu = encode_message(1, 8);
        let degree = f.params.tlwe().degree;
        let mut v = TorusPolynomial::zero(degree);
        v.coeffs[0] = mu;
        let bar_a = vec![0usize; f.params.lwe.dimension];

        let out = blind_rotate_and_extract(&v, &f.bk, 1, &bar_a);
        let phase = lwe_phase(&out, &f.extracted_key);
        assert_eq!(phase, 0);
    }

    #[test]
    fn test_bootstrap_wo_ks_sign() {
        let f = fixture(44);
        let mut rng = ChaCha20Rng::seed_from_u64(440);
        let mu = encode_message(1, 8);

        for message in [mu, mu.wrapping_neg()] {
            let x = lwe_encrypt(message, f.params.lwe.min_noise, &f.lwe_key, &mut rng);
            let refreshed = bootstrap_wo_ks(&f.bk, mu, &x);
            let phase = lwe_phase(&refreshed, &f.extracted_key);
            let err = phase.wrapping_sub(message);
            assert!(err.abs() < 1 << 26, "message {} phase {}", message, phase);
        }
    }

    #[test]
    fn test_bootstrap_refreshes_variance() {
        let f = fixture(45);
        let mut rng = ChaCha20Rng::seed_from_u64(450);
        let ks = KeySwitchKey::generate(&f.extracted_key, &f.lwe_key, f.params.ks, &mut rng);

        let mu = encode_message(1, 8);
        let mut x = lwe_encrypt(mu, f.params.lwe.min_noise, &f.lwe_key, &mut rng);
        // Inflate the tracked variance; the refreshed variance must not
        // depend on it.
        x.current_variance = 1.0;

        let refreshed = bootstrap(&f.bk, &ks, mu, &x);
        assert!(refreshed.current_variance < 1e-3, "variance {}", refreshed.current_variance);
        let phase = lwe_phase(&refreshed, &f.lwe_key);
        let err = phase.wrapping_sub(mu);
        assert!(err.abs() < 1 << 27, "phase err {}", err);
    }
}
