//! TLWE encryption, phase and key extraction.

use rand::Rng;

use crate::lwe::LweKey;
use crate::math::fft::mul_int_torus;
use crate::math::poly::{IntPolynomial, TorusPolynomial};
use crate::params::TLweParams;

use super::types::{TLweKey, TLweSample};

impl TLweKey {
    /// Generates a fresh key of k binary polynomials.
    pub fn generate<R: Rng>(params: TLweParams, rng: &mut R) -> Self {
        let key =
            (0..params.mask_size).map(|_| IntPolynomial::uniform_binary(params.degree, rng)).collect();
        Self { params, key }
    }

    /// Flattens the key coefficients into the LWE key of dimension k*N that
    /// matches extracted samples.
    pub fn extract_lwe_key(&self) -> LweKey {
        let bits = self.key.iter().flat_map(|p| p.coeffs.iter().copied()).collect();
        LweKey::from_bits(self.params.extract_lwe_params(), bits)
    }
}

/// Encrypts the zero polynomial under `key` with noise deviation `alpha`.
///
/// Each mask polynomial is uniform; the body is sum_j a_j * s_j plus a
/// Gaussian noise polynomial.
pub fn tlwe_encrypt_zero<R: Rng>(alpha: f64, key: &TLweKey, rng: &mut R) -> TLweSample {
    let params = &key.params;
    let a: Vec<TorusPolynomial> =
        (0..params.mask_size).map(|_| TorusPolynomial::uniform(params.degree, rng)).collect();
    let mut b = TorusPolynomial::gaussian(params.degree, alpha, rng);
    for (aj, sj) in a.iter().zip(key.key.iter()) {
        b += &mul_int_torus(sj, aj);
    }
    TLweSample { a, b, current_variance: alpha * alpha }
}

/// Encrypts a plaintext polynomial under `key` with noise deviation
/// `alpha`.
pub fn tlwe_encrypt_poly<R: Rng>(
    message: &TorusPolynomial,
    alpha: f64,
    key: &TLweKey,
    rng: &mut R,
) -> TLweSample {
    assert_eq!(message.degree(), key.params.degree, "message degree must match the ring");
    let mut sample = tlwe_encrypt_zero(alpha, key, rng);
    sample.b += message;
    sample
}

/// The phase polynomial b - sum_j a_j * s_j.
pub fn tlwe_phase(sample: &TLweSample, key: &TLweKey) -> TorusPolynomial {
    assert_eq!(
        sample.mask_size(),
        key.key.len(),
        "sample and key are from different parameter sets"
    );
    let mut phase = sample.b.clone();
    for (aj, sj) in sample.a.iter().zip(key.key.iter()) {
        phase -= &mul_int_torus(sj, aj);
    }
    phase
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lwe::lwe_phase;
    use crate::math::torus::encode_message;
    use crate::params::SchemeParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_key(seed: u64) -> TLweKey {
        let params = *SchemeParams::default_128().tlwe();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        TLweKey::generate(params, &mut rng)
    }

    #[test]
    fn test_encrypt_zero_phase_small() {
        let key = test_key(0);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let sample = tlwe_encrypt_zero(key.params.min_noise, &key, &mut rng);
        let phase = tlwe_phase(&sample, &key);
        // The ring noise level is tiny; every phase coefficient must stay
        // far below the gate message amplitude of 2^29.
        assert!(phase.max_abs() < 1 << 20, "max phase {}", phase.max_abs());
    }

    #[test]
    fn test_encrypt_poly_roundtrip() {
        let key = test_key(2);
        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let mu = encode_message(1, 8);
        let message = TorusPolynomial::filled(mu, key.params.degree);
        let sample = tlwe_encrypt_poly(&message, key.params.min_noise, &key, &mut rng);
        let phase = tlwe_phase(&sample, &key);
        for (i, &c) in phase.coeffs.iter().enumerate() {
            let err = c.wrapping_sub(mu);
            assert!(err.abs() < 1 << 20, "coeff {} err {}", i, err);
        }
    }

    #[test]
    fn test_extract_matches_constant_coefficient() {
        let key = test_key(4);
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let mu = encode_message(3, 8);
        let mut message = TorusPolynomial::zero(key.params.degree);
        message.coeffs[0] = mu;
        let sample = tlwe_encrypt_poly(&message, key.params.min_noise, &key, &mut rng);

        let extracted = sample.extract_sample();
        let lwe_key = key.extract_lwe_key();
        let ring_phase = tlwe_phase(&sample, &key);
        let extracted_phase = lwe_phase(&extracted, &lwe_key);

        assert_eq!(extracted_phase, ring_phase.coeffs[0]);
        let err = extracted_phase.wrapping_sub(mu);
        assert!(err.abs() < 1 << 20, "err {}", err);
    }

    #[test]
    fn test_extract_trivial() {
        let params = *SchemeParams::default_128().tlwe();
        let mu = encode_message(-1, 8);
        let mut poly = TorusPolynomial::zero(params.degree);
        poly.coeffs[0] = mu;
        let trivial = TLweSample::noiseless_trivial(poly, params.mask_size);
        let extracted = trivial.extract_sample();
        assert_eq!(extracted.b, mu);
        assert!(extracted.a.iter().all(|&c| c == 0));
    }

    #[test]
    fn test_rotation_commutes_with_phase() {
        let key = test_key(6);
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let message = TorusPolynomial::filled(encode_message(1, 8), key.params.degree);
        let sample = tlwe_encrypt_poly(&message, key.params.min_noise, &key, &mut rng);

        let rotation = 37;
        let rotated = sample.mul_by_xai(rotation);
        let rotated_phase = tlwe_phase(&rotated, &key);
        let phase_rotated = tlwe_phase(&sample, &key).mul_by_xai(rotation);
        for i in 0..key.params.degree {
            let err = rotated_phase.coeffs[i].wrapping_sub(phase_rotated.coeffs[i]);
            assert!(err.abs() <= 2, "coeff {} err {}", i, err);
        }
    }
}
