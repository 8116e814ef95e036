//! LWE encryption, phase and key generation.

use rand::Rng;

use crate::math::torus::{gaussian_torus32, uniform_torus32, Torus32};
use crate::params::LweParams;

use super::types::{LweKey, LweSample};

impl LweKey {
    /// Generates a fresh key of n uniform bits.
    pub fn generate<R: Rng>(params: LweParams, rng: &mut R) -> Self {
        let key = (0..params.dimension).map(|_| (rng.gen::<u32>() & 1) as i32).collect();
        Self { params, key }
    }
}

/// Encrypts a torus message under `key` with noise deviation `alpha`.
///
/// The mask is drawn uniformly; the body is the masked message plus a
/// Gaussian error: b = <a, s> + message + e.
pub fn lwe_encrypt<R: Rng>(
    message: Torus32,
    alpha: f64,
    key: &LweKey,
    rng: &mut R,
) -> LweSample {
    let n = key.dimension();
    let a: Vec<Torus32> = (0..n).map(|_| uniform_torus32(rng)).collect();
    let mut b = gaussian_torus32(rng, message, alpha);
    for (ai, &si) in a.iter().zip(key.key.iter()) {
        if si != 0 {
            b = b.wrapping_add(*ai);
        }
    }
    LweSample { a, b, current_variance: alpha * alpha }
}

/// The phase b - <a, s>, which approximates the encoded message.
pub fn lwe_phase(sample: &LweSample, key: &LweKey) -> Torus32 {
    assert_eq!(
        sample.dimension(),
        key.dimension(),
        "sample and key are from different parameter sets"
    );
    let mut phase = sample.b;
    for (&ai, &si) in sample.a.iter().zip(key.key.iter()) {
        if si != 0 {
            phase = phase.wrapping_sub(ai);
        }
    }
    phase
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::torus::encode_message;
    use crate::params::SchemeParams;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_key(seed: u64) -> LweKey {
        let params = SchemeParams::default_128().lwe;
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        LweKey::generate(params, &mut rng)
    }

    #[test]
    fn test_encrypt_phase_roundtrip() {
        let key = test_key(0);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let alpha = key.params.min_noise;

        for mu in [encode_message(1, 8), encode_message(-1, 8), encode_message(3, 8)] {
            let sample = lwe_encrypt(mu, alpha, &key, &mut rng);
            let phase = lwe_phase(&sample, &key);
            let err = phase.wrapping_sub(mu);
            assert!(err.abs() < 1 << 26, "phase error {} too large for {}", err, mu);
        }
    }

    #[test]
    fn test_noiseless_trivial_phase() {
        let key = test_key(2);
        let mu = encode_message(1, 8);
        let trivial = LweSample::noiseless_trivial(mu, key.dimension());
        assert_eq!(lwe_phase(&trivial, &key), mu);
    }

    #[test]
    fn test_linear_combination() {
        let key = test_key(3);
        let mut rng = ChaCha20Rng::seed_from_u64(4);
        let alpha = key.params.min_noise;
        let mu = encode_message(1, 8);

        let x = lwe_encrypt(mu, alpha, &key, &mut rng);
        let y = lwe_encrypt(mu, alpha, &key, &mut rng);

        // trivial(1/8) - x - y encodes 1/8 - 1/8 - 1/8 = -1/8: the NAND
        // bias of two true inputs.
        let mut combined = LweSample::noiseless_trivial(mu, key.dimension());
        combined.sub_assign(&x);
        combined.sub_assign(&y);

        let phase = lwe_phase(&combined, &key);
        let err = phase.wrapping_sub(encode_message(-1, 8));
        assert!(err.abs() < 1 << 27, "phase error {}", err);
        assert!(combined.current_variance > 0.0);
    }

    #[test]
    fn test_add_mul_variance() {
        let key = test_key(5);
        let mut rng = ChaCha20Rng::seed_from_u64(6);
        let sample = lwe_encrypt(0, key.params.min_noise, &key, &mut rng);

        let mut acc = LweSample::zero(key.dimension());
        acc.add_mul_assign(2, &sample);
        assert!((acc.current_variance - 4.0 * sample.current_variance).abs() < 1e-18);
    }
}
