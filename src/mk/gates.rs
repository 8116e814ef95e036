//! Multi-key encryption, joint decryption and the NAND gate.

use rand::Rng;

use crate::lwe::{lwe_encrypt, LweSample};
use crate::math::torus::encode_message;

use super::bootstrap::mk_bootstrap;
use super::keys::{MkCloudKey, MkSecretShare};

/// Encrypts one Boolean as a multi-key sample.
///
/// The sample is a fresh encryption under the party's own gate key placed
/// in that party's mask block; all other blocks are zero.
pub fn mk_encrypt<R: Rng>(
    rng: &mut R,
    share: &MkSecretShare,
    party: usize,
    message: bool,
) -> LweSample {
    let params = &share.params;
    assert!(party < params.parties, "party index out of range");
    let n = params.lwe.dimension;
    let mu = if message { encode_message(1, 8) } else { encode_message(-1, 8) };

    let inner = lwe_encrypt(mu, params.lwe.min_noise, &share.lwe_key, rng);
    let mut out = LweSample::zero(params.parties * n);
    out.a[party * n..(party + 1) * n].copy_from_slice(&inner.a);
    out.b = inner.b;
    out.current_variance = inner.current_variance;
    out
}

/// Joint decryption: requires every party's share, in party order.
pub fn mk_decrypt(shares: &[MkSecretShare], sample: &LweSample) -> bool {
    assert!(!shares.is_empty(), "at least one share is required");
    let n = shares[0].params.lwe.dimension;
    assert_eq!(
        sample.dimension(),
        shares.len() * n,
        "sample does not match the party layout"
    );

    let mut phase = sample.b;
    for (p, share) in shares.iter().enumerate() {
        for (j, &bit) in share.lwe_key.key.iter().enumerate() {
            if bit != 0 {
                phase = phase.wrapping_sub(sample.a[p * n + j]);
            }
        }
    }
    phase >= 0
}

/// Multi-key NAND: bootstrap of 1/8 - x - y.
pub fn mk_gate_nand(ck: &MkCloudKey, x: &LweSample, y: &LweSample) -> LweSample {
    let dim = ck.params.parties * ck.params.lwe.dimension;
    let mu = encode_message(1, 8);
    let mut t = LweSample::noiseless_trivial(mu, dim);
    t.sub_assign(x);
    t.sub_assign(y);
    mk_bootstrap(ck, mu, &t)
}
