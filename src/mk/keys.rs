//! Multi-key key material: per-party shares and the combined cloud key.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ks::KeySwitchKey;
use crate::lwe::LweKey;
use crate::math::fft::prewarm_transforms;
use crate::math::poly::IntPolynomial;
use crate::params::MkParams;
use crate::tlwe::TLweKey;

use super::types::{PublicKey, SharedKey};
use super::unienc::{expand, uni_encrypt, ExpandedSample, UniEncrypted};

/// One party's secret key material.
///
/// A share does not carry its party index; the position of the share in
/// the slices handed to the joint operations defines it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MkSecretShare {
    /// Parameter set of the share.
    pub params: MkParams,
    /// The party's LWE gate key.
    pub lwe_key: LweKey,
    /// The party's ring key.
    pub ring_key: TLweKey,
    /// Flat key extracted from the ring key.
    pub extracted_key: LweKey,
}

impl MkSecretShare {
    /// Generates one party's keys.
    pub fn generate<R: Rng>(params: &MkParams, rng: &mut R) -> Self {
        params.assert_single_mask();
        let lwe_key = LweKey::generate(params.lwe, rng);
        let ring_key = TLweKey::generate(*params.tlwe(), rng);
        let extracted_key = ring_key.extract_lwe_key();
        Self { params: *params, lwe_key, ring_key, extracted_key }
    }
}

/// The material one party publishes towards the combined cloud key.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MkCloudKeyPart {
    /// The party's public key against the shared polynomials.
    pub public_key: PublicKey,
    /// Uni-encryptions of the party's n gate-key bits.
    pub bootstrap_part: Vec<UniEncrypted>,
    /// Switch from the party's extracted key back to its gate key.
    pub keyswitch_part: KeySwitchKey,
}

impl MkCloudKeyPart {
    /// Generates a party's contribution against the shared randomness.
    pub fn generate<R: Rng>(
        share: &MkSecretShare,
        shared: &SharedKey,
        params: &MkParams,
        rng: &mut R,
    ) -> Self {
        let degree = params.tlwe().degree;
        tracing::debug!(n = share.lwe_key.dimension(), "uni-encrypting bootstrap part");
        let public_key = PublicKey::generate(&share.ring_key, shared, params, rng);

        let bootstrap_part = share
            .lwe_key
            .key
            .iter()
            .map(|&bit| {
                let mut message = IntPolynomial::zero(degree);
                message.coeffs[0] = bit;
                uni_encrypt(&message, &share.ring_key, &public_key, shared, params, rng)
            })
            .collect();

        let keyswitch_part =
            KeySwitchKey::generate(&share.extracted_key, &share.lwe_key, params.ks, rng);

        Self { public_key, bootstrap_part, keyswitch_part }
    }
}

/// The combined evaluation key: every party's bootstrap part expanded
/// against all public keys, plus the per-party key switches.
#[derive(Clone, Debug)]
pub struct MkCloudKey {
    /// Parameter set of the key.
    pub params: MkParams,
    /// bk[p][j]: party p's j-th gate-key bit, expanded.
    pub bk: Vec<Vec<ExpandedSample>>,
    /// Per-party key-switching keys, in party order.
    pub ks: Vec<KeySwitchKey>,
}

impl MkCloudKey {
    /// Expands all parts into the joint evaluation key.
    ///
    /// The order of `parts` fixes the party indices for every subsequent
    /// operation.
    pub fn combine(params: &MkParams, parts: Vec<MkCloudKeyPart>) -> Self {
        assert_eq!(parts.len(), params.parties, "need one part per party");
        prewarm_transforms(params.tlwe().degree);
        tracing::info!(parties = parts.len(), "expanding multi-key bootstrap key");

        let pubkeys: Vec<PublicKey> = parts.iter().map(|p| p.public_key.clone()).collect();
        let bk = parts
            .iter()
            .enumerate()
            .map(|(party, part)| {
                part.bootstrap_part
                    .iter()
                    .map(|uni| expand(uni, party, &pubkeys, params))
                    .collect()
            })
            .collect();
        let ks = parts.into_iter().map(|p| p.keyswitch_part).collect();
        Self { params: *params, bk, ks }
    }
}
