//! Multi-key blind rotation, key switching and bootstrap.

use crate::lwe::LweSample;
use crate::math::poly::TorusPolynomial;
use crate::math::torus::{mod_switch_from_torus32, Torus32};

use super::extern_product::mk_cmux;
use super::keys::MkCloudKey;
use super::types::MkTLweSample;

/// Rotates the accumulator by the joint decryption exponent: the loop
/// walks every party i and key position j, applying a CMux against
/// bk[i][j] with rotation amount rotations[i][j].
pub fn mk_blind_rotate(acc: &mut MkTLweSample, ck: &MkCloudKey, rotations: &[Vec<usize>]) {
    assert_eq!(rotations.len(), ck.bk.len(), "need one rotation row per party");
    for (party_bk, party_rotations) in ck.bk.iter().zip(rotations.iter()) {
        assert_eq!(
            party_rotations.len(),
            party_bk.len(),
            "rotation count must match the bootstrapping key"
        );
        for (expanded, &rotation) in party_bk.iter().zip(party_rotations.iter()) {
            mk_cmux(acc, expanded, rotation, &ck.params);
        }
    }
}

/// Multi-key bootstrap without the final key switch.
///
/// The input is a flat multi-key LWE sample whose mask is the
/// concatenation of P party blocks of n coefficients; the output lives in
/// the extracted set of P blocks of N coefficients.
pub fn mk_bootstrap_wo_ks(ck: &MkCloudKey, mu: Torus32, x: &LweSample) -> LweSample {
    let parties = ck.params.parties;
    let n = ck.params.lwe.dimension;
    let degree = ck.params.tlwe().degree;
    assert_eq!(x.dimension(), parties * n, "sample does not match the party layout");

    let positions = 2 * degree;
    let bar_b = mod_switch_from_torus32(x.b, positions);
    let rotations: Vec<Vec<usize>> = (0..parties)
        .map(|p| {
            x.a[p * n..(p + 1) * n]
                .iter()
                .map(|&ai| mod_switch_from_torus32(ai, positions))
                .collect()
        })
        .collect();

    let test_poly = TorusPolynomial::filled(mu, degree);
    let shifted = test_poly.mul_by_xai((positions - bar_b) % positions);
    let mut acc = MkTLweSample::noiseless_trivial(shifted, parties);
    mk_blind_rotate(&mut acc, ck, &rotations);
    acc.extract_sample()
}

/// Switches an extracted multi-key sample back to the gate parameter set,
/// applying each party's key-switching key to that party's block of the
/// mask.
pub fn mk_keyswitch(ck: &MkCloudKey, x: &LweSample) -> LweSample {
    let parties = ck.params.parties;
    let n = ck.params.lwe.dimension;
    let degree = ck.params.tlwe().degree;
    assert_eq!(x.dimension(), parties * degree, "sample does not match the extracted layout");

    let mut out = LweSample::noiseless_trivial(x.b, parties * n);
    out.current_variance = x.current_variance;
    for (p, ks) in ck.ks.iter().enumerate() {
        let block = &x.a[p * degree..(p + 1) * degree];
        ks.apply_block(
            block,
            &mut out.a[p * n..(p + 1) * n],
            &mut out.b,
            &mut out.current_variance,
        );
    }
    out
}

/// The full multi-key bootstrap.
pub fn mk_bootstrap(ck: &MkCloudKey, mu: Torus32, x: &LweSample) -> LweSample {
    mk_keyswitch(ck, &mk_bootstrap_wo_ks(ck, mu, x))
}
