//! The key-switching operation.

use crate::lwe::LweSample;

use super::setup::KeySwitchKey;

/// Switches an LWE sample from the input key of `ks` to its output key.
///
/// Starts from the noiseless trivial sample (0, b) and subtracts the key
/// samples selected by the digit decomposition of every mask coefficient.
/// The encoded message is preserved; the noise grows by the switching
/// budget of the parameter set.
pub fn keyswitch(ks: &KeySwitchKey, sample: &LweSample) -> LweSample {
    assert_eq!(
        sample.dimension(),
        ks.in_params.dimension,
        "sample and key-switching key are from different parameter sets"
    );
    let mut out = LweSample::noiseless_trivial(sample.b, ks.out_params.dimension);
    out.current_variance = sample.current_variance;
    ks.apply_block(&sample.a, &mut out.a, &mut out.b, &mut out.current_variance);
    out
}
