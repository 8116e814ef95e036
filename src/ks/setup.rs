//! Key-switching key generation.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::lwe::{lwe_encrypt, LweKey, LweSample};
use crate::math::torus::Torus32;
use crate::params::{KeySwitchParams, LweParams};

/// Key-switching key from an input key s' to an output key s.
///
/// Entry (i, j, h) encrypts (h+1) * s'_i * 2^(32 - (j+1) * basebit) under
/// the output key. The digit value 0 needs no entry: it would be a
/// noiseless encryption of zero and is simply skipped when switching.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeySwitchKey {
    /// Parameter set of the input key (dimension n').
    pub in_params: LweParams,
    /// Parameter set of the output key (dimension n).
    pub out_params: LweParams,
    /// Decomposition shape.
    pub params: KeySwitchParams,
    /// samples[i][j][h], with i < n', j < t, h < base - 1.
    pub samples: Vec<Vec<Vec<LweSample>>>,
}

impl KeySwitchKey {
    /// Generates the key-switching key from `in_key` to `out_key`.
    ///
    /// Every entry is a fresh encryption at the output key's `min_noise`
    /// level.
    pub fn generate<R: Rng>(
        in_key: &LweKey,
        out_key: &LweKey,
        params: KeySwitchParams,
        rng: &mut R,
    ) -> Self {
        let n_in = in_key.dimension();
        let t = params.decomp_length;
        let alpha = out_key.params.min_noise;
        tracing::debug!(n_in, t, base = params.base, "generating key-switching key");

        let samples = (0..n_in)
            .map(|i| {
                (0..t)
                    .map(|j| {
                        let shift = 32 - (j as u32 + 1) * params.basebit;
                        (1..params.base)
                            .map(|h| {
                                let message =
                                    (h as i32 * in_key.key[i]).wrapping_shl(shift);
                                lwe_encrypt(message, alpha, out_key, rng)
                            })
                            .collect()
                    })
                    .collect()
            })
            .collect();

        Self {
            in_params: in_key.params,
            out_params: out_key.params,
            params,
            samples,
        }
    }

    /// Applies the switching decomposition of `mask` into the output
    /// accumulator given by (`out_a`, `out_b`, `out_variance`).
    ///
    /// Each mask coefficient is split into t digits taken from the top
    /// bits after the rounding offset; the matching key samples are
    /// subtracted. Shared by the single-key switch and the per-party
    /// blocks of the multi-key switch.
    pub(crate) fn apply_block(
        &self,
        mask: &[Torus32],
        out_a: &mut [Torus32],
        out_b: &mut Torus32,
        out_variance: &mut f64,
    ) {
        assert_eq!(mask.len(), self.in_params.dimension, "mask length mismatch");
        assert_eq!(out_a.len(), self.out_params.dimension, "output dimension mismatch");
        let t = self.params.decomp_length;
        let digit_mask = (self.params.base - 1) as u32;
        let offset = self.params.rounding_offset();

        for (i, &ai) in mask.iter().enumerate() {
            let shifted = (ai as u32).wrapping_add(offset);
            for j in 0..t {
                let digit =
                    ((shifted >> (32 - (j as u32 + 1) * self.params.basebit)) & digit_mask) as usize;
                if digit == 0 {
                    continue;
                }
                let sample = &self.samples[i][j][digit - 1];
                for (x, &y) in out_a.iter_mut().zip(sample.a.iter()) {
                    *x = x.wrapping_sub(y);
                }
                *out_b = out_b.wrapping_sub(sample.b);
            }
        }

        let sigma = self.out_params.min_noise;
        *out_variance +=
            (t * self.in_params.dimension * self.params.base) as f64 * sigma * sigma;
    }
}
