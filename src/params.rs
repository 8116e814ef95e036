//! Parameter sets for gate bootstrapping
//!
//! This module defines the lattice parameters for the scheme: the LWE and
//! TLWE dimensions, the gadget decomposition shapes for bootstrapping and
//! key switching, and the noise levels attached to each key. Only fixed
//! 128-bit-style parameter sets are provided; the constructors validate the
//! structural constraints (power-of-two ring degree, decomposition depth
//! within the 32-bit torus).
//!
//! # Overview
//!
//! Parameter selection balances:
//! - **Security**: LWE/RLWE hardness at the chosen dimensions and noise
//! - **Correctness**: the bootstrap must keep the phase within 1/16 of the
//!   encoded message with overwhelming probability
//! - **Efficiency**: decomposition depth drives the cost of every external
//!   product in the blind-rotation loop
//!
//! # Example
//!
//! ```
//! use boolfhe::params::SchemeParams;
//!
//! let params = SchemeParams::default_128();
//! assert_eq!(params.lwe.dimension, 500);
//! assert_eq!(params.tlwe().degree, 1024);
//! assert!(params.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::math::torus::Torus32;

/// Parameters of the LWE encryption layer.
///
/// Fresh gate ciphertexts and key-switched ciphertexts live in this
/// parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LweParams {
    /// Mask dimension n.
    pub dimension: usize,
    /// Standard deviation used when encrypting fresh samples under this key.
    pub min_noise: f64,
    /// Largest standard deviation at which decryption is still reliable.
    pub max_noise: f64,
}

impl LweParams {
    /// Creates an LWE parameter set.
    pub fn new(dimension: usize, min_noise: f64, max_noise: f64) -> Self {
        assert!(dimension > 0, "LWE dimension must be positive");
        assert!(min_noise > 0.0 && min_noise <= max_noise, "noise bounds must satisfy 0 < min <= max");
        Self { dimension, min_noise, max_noise }
    }
}

/// Parameters of the TLWE (ring LWE) layer.
///
/// Samples are vectors of `mask_size` torus polynomials modulo X^N + 1 plus
/// a body polynomial.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TLweParams {
    /// Ring degree N (power of two).
    pub degree: usize,
    /// Number of mask polynomials k.
    pub mask_size: usize,
    /// Standard deviation used for fresh encryptions under this key.
    pub min_noise: f64,
    /// Largest standard deviation at which decryption is still reliable.
    pub max_noise: f64,
}

impl TLweParams {
    /// Creates a TLWE parameter set.
    ///
    /// # Panics
    ///
    /// Panics if `degree` is not a power of two.
    pub fn new(degree: usize, mask_size: usize, min_noise: f64, max_noise: f64) -> Self {
        assert!(degree.is_power_of_two(), "ring degree must be a power of two");
        assert!(mask_size > 0, "mask size must be positive");
        Self { degree, mask_size, min_noise, max_noise }
    }

    /// The LWE parameter set of samples extracted from this ring.
    ///
    /// Extraction flattens the k mask polynomials into a mask of k*N torus
    /// coefficients; the noise levels carry over unchanged.
    pub fn extract_lwe_params(&self) -> LweParams {
        LweParams::new(self.mask_size * self.degree, self.min_noise, self.max_noise)
    }
}

/// Gadget parameters for TGSW samples.
///
/// The gadget vector is g_j = 2^(32 - j * bg_bits) for j = 1..=l. The signed
/// balanced decomposition writes a torus element as a sum of l digits in
/// [-Bg/2, Bg/2) against these weights; `rounding_offset` is added before
/// digit extraction so that the reconstruction error stays within half of
/// the smallest weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TGswParams {
    /// Decomposition length l.
    pub decomp_length: usize,
    /// log2 of the decomposition base Bg.
    pub bg_bits: u32,
    /// Decomposition base Bg = 2^bg_bits.
    pub bg: u32,
    /// Bg / 2, the recentering constant for signed digits.
    pub half_bg: i32,
    /// Bit mask extracting one digit, Bg - 1.
    pub mask_mod: u32,
    /// Rounding offset added before digit extraction.
    pub rounding_offset: u32,
    /// Parent ring parameters.
    pub tlwe: TLweParams,
}

impl TGswParams {
    /// Creates gadget parameters over the given ring.
    ///
    /// # Panics
    ///
    /// Panics if the decomposition does not fit in the 32-bit torus, that is
    /// if `decomp_length * bg_bits >= 32`.
    pub fn new(decomp_length: usize, bg_bits: u32, tlwe: TLweParams) -> Self {
        assert!(decomp_length > 0, "decomposition length must be positive");
        assert!(
            (decomp_length as u32) * bg_bits < 32,
            "decomposition depth must fit in the 32-bit torus"
        );
        let bg = 1u32 << bg_bits;
        let half_bg = (bg >> 1) as i32;

        // offset = Bg/2 * sum_j 2^(32 - j*bg_bits), plus half of the
        // smallest gadget weight so the round-trip error is balanced.
        let mut offset: u32 = 0;
        for j in 1..=decomp_length as u32 {
            offset = offset.wrapping_add(1u32 << (32 - j * bg_bits));
        }
        offset = offset
            .wrapping_mul(half_bg as u32)
            .wrapping_add(1u32 << (31 - decomp_length as u32 * bg_bits));

        Self {
            decomp_length,
            bg_bits,
            bg,
            half_bg,
            mask_mod: bg - 1,
            rounding_offset: offset,
            tlwe,
        }
    }

    /// The j-th gadget value 2^(32 - (j+1) * bg_bits), 0-indexed.
    pub fn gadget(&self, j: usize) -> Torus32 {
        debug_assert!(j < self.decomp_length);
        1i32 << (32 - (j as u32 + 1) * self.bg_bits)
    }
}

/// Parameters of the key-switching decomposition.
///
/// Mask coefficients are decomposed into `decomp_length` digits of
/// `basebit` bits each, taken from the top of the torus word.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeySwitchParams {
    /// Number of digits t.
    pub decomp_length: usize,
    /// Bits per digit.
    pub basebit: u32,
    /// Digit base 2^basebit.
    pub base: usize,
}

impl KeySwitchParams {
    /// Creates key-switching parameters.
    ///
    /// # Panics
    ///
    /// Panics if the decomposition does not fit in the 32-bit torus.
    pub fn new(decomp_length: usize, basebit: u32) -> Self {
        assert!(decomp_length > 0 && basebit > 0, "key-switch decomposition must be non-trivial");
        assert!(
            (decomp_length as u32) * basebit < 32,
            "key-switch decomposition depth must fit in the 32-bit torus"
        );
        Self { decomp_length, basebit, base: 1usize << basebit }
    }

    /// Rounding offset 2^(32 - 1 - t * basebit) added before digit
    /// extraction.
    pub fn rounding_offset(&self) -> u32 {
        1u32 << (31 - self.decomp_length as u32 * self.basebit)
    }
}

/// The full single-key scheme parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchemeParams {
    /// LWE layer in which gate ciphertexts live.
    pub lwe: LweParams,
    /// Gadget parameters of the bootstrapping key (includes the ring).
    pub tgsw: TGswParams,
    /// Key-switching decomposition back into the LWE layer.
    pub ks: KeySwitchParams,
}

impl SchemeParams {
    /// The fixed parameter set targeting roughly 128-bit security.
    ///
    /// n = 500, N = 1024, k = 1, bootstrap decomposition l = 2 with
    /// Bg = 2^10, key switch with t = 8 digits of 2 bits.
    pub fn default_128() -> Self {
        let ks_noise = 2f64.powi(-15) * sqrt_two_over_pi();
        let bs_noise = 9.0e-9 * sqrt_two_over_pi();
        let max_noise = 2f64.powi(-6) * sqrt_two_over_pi();

        let lwe = LweParams::new(500, ks_noise, max_noise);
        let tlwe = TLweParams::new(1024, 1, bs_noise, max_noise);
        let tgsw = TGswParams::new(2, 10, tlwe);
        let ks = KeySwitchParams::new(8, 2);
        Self { lwe, tgsw, ks }
    }

    /// The ring parameters of the bootstrapping key.
    pub fn tlwe(&self) -> &TLweParams {
        &self.tgsw.tlwe
    }

    /// Validates the cross-layer constraints of the parameter set.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.tgsw.tlwe.degree.is_power_of_two() {
            return Err("ring degree must be a power of two");
        }
        if self.tgsw.decomp_length as u32 * self.tgsw.bg_bits >= 32 {
            return Err("bootstrap decomposition must fit in the 32-bit torus");
        }
        if self.ks.decomp_length as u32 * self.ks.basebit >= 32 {
            return Err("key-switch decomposition must fit in the 32-bit torus");
        }
        Ok(())
    }
}

impl Default for SchemeParams {
    fn default() -> Self {
        Self::default_128()
    }
}

/// Parameter set of the multi-key variant.
///
/// The lattice dimensions match the single-key set; the uni-encryption
/// gadget is deeper (l = 4, Bg = 2^7) to absorb the extra noise of the
/// expansion step, and the ring noise is the tighter RLWE level of the
/// multi-key construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MkParams {
    /// Number of participating parties P.
    pub parties: usize,
    /// Per-party LWE layer.
    pub lwe: LweParams,
    /// Uni-encryption gadget parameters (includes the shared ring).
    pub tgsw: TGswParams,
    /// Per-party key-switching decomposition.
    pub ks: KeySwitchParams,
}

impl MkParams {
    /// The fixed multi-key parameter set for the given number of parties.
    ///
    /// Uses l = 4, Bg = 2^7 for uni-encryption and an RLWE noise level of
    /// 3.29e-10.
    ///
    /// # Panics
    ///
    /// Panics if `parties` is zero.
    pub fn default_128(parties: usize) -> Self {
        assert!(parties > 0, "at least one party is required");
        let ks_noise = 2f64.powi(-15) * sqrt_two_over_pi();
        let max_noise = 2f64.powi(-6) * sqrt_two_over_pi();
        let rlwe_noise = 3.29e-10;

        let lwe = LweParams::new(500, ks_noise, max_noise);
        let tlwe = TLweParams::new(1024, 1, rlwe_noise, max_noise);
        let tgsw = TGswParams::new(4, 7, tlwe);
        let ks = KeySwitchParams::new(8, 2);
        let params = Self { parties, lwe, tgsw, ks };
        params.assert_single_mask();
        params
    }

    /// The ring parameters shared by all parties.
    pub fn tlwe(&self) -> &TLweParams {
        &self.tgsw.tlwe
    }

    /// The multi-key formulas in this crate are written for a mask size of
    /// one polynomial per party; reject anything else up front.
    pub fn assert_single_mask(&self) {
        assert_eq!(
            self.tgsw.tlwe.mask_size, 1,
            "multi-key operations require mask_size == 1"
        );
    }
}

fn sqrt_two_over_pi() -> f64 {
    (2.0 / std::f64::consts::PI).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_valid() {
        let params = SchemeParams::default_128();
        assert!(params.validate().is_ok());
        assert_eq!(params.lwe.dimension, 500);
        assert_eq!(params.tlwe().degree, 1024);
        assert_eq!(params.tlwe().mask_size, 1);
    }

    #[test]
    fn test_gadget_values() {
        let params = SchemeParams::default_128();
        // l = 2, bg_bits = 10: gadget values 2^22 and 2^12.
        assert_eq!(params.tgsw.gadget(0), 1 << 22);
        assert_eq!(params.tgsw.gadget(1), 1 << 12);
    }

    #[test]
    fn test_rounding_offset() {
        let params = SchemeParams::default_128();
        // Bg/2 * (2^22 + 2^12) + 2^11
        let expected = (1u32 << 31) + (1u32 << 21) + (1u32 << 11);
        assert_eq!(params.tgsw.rounding_offset, expected);
    }

    #[test]
    fn test_ks_offset() {
        let params = SchemeParams::default_128();
        // t = 8, basebit = 2: offset 2^15.
        assert_eq!(params.ks.rounding_offset(), 1 << 15);
        assert_eq!(params.ks.base, 4);
    }

    #[test]
    fn test_extract_params() {
        let params = SchemeParams::default_128();
        let extracted = params.tlwe().extract_lwe_params();
        assert_eq!(extracted.dimension, 1024);
    }

    #[test]
    fn test_mk_params() {
        let params = MkParams::default_128(2);
        assert_eq!(params.parties, 2);
        assert_eq!(params.tgsw.decomp_length, 4);
        assert_eq!(params.tgsw.bg_bits, 7);
        assert_eq!(params.tgsw.gadget(0), 1 << 25);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_non_power_of_two_degree_rejected() {
        TLweParams::new(1000, 1, 1e-9, 1e-2);
    }
}
