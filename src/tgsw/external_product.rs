//! Gadget decomposition and the external product TGSW x TLWE.

use crate::math::fft::FftPolynomial;
use crate::math::poly::{IntPolynomial, TorusPolynomial};
use crate::params::TGswParams;
use crate::tlwe::TLweSample;

use super::types::TransformedTGswSample;

/// Signed balanced base-Bg decomposition of a torus polynomial.
///
/// Each coefficient x is written as sum_j d_j * g_j with every digit in
/// [-Bg/2, Bg/2). The rounding offset is added once up front and carries
/// through all digit positions, so the reconstruction error stays within
/// half of the smallest gadget value.
pub fn gadget_decompose(poly: &TorusPolynomial, params: &TGswParams) -> Vec<IntPolynomial> {
    let n = poly.degree();
    let l = params.decomp_length;
    let mut digits: Vec<IntPolynomial> = (0..l).map(|_| IntPolynomial::zero(n)).collect();

    for (idx, &c) in poly.coeffs.iter().enumerate() {
        let shifted = (c as u32).wrapping_add(params.rounding_offset);
        for (j, digit_poly) in digits.iter_mut().enumerate() {
            let raw = (shifted >> (32 - (j as u32 + 1) * params.bg_bits)) & params.mask_mod;
            digit_poly.coeffs[idx] = raw as i32 - params.half_bg;
        }
    }
    digits
}

/// Rebuilds sum_j d_j * g_j from a decomposition. Test support for the
/// gadget round-trip property.
pub fn gadget_reconstruct(digits: &[IntPolynomial], params: &TGswParams) -> TorusPolynomial {
    assert_eq!(digits.len(), params.decomp_length, "digit count must match the gadget");
    let n = digits[0].degree();
    let mut out = TorusPolynomial::zero(n);
    for (j, digit_poly) in digits.iter().enumerate() {
        let g = params.gadget(j);
        for (o, &d) in out.coeffs.iter_mut().zip(digit_poly.coeffs.iter()) {
            *o = o.wrapping_add(d.wrapping_mul(g));
        }
    }
    out
}

/// External product TGSW x TLWE.
///
/// Decomposes every polynomial of the TLWE sample against the gadget,
/// transforms the digits, dots them with the transformed TGSW rows and
/// inverse-transforms the accumulators. The result encrypts the product of
/// the TGSW integer message and the TLWE plaintext.
pub fn external_product(tgsw: &TransformedTGswSample, sample: &TLweSample) -> TLweSample {
    let params = &tgsw.params;
    let k = params.tlwe.mask_size;
    let l = params.decomp_length;
    let n = params.tlwe.degree;
    assert_eq!(sample.mask_size(), k, "sample and TGSW disagree on mask size");
    assert_eq!(sample.degree(), n, "sample and TGSW disagree on ring degree");
    assert_eq!(tgsw.rows.len(), k + 1, "TGSW must have k+1 row blocks");

    let mut acc: Vec<FftPolynomial> = (0..=k).map(|_| FftPolynomial::zero(n)).collect();
    for i in 0..=k {
        let component = if i < k { &sample.a[i] } else { &sample.b };
        let digits = gadget_decompose(component, params);
        for (j, digit) in digits.iter().enumerate() {
            let digit_fft = digit.forward();
            let row = &tgsw.rows[i][j];
            for c in 0..k {
                acc[c].add_mul_assign(&digit_fft, &row.a[c]);
            }
            acc[k].add_mul_assign(&digit_fft, &row.b);
        }
    }

    let a: Vec<TorusPolynomial> = acc[..k].iter().map(|p| p.inverse()).collect();
    let b = acc[k].inverse();

    // Standard noise growth: the dot against (k+1)l rows of digit
    // magnitude Bg/2, plus the decomposition rounding on 1 + kN
    // coefficients.
    let half_bg = params.half_bg as f64;
    let decomp_err = 2f64.powi(-((l as u32 * params.bg_bits + 1) as i32));
    let variance = sample.current_variance
        + ((k + 1) * l * n) as f64 * half_bg * half_bg * tgsw.current_variance
        + (1 + k * n) as f64 * decomp_err * decomp_err;

    TLweSample { a, b, current_variance: variance }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::torus::encode_message;
    use crate::params::SchemeParams;
    use crate::tgsw::types::tgsw_encrypt_int;
    use crate::tlwe::{tlwe_encrypt_poly, tlwe_phase, TLweKey};
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn test_params() -> SchemeParams {
        SchemeParams::default_128()
    }

    fn reconstruction_error(x: i32, params: &crate::params::TGswParams) -> u32 {
        let poly = TorusPolynomial::from_coeffs(vec![x]);
        let digits = gadget_decompose(&poly, params);
        let rebuilt = gadget_reconstruct(&digits, params);
        rebuilt.coeffs[0].wrapping_sub(x).unsigned_abs()
    }

    #[test]
    fn test_gadget_roundtrip_reference_value() {
        let params = test_params().tgsw;
        // l = 2, bg_bits = 10: error bounded by half of the smallest
        // gadget value, 2^11.
        assert!(reconstruction_error(0x12345678, &params) <= 1 << 11);
    }

    #[test]
    fn test_gadget_roundtrip_edge_values() {
        let params = test_params().tgsw;
        let bound = 1u32 << 11;
        for x in [0, 1, -1, i32::MAX, i32::MIN, 0x7FF, -0x800, 0x001F_FFFF, -0x0020_0000] {
            let err = reconstruction_error(x, &params);
            assert!(err <= bound, "x={:#x} err={}", x, err);
        }
    }

    #[test]
    fn test_gadget_roundtrip_random() {
        use rand::Rng;
        let params = test_params().tgsw;
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let poly = TorusPolynomial::from_coeffs((0..256).map(|_| rng.gen()).collect());
        let digits = gadget_decompose(&poly, &params);
        let rebuilt = gadget_reconstruct(&digits, &params);
        for i in 0..poly.degree() {
            let err = rebuilt.coeffs[i].wrapping_sub(poly.coeffs[i]).unsigned_abs();
            assert!(err <= 1 << 11, "coeff {} err {}", i, err);
        }
    }

    #[test]
    fn test_gadget_digits_balanced() {
        use rand::Rng;
        let params = test_params().tgsw;
        let mut rng = ChaCha20Rng::seed_from_u64(13);
        let poly = TorusPolynomial::from_coeffs((0..256).map(|_| rng.gen()).collect());
        for digit_poly in gadget_decompose(&poly, &params) {
            for &d in &digit_poly.coeffs {
                assert!(d >= -params.half_bg && d < params.half_bg, "digit {} out of range", d);
            }
        }
    }

    #[test]
    fn test_external_product_by_zero() {
        let params = test_params();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let key = TLweKey::generate(*params.tlwe(), &mut rng);

        let message = TorusPolynomial::filled(encode_message(1, 8), key.params.degree);
        let tlwe = tlwe_encrypt_poly(&message, key.params.min_noise, &key, &mut rng);
        let tgsw = tgsw_encrypt_int(0, params.tlwe().min_noise, &key, &params.tgsw, &mut rng);

        let product = external_product(&tgsw.transform(), &tlwe);
        let phase = tlwe_phase(&product, &key);
        assert!(phase.max_abs() < 1 << 25, "max phase {}", phase.max_abs());
    }

    #[test]
    fn test_external_product_by_one() {
        let params = test_params();
        let mut rng = ChaCha20Rng::seed_from_u64(22);
        let key = TLweKey::generate(*params.tlwe(), &mut rng);

        let mu = encode_message(1, 8);
        let message = TorusPolynomial::filled(mu, key.params.degree);
        let tlwe = tlwe_encrypt_poly(&message, key.params.min_noise, &key, &mut rng);
        let tgsw = tgsw_encrypt_int(1, params.tlwe().min_noise, &key, &params.tgsw, &mut rng);

        let product = external_product(&tgsw.transform(), &tlwe);
        let phase = tlwe_phase(&product, &key);
        for (i, &c) in phase.coeffs.iter().enumerate() {
            let err = c.wrapping_sub(mu);
            assert!(err.abs() < 1 << 25, "coeff {} err {}", i, err);
        }
        assert!(product.current_variance > tlwe.current_variance);
    }
}
