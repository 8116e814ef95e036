//! Arithmetic on the discretised torus.
//!
//! The real torus R/Z is discretised to Z/2^32 and stored in a signed
//! 32-bit integer with unit 2^-32. Addition and subtraction are the native
//! wrapping operations; this module supplies the encoding helpers and the
//! random draws used by every encryption routine.

use rand::Rng;

/// One element of the discretised torus, unit 2^-32.
pub type Torus32 = i32;

/// Encodes `mu` in a power-of-two message space of size `m_space`.
///
/// The message occupies the top log2(m_space) bits of the torus word, so
/// `encode_message(1, 8)` is 2^29, one eighth of a turn.
///
/// # Example
///
/// ```
/// use boolfhe::math::torus::encode_message;
///
/// assert_eq!(encode_message(1, 8), 1 << 29);
/// assert_eq!(encode_message(-1, 8), -(1 << 29));
/// ```
pub fn encode_message(mu: i32, m_space: u32) -> Torus32 {
    assert!(m_space.is_power_of_two() && m_space >= 2, "message space must be a power of two");
    let bits = m_space.trailing_zeros();
    mu.wrapping_shl(32 - bits)
}

/// Decodes a torus element to the nearest message in [0, m_space).
///
/// Rounds by adding half a message slot before shifting the message bits
/// down.
pub fn decode_message(x: Torus32, m_space: u32) -> i32 {
    assert!(m_space.is_power_of_two() && m_space >= 2, "message space must be a power of two");
    let bits = m_space.trailing_zeros();
    ((x as u32).wrapping_add(1u32 << (31 - bits)) >> (32 - bits)) as i32
}

/// Maps a torus element to one of `positions` rotation slots.
///
/// Used to turn a ciphertext coefficient into a power of X for the blind
/// rotation, where `positions` is 2N.
pub fn mod_switch_from_torus32(x: Torus32, positions: usize) -> usize {
    debug_assert!(positions.is_power_of_two());
    decode_message(x, positions as u32) as usize % positions
}

/// Converts a real number of torus units to the discretised torus,
/// rounding to the nearest representable element and wrapping modulo 1.
pub fn f64_to_torus32(x: f64) -> Torus32 {
    (x * 4294967296.0).round() as i64 as Torus32
}

/// A uniform draw from the whole torus.
pub fn uniform_torus32<R: Rng>(rng: &mut R) -> Torus32 {
    rng.gen::<i32>()
}

/// A centred normal draw with standard deviation `sigma`, in real units.
pub fn gaussian_f64<R: Rng>(rng: &mut R, sigma: f64) -> f64 {
    // Box-Muller; the first uniform is kept away from zero so the log is
    // finite.
    let u: f64 = 1.0 - rng.gen::<f64>();
    let v: f64 = rng.gen();
    sigma * (-2.0 * u.ln()).sqrt() * (std::f64::consts::TAU * v).cos()
}

/// A Gaussian draw on the torus around `mean` with standard deviation
/// `sigma` (in torus units).
pub fn gaussian_torus32<R: Rng>(rng: &mut R, mean: Torus32, sigma: f64) -> Torus32 {
    mean.wrapping_add(f64_to_torus32(gaussian_f64(rng, sigma)))
}
