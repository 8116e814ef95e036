//! TLWE (ring LWE) samples over the torus polynomial ring.

pub mod enc;
pub mod types;

pub use enc::{tlwe_encrypt_poly, tlwe_encrypt_zero, tlwe_phase};
pub use types::{TLweKey, TLweSample};
