//! LWE samples over the discretised torus.

pub mod enc;
pub mod types;

pub use enc::{lwe_encrypt, lwe_phase};
pub use types::{LweKey, LweSample};
