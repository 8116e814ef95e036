//! Multi-key extension of the gate bootstrapping scheme.
//!
//! Follows the Chen-Chillotti-Song construction: every party holds its own
//! LWE and ring keys, a common reference string of uniform polynomials is
//! shared, and each party publishes a public key against it. A single
//! party's uni-encryption of its bootstrapping bits is expanded, using all
//! public keys, into a sample every party can participate in; the blind
//! rotation then walks over all parties' key bits.

pub mod bootstrap;
pub mod extern_product;
pub mod gates;
pub mod keys;
pub mod types;
pub mod unienc;

pub use bootstrap::{mk_bootstrap, mk_bootstrap_wo_ks, mk_keyswitch};
pub use extern_product::{mk_cmux, mk_external_product};
pub use gates::{mk_decrypt, mk_encrypt, mk_gate_nand};
pub use keys::{MkCloudKey, MkCloudKeyPart, MkSecretShare};
pub use types::{MkTLweSample, PublicKey, SharedKey};
pub use unienc::{expand, uni_encrypt, ExpandedSample, UniEncrypted};
