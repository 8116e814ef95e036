//! boolfhe: Boolean FHE over the discretised torus
//!
//! This crate implements the TFHE gate-bootstrapping scheme together with the
//! multi-key extension of Chen, Chillotti and Song.
//!
//! Key components:
//! - Torus arithmetic and negacyclic polynomial algebra with a cached
//!   transform engine
//! - The three ciphertext algebras: LWE, TLWE (ring LWE) and TGSW (ring GSW)
//! - Gadget decomposition and the external product TGSW x TLWE
//! - Blind rotation, sample extraction and key switching, combined into the
//!   gate bootstrap that refreshes ciphertext noise after every gate
//! - Multi-key primitives: uni-encryption, expansion to party-indexed
//!   samples, multi-key blind rotation and per-party key switching

pub mod params;
pub mod math;
pub mod lwe;
pub mod tlwe;
pub mod tgsw;
pub mod ks;
pub mod bootstrap;
pub mod gates;
pub mod mk;

pub use gates::{
    decrypt, decrypt_message, encrypt, encrypt_message, gate_and, gate_andny, gate_andyn,
    gate_constant, gate_mux, gate_nand, gate_nor, gate_not, gate_or, gate_orny, gate_oryn,
    gate_xnor, gate_xor, make_key_pair, make_key_pair_with, CloudKey, SecretKey,
};

pub use mk::{
    mk_decrypt, mk_encrypt, mk_gate_nand, MkCloudKey, MkCloudKeyPart, MkSecretShare, PublicKey,
    SharedKey,
};

pub use params::{MkParams, SchemeParams};
