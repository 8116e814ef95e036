//! TGSW (ring GSW) samples and the external product.

pub mod external_product;
pub mod types;

pub use external_product::{external_product, gadget_decompose};
pub use types::{tgsw_encrypt_int, TGswSample, TransformedTGswSample, TransformedTLweSample};
