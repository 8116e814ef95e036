//! Mathematical primitives for the torus scheme.
//!
//! This module provides the arithmetic layers every ciphertext algebra is
//! built on:
//!
//! - **Torus arithmetic** over the discretised torus Z/2^32 stored in `i32`
//! - **Polynomial operations** over Z[X]/(X^N + 1), in integer and torus
//!   coefficient flavours
//! - **Negacyclic transforms** through a process-wide cached FFT engine
//!
//! All scalar arithmetic wraps modulo 2^32; the anticyclic ring structure
//! (X^N = -1) is what the monomial-shift and transform routines encode.

pub mod fft;
pub mod poly;
pub mod torus;

pub use fft::{prewarm_transforms, FftPolynomial};
pub use poly::{IntPolynomial, TorusPolynomial};
pub use torus::Torus32;
