//! Polynomials modulo X^N + 1.
//!
//! Two coefficient flavours are used by the ciphertext algebras: integer
//! polynomials (secret keys, gadget digits) and torus polynomials
//! (ciphertext components). Both live in the anticyclic ring where
//! X^N = -1; the monomial-shift operations below carry the sign wrap that
//! this identity induces.

use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::torus::{gaussian_torus32, uniform_torus32, Torus32};

/// Polynomial with integer coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntPolynomial {
    /// Coefficients, constant term first.
    pub coeffs: Vec<i32>,
}

/// Polynomial with torus coefficients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorusPolynomial {
    /// Coefficients, constant term first.
    pub coeffs: Vec<Torus32>,
}

impl IntPolynomial {
    /// The zero polynomial of the given degree.
    pub fn zero(degree: usize) -> Self {
        Self { coeffs: vec![0; degree] }
    }

    /// Creates a polynomial from a coefficient vector.
    pub fn from_coeffs(coeffs: Vec<i32>) -> Self {
        Self { coeffs }
    }

    /// Samples a polynomial with independent uniform {0, 1} coefficients.
    pub fn uniform_binary<R: Rng>(degree: usize, rng: &mut R) -> Self {
        Self { coeffs: (0..degree).map(|_| (rng.gen::<u32>() & 1) as i32).collect() }
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.coeffs.len()
    }
}

impl TorusPolynomial {
    /// The zero polynomial of the given degree.
    pub fn zero(degree: usize) -> Self {
        Self { coeffs: vec![0; degree] }
    }

    /// A polynomial with every coefficient equal to `value`.
    ///
    /// Under anticyclic rotation such a polynomial reads +value on the
    /// positive half-circle and -value on the negative half, which is what
    /// the bootstrap test polynomial relies on.
    pub fn filled(value: Torus32, degree: usize) -> Self {
        Self { coeffs: vec![value; degree] }
    }

    /// Creates a polynomial from a coefficient vector.
    pub fn from_coeffs(coeffs: Vec<Torus32>) -> Self {
        Self { coeffs }
    }

    /// Samples a polynomial with uniform torus coefficients.
    pub fn uniform<R: Rng>(degree: usize, rng: &mut R) -> Self {
        Self { coeffs: (0..degree).map(|_| uniform_torus32(rng)).collect() }
    }

    /// Samples a centred Gaussian noise polynomial with deviation `sigma`.
    pub fn gaussian<R: Rng>(degree: usize, sigma: f64, rng: &mut R) -> Self {
        Self { coeffs: (0..degree).map(|_| gaussian_torus32(rng, 0, sigma)).collect() }
    }

    /// Ring degree N.
    pub fn degree(&self) -> usize {
        self.coeffs.len()
    }

    /// Resets every coefficient to zero.
    pub fn clear(&mut self) {
        self.coeffs.fill(0);
    }

    /// Multiplies by the monomial X^a, a in [0, 2N).
    ///
    /// Coefficients pushed past degree N - 1 wrap around negated, since
    /// X^N = -1.
    pub fn mul_by_xai(&self, a: usize) -> Self {
        let n = self.degree();
        assert!(a < 2 * n, "rotation {} out of range for degree {}", a, n);
        let src = &self.coeffs;
        let mut out = vec![0; n];
        if a < n {
            for i in 0..a {
                out[i] = src[i + n - a].wrapping_neg();
            }
            for i in a..n {
                out[i] = src[i - a];
            }
        } else {
            let a = a - n;
            for i in 0..a {
                out[i] = src[i + n - a];
            }
            for i in a..n {
                out[i] = src[i - a].wrapping_neg();
            }
        }
        Self { coeffs: out }
    }

    /// Multiplies by X^a - 1, a in [0, 2N), the anticyclic shift used by
    /// the CMux step.
    pub fn mul_by_xai_minus_one(&self, a: usize) -> Self {
        let n = self.degree();
        assert!(a < 2 * n, "rotation {} out of range for degree {}", a, n);
        let src = &self.coeffs;
        let mut out = vec![0; n];
        if a < n {
            for i in 0..a {
                out[i] = src[i + n - a].wrapping_neg().wrapping_sub(src[i]);
            }
            for i in a..n {
                out[i] = src[i - a].wrapping_sub(src[i]);
            }
        } else {
            let a = a - n;
            for i in 0..a {
                out[i] = src[i + n - a].wrapping_sub(src[i]);
            }
            for i in a..n {
                out[i] = src[i - a].wrapping_neg().wrapping_sub(src[i]);
            }
        }
        Self { coeffs: out }
    }

    /// Largest coefficient magnitude in the centred representation.
    pub fn max_abs(&self) -> u32 {
        self.coeffs.iter().map(|&c| (c as i64).unsigned_abs() as u32).max().unwrap_or(0)
    }
}

impl Add for &TorusPolynomial {
    type Output = TorusPolynomial;

    fn add(self, rhs: Self) -> TorusPolynomial {
        assert_eq!(self.degree(), rhs.degree(), "polynomial degrees must match");
        TorusPolynomial {
            coeffs: self
                .coeffs
                .iter()
                .zip(rhs.coeffs.iter())
                .map(|(&a, &b)| a.wrapping_add(b))
                .collect(),
        }
    }
}

impl Sub for &TorusPolynomial {
    type Output = TorusPolynomial;

    fn sub(self, rhs: Self) -> TorusPolynomial {
        assert_eq!(self.degree(), rhs.degree(), "polynomial degrees must match");
        TorusPolynomial {
            coeffs: self
                .coeffs
                .iter()
                .zip(rhs.coeffs.iter())
                .map(|(&a, &b)| a.wrapping_sub(b))
                .collect(),
        }
    }
}

impl Neg for &TorusPolynomial {
    type Output = TorusPolynomial;

    fn neg(self) -> TorusPolynomial {
        TorusPolynomial { coeffs: self.coeffs.iter().map(|&c| c.wrapping_neg()).collect() }
    }
}

impl AddAssign<&TorusPolynomial> for TorusPolynomial {
    fn add_assign(&mut self, rhs: &TorusPolynomial) {
        assert_eq!(self.degree(), rhs.degree(), "polynomial degrees must match");
        for (a, &b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a = a.wrapping_add(b);
        }
    }
}

impl SubAssign<&TorusPolynomial> for TorusPolynomial {
    fn sub_assign(&mut self, rhs: &TorusPolynomial) {
        assert_eq!(self.degree(), rhs.degree(), "polynomial degrees must match");
        for (a, &b) in self.coeffs.iter_mut().zip(rhs.coeffs.iter()) {
            *a = a.wrapping_sub(b);
        }
    }
}
