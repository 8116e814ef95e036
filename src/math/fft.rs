//! Negacyclic transforms over the torus.
//!
//! Multiplication modulo X^N + 1 is carried out in a transformed domain of
//! N/2 complex values: the N real coefficients are folded into N/2 complex
//! numbers, twisted by the odd 2N-th roots of unity, and passed through a
//! half-size complex FFT. Pointwise products in that domain correspond
//! exactly to anticyclic convolution, which is the only multiplication the
//! ciphertext algebras need.
//!
//! Transform plans are expensive to build, so they are cached process-wide
//! per ring degree behind a mutex: a miss constructs the plan under the
//! lock, a hit reuses it. Key generation calls [`prewarm_transforms`] so
//! that the bootstrap hot path never plans.

use std::collections::HashMap;
use std::f64::consts::PI;
use std::sync::{LazyLock, Mutex};
use std::time::Duration;

use concrete_fft::c64;
use concrete_fft::ordered::{Method, Plan};
use dyn_stack::{GlobalPodBuffer, PodStack, ReborrowMut};

use super::poly::{IntPolynomial, TorusPolynomial};
use super::torus::{f64_to_torus32, Torus32};

/// Scale applied to torus coefficients entering the transform, so that all
/// values stay well inside the exact range of an f64 mantissa.
const TORUS_SCALE: f64 = 1.0 / 4294967296.0;

/// A polynomial in the transformed domain: N/2 complex values.
#[derive(Clone, Debug)]
pub struct FftPolynomial {
    values: Vec<c64>,
}

impl FftPolynomial {
    /// The zero polynomial for ring degree `degree`.
    pub fn zero(degree: usize) -> Self {
        Self { values: vec![c64::default(); degree / 2] }
    }

    /// Ring degree N of the coefficient-domain counterpart.
    pub fn degree(&self) -> usize {
        2 * self.values.len()
    }

    /// Pointwise product, the transform-domain image of anticyclic
    /// convolution.
    pub fn mul(&self, rhs: &Self) -> Self {
        assert_eq!(self.values.len(), rhs.values.len(), "transform lengths must match");
        Self {
            values: self.values.iter().zip(rhs.values.iter()).map(|(&a, &b)| a * b).collect(),
        }
    }

    /// Accumulates the pointwise product of `a` and `b` into `self`.
    pub fn add_mul_assign(&mut self, a: &Self, b: &Self) {
        assert_eq!(self.values.len(), a.values.len(), "transform lengths must match");
        assert_eq!(self.values.len(), b.values.len(), "transform lengths must match");
        for ((z, &x), &y) in self.values.iter_mut().zip(a.values.iter()).zip(b.values.iter()) {
            *z += x * y;
        }
    }

    /// Adds another transformed polynomial coefficientwise.
    pub fn add_assign(&mut self, rhs: &Self) {
        assert_eq!(self.values.len(), rhs.values.len(), "transform lengths must match");
        for (z, &x) in self.values.iter_mut().zip(rhs.values.iter()) {
            *z += x;
        }
    }

    /// Inverse transform back to a torus polynomial.
    pub fn inverse(&self) -> TorusPolynomial {
        let degree = self.degree();
        let coeffs = with_engine(degree, |engine| engine.inverse(&self.values));
        TorusPolynomial::from_coeffs(coeffs)
    }
}

impl IntPolynomial {
    /// Forward negacyclic transform. Integer coefficients enter unscaled.
    pub fn forward(&self) -> FftPolynomial {
        let values = with_engine(self.degree(), |engine| {
            engine.forward(&self.coeffs, |c| c as f64)
        });
        FftPolynomial { values }
    }
}

impl TorusPolynomial {
    /// Forward negacyclic transform. Torus coefficients are scaled down to
    /// real torus units so products fit in f64 precision.
    pub fn forward(&self) -> FftPolynomial {
        let values = with_engine(self.degree(), |engine| {
            engine.forward(&self.coeffs, |c| c as f64 * TORUS_SCALE)
        });
        FftPolynomial { values }
    }
}

/// Product of an integer polynomial and a torus polynomial modulo X^N + 1.
pub fn mul_int_torus(a: &IntPolynomial, b: &TorusPolynomial) -> TorusPolynomial {
    assert_eq!(a.degree(), b.degree(), "polynomial degrees must match");
    a.forward().mul(&b.forward()).inverse()
}

/// Ensures the transform plan for ring degree `degree` exists.
///
/// Called during key generation so that the first bootstrap does not pay
/// the planning cost.
pub fn prewarm_transforms(degree: usize) {
    with_engine(degree, |_| ());
}

struct FftEngine {
    degree: usize,
    plan: Plan,
    scratch: GlobalPodBuffer,
    /// Odd 2N-th roots of unity, cis(pi * i / N).
    twist: Vec<c64>,
    /// Conjugate twist with the 2/N inverse-FFT normalisation folded in.
    untwist: Vec<c64>,
}

impl FftEngine {
    fn new(degree: usize) -> Self {
        assert!(degree.is_power_of_two() && degree >= 2, "ring degree must be a power of two");
        let half = degree / 2;
        tracing::debug!(degree, "planning negacyclic transform");
        let plan = Plan::new(half, Method::Measure(Duration::from_millis(10)));
        let scratch = GlobalPodBuffer::new(plan.fft_scratch().unwrap());
        let twist: Vec<c64> =
            (0..half).map(|i| c64::cis(PI * i as f64 / degree as f64)).collect();
        let norm = 1.0 / half as f64;
        let untwist: Vec<c64> = (0..half)
            .map(|i| c64::cis(-PI * i as f64 / degree as f64) * norm)
            .collect();
        Self { degree, plan, scratch, twist, untwist }
    }

    fn forward(&mut self, coeffs: &[Torus32], to_f64: impl Fn(Torus32) -> f64) -> Vec<c64> {
        assert_eq!(coeffs.len(), self.degree, "coefficient count must match the plan");
        let half = self.degree / 2;
        let mut buf: Vec<c64> = (0..half)
            .map(|i| c64::new(to_f64(coeffs[i]), to_f64(coeffs[i + half])) * self.twist[i])
            .collect();
        let mut stack = PodStack::new(&mut self.scratch);
        self.plan.fwd(&mut buf, stack.rb_mut());
        buf
    }

    fn inverse(&mut self, values: &[c64]) -> Vec<Torus32> {
        let half = self.degree / 2;
        assert_eq!(values.len(), half, "transform length must match the plan");
        let mut buf = values.to_vec();
        let mut stack = PodStack::new(&mut self.scratch);
        self.plan.inv(&mut buf, stack.rb_mut());
        let mut out = vec![0; self.degree];
        for i in 0..half {
            let v = buf[i] * self.untwist[i];
            out[i] = f64_to_torus32(v.re);
            out[i + half] = f64_to_torus32(v.im);
        }
        out
    }
}

static ENGINES: LazyLock<Mutex<HashMap<usize, FftEngine>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

fn with_engine<R>(degree: usize, f: impl FnOnce(&mut FftEngine) -> R) -> R {
    let mut engines = ENGINES.lock().expect("transform cache lock poisoned");
    let engine = engines.entry(degree).or_insert_with(|| FftEngine::new(degree));
    f(engine)
}
