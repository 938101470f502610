//! 2x2 unitary matrix utilities.
//!
//! Single-mode optical elements (wave plates, phase shifters) act on the
//! polarization pair of one spatial mode; rail-form beam splitters act on a
//! pair of spatial modes. Both are described by a [`Unitary2x2`].

use num_complex::Complex64;
use std::f64::consts::FRAC_1_SQRT_2;

/// Tolerance for floating point comparisons.
pub const EPSILON: f64 = 1e-10;

/// A 2x2 unitary matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Unitary2x2 {
    /// The matrix elements in row-major order: [[a, b], [c, d]].
    pub data: [Complex64; 4],
}

impl Unitary2x2 {
    /// Create a new 2x2 unitary matrix.
    pub fn new(a: Complex64, b: Complex64, c: Complex64, d: Complex64) -> Self {
        Self { data: [a, b, c, d] }
    }

    /// Create the identity matrix.
    pub fn identity() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
        )
    }

    /// Create a Hadamard matrix.
    pub fn h() -> Self {
        let s = FRAC_1_SQRT_2;
        Self::new(
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(s, 0.0),
            Complex64::new(-s, 0.0),
        )
    }

    /// Create a Pauli-X matrix.
    pub fn x() -> Self {
        Self::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Create a Pauli-Y matrix.
    pub fn y() -> Self {
        Self::new(
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, -1.0),
            Complex64::new(0.0, 1.0),
            Complex64::new(0.0, 0.0),
        )
    }

    /// Create a Pauli-Z matrix.
    pub fn z() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(-1.0, 0.0),
        )
    }

    /// Create an S gate (sqrt(Z)).
    pub fn s() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 1.0),
        )
    }

    /// Create an S-dagger gate.
    pub fn sdg() -> Self {
        Self::new(
            Complex64::new(1.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, 0.0),
            Complex64::new(0.0, -1.0),
        )
    }

    /// Jones matrix of a wave plate with retardance `delta` at axis angle `xsi`.
    pub fn wave_plate(delta: f64, xsi: f64) -> Self {
        let i = Complex64::new(0.0, 1.0);
        let (sd, cd) = delta.sin_cos();
        let (s2x, c2x) = (2.0 * xsi).sin_cos();
        let cos = Complex64::new(cd, 0.0);
        Self::new(
            i * sd * c2x + cos,
            i * sd * s2x,
            i * sd * s2x,
            -i * sd * c2x + cos,
        )
    }

    /// Global phase `e^{i phi}` times the identity.
    pub fn phase(phi: f64) -> Self {
        Self::identity().scale(Complex64::from_polar(1.0, phi))
    }

    /// Multiply this matrix by another: self * other.
    #[allow(clippy::many_single_char_names)]
    pub fn mul(&self, other: &Self) -> Self {
        let [a, b, c, d] = self.data;
        let [e, f, g, h] = other.data;
        Self::new(a * e + b * g, a * f + b * h, c * e + d * g, c * f + d * h)
    }

    /// Multiply every element by a scalar.
    pub fn scale(&self, factor: Complex64) -> Self {
        let [a, b, c, d] = self.data;
        Self::new(a * factor, b * factor, c * factor, d * factor)
    }

    /// Get the conjugate transpose (dagger).
    pub fn dagger(&self) -> Self {
        Self::new(
            self.data[0].conj(),
            self.data[2].conj(),
            self.data[1].conj(),
            self.data[3].conj(),
        )
    }

    /// Element at `(row, col)`.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Complex64 {
        self.data[row * 2 + col]
    }

    /// Check if this is approximately identity (up to global phase).
    pub fn is_identity(&self) -> bool {
        let [a, b, c, d] = self.data;

        if b.norm() > EPSILON || c.norm() > EPSILON {
            return false;
        }

        (a - d).norm() < EPSILON && (a.norm() - 1.0).abs() < EPSILON
    }

    /// Check element-wise equality within `tol`.
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(a, b)| (a - b).norm() < tol)
    }

    /// Check equality up to a global phase factor.
    ///
    /// `self` and `other` are equivalent iff `self† · other` is a scalar
    /// multiple of the identity with unit modulus.
    pub fn equiv_up_to_phase(&self, other: &Self) -> bool {
        self.dagger().mul(other).is_identity()
    }

    /// Check unitarity (`U† · U = I`).
    pub fn is_unitary(&self) -> bool {
        self.dagger().mul(self).approx_eq(&Self::identity(), 1e-9)
    }
}

impl Default for Unitary2x2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Unitary2x2 {
    type Output = Self;

    #[allow(clippy::needless_pass_by_value)]
    fn mul(self, rhs: Self) -> Self::Output {
        Unitary2x2::mul(&self, &rhs)
    }
}
