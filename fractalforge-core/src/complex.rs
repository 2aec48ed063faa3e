use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// A complex number represented as two `f64` components.
///
/// This is a lightweight, `Copy` type optimized for the tight iteration loop.
/// We roll our own instead of using `num::Complex` to keep the dependency
/// graph minimal and retain full control over the arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub const ZERO: Self = Self { re: 0.0, im: 0.0 };

    #[inline]
    pub fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    /// Returns `re² + im²` without taking the square root.
    #[inline]
    pub fn norm_sq(self) -> f64 {
        self.re * self.re + self.im * self.im
    }

    /// Returns `√(re² + im²)`.
    #[inline]
    pub fn norm(self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// The complex conjugate `re − im·i`.
    #[inline]
    pub fn conj(self) -> Self {
        Self {
            re: self.re,
            im: -self.im,
        }
    }

    /// Component-wise absolute value, `|re| + |im|·i` (Burning Ship step).
    #[inline]
    pub fn abs_components(self) -> Self {
        Self {
            re: self.re.abs(),
            im: self.im.abs(),
        }
    }

    /// True when both components are finite.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.re.is_finite() && self.im.is_finite()
    }
}

// -- Arithmetic operators --

impl Add for Complex {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self {
            re: self.re + rhs.re,
            im: self.im + rhs.im,
        }
    }
}

impl AddAssign for Complex {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.re += rhs.re;
        self.im += rhs.im;
    }
}

impl Sub for Complex {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self {
            re: self.re - rhs.re,
            im: self.im - rhs.im,
        }
    }
}

impl SubAssign for Complex {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.re -= rhs.re;
        self.im -= rhs.im;
    }
}

impl Mul for Complex {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self {
            re: self.re * rhs.re - self.im * rhs.im,
            im: self.re * rhs.im + self.im * rhs.re,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn add_sub() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(-0.5, 0.25);
        assert_eq!(a + b, Complex::new(0.5, 2.25));
        assert_eq!(a - b, Complex::new(1.5, 1.75));
    }

    #[test]
    fn mul_matches_expansion() {
        let a = Complex::new(3.0, -2.0);
        let b = Complex::new(1.0, 4.0);
        let p = a * b;
        // (3 − 2i)(1 + 4i) = 3 + 12i − 2i + 8 = 11 + 10i
        assert!((p.re - 11.0).abs() < EPSILON);
        assert!((p.im - 10.0).abs() < EPSILON);
    }

    #[test]
    fn square_via_mul() {
        let z = Complex::new(0.0, 1.0);
        let sq = z * z;
        assert!((sq.re - (-1.0)).abs() < EPSILON);
        assert!(sq.im.abs() < EPSILON);
    }

    #[test]
    fn norms() {
        let z = Complex::new(3.0, 4.0);
        assert!((z.norm_sq() - 25.0).abs() < EPSILON);
        assert!((z.norm() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn conj_and_abs() {
        let z = Complex::new(-1.5, 2.5);
        assert_eq!(z.conj(), Complex::new(-1.5, -2.5));
        assert_eq!(z.abs_components(), Complex::new(1.5, 2.5));
    }

    #[test]
    fn serde_round_trip() {
        let z = Complex::new(-0.75, 0.1);
        let json = serde_json::to_string(&z).unwrap();
        let back: Complex = serde_json::from_str(&json).unwrap();
        assert_eq!(z, back);
    }
}
