//! 3D coordinate/vector value type.

use std::fmt;

use nalgebra as na;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An immutable 3D coordinate or direction vector.
///
/// Derived values (magnitude, normalized form, display string) are computed
/// on access rather than cached behind mutable cells, so a `Vector3` can be
/// freely copied and shared without stale-cache hazards.
///
/// # Example
///
/// ```
/// use meshmeter_model::Vector3;
///
/// let v = Vector3::new(3.0, 0.0, 4.0);
/// assert!((v.magnitude() - 5.0).abs() < 1e-12);
/// assert_eq!(format!("{v}"), "(3.00, 0.00, 4.00)");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vector3 {
    /// Create a vector from three components.
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    #[inline]
    #[must_use]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Convert to a nalgebra vector.
    #[inline]
    #[must_use]
    pub fn to_na(self) -> na::Vector3<f64> {
        na::Vector3::new(self.x, self.y, self.z)
    }

    /// Convert to a nalgebra point.
    #[inline]
    #[must_use]
    pub fn to_point(self) -> na::Point3<f64> {
        na::Point3::new(self.x, self.y, self.z)
    }

    /// Dot product.
    #[inline]
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.to_na().dot(&other.to_na())
    }

    /// Cross product (right-hand rule).
    #[inline]
    #[must_use]
    pub fn cross(self, other: Self) -> Self {
        Self::from(self.to_na().cross(&other.to_na()))
    }

    /// Euclidean norm.
    #[inline]
    #[must_use]
    pub fn magnitude(self) -> f64 {
        self.to_na().norm()
    }

    /// Unit vector in the same direction.
    ///
    /// Normalizing the zero vector yields the zero vector rather than an
    /// error; the division by zero is guarded.
    #[must_use]
    pub fn normalized(self) -> Self {
        let mag = self.magnitude();
        if mag == 0.0 {
            Self::zero()
        } else {
            self.scale(1.0 / mag)
        }
    }

    /// Multiply every component by `factor`.
    #[inline]
    #[must_use]
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor, self.z * factor)
    }

    /// Angle between two vectors in radians.
    ///
    /// The normalized dot product is clamped to `[-1, 1]` before `acos`, so
    /// floating-point overshoot on parallel vectors cannot produce NaN.
    #[must_use]
    pub fn angle_between(self, other: Self) -> f64 {
        self.normalized()
            .dot(other.normalized())
            .clamp(-1.0, 1.0)
            .acos()
    }

    /// Approximate equality with independent absolute and relative
    /// tolerances, evaluated per axis.
    ///
    /// Each component pair must satisfy
    /// `|a - b| <= max(abs_tol, rel_tol * |a|)`, where `a` is the component
    /// of `self` (the first operand).
    #[must_use]
    pub fn approx_eq(self, other: Self, abs_tol: f64, rel_tol: f64) -> bool {
        let axis = |a: f64, b: f64| (a - b).abs() <= abs_tol.max(rel_tol * a.abs());
        axis(self.x, other.x) && axis(self.y, other.y) && axis(self.z, other.z)
    }
}

impl fmt::Display for Vector3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

impl std::ops::Add for Vector3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl std::ops::AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl std::ops::Sub for Vector3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl std::ops::Neg for Vector3 {
    type Output = Self;
    fn neg(self) -> Self {
        self.scale(-1.0)
    }
}

impl std::ops::Mul<f64> for Vector3 {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self {
        self.scale(rhs)
    }
}

impl std::ops::Mul<Vector3> for f64 {
    type Output = Vector3;
    fn mul(self, rhs: Vector3) -> Vector3 {
        rhs.scale(self)
    }
}

impl std::ops::Div<f64> for Vector3 {
    type Output = Self;
    fn div(self, rhs: f64) -> Self {
        self.scale(1.0 / rhs)
    }
}

impl From<[f64; 3]> for Vector3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl From<(f64, f64, f64)> for Vector3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Self::new(x, y, z)
    }
}

impl From<na::Vector3<f64>> for Vector3 {
    fn from(v: na::Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<na::Point3<f64>> for Vector3 {
    fn from(p: na::Point3<f64>) -> Self {
        Self::new(p.x, p.y, p.z)
    }
}

impl From<Vector3> for na::Vector3<f64> {
    fn from(v: Vector3) -> Self {
        v.to_na()
    }
}

impl From<Vector3> for na::Point3<f64> {
    fn from(v: Vector3) -> Self {
        v.to_point()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn cross_follows_right_hand_rule() {
        let x = Vector3::new(1.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 1.0, 0.0);
        let z = x.cross(y);
        assert!((z.z - 1.0).abs() < f64::EPSILON);
        assert!(z.x.abs() < f64::EPSILON);
        assert!(z.y.abs() < f64::EPSILON);
    }

    #[test]
    fn normalize_zero_is_zero() {
        let v = Vector3::zero().normalized();
        assert_eq!(v, Vector3::zero());
    }

    #[test]
    fn magnitude_and_scale() {
        let v = Vector3::new(1.0, 2.0, 2.0);
        assert!((v.magnitude() - 3.0).abs() < 1e-12);
        assert!((v.scale(2.0).magnitude() - 6.0).abs() < 1e-12);
        assert!(((v / 3.0).magnitude() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn approx_eq_reflexive_and_symmetric() {
        let a = Vector3::new(1.0, -2.0, 3.0);
        let b = Vector3::new(1.00005, -2.0001, 3.0001);
        assert!(a.approx_eq(a, 0.0, 0.0));
        assert!(a.approx_eq(b, 0.0, 1e-3));
        assert!(b.approx_eq(a, 0.0, 1e-3));
        assert!(!a.approx_eq(b, 0.0, 1e-6));
    }

    #[test]
    fn approx_eq_after_derived_value_access() {
        let a = Vector3::new(4.0, 5.0, 6.0);
        let _ = a.magnitude();
        let _ = format!("{a}");
        assert!(a.approx_eq(a, 0.0, 0.0));
    }

    #[test]
    fn relative_tolerance_uses_component_magnitude() {
        // Negative components must not collapse the relative band to zero.
        let a = Vector3::new(-1.0, -1.0, -1.0);
        let b = Vector3::new(-1.00005, -1.00005, -1.00005);
        assert!(a.approx_eq(b, 0.0, 1e-4));
    }

    #[test]
    fn angle_between_is_clamped() {
        let v = Vector3::new(0.1, 0.2, 0.3);
        assert!((v.angle_between(v)).abs() < 1e-7);
        assert!((v.angle_between(-v) - PI).abs() < 1e-7);
        assert!(!v.angle_between(v.scale(3.0)).is_nan());
    }

    #[test]
    fn angle_between_orthogonal() {
        let x = Vector3::new(2.0, 0.0, 0.0);
        let y = Vector3::new(0.0, 0.5, 0.0);
        assert!((x.angle_between(y) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn display_two_decimals() {
        let v = Vector3::new(1.0, -2.5, 0.0);
        assert_eq!(format!("{v}"), "(1.00, -2.50, 0.00)");
    }

    #[test]
    fn conversions() {
        let v: Vector3 = [1.0, 2.0, 3.0].into();
        let w: Vector3 = (1.0, 2.0, 3.0).into();
        assert_eq!(v, w);
        let p: nalgebra::Point3<f64> = v.into();
        let back: Vector3 = p.into();
        assert_eq!(v, back);
    }
}
