//! Axis-aligned bounding box.

use crate::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An axis-aligned bounding box (AABB).
///
/// # Example
///
/// ```
/// use meshmeter_model::{Aabb, Vector3};
///
/// let aabb = Aabb::from_points(
///     [
///         Vector3::new(0.0, 0.0, 0.0),
///         Vector3::new(10.0, 5.0, 3.0),
///         Vector3::new(-2.0, 8.0, 1.0),
///     ]
///     .into_iter(),
/// );
///
/// assert_eq!(aabb.min, Vector3::new(-2.0, 0.0, 0.0));
/// assert_eq!(aabb.size(), Vector3::new(12.0, 8.0, 3.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner (smallest x, y, z values).
    pub min: Vector3,
    /// Maximum corner (largest x, y, z values).
    pub max: Vector3,
}

impl Aabb {
    /// Create an AABB from minimum and maximum corners.
    ///
    /// The corners are automatically corrected if min > max for any axis.
    #[must_use]
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self {
            min: Vector3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            max: Vector3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        }
    }

    /// Create an empty (invalid) AABB.
    ///
    /// Minimums seed at `+inf` and maximums at `-inf`, so the first point
    /// folded in always sets every axis, regardless of sign.
    ///
    /// # Example
    ///
    /// ```
    /// use meshmeter_model::{Aabb, Vector3};
    ///
    /// let mut aabb = Aabb::empty();
    /// assert!(aabb.is_empty());
    ///
    /// aabb.expand_to_include(Vector3::new(-1.0, -2.0, -3.0));
    /// assert!(!aabb.is_empty());
    /// assert_eq!(aabb.max, Vector3::new(-1.0, -2.0, -3.0));
    /// ```
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            min: Vector3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Vector3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Create an AABB from an iterator of points.
    ///
    /// Returns an empty AABB if the iterator is empty.
    #[must_use]
    pub fn from_points(points: impl Iterator<Item = Vector3>) -> Self {
        let mut aabb = Self::empty();
        for point in points {
            aabb.expand_to_include(point);
        }
        aabb
    }

    /// Check if the AABB is empty (has no valid volume).
    ///
    /// An AABB is empty if min > max for any axis.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Get the per-axis extents of the AABB.
    ///
    /// Returns the zero vector for an empty AABB.
    #[inline]
    #[must_use]
    pub fn size(&self) -> Vector3 {
        if self.is_empty() {
            return Vector3::zero();
        }
        self.max - self.min
    }

    /// Get the center of the AABB.
    #[inline]
    #[must_use]
    pub fn center(&self) -> Vector3 {
        (self.min + self.max).scale(0.5)
    }

    /// Check if the AABB contains a point. Points on the boundary are
    /// considered inside.
    #[inline]
    #[must_use]
    pub fn contains(&self, point: Vector3) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Expand the AABB to include a point. Modifies the AABB in place.
    pub fn expand_to_include(&mut self, point: Vector3) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
