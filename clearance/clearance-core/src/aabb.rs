//! Axis-aligned bounding boxes.
//!
//! The bounding volume stored in every [`Bvh`](crate::bvh::Bvh) node. Besides
//! overlap tests, boxes provide a separation distance that serves as the lower
//! bound for branch-and-bound distance queries.

use nalgebra::{Isometry3, Point3, Vector3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3<f64>,
    /// Maximum corner of the bounding box.
    pub max: Point3<f64>,
}

impl Aabb {
    /// Create a new AABB from minimum and maximum corners.
    #[must_use]
    pub const fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Smallest AABB containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Self::new(*first, *first);
        for p in rest {
            aabb.include(p);
        }
        Some(aabb)
    }

    /// Grow the box to contain `point`.
    pub fn include(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Smallest AABB containing both boxes.
    #[must_use]
    pub fn merged(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Check if this AABB overlaps with another AABB.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Euclidean distance between the two boxes (0 when they overlap).
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let gap = |a_min: f64, a_max: f64, b_min: f64, b_max: f64| {
            (b_min - a_max).max(a_min - b_max).max(0.0)
        };
        let dx = gap(self.min.x, self.max.x, other.min.x, other.max.x);
        let dy = gap(self.min.y, self.max.y, other.min.y, other.max.y);
        let dz = gap(self.min.z, self.max.z, other.min.z, other.max.z);
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        Point3::from((self.min.coords + self.max.coords) * 0.5)
    }

    /// Axis with the largest extent. Ties favor X, then Y.
    #[must_use]
    pub fn longest_axis(&self) -> Axis {
        let extent = self.max - self.min;
        if extent.x >= extent.y && extent.x >= extent.z {
            Axis::X
        } else if extent.y >= extent.z {
            Axis::Y
        } else {
            Axis::Z
        }
    }

    /// Bound this box after transforming it by an isometry.
    ///
    /// Rotation generally produces a larger box that bounds the rotated one.
    #[must_use]
    pub fn transformed(&self, transform: &Isometry3<f64>) -> Self {
        let corners = [
            Point3::new(self.min.x, self.min.y, self.min.z),
            Point3::new(self.max.x, self.min.y, self.min.z),
            Point3::new(self.min.x, self.max.y, self.min.z),
            Point3::new(self.max.x, self.max.y, self.min.z),
            Point3::new(self.min.x, self.min.y, self.max.z),
            Point3::new(self.max.x, self.min.y, self.max.z),
            Point3::new(self.min.x, self.max.y, self.max.z),
            Point3::new(self.max.x, self.max.y, self.max.z),
        ];

        let first = transform * corners[0];
        let mut out = Self::new(first, first);
        for corner in &corners[1..] {
            out.include(&(transform * corner));
        }
        out
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::new(Point3::origin(), Point3::origin())
    }
}

/// Coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// X-axis.
    X,
    /// Y-axis.
    Y,
    /// Z-axis.
    Z,
}

impl Axis {
    /// Component of `v` along this axis.
    #[must_use]
    pub fn component(self, v: &Vector3<f64>) -> f64 {
        match self {
            Self::X => v.x,
            Self::Y => v.y,
            Self::Z => v.z,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Translation3, UnitQuaternion};

    #[test]
    fn test_overlap() {
        let a = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(0.5, -1.0, -1.0), Point3::new(2.5, 1.0, 1.0));
        let c = Aabb::new(Point3::new(4.0, -1.0, -1.0), Point3::new(6.0, 1.0, 1.0));
        assert!(a.overlaps(&b));
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_distance() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(4.0, 0.0, 0.0), Point3::new(5.0, 1.0, 1.0));
        assert_relative_eq!(a.distance(&b), 3.0, epsilon = 1e-12);
        assert_relative_eq!(b.distance(&a), 3.0, epsilon = 1e-12);

        // Diagonal separation
        let c = Aabb::new(Point3::new(2.0, 2.0, 0.0), Point3::new(3.0, 3.0, 1.0));
        assert_relative_eq!(a.distance(&c), 2.0_f64.sqrt(), epsilon = 1e-12);

        // Overlapping boxes
        let d = Aabb::new(Point3::new(0.5, 0.5, 0.5), Point3::new(2.0, 2.0, 2.0));
        assert_eq!(a.distance(&d), 0.0);
    }

    #[test]
    fn test_from_points() {
        assert!(Aabb::from_points(&[]).is_none());

        let aabb = Aabb::from_points(&[
            Point3::new(1.0, -2.0, 0.0),
            Point3::new(-1.0, 3.0, 0.5),
            Point3::new(0.0, 0.0, -4.0),
        ])
        .unwrap();
        assert_eq!(aabb.min, Point3::new(-1.0, -2.0, -4.0));
        assert_eq!(aabb.max, Point3::new(1.0, 3.0, 0.5));
        assert_eq!(aabb.longest_axis(), Axis::Y);
    }

    #[test]
    fn test_transformed_contains_rotated_corners() {
        let aabb = Aabb::new(Point3::new(-1.0, -0.5, -0.25), Point3::new(1.0, 0.5, 0.25));
        let iso = Isometry3::from_parts(
            Translation3::new(2.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.3, -0.7, 1.1),
        );
        let out = aabb.transformed(&iso);

        for x in [aabb.min.x, aabb.max.x] {
            for y in [aabb.min.y, aabb.max.y] {
                for z in [aabb.min.z, aabb.max.z] {
                    let p = iso * Point3::new(x, y, z);
                    assert!(out.min.x <= p.x + 1e-12 && p.x <= out.max.x + 1e-12);
                    assert!(out.min.y <= p.y + 1e-12 && p.y <= out.max.y + 1e-12);
                    assert!(out.min.z <= p.z + 1e-12 && p.z <= out.max.z + 1e-12);
                }
            }
        }
    }

    #[test]
    fn test_merged() {
        let a = Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(-1.0, 2.0, 0.0), Point3::new(0.0, 3.0, 0.5));
        let m = a.merged(&b);
        assert_eq!(m.min, Point3::new(-1.0, 0.0, 0.0));
        assert_eq!(m.max, Point3::new(1.0, 3.0, 1.0));
        assert_eq!(m.center(), Point3::new(0.0, 1.5, 0.5));
    }
}
