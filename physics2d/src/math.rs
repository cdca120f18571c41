// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! 2D geometry helpers
//!
//! Vectors and affine transforms come from `glam` in double precision.
//! This module adds the handful of planar operations the solver needs
//! on top of them: the scalar cross product, the perpendicular used for
//! spin-induced velocity, entity poses, and axis-aligned bounding boxes.

use glam::{DAffine2, DVec2};

/// Scalar (z component of the) cross product of two planar vectors
///
/// Positive when `b` lies counter-clockwise of `a`.
#[inline]
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Rotate a vector a quarter turn clockwise: `(x, y) -> (y, -x)`
///
/// Length is preserved, so `perpendicular(v) * w` is the tangential
/// velocity at offset `-v` from a center spinning at `w` rad/s.
#[inline]
pub fn perpendicular(v: DVec2) -> DVec2 {
    DVec2::new(v.y, -v.x)
}

/// Location and rotation of an entity in world space
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use physics2d::Pose;
///
/// let pose = Pose::new(DVec2::new(10.0, 0.0), std::f64::consts::FRAC_PI_2);
/// let p = pose.transform().transform_point2(DVec2::new(1.0, 0.0));
/// assert!((p - DVec2::new(10.0, 1.0)).length() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    /// World-space origin of the entity (also the body's center of mass)
    pub location: DVec2,
    /// Counter-clockwise rotation in radians
    pub rotation: f64,
}

impl Pose {
    /// Create a pose from a location and rotation
    pub fn new(location: DVec2, rotation: f64) -> Self {
        Pose { location, rotation }
    }

    /// Create a pose at `location` with no rotation
    pub fn at(location: DVec2) -> Self {
        Pose::new(location, 0.0)
    }

    /// Local-to-world transform
    pub fn transform(&self) -> DAffine2 {
        DAffine2::from_angle_translation(self.rotation, self.location)
    }

    /// World-to-local transform
    pub fn inverse_transform(&self) -> DAffine2 {
        self.transform().inverse()
    }

    /// Check that location and rotation are finite
    pub fn is_valid(&self) -> bool {
        self.location.is_finite() && self.rotation.is_finite()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Lower-left corner
    pub min: DVec2,
    /// Upper-right corner
    pub max: DVec2,
}

impl Aabb {
    /// Create a box from its corners
    pub fn new(min: DVec2, max: DVec2) -> Self {
        Aabb { min, max }
    }

    /// Create a box from its center and half extents
    pub fn from_center(center: DVec2, half_extents: DVec2) -> Self {
        Aabb::new(center - half_extents, center + half_extents)
    }

    /// Smallest box enclosing every point, or `None` for an empty set
    pub fn enclosing(points: &[DVec2]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let mut aabb = Aabb::new(*first, *first);
        for p in rest {
            aabb.min = aabb.min.min(*p);
            aabb.max = aabb.max.max(*p);
        }
        Some(aabb)
    }

    /// Half of the box's size along each axis
    pub fn half_extents(&self) -> DVec2 {
        (self.max - self.min) * 0.5
    }

    /// Whether the y ranges of two boxes intersect (touching counts)
    pub fn overlaps_y(&self, other: &Aabb) -> bool {
        !(self.min.y > other.max.y || self.max.y < other.min.y)
    }

    /// Whether two boxes intersect (touching counts)
    pub fn overlaps(&self, other: &Aabb) -> bool {
        !(self.max.x < other.min.x || self.min.x > other.max.x) && self.overlaps_y(other)
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb::new(DVec2::ZERO, DVec2::ZERO)
    }
}
