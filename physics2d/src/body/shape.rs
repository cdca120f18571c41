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
//! Convex body shapes
//!
//! Shapes are a closed set. Every variant is a convex vertex loop stored
//! counter-clockwise in the owning entity's local frame, which is what the
//! narrow phase and the ray sensor operate on; adding a variant means
//! extending the exhaustive matches here rather than a runtime type check.
//!
//! # Inertia scaling
//!
//! The rectangle's moment of inertia is `w*h*(w² + h²)*4*density/3`, which
//! is sixteen times the textbook `m*(w² + h²)/12`. Polygons use the same
//! factor so a rectangle described as a polygon integrates identically.

use crate::error::{PhysicsError, Result};
use crate::math::{cross, Aabb};
use glam::{DAffine2, DVec2};

/// Scale applied to textbook polar moments so all shapes match the rectangle formula
const INERTIA_SCALE: f64 = 16.0;

/// Shape of a rigid body
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Axis-aligned (in local space) rectangle centered on the entity origin
    Rectangle {
        /// Full width and height
        size: DVec2,
    },
    /// Convex polygon around the entity origin
    Polygon(ConvexPolygon),
}

impl Shape {
    /// Rectangle of the given full size
    pub fn rectangle(size: DVec2) -> Result<Self> {
        if !(size.is_finite() && size.x > 0.0 && size.y > 0.0) {
            return Err(PhysicsError::InvalidShape(format!(
                "rectangle size must be positive and finite, got {}",
                size
            )));
        }
        Ok(Shape::Rectangle { size })
    }

    /// Convex polygon from a vertex loop in either winding
    pub fn polygon(vertices: Vec<DVec2>) -> Result<Self> {
        ConvexPolygon::new(vertices).map(Shape::Polygon)
    }

    /// Surface area
    pub fn area(&self) -> f64 {
        match self {
            Shape::Rectangle { size } => size.x * size.y,
            Shape::Polygon(polygon) => polygon.area(),
        }
    }

    /// Moment of inertia about the entity origin for the given density
    pub fn moment_of_inertia(&self, density: f64) -> f64 {
        match self {
            Shape::Rectangle { size } => {
                let (w, h) = (size.x, size.y);
                w * h * (h * h + w * w) * 4.0 * density / 3.0
            }
            Shape::Polygon(polygon) => polygon.polar_moment() * density * INERTIA_SCALE,
        }
    }

    /// Vertices in the local frame, counter-clockwise
    pub fn local_vertices(&self) -> Vec<DVec2> {
        match self {
            Shape::Rectangle { size } => rectangle_corners(*size).to_vec(),
            Shape::Polygon(polygon) => polygon.vertices().to_vec(),
        }
    }

    /// Write the world-space vertices into `out`, replacing its contents
    pub fn transform_vertices(&self, transform: &DAffine2, out: &mut Vec<DVec2>) {
        out.clear();
        match self {
            Shape::Rectangle { size } => out.extend(
                rectangle_corners(*size).map(|v| transform.transform_point2(v)),
            ),
            Shape::Polygon(polygon) => out.extend(
                polygon.vertices().iter().map(|v| transform.transform_point2(*v)),
            ),
        }
    }

    /// Bounding box of the shape under `transform`
    ///
    /// `world_vertices` must be the output of [`transform_vertices`](Self::transform_vertices)
    /// for the same transform.
    pub fn aabb(&self, transform: &DAffine2, world_vertices: &[DVec2]) -> Aabb {
        match self {
            Shape::Rectangle { size } => {
                let half = *size * 0.5;
                let center = transform.transform_point2(DVec2::ZERO);
                let a = transform.transform_point2(half) - center;
                let b = transform.transform_point2(DVec2::new(half.x, -half.y)) - center;
                Aabb::from_center(center, a.abs().max(b.abs()))
            }
            Shape::Polygon(_) => {
                let center = transform.transform_point2(DVec2::ZERO);
                Aabb::enclosing(world_vertices).unwrap_or_else(|| Aabb::new(center, center))
            }
        }
    }

    /// Distance from a local-frame point to the shape; zero inside
    pub fn map_local(&self, point: DVec2) -> f64 {
        match self {
            Shape::Rectangle { size } => {
                let outside = (point.abs() - *size * 0.5).max(DVec2::ZERO);
                outside.length()
            }
            Shape::Polygon(polygon) => polygon.distance(point),
        }
    }
}

/// Validated convex polygon, wound counter-clockwise
#[derive(Debug, Clone, PartialEq)]
pub struct ConvexPolygon {
    vertices: Vec<DVec2>,
}

impl ConvexPolygon {
    /// Validate a vertex loop
    ///
    /// Clockwise input is reversed. Fails for fewer than three vertices,
    /// non-finite coordinates, zero area, or a loop that is not strictly
    /// convex.
    pub fn new(mut vertices: Vec<DVec2>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PhysicsError::InvalidShape(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.iter().any(|v| !v.is_finite()) {
            return Err(PhysicsError::InvalidShape(
                "polygon vertices must be finite".to_string(),
            ));
        }

        let signed_area = signed_area(&vertices);
        if signed_area.abs() < f64::EPSILON {
            return Err(PhysicsError::InvalidShape("polygon has zero area".to_string()));
        }
        if signed_area < 0.0 {
            vertices.reverse();
        }

        let n = vertices.len();
        for i in 0..n {
            let e1 = vertices[i];
            let edge = vertices[(i + 1) % n] - e1;
            let convex = (0..n)
                .filter(|&k| k != i && k != (i + 1) % n)
                .all(|k| cross(edge, vertices[k] - e1) > 0.0);
            if !convex {
                return Err(PhysicsError::InvalidShape(
                    "polygon must be strictly convex".to_string(),
                ));
            }
        }

        Ok(ConvexPolygon { vertices })
    }

    /// Vertices, counter-clockwise
    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    /// Surface area
    pub fn area(&self) -> f64 {
        signed_area(&self.vertices)
    }

    /// Textbook polar second moment of area about the local origin
    fn polar_moment(&self) -> f64 {
        edges(&self.vertices)
            .map(|(a, b)| cross(a, b) * (a.dot(a) + a.dot(b) + b.dot(b)))
            .sum::<f64>()
            / 12.0
    }

    fn distance(&self, point: DVec2) -> f64 {
        if edges(&self.vertices).all(|(a, b)| cross(b - a, point - a) >= 0.0) {
            return 0.0;
        }
        edges(&self.vertices)
            .map(|(a, b)| segment_distance(point, a, b))
            .fold(f64::INFINITY, f64::min)
    }
}

/// Corners of a centered rectangle, counter-clockwise from the bottom left
fn rectangle_corners(size: DVec2) -> [DVec2; 4] {
    let half = size * 0.5;
    [
        DVec2::new(-half.x, -half.y),
        DVec2::new(half.x, -half.y),
        DVec2::new(half.x, half.y),
        DVec2::new(-half.x, half.y),
    ]
}

/// Consecutive vertex pairs of a closed loop
pub(crate) fn edges(vertices: &[DVec2]) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
    let n = vertices.len();
    (0..n).map(move |i| (vertices[i], vertices[(i + 1) % n]))
}

fn signed_area(vertices: &[DVec2]) -> f64 {
    edges(vertices).map(|(a, b)| cross(a, b)).sum::<f64>() * 0.5
}

fn segment_distance(point: DVec2, a: DVec2, b: DVec2) -> f64 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq == 0.0 {
        return point.distance(a);
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}
