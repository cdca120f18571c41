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
//! Narrow phase
//!
//! Vertex-in-polygon penetration test with a penalty impulse. The test is
//! asymmetric: it only finds vertices of `a` inside `b`, so the sweep runs
//! it in both directions.

use crate::body::{edges, Body};
use crate::math::cross;
use glam::DVec2;

/// Penetration of a world point into a convex polygon
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Penetration {
    /// Distance to the nearest edge
    pub depth: f64,
    /// Unit normal of the nearest edge, pointing out of the polygon
    pub normal: DVec2,
}

/// Penetration of `point` into the counter-clockwise polygon `vertices`
///
/// A point on or outside any edge line is not inside.
pub(crate) fn penetration(point: DVec2, vertices: &[DVec2]) -> Option<Penetration> {
    let mut nearest: Option<Penetration> = None;
    for (e1, e2) in edges(vertices) {
        let edge = e2 - e1;
        let side = cross(edge, point - e1);
        if side <= 0.0 {
            return None;
        }
        let length = edge.length();
        let depth = side / length;
        if nearest.map_or(true, |n| depth < n.depth) {
            nearest = Some(Penetration {
                depth,
                normal: DVec2::new(edge.y, -edge.x) / length,
            });
        }
    }
    nearest
}

/// Resolve every vertex of `a` that lies inside `b`
///
/// Each contact pushes `a` out along the normal of `b`'s nearest edge and
/// pushes `b` back with the opposite force, unless the two surfaces are
/// already separating at that point. Returns whether any vertex was inside.
pub(crate) fn intersect(a: &mut Body, b: &mut Body, stiffness: f64) -> bool {
    let a_center = a.pose().location;
    let b_center = b.pose().location;
    let min_mass = a.mass().min(b.mass());
    let mut touching = false;

    for i in 0..a.world_vertices().len() {
        let point = a.world_vertices()[i];
        let Some(contact) = penetration(point, b.world_vertices()) else {
            continue;
        };
        touching = true;

        let dv = b.velocity_at(point, b_center) - a.velocity_at(point, a_center);
        if contact.normal.dot(dv) < 0.0 {
            continue;
        }

        let power = stiffness * min_mass * contact.depth.sqrt();
        a.hit(contact.normal * power, point, a_center);
        b.hit(-contact.normal * power, point, b_center);
    }

    touching
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Material, Shape};
    use crate::entity::Entity;
    use crate::math::Pose;

    fn square(size: f64, at: DVec2, material: Material) -> Body {
        Body::new(
            "square",
            Entity::new(0, 0),
            material,
            Shape::rectangle(DVec2::splat(size)).unwrap(),
            Pose::at(at),
        )
        .unwrap()
    }

    #[test]
    fn test_penetration_picks_nearest_edge() {
        let square = [
            DVec2::new(-5.0, -5.0),
            DVec2::new(5.0, -5.0),
            DVec2::new(5.0, 5.0),
            DVec2::new(-5.0, 5.0),
        ];
        let hit = penetration(DVec2::new(4.0, 1.0), &square).unwrap();
        assert!((hit.depth - 1.0).abs() < 1e-12);
        assert!((hit.normal - DVec2::X).length() < 1e-12);

        let hit = penetration(DVec2::new(0.0, -3.0), &square).unwrap();
        assert!((hit.depth - 2.0).abs() < 1e-12);
        assert!((hit.normal + DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_points_on_or_outside_edges_are_not_inside() {
        let triangle = [DVec2::ZERO, DVec2::new(4.0, 0.0), DVec2::new(0.0, 4.0)];
        assert!(penetration(DVec2::new(2.0, 0.0), &triangle).is_none());
        assert!(penetration(DVec2::new(5.0, 1.0), &triangle).is_none());
        assert!(penetration(DVec2::new(1.0, 1.0), &triangle).is_some());
    }

    #[test]
    fn test_impulse_obeys_third_law() {
        // Corner (7, 3) of `a` sits inside `b` while the two approach.
        let mut a = square(10.0, DVec2::new(2.0, -2.0), Material::new());
        let mut b = square(4.0, DVec2::new(8.0, 3.0), Material::new().with_density(3.0));
        a.set_line_velocity(DVec2::new(5.0, 0.0));

        assert!(intersect(&mut a, &mut b, 10_000.0));
        assert!(a.line_force().length() > 0.0);
        assert!((a.line_force() + b.line_force()).length() < 1e-9);
        // Pushed out through b's nearest (left) edge.
        assert!(a.line_force().x < 0.0);
    }

    #[test]
    fn test_separating_contact_counts_without_impulse() {
        let mut a = square(10.0, DVec2::new(2.0, -2.0), Material::new());
        let mut b = square(4.0, DVec2::new(8.0, 3.0), Material::new());
        a.set_line_velocity(DVec2::new(-5.0, 0.0));

        assert!(intersect(&mut a, &mut b, 10_000.0));
        assert_eq!(a.line_force(), DVec2::ZERO);
        assert_eq!(b.line_force(), DVec2::ZERO);
    }

    #[test]
    fn test_response_scales_with_lighter_mass() {
        let mut a = square(10.0, DVec2::new(2.0, -2.0), Material::new());
        let mut b = square(4.0, DVec2::new(8.0, 3.0), Material::new());
        intersect(&mut a, &mut b, 10_000.0);

        // One corner at depth 1 against a 16 kg body: 10000 * 16 * 1
        assert!((a.line_force().x + 160_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_apart_bodies_do_not_touch() {
        let mut a = square(10.0, DVec2::ZERO, Material::new());
        let mut b = square(10.0, DVec2::new(30.0, 0.0), Material::new());
        assert!(!intersect(&mut a, &mut b, 10_000.0));
        assert!(!intersect(&mut b, &mut a, 10_000.0));
        assert_eq!(a.line_force(), DVec2::ZERO);
    }
}
