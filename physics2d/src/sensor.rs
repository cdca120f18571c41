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
//! Sensors
//!
//! Sensors read world geometry without taking part in collision response.
//! Every sensor carries an [`IgnoreSet`] of bodies it must not report; the
//! world drops a body from every ignore set when the body dies.
//!
//! The ray sensor casts along the owning entity's local +X axis. Each tick
//! it is reset, re-aimed from the entity pose, and then offered every body;
//! it keeps the closest edge crossing.

use crate::body::{edges, Body, Layers};
use crate::entity::Entity;
use crate::math::{cross, Pose};
use crate::physics::BodyHandle;
use glam::DVec2;
use std::collections::HashSet;

/// Bodies a sensor skips
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    bodies: HashSet<BodyHandle>,
}

impl IgnoreSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore a body; returns `false` if it was already ignored
    pub fn insert(&mut self, body: BodyHandle) -> bool {
        self.bodies.insert(body)
    }

    /// Stop ignoring a body; returns `false` if it was not ignored
    pub fn remove(&mut self, body: BodyHandle) -> bool {
        self.bodies.remove(&body)
    }

    /// Whether a body is ignored
    pub fn contains(&self, body: BodyHandle) -> bool {
        self.bodies.contains(&body)
    }

    /// Number of ignored bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Whether nothing is ignored
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Ray cast from an entity along its local +X axis
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use physics2d::{Material, Physics, Pose, Scene};
///
/// let mut scene = Scene::new();
/// let mut physics = Physics::new();
///
/// let eye = scene.spawn(Pose::default());
/// let wall = scene.spawn(Pose::at(DVec2::new(50.0, 0.0)));
/// let sensor = physics.create_ray_sensor("eye", eye, &scene).unwrap();
/// let body = physics
///     .create_rectangle_body("wall", wall, Material::new().with_static(true), DVec2::new(10.0, 100.0), &scene)
///     .unwrap();
///
/// physics.tick(&mut scene, 0.02);
/// let ray = physics.ray_sensor(sensor).unwrap();
/// assert_eq!(ray.observable(), Some(body));
/// assert!((ray.distance() - 45.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct RaySensor {
    name: String,
    entity: Entity,
    ignore: IgnoreSet,
    layers: Layers,
    start: DVec2,
    direction: DVec2,
    distance: f64,
    observable: Option<BodyHandle>,
}

impl RaySensor {
    pub(crate) fn new(name: &str, entity: Entity, pose: Pose) -> Self {
        let mut sensor = RaySensor {
            name: name.to_string(),
            entity,
            ignore: IgnoreSet::new(),
            layers: Layers::ALL,
            start: DVec2::ZERO,
            direction: DVec2::X,
            distance: f64::INFINITY,
            observable: None,
        };
        sensor.clear(pose);
        sensor
    }

    /// Debug name given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning entity
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Distance to the closest hit this tick, `f64::INFINITY` if none
    pub fn distance(&self) -> f64 {
        self.distance
    }

    /// Body hit this tick, if any
    pub fn observable(&self) -> Option<BodyHandle> {
        self.observable
    }

    /// Ray origin of the current tick
    pub fn start(&self) -> DVec2 {
        self.start
    }

    /// Unit ray direction of the current tick
    pub fn direction(&self) -> DVec2 {
        self.direction
    }

    /// Point where the ray hit, if it hit anything
    pub fn hit_point(&self) -> Option<DVec2> {
        self.observable.map(|_| self.start + self.direction * self.distance)
    }

    /// Layers the ray can see
    pub fn layers(&self) -> Layers {
        self.layers
    }

    /// Restrict the ray to bodies on the given layers
    pub fn set_layers(&mut self, layers: Layers) {
        self.layers = layers;
    }

    /// Never report `body`
    pub fn add_to_ignore(&mut self, body: BodyHandle) -> bool {
        self.ignore.insert(body)
    }

    /// Report `body` again
    pub fn remove_from_ignore(&mut self, body: BodyHandle) -> bool {
        self.ignore.remove(body)
    }

    /// Bodies this sensor skips
    pub fn ignored(&self) -> &IgnoreSet {
        &self.ignore
    }

    /// Reset the result and re-aim the ray from the entity pose
    pub fn clear(&mut self, pose: Pose) {
        let transform = pose.transform();
        self.distance = f64::INFINITY;
        self.observable = None;
        self.start = transform.transform_point2(DVec2::ZERO);
        self.direction = transform.transform_point2(DVec2::X) - self.start;
    }

    /// Test the ray against every edge of `body` and keep a closer hit
    ///
    /// Each edge `(p1, p2)` is solved for `start + t * direction = p1 + v * (p2 - p1)`.
    /// A hit needs `0 <= v < 1`, so a vertex shared by two edges counts once,
    /// and `0 < t < distance`.
    pub fn take(&mut self, handle: BodyHandle, body: &Body) {
        if self.ignore.contains(handle) || !self.layers.intersects(body.material().layers) {
            return;
        }

        for (p1, p2) in edges(body.world_vertices()) {
            let negv = p1 - p2;
            let det = cross(self.direction, negv);
            if det == 0.0 {
                continue;
            }
            let offset = p1 - self.start;
            let v = cross(self.direction, offset) / det;
            let t = cross(offset, negv) / det;
            if (0.0..1.0).contains(&v) && t > 0.0 && t < self.distance {
                self.distance = t;
                self.observable = Some(handle);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Material, Shape};
    use std::f64::consts::FRAC_PI_2;

    fn wall_at(x: f64) -> Body {
        Body::new(
            "wall",
            Entity::new(1, 0),
            Material::new(),
            Shape::rectangle(DVec2::new(10.0, 10.0)).unwrap(),
            Pose::at(DVec2::new(x, 0.0)),
        )
        .unwrap()
    }

    #[test]
    fn test_clear_resets_and_aims() {
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), Pose::default());
        sensor.take(BodyHandle::dangling(), &wall_at(20.0));
        assert!(sensor.observable().is_some());

        sensor.clear(Pose::new(DVec2::new(1.0, 1.0), FRAC_PI_2));
        assert_eq!(sensor.distance(), f64::INFINITY);
        assert_eq!(sensor.observable(), None);
        assert_eq!(sensor.start(), DVec2::new(1.0, 1.0));
        assert!((sensor.direction() - DVec2::Y).length() < 1e-12);
    }

    #[test]
    fn test_take_finds_nearest_edge() {
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), Pose::default());
        let handle = BodyHandle::dangling();
        sensor.take(handle, &wall_at(20.0));
        assert_eq!(sensor.observable(), Some(handle));
        assert!((sensor.distance() - 15.0).abs() < 1e-12);
        assert!((sensor.hit_point().unwrap() - DVec2::new(15.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_take_keeps_closer_hit() {
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), Pose::default());
        let near = BodyHandle::dangling();
        sensor.take(near, &wall_at(20.0));
        let far = wall_at(60.0);
        sensor.take(BodyHandle::dangling(), &far);
        assert!((sensor.distance() - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_body_behind_ray_is_missed() {
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), Pose::default());
        sensor.take(BodyHandle::dangling(), &wall_at(-20.0));
        assert_eq!(sensor.observable(), None);
        assert_eq!(sensor.distance(), f64::INFINITY);
    }

    #[test]
    fn test_ray_from_inside_hits_exit_edge() {
        let pose = Pose::at(DVec2::new(20.0, 0.0));
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), pose);
        sensor.take(BodyHandle::dangling(), &wall_at(20.0));
        assert_eq!(sensor.distance(), 5.0);
    }

    #[test]
    fn test_ignored_and_filtered_bodies_are_skipped() {
        let mut sensor = RaySensor::new("ray", Entity::new(0, 0), Pose::default());
        let handle = BodyHandle::dangling();
        assert!(sensor.add_to_ignore(handle));
        assert!(!sensor.add_to_ignore(handle));
        sensor.take(handle, &wall_at(20.0));
        assert_eq!(sensor.observable(), None);

        assert!(sensor.remove_from_ignore(handle));
        assert!(sensor.ignored().is_empty());
        sensor.set_layers(Layers::NONE);
        sensor.take(handle, &wall_at(20.0));
        assert_eq!(sensor.observable(), None);
    }
}
