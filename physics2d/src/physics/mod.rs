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
//! The physics world
//!
//! [`Physics`] owns every body and sensor, keyed by generational handles,
//! and advances them one fixed step at a time. Entity poses stay in the
//! [`EntityHost`]; the world reads them at the start of a tick and writes
//! integrated poses back at the end.
//!
//! # Tick phases
//!
//! 1. **Reap**: drop essences whose entity has died.
//! 2. **Clear**: rebuild world-space caches from the entity poses.
//! 3. **Sort**: order bodies by bounding box min x.
//! 4. **Sweep**: resolve contacts and call collision listeners.
//! 5. **Reap**: drop essences of entities killed by listeners.
//! 6. **Query**: offer every body to every ray sensor.
//! 7. **Integrate**: turn accumulated forces into motion.
//!
//! Every phase runs in a fixed order, so two worlds fed the same inputs
//! stay bit-identical.

mod arena;
mod broad;
mod narrow;

pub use arena::{BodyHandle, RaySensorHandle};

use crate::body::{Body, Material, Shape};
use crate::config::PhysicsConfig;
use crate::entity::{Entity, EntityHost};
use crate::error::{PhysicsError, Result};
use crate::math::Pose;
use crate::replication::BodyDelta;
use crate::sensor::RaySensor;
use arena::{Arena, Essence, Key};
use glam::DVec2;
use tracing::{debug, trace, warn};

/// Counters describing one call to [`Physics::tick`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Body pairs that reached the narrow phase
    pub pairs_tested: usize,
    /// Body pairs found touching
    pub contacts: usize,
    /// Essences dropped because their entity died
    pub reaped: usize,
}

/// A world of rigid bodies and ray sensors
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
/// let crate_entity = scene.spawn(Pose::default());
/// let body = physics
///     .create_rectangle_body("crate", crate_entity, Material::new(), DVec2::new(2.0, 2.0), &scene)
///     .unwrap();
/// physics.body_mut(body).unwrap().set_line_velocity(DVec2::new(3.0, 0.0));
///
/// physics.tick(&mut scene, 0.5);
/// assert_eq!(scene.pose(crate_entity).unwrap().location, DVec2::new(1.5, 0.0));
/// ```
#[derive(Default)]
pub struct Physics {
    config: PhysicsConfig,
    essences: Arena,
    bodies: Vec<BodyHandle>,
}

impl Physics {
    /// Create an empty world with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty world with a custom configuration
    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Physics {
            config,
            ..Self::default()
        })
    }

    /// Active configuration
    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    fn live_pose(host: &dyn EntityHost, entity: Entity) -> Result<Pose> {
        if !host.is_alive(entity) {
            return Err(PhysicsError::DeadEntity(entity));
        }
        host.pose(entity).ok_or(PhysicsError::DeadEntity(entity))
    }

    /// Attach a body of any shape to a live entity
    pub fn create_body(
        &mut self,
        name: &str,
        entity: Entity,
        material: Material,
        shape: Shape,
        host: &dyn EntityHost,
    ) -> Result<BodyHandle> {
        let pose = Self::live_pose(host, entity)?;
        let mut body = Body::new(name, entity, material, shape, pose)?;
        body.list_index = self.bodies.len();
        let handle = BodyHandle(self.essences.insert(Essence::Body(body)));
        self.bodies.push(handle);
        debug!("created body '{}' for {}", name, entity);
        Ok(handle)
    }

    /// Attach a `size.x` by `size.y` rectangle centered on the entity
    pub fn create_rectangle_body(
        &mut self,
        name: &str,
        entity: Entity,
        material: Material,
        size: DVec2,
        host: &dyn EntityHost,
    ) -> Result<BodyHandle> {
        let shape = Shape::rectangle(size)?;
        self.create_body(name, entity, material, shape, host)
    }

    /// Attach a convex polygon given in the entity's local frame
    pub fn create_polygon_body(
        &mut self,
        name: &str,
        entity: Entity,
        material: Material,
        vertices: Vec<DVec2>,
        host: &dyn EntityHost,
    ) -> Result<BodyHandle> {
        let shape = Shape::polygon(vertices)?;
        self.create_body(name, entity, material, shape, host)
    }

    /// Attach a ray sensor looking along the entity's local +X axis
    pub fn create_ray_sensor(
        &mut self,
        name: &str,
        entity: Entity,
        host: &dyn EntityHost,
    ) -> Result<RaySensorHandle> {
        let pose = Self::live_pose(host, entity)?;
        let sensor = RaySensor::new(name, entity, pose);
        let handle = RaySensorHandle(self.essences.insert(Essence::RaySensor(sensor)));
        debug!("created ray sensor '{}' for {}", name, entity);
        Ok(handle)
    }

    /// Remove a body and forget it in every sensor's ignore set
    pub fn destroy_body(&mut self, handle: BodyHandle) -> Result<Body> {
        if self.essences.body(handle).is_none() {
            return Err(PhysicsError::StaleBody);
        }
        match self.remove(handle.0) {
            Some(Essence::Body(body)) => Ok(body),
            _ => Err(PhysicsError::StaleBody),
        }
    }

    /// Remove a ray sensor
    pub fn destroy_ray_sensor(&mut self, handle: RaySensorHandle) -> Result<RaySensor> {
        if self.essences.sensor(handle).is_none() {
            return Err(PhysicsError::StaleSensor);
        }
        match self.remove(handle.0) {
            Some(Essence::RaySensor(sensor)) => Ok(sensor),
            _ => Err(PhysicsError::StaleSensor),
        }
    }

    fn remove(&mut self, key: Key) -> Option<Essence> {
        let essence = self.essences.remove(key)?;
        match &essence {
            Essence::Body(body) => {
                let handle = BodyHandle(key);
                let index = body.list_index;
                self.bodies.swap_remove(index);
                if let Some(&moved) = self.bodies.get(index) {
                    if let Some(moved) = self.essences.body_mut(moved) {
                        moved.list_index = index;
                    }
                }
                for (_, other) in self.essences.iter_mut() {
                    if let Essence::RaySensor(sensor) = other {
                        sensor.remove_from_ignore(handle);
                    }
                }
                debug!("destroyed body '{}' of {}", body.name(), body.entity());
            }
            Essence::RaySensor(sensor) => {
                debug!("destroyed ray sensor '{}' of {}", sensor.name(), sensor.entity());
            }
        }
        Some(essence)
    }

    /// Look up a body
    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.essences.body(handle)
    }

    /// Look up a body mutably, e.g. to kick it or register listeners
    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.essences.body_mut(handle)
    }

    /// Look up a ray sensor
    pub fn ray_sensor(&self, handle: RaySensorHandle) -> Option<&RaySensor> {
        self.essences.sensor(handle)
    }

    /// Look up a ray sensor mutably, e.g. to edit its ignore set
    pub fn ray_sensor_mut(&mut self, handle: RaySensorHandle) -> Option<&mut RaySensor> {
        self.essences.sensor_mut(handle)
    }

    /// Bodies in sweep order
    ///
    /// Sorted by bounding box min x right after each tick's sort step.
    /// Removing a body moves the last one into its place until the next sort.
    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Number of live ray sensors
    pub fn sensor_count(&self) -> usize {
        self.essences.len() - self.bodies.len()
    }

    /// Apply `force` at world `point` to a body, around its entity's current location
    pub fn hit(
        &mut self,
        host: &dyn EntityHost,
        handle: BodyHandle,
        force: DVec2,
        point: DVec2,
    ) -> Result<()> {
        let body = self.essences.body_mut(handle).ok_or(PhysicsError::StaleBody)?;
        let center = Self::live_pose(host, body.entity())?.location;
        body.hit(force, point, center);
        Ok(())
    }

    /// Distance from `point` to the nearest body surface
    ///
    /// Zero inside a body, `f64::INFINITY` in an empty world.
    pub fn map(&self, host: &dyn EntityHost, point: DVec2) -> f64 {
        self.bodies
            .iter()
            .filter_map(|handle| self.essences.body(*handle))
            .filter_map(|body| host.pose(body.entity()).map(|pose| body.map(point, &pose)))
            .fold(f64::INFINITY, f64::min)
    }

    /// Offer one body to one ray sensor outside the tick
    pub fn ray_sensor_take(&mut self, sensor: RaySensorHandle, body: BodyHandle) -> Result<()> {
        if self.essences.sensor(sensor).is_none() {
            return Err(PhysicsError::StaleSensor);
        }
        let (ray, target) = self
            .essences
            .sensor_and_body_mut(sensor, body)
            .ok_or(PhysicsError::StaleBody)?;
        ray.take(body, target);
        Ok(())
    }

    /// Replication state of every dynamic body, in sweep order
    pub fn deltas(&self) -> Vec<(BodyHandle, BodyDelta)> {
        self.bodies
            .iter()
            .filter_map(|handle| {
                let delta = self.essences.body(*handle)?.delta()?;
                Some((*handle, delta))
            })
            .collect()
    }

    /// Restore replicated state on one body
    pub fn apply_delta(&mut self, handle: BodyHandle, delta: &BodyDelta) -> Result<()> {
        let body = self.essences.body_mut(handle).ok_or(PhysicsError::StaleBody)?;
        body.apply_delta(delta);
        Ok(())
    }

    /// Advance the world by `dt` seconds
    ///
    /// `dt` is used as given; keep it small (a few hundredths of a second)
    /// for the penalty response to stay stable.
    pub fn tick(&mut self, host: &mut dyn EntityHost, dt: f64) -> TickReport {
        let mut report = TickReport {
            reaped: self.reap(host),
            ..TickReport::default()
        };

        for (_, essence) in self.essences.iter_mut() {
            if let Some(pose) = host.pose(essence.entity()) {
                essence.clear(pose);
            }
        }

        broad::sort_by_min_x(&mut self.bodies, &self.essences);
        for (index, &handle) in self.bodies.iter().enumerate() {
            if let Some(body) = self.essences.body_mut(handle) {
                body.list_index = index;
            }
        }

        let stats = broad::sweep(
            &self.bodies,
            &mut self.essences,
            host,
            self.config.collision_stiffness,
        );
        report.pairs_tested = stats.pairs_tested;
        report.contacts = stats.contacts;

        report.reaped += self.reap(host);

        self.query();
        self.integrate(host, dt);

        trace!(
            pairs_tested = report.pairs_tested,
            contacts = report.contacts,
            reaped = report.reaped,
            "physics tick"
        );
        report
    }

    /// Drop every essence whose entity is dead
    fn reap(&mut self, host: &dyn EntityHost) -> usize {
        let dead: Vec<Key> = self
            .essences
            .iter()
            .filter(|(_, essence)| !host.is_alive(essence.entity()))
            .map(|(key, _)| key)
            .collect();
        for key in &dead {
            self.remove(*key);
        }
        dead.len()
    }

    fn query(&mut self) {
        let sensors: Vec<RaySensorHandle> = self
            .essences
            .iter()
            .filter(|(_, essence)| matches!(essence, Essence::RaySensor(_)))
            .map(|(key, _)| RaySensorHandle(key))
            .collect();
        for sensor in sensors {
            for body in &self.bodies {
                if let Some((ray, target)) = self.essences.sensor_and_body_mut(sensor, *body) {
                    ray.take(*body, target);
                }
            }
        }
    }

    fn integrate(&mut self, host: &mut dyn EntityHost, dt: f64) {
        for (_, essence) in self.essences.iter_mut() {
            let Essence::Body(body) = essence else {
                continue;
            };
            let Some(mut pose) = host.pose(body.entity()) else {
                continue;
            };
            body.integrate(dt, self.config.inertia_divisor, &mut pose);
            if !body.is_static() {
                host.set_pose(body.entity(), pose);
            }
            if self.config.warn_on_invalid_state && !(body.is_valid() && pose.is_valid()) {
                warn!("body '{}' of {} has non-finite state", body.name(), body.entity());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Scene;

    fn world() -> (Physics, Scene) {
        (Physics::new(), Scene::new())
    }

    fn boxed(physics: &mut Physics, scene: &mut Scene, at: DVec2) -> (Entity, BodyHandle) {
        let entity = scene.spawn(Pose::at(at));
        let body = physics
            .create_rectangle_body("box", entity, Material::new(), DVec2::splat(10.0), &*scene)
            .unwrap();
        (entity, body)
    }

    #[test]
    fn test_with_config_validates() {
        assert!(Physics::with_config(PhysicsConfig::new().with_inertia_divisor(0.0)).is_err());
        let config = PhysicsConfig::new().with_collision_stiffness(1.0);
        let physics = Physics::with_config(config).unwrap();
        assert_eq!(physics.config().collision_stiffness, 1.0);
    }

    #[test]
    fn test_create_requires_live_entity() {
        let (mut physics, mut scene) = world();
        let entity = scene.spawn(Pose::default());
        scene.destroy(entity);

        let result =
            physics.create_rectangle_body("box", entity, Material::new(), DVec2::ONE, &scene);
        assert_eq!(result.unwrap_err(), PhysicsError::DeadEntity(entity));
        assert!(physics.create_ray_sensor("eye", entity, &scene).is_err());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_create_rejects_bad_shapes() {
        let (mut physics, mut scene) = world();
        let entity = scene.spawn(Pose::default());
        let flat = DVec2::new(1.0, 0.0);
        let result = physics.create_rectangle_body("flat", entity, Material::new(), flat, &scene);
        assert!(matches!(result, Err(PhysicsError::InvalidShape(_))));

        let line = vec![DVec2::ZERO, DVec2::X, DVec2::new(2.0, 0.0)];
        let result = physics.create_polygon_body("line", entity, Material::new(), line, &scene);
        assert!(matches!(result, Err(PhysicsError::InvalidShape(_))));
    }

    #[test]
    fn test_counts_and_lookup() {
        let (mut physics, mut scene) = world();
        let (_, body) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let eye = scene.spawn(Pose::default());
        let sensor = physics.create_ray_sensor("eye", eye, &scene).unwrap();

        assert_eq!(physics.body_count(), 1);
        assert_eq!(physics.sensor_count(), 1);
        assert_eq!(physics.body(body).unwrap().name(), "box");
        assert_eq!(physics.ray_sensor(sensor).unwrap().name(), "eye");
        assert_eq!(physics.bodies(), &[body]);
    }

    #[test]
    fn test_destroy_body_purges_ignore_sets() {
        let (mut physics, mut scene) = world();
        let (_, first) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let (_, second) = boxed(&mut physics, &mut scene, DVec2::new(50.0, 0.0));
        let eye = scene.spawn(Pose::default());
        let sensor = physics.create_ray_sensor("eye", eye, &scene).unwrap();
        physics.ray_sensor_mut(sensor).unwrap().add_to_ignore(first);

        let body: Body = physics.destroy_body(first).unwrap();
        assert_eq!(body.name(), "box");
        assert!(physics.ray_sensor(sensor).unwrap().ignored().is_empty());
        assert_eq!(physics.bodies(), &[second]);
        assert_eq!(physics.destroy_body(first).unwrap_err(), PhysicsError::StaleBody);
    }

    #[test]
    fn test_destroy_moves_last_body_into_gap() {
        let (mut physics, mut scene) = world();
        let (_, a) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let (_, b) = boxed(&mut physics, &mut scene, DVec2::new(50.0, 0.0));
        let (_, c) = boxed(&mut physics, &mut scene, DVec2::new(100.0, 0.0));
        let (_, d) = boxed(&mut physics, &mut scene, DVec2::new(150.0, 0.0));

        physics.destroy_body(a).unwrap();
        assert_eq!(physics.bodies(), &[d, b, c]);

        // The moved body knows its new place, so it can be removed in turn.
        physics.destroy_body(d).unwrap();
        assert_eq!(physics.bodies(), &[c, b]);
        physics.destroy_body(b).unwrap();
        assert_eq!(physics.bodies(), &[c]);

        physics.tick(&mut scene, 0.02);
        physics.destroy_body(c).unwrap();
        assert!(physics.bodies().is_empty());
    }

    #[test]
    fn test_removal_after_sort_uses_sorted_positions() {
        let (mut physics, mut scene) = world();
        let (_, right) = boxed(&mut physics, &mut scene, DVec2::new(100.0, 0.0));
        let (_, left) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let (_, middle) = boxed(&mut physics, &mut scene, DVec2::new(50.0, 0.0));

        physics.tick(&mut scene, 0.02);
        assert_eq!(physics.bodies(), &[left, middle, right]);

        physics.destroy_body(left).unwrap();
        assert_eq!(physics.bodies(), &[right, middle]);
        physics.destroy_body(middle).unwrap();
        assert_eq!(physics.bodies(), &[right]);
    }

    #[test]
    fn test_destroy_ray_sensor() {
        let (mut physics, mut scene) = world();
        let eye = scene.spawn(Pose::default());
        let sensor = physics.create_ray_sensor("eye", eye, &scene).unwrap();

        let removed: RaySensor = physics.destroy_ray_sensor(sensor).unwrap();
        assert_eq!(removed.entity(), eye);
        assert_eq!(physics.sensor_count(), 0);
        let result = physics.destroy_ray_sensor(sensor);
        assert_eq!(result.unwrap_err(), PhysicsError::StaleSensor);
    }

    #[test]
    fn test_stale_handle_does_not_alias_reused_slot() {
        let (mut physics, mut scene) = world();
        let (_, old) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        physics.destroy_body(old).unwrap();
        let (_, new) = boxed(&mut physics, &mut scene, DVec2::ZERO);

        assert_ne!(old, new);
        assert!(physics.body(old).is_none());
        assert!(physics.body(new).is_some());
    }

    #[test]
    fn test_map_reports_nearest_surface() {
        let (mut physics, mut scene) = world();
        assert_eq!(physics.map(&scene, DVec2::ZERO), f64::INFINITY);

        boxed(&mut physics, &mut scene, DVec2::ZERO);
        boxed(&mut physics, &mut scene, DVec2::new(40.0, 0.0));
        assert_eq!(physics.map(&scene, DVec2::new(1.0, 1.0)), 0.0);
        assert_eq!(physics.map(&scene, DVec2::new(15.0, 0.0)), 10.0);
        assert_eq!(physics.map(&scene, DVec2::new(30.0, 0.0)), 5.0);
    }

    #[test]
    fn test_hit_uses_entity_location() {
        let (mut physics, mut scene) = world();
        let (entity, body) = boxed(&mut physics, &mut scene, DVec2::new(10.0, 0.0));
        physics
            .hit(&scene, body, DVec2::new(0.0, 1.0), DVec2::new(15.0, 0.0))
            .unwrap();
        let state = physics.body(body).unwrap();
        assert_eq!(state.line_force(), DVec2::new(0.0, 1.0));
        assert!((state.angle_force() - 5.0).abs() < 1e-12);

        scene.destroy(entity);
        let result = physics.hit(&scene, body, DVec2::X, DVec2::ZERO);
        assert_eq!(result.unwrap_err(), PhysicsError::DeadEntity(entity));
    }

    #[test]
    fn test_tick_sorts_bodies() {
        let (mut physics, mut scene) = world();
        let (_, right) = boxed(&mut physics, &mut scene, DVec2::new(100.0, 0.0));
        let (_, left) = boxed(&mut physics, &mut scene, DVec2::new(-100.0, 0.0));
        let (_, middle) = boxed(&mut physics, &mut scene, DVec2::new(0.0, 0.0));

        physics.tick(&mut scene, 0.01);
        assert_eq!(physics.bodies(), &[left, middle, right]);
    }

    #[test]
    fn test_tick_reaps_dead_entities() {
        let (mut physics, mut scene) = world();
        let (entity, body) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let sensor = physics.create_ray_sensor("eye", entity, &scene).unwrap();

        scene.destroy(entity);
        let report = physics.tick(&mut scene, 0.01);
        assert_eq!(report.reaped, 2);
        assert!(physics.body(body).is_none());
        assert!(physics.ray_sensor(sensor).is_none());
    }

    #[test]
    fn test_ray_sensor_take_on_demand() {
        let (mut physics, mut scene) = world();
        let eye = scene.spawn(Pose::default());
        let sensor = physics.create_ray_sensor("eye", eye, &scene).unwrap();
        let (_, wall) = boxed(&mut physics, &mut scene, DVec2::new(20.0, 0.0));

        physics.ray_sensor_take(sensor, wall).unwrap();
        let ray = physics.ray_sensor(sensor).unwrap();
        assert_eq!(ray.observable(), Some(wall));
        assert_eq!(ray.distance(), 15.0);

        physics.destroy_body(wall).unwrap();
        let result = physics.ray_sensor_take(sensor, wall);
        assert_eq!(result.unwrap_err(), PhysicsError::StaleBody);
    }

    #[test]
    fn test_deltas_round_trip_between_worlds() {
        let (mut physics, mut scene) = world();
        let (_, body) = boxed(&mut physics, &mut scene, DVec2::ZERO);
        let wall_entity = scene.spawn(Pose::at(DVec2::new(0.0, -100.0)));
        let wall = Material::new().with_static(true);
        physics
            .create_rectangle_body("wall", wall_entity, wall, DVec2::ONE, &scene)
            .unwrap();
        physics.body_mut(body).unwrap().set_line_velocity(DVec2::new(2.0, -1.0));

        let deltas = physics.deltas();
        assert_eq!(deltas.len(), 1);
        assert_eq!(deltas[0].0, body);

        let mut replica = Physics::new();
        let mut replica_scene = Scene::new();
        let (_, copy) = boxed(&mut replica, &mut replica_scene, DVec2::ZERO);
        replica.apply_delta(copy, &deltas[0].1).unwrap();
        assert_eq!(replica.body(copy).unwrap().line_velocity(), DVec2::new(2.0, -1.0));
    }
}
