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
//! Rigid bodies
//!
//! A body accumulates forces between ticks and turns them into motion once
//! per tick. Its pose belongs to the owning entity: the body reads it when
//! its caches are rebuilt and writes it back after integration.
//!
//! Force application is simplified for game feel: [`Body::hit`]
//! adds the full force to the linear accumulator *and* derives a torque from
//! the tangential part, so an off-center hit both pushes and spins a body
//! at full strength.

mod material;
mod shape;

pub use material::{Layers, Material};
pub use shape::{ConvexPolygon, Shape};

pub(crate) use shape::edges;

use crate::entity::{Entity, EntityHost};
use crate::error::Result;
use crate::math::{cross, perpendicular, Aabb, Pose};
use crate::physics::BodyHandle;
use crate::replication::BodyDelta;
use glam::DVec2;
use std::fmt;

/// Kicks weaker than this are dropped
pub const MIN_KICK: f64 = 1e-7;

/// Hits closer than this to the center of mass produce no torque
pub const MIN_LEVER_ARM: f64 = 1e-10;

/// A detected contact, as seen from one of the two bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    /// The body whose listeners are being called
    pub this: BodyHandle,
    /// The body it touched
    pub other: BodyHandle,
    /// Entity owning `this`
    pub this_entity: Entity,
    /// Entity owning `other`
    pub other_entity: Entity,
}

impl Contact {
    /// The same contact seen from the other body
    pub fn flipped(&self) -> Contact {
        Contact {
            this: self.other,
            other: self.this,
            this_entity: self.other_entity,
            other_entity: self.this_entity,
        }
    }
}

/// Identifier returned when a collision listener is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callback invoked once per contact per tick
///
/// Listeners run synchronously inside the collision sweep. They may kill
/// entities through the host; bodies of killed entities are skipped for the
/// rest of the sweep.
pub type CollisionListener = Box<dyn FnMut(&Contact, &mut dyn EntityHost) + Send>;

/// A rigid body bound to an entity
pub struct Body {
    name: String,
    entity: Entity,
    material: Material,
    shape: Shape,
    mass: f64,
    moment_of_inertia: f64,
    line_velocity: DVec2,
    line_force: DVec2,
    angle_velocity: f64,
    angle_force: f64,
    pose: Pose,
    world_vertices: Vec<DVec2>,
    aabb: Aabb,
    listeners: Vec<(ListenerId, CollisionListener)>,
    next_listener_id: u64,
    /// Position in the world's body list
    pub(crate) list_index: usize,
}

impl Body {
    /// Create a body; `pose` seeds the caches until the first clear
    pub(crate) fn new(
        name: &str,
        entity: Entity,
        material: Material,
        shape: Shape,
        pose: Pose,
    ) -> Result<Self> {
        material.validate()?;
        let mass = shape.area() * material.density;
        let moment_of_inertia = shape.moment_of_inertia(material.density);
        let mut body = Body {
            name: name.to_string(),
            entity,
            material,
            shape,
            mass,
            moment_of_inertia,
            line_velocity: DVec2::ZERO,
            line_force: DVec2::ZERO,
            angle_velocity: 0.0,
            angle_force: 0.0,
            pose,
            world_vertices: Vec::new(),
            aabb: Aabb::default(),
            listeners: Vec::new(),
            next_listener_id: 0,
            list_index: 0,
        };
        body.clear(pose);
        Ok(body)
    }

    /// Debug name given at creation
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning entity
    pub fn entity(&self) -> Entity {
        self.entity
    }

    /// Material fixed at creation
    pub fn material(&self) -> &Material {
        &self.material
    }

    /// Shape fixed at creation
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether the body is immovable
    pub fn is_static(&self) -> bool {
        self.material.is_static
    }

    /// Area times density
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// Moment of inertia of the shape for the body's density
    pub fn moment_of_inertia(&self) -> f64 {
        self.moment_of_inertia
    }

    /// Linear velocity
    pub fn line_velocity(&self) -> DVec2 {
        self.line_velocity
    }

    /// Overwrite the linear velocity; static bodies ignore it
    pub fn set_line_velocity(&mut self, velocity: DVec2) {
        if self.material.is_static {
            return;
        }
        self.line_velocity = velocity;
    }

    /// Angular velocity in rad/s, counter-clockwise positive
    pub fn angle_velocity(&self) -> f64 {
        self.angle_velocity
    }

    /// Overwrite the angular velocity; static bodies ignore it
    pub fn set_angle_velocity(&mut self, velocity: f64) {
        if self.material.is_static {
            return;
        }
        self.angle_velocity = velocity;
    }

    /// Pending linear force
    pub fn line_force(&self) -> DVec2 {
        self.line_force
    }

    /// Pending torque
    pub fn angle_force(&self) -> f64 {
        self.angle_force
    }

    /// Entity pose as of the last cache rebuild or integration step
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// World-space vertices, counter-clockwise, as of the last cache rebuild
    pub fn world_vertices(&self) -> &[DVec2] {
        &self.world_vertices
    }

    /// Bounding box as of the last cache rebuild
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Push the body through its center of mass
    ///
    /// Forces shorter than [`MIN_KICK`] are ignored, and so are non-finite ones.
    pub fn kick(&mut self, force: DVec2) {
        if !(force.is_finite() && force.length() >= MIN_KICK) {
            return;
        }
        self.line_force += force;
    }

    /// Add torque directly
    pub fn turn_kick(&mut self, torque: f64) {
        self.angle_force += torque;
    }

    /// Apply `force` at world `point` for a body whose center of mass is `center`
    ///
    /// The whole force always reaches the linear accumulator. The part of it
    /// tangential to the lever arm additionally adds a torque of
    /// `|tangential| * |lever arm|`, counter-clockwise positive.
    pub fn hit(&mut self, force: DVec2, point: DVec2, center: DVec2) {
        self.line_force += force;

        let delta = center - point;
        let lever = delta.length();
        if lever < MIN_LEVER_ARM {
            return;
        }

        let normal = delta / lever;
        let radial = normal * normal.dot(force);
        let tangential = force - radial;
        let torque = tangential.length() * lever;

        if cross(point - center, tangential) < 0.0 {
            self.angle_force -= torque;
        } else {
            self.angle_force += torque;
        }
    }

    /// Velocity of the material point at world `point`
    ///
    /// Linear velocity plus the tangential velocity induced by spin around
    /// `center`.
    pub fn velocity_at(&self, point: DVec2, center: DVec2) -> DVec2 {
        self.line_velocity + perpendicular(center - point) * self.angle_velocity
    }

    /// Distance from a world point to the body surface; zero inside
    pub fn map(&self, point: DVec2, pose: &Pose) -> f64 {
        let local = pose.inverse_transform().transform_point2(point);
        self.shape.map_local(local)
    }

    /// Rebuild the world-space vertex and bounding box caches for `pose`
    pub fn clear(&mut self, pose: Pose) {
        let transform = pose.transform();
        self.pose = pose;
        self.shape.transform_vertices(&transform, &mut self.world_vertices);
        self.aabb = self.shape.aabb(&transform, &self.world_vertices);
    }

    /// Integrate accumulated forces over `dt` and move `pose`
    ///
    /// Static bodies only drop their accumulators. Friction damps each
    /// velocity after the force has been applied to it.
    pub fn integrate(&mut self, dt: f64, inertia_divisor: f64, pose: &mut Pose) {
        if self.material.is_static {
            self.line_force = DVec2::ZERO;
            self.angle_force = 0.0;
            return;
        }

        let inertia = self.moment_of_inertia / inertia_divisor;
        self.angle_velocity = (self.angle_velocity + dt * self.angle_force / inertia)
            * (1.0 - self.material.angle_friction);
        pose.rotation += dt * self.angle_velocity;
        self.angle_force = 0.0;

        self.line_velocity = (self.line_velocity + self.line_force * (dt / self.mass))
            * (1.0 - self.material.line_friction);
        pose.location += self.line_velocity * dt;
        self.line_force = DVec2::ZERO;

        self.pose = *pose;
    }

    /// Whether velocities and accumulators are finite
    pub fn is_valid(&self) -> bool {
        self.line_velocity.is_finite()
            && self.angle_velocity.is_finite()
            && self.line_force.is_finite()
            && self.angle_force.is_finite()
    }

    /// Register a collision listener
    pub fn add_collision_listener<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&Contact, &mut dyn EntityHost) + Send + 'static,
    {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unregister a collision listener; returns `false` if it was not registered
    pub fn remove_collision_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Call every listener in registration order
    pub fn call_collision_listeners(&mut self, contact: &Contact, host: &mut dyn EntityHost) {
        for (_, listener) in &mut self.listeners {
            listener(contact, host);
        }
    }

    /// Replication state, or `None` for a static body
    pub fn delta(&self) -> Option<BodyDelta> {
        if self.material.is_static {
            return None;
        }
        Some(BodyDelta {
            line_velocity: self.line_velocity,
            angle_velocity: self.angle_velocity,
        })
    }

    /// Restore replicated state; static bodies ignore it
    pub fn apply_delta(&mut self, delta: &BodyDelta) {
        if self.material.is_static {
            return;
        }
        self.line_velocity = delta.line_velocity;
        self.angle_velocity = delta.angle_velocity;
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("name", &self.name)
            .field("entity", &self.entity)
            .field("material", &self.material)
            .field("shape", &self.shape)
            .field("line_velocity", &self.line_velocity)
            .field("angle_velocity", &self.angle_velocity)
            .field("aabb", &self.aabb)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
