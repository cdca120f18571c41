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
//! # physics2d
//!
//! A deterministic, fixed-step 2D rigid body engine for games.
//!
//! ## Features
//!
//! - **Convex bodies**: rectangles and arbitrary convex polygons with mass
//!   and moment of inertia derived from their material
//! - **Sorted sweep broad phase**: bodies kept ordered along x between ticks
//! - **Penalty response**: vertex penetration pushes bodies apart with
//!   equal and opposite forces
//! - **Collision listeners**: per-body callbacks that may kill entities
//!   in the middle of a tick
//! - **Ray sensors**: closest-hit ray casts that follow their entity
//! - **Replication**: compact velocity deltas for networked peers
//!
//! Entities and their poses live outside the engine behind the
//! [`EntityHost`] trait. [`Scene`] is a ready-made host.
//!
//! ## Example
//!
//! ```rust
//! use glam::DVec2;
//! use physics2d::{Material, Physics, Pose, Scene};
//!
//! let mut scene = Scene::new();
//! let mut physics = Physics::new();
//!
//! let floor = scene.spawn(Pose::default());
//! physics
//!     .create_rectangle_body("floor", floor, Material::new().with_static(true), DVec2::new(200.0, 20.0), &scene)
//!     .unwrap();
//!
//! let ball = scene.spawn(Pose::at(DVec2::new(0.0, 30.0)));
//! let body = physics
//!     .create_rectangle_body("ball", ball, Material::new(), DVec2::new(10.0, 10.0), &scene)
//!     .unwrap();
//! physics.body_mut(body).unwrap().set_line_velocity(DVec2::new(0.0, -20.0));
//!
//! for _ in 0..100 {
//!     physics.tick(&mut scene, 0.02);
//! }
//! assert!(scene.pose(ball).unwrap().location.y > 10.0);
//! ```

#![warn(missing_docs)]

/// Rigid bodies, shapes and materials
pub mod body;

/// World configuration
pub mod config;

/// Entities and the host that owns their poses
pub mod entity;

/// Error types
pub mod error;

/// Planar geometry helpers
pub mod math;

/// The physics world and its tick loop
pub mod physics;

/// State exchanged between replicated worlds
pub mod replication;

/// Sensors that observe bodies
pub mod sensor;

pub use body::{
    Body, CollisionListener, Contact, ConvexPolygon, Layers, ListenerId, Material, Shape,
};
pub use config::PhysicsConfig;
pub use entity::{Entity, EntityHost, Scene};
pub use error::{PhysicsError, Result};
pub use math::{Aabb, Pose};
pub use physics::{BodyHandle, Physics, RaySensorHandle, TickReport};
pub use replication::BodyDelta;
pub use sensor::{IgnoreSet, RaySensor};
