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
//! Entity handles and the host interface
//!
//! Entities are owned by the embedding simulation, not by the physics core.
//! The core refers to them through generational [`Entity`] handles and reads
//! or writes their pose through the [`EntityHost`] trait. A handle whose
//! entity has been destroyed simply stops resolving, which is how the death
//! of an entity cascades to the bodies and sensors it owns.
//!
//! [`Scene`] is a small in-crate host for tests, demos and embedders that do
//! not have an entity graph of their own.

mod handle;
mod scene;

pub use handle::Entity;
pub use scene::Scene;

use crate::math::Pose;

/// Interface to the entity graph that owns positions and rotations
///
/// The physics core never owns entities. It asks the host whether an entity
/// is alive, reads its pose before collision tests, writes the integrated
/// pose back, and lets collision listeners kill entities.
pub trait EntityHost {
    /// Whether the entity still exists
    fn is_alive(&self, entity: Entity) -> bool;

    /// Current pose of the entity, or `None` if it is dead
    fn pose(&self, entity: Entity) -> Option<Pose>;

    /// Overwrite the pose of the entity; ignored if it is dead
    fn set_pose(&mut self, entity: Entity, pose: Pose);

    /// Destroy the entity
    ///
    /// Returns `false` if it was already dead. Bodies and sensors owned by
    /// the entity are skipped from this point on and reaped by the next
    /// compaction pass of the physics world.
    fn kill(&mut self, entity: Entity) -> bool;
}
