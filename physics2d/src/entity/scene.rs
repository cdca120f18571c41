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
//! Reference entity host
//!
//! `Scene` stores a pose per entity in a slot vector. Destroying an entity
//! frees its slot and bumps the slot generation, so stale handles held by
//! bodies and sensors stop resolving.

use super::{Entity, EntityHost};
use crate::math::Pose;
use tracing::debug;

struct Slot {
    generation: u32,
    pose: Option<Pose>,
}

/// Minimal entity store implementing [`EntityHost`]
///
/// # Examples
///
/// ```
/// use glam::DVec2;
/// use physics2d::{Pose, Scene};
///
/// let mut scene = Scene::new();
/// let tank = scene.spawn(Pose::at(DVec2::new(5.0, 0.0)));
/// assert!(scene.is_alive(tank));
///
/// scene.destroy(tank);
/// assert!(!scene.is_alive(tank));
/// ```
pub struct Scene {
    slots: Vec<Slot>,
    free: Vec<u32>,
    alive: usize,
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Self {
        Scene {
            slots: Vec::new(),
            free: Vec::new(),
            alive: 0,
        }
    }

    /// Spawn an entity at the given pose
    pub fn spawn(&mut self, pose: Pose) -> Entity {
        self.alive += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.pose = Some(pose);
            return Entity::new(index, slot.generation);
        }

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            pose: Some(pose),
        });
        Entity::new(index, 0)
    }

    /// Destroy an entity
    ///
    /// Bumps the slot generation to invalidate old handles. Returns `false`
    /// if the entity was already dead.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        let Some(slot) = self.live_slot_mut(entity) else {
            return false;
        };
        slot.pose = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(entity.index());
        self.alive -= 1;
        debug!("destroyed {}", entity);
        true
    }

    /// Check if an entity is alive
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.live_slot(entity).is_some()
    }

    /// Current pose of an entity
    pub fn pose(&self, entity: Entity) -> Option<Pose> {
        self.live_slot(entity).and_then(|slot| slot.pose)
    }

    /// Move an entity; returns `false` if it is dead
    pub fn set_pose(&mut self, entity: Entity, pose: Pose) -> bool {
        match self.live_slot_mut(entity) {
            Some(slot) => {
                slot.pose = Some(pose);
                true
            }
            None => false,
        }
    }

    /// Number of alive entities
    pub fn entity_count(&self) -> usize {
        self.alive
    }

    /// Iterate over alive entities in slot order
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.pose.is_some())
            .map(|(index, slot)| Entity::new(index as u32, slot.generation))
    }

    fn live_slot(&self, entity: Entity) -> Option<&Slot> {
        self.slots
            .get(entity.index() as usize)
            .filter(|slot| slot.generation == entity.generation() && slot.pose.is_some())
    }

    fn live_slot_mut(&mut self, entity: Entity) -> Option<&mut Slot> {
        self.slots
            .get_mut(entity.index() as usize)
            .filter(|slot| slot.generation == entity.generation() && slot.pose.is_some())
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityHost for Scene {
    fn is_alive(&self, entity: Entity) -> bool {
        Scene::is_alive(self, entity)
    }

    fn pose(&self, entity: Entity) -> Option<Pose> {
        Scene::pose(self, entity)
    }

    fn set_pose(&mut self, entity: Entity, pose: Pose) {
        Scene::set_pose(self, entity, pose);
    }

    fn kill(&mut self, entity: Entity) -> bool {
        self.destroy(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;

    #[test]
    fn test_scene_entity_lifecycle() {
        let mut scene = Scene::new();

        let e1 = scene.spawn(Pose::default());
        let e2 = scene.spawn(Pose::at(DVec2::new(1.0, 1.0)));

        assert_eq!(scene.entity_count(), 2);
        assert!(scene.is_alive(e1));
        assert!(scene.is_alive(e2));

        assert!(scene.destroy(e1));
        assert_eq!(scene.entity_count(), 1);
        assert!(!scene.is_alive(e1));
        assert!(scene.is_alive(e2));
        assert!(!scene.destroy(e1));
    }

    #[test]
    fn test_slot_reuse_bumps_generation() {
        let mut scene = Scene::new();

        let old = scene.spawn(Pose::default());
        scene.destroy(old);
        let new = scene.spawn(Pose::at(DVec2::new(2.0, 0.0)));

        assert_eq!(new.index(), old.index());
        assert_ne!(new.generation(), old.generation());
        assert!(!scene.is_alive(old));
        assert_eq!(scene.pose(old), None);
        assert!(!scene.set_pose(old, Pose::default()));
        assert_eq!(scene.pose(new), Some(Pose::at(DVec2::new(2.0, 0.0))));
    }

    #[test]
    fn test_entities_iter_skips_dead() {
        let mut scene = Scene::new();
        let a = scene.spawn(Pose::default());
        let b = scene.spawn(Pose::default());
        let c = scene.spawn(Pose::default());
        scene.destroy(b);

        let alive: Vec<Entity> = scene.entities().collect();
        assert_eq!(alive, vec![a, c]);
    }
}
