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
//! Essence storage
//!
//! Every physics object bound to an entity (an *essence*) lives in one
//! generational slot arena. Slot order is the tick dispatch order, which
//! keeps the simulation deterministic. Freed slots are reused with a bumped
//! generation so stale handles never alias a newer object.

use crate::body::Body;
use crate::entity::Entity;
use crate::math::Pose;
use crate::sensor::RaySensor;

/// Generational index into the essence arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct Key {
    index: u32,
    generation: u32,
}

/// Handle to a body owned by a [`Physics`](super::Physics) world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub(crate) Key);

/// Handle to a ray sensor owned by a [`Physics`](super::Physics) world
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RaySensorHandle(pub(crate) Key);

impl BodyHandle {
    /// Handle that never resolves, for tests that need a placeholder
    #[cfg(test)]
    pub(crate) fn dangling() -> Self {
        BodyHandle(Key {
            index: u32::MAX,
            generation: 0,
        })
    }
}

/// A physics object whose lifetime is bound to an entity
#[derive(Debug)]
pub(crate) enum Essence {
    Body(Body),
    RaySensor(RaySensor),
}

impl Essence {
    pub(crate) fn entity(&self) -> Entity {
        match self {
            Essence::Body(body) => body.entity(),
            Essence::RaySensor(sensor) => sensor.entity(),
        }
    }

    /// Per-tick cache rebuild
    pub(crate) fn clear(&mut self, pose: Pose) {
        match self {
            Essence::Body(body) => body.clear(pose),
            Essence::RaySensor(sensor) => sensor.clear(pose),
        }
    }
}

struct Slot {
    generation: u32,
    essence: Option<Essence>,
}

/// Generational slot arena of essences
#[derive(Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl Arena {
    pub(crate) fn insert(&mut self, essence: Essence) -> Key {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.essence = Some(essence);
            return Key {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            essence: Some(essence),
        });
        Key {
            index,
            generation: 0,
        }
    }

    pub(crate) fn remove(&mut self, key: Key) -> Option<Essence> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let essence = slot.essence.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.len -= 1;
        Some(essence)
    }

    pub(crate) fn get(&self, key: Key) -> Option<&Essence> {
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.essence.as_ref())
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut Essence> {
        self.slots
            .get_mut(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.essence.as_mut())
    }

    /// Mutable access to two distinct essences at once
    pub(crate) fn pair_mut(&mut self, a: Key, b: Key) -> Option<(&mut Essence, &mut Essence)> {
        if a.index == b.index {
            return None;
        }
        let (ia, ib) = (a.index as usize, b.index as usize);
        if ia.max(ib) >= self.slots.len() {
            return None;
        }
        let (first, second) = if ia < ib {
            let (head, tail) = self.slots.split_at_mut(ib);
            (&mut head[ia], &mut tail[0])
        } else {
            let (head, tail) = self.slots.split_at_mut(ia);
            (&mut tail[0], &mut head[ib])
        };
        if first.generation != a.generation || second.generation != b.generation {
            return None;
        }
        Some((first.essence.as_mut()?, second.essence.as_mut()?))
    }

    pub(crate) fn body(&self, handle: BodyHandle) -> Option<&Body> {
        match self.get(handle.0)? {
            Essence::Body(body) => Some(body),
            Essence::RaySensor(_) => None,
        }
    }

    pub(crate) fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        match self.get_mut(handle.0)? {
            Essence::Body(body) => Some(body),
            Essence::RaySensor(_) => None,
        }
    }

    pub(crate) fn sensor(&self, handle: RaySensorHandle) -> Option<&RaySensor> {
        match self.get(handle.0)? {
            Essence::RaySensor(sensor) => Some(sensor),
            Essence::Body(_) => None,
        }
    }

    pub(crate) fn sensor_mut(&mut self, handle: RaySensorHandle) -> Option<&mut RaySensor> {
        match self.get_mut(handle.0)? {
            Essence::RaySensor(sensor) => Some(sensor),
            Essence::Body(_) => None,
        }
    }

    pub(crate) fn bodies_mut(
        &mut self,
        a: BodyHandle,
        b: BodyHandle,
    ) -> Option<(&mut Body, &mut Body)> {
        match self.pair_mut(a.0, b.0)? {
            (Essence::Body(a), Essence::Body(b)) => Some((a, b)),
            _ => None,
        }
    }

    pub(crate) fn sensor_and_body_mut(
        &mut self,
        sensor: RaySensorHandle,
        body: BodyHandle,
    ) -> Option<(&mut RaySensor, &mut Body)> {
        match self.pair_mut(sensor.0, body.0)? {
            (Essence::RaySensor(sensor), Essence::Body(body)) => Some((sensor, body)),
            _ => None,
        }
    }

    /// Live essences in slot order
    pub(crate) fn iter(&self) -> impl Iterator<Item = (Key, &Essence)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.essence.as_ref().map(|essence| {
                (
                    Key {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    essence,
                )
            })
        })
    }

    /// Live essences in slot order, mutably
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (Key, &mut Essence)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.essence.as_mut().map(|essence| {
                (
                    Key {
                        index: index as u32,
                        generation,
                    },
                    essence,
                )
            })
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(index: u32) -> Essence {
        Essence::RaySensor(RaySensor::new("ray", Entity::new(index, 0), Pose::default()))
    }

    #[test]
    fn test_insert_and_get() {
        let mut arena = Arena::default();
        let a = arena.insert(sensor(0));
        let b = arena.insert(sensor(1));
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).unwrap().entity(), Entity::new(0, 0));
        assert_eq!(arena.get(b).unwrap().entity(), Entity::new(1, 0));
    }

    #[test]
    fn test_stale_key_after_reuse() {
        let mut arena = Arena::default();
        let old = arena.insert(sensor(0));
        assert!(arena.remove(old).is_some());
        assert!(arena.remove(old).is_none());

        let new = arena.insert(sensor(5));
        assert_eq!(new.index, old.index);
        assert!(arena.get(old).is_none());
        assert!(arena.get_mut(old).is_none());
        assert_eq!(arena.get(new).unwrap().entity(), Entity::new(5, 0));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_pair_mut() {
        let mut arena = Arena::default();
        let a = arena.insert(sensor(0));
        let b = arena.insert(sensor(1));

        let (first, second) = arena.pair_mut(b, a).unwrap();
        assert_eq!(first.entity(), Entity::new(1, 0));
        assert_eq!(second.entity(), Entity::new(0, 0));

        assert!(arena.pair_mut(a, a).is_none());
        arena.remove(b);
        assert!(arena.pair_mut(a, b).is_none());
    }

    #[test]
    fn test_iteration_in_slot_order() {
        let mut arena = Arena::default();
        let keys: Vec<Key> = (0..4).map(|i| arena.insert(sensor(i))).collect();
        arena.remove(keys[1]);

        let entities: Vec<u32> = arena.iter().map(|(_, e)| e.entity().index()).collect();
        assert_eq!(entities, vec![0, 2, 3]);
        let live: Vec<Key> = arena.iter().map(|(key, _)| key).collect();
        assert_eq!(live, vec![keys[0], keys[2], keys[3]]);
        assert_eq!(arena.iter_mut().count(), 3);
    }
}
