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
//! Generational entity handles
//!
//! A handle pairs a slot index with the generation the slot had when the
//! entity was spawned. Reusing a slot bumps its generation, so handles to
//! the previous occupant compare unequal and resolve to nothing.

use std::fmt;

/// Weak, copyable reference to an entity owned by an [`EntityHost`](super::EntityHost)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entity {
    index: u32,
    generation: u32,
}

impl Entity {
    /// Create a handle from a slot index and generation
    ///
    /// Hosts with their own id scheme can encode it here.
    pub fn new(index: u32, generation: u32) -> Self {
        Entity { index, generation }
    }

    /// Slot index of the entity
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when the entity was spawned
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}, gen: {})", self.index, self.generation)
    }
}
