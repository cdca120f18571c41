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
//! Broad phase
//!
//! Bodies are kept ordered by the left edge of their bounding box. Sorting
//! runs every tick on an almost-sorted list, so insertion sort stays close
//! to linear. The sweep then walks the list and stops scanning to the right
//! as soon as a box starts past the current one's right edge.

use super::arena::{Arena, BodyHandle};
use super::narrow;
use crate::body::Contact;
use crate::entity::EntityHost;

/// Counters collected by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct SweepStats {
    /// Pairs that reached the narrow phase
    pub pairs_tested: usize,
    /// Pairs where either direction found a contact
    pub contacts: usize,
}

fn min_x(arena: &Arena, handle: BodyHandle) -> f64 {
    arena
        .body(handle)
        .map_or(f64::INFINITY, |body| body.aabb().min.x)
}

/// Stable insertion sort of `order` ascending by bounding box min x
pub(crate) fn sort_by_min_x(order: &mut [BodyHandle], arena: &Arena) {
    for i in 1..order.len() {
        let handle = order[i];
        let x = min_x(arena, handle);
        let mut j = i;
        while j > 0 && min_x(arena, order[j - 1]) > x {
            order[j] = order[j - 1];
            j -= 1;
        }
        order[j] = handle;
    }
}

/// Find and resolve contacts between every candidate pair in `order`
///
/// `order` must already be sorted by [`sort_by_min_x`]. Listeners run as
/// soon as their pair is resolved and may kill entities through `host`;
/// bodies of dead entities are skipped from then on.
pub(crate) fn sweep(
    order: &[BodyHandle],
    arena: &mut Arena,
    host: &mut dyn EntityHost,
    stiffness: f64,
) -> SweepStats {
    let mut stats = SweepStats::default();

    for (i, &a) in order.iter().enumerate() {
        let Some(first) = arena.body(a) else {
            continue;
        };
        let a_entity = first.entity();
        let a_aabb = first.aabb();
        let a_static = first.is_static();
        let a_layers = first.material().layers;

        for &b in &order[i + 1..] {
            if !host.is_alive(a_entity) {
                break;
            }
            let Some(second) = arena.body(b) else {
                continue;
            };
            let b_aabb = second.aabb();
            if a_aabb.max.x < b_aabb.min.x {
                break;
            }
            if !a_aabb.overlaps_y(&b_aabb)
                || (a_static && second.is_static())
                || !a_layers.intersects(second.material().layers)
                || !host.is_alive(second.entity())
            {
                continue;
            }

            let b_entity = second.entity();
            let Some((first, second)) = arena.bodies_mut(a, b) else {
                continue;
            };
            stats.pairs_tested += 1;

            let forward = narrow::intersect(first, second, stiffness);
            let backward = narrow::intersect(second, first, stiffness);
            if !(forward || backward) {
                continue;
            }
            stats.contacts += 1;

            let contact = Contact {
                this: a,
                other: b,
                this_entity: a_entity,
                other_entity: b_entity,
            };
            first.call_collision_listeners(&contact, host);
            second.call_collision_listeners(&contact.flipped(), host);
        }
    }

    stats
}
