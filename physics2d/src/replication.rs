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
//! Replication surface
//!
//! Positions and rotations are replicated by the entity layer. The only
//! physics state a remote copy needs to stay in sync is the velocity pair
//! of each non-static body; static bodies emit nothing.

use glam::DVec2;

/// Minimal state needed to resynchronize a remote copy of a body
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyDelta {
    /// Linear velocity
    pub line_velocity: DVec2,
    /// Angular velocity
    pub angle_velocity: f64,
}

impl BodyDelta {
    /// Check that both velocities are finite
    pub fn is_valid(&self) -> bool {
        self.line_velocity.is_finite() && self.angle_velocity.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_validation() {
        let delta = BodyDelta {
            line_velocity: DVec2::new(1.0, 0.0),
            angle_velocity: 0.5,
        };
        assert!(delta.is_valid());

        let broken = BodyDelta {
            line_velocity: DVec2::new(f64::NAN, 0.0),
            angle_velocity: 0.5,
        };
        assert!(!broken.is_valid());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_delta_serde() {
        let delta = BodyDelta {
            line_velocity: DVec2::new(-3.0, 4.5),
            angle_velocity: 1.25,
        };
        let json = serde_json::to_string(&delta).unwrap();
        let back: BodyDelta = serde_json::from_str(&json).unwrap();
        assert_eq!(back, delta);
    }
}
