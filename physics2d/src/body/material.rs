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
//! Physical materials
//!
//! A material is fixed when its body is created. Unset fields keep the
//! defaults `{density: 1, line_friction: 0, angle_friction: 0,
//! static: false, layers: ALL}`.

use crate::error::{PhysicsError, Result};

/// Bitmask of collision layers
///
/// Two bodies only collide, and a ray only sees a body, when their masks
/// share at least one bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layers(pub u32);

impl Layers {
    /// Every layer
    pub const ALL: Layers = Layers(u32::MAX);
    /// No layer at all; such a body never collides
    pub const NONE: Layers = Layers(0);

    /// Mask with only layer `n` set
    ///
    /// # Panics
    ///
    /// Panics if `n >= 32`.
    pub fn bit(n: u32) -> Self {
        assert!(n < 32, "Layer index must be below 32");
        Layers(1 << n)
    }

    /// Whether two masks share a layer
    pub fn intersects(self, other: Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Layers {
    fn default() -> Self {
        Layers::ALL
    }
}

impl std::ops::BitOr for Layers {
    type Output = Layers;

    fn bitor(self, rhs: Layers) -> Layers {
        Layers(self.0 | rhs.0)
    }
}

/// Physical properties of a body
///
/// # Examples
///
/// ```
/// use physics2d::Material;
///
/// let wall = Material::new().with_static(true);
/// assert_eq!(wall.density, 1.0);
/// assert!(wall.is_static);
/// assert!(wall.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    /// Mass per unit area
    pub density: f64,
    /// Fraction of linear velocity removed every tick, in `[0, 1]`
    pub line_friction: f64,
    /// Fraction of angular velocity removed every tick, in `[0, 1]`
    pub angle_friction: f64,
    /// Static bodies never move and ignore every applied force
    pub is_static: bool,
    /// Collision layers the body lives on
    pub layers: Layers,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            density: 1.0,
            line_friction: 0.0,
            angle_friction: 0.0,
            is_static: false,
            layers: Layers::ALL,
        }
    }
}

impl Material {
    /// Material with every field at its default
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the density
    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Set the linear friction
    pub fn with_line_friction(mut self, friction: f64) -> Self {
        self.line_friction = friction;
        self
    }

    /// Set the angular friction
    pub fn with_angle_friction(mut self, friction: f64) -> Self {
        self.angle_friction = friction;
        self
    }

    /// Mark the material static (immovable)
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set the collision layers
    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    /// Check that every value is in range
    pub fn validate(&self) -> Result<()> {
        if !(self.density > 0.0 && self.density.is_finite()) {
            return Err(PhysicsError::InvalidMaterial(format!(
                "density must be positive and finite, got {}",
                self.density
            )));
        }
        for (label, value) in [
            ("line friction", self.line_friction),
            ("angle friction", self.angle_friction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PhysicsError::InvalidMaterial(format!(
                    "{} must be within [0, 1], got {}",
                    label, value
                )));
            }
        }
        Ok(())
    }
}
