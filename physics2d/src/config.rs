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
//! World configuration
//!
//! Tuning constants for the collision response and integration step.
//! The defaults reproduce the engine's reference behavior; changing them
//! changes how collisions feel, so keep them identical on every peer of a
//! replicated simulation.

use crate::error::{PhysicsError, Result};

/// Configuration for a [`Physics`](crate::Physics) world
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsConfig {
    /// Stiffness `k` of the penetration response: `power = k * min(m_a, m_b) * sqrt(depth)`
    pub collision_stiffness: f64,
    /// Divisor applied to the moment of inertia before angular integration
    pub inertia_divisor: f64,
    /// Whether to log a warning when integration leaves a body with non-finite state
    pub warn_on_invalid_state: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        PhysicsConfig {
            collision_stiffness: 10_000.0,
            inertia_divisor: 10.0,
            warn_on_invalid_state: true,
        }
    }
}

impl PhysicsConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the collision stiffness
    pub fn with_collision_stiffness(mut self, stiffness: f64) -> Self {
        self.collision_stiffness = stiffness;
        self
    }

    /// Set the inertia divisor
    pub fn with_inertia_divisor(mut self, divisor: f64) -> Self {
        self.inertia_divisor = divisor;
        self
    }

    /// Disable warnings for non-finite body state
    pub fn without_warnings(mut self) -> Self {
        self.warn_on_invalid_state = false;
        self
    }

    /// Check that every value is usable by the solver
    pub fn validate(&self) -> Result<()> {
        if !(self.collision_stiffness >= 0.0 && self.collision_stiffness.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "collision stiffness must be non-negative and finite, got {}",
                self.collision_stiffness
            )));
        }
        if !(self.inertia_divisor > 0.0 && self.inertia_divisor.is_finite()) {
            return Err(PhysicsError::InvalidConfig(format!(
                "inertia divisor must be positive and finite, got {}",
                self.inertia_divisor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PhysicsConfig::default();
        assert_eq!(config.collision_stiffness, 10_000.0);
        assert_eq!(config.inertia_divisor, 10.0);
        assert!(config.warn_on_invalid_state);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = PhysicsConfig::new()
            .with_collision_stiffness(500.0)
            .with_inertia_divisor(2.0)
            .without_warnings();
        assert_eq!(config.collision_stiffness, 500.0);
        assert_eq!(config.inertia_divisor, 2.0);
        assert!(!config.warn_on_invalid_state);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(PhysicsConfig::new().with_inertia_divisor(0.0).validate().is_err());
        assert!(PhysicsConfig::new().with_inertia_divisor(f64::NAN).validate().is_err());
        assert!(PhysicsConfig::new().with_collision_stiffness(-1.0).validate().is_err());
        assert!(PhysicsConfig::new()
            .with_collision_stiffness(f64::INFINITY)
            .validate()
            .is_err());
    }
}
