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
//! Error types
//!
//! The simulation step itself never fails: degenerate numeric input is
//! defused to a no-op. Errors only surface when a world is configured
//! with invalid data or a stale handle is passed back into it.

use crate::entity::Entity;
use thiserror::Error;

/// Errors reported while configuring or addressing a physics world
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PhysicsError {
    /// A material value is outside its allowed range
    #[error("invalid material: {0}")]
    InvalidMaterial(String),

    /// A shape cannot be simulated (degenerate, concave or non-finite)
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// A configuration value is outside its allowed range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The owning entity does not exist in the host
    #[error("{0} is not alive")]
    DeadEntity(Entity),

    /// A body handle no longer refers to a live body
    #[error("stale body handle")]
    StaleBody,

    /// A sensor handle no longer refers to a live sensor
    #[error("stale sensor handle")]
    StaleSensor,
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, PhysicsError>;
