//
// Copyright 2025-2026 Hans W. Uhlig. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

//! Entity Component System (ECS) module
//!
//! Hostile actors and their candidates live in a hecs world. Engine state is kept in plain
//! components; systems read snapshots of those components, decide, and write results back.

pub use hecs::{Entity, World};

/// Type alias for hecs runtime entity handles (non-persistent, memory-only)
pub type EcsEntity = Entity;

/// Type alias for the game world
pub type GameWorld = World;

pub mod components;
pub mod context;
pub mod error;
pub mod events;
pub mod systems;

pub use context::AggroContext;
pub use error::AggroError;

#[cfg(test)]
pub mod test_utils;
