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

//! Errors returned for API misuse. World inconsistencies met mid-pass are never errors.

use crate::ecs::EcsEntity;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggroError {
    /// The entity is not in the world.
    #[error("No such entity: {0:?}")]
    NoSuchEntity(EcsEntity),

    /// The entity has no `HostileController`.
    #[error("Entity is not a hostile actor: {0:?}")]
    NotAnActor(EcsEntity),
}
