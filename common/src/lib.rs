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

//! Aggro Common Types
//!
//! This crate defines the read-only configuration vocabulary shared between content
//! tooling and the aggro engine:
//! - Legacy tactic bitsets ([`Tactic`], [`TacticSet`])
//! - Targeting tolerance flags ([`Tolerance`], [`Tolerances`])
//! - Faction and kinship ([`FactionId`], [`Kinship`])
//! - Typed per-actor awareness profile ([`ActorProfile`])

pub mod allegiance;
pub mod profile;
pub mod tactic;
pub mod tolerance;

pub use allegiance::{FactionId, Kinship};
pub use profile::ActorProfile;
pub use tactic::{Tactic, TacticDraw, TacticSet};
pub use tolerance::{Tolerance, Tolerances};
