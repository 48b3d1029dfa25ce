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

//! ECS Systems
//!
//! Systems hold the decision logic; components hold the state. A hostile actor's think runs
//! through them in a fixed order:
//!
//! ```text
//! VisibilityQuery -> CandidateFilter -> ThreatSystem (decay, seed)
//!                 -> PassiveBiasEngine -> TargetSelector (+ DeceptionCheck) -> AlertPropagator
//! ```
//!
//! [`HostileAiSystem`] drives that pipeline once per due actor.

mod alert;
mod candidate_filter;
mod damage_history;
mod deception;
mod hostile_ai;
mod passive_bias;
mod sampler;
mod selection;
mod sensing;
mod threat;

pub use alert::*;
pub use candidate_filter::*;
pub use damage_history::*;
pub use deception::*;
pub use hostile_ai::*;
pub use passive_bias::*;
pub use sampler::*;
pub use selection::*;
pub use sensing::*;
pub use threat::*;
