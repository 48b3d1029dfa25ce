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

//! Event type definitions

use crate::ecs::EcsEntity;
use crate::ecs::components::AwarenessState;
use serde::{Deserialize, Serialize};

/// Notifications raised by the aggro engine
///
/// Delivery of user-facing messages and wake-up / new-enemy animations is left to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AggroEvent {
    /// An actor settled on a target this pass
    TargetAcquired {
        actor: EcsEntity,
        target: EcsEntity,
    },
    /// The chosen target differs from the previous one
    NewEnemy {
        actor: EcsEntity,
        previous: Option<EcsEntity>,
        enemy: EcsEntity,
    },
    /// An actor dropped its target because nothing eligible remained
    TargetLost {
        actor: EcsEntity,
        target: EcsEntity,
    },
    StateChanged {
        actor: EcsEntity,
        from: AwarenessState,
        to: AwarenessState,
    },
    /// A nearby ally was woken and pointed at the enemy
    AllyAlerted {
        alerter: EcsEntity,
        ally: EcsEntity,
        enemy: EcsEntity,
    },
    /// A hiding target tried to slip the actor's attention
    DeceptionAttempted {
        actor: EcsEntity,
        target: EcsEntity,
        chance: f64,
        succeeded: bool,
    },
    ThreatIncreased {
        actor: EcsEntity,
        candidate: EcsEntity,
        amount: i64,
        total: i64,
    },
    /// One-shot skip consumed a threat increase
    ThreatSkipped {
        actor: EcsEntity,
        candidate: EcsEntity,
    },
    ThreatDecayed {
        actor: EcsEntity,
        amount: i64,
        entries: usize,
    },
    /// Ledger and passive state wiped
    LedgerReset {
        actor: EcsEntity,
    },
    /// A tactic bit that maps to nothing was drawn
    TacticRejected {
        actor: EcsEntity,
        bits: u16,
    },
}

impl AggroEvent {
    /// The actor the event concerns
    pub fn actor(&self) -> EcsEntity {
        match self {
            AggroEvent::TargetAcquired { actor, .. }
            | AggroEvent::NewEnemy { actor, .. }
            | AggroEvent::TargetLost { actor, .. }
            | AggroEvent::StateChanged { actor, .. }
            | AggroEvent::DeceptionAttempted { actor, .. }
            | AggroEvent::ThreatIncreased { actor, .. }
            | AggroEvent::ThreatSkipped { actor, .. }
            | AggroEvent::ThreatDecayed { actor, .. }
            | AggroEvent::LedgerReset { actor }
            | AggroEvent::TacticRejected { actor, .. } => *actor,
            AggroEvent::AllyAlerted { alerter, .. } => *alerter,
        }
    }
}
