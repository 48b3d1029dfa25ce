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

use crate::config::ThreatTuning;
use crate::ecs::events::{AggroEvent, EventBus};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Shared context handed to every aggro system
///
/// The context owns everything a decision needs that is not stored on an entity:
/// - **Tuning**: the engine constants loaded from configuration
/// - **Random source**: one uniform generator for every draw. Seed it to make runs repeatable.
/// - **Event bus**: the notification sink
/// - **Clock**: the wall-clock instant cooldowns compare against; the host advances it
///
/// # Examples
///
/// ```ignore
/// let mut context = AggroContext::seeded(ThreatTuning::default(), 42);
/// let mut system =
///     HostileAiSystem::new(ProximityQuery::default()).with_stealth_evaluator(OpposedSkillEvaluator);
///
/// loop {
///     system.update(&mut world, &mut context, 1.0);
///     for event in context.events().drain() {
///         // Deliver to players...
///     }
///     context.advance(chrono::Duration::seconds(1));
/// }
/// ```
pub struct AggroContext {
    tuning: ThreatTuning,
    rng: Box<dyn RngCore + Send>,
    event_bus: EventBus,
    now: DateTime<Utc>,
}

impl AggroContext {
    /// Create a context drawing from the given generator
    pub fn new(tuning: ThreatTuning, rng: impl RngCore + Send + 'static) -> Self {
        Self {
            tuning,
            rng: Box::new(rng),
            event_bus: EventBus::new(),
            now: Utc::now(),
        }
    }

    /// Create a context with a seeded standard generator
    pub fn seeded(tuning: ThreatTuning, seed: u64) -> Self {
        Self::new(tuning, StdRng::seed_from_u64(seed))
    }

    /// Publish into an existing bus instead of a private one
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = event_bus;
        self
    }

    pub fn tuning(&self) -> &ThreatTuning {
        &self.tuning
    }

    pub fn threat_minimum(&self) -> i64 {
        self.tuning.threat_minimum
    }

    /// Borrow tuning and the generator together
    pub fn tuning_and_rng(&mut self) -> (&ThreatTuning, &mut (dyn RngCore + Send)) {
        (&self.tuning, self.rng.as_mut())
    }

    pub fn events(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn publish(&self, event: AggroEvent) {
        self.event_bus.publish(event);
    }

    // ============================================================================
    // Clock
    // ============================================================================

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn set_now(&mut self, now: DateTime<Utc>) {
        self.now = now;
    }

    pub fn advance(&mut self, by: chrono::Duration) {
        self.now += by;
    }

    /// Uniform value in `[0, 1)`
    pub fn roll_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

impl std::fmt::Debug for AggroContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggroContext")
            .field("tuning", &self.tuning)
            .field("event_bus", &self.event_bus)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}
