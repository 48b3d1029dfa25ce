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

//! Event bus implementation
//!
//! The bus is the engine's notification sink. Systems publish into a queue while they run; the
//! host drains it between ticks, either into subscribed handlers or directly.

use super::types::AggroEvent;
use std::sync::{Arc, RwLock};

pub type EventHandler = Box<dyn Fn(&AggroEvent) + Send + Sync>;

/// Queued publish/subscribe bus for [`AggroEvent`]s
pub struct EventBus {
    handlers: Arc<RwLock<Vec<EventHandler>>>,
    event_queue: Arc<RwLock<Vec<AggroEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(RwLock::new(Vec::new())),
            event_queue: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Subscribe to events with a handler function
    pub fn subscribe<F>(&self, handler: F)
    where
        F: Fn(&AggroEvent) + Send + Sync + 'static,
    {
        let mut handlers = self.handlers.write().unwrap_or_else(|e| e.into_inner());
        handlers.push(Box::new(handler));
    }

    pub fn publish(&self, event: AggroEvent) {
        tracing::trace!("Publishing {:?}", event);
        let mut queue = self.event_queue.write().unwrap_or_else(|e| e.into_inner());
        queue.push(event);
    }

    /// Deliver all queued events to subscribers. Returns how many were delivered.
    pub fn process_events(&self) -> usize {
        let events = self.drain();
        let handlers = self.handlers.read().unwrap_or_else(|e| e.into_inner());
        for event in &events {
            for handler in handlers.iter() {
                handler(event);
            }
        }
        events.len()
    }

    /// Take all queued events without delivering them
    pub fn drain(&self) -> Vec<AggroEvent> {
        let mut queue = self.event_queue.write().unwrap_or_else(|e| e.into_inner());
        queue.drain(..).collect()
    }

    /// Clear all queued events without processing
    pub fn clear(&self) {
        let mut queue = self.event_queue.write().unwrap_or_else(|e| e.into_inner());
        queue.clear();
    }

    pub fn queue_len(&self) -> usize {
        let queue = self.event_queue.read().unwrap_or_else(|e| e.into_inner());
        queue.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        Self {
            handlers: Arc::clone(&self.handlers),
            event_queue: Arc::clone(&self.event_queue),
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("queued", &self.queue_len())
            .finish()
    }
}
