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

//! Distance-weighted sampling
//!
//! Each candidate contributes `1 - distance / sum_of_distances` to a running total, so weights sum
//! to `N - 1`. A uniform draw in `[0, N - 1)` then lands on the first candidate whose running
//! total exceeds it. Closer candidates take larger slices without shutting farther ones out.

use crate::ecs::EcsEntity;
use rand::Rng;

/// Smallest distance sum used as a divisor
const DISTANCE_SUM_EPSILON: f64 = 1e-9;

/// Pick one candidate from `(entity, distance)` pairs
///
/// Returns `None` only for an empty list. Negative or non-finite distances count as zero.
pub fn distance_weighted<R>(candidates: &[(EcsEntity, f64)], rng: &mut R) -> Option<EcsEntity>
where
    R: Rng + ?Sized,
{
    let (first, _) = *candidates.first()?;
    if candidates.len() == 1 {
        return Some(first);
    }

    let sanitized = |distance: f64| {
        if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        }
    };
    let distance_sum = candidates
        .iter()
        .map(|(_, distance)| sanitized(*distance))
        .sum::<f64>()
        .max(DISTANCE_SUM_EPSILON);

    let span = (candidates.len() - 1) as f64;
    let roll = rng.random_range(0.0..span);

    let mut running = 0.0;
    for (entity, distance) in candidates {
        running += 1.0 - sanitized(*distance) / distance_sum;
        if running > roll {
            return Some(*entity);
        }
    }

    tracing::warn!(
        "Distance sampler fell through (sum {}, roll {}); using first candidate",
        distance_sum,
        roll
    );
    Some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn entities(n: usize) -> Vec<EcsEntity> {
        let mut world = hecs::World::new();
        (0..n).map(|_| world.spawn(())).collect()
    }

    #[test]
    fn test_empty_and_single() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(distance_weighted(&[], &mut rng), None);

        let e = entities(1);
        assert_eq!(distance_weighted(&[(e[0], 50.0)], &mut rng), Some(e[0]));
    }

    #[test]
    fn test_closer_wins_more_often() {
        let e = entities(2);
        let candidates = [(e[0], 10.0), (e[1], 30.0)];
        let mut rng = StdRng::seed_from_u64(7);

        let near_wins = (0..1000)
            .filter(|_| distance_weighted(&candidates, &mut rng) == Some(e[0]))
            .count();

        // Expected share is 0.75
        assert!(near_wins > 500, "near candidate won {near_wins} of 1000");
        assert!(near_wins < 1000, "far candidate never won");
    }

    #[test]
    fn test_zero_distances_stay_uniformish() {
        let e = entities(3);
        let candidates = [(e[0], 0.0), (e[1], 0.0), (e[2], 0.0)];
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..100 {
            assert!(distance_weighted(&candidates, &mut rng).is_some());
        }
    }

    #[test]
    fn test_same_seed_same_picks() {
        let e = entities(4);
        let candidates = [(e[0], 3.0), (e[1], 9.0), (e[2], 1.0), (e[3], 12.0)];

        let mut a = StdRng::seed_from_u64(1234);
        let mut b = StdRng::seed_from_u64(1234);
        for _ in 0..200 {
            assert_eq!(
                distance_weighted(&candidates, &mut a),
                distance_weighted(&candidates, &mut b)
            );
        }
    }
}
