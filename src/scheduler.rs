//! Demand-driven priority allocation over (road, lane) keys.

use arrayvec::ArrayVec;
use itertools::iproduct;

use crate::road::Road;

/// Upper bound on (road, lane) keys: four roads with up to four lanes each.
pub const MAX_LANE_KEYS: usize = 16;

/// A (road, lane) key with its externally assigned priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanePriority {
    pub road: Road,
    pub lane: usize,
    pub priority: i32,
}

/// A bounded priority container over (road, lane) keys.
///
/// Capacity is the total lane count across all roads. Inserting into a full
/// scheduler, or inserting a key that is already present, is a silent no-op:
/// backpressure, not an error.
///
/// [`pop_max`](Self::pop_max) is deterministic — highest priority wins, and
/// ties are broken by lowest road letter, then lowest lane index. With at most
/// [`MAX_LANE_KEYS`] entries a linear scan beats any heap bookkeeping.
#[derive(Debug, Default)]
pub struct LanePriorityScheduler {
    entries: ArrayVec<LanePriority, MAX_LANE_KEYS>,
}

impl LanePriorityScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates a scheduler pre-populated with every road×lane key at
    /// priority zero. The key set then stays static for the simulation's
    /// lifetime; only scores change.
    pub fn with_keys(lanes_per_road: usize) -> Self {
        let mut scheduler = Self::new();
        for (road, lane) in iproduct!(Road::ALL, 0..lanes_per_road) {
            scheduler.insert(LanePriority {
                road,
                lane,
                priority: 0,
            });
        }
        scheduler
    }

    /// Inserts a record. No-op when at capacity or when the (road, lane)
    /// key is already present.
    pub fn insert(&mut self, item: LanePriority) {
        if self.find(item.road, item.lane).is_some() {
            return;
        }
        // try_push drops the item when full
        let _ = self.entries.try_push(item);
    }

    /// Removes and returns the record with the highest priority score, or
    /// `None` when empty. Ties resolve to the lowest road, then lowest lane.
    pub fn pop_max(&mut self) -> Option<LanePriority> {
        let best = self
            .entries
            .iter()
            .enumerate()
            .max_by_key(|(_, e)| (e.priority, std::cmp::Reverse((e.road, e.lane))))?
            .0;
        Some(self.entries.swap_remove(best))
    }

    /// Overwrites the score of the unique matching key in place.
    /// No-op if the key is absent.
    pub fn update_priority(&mut self, road: Road, lane: usize, priority: i32) {
        if let Some(idx) = self.find(road, lane) {
            self.entries[idx].priority = priority;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn find(&self, road: Road, lane: usize) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.road == road && e.lane == lane)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pop_drains_every_key_exactly_once() {
        let mut pq = LanePriorityScheduler::with_keys(3);
        assert_eq!(pq.len(), 12);

        let mut seen = std::collections::HashSet::new();
        for _ in 0..12 {
            let top = pq.pop_max().unwrap();
            assert!(seen.insert((top.road, top.lane)));
        }
        assert!(pq.is_empty());
        assert_eq!(pq.pop_max(), None);
    }

    #[test]
    fn pop_is_ordered_by_priority_then_road_then_lane() {
        let mut pq = LanePriorityScheduler::with_keys(2);
        pq.update_priority(Road::C, 1, 7);
        pq.update_priority(Road::B, 0, 7);
        pq.update_priority(Road::B, 1, 7);
        pq.update_priority(Road::D, 0, 9);

        let order: Vec<_> = std::iter::from_fn(|| pq.pop_max())
            .take(4)
            .map(|e| (e.road, e.lane))
            .collect();
        assert_eq!(
            order,
            vec![(Road::D, 0), (Road::B, 0), (Road::B, 1), (Road::C, 1)]
        );
    }

    #[test]
    fn insert_at_capacity_is_a_silent_noop() {
        let mut pq = LanePriorityScheduler::with_keys(4);
        assert_eq!(pq.len(), MAX_LANE_KEYS);
        pq.insert(LanePriority {
            road: Road::A,
            lane: 9,
            priority: 100,
        });
        assert_eq!(pq.len(), MAX_LANE_KEYS);
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let mut pq = LanePriorityScheduler::new();
        pq.insert(LanePriority {
            road: Road::A,
            lane: 0,
            priority: 1,
        });
        pq.insert(LanePriority {
            road: Road::A,
            lane: 0,
            priority: 5,
        });
        assert_eq!(pq.len(), 1);
        assert_eq!(pq.pop_max().unwrap().priority, 1);
    }

    #[test]
    fn updating_an_absent_key_is_a_noop() {
        let mut pq = LanePriorityScheduler::with_keys(1);
        pq.update_priority(Road::A, 5, 42);
        let top = pq.pop_max().unwrap();
        assert_eq!(top.priority, 0);
    }
}
