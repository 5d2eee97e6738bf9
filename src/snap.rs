// Snap intervals: scroll ranges collapsed to a single point in virtual
// scroll space. The remap walks the sorted list once per sample and swallows
// each traversed interval's length exactly once.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::SnapConfig;

/// One normalized snap interval on the real scroll axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SnapInterval {
    pub start: f64,
    pub end: f64,
}

impl SnapInterval {
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    /// Inclusive start, exclusive end: a position at `end` has fully
    /// traversed the interval.
    pub fn contains(&self, p: f64) -> bool {
        p >= self.start && p < self.end
    }
}

/// Sorted, non-overlapping snap intervals with the virtual-position remap.
/// Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct SnapMap {
    intervals: Vec<SnapInterval>,
    total_len: f64,
}

impl SnapMap {
    /// Normalize and validate the configured intervals: `end` defaults to
    /// `start + duration`, the list is sorted ascending by start, inverted
    /// and overlapping intervals are rejected outright.
    pub fn new(configs: Vec<SnapConfig>) -> Result<SnapMap, EngineError> {
        let mut intervals = Vec::with_capacity(configs.len());
        for config in configs {
            let end = match (config.end, config.duration) {
                (Some(end), _) => end,
                (None, Some(duration)) => config.start + duration,
                (None, None) => {
                    return Err(EngineError::InvalidConfig(
                        "snap interval needs an end or a duration".to_string(),
                    ))
                }
            };
            if end < config.start {
                return Err(EngineError::SnapInverted {
                    start: config.start,
                    end,
                });
            }
            intervals.push(SnapInterval {
                start: config.start,
                end,
            });
        }

        intervals.sort_by(|a, b| a.start.total_cmp(&b.start));
        for pair in intervals.windows(2) {
            if pair[1].start < pair[0].end {
                return Err(EngineError::SnapOverlap {
                    start: pair[1].start,
                    end: pair[1].end,
                    previous_end: pair[0].end,
                });
            }
        }

        let total_len = intervals.iter().map(SnapInterval::len).sum();
        Ok(SnapMap {
            intervals,
            total_len,
        })
    }

    /// Total length of all intervals: the extra scroll distance the host
    /// reserves so the real scrollbar can traverse every snap.
    pub fn total_len(&self) -> f64 {
        self.total_len
    }

    pub fn intervals(&self) -> &[SnapInterval] {
        &self.intervals
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Remap a real position to its virtual position. Strictly inside an
    /// interval the virtual position sticks at the interval's start; at or
    /// past the end the full interval length is subtracted. Monotonically
    /// non-decreasing in `p`.
    pub fn remap(&self, p: f64) -> f64 {
        let mut extra = 0.0;
        for interval in &self.intervals {
            if interval.start > p {
                break;
            }
            if interval.contains(p) {
                return interval.start - extra;
            }
            extra += interval.len();
        }
        p - extra
    }

    /// Sum of the lengths of intervals lying wholly before `p`. Used to
    /// shift a real scroll offset forward when a pinned wrapper attaches
    /// mid-scroll.
    pub fn traversed_len(&self, p: f64) -> f64 {
        self.intervals
            .iter()
            .take_while(|interval| interval.end <= p)
            .map(|interval| interval.len())
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(start: f64, end: f64) -> SnapConfig {
        SnapConfig {
            start,
            end: Some(end),
            duration: None,
        }
    }

    #[test]
    fn end_computed_from_duration() {
        let map = SnapMap::new(vec![SnapConfig {
            start: 100.0,
            end: None,
            duration: Some(50.0),
        }])
        .unwrap();
        assert_eq!(map.intervals(), &[SnapInterval {
            start: 100.0,
            end: 150.0,
        }]);
        assert_eq!(map.total_len(), 50.0);
    }

    #[test]
    fn intervals_are_sorted_by_start() {
        let map = SnapMap::new(vec![snap(500.0, 600.0), snap(100.0, 200.0)]).unwrap();
        assert_eq!(map.intervals()[0].start, 100.0);
        assert_eq!(map.intervals()[1].start, 500.0);
    }

    #[test]
    fn missing_end_and_duration_is_rejected() {
        let result = SnapMap::new(vec![SnapConfig {
            start: 0.0,
            end: None,
            duration: None,
        }]);
        assert!(matches!(result, Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn inverted_interval_is_rejected() {
        let result = SnapMap::new(vec![snap(200.0, 100.0)]);
        assert!(matches!(result, Err(EngineError::SnapInverted { .. })));
    }

    #[test]
    fn overlapping_intervals_are_rejected() {
        let result = SnapMap::new(vec![snap(0.0, 150.0), snap(100.0, 200.0)]);
        assert!(matches!(result, Err(EngineError::SnapOverlap { .. })));
    }

    #[test]
    fn touching_intervals_are_allowed() {
        let map = SnapMap::new(vec![snap(0.0, 100.0), snap(100.0, 200.0)]).unwrap();
        assert_eq!(map.total_len(), 200.0);
        assert_eq!(map.remap(200.0), 0.0);
    }

    #[test]
    fn position_sticks_inside_an_interval() {
        let map = SnapMap::new(vec![snap(1000.0, 2500.0)]).unwrap();
        assert_eq!(map.remap(500.0), 500.0);
        assert_eq!(map.remap(1000.0), 1000.0);
        assert_eq!(map.remap(1700.0), 1000.0);
        assert_eq!(map.remap(2499.9), 1000.0);
        // At the end the full length has been swallowed; no jump.
        assert_eq!(map.remap(2500.0), 1000.0);
        assert_eq!(map.remap(3000.0), 1500.0);
    }

    #[test]
    fn each_interval_is_swallowed_once() {
        let map = SnapMap::new(vec![snap(100.0, 200.0), snap(400.0, 450.0)]).unwrap();
        assert_eq!(map.remap(300.0), 200.0);
        assert_eq!(map.remap(420.0), 300.0); // 400 - 100 traversed
        assert_eq!(map.remap(500.0), 350.0);
    }

    #[test]
    fn traversed_len_counts_whole_intervals_only() {
        let map = SnapMap::new(vec![snap(100.0, 200.0), snap(400.0, 450.0)]).unwrap();
        assert_eq!(map.traversed_len(50.0), 0.0);
        assert_eq!(map.traversed_len(150.0), 0.0);
        assert_eq!(map.traversed_len(200.0), 100.0);
        assert_eq!(map.traversed_len(500.0), 150.0);
    }

    mod property_tests {
        use super::*;

        /// Strategy: a valid, sorted, non-overlapping snap list inside
        /// [0, max]. Built from interleaved boundary points so overlap is
        /// impossible by construction.
        fn snap_map_strategy(max: f64) -> impl Strategy<Value = SnapMap> {
            prop::collection::vec(0.0..max, 0..8).prop_map(move |mut points| {
                points.sort_by(f64::total_cmp);
                points.dedup();
                let configs = points
                    .chunks_exact(2)
                    .map(|pair| SnapConfig {
                        start: pair[0],
                        end: Some(pair[1]),
                        duration: None,
                    })
                    .collect();
                SnapMap::new(configs).expect("constructed lists never overlap")
            })
        }

        fn sorted_positions(count: usize, max: f64) -> impl Strategy<Value = Vec<f64>> {
            prop::collection::vec(0.0..max, count).prop_map(|mut positions| {
                positions.sort_by(f64::total_cmp);
                positions
            })
        }

        proptest! {
            /// For any strictly increasing sequence of real positions, the
            /// remapped virtual sequence is non-decreasing.
            #[test]
            fn remap_is_monotonic(
                map in snap_map_strategy(10_000.0),
                positions in sorted_positions(20, 10_000.0),
            ) {
                let virtuals: Vec<f64> =
                    positions.iter().map(|&p| map.remap(p)).collect();
                for i in 1..virtuals.len() {
                    prop_assert!(
                        virtuals[i] >= virtuals[i - 1],
                        "remap not monotonic: {} -> {} but {} -> {}",
                        positions[i - 1], virtuals[i - 1],
                        positions[i], virtuals[i],
                    );
                }
            }

            /// Outside every interval, the total virtual increase over a
            /// traversed range equals the real span minus the lengths of the
            /// snaps fully traversed in between.
            #[test]
            fn traversal_swallows_exact_snap_lengths(
                map in snap_map_strategy(10_000.0),
                a in 0.0..10_000.0f64,
                b in 0.0..10_000.0f64,
            ) {
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                // Keep both endpoints outside the intervals.
                prop_assume!(!map.intervals().iter().any(|s| s.contains(lo)));
                prop_assume!(!map.intervals().iter().any(|s| s.contains(hi)));

                let swallowed: f64 = map
                    .intervals()
                    .iter()
                    .filter(|s| s.start >= lo && s.end <= hi)
                    .map(|s| s.len())
                    .sum();
                let increase = map.remap(hi) - map.remap(lo);
                prop_assert!(
                    (increase - ((hi - lo) - swallowed)).abs() < 1e-6,
                    "span [{lo}, {hi}]: increase {increase}, swallowed {swallowed}",
                );
            }

            /// The remap never moves a position forward.
            #[test]
            fn virtual_position_never_exceeds_real(
                map in snap_map_strategy(10_000.0),
                p in 0.0..10_000.0f64,
            ) {
                prop_assert!(map.remap(p) <= p);
            }
        }
    }
}
