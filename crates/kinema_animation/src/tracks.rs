use serde::{Deserialize, Serialize};

use crate::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMode {
    #[default]
    Linear,
    /// Holds the nearest preceding keyframe.
    Step,
}

const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the last keyframe interval a track was sampled in, so that
/// sequential playback finds the next interval in O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        debug_assert_eq!(times.len(), values.len());
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, 0 for an empty track.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples without a cursor (binary search every call).
    #[must_use]
    pub fn sample(&self, time: f32) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        Some(self.sample_at_frame(next_idx.saturating_sub(1), time))
    }

    /// Samples using `cursor` as a starting guess and updates it.
    ///
    /// Before the first keyframe the first value is held; after the last
    /// keyframe the last value is held.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> Option<T> {
        let len = self.times.len();
        if len == 0 {
            return None;
        }
        if len == 1 {
            return Some(self.values[0]);
        }

        let i = cursor.last_index.min(len - 1);
        let t_curr = self.times[i];

        let found_index = if time >= t_curr {
            // Forward: normal playback
            let mut res = None;
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = i + offset;
                if idx >= len - 1 {
                    res = Some(len - 1);
                    break;
                }
                if time < self.times[idx + 1] {
                    res = Some(idx);
                    break;
                }
            }
            res
        } else {
            // Backward: loop wrap or seek
            let mut res = None;
            for offset in 1..=MAX_SCAN_OFFSET {
                if i < offset {
                    break;
                }
                let idx = i - offset;
                if time >= self.times[idx] {
                    res = Some(idx);
                    break;
                }
            }
            res
        };

        // Large jump: fall back to binary search
        let index = found_index.unwrap_or_else(|| {
            let next_idx = self.times.partition_point(|&t| t <= time);
            next_idx.saturating_sub(1)
        });
        cursor.last_index = index;

        Some(self.sample_at_frame(index, time))
    }

    fn sample_at_frame(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.values[len - 1];
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;

        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };

        // Exact keyframe values at the interval ends
        if t <= 0.0 {
            return self.values[index];
        }
        if t >= 1.0 {
            return self.values[next_idx];
        }

        match self.interpolation {
            InterpolationMode::Step => self.values[index],
            InterpolationMode::Linear => {
                T::interpolate_linear(self.values[index], self.values[next_idx], t)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp() -> KeyframeTrack<f32> {
        KeyframeTrack::new(
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
            vec![0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0],
            InterpolationMode::Linear,
        )
    }

    #[test]
    fn cursor_matches_binary_search_forward_and_backward() {
        let track = ramp();
        let mut cursor = KeyframeCursor::default();
        for &time in &[0.0, 0.5, 1.2, 2.9, 6.5, 7.5, 0.25, 3.3, 3.1, 1.0] {
            let a = track.sample_with_cursor(time, &mut cursor).unwrap();
            let b = track.sample(time).unwrap();
            assert!((a - b).abs() < 1e-5, "time {time}: {a} vs {b}");
        }
    }

    #[test]
    fn before_first_keyframe_holds_first_value() {
        let track = KeyframeTrack::new(vec![1.0, 2.0], vec![10.0_f32, 20.0], InterpolationMode::Linear);
        let mut cursor = KeyframeCursor::default();
        assert_eq!(track.sample_with_cursor(0.5, &mut cursor), Some(10.0));
        assert_eq!(track.sample(0.5), Some(10.0));
    }

    #[test]
    fn step_holds_previous_keyframe() {
        let track = KeyframeTrack::new(vec![0.0, 1.0], vec![0.0_f32, 100.0], InterpolationMode::Step);
        assert_eq!(track.sample(0.99), Some(0.0));
        assert_eq!(track.sample(1.0), Some(100.0));
    }

    #[test]
    fn empty_track_samples_nothing() {
        let track: KeyframeTrack<f32> = KeyframeTrack::new(vec![], vec![], InterpolationMode::Linear);
        let mut cursor = KeyframeCursor::default();
        assert!(track.sample(0.0).is_none());
        assert!(track.sample_with_cursor(0.0, &mut cursor).is_none());
    }
}
