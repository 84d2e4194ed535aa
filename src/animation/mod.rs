//! Animation sampling and compression.
//!
//! Every animated channel is sampled once per frame of the playback range.
//! The samples of all channels of one kind (scale, rotation, translation)
//! share a single pool of values; a channel is written as a reference into
//! its pool. Pools are compressed by reusing runs of values that are already
//! there.

pub mod node;
pub mod pattern;
pub mod srt;

use scene::Curve;

/// Shared value pool for one kind of channel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pool {
    pub data: Vec<f64>,
}

impl Pool {
    /// A pool holding only `initial`, the identity value for its channels.
    pub fn with_initial(initial: f64) -> Pool {
        Pool { data: vec![initial] }
    }

    /// Adds a channel's samples. Returns the (head, size) a reference to
    /// them should use.
    ///
    /// A constant channel is stored as one value, shared with any equal
    /// value already in the pool. Otherwise an existing run of equal
    /// values is reused, or the samples are appended; when the first
    /// sample is equal to the pool's last value, that value is shared.
    pub fn add(&mut self, samples: &[f64]) -> (usize, usize) {
        let first = match samples.first() {
            Some(&x) => x,
            None => return (self.data.len(), 0),
        };

        if samples.iter().all(|&x| x == first) {
            if let Some(i) = self.data.iter().position(|&x| x == first) {
                return (i, 1);
            }
            self.data.push(first);
            return (self.data.len() - 1, 1);
        }

        if let Some(i) = self.data.windows(samples.len()).position(|w| w == samples) {
            return (i, samples.len());
        }

        let mut head = self.data.len();
        let mut rest = samples;
        if self.data.last() == Some(&first) {
            head -= 1;
            rest = &samples[1..];
        }
        self.data.extend_from_slice(rest);
        (head, samples.len())
    }
}

/// Where a channel's values are in its pool.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reference {
    pub frame_step: u32,
    pub data_size: usize,
    pub data_head: usize,
}

impl Reference {
    /// Stores `samples` in `pool`, decimated by `frame_step`.
    pub fn add(pool: &mut Pool, samples: Vec<f64>, frame_step: u32, tolerance: f64) -> Reference {
        let (samples, frame_step) = decimate(samples, frame_step, tolerance);
        let (data_head, data_size) = pool.add(&samples);
        Reference { frame_step, data_size, data_head }
    }

    /// A reference to a single value.
    pub fn constant(pool: &mut Pool, value: f64) -> Reference {
        let (data_head, data_size) = pool.add(&[round6(value)]);
        Reference { frame_step: 1, data_size, data_head }
    }
}

/// Keeps every `frame_step`-th sample, plus the samples of the final
/// incomplete stride. A channel that varies by less than `tolerance` is
/// reduced to its first sample.
pub fn decimate(samples: Vec<f64>, frame_step: u32, tolerance: f64) -> (Vec<f64>, u32) {
    let step = frame_step.max(1) as usize;
    let n = samples.len();
    let kept: Vec<f64> = if step == 1 {
        samples
    } else {
        samples.into_iter()
            .enumerate()
            .filter(|&(i, _)| i % step == 0 || n - i < step)
            .map(|(_, x)| x)
            .collect()
    };

    let first = match kept.first() {
        Some(&x) => x,
        None => return (kept, 1),
    };
    let min = kept.iter().cloned().fold(first, f64::min);
    let max = kept.iter().cloned().fold(first, f64::max);
    if max - min < tolerance {
        return (vec![first], 1);
    }
    (kept, step as u32)
}

/// Rounds to 6 decimal places, the precision values are written with.
pub fn round6(x: f64) -> f64 {
    let r = (x * 1e6).round() / 1e6;
    if r == 0.0 { 0.0 } else { r }
}

/// Frames of the playback range.
pub fn frames(frame_start: i32, frame_end: i32) -> Vec<f64> {
    (frame_start..=frame_end).map(|f| f as f64).collect()
}

/// Samples `curve` at every frame, rounded. `f` converts each sample
/// before rounding.
pub fn sample<F: Fn(f64) -> f64>(curve: &Curve, default: f64, frames: &[f64], f: F) -> Vec<f64> {
    frames.iter().map(|&t| round6(f(curve.sample_at(default, t)))).collect()
}

/// `frame_size` of an animation over the playback range.
pub fn frame_size(frame_start: i32, frame_end: i32) -> u32 {
    (frame_end as i64 - frame_start as i64 + 1).max(0).min(u32::max_value() as i64) as u32
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn existing_run_is_reused() {
        let mut pool = Pool::default();
        assert_eq!(pool.add(&[0.0, 1.0, 2.0, 3.0]), (0, 4));
        assert_eq!(pool.add(&[1.0, 2.0, 3.0]), (1, 3));
        assert_eq!(pool.data, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn constants_are_idempotent() {
        let mut pool = Pool::with_initial(1.0);
        assert_eq!(pool.add(&[1.0, 1.0, 1.0]), (0, 1));
        assert_eq!(pool.add(&[2.5]), (1, 1));
        assert_eq!(pool.add(&[2.5, 2.5]), (1, 1));
        assert_eq!(pool.data, vec![1.0, 2.5]);
    }

    #[test]
    fn shared_boundary_value() {
        let mut pool = Pool::with_initial(0.0);
        assert_eq!(pool.add(&[0.0, 5.0, 6.0]), (0, 3));
        assert_eq!(pool.data, vec![0.0, 5.0, 6.0]);
        assert_eq!(pool.add(&[6.0, 7.0]), (2, 2));
        assert_eq!(pool.data, vec![0.0, 5.0, 6.0, 7.0]);
        assert_eq!(pool.add(&[1.0, 2.0]), (4, 2));
    }

    #[test]
    fn decimation_keeps_tail() {
        let samples: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let (kept, step) = decimate(samples.clone(), 2, 0.1);
        assert_eq!(kept, vec![0.0, 2.0, 4.0, 6.0]);
        assert_eq!(step, 2);

        let (kept, step) = decimate(samples.clone(), 4, 0.1);
        // 4 is a stride start; 5 and 6 are in the incomplete last stride.
        assert_eq!(kept, vec![0.0, 4.0, 5.0, 6.0]);
        assert_eq!(step, 4);

        let (kept, step) = decimate(samples, 1, 0.1);
        assert_eq!(kept.len(), 7);
        assert_eq!(step, 1);
    }

    #[test]
    fn flat_channel_collapses() {
        let (kept, step) = decimate(vec![1.0, 1.05, 0.98, 1.01], 2, 0.1);
        assert_eq!(kept, vec![1.0]);
        assert_eq!(step, 1);

        // Exactly the tolerance is not below it.
        let (kept, _) = decimate(vec![0.0, 0.1], 1, 0.1);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn rounding() {
        assert_eq!(round6(0.1234564), 0.123456);
        assert_eq!(round6(-0.0000001), 0.0);
        assert!(round6(-0.0000001).is_sign_positive());
        assert_eq!(frame_size(1, 10), 10);
        assert_eq!(frames(2, 4), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn range_ends_at_the_last_frame() {
        let max = i32::max_value();
        assert_eq!(frames(max - 1, max), vec![(max - 1) as f64, max as f64]);
        assert_eq!(frame_size(max - 1, max), 2);
        assert_eq!(frame_size(i32::min_value(), max), u32::max_value());
        assert_eq!(frame_size(4, 3), 0);
    }
}
