//! Per-acquisition views derived from a sequence's bulk data.
//!
//! `MFMC_DATA` is stored as `(frames, ascans, samples)`. An [`AScan`] is the
//! `(frames, samples)` slab at one acquisition index, paired with the laws
//! that produced it.

use std::iter::FusedIterator;

use crate::core::Array;
use crate::entity::{Law, Sequence};
use crate::util::Result;

/// One transmit/receive acquisition across all frames.
#[derive(Clone, Debug, PartialEq)]
pub struct AScan {
    /// Acquisition index within the sequence.
    pub index: usize,
    /// Samples, shape `(frames, samples)`. Float64 when normalised.
    pub data: Array,
    pub transmit_law: Law,
    pub receive_law: Law,
}

impl AScan {
    /// Number of samples per trace.
    pub fn len(&self) -> usize {
        self.data.shape().sizes().last().copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Every acquisition of a sequence, in index order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub ascans: Vec<AScan>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.ascans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ascans.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AScan> {
        self.ascans.iter()
    }
}

impl FromIterator<AScan> for Frame {
    fn from_iter<I: IntoIterator<Item = AScan>>(iter: I) -> Self {
        Self { ascans: iter.into_iter().collect() }
    }
}

/// Sound velocities in m/s. Wedge values are `None` when not recorded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocities {
    pub specimen_shear: f64,
    pub specimen_longitudinal: f64,
    pub wedge_shear: Option<f64>,
    pub wedge_longitudinal: Option<f64>,
}

/// Sample instants `start + i * step` for `i` in `0..len`.
///
/// Generated on demand; clone the iterator to restart it.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleTimes {
    start: f64,
    step: f64,
    front: usize,
    back: usize,
}

impl SampleTimes {
    pub fn new(start: f64, step: f64, len: usize) -> Self {
        Self { start, step, front: 0, back: len }
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    /// Time of sample `i`, regardless of iteration state.
    #[inline]
    pub fn at(&self, i: usize) -> f64 {
        self.start + i as f64 * self.step
    }
}

impl Iterator for SampleTimes {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        let t = self.at(self.front);
        self.front += 1;
        Some(t)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.back - self.front;
        (n, Some(n))
    }

    fn nth(&mut self, n: usize) -> Option<f64> {
        self.front = self.front.saturating_add(n).min(self.back);
        self.next()
    }
}

impl DoubleEndedIterator for SampleTimes {
    fn next_back(&mut self) -> Option<f64> {
        if self.front >= self.back {
            return None;
        }
        self.back -= 1;
        Some(self.at(self.back))
    }
}

impl ExactSizeIterator for SampleTimes {}
impl FusedIterator for SampleTimes {}

/// Lazy iteration over every acquisition of a sequence, not normalised.
#[derive(Clone, Debug)]
pub struct AScanIter<'a> {
    sequence: &'a Sequence,
    next: usize,
    count: usize,
}

impl<'a> AScanIter<'a> {
    pub(crate) fn new(sequence: &'a Sequence, count: usize) -> Self {
        Self { sequence, next: 0, count }
    }
}

impl Iterator for AScanIter<'_> {
    type Item = Result<AScan>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.sequence.get_ascan(index, false))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.count - self.next;
        (n, Some(n))
    }
}

impl ExactSizeIterator for AScanIter<'_> {}
impl FusedIterator for AScanIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_times() {
        let times = SampleTimes::new(1.0e-6, 2.0e-8, 4);
        assert_eq!(times.len(), 4);
        let v: Vec<f64> = times.clone().collect();
        assert_eq!(v.len(), 4);
        assert_eq!(v[0], 1.0e-6);
        for pair in v.windows(2) {
            assert!((pair[1] - pair[0] - 2.0e-8).abs() < 1e-18);
        }
        // Restartable via clone.
        assert_eq!(times.clone().next(), Some(1.0e-6));
        assert_eq!(times.clone().next_back(), Some(times.at(3)));
    }

    #[test]
    fn test_sample_times_empty_and_nth() {
        let mut empty = SampleTimes::new(0.0, 1.0, 0);
        assert_eq!(empty.next(), None);

        let mut t = SampleTimes::new(0.0, 0.5, 5);
        assert_eq!(t.nth(2), Some(1.0));
        assert_eq!(t.len(), 2);
        assert_eq!(t.nth(10), None);
        assert_eq!(t.next(), None);
    }
}
