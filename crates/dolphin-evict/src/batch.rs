//! Batch partitioning.

use std::ops::Range;

use dolphin_core::PodRef;
use serde::Serialize;

/// A contiguous slice `[start, end)` of the pod snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PodBatch {
    /// Zero-based position of this batch in the plan.
    pub index: usize,
    /// First snapshot index in the batch.
    pub start: usize,
    /// One past the last snapshot index in the batch.
    pub end: usize,
}

impl PodBatch {
    /// Snapshot indices covered by this batch.
    #[must_use]
    pub const fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Number of pods in the batch.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the batch holds no pods.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The pods of `snapshot` covered by this batch.
    ///
    /// # Panics
    ///
    /// Panics if the batch was planned for a shorter snapshot.
    #[must_use]
    pub fn pods<'a>(&self, snapshot: &'a [PodRef]) -> &'a [PodRef] {
        &snapshot[self.range()]
    }
}

/// Partition `len` items into batches of `batch_size`.
///
/// The final batch may be shorter. A `batch_size` of zero yields a single
/// batch covering everything; an empty input yields no batches.
#[must_use]
pub fn plan_batches(len: usize, batch_size: usize) -> Vec<PodBatch> {
    if len == 0 {
        return Vec::new();
    }
    let size = if batch_size == 0 { len } else { batch_size };

    (0..len)
        .step_by(size)
        .enumerate()
        .map(|(index, start)| PodBatch {
            index,
            start,
            end: (start + size).min(len),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(batches: &[PodBatch]) -> Vec<usize> {
        batches.iter().map(PodBatch::len).collect()
    }

    #[test]
    fn five_pods_in_twos() {
        let batches = plan_batches(5, 2);
        assert_eq!(sizes(&batches), [2, 2, 1]);
        assert_eq!(batches[2].range(), 4..5);
    }

    #[test]
    fn empty_snapshot_has_no_batches() {
        assert!(plan_batches(0, 3).is_empty());
        assert!(plan_batches(0, 0).is_empty());
    }

    #[test]
    fn zero_batch_size_is_one_batch() {
        let batches = plan_batches(7, 0);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].range(), 0..7);
    }

    #[test]
    fn batch_larger_than_snapshot() {
        assert_eq!(sizes(&plan_batches(3, 10)), [3]);
    }

    #[test]
    fn partitions_exactly_once() {
        for len in 0..40 {
            for size in 1..12 {
                let batches = plan_batches(len, size);
                assert_eq!(batches.len(), len.div_ceil(size), "len={len} size={size}");

                let mut next = 0;
                for (i, batch) in batches.iter().enumerate() {
                    assert_eq!(batch.index, i);
                    assert_eq!(batch.start, next, "gap or overlap at batch {i}");
                    assert!(!batch.is_empty());
                    if i + 1 < batches.len() {
                        assert_eq!(batch.len(), size);
                    }
                    next = batch.end;
                }
                assert_eq!(next, len);

                if let Some(last) = batches.last() {
                    let expected = if len % size == 0 { size } else { len % size };
                    assert_eq!(last.len(), expected);
                }
            }
        }
    }

    #[test]
    fn slices_snapshot() {
        let snapshot: Vec<_> = (0..5)
            .map(|i| PodRef::new(format!("p{i}"), "web", "worker2"))
            .collect();
        let batches = plan_batches(snapshot.len(), 2);
        let names: Vec<_> = batches[1]
            .pods(&snapshot)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["p2", "p3"]);
    }
}
