use std::ops::Range;

/// Split `[0, total)` into `workers` contiguous ranges.
///
/// Every range but the last has `total / workers` elements; the last takes
/// the remainder. Some ranges are empty when `total < workers`.
pub fn plan_partitions(total: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let size = total / workers;

    (0..workers)
        .map(|k| {
            let start = k * size;
            let end = if k < workers - 1 { start + size } else { total };
            start..end
        })
        .collect()
}

/// Hand out one disjoint mutable segment of `slots` per planned range.
///
/// The plan must be contiguous and cover `slots` exactly, as
/// `plan_partitions(slots.len(), _)` does.
pub fn split_by_plan<'a, T>(mut slots: &'a mut [T], plan: &[Range<usize>]) -> Vec<&'a mut [T]> {
    let mut segments = Vec::with_capacity(plan.len());
    for range in plan {
        let (segment, rest) = slots.split_at_mut(range.len());
        segments.push(segment);
        slots = rest;
    }
    debug_assert!(slots.is_empty(), "partition plan does not cover all slots");
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_exact_cover(total: usize, plan: &[Range<usize>]) {
        let mut owner = vec![0usize; total];
        for range in plan {
            for i in range.clone() {
                owner[i] += 1;
            }
        }
        assert!(owner.iter().all(|&n| n == 1), "total={} plan={:?}", total, plan);
    }

    #[test]
    fn test_even_split() {
        let plan = plan_partitions(8, 4);
        assert_eq!(plan, vec![0..2, 2..4, 4..6, 6..8]);
    }

    #[test]
    fn test_last_range_takes_remainder() {
        let plan = plan_partitions(10, 4);
        assert_eq!(plan, vec![0..2, 2..4, 4..6, 6..10]);
    }

    #[test]
    fn test_fewer_items_than_workers() {
        let plan = plan_partitions(3, 4);
        assert_eq!(plan, vec![0..0, 0..0, 0..0, 0..3]);
        assert_eq!(plan_partitions(0, 4), vec![0..0, 0..0, 0..0, 0..0]);
    }

    #[test]
    fn test_exact_cover_for_many_sizes() {
        for total in 0..200 {
            let plan = plan_partitions(total, 4);
            assert_eq!(plan.len(), 4);
            assert_eq!(plan.first().map(|r| r.start), Some(0));
            assert_eq!(plan.last().map(|r| r.end), Some(total));
            assert_exact_cover(total, &plan);
        }
    }

    #[test]
    fn test_zero_workers_treated_as_one() {
        assert_eq!(plan_partitions(5, 0), vec![0..5]);
    }

    #[test]
    fn test_split_by_plan_is_disjoint() {
        let mut slots = vec![0u32; 10];
        let plan = plan_partitions(slots.len(), 4);
        for (k, segment) in split_by_plan(&mut slots, &plan).into_iter().enumerate() {
            segment.fill(k as u32 + 1);
        }
        assert_eq!(slots, vec![1, 1, 2, 2, 3, 3, 4, 4, 4, 4]);
    }
}
