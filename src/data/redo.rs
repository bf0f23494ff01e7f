// ---------------------------------------------------------------------------
// Redo cleaning: which entries of a restarted run survive
// ---------------------------------------------------------------------------

/// Compute the redo mask for a sequence of step counters.
///
/// `true` marks an entry superseded by a later restart. The last entry is
/// always kept; reading backwards, an entry survives only when it is strictly
/// below every value kept after it.
///
/// Inputs shorter than two entries yield an all-false mask.
pub fn compute_mask(steps: &[f64]) -> Vec<bool> {
    let mut mask = vec![false; steps.len()];
    let Some((&last, rest)) = steps.split_last() else {
        return mask;
    };

    let mut threshold = last;
    for (i, &step) in rest.iter().enumerate().rev() {
        if step >= threshold {
            mask[i] = true;
        } else {
            threshold = step;
        }
    }
    mask
}

/// Number of masked entries.
pub fn masked_count(mask: &[bool]) -> usize {
    mask.iter().filter(|&&m| m).count()
}

/// Drop masked positions from `values`, preserving the order of survivors.
///
/// `values` and `mask` must be co-indexed; extra values past the end of the
/// mask are kept.
pub fn compress<T: Clone>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .enumerate()
        .filter(|(i, _)| !mask.get(*i).copied().unwrap_or(false))
        .map(|(_, v)| v.clone())
        .collect()
}

/// Indices of entries that survive the mask.
pub fn kept_indices(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, m)| !**m)
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: bool = true;
    const F: bool = false;

    #[test]
    fn single_redo_is_removed() {
        let steps = [1.0, 2.0, 3.0, 2.0, 3.0, 4.0, 5.0];
        let mask = compute_mask(&steps);
        assert_eq!(mask, vec![F, F, T, T, F, F, F]);
        assert_eq!(compress(&steps, &mask), vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn increasing_sequence_is_untouched() {
        let steps = [1.0, 5.0, 10.0, 11.0];
        let mask = compute_mask(&steps);
        assert_eq!(masked_count(&mask), 0);
        assert_eq!(compress(&steps, &mask), steps.to_vec());
    }

    #[test]
    fn short_inputs_yield_empty_mask() {
        assert!(compute_mask(&[]).is_empty());
        assert_eq!(compute_mask(&[42.0]), vec![F]);
    }

    #[test]
    fn multiple_restarts_keep_final_run() {
        // run 1: 1..=5, restart at 3: 3..=6, restart at 2: 2..=4
        let steps = [1.0, 2.0, 3.0, 4.0, 5.0, 3.0, 4.0, 5.0, 6.0, 2.0, 3.0, 4.0];
        let mask = compute_mask(&steps);
        let kept = compress(&steps, &mask);
        assert_eq!(kept, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(kept_indices(&mask), vec![0, 9, 10, 11]);
    }

    #[test]
    fn repeated_boundary_value_is_dropped() {
        let steps = [1.0, 2.0, 2.0, 3.0];
        assert_eq!(compute_mask(&steps), vec![F, T, F, F]);
    }

    #[test]
    fn trailing_duplicate_keeps_last() {
        let steps = [1.0, 2.0, 3.0, 3.0];
        assert_eq!(compute_mask(&steps), vec![F, F, T, F]);
    }

    #[test]
    fn same_mask_applies_to_co_indexed_columns() {
        let steps = [10.0, 11.0, 12.0, 11.0, 12.0];
        let age = [0.1, 0.2, 0.3, 0.25, 0.35];
        let mask = compute_mask(&steps);
        assert_eq!(compress(&steps, &mask), vec![10.0, 11.0, 12.0]);
        assert_eq!(compress(&age, &mask), vec![0.1, 0.25, 0.35]);
    }
}
