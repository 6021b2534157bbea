use crate::models::PatchCombination;

/// Fentanyl patch strengths on the Hungarian market (mcg/hr).
pub const STANDARD_PATCH_SIZES: [f64; 5] = [100.0, 75.0, 50.0, 25.0, 12.0];

/// Greedy largest-first patch set for `target_mcg_per_hr`.
///
/// A remainder of at least half the smallest strength adds one more smallest
/// patch. Empty `sizes` falls back to the standard strengths.
pub fn combine_patches(target_mcg_per_hr: f64, sizes: &[f64]) -> Vec<PatchCombination> {
    if !(target_mcg_per_hr > 0.0) {
        return Vec::new();
    }

    let mut sorted: Vec<f64> = if sizes.is_empty() {
        STANDARD_PATCH_SIZES.to_vec()
    } else {
        sizes.iter().copied().filter(|s| *s > 0.0).collect()
    };
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.dedup();
    let Some(&smallest) = sorted.last() else {
        return Vec::new();
    };

    let mut remaining = target_mcg_per_hr;
    let mut patches: Vec<PatchCombination> = Vec::new();
    for size in sorted {
        if remaining >= size {
            let count = (remaining / size).floor();
            remaining -= count * size;
            patches.push(PatchCombination {
                mcg_per_hr: size,
                count: count as u32,
            });
        }
    }

    if remaining >= smallest / 2.0 {
        match patches.iter_mut().find(|p| p.mcg_per_hr == smallest) {
            Some(existing) => existing.count += 1,
            None => patches.push(PatchCombination {
                mcg_per_hr: smallest,
                count: 1,
            }),
        }
    }

    patches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{patch_count, patch_total_mcg_per_hr, uses_patch_size};

    #[test]
    fn exact_anchor_is_single_patch() {
        let patches = combine_patches(50.0, &STANDARD_PATCH_SIZES);
        assert_eq!(patches, vec![PatchCombination { mcg_per_hr: 50.0, count: 1 }]);
    }

    #[test]
    fn large_dose_combines() {
        let patches = combine_patches(175.0, &STANDARD_PATCH_SIZES);
        assert_eq!(
            patches,
            vec![
                PatchCombination { mcg_per_hr: 100.0, count: 1 },
                PatchCombination { mcg_per_hr: 75.0, count: 1 },
            ]
        );
    }

    #[test]
    fn remainder_at_half_smallest_rounds_up() {
        // 25 + 6 remainder → one extra 12
        let patches = combine_patches(31.0, &STANDARD_PATCH_SIZES);
        assert!((patch_total_mcg_per_hr(&patches) - 37.0).abs() < 1e-9);
        assert!(uses_patch_size(&patches, 12.0));
    }

    #[test]
    fn remainder_below_half_dropped() {
        let patches = combine_patches(30.0, &STANDARD_PATCH_SIZES);
        assert_eq!(patches, vec![PatchCombination { mcg_per_hr: 25.0, count: 1 }]);
    }

    #[test]
    fn extra_smallest_increments_existing_entry() {
        // 12 fits once, remainder 7 ≥ 6
        let patches = combine_patches(19.0, &STANDARD_PATCH_SIZES);
        assert_eq!(patches, vec![PatchCombination { mcg_per_hr: 12.0, count: 2 }]);
        assert_eq!(patch_count(&patches), 2);
    }

    #[test]
    fn tiny_target_gets_smallest_patch() {
        let patches = combine_patches(8.0, &STANDARD_PATCH_SIZES);
        assert_eq!(patches, vec![PatchCombination { mcg_per_hr: 12.0, count: 1 }]);
    }

    #[test]
    fn non_positive_target_empty() {
        assert!(combine_patches(0.0, &STANDARD_PATCH_SIZES).is_empty());
        assert!(combine_patches(-3.0, &STANDARD_PATCH_SIZES).is_empty());
    }

    #[test]
    fn empty_sizes_use_standard() {
        let patches = combine_patches(100.0, &[]);
        assert_eq!(patches, vec![PatchCombination { mcg_per_hr: 100.0, count: 1 }]);
    }
}
