use crate::models::TabletCount;

// Absorbs float residue so that e.g. 2.6 mg still fits two 1.3 mg tablets.
const FIT_EPSILON: f64 = 1e-9;

fn sorted_descending(sizes: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = sizes.iter().copied().filter(|s| *s > 0.0).collect();
    sorted.sort_by(|a, b| b.total_cmp(a));
    sorted.dedup();
    sorted
}

/// Greedy largest-first combination not exceeding `target_mg`.
pub fn round_down(target_mg: f64, sizes: &[f64]) -> Vec<TabletCount> {
    if !(target_mg > 0.0) || !target_mg.is_finite() {
        return Vec::new();
    }

    let mut remaining = target_mg;
    let mut tablets = Vec::new();
    for size in sorted_descending(sizes) {
        if remaining + FIT_EPSILON >= size {
            let count = ((remaining + FIT_EPSILON) / size).floor().min(f64::from(u32::MAX));
            remaining -= count * size;
            tablets.push(TabletCount {
                strength_mg: size,
                count: count as u32,
            });
        }
    }
    tablets
}

/// Smallest greedy combination reaching `target_mg`: the round-down result
/// when exact, otherwise the round-down of that sum plus one smallest tablet.
pub fn round_up(target_mg: f64, sizes: &[f64], epsilon: f64) -> Vec<TabletCount> {
    let sorted = sorted_descending(sizes);
    let Some(&smallest) = sorted.last() else {
        return Vec::new();
    };
    if !(target_mg > 0.0) || !target_mg.is_finite() {
        return Vec::new();
    }

    let down = round_down(target_mg, &sorted);
    let down_total = tablet_total(&down);
    if (down_total - target_mg).abs() < epsilon {
        return down;
    }
    round_down(down_total + smallest, &sorted)
}

pub fn tablet_total(tablets: &[TabletCount]) -> f64 {
    tablets.iter().map(TabletCount::total_mg).sum()
}
