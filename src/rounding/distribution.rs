use super::tablets::{round_down, round_up, tablet_total};
use crate::config::EngineConfig;
use crate::models::{DoseDistribution, TabletCount};

/// Spread a daily total over `dose_count` administrations using the
/// available tablet `sizes`.
///
/// An all-equal schedule is preferred: rounded down when within the symmetric
/// tolerance, else rounded up when within both the tolerance and the round-up
/// cap. Otherwise some administrations take the rounded-up dose and the rest
/// the rounded-down one, never exceeding the cap overall.
pub fn distribute(
    target_tdd: f64,
    dose_count: u32,
    sizes: &[f64],
    labels: &[String],
    config: &EngineConfig,
) -> Vec<DoseDistribution> {
    if sizes.is_empty() || !(target_tdd > 0.0) || dose_count == 0 {
        return Vec::new();
    }

    let n = f64::from(dose_count);
    let ideal = target_tdd / n;

    let tablets_down = round_down(ideal, sizes);
    let tablets_up = round_up(ideal, sizes, config.exact_match_epsilon);
    let dose_down = tablet_total(&tablets_down);
    let dose_up = tablet_total(&tablets_up);

    let down_error = (dose_down * n - target_tdd).abs() / target_tdd;
    let up_error = (dose_up * n - target_tdd).abs() / target_tdd;
    let up_over = (dose_up * n - target_tdd) / target_tdd;

    if down_error <= config.symmetric_tolerance {
        return symmetric(&tablets_down, dose_down, dose_count, labels);
    }
    if up_over <= config.round_up_cap && up_error <= config.symmetric_tolerance {
        return symmetric(&tablets_up, dose_up, dose_count, labels);
    }
    if (dose_up - dose_down).abs() < config.exact_match_epsilon {
        return symmetric(&tablets_down, dose_down, dose_count, labels);
    }

    let raw_up = (target_tdd - n * dose_down) / (dose_up - dose_down);
    let mut num_up = raw_up.round().clamp(0.0, n) as u32;
    let total = f64::from(num_up) * dose_up + f64::from(dose_count - num_up) * dose_down;
    if (total - target_tdd) / target_tdd > config.round_up_cap {
        num_up = num_up.saturating_sub(1);
    }

    let up = Slot { tablets: &tablets_up, total_mg: dose_up };
    let down = Slot { tablets: &tablets_down, total_mg: dose_down };
    let num_down = dose_count - num_up;

    // Twice daily with one larger dose: the smaller one comes first.
    let order: Vec<&Slot> = if dose_count == 2 && num_up == 1 {
        vec![&down, &up]
    } else {
        std::iter::repeat(&up)
            .take(num_up as usize)
            .chain(std::iter::repeat(&down).take(num_down as usize))
            .collect()
    };

    order
        .into_iter()
        .enumerate()
        .map(|(i, slot)| slot.administration(label_at(labels, i)))
        .collect()
}

struct Slot<'a> {
    tablets: &'a [TabletCount],
    total_mg: f64,
}

impl Slot<'_> {
    fn administration(&self, label: String) -> DoseDistribution {
        DoseDistribution {
            label,
            total_mg: self.total_mg,
            tablets: self.tablets.to_vec(),
        }
    }
}

fn symmetric(
    tablets: &[TabletCount],
    total_mg: f64,
    dose_count: u32,
    labels: &[String],
) -> Vec<DoseDistribution> {
    let slot = Slot { tablets, total_mg };
    (0..dose_count as usize)
        .map(|i| slot.administration(label_at(labels, i)))
        .collect()
}

/// Supplied label for position `i`, or `#<i+1>`.
pub(crate) fn label_at(labels: &[String], i: usize) -> String {
    labels
        .get(i)
        .filter(|l| !l.is_empty())
        .cloned()
        .unwrap_or_else(|| format!("#{}", i + 1))
}
