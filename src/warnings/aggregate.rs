use std::collections::HashSet;

use super::types::WarningItem;

/// Order by severity (stable within a severity), then keep the first
/// warning for each message key.
pub fn aggregate(mut warnings: Vec<WarningItem>) -> Vec<WarningItem> {
    warnings.sort_by_key(|w| w.severity);
    let mut seen = HashSet::new();
    warnings.retain(|w| seen.insert(w.message_key.clone()));
    warnings
}
