//! Metrics computed from already extracted base values.

use std::collections::HashMap;

use super::concept::Concept;
use super::extractor::ExtractedValue;
use super::numbers::percentage;

/// Computes EBITDA estimate and the margin percentages.
///
/// Missing depreciation or amortisation counts as zero. A margin is only
/// produced against a present, non-zero revenue, so the output never
/// carries a division by zero or a NaN.
pub fn compute(base: &[ExtractedValue]) -> Vec<ExtractedValue> {
    let values: HashMap<Concept, f64> = base
        .iter()
        .filter_map(|v| v.number().map(|n| (v.concept, n)))
        .collect();
    let get = |concept: Concept| values.get(&concept).copied();

    let revenue = get(Concept::Revenue).filter(|r| *r != 0.0);
    let operating_profit = get(Concept::OperatingProfit);

    // Filers sign expense facts inconsistently; an add-back always adds.
    let add_backs = get(Concept::Depreciation).map_or(0.0, f64::abs)
        + get(Concept::Amortisation).map_or(0.0, f64::abs);
    let ebitda = operating_profit.map(|op| op + add_backs);

    let margin = |numerator: Option<f64>| match (numerator, revenue) {
        (Some(n), Some(r)) => percentage(n, r, 2),
        _ => None,
    };

    let mut derived = Vec::new();
    let mut push = |concept: Concept, value: Option<f64>| {
        derived.push(match value {
            Some(v) => ExtractedValue::derived(concept, v),
            None => ExtractedValue::absent(concept),
        });
    };
    push(Concept::EbitdaEstimate, ebitda);
    push(Concept::EbitdaMarginPct, margin(ebitda));
    push(Concept::OperatingMarginPct, margin(operating_profit));

    derived
}
