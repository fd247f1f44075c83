//! Closed lookup table from canonical concepts to taxonomy tag names.
//!
//! Candidates are literal local names (the part after the prefix, which is a
//! per-filer alias). They are listed from the most specific taxonomy concept
//! (FRC core / FRS102) down to older UK-GAAP, micro-entity aggregates and IFRS.
//! Matching is exact; there is no substring or pattern inference.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use strum::IntoEnumIterator;

use super::concept::Concept;

/// Bumped whenever a candidate list changes.
pub const DICTIONARY_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DimensionMember {
    pub axis: &'static str,
    pub member: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagCandidate {
    pub name: &'static str,
    /// Qualifier the fact's context must carry, for taxonomies that split a
    /// concept by dimension instead of by tag name.
    pub member: Option<DimensionMember>,
}

impl TagCandidate {
    const fn tag(name: &'static str) -> Self {
        Self { name, member: None }
    }

    const fn with_member(name: &'static str, axis: &'static str, member: &'static str) -> Self {
        Self {
            name,
            member: Some(DimensionMember { axis, member }),
        }
    }
}

impl std::fmt::Display for TagCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.member {
            Some(m) => write!(f, "{}[{}={}]", self.name, m.axis, m.member),
            None => write!(f, "{}", self.name),
        }
    }
}

const MATURITY_AXIS: &str = "MaturitiesOrExpirationPeriodsDimension";

const REVENUE: &[TagCandidate] = &[
    TagCandidate::tag("TurnoverRevenue"),
    TagCandidate::tag("TurnoverGrossOperatingRevenue"),
    TagCandidate::tag("RevenueFromContractsWithCustomers"),
    TagCandidate::tag("Revenue"),
    TagCandidate::tag("Turnover"),
];

const OPERATING_PROFIT: &[TagCandidate] = &[
    TagCandidate::tag("OperatingProfitLoss"),
    TagCandidate::tag("ProfitLossFromOperatingActivities"),
];

const PROFIT_BEFORE_TAX: &[TagCandidate] = &[
    TagCandidate::tag("ProfitLossOnOrdinaryActivitiesBeforeTax"),
    TagCandidate::tag("ProfitLossBeforeTax"),
];

const NET_PROFIT: &[TagCandidate] = &[
    TagCandidate::tag("ProfitLoss"),
    TagCandidate::tag("ProfitLossForPeriod"),
    TagCandidate::tag("ProfitLossOnOrdinaryActivitiesAfterTax"),
];

const DEPRECIATION: &[TagCandidate] = &[
    TagCandidate::tag("DepreciationExpensePropertyPlantEquipment"),
    TagCandidate::tag("DepreciationTangibleFixedAssets"),
    TagCandidate::tag("DepreciationTangibleAssets"),
    TagCandidate::tag("DepreciationExpense"),
];

const AMORTISATION: &[TagCandidate] = &[
    TagCandidate::tag("AmortisationExpenseIntangibleAssets"),
    TagCandidate::tag("AmortisationIntangibleAssets"),
    TagCandidate::tag("AmortisationExpense"),
];

const NET_ASSETS: &[TagCandidate] = &[
    TagCandidate::tag("NetAssetsLiabilities"),
    TagCandidate::tag("NetAssetsLiabilitiesIncludingPensionAssetLiability"),
    TagCandidate::tag("TotalNetAssets"),
    TagCandidate::tag("NetAssets"),
];

const FIXED_ASSETS: &[TagCandidate] = &[
    TagCandidate::tag("FixedAssets"),
    TagCandidate::tag("NoncurrentAssets"),
];

const TANGIBLE_ASSETS: &[TagCandidate] = &[
    TagCandidate::tag("PropertyPlantEquipment"),
    TagCandidate::tag("TangibleFixedAssets"),
    TagCandidate::tag("PropertyPlantAndEquipment"),
];

const CURRENT_ASSETS: &[TagCandidate] = &[TagCandidate::tag("CurrentAssets")];

const CASH: &[TagCandidate] = &[
    TagCandidate::tag("CashBankOnHand"),
    TagCandidate::tag("CashBankInHand"),
    TagCandidate::tag("CashAndCashEquivalents"),
    TagCandidate::tag("Cash"),
];

const TOTAL_CREDITORS: &[TagCandidate] = &[
    TagCandidate::tag("Creditors"),
    TagCandidate::tag("TotalCreditors"),
];

const SHORT_TERM_CREDITORS: &[TagCandidate] = &[
    TagCandidate::with_member("Creditors", MATURITY_AXIS, "WithinOneYear"),
    TagCandidate::tag("CreditorsDueWithinOneYear"),
    TagCandidate::tag("CurrentLiabilities"),
];

const LONG_TERM_CREDITORS: &[TagCandidate] = &[
    TagCandidate::with_member("Creditors", MATURITY_AXIS, "AfterOneYear"),
    TagCandidate::tag("CreditorsDueAfterOneYear"),
    TagCandidate::tag("NoncurrentLiabilities"),
];

const SHAREHOLDERS_FUNDS: &[TagCandidate] = &[
    TagCandidate::tag("Equity"),
    TagCandidate::tag("ShareholderFunds"),
    TagCandidate::tag("ShareholdersFunds"),
];

const AVERAGE_EMPLOYEES: &[TagCandidate] = &[
    TagCandidate::tag("AverageNumberEmployeesDuringPeriod"),
    TagCandidate::tag("AverageNumberEmployees"),
];

/// Ordered tag candidates for a concept, empty for dates and computed metrics.
pub fn candidates_for(concept: Concept) -> &'static [TagCandidate] {
    match concept {
        Concept::Revenue => REVENUE,
        Concept::OperatingProfit => OPERATING_PROFIT,
        Concept::ProfitBeforeTax => PROFIT_BEFORE_TAX,
        Concept::NetProfit => NET_PROFIT,
        Concept::Depreciation => DEPRECIATION,
        Concept::Amortisation => AMORTISATION,
        Concept::NetAssets => NET_ASSETS,
        Concept::FixedAssets => FIXED_ASSETS,
        Concept::TangibleAssets => TANGIBLE_ASSETS,
        Concept::CurrentAssets => CURRENT_ASSETS,
        Concept::Cash => CASH,
        Concept::TotalCreditors => TOTAL_CREDITORS,
        Concept::ShortTermCreditors => SHORT_TERM_CREDITORS,
        Concept::LongTermCreditors => LONG_TERM_CREDITORS,
        Concept::ShareholdersFunds => SHAREHOLDERS_FUNDS,
        Concept::AverageEmployees => AVERAGE_EMPLOYEES,
        Concept::AccountsFiledDate
        | Concept::BalanceSheetDate
        | Concept::EbitdaEstimate
        | Concept::EbitdaMarginPct
        | Concept::OperatingMarginPct => &[],
    }
}

static TAG_TO_CONCEPTS: Lazy<HashMap<&'static str, Vec<Concept>>> = Lazy::new(|| {
    let mut map: HashMap<&'static str, Vec<Concept>> = HashMap::new();
    for concept in Concept::iter() {
        for candidate in candidates_for(concept) {
            let entry = map.entry(candidate.name).or_default();
            if !entry.contains(&concept) {
                entry.push(concept);
            }
        }
    }
    map
});

/// Concepts that list `local_name` among their candidates.
pub fn concepts_for_tag(local_name: &str) -> &'static [Concept] {
    TAG_TO_CONCEPTS
        .get(local_name)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Axes that separate group figures from the parent company's own.
pub const CONSOLIDATION_AXES: &[&str] = &[
    "GroupCompanyDataDimension",
    "ConsolidatedAndSeparateFinancialStatementsAxis",
];

pub const CONSOLIDATED_MEMBERS: &[&str] = &["ConsolidatedGroupDataMember", "ConsolidatedMember"];

pub const ENTITY_ONLY_MEMBERS: &[&str] = &["ParentEntityDataMember", "SeparateMember"];

/// Text fact carrying the registered company number.
pub const COMPANY_NUMBER_TAG: &str = "UKCompaniesHouseRegisteredNumber";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_tagged_concept_has_candidates() {
        for concept in Concept::tagged() {
            assert!(
                !candidates_for(concept).is_empty(),
                "{} has no tag candidates",
                concept
            );
        }
        assert!(candidates_for(Concept::EbitdaEstimate).is_empty());
        assert!(candidates_for(Concept::BalanceSheetDate).is_empty());
    }

    #[test]
    fn test_preference_order() {
        let revenue = candidates_for(Concept::Revenue);
        assert_eq!(revenue[0].name, "TurnoverRevenue");
        assert!(revenue.iter().any(|c| c.name == "Revenue"));
    }

    #[test]
    fn test_no_duplicate_candidates_within_concept() {
        for concept in Concept::tagged() {
            let candidates = candidates_for(concept);
            for (i, a) in candidates.iter().enumerate() {
                for b in &candidates[i + 1..] {
                    assert_ne!(a, b, "duplicate candidate for {}", concept);
                }
            }
        }
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(concepts_for_tag("TurnoverRevenue"), &[Concept::Revenue]);
        let creditors = concepts_for_tag("Creditors");
        assert!(creditors.contains(&Concept::TotalCreditors));
        assert!(creditors.contains(&Concept::ShortTermCreditors));
        assert!(creditors.contains(&Concept::LongTermCreditors));
        assert!(concepts_for_tag("turnoverrevenue").is_empty());
    }

    #[test]
    fn test_candidate_display() {
        let c = SHORT_TERM_CREDITORS[0];
        assert_eq!(
            c.to_string(),
            "Creditors[MaturitiesOrExpirationPeriodsDimension=WithinOneYear]"
        );
    }
}
