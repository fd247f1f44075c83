use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

/// How a concept's value is expressed in the output record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Monetary,
    Percentage,
    Count,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Derivation {
    Extracted,
    Computed,
}

/// Period shape a tagged fact must have to be used for a concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    Instant,
    Duration,
}

/// Canonical financial concepts the engine knows how to fill.
///
/// The first eighteen are output fields; `Depreciation`, `Amortisation` and
/// `TangibleAssets` are base values kept for derivation and the raw data block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Concept {
    AccountsFiledDate,
    BalanceSheetDate,
    Revenue,
    OperatingProfit,
    ProfitBeforeTax,
    NetProfit,
    EbitdaEstimate,
    EbitdaMarginPct,
    OperatingMarginPct,
    NetAssets,
    FixedAssets,
    CurrentAssets,
    Cash,
    TotalCreditors,
    ShortTermCreditors,
    LongTermCreditors,
    ShareholdersFunds,
    AverageEmployees,
    Depreciation,
    Amortisation,
    TangibleAssets,
}

pub const COMPANY_NUMBER_FIELD: &str = "Companies House Number";
pub const LAST_UPDATED_FIELD: &str = "Last Financial Updated";

impl Concept {
    /// Field name used in the output mapping, `None` for base-only concepts.
    pub fn output_name(self) -> Option<&'static str> {
        let name = match self {
            Concept::AccountsFiledDate => "Accounts Filed Date",
            Concept::BalanceSheetDate => "Balance Sheet Date",
            Concept::Revenue => "Revenue",
            Concept::OperatingProfit => "Operating Profit",
            Concept::ProfitBeforeTax => "Profit Before Tax",
            Concept::NetProfit => "Net Profit",
            Concept::EbitdaEstimate => "EBITDA Estimate",
            Concept::EbitdaMarginPct => "EBITDA Margin %",
            Concept::OperatingMarginPct => "Operating Margin %",
            Concept::NetAssets => "Net Assets",
            Concept::FixedAssets => "Fixed Assets",
            Concept::CurrentAssets => "Current Assets",
            Concept::Cash => "Cash",
            Concept::TotalCreditors => "Total Creditors",
            Concept::ShortTermCreditors => "Short Term Creditors",
            Concept::LongTermCreditors => "Long Term Creditors",
            Concept::ShareholdersFunds => "Shareholders Funds",
            Concept::AverageEmployees => "Average Employees",
            Concept::Depreciation | Concept::Amortisation | Concept::TangibleAssets => {
                return None
            }
        };
        Some(name)
    }

    pub fn value_kind(self) -> ValueKind {
        match self {
            Concept::AccountsFiledDate | Concept::BalanceSheetDate => ValueKind::Date,
            Concept::EbitdaMarginPct | Concept::OperatingMarginPct => ValueKind::Percentage,
            Concept::AverageEmployees => ValueKind::Count,
            _ => ValueKind::Monetary,
        }
    }

    pub fn derivation(self) -> Derivation {
        match self {
            Concept::EbitdaEstimate | Concept::EbitdaMarginPct | Concept::OperatingMarginPct => {
                Derivation::Computed
            }
            _ => Derivation::Extracted,
        }
    }

    /// Period shape for concepts read from tagged facts.
    ///
    /// Dates and computed metrics have none.
    pub fn period_kind(self) -> Option<PeriodKind> {
        if self.value_kind() == ValueKind::Date || self.derivation() == Derivation::Computed {
            return None;
        }
        match self {
            Concept::Revenue
            | Concept::OperatingProfit
            | Concept::ProfitBeforeTax
            | Concept::NetProfit
            | Concept::AverageEmployees
            | Concept::Depreciation
            | Concept::Amortisation => Some(PeriodKind::Duration),
            _ => Some(PeriodKind::Instant),
        }
    }

    /// Concepts filled from tagged facts, in output order.
    pub fn tagged() -> impl Iterator<Item = Concept> {
        Concept::iter().filter(|c| c.period_kind().is_some())
    }

    pub fn is_financial(self) -> bool {
        self.value_kind() != ValueKind::Date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_fields() {
        let outputs: Vec<_> = Concept::iter().filter_map(Concept::output_name).collect();
        assert_eq!(outputs.len(), 18);
        assert_eq!(outputs[0], "Accounts Filed Date");
        assert!(outputs.contains(&"EBITDA Margin %"));
        assert_eq!(Concept::Depreciation.output_name(), None);
    }

    #[test]
    fn test_raw_keys() {
        assert_eq!(Concept::EbitdaMarginPct.to_string(), "ebitda_margin_pct");
        assert_eq!(Concept::ShortTermCreditors.to_string(), "short_term_creditors");
    }

    #[test]
    fn test_period_kinds() {
        assert_eq!(Concept::Revenue.period_kind(), Some(PeriodKind::Duration));
        assert_eq!(Concept::Cash.period_kind(), Some(PeriodKind::Instant));
        assert_eq!(Concept::EbitdaEstimate.period_kind(), None);
        assert_eq!(Concept::BalanceSheetDate.period_kind(), None);

        let tagged: Vec<_> = Concept::tagged().collect();
        assert_eq!(tagged.len(), 16);
        assert!(!tagged.contains(&Concept::AccountsFiledDate));
    }
}
