use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::concept::{Concept, ValueKind, COMPANY_NUMBER_FIELD, LAST_UPDATED_FIELD};
use super::extractor::{Confidence, ExtractedValue, Value};
use super::facts::FactIndex;
use super::numbers::round_to;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    /// Valid document, but nothing tagged matched a financial concept.
    NoData,
}

/// What the caller knows about the filing besides the document itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingMetadata {
    pub company_number: String,
    pub filing_date: Option<NaiveDate>,
    /// Stamped as "Last Financial Updated" when present.
    pub processed_on: Option<NaiveDate>,
}

impl FilingMetadata {
    pub fn new(company_number: impl Into<String>) -> Self {
        Self {
            company_number: company_number.into(),
            ..Self::default()
        }
    }

    pub fn with_filing_date(mut self, filing_date: NaiveDate) -> Self {
        self.filing_date = Some(filing_date);
        self
    }

    pub fn with_processed_on(mut self, processed_on: NaiveDate) -> Self {
        self.processed_on = Some(processed_on);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    fn format(concept: Concept, value: &Value) -> Self {
        match (concept.value_kind(), value) {
            (_, Value::Date(date)) => FieldValue::Text(date.format("%Y-%m-%d").to_string()),
            (ValueKind::Percentage, Value::Number(n)) => FieldValue::Decimal(round_to(*n, 2)),
            (_, Value::Number(n)) => FieldValue::Integer(n.round() as i64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldProvenance {
    pub concept: Concept,
    pub tag_name: Option<String>,
    pub context_ref: Option<String>,
    pub element_order: Option<usize>,
    pub confidence: Confidence,
}

/// The record handed back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub status: Status,
    pub company_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filing_date: Option<NaiveDate>,
    pub fields_extracted: usize,
    pub data: BTreeMap<String, FieldValue>,
    pub raw_financial_data: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub provenance: Vec<FieldProvenance>,
}

impl ExtractionResult {
    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.data.get(name)
    }
}

pub struct ResultAssembler<'a> {
    metadata: &'a FilingMetadata,
    provenance_from: Option<&'a FactIndex>,
}

impl<'a> ResultAssembler<'a> {
    pub fn new(metadata: &'a FilingMetadata) -> Self {
        Self {
            metadata,
            provenance_from: None,
        }
    }

    /// Records which fact each value came from.
    pub fn with_provenance(mut self, index: &'a FactIndex) -> Self {
        self.provenance_from = Some(index);
        self
    }

    pub fn assemble(&self, values: Vec<ExtractedValue>) -> ExtractionResult {
        let company_number = self.metadata.company_number.trim().to_uppercase();
        let mut data = BTreeMap::new();
        data.insert(
            COMPANY_NUMBER_FIELD.to_string(),
            FieldValue::Text(company_number.clone()),
        );

        let present: Vec<&ExtractedValue> = values.iter().filter(|v| v.is_present()).collect();
        let financial = present
            .iter()
            .filter(|v| v.concept.is_financial() && v.concept.output_name().is_some())
            .count();

        if financial == 0 {
            log::info!("No financial fields extracted for {}", company_number);
            return ExtractionResult {
                status: Status::NoData,
                company_number,
                filing_date: self.metadata.filing_date,
                fields_extracted: 0,
                data,
                raw_financial_data: BTreeMap::new(),
                provenance: Vec::new(),
            };
        }

        let mut fields_extracted = 0;
        let mut raw_financial_data = BTreeMap::new();
        for extracted in &present {
            let Some(value) = &extracted.value else {
                continue;
            };
            raw_financial_data.insert(extracted.concept.to_string(), *value);
            if let Some(name) = extracted.concept.output_name() {
                data.insert(name.to_string(), FieldValue::format(extracted.concept, value));
                fields_extracted += 1;
            }
        }

        if let Some(processed_on) = self.metadata.processed_on {
            data.insert(
                LAST_UPDATED_FIELD.to_string(),
                FieldValue::Text(processed_on.format("%Y-%m-%d").to_string()),
            );
        }

        let provenance = match self.provenance_from {
            Some(index) => present
                .iter()
                .map(|v| {
                    let fact = v.source_fact.and_then(|order| index.fact(order));
                    FieldProvenance {
                        concept: v.concept,
                        tag_name: fact.map(|f| f.tag_name.clone()),
                        context_ref: fact.map(|f| f.context_ref.clone()),
                        element_order: v.source_fact,
                        confidence: v.confidence,
                    }
                })
                .collect(),
            None => Vec::new(),
        };

        log::info!(
            "Extracted {} fields for {}",
            fields_extracted,
            company_number
        );

        ExtractionResult {
            status: Status::Success,
            company_number,
            filing_date: self.metadata.filing_date,
            fields_extracted,
            data,
            raw_financial_data,
            provenance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number(concept: Concept, v: f64, confidence: Confidence) -> ExtractedValue {
        ExtractedValue {
            concept,
            value: Some(Value::Number(v)),
            source_fact: None,
            confidence,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_sparse_record() {
        let metadata = FilingMetadata::new(" sc123456 ").with_filing_date(date(2024, 5, 1));
        let values = vec![
            ExtractedValue::date(Concept::AccountsFiledDate, metadata.filing_date),
            ExtractedValue::date(Concept::BalanceSheetDate, Some(date(2023, 12, 31))),
            number(Concept::Revenue, 2_450_000.4, Confidence::Exact),
            ExtractedValue::absent(Concept::NetProfit),
            number(Concept::Depreciation, 133_000.0, Confidence::Exact),
            ExtractedValue::derived(Concept::EbitdaMarginPct, 18.163265),
        ];
        let result = ResultAssembler::new(&metadata).assemble(values);

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.company_number, "SC123456");
        assert_eq!(result.fields_extracted, 4);
        assert_eq!(result.field("Revenue"), Some(&FieldValue::Integer(2_450_000)));
        assert_eq!(result.field("EBITDA Margin %"), Some(&FieldValue::Decimal(18.16)));
        assert_eq!(
            result.field("Balance Sheet Date"),
            Some(&FieldValue::Text("2023-12-31".to_string()))
        );
        assert_eq!(
            result.field("Companies House Number"),
            Some(&FieldValue::Text("SC123456".to_string()))
        );
        assert!(result.field("Net Profit").is_none());
        assert!(result.field("Last Financial Updated").is_none());
        assert_eq!(
            result.raw_financial_data.get("depreciation"),
            Some(&Value::Number(133_000.0))
        );
        assert!(result.provenance.is_empty());
    }

    #[test]
    fn test_dates_only_is_no_data() {
        let metadata = FilingMetadata::new("01234567")
            .with_filing_date(date(2024, 5, 1))
            .with_processed_on(date(2024, 6, 1));
        let values = vec![
            ExtractedValue::date(Concept::AccountsFiledDate, metadata.filing_date),
            ExtractedValue::date(Concept::BalanceSheetDate, Some(date(2023, 12, 31))),
            ExtractedValue::absent(Concept::Revenue),
        ];
        let result = ResultAssembler::new(&metadata).assemble(values);

        assert_eq!(result.status, Status::NoData);
        assert_eq!(result.fields_extracted, 0);
        assert_eq!(result.data.len(), 1);
        assert!(result.data.contains_key("Companies House Number"));
    }

    #[test]
    fn test_base_only_values_do_not_count() {
        let metadata = FilingMetadata::new("01234567");
        let result = ResultAssembler::new(&metadata)
            .assemble(vec![number(Concept::Depreciation, 10.0, Confidence::Exact)]);
        assert_eq!(result.status, Status::NoData);
    }

    #[test]
    fn test_last_updated_is_not_counted() {
        let metadata = FilingMetadata::new("01234567").with_processed_on(date(2024, 6, 1));
        let result = ResultAssembler::new(&metadata)
            .assemble(vec![number(Concept::Cash, 10.0, Confidence::FallbackTag)]);
        assert_eq!(result.fields_extracted, 1);
        assert_eq!(
            result.field("Last Financial Updated"),
            Some(&FieldValue::Text("2024-06-01".to_string()))
        );
    }

    #[test]
    fn test_serialized_shape() {
        let metadata = FilingMetadata::new("01234567");
        let result = ResultAssembler::new(&metadata).assemble(vec![
            number(Concept::AverageEmployees, 11.0, Confidence::Exact),
            ExtractedValue::derived(Concept::OperatingMarginPct, 12.73),
        ]);
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["fields_extracted"], 2);
        assert_eq!(json["data"]["Average Employees"], 11);
        assert_eq!(json["data"]["Operating Margin %"], 12.73);
        assert!(json.get("provenance").is_none());
        assert!(json.get("filing_date").is_none());
    }
}
