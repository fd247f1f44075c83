pub mod assembler;
pub mod concept;
pub mod context;
pub mod derived;
pub mod dictionary;
pub mod document;
pub mod extractor;
pub mod facts;
pub mod numbers;

#[cfg(test)]
pub mod tests;

use std::path::Path;

pub use assembler::{ExtractionResult, FieldValue, FilingMetadata, ResultAssembler, Status};
pub use concept::Concept;
pub use context::{ContextResolver, ContextScope};
pub use document::IxbrlDocument;
pub use extractor::{Confidence, ExtractedValue, Value, ValueExtractor};
pub use facts::{Fact, FactIndex};

use crate::core::config::ExtractorConfig;
use crate::error::Result;

/// Extracts the financial record from the text of an iXBRL document.
pub fn extract_financials(
    content: &str,
    metadata: &FilingMetadata,
    config: &ExtractorConfig,
) -> Result<ExtractionResult> {
    let document = IxbrlDocument::parse(content);
    extract_from_document(&document, metadata, config)
}

/// Extracts the financial record from an already parsed document.
///
/// Fails only when the document is malformed; anything that merely cannot
/// be found is left out of the record.
pub fn extract_from_document(
    document: &IxbrlDocument,
    metadata: &FilingMetadata,
    config: &ExtractorConfig,
) -> Result<ExtractionResult> {
    let index = FactIndex::build(document)?;
    let mapped = index
        .facts()
        .iter()
        .filter(|f| !dictionary::concepts_for_tag(&f.local_name).is_empty())
        .count();
    log::debug!(
        "{} of {} facts match tag dictionary v{}",
        mapped,
        index.len(),
        dictionary::DICTIONARY_VERSION
    );
    let resolver = ContextResolver::new(index.contexts());
    let metadata = with_company_number(metadata, &index);

    let mut values = ValueExtractor::new(&index, &resolver, config)
        .with_filing_date(metadata.filing_date)
        .extract_all();
    let derived = derived::compute(&values);
    values.extend(derived);

    let mut assembler = ResultAssembler::new(&metadata);
    if config.include_provenance {
        assembler = assembler.with_provenance(&index);
    }
    Ok(assembler.assemble(values))
}

pub fn extract_file(
    path: impl AsRef<Path>,
    metadata: &FilingMetadata,
    config: &ExtractorConfig,
) -> Result<ExtractionResult> {
    let path = path.as_ref();
    log::debug!("Reading {:?}", path);
    let content = std::fs::read_to_string(path)?;
    extract_financials(&content, metadata, config)
}

/// Falls back to the number tagged in the document when the caller has none.
fn with_company_number(metadata: &FilingMetadata, index: &FactIndex) -> FilingMetadata {
    let mut metadata = metadata.clone();
    if metadata.company_number.trim().is_empty() {
        match index.text_fact(dictionary::COMPANY_NUMBER_TAG) {
            Some(fact) => metadata.company_number = fact.raw_text.clone(),
            None => log::warn!("No company number supplied or tagged"),
        }
    }
    metadata
}

#[cfg(test)]
mod pipeline_tests {
    use super::*;
    use crate::error::ExtractError;
    use crate::ixbrl::tests::{ixbrl_document, read_test_file};
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_full_frs102_group_filing() {
        let content = read_test_file("full_frs102.xhtml");
        let metadata = FilingMetadata::new("01234567").with_filing_date(date(2024, 9, 30));
        let result = extract_financials(&content, &metadata, &ExtractorConfig::default()).unwrap();

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.field("Revenue"), Some(&FieldValue::Integer(2_450_000)));
        assert_eq!(result.field("Operating Profit"), Some(&FieldValue::Integer(312_000)));
        assert_eq!(result.field("Profit Before Tax"), Some(&FieldValue::Integer(290_000)));
        assert_eq!(result.field("Net Profit"), Some(&FieldValue::Integer(230_000)));
        assert_eq!(result.field("EBITDA Estimate"), Some(&FieldValue::Integer(445_000)));
        assert_eq!(result.field("EBITDA Margin %"), Some(&FieldValue::Decimal(18.16)));
        assert_eq!(result.field("Operating Margin %"), Some(&FieldValue::Decimal(12.73)));
        assert_eq!(result.field("Fixed Assets"), Some(&FieldValue::Integer(1_200_000)));
        assert_eq!(result.field("Current Assets"), Some(&FieldValue::Integer(900_000)));
        assert_eq!(result.field("Cash"), Some(&FieldValue::Integer(350_000)));
        assert_eq!(result.field("Short Term Creditors"), Some(&FieldValue::Integer(400_000)));
        assert_eq!(result.field("Long Term Creditors"), Some(&FieldValue::Integer(150_000)));
        assert_eq!(result.field("Net Assets"), Some(&FieldValue::Integer(1_550_000)));
        assert_eq!(result.field("Shareholders Funds"), Some(&FieldValue::Integer(1_550_000)));
        assert_eq!(result.field("Average Employees"), Some(&FieldValue::Integer(42)));
        assert_eq!(
            result.field("Balance Sheet Date"),
            Some(&FieldValue::Text("2023-12-31".to_string()))
        );
        assert_eq!(
            result.field("Accounts Filed Date"),
            Some(&FieldValue::Text("2024-09-30".to_string()))
        );
        assert!(result.field("Total Creditors").is_none());
        assert_eq!(result.fields_extracted, 17);
    }

    #[test]
    fn test_micro_entity_balance_sheet_only() {
        let content = read_test_file("micro_frs105.xhtml");
        let result =
            extract_financials(&content, &FilingMetadata::default(), &ExtractorConfig::default())
                .unwrap();

        assert_eq!(result.status, Status::Success);
        assert_eq!(result.company_number, "SC654321");
        assert_eq!(
            result.field("Balance Sheet Date"),
            Some(&FieldValue::Text("2023-03-31".to_string()))
        );
        assert_eq!(result.field("Net Assets"), Some(&FieldValue::Integer(-2_500)));
        assert_eq!(result.field("Shareholders Funds"), Some(&FieldValue::Integer(-2_500)));
        assert_eq!(result.field("Short Term Creditors"), Some(&FieldValue::Integer(31_150)));
        assert_eq!(result.field("Average Employees"), Some(&FieldValue::Integer(3)));
        assert!(result.field("Revenue").is_none());
        assert!(result.field("EBITDA Estimate").is_none());
        assert!(result.field("EBITDA Margin %").is_none());
        assert_eq!(result.fields_extracted, 8);
    }

    #[test]
    fn test_zero_facts_is_no_data() {
        let document = ixbrl_document("");
        let metadata = FilingMetadata::new("01234567").with_filing_date(date(2024, 1, 31));
        let result = extract_from_document(&document, &metadata, &ExtractorConfig::default()).unwrap();

        assert_eq!(result.status, Status::NoData);
        assert_eq!(result.fields_extracted, 0);
    }

    #[test]
    fn test_company_number_split_across_spans() {
        let document = ixbrl_document(
            r#"<p>Registered number: <ix:nonNumeric name="bus:UKCompaniesHouseRegisteredNumber" contextRef="cy"><span>sc12</span><span>3456</span></ix:nonNumeric></p>
               <ix:nonFraction name="core:TurnoverRevenue" contextRef="cy" unitRef="GBP">5,000</ix:nonFraction>"#,
        );
        let result =
            extract_from_document(&document, &FilingMetadata::default(), &ExtractorConfig::default())
                .unwrap();
        assert_eq!(result.company_number, "SC123456");
    }

    #[test]
    fn test_untagged_document_is_no_data() {
        let result = extract_financials(
            "<html><body><h1>Abbreviated accounts</h1><p>Turnover 1,000</p></body></html>",
            &FilingMetadata::new("01234567"),
            &ExtractorConfig::default(),
        )
        .unwrap();
        assert_eq!(result.status, Status::NoData);
    }

    #[test]
    fn test_missing_context_registry_fails() {
        let html = r#"<html><body><ix:header><ix:resources>
              <xbrli:unit id="GBP"><xbrli:measure>iso4217:GBP</xbrli:measure></xbrli:unit>
            </ix:resources></ix:header>
            <ix:nonFraction name="core:TurnoverRevenue" contextRef="cy" unitRef="GBP">1</ix:nonFraction>
            </body></html>"#;
        let err = extract_financials(html, &FilingMetadata::new("1"), &ExtractorConfig::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::MalformedDocument(_)));
    }

    #[test]
    fn test_provenance() {
        let document = ixbrl_document(
            r#"<ix:nonFraction name="core:TurnoverRevenue" contextRef="cy" unitRef="GBP">5,000</ix:nonFraction>"#,
        );
        let config = ExtractorConfig::default().with_provenance(true);
        let result = extract_from_document(&document, &FilingMetadata::new("1"), &config).unwrap();

        let revenue = result
            .provenance
            .iter()
            .find(|p| p.concept == Concept::Revenue)
            .unwrap();
        assert_eq!(revenue.tag_name.as_deref(), Some("core:TurnoverRevenue"));
        assert_eq!(revenue.context_ref.as_deref(), Some("cy"));
        assert_eq!(revenue.confidence, Confidence::Exact);
    }
}
