use std::fs;
use std::path::PathBuf;

use super::document::IxbrlDocument;

pub fn get_test_file_path(filename: &str) -> PathBuf {
    PathBuf::from("src/ixbrl/tests/data").join(filename)
}

pub fn read_test_file(filename: &str) -> String {
    fs::read_to_string(get_test_file_path(filename))
        .unwrap_or_else(|e| panic!("Failed to read test file {}: {}", filename, e))
}

/// Minimal registries: a current and a prior year, both as durations and
/// balance sheet instants, plus GBP and pure units.
pub const RESOURCES: &str = r#"
    <xbrli:context id="cy"><xbrli:entity><xbrli:identifier scheme="http://www.companieshouse.gov.uk/">01234567</xbrli:identifier></xbrli:entity>
      <xbrli:period><xbrli:startDate>2023-01-01</xbrli:startDate><xbrli:endDate>2023-12-31</xbrli:endDate></xbrli:period></xbrli:context>
    <xbrli:context id="py"><xbrli:entity><xbrli:identifier scheme="http://www.companieshouse.gov.uk/">01234567</xbrli:identifier></xbrli:entity>
      <xbrli:period><xbrli:startDate>2022-01-01</xbrli:startDate><xbrli:endDate>2022-12-31</xbrli:endDate></xbrli:period></xbrli:context>
    <xbrli:context id="cy_bs"><xbrli:entity><xbrli:identifier scheme="http://www.companieshouse.gov.uk/">01234567</xbrli:identifier></xbrli:entity>
      <xbrli:period><xbrli:instant>2023-12-31</xbrli:instant></xbrli:period></xbrli:context>
    <xbrli:unit id="GBP"><xbrli:measure>iso4217:GBP</xbrli:measure></xbrli:unit>
    <xbrli:unit id="pure"><xbrli:measure>xbrli:pure</xbrli:measure></xbrli:unit>"#;

/// Wraps tagged body markup in a document carrying [`RESOURCES`].
pub fn ixbrl_document(body: &str) -> IxbrlDocument {
    IxbrlDocument::parse(&format!(
        "<html><body><div style=\"display:none\"><ix:header><ix:resources>{}</ix:resources></ix:header></div>{}</body></html>",
        RESOURCES, body
    ))
}
