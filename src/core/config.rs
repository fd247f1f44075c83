use anyhow::{anyhow, Result};

pub const DEFAULT_REPORTING_CURRENCY: &str = "GBP";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtractorConfig {
    /// ISO 4217 code monetary facts must be reported in.
    pub reporting_currency: String,
    pub prefer_consolidated: bool,
    pub include_provenance: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            reporting_currency: DEFAULT_REPORTING_CURRENCY.to_string(),
            prefer_consolidated: true,
            include_provenance: false,
        }
    }
}

impl ExtractorConfig {
    pub fn from_env() -> Result<Self> {
        let reporting_currency = std::env::var("IXBRL_REPORTING_CURRENCY")
            .unwrap_or_else(|_| DEFAULT_REPORTING_CURRENCY.to_string());
        let reporting_currency = parse_currency(&reporting_currency)?;

        let prefer_consolidated = match std::env::var("IXBRL_PREFER_CONSOLIDATED") {
            Ok(v) => parse_flag("IXBRL_PREFER_CONSOLIDATED", &v)?,
            Err(_) => true,
        };

        let include_provenance = match std::env::var("IXBRL_INCLUDE_PROVENANCE") {
            Ok(v) => parse_flag("IXBRL_INCLUDE_PROVENANCE", &v)?,
            Err(_) => false,
        };

        Ok(Self {
            reporting_currency,
            prefer_consolidated,
            include_provenance,
        })
    }

    pub fn with_provenance(mut self, include: bool) -> Self {
        self.include_provenance = include;
        self
    }
}

fn parse_currency(raw: &str) -> Result<String> {
    let code = raw.trim().to_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(anyhow!(
            "IXBRL_REPORTING_CURRENCY must be a 3-letter ISO 4217 code: {}",
            raw
        ));
    }
    Ok(code)
}

fn parse_flag(name: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{} must be a boolean, got {:?}", name, raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ExtractorConfig::default();
        assert_eq!(config.reporting_currency, "GBP");
        assert!(config.prefer_consolidated);
        assert!(!config.include_provenance);
    }

    #[test]
    fn test_parse_currency() {
        assert_eq!(parse_currency(" eur ").unwrap(), "EUR");
        assert!(parse_currency("POUNDS").is_err());
        assert!(parse_currency("G1P").is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("X", "Yes").unwrap());
        assert!(!parse_flag("X", "0").unwrap());
        assert!(parse_flag("X", "maybe").is_err());
    }
}
