use chrono::NaiveDate;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use super::concept::{Concept, Derivation, ValueKind};
use super::context::{ContextResolver, ContextScope};
use super::dictionary::{candidates_for, TagCandidate};
use super::facts::{Fact, FactIndex, FactKind, Measure};
use crate::core::config::ExtractorConfig;
use crate::error::{ExtractError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Date(NaiveDate),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Date(_) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    /// Matched the most preferred tag for the concept.
    Exact,
    /// Matched a later candidate, or every candidate was exhausted.
    FallbackTag,
    Derived,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractedValue {
    pub concept: Concept,
    pub value: Option<Value>,
    /// Document order of the fact the value was read from.
    pub source_fact: Option<usize>,
    pub confidence: Confidence,
}

impl ExtractedValue {
    pub fn absent(concept: Concept) -> Self {
        Self {
            concept,
            value: None,
            source_fact: None,
            confidence: Confidence::FallbackTag,
        }
    }

    pub fn date(concept: Concept, date: Option<NaiveDate>) -> Self {
        match date {
            Some(date) => Self {
                concept,
                value: Some(Value::Date(date)),
                source_fact: None,
                confidence: Confidence::Exact,
            },
            None => Self::absent(concept),
        }
    }

    pub fn derived(concept: Concept, value: f64) -> Self {
        Self {
            concept,
            value: Some(Value::Number(value)),
            source_fact: None,
            confidence: Confidence::Derived,
        }
    }

    pub fn number(&self) -> Option<f64> {
        self.value.as_ref().and_then(Value::as_number)
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}

/// Picks the fact that answers each concept for one document.
pub struct ValueExtractor<'a> {
    index: &'a FactIndex,
    resolver: &'a ContextResolver,
    config: &'a ExtractorConfig,
    filing_date: Option<NaiveDate>,
}

impl<'a> ValueExtractor<'a> {
    pub fn new(index: &'a FactIndex, resolver: &'a ContextResolver, config: &'a ExtractorConfig) -> Self {
        Self {
            index,
            resolver,
            config,
            filing_date: None,
        }
    }

    /// Date the filing was registered, reported as Accounts Filed Date.
    pub fn with_filing_date(mut self, filing_date: Option<NaiveDate>) -> Self {
        self.filing_date = filing_date;
        self
    }

    pub fn extract(&self, concept: Concept) -> ExtractedValue {
        match concept {
            Concept::BalanceSheetDate => match (self.resolver.reporting_date(), self.filing_date) {
                (Some(date), _) => ExtractedValue::date(concept, Some(date)),
                (None, Some(filed)) => {
                    log::debug!("No reporting period in contexts, using filing date {}", filed);
                    ExtractedValue {
                        confidence: Confidence::FallbackTag,
                        ..ExtractedValue::date(concept, Some(filed))
                    }
                }
                (None, None) => ExtractedValue::absent(concept),
            },
            Concept::AccountsFiledDate => ExtractedValue::date(concept, self.filing_date),
            _ if concept.derivation() == Derivation::Computed => ExtractedValue::absent(concept),
            _ => self.extract_tagged(concept),
        }
    }

    /// Every concept read from the document, in output order.
    pub fn extract_all(&self) -> Vec<ExtractedValue> {
        [Concept::AccountsFiledDate, Concept::BalanceSheetDate]
            .into_iter()
            .chain(Concept::tagged())
            .map(|concept| self.extract(concept))
            .collect()
    }

    /// First candidate, in preference order, that yields a usable fact.
    fn extract_tagged(&self, concept: Concept) -> ExtractedValue {
        let candidates = candidates_for(concept);
        let found = candidates
            .iter()
            .enumerate()
            .find_map(|(rank, candidate)| {
                self.best_fact(concept, candidate).map(|(fact, value)| ExtractedValue {
                    concept,
                    value: Some(Value::Number(value)),
                    source_fact: Some(fact.element_order),
                    confidence: if rank == 0 {
                        Confidence::Exact
                    } else {
                        Confidence::FallbackTag
                    },
                })
            });

        match found {
            Some(extracted) => {
                log::debug!(
                    "{}: {:?} from fact #{:?} ({:?})",
                    concept,
                    extracted.value,
                    extracted.source_fact,
                    extracted.confidence
                );
                extracted
            }
            None => {
                log::debug!("{}: no usable fact among {}", concept, candidates.iter().join(", "));
                ExtractedValue::absent(concept)
            }
        }
    }

    /// Current-period fact for one candidate tag.
    ///
    /// Among facts that pass, the best scope wins and then the later one in
    /// document order, so a restated duplicate replaces the earlier figure.
    fn best_fact(&self, concept: Concept, candidate: &TagCandidate) -> Option<(&'a Fact, f64)> {
        let period_kind = concept.period_kind()?;
        let prefer_consolidated = self.config.prefer_consolidated;

        self.index
            .facts_for_tag(candidate.name)
            .filter(|fact| fact.kind == FactKind::Numeric && !fact.is_nil)
            .filter_map(|fact| {
                let class = self.resolver.class_of(&fact.context_ref)?;
                if class.period_kind != Some(period_kind) || !class.is_current {
                    return None;
                }
                let scope = match &candidate.member {
                    None => class.scope,
                    Some(member) => {
                        let context = self.index.context_of(fact)?;
                        self.resolver.scope_for(context, Some(member))?
                    }
                };
                if !scope.is_whole_entity() {
                    return None;
                }
                if let Err(e) = self.check_unit(concept, fact) {
                    log::warn!("{}: {}", concept, e);
                    return None;
                }
                match fact.normalized_value() {
                    Ok(value) => Some((fact, scope, value)),
                    Err(e) => {
                        log::warn!("{}: fact {} #{}: {}", concept, fact.tag_name, fact.element_order, e);
                        None
                    }
                }
            })
            .max_by_key(|(fact, scope, _): &(&Fact, ContextScope, f64)| {
                (scope.rank(prefer_consolidated), fact.element_order)
            })
            .map(|(fact, _, value)| (fact, value))
    }

    fn check_unit(&self, concept: Concept, fact: &Fact) -> Result<()> {
        let unsupported = |unit: String| ExtractError::UnsupportedUnit {
            fact: fact.tag_name.clone(),
            unit,
        };
        let Some(unit) = self.index.unit_of(fact) else {
            return Err(unsupported("none".to_string()));
        };
        match (concept.value_kind(), &unit.measure) {
            (ValueKind::Monetary, Measure::Currency(code))
                if code.eq_ignore_ascii_case(&self.config.reporting_currency) =>
            {
                Ok(())
            }
            (ValueKind::Count, measure) if !measure.is_currency() => Ok(()),
            (_, measure) => Err(unsupported(measure.to_string())),
        }
    }
}
