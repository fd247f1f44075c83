use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::context::Context;
use super::document::{attribute, descendants_named, element_text, has_local_name, strip_prefix, IxbrlDocument};
use super::numbers::{normalize, parse_numeric, scale_exponent, Decimals, Sign};
use crate::error::{ExtractError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Measure {
    /// ISO 4217 code, upper-cased.
    Currency(String),
    Pure,
    Shares,
    Other(String),
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Measure::Currency(code) => write!(f, "iso4217:{}", code),
            Measure::Pure => write!(f, "xbrli:pure"),
            Measure::Shares => write!(f, "xbrli:shares"),
            Measure::Other(s) => write!(f, "{}", s),
        }
    }
}

impl Measure {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        let (prefix, local) = text.split_once(':').unwrap_or(("", text));
        if prefix.eq_ignore_ascii_case("iso4217")
            || (prefix.is_empty() && local.len() == 3 && local.chars().all(|c| c.is_ascii_uppercase()))
        {
            return Measure::Currency(local.to_uppercase());
        }
        match local.to_lowercase().as_str() {
            "pure" => Measure::Pure,
            "shares" => Measure::Shares,
            _ => Measure::Other(text.to_string()),
        }
    }

    pub fn is_currency(&self) -> bool {
        matches!(self, Measure::Currency(_))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: String,
    pub measure: Measure,
}

impl Unit {
    pub fn from_element(element: &ElementRef<'_>) -> Result<Self> {
        let id = attribute(element, "id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ExtractError::malformed("unit without id"))?
            .to_string();

        // Ratios (divide) are kept opaque; none of the target concepts use them.
        let measure = if descendants_named(element, "divide").next().is_some() {
            Measure::Other(element_text(element))
        } else {
            let measure = descendants_named(element, "measure")
                .next()
                .ok_or_else(|| ExtractError::malformed(format!("unit {} has no measure", id)))?;
            Measure::parse(&element_text(&measure))
        };

        log::debug!("Unit {}: {}", id, measure);

        Ok(Self { id, measure })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FactKind {
    Numeric,
    Text,
}

/// One tagged value as it appears in the document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fact {
    /// Name as written, e.g. `core:TurnoverRevenue`.
    pub tag_name: String,
    pub local_name: String,
    pub context_ref: String,
    pub unit_ref: Option<String>,
    pub decimals: Option<Decimals>,
    pub scale: Option<i32>,
    pub format: Option<String>,
    pub raw_text: String,
    pub sign: Sign,
    pub is_nil: bool,
    pub kind: FactKind,
    /// Position among all tagged elements in document order.
    pub element_order: usize,
}

impl Fact {
    fn from_element(element: &ElementRef<'_>, kind: FactKind, element_order: usize) -> Option<Self> {
        let Some(tag_name) = attribute(element, "name").map(str::trim).filter(|n| !n.is_empty()) else {
            log::warn!("Tagged element #{} without name skipped", element_order);
            return None;
        };
        let Some(context_ref) = attribute(element, "contextRef").map(str::trim) else {
            log::warn!("Fact {} #{} without contextRef skipped", tag_name, element_order);
            return None;
        };

        let decimals = attribute(element, "decimals").and_then(|d| match d.parse::<Decimals>() {
            Ok(decimals) => Some(decimals),
            Err(e) => {
                log::warn!("Fact {} #{}: {}", tag_name, element_order, e);
                None
            }
        });
        let scale = attribute(element, "scale").and_then(|s| s.trim().parse::<i32>().ok());
        let is_nil = attribute(element, "xsi:nil")
            .or_else(|| attribute(element, "nil"))
            .map(|v| v.trim().eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        Some(Self {
            tag_name: tag_name.to_string(),
            local_name: strip_prefix(tag_name).to_string(),
            context_ref: context_ref.to_string(),
            unit_ref: attribute(element, "unitRef").map(|u| u.trim().to_string()),
            decimals,
            scale,
            format: attribute(element, "format").map(str::to_string),
            raw_text: if is_nil { String::new() } else { element_text(element) },
            sign: Sign::from_attribute(attribute(element, "sign")),
            is_nil,
            kind,
            element_order,
        })
    }

    /// Displayed value scaled to units and signed.
    pub fn normalized_value(&self) -> Result<f64> {
        if self.kind != FactKind::Numeric || self.is_nil {
            return Err(ExtractError::InvalidNumber(self.raw_text.clone()));
        }
        let magnitude = parse_numeric(&self.raw_text, self.format.as_deref())?;
        let exponent = scale_exponent(self.scale, self.decimals);
        Ok(normalize(magnitude, exponent, self.sign))
    }
}

/// Every tagged fact of one document, with its context and unit registries.
#[derive(Debug, Clone, Default)]
pub struct FactIndex {
    facts: Vec<Fact>,
    by_tag: HashMap<String, Vec<usize>>,
    contexts: HashMap<String, Context>,
    units: HashMap<String, Unit>,
}

impl FactIndex {
    /// Indexes a document.
    ///
    /// A document without any inline XBRL markup yields an empty index. One
    /// that has markup but lacks its context or unit registry is malformed.
    pub fn build(document: &IxbrlDocument) -> Result<Self> {
        let context_elements: Vec<_> = document.elements_named("context").collect();
        let unit_elements: Vec<_> = document.elements_named("unit").collect();
        let fact_elements: Vec<_> = document
            .elements()
            .filter_map(|e| {
                if has_local_name(&e, "nonFraction") {
                    Some((e, FactKind::Numeric))
                } else if has_local_name(&e, "nonNumeric") {
                    Some((e, FactKind::Text))
                } else {
                    None
                }
            })
            .collect();

        if context_elements.is_empty()
            && unit_elements.is_empty()
            && fact_elements.is_empty()
            && !document.has_inline_markup()
        {
            log::info!("Document carries no inline XBRL markup");
            return Ok(Self::default());
        }
        if context_elements.is_empty() {
            return Err(ExtractError::malformed("no context registry"));
        }
        if unit_elements.is_empty() {
            return Err(ExtractError::malformed("no unit registry"));
        }

        let mut index = Self::default();

        for element in &context_elements {
            let context = Context::from_element(element)?;
            if index.contexts.contains_key(&context.id) {
                log::warn!("Duplicate context {} ignored", context.id);
                continue;
            }
            index.contexts.insert(context.id.clone(), context);
        }

        for element in &unit_elements {
            let unit = Unit::from_element(element)?;
            if index.units.contains_key(&unit.id) {
                log::warn!("Duplicate unit {} ignored", unit.id);
                continue;
            }
            index.units.insert(unit.id.clone(), unit);
        }

        for (order, (element, kind)) in fact_elements.iter().enumerate() {
            let Some(fact) = Fact::from_element(element, *kind, order) else {
                continue;
            };
            if !index.contexts.contains_key(&fact.context_ref) {
                log::warn!(
                    "Fact {} #{} references unknown context {}",
                    fact.tag_name,
                    order,
                    fact.context_ref
                );
                continue;
            }
            match (&fact.unit_ref, fact.kind) {
                (Some(unit_ref), _) if !index.units.contains_key(unit_ref) => {
                    log::warn!(
                        "Fact {} #{} references unknown unit {}",
                        fact.tag_name,
                        order,
                        unit_ref
                    );
                    continue;
                }
                (None, FactKind::Numeric) => {
                    log::warn!("Numeric fact {} #{} without unitRef", fact.tag_name, order);
                    continue;
                }
                _ => {}
            }

            log::debug!(
                "Fact: {} {:?} {} {}",
                fact.tag_name,
                fact.raw_text,
                fact.context_ref,
                fact.unit_ref.as_deref().unwrap_or("no unit")
            );

            index
                .by_tag
                .entry(fact.local_name.clone())
                .or_default()
                .push(index.facts.len());
            index.facts.push(fact);
        }

        log::debug!(
            "Indexed {} facts, {} contexts, {} units",
            index.facts.len(),
            index.contexts.len(),
            index.units.len()
        );

        Ok(index)
    }

    /// Facts with the given local name, in document order.
    pub fn facts_for_tag<'a>(&'a self, local_name: &str) -> impl Iterator<Item = &'a Fact> + 'a {
        self.by_tag
            .get(local_name)
            .into_iter()
            .flatten()
            .map(move |&i| &self.facts[i])
    }

    /// Looks up a fact by its document order.
    pub fn fact(&self, element_order: usize) -> Option<&Fact> {
        self.facts
            .binary_search_by_key(&element_order, |f| f.element_order)
            .ok()
            .map(|i| &self.facts[i])
    }

    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    pub fn context(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }

    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.values()
    }

    pub fn unit(&self, id: &str) -> Option<&Unit> {
        self.units.get(id)
    }

    pub fn unit_of(&self, fact: &Fact) -> Option<&Unit> {
        fact.unit_ref.as_deref().and_then(|id| self.unit(id))
    }

    pub fn context_of(&self, fact: &Fact) -> Option<&Context> {
        self.context(&fact.context_ref)
    }

    /// First non-empty text fact with the given local name.
    pub fn text_fact(&self, local_name: &str) -> Option<&Fact> {
        self.facts_for_tag(local_name)
            .find(|f| f.kind == FactKind::Text && !f.is_nil && !f.raw_text.is_empty())
    }

    pub fn len(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}
