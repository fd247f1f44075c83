use chrono::NaiveDate;
use scraper::ElementRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::concept::PeriodKind;
use super::dictionary::{
    DimensionMember, CONSOLIDATED_MEMBERS, CONSOLIDATION_AXES, ENTITY_ONLY_MEMBERS,
};
use super::document::{attribute, descendants_named, element_text, strip_prefix};
use crate::error::{ExtractError, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Period {
    Instant(NaiveDate),
    Duration { start: NaiveDate, end: NaiveDate },
    Forever,
}

/// One (axis, member) pair from a context's segment or scenario.
///
/// Both halves are local names. Typed members keep their text content.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Qualifier {
    pub axis: String,
    pub member: String,
}

impl Qualifier {
    fn matches(&self, required: &DimensionMember) -> bool {
        self.axis == required.axis && self.member == required.member
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub period: Period,
    pub qualifiers: Vec<Qualifier>,
}

impl Context {
    pub fn from_element(element: &ElementRef<'_>) -> Result<Self> {
        let id = attribute(element, "id")
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| ExtractError::malformed("context without id"))?
            .trim()
            .to_string();

        let period = parse_period(element, &id)?;

        let mut qualifiers = Vec::new();
        for name in ["explicitMember", "typedMember"] {
            for member in descendants_named(element, name) {
                let Some(dimension) = attribute(&member, "dimension") else {
                    log::warn!("Context {}: {} without dimension ignored", id, name);
                    continue;
                };
                let text = element_text(&member);
                qualifiers.push(Qualifier {
                    axis: strip_prefix(dimension.trim()).to_string(),
                    member: strip_prefix(&text).to_string(),
                });
            }
        }

        log::debug!("Context {}: {:?} {:?}", id, period, qualifiers);

        Ok(Self {
            id,
            period,
            qualifiers,
        })
    }

    pub fn period_kind(&self) -> Option<PeriodKind> {
        match self.period {
            Period::Instant(_) => Some(PeriodKind::Instant),
            Period::Duration { .. } => Some(PeriodKind::Duration),
            Period::Forever => None,
        }
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.period {
            Period::Instant(date) => Some(date),
            Period::Duration { end, .. } => Some(end),
            Period::Forever => None,
        }
    }
}

fn parse_period(context: &ElementRef<'_>, id: &str) -> Result<Period> {
    let period = descendants_named(context, "period")
        .next()
        .ok_or_else(|| ExtractError::malformed(format!("context {} has no period", id)))?;

    let date_of = |name: &str| -> Result<Option<NaiveDate>> {
        match descendants_named(&period, name).next() {
            Some(e) => parse_date(&element_text(&e)).map(Some),
            None => Ok(None),
        }
    };

    if let Some(instant) = date_of("instant")? {
        return Ok(Period::Instant(instant));
    }
    match (date_of("startDate")?, date_of("endDate")?) {
        (Some(start), Some(end)) => Ok(Period::Duration { start, end }),
        _ if descendants_named(&period, "forever").next().is_some() => Ok(Period::Forever),
        _ => Err(ExtractError::malformed(format!(
            "context {} has an incomplete period",
            id
        ))),
    }
}

/// Parses an XBRL date, ignoring any time-of-day suffix.
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    let date_part = text.get(..10).unwrap_or(text);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| ExtractError::malformed(format!("invalid date {:?}", text)))
}

/// Entity scoping a context's qualifiers express.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContextScope {
    /// Group figures, qualified by a consolidated member.
    Consolidated,
    /// No qualifiers: the reporting entity as a whole.
    Entity,
    /// The parent company's own figures in a group filing.
    EntityOnly,
    /// Any other dimensional breakdown.
    Segment,
}

impl ContextScope {
    pub fn is_whole_entity(self) -> bool {
        self != ContextScope::Segment
    }

    /// Preference among scopes reporting the same concept and period.
    ///
    /// Group filers tag both consolidated and parent-only figures; the
    /// consolidated one is "the" company's figure unless configured otherwise.
    pub fn rank(self, prefer_consolidated: bool) -> u8 {
        match (self, prefer_consolidated) {
            (ContextScope::Consolidated, true) => 3,
            (ContextScope::Entity, true) => 2,
            (ContextScope::EntityOnly, true) => 1,
            (ContextScope::Entity, false) => 3,
            (ContextScope::EntityOnly, false) => 2,
            (ContextScope::Consolidated, false) => 1,
            (ContextScope::Segment, _) => 0,
        }
    }
}

fn scope_of<'a>(qualifiers: impl Iterator<Item = &'a Qualifier>) -> ContextScope {
    let qualifiers: Vec<_> = qualifiers.collect();
    match qualifiers.as_slice() {
        [] => ContextScope::Entity,
        [q] if CONSOLIDATION_AXES.contains(&q.axis.as_str()) => {
            if CONSOLIDATED_MEMBERS.contains(&q.member.as_str()) {
                ContextScope::Consolidated
            } else if ENTITY_ONLY_MEMBERS.contains(&q.member.as_str()) {
                ContextScope::EntityOnly
            } else {
                ContextScope::Segment
            }
        }
        _ => ContextScope::Segment,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextClass {
    pub period_kind: Option<PeriodKind>,
    pub is_current: bool,
    pub scope: ContextScope,
}

impl ContextClass {
    pub fn is_consolidated(&self) -> bool {
        self.scope == ContextScope::Consolidated
    }
}

/// Decides which contexts belong to the current reporting period.
///
/// The reporting date is the latest end date among whole-entity duration
/// contexts, or among whole-entity instants when the document has no
/// duration contexts. Every extracted fact must sit on that date, so one
/// record never mixes current and prior figures.
#[derive(Debug, Clone)]
pub struct ContextResolver {
    reporting_date: Option<NaiveDate>,
    classes: HashMap<String, ContextClass>,
}

impl ContextResolver {
    pub fn new<'a>(contexts: impl IntoIterator<Item = &'a Context>) -> Self {
        let contexts: Vec<&Context> = contexts.into_iter().collect();

        let latest = |kind: PeriodKind| {
            contexts
                .iter()
                .filter(|c| c.period_kind() == Some(kind))
                .filter(|c| scope_of(c.qualifiers.iter()).is_whole_entity())
                .filter_map(|c| c.end_date())
                .max()
        };
        let reporting_date = latest(PeriodKind::Duration).or_else(|| latest(PeriodKind::Instant));

        log::debug!("Reporting date: {:?}", reporting_date);

        let mut resolver = Self {
            reporting_date,
            classes: HashMap::new(),
        };
        for context in contexts {
            let class = resolver.classify(context);
            resolver.classes.insert(context.id.clone(), class);
        }
        resolver
    }

    pub fn reporting_date(&self) -> Option<NaiveDate> {
        self.reporting_date
    }

    pub fn is_current(&self, context: &Context) -> bool {
        self.reporting_date.is_some() && context.end_date() == self.reporting_date
    }

    pub fn classify(&self, context: &Context) -> ContextClass {
        ContextClass {
            period_kind: context.period_kind(),
            is_current: self.is_current(context),
            scope: scope_of(context.qualifiers.iter()),
        }
    }

    /// Classification computed when the resolver was built.
    pub fn class_of(&self, context_id: &str) -> Option<ContextClass> {
        self.classes.get(context_id).copied()
    }

    /// Scope of a context once the qualifier a candidate requires is set
    /// aside, or `None` when the context does not carry that qualifier.
    pub fn scope_for(
        &self,
        context: &Context,
        required: Option<&DimensionMember>,
    ) -> Option<ContextScope> {
        match required {
            None => Some(scope_of(context.qualifiers.iter())),
            Some(required) => {
                if !context.qualifiers.iter().any(|q| q.matches(required)) {
                    return None;
                }
                Some(scope_of(
                    context.qualifiers.iter().filter(|q| !q.matches(required)),
                ))
            }
        }
    }
}
