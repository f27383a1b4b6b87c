//! Declarative scenario definitions (YAML).

use crate::ThisError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fs, path::Path};

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

///
/// ScenarioError
///

#[derive(Debug, ThisError)]
pub enum ScenarioError {
    #[error("cannot read scenario '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("scenario must have a 'timeline' section")]
    MissingTimeline,

    #[error("invalid base_time '{0}': expected RFC 3339 or an ISO date/time")]
    BaseTime(String),
}

///
/// Scenario
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub scenario: ScenarioMeta,

    #[serde(default)]
    pub inputs: IndexMap<String, Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<Customer>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,

    #[serde(default)]
    pub timeline: Option<Vec<TimelineEntry>>,
}

impl Scenario {
    pub fn from_yaml(yaml: &str) -> Result<Self, ScenarioError> {
        let scenario: Self = serde_yaml::from_str(yaml)?;
        if scenario.timeline.is_none() {
            return Err(ScenarioError::MissingTimeline);
        }

        Ok(scenario)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        let yaml = fs::read_to_string(path).map_err(|source| ScenarioError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_yaml(&yaml)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.scenario.name.as_deref().unwrap_or("unnamed")
    }

    /// Timeline entries in day order; entries on the same day keep their
    /// declared order.
    #[must_use]
    pub fn ordered_timeline(&self) -> Vec<&TimelineEntry> {
        let mut entries: Vec<_> = self.timeline.iter().flatten().collect();
        entries.sort_by_key(|e| e.day);

        entries
    }

    /// Parsed `base_time`, if the scenario sets one. Naive values are UTC.
    pub fn base_time(&self) -> Result<Option<DateTime<Utc>>, ScenarioError> {
        self.base_time.as_deref().map(parse_base_time).transpose()
    }
}

// parse_base_time
fn parse_base_time(raw: &str) -> Result<DateTime<Utc>, ScenarioError> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }

    Err(ScenarioError::BaseTime(raw.to_string()))
}

///
/// ScenarioMeta
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScenarioMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

///
/// Customer
/// free-form customer attributes (`email`, `telegram`, `type`, ...)
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Customer(pub IndexMap<String, Value>);

impl Customer {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

///
/// TimelineEntry
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TimelineEntry {
    #[serde(default)]
    pub day: u32,

    #[serde(default)]
    pub events: Vec<EventRef>,
}

///
/// EventRef
/// `Record::Variant` plus explicit parameters
///

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct EventRef {
    #[serde(rename = "type")]
    pub reference: String,

    #[serde(default)]
    pub params: IndexMap<String, Value>,

    /// Logical name of the owning entity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl EventRef {
    /// `(record, variant)`, or `None` when the reference is not exactly
    /// two non-empty `::`-separated parts.
    #[must_use]
    pub fn split(&self) -> Option<(&str, &str)> {
        let (record, variant) = self.reference.trim().split_once("::")?;

        (!record.is_empty() && !variant.is_empty() && !variant.contains("::"))
            .then_some((record, variant))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const YAML: &str = r#"
scenario:
  name: facility-happy-path
  description: one facility, one disbursal
inputs:
  facility_amount: 1000000
customer:
  email: alice@example.com
  type: individual
base_time: "2024-01-15T09:00:00"
seed: 42
timeline:
  - day: 3
    events:
      - type: CreditFacilityEvent::Activated
        entity: cf1
  - day: 0
    events:
      - type: CreditFacilityEvent::Initialized
        entity: cf1
        params:
          amount: $inputs.facility_amount
"#;

    #[test]
    fn parses_full_scenario() {
        let scenario = Scenario::from_yaml(YAML).expect("parse");

        assert_eq!(scenario.name(), "facility-happy-path");
        assert_eq!(scenario.seed, Some(42));
        assert_eq!(scenario.inputs["facility_amount"], 1_000_000);
        assert_eq!(
            scenario.customer.as_ref().and_then(|c| c.get("type")),
            Some(&Value::from("individual"))
        );
        assert_eq!(
            scenario.base_time().expect("base time"),
            Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).single()
        );

        let days: Vec<_> = scenario.ordered_timeline().iter().map(|e| e.day).collect();
        assert_eq!(days, [0, 3]);
    }

    #[test]
    fn timeline_is_required() {
        let err = Scenario::from_yaml("scenario:\n  name: empty\n").unwrap_err();

        assert!(matches!(err, ScenarioError::MissingTimeline));
    }

    #[test]
    fn base_time_accepts_rfc3339_and_dates() {
        let utc = |y, m, d, h| Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().expect("valid");

        assert_eq!(
            parse_base_time("2024-03-01T12:00:00+02:00").expect("rfc3339"),
            utc(2024, 3, 1, 10)
        );
        assert_eq!(parse_base_time("2024-03-01").expect("date"), utc(2024, 3, 1, 0));
        assert!(matches!(
            parse_base_time("yesterday"),
            Err(ScenarioError::BaseTime(_))
        ));
    }

    #[test]
    fn event_ref_split() {
        let r = |s: &str| EventRef {
            reference: s.to_string(),
            ..EventRef::default()
        };

        assert_eq!(r("DepositEvent::Initialized").split(), Some(("DepositEvent", "Initialized")));
        assert_eq!(r("DepositEvent").split(), None);
        assert_eq!(r("A::B::C").split(), None);
        assert_eq!(r("::B").split(), None);
    }
}
