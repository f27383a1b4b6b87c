use crate::ThisError;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rand_chacha::{
    ChaCha8Rng,
    rand_core::{RngCore, SeedableRng},
};
use std::collections::HashMap;
use uuid::Builder;

///
/// TrackerError
///

#[derive(Debug, ThisError)]
pub enum TrackerError {
    #[error("unknown {entity_type}: {name}")]
    NotFound { entity_type: String, name: String },

    #[error("day {day} at {hour:02}:{minute:02} is out of range from base time {base}")]
    TimeOutOfRange {
        base: DateTime<Utc>,
        day: u32,
        hour: u32,
        minute: u32,
    },
}

///
/// IdTracker
///
/// Identity and sequencing authority for one generation run. Identifiers
/// come from a seeded RNG, so the same seed and call order always produce
/// the same identifiers.
///

#[derive(Debug)]
pub struct IdTracker {
    ids: HashMap<String, HashMap<String, String>>,
    auto_names: HashMap<String, u64>,
    sequences: HashMap<String, u64>,
    base_time: DateTime<Utc>,
    rng: ChaCha8Rng,
}

impl IdTracker {
    #[must_use]
    pub fn new(base_time: DateTime<Utc>, seed: u64) -> Self {
        Self {
            ids: HashMap::new(),
            auto_names: HashMap::new(),
            sequences: HashMap::new(),
            base_time,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    #[must_use]
    pub const fn base_time(&self) -> DateTime<Utc> {
        self.base_time
    }

    ///
    /// get_or_create
    ///
    /// Identifier for `(entity_type, name)`, minted on first use. Without a
    /// name a fresh `{entity_type}_{n}` is generated, `n` counting from 1
    /// per entity type.
    ///
    pub fn get_or_create(&mut self, entity_type: &str, name: Option<&str>) -> String {
        let name = name.map_or_else(|| self.auto_name(entity_type), ToString::to_string);

        if let Some(id) = self.get(entity_type, &name) {
            return id.to_string();
        }

        let id = self.mint();
        tracing::debug!(%entity_type, %name, %id, "identifier created");
        self.ids
            .entry(entity_type.to_string())
            .or_default()
            .insert(name, id.clone());

        id
    }

    #[must_use]
    pub fn get(&self, entity_type: &str, name: &str) -> Option<&str> {
        self.ids
            .get(entity_type)
            .and_then(|names| names.get(name))
            .map(String::as_str)
    }

    pub fn require(&self, entity_type: &str, name: &str) -> Result<&str, TrackerError> {
        self.get(entity_type, name)
            .ok_or_else(|| TrackerError::NotFound {
                entity_type: entity_type.to_string(),
                name: name.to_string(),
            })
    }

    /// Next event sequence for an entity: 1, 2, 3, ...
    pub fn next_sequence(&mut self, entity_id: &str) -> u64 {
        let seq = self.sequences.entry(entity_id.to_string()).or_insert(0);
        *seq += 1;

        *seq
    }

    /// Base time offset by a day and time of day. Offsets past the
    /// representable calendar are an error.
    pub fn timestamp_for(
        &self,
        day: u32,
        hour: u32,
        minute: u32,
    ) -> Result<DateTime<Utc>, TrackerError> {
        let offset = Duration::days(i64::from(day))
            + Duration::hours(i64::from(hour))
            + Duration::minutes(i64::from(minute));

        self.base_time
            .checked_add_signed(offset)
            .ok_or(TrackerError::TimeOutOfRange {
                base: self.base_time,
                day,
                hour,
                minute,
            })
    }

    pub fn timestamp_str(&self, day: u32, hour: u32, minute: u32) -> Result<String, TrackerError> {
        Ok(self
            .timestamp_for(day, hour, minute)?
            .to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn date_for(&self, day: u32) -> Result<String, TrackerError> {
        Ok(self.timestamp_for(day, 0, 0)?.format("%Y-%m-%d").to_string())
    }

    /// Number of identifiers minted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.values().map(HashMap::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn auto_name(&mut self, entity_type: &str) -> String {
        let n = self.auto_names.entry(entity_type.to_string()).or_insert(0);
        *n += 1;

        format!("{entity_type}_{n}")
    }

    fn mint(&mut self) -> String {
        let mut bytes = [0u8; 16];
        self.rng.fill_bytes(&mut bytes);

        Builder::from_random_bytes(bytes).into_uuid().to_string()
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn tracker() -> IdTracker {
        let base = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).single().expect("valid date");
        IdTracker::new(base, 7)
    }

    #[test]
    fn get_or_create_is_idempotent_per_name() {
        let mut tracker = tracker();

        let first = tracker.get_or_create("customer", Some("c1"));
        assert_eq!(tracker.get_or_create("customer", Some("c1")), first);
        assert_eq!(tracker.get_or_create("customer", Some("c1")), first);
        assert_ne!(tracker.get_or_create("party", Some("c1")), first);
    }

    #[test]
    fn unnamed_entities_get_numbered_names() {
        let mut tracker = tracker();

        let a = tracker.get_or_create("customer", None);
        let b = tracker.get_or_create("customer", None);

        assert_ne!(a, b);
        assert_eq!(tracker.get("customer", "customer_1"), Some(a.as_str()));
        assert_eq!(tracker.get("customer", "customer_2"), Some(b.as_str()));
    }

    #[test]
    fn require_reports_missing_entities() {
        let tracker = tracker();

        let err = tracker.require("customer", "ghost").unwrap_err();
        assert_eq!(err.to_string(), "unknown customer: ghost");
    }

    #[test]
    fn identifiers_are_v4_uuids_and_reproducible() {
        let mut a = tracker();
        let mut b = tracker();

        let id = a.get_or_create("deposit", Some("d"));
        assert_eq!(id, b.get_or_create("deposit", Some("d")));

        let parsed = uuid::Uuid::parse_str(&id).expect("uuid");
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn timestamps_offset_from_base() {
        let tracker = tracker();

        assert_eq!(tracker.timestamp_str(0, 0, 0).unwrap(), "2024-01-15T00:00:00Z");
        assert_eq!(tracker.timestamp_str(2, 9, 30).unwrap(), "2024-01-17T09:30:00Z");
        assert_eq!(tracker.date_for(20).unwrap(), "2024-02-04");
    }

    #[test]
    fn day_past_calendar_range_is_an_error() {
        let tracker = tracker();

        let err = tracker.timestamp_for(100_000_000, 0, 0).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::TimeOutOfRange { day: 100_000_000, .. }
        ));
        assert!(tracker.timestamp_str(u32::MAX, 23, 59).is_err());
        assert!(tracker.date_for(u32::MAX).is_err());
    }

    proptest! {
        #[test]
        fn sequences_start_at_one_without_gaps(calls in prop::collection::vec(0usize..3, 1..40)) {
            let mut tracker = tracker();
            let ids = ["a", "b", "c"];
            let mut seen = [0u64; 3];

            for i in calls {
                let seq = tracker.next_sequence(ids[i]);
                seen[i] += 1;
                prop_assert_eq!(seq, seen[i]);
            }
        }
    }
}
