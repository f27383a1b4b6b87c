//! Variable substitution for explicit event parameters.
//!
//! `$inputs.<key>`, `$customer.<key>` and `$<entity_type>.<name>` are
//! resolved against the scenario and the tracker. Nothing here creates
//! identifiers.

use crate::{scenario::Customer, tracker::IdTracker};
use indexmap::IndexMap;
use serde_json::Value;

const INPUTS: &str = "inputs";
const CUSTOMER: &str = "customer";

///
/// Substitution
///

#[derive(Clone, Copy, Debug)]
pub struct Substitution<'a> {
    pub inputs: &'a IndexMap<String, Value>,
    pub customer: Option<&'a Customer>,
}

impl Substitution<'_> {
    ///
    /// resolve
    ///
    /// `None` means the reference named something that does not exist and
    /// the caller should fall back to auto-fill. Literals, and tracker
    /// misses, come back unchanged.
    ///
    #[must_use]
    pub fn resolve(&self, raw: &Value, tracker: &IdTracker) -> Option<Value> {
        let Some(reference) = raw.as_str().and_then(|s| s.strip_prefix('$')) else {
            return Some(raw.clone());
        };
        let Some((scope, key)) = reference.split_once('.') else {
            return Some(raw.clone());
        };

        match scope {
            INPUTS => self.inputs.get(key).cloned(),
            CUSTOMER => self
                .customer
                .and_then(|c| c.get(key))
                .cloned()
                .or_else(|| tracked(tracker, CUSTOMER, key))
                .or_else(|| Some(raw.clone())),
            entity_type => tracked(tracker, entity_type, key).or_else(|| Some(raw.clone())),
        }
    }
}

fn tracked(tracker: &IdTracker, entity_type: &str, name: &str) -> Option<Value> {
    tracker.get(entity_type, name).map(Value::from)
}

///
/// TESTS
///
