use derive_more::Display;
use std::collections::{BTreeMap, btree_map::Entry};

///
/// Ranked
///
/// A named candidate tagged with the precedence of the scan root it came
/// from. Higher precedence wins.
///

#[derive(Clone, Debug)]
pub struct Ranked<T> {
    pub name: String,
    pub source: String,
    pub precedence: i32,
    pub item: T,
}

impl<T> Ranked<T> {
    pub fn new(name: impl Into<String>, source: impl Into<String>, precedence: i32, item: T) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            precedence,
            item,
        }
    }
}

///
/// ShadowReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ShadowReason {
    #[display("lower precedence")]
    LowerPrecedence,
    #[display("duplicate at equal precedence")]
    Duplicate,
}

///
/// Shadowed
/// A candidate discarded before the registry was built.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Shadowed {
    pub name: String,
    pub kept_source: String,
    pub discarded_source: String,
    pub reason: ShadowReason,
}

/// Keep one candidate per name: highest precedence wins outright, ties keep
/// the first one seen. Output is ordered by name.
pub fn select_by_precedence<T>(
    candidates: impl IntoIterator<Item = Ranked<T>>,
) -> (Vec<Ranked<T>>, Vec<Shadowed>) {
    let mut kept: BTreeMap<String, Ranked<T>> = BTreeMap::new();
    let mut shadowed = Vec::new();

    for candidate in candidates {
        match kept.entry(candidate.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
            Entry::Occupied(mut slot) => {
                let current = slot.get();
                let (winner_source, loser_source, reason, replace) =
                    if candidate.precedence > current.precedence {
                        (
                            candidate.source.clone(),
                            current.source.clone(),
                            ShadowReason::LowerPrecedence,
                            true,
                        )
                    } else {
                        let reason = if candidate.precedence == current.precedence {
                            ShadowReason::Duplicate
                        } else {
                            ShadowReason::LowerPrecedence
                        };
                        (current.source.clone(), candidate.source.clone(), reason, false)
                    };

                shadowed.push(Shadowed {
                    name: candidate.name.clone(),
                    kept_source: winner_source,
                    discarded_source: loser_source,
                    reason,
                });

                if replace {
                    slot.insert(candidate);
                }
            }
        }
    }

    (kept.into_values().collect(), shadowed)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_precedence_wins_regardless_of_order() {
        let (kept, shadowed) = select_by_precedence([
            Ranked::new("Terms", "presentation/terms.rs", 0, "api"),
            Ranked::new("Terms", "domain/terms.rs", 10, "domain"),
        ]);

        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].item, "domain");
        assert_eq!(shadowed[0].discarded_source, "presentation/terms.rs");
        assert_eq!(shadowed[0].reason, ShadowReason::LowerPrecedence);
    }

    #[test]
    fn ties_keep_first_seen() {
        let (kept, shadowed) = select_by_precedence([
            Ranked::new("Terms", "a.rs", 1, 'a'),
            Ranked::new("Terms", "b.rs", 1, 'b'),
        ]);

        assert_eq!(kept[0].item, 'a');
        assert_eq!(shadowed[0].reason, ShadowReason::Duplicate);
    }
}
