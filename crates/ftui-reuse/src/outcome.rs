#![forbid(unsafe_code)]

//! Per-item results of a resolve pass.
//!
//! Every requested item yields exactly one [`Resolved`] record, except items
//! whose view could not be created under [`FailurePolicy::Isolate`], which
//! yield a [`CreationFailure`] instead. Views that were vacated and not
//! claimed come back as [`Released`] records so the caller can dispose of
//! them.
//!
//! [`FailurePolicy::Isolate`]: crate::config::FailurePolicy::Isolate

use std::convert::Infallible;

use crate::item::RequestedItem;

/// How a requested item came to be backed by its view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<I, S, P> {
    /// The identity was already live; the view stayed where it was.
    ///
    /// `previous` is the item as it was bound last pass. When it equals the
    /// requested item nothing about the view needs updating.
    Continued { previous: RequestedItem<I, S, P> },
    /// The view was vacated by `previous`, a different identity of the same
    /// shape, and now backs the requested item.
    Reused { previous: RequestedItem<I, S, P> },
    /// No compatible view was available; a new one was created.
    Created,
}

impl<I, S, P> Outcome<I, S, P> {
    /// The item the view was backing before this pass, if any.
    #[must_use]
    pub fn previous_item(&self) -> Option<&RequestedItem<I, S, P>> {
        match self {
            Self::Continued { previous } | Self::Reused { previous } => Some(previous),
            Self::Created => None,
        }
    }

    #[must_use]
    pub fn is_continued(&self) -> bool {
        matches!(self, Self::Continued { .. })
    }

    #[must_use]
    pub fn is_reused(&self) -> bool {
        matches!(self, Self::Reused { .. })
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created)
    }
}

/// A requested item together with the view now backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<I, S, P, R> {
    pub item: RequestedItem<I, S, P>,
    pub resource: R,
    pub outcome: Outcome<I, S, P>,
}

impl<I, S, P, R> Resolved<I, S, P, R> {
    /// The item the view was backing before this pass, if any.
    #[inline]
    #[must_use]
    pub fn previous_item(&self) -> Option<&RequestedItem<I, S, P>> {
        self.outcome.previous_item()
    }
}

impl<I: PartialEq, S: PartialEq, P: PartialEq, R> Resolved<I, S, P, R> {
    /// True when the view continues backing an identical item.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        match &self.outcome {
            Outcome::Continued { previous } => *previous == self.item,
            _ => false,
        }
    }
}

/// A vacated view that no requested item claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Released<I, S, P, R> {
    /// The item the view backed before it was released.
    pub item: RequestedItem<I, S, P>,
    pub resource: R,
}

/// A requested item whose view could not be created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreationFailure<I, S, P, E> {
    pub item: RequestedItem<I, S, P>,
    pub error: E,
}

/// Counters for one resolve pass, or accumulated across passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReuseStats {
    /// Items that kept the view they already had.
    pub continued: u64,
    /// Items that took over a view vacated by another identity.
    pub reused: u64,
    /// Items that needed a newly created view.
    pub created: u64,
    /// Vacated views nobody claimed.
    pub released: u64,
    /// Items whose view creation failed.
    pub failed: u64,
}

impl ReuseStats {
    /// Views bound after the pass.
    #[inline]
    #[must_use]
    pub fn resources_in_use(&self) -> u64 {
        self.continued + self.reused + self.created
    }

    /// Fraction of bound items that avoided a creation (0.0 when nothing is bound).
    #[must_use]
    pub fn reuse_ratio(&self) -> f64 {
        let bound = self.resources_in_use();
        if bound == 0 {
            return 0.0;
        }
        (self.continued + self.reused) as f64 / bound as f64
    }

    /// Add another pass's counters into these.
    pub fn accumulate(&mut self, other: &ReuseStats) {
        self.continued += other.continued;
        self.reused += other.reused;
        self.created += other.created;
        self.released += other.released;
        self.failed += other.failed;
    }
}

/// Everything a resolve pass produced.
#[derive(Debug, Clone)]
pub struct Resolution<I, S, P, R, E = Infallible> {
    /// One record per bound item, in request order.
    pub resolved: Vec<Resolved<I, S, P, R>>,
    /// Vacated views that were not claimed, in previous binding order.
    pub released: Vec<Released<I, S, P, R>>,
    /// Items left unbound because their view could not be created.
    pub failures: Vec<CreationFailure<I, S, P, E>>,
    pub stats: ReuseStats,
}

impl<I, S, P, R, E> Resolution<I, S, P, R, E> {
    /// Iterate bound records in request order.
    pub fn iter(&self) -> std::slice::Iter<'_, Resolved<I, S, P, R>> {
        self.resolved.iter()
    }

    /// Number of bound records.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}

impl<I: PartialEq, S, P, R, E> Resolution<I, S, P, R, E> {
    /// Record for a given identity (linear scan).
    #[must_use]
    pub fn find(&self, identity: &I) -> Option<&Resolved<I, S, P, R>> {
        self.resolved.iter().find(|r| r.item.identity == *identity)
    }
}

impl<'a, I, S, P, R, E> IntoIterator for &'a Resolution<I, S, P, R, E> {
    type Item = &'a Resolved<I, S, P, R>;
    type IntoIter = std::slice::Iter<'a, Resolved<I, S, P, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.resolved.iter()
    }
}

impl<I, S, P, R, E> IntoIterator for Resolution<I, S, P, R, E> {
    type Item = Resolved<I, S, P, R>;
    type IntoIter = std::vec::IntoIter<Resolved<I, S, P, R>>;

    fn into_iter(self) -> Self::IntoIter {
        self.resolved.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u32) -> RequestedItem<u32, &'static str, u8> {
        RequestedItem::new(id, "cell", 0)
    }

    #[test]
    fn previous_item_per_outcome() {
        let created: Outcome<u32, &str, u8> = Outcome::Created;
        assert!(created.previous_item().is_none());
        assert!(created.is_created());

        let reused = Outcome::Reused { previous: item(1) };
        assert_eq!(reused.previous_item(), Some(&item(1)));
        assert!(reused.is_reused());

        let continued = Outcome::Continued { previous: item(2) };
        assert_eq!(continued.previous_item(), Some(&item(2)));
        assert!(continued.is_continued());
    }

    #[test]
    fn unchanged_only_for_identical_continuation() {
        let same = Resolved {
            item: item(1),
            resource: 10u32,
            outcome: Outcome::Continued { previous: item(1) },
        };
        assert!(same.is_unchanged());

        let moved = Resolved {
            item: RequestedItem::new(1, "cell", 5),
            resource: 10u32,
            outcome: Outcome::Continued { previous: item(1) },
        };
        assert!(!moved.is_unchanged());

        let reused = Resolved {
            item: item(1),
            resource: 10u32,
            outcome: Outcome::Reused { previous: item(1) },
        };
        assert!(!reused.is_unchanged());
    }

    #[test]
    fn stats_ratio_and_accumulate() {
        let empty = ReuseStats::default();
        assert_eq!(empty.reuse_ratio(), 0.0);

        let mut total = ReuseStats {
            continued: 2,
            reused: 1,
            created: 1,
            released: 3,
            failed: 0,
        };
        assert_eq!(total.resources_in_use(), 4);
        assert!((total.reuse_ratio() - 0.75).abs() < f64::EPSILON);

        total.accumulate(&ReuseStats {
            continued: 0,
            reused: 0,
            created: 4,
            released: 1,
            failed: 2,
        });
        assert_eq!(total.created, 5);
        assert_eq!(total.released, 4);
        assert_eq!(total.failed, 2);
        assert_eq!(total.resources_in_use(), 8);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn stats_serde_round_trip() {
        let stats = ReuseStats {
            continued: 1,
            reused: 2,
            created: 3,
            released: 4,
            failed: 5,
        };
        let json = serde_json::to_string(&stats).expect("serialize");
        let back: ReuseStats = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(stats, back);
    }
}
