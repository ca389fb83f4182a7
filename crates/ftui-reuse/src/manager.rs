#![forbid(unsafe_code)]

//! Identity-preserving, shape-keyed view reuse.
//!
//! A [`ReuseManager`] remembers which view backs which item identity. Each
//! resolve pass takes the items the layout wants visible and decides, per
//! item, whether it:
//!
//! 1. **continues** the view its identity already had,
//! 2. **reuses** a view vacated this pass by another identity of the same
//!    shape, or
//! 3. needs a **newly created** view.
//!
//! Vacated views nobody claims are **released** and handed back through
//! [`Resolution::released`].
//!
//! # Invariants
//!
//! 1. **Conservation**: every view bound before a pass is continued, reused,
//!    or released exactly once by that pass.
//! 2. **Uniqueness**: no view backs two identities at once.
//! 3. **Shape isolation**: a view only moves between items of equal shape.
//! 4. **Determinism**: the same prior state and the same request (in the
//!    same iteration order) always produce the same pairing.
//!
//! # Pairing order
//!
//! Vacated views are grouped by shape in the order they were bound by the
//! previous pass, which is that pass's request order. Requested items claim
//! from their bucket in request order, oldest first under
//! [`ClaimOrder::Fifo`] and newest first under [`ClaimOrder::Lifo`].
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Duplicate identity in request | `Err(DuplicateIdentity)`, state untouched |
//! | `create` fails, `Isolate` | Item unbound, listed in `failures` |
//! | `create` fails, `Abort` | Continuations and earlier successes committed, `Err(CreationFailed)` carrying their records and the released views |
//!
//! An aborted pass reports exactly what a successful one would for the work it
//! committed, so a view claimed before the failure is never left showing its
//! previous item's content.
//!
//! # Usage
//!
//! ```
//! use ftui_reuse::{ReuseManager, RequestedItem, ViewShape};
//!
//! let mut next_view = 0u32;
//! let mut manager = ReuseManager::new();
//! let day = ViewShape::of_kind("day");
//!
//! let first = manager
//!     .resolve(
//!         [RequestedItem::unplaced("mar-1", day.clone())],
//!         |_| { next_view += 1; next_view },
//!     )
//!     .unwrap();
//! assert!(first.resolved[0].outcome.is_created());
//!
//! // Scrolling: mar-1 leaves, mar-2 arrives and takes over its view.
//! let second = manager
//!     .resolve(
//!         [RequestedItem::unplaced("mar-2", day.clone())],
//!         |_| { next_view += 1; next_view },
//!     )
//!     .unwrap();
//! assert!(second.resolved[0].outcome.is_reused());
//! assert_eq!(second.resolved[0].resource, 1);
//! assert_eq!(second.resolved[0].previous_item().unwrap().identity, "mar-1");
//! ```

use std::collections::VecDeque;
use std::convert::Infallible;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::config::{ClaimOrder, FailurePolicy, MAX_CAPACITY_HINT, ReuseConfig};
use crate::error::ReuseError;
use crate::item::RequestedItem;
use crate::outcome::{CreationFailure, Outcome, Released, Resolution, Resolved, ReuseStats};

/// A view bound to the item it currently backs.
#[derive(Debug)]
struct Binding<I, S, P, R> {
    item: RequestedItem<I, S, P>,
    resource: R,
}

/// Tracks live item → view bindings across resolve passes.
///
/// Generic over the item identity `I`, the shape `S`, the placement payload
/// `P`, and the view handle `R`. Handles are shared with the caller (an
/// arena id, an `Rc`, ...); the manager clones them into result records but
/// never inspects them.
///
/// Not `Clone`: each bound handle lives in exactly one table.
#[derive(Debug)]
pub struct ReuseManager<I, S, P, R> {
    /// Live bindings in the order the last pass bound them.
    bindings: Vec<Binding<I, S, P, R>>,
    /// Identity → position in `bindings`.
    index: FxHashMap<I, usize>,
    config: ReuseConfig,
    totals: ReuseStats,
}

impl<I, S, P, R> Default for ReuseManager<I, S, P, R> {
    fn default() -> Self {
        Self::with_config(ReuseConfig::default())
    }
}

impl<I, S, P, R> ReuseManager<I, S, P, R> {
    /// Create an empty manager with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty manager.
    ///
    /// The capacity hint is clamped to [`MAX_CAPACITY_HINT`].
    #[must_use]
    pub fn with_config(config: ReuseConfig) -> Self {
        let capacity = config.capacity_hint.min(MAX_CAPACITY_HINT);
        Self {
            bindings: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            config,
            totals: ReuseStats::default(),
        }
    }

    /// Current configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ReuseConfig {
        &self.config
    }

    /// Replace the configuration. Takes effect on the next pass.
    pub fn set_config(&mut self, config: ReuseConfig) {
        self.config = config;
    }

    /// Counters accumulated over every pass so far.
    #[inline]
    #[must_use]
    pub fn totals(&self) -> ReuseStats {
        self.totals
    }

    /// Number of live bindings.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Live `(item, view)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&RequestedItem<I, S, P>, &R)> {
        self.bindings.iter().map(|b| (&b.item, &b.resource))
    }

    /// Release every binding, leaving the manager empty.
    pub fn clear(&mut self) -> Vec<Released<I, S, P, R>> {
        self.index.clear();
        let released: Vec<_> = self
            .bindings
            .drain(..)
            .map(|b| Released {
                item: b.item,
                resource: b.resource,
            })
            .collect();
        self.totals.released += released.len() as u64;
        released
    }
}

impl<I, S, P, R> ReuseManager<I, S, P, R>
where
    I: Eq + Hash + Clone,
    S: Eq + Hash + Clone,
    P: Clone,
    R: Clone,
{
    /// View currently bound to `identity`.
    #[must_use]
    pub fn resource(&self, identity: &I) -> Option<&R> {
        self.index.get(identity).map(|&i| &self.bindings[i].resource)
    }

    /// Item currently bound to `identity`, as it was last requested.
    #[must_use]
    pub fn bound_item(&self, identity: &I) -> Option<&RequestedItem<I, S, P>> {
        self.index.get(identity).map(|&i| &self.bindings[i].item)
    }

    #[must_use]
    pub fn contains(&self, identity: &I) -> bool {
        self.index.contains_key(identity)
    }

    /// Resolve a pass with an infallible view factory.
    pub fn resolve<T, F>(
        &mut self,
        requested: T,
        mut create: F,
    ) -> Result<Resolution<I, S, P, R>, ReuseError<I, S, P, R, Infallible>>
    where
        T: IntoIterator<Item = RequestedItem<I, S, P>>,
        F: FnMut(&S) -> R,
    {
        self.try_resolve(requested, |shape| Ok(create(shape)))
    }

    /// Resolve a pass with a fallible view factory.
    ///
    /// `create` is only called for items that neither continue nor reuse a
    /// view. See the module docs for failure handling.
    pub fn try_resolve<T, F, E>(
        &mut self,
        requested: T,
        mut create: F,
    ) -> Result<Resolution<I, S, P, R, E>, ReuseError<I, S, P, R, E>>
    where
        T: IntoIterator<Item = RequestedItem<I, S, P>>,
        F: FnMut(&S) -> Result<R, E>,
    {
        let requested: Vec<RequestedItem<I, S, P>> = requested.into_iter().collect();

        // Contract check before touching any state.
        let mut positions: FxHashMap<&I, usize> =
            FxHashMap::with_capacity_and_hasher(requested.len(), Default::default());
        for (pos, item) in requested.iter().enumerate() {
            if positions.insert(&item.identity, pos).is_some() {
                #[cfg(feature = "tracing")]
                tracing::warn!(position = pos, "duplicate identity in reuse request");
                return Err(ReuseError::DuplicateIdentity {
                    identity: item.identity.clone(),
                });
            }
        }

        let mut stats = ReuseStats::default();
        let mut slots: Vec<Option<(R, Outcome<I, S, P>)>> =
            (0..requested.len()).map(|_| None).collect();

        // Partition: identities still requested with an unchanged shape keep
        // their view; everything else is vacated.
        let mut vacated: Vec<Option<Binding<I, S, P, R>>> = Vec::new();
        self.index.clear();
        for binding in self.bindings.drain(..) {
            match positions.get(&binding.item.identity) {
                Some(&pos) if requested[pos].shape == binding.item.shape => {
                    stats.continued += 1;
                    slots[pos] = Some((
                        binding.resource,
                        Outcome::Continued {
                            previous: binding.item,
                        },
                    ));
                }
                _ => vacated.push(Some(binding)),
            }
        }

        // Pool: vacated positions bucketed by shape, in binding order.
        let mut pool: FxHashMap<S, VecDeque<usize>> = FxHashMap::default();
        if self.config.reuse_vacated {
            for (slot, binding) in vacated.iter().enumerate() {
                if let Some(binding) = binding {
                    pool.entry(binding.item.shape.clone())
                        .or_default()
                        .push_back(slot);
                }
            }
        }

        let claim_order = self.config.claim_order;
        let policy = self.config.on_creation_failure;
        let mut failures = Vec::new();
        let mut abort = None;

        for (pos, item) in requested.iter().enumerate() {
            if slots[pos].is_some() {
                continue;
            }

            let claimed = pool
                .get_mut(&item.shape)
                .and_then(|bucket| match claim_order {
                    ClaimOrder::Fifo => bucket.pop_front(),
                    ClaimOrder::Lifo => bucket.pop_back(),
                })
                .and_then(|slot| vacated[slot].take());

            if let Some(binding) = claimed {
                #[cfg(feature = "tracing")]
                tracing::trace!(position = pos, "claimed vacated view");
                stats.reused += 1;
                slots[pos] = Some((
                    binding.resource,
                    Outcome::Reused {
                        previous: binding.item,
                    },
                ));
                continue;
            }

            match create(&item.shape) {
                Ok(resource) => {
                    stats.created += 1;
                    slots[pos] = Some((resource, Outcome::Created));
                }
                Err(error) => {
                    stats.failed += 1;
                    #[cfg(feature = "tracing")]
                    tracing::warn!(position = pos, policy = %policy, "view creation failed");
                    match policy {
                        FailurePolicy::Isolate => {
                            failures.push(CreationFailure {
                                item: item.clone(),
                                error,
                            });
                        }
                        FailurePolicy::Abort => {
                            abort = Some((item.identity.clone(), error));
                            break;
                        }
                    }
                }
            }
        }

        // Commit: new bindings in request order, then release leftovers.
        let mut resolved = Vec::with_capacity(requested.len());
        for (item, slot) in requested.into_iter().zip(slots) {
            if let Some((resource, outcome)) = slot {
                self.index.insert(item.identity.clone(), self.bindings.len());
                self.bindings.push(Binding {
                    item: item.clone(),
                    resource: resource.clone(),
                });
                resolved.push(Resolved {
                    item,
                    resource,
                    outcome,
                });
            }
        }
        debug_assert_eq!(self.index.len(), self.bindings.len());

        let released: Vec<_> = vacated
            .into_iter()
            .flatten()
            .map(|b| Released {
                item: b.item,
                resource: b.resource,
            })
            .collect();
        stats.released = released.len() as u64;
        self.totals.accumulate(&stats);

        if let Some((identity, source)) = abort {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                continued = stats.continued,
                reused = stats.reused,
                created = stats.created,
                released = stats.released,
                live = self.bindings.len(),
                "reuse pass aborted"
            );
            return Err(ReuseError::CreationFailed {
                identity,
                source,
                resolved,
                released,
            });
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(
            continued = stats.continued,
            reused = stats.reused,
            created = stats.created,
            released = stats.released,
            failed = stats.failed,
            live = self.bindings.len(),
            "reuse pass resolved"
        );

        Ok(Resolution {
            resolved,
            released,
            failures,
            stats,
        })
    }
}
