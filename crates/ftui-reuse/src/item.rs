#![forbid(unsafe_code)]

//! Items requested by the layout pass.

/// One item the layout wants backed by a view this pass.
///
/// - `identity` names the logical item across passes (e.g. "header for
///   March 2020").
/// - `shape` decides which views can back it (see [`crate::shape`]).
/// - `placement` is carried through untouched; the manager only compares it
///   to report whether a continued item is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestedItem<I, S, P = ()> {
    pub identity: I,
    pub shape: S,
    pub placement: P,
}

impl<I, S, P> RequestedItem<I, S, P> {
    /// Create a requested item.
    #[must_use]
    pub fn new(identity: I, shape: S, placement: P) -> Self {
        Self {
            identity,
            shape,
            placement,
        }
    }
}

impl<I, S> RequestedItem<I, S, ()> {
    /// Create a requested item with no placement payload.
    #[must_use]
    pub fn unplaced(identity: I, shape: S) -> Self {
        Self::new(identity, shape, ())
    }
}
