#![forbid(unsafe_code)]

//! Errors from resolve passes.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Duplicate identity | Two requested items share an identity | Call fails before any state changes |
//! | Creation failed (`Isolate`) | `create` returned `Err` | Item left unbound, listed in `Resolution::failures` |
//! | Creation failed (`Abort`) | `create` returned `Err` | Call stops, committed records and released views travel in `CreationFailed` |

use std::convert::Infallible;
use std::error::Error;
use std::fmt;

use crate::outcome::{Released, Resolved};

/// Errors returned by [`ReuseManager`](crate::manager::ReuseManager) resolve passes.
///
/// Parameterized like [`Resolution`](crate::outcome::Resolution): an aborted
/// pass still commits part of its work, and the records for that work are
/// carried here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReuseError<I, S, P, R, E = Infallible> {
    /// The request named the same identity twice. This is an upstream bug;
    /// the manager refuses to pick one.
    DuplicateIdentity { identity: I },
    /// View creation failed under [`FailurePolicy::Abort`].
    ///
    /// `resolved` lists every binding the pass committed before stopping, in
    /// request order, with the same outcomes a successful pass would report.
    /// `released` holds the vacated views nobody claimed.
    ///
    /// [`FailurePolicy::Abort`]: crate::config::FailurePolicy::Abort
    CreationFailed {
        identity: I,
        source: E,
        resolved: Vec<Resolved<I, S, P, R>>,
        released: Vec<Released<I, S, P, R>>,
    },
}

impl<I, S, P, R, E> ReuseError<I, S, P, R, E> {
    /// Identity of the item that triggered the error.
    #[must_use]
    pub fn identity(&self) -> &I {
        match self {
            Self::DuplicateIdentity { identity } | Self::CreationFailed { identity, .. } => {
                identity
            }
        }
    }

    /// Records committed before the pass stopped. Empty for a rejected request.
    #[must_use]
    pub fn resolved(&self) -> &[Resolved<I, S, P, R>] {
        match self {
            Self::DuplicateIdentity { .. } => &[],
            Self::CreationFailed { resolved, .. } => resolved,
        }
    }

    /// Views released by the pass. Empty for a rejected request.
    #[must_use]
    pub fn released(&self) -> &[Released<I, S, P, R>] {
        match self {
            Self::DuplicateIdentity { .. } => &[],
            Self::CreationFailed { released, .. } => released,
        }
    }
}

impl<I: fmt::Debug, S, P, R, E: fmt::Display> fmt::Display for ReuseError<I, S, P, R, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateIdentity { identity } => {
                write!(f, "duplicate identity in request: {identity:?}")
            }
            Self::CreationFailed {
                identity, source, ..
            } => write!(f, "view creation failed for {identity:?}: {source}"),
        }
    }
}

impl<I, S, P, R, E> Error for ReuseError<I, S, P, R, E>
where
    I: fmt::Debug,
    S: fmt::Debug,
    P: fmt::Debug,
    R: fmt::Debug,
    E: Error + 'static,
{
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DuplicateIdentity { .. } => None,
            Self::CreationFailed { source, .. } => Some(source),
        }
    }
}
