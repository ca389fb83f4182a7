#![forbid(unsafe_code)]

//! Shape-keyed view reuse for virtualized rendering.
//!
//! # Role in FrankenTUI
//! Scrolling a virtualized surface changes which items are visible every
//! frame. Building a view for each newly visible item is the expensive part;
//! `ftui-reuse` keeps that cost proportional to what actually changed by
//! handing views that just scrolled out to items that just scrolled in,
//! whenever the two items share a [`ViewShape`].
//!
//! # Primary responsibilities
//! - **ReuseManager**: identity → view bindings that survive across passes.
//! - **Resolution**: per-item outcome (continued, reused, created) plus the
//!   views released by the pass.
//! - **ReuseConfig**: claim order, failure policy, env overrides.
//!
//! # How it fits in the system
//! The layout pass decides which items are visible and where. It hands those
//! items to [`ReuseManager::resolve`], which returns the view for each one and
//! the item that view was showing before, so the caller can update content
//! instead of rebuilding. Constructing, configuring, and disposing views
//! stays with the caller.

pub mod config;
pub mod error;
pub mod item;
pub mod manager;
pub mod outcome;
pub mod shape;

pub use config::{ClaimOrder, FailurePolicy, ReuseConfig};
pub use error::ReuseError;
pub use item::RequestedItem;
pub use manager::ReuseManager;
pub use outcome::{CreationFailure, Outcome, Released, Resolution, Resolved, ReuseStats};
pub use shape::{ResourceKind, ViewShape};
